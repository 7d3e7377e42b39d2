use crate::error::SemanticError;
use crate::lexer::Token;
use crate::parser::{
    AssignmentTarget, BinaryOp, ConstantDeclaration, Expression, Literal, ProcedureDeclaration,
    Program, Statement, UnaryOp,
};

use super::{
    GlobalProcedure, GlobalProcedureTable, GlobalSymbol, GlobalSymbolTable, LocalSymbol,
    LocalSymbolTable, SymbolKind, Type, Value,
};

type SemanticResult<T> = Result<T, SemanticError>;

/// Signatures of the chimeralib runtime procedures, available to every
/// program without declaration.
const PREDEFINED_PROCEDURES: &[(&str, &[(&str, Type)], Type)] = &[
    ("WrInt", &[("i", Type::Integer)], Type::Void),
    ("WrStr", &[("s", Type::String)], Type::Void),
    ("WrBool", &[("b", Type::Boolean)], Type::Void),
    ("WrLn", &[], Type::Void),
    ("RdInt", &[], Type::Integer),
    ("RdStr", &[], Type::String),
    (
        "AtStr",
        &[("s", Type::String), ("i", Type::Integer)],
        Type::String,
    ),
    ("LenStr", &[("s", Type::String)], Type::Integer),
    (
        "CmpStr",
        &[("s1", Type::String), ("s2", Type::String)],
        Type::Integer,
    ),
    (
        "CatStr",
        &[("s1", Type::String), ("s2", Type::String)],
        Type::String,
    ),
    ("LenLstInt", &[("lst", Type::ListOfInteger)], Type::Integer),
    ("LenLstStr", &[("lst", Type::ListOfString)], Type::Integer),
    ("LenLstBool", &[("lst", Type::ListOfBoolean)], Type::Integer),
    ("NewLstInt", &[("size", Type::Integer)], Type::ListOfInteger),
    ("NewLstStr", &[("size", Type::Integer)], Type::ListOfString),
    (
        "NewLstBool",
        &[("size", Type::Integer)],
        Type::ListOfBoolean,
    ),
    ("IntToStr", &[("i", Type::Integer)], Type::String),
    ("StrToInt", &[("s", Type::String)], Type::Integer),
];

/// How an identifier resolved: local scope first, then global.
#[derive(Clone, Copy, Debug)]
struct Resolved {
    symbol_type: Type,
    is_constant: bool,
}

/// Single-pass semantic checker. Builds the global symbol and procedure
/// tables while verifying every rule; stops at the first violation.
#[derive(Debug)]
pub struct SemanticAnalyzer {
    gs_table: GlobalSymbolTable,
    gp_table: GlobalProcedureTable,
    current_procedure: Option<String>,
    loop_nesting: usize,
}

impl Default for SemanticAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl SemanticAnalyzer {
    pub fn new() -> Self {
        let mut gp_table = GlobalProcedureTable::new();
        for (name, parameters, return_type) in PREDEFINED_PROCEDURES {
            let mut locals = LocalSymbolTable::new();
            for (position, (param_name, param_type)) in parameters.iter().enumerate() {
                locals.insert(*param_name, LocalSymbol::param(*param_type, position));
            }
            gp_table.insert(*name, GlobalProcedure::new(true, *return_type, locals));
        }
        Self {
            gs_table: GlobalSymbolTable::new(),
            gp_table,
            current_procedure: None,
            loop_nesting: 0,
        }
    }

    pub fn analyze(
        mut self,
        program: &Program,
    ) -> SemanticResult<(GlobalSymbolTable, GlobalProcedureTable)> {
        for constant in &program.constants {
            self.visit_global_constant(constant)?;
        }
        for variable in &program.variables {
            for name in &variable.names {
                self.check_global_duplicate(name)?;
                let symbol_type = Type::from_spec(&variable.type_spec);
                self.gs_table
                    .insert(&name.lexeme, GlobalSymbol::variable(symbol_type));
            }
        }
        for procedure in &program.procedures {
            self.visit_procedure(procedure)?;
        }
        for statement in &program.statements {
            self.visit_statement(statement)?;
        }
        Ok((self.gs_table, self.gp_table))
    }

    fn check_global_duplicate(&self, name: &Token) -> SemanticResult<()> {
        if self.gs_table.contains(&name.lexeme) {
            return Err(SemanticError::new(
                format!("Duplicated symbol: {}", name.lexeme),
                name,
            ));
        }
        Ok(())
    }

    fn visit_global_constant(&mut self, constant: &ConstantDeclaration) -> SemanticResult<()> {
        self.check_global_duplicate(&constant.name)?;
        let (symbol_type, value) = self.eval_constant(&constant.name, &constant.literal)?;
        self.gs_table.insert(
            &constant.name.lexeme,
            GlobalSymbol::constant(symbol_type, value),
        );
        Ok(())
    }

    /// Computes the type and compile-time value of a constant literal.
    fn eval_constant(&self, name: &Token, literal: &Literal) -> SemanticResult<(Type, Value)> {
        match literal {
            Literal::List(_, elements) if elements.is_empty() => Err(SemanticError::new(
                format!("Constant lists cannot be empty: {}", name.lexeme),
                literal.anchor(),
            )),
            Literal::List(_, elements) => {
                let (element_type, _) = self.eval_simple(&elements[0])?;
                let mut values = Vec::with_capacity(elements.len());
                for element in elements {
                    let (other_type, value) = self.eval_simple(element)?;
                    if other_type != element_type {
                        return Err(SemanticError::new(
                            "All list elements should be of the same type",
                            element.anchor(),
                        ));
                    }
                    values.push(value);
                }
                Ok((element_type.list_of(), Value::collect_list(element_type, values)))
            }
            _ => self.eval_simple(literal),
        }
    }

    fn eval_simple(&self, literal: &Literal) -> SemanticResult<(Type, Value)> {
        match literal {
            Literal::Integer(token) => {
                let value: i32 = token.lexeme.parse().map_err(|_| {
                    SemanticError::new(
                        format!("Integer literal too large: {}", token.lexeme),
                        token,
                    )
                })?;
                Ok((Type::Integer, Value::Int(value)))
            }
            Literal::Str(token) => Ok((Type::String, Value::Str(token.lexeme.clone()))),
            Literal::True(_) => Ok((Type::Boolean, Value::Bool(true))),
            Literal::False(_) => Ok((Type::Boolean, Value::Bool(false))),
            Literal::List(..) => unreachable!("list elements are simple literals"),
        }
    }

    fn visit_procedure(&mut self, procedure: &ProcedureDeclaration) -> SemanticResult<()> {
        let name = &procedure.name;
        if self.gp_table.contains(&name.lexeme) {
            return Err(SemanticError::new(
                format!("Duplicated procedure: {}", name.lexeme),
                name,
            ));
        }

        let mut locals = LocalSymbolTable::new();
        let mut position = 0;
        for parameter in &procedure.parameters {
            let param_type = Type::from_spec(&parameter.type_spec);
            for param_name in &parameter.names {
                if locals.contains(&param_name.lexeme) {
                    return Err(SemanticError::new(
                        format!("Duplicated symbol: {}", param_name.lexeme),
                        param_name,
                    ));
                }
                locals.insert(&param_name.lexeme, LocalSymbol::param(param_type, position));
                position += 1;
            }
        }

        for constant in &procedure.constants {
            if locals.contains(&constant.name.lexeme) {
                return Err(SemanticError::new(
                    format!("Duplicated symbol: {}", constant.name.lexeme),
                    &constant.name,
                ));
            }
            let (symbol_type, value) = self.eval_constant(&constant.name, &constant.literal)?;
            locals.insert(
                &constant.name.lexeme,
                LocalSymbol::constant(symbol_type, value),
            );
        }

        for variable in &procedure.variables {
            let symbol_type = Type::from_spec(&variable.type_spec);
            for var_name in &variable.names {
                if locals.contains(&var_name.lexeme) {
                    return Err(SemanticError::new(
                        format!("Duplicated symbol: {}", var_name.lexeme),
                        var_name,
                    ));
                }
                locals.insert(&var_name.lexeme, LocalSymbol::variable(symbol_type));
            }
        }

        let return_type = procedure
            .return_type
            .as_ref()
            .map_or(Type::Void, Type::from_spec);

        // Registered before the body is visited so recursion resolves.
        self.gp_table.insert(
            &name.lexeme,
            GlobalProcedure::new(false, return_type, locals),
        );

        self.current_procedure = Some(name.lexeme.clone());
        for statement in &procedure.statements {
            self.visit_statement(statement)?;
        }
        self.current_procedure = None;
        Ok(())
    }

    fn resolve(&self, name: &str) -> Option<Resolved> {
        if let Some(procedure_name) = &self.current_procedure {
            let locals = &self
                .gp_table
                .get(procedure_name)
                .expect("current procedure is registered")
                .locals;
            if let Some(symbol) = locals.get(name) {
                return Some(Resolved {
                    symbol_type: symbol.symbol_type,
                    is_constant: symbol.kind == SymbolKind::Const,
                });
            }
        }
        self.gs_table.get(name).map(|symbol| Resolved {
            symbol_type: symbol.symbol_type,
            is_constant: symbol.is_constant,
        })
    }

    fn visit_statement(&mut self, statement: &Statement) -> SemanticResult<()> {
        match statement {
            Statement::Assignment {
                target,
                anchor,
                value,
            } => self.visit_assignment(target, anchor, value),
            Statement::Call { name, arguments } => {
                let return_type = self.check_call(name, arguments)?;
                if return_type != Type::Void {
                    return Err(SemanticError::new(
                        format!(
                            "Procedure {} returns a value and cannot be called as a statement",
                            name.lexeme
                        ),
                        name,
                    ));
                }
                Ok(())
            }
            Statement::If { clauses, else_body } => {
                for clause in clauses {
                    let condition_type = self.visit_expression(&clause.condition)?;
                    if condition_type != Type::Boolean {
                        return Err(SemanticError::new(
                            format!(
                                "Expecting type BOOLEAN instead of {condition_type} in if statement"
                            ),
                            &clause.anchor,
                        ));
                    }
                    for inner in &clause.body {
                        self.visit_statement(inner)?;
                    }
                }
                for inner in else_body {
                    self.visit_statement(inner)?;
                }
                Ok(())
            }
            Statement::Loop { body, .. } => {
                self.loop_nesting += 1;
                for inner in body {
                    self.visit_statement(inner)?;
                }
                self.loop_nesting -= 1;
                Ok(())
            }
            Statement::For {
                anchor,
                variable,
                iterable,
                body,
            } => self.visit_for(anchor, variable, iterable, body),
            Statement::Return { anchor, value } => self.visit_return(anchor, value.as_ref()),
            Statement::Exit { anchor } => {
                if self.loop_nesting == 0 {
                    return Err(SemanticError::new("Exit statement used outside a loop", anchor));
                }
                Ok(())
            }
        }
    }

    fn visit_assignment(
        &mut self,
        target: &AssignmentTarget,
        anchor: &Token,
        value: &Expression,
    ) -> SemanticResult<()> {
        let value_type = self.visit_expression(value)?;
        let target_type = match target {
            AssignmentTarget::Name(name) => {
                let resolved = self.resolve(&name.lexeme).ok_or_else(|| {
                    SemanticError::new(format!("Undeclared identifier: {}", name.lexeme), name)
                })?;
                if resolved.is_constant {
                    return Err(SemanticError::new(
                        format!("Cannot perform assignment to constant: {}", name.lexeme),
                        name,
                    ));
                }
                resolved.symbol_type
            }
            AssignmentTarget::Index { name, index } => {
                let resolved = self.resolve(&name.lexeme).ok_or_else(|| {
                    SemanticError::new(format!("Undeclared identifier: {}", name.lexeme), name)
                })?;
                if resolved.is_constant {
                    return Err(SemanticError::new(
                        format!("Cannot perform assignment to constant: {}", name.lexeme),
                        name,
                    ));
                }
                if !resolved.symbol_type.is_list() {
                    return Err(SemanticError::new(
                        format!(
                            "Expecting a list type instead of {} in index expression",
                            resolved.symbol_type
                        ),
                        name,
                    ));
                }
                let index_type = self.visit_expression(index)?;
                if index_type != Type::Integer {
                    return Err(SemanticError::new(
                        format!("Expecting type INTEGER instead of {index_type} in index expression"),
                        index.anchor(),
                    ));
                }
                resolved.symbol_type.element_type()
            }
        };

        if value_type != target_type {
            return Err(SemanticError::new(
                format!(
                    "Expecting type {target_type} instead of {value_type} in assignment statement"
                ),
                anchor,
            ));
        }
        Ok(())
    }

    fn visit_for(
        &mut self,
        anchor: &Token,
        variable: &Token,
        iterable: &Expression,
        body: &[Statement],
    ) -> SemanticResult<()> {
        let resolved = self.resolve(&variable.lexeme).ok_or_else(|| {
            SemanticError::new(
                format!("Undeclared identifier: {}", variable.lexeme),
                variable,
            )
        })?;
        if resolved.is_constant {
            return Err(SemanticError::new(
                format!("Cannot use constant {} as loop variable", variable.lexeme),
                variable,
            ));
        }

        let iterable_type = self.visit_expression(iterable)?;
        if !iterable_type.is_list() {
            return Err(SemanticError::new(
                format!("Expecting a list type instead of {iterable_type} in for statement"),
                anchor,
            ));
        }
        let element_type = iterable_type.element_type();
        if resolved.symbol_type != element_type {
            return Err(SemanticError::new(
                format!(
                    "Expecting type {element_type} instead of {} in for statement",
                    resolved.symbol_type
                ),
                variable,
            ));
        }

        self.loop_nesting += 1;
        for statement in body {
            self.visit_statement(statement)?;
        }
        self.loop_nesting -= 1;
        Ok(())
    }

    fn visit_return(&mut self, anchor: &Token, value: Option<&Expression>) -> SemanticResult<()> {
        let Some(value) = value else {
            return Ok(());
        };
        let found = self.visit_expression(value)?;

        let Some(procedure_name) = self.current_procedure.clone() else {
            return Err(SemanticError::new(
                "Return statement with a value is only allowed inside a procedure",
                anchor,
            ));
        };
        let return_type = self
            .gp_table
            .get(&procedure_name)
            .expect("current procedure is registered")
            .return_type;
        // `return {};` synthesizes VOID and would compare equal below.
        if return_type == Type::Void {
            return Err(SemanticError::new(
                "Return statement with a value is not allowed in a procedure with no return type",
                anchor,
            ));
        }
        if found != return_type {
            return Err(SemanticError::new(
                format!("Expecting type {return_type} instead of {found} in return statement"),
                anchor,
            ));
        }
        Ok(())
    }

    /// Checks a call's existence, arity and argument types; returns the
    /// procedure's return type. Callers decide whether VOID is allowed.
    fn check_call(&mut self, name: &Token, arguments: &[Expression]) -> SemanticResult<Type> {
        let mut argument_types = Vec::with_capacity(arguments.len());
        for argument in arguments {
            argument_types.push(self.visit_expression(argument)?);
        }

        let procedure = self.gp_table.get(&name.lexeme).ok_or_else(|| {
            SemanticError::new(format!("Undeclared procedure: {}", name.lexeme), name)
        })?;

        let parameters = procedure.parameters();
        if parameters.len() != arguments.len() {
            return Err(SemanticError::new(
                format!(
                    "Expecting {} argument(s) instead of {} in call to {}",
                    parameters.len(),
                    arguments.len(),
                    name.lexeme
                ),
                name,
            ));
        }

        for (i, ((_, parameter), argument_type)) in
            parameters.iter().zip(&argument_types).enumerate()
        {
            if parameter.symbol_type != *argument_type {
                return Err(SemanticError::new(
                    format!(
                        "Expecting type {} instead of {} in argument {} of call to {}",
                        parameter.symbol_type,
                        argument_type,
                        i + 1,
                        name.lexeme
                    ),
                    arguments[i].anchor(),
                ));
            }
        }

        Ok(procedure.return_type)
    }

    fn visit_expression(&mut self, expression: &Expression) -> SemanticResult<Type> {
        match expression {
            Expression::Binary {
                op,
                anchor,
                left,
                right,
            } => self.visit_binary(*op, anchor, left, right),
            Expression::Unary {
                op,
                anchor,
                operand,
            } => {
                let operand_type = self.visit_expression(operand)?;
                let expected = match op {
                    UnaryOp::Not => Type::Boolean,
                    UnaryOp::Negative => Type::Integer,
                };
                if operand_type != expected {
                    return Err(SemanticError::new(
                        format!(
                            "Expecting type {expected} instead of {operand_type} in operator {}",
                            anchor.lexeme
                        ),
                        anchor,
                    ));
                }
                Ok(expected)
            }
            Expression::Index {
                anchor,
                base,
                index,
            } => {
                let base_type = self.visit_expression(base)?;
                if !base_type.is_list() {
                    return Err(SemanticError::new(
                        format!("Expecting a list type instead of {base_type} in index expression"),
                        anchor,
                    ));
                }
                let index_type = self.visit_expression(index)?;
                if index_type != Type::Integer {
                    return Err(SemanticError::new(
                        format!("Expecting type INTEGER instead of {index_type} in index expression"),
                        index.anchor(),
                    ));
                }
                Ok(base_type.element_type())
            }
            Expression::Call { name, arguments } => {
                let return_type = self.check_call(name, arguments)?;
                if return_type == Type::Void {
                    return Err(SemanticError::new(
                        format!(
                            "Procedure {} returns no value and cannot be used in an expression",
                            name.lexeme
                        ),
                        name,
                    ));
                }
                Ok(return_type)
            }
            Expression::Identifier(name) => self
                .resolve(&name.lexeme)
                .map(|resolved| resolved.symbol_type)
                .ok_or_else(|| {
                    SemanticError::new(format!("Undeclared identifier: {}", name.lexeme), name)
                }),
            Expression::Literal(literal) => self.visit_literal(literal),
        }
    }

    /// A literal in expression position. The empty list has no element
    /// type to infer, so it synthesizes VOID and fails any further check.
    fn visit_literal(&mut self, literal: &Literal) -> SemanticResult<Type> {
        match literal {
            Literal::List(_, elements) if elements.is_empty() => Ok(Type::Void),
            Literal::List(_, elements) => {
                let (element_type, _) = self.eval_simple(&elements[0])?;
                for element in &elements[1..] {
                    let (other_type, _) = self.eval_simple(element)?;
                    if other_type != element_type {
                        return Err(SemanticError::new(
                            "All list elements should be of the same type",
                            element.anchor(),
                        ));
                    }
                }
                Ok(element_type.list_of())
            }
            _ => Ok(self.eval_simple(literal)?.0),
        }
    }

    fn visit_binary(
        &mut self,
        op: BinaryOp,
        anchor: &Token,
        left: &Expression,
        right: &Expression,
    ) -> SemanticResult<Type> {
        let left_type = self.visit_expression(left)?;
        let right_type = self.visit_expression(right)?;

        let check_both = |expected: Type| -> SemanticResult<()> {
            for (found, operand) in [(left_type, left), (right_type, right)] {
                if found != expected {
                    return Err(SemanticError::new(
                        format!(
                            "Expecting type {expected} instead of {found} in operator {}",
                            anchor.lexeme
                        ),
                        operand.anchor(),
                    ));
                }
            }
            Ok(())
        };

        match op {
            BinaryOp::And | BinaryOp::Or | BinaryOp::Xor => {
                check_both(Type::Boolean)?;
                Ok(Type::Boolean)
            }
            BinaryOp::Plus | BinaryOp::Minus | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => {
                check_both(Type::Integer)?;
                Ok(Type::Integer)
            }
            BinaryOp::Smaller | BinaryOp::Greater | BinaryOp::SmallerEq | BinaryOp::GreaterEq => {
                check_both(Type::Integer)?;
                Ok(Type::Boolean)
            }
            BinaryOp::Equal | BinaryOp::NotEqual => {
                let both_boolean = left_type == Type::Boolean && right_type == Type::Boolean;
                let both_integer = left_type == Type::Integer && right_type == Type::Integer;
                if !(both_boolean || both_integer) {
                    return Err(SemanticError::new(
                        format!(
                            "Expecting two BOOLEAN or two INTEGER operands in operator {}",
                            anchor.lexeme
                        ),
                        anchor,
                    ));
                }
                Ok(Type::Boolean)
            }
        }
    }
}
