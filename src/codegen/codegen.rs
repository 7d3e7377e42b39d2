use crate::analyzer::{
    GlobalProcedure, GlobalProcedureTable, GlobalSymbolTable, SymbolKind, Type, Value,
};
use crate::parser::{
    AssignmentTarget, BinaryOp, Expression, Literal, ProcedureDeclaration, Program, Statement,
    UnaryOp,
};

/// Where the code currently runs: `main`/`.init` or inside a procedure.
#[derive(Clone, Copy, Debug)]
enum Scope<'a> {
    Global,
    Local(&'a str),
}

/// Where a resolved name lives, with its type.
#[derive(Clone, Copy, Debug)]
enum Storage {
    Static(Type),
    Local(Type),
    Argument(Type),
}

impl Storage {
    fn symbol_type(self) -> Type {
        match self {
            Storage::Static(t) | Storage::Local(t) | Storage::Argument(t) => t,
        }
    }
}

fn cil_type(symbol_type: Type) -> &'static str {
    match symbol_type {
        Type::Void => "void",
        Type::Boolean => "bool",
        Type::Integer => "int32",
        Type::String => "string",
        Type::ListOfBoolean => "bool[]",
        Type::ListOfInteger => "int32[]",
        Type::ListOfString => "string[]",
    }
}

fn newarr_type(element_type: Type) -> &'static str {
    match element_type {
        Type::Boolean => "bool",
        Type::Integer => "int32",
        Type::String => "string",
        _ => unreachable!("list elements are scalars"),
    }
}

fn ldelem(element_type: Type) -> &'static str {
    match element_type {
        Type::Boolean => "ldelem.u1",
        Type::Integer => "ldelem.i4",
        Type::String => "ldelem.ref",
        _ => unreachable!("list elements are scalars"),
    }
}

fn stelem(element_type: Type) -> &'static str {
    match element_type {
        Type::Boolean => "stelem.i1",
        Type::Integer => "stelem.i4",
        Type::String => "stelem.ref",
        _ => unreachable!("list elements are scalars"),
    }
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Emits the whole program as textual CIL for a single static class,
/// `'ChimeraProgram'`: one static field per global, a `.init` method
/// that fills them in, one method per procedure, and `main` as the
/// entry point. Runtime procedures resolve into the external
/// `chimeralib` assembly. The analyzer has already accepted the tree,
/// so type errors here are unreachable.
pub struct CilGenerator {
    gs_table: GlobalSymbolTable,
    gp_table: GlobalProcedureTable,
    label_index: usize,
    loop_labels: Vec<String>,
    out: String,
}

impl CilGenerator {
    pub fn new(gs_table: GlobalSymbolTable, gp_table: GlobalProcedureTable) -> Self {
        Self {
            gs_table,
            gp_table,
            label_index: 0,
            loop_labels: vec![],
            out: String::new(),
        }
    }

    pub fn generate(mut self, program: &Program) -> String {
        self.line("// Code generated by the chimera compiler.");
        self.line("");
        self.line(".assembly 'chimera' {}");
        self.line("");
        self.line(".assembly extern 'chimeralib' {}");
        self.line("");
        self.line(".class public 'ChimeraProgram' extends ['mscorlib']'System'.'Object' {");
        self.line("");

        let globals: Vec<(String, Type, Value)> = self
            .gs_table
            .iter()
            .map(|(name, symbol)| (name.clone(), symbol.symbol_type, symbol.value.clone()))
            .collect();

        for (name, symbol_type, _) in &globals {
            self.line(format!(
                "\t.field public static {} '{name}'",
                cil_type(*symbol_type)
            ));
        }
        self.line("");

        self.line("\t.method public static void '.init' () {");
        for (name, symbol_type, value) in &globals {
            self.gen_value(value);
            self.emit(format!(
                "stsfld {} 'ChimeraProgram'::'{name}'",
                cil_type(*symbol_type)
            ));
        }
        self.emit("ret");
        self.line("\t}");
        self.line("");

        for procedure in &program.procedures {
            self.gen_procedure(procedure);
        }

        self.line("\t.method public static void 'main'() {");
        self.emit(".entrypoint");
        self.emit("call void class 'ChimeraProgram'::'.init'()");
        for statement in &program.statements {
            self.gen_statement(statement, Scope::Global);
        }
        self.emit("ret");
        self.line("\t}");
        self.line("}");

        self.out
    }

    fn line(&mut self, s: impl AsRef<str>) {
        self.out.push_str(s.as_ref());
        self.out.push('\n');
    }

    fn emit(&mut self, s: impl AsRef<str>) {
        self.out.push_str("\t\t");
        self.out.push_str(s.as_ref());
        self.out.push('\n');
    }

    fn emit_label(&mut self, label: &str) {
        self.out.push_str("\t\t");
        self.out.push_str(label);
        self.out.push_str(":\n");
    }

    fn new_label(&mut self) -> String {
        let s = format!("${:06}", self.label_index);
        self.label_index += 1;
        s
    }

    fn procedure(&self, name: &str) -> &GlobalProcedure {
        self.gp_table
            .get(name)
            .expect("analyzer registered every called procedure")
    }

    fn resolve(&self, name: &str, scope: Scope) -> Storage {
        if let Scope::Local(procedure_name) = scope {
            if let Some(symbol) = self.procedure(procedure_name).locals.get(name) {
                return match symbol.kind {
                    SymbolKind::Param => Storage::Argument(symbol.symbol_type),
                    _ => Storage::Local(symbol.symbol_type),
                };
            }
        }
        let symbol = self
            .gs_table
            .get(name)
            .expect("analyzer resolved every identifier");
        Storage::Static(symbol.symbol_type)
    }

    /// Re-derives the type of an already checked expression, for picking
    /// array instructions and hidden local types.
    fn expression_type(&self, expression: &Expression, scope: Scope) -> Type {
        match expression {
            Expression::Binary { op, .. } => match op {
                BinaryOp::Plus
                | BinaryOp::Minus
                | BinaryOp::Mul
                | BinaryOp::Div
                | BinaryOp::Rem => Type::Integer,
                _ => Type::Boolean,
            },
            Expression::Unary { op, .. } => match op {
                UnaryOp::Not => Type::Boolean,
                UnaryOp::Negative => Type::Integer,
            },
            Expression::Index { base, .. } => {
                self.expression_type(base, scope).element_type()
            }
            Expression::Call { name, .. } => self.procedure(&name.lexeme).return_type,
            Expression::Identifier(name) => self.resolve(&name.lexeme, scope).symbol_type(),
            Expression::Literal(literal) => match literal {
                Literal::Integer(_) => Type::Integer,
                Literal::Str(_) => Type::String,
                Literal::True(_) | Literal::False(_) => Type::Boolean,
                Literal::List(_, elements) => match &elements[0] {
                    Literal::Integer(_) => Type::ListOfInteger,
                    Literal::Str(_) => Type::ListOfString,
                    Literal::True(_) | Literal::False(_) => Type::ListOfBoolean,
                    Literal::List(..) => unreachable!("list elements are simple literals"),
                },
            },
        }
    }

    fn gen_procedure(&mut self, procedure: &ProcedureDeclaration) {
        let name = procedure.name.lexeme.clone();
        let proc = self.procedure(&name).clone();

        let params = proc
            .parameters()
            .iter()
            .map(|(param_name, symbol)| {
                format!("{} '{param_name}'", cil_type(symbol.symbol_type))
            })
            .collect::<Vec<_>>()
            .join(", ");
        self.line(format!(
            "\t.method public static {} '{name}' ({params}) {{",
            cil_type(proc.return_type)
        ));

        for constant in &procedure.constants {
            let const_name = &constant.name.lexeme;
            let symbol = proc
                .locals
                .get(const_name)
                .expect("analyzer registered every local");
            self.emit(format!(
                ".locals init ({} '{const_name}')",
                cil_type(symbol.symbol_type)
            ));
            self.gen_value(&symbol.value);
            self.emit(format!("stloc '{const_name}'"));
        }

        for variable in &procedure.variables {
            let var_type = proc
                .locals
                .get(&variable.names[0].lexeme)
                .expect("analyzer registered every local")
                .symbol_type;
            let locals = variable
                .names
                .iter()
                .map(|var_name| format!("{} '{}'", cil_type(var_type), var_name.lexeme))
                .collect::<Vec<_>>()
                .join(", ");
            self.emit(format!(".locals init ({locals})"));
        }

        for statement in &procedure.statements {
            self.gen_statement(statement, Scope::Local(&name));
        }
        self.emit("ret");
        self.line("\t}");
        self.line("");
    }

    fn gen_statement(&mut self, statement: &Statement, scope: Scope) {
        match statement {
            Statement::Assignment { target, value, .. } => match target {
                AssignmentTarget::Name(name) => {
                    self.gen_expression(value, scope);
                    self.gen_store(&name.lexeme, scope);
                }
                AssignmentTarget::Index { name, index } => {
                    let element_type = self
                        .resolve(&name.lexeme, scope)
                        .symbol_type()
                        .element_type();
                    self.gen_load(&name.lexeme, scope);
                    self.gen_expression(index, scope);
                    self.gen_expression(value, scope);
                    self.emit(stelem(element_type));
                }
            },
            Statement::Call { name, arguments } => {
                for argument in arguments {
                    self.gen_expression(argument, scope);
                }
                self.emit_call(&name.lexeme);
            }
            Statement::If { clauses, else_body } => {
                let end_label = self.new_label();
                for clause in clauses {
                    let next_clause_label = self.new_label();
                    self.gen_expression(&clause.condition, scope);
                    self.emit(format!("brfalse {next_clause_label}"));
                    for inner in &clause.body {
                        self.gen_statement(inner, scope);
                    }
                    self.emit(format!("br {end_label}"));
                    self.emit_label(&next_clause_label);
                }
                for inner in else_body {
                    self.gen_statement(inner, scope);
                }
                self.emit_label(&end_label);
            }
            Statement::Loop { body, .. } => {
                let start_label = self.new_label();
                let end_label = self.new_label();
                self.emit_label(&start_label);
                self.loop_labels.push(end_label.clone());
                for inner in body {
                    self.gen_statement(inner, scope);
                }
                self.loop_labels.pop();
                self.emit(format!("br {start_label}"));
                self.emit_label(&end_label);
            }
            Statement::For {
                variable,
                iterable,
                body,
                ..
            } => self.gen_for(variable.lexeme.as_str(), iterable, body, scope),
            Statement::Return { value, .. } => {
                if let Some(value) = value {
                    self.gen_expression(value, scope);
                }
                self.emit("ret");
            }
            Statement::Exit { .. } => {
                let end_label = self
                    .loop_labels
                    .last()
                    .expect("analyzer kept exit inside loops")
                    .clone();
                self.emit(format!("br {end_label}"));
            }
        }
    }

    /// Iteration over a list is lowered through two hidden locals, named
    /// off a fresh label so they cannot collide with source identifiers.
    fn gen_for(&mut self, variable: &str, iterable: &Expression, body: &[Statement], scope: Scope) {
        let tag = self.new_label();
        let list_local = format!("{tag}_list");
        let index_local = format!("{tag}_idx");
        let start_label = self.new_label();
        let end_label = self.new_label();

        let list_type = self.expression_type(iterable, scope);
        self.emit(format!(
            ".locals init ({} '{list_local}', int32 '{index_local}')",
            cil_type(list_type)
        ));
        self.gen_expression(iterable, scope);
        self.emit(format!("stloc '{list_local}'"));
        self.emit("ldc.i4.0");
        self.emit(format!("stloc '{index_local}'"));

        self.emit_label(&start_label);
        self.emit(format!("ldloc '{index_local}'"));
        self.emit(format!("ldloc '{list_local}'"));
        self.emit("ldlen");
        self.emit("conv.i4");
        self.emit("clt");
        self.emit(format!("brfalse {end_label}"));

        self.emit(format!("ldloc '{list_local}'"));
        self.emit(format!("ldloc '{index_local}'"));
        self.emit(ldelem(list_type.element_type()));
        self.gen_store(variable, scope);

        self.loop_labels.push(end_label.clone());
        for statement in body {
            self.gen_statement(statement, scope);
        }
        self.loop_labels.pop();

        self.emit(format!("ldloc '{index_local}'"));
        self.emit("ldc.i4.1");
        self.emit("add");
        self.emit(format!("stloc '{index_local}'"));
        self.emit(format!("br {start_label}"));
        self.emit_label(&end_label);
    }

    fn gen_load(&mut self, name: &str, scope: Scope) {
        match self.resolve(name, scope) {
            Storage::Static(symbol_type) => self.emit(format!(
                "ldsfld {} 'ChimeraProgram'::'{name}'",
                cil_type(symbol_type)
            )),
            Storage::Local(_) => self.emit(format!("ldloc '{name}'")),
            Storage::Argument(_) => self.emit(format!("ldarg '{name}'")),
        }
    }

    fn gen_store(&mut self, name: &str, scope: Scope) {
        match self.resolve(name, scope) {
            Storage::Static(symbol_type) => self.emit(format!(
                "stsfld {} 'ChimeraProgram'::'{name}'",
                cil_type(symbol_type)
            )),
            Storage::Local(_) => self.emit(format!("stloc '{name}'")),
            Storage::Argument(_) => self.emit(format!("starg '{name}'")),
        }
    }

    fn emit_call(&mut self, name: &str) {
        let proc = self.procedure(name);
        let signature = proc
            .parameters()
            .iter()
            .map(|(_, symbol)| cil_type(symbol.symbol_type))
            .collect::<Vec<_>>()
            .join(",");
        let return_type = cil_type(proc.return_type);
        let target = if proc.is_predefined {
            format!("['chimeralib']'Chimera'.'Utils'::'{name}'")
        } else {
            format!("'ChimeraProgram'::'{name}'")
        };
        self.emit(format!("call {return_type} class {target}({signature})"));
    }

    fn gen_expression(&mut self, expression: &Expression, scope: Scope) {
        match expression {
            Expression::Binary {
                op, left, right, ..
            } => self.gen_binary(*op, left, right, scope),
            Expression::Unary { op, operand, .. } => {
                self.gen_expression(operand, scope);
                match op {
                    UnaryOp::Not => {
                        self.emit("ldc.i4.0");
                        self.emit("ceq");
                    }
                    UnaryOp::Negative => self.emit("neg"),
                }
            }
            Expression::Index { base, index, .. } => {
                let element_type = self.expression_type(base, scope).element_type();
                self.gen_expression(base, scope);
                self.gen_expression(index, scope);
                self.emit(ldelem(element_type));
            }
            Expression::Call { name, arguments } => {
                for argument in arguments {
                    self.gen_expression(argument, scope);
                }
                self.emit_call(&name.lexeme);
            }
            Expression::Identifier(name) => self.gen_load(&name.lexeme, scope),
            Expression::Literal(literal) => self.gen_literal(literal),
        }
    }

    fn gen_binary(&mut self, op: BinaryOp, left: &Expression, right: &Expression, scope: Scope) {
        match op {
            // Short-circuit: the right operand must not run when the left
            // one already decides the result.
            BinaryOp::And | BinaryOp::Or => {
                let label = self.new_label();
                let (branch, combine) = match op {
                    BinaryOp::And => ("brfalse", "and"),
                    _ => ("brtrue", "or"),
                };
                self.gen_expression(left, scope);
                self.emit("dup");
                self.emit(format!("{branch} {label}"));
                self.gen_expression(right, scope);
                self.emit(combine);
                self.emit_label(&label);
            }
            BinaryOp::SmallerEq | BinaryOp::GreaterEq => {
                let label = self.new_label();
                let branch = match op {
                    BinaryOp::SmallerEq => "ble",
                    _ => "bge",
                };
                self.emit("ldc.i4.1");
                self.gen_expression(left, scope);
                self.gen_expression(right, scope);
                self.emit(format!("{branch} {label}"));
                self.emit("pop");
                self.emit("ldc.i4.0");
                self.emit_label(&label);
            }
            BinaryOp::NotEqual => {
                self.gen_expression(left, scope);
                self.gen_expression(right, scope);
                self.emit("ceq");
                self.emit("ldc.i4.0");
                self.emit("ceq");
            }
            _ => {
                let instruction = match op {
                    BinaryOp::Xor => "xor",
                    BinaryOp::Equal => "ceq",
                    BinaryOp::Smaller => "clt",
                    BinaryOp::Greater => "cgt",
                    BinaryOp::Plus => "add.ovf",
                    BinaryOp::Minus => "sub.ovf",
                    BinaryOp::Mul => "mul.ovf",
                    BinaryOp::Div => "div",
                    BinaryOp::Rem => "rem",
                    _ => unreachable!("handled above"),
                };
                self.gen_expression(left, scope);
                self.gen_expression(right, scope);
                self.emit(instruction);
            }
        }
    }

    fn gen_literal(&mut self, literal: &Literal) {
        match literal {
            Literal::Integer(token) => {
                let value: i32 = token
                    .lexeme
                    .parse()
                    .expect("analyzer checked every integer literal");
                self.emit(format!("ldc.i4 {value}"));
            }
            Literal::Str(token) => self.emit(format!("ldstr \"{}\"", escape(&token.lexeme))),
            Literal::True(_) => self.emit("ldc.i4.1"),
            Literal::False(_) => self.emit("ldc.i4.0"),
            Literal::List(_, elements) => {
                // The empty list never type-checks in expression position.
                let element_type = match &elements[0] {
                    Literal::Integer(_) => Type::Integer,
                    Literal::Str(_) => Type::String,
                    Literal::True(_) | Literal::False(_) => Type::Boolean,
                    Literal::List(..) => unreachable!("list elements are simple literals"),
                };
                self.emit(format!("ldc.i4 {}", elements.len()));
                self.emit(format!("newarr {}", newarr_type(element_type)));
                for (i, element) in elements.iter().enumerate() {
                    self.emit("dup");
                    self.emit(format!("ldc.i4 {i}"));
                    self.gen_literal(element);
                    self.emit(stelem(element_type));
                }
            }
        }
    }

    /// Loads an evaluated constant (or a variable's default) onto the stack.
    fn gen_value(&mut self, value: &Value) {
        match value {
            Value::Bool(true) => self.emit("ldc.i4.1"),
            Value::Bool(false) => self.emit("ldc.i4.0"),
            Value::Int(i) => self.emit(format!("ldc.i4 {i}")),
            Value::Str(s) => self.emit(format!("ldstr \"{}\"", escape(s))),
            Value::BoolList(items) => {
                let items: Vec<Value> = items.iter().map(|&b| Value::Bool(b)).collect();
                self.gen_list_value(Type::Boolean, &items);
            }
            Value::IntList(items) => {
                let items: Vec<Value> = items.iter().map(|&i| Value::Int(i)).collect();
                self.gen_list_value(Type::Integer, &items);
            }
            Value::StrList(items) => {
                let items: Vec<Value> = items.iter().map(|s| Value::Str(s.clone())).collect();
                self.gen_list_value(Type::String, &items);
            }
        }
    }

    fn gen_list_value(&mut self, element_type: Type, items: &[Value]) {
        self.emit(format!("ldc.i4 {}", items.len()));
        self.emit(format!("newarr {}", newarr_type(element_type)));
        for (i, item) in items.iter().enumerate() {
            self.emit("dup");
            self.emit(format!("ldc.i4 {i}"));
            self.gen_value(item);
            self.emit(stelem(element_type));
        }
    }
}
