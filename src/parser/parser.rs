use crate::error::SyntaxError;
use crate::lexer::{Token, TokenCategory};

use super::{
    AssignmentTarget, BinaryOp, ConstantDeclaration, Expression, IfClause, Literal,
    ParameterDeclaration, ProcedureDeclaration, Program, Statement, TypeSpec, UnaryOp,
    VariableDeclaration,
};

type ParseResult<T> = Result<T, SyntaxError>;

const FIRST_OF_STATEMENT: &[TokenCategory] = &[
    TokenCategory::Identifier,
    TokenCategory::If,
    TokenCategory::Loop,
    TokenCategory::For,
    TokenCategory::Return,
    TokenCategory::Exit,
];

const FIRST_OF_LITERAL: &[TokenCategory] = &[
    TokenCategory::IntLiteral,
    TokenCategory::StrLiteral,
    TokenCategory::True,
    TokenCategory::False,
    TokenCategory::LeftBraces,
];

const SIMPLE_LITERALS: &[TokenCategory] = &[
    TokenCategory::IntLiteral,
    TokenCategory::StrLiteral,
    TokenCategory::True,
    TokenCategory::False,
];

const FIRST_OF_TYPE: &[TokenCategory] = &[
    TokenCategory::Integer,
    TokenCategory::String,
    TokenCategory::Boolean,
    TokenCategory::List,
];

const SIMPLE_TYPES: &[TokenCategory] = &[
    TokenCategory::Integer,
    TokenCategory::String,
    TokenCategory::Boolean,
];

const FIRST_OF_EXPRESSION: &[TokenCategory] = &[
    TokenCategory::Not,
    TokenCategory::Minus,
    TokenCategory::LeftPar,
    TokenCategory::Identifier,
    TokenCategory::IntLiteral,
    TokenCategory::StrLiteral,
    TokenCategory::True,
    TokenCategory::False,
    TokenCategory::LeftBraces,
];

const FIRST_OF_SIMPLE_EXPRESSION: &[TokenCategory] = &[
    TokenCategory::LeftPar,
    TokenCategory::Identifier,
    TokenCategory::IntLiteral,
    TokenCategory::StrLiteral,
    TokenCategory::True,
    TokenCategory::False,
    TokenCategory::LeftBraces,
];

const LOGIC_OPERATORS: &[TokenCategory] =
    &[TokenCategory::And, TokenCategory::Or, TokenCategory::Xor];

const RELATIONAL_OPERATORS: &[TokenCategory] = &[
    TokenCategory::Equal,
    TokenCategory::NotEqual,
    TokenCategory::Smaller,
    TokenCategory::Greater,
    TokenCategory::SmallerEq,
    TokenCategory::GreaterEq,
];

const SUM_OPERATORS: &[TokenCategory] = &[TokenCategory::Plus, TokenCategory::Minus];

const MUL_OPERATORS: &[TokenCategory] =
    &[TokenCategory::Mul, TokenCategory::Div, TokenCategory::Rem];

/// Recursive-descent LL(1) parser over an EOF-terminated token stream,
/// one method per grammar production. The FIRST sets above drive every
/// alternative and loop-continuation decision with one token of
/// lookahead; `expect` is the only primitive that consumes tokens.
#[derive(Debug)]
pub struct Parser {
    tokens: Vec<Token>,
    index: usize,
}

impl Parser {
    /// `tokens` should end with the `Eof` sentinel, as produced by the
    /// scanner; one is appended if missing.
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|token| token.category) != Some(TokenCategory::Eof) {
            let (row, column) = tokens
                .last()
                .map_or((1, 1), |token| (token.row, token.column + token.lexeme.len()));
            tokens.push(Token::new(TokenCategory::Eof, "", row, column));
        }
        Self { tokens, index: 0 }
    }

    pub fn parse(&mut self) -> ParseResult<Program> {
        self.program()
    }

    fn current(&self) -> &Token {
        &self.tokens[self.index.min(self.tokens.len() - 1)]
    }

    fn current_category(&self) -> TokenCategory {
        self.current().category
    }

    fn advance(&mut self) {
        self.index = (self.index + 1).min(self.tokens.len() - 1);
    }

    fn expect(&mut self, category: TokenCategory) -> ParseResult<Token> {
        if self.current_category() == category {
            let token = self.current().clone();
            self.advance();
            Ok(token)
        } else {
            Err(SyntaxError::new(&[category], self.current()))
        }
    }

    /// PROGRAM ::= ("const" CONST_DECL+)? ("var" VAR_DECL+)? PROC_DECL*
    ///             "program" STATEMENT* "end" ";"
    fn program(&mut self) -> ParseResult<Program> {
        let mut constants = vec![];
        if self.current_category() == TokenCategory::Const {
            self.expect(TokenCategory::Const)?;
            loop {
                constants.push(self.constant_declaration()?);
                if self.current_category() != TokenCategory::Identifier {
                    break;
                }
            }
        }

        let mut variables = vec![];
        if self.current_category() == TokenCategory::Var {
            self.expect(TokenCategory::Var)?;
            loop {
                variables.push(self.variable_declaration()?);
                if self.current_category() != TokenCategory::Identifier {
                    break;
                }
            }
        }

        let mut procedures = vec![];
        while self.current_category() == TokenCategory::Procedure {
            procedures.push(self.procedure_declaration()?);
        }

        self.expect(TokenCategory::Program)?;
        let statements = self.statement_list()?;
        self.expect(TokenCategory::End)?;
        self.expect(TokenCategory::Semicolon)?;
        self.expect(TokenCategory::Eof)?;

        Ok(Program {
            constants,
            variables,
            procedures,
            statements,
        })
    }

    /// CONST_DECL ::= IDENTIFIER ":=" LITERAL ";"
    fn constant_declaration(&mut self) -> ParseResult<ConstantDeclaration> {
        let name = self.expect(TokenCategory::Identifier)?;
        self.expect(TokenCategory::AssignConst)?;
        let literal = self.literal()?;
        self.expect(TokenCategory::Semicolon)?;
        Ok(ConstantDeclaration { name, literal })
    }

    /// VAR_DECL ::= IDENTIFIER ("," IDENTIFIER)* ":" TYPE ";"
    fn variable_declaration(&mut self) -> ParseResult<VariableDeclaration> {
        let mut names = vec![self.expect(TokenCategory::Identifier)?];
        while self.current_category() == TokenCategory::Comma {
            self.expect(TokenCategory::Comma)?;
            names.push(self.expect(TokenCategory::Identifier)?);
        }
        self.expect(TokenCategory::Colon)?;
        let type_spec = self.type_spec()?;
        self.expect(TokenCategory::Semicolon)?;
        Ok(VariableDeclaration { names, type_spec })
    }

    /// LITERAL ::= SIMPLE_LITERAL | LIST
    fn literal(&mut self) -> ParseResult<Literal> {
        if self.current_category() == TokenCategory::LeftBraces {
            self.list()
        } else if SIMPLE_LITERALS.contains(&self.current_category()) {
            self.simple_literal()
        } else {
            Err(SyntaxError::new(FIRST_OF_LITERAL, self.current()))
        }
    }

    /// SIMPLE_LITERAL ::= INT_LITERAL | STR_LITERAL | TRUE | FALSE
    fn simple_literal(&mut self) -> ParseResult<Literal> {
        match self.current_category() {
            TokenCategory::IntLiteral => {
                Ok(Literal::Integer(self.expect(TokenCategory::IntLiteral)?))
            }
            TokenCategory::StrLiteral => Ok(Literal::Str(self.expect(TokenCategory::StrLiteral)?)),
            TokenCategory::True => Ok(Literal::True(self.expect(TokenCategory::True)?)),
            TokenCategory::False => Ok(Literal::False(self.expect(TokenCategory::False)?)),
            _ => Err(SyntaxError::new(SIMPLE_LITERALS, self.current())),
        }
    }

    /// LIST ::= "{" (SIMPLE_LITERAL ("," SIMPLE_LITERAL)*)? "}"
    fn list(&mut self) -> ParseResult<Literal> {
        let anchor = self.expect(TokenCategory::LeftBraces)?;
        let mut elements = vec![];
        if SIMPLE_LITERALS.contains(&self.current_category()) {
            elements.push(self.simple_literal()?);
            while self.current_category() == TokenCategory::Comma {
                self.expect(TokenCategory::Comma)?;
                elements.push(self.simple_literal()?);
            }
        }
        self.expect(TokenCategory::RightBraces)?;
        Ok(Literal::List(anchor, elements))
    }

    /// TYPE ::= SIMPLE_TYPE | "list" "of" SIMPLE_TYPE
    fn type_spec(&mut self) -> ParseResult<TypeSpec> {
        if self.current_category() == TokenCategory::List {
            self.expect(TokenCategory::List)?;
            self.expect(TokenCategory::Of)?;
            Ok(TypeSpec::ListOf(self.simple_type()?))
        } else if SIMPLE_TYPES.contains(&self.current_category()) {
            Ok(TypeSpec::Simple(self.simple_type()?))
        } else {
            Err(SyntaxError::new(FIRST_OF_TYPE, self.current()))
        }
    }

    /// SIMPLE_TYPE ::= "integer" | "string" | "boolean"
    fn simple_type(&mut self) -> ParseResult<Token> {
        match self.current_category() {
            category if SIMPLE_TYPES.contains(&category) => self.expect(category),
            _ => Err(SyntaxError::new(SIMPLE_TYPES, self.current())),
        }
    }

    /// PROC_DECL ::= "procedure" IDENTIFIER "(" PARAM_DECL* ")" (":" TYPE)? ";"
    ///               ("const" CONST_DECL+)? ("var" VAR_DECL+)?
    ///               "begin" STATEMENT* "end" ";"
    fn procedure_declaration(&mut self) -> ParseResult<ProcedureDeclaration> {
        self.expect(TokenCategory::Procedure)?;
        let name = self.expect(TokenCategory::Identifier)?;

        self.expect(TokenCategory::LeftPar)?;
        let mut parameters = vec![];
        while self.current_category() == TokenCategory::Identifier {
            parameters.push(self.parameter_declaration()?);
        }
        self.expect(TokenCategory::RightPar)?;

        let return_type = if self.current_category() == TokenCategory::Colon {
            self.expect(TokenCategory::Colon)?;
            Some(self.type_spec()?)
        } else {
            None
        };
        self.expect(TokenCategory::Semicolon)?;

        let mut constants = vec![];
        if self.current_category() == TokenCategory::Const {
            self.expect(TokenCategory::Const)?;
            loop {
                constants.push(self.constant_declaration()?);
                if self.current_category() != TokenCategory::Identifier {
                    break;
                }
            }
        }

        let mut variables = vec![];
        if self.current_category() == TokenCategory::Var {
            self.expect(TokenCategory::Var)?;
            loop {
                variables.push(self.variable_declaration()?);
                if self.current_category() != TokenCategory::Identifier {
                    break;
                }
            }
        }

        self.expect(TokenCategory::Begin)?;
        let statements = self.statement_list()?;
        self.expect(TokenCategory::End)?;
        self.expect(TokenCategory::Semicolon)?;

        Ok(ProcedureDeclaration {
            name,
            parameters,
            return_type,
            constants,
            variables,
            statements,
        })
    }

    /// PARAM_DECL ::= IDENTIFIER ("," IDENTIFIER)* ":" TYPE ";"
    fn parameter_declaration(&mut self) -> ParseResult<ParameterDeclaration> {
        let mut names = vec![self.expect(TokenCategory::Identifier)?];
        while self.current_category() == TokenCategory::Comma {
            self.expect(TokenCategory::Comma)?;
            names.push(self.expect(TokenCategory::Identifier)?);
        }
        self.expect(TokenCategory::Colon)?;
        let type_spec = self.type_spec()?;
        self.expect(TokenCategory::Semicolon)?;
        Ok(ParameterDeclaration { names, type_spec })
    }

    fn statement_list(&mut self) -> ParseResult<Vec<Statement>> {
        let mut statements = vec![];
        while FIRST_OF_STATEMENT.contains(&self.current_category()) {
            statements.push(self.statement()?);
        }
        Ok(statements)
    }

    /// STATEMENT ::= (IDENTIFIER (ASS_STAT | CALL_STAT))
    ///             | IF_STAT | LOOP_STAT | FOR_STAT | RET_STAT | EXIT_STAT
    fn statement(&mut self) -> ParseResult<Statement> {
        match self.current_category() {
            TokenCategory::Identifier => {
                let anchor = self.expect(TokenCategory::Identifier)?;
                match self.current_category() {
                    TokenCategory::LeftSqrBrack | TokenCategory::AssignConst => {
                        self.assignment_statement(anchor)
                    }
                    TokenCategory::LeftPar => self.call_statement(anchor),
                    _ => Err(SyntaxError::new(FIRST_OF_STATEMENT, self.current())),
                }
            }
            TokenCategory::If => self.if_statement(),
            TokenCategory::Loop => self.loop_statement(),
            TokenCategory::For => self.for_statement(),
            TokenCategory::Return => self.return_statement(),
            TokenCategory::Exit => self.exit_statement(),
            _ => Err(SyntaxError::new(FIRST_OF_STATEMENT, self.current())),
        }
    }

    /// ASS_STAT ::= ("[" EXPR "]")? ":=" EXPR ";"
    fn assignment_statement(&mut self, name: Token) -> ParseResult<Statement> {
        let target = if self.current_category() == TokenCategory::LeftSqrBrack {
            self.expect(TokenCategory::LeftSqrBrack)?;
            let index = self.expression()?;
            self.expect(TokenCategory::RightSqrBrack)?;
            AssignmentTarget::Index { name, index }
        } else {
            AssignmentTarget::Name(name)
        };

        let anchor = self.expect(TokenCategory::AssignConst)?;
        let value = self.expression()?;
        self.expect(TokenCategory::Semicolon)?;

        Ok(Statement::Assignment {
            target,
            anchor,
            value,
        })
    }

    /// CALL_STAT ::= "(" (EXPR ("," EXPR)*)? ")" ";"
    fn call_statement(&mut self, name: Token) -> ParseResult<Statement> {
        let arguments = self.call_arguments()?;
        self.expect(TokenCategory::Semicolon)?;
        Ok(Statement::Call { name, arguments })
    }

    /// IF_STAT ::= "if" EXPR "then" STATEMENT*
    ///             ("elseif" EXPR "then" STATEMENT*)*
    ///             ("else" STATEMENT*)? "end" ";"
    fn if_statement(&mut self) -> ParseResult<Statement> {
        let anchor = self.expect(TokenCategory::If)?;
        let condition = self.expression()?;
        self.expect(TokenCategory::Then)?;
        let body = self.statement_list()?;
        let mut clauses = vec![IfClause {
            anchor,
            condition,
            body,
        }];

        while self.current_category() == TokenCategory::ElseIf {
            let anchor = self.expect(TokenCategory::ElseIf)?;
            let condition = self.expression()?;
            self.expect(TokenCategory::Then)?;
            let body = self.statement_list()?;
            clauses.push(IfClause {
                anchor,
                condition,
                body,
            });
        }

        let else_body = if self.current_category() == TokenCategory::Else {
            self.expect(TokenCategory::Else)?;
            self.statement_list()?
        } else {
            vec![]
        };

        self.expect(TokenCategory::End)?;
        self.expect(TokenCategory::Semicolon)?;

        Ok(Statement::If { clauses, else_body })
    }

    /// LOOP_STAT ::= "loop" STATEMENT* "end" ";"
    fn loop_statement(&mut self) -> ParseResult<Statement> {
        let anchor = self.expect(TokenCategory::Loop)?;
        let body = self.statement_list()?;
        self.expect(TokenCategory::End)?;
        self.expect(TokenCategory::Semicolon)?;
        Ok(Statement::Loop { anchor, body })
    }

    /// FOR_STAT ::= "for" IDENTIFIER "in" EXPR "do" STATEMENT* "end" ";"
    fn for_statement(&mut self) -> ParseResult<Statement> {
        let anchor = self.expect(TokenCategory::For)?;
        let variable = self.expect(TokenCategory::Identifier)?;
        self.expect(TokenCategory::In)?;
        let iterable = self.expression()?;
        self.expect(TokenCategory::Do)?;
        let body = self.statement_list()?;
        self.expect(TokenCategory::End)?;
        self.expect(TokenCategory::Semicolon)?;
        Ok(Statement::For {
            anchor,
            variable,
            iterable,
            body,
        })
    }

    /// RET_STAT ::= "return" EXPR? ";"
    fn return_statement(&mut self) -> ParseResult<Statement> {
        let anchor = self.expect(TokenCategory::Return)?;
        let value = if FIRST_OF_EXPRESSION.contains(&self.current_category()) {
            Some(self.expression()?)
        } else {
            None
        };
        self.expect(TokenCategory::Semicolon)?;
        Ok(Statement::Return { anchor, value })
    }

    /// EXIT_STAT ::= "exit" ";"
    fn exit_statement(&mut self) -> ParseResult<Statement> {
        let anchor = self.expect(TokenCategory::Exit)?;
        self.expect(TokenCategory::Semicolon)?;
        Ok(Statement::Exit { anchor })
    }

    /// EXPR ::= LOGIC_EXPR
    fn expression(&mut self) -> ParseResult<Expression> {
        self.logic_expression()
    }

    /// LOGIC_EXPR ::= REL_EXPR (("and" | "or" | "xor") REL_EXPR)*
    fn logic_expression(&mut self) -> ParseResult<Expression> {
        let mut expression = self.relational_expression()?;
        while LOGIC_OPERATORS.contains(&self.current_category()) {
            let anchor = self.expect(self.current_category())?;
            let op = match anchor.category {
                TokenCategory::And => BinaryOp::And,
                TokenCategory::Or => BinaryOp::Or,
                _ => BinaryOp::Xor,
            };
            let right = self.relational_expression()?;
            expression = Expression::Binary {
                op,
                anchor,
                left: Box::new(expression),
                right: Box::new(right),
            };
        }
        Ok(expression)
    }

    /// REL_EXPR ::= SUM_EXPR (("=" | "<>" | "<" | ">" | "<=" | ">=") SUM_EXPR)*
    fn relational_expression(&mut self) -> ParseResult<Expression> {
        let mut expression = self.sum_expression()?;
        while RELATIONAL_OPERATORS.contains(&self.current_category()) {
            let anchor = self.expect(self.current_category())?;
            let op = match anchor.category {
                TokenCategory::Equal => BinaryOp::Equal,
                TokenCategory::NotEqual => BinaryOp::NotEqual,
                TokenCategory::Smaller => BinaryOp::Smaller,
                TokenCategory::Greater => BinaryOp::Greater,
                TokenCategory::SmallerEq => BinaryOp::SmallerEq,
                _ => BinaryOp::GreaterEq,
            };
            let right = self.sum_expression()?;
            expression = Expression::Binary {
                op,
                anchor,
                left: Box::new(expression),
                right: Box::new(right),
            };
        }
        Ok(expression)
    }

    /// SUM_EXPR ::= MUL_EXPR (("+" | "-") MUL_EXPR)*
    fn sum_expression(&mut self) -> ParseResult<Expression> {
        let mut expression = self.mul_expression()?;
        while SUM_OPERATORS.contains(&self.current_category()) {
            let anchor = self.expect(self.current_category())?;
            let op = match anchor.category {
                TokenCategory::Plus => BinaryOp::Plus,
                _ => BinaryOp::Minus,
            };
            let right = self.mul_expression()?;
            expression = Expression::Binary {
                op,
                anchor,
                left: Box::new(expression),
                right: Box::new(right),
            };
        }
        Ok(expression)
    }

    /// MUL_EXPR ::= UN_EXPR (("*" | "div" | "rem") UN_EXPR)*
    fn mul_expression(&mut self) -> ParseResult<Expression> {
        let mut expression = self.unary_expression()?;
        while MUL_OPERATORS.contains(&self.current_category()) {
            let anchor = self.expect(self.current_category())?;
            let op = match anchor.category {
                TokenCategory::Mul => BinaryOp::Mul,
                TokenCategory::Div => BinaryOp::Div,
                _ => BinaryOp::Rem,
            };
            let right = self.unary_expression()?;
            expression = Expression::Binary {
                op,
                anchor,
                left: Box::new(expression),
                right: Box::new(right),
            };
        }
        Ok(expression)
    }

    /// UN_EXPR ::= ("not" UN_EXPR) | ("-" UN_EXPR) | SIMP_EXPR
    fn unary_expression(&mut self) -> ParseResult<Expression> {
        match self.current_category() {
            TokenCategory::Not => {
                let anchor = self.expect(TokenCategory::Not)?;
                let operand = self.unary_expression()?;
                Ok(Expression::Unary {
                    op: UnaryOp::Not,
                    anchor,
                    operand: Box::new(operand),
                })
            }
            TokenCategory::Minus => {
                let anchor = self.expect(TokenCategory::Minus)?;
                let operand = self.unary_expression()?;
                Ok(Expression::Unary {
                    op: UnaryOp::Negative,
                    anchor,
                    operand: Box::new(operand),
                })
            }
            category if FIRST_OF_SIMPLE_EXPRESSION.contains(&category) => self.simple_expression(),
            _ => Err(SyntaxError::new(FIRST_OF_EXPRESSION, self.current())),
        }
    }

    /// SIMP_EXPR ::= ("(" EXPR ")" | (IDENTIFIER CALL?) | LITERAL) ("[" EXPR "]")?
    ///
    /// The index suffix applies at most once to the parsed primary; the
    /// grammar has no chained `a[i][j]`.
    fn simple_expression(&mut self) -> ParseResult<Expression> {
        let mut expression = match self.current_category() {
            TokenCategory::LeftPar => {
                self.expect(TokenCategory::LeftPar)?;
                let expression = self.expression()?;
                self.expect(TokenCategory::RightPar)?;
                expression
            }
            TokenCategory::Identifier => {
                let name = self.expect(TokenCategory::Identifier)?;
                if self.current_category() == TokenCategory::LeftPar {
                    let arguments = self.call_arguments()?;
                    Expression::Call { name, arguments }
                } else {
                    Expression::Identifier(name)
                }
            }
            category if FIRST_OF_LITERAL.contains(&category) => {
                Expression::Literal(self.literal()?)
            }
            _ => return Err(SyntaxError::new(FIRST_OF_SIMPLE_EXPRESSION, self.current())),
        };

        if self.current_category() == TokenCategory::LeftSqrBrack {
            let anchor = self.expect(TokenCategory::LeftSqrBrack)?;
            let index = self.expression()?;
            self.expect(TokenCategory::RightSqrBrack)?;
            expression = Expression::Index {
                anchor,
                base: Box::new(expression),
                index: Box::new(index),
            };
        }

        Ok(expression)
    }

    /// CALL ::= "(" (EXPR ("," EXPR)*)? ")"
    fn call_arguments(&mut self) -> ParseResult<Vec<Expression>> {
        self.expect(TokenCategory::LeftPar)?;
        let mut arguments = vec![];
        if FIRST_OF_EXPRESSION.contains(&self.current_category()) {
            arguments.push(self.expression()?);
            while self.current_category() == TokenCategory::Comma {
                self.expect(TokenCategory::Comma)?;
                arguments.push(self.expression()?);
            }
        }
        self.expect(TokenCategory::RightPar)?;
        Ok(arguments)
    }
}
