use crate::lexer::Token;

/// One complete compilation unit:
/// `("const" CONST_DECL+)? ("var" VAR_DECL+)? PROC_DECL* "program" STATEMENT* "end" ";"`.
#[derive(Clone, Debug, PartialEq)]
pub struct Program {
    pub constants: Vec<ConstantDeclaration>,
    pub variables: Vec<VariableDeclaration>,
    pub procedures: Vec<ProcedureDeclaration>,
    pub statements: Vec<Statement>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ConstantDeclaration {
    pub name: Token,
    pub literal: Literal,
}

#[derive(Clone, Debug, PartialEq)]
pub struct VariableDeclaration {
    pub names: Vec<Token>,
    pub type_spec: TypeSpec,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ParameterDeclaration {
    pub names: Vec<Token>,
    pub type_spec: TypeSpec,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ProcedureDeclaration {
    pub name: Token,
    pub parameters: Vec<ParameterDeclaration>,
    pub return_type: Option<TypeSpec>,
    pub constants: Vec<ConstantDeclaration>,
    pub variables: Vec<VariableDeclaration>,
    pub statements: Vec<Statement>,
}

/// The anchor token is the scalar type keyword, also for list types
/// (`list of integer` anchors at `integer`).
#[derive(Clone, Debug, PartialEq)]
pub enum TypeSpec {
    Simple(Token),
    ListOf(Token),
}

/// Literals as written in source; values are extracted from the lexeme
/// during semantic analysis. List elements are always simple literals.
#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Integer(Token),
    Str(Token),
    True(Token),
    False(Token),
    List(Token, Vec<Literal>),
}

impl Literal {
    pub fn anchor(&self) -> &Token {
        match self {
            Literal::Integer(token)
            | Literal::Str(token)
            | Literal::True(token)
            | Literal::False(token)
            | Literal::List(token, _) => token,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Statement {
    /// `anchor` is the `:=` token.
    Assignment {
        target: AssignmentTarget,
        anchor: Token,
        value: Expression,
    },
    Call {
        name: Token,
        arguments: Vec<Expression>,
    },
    If {
        clauses: Vec<IfClause>,
        else_body: Vec<Statement>,
    },
    Loop {
        anchor: Token,
        body: Vec<Statement>,
    },
    For {
        anchor: Token,
        variable: Token,
        iterable: Expression,
        body: Vec<Statement>,
    },
    Return {
        anchor: Token,
        value: Option<Expression>,
    },
    Exit {
        anchor: Token,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub enum AssignmentTarget {
    Name(Token),
    Index { name: Token, index: Expression },
}

/// One `if`/`elseif` arm; the plain `else` arm lives on `Statement::If`.
#[derive(Clone, Debug, PartialEq)]
pub struct IfClause {
    pub anchor: Token,
    pub condition: Expression,
    pub body: Vec<Statement>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    And,
    Or,
    Xor,
    Equal,
    NotEqual,
    Smaller,
    Greater,
    SmallerEq,
    GreaterEq,
    Plus,
    Minus,
    Mul,
    Div,
    Rem,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Negative,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Expression {
    Binary {
        op: BinaryOp,
        anchor: Token,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Unary {
        op: UnaryOp,
        anchor: Token,
        operand: Box<Expression>,
    },
    /// `anchor` is the `[` token.
    Index {
        anchor: Token,
        base: Box<Expression>,
        index: Box<Expression>,
    },
    Call {
        name: Token,
        arguments: Vec<Expression>,
    },
    Identifier(Token),
    Literal(Literal),
}

impl Expression {
    pub fn anchor(&self) -> &Token {
        match self {
            Expression::Binary { anchor, .. }
            | Expression::Unary { anchor, .. }
            | Expression::Index { anchor, .. } => anchor,
            Expression::Call { name, .. } => name,
            Expression::Identifier(token) => token,
            Expression::Literal(literal) => literal.anchor(),
        }
    }
}
