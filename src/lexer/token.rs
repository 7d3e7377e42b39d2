use std::fmt;

use phf::{phf_map, Map};

/// Keyword spellings and their categories. Identifiers are looked up here
/// before being classified as plain identifiers.
pub static KEYWORDS: Map<&'static str, TokenCategory> = phf_map! {
    "and" => TokenCategory::And,
    "begin" => TokenCategory::Begin,
    "boolean" => TokenCategory::Boolean,
    "const" => TokenCategory::Const,
    "div" => TokenCategory::Div,
    "do" => TokenCategory::Do,
    "else" => TokenCategory::Else,
    "elseif" => TokenCategory::ElseIf,
    "end" => TokenCategory::End,
    "exit" => TokenCategory::Exit,
    "false" => TokenCategory::False,
    "for" => TokenCategory::For,
    "if" => TokenCategory::If,
    "in" => TokenCategory::In,
    "integer" => TokenCategory::Integer,
    "list" => TokenCategory::List,
    "loop" => TokenCategory::Loop,
    "not" => TokenCategory::Not,
    "of" => TokenCategory::Of,
    "or" => TokenCategory::Or,
    "procedure" => TokenCategory::Procedure,
    "program" => TokenCategory::Program,
    "rem" => TokenCategory::Rem,
    "return" => TokenCategory::Return,
    "string" => TokenCategory::String,
    "then" => TokenCategory::Then,
    "true" => TokenCategory::True,
    "var" => TokenCategory::Var,
    "xor" => TokenCategory::Xor,
};

pub static TWO_CHAR_SYMBOLS: Map<&'static str, TokenCategory> = phf_map! {
    ":=" => TokenCategory::AssignConst,
    ">=" => TokenCategory::GreaterEq,
    "<=" => TokenCategory::SmallerEq,
    "<>" => TokenCategory::NotEqual,
};

pub static ONE_CHAR_SYMBOLS: Map<char, TokenCategory> = phf_map! {
    ':' => TokenCategory::Colon,
    ',' => TokenCategory::Comma,
    '=' => TokenCategory::Equal,
    '>' => TokenCategory::Greater,
    '{' => TokenCategory::LeftBraces,
    '(' => TokenCategory::LeftPar,
    '[' => TokenCategory::LeftSqrBrack,
    '-' => TokenCategory::Minus,
    '*' => TokenCategory::Mul,
    '+' => TokenCategory::Plus,
    '}' => TokenCategory::RightBraces,
    ')' => TokenCategory::RightPar,
    ']' => TokenCategory::RightSqrBrack,
    ';' => TokenCategory::Semicolon,
    '<' => TokenCategory::Smaller,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenCategory {
    And,
    AssignConst,
    Begin,
    Boolean,
    Colon,
    Comma,
    Const,
    Div,
    Do,
    Else,
    ElseIf,
    End,
    Eof,
    Equal,
    Exit,
    False,
    For,
    Greater,
    GreaterEq,
    Identifier,
    If,
    IllegalChar,
    In,
    IntLiteral,
    Integer,
    LeftBraces,
    LeftPar,
    LeftSqrBrack,
    List,
    Loop,
    Minus,
    Mul,
    Not,
    NotEqual,
    Of,
    Or,
    Plus,
    Procedure,
    Program,
    Rem,
    Return,
    RightBraces,
    RightPar,
    RightSqrBrack,
    Semicolon,
    Smaller,
    SmallerEq,
    StrLiteral,
    String,
    Then,
    True,
    Var,
    Xor,
}

impl fmt::Display for TokenCategory {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            TokenCategory::And => "AND",
            TokenCategory::AssignConst => "ASSIGN_CONST",
            TokenCategory::Begin => "BEGIN",
            TokenCategory::Boolean => "BOOLEAN",
            TokenCategory::Colon => "COLON",
            TokenCategory::Comma => "COMMA",
            TokenCategory::Const => "CONST",
            TokenCategory::Div => "DIV",
            TokenCategory::Do => "DO",
            TokenCategory::Else => "ELSE",
            TokenCategory::ElseIf => "ELSEIF",
            TokenCategory::End => "END",
            TokenCategory::Eof => "EOF",
            TokenCategory::Equal => "EQUAL",
            TokenCategory::Exit => "EXIT",
            TokenCategory::False => "FALSE",
            TokenCategory::For => "FOR",
            TokenCategory::Greater => "GREATER",
            TokenCategory::GreaterEq => "GREATER_EQ",
            TokenCategory::Identifier => "IDENTIFIER",
            TokenCategory::If => "IF",
            TokenCategory::IllegalChar => "ILLEGAL_CHAR",
            TokenCategory::In => "IN",
            TokenCategory::IntLiteral => "INT_LITERAL",
            TokenCategory::Integer => "INTEGER",
            TokenCategory::LeftBraces => "LEFT_BRACES",
            TokenCategory::LeftPar => "LEFT_PAR",
            TokenCategory::LeftSqrBrack => "LEFT_SQR_BRACK",
            TokenCategory::List => "LIST",
            TokenCategory::Loop => "LOOP",
            TokenCategory::Minus => "MINUS",
            TokenCategory::Mul => "MUL",
            TokenCategory::Not => "NOT",
            TokenCategory::NotEqual => "NOT_EQUAL",
            TokenCategory::Of => "OF",
            TokenCategory::Or => "OR",
            TokenCategory::Plus => "PLUS",
            TokenCategory::Procedure => "PROCEDURE",
            TokenCategory::Program => "PROGRAM",
            TokenCategory::Rem => "REM",
            TokenCategory::Return => "RETURN",
            TokenCategory::RightBraces => "RIGHT_BRACES",
            TokenCategory::RightPar => "RIGHT_PAR",
            TokenCategory::RightSqrBrack => "RIGHT_SQR_BRACK",
            TokenCategory::Semicolon => "SEMICOLON",
            TokenCategory::Smaller => "SMALLER",
            TokenCategory::SmallerEq => "SMALLER_EQ",
            TokenCategory::StrLiteral => "STR_LITERAL",
            TokenCategory::String => "STRING",
            TokenCategory::Then => "THEN",
            TokenCategory::True => "TRUE",
            TokenCategory::Var => "VAR",
            TokenCategory::Xor => "XOR",
        })
    }
}

/// One lexical unit. For string literals the lexeme holds the unescaped
/// content (`""` collapsed to `"`); the EOF sentinel carries an empty lexeme.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub category: TokenCategory,
    pub lexeme: String,
    pub row: usize,
    pub column: usize,
}

impl Token {
    pub fn new(category: TokenCategory, lexeme: impl Into<String>, row: usize, column: usize) -> Self {
        Self {
            category,
            lexeme: lexeme.into(),
            row,
            column,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{{{}, \"{}\", @({}, {})}}",
            self.category, self.lexeme, self.row, self.column
        )
    }
}
