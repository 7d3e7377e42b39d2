use crate::lexer::{Token, TokenCategory};

/// Top-level compiler error: one terminal failure per run, no recovery.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    Semantic(#[from] SemanticError),
}

/// Raised by the parser when the current token is not in the expected
/// set. Carries the whole candidate set and the offending token.
#[derive(thiserror::Error, Debug)]
#[error(
    "Syntax Error: expecting {} but found {} \"{}\" at row {}, column {}.",
    expected_names(.expected),
    .found.category,
    .found.lexeme,
    .found.row,
    .found.column
)]
pub struct SyntaxError {
    pub expected: Vec<TokenCategory>,
    pub found: Token,
}

impl SyntaxError {
    pub fn new(expected: &[TokenCategory], found: &Token) -> Self {
        Self {
            expected: expected.to_vec(),
            found: found.clone(),
        }
    }
}

fn expected_names(expected: &[TokenCategory]) -> String {
    let names: Vec<String> = expected.iter().map(|c| c.to_string()).collect();
    if names.len() == 1 {
        names.into_iter().next().unwrap_or_default()
    } else {
        format!("one of [{}]", names.join(", "))
    }
}

/// Raised by the semantic analyzer on the first rule violation, anchored
/// at the token of the offending construct.
#[derive(thiserror::Error, Debug)]
#[error("Semantic Error: {message} at row {row}, column {column}.")]
pub struct SemanticError {
    pub message: String,
    pub row: usize,
    pub column: usize,
}

impl SemanticError {
    pub fn new(message: impl Into<String>, token: &Token) -> Self {
        Self {
            message: message.into(),
            row: token.row,
            column: token.column,
        }
    }
}
