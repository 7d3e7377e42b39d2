pub mod analyzer;
pub mod codegen;
pub mod error;
pub mod lexer;
pub mod parser;

use analyzer::SemanticAnalyzer;
use codegen::CilGenerator;
use error::Error;
use lexer::Scanner;
use parser::Parser;

/// Runs the whole pipeline over one source text and returns the CIL
/// listing, stopping at the first syntax or semantic error.
pub fn compile(source: &str) -> Result<String, Error> {
    let tokens = Scanner::scan(source);

    let mut parser = Parser::new(tokens);
    let program = parser.parse()?;

    let analyzer = SemanticAnalyzer::new();
    let (gs_table, gp_table) = analyzer.analyze(&program)?;

    let codegen = CilGenerator::new(gs_table, gp_table);
    Ok(codegen.generate(&program))
}
