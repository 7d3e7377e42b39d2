use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser as ClapParser;
use clap_stdin::FileOrStdin;

use chimerac::analyzer::SemanticAnalyzer;
use chimerac::codegen::CilGenerator;
use chimerac::lexer::Scanner;
use chimerac::parser::Parser;

#[derive(ClapParser, Debug)]
#[command(version, about = "Compiles Chimera source code to CIL")]
struct Args {
    /// Chimera source file, or `-` to read from stdin
    input: FileOrStdin,

    /// Write the CIL listing to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Dump the symbol and procedure tables to stderr
    #[arg(long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let source = match args.input.contents().context("failed to read input") {
        Ok(source) => source,
        Err(e) => {
            eprintln!("{e:#}");
            return ExitCode::from(1);
        }
    };

    let tokens = Scanner::scan(&source);

    let mut parser = Parser::new(tokens);
    let program = match parser.parse() {
        Ok(program) => program,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(2);
        }
    };

    let (gs_table, gp_table) = match SemanticAnalyzer::new().analyze(&program) {
        Ok(tables) => tables,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::from(3);
        }
    };

    if args.verbose {
        eprint!("{gs_table}");
        eprint!("{gp_table}");
    }

    let cil = CilGenerator::new(gs_table, gp_table).generate(&program);

    let result = match &args.output {
        Some(path) => {
            fs::write(path, &cil).with_context(|| format!("failed to write {}", path.display()))
        }
        None => {
            print!("{cil}");
            Ok(())
        }
    };
    if let Err(e) = result {
        eprintln!("{e:#}");
        return ExitCode::from(1);
    }

    ExitCode::SUCCESS
}
