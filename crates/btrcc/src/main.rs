//! The btrc compiler frontend CLI.
//!
//! Provides the `btrcc` command with the following subcommands:
//!
//! - `btrcc check <file>`  - Lex, parse, and analyze a source file,
//!   printing diagnostics grouped by severity. Exits non-zero if the
//!   file fails to lex/parse or the analyzer reports any error.
//! - `btrcc tokens <file>` - Dump the token stream (add `--json` for
//!   machine-readable output).
//! - `btrcc ast <file>`    - Dump the parsed AST as JSON.

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser as ClapParser, Subcommand};

use btrc_analyzer::diagnostics::render_diagnostic;
use btrc_analyzer::{analyze, Diagnostic, Severity};
use btrc_lexer::Lexer;

#[derive(ClapParser)]
#[command(name = "btrcc", version, about = "The btrc compiler frontend")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a source file and report diagnostics
    Check {
        /// Path to the .btrc source file
        file: PathBuf,
    },
    /// Dump the token stream
    Tokens {
        /// Path to the .btrc source file
        file: PathBuf,

        /// Emit JSON instead of a text table
        #[arg(long)]
        json: bool,
    },
    /// Dump the parsed AST as JSON
    Ast {
        /// Path to the .btrc source file
        file: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check { file } => check(&file),
        Commands::Tokens { file, json } => tokens(&file, json),
        Commands::Ast { file } => ast(&file),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn read_source(path: &Path) -> Result<String, String> {
    std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read '{}': {e}", path.display()))
}

/// Run the full frontend pipeline and report diagnostics. A lex or
/// parse error aborts immediately; analyzer diagnostics are printed
/// grouped by severity, warnings first.
fn check(path: &Path) -> Result<(), String> {
    let source = read_source(path)?;
    let filename = path.display().to_string();

    let tokens = match Lexer::tokenize(&source) {
        Ok(tokens) => tokens,
        Err(e) => {
            let diag = Diagnostic::new(e.kind.to_string(), e.line, e.col);
            eprint!(
                "{}",
                render_diagnostic(&diag, Severity::Error, &source, &filename)
            );
            return Err("Compilation failed due to errors above.".to_string());
        }
    };

    let program = match btrc_parser::parse(tokens) {
        Ok(program) => program,
        Err(e) => {
            let diag = Diagnostic::new(e.message.clone(), e.line, e.col);
            eprint!(
                "{}",
                render_diagnostic(&diag, Severity::Error, &source, &filename)
            );
            return Err("Compilation failed due to errors above.".to_string());
        }
    };

    let analyzed = analyze(program);

    for diag in &analyzed.warnings {
        eprint!(
            "{}",
            render_diagnostic(diag, Severity::Warning, &source, &filename)
        );
    }
    for diag in &analyzed.errors {
        eprint!(
            "{}",
            render_diagnostic(diag, Severity::Error, &source, &filename)
        );
    }

    if !analyzed.is_ok() {
        return Err("Compilation failed due to errors above.".to_string());
    }
    Ok(())
}

/// Dump the token stream for tooling.
fn tokens(path: &Path, json: bool) -> Result<(), String> {
    let source = read_source(path)?;
    let tokens = Lexer::tokenize(&source).map_err(|e| e.to_string())?;
    if json {
        let out = serde_json::to_string_pretty(&tokens)
            .map_err(|e| format!("Failed to serialize tokens: {e}"))?;
        println!("{out}");
    } else {
        for tok in &tokens {
            println!("{}:{}\t{:?}\t{}", tok.line, tok.col, tok.kind, tok.text);
        }
    }
    Ok(())
}

/// Dump the parsed AST as JSON.
fn ast(path: &Path) -> Result<(), String> {
    let source = read_source(path)?;
    let tokens = Lexer::tokenize(&source).map_err(|e| e.to_string())?;
    let program = btrc_parser::parse(tokens).map_err(|e| e.to_string())?;
    let out = serde_json::to_string_pretty(&program)
        .map_err(|e| format!("Failed to serialize AST: {e}"))?;
    println!("{out}");
    Ok(())
}
