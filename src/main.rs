//! tinyjs checker
//!
//! Command-line driver around the tinyjs front end.

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::debug;

use tinyjs::check_source;
use tinyjs::frontend::lexer::Lexer;
use tinyjs::report::Report;

/// tinyjs front-end checker
#[derive(Parser, Debug)]
#[command(name = "tjsc")]
#[command(author = "Z1529")]
#[command(version = "0.1.0")]
#[command(about = "Lex, parse and analyze tinyjs programs")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check a source file for syntax and semantic errors
    Check {
        /// Input source file
        input: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: Format,
    },

    /// Dump the token stream of a source file
    Tokens {
        /// Input source file
        input: PathBuf,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Format {
    Text,
    Json,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Check { input, format } => check_file(input, *format),
        Commands::Tokens { input } => dump_tokens(input),
    };

    match result {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}

fn read_source(input: &Path) -> Result<String> {
    fs::read_to_string(input).with_context(|| format!("failed to read {}", input.display()))
}

/// Check a source file, returning whether it was accepted
fn check_file(input: &Path, format: Format) -> Result<bool> {
    let source = read_source(input)?;
    debug!("checking {} ({} bytes)", input.display(), source.len());

    let report = Report::from_result(&check_source(&source), &source);
    match format {
        Format::Text => {
            let text = report.render_text(&input.display().to_string());
            if report.success {
                print!("{}", text);
            } else {
                eprint!("{}", text);
            }
        }
        Format::Json => println!("{}", report.to_json()),
    }

    Ok(report.success)
}

/// Print one token per line, then any lexical errors
fn dump_tokens(input: &Path) -> Result<bool> {
    let source = read_source(input)?;

    let mut lexer = Lexer::new(&source);
    for token in lexer.tokenize() {
        println!("{}", token);
    }

    let errors = lexer.take_errors();
    for e in &errors {
        eprintln!("{}", e);
    }
    Ok(errors.is_empty())
}
