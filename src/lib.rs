//! tinyjs
//!
//! Front end for a small JavaScript-like language: lexing, parsing with error
//! recovery, and semantic analysis over nested scopes.

pub mod frontend;
pub mod report;
pub mod stdlib;
pub mod types;
pub mod utils;

use log::debug;

use frontend::ast::Program;
use frontend::parser::parse;
use frontend::semantic::SemanticAnalyzer;
use utils::Error;

/// Check a source string end to end
///
/// Returns the validated tree, or every diagnostic of the first stage that
/// failed. Syntax errors stop the pipeline before semantic analysis.
pub fn check_source(source: &str) -> std::result::Result<Program, Vec<Error>> {
    let (program, errors) = parse(source);
    if !errors.is_empty() {
        debug!("syntax stage failed with {} error(s)", errors.len());
        return Err(errors);
    }

    let errors = SemanticAnalyzer::new().analyze(&program);
    if !errors.is_empty() {
        return Err(errors);
    }

    debug!("accepted program with {} statement(s)", program.statements.len());
    Ok(program)
}
