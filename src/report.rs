//! Structured Diagnostic Report
//!
//! Machine-readable view of one `check_source` run:
//! - which stage stopped the pipeline
//! - every diagnostic with its category and source position

use serde::{Deserialize, Serialize};

use crate::frontend::ast::Program;
use crate::utils::{Category, Error};

/// Pipeline stage that produced the diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Lexing or parsing
    Syntax,
    Semantic,
    /// Nothing failed
    None,
}

/// One diagnostic, positioned in the source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub category: Category,
    pub message: String,
    /// 1-based
    pub line: usize,
    /// 1-based
    pub column: usize,
}

impl Entry {
    pub fn from_error(error: &Error, source: &str) -> Self {
        let (line, column) = error.span().line_col(source);
        Self {
            category: error.category(),
            message: error.to_string(),
            line,
            column,
        }
    }
}

/// Outcome of checking one source file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub success: bool,
    pub stage: Stage,
    pub entries: Vec<Entry>,
}

impl Report {
    /// Report for an accepted program
    pub fn accepted() -> Self {
        Self {
            success: true,
            stage: Stage::None,
            entries: Vec::new(),
        }
    }

    /// Report for a failed run; an empty list counts as accepted
    pub fn from_errors(errors: &[Error], source: &str) -> Self {
        if errors.is_empty() {
            return Self::accepted();
        }

        let stage = if errors.iter().any(|e| e.category() == Category::Semantic) {
            Stage::Semantic
        } else {
            Stage::Syntax
        };

        Self {
            success: false,
            stage,
            entries: errors.iter().map(|e| Entry::from_error(e, source)).collect(),
        }
    }

    /// Build a report straight from the result of `check_source`
    pub fn from_result(result: &std::result::Result<Program, Vec<Error>>, source: &str) -> Self {
        match result {
            Ok(_) => Self::accepted(),
            Err(errors) => Self::from_errors(errors, source),
        }
    }

    /// Human-readable rendering, one `file:line:column: message` line per entry
    pub fn render_text(&self, file: &str) -> String {
        if self.success {
            return format!("{}: no errors found\n", file);
        }
        let mut out = String::new();
        for entry in &self.entries {
            out.push_str(&format!("{}:{}:{}: {}\n", file, entry.line, entry.column, entry.message));
        }
        out.push_str(&format!("{} error(s) in {} stage\n", self.entries.len(), self.stage_name()));
        out
    }

    fn stage_name(&self) -> &'static str {
        match self.stage {
            Stage::Syntax => "syntax",
            Stage::Semantic => "semantic",
            Stage::None => "no",
        }
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}
