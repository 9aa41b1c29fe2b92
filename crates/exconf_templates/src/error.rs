//! Error types for templates.

use std::fmt;

use thiserror::Error;

/// Result type alias for template operations.
pub type TemplateResult<T> = Result<T, TemplateError>;

/// A placeholder that could not be resolved, with the 1-based line it was found on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingVariable {
    pub line: usize,
    pub name: String,
}

impl MissingVariable {
    pub fn new(line: usize, name: impl Into<String>) -> Self {
        Self {
            line,
            name: name.into(),
        }
    }
}

impl fmt::Display for MissingVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.line, self.name)
    }
}

/// Errors that can occur during template operations.
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Cannot replace variable(s) in template (line, name): {}", format_missing(.0))]
    MissingVariables(Vec<MissingVariable>),

    #[error("Variable substitution did not converge after {passes} passes (cyclic reference?)")]
    DidNotConverge { passes: usize },

    #[error("Invalid file name template in '{file}': {message}")]
    InvalidFilenameVariable { file: String, message: String },

    #[error("Invalid template syntax: {0}")]
    InvalidSyntax(String),

    #[error("Failed to expand variable '{key}': {source}")]
    Mapping {
        key: String,
        #[source]
        source: Box<TemplateError>,
    },
}

impl TemplateError {
    /// Missing placeholders carried by this error, looking through mapping failures.
    pub fn missing_variables(&self) -> &[MissingVariable] {
        match self {
            Self::MissingVariables(missing) => missing,
            Self::Mapping { source, .. } => source.missing_variables(),
            _ => &[],
        }
    }
}

fn format_missing(missing: &[MissingVariable]) -> String {
    missing
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
