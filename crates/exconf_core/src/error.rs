//! Error types for the core module.

use std::path::PathBuf;
use thiserror::Error;

use exconf_templates::TemplateError;

/// Result type alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur during resolution and materialization.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Exconf configuration root not found: {0}")]
    ConfigurationNotFound(String),

    #[error("{kind} directory does not exist: {}", .path.display())]
    DirectoryMissing { kind: &'static str, path: PathBuf },

    #[error("Template type (var {0}) not defined")]
    TemplateTypeUndefined(&'static str),

    #[error("Invalid extra variable input string (key=value required): {0}")]
    InvalidExtraVariable(String),

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    #[error("Setting '{0}' not defined")]
    MissingSetting(&'static str),

    #[error("Invalid variable file {}: {message}", .path.display())]
    InvalidLayerFile { path: PathBuf, message: String },

    #[error("Failed to populate template file {}: {source}", .path.display())]
    TemplateFile {
        path: PathBuf,
        #[source]
        source: TemplateError,
    },

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl CoreError {
    /// The template error behind this error, if any.
    pub fn template_error(&self) -> Option<&TemplateError> {
        match self {
            Self::Template(err) | Self::TemplateFile { source: err, .. } => Some(err),
            _ => None,
        }
    }
}
