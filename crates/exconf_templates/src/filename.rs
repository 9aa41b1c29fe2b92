//! File name templating.
//!
//! Template file names may embed variables between symmetric tokens, e.g.
//! `___service___-config.yaml`. Substitutes are restricted to characters that
//! are safe in a file name.

use regex::Regex;

use crate::error::{TemplateError, TemplateResult};
use crate::renderer::MAX_SUBSTITUTION_PASSES;
use crate::variables::{lookup, VariableMap};

/// Expands variables embedded in file names.
#[derive(Debug, Clone)]
pub struct FilenameTemplater {
    prefix: String,
    suffix: String,
    safe_pattern: Regex,
}

const SAFE_SUBSTITUTE: &str = r"^[-_.A-Za-z0-9]*$";

fn safe_pattern() -> Regex {
    Regex::new(SAFE_SUBSTITUTE).expect("file name pattern is a valid regex")
}

impl Default for FilenameTemplater {
    fn default() -> Self {
        Self {
            prefix: "___".to_string(),
            suffix: "___".to_string(),
            safe_pattern: safe_pattern(),
        }
    }
}

impl FilenameTemplater {
    /// Create a templater with the given tokens. Fails if either token is empty.
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> TemplateResult<Self> {
        let prefix = prefix.into();
        let suffix = suffix.into();
        if prefix.is_empty() || suffix.is_empty() {
            return Err(TemplateError::InvalidSyntax(format!(
                "file name tokens must not be empty (prefix '{}', suffix '{}')",
                prefix, suffix
            )));
        }
        Ok(Self {
            prefix,
            suffix,
            safe_pattern: safe_pattern(),
        })
    }

    /// Expand every token in `name`.
    ///
    /// Scanning restarts from the beginning of the name after each
    /// substitution, so a substitute that forms a new token is expanded as
    /// well. Gives up with [`TemplateError::DidNotConverge`] after
    /// [`MAX_SUBSTITUTION_PASSES`] substitutions.
    pub fn expand(&self, name: &str, variables: &VariableMap) -> TemplateResult<String> {
        let mut current = name.to_string();

        for _ in 0..MAX_SUBSTITUTION_PASSES {
            let Some(begin) = current.find(&self.prefix) else {
                return Ok(current);
            };
            let inner_start = begin + self.prefix.len();
            let inner_len = current[inner_start..].find(&self.suffix).ok_or_else(|| {
                TemplateError::InvalidFilenameVariable {
                    file: name.to_string(),
                    message: format!("unterminated '{}' token", self.prefix),
                }
            })?;
            let var_name = &current[inner_start..inner_start + inner_len];

            let value = lookup(variables, var_name).ok_or_else(|| {
                TemplateError::InvalidFilenameVariable {
                    file: name.to_string(),
                    message: format!("variable '{}' is not defined", var_name),
                }
            })?;
            if !self.safe_pattern.is_match(&value) {
                return Err(TemplateError::InvalidFilenameVariable {
                    file: name.to_string(),
                    message: format!(
                        "substitute '{}' for '{}' has characters outside [-_.A-Za-z0-9]",
                        value, var_name
                    ),
                });
            }

            let span_end = inner_start + inner_len + self.suffix.len();
            current = format!("{}{}{}", &current[..begin], value, &current[span_end..]);
        }

        if current.contains(&self.prefix) {
            return Err(TemplateError::DidNotConverge {
                passes: MAX_SUBSTITUTION_PASSES,
            });
        }
        Ok(current)
    }
}
