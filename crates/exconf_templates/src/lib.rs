//! # exconf_templates
//!
//! Variable substitution for exconf.
//!
//! This crate is pure: it never touches the filesystem. It provides:
//!
//! - [`VariableMap`] and the stringification rules for YAML values
//! - [`TemplateRenderer`], a fixed-point `{{name}}` substitution engine with
//!   comment-line exclusion and complete missing-variable reporting
//! - [`FilenameTemplater`], which expands `___name___` tokens in file names
//!
//! ## Example
//!
//! ```rust
//! use exconf_templates::{TemplateRenderer, VariableMap};
//! use serde_yaml::Value;
//!
//! let mut vars = VariableMap::new();
//! vars.insert("host".to_string(), Value::from("db.internal"));
//! vars.insert("url".to_string(), Value::from("postgres://{{host}}/app"));
//!
//! let renderer = TemplateRenderer::default();
//! let text = renderer.render("DATABASE_URL={{url}}", &vars).unwrap();
//! assert_eq!(text, "DATABASE_URL=postgres://db.internal/app");
//! ```

pub mod error;
pub mod filename;
pub mod renderer;
pub mod variables;

pub use error::{MissingVariable, TemplateError, TemplateResult};
pub use filename::FilenameTemplater;
pub use renderer::{Substitution, TemplateRenderer, TemplateSyntax, MAX_SUBSTITUTION_PASSES};
pub use variables::{key_name, lookup, stringify, VariableMap};
