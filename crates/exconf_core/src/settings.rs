//! Typed view of the exconf settings carried in the variable mapping.

use serde::Deserialize;
use serde_yaml::{Mapping, Value};

use exconf_templates::{FilenameTemplater, TemplateRenderer, TemplateSyntax, VariableMap};

use crate::error::{CoreError, CoreResult};

/// Name of the root descriptor file.
pub const CONFIG_FILE_NAME: &str = "exconf.yaml";

/// Environment variable naming the configuration root.
pub const CONFIG_ROOT_ENV: &str = "EXCONF_CONFIG_ROOT";

/// Variable names that exconf reads or injects.
pub mod vars {
    pub const SERVICE: &str = "service";
    pub const ENVIRONMENT: &str = "environment";
    pub const CONFIG_ROOT: &str = "exconf_configuration_root";
    pub const SERVICES_DIR: &str = "services_dir_name";
    pub const TEMPLATES_DIR: &str = "templates_dir_name";
    pub const ENVIRONMENTS_DIR: &str = "environments_dir_name";
    pub const STR_TEMPLATE_PREFIX: &str = "string_template_prefix";
    pub const STR_TEMPLATE_SUFFIX: &str = "string_template_suffix";
    pub const TEMPLATE_COMMENT_BEGIN: &str = "template_comment_line_begin";
    pub const TEMPLATE_TYPE: &str = "template_type";
    pub const FILE_TEMPLATE_PREFIX: &str = "file_name_template_prefix";
    pub const FILE_TEMPLATE_SUFFIX: &str = "file_name_template_suffix";
    pub const EXECUTION_COMMAND: &str = "execution_command";
    pub const EXECUTION_FILE: &str = "execution_file";
}

/// Settings read from a variable mapping.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    pub services_dir_name: String,
    pub templates_dir_name: String,
    pub environments_dir_name: String,
    #[serde(default = "default_str_prefix")]
    pub string_template_prefix: String,
    #[serde(default = "default_str_suffix")]
    pub string_template_suffix: String,
    #[serde(default = "default_comment_begin")]
    pub template_comment_line_begin: String,
    #[serde(default = "default_file_token")]
    pub file_name_template_prefix: String,
    #[serde(default = "default_file_token")]
    pub file_name_template_suffix: String,
    #[serde(default)]
    pub execution_command: Option<String>,
    #[serde(default)]
    pub execution_file: Option<String>,
}

fn default_str_prefix() -> String {
    "{{".to_string()
}

fn default_str_suffix() -> String {
    "}}".to_string()
}

fn default_comment_begin() -> String {
    "#".to_string()
}

fn default_file_token() -> String {
    "___".to_string()
}

impl Settings {
    /// Extract settings from a variable mapping. Unrelated variables are ignored.
    pub fn from_variables(variables: &VariableMap) -> CoreResult<Self> {
        let mapping: Mapping = variables
            .iter()
            .map(|(k, v)| (Value::String(k.clone()), v.clone()))
            .collect();
        serde_yaml::from_value(Value::Mapping(mapping))
            .map_err(|e| CoreError::InvalidSettings(e.to_string()))
    }

    /// Body template syntax.
    pub fn template_syntax(&self) -> TemplateSyntax {
        TemplateSyntax::new(
            &self.string_template_prefix,
            &self.string_template_suffix,
            &self.template_comment_line_begin,
        )
    }

    /// Renderer for template bodies and variable values.
    pub fn renderer(&self, require_all_replaced: bool) -> CoreResult<TemplateRenderer> {
        Ok(TemplateRenderer::new(self.template_syntax(), require_all_replaced)?)
    }

    /// Templater for file names.
    pub fn filename_templater(&self) -> CoreResult<FilenameTemplater> {
        Ok(FilenameTemplater::new(
            &self.file_name_template_prefix,
            &self.file_name_template_suffix,
        )?)
    }

    pub fn execution_command(&self) -> CoreResult<&str> {
        self.execution_command
            .as_deref()
            .ok_or(CoreError::MissingSetting(vars::EXECUTION_COMMAND))
    }

    pub fn execution_file(&self) -> CoreResult<&str> {
        self.execution_file
            .as_deref()
            .ok_or(CoreError::MissingSetting(vars::EXECUTION_FILE))
    }
}
