//! Template rendering by fixed-point placeholder substitution.

use serde_yaml::value::TaggedValue;
use serde_yaml::{Mapping, Value};
use tracing::debug;

use crate::error::{MissingVariable, TemplateError, TemplateResult};
use crate::variables::{lookup, VariableMap};

/// Upper bound on substitution passes before a template is considered cyclic.
pub const MAX_SUBSTITUTION_PASSES: usize = 30;

/// Delimiters and comment marker for body templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSyntax {
    /// Opening placeholder delimiter, `{{` by default.
    pub prefix: String,
    /// Closing placeholder delimiter, `}}` by default.
    pub suffix: String,
    /// Lines starting with this (after trimming) are never substituted.
    /// An empty marker disables comment handling.
    pub comment_prefix: String,
}

impl Default for TemplateSyntax {
    fn default() -> Self {
        Self {
            prefix: "{{".to_string(),
            suffix: "}}".to_string(),
            comment_prefix: "#".to_string(),
        }
    }
}

impl TemplateSyntax {
    pub fn new(
        prefix: impl Into<String>,
        suffix: impl Into<String>,
        comment_prefix: impl Into<String>,
    ) -> Self {
        Self {
            prefix: prefix.into(),
            suffix: suffix.into(),
            comment_prefix: comment_prefix.into(),
        }
    }

    fn is_comment(&self, line: &str) -> bool {
        !self.comment_prefix.is_empty() && line.trim().starts_with(&self.comment_prefix)
    }
}

/// Output of a single substitution pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    pub text: String,
    /// Whether at least one placeholder was replaced.
    pub changed: bool,
}

/// Template renderer for substituting variables into text.
#[derive(Debug, Clone)]
pub struct TemplateRenderer {
    syntax: TemplateSyntax,
    require_all_replaced: bool,
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self {
            syntax: TemplateSyntax::default(),
            require_all_replaced: true,
        }
    }
}

impl TemplateRenderer {
    /// Create a renderer. Fails if either delimiter is empty.
    pub fn new(syntax: TemplateSyntax, require_all_replaced: bool) -> TemplateResult<Self> {
        if syntax.prefix.is_empty() || syntax.suffix.is_empty() {
            return Err(TemplateError::InvalidSyntax(format!(
                "placeholder delimiters must not be empty (prefix '{}', suffix '{}')",
                syntax.prefix, syntax.suffix
            )));
        }
        Ok(Self {
            syntax,
            require_all_replaced,
        })
    }

    pub fn syntax(&self) -> &TemplateSyntax {
        &self.syntax
    }

    pub fn require_all_replaced(&self) -> bool {
        self.require_all_replaced
    }

    /// Run one substitution pass over `text`.
    ///
    /// Every unresolved placeholder is collected before failing, so the
    /// error names all of them rather than the first.
    pub fn substitute_once(
        &self,
        text: &str,
        variables: &VariableMap,
    ) -> TemplateResult<Substitution> {
        let mut missing = Vec::new();
        let mut replaced = Vec::new();
        let mut changed = false;

        let lines: Vec<String> = text
            .split('\n')
            .enumerate()
            .map(|(index, line)| {
                if self.syntax.is_comment(line) {
                    return line.to_string();
                }
                let (rendered, line_changed) =
                    self.substitute_line(line, index + 1, variables, &mut missing, &mut replaced);
                changed |= line_changed;
                rendered
            })
            .collect();

        debug!("Variables substituted in given data: {:?}", replaced);
        if !missing.is_empty() {
            return Err(TemplateError::MissingVariables(missing));
        }

        Ok(Substitution {
            text: lines.join("\n"),
            changed,
        })
    }

    fn substitute_line(
        &self,
        line: &str,
        line_num: usize,
        variables: &VariableMap,
        missing: &mut Vec<MissingVariable>,
        replaced: &mut Vec<String>,
    ) -> (String, bool) {
        let prefix = self.syntax.prefix.as_str();
        let suffix = self.syntax.suffix.as_str();

        let mut output = String::with_capacity(line.len());
        let mut rest = line;
        let mut changed = false;

        while let Some(begin) = rest.find(prefix) {
            let inner_start = begin + prefix.len();
            let Some(inner_len) = rest[inner_start..].find(suffix) else {
                break;
            };
            let span_end = inner_start + inner_len + suffix.len();
            if inner_len == 0 {
                output.push_str(&rest[..inner_start]);
                rest = &rest[inner_start..];
                continue;
            }
            let name = rest[inner_start..inner_start + inner_len].trim();

            match lookup(variables, name) {
                Some(value) => {
                    output.push_str(&rest[..begin]);
                    output.push_str(&value);
                    replaced.push(name.to_string());
                    changed = true;
                }
                None => {
                    if self.require_all_replaced {
                        missing.push(MissingVariable::new(line_num, name));
                    }
                    output.push_str(&rest[..span_end]);
                }
            }
            rest = &rest[span_end..];
        }

        output.push_str(rest);
        (output, changed)
    }

    /// Substitute repeatedly until a pass changes nothing.
    ///
    /// Gives up with [`TemplateError::DidNotConverge`] after
    /// [`MAX_SUBSTITUTION_PASSES`] changing passes.
    pub fn render(&self, text: &str, variables: &VariableMap) -> TemplateResult<String> {
        let mut current = text.to_string();
        for pass in 1..=MAX_SUBSTITUTION_PASSES {
            let Substitution { text, changed } = self.substitute_once(&current, variables)?;
            if !changed {
                return Ok(text);
            }
            debug!("Substitution pass {} changed the text", pass);
            current = text;
        }
        Err(TemplateError::DidNotConverge {
            passes: MAX_SUBSTITUTION_PASSES,
        })
    }

    /// Expand every value of `variables` against the mapping itself.
    ///
    /// Each key is rendered against the original, unexpanded values, so the
    /// iteration order never affects another key's input. Strings inside
    /// sequences and mappings are expanded too; numbers and bools keep
    /// their type.
    pub fn render_variables(&self, variables: &VariableMap) -> TemplateResult<VariableMap> {
        let mut result = variables.clone();
        for (key, value) in variables {
            let rendered = self
                .render_value(value, variables)
                .map_err(|source| TemplateError::Mapping {
                    key: key.clone(),
                    source: Box::new(source),
                })?;
            if rendered != *value {
                debug!(
                    "Substituted key '{}' to new value '{:?}' from '{:?}'",
                    key, rendered, value
                );
            }
            result.insert(key.clone(), rendered);
        }
        Ok(result)
    }

    fn render_value(&self, value: &Value, variables: &VariableMap) -> TemplateResult<Value> {
        match value {
            Value::String(raw) => Ok(Value::String(self.render(raw, variables)?)),
            Value::Sequence(items) => items
                .iter()
                .map(|item| self.render_value(item, variables))
                .collect::<TemplateResult<Vec<_>>>()
                .map(Value::Sequence),
            Value::Mapping(mapping) => {
                let mut rendered = Mapping::new();
                for (key, item) in mapping {
                    rendered.insert(key.clone(), self.render_value(item, variables)?);
                }
                Ok(Value::Mapping(rendered))
            }
            Value::Tagged(tagged) => Ok(Value::Tagged(Box::new(TaggedValue {
                tag: tagged.tag.clone(),
                value: self.render_value(&tagged.value, variables)?,
            }))),
            other => Ok(other.clone()),
        }
    }
}
