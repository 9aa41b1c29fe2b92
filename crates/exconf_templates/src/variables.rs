//! Variable mappings and value stringification.

use std::collections::BTreeMap;

use serde_yaml::Value;

/// Flat mapping of variable names to YAML values.
///
/// Keys are kept sorted so that printed output is stable between runs.
pub type VariableMap = BTreeMap<String, Value>;

/// Render a variable value as the text that replaces its placeholder.
///
/// Returns `None` for null values, which count as undefined.
pub fn stringify(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        Value::Sequence(_) | Value::Mapping(_) => {
            Some(serde_json::to_string(value).unwrap_or_else(|_| format!("{:?}", value)))
        }
        Value::Tagged(tagged) => stringify(&tagged.value),
    }
}

/// Look up a variable and stringify it.
pub fn lookup(variables: &VariableMap, name: &str) -> Option<String> {
    variables.get(name).and_then(stringify)
}

/// Render a mapping key as a variable name.
pub fn key_name(key: &Value) -> Option<String> {
    match key {
        Value::String(s) => Some(s.clone()),
        Value::Bool(_) | Value::Number(_) => stringify(key),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stringify_scalars() {
        assert_eq!(stringify(&Value::from("abc")), Some("abc".to_string()));
        assert_eq!(stringify(&Value::from(8080)), Some("8080".to_string()));
        assert_eq!(stringify(&Value::from(true)), Some("true".to_string()));
        assert_eq!(stringify(&Value::Null), None);
    }

    #[test]
    fn test_stringify_structures_as_json() {
        let value: Value = serde_yaml::from_str("[a, 1]").unwrap();
        assert_eq!(stringify(&value), Some(r#"["a",1]"#.to_string()));

        let value: Value = serde_yaml::from_str("{k: v}").unwrap();
        assert_eq!(stringify(&value), Some(r#"{"k":"v"}"#.to_string()));
    }

    #[test]
    fn test_lookup_missing_and_null() {
        let mut vars = VariableMap::new();
        vars.insert("empty".to_string(), Value::Null);
        vars.insert("port".to_string(), Value::from(80));
        assert_eq!(lookup(&vars, "empty"), None);
        assert_eq!(lookup(&vars, "nope"), None);
        assert_eq!(lookup(&vars, "port"), Some("80".to_string()));
    }
}
