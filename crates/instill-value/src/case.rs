//! Key naming conventions.
//!
//! Component schemas use kebab-case field names while vendor APIs usually
//! speak snake_case or camelCase.

use heck::{ToKebabCase, ToLowerCamelCase, ToSnakeCase};
use serde_json::{Map, Value};

pub fn to_kebab(name: &str) -> String {
  name.to_kebab_case()
}

pub fn to_snake(name: &str) -> String {
  name.to_snake_case()
}

pub fn to_camel(name: &str) -> String {
  name.to_lower_camel_case()
}

/// Recursively rename every object key in `value` with `rename`.
pub fn rename_keys(value: Value, rename: fn(&str) -> String) -> Value {
  match value {
    Value::Object(map) => Value::Object(
      map
        .into_iter()
        .map(|(k, v)| (rename(&k), rename_keys(v, rename)))
        .collect::<Map<_, _>>(),
    ),
    Value::Array(items) => Value::Array(items.into_iter().map(|v| rename_keys(v, rename)).collect()),
    other => other,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_case_conversions() {
    assert_eq!(to_kebab("max_new_tokens"), "max-new-tokens");
    assert_eq!(to_kebab("maxNewTokens"), "max-new-tokens");
    assert_eq!(to_snake("endpoint-url"), "endpoint_url");
    assert_eq!(to_camel("output-body-schema"), "outputBodySchema");
  }

  #[test]
  fn test_rename_keys_walks_nested_values() {
    let renamed = rename_keys(
      json!({ "top_p": 1, "messages": [{ "tool_calls": [] }] }),
      to_kebab,
    );
    assert_eq!(renamed, json!({ "top-p": 1, "messages": [{ "tool-calls": [] }] }));
  }
}
