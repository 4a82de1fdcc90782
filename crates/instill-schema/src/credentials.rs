//! Secret field discovery.

use serde_json::Value;

/// Dotted paths of every property marked `instillCredentialField: true` in
/// a setup schema, in document order.
///
/// Nested objects contribute `parent.child` paths. Branches of `oneOf` /
/// `anyOf` / `allOf` share their parent's prefix, so a credential that
/// appears in several branches is listed once.
pub fn credential_fields(schema: &Value) -> Vec<String> {
  let mut fields = Vec::new();
  collect(schema, "", &mut fields);
  fields
}

fn collect(schema: &Value, prefix: &str, fields: &mut Vec<String>) {
  if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
    for (name, property) in properties {
      let path = if prefix.is_empty() {
        name.clone()
      } else {
        format!("{prefix}.{name}")
      };
      if is_credential(property) && !fields.contains(&path) {
        fields.push(path.clone());
      }
      collect(property, &path, fields);
    }
  }

  for keyword in ["oneOf", "anyOf", "allOf"] {
    if let Some(branches) = schema.get(keyword).and_then(Value::as_array) {
      for branch in branches {
        collect(branch, prefix, fields);
      }
    }
  }
}

fn is_credential(property: &Value) -> bool {
  match property.get("instillCredentialField") {
    Some(Value::Bool(b)) => *b,
    Some(Value::String(s)) => s == "true",
    _ => false,
  }
}
