//! `instill*` annotation handling.
//!
//! Annotations recognised here:
//! - `instillFormat`: the value's data format (`string`, `image/*`, `array:image/*`, ...).
//! - `instillAcceptFormats`: formats an upstream reference may carry.
//! - `instillUpstreamTypes`: how the editor may fill the field (`value`, `reference`, `template`).
//! - `instillUIOrder`: display order, defaults to 0.
//! - `instillShortDescription`: defaults to `description`.
//! - `instillEditOnNodeFields`: object fields editable on the node, defaults to `required`.
//! - `instillCredentialField`: marks a setup field as a secret.
//!
//! Any other keyword is left untouched.

use serde_json::{Map, Value};

use crate::error::SchemaError;

/// How a pipeline may provide a field's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamType {
  Value,
  Reference,
  Template,
}

impl UpstreamType {
  pub fn parse(name: &str) -> Option<Self> {
    match name {
      "value" => Some(Self::Value),
      "reference" => Some(Self::Reference),
      "template" => Some(Self::Template),
      _ => None,
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Value => "value",
      Self::Reference => "reference",
      Self::Template => "template",
    }
  }
}

/// Normalise a schema in place.
///
/// `array:<format>` values of `instillFormat` and `instillAcceptFormats` are
/// compiled into the same annotations on `items`. Missing presentation
/// annotations get their defaults. Malformed `instillUpstreamTypes` or
/// `instillUIOrder` values are errors. Nodes carrying `const` are left alone.
pub fn normalize(schema: &mut Value) -> Result<(), SchemaError> {
  normalize_node(schema, "#")
}

fn normalize_node(node: &mut Value, path: &str) -> Result<(), SchemaError> {
  let Value::Object(map) = node else {
    return Ok(());
  };
  if map.contains_key("const") {
    return Ok(());
  }

  compile_array_formats(map);
  check_upstream_types(map, path)?;
  normalize_ui_order(map, path)?;

  if !map.contains_key("instillShortDescription")
    && let Some(description) = map.get("description").cloned()
  {
    map.insert("instillShortDescription".to_string(), description);
  }

  if is_object_schema(map) {
    let required = map
      .entry("required")
      .or_insert_with(|| Value::Array(Vec::new()))
      .clone();
    map
      .entry("instillEditOnNodeFields")
      .or_insert(required);
  }

  for keyword in ["properties", "patternProperties", "$defs", "definitions"] {
    if let Some(Value::Object(children)) = map.get_mut(keyword) {
      for (name, child) in children.iter_mut() {
        normalize_node(child, &format!("{path}/{keyword}/{name}"))?;
      }
    }
  }

  for keyword in ["anyOf", "oneOf", "allOf"] {
    if let Some(Value::Array(branches)) = map.get_mut(keyword) {
      for (i, branch) in branches.iter_mut().enumerate() {
        normalize_node(branch, &format!("{path}/{keyword}/{i}"))?;
      }
    }
  }

  match map.get_mut("items") {
    Some(Value::Array(items)) => {
      for (i, item) in items.iter_mut().enumerate() {
        normalize_node(item, &format!("{path}/items/{i}"))?;
      }
    }
    Some(items) => normalize_node(items, &format!("{path}/items"))?,
    None => {}
  }

  if let Some(additional) = map.get_mut("additionalProperties") {
    normalize_node(additional, &format!("{path}/additionalProperties"))?;
  }

  Ok(())
}

fn is_object_schema(map: &Map<String, Value>) -> bool {
  map.get("type").and_then(Value::as_str) == Some("object") || map.contains_key("properties")
}

fn compile_array_formats(map: &mut Map<String, Value>) {
  if let Some(item_format) = map
    .get("instillFormat")
    .and_then(Value::as_str)
    .and_then(|f| f.strip_prefix("array:"))
    .map(str::to_string)
  {
    set_item_annotation(map, "instillFormat", Value::String(item_format));
  }

  let item_formats: Vec<Value> = map
    .get("instillAcceptFormats")
    .and_then(Value::as_array)
    .map(|formats| {
      formats
        .iter()
        .filter_map(|f| f.as_str()?.strip_prefix("array:"))
        .map(|f| Value::String(f.to_string()))
        .collect()
    })
    .unwrap_or_default();
  if !item_formats.is_empty() {
    set_item_annotation(map, "instillAcceptFormats", Value::Array(item_formats));
  }
}

fn set_item_annotation(map: &mut Map<String, Value>, keyword: &str, value: Value) {
  let items = map
    .entry("items")
    .or_insert_with(|| Value::Object(Map::new()));
  if let Value::Object(items) = items {
    items.entry(keyword).or_insert(value);
  }
}

fn check_upstream_types(map: &Map<String, Value>, path: &str) -> Result<(), SchemaError> {
  let Some(value) = map.get("instillUpstreamTypes") else {
    return Ok(());
  };
  let invalid = |message: String| SchemaError::InvalidAnnotation {
    keyword: "instillUpstreamTypes",
    path: path.to_string(),
    message,
  };

  let types = value
    .as_array()
    .ok_or_else(|| invalid("expected an array of strings".to_string()))?;
  for t in types {
    let name = t
      .as_str()
      .ok_or_else(|| invalid("expected an array of strings".to_string()))?;
    if UpstreamType::parse(name).is_none() {
      return Err(invalid(format!("unknown upstream type '{name}'")));
    }
  }
  Ok(())
}

fn normalize_ui_order(map: &mut Map<String, Value>, path: &str) -> Result<(), SchemaError> {
  let order = match map.get("instillUIOrder") {
    None => 0,
    Some(Value::Number(n)) => match (n.as_i64(), n.as_f64()) {
      (Some(i), _) => i,
      (None, Some(f)) if f.fract() == 0.0 => f as i64,
      _ => {
        return Err(SchemaError::InvalidAnnotation {
          keyword: "instillUIOrder",
          path: path.to_string(),
          message: format!("expected an integer, got {n}"),
        });
      }
    },
    Some(other) => {
      return Err(SchemaError::InvalidAnnotation {
        keyword: "instillUIOrder",
        path: path.to_string(),
        message: format!("expected an integer, got {}", instill_value::kind_of(other)),
      });
    }
  };
  map.insert("instillUIOrder".to_string(), Value::from(order));
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_defaults_filled() {
    let mut schema = json!({
      "type": "object",
      "required": ["text"],
      "properties": {
        "text": { "type": "string", "description": "Input text" },
        "limit": { "type": "integer", "instillUIOrder": 2, "instillShortDescription": "Max" }
      }
    });
    normalize(&mut schema).unwrap();

    assert_eq!(schema["instillUIOrder"], json!(0));
    assert_eq!(schema["instillEditOnNodeFields"], json!(["text"]));
    assert_eq!(schema["properties"]["text"]["instillUIOrder"], json!(0));
    assert_eq!(schema["properties"]["text"]["instillShortDescription"], json!("Input text"));
    assert_eq!(schema["properties"]["limit"]["instillUIOrder"], json!(2));
    assert_eq!(schema["properties"]["limit"]["instillShortDescription"], json!("Max"));
  }

  #[test]
  fn test_object_without_required_gets_empty_lists() {
    let mut schema = json!({ "type": "object", "properties": {} });
    normalize(&mut schema).unwrap();
    assert_eq!(schema["required"], json!([]));
    assert_eq!(schema["instillEditOnNodeFields"], json!([]));
  }

  #[test]
  fn test_array_format_compiled_into_items() {
    let mut schema = json!({
      "type": "array",
      "instillFormat": "array:image/*",
      "instillAcceptFormats": ["array:image/*", "array:string"]
    });
    normalize(&mut schema).unwrap();

    assert_eq!(schema["items"]["instillFormat"], json!("image/*"));
    assert_eq!(schema["items"]["instillAcceptFormats"], json!(["image/*", "string"]));
  }

  #[test]
  fn test_explicit_items_annotation_kept() {
    let mut schema = json!({
      "type": "array",
      "instillFormat": "array:image/*",
      "items": { "type": "string", "instillFormat": "image/png" }
    });
    normalize(&mut schema).unwrap();
    assert_eq!(schema["items"]["instillFormat"], json!("image/png"));
  }

  #[test]
  fn test_unknown_upstream_type_rejected() {
    let mut schema = json!({
      "type": "object",
      "properties": { "x": { "type": "string", "instillUpstreamTypes": ["value", "magic"] } }
    });
    let err = normalize(&mut schema).unwrap_err();
    assert!(err.to_string().contains("#/properties/x"));
    assert!(err.to_string().contains("magic"));
  }

  #[test]
  fn test_non_integer_ui_order_rejected() {
    let mut schema = json!({ "type": "string", "instillUIOrder": "first" });
    assert!(normalize(&mut schema).is_err());

    let mut schema = json!({ "type": "string", "instillUIOrder": 3.0 });
    normalize(&mut schema).unwrap();
    assert_eq!(schema["instillUIOrder"], json!(3));
  }

  #[test]
  fn test_const_nodes_untouched() {
    let mut schema = json!({ "const": "NO_AUTH", "description": "No auth" });
    normalize(&mut schema).unwrap();
    assert_eq!(schema, json!({ "const": "NO_AUTH", "description": "No auth" }));
  }
}
