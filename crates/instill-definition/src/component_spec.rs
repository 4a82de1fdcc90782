//! Editor-facing component specification.
//!
//! Every input leaf becomes an `anyOf` over the ways the editor may fill
//! it: the original schema for a literal `value`, a `${...}` string for a
//! `reference`, or a free `template` string.

use serde_json::{Map, Value, json};

use crate::definition::TaskDefinition;
use crate::error::DefinitionError;

const DRAFT_07: &str = "http://json-schema.org/draft-07/schema#";
const REFERENCE_PATTERN: &str = "^\\{.*\\}$";

/// Keys describing a leaf for the editor rather than constraining its value.
const PRESENTATION_KEYS: [&str; 6] = [
  "title",
  "description",
  "instillShortDescription",
  "instillAcceptFormats",
  "instillUIOrder",
  "instillUpstreamTypes",
];

fn condition_field() -> Value {
  json!({
    "type": "string",
    "instillUIOrder": 1,
    "instillShortDescription": "config whether the component will be executed or skipped",
    "instillAcceptFormats": ["string"],
    "instillUpstreamTypes": ["value", "template"]
  })
}

/// Assemble the component specification from per-task branches.
pub(crate) fn component_specification(title: &str, branches: Vec<Value>) -> Value {
  json!({
    "$schema": DRAFT_07,
    "title": format!("{title} Component"),
    "type": "object",
    "oneOf": branches,
  })
}

/// The `oneOf` branch for one task.
pub(crate) fn task_branch(
  task: &TaskDefinition,
  description: &str,
  input: &Value,
  metadata: Option<&Value>,
) -> Result<Value, DefinitionError> {
  let mut task_field = Map::new();
  task_field.insert("const".to_string(), json!(task.name));
  task_field.insert("title".to_string(), json!(task.title));
  if !description.is_empty() {
    task_field.insert("description".to_string(), json!(description));
  }
  if !task.description.is_empty() {
    task_field.insert("instillShortDescription".to_string(), json!(task.description));
  }

  let input = convert(input, "input").map_err(|message| DefinitionError::ComponentSpec {
    task: task.name.clone(),
    message,
  })?;

  let mut properties = Map::new();
  properties.insert("task".to_string(), Value::Object(task_field));
  properties.insert("condition".to_string(), condition_field());
  properties.insert("input".to_string(), input);
  if let Some(metadata) = metadata {
    properties.insert("metadata".to_string(), metadata.clone());
  }

  Ok(json!({ "type": "object", "properties": properties }))
}

fn is_free_form(map: &Map<String, Value>) -> bool {
  let accepted = map
    .get("instillAcceptFormats")
    .and_then(Value::as_array)
    .into_iter()
    .flatten()
    .filter_map(Value::as_str);
  let format = map.get("instillFormat").and_then(Value::as_str);

  accepted
    .chain(format)
    .any(|f| matches!(f, "*" | "semi-structured/*" | "semi-structured/json"))
}

fn convert(schema: &Value, path: &str) -> Result<Value, String> {
  let Value::Object(map) = schema else {
    return Ok(schema.clone());
  };
  if map.contains_key("const") {
    return Ok(schema.clone());
  }

  let ty = map.get("type").and_then(Value::as_str);
  let is_object = ty == Some("object") || (ty.is_none() && map.contains_key("properties"));
  if !map.contains_key("type") && !is_object && !is_free_form(map) {
    return Err(format!("type missing at {path}"));
  }

  if is_object && !map.contains_key("instillUpstreamTypes") {
    return convert_object(map, path);
  }

  Ok(convert_leaf(map))
}

fn convert_object(map: &Map<String, Value>, path: &str) -> Result<Value, String> {
  let mut out = map.clone();

  for keyword in ["properties", "patternProperties"] {
    if let Some(Value::Object(children)) = out.get_mut(keyword) {
      for (name, child) in children.iter_mut() {
        *child = convert(child, &format!("{path}.{name}"))?;
      }
    }
  }
  for keyword in ["allOf", "anyOf", "oneOf"] {
    if let Some(Value::Array(branches)) = out.get_mut(keyword) {
      for (i, branch) in branches.iter_mut().enumerate() {
        *branch = convert(branch, &format!("{path}.{keyword}[{i}]"))?;
      }
    }
  }

  Ok(Value::Object(out))
}

fn convert_leaf(map: &Map<String, Value>) -> Value {
  let text = |key: &str| map.get(key).cloned().unwrap_or_else(|| json!(""));
  let description = text("description");

  let mut out = Map::new();
  out.insert("title".to_string(), text("title"));
  out.insert("description".to_string(), description.clone());
  out.insert(
    "instillShortDescription".to_string(),
    map.get("instillShortDescription").cloned().unwrap_or(description),
  );
  out.insert(
    "instillUIOrder".to_string(),
    map.get("instillUIOrder").cloned().unwrap_or_else(|| json!(0)),
  );
  if let Some(formats) = map.get("instillAcceptFormats") {
    out.insert("instillAcceptFormats".to_string(), formats.clone());
  }

  let upstream_types: Vec<String> = match map.get("instillUpstreamTypes").and_then(Value::as_array) {
    Some(types) => types
      .iter()
      .filter_map(Value::as_str)
      .map(str::to_string)
      .collect(),
    None => vec!["value".to_string(), "reference".to_string()],
  };

  let mut value = map.clone();
  for key in PRESENTATION_KEYS {
    value.remove(key);
  }

  let alternatives: Vec<Value> = upstream_types
    .iter()
    .filter_map(|t| match t.as_str() {
      "value" => {
        let mut value = value.clone();
        value.insert("instillUpstreamType".to_string(), json!("value"));
        Some(Value::Object(value))
      }
      "reference" => Some(json!({
        "type": "string",
        "pattern": REFERENCE_PATTERN,
        "instillUpstreamType": "reference"
      })),
      "template" => Some(json!({ "type": "string", "instillUpstreamType": "template" })),
      _ => None,
    })
    .collect();

  out.insert("instillUpstreamTypes".to_string(), json!(upstream_types));
  out.insert("anyOf".to_string(), Value::Array(alternatives));
  Value::Object(out)
}
