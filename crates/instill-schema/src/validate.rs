//! Value validation against a JSON Schema.
//!
//! Covers the draft-07 subset component schemas use: `type`, `enum`,
//! `const`, object keywords (`properties`, `required`,
//! `additionalProperties`), array keywords (`items`, `minItems`,
//! `maxItems`, `uniqueItems`), string length, numeric bounds and the
//! `allOf` / `anyOf` / `oneOf` combinators. `pattern` and `format` are not
//! enforced.
//!
//! Two extensions apply:
//! - An empty `enum` is a placeholder for values filled in at runtime and
//!   accepts anything.
//! - String values under a MIME `instillFormat` / `instillAcceptFormats`
//!   must be base64 files of a matching type.

use std::fmt;

use instill_value::{Record, kind_of, mime_of};
use serde_json::{Map, Value};

/// A single validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
  /// Location of the failing value, such as `inputs[0].messages[2].role`.
  pub path: String,
  pub message: String,
}

impl fmt::Display for ValidationError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}: {}", self.path, self.message)
  }
}

/// Validate one value, reporting failures under `path`.
pub fn validate(schema: &Value, instance: &Value, path: &str) -> Vec<ValidationError> {
  let mut errors = Vec::new();
  check(schema, instance, path, &mut errors);
  errors
}

/// Validate a batch of records. Paths are prefixed with `{target}[{index}]`.
pub fn validate_records(
  schema: &Value,
  records: &[Record],
  target: &str,
) -> Result<(), Vec<ValidationError>> {
  let mut errors = Vec::new();
  for (i, record) in records.iter().enumerate() {
    let instance = Value::Object(record.clone());
    check(schema, &instance, &format!("{target}[{i}]"), &mut errors);
  }
  if errors.is_empty() {
    Ok(())
  } else {
    Err(errors)
  }
}

fn push(errors: &mut Vec<ValidationError>, path: &str, message: impl Into<String>) {
  errors.push(ValidationError {
    path: path.to_string(),
    message: message.into(),
  });
}

fn check(schema: &Value, instance: &Value, path: &str, errors: &mut Vec<ValidationError>) {
  let schema = match schema {
    Value::Object(map) => map,
    Value::Bool(false) => {
      push(errors, path, "no value is allowed here");
      return;
    }
    _ => return,
  };

  if let Some(expected) = schema.get("type")
    && !type_matches(expected, instance)
  {
    push(
      errors,
      path,
      format!("expected {}, but got {}", describe_type(expected), kind_of(instance)),
    );
    return;
  }

  if let Some(Value::Array(options)) = schema.get("enum")
    && !options.is_empty()
    && !options.contains(instance)
  {
    let allowed: Vec<String> = options.iter().map(Value::to_string).collect();
    push(errors, path, format!("value must be one of {}", allowed.join(", ")));
  }

  if let Some(expected) = schema.get("const")
    && expected != instance
  {
    push(errors, path, format!("value must be {expected}"));
  }

  match instance {
    Value::Object(map) => check_object(schema, map, path, errors),
    Value::Array(items) => check_array(schema, items, path, errors),
    Value::String(s) => check_string(schema, s, path, errors),
    Value::Number(n) => {
      if let Some(n) = n.as_f64() {
        check_number(schema, n, path, errors);
      }
    }
    _ => {}
  }

  check_combinators(schema, instance, path, errors);
}

fn type_matches(expected: &Value, instance: &Value) -> bool {
  match expected {
    Value::String(t) => type_name_matches(t, instance),
    Value::Array(types) => types
      .iter()
      .filter_map(Value::as_str)
      .any(|t| type_name_matches(t, instance)),
    _ => true,
  }
}

fn type_name_matches(name: &str, instance: &Value) -> bool {
  match (name, instance) {
    ("null", Value::Null) => true,
    ("boolean", Value::Bool(_)) => true,
    ("string", Value::String(_)) => true,
    ("array", Value::Array(_)) => true,
    ("object", Value::Object(_)) => true,
    ("number", Value::Number(_)) => true,
    ("integer", Value::Number(n)) => {
      n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.fract() == 0.0)
    }
    _ => false,
  }
}

fn describe_type(expected: &Value) -> String {
  match expected {
    Value::Array(types) => types
      .iter()
      .filter_map(Value::as_str)
      .collect::<Vec<_>>()
      .join(" or "),
    Value::String(t) => t.clone(),
    other => other.to_string(),
  }
}

fn check_object(
  schema: &Map<String, Value>,
  map: &Map<String, Value>,
  path: &str,
  errors: &mut Vec<ValidationError>,
) {
  if let Some(Value::Array(required)) = schema.get("required") {
    let missing: Vec<String> = required
      .iter()
      .filter_map(Value::as_str)
      .filter(|name| !map.contains_key(*name))
      .map(|name| format!("'{name}'"))
      .collect();
    if !missing.is_empty() {
      push(errors, path, format!("missing properties: {}", missing.join(", ")));
    }
  }

  let properties = schema.get("properties").and_then(Value::as_object);
  for (name, value) in map {
    let child_path = format!("{path}.{name}");
    match properties.and_then(|p| p.get(name)) {
      Some(property) => check(property, value, &child_path, errors),
      None => match schema.get("additionalProperties") {
        Some(Value::Bool(false)) => {
          push(errors, &child_path, format!("additional property '{name}' is not allowed"));
        }
        Some(additional @ Value::Object(_)) => check(additional, value, &child_path, errors),
        _ => {}
      },
    }
  }
}

fn check_array(
  schema: &Map<String, Value>,
  items: &[Value],
  path: &str,
  errors: &mut Vec<ValidationError>,
) {
  if let Some(min) = schema.get("minItems").and_then(Value::as_u64)
    && (items.len() as u64) < min
  {
    push(errors, path, format!("minimum {min} items required, but found {}", items.len()));
  }
  if let Some(max) = schema.get("maxItems").and_then(Value::as_u64)
    && (items.len() as u64) > max
  {
    push(errors, path, format!("maximum {max} items allowed, but found {}", items.len()));
  }
  if schema.get("uniqueItems") == Some(&Value::Bool(true)) {
    for (i, item) in items.iter().enumerate() {
      if items[..i].contains(item) {
        push(errors, path, format!("items at index {i} is a duplicate"));
        break;
      }
    }
  }

  match schema.get("items") {
    Some(Value::Array(tuple)) => {
      for (i, (item_schema, item)) in tuple.iter().zip(items).enumerate() {
        check(item_schema, item, &format!("{path}[{i}]"), errors);
      }
    }
    Some(item_schema) => {
      for (i, item) in items.iter().enumerate() {
        check(item_schema, item, &format!("{path}[{i}]"), errors);
      }
    }
    None => {}
  }
}

fn check_string(
  schema: &Map<String, Value>,
  s: &str,
  path: &str,
  errors: &mut Vec<ValidationError>,
) {
  let length = s.chars().count() as u64;
  if let Some(min) = schema.get("minLength").and_then(Value::as_u64)
    && length < min
  {
    push(errors, path, format!("length must be >= {min}, but got {length}"));
  }
  if let Some(max) = schema.get("maxLength").and_then(Value::as_u64)
    && length > max
  {
    push(errors, path, format!("length must be <= {max}, but got {length}"));
  }

  check_file_format(schema, s, path, errors);
}

fn check_number(schema: &Map<String, Value>, n: f64, path: &str, errors: &mut Vec<ValidationError>) {
  let bound = |keyword: &str| schema.get(keyword).and_then(Value::as_f64);

  if let Some(min) = bound("minimum")
    && n < min
  {
    push(errors, path, format!("must be >= {min} but found {n}"));
  }
  if let Some(max) = bound("maximum")
    && n > max
  {
    push(errors, path, format!("must be <= {max} but found {n}"));
  }
  if let Some(min) = bound("exclusiveMinimum")
    && n <= min
  {
    push(errors, path, format!("must be > {min} but found {n}"));
  }
  if let Some(max) = bound("exclusiveMaximum")
    && n >= max
  {
    push(errors, path, format!("must be < {max} but found {n}"));
  }
}

fn check_combinators(
  schema: &Map<String, Value>,
  instance: &Value,
  path: &str,
  errors: &mut Vec<ValidationError>,
) {
  if let Some(Value::Array(branches)) = schema.get("allOf") {
    for branch in branches {
      check(branch, instance, path, errors);
    }
  }

  if let Some(Value::Array(branches)) = schema.get("anyOf")
    && !branches.is_empty()
    && !branches.iter().any(|b| validate(b, instance, path).is_empty())
  {
    push(errors, path, "value does not match any of the allowed schemas");
  }

  if let Some(Value::Array(branches)) = schema.get("oneOf")
    && !branches.is_empty()
  {
    let matching = branches
      .iter()
      .filter(|b| validate(b, instance, path).is_empty())
      .count();
    match matching {
      1 => {}
      0 => push(errors, path, "value does not match any of the allowed schemas"),
      _ => push(errors, path, "value matches more than one of the allowed schemas"),
    }
  }
}

/// Formats that constrain a string to a base64 file of some MIME type.
fn is_mime_format(format: &str) -> bool {
  format.contains('/')
    && format != "*/*"
    && !format.starts_with("semi-structured/")
    && !format.starts_with("structured/")
}

fn format_accepts(format: &str, mime: &str) -> bool {
  match format.strip_suffix("/*") {
    Some(major) => mime.split('/').next() == Some(major),
    None => format == mime,
  }
}

fn check_file_format(
  schema: &Map<String, Value>,
  s: &str,
  path: &str,
  errors: &mut Vec<ValidationError>,
) {
  let mut formats: Vec<&str> = Vec::new();
  if let Some(format) = schema.get("instillFormat").and_then(Value::as_str) {
    formats.push(format);
  }
  if let Some(accepted) = schema.get("instillAcceptFormats").and_then(Value::as_array) {
    formats.extend(accepted.iter().filter_map(Value::as_str));
  }

  // A single non-file format (`string`, `*`, `semi-structured/*`) admits
  // plain text.
  if formats.is_empty() || formats.iter().any(|f| !is_mime_format(f)) {
    return;
  }

  match mime_of(s) {
    Ok(mime) if formats.iter().any(|f| format_accepts(f, &mime)) => {}
    Ok(mime) => push(
      errors,
      path,
      format!("expected format {}, but got {mime}", formats.join(" or ")),
    ),
    Err(_) => push(errors, path, "can not decode file"),
  }
}
