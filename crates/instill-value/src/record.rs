//! The record type and dotted-path access.

use serde_json::{Map, Value};

/// One unit of work exchanged with a component: an ordered mapping from
/// field name to value.
pub type Record = Map<String, Value>;

/// Short name of a value's kind, as used in error messages.
pub fn kind_of(value: &Value) -> &'static str {
  match value {
    Value::Null => "null",
    Value::Bool(_) => "boolean",
    Value::Number(n) if n.is_f64() => "number",
    Value::Number(_) => "integer",
    Value::String(_) => "string",
    Value::Array(_) => "array",
    Value::Object(_) => "object",
  }
}

/// Look up a dotted path (`authentication.token`) inside a record.
pub fn get_path<'a>(record: &'a Record, path: &str) -> Option<&'a Value> {
  let mut segments = path.split('.');
  let mut current = record.get(segments.next()?)?;
  for segment in segments {
    current = current.as_object()?.get(segment)?;
  }
  Some(current)
}

/// Replace the value at a dotted path, creating intermediate objects as
/// needed. Returns `false` when an intermediate segment exists but is not an
/// object.
pub fn set_path(record: &mut Record, path: &str, value: Value) -> bool {
  let Some((parent, leaf)) = path.rsplit_once('.') else {
    record.insert(path.to_string(), value);
    return true;
  };

  let mut current = record;
  for segment in parent.split('.') {
    let next = current
      .entry(segment.to_string())
      .or_insert_with(|| Value::Object(Map::new()));
    match next {
      Value::Object(map) => current = map,
      _ => return false,
    }
  }
  current.insert(leaf.to_string(), value);
  true
}
