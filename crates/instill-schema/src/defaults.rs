//! Default materialisation.

use instill_value::Record;
use serde_json::Value;

/// Insert the schema's declared `default` for every property absent from
/// `record`, descending into nested objects and arrays of objects the caller
/// did provide. Explicit values, `null` included, are kept.
pub fn apply_defaults(schema: &Value, record: &mut Record) {
  let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
    return;
  };

  for (name, property) in properties {
    match record.get_mut(name) {
      None => {
        if let Some(default) = property.get("default") {
          record.insert(name.clone(), default.clone());
        }
      }
      Some(Value::Object(child)) => apply_defaults(property, child),
      Some(Value::Array(items)) => {
        if let Some(item_schema) = property.get("items") {
          for item in items {
            if let Value::Object(child) = item {
              apply_defaults(item_schema, child);
            }
          }
        }
      }
      Some(_) => {}
    }
  }
}
