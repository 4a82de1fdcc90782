//! Targeted edits of schema trees.
//!
//! Dynamic definitions patch a cloned static schema: filling a model
//! selector's `enum`, or swapping in a caller-provided body schema.
//! Both walk the whole tree so the same call works on a task's data
//! specification and on the generated component specification.

use serde_json::{Map, Value};

use crate::annotations::UpstreamType;

/// Set the `enum` of every property named `field` to `values`.
///
/// When a property is an `anyOf` of upstream alternatives (as in a
/// component specification), only the `value` alternatives get the enum.
/// Returns how many properties were changed.
pub fn set_enum(schema: &mut Value, field: &str, values: &[Value]) -> usize {
  let mut changed = 0;
  visit_properties(schema, field, &mut |property| {
    apply_enum(property, values);
    changed += 1;
  });
  changed
}

/// Replace every property named `field` with `replacement`.
/// Returns how many properties were replaced.
pub fn set_property(schema: &mut Value, field: &str, replacement: &Value) -> usize {
  let mut changed = 0;
  visit_properties(schema, field, &mut |property| {
    *property = replacement.clone();
    changed += 1;
  });
  changed
}

fn visit_properties(node: &mut Value, field: &str, f: &mut dyn FnMut(&mut Value)) {
  match node {
    Value::Object(map) => {
      for (keyword, child) in map.iter_mut() {
        match child {
          Value::Object(properties) if keyword == "properties" => {
            for (name, property) in properties.iter_mut() {
              if name == field {
                f(property);
              } else {
                visit_properties(property, field, f);
              }
            }
          }
          _ => visit_properties(child, field, f),
        }
      }
    }
    Value::Array(items) => {
      for item in items {
        visit_properties(item, field, f);
      }
    }
    _ => {}
  }
}

fn apply_enum(property: &mut Value, values: &[Value]) {
  let Value::Object(map) = property else {
    return;
  };

  if let Some(Value::Array(alternatives)) = map.get_mut("anyOf") {
    let mut found = false;
    for alternative in alternatives.iter_mut().filter_map(Value::as_object_mut) {
      if is_value_alternative(alternative) {
        alternative.insert("enum".to_string(), Value::Array(values.to_vec()));
        found = true;
      }
    }
    if found {
      return;
    }
  }

  map.insert("enum".to_string(), Value::Array(values.to_vec()));
}

fn is_value_alternative(alternative: &Map<String, Value>) -> bool {
  alternative
    .get("instillUpstreamType")
    .and_then(Value::as_str)
    .and_then(UpstreamType::parse)
    == Some(UpstreamType::Value)
}
