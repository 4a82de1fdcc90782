//! Typed structs in and out of records.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ValueError;
use crate::record::{Record, kind_of};

/// Decode a record into a typed struct.
pub fn from_record<T: DeserializeOwned>(record: Record) -> Result<T, ValueError> {
  serde_json::from_value(Value::Object(record)).map_err(|source| ValueError::Decode { source })
}

/// Encode a typed struct as a record. The struct must serialize to an object.
pub fn to_record<T: Serialize + ?Sized>(value: &T) -> Result<Record, ValueError> {
  match serde_json::to_value(value).map_err(|source| ValueError::Encode { source })? {
    Value::Object(map) => Ok(map),
    other => Err(ValueError::NotAnObject {
      kind: kind_of(&other),
    }),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde::Deserialize;
  use serde_json::json;

  #[derive(Debug, Serialize, Deserialize, PartialEq)]
  #[serde(rename_all = "kebab-case")]
  struct Output {
    status_code: u16,
    body: Value,
  }

  #[test]
  fn test_to_record_uses_field_names() {
    let record = to_record(&Output {
      status_code: 200,
      body: json!("ok"),
    })
    .unwrap();
    assert_eq!(record.get("status-code"), Some(&json!(200)));
  }

  #[test]
  fn test_from_record_reports_shape_mismatch() {
    let Value::Object(record) = json!({ "status-code": "two hundred", "body": null }) else {
      unreachable!()
    };
    let err = from_record::<Output>(record).unwrap_err();
    assert!(matches!(err, ValueError::Decode { .. }));
  }

  #[test]
  fn test_to_record_rejects_scalars() {
    let err = to_record(&42).unwrap_err();
    assert!(matches!(err, ValueError::NotAnObject { kind: "integer" }));
  }
}
