//! The `tasks.json` document.
//!
//! Top-level keys are task names (`TASK_GET`, `TASK_ENCODE`, ...). Keys that
//! start with `$` (such as `$defs`) hold shared schema fragments that tasks
//! reference and are not tasks themselves. A task name that appears twice
//! is rejected while parsing.

use std::fmt;

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ConfigError;

/// One task entry, after references have been resolved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskDoc {
  #[serde(default)]
  pub title: Option<String>,
  #[serde(default)]
  pub description: Option<String>,
  #[serde(default, rename = "instillShortDescription")]
  pub short_description: Option<String>,
  #[serde(default)]
  pub input: Option<Value>,
  #[serde(default)]
  pub output: Option<Value>,
  /// Editor-only metadata shown next to the task input.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub metadata: Option<Value>,
}

/// The raw `tasks.json` document with its key order preserved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TasksDoc {
  entries: Vec<(String, Value)>,
}

impl TasksDoc {
  pub fn from_slice(bytes: &[u8]) -> Result<Self, ConfigError> {
    serde_json::from_slice(bytes).map_err(|source| ConfigError::Json {
      document: "tasks.json".to_string(),
      source,
    })
  }

  /// Task names in document order, skipping `$`-prefixed fragments.
  pub fn task_names(&self) -> impl Iterator<Item = &str> {
    self
      .entries
      .iter()
      .map(|(name, _)| name.as_str())
      .filter(|name| !name.starts_with('$'))
  }

  pub fn get(&self, name: &str) -> Option<&Value> {
    self
      .entries
      .iter()
      .find(|(key, _)| key == name)
      .map(|(_, value)| value)
  }

  /// The whole document as a JSON object.
  pub fn to_value(&self) -> Value {
    Value::Object(self.entries.iter().cloned().collect::<Map<_, _>>())
  }
}

impl<'de> Deserialize<'de> for TasksDoc {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    deserializer.deserialize_map(TasksVisitor)
  }
}

struct TasksVisitor;

impl<'de> Visitor<'de> for TasksVisitor {
  type Value = TasksDoc;

  fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
    f.write_str("a map of task names to task definitions")
  }

  fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<TasksDoc, A::Error> {
    let mut entries: Vec<(String, Value)> = Vec::new();
    while let Some((key, value)) = map.next_entry::<String, Value>()? {
      if entries.iter().any(|(existing, _)| *existing == key) {
        return Err(de::Error::custom(format!("duplicate task `{key}`")));
      }
      entries.push((key, value));
    }
    Ok(TasksDoc { entries })
  }
}
