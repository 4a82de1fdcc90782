//! The `definition.json` document.

use serde::{Deserialize, Serialize};

/// Component category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentType {
  #[serde(rename = "COMPONENT_TYPE_AI", alias = "ai")]
  Ai,
  #[serde(rename = "COMPONENT_TYPE_DATA", alias = "data")]
  Data,
  #[serde(rename = "COMPONENT_TYPE_APPLICATION", alias = "application")]
  Application,
  #[serde(rename = "COMPONENT_TYPE_OPERATOR", alias = "operator")]
  Operator,
  #[default]
  #[serde(rename = "COMPONENT_TYPE_GENERIC", alias = "generic")]
  Generic,
}

/// Maturity of a component.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReleaseStage {
  #[default]
  #[serde(rename = "RELEASE_STAGE_UNSPECIFIED")]
  Unspecified,
  #[serde(rename = "RELEASE_STAGE_ALPHA", alias = "alpha")]
  Alpha,
  #[serde(rename = "RELEASE_STAGE_BETA", alias = "beta")]
  Beta,
  #[serde(rename = "RELEASE_STAGE_GA", alias = "ga")]
  Ga,
}

/// Identity and presentation metadata of a component, as written in
/// `definition.json`.
///
/// Required fields (`uid`, `id`, `title`) default to empty here so the
/// loader can report which one is missing instead of a bare serde error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefinitionDoc {
  #[serde(default)]
  pub uid: String,
  #[serde(default)]
  pub id: String,
  #[serde(default)]
  pub title: String,
  #[serde(default)]
  pub version: String,
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub release_stage: ReleaseStage,
  #[serde(default)]
  pub public: bool,
  #[serde(default)]
  pub tombstone: bool,
  #[serde(default, rename = "type")]
  pub component_type: ComponentType,
  #[serde(default)]
  pub icon: String,
  #[serde(default)]
  pub vendor: String,
  #[serde(default)]
  pub source_url: String,
  #[serde(default)]
  pub documentation_url: String,
  /// Ordered task names to expose. Empty means every task in `tasks.json`.
  #[serde(default)]
  pub available_tasks: Vec<String>,
}

impl DefinitionDoc {
  pub fn from_slice(bytes: &[u8]) -> Result<Self, crate::ConfigError> {
    serde_json::from_slice(bytes).map_err(|source| crate::ConfigError::Json {
      document: "definition.json".to_string(),
      source,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_definition_doc() {
    let doc = DefinitionDoc::from_slice(
      br#"{
        "uid": "5b1e3e5c-3c2c-4b6f-9f0e-4a7c9f4d2a10",
        "id": "restapi",
        "title": "REST API",
        "type": "COMPONENT_TYPE_APPLICATION",
        "releaseStage": "RELEASE_STAGE_BETA",
        "availableTasks": ["TASK_GET", "TASK_POST"],
        "public": true
      }"#,
    )
    .unwrap();

    assert_eq!(doc.id, "restapi");
    assert_eq!(doc.component_type, ComponentType::Application);
    assert_eq!(doc.release_stage, ReleaseStage::Beta);
    assert_eq!(doc.available_tasks, vec!["TASK_GET", "TASK_POST"]);
    assert!(!doc.tombstone);
  }

  #[test]
  fn test_missing_optional_fields_default() {
    let doc = DefinitionDoc::from_slice(br#"{ "id": "json" }"#).unwrap();
    assert_eq!(doc.uid, "");
    assert_eq!(doc.component_type, ComponentType::Generic);
    assert_eq!(doc.release_stage, ReleaseStage::Unspecified);
  }

  #[test]
  fn test_short_stage_aliases() {
    let doc = DefinitionDoc::from_slice(br#"{ "releaseStage": "alpha", "type": "operator" }"#).unwrap();
    assert_eq!(doc.release_stage, ReleaseStage::Alpha);
    assert_eq!(doc.component_type, ComponentType::Operator);
  }
}
