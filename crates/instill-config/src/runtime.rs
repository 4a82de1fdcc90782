//! Process-level runtime configuration.
//!
//! ```yaml
//! log_filter: "info,instill_component=debug"
//! secrets:
//!   restapi:
//!     authentication.token: "sk-..."
//!   openai:
//!     api-key: "sk-..."
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Global secrets: component id → setup field path → secret value.
pub type ComponentSecrets = HashMap<String, HashMap<String, String>>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
  #[serde(default)]
  pub secrets: ComponentSecrets,

  /// Tracing filter directive used when `RUST_LOG` is unset.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub log_filter: Option<String>,
}

impl RuntimeConfig {
  /// Load from a `.json`, `.yaml` or `.yml` file.
  pub fn load(path: &Path) -> Result<Self, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
      path: path.to_path_buf(),
      source,
    })?;
    let document = path.display().to_string();

    match path.extension().and_then(|e| e.to_str()) {
      Some("json") => Self::from_json_str(&content, &document),
      Some("yaml") | Some("yml") => Self::from_yaml_str(&content, &document),
      _ => Err(ConfigError::UnsupportedFormat {
        path: path.to_path_buf(),
      }),
    }
  }

  pub fn from_json_str(content: &str, document: &str) -> Result<Self, ConfigError> {
    serde_json::from_str(content).map_err(|source| ConfigError::Json {
      document: document.to_string(),
      source,
    })
  }

  pub fn from_yaml_str(content: &str, document: &str) -> Result<Self, ConfigError> {
    serde_yaml::from_str(content).map_err(|source| ConfigError::Yaml {
      document: document.to_string(),
      source,
    })
  }

  /// Secrets configured for one component, empty if none.
  pub fn secrets_for(&self, component_id: &str) -> HashMap<String, String> {
    self.secrets.get(component_id).cloned().unwrap_or_default()
  }
}
