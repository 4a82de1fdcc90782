//! Configuration errors.

use std::path::PathBuf;

/// Errors that can occur while reading configuration documents.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  /// A configuration file could not be read.
  #[error("failed to read {path}: {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  /// A JSON document did not parse.
  #[error("invalid JSON in {document}: {source}")]
  Json {
    document: String,
    #[source]
    source: serde_json::Error,
  },

  /// A YAML document did not parse.
  #[error("invalid YAML in {document}: {source}")]
  Yaml {
    document: String,
    #[source]
    source: serde_yaml::Error,
  },

  /// The file extension does not name a supported format.
  #[error("unsupported configuration format: {path} (expected .json, .yaml or .yml)")]
  UnsupportedFormat { path: PathBuf },
}
