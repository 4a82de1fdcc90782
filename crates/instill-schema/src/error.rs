//! Schema errors.

/// Errors raised while preparing a schema for use.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
  /// A `$ref` names a document that was never registered.
  #[error("unknown schema document '{document}'")]
  UnknownDocument { document: String },

  /// A `$ref` pointer does not exist in its target document.
  #[error("unresolved reference '{reference}' in {document}")]
  UnresolvedRef { reference: String, document: String },

  /// References form a loop.
  #[error("reference cycle: {chain}")]
  RefCycle { chain: String },

  /// An `instill*` annotation has the wrong shape.
  #[error("invalid annotation {keyword} at {path}: {message}")]
  InvalidAnnotation {
    keyword: &'static str,
    path: String,
    message: String,
  },
}
