//! Value conversion errors.

/// Errors raised while moving data in and out of [`crate::Record`]s.
#[derive(Debug, thiserror::Error)]
pub enum ValueError {
  /// A record did not match the shape of the target type.
  #[error("failed to decode record: {source}")]
  Decode {
    #[source]
    source: serde_json::Error,
  },

  /// A value could not be serialized into a record.
  #[error("failed to encode record: {source}")]
  Encode {
    #[source]
    source: serde_json::Error,
  },

  /// Serialization produced something other than an object.
  #[error("expected an object, got {kind}")]
  NotAnObject { kind: &'static str },

  /// A string was not valid base64.
  #[error("invalid base64 payload: {source}")]
  Base64 {
    #[source]
    source: base64::DecodeError,
  },

  /// A string looked like a data URI but was malformed.
  #[error("invalid data URI: {message}")]
  DataUri { message: String },
}

impl ValueError {
  pub fn data_uri(message: impl Into<String>) -> Self {
    Self::DataUri {
      message: message.into(),
    }
  }
}
