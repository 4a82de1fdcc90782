use instill_component::ComponentError;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur when working with the component store.
#[derive(Debug, Error)]
pub enum RegistryError {
  /// No component is registered under this UID or ID.
  #[error("component definition not found: {key}")]
  NotFound { key: String },

  /// Another component is already registered under this UID.
  #[error("component uid already registered: {uid}")]
  DuplicateUid { uid: Uuid },

  /// Another component is already registered under this ID.
  #[error("component id already registered: {id}")]
  DuplicateId { id: String },

  /// The component itself failed.
  #[error(transparent)]
  Component(#[from] ComponentError),
}

impl RegistryError {
  pub(crate) fn not_found(key: impl ToString) -> Self {
    Self::NotFound {
      key: key.to_string(),
    }
  }

  /// A message suitable for end users.
  pub fn user_message(&self) -> String {
    match self {
      Self::NotFound { key } => format!("Component {key} doesn't exist."),
      Self::DuplicateUid { .. } | Self::DuplicateId { .. } => {
        "The component registry is misconfigured.".to_string()
      }
      Self::Component(e) => e.user_message(),
    }
  }

  pub fn is_retriable(&self) -> bool {
    match self {
      Self::Component(e) => e.is_retriable(),
      _ => false,
    }
  }
}
