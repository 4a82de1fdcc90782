//! Component errors.
//!
//! Every variant carries a technical message (its `Display`) for logs and a
//! user-facing message from [`ComponentError::user_message`] that is safe to
//! show to end users.

use instill_schema::ValidationError;
use instill_value::ValueError;

/// Errors produced while creating or running an execution.
#[derive(Debug, thiserror::Error)]
pub enum ComponentError {
  /// The component does not offer the requested task.
  #[error("not supported task: {task}")]
  UnsupportedTask { task: String },

  /// A setup field references a global secret that is not configured.
  #[error("unresolved global secret for setup field '{field}'")]
  UnresolvedSecret { field: String },

  /// Inputs or outputs do not match their schema.
  #[error("invalid {target}: {}", join_errors(.errors))]
  Validation {
    target: &'static str,
    errors: Vec<ValidationError>,
  },

  /// Caller-supplied data that the schema accepts but the component cannot use.
  #[error("invalid input: {message}")]
  InvalidInput {
    message: String,
    user_message: String,
  },

  /// A vendor or downstream service failed.
  #[error("upstream request failed: {message}")]
  Upstream {
    status: Option<u16>,
    message: String,
    user_message: String,
  },

  /// The caller cancelled the execution.
  #[error("execution cancelled")]
  Cancelled,

  /// The execution ran past its deadline.
  #[error("deadline exceeded")]
  DeadlineExceeded,

  /// A record could not be converted to or from the component's types.
  #[error(transparent)]
  Value(#[from] ValueError),

  /// The usage handler refused or failed.
  #[error("usage check failed: {message}")]
  Usage {
    message: String,
    user_message: String,
  },

  /// A bug or broken invariant inside a component.
  #[error("internal error: {message}")]
  Internal { message: String },
}

fn join_errors(errors: &[ValidationError]) -> String {
  errors
    .iter()
    .map(ToString::to_string)
    .collect::<Vec<_>>()
    .join("; ")
}

impl ComponentError {
  pub fn unsupported_task(task: impl Into<String>) -> Self {
    Self::UnsupportedTask { task: task.into() }
  }

  pub fn invalid_input(message: impl Into<String>, user_message: impl Into<String>) -> Self {
    Self::InvalidInput {
      message: message.into(),
      user_message: user_message.into(),
    }
  }

  pub fn upstream(
    status: Option<u16>,
    message: impl Into<String>,
    user_message: impl Into<String>,
  ) -> Self {
    Self::Upstream {
      status,
      message: message.into(),
      user_message: user_message.into(),
    }
  }

  pub fn usage(message: impl Into<String>, user_message: impl Into<String>) -> Self {
    Self::Usage {
      message: message.into(),
      user_message: user_message.into(),
    }
  }

  pub fn internal(message: impl Into<String>) -> Self {
    Self::Internal {
      message: message.into(),
    }
  }

  /// A message suitable for end users.
  pub fn user_message(&self) -> String {
    match self {
      Self::UnsupportedTask { task } => format!("{task} task is not supported."),
      Self::UnresolvedSecret { field } => {
        format!("The configuration field {field} can't reference a global secret.")
      }
      Self::Validation { errors, .. } => join_errors(errors),
      Self::InvalidInput { user_message, .. }
      | Self::Upstream { user_message, .. }
      | Self::Usage { user_message, .. } => user_message.clone(),
      Self::Cancelled => "The execution was cancelled.".to_string(),
      Self::DeadlineExceeded => {
        "The execution took too long to complete. Please try again later.".to_string()
      }
      Self::Value(_) => "The data couldn't be read. Please check its format.".to_string(),
      Self::Internal { .. } => "Something went wrong while running the component.".to_string(),
    }
  }

  /// Whether retrying the same request may succeed.
  pub fn is_retriable(&self) -> bool {
    match self {
      Self::DeadlineExceeded => true,
      Self::Upstream { status, .. } => match status {
        None => true,
        Some(code) => *code == 429 || *code >= 500,
      },
      _ => false,
    }
  }
}
