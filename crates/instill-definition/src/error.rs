//! Definition loading errors.

use instill_config::ConfigError;
use instill_schema::SchemaError;

/// Errors raised while building a [`crate::ComponentDefinition`].
#[derive(Debug, thiserror::Error)]
pub enum DefinitionError {
  /// A document failed to parse.
  #[error(transparent)]
  Config(#[from] ConfigError),

  /// A required `definition.json` field is missing or empty.
  #[error("definition.json: missing required field '{field}'")]
  MissingField { field: &'static str },

  /// The definition uid is not a UUID.
  #[error("definition.json: invalid uid '{uid}': {source}")]
  InvalidUid {
    uid: String,
    #[source]
    source: uuid::Error,
  },

  /// No tasks are defined.
  #[error("component '{id}' defines no tasks")]
  NoTasks { id: String },

  /// A listed task has no entry in `tasks.json`.
  #[error("task {task} is listed in availableTasks but not defined in tasks.json")]
  UnknownTask { task: String },

  /// A task is listed twice in `availableTasks`.
  #[error("task {task} is listed more than once")]
  DuplicateTask { task: String },

  /// A task lacks its input or output schema.
  #[error("task {task}: missing {field} schema")]
  MissingSchema { task: String, field: &'static str },

  /// A schema could not be resolved or normalised.
  #[error("{context}: {source}")]
  Schema {
    context: String,
    #[source]
    source: SchemaError,
  },

  /// A task input cannot be turned into an editor specification.
  #[error("task {task}: {message}")]
  ComponentSpec { task: String, message: String },
}

impl DefinitionError {
  pub fn schema(context: impl Into<String>, source: SchemaError) -> Self {
    Self::Schema {
      context: context.into(),
      source,
    }
  }
}
