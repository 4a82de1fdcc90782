//! Instill Config
//!
//! Serde models for the documents a component ships with and for the
//! process-level runtime configuration.
//!
//! A component is described by three JSON documents:
//! - `definition.json`: identity, presentation and lifecycle metadata ([`DefinitionDoc`]).
//! - `setup.json`: the schema of the connection setup (optional).
//! - `tasks.json`: one entry per task with its input and output schema ([`TasksDoc`]).
//!
//! Schema bodies stay as raw [`serde_json::Value`]s here; reference
//! resolution and annotation handling happen in `instill-schema`.

mod definition;
mod error;
mod runtime;
mod tasks;

pub use definition::{ComponentType, DefinitionDoc, ReleaseStage};
pub use error::ConfigError;
pub use runtime::{ComponentSecrets, RuntimeConfig};
pub use tasks::{TaskDoc, TasksDoc};
