//! Instill Schema
//!
//! Component schemas are JSON Schema documents extended with `instill*`
//! annotations that drive the pipeline editor. This crate does everything
//! the runtime needs with them:
//!
//! - [`SchemaFs`]: resolve `$ref`s across a set of named documents.
//! - [`normalize`]: compile `array:` formats and fill annotation defaults.
//! - [`apply_defaults`]: materialise declared defaults into a record.
//! - [`validate`] / [`validate_records`]: check values against a schema.
//! - [`credential_fields`]: setup fields marked as secrets.
//! - [`set_enum`] / [`set_property`]: targeted edits for dynamic definitions.

mod annotations;
mod credentials;
mod defaults;
mod error;
mod refs;
mod validate;
mod walk;

pub use annotations::{UpstreamType, normalize};
pub use credentials::credential_fields;
pub use defaults::apply_defaults;
pub use error::SchemaError;
pub use refs::SchemaFs;
pub use validate::{ValidationError, validate, validate_records};
pub use walk::{set_enum, set_property};
