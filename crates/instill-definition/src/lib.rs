//! Instill Definition
//!
//! A [`ComponentDefinition`] is the immutable, fully-resolved description of
//! a component: identity, tasks, and the schemas for setup, task input and
//! task output. It is built once from the JSON documents the component ships
//! with (see [`DefinitionFiles`]) and cloned whenever a caller needs a
//! per-request variant.
//!
//! Loading also generates the editor-facing component specification: one
//! `oneOf` branch per task, where every input leaf lists the ways the field
//! may be filled (literal value, `${...}` reference, or template).

mod component_spec;
mod definition;
mod error;
mod loader;

pub use definition::{
  ComponentDefinition, DataSpecification, Specification, TaskDefinition, task_title,
};
pub use error::DefinitionError;
pub use instill_config::{ComponentType, ReleaseStage};
pub use loader::DefinitionFiles;
