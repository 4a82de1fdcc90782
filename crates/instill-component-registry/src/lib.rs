//! Instill Component Registry
//!
//! The [`Store`] holds every registered component, keyed by definition UID
//! and by ID, and is the entry point for discovery and execution:
//!
//! - [`Store::list_definitions`] / [`Store::definition_by_uid`] /
//!   [`Store::definition_by_id`] return per-caller copies of definitions.
//! - [`Store::create_execution`] resolves a setup's secret references and
//!   binds a task, producing an [`ExecutionHandle`].
//! - [`Store::test`] checks a setup against the component's service.
//!
//! [`init`] builds the process-wide store from the builtin components.

mod error;
mod store;

pub use error::RegistryError;
pub use store::{Store, StoreConfig, global, init};

pub use instill_component::ExecutionHandle;
