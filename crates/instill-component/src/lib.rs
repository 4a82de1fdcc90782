//! Instill Component
//!
//! The contracts every component implements and the machinery wrapped
//! around every execution.
//!
//! A [`Component`] owns a [`ComponentBase`] (its static definition plus any
//! global secrets) and turns a setup and task into an [`Execution`]. Callers
//! never run an `Execution` directly: [`ExecutionHandle::create`] resolves
//! secret references in the setup, and [`ExecutionHandle::execute`] applies
//! defaults, validates inputs, checks usage, runs the batch under the
//! caller's [`Context`], validates outputs and collects usage.

mod base;
mod batch;
mod component;
mod context;
mod error;
mod handle;
mod setup;
mod system;
mod usage;

pub use base::ComponentBase;
pub use batch::{execute_concurrent, execute_sequential};
pub use component::{Component, ComponentConfig, ComponentExecution, Execution};
pub use context::{CONTROL_PLANE_TIMEOUT, Context, INFERENCE_TIMEOUT};
pub use error::ComponentError;
pub use handle::ExecutionHandle;
pub use setup::{ResolvedSetup, SECRET_KEYWORD, Setup};
pub use system::SystemVariables;
pub use usage::{NoopUsageHandler, UsageContext, UsageHandler, UsageHandlerCreator};

pub use instill_definition::{ComponentDefinition, DefinitionError, DefinitionFiles};
pub use instill_value::Record;
