//! Component and execution contracts.

use std::sync::Arc;

use async_trait::async_trait;
use instill_definition::ComponentDefinition;
use instill_value::Record;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::base::ComponentBase;
use crate::context::Context;
use crate::error::ComponentError;
use crate::setup::Setup;
use crate::system::SystemVariables;

/// Caller-side configuration used to tailor a dynamic definition, such as
/// a partially filled pipeline node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentConfig {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub task: Option<String>,
  #[serde(default)]
  pub setup: Setup,
  #[serde(default)]
  pub input: Record,
}

/// Everything a component needs to build an execution. The setup has
/// already had its secret references resolved.
#[derive(Debug, Clone)]
pub struct ComponentExecution {
  pub definition: Arc<ComponentDefinition>,
  pub task: String,
  pub setup: Setup,
  pub system_variables: SystemVariables,
}

/// A pluggable unit offering one or more tasks.
///
/// Implementations hold a [`ComponentBase`] and override what differs from
/// the defaults: at minimum [`Component::create_execution`], and
/// [`Component::definition`] when the definition depends on the caller.
#[async_trait]
pub trait Component: Send + Sync {
  fn base(&self) -> &ComponentBase;

  fn uid(&self) -> Uuid {
    self.base().definition().uid
  }

  fn id(&self) -> &str {
    &self.base().definition().id
  }

  /// The definition as seen by this caller. The default returns a copy of
  /// the static definition; dynamic components patch that copy and should
  /// fall back to it when their lookups fail.
  async fn definition(
    &self,
    _system_variables: &SystemVariables,
    _config: Option<&ComponentConfig>,
  ) -> Result<ComponentDefinition, ComponentError> {
    Ok(self.base().definition().clone())
  }

  /// Build an execution for a task this component's definition declares.
  fn create_execution(
    &self,
    execution: ComponentExecution,
  ) -> Result<Box<dyn Execution>, ComponentError>;

  /// Check that a setup can reach the component's service.
  async fn test(
    &self,
    _system_variables: &SystemVariables,
    _setup: &Setup,
  ) -> Result<(), ComponentError> {
    Ok(())
  }

  fn is_secret_field(&self, path: &str) -> bool {
    self.base().is_secret_field(path)
  }
}

/// One bound task, ready to process batches.
#[async_trait]
pub trait Execution: Send + Sync {
  /// Process a batch. Must return exactly one output per input, in input
  /// order, or an error for the whole batch.
  async fn execute(&self, ctx: &Context, inputs: Vec<Record>) -> Result<Vec<Record>, ComponentError>;
}
