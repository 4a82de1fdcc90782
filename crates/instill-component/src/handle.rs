//! The execution envelope.

use std::sync::Arc;

use instill_schema::{apply_defaults, validate_records};
use instill_value::Record;
use serde_json::Value;
use tracing::{error, info, instrument};

use crate::component::{Component, ComponentExecution, Execution};
use crate::context::Context;
use crate::error::ComponentError;
use crate::setup::Setup;
use crate::system::SystemVariables;
use crate::usage::{UsageContext, UsageHandlerCreator};

/// A component execution wrapped with schema defaults, validation, usage
/// accounting and cancellation.
///
/// # Usage
///
/// ```ignore
/// let handle = ExecutionHandle::create(component, vars, setup, "TASK_GET", usage)?;
/// let outputs = handle.execute(&Context::new(), inputs).await?;
/// ```
pub struct ExecutionHandle {
  component_id: String,
  task: String,
  uses_secret: bool,
  input_schema: Value,
  output_schema: Value,
  system_variables: SystemVariables,
  execution: Box<dyn Execution>,
  usage: Arc<dyn UsageHandlerCreator>,
}

impl std::fmt::Debug for ExecutionHandle {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ExecutionHandle")
      .field("component_id", &self.component_id)
      .field("task", &self.task)
      .field("uses_secret", &self.uses_secret)
      .finish_non_exhaustive()
  }
}

impl ExecutionHandle {
  /// Bind `component` to `task` with `setup`.
  ///
  /// Fails with [`ComponentError::UnsupportedTask`] if the component's
  /// definition lacks the task, or [`ComponentError::UnresolvedSecret`] if
  /// the setup references a secret that is not configured.
  pub fn create(
    component: &dyn Component,
    system_variables: SystemVariables,
    setup: Setup,
    task: &str,
    usage: Arc<dyn UsageHandlerCreator>,
  ) -> Result<Self, ComponentError> {
    let base = component.base();
    let definition = base.definition_arc().clone();
    let spec = definition
      .data_specification(task)
      .ok_or_else(|| ComponentError::unsupported_task(task))?;
    let (input_schema, output_schema) = (spec.input.clone(), spec.output.clone());

    let resolved = base.resolve_setup(setup)?;
    let execution = component.create_execution(ComponentExecution {
      definition: definition.clone(),
      task: task.to_string(),
      setup: resolved.setup,
      system_variables: system_variables.clone(),
    })?;

    Ok(Self {
      component_id: definition.id.clone(),
      task: task.to_string(),
      uses_secret: resolved.uses_secret,
      input_schema,
      output_schema,
      system_variables,
      execution,
      usage,
    })
  }

  pub fn component_id(&self) -> &str {
    &self.component_id
  }

  pub fn task(&self) -> &str {
    &self.task
  }

  /// Whether the setup was filled from a global secret.
  pub fn uses_secret(&self) -> bool {
    self.uses_secret
  }

  /// Run a batch: one output per input, in input order.
  #[instrument(
    name = "component_execute",
    skip(self, ctx, inputs),
    fields(
      component_id = %self.component_id,
      task = %self.task,
      batch_size = inputs.len(),
    )
  )]
  pub async fn execute(
    &self,
    ctx: &Context,
    inputs: Vec<Record>,
  ) -> Result<Vec<Record>, ComponentError> {
    info!(uses_secret = self.uses_secret, "execution started");

    let result = self.execute_inner(ctx, inputs).await;

    match &result {
      Ok(outputs) => info!(outputs = outputs.len(), "execution completed"),
      Err(e) => error!(error = %e, "execution failed"),
    }

    result
  }

  async fn execute_inner(
    &self,
    ctx: &Context,
    mut inputs: Vec<Record>,
  ) -> Result<Vec<Record>, ComponentError> {
    if ctx.is_cancelled() {
      return Err(ComponentError::Cancelled);
    }

    for input in &mut inputs {
      apply_defaults(&self.input_schema, input);
    }
    validate_records(&self.input_schema, &inputs, "inputs")
      .map_err(|errors| ComponentError::Validation {
        target: "inputs",
        errors,
      })?;

    let usage = self.usage.create(&UsageContext {
      component_id: &self.component_id,
      task: &self.task,
      uses_secret: self.uses_secret,
      system_variables: &self.system_variables,
    })?;
    usage.check(ctx, &inputs).await?;

    let outputs = ctx
      .run(self.execution.execute(ctx, inputs.clone()))
      .await?;

    if outputs.len() != inputs.len() {
      return Err(ComponentError::internal(format!(
        "{} task returned {} outputs for {} inputs",
        self.task,
        outputs.len(),
        inputs.len()
      )));
    }

    validate_records(&self.output_schema, &outputs, "outputs")
      .map_err(|errors| ComponentError::Validation {
        target: "outputs",
        errors,
      })?;

    usage.collect(ctx, &inputs, &outputs).await?;
    Ok(outputs)
  }
}
