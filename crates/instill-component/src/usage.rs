//! Usage accounting hooks.
//!
//! The host may meter executions, for example to enforce credit limits when
//! a global secret is used. A [`UsageHandlerCreator`] is consulted for every
//! execution; its handler checks the inputs before the run and collects the
//! outputs after it.

use async_trait::async_trait;
use instill_value::Record;

use crate::context::Context;
use crate::error::ComponentError;
use crate::system::SystemVariables;

/// What a creator knows about the execution it meters.
#[derive(Debug, Clone, Copy)]
pub struct UsageContext<'a> {
  pub component_id: &'a str,
  pub task: &'a str,
  pub uses_secret: bool,
  pub system_variables: &'a SystemVariables,
}

#[async_trait]
pub trait UsageHandler: Send + Sync {
  /// Called with validated inputs before the run. An error aborts it.
  async fn check(&self, ctx: &Context, inputs: &[Record]) -> Result<(), ComponentError>;

  /// Called with inputs and validated outputs after a successful run.
  async fn collect(
    &self,
    ctx: &Context,
    inputs: &[Record],
    outputs: &[Record],
  ) -> Result<(), ComponentError>;
}

pub trait UsageHandlerCreator: Send + Sync {
  fn create(&self, ctx: &UsageContext<'_>) -> Result<Box<dyn UsageHandler>, ComponentError>;
}

impl<F> UsageHandlerCreator for F
where
  F: Fn(&UsageContext<'_>) -> Result<Box<dyn UsageHandler>, ComponentError> + Send + Sync,
{
  fn create(&self, ctx: &UsageContext<'_>) -> Result<Box<dyn UsageHandler>, ComponentError> {
    self(ctx)
  }
}

/// Accepts everything and records nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopUsageHandler;

#[async_trait]
impl UsageHandler for NoopUsageHandler {
  async fn check(&self, _ctx: &Context, _inputs: &[Record]) -> Result<(), ComponentError> {
    Ok(())
  }

  async fn collect(
    &self,
    _ctx: &Context,
    _inputs: &[Record],
    _outputs: &[Record],
  ) -> Result<(), ComponentError> {
    Ok(())
  }
}

impl UsageHandlerCreator for NoopUsageHandler {
  fn create(&self, _ctx: &UsageContext<'_>) -> Result<Box<dyn UsageHandler>, ComponentError> {
    Ok(Box::new(NoopUsageHandler))
  }
}
