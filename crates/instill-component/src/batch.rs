//! Helpers for running a per-record function over a batch.

use std::future::Future;

use futures::future::try_join_all;
use instill_value::Record;

use crate::context::Context;
use crate::error::ComponentError;

/// Process records one at a time, in order, stopping at the first failure.
pub async fn execute_sequential<F, Fut>(
  ctx: &Context,
  inputs: Vec<Record>,
  mut f: F,
) -> Result<Vec<Record>, ComponentError>
where
  F: FnMut(Record) -> Fut,
  Fut: Future<Output = Result<Record, ComponentError>>,
{
  let mut outputs = Vec::with_capacity(inputs.len());
  for input in inputs {
    if ctx.is_cancelled() {
      return Err(ComponentError::Cancelled);
    }
    outputs.push(f(input).await?);
  }
  Ok(outputs)
}

/// Process records concurrently. Outputs keep input order; the first
/// failure fails the batch and drops the remaining work.
pub async fn execute_concurrent<F, Fut>(
  ctx: &Context,
  inputs: Vec<Record>,
  f: F,
) -> Result<Vec<Record>, ComponentError>
where
  F: FnMut(Record) -> Fut,
  Fut: Future<Output = Result<Record, ComponentError>>,
{
  ctx.run(try_join_all(inputs.into_iter().map(f))).await
}
