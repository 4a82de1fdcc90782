//! Cancellation and deadlines for an execution.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::ComponentError;

/// Timeout for metadata calls to control-plane services.
pub const CONTROL_PLANE_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for model inference calls.
pub const INFERENCE_TIMEOUT: Duration = Duration::from_secs(300);

/// Carries the caller's cancellation signal and optional deadline into an
/// execution.
///
/// # Usage
///
/// ```ignore
/// let ctx = Context::new().with_timeout(Duration::from_secs(10));
/// let outputs = handle.execute(&ctx, inputs).await?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct Context {
  cancel: CancellationToken,
  deadline: Option<Instant>,
}

impl Context {
  pub fn new() -> Self {
    Self::default()
  }

  /// A context cancelled through `cancel`.
  pub fn with_cancellation(cancel: CancellationToken) -> Self {
    Self {
      cancel,
      deadline: None,
    }
  }

  /// Tighten the deadline to at most `timeout` from now.
  pub fn with_timeout(self, timeout: Duration) -> Self {
    self.with_deadline(Instant::now() + timeout)
  }

  /// Tighten the deadline. An earlier existing deadline is kept.
  pub fn with_deadline(mut self, deadline: Instant) -> Self {
    self.deadline = Some(match self.deadline {
      Some(existing) => existing.min(deadline),
      None => deadline,
    });
    self
  }

  /// A context that is cancelled with this one and can also be cancelled
  /// on its own.
  pub fn child(&self) -> Self {
    Self {
      cancel: self.cancel.child_token(),
      deadline: self.deadline,
    }
  }

  pub fn cancel(&self) {
    self.cancel.cancel();
  }

  pub fn is_cancelled(&self) -> bool {
    self.cancel.is_cancelled()
  }

  pub fn deadline(&self) -> Option<Instant> {
    self.deadline
  }

  /// Time left before the deadline, if there is one.
  pub fn remaining(&self) -> Option<Duration> {
    self
      .deadline
      .map(|d| d.saturating_duration_since(Instant::now()))
  }

  /// `default`, shortened to the time left before the deadline.
  pub fn timeout_or(&self, default: Duration) -> Duration {
    match self.remaining() {
      Some(remaining) => remaining.min(default),
      None => default,
    }
  }

  /// Drive `future` until it completes, the context is cancelled, or the
  /// deadline passes.
  pub async fn run<F, T>(&self, future: F) -> Result<T, ComponentError>
  where
    F: Future<Output = Result<T, ComponentError>>,
  {
    if self.is_cancelled() {
      return Err(ComponentError::Cancelled);
    }
    if self.deadline.is_some_and(|d| d <= Instant::now()) {
      return Err(ComponentError::DeadlineExceeded);
    }

    tokio::select! {
      biased;
      _ = self.cancel.cancelled() => Err(ComponentError::Cancelled),
      _ = sleep_until(self.deadline) => Err(ComponentError::DeadlineExceeded),
      result = future => result,
    }
  }
}

async fn sleep_until(deadline: Option<Instant>) {
  match deadline {
    Some(deadline) => tokio::time::sleep_until(deadline).await,
    None => std::future::pending().await,
  }
}
