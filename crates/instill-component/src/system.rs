//! Per-request system variables.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use instill_value::Record;

/// Request-scoped values supplied by the pipeline backend: the calling user,
/// the namespace being billed, forwarded auth headers and backend addresses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SystemVariables(Record);

impl SystemVariables {
  pub const USER_UID: &'static str = "__PIPELINE_USER_UID";
  pub const REQUESTER_UID: &'static str = "__PIPELINE_REQUESTER_UID";
  pub const HEADER_AUTHORIZATION: &'static str = "__PIPELINE_HEADER_AUTHORIZATION";
  pub const MODEL_BACKEND: &'static str = "__MODEL_BACKEND";
  pub const MGMT_BACKEND: &'static str = "__MGMT_BACKEND";

  pub fn new() -> Self {
    Self::default()
  }

  /// Builder-style insert.
  pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
    self.0.insert(key.into(), value.into());
    self
  }

  pub fn get(&self, key: &str) -> Option<&Value> {
    self.0.get(key)
  }

  pub fn get_str(&self, key: &str) -> Option<&str> {
    self.0.get(key).and_then(Value::as_str)
  }

  pub fn user_uid(&self) -> Option<&str> {
    self.get_str(Self::USER_UID)
  }

  /// The namespace acting on behalf of the user, falling back to the user.
  pub fn requester_uid(&self) -> Option<&str> {
    self
      .get_str(Self::REQUESTER_UID)
      .filter(|uid| !uid.is_empty())
      .or_else(|| self.user_uid())
  }

  pub fn header_authorization(&self) -> Option<&str> {
    self.get_str(Self::HEADER_AUTHORIZATION)
  }

  pub fn model_backend(&self) -> Option<&str> {
    self.get_str(Self::MODEL_BACKEND)
  }

  pub fn mgmt_backend(&self) -> Option<&str> {
    self.get_str(Self::MGMT_BACKEND)
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }
}

impl From<Record> for SystemVariables {
  fn from(record: Record) -> Self {
    Self(record)
  }
}
