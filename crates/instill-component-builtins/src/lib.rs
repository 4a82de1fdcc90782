//! Instill Component Builtins
//!
//! Components compiled into the binary:
//! - [`Base64`]: encode and decode base64 strings.
//! - [`Json`]: convert between JSON values and JSON strings.
//! - [`RestApi`]: send HTTP requests with configurable authentication.
//!
//! Each one embeds its definition documents and loads them once per process.

mod base64;
mod json;
mod restapi;

use std::sync::Arc;

use instill_component::Component;
use instill_config::ComponentSecrets;

pub use crate::base64::Base64;
pub use crate::json::Json;
pub use crate::restapi::RestApi;

/// Every builtin component, in registration order, with its global secrets
/// attached.
pub fn components(secrets: &ComponentSecrets) -> Vec<Arc<dyn Component>> {
  let secrets_for = |id: &str| secrets.get(id).cloned().unwrap_or_default();

  vec![
    Arc::new(Base64::new()),
    Arc::new(Json::new()),
    Arc::new(RestApi::new().with_secrets(secrets_for(RestApi::ID))),
  ]
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_components_have_unique_ids() {
    let components = components(&ComponentSecrets::new());
    let ids: Vec<&str> = components.iter().map(|c| c.id()).collect();
    assert_eq!(ids, vec!["base64", "json", "restapi"]);

    let mut uids: Vec<_> = components.iter().map(|c| c.uid()).collect();
    uids.sort();
    uids.dedup();
    assert_eq!(uids.len(), 3);
  }
}
