//! Setup records and global secret references.
//!
//! A setup field marked `instillCredentialField` may hold the sentinel
//! [`SECRET_KEYWORD`] instead of a real credential. Before the component
//! sees the setup, the sentinel is replaced with the secret configured for
//! that field at startup.

use std::collections::HashMap;

use instill_value::{Record, get_path, set_path};
use serde_json::Value;

use crate::error::ComponentError;

/// Connection setup for a component: credentials, endpoints and similar
/// per-connection settings.
pub type Setup = Record;

/// Sentinel a credential field holds to ask for the globally configured
/// secret.
pub const SECRET_KEYWORD: &str = "__INSTILL_SECRET";

/// A setup with secret references substituted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedSetup {
  pub setup: Setup,
  /// Whether any field was filled from a global secret.
  pub uses_secret: bool,
}

/// Substitute the sentinel in each credential field with its secret.
///
/// Only fields listed in `credential_fields` are considered, so a sentinel
/// typed into any other field is passed through untouched.
pub(crate) fn resolve_secrets(
  mut setup: Setup,
  credential_fields: &[String],
  secrets: &HashMap<String, String>,
) -> Result<ResolvedSetup, ComponentError> {
  let mut uses_secret = false;

  for field in credential_fields {
    let references_secret = matches!(
      get_path(&setup, field),
      Some(Value::String(value)) if value == SECRET_KEYWORD
    );
    if !references_secret {
      continue;
    }

    let secret = secrets
      .get(field)
      .ok_or_else(|| ComponentError::UnresolvedSecret {
        field: field.clone(),
      })?;
    set_path(&mut setup, field, Value::String(secret.clone()));
    uses_secret = true;
  }

  Ok(ResolvedSetup { setup, uses_secret })
}
