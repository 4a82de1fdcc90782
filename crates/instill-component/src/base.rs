//! State shared by every component implementation.

use std::collections::HashMap;
use std::sync::Arc;

use instill_definition::{ComponentDefinition, DefinitionError, DefinitionFiles};
use tracing::debug;

use crate::error::ComponentError;
use crate::setup::{ResolvedSetup, Setup, resolve_secrets};

/// A component's static definition, the credential fields declared by its
/// setup schema, and the global secrets configured for it.
///
/// The definition is loaded once per process and shared; each
/// `ComponentBase` only adds the secrets.
#[derive(Debug, Clone)]
pub struct ComponentBase {
  definition: Arc<ComponentDefinition>,
  credential_fields: Vec<String>,
  secrets: HashMap<String, String>,
}

impl ComponentBase {
  pub fn new(definition: Arc<ComponentDefinition>) -> Self {
    let credential_fields = instill_schema::credential_fields(&definition.spec.setup_specification);
    Self {
      definition,
      credential_fields,
      secrets: HashMap::new(),
    }
  }

  /// Load a definition from its documents and wrap it.
  pub fn load(files: DefinitionFiles<'_>) -> Result<Self, DefinitionError> {
    Ok(Self::new(Arc::new(ComponentDefinition::load(files)?)))
  }

  /// Attach global secrets, keyed by setup field path. Secrets for fields
  /// that are not credential fields are ignored.
  pub fn with_secrets(mut self, secrets: HashMap<String, String>) -> Self {
    let (accepted, ignored): (HashMap<_, _>, HashMap<_, _>) = secrets
      .into_iter()
      .partition(|(field, _)| self.credential_fields.contains(field));
    if !ignored.is_empty() {
      debug!(
        component_id = %self.definition.id,
        fields = ?ignored.keys().collect::<Vec<_>>(),
        "ignoring secrets for non-credential fields"
      );
    }
    self.secrets = accepted;
    self
  }

  pub fn definition(&self) -> &ComponentDefinition {
    &self.definition
  }

  pub fn definition_arc(&self) -> &Arc<ComponentDefinition> {
    &self.definition
  }

  pub fn credential_fields(&self) -> &[String] {
    &self.credential_fields
  }

  pub fn has_secret(&self, field: &str) -> bool {
    self.secrets.contains_key(field)
  }

  /// Whether a setup field path holds a credential.
  pub fn is_secret_field(&self, path: &str) -> bool {
    self.credential_fields.iter().any(|f| f == path)
  }

  /// Replace secret references in `setup` with the configured secrets.
  pub fn resolve_setup(&self, setup: Setup) -> Result<ResolvedSetup, ComponentError> {
    resolve_secrets(setup, &self.credential_fields, &self.secrets)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  const DEFINITION: &[u8] = br#"{
    "uid": "9d8c7b6a-5f4e-4d3c-8b2a-1f0e9d8c7b6a",
    "id": "vendor",
    "title": "Vendor"
  }"#;
  const SETUP: &[u8] = br#"{
    "type": "object",
    "properties": {
      "api-key": { "type": "string", "instillCredentialField": true },
      "organization": { "type": "string" }
    }
  }"#;
  const TASKS: &[u8] = br#"{
    "TASK_CALL": { "input": { "type": "object", "properties": {} }, "output": { "type": "object" } }
  }"#;

  fn base() -> ComponentBase {
    ComponentBase::load(DefinitionFiles::new(DEFINITION, TASKS).with_setup(SETUP)).unwrap()
  }

  #[test]
  fn test_secret_fields() {
    let base = base();
    assert!(base.is_secret_field("api-key"));
    assert!(!base.is_secret_field("organization"));
  }

  #[test]
  fn test_with_secrets_keeps_credential_fields_only() {
    let base = base().with_secrets(HashMap::from([
      ("api-key".to_string(), "sk".to_string()),
      ("organization".to_string(), "acme".to_string()),
    ]));
    assert!(base.has_secret("api-key"));
    assert!(!base.has_secret("organization"));
  }

  #[test]
  fn test_resolve_setup_uses_secret() {
    let base = base().with_secrets(HashMap::from([("api-key".to_string(), "sk".to_string())]));
    let setup = json!({ "api-key": crate::SECRET_KEYWORD }).as_object().cloned().unwrap();
    let resolved = base.resolve_setup(setup).unwrap();
    assert!(resolved.uses_secret);
    assert_eq!(resolved.setup["api-key"], json!("sk"));
  }
}
