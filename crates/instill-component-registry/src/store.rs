use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use instill_component::{
  Component, ComponentConfig, ComponentDefinition, ExecutionHandle, NoopUsageHandler, Setup,
  SystemVariables, UsageHandlerCreator,
};
use instill_config::ComponentSecrets;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::RegistryError;

static STORE: OnceLock<Store> = OnceLock::new();

/// Settings for building a [`Store`] of the builtin components.
#[derive(Default)]
pub struct StoreConfig {
  /// Global secrets per component ID, keyed by setup field path.
  pub secrets: ComponentSecrets,
  /// Meters every execution. Defaults to [`NoopUsageHandler`].
  pub usage_handler: Option<Arc<dyn UsageHandlerCreator>>,
}

/// Registered components, in registration order.
///
/// The store is filled once and then only read, so shared references can be
/// used from any number of tasks without locking.
pub struct Store {
  uids: Vec<Uuid>,
  by_uid: HashMap<Uuid, Arc<dyn Component>>,
  by_id: HashMap<String, Uuid>,
  usage: Arc<dyn UsageHandlerCreator>,
}

impl std::fmt::Debug for Store {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Store")
      .field("components", &self.by_id.keys().collect::<Vec<_>>())
      .finish_non_exhaustive()
  }
}

impl Default for Store {
  fn default() -> Self {
    Self::new()
  }
}

impl Store {
  pub fn new() -> Self {
    Self {
      uids: Vec::new(),
      by_uid: HashMap::new(),
      by_id: HashMap::new(),
      usage: Arc::new(NoopUsageHandler),
    }
  }

  pub fn with_usage_handler(mut self, usage: Arc<dyn UsageHandlerCreator>) -> Self {
    self.usage = usage;
    self
  }

  /// A store holding every builtin component with its global secrets.
  pub fn builtin(config: StoreConfig) -> Result<Self, RegistryError> {
    let mut store = Self::new();
    if let Some(usage) = config.usage_handler {
      store = store.with_usage_handler(usage);
    }
    for component in instill_component_builtins::components(&config.secrets) {
      store.import(component)?;
    }
    Ok(store)
  }

  /// Register a component. Importing the same instance twice is a no-op;
  /// another component with the same UID or ID is rejected.
  pub fn import(&mut self, component: Arc<dyn Component>) -> Result<(), RegistryError> {
    let uid = component.uid();
    let id = component.id().to_string();

    if let Some(existing) = self.by_uid.get(&uid) {
      if Arc::ptr_eq(existing, &component) {
        return Ok(());
      }
      return Err(RegistryError::DuplicateUid { uid });
    }
    if self.by_id.contains_key(&id) {
      return Err(RegistryError::DuplicateId { id });
    }

    debug!(component_id = %id, component_uid = %uid, "component registered");
    self.uids.push(uid);
    self.by_id.insert(id, uid);
    self.by_uid.insert(uid, component);
    Ok(())
  }

  pub fn len(&self) -> usize {
    self.uids.len()
  }

  pub fn is_empty(&self) -> bool {
    self.uids.is_empty()
  }

  pub fn component_by_uid(&self, uid: &Uuid) -> Result<&Arc<dyn Component>, RegistryError> {
    self
      .by_uid
      .get(uid)
      .ok_or_else(|| RegistryError::not_found(uid))
  }

  pub fn component_by_id(&self, id: &str) -> Result<&Arc<dyn Component>, RegistryError> {
    let uid = self.by_id.get(id).ok_or_else(|| RegistryError::not_found(id))?;
    self.component_by_uid(uid)
  }

  /// Bind a task of a component to a setup, resolving secret references.
  pub fn create_execution(
    &self,
    uid: &Uuid,
    system_variables: SystemVariables,
    setup: Setup,
    task: &str,
  ) -> Result<ExecutionHandle, RegistryError> {
    let component = self.component_by_uid(uid)?;
    let handle = ExecutionHandle::create(
      component.as_ref(),
      system_variables,
      setup,
      task,
      self.usage.clone(),
    )?;
    debug!(
      component_id = %handle.component_id(),
      task,
      uses_secret = handle.uses_secret(),
      "execution created"
    );
    Ok(handle)
  }

  /// The definition as this caller sees it. Dynamic components fill in
  /// runtime-discovered values; the stored definition is never modified.
  pub async fn definition_by_uid(
    &self,
    uid: &Uuid,
    system_variables: &SystemVariables,
    config: Option<&ComponentConfig>,
  ) -> Result<ComponentDefinition, RegistryError> {
    let component = self.component_by_uid(uid)?;
    Ok(component.definition(system_variables, config).await?)
  }

  pub async fn definition_by_id(
    &self,
    id: &str,
    system_variables: &SystemVariables,
    config: Option<&ComponentConfig>,
  ) -> Result<ComponentDefinition, RegistryError> {
    let component = self.component_by_id(id)?;
    Ok(component.definition(system_variables, config).await?)
  }

  /// Every definition in registration order. Tombstoned components are left
  /// out unless `include_tombstones`; a component whose definition fails is
  /// skipped.
  pub async fn list_definitions(
    &self,
    system_variables: &SystemVariables,
    include_tombstones: bool,
  ) -> Vec<ComponentDefinition> {
    let mut definitions = Vec::with_capacity(self.uids.len());
    for uid in &self.uids {
      let Some(component) = self.by_uid.get(uid) else {
        continue;
      };
      if component.base().definition().tombstone && !include_tombstones {
        continue;
      }
      match component.definition(system_variables, None).await {
        Ok(definition) => definitions.push(definition),
        Err(e) => warn!(
          component_id = %component.id(),
          error = %e,
          "skipping component definition"
        ),
      }
    }
    definitions
  }

  pub fn is_secret_field(&self, uid: &Uuid, path: &str) -> Result<bool, RegistryError> {
    Ok(self.component_by_uid(uid)?.is_secret_field(path))
  }

  /// Check that a setup reaches the component's service. Secret references
  /// are resolved first, as for executions.
  pub async fn test(
    &self,
    uid: &Uuid,
    system_variables: &SystemVariables,
    setup: Setup,
  ) -> Result<(), RegistryError> {
    let component = self.component_by_uid(uid)?;
    let resolved = component.base().resolve_setup(setup)?;
    component.test(system_variables, &resolved.setup).await?;
    Ok(())
  }
}

/// Build the process-wide store of builtin components. Later calls return
/// the store built by the first one and ignore their config.
pub fn init(config: StoreConfig) -> Result<&'static Store, RegistryError> {
  if let Some(store) = STORE.get() {
    return Ok(store);
  }
  let store = Store::builtin(config)?;
  info!(components = store.len(), "component store initialized");
  Ok(STORE.get_or_init(|| store))
}

/// The process-wide store, once [`init`] has run.
pub fn global() -> Option<&'static Store> {
  STORE.get()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_builtin_store() {
    let store = Store::builtin(StoreConfig::default()).unwrap();
    assert_eq!(store.len(), 3);
    assert_eq!(store.component_by_id("json").unwrap().id(), "json");

    let err = store.component_by_id("slack").err().unwrap();
    assert_eq!(err.user_message(), "Component slack doesn't exist.");
  }

  #[test]
  fn test_init_returns_same_store() {
    let first = init(StoreConfig::default()).unwrap();
    let second = init(StoreConfig::default()).unwrap();
    assert!(std::ptr::eq(first, second));
    assert!(global().is_some());
  }

  #[test]
  fn test_secret_fields_by_uid() {
    let store = Store::builtin(StoreConfig::default()).unwrap();
    let uid = store.component_by_id("restapi").unwrap().uid();
    assert!(store.is_secret_field(&uid, "authentication.token").unwrap());
    assert!(!store.is_secret_field(&uid, "authentication.username").unwrap());
    assert!(store.is_secret_field(&Uuid::nil(), "x").is_err());
  }
}
