//! Store behaviour with stub components.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use instill_component::{
  Component, ComponentBase, ComponentConfig, ComponentDefinition, ComponentError,
  ComponentExecution, Context, DefinitionFiles, Execution, Record, SECRET_KEYWORD, Setup,
  SystemVariables, execute_sequential,
};
use instill_component_registry::{RegistryError, Store};
use serde_json::{Value, json};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SETUP: &str = r#"{
  "type": "object",
  "properties": {
    "api-key": { "type": "string", "instillCredentialField": true }
  }
}"#;

const TASKS: &str = r#"{
  "TASK_X": {
    "input": {
      "type": "object",
      "required": ["in"],
      "properties": {
        "in": { "type": "string" },
        "model-name": { "type": "string", "enum": [] }
      }
    },
    "output": {
      "type": "object",
      "required": ["out"],
      "properties": { "out": { "type": "string" } }
    }
  },
  "TASK_CALL": {
    "input": {
      "type": "object",
      "required": ["url"],
      "properties": { "url": { "type": "string" } }
    },
    "output": {
      "type": "object",
      "required": ["status"],
      "properties": { "status": { "type": "integer" } }
    }
  }
}"#;

/// A vendor-like component: echoes on `TASK_X`, calls `url` with the setup's
/// API key as a bearer token on `TASK_CALL`, and lists models when the model
/// backend is known.
struct Stub {
  base: ComponentBase,
  models: Vec<&'static str>,
  discovery_fails: bool,
}

impl Stub {
  fn new(uid: &str, id: &str, tombstone: bool) -> Self {
    Self::with_secrets(uid, id, tombstone, HashMap::new())
  }

  fn with_secrets(uid: &str, id: &str, tombstone: bool, secrets: HashMap<String, String>) -> Self {
    let definition = json!({
      "uid": uid,
      "id": id,
      "title": id,
      "tombstone": tombstone,
      "type": "COMPONENT_TYPE_APPLICATION"
    })
    .to_string();
    let base = ComponentBase::load(
      DefinitionFiles::new(definition.as_bytes(), TASKS.as_bytes()).with_setup(SETUP.as_bytes()),
    )
    .unwrap()
    .with_secrets(secrets);
    Self {
      base,
      models: vec!["m1", "m2"],
      discovery_fails: false,
    }
  }

  /// Model discovery fails whenever the model backend is known.
  fn with_failing_discovery(mut self) -> Self {
    self.discovery_fails = true;
    self
  }
}

#[async_trait]
impl Component for Stub {
  fn base(&self) -> &ComponentBase {
    &self.base
  }

  async fn definition(
    &self,
    system_variables: &SystemVariables,
    _config: Option<&ComponentConfig>,
  ) -> Result<ComponentDefinition, ComponentError> {
    let mut definition = self.base.definition().clone();
    if system_variables.model_backend().is_some() {
      if self.discovery_fails {
        return Err(ComponentError::upstream(
          Some(503),
          "model backend unavailable",
          "Couldn't list the available models.",
        ));
      }
      let models: Vec<Value> = self.models.iter().map(|m| json!(m)).collect();
      definition.set_input_enum("model-name", &models);
    }
    Ok(definition)
  }

  fn create_execution(
    &self,
    execution: ComponentExecution,
  ) -> Result<Box<dyn Execution>, ComponentError> {
    match execution.task.as_str() {
      "TASK_X" => Ok(Box::new(Echo)),
      "TASK_CALL" => {
        let api_key = execution
          .setup
          .get("api-key")
          .and_then(Value::as_str)
          .unwrap_or_default()
          .to_string();
        Ok(Box::new(Call { api_key }))
      }
      other => Err(ComponentError::unsupported_task(other)),
    }
  }

  async fn test(
    &self,
    _system_variables: &SystemVariables,
    setup: &Setup,
  ) -> Result<(), ComponentError> {
    match setup.get("api-key").and_then(Value::as_str) {
      Some("sk-42") => Ok(()),
      _ => Err(ComponentError::upstream(Some(401), "unauthorized", "Invalid API key.")),
    }
  }
}

struct Echo;

#[async_trait]
impl Execution for Echo {
  async fn execute(&self, ctx: &Context, inputs: Vec<Record>) -> Result<Vec<Record>, ComponentError> {
    execute_sequential(ctx, inputs, |input| async move {
      let text = input.get("in").and_then(Value::as_str).unwrap_or_default();
      Ok(record(json!({ "out": format!("{text}!") })))
    })
    .await
  }
}

struct Call {
  api_key: String,
}

#[async_trait]
impl Execution for Call {
  async fn execute(&self, ctx: &Context, inputs: Vec<Record>) -> Result<Vec<Record>, ComponentError> {
    let client = reqwest::Client::new();
    execute_sequential(ctx, inputs, |input| {
      let request = client
        .get(input.get("url").and_then(Value::as_str).unwrap_or_default())
        .bearer_auth(&self.api_key);
      async move {
        let response = request
          .send()
          .await
          .map_err(|e| ComponentError::upstream(None, e.to_string(), "request failed"))?;
        Ok(record(json!({ "status": response.status().as_u16() })))
      }
    })
    .await
  }
}

fn record(value: Value) -> Record {
  value.as_object().cloned().unwrap()
}

const UID_A: &str = "0b7c6f0e-1a51-4f0e-9a43-6c1f2b1d8e01";
const UID_B: &str = "0b7c6f0e-1a51-4f0e-9a43-6c1f2b1d8e02";

fn store_with(components: Vec<Stub>) -> Store {
  let mut store = Store::new();
  for component in components {
    store.import(Arc::new(component)).unwrap();
  }
  store
}

fn uid(s: &str) -> uuid::Uuid {
  s.parse().unwrap()
}

#[test]
fn test_unsupported_task() {
  let store = store_with(vec![Stub::new(UID_A, "vendor", false)]);
  let err = store
    .create_execution(&uid(UID_A), SystemVariables::new(), Setup::new(), "TASK_Y")
    .unwrap_err();
  assert_eq!(err.user_message(), "TASK_Y task is not supported.");
}

#[tokio::test]
async fn test_batch_preserves_order() {
  let store = store_with(vec![Stub::new(UID_A, "vendor", false)]);
  let handle = store
    .create_execution(&uid(UID_A), SystemVariables::new(), Setup::new(), "TASK_X")
    .unwrap();

  let inputs = ["a", "b", "c"].iter().map(|s| record(json!({ "in": s }))).collect();
  let outputs = handle.execute(&Context::new(), inputs).await.unwrap();
  assert_eq!(
    outputs,
    vec![
      record(json!({ "out": "a!" })),
      record(json!({ "out": "b!" })),
      record(json!({ "out": "c!" })),
    ]
  );
}

#[tokio::test]
async fn test_secret_resolution_success() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/models"))
    .and(header("authorization", "Bearer sk-42"))
    .respond_with(ResponseTemplate::new(200))
    .expect(1)
    .mount(&server)
    .await;

  let secrets = HashMap::from([("api-key".to_string(), "sk-42".to_string())]);
  let store = store_with(vec![Stub::with_secrets(UID_A, "vendor", false, secrets)]);
  let setup = record(json!({ "api-key": SECRET_KEYWORD }));
  let handle = store
    .create_execution(&uid(UID_A), SystemVariables::new(), setup, "TASK_CALL")
    .unwrap();
  assert!(handle.uses_secret());

  let outputs = handle
    .execute(
      &Context::new(),
      vec![record(json!({ "url": format!("{}/models", server.uri()) }))],
    )
    .await
    .unwrap();
  assert_eq!(outputs[0]["status"], json!(200));
}

#[test]
fn test_secret_resolution_failure() {
  let store = store_with(vec![Stub::new(UID_A, "vendor", false)]);
  let setup = record(json!({ "api-key": SECRET_KEYWORD }));
  let err = store
    .create_execution(&uid(UID_A), SystemVariables::new(), setup, "TASK_CALL")
    .unwrap_err();

  assert!(matches!(
    err,
    RegistryError::Component(ComponentError::UnresolvedSecret { .. })
  ));
  assert_eq!(
    err.user_message(),
    "The configuration field api-key can't reference a global secret."
  );
}

#[tokio::test]
async fn test_dynamic_definition_leaves_static_untouched() {
  let store = store_with(vec![Stub::new(UID_A, "vendor", false)]);
  let model_enum = |definition: &ComponentDefinition| {
    definition.data_specification("TASK_X").unwrap().input["properties"]["model-name"]["enum"]
      .clone()
  };

  let before = store
    .definition_by_uid(&uid(UID_A), &SystemVariables::new(), None)
    .await
    .unwrap();
  assert_eq!(model_enum(&before), json!([]));

  let sys_vars = SystemVariables::new().with(SystemVariables::MODEL_BACKEND, "model-backend:9080");
  let augmented = store
    .definition_by_id("vendor", &sys_vars, None)
    .await
    .unwrap();
  assert_eq!(model_enum(&augmented), json!(["m1", "m2"]));

  let after = store
    .definition_by_uid(&uid(UID_A), &SystemVariables::new(), None)
    .await
    .unwrap();
  assert_eq!(model_enum(&after), json!([]));
  assert_eq!(before, after);
}

#[tokio::test]
async fn test_tombstone_listing() {
  let store = store_with(vec![
    Stub::new(UID_A, "live", false),
    Stub::new(UID_B, "retired", true),
  ]);

  let visible = store.list_definitions(&SystemVariables::new(), false).await;
  assert_eq!(visible.len(), 1);
  assert_eq!(visible[0].id, "live");

  let all = store.list_definitions(&SystemVariables::new(), true).await;
  let ids: Vec<&str> = all.iter().map(|d| d.id.as_str()).collect();
  assert_eq!(ids, vec!["live", "retired"]);

  // Tombstoned components stay resolvable.
  assert!(store.component_by_uid(&uid(UID_B)).is_ok());
}

#[tokio::test]
async fn test_listing_skips_failing_definitions() {
  let store = store_with(vec![
    Stub::new(UID_A, "healthy", false),
    Stub::new(UID_B, "flaky", false).with_failing_discovery(),
  ]);
  let sys_vars = SystemVariables::new().with(SystemVariables::MODEL_BACKEND, "model-backend:9080");

  let listed = store.list_definitions(&sys_vars, true).await;
  let ids: Vec<&str> = listed.iter().map(|d| d.id.as_str()).collect();
  assert_eq!(ids, vec!["healthy"]);

  let err = store
    .definition_by_uid(&uid(UID_B), &sys_vars, None)
    .await
    .unwrap_err();
  assert_eq!(err.user_message(), "Couldn't list the available models.");
  assert!(err.is_retriable());

  let without_backend = store.list_definitions(&SystemVariables::new(), true).await;
  assert_eq!(without_backend.len(), 2);
}

#[test]
fn test_registration_uniqueness() {
  let mut store = Store::new();
  let component: Arc<dyn Component> = Arc::new(Stub::new(UID_A, "vendor", false));
  store.import(component.clone()).unwrap();
  store.import(component).unwrap();
  assert_eq!(store.len(), 1);

  let same_uid = store.import(Arc::new(Stub::new(UID_A, "other", false)));
  assert!(matches!(same_uid, Err(RegistryError::DuplicateUid { .. })));

  let same_id = store.import(Arc::new(Stub::new(UID_B, "vendor", false)));
  assert!(matches!(same_id, Err(RegistryError::DuplicateId { .. })));
  assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_connection_test_resolves_secrets() {
  let secrets = HashMap::from([("api-key".to_string(), "sk-42".to_string())]);
  let store = store_with(vec![
    Stub::with_secrets(UID_A, "vendor", false, secrets),
    Stub::new(UID_B, "other", false),
  ]);
  let sys_vars = SystemVariables::new();
  let with_sentinel = || record(json!({ "api-key": SECRET_KEYWORD }));

  store.test(&uid(UID_A), &sys_vars, with_sentinel()).await.unwrap();

  let err = store
    .test(&uid(UID_A), &sys_vars, record(json!({ "api-key": "wrong" })))
    .await
    .unwrap_err();
  assert_eq!(err.user_message(), "Invalid API key.");

  let err = store.test(&uid(UID_B), &sys_vars, with_sentinel()).await.unwrap_err();
  assert!(matches!(
    err,
    RegistryError::Component(ComponentError::UnresolvedSecret { .. })
  ));
}

#[test]
fn test_unknown_component() {
  let store = Store::new();
  let err = store
    .create_execution(&uid(UID_A), SystemVariables::new(), Setup::new(), "TASK_X")
    .unwrap_err();
  assert!(matches!(err, RegistryError::NotFound { .. }));
}
