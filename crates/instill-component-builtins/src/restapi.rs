//! REST API application: one task per HTTP method.

mod auth;

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, LazyLock};
use std::time::Duration;

use async_trait::async_trait;
use instill_component::{
  CONTROL_PLANE_TIMEOUT, Component, ComponentBase, ComponentConfig, ComponentDefinition,
  ComponentError, ComponentExecution, Context, DefinitionFiles, Execution, Record,
  SystemVariables, execute_concurrent,
};
use instill_value::{from_record, to_record};
use reqwest::{Client, Method};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use self::auth::Authentication;

const OUTPUT_BODY_SCHEMA: &str = "output-body-schema";

static DEFINITION: LazyLock<Arc<ComponentDefinition>> = LazyLock::new(|| {
  let files = DefinitionFiles::new(
    include_bytes!("../config/restapi/definition.json"),
    include_bytes!("../config/restapi/tasks.json"),
  )
  .with_setup(include_bytes!("../config/restapi/setup.json"));
  match ComponentDefinition::load(files) {
    Ok(definition) => Arc::new(definition),
    Err(e) => panic!("invalid embedded restapi definition: {e}"),
  }
});

fn task_method(task: &str) -> Option<Method> {
  match task {
    "TASK_GET" => Some(Method::GET),
    "TASK_POST" => Some(Method::POST),
    "TASK_PATCH" => Some(Method::PATCH),
    "TASK_PUT" => Some(Method::PUT),
    "TASK_DELETE" => Some(Method::DELETE),
    "TASK_HEAD" => Some(Method::HEAD),
    "TASK_OPTIONS" => Some(Method::OPTIONS),
    _ => None,
  }
}

#[derive(Debug, Deserialize)]
struct TaskInput {
  #[serde(rename = "endpoint-url")]
  endpoint_url: String,
  #[serde(default)]
  body: Option<Value>,
}

#[derive(Debug, Serialize)]
struct TaskOutput {
  #[serde(rename = "status-code")]
  status_code: u16,
  body: Value,
  header: BTreeMap<String, Vec<String>>,
}

pub struct RestApi {
  base: ComponentBase,
}

impl RestApi {
  pub const ID: &'static str = "restapi";

  pub fn new() -> Self {
    Self {
      base: ComponentBase::new(DEFINITION.clone()),
    }
  }

  /// Attach global secrets, keyed by setup field path
  /// (e.g. `authentication.token`).
  pub fn with_secrets(self, secrets: HashMap<String, String>) -> Self {
    Self {
      base: self.base.with_secrets(secrets),
    }
  }
}

impl Default for RestApi {
  fn default() -> Self {
    Self::new()
  }
}

#[async_trait]
impl Component for RestApi {
  fn base(&self) -> &ComponentBase {
    &self.base
  }

  /// When the caller's node carries an `output-body-schema`, publish it as
  /// the schema of the response body.
  async fn definition(
    &self,
    _system_variables: &SystemVariables,
    config: Option<&ComponentConfig>,
  ) -> Result<ComponentDefinition, ComponentError> {
    let mut definition = self.base.definition().clone();
    let Some(config) = config else {
      return Ok(definition);
    };
    let Some(task) = config.task.as_deref().filter(|t| !t.is_empty()) else {
      return Ok(definition);
    };
    let Some(raw) = config.input.get(OUTPUT_BODY_SCHEMA).and_then(Value::as_str) else {
      return Ok(definition);
    };

    let body_schema: Value = match serde_json::from_str(raw) {
      Ok(schema) => schema,
      Err(e) => {
        warn!(task, error = %e, "ignoring unparseable output body schema");
        return Ok(definition);
      }
    };
    if let Some(spec) = definition.data_specification_mut(task) {
      instill_schema::set_property(&mut spec.output, "body", &body_schema);
    }
    Ok(definition)
  }

  fn create_execution(
    &self,
    execution: ComponentExecution,
  ) -> Result<Box<dyn Execution>, ComponentError> {
    let method =
      task_method(&execution.task).ok_or_else(|| ComponentError::unsupported_task(&execution.task))?;
    let auth = Authentication::from_setup(&execution.setup)?;

    Ok(Box::new(RestApiExecution {
      client: Client::new(),
      method,
      auth,
    }))
  }
}

struct RestApiExecution {
  client: Client,
  method: Method,
  auth: Authentication,
}

impl RestApiExecution {
  async fn send(&self, input: Record, timeout: Duration) -> Result<Record, ComponentError> {
    let input: TaskInput = from_record(input)?;

    let mut request = self
      .client
      .request(self.method.clone(), &input.endpoint_url)
      .timeout(timeout);
    if let Some(body) = &input.body {
      request = request.json(body);
    }
    let request = self.auth.apply(request);

    // An error status is a valid output.
    let response = request.send().await.map_err(request_error)?;

    let status_code = response.status().as_u16();
    let mut header: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (name, value) in response.headers() {
      header
        .entry(name.as_str().to_string())
        .or_default()
        .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
    }

    let text = response.text().await.map_err(request_error)?;
    let body = serde_json::from_str(&text).unwrap_or(Value::String(text));

    Ok(to_record(&TaskOutput {
      status_code,
      body,
      header,
    })?)
  }
}

#[async_trait]
impl Execution for RestApiExecution {
  async fn execute(&self, ctx: &Context, inputs: Vec<Record>) -> Result<Vec<Record>, ComponentError> {
    let timeout = ctx.timeout_or(CONTROL_PLANE_TIMEOUT);
    execute_concurrent(ctx, inputs, |input| self.send(input, timeout)).await
  }
}

fn request_error(e: reqwest::Error) -> ComponentError {
  if e.is_timeout() {
    return ComponentError::DeadlineExceeded;
  }
  if e.is_builder() {
    return ComponentError::invalid_input(
      e.to_string(),
      "The request couldn't be built. Please check the endpoint URL.",
    );
  }
  ComponentError::upstream(
    e.status().map(|s| s.as_u16()),
    e.to_string(),
    "Couldn't reach the REST API endpoint. Please check the URL and try again.",
  )
}
