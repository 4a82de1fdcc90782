//! JSON operator.

use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use instill_component::{
  Component, ComponentBase, ComponentDefinition, ComponentError, ComponentExecution, Context,
  DefinitionFiles, Execution, Record, execute_sequential,
};
use instill_value::{from_record, to_record};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const TASK_MARSHAL: &str = "TASK_MARSHAL";
const TASK_UNMARSHAL: &str = "TASK_UNMARSHAL";

static DEFINITION: LazyLock<Arc<ComponentDefinition>> = LazyLock::new(|| {
  let files = DefinitionFiles::new(
    include_bytes!("../config/json/definition.json"),
    include_bytes!("../config/json/tasks.json"),
  );
  match ComponentDefinition::load(files) {
    Ok(definition) => Arc::new(definition),
    Err(e) => panic!("invalid embedded json definition: {e}"),
  }
});

type TaskFn = fn(Record) -> Result<Record, ComponentError>;

pub struct Json {
  base: ComponentBase,
}

impl Json {
  pub const ID: &'static str = "json";

  pub fn new() -> Self {
    Self {
      base: ComponentBase::new(DEFINITION.clone()),
    }
  }
}

impl Default for Json {
  fn default() -> Self {
    Self::new()
  }
}

#[async_trait]
impl Component for Json {
  fn base(&self) -> &ComponentBase {
    &self.base
  }

  fn create_execution(
    &self,
    execution: ComponentExecution,
  ) -> Result<Box<dyn Execution>, ComponentError> {
    let execute: TaskFn = match execution.task.as_str() {
      TASK_MARSHAL => marshal,
      TASK_UNMARSHAL => unmarshal,
      other => return Err(ComponentError::unsupported_task(other)),
    };
    Ok(Box::new(JsonExecution { execute }))
  }
}

struct JsonExecution {
  execute: TaskFn,
}

#[async_trait]
impl Execution for JsonExecution {
  async fn execute(&self, ctx: &Context, inputs: Vec<Record>) -> Result<Vec<Record>, ComponentError> {
    let execute = self.execute;
    execute_sequential(ctx, inputs, |input| async move { execute(input) }).await
  }
}

#[derive(Debug, Deserialize)]
struct MarshalInput {
  #[serde(default)]
  json: Value,
}

#[derive(Debug, Serialize)]
struct MarshalOutput {
  string: String,
}

#[derive(Debug, Deserialize)]
struct UnmarshalInput {
  string: String,
}

#[derive(Debug, Serialize)]
struct UnmarshalOutput {
  json: Value,
}

fn marshal(input: Record) -> Result<Record, ComponentError> {
  let input: MarshalInput = from_record(input)?;
  let string = serde_json::to_string(&input.json).map_err(|e| {
    ComponentError::invalid_input(e.to_string(), "Couldn't convert the provided object to JSON.")
  })?;
  Ok(to_record(&MarshalOutput { string })?)
}

fn unmarshal(input: Record) -> Result<Record, ComponentError> {
  let input: UnmarshalInput = from_record(input)?;
  let json = serde_json::from_str(&input.string).map_err(|e| {
    ComponentError::invalid_input(
      e.to_string(),
      "Couldn't parse the JSON string. Please check the syntax is correct.",
    )
  })?;
  Ok(to_record(&UnmarshalOutput { json })?)
}
