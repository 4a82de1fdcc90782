//! Base64 operator.

use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use instill_component::{
  Component, ComponentBase, ComponentDefinition, ComponentError, ComponentExecution, Context,
  DefinitionFiles, Execution, Record, execute_sequential,
};
use instill_value::{decode_base64, detect_mime, encode_base64, encode_data_uri, from_record, to_record};
use serde::{Deserialize, Serialize};

const TASK_ENCODE: &str = "TASK_ENCODE";
const TASK_DECODE: &str = "TASK_DECODE";

static DEFINITION: LazyLock<Arc<ComponentDefinition>> = LazyLock::new(|| {
  let files = DefinitionFiles::new(
    include_bytes!("../config/base64/definition.json"),
    include_bytes!("../config/base64/tasks.json"),
  );
  match ComponentDefinition::load(files) {
    Ok(definition) => Arc::new(definition),
    Err(e) => panic!("invalid embedded base64 definition: {e}"),
  }
});

#[derive(Debug, Serialize, Deserialize)]
struct Data {
  data: String,
}

type TaskFn = fn(Data) -> Result<Data, ComponentError>;

pub struct Base64 {
  base: ComponentBase,
}

impl Base64 {
  pub const ID: &'static str = "base64";

  pub fn new() -> Self {
    Self {
      base: ComponentBase::new(DEFINITION.clone()),
    }
  }
}

impl Default for Base64 {
  fn default() -> Self {
    Self::new()
  }
}

#[async_trait]
impl Component for Base64 {
  fn base(&self) -> &ComponentBase {
    &self.base
  }

  fn create_execution(
    &self,
    execution: ComponentExecution,
  ) -> Result<Box<dyn Execution>, ComponentError> {
    let execute: TaskFn = match execution.task.as_str() {
      TASK_ENCODE => encode,
      TASK_DECODE => decode,
      other => return Err(ComponentError::unsupported_task(other)),
    };
    Ok(Box::new(Base64Execution { execute }))
  }
}

struct Base64Execution {
  execute: TaskFn,
}

#[async_trait]
impl Execution for Base64Execution {
  async fn execute(&self, ctx: &Context, inputs: Vec<Record>) -> Result<Vec<Record>, ComponentError> {
    let execute = self.execute;
    execute_sequential(ctx, inputs, |input| async move {
      let output = execute(from_record(input)?)?;
      Ok(to_record(&output)?)
    })
    .await
  }
}

fn encode(input: Data) -> Result<Data, ComponentError> {
  Ok(Data {
    data: encode_base64(input.data.as_bytes()),
  })
}

/// Text comes back as text; anything else is wrapped in a data URI.
fn decode(input: Data) -> Result<Data, ComponentError> {
  let bytes = decode_base64(&input.data).map_err(|e| {
    ComponentError::invalid_input(e.to_string(), "The provided data is not valid base64.")
  })?;

  let data = match String::from_utf8(bytes) {
    Ok(text) => text,
    Err(e) => {
      let bytes = e.into_bytes();
      encode_data_uri(detect_mime(&bytes), &bytes)
    }
  };
  Ok(Data { data })
}
