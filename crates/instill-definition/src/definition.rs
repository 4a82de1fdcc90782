//! The definition model.

use heck::ToTitleCase;
use indexmap::IndexMap;
use instill_config::{ComponentType, ReleaseStage};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Fully-resolved description of a component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentDefinition {
  /// Resource name, `component-definitions/{id}`.
  pub name: String,
  pub uid: Uuid,
  pub id: String,
  pub title: String,
  pub version: String,
  pub description: String,
  pub release_stage: ReleaseStage,
  pub public: bool,
  /// Retired components stay registered but are hidden from listings.
  pub tombstone: bool,
  #[serde(rename = "type")]
  pub component_type: ComponentType,
  pub icon: String,
  pub vendor: String,
  pub source_url: String,
  pub documentation_url: String,
  pub tasks: Vec<TaskDefinition>,
  pub spec: Specification,
}

/// A task card as shown in the editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDefinition {
  pub name: String,
  pub title: String,
  pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Specification {
  /// Generated editor schema, one `oneOf` branch per task.
  pub component_specification: Value,
  pub setup_specification: Value,
  /// Input and output schemas keyed by task name, in task order.
  pub data_specifications: IndexMap<String, DataSpecification>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSpecification {
  pub input: Value,
  pub output: Value,
}

impl ComponentDefinition {
  pub fn task(&self, name: &str) -> Option<&TaskDefinition> {
    self.tasks.iter().find(|t| t.name == name)
  }

  pub fn has_task(&self, name: &str) -> bool {
    self.spec.data_specifications.contains_key(name)
  }

  pub fn task_names(&self) -> impl Iterator<Item = &str> {
    self.tasks.iter().map(|t| t.name.as_str())
  }

  pub fn data_specification(&self, task: &str) -> Option<&DataSpecification> {
    self.spec.data_specifications.get(task)
  }

  pub fn data_specification_mut(&mut self, task: &str) -> Option<&mut DataSpecification> {
    self.spec.data_specifications.get_mut(task)
  }

  /// Fill the `enum` of input field `field` in every task, in both the data
  /// specifications and the component specification.
  pub fn set_input_enum(&mut self, field: &str, values: &[Value]) -> usize {
    let mut changed = 0;
    for spec in self.spec.data_specifications.values_mut() {
      changed += instill_schema::set_enum(&mut spec.input, field, values);
    }
    changed + instill_schema::set_enum(&mut self.spec.component_specification, field, values)
  }

  /// Like [`Self::set_input_enum`] for a single task.
  pub fn set_task_input_enum(&mut self, task: &str, field: &str, values: &[Value]) -> usize {
    let Some(spec) = self.spec.data_specifications.get_mut(task) else {
      return 0;
    };
    let mut changed = instill_schema::set_enum(&mut spec.input, field, values);
    if let Some(branch) = self.component_branch_mut(task) {
      changed += instill_schema::set_enum(branch, field, values);
    }
    changed
  }

  fn component_branch_mut(&mut self, task: &str) -> Option<&mut Value> {
    self
      .spec
      .component_specification
      .get_mut("oneOf")?
      .as_array_mut()?
      .iter_mut()
      .find(|branch| branch.pointer("/properties/task/const").and_then(Value::as_str) == Some(task))
  }
}

/// Default task title derived from its name: `TASK_TEXT_GENERATION` becomes
/// `Text Generation`.
pub fn task_title(name: &str) -> String {
  name.strip_prefix("TASK_").unwrap_or(name).to_title_case()
}
