//! Building a [`ComponentDefinition`] from its JSON documents.

use indexmap::IndexMap;
use instill_config::{ConfigError, DefinitionDoc, TaskDoc, TasksDoc};
use instill_schema::{SchemaFs, normalize};
use serde_json::{Value, json};
use tracing::debug;
use uuid::Uuid;

use crate::component_spec::{component_specification, task_branch};
use crate::definition::{
  ComponentDefinition, DataSpecification, Specification, TaskDefinition, task_title,
};
use crate::error::DefinitionError;

const SETUP_DOCUMENT: &str = "setup.json";
const TASKS_DOCUMENT: &str = "tasks.json";

/// The raw documents a component ships with.
///
/// # Example
///
/// ```ignore
/// let definition = ComponentDefinition::load(
///   DefinitionFiles::new(
///     include_bytes!("../config/restapi/definition.json"),
///     include_bytes!("../config/restapi/tasks.json"),
///   )
///   .with_setup(include_bytes!("../config/restapi/setup.json")),
/// )?;
/// ```
#[derive(Debug, Clone, Copy)]
pub struct DefinitionFiles<'a> {
  pub definition: &'a [u8],
  pub setup: Option<&'a [u8]>,
  pub tasks: &'a [u8],
  /// Extra documents `$ref`s may point into, by file name.
  pub additional: &'a [(&'a str, &'a [u8])],
}

impl<'a> DefinitionFiles<'a> {
  pub fn new(definition: &'a [u8], tasks: &'a [u8]) -> Self {
    Self {
      definition,
      setup: None,
      tasks,
      additional: &[],
    }
  }

  pub fn with_setup(mut self, setup: &'a [u8]) -> Self {
    self.setup = Some(setup);
    self
  }

  pub fn with_additional(mut self, additional: &'a [(&'a str, &'a [u8])]) -> Self {
    self.additional = additional;
    self
  }
}

fn parse_json(document: &str, bytes: &[u8]) -> Result<Value, DefinitionError> {
  serde_json::from_slice(bytes).map_err(|source| {
    DefinitionError::Config(ConfigError::Json {
      document: document.to_string(),
      source,
    })
  })
}

fn require(value: &str, field: &'static str) -> Result<(), DefinitionError> {
  if value.trim().is_empty() {
    return Err(DefinitionError::MissingField { field });
  }
  Ok(())
}

fn resolve_schema(fs: &SchemaFs, document: &str) -> Result<Value, DefinitionError> {
  let mut schema = fs
    .resolve(document)
    .map_err(|e| DefinitionError::schema(document, e))?;
  normalize(&mut schema).map_err(|e| DefinitionError::schema(document, e))?;
  Ok(schema)
}

impl ComponentDefinition {
  /// Parse, resolve and normalise a component's documents.
  ///
  /// Fails when a required identity field is missing, a reference cannot be
  /// resolved or cycles, a task is listed but not defined, or a task lacks
  /// an input or output schema.
  pub fn load(files: DefinitionFiles<'_>) -> Result<Self, DefinitionError> {
    let doc = DefinitionDoc::from_slice(files.definition)?;
    require(&doc.uid, "uid")?;
    require(&doc.id, "id")?;
    require(&doc.title, "title")?;
    let uid = Uuid::parse_str(doc.uid.trim()).map_err(|source| DefinitionError::InvalidUid {
      uid: doc.uid.clone(),
      source,
    })?;

    let mut fs = SchemaFs::new();
    for (name, bytes) in files.additional {
      fs.insert(*name, parse_json(name, bytes)?);
    }

    let tasks_doc = TasksDoc::from_slice(files.tasks)?;
    fs.insert(TASKS_DOCUMENT, tasks_doc.to_value());

    let setup_specification = match files.setup {
      Some(bytes) => {
        fs.insert(SETUP_DOCUMENT, parse_json(SETUP_DOCUMENT, bytes)?);
        resolve_schema(&fs, SETUP_DOCUMENT)?
      }
      None => {
        let mut empty = json!({ "type": "object", "properties": {} });
        normalize(&mut empty).map_err(|e| DefinitionError::schema(SETUP_DOCUMENT, e))?;
        empty
      }
    };

    let resolved_tasks = fs
      .resolve(TASKS_DOCUMENT)
      .map_err(|e| DefinitionError::schema(TASKS_DOCUMENT, e))?;

    let names: Vec<String> = if doc.available_tasks.is_empty() {
      tasks_doc.task_names().map(str::to_string).collect()
    } else {
      doc.available_tasks.clone()
    };
    if names.is_empty() {
      return Err(DefinitionError::NoTasks { id: doc.id });
    }

    let mut tasks = Vec::with_capacity(names.len());
    let mut data_specifications = IndexMap::with_capacity(names.len());
    let mut branches = Vec::with_capacity(names.len());

    for name in names {
      if data_specifications.contains_key(&name) {
        return Err(DefinitionError::DuplicateTask { task: name });
      }
      let raw = resolved_tasks
        .get(&name)
        .filter(|_| !name.starts_with('$'))
        .ok_or_else(|| DefinitionError::UnknownTask { task: name.clone() })?;
      let task_doc: TaskDoc = serde_json::from_value(raw.clone()).map_err(|source| {
        DefinitionError::Config(ConfigError::Json {
          document: format!("{TASKS_DOCUMENT}#/{name}"),
          source,
        })
      })?;

      let mut input = task_doc.input.ok_or_else(|| DefinitionError::MissingSchema {
        task: name.clone(),
        field: "input",
      })?;
      let mut output = task_doc.output.ok_or_else(|| DefinitionError::MissingSchema {
        task: name.clone(),
        field: "output",
      })?;
      normalize(&mut input).map_err(|e| DefinitionError::schema(format!("{name} input"), e))?;
      normalize(&mut output).map_err(|e| DefinitionError::schema(format!("{name} output"), e))?;

      let description = task_doc.description.unwrap_or_default();
      let task = TaskDefinition {
        title: task_doc
          .title
          .filter(|t| !t.is_empty())
          .unwrap_or_else(|| task_title(&name)),
        description: task_doc
          .short_description
          .unwrap_or_else(|| description.clone()),
        name: name.clone(),
      };

      branches.push(task_branch(&task, &description, &input, task_doc.metadata.as_ref())?);
      data_specifications.insert(name, DataSpecification { input, output });
      tasks.push(task);
    }

    debug!(
      component_id = %doc.id,
      tasks = tasks.len(),
      "loaded component definition"
    );

    Ok(Self {
      name: format!("component-definitions/{}", doc.id),
      uid,
      spec: Specification {
        component_specification: component_specification(&doc.title, branches),
        setup_specification,
        data_specifications,
      },
      id: doc.id,
      title: doc.title,
      version: doc.version,
      description: doc.description,
      release_stage: doc.release_stage,
      public: doc.public,
      tombstone: doc.tombstone,
      component_type: doc.component_type,
      icon: doc.icon,
      vendor: doc.vendor,
      source_url: doc.source_url,
      documentation_url: doc.documentation_url,
      tasks,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const DEFINITION: &[u8] = br#"{
    "uid": "0f5b6a4e-8a38-4a0e-9a44-1b0c4d5e6f70",
    "id": "echo",
    "title": "Echo",
    "type": "COMPONENT_TYPE_OPERATOR",
    "availableTasks": ["TASK_SHOUT", "TASK_ECHO"]
  }"#;

  const TASKS: &[u8] = br##"{
    "$defs": {
      "text": { "type": "string", "title": "Text", "instillUpstreamTypes": ["value", "reference"] }
    },
    "TASK_ECHO": {
      "instillShortDescription": "Echo the text back",
      "input": {
        "type": "object",
        "required": ["text"],
        "properties": { "text": { "$ref": "#/$defs/text" } }
      },
      "output": { "type": "object", "properties": { "text": { "type": "string" } } }
    },
    "TASK_SHOUT": {
      "title": "Shout it",
      "input": {
        "type": "object",
        "properties": { "text": { "$ref": "shared.json#/text", "instillUIOrder": 1 } }
      },
      "output": { "type": "object", "properties": {} }
    },
    "TASK_HIDDEN": {
      "input": { "type": "object", "properties": {} },
      "output": { "type": "object", "properties": {} }
    }
  }"##;

  const SHARED: &[u8] = br#"{ "text": { "type": "string", "default": "hey" } }"#;

  const SETUP: &[u8] = br#"{
    "type": "object",
    "properties": { "api-key": { "type": "string", "instillCredentialField": true } }
  }"#;

  fn files() -> DefinitionFiles<'static> {
    DefinitionFiles::new(DEFINITION, TASKS)
      .with_setup(SETUP)
      .with_additional(&[("shared.json", SHARED)])
  }

  #[test]
  fn test_load_orders_and_filters_tasks() {
    let def = ComponentDefinition::load(files()).unwrap();

    assert_eq!(def.name, "component-definitions/echo");
    assert_eq!(def.task_names().collect::<Vec<_>>(), vec!["TASK_SHOUT", "TASK_ECHO"]);
    assert!(!def.has_task("TASK_HIDDEN"));
    assert_eq!(def.task("TASK_SHOUT").unwrap().title, "Shout it");
    assert_eq!(def.task("TASK_ECHO").unwrap().title, "Echo");
    assert_eq!(def.task("TASK_ECHO").unwrap().description, "Echo the text back");
  }

  #[test]
  fn test_load_resolves_refs_and_normalizes() {
    let def = ComponentDefinition::load(files()).unwrap();

    let echo = &def.data_specification("TASK_ECHO").unwrap().input;
    assert_eq!(echo["properties"]["text"]["title"], json!("Text"));
    assert_eq!(echo["properties"]["text"]["instillUIOrder"], json!(0));
    assert_eq!(echo["instillEditOnNodeFields"], json!(["text"]));

    let shout = &def.data_specification("TASK_SHOUT").unwrap().input;
    assert_eq!(shout["properties"]["text"]["default"], json!("hey"));
    assert_eq!(shout["properties"]["text"]["instillUIOrder"], json!(1));

    assert_eq!(
      def.spec.setup_specification["properties"]["api-key"]["instillCredentialField"],
      json!(true)
    );
  }

  #[test]
  fn test_component_specification_has_branch_per_task() {
    let def = ComponentDefinition::load(files()).unwrap();
    let spec = &def.spec.component_specification;

    assert_eq!(spec["title"], json!("Echo Component"));
    let branches = spec["oneOf"].as_array().unwrap();
    assert_eq!(branches.len(), 2);
    assert_eq!(branches[0]["properties"]["task"]["const"], json!("TASK_SHOUT"));
    assert_eq!(branches[1]["properties"]["task"]["const"], json!("TASK_ECHO"));
  }

  #[test]
  fn test_all_tasks_when_none_listed() {
    let def = ComponentDefinition::load(DefinitionFiles::new(
      br#"{ "uid": "0f5b6a4e-8a38-4a0e-9a44-1b0c4d5e6f70", "id": "echo", "title": "Echo" }"#,
      br#"{
        "TASK_B": { "input": { "type": "object", "properties": {} }, "output": { "type": "object" } },
        "TASK_A": { "input": { "type": "object", "properties": {} }, "output": { "type": "object" } }
      }"#,
    ))
    .unwrap();
    assert_eq!(def.task_names().collect::<Vec<_>>(), vec!["TASK_B", "TASK_A"]);
    assert_eq!(def.spec.setup_specification["properties"], json!({}));
  }

  #[test]
  fn test_missing_uid_is_error() {
    let err = ComponentDefinition::load(DefinitionFiles::new(
      br#"{ "id": "echo", "title": "Echo" }"#,
      TASKS,
    ))
    .unwrap_err();
    assert!(matches!(err, DefinitionError::MissingField { field: "uid" }));
  }

  #[test]
  fn test_invalid_uid_is_error() {
    let err = ComponentDefinition::load(DefinitionFiles::new(
      br#"{ "uid": "not-a-uuid", "id": "echo", "title": "Echo" }"#,
      TASKS,
    ))
    .unwrap_err();
    assert!(matches!(err, DefinitionError::InvalidUid { .. }));
  }

  #[test]
  fn test_listed_task_must_exist() {
    let err = ComponentDefinition::load(DefinitionFiles::new(
      br#"{ "uid": "0f5b6a4e-8a38-4a0e-9a44-1b0c4d5e6f70", "id": "echo", "title": "Echo", "availableTasks": ["TASK_NOPE"] }"#,
      TASKS,
    ))
    .unwrap_err();
    assert!(matches!(err, DefinitionError::UnknownTask { task } if task == "TASK_NOPE"));
  }

  #[test]
  fn test_task_without_output_is_error() {
    let err = ComponentDefinition::load(DefinitionFiles::new(
      br#"{ "uid": "0f5b6a4e-8a38-4a0e-9a44-1b0c4d5e6f70", "id": "echo", "title": "Echo" }"#,
      br#"{ "TASK_A": { "input": { "type": "object", "properties": {} } } }"#,
    ))
    .unwrap_err();
    assert!(matches!(err, DefinitionError::MissingSchema { field: "output", .. }));
  }

  #[test]
  fn test_unresolved_ref_is_error() {
    let err = ComponentDefinition::load(DefinitionFiles::new(DEFINITION, TASKS)).unwrap_err();
    assert!(matches!(err, DefinitionError::Schema { .. }));
  }

  #[test]
  fn test_set_task_input_enum_leaves_other_tasks() {
    let mut def = ComponentDefinition::load(files()).unwrap();
    let values = [json!("a"), json!("b")];
    let changed = def.set_task_input_enum("TASK_ECHO", "text", &values);

    assert_eq!(changed, 2);
    let echo = &def.data_specification("TASK_ECHO").unwrap().input;
    assert_eq!(echo["properties"]["text"]["enum"], json!(["a", "b"]));
    let shout = &def.data_specification("TASK_SHOUT").unwrap().input;
    assert!(shout["properties"]["text"].get("enum").is_none());
  }
}
