//! `$ref` resolution over an in-memory set of documents.
//!
//! Supported reference forms:
//! - `#/pointer`: within the document being resolved.
//! - `other.json#/pointer`: a fragment of another registered document.
//! - `other.json`: a whole registered document.
//!
//! Keys next to a `$ref` are kept and override keys of the same name in the
//! referenced schema. References inside a fragment resolve relative to the
//! document the fragment came from.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::error::SchemaError;

/// Named schema documents that references may point into.
#[derive(Debug, Clone, Default)]
pub struct SchemaFs {
  documents: HashMap<String, Value>,
}

impl SchemaFs {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn insert(&mut self, name: impl Into<String>, document: Value) {
    self.documents.insert(name.into(), document);
  }

  pub fn contains(&self, name: &str) -> bool {
    self.documents.contains_key(name)
  }

  /// Return a registered document with every reference replaced by its
  /// target.
  pub fn resolve(&self, document: &str) -> Result<Value, SchemaError> {
    let root = self
      .documents
      .get(document)
      .ok_or_else(|| SchemaError::UnknownDocument {
        document: document.to_string(),
      })?;
    self.resolve_node(root, document, &mut Vec::new())
  }

  fn resolve_node(
    &self,
    node: &Value,
    document: &str,
    stack: &mut Vec<String>,
  ) -> Result<Value, SchemaError> {
    match node {
      Value::Object(map) => match map.get("$ref").and_then(Value::as_str) {
        Some(reference) => self.resolve_ref(reference, map, document, stack),
        None => {
          let mut out = Map::with_capacity(map.len());
          for (key, value) in map {
            out.insert(key.clone(), self.resolve_node(value, document, stack)?);
          }
          Ok(Value::Object(out))
        }
      },
      Value::Array(items) => items
        .iter()
        .map(|item| self.resolve_node(item, document, stack))
        .collect::<Result<Vec<_>, _>>()
        .map(Value::Array),
      other => Ok(other.clone()),
    }
  }

  fn resolve_ref(
    &self,
    reference: &str,
    node: &Map<String, Value>,
    document: &str,
    stack: &mut Vec<String>,
  ) -> Result<Value, SchemaError> {
    let (target_document, pointer) = match reference.split_once('#') {
      Some(("", pointer)) => (document, pointer),
      Some((file, pointer)) => (file, pointer),
      None => (reference, ""),
    };

    let key = format!("{target_document}#{pointer}");
    if stack.contains(&key) {
      stack.push(key);
      return Err(SchemaError::RefCycle {
        chain: stack.join(" -> "),
      });
    }

    let unresolved = || SchemaError::UnresolvedRef {
      reference: reference.to_string(),
      document: document.to_string(),
    };
    let target_root = self.documents.get(target_document).ok_or_else(unresolved)?;
    let target = target_root.pointer(pointer).ok_or_else(unresolved)?;

    stack.push(key);
    let resolved = self.resolve_node(target, target_document, stack)?;
    stack.pop();

    let siblings: Vec<_> = node.iter().filter(|(k, _)| k.as_str() != "$ref").collect();
    if siblings.is_empty() {
      return Ok(resolved);
    }

    let mut merged = match resolved {
      Value::Object(map) => map,
      _ => Map::new(),
    };
    for (key, value) in siblings {
      merged.insert(key.clone(), self.resolve_node(value, document, stack)?);
    }
    Ok(Value::Object(merged))
  }
}
