//! Query responses and the collection shape.
//!
//! A collection query answers with exactly one root field holding a `nodes`
//! list:
//!
//! ```json
//! { "allProduct": { "nodes": [ { "id": 1 }, { "id": 2 } ] } }
//! ```
//!
//! The root field name is read from the query text and looked up by name;
//! anything else is rejected with a [`ShapeError`].

use regex::Regex;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use std::sync::LazyLock;
use thiserror::Error;

/// `{ data, errors }` as returned by a query engine.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub errors: Option<Vec<Value>>,
}

impl QueryResponse {
    pub fn ok(data: Value) -> Self {
        Self {
            data: Some(data),
            errors: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            data: None,
            errors: Some(vec![json!({ "message": message.into() })]),
        }
    }

    /// No data, or at least one reported error.
    pub fn is_failure(&self) -> bool {
        self.data.is_none() || self.errors.as_ref().is_some_and(|e| !e.is_empty())
    }

    /// Error messages for logging; falls back to the raw JSON of each error.
    pub fn error_messages(&self) -> Vec<String> {
        self.errors
            .iter()
            .flatten()
            .map(|err| match err.get("message").and_then(Value::as_str) {
                Some(message) => message.to_owned(),
                None => err.to_string(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    #[error("query data is not an object")]
    NotAnObject,

    #[error("query data has no `{key}` field (found: {})", found.join(", "))]
    MissingCollection { key: String, found: Vec<String> },

    #[error("query data must hold exactly one collection (found: {})", found.join(", "))]
    Ambiguous { found: Vec<String> },

    #[error("collection `{key}` has no `nodes` list")]
    MissingNodes { key: String },

    #[error("node {index} of collection `{key}` is not an object")]
    NodeNotObject { key: String, index: usize },
}

/// Validated collection: its response key and its records.
#[derive(Debug, Clone, PartialEq)]
pub struct Collection {
    pub key: String,
    pub nodes: Vec<Value>,
}

impl Collection {
    pub fn from_response(query: &str, data: Value) -> Result<Self, ShapeError> {
        let Value::Object(mut root) = data else {
            return Err(ShapeError::NotAnObject);
        };
        let found = || root_keys(&root);

        let key = match root_field(query) {
            Some(field) => field.key,
            None if root.len() == 1 => root.keys().next().cloned().unwrap_or_default(),
            None => return Err(ShapeError::Ambiguous { found: found() }),
        };

        if !root.contains_key(&key) {
            return Err(ShapeError::MissingCollection { key, found: found() });
        }
        if root.len() > 1 {
            return Err(ShapeError::Ambiguous { found: found() });
        }

        let nodes = match root.remove(&key) {
            Some(Value::Object(mut inner)) => match inner.remove("nodes") {
                Some(Value::Array(nodes)) => nodes,
                _ => return Err(ShapeError::MissingNodes { key }),
            },
            _ => return Err(ShapeError::MissingNodes { key }),
        };

        if let Some(index) = nodes.iter().position(|node| !node.is_object()) {
            return Err(ShapeError::NodeNotObject { key, index });
        }

        Ok(Self { key, nodes })
    }
}

fn root_keys(root: &Map<String, Value>) -> Vec<String> {
    root.keys().cloned().collect()
}

/// First selected root field of a query: `{ products: allProduct { ... } }`
/// has key `products` and field `allProduct`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootField {
    /// Name the field appears under in the response (the alias if any).
    pub key: String,
    /// Name of the field itself.
    pub field: String,
}

pub fn root_field(query: &str) -> Option<RootField> {
    static RE_ROOT_FIELD: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(
            r"^\s*(?:(?:query|subscription)\b[^{]*)?\{\s*([A-Za-z_][A-Za-z0-9_]*)(?:\s*:\s*([A-Za-z_][A-Za-z0-9_]*))?",
        )
        .unwrap()
    });

    let caps = RE_ROOT_FIELD.captures(query)?;
    let key = caps.get(1)?.as_str().to_owned();
    let field = caps
        .get(2)
        .map_or_else(|| key.clone(), |m| m.as_str().to_owned());
    Some(RootField { key, field })
}
