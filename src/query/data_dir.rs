//! File-backed query engine.
//!
//! Resolves the root field of a query to `<data>/<field>.json`. The file
//! holds either a list of records or an object with a `nodes` list. Selection
//! sets are not evaluated: every record is returned whole.

use super::{QueryEngine, QueryResponse, root_field};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct DataDirEngine {
    dir: PathBuf,
}

impl DataDirEngine {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn source_path(&self, field: &str) -> PathBuf {
        self.dir.join(format!("{field}.json"))
    }
}

impl QueryEngine for DataDirEngine {
    async fn execute(&self, query: &str) -> QueryResponse {
        let Some(root) = root_field(query) else {
            return QueryResponse::failed("query does not select a root field");
        };
        let path = self.source_path(&root.field);

        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(err) => return QueryResponse::failed(format!("cannot read {}: {err}", path.display())),
        };

        match parse_nodes(&path, &content) {
            Ok(nodes) => {
                let mut collection = Map::new();
                collection.insert("nodes".into(), Value::Array(nodes));
                let mut data = Map::new();
                data.insert(root.key, Value::Object(collection));
                QueryResponse::ok(Value::Object(data))
            }
            Err(message) => QueryResponse::failed(message),
        }
    }

    fn dependencies(&self, query: &str) -> Vec<PathBuf> {
        root_field(query)
            .map(|root| vec![self.source_path(&root.field)])
            .unwrap_or_default()
    }
}

fn parse_nodes(path: &Path, content: &str) -> Result<Vec<Value>, String> {
    let value: Value = serde_json::from_str(content)
        .map_err(|err| format!("invalid JSON in {}: {err}", path.display()))?;

    match value {
        Value::Array(nodes) => Ok(nodes),
        Value::Object(mut map) => match map.remove("nodes") {
            Some(Value::Array(nodes)) => Ok(nodes),
            _ => Err(format!("{} has no `nodes` list", path.display())),
        },
        _ => Err(format!("{} must hold a list of records", path.display())),
    }
}
