//! Page registration types.

use serde::Serialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// Context key holding the route params next to the query params.
pub const PAGE_PARAMS_KEY: &str = "__params";

/// One page, as handed to the page sink.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    /// Derived URL path (e.g., "/products/shoes/42")
    pub path: String,

    /// Alternate match expression, only for patterns with optional segments
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_path: Option<String>,

    /// Absolute path of the page component
    pub component: PathBuf,

    /// Query variables for the page query, plus route params under `__params`
    pub context: Map<String, Value>,
}

/// Where derived pages are registered.
pub trait PageSink: Send + Sync + 'static {
    /// Register or replace the page at `page.path`.
    fn create_page(&self, page: PageRequest);

    /// Remove the page at `path` if `component` owns it.
    fn delete_page(&self, path: &str, component: &Path);
}
