//! Query layer.
//!
//! - [`QueryEngine`]: the seam to whatever executes collection queries
//! - [`Collection`]: validated `{ <key>: { nodes: [...] } }` response shape
//! - [`extract_query`]: finds the collection query inside a component file
//! - [`DataDirEngine`]: file-backed engine used by the CLI

mod data_dir;
mod extract;
mod response;

pub use data_dir::DataDirEngine;
pub use extract::extract_query;
pub use response::{Collection, QueryResponse, root_field};

use std::{future::Future, path::PathBuf};

/// Executes collection queries.
pub trait QueryEngine: Send + Sync + 'static {
    fn execute(&self, query: &str) -> impl Future<Output = QueryResponse> + Send;

    /// Files whose change should re-run `query`.
    fn dependencies(&self, _query: &str) -> Vec<PathBuf> {
        Vec::new()
    }
}
