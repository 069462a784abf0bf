//! Static extraction of the collection query from a component file.
//!
//! Components declare their collection query as a tagged template:
//!
//! ```js
//! export const collectionQuery = unstable_collectionGraphql`
//!   { allProduct { nodes { category id } } }
//! `
//! ```
//!
//! `None` is not an error: while a file is still being written the query may
//! not be there yet, and the caller waits for the next change.

use regex::Regex;
use std::{fs, path::Path, sync::LazyLock};

/// Read `path` and return the first collection query tagged with `tag`.
pub fn extract_query(path: &Path, tag: &str) -> Option<String> {
    let source = fs::read_to_string(path).ok()?;
    extract_from_source(&source, tag)
}

/// Body of the first `` tag`...` `` template that selects `nodes`.
pub fn extract_from_source(source: &str, tag: &str) -> Option<String> {
    let re = Regex::new(&format!(r"(?s)\b{}\s*`([^`]*)`", regex::escape(tag))).ok()?;

    re.captures_iter(source)
        .filter_map(|caps| caps.get(1))
        .map(|body| body.as_str().trim())
        .find(|body| selects_nodes(body))
        .map(str::to_owned)
}

fn selects_nodes(query: &str) -> bool {
    static RE_NODES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bnodes\s*\{").unwrap());
    RE_NODES.is_match(query)
}
