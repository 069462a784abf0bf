//! Collection component discovery.

use crate::utils::path::rel_path;
use anyhow::{Context, Result};
use pagegen_core::pattern::is_collection_path;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A page component whose path declares a collection route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentRoute {
    /// Absolute path of the component file.
    pub absolute: PathBuf,
    /// Path relative to the pages directory, `/`-separated; the route pattern.
    pub file_path: String,
}

impl ComponentRoute {
    pub fn new(pages: &Path, absolute: PathBuf) -> Self {
        let file_path = rel_path(&absolute, pages);
        Self { absolute, file_path }
    }
}

/// Find every collection component under `pages`, sorted by relative path.
pub fn discover_components(pages: &Path, extensions: &[String]) -> Result<Vec<ComponentRoute>> {
    let mut routes = Vec::new();

    for entry in WalkDir::new(pages).follow_links(true) {
        let entry =
            entry.with_context(|| format!("Failed to scan pages directory {}", pages.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let has_extension = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| extensions.iter().any(|allowed| allowed == ext));
        if !has_extension {
            continue;
        }

        let route = ComponentRoute::new(pages, path.to_path_buf());
        if is_collection_path(&route.file_path) {
            routes.push(route);
        }
    }

    routes.sort_by(|a, b| a.file_path.cmp(&b.file_path));
    Ok(routes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    #[test]
    fn test_discover_collection_components() {
        let dir = TempDir::new().unwrap();
        let pages = dir.path();
        touch(pages, "index.js");
        touch(pages, "products/{unstable_category}/{unstable_id}.js");
        touch(pages, "blog/{unstable_slug?}.tsx");
        touch(pages, "notes/{unstable_id}.md");

        let exts = ["js", "tsx"].map(String::from);
        let routes = discover_components(pages, &exts).unwrap();
        let files: Vec<_> = routes.iter().map(|r| r.file_path.as_str()).collect();

        assert_eq!(
            files,
            ["blog/{unstable_slug?}.tsx", "products/{unstable_category}/{unstable_id}.js"]
        );
        assert!(routes[0].absolute.is_absolute());
    }

    #[test]
    fn test_discover_missing_dir_fails() {
        let dir = TempDir::new().unwrap();
        let exts = ["js".to_string()];
        assert!(discover_components(&dir.path().join("nope"), &exts).is_err());
    }
}
