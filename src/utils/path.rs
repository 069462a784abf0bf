//! Path helpers shared by discovery, watching and logging.

use std::{
    env,
    path::{Path, PathBuf},
};

/// Normalize a path to absolute form for reliable comparison.
///
/// Config paths are canonicalized, so paths coming from the file watcher
/// must be canonicalized the same way before comparison.
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        }
    })
}

/// Check if path is a temp/backup file (editor artifacts).
pub fn is_temp_file(path: &Path) -> bool {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    matches!(ext, "bck" | "bak" | "backup" | "swp" | "swo" | "tmp")
        || name.ends_with('~')
        || name.starts_with('.')
}

/// Relative `/`-separated form of `path` under `root`, for patterns and logs.
///
/// `/proj/src/pages/blog/{unstable_slug}.js` → `blog/{unstable_slug}.js`
pub fn rel_path(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}
