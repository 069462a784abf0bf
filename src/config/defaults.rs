//! Default values for configuration fields.
//!
//! These functions are used by serde for default deserialization.

// ============================================================================
// Common Defaults
// ============================================================================

pub fn r#true() -> bool {
    true
}

// ============================================================================
// [build] Section Defaults
// ============================================================================

pub mod build {
    use std::path::PathBuf;

    pub fn root() -> Option<PathBuf> {
        None
    }

    pub fn pages() -> PathBuf {
        "src/pages".into()
    }

    pub fn data() -> PathBuf {
        "data".into()
    }

    pub fn output() -> PathBuf {
        "public".into()
    }

    pub fn manifest() -> PathBuf {
        "pages.json".into()
    }

    pub fn extensions() -> Vec<String> {
        ["js", "jsx", "ts", "tsx"].map(String::from).to_vec()
    }
}

// ============================================================================
// [collection] Section Defaults
// ============================================================================

pub mod collection {
    pub fn prefix() -> String {
        pagegen_core::pattern::DEFAULT_PREFIX.into()
    }

    pub fn query_tag() -> String {
        "unstable_collectionGraphql".into()
    }
}

// ============================================================================
// [watch] Section Defaults
// ============================================================================

pub mod watch {
    pub fn debounce_ms() -> u64 {
        300
    }
}
