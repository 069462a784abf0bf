//! `[build]` section configuration.
//!
//! Where components, data and the page manifest live.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[build]` section in pagegen.toml
///
/// # Example
/// ```toml
/// [build]
/// pages = "src/pages"
/// data = "data"
/// output = "public"
/// manifest = "pages.json"
/// extensions = ["js", "tsx"]
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct BuildConfig {
    /// Project root directory (set from CLI, not read from the file).
    #[serde(skip)]
    #[educe(Default = defaults::build::root())]
    pub root: Option<PathBuf>,

    /// Directory holding page components.
    #[serde(default = "defaults::build::pages")]
    #[educe(Default = defaults::build::pages())]
    pub pages: PathBuf,

    /// Directory the built-in query engine reads `<collection>.json` from.
    #[serde(default = "defaults::build::data")]
    #[educe(Default = defaults::build::data())]
    pub data: PathBuf,

    /// Output directory.
    #[serde(default = "defaults::build::output")]
    #[educe(Default = defaults::build::output())]
    pub output: PathBuf,

    /// Page manifest file name, relative to `output`.
    #[serde(default = "defaults::build::manifest")]
    #[educe(Default = defaults::build::manifest())]
    pub manifest: PathBuf,

    /// Component file extensions considered during discovery.
    #[serde(default = "defaults::build::extensions")]
    #[educe(Default = defaults::build::extensions())]
    pub extensions: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::super::SiteConfig;
    use std::path::PathBuf;

    #[test]
    fn test_build_config_defaults() {
        let config: SiteConfig = toml::from_str("").unwrap();

        assert_eq!(config.build.pages, PathBuf::from("src/pages"));
        assert_eq!(config.build.data, PathBuf::from("data"));
        assert_eq!(config.build.output, PathBuf::from("public"));
        assert_eq!(config.build.manifest, PathBuf::from("pages.json"));
        assert_eq!(config.build.extensions, ["js", "jsx", "ts", "tsx"]);
        assert_eq!(config.build.root, None);
    }

    #[test]
    fn test_build_config_custom() {
        let config = r#"
            [build]
            pages = "pages"
            extensions = ["tsx"]
        "#;
        let config: SiteConfig = toml::from_str(config).unwrap();

        assert_eq!(config.build.pages, PathBuf::from("pages"));
        assert_eq!(config.build.extensions, ["tsx"]);
    }

    #[test]
    fn test_build_root_is_not_configurable() {
        let config = r#"
            [build]
            root = "/somewhere"
        "#;
        let result: Result<SiteConfig, _> = toml::from_str(config);
        assert!(result.is_err());
    }
}
