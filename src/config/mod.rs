//! Configuration management for `pagegen.toml`.
//!
//! # Sections
//!
//! | Section        | Purpose                                          |
//! |----------------|--------------------------------------------------|
//! | `[build]`      | Component, data and output locations             |
//! | `[collection]` | Pattern prefix, query tag, path policies         |
//! | `[watch]`      | Watch mode toggle and debounce                   |
//!
//! # Example
//!
//! ```toml
//! [build]
//! pages = "src/pages"
//! data = "data"
//!
//! [collection]
//! trailing_slash = "always"
//! on_missing_field = "abort"
//!
//! [watch]
//! debounce_ms = 200
//! ```

mod build;
mod collection;
pub mod defaults;
mod error;
mod watch;

pub use collection::MissingFieldPolicy;

use build::BuildConfig;
use collection::CollectionConfig;
use error::ConfigError;
use watch::WatchConfig;

use crate::{
    cli::{Cli, Commands},
    utils::path::normalize_path,
};
use anyhow::{Result, bail};
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Upper bound for `[watch.debounce_ms]`; anything longer feels like a hang.
const MAX_DEBOUNCE_MS: u64 = 10_000;

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration structure representing pagegen.toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// Absolute path to the config file (set after loading)
    #[serde(skip)]
    pub config_path: PathBuf,

    #[serde(default)]
    pub build: BuildConfig,

    #[serde(default)]
    pub collection: CollectionConfig,

    #[serde(default)]
    pub watch: WatchConfig,
}

impl SiteConfig {
    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: SiteConfig = toml::from_str(content).map_err(ConfigError::Toml)?;
        Ok(config)
    }

    /// Load configuration from file path
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::from_str(&content)
    }

    /// Load from CLI arguments: read the file if present, else defaults.
    pub fn load(cli: &Cli) -> Result<Self> {
        let root = cli.root.as_deref().unwrap_or(Path::new("./"));
        let config_path = root.join(&cli.config);

        let mut config = if config_path.exists() {
            Self::from_path(&config_path)?
        } else {
            Self::default()
        };
        config.update_with_cli(cli);
        config.validate()?;
        Ok(config)
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        self.build.root.as_deref().unwrap_or(Path::new("./"))
    }

    /// Set the root directory path
    pub fn set_root(&mut self, path: &Path) {
        self.build.root = Some(path.to_path_buf())
    }

    /// Absolute path of the page manifest.
    pub fn manifest_path(&self) -> PathBuf {
        self.build.output.join(&self.build.manifest)
    }

    /// Update configuration with CLI arguments
    pub fn update_with_cli(&mut self, cli: &Cli) {
        let root = cli
            .root
            .clone()
            .unwrap_or_else(|| self.get_root().to_owned());

        Self::update_option(&mut self.build.pages, cli.pages.as_ref());
        Self::update_option(&mut self.build.data, cli.data.as_ref());
        Self::update_option(&mut self.build.output, cli.output.as_ref());

        if let Commands::Watch { debounce } = &cli.command {
            Self::update_option(&mut self.watch.debounce_ms, debounce.as_ref());
        }

        self.update_path_with_root(&root, &cli.config);
    }

    /// Update config option if CLI value is provided
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Resolve every configured directory against `root`.
    fn update_path_with_root(&mut self, root: &Path, config_name: &Path) {
        let root = normalize_path(root);
        let resolve = |path: &Path| normalize_path(&root.join(path));

        self.config_path = resolve(config_name);
        self.build.pages = resolve(&self.build.pages);
        self.build.data = resolve(&self.build.data);
        self.build.output = resolve(&self.build.output);
        self.set_root(&root);
    }

    /// Reject settings no run could work with.
    pub fn validate(&self) -> Result<()> {
        let build = &self.build;
        let collection = &self.collection;

        if !build.pages.is_dir() {
            bail!(ConfigError::invalid(
                "build",
                "pages",
                format!("`{}` is not a directory", build.pages.display())
            ));
        }
        if build.extensions.is_empty() {
            bail!(ConfigError::invalid("build", "extensions", "must have at least one element"));
        }
        if build.manifest.is_absolute() {
            bail!(ConfigError::invalid("build", "manifest", "must be relative to [build.output]"));
        }
        if collection.query_tag.trim().is_empty() {
            bail!(ConfigError::invalid("collection", "query_tag", "must not be empty"));
        }
        if collection.prefix.contains(['{', '}', '/', '?']) {
            bail!(ConfigError::invalid(
                "collection",
                "prefix",
                "must not contain `{`, `}`, `/` or `?`"
            ));
        }
        if self.watch.debounce_ms > MAX_DEBOUNCE_MS {
            bail!(ConfigError::invalid(
                "watch",
                "debounce_ms",
                format!("must be at most {MAX_DEBOUNCE_MS}")
            ));
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::fs;
    use tempfile::TempDir;

    fn cli(args: &[&str]) -> Cli {
        Cli::parse_from(std::iter::once("pagegen").chain(args.iter().copied()))
    }

    #[test]
    fn test_unknown_section_rejected() {
        let result = SiteConfig::from_str("[serve]\nport = 1");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_without_config_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("src/pages")).unwrap();
        let root = dir.path().to_str().unwrap();

        let config = SiteConfig::load(&cli(&["--root", root, "build"])).unwrap();

        let root = dir.path().canonicalize().unwrap();
        assert_eq!(config.get_root(), root);
        assert_eq!(config.build.pages, root.join("src/pages"));
        assert_eq!(config.build.data, root.join("data"));
        assert_eq!(config.manifest_path(), root.join("public/pages.json"));
    }

    #[test]
    fn test_load_reads_file_and_cli_overrides() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("routes")).unwrap();
        fs::write(
            dir.path().join("pagegen.toml"),
            "[build]\npages = \"routes\"\noutput = \"dist\"\n\n[watch]\ndebounce_ms = 100\n",
        )
        .unwrap();
        let root = dir.path().to_str().unwrap();

        let config =
            SiteConfig::load(&cli(&["--root", root, "--output", "out", "watch", "--debounce", "20"]))
                .unwrap();

        let root = dir.path().canonicalize().unwrap();
        assert_eq!(config.build.pages, root.join("routes"));
        assert_eq!(config.build.output, root.join("out"));
        assert_eq!(config.watch.debounce_ms, 20);
        assert_eq!(config.config_path, root.join("pagegen.toml"));
    }

    #[test]
    fn test_validate_missing_pages_dir() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().to_str().unwrap();

        let err = SiteConfig::load(&cli(&["--root", root, "build"])).unwrap_err();
        assert!(err.to_string().contains("[build.pages]"));
    }

    #[test]
    fn test_validate_prefix_and_debounce() {
        let dir = TempDir::new().unwrap();
        let mut config = SiteConfig::default();
        config.build.pages = dir.path().to_path_buf();
        assert!(config.validate().is_ok());

        config.collection.prefix = "bad{".into();
        assert!(config.validate().is_err());

        config.collection.prefix = "unstable_".into();
        config.watch.debounce_ms = MAX_DEBOUNCE_MS + 1;
        assert!(config.validate().is_err());
    }
}
