//! Configuration error types.

use std::{io, path::PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read `{}`", .0.display())]
    Io(PathBuf, #[source] io::Error),

    #[error("invalid pagegen.toml")]
    Toml(#[from] toml::de::Error),

    /// Rendered as `[section.key] reason`.
    #[error("[{section}.{key}] {reason}")]
    Invalid {
        section: &'static str,
        key: &'static str,
        reason: String,
    },
}

impl ConfigError {
    pub fn invalid(section: &'static str, key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            section,
            key,
            reason: reason.into(),
        }
    }
}
