//! `[watch]` section configuration.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// `[watch]` section in pagegen.toml
///
/// # Example
/// ```toml
/// [watch]
/// enable = true
/// debounce_ms = 300
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct WatchConfig {
    /// Keep builders running after the first pass (`pagegen watch`).
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub enable: bool,

    /// Quiet period after a change before the pipeline re-runs.
    #[serde(default = "defaults::watch::debounce_ms")]
    #[educe(Default = defaults::watch::debounce_ms())]
    pub debounce_ms: u64,
}

impl WatchConfig {
    pub const fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
