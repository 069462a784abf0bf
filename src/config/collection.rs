//! `[collection]` section configuration.
//!
//! Pattern syntax and derivation policy for collection routes.

use super::defaults;
use educe::Educe;
use pagegen_core::{DeriveOptions, SlugMode, TrailingSlash};
use serde::{Deserialize, Serialize};

/// What a run does with a record that cannot fill the pattern.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingFieldPolicy {
    /// Log the record and keep going with the rest.
    #[default]
    Skip,
    /// Treat the whole run as failed; no pages are created.
    Abort,
}

/// `[collection]` section in pagegen.toml
///
/// # Example
/// ```toml
/// [collection]
/// prefix = "unstable_"
/// query_tag = "unstable_collectionGraphql"
/// trailing_slash = "never"
/// slug = "no"
/// on_missing_field = "skip"
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct CollectionConfig {
    /// Prefix required inside every parameter segment.
    #[serde(default = "defaults::collection::prefix")]
    #[educe(Default = defaults::collection::prefix())]
    pub prefix: String,

    /// Tag of the template literal holding the collection query.
    #[serde(default = "defaults::collection::query_tag")]
    #[educe(Default = defaults::collection::query_tag())]
    pub query_tag: String,

    #[serde(default)]
    pub trailing_slash: TrailingSlash,

    #[serde(default)]
    pub slug: SlugMode,

    #[serde(default)]
    pub on_missing_field: MissingFieldPolicy,
}

impl CollectionConfig {
    pub const fn derive_options(&self) -> DeriveOptions {
        DeriveOptions {
            trailing_slash: self.trailing_slash,
            slug: self.slug,
        }
    }
}
