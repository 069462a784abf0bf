//! Generated page sets and the stale-page diff.

use std::collections::BTreeSet;

/// Paths produced by one run of a collection builder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratedPageSet {
    paths: BTreeSet<String>,
}

impl GeneratedPageSet {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    #[cfg(test)]
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }

    /// Paths in `self` that `next` no longer produces, sorted.
    pub fn stale(&self, next: &Self) -> Vec<String> {
        self.paths.difference(&next.paths).cloned().collect()
    }
}

impl FromIterator<String> for GeneratedPageSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            paths: iter.into_iter().collect(),
        }
    }
}
