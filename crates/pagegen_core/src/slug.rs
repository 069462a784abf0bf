//! Segment slugification.
//!
//! Applied to a parameter value before it is percent-encoded into a path.

use serde::{Deserialize, Serialize};

/// Characters that never survive `SlugMode::Safe`.
const FORBIDDEN_CHARS: &[char] = &[
    '<', '>', ':', '|', '?', '*', '#', '\\', '(', ')', '[', ']', '\t', '\r', '\n',
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlugMode {
    /// Transliterate to lowercase ASCII, non-alphanumerics become `-`.
    On,
    /// Drop forbidden characters, whitespace becomes `_`.
    Safe,
    /// Keep the value as-is (it is still percent-encoded).
    #[default]
    No,
}

impl SlugMode {
    pub fn apply(self, text: &str) -> String {
        match self {
            Self::On => slugify(text),
            Self::Safe => sanitize_text(text),
            Self::No => text.to_owned(),
        }
    }
}

/// Remove forbidden characters and replace whitespace with underscores
fn sanitize_text(text: &str) -> String {
    text.trim()
        .chars()
        .filter(|c| !FORBIDDEN_CHARS.contains(c))
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect()
}

/// `"Héllo, World!"` → `"hello-world"`
fn slugify(text: &str) -> String {
    let ascii = deunicode::deunicode(text).to_ascii_lowercase();
    let mut slug = String::with_capacity(ascii.len());

    for c in ascii.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }

    let trimmed = slug.trim_end_matches('-').len();
    slug.truncate(trimmed);
    slug
}
