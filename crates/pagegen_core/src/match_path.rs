//! Match expressions for patterns with optional segments.
//!
//! A page derived from `blog/{unstable_slug?}.js` lives at `/blog/my-post`,
//! but the same component should also answer `/blog`. The match path nests
//! one optional group per emitted optional segment:
//!
//! ```text
//! /blog/my-post        →  /blog(/my\-post)?
//! /docs/guide/intro    →  /docs(/guide(/intro)?)?    (both segments optional)
//! ```

use crate::derive::DerivedPath;
use crate::pattern::Pattern;
use regex::Regex;
use std::fmt;

#[derive(Debug, Clone)]
pub struct MatchPath {
    expr: String,
    regex: Regex,
}

impl MatchPath {
    /// The regex-like expression handed to the page sink.
    pub fn as_str(&self) -> &str {
        &self.expr
    }

    /// Whether `url` is the derived path or one of its shorter variants.
    /// A single trailing slash is tolerated.
    pub fn matches(&self, url: &str) -> bool {
        self.regex.is_match(url)
    }

    pub fn into_string(self) -> String {
        self.expr
    }
}

impl PartialEq for MatchPath {
    fn eq(&self, other: &Self) -> bool {
        self.expr == other.expr
    }
}

impl Eq for MatchPath {}

impl fmt::Display for MatchPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expr)
    }
}

/// Compute the match path for a derived path, or `None` when the pattern
/// has no optional parameter.
pub fn match_path(derived: &DerivedPath, pattern: &Pattern) -> Option<MatchPath> {
    if !pattern.has_optional() {
        return None;
    }

    let segments: Vec<&str> = derived
        .as_str()
        .split('/')
        .filter(|s| !s.is_empty())
        .collect();
    let optional = derived.optional_present().min(segments.len());
    let (fixed, tail) = segments.split_at(segments.len() - optional);

    let mut expr = String::new();
    for segment in fixed {
        expr.push('/');
        expr.push_str(&regex::escape(segment));
    }
    for segment in tail {
        expr.push_str("(/");
        expr.push_str(&regex::escape(segment));
    }
    for _ in tail {
        expr.push_str(")?");
    }
    if expr.is_empty() {
        expr.push('/');
    }

    // Every piece of user text is escaped, so the expression always compiles.
    let regex = Regex::new(&format!("^(?:{expr})/?$")).ok()?;
    Some(MatchPath { expr, regex })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derive::{DeriveOptions, derive_path};
    use crate::pattern::DEFAULT_PREFIX;
    use serde_json::{Value, json};

    fn compute(path: &str, record: &Value) -> (DerivedPath, Option<MatchPath>) {
        let pattern = Pattern::parse(path, DEFAULT_PREFIX).unwrap();
        let derived = derive_path(&pattern, record, DeriveOptions::default()).unwrap();
        let matcher = match_path(&derived, &pattern);
        (derived, matcher)
    }

    #[test]
    fn test_absent_without_optional_segments() {
        let (_, matcher) = compute(
            "products/{unstable_category}/{unstable_id}.js",
            &json!({ "category": "shoes", "id": 42 }),
        );
        assert!(matcher.is_none());
    }

    #[test]
    fn test_optional_slug_matches_both_depths() {
        let (derived, matcher) = compute("blog/{unstable_slug?}.js", &json!({ "slug": "my-post" }));
        let matcher = matcher.unwrap();

        assert_eq!(derived.as_str(), "/blog/my-post");
        assert!(matcher.matches("/blog/my-post"));
        assert!(matcher.matches("/blog"));
        assert!(matcher.matches("/blog/"));
        assert!(!matcher.matches("/blog/other-post"));
        assert!(!matcher.matches("/blog/my-post/extra"));
    }

    #[test]
    fn test_expression_shape() {
        let (_, matcher) = compute("blog/{unstable_slug?}.js", &json!({ "slug": "hello" }));
        assert_eq!(matcher.unwrap().as_str(), "/blog(/hello)?");

        let (_, matcher) = compute(
            "a/{unstable_x?}/{unstable_y?}.js",
            &json!({ "x": "x", "y": "y" }),
        );
        assert_eq!(matcher.unwrap().as_str(), "/a(/x(/y)?)?");
    }

    #[test]
    fn test_two_optionals_match_every_prefix() {
        let (_, matcher) = compute(
            "a/{unstable_x?}/{unstable_y?}.js",
            &json!({ "x": "x", "y": "y" }),
        );
        let matcher = matcher.unwrap();

        assert!(matcher.matches("/a/x/y"));
        assert!(matcher.matches("/a/x"));
        assert!(matcher.matches("/a"));
        assert!(!matcher.matches("/a/y"));
    }

    #[test]
    fn test_optional_absent_still_yields_expression() {
        let (derived, matcher) = compute("blog/{unstable_slug?}.js", &json!({}));

        assert_eq!(derived.as_str(), "/blog");
        assert_eq!(matcher.unwrap().as_str(), "/blog");
    }

    #[test]
    fn test_root_level_optional() {
        let (_, matcher) = compute("{unstable_lang?}.js", &json!({ "lang": "en" }));
        let matcher = matcher.unwrap();

        assert!(matcher.matches("/en"));
        assert!(matcher.matches("/"));
    }

    #[test]
    fn test_regex_metacharacters_are_escaped() {
        let (_, matcher) = compute("v1.0/{unstable_slug?}.js", &json!({ "slug": "a.b" }));
        let matcher = matcher.unwrap();

        assert!(matcher.matches("/v1.0/a.b"));
        assert!(!matcher.matches("/v1x0/a.b"));
    }
}
