//! Parameter extraction, in both directions.
//!
//! - [`route_params`]: concrete URL → `{name: "string"}` for the render layer.
//!   Values are percent-decoded, always strings.
//! - [`reverse_lookup_params`]: record → `{name: value}` for the page query.
//!   Values are cloned from the record untouched, so `42` stays a number.

use crate::derive::FieldError;
use crate::pattern::{Pattern, Segment};
use crate::record;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use thiserror::Error;

pub type RouteParams = BTreeMap<String, String>;
pub type QueryParams = Map<String, Value>;

/// A concrete path does not line up with its pattern.
///
/// Paths handed in here come from [`derive_path`](crate::derive_path), so any
/// of these means the two sides disagree, not that the user did something wrong.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamError {
    #[error(
        "path `{path}` has {found} segments, pattern `{pattern}` expects {expected_min}..={expected_max}"
    )]
    SegmentCount {
        pattern: String,
        path: String,
        expected_min: usize,
        expected_max: usize,
        found: usize,
    },

    #[error("path segment `{found}` does not match literal `{expected}` of `{pattern}`")]
    LiteralMismatch {
        pattern: String,
        expected: String,
        found: String,
    },

    #[error("path segment `{segment}` is not valid percent-encoded UTF-8")]
    Decode { segment: String },
}

/// Walk `pattern` and `path` in lock-step, collecting parameter values.
///
/// Trailing optional parameters missing from `path` are absent from the result.
pub fn route_params(pattern: &Pattern, path: &str) -> Result<RouteParams, ParamError> {
    let concrete: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    if concrete.len() < pattern.required_len() || concrete.len() > pattern.len() {
        return Err(ParamError::SegmentCount {
            pattern: pattern.source().to_owned(),
            path: path.to_owned(),
            expected_min: pattern.required_len(),
            expected_max: pattern.len(),
            found: concrete.len(),
        });
    }

    let mut params = RouteParams::new();
    for (segment, value) in pattern.segments().iter().zip(concrete) {
        match segment {
            Segment::Literal(text) if text != value => {
                return Err(ParamError::LiteralMismatch {
                    pattern: pattern.source().to_owned(),
                    expected: text.clone(),
                    found: value.to_owned(),
                });
            }
            Segment::Literal(_) => {}
            Segment::Required(param) | Segment::Optional(param) => {
                let decoded = urlencoding::decode(value).map_err(|_| ParamError::Decode {
                    segment: value.to_owned(),
                })?;
                params.insert(param.name().to_owned(), decoded.into_owned());
            }
        }
    }

    Ok(params)
}

/// Recover each parameter's original field value from the record.
///
/// Absent optional parameters are skipped; an absent required one is an error.
pub fn reverse_lookup_params(record: &Value, pattern: &Pattern) -> Result<QueryParams, FieldError> {
    let mut params = QueryParams::new();

    for segment in pattern.segments() {
        let Some(param) = segment.param() else {
            continue;
        };
        match record::lookup(record, param.field()) {
            Some(value) => {
                params.insert(param.name().to_owned(), value.clone());
            }
            None if segment.is_optional() => {}
            None => return Err(FieldError::missing(pattern, param)),
        }
    }

    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::derive::{DeriveOptions, derive_path};
    use crate::pattern::DEFAULT_PREFIX;
    use serde_json::json;

    fn pattern(path: &str) -> Pattern {
        Pattern::parse(path, DEFAULT_PREFIX).unwrap()
    }

    #[test]
    fn test_products_scenario() {
        let pattern = pattern("products/{unstable_category}/{unstable_id}.js");
        let record = json!({ "category": "shoes", "id": 42, "price": 10 });

        let path = derive_path(&pattern, &record, DeriveOptions::default()).unwrap();
        let route = route_params(&pattern, path.as_str()).unwrap();
        let query = reverse_lookup_params(&record, &pattern).unwrap();

        assert_eq!(path.as_str(), "/products/shoes/42");
        assert_eq!(route.get("category").map(String::as_str), Some("shoes"));
        assert_eq!(route.get("id").map(String::as_str), Some("42"));
        assert_eq!(route.len(), 2);
        assert_eq!(query.get("category"), Some(&json!("shoes")));
        assert_eq!(query.get("id"), Some(&json!(42)));
        assert!(query.get("id").unwrap().is_number());
        assert_eq!(query.len(), 2);
    }

    #[test]
    fn test_round_trip_recovers_encoded_values() {
        let pattern = pattern("bands/{unstable_name}/{unstable_year}.js");
        let record = json!({ "name": "AC/DC & friends", "year": 1973 });

        let path = derive_path(&pattern, &record, DeriveOptions::default()).unwrap();
        let route = route_params(&pattern, path.as_str()).unwrap();

        assert_eq!(route["name"], "AC/DC & friends");
        assert_eq!(route["year"], "1973");
    }

    #[test]
    fn test_round_trip_recovers_dot_values() {
        let pattern = pattern("dirs/{unstable_a}/{unstable_b}.js");
        let record = json!({ "a": ".", "b": ".." });

        let path = derive_path(&pattern, &record, DeriveOptions::default()).unwrap();
        let route = route_params(&pattern, path.as_str()).unwrap();

        assert_eq!(route["a"], ".");
        assert_eq!(route["b"], "..");
    }

    #[test]
    fn test_reverse_lookup_is_type_preserving() {
        let pattern = pattern("by/{unstable_author__name}/{unstable_meta}.js");
        let record = json!({
            "author": { "name": "Ana María" },
            "meta": 3.5,
        });

        let path = derive_path(&pattern, &record, DeriveOptions::default()).unwrap();
        let query = reverse_lookup_params(&record, &pattern).unwrap();

        assert_eq!(path.as_str(), "/by/Ana%20Mar%C3%ADa/3.5");
        assert_eq!(query["author__name"], json!("Ana María"));
        assert_eq!(query["meta"], json!(3.5));
    }

    #[test]
    fn test_route_params_with_omitted_optional() {
        let pattern = pattern("blog/{unstable_slug?}.js");

        let full = route_params(&pattern, "/blog/my-post").unwrap();
        assert_eq!(full["slug"], "my-post");

        let short = route_params(&pattern, "/blog").unwrap();
        assert!(short.is_empty());
    }

    #[test]
    fn test_route_params_tolerates_trailing_slash() {
        let pattern = pattern("items/{unstable_id}.js");
        assert_eq!(route_params(&pattern, "/items/7/").unwrap()["id"], "7");
    }

    #[test]
    fn test_route_params_segment_count_mismatch() {
        let pattern = pattern("items/{unstable_id}.js");

        assert!(matches!(
            route_params(&pattern, "/items"),
            Err(ParamError::SegmentCount { found: 1, .. })
        ));
        assert!(matches!(
            route_params(&pattern, "/items/1/2"),
            Err(ParamError::SegmentCount { found: 3, .. })
        ));
    }

    #[test]
    fn test_route_params_literal_mismatch() {
        let pattern = pattern("items/{unstable_id}.js");
        let err = route_params(&pattern, "/things/1").unwrap_err();

        assert_eq!(
            err,
            ParamError::LiteralMismatch {
                pattern: "items/{unstable_id}.js".into(),
                expected: "items".into(),
                found: "things".into(),
            }
        );
    }

    #[test]
    fn test_route_params_invalid_encoding() {
        let pattern = pattern("items/{unstable_id}.js");
        assert!(matches!(
            route_params(&pattern, "/items/%FF"),
            Err(ParamError::Decode { .. })
        ));
    }

    #[test]
    fn test_reverse_lookup_skips_absent_optional() {
        let pattern = pattern("blog/{unstable_slug?}.js");
        let query = reverse_lookup_params(&json!({ "title": "x" }), &pattern).unwrap();
        assert!(query.is_empty());
    }

    #[test]
    fn test_reverse_lookup_missing_required() {
        let pattern = pattern("items/{unstable_id}.js");
        assert!(matches!(
            reverse_lookup_params(&json!({}), &pattern),
            Err(FieldError::Missing { .. })
        ));
    }

    #[test]
    fn test_reverse_lookup_passes_structured_values() {
        let pattern = pattern("items/{unstable_id}.js");
        let record = json!({ "id": { "a": [1, 2] } });
        let query = reverse_lookup_params(&record, &pattern).unwrap();

        assert_eq!(query["id"], json!({ "a": [1, 2] }));
    }
}
