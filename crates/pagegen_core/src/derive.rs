//! Pattern + record → concrete URL path.

use crate::pattern::{Param, Pattern, Segment};
use crate::record;
use crate::slug::SlugMode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Trailing-slash policy shared by every path derived in one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrailingSlash {
    /// `/products/shoes`
    #[default]
    Never,
    /// `/products/shoes/`
    Always,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeriveOptions {
    pub trailing_slash: TrailingSlash,
    pub slug: SlugMode,
}

/// A record cannot fill a parameter of the pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("missing field `{field}` for parameter `{param}` in `{pattern}`")]
    Missing {
        param: String,
        field: String,
        pattern: String,
    },

    #[error(
        "field `{field}` for parameter `{param}` in `{pattern}` is {kind}, \
         expected a string, number or boolean"
    )]
    Unsupported {
        param: String,
        field: String,
        pattern: String,
        kind: &'static str,
    },

    #[error(
        "optional parameter `{param}` in `{pattern}` has a value but an earlier optional parameter does not"
    )]
    OptionalGap { param: String, pattern: String },
}

impl FieldError {
    pub(crate) fn missing(pattern: &Pattern, param: &Param) -> Self {
        Self::Missing {
            param: param.name().to_owned(),
            field: param.field().to_owned(),
            pattern: pattern.source().to_owned(),
        }
    }
}

/// Concrete, normalized URL path derived from one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedPath {
    url: String,
    optional_present: usize,
}

impl DerivedPath {
    pub fn as_str(&self) -> &str {
        &self.url
    }

    /// How many optional segments made it into the path.
    pub const fn optional_present(&self) -> usize {
        self.optional_present
    }

    pub fn into_string(self) -> String {
        self.url
    }
}

impl fmt::Display for DerivedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

/// Substitute every parameter of `pattern` with the record's field value.
///
/// Values are slugified per `options.slug` and then percent-encoded, so a
/// value containing `/` stays a single segment. Literal segments pass
/// through unchanged. Absent optional parameters are left out of the path.
pub fn derive_path(
    pattern: &Pattern,
    record: &Value,
    options: DeriveOptions,
) -> Result<DerivedPath, FieldError> {
    let mut parts: Vec<String> = Vec::with_capacity(pattern.len());
    let mut optional_present = 0;
    let mut gap = false;

    for segment in pattern.segments() {
        match segment {
            Segment::Literal(text) => parts.push(text.clone()),
            Segment::Required(param) => {
                let text = segment_text(pattern, param, record, options.slug)?
                    .ok_or_else(|| FieldError::missing(pattern, param))?;
                parts.push(encode_segment(&text));
            }
            Segment::Optional(param) => {
                match segment_text(pattern, param, record, options.slug)? {
                    Some(_) if gap => {
                        return Err(FieldError::OptionalGap {
                            param: param.name().to_owned(),
                            pattern: pattern.source().to_owned(),
                        });
                    }
                    Some(text) => {
                        parts.push(encode_segment(&text));
                        optional_present += 1;
                    }
                    None => gap = true,
                }
            }
        }
    }

    Ok(DerivedPath {
        url: normalize_url(&parts.join("/"), options.trailing_slash),
        optional_present,
    })
}

/// Canonical absolute form: leading `/`, no empty segments, trailing slash per policy.
pub fn normalize_url(path: &str, trailing_slash: TrailingSlash) -> String {
    let joined = path
        .split('/')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/");

    match (joined.is_empty(), trailing_slash) {
        (true, _) => "/".to_owned(),
        (false, TrailingSlash::Never) => format!("/{joined}"),
        (false, TrailingSlash::Always) => format!("/{joined}/"),
    }
}

/// Percent-encode one value as a path segment.
///
/// `urlencoding` leaves `.` alone, so whole-segment `.` and `..` are escaped
/// here to keep them from resolving as dot segments.
fn encode_segment(text: &str) -> String {
    match text {
        "." => "%2E".to_owned(),
        ".." => "%2E%2E".to_owned(),
        _ => urlencoding::encode(text).into_owned(),
    }
}

/// Text of one parameter segment before encoding; `None` when absent.
fn segment_text(
    pattern: &Pattern,
    param: &Param,
    record: &Value,
    slug: SlugMode,
) -> Result<Option<String>, FieldError> {
    let Some(value) = record::lookup(record, param.field()) else {
        return Ok(None);
    };

    let text = match value {
        Value::String(s) => slug.apply(s),
        Value::Number(n) => slug.apply(&n.to_string()),
        Value::Bool(b) => slug.apply(&b.to_string()),
        other => {
            return Err(FieldError::Unsupported {
                param: param.name().to_owned(),
                field: param.field().to_owned(),
                pattern: pattern.source().to_owned(),
                kind: record::kind(other),
            });
        }
    };

    Ok((!text.is_empty()).then_some(text))
}
