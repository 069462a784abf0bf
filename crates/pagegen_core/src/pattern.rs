//! Filesystem path patterns.
//!
//! A pattern is the path of a page component relative to the pages directory.
//! Segments wrapped in braces are parameters, everything else is literal:
//!
//! | Segment              | Kind                          |
//! |----------------------|-------------------------------|
//! | `products`           | literal                       |
//! | `{unstable_id}`      | required parameter `id`       |
//! | `{unstable_slug?}`   | optional parameter `slug`     |
//! | `{unstable_a__b}`    | required parameter, field a.b |
//!
//! Collection routes are experimental, so every parameter must carry the
//! configured prefix (`unstable_` by default). A pattern that doesn't is
//! rejected as a whole before any other check runs.

use smallvec::SmallVec;
use thiserror::Error;

/// Prefix every parameter segment must carry unless configured otherwise.
pub const DEFAULT_PREFIX: &str = "unstable_";

/// Separator inside a parameter name that stands for nested field access.
const NESTED_SEPARATOR: &str = "__";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error(
        "Creating collection routes from the filesystem is an experimental feature. \
         Every parameter segment needs the prefix '{prefix}'.\n\n\
         Your current path:\n  {path}\n\n\
         Change it to this:\n  {suggestion}"
    )]
    UnstablePrefix {
        path: String,
        prefix: String,
        suggestion: String,
    },

    #[error("malformed parameter segment `{segment}` in `{path}`")]
    Malformed { path: String, segment: String },

    #[error("invalid parameter name `{name}` in `{path}` (use letters, digits, `_` and `.`)")]
    InvalidName { path: String, name: String },

    #[error("parameter `{name}` appears more than once in `{path}`")]
    DuplicateParam { path: String, name: String },

    #[error("optional parameter `{name}` in `{path}` must only be followed by optional parameters")]
    OptionalNotTrailing { path: String, name: String },
}

/// A named parameter and the record field it reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    name: String,
    field: String,
}

impl Param {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            field: name.replace(NESTED_SEPARATOR, "."),
        }
    }

    /// Name as written in the pattern, used as the key for both param maps.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Dot-path of the record field backing this parameter.
    pub fn field(&self) -> &str {
        &self.field
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Required(Param),
    Optional(Param),
}

impl Segment {
    pub const fn param(&self) -> Option<&Param> {
        match self {
            Self::Literal(_) => None,
            Self::Required(param) | Self::Optional(param) => Some(param),
        }
    }

    pub const fn is_optional(&self) -> bool {
        matches!(self, Self::Optional(_))
    }
}

/// Parsed path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    source: String,
    segments: SmallVec<[Segment; 4]>,
}

impl Pattern {
    /// Parse a component path such as `products/{unstable_id}.js`.
    ///
    /// The extension of the last segment is stripped and a trailing `index`
    /// segment is dropped, so `blog/index.js` describes `/blog`.
    pub fn parse(path: &str, prefix: &str) -> Result<Self, PatternError> {
        let source = path.replace('\\', "/");
        check_prefix(&source, prefix)?;

        let mut segments: SmallVec<[Segment; 4]> = SmallVec::new();
        for raw in raw_segments(&source) {
            let segment = parse_segment(&source, raw, prefix)?;
            if let Some(param) = segment.param()
                && segments
                    .iter()
                    .filter_map(Segment::param)
                    .any(|seen| seen.name == param.name)
            {
                return Err(PatternError::DuplicateParam {
                    path: source,
                    name: param.name.clone(),
                });
            }
            segments.push(segment);
        }

        check_optional_trailing(&source, &segments)?;
        Ok(Self { source, segments })
    }

    /// The path this pattern was parsed from, with `/` separators.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Parameters in path order.
    pub fn params(&self) -> impl Iterator<Item = &Param> {
        self.segments.iter().filter_map(Segment::param)
    }

    pub fn has_optional(&self) -> bool {
        self.segments.iter().any(Segment::is_optional)
    }

    /// Number of segments every concrete path of this pattern has.
    pub fn required_len(&self) -> usize {
        self.segments.iter().filter(|s| !s.is_optional()).count()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// Whether a component path declares a collection route at all.
pub fn is_collection_path(path: &str) -> bool {
    path.contains('{')
}

// ============================================================================
// Parsing helpers
// ============================================================================

/// Split into non-empty segments, strip the extension, drop a final `index`.
fn raw_segments(source: &str) -> Vec<&str> {
    let mut parts: Vec<&str> = source
        .split('/')
        .filter(|s| !s.is_empty() && *s != ".")
        .collect();

    if let Some(last) = parts.last_mut() {
        *last = strip_extension(last);
    }
    if parts.last() == Some(&"index") {
        parts.pop();
    }
    parts
}

/// Strip a file extension, never looking inside a parameter's braces.
fn strip_extension(segment: &str) -> &str {
    let floor = segment.rfind('}').map_or(0, |i| i + 1);
    match segment[floor..].rfind('.') {
        Some(0) if floor == 0 => segment,
        Some(dot) => &segment[..floor + dot],
        None => segment,
    }
}

fn check_prefix(source: &str, prefix: &str) -> Result<(), PatternError> {
    if prefix.is_empty() {
        return Ok(());
    }

    let is_unprefixed =
        |part: &str| part.strip_prefix('{').is_some_and(|rest| !rest.starts_with(prefix));
    if !source.split('/').any(is_unprefixed) {
        return Ok(());
    }

    let suggestion = source
        .split('/')
        .map(|part| match part.strip_prefix('{') {
            Some(rest) if !rest.starts_with(prefix) => format!("{{{prefix}{rest}"),
            _ => part.to_owned(),
        })
        .collect::<Vec<_>>()
        .join("/");

    Err(PatternError::UnstablePrefix {
        path: source.to_owned(),
        prefix: prefix.to_owned(),
        suggestion,
    })
}

fn parse_segment(source: &str, raw: &str, prefix: &str) -> Result<Segment, PatternError> {
    let malformed = || PatternError::Malformed {
        path: source.to_owned(),
        segment: raw.to_owned(),
    };

    let Some(inner) = raw.strip_prefix('{') else {
        if raw.contains(['{', '}']) {
            return Err(malformed());
        }
        return Ok(Segment::Literal(raw.to_owned()));
    };

    let inner = inner.strip_suffix('}').ok_or_else(malformed)?;
    if inner.contains(['{', '}']) {
        return Err(malformed());
    }
    let inner = inner.strip_prefix(prefix).ok_or_else(malformed)?;
    let (name, optional) = match inner.strip_suffix('?') {
        Some(name) => (name, true),
        None => (inner, false),
    };

    if name.is_empty() {
        return Err(malformed());
    }
    if !is_valid_name(name) {
        return Err(PatternError::InvalidName {
            path: source.to_owned(),
            name: name.to_owned(),
        });
    }

    let param = Param::new(name);
    Ok(if optional {
        Segment::Optional(param)
    } else {
        Segment::Required(param)
    })
}

/// Checked on the dot-path form, so `a__` and `__a` are rejected like `a.` and `.a`.
fn is_valid_name(name: &str) -> bool {
    let field = name.replace(NESTED_SEPARATOR, ".");
    name.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
        && field.split('.').all(|part| !part.is_empty())
}

/// Optional parameters may only be followed by other optional parameters.
fn check_optional_trailing(source: &str, segments: &[Segment]) -> Result<(), PatternError> {
    let Some(first) = segments.iter().position(Segment::is_optional) else {
        return Ok(());
    };
    if segments[first..].iter().all(Segment::is_optional) {
        return Ok(());
    }

    let name = segments[first]
        .param()
        .map(|p| p.name.clone())
        .unwrap_or_default();
    Err(PatternError::OptionalNotTrailing {
        path: source.to_owned(),
        name,
    })
}
