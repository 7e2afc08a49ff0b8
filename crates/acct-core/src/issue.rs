//! # Validation Issues
//!
//! An [`Issue`] is one structured validation failure reported by a schema:
//! where it happened and what to tell the user.
//!
//! Paths are sequences of [`PathSegment`]s. A path whose first segment is a
//! row index and whose second segment is a key addresses a single cell of the
//! editor; anything else is not attributable to a cell.
//!
//! Paths display as JSON Pointers (`/0/login`) and can be parsed back from
//! them, which is how pointer-based validators feed into this model.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One step of an issue path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// Position in an array.
    Index(usize),
    /// Property of an object.
    Key(String),
}

impl PathSegment {
    /// The index, if this segment is one.
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Self::Index(i) => Some(*i),
            Self::Key(_) => None,
        }
    }

    /// The key, if this segment is one.
    pub fn as_key(&self) -> Option<&str> {
        match self {
            Self::Key(k) => Some(k),
            Self::Index(_) => None,
        }
    }
}

impl From<usize> for PathSegment {
    fn from(i: usize) -> Self {
        Self::Index(i)
    }
}

impl From<&str> for PathSegment {
    fn from(k: &str) -> Self {
        Self::Key(k.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(k: String) -> Self {
        Self::Key(k)
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(i) => write!(f, "{i}"),
            Self::Key(k) => f.write_str(&k.replace('~', "~0").replace('/', "~1")),
        }
    }
}

/// Location of an issue inside the validated value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IssuePath(Vec<PathSegment>);

impl IssuePath {
    /// The empty path (the validated value itself).
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Build a path from segments.
    pub fn new(segments: Vec<PathSegment>) -> Self {
        Self(segments)
    }

    /// Parse a JSON Pointer (RFC 6901) without the value it points into.
    ///
    /// Segments made only of ASCII digits become [`PathSegment::Index`];
    /// everything else is a key with `~1` and `~0` unescaped. `""` and `"/"`
    /// are both the root. A leading `/` is optional.
    ///
    /// An object key made only of digits also parses as an index here. Use
    /// [`IssuePath::from_pointer_in`] when the value is at hand.
    pub fn from_pointer(pointer: &str) -> Self {
        pointer_tokens(pointer)
            .map(|raw| match as_index(raw) {
                Some(i) => PathSegment::Index(i),
                None => PathSegment::Key(unescape(raw)),
            })
            .collect()
    }

    /// Parse a JSON Pointer into `instance`, typing each segment by the
    /// value it steps into: an index inside arrays, a key inside objects.
    /// Once the pointer leaves `instance`, the remaining segments are parsed
    /// as in [`IssuePath::from_pointer`].
    pub fn from_pointer_in(pointer: &str, instance: &serde_json::Value) -> Self {
        use serde_json::Value;

        let mut current = Some(instance);
        pointer_tokens(pointer)
            .map(|raw| match current.take() {
                Some(Value::Object(map)) => {
                    let key = unescape(raw);
                    current = map.get(&key);
                    PathSegment::Key(key)
                }
                Some(Value::Array(items)) => match as_index(raw) {
                    Some(i) => {
                        current = items.get(i);
                        PathSegment::Index(i)
                    }
                    None => PathSegment::Key(unescape(raw)),
                },
                _ => match as_index(raw) {
                    Some(i) => PathSegment::Index(i),
                    None => PathSegment::Key(unescape(raw)),
                },
            })
            .collect()
    }

    /// Return a new path with `segment` prepended.
    pub fn prefixed(&self, segment: impl Into<PathSegment>) -> Self {
        let mut segments = Vec::with_capacity(self.0.len() + 1);
        segments.push(segment.into());
        segments.extend(self.0.iter().cloned());
        Self(segments)
    }

    /// Return a new path with `segment` appended.
    pub fn child(&self, segment: impl Into<PathSegment>) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        Self(segments)
    }

    /// The segments of the path.
    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether this is the root path.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The row this path starts in, if its first segment is an index.
    pub fn row(&self) -> Option<usize> {
        self.0.first()?.as_index()
    }

    /// The `(row, field)` cell this path addresses, if any.
    ///
    /// Requires at least two segments, the first an index and the second a
    /// key. Deeper segments (e.g. `/0/label/2/text`) attribute to the same
    /// cell as their field.
    pub fn cell(&self) -> Option<(usize, &str)> {
        match self.0.as_slice() {
            [PathSegment::Index(row), PathSegment::Key(field), ..] => Some((*row, field)),
            _ => None,
        }
    }
}

fn pointer_tokens(pointer: &str) -> impl Iterator<Item = &str> {
    let trimmed = pointer.strip_prefix('/').unwrap_or(pointer);
    trimmed.split('/').filter(move |_| !trimmed.is_empty())
}

fn as_index(raw: &str) -> Option<usize> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

fn unescape(raw: &str) -> String {
    raw.replace("~1", "/").replace("~0", "~")
}

impl fmt::Display for IssuePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.0 {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

impl<S: Into<PathSegment>> FromIterator<S> for IssuePath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// One validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Where in the validated value the failure was found.
    pub path: IssuePath,
    /// Human-readable message.
    pub message: String,
}

impl Issue {
    /// Create an issue.
    pub fn new(path: IssuePath, message: impl Into<String>) -> Self {
        Self {
            path,
            message: message.into(),
        }
    }

    /// An issue about the validated value as a whole.
    pub fn at_root(message: impl Into<String>) -> Self {
        Self::new(IssuePath::root(), message)
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "(root): {}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}
