use core::fmt;

use tangle_schema::Document;

// -----------------------------------------------------------------------------
// PathSegment

/// One step of a [`DocPath`]: an object key, an array index, or the
/// placeholder marking a map-key position (keys are assumed non-cyclic, so
/// the placeholder never needs to be addressable from a `@ref`).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Key(String),
    Index(usize),
    MapKey,
}

/// Rendering of the map-key placeholder, both in error text and in the JSON
/// array form of a path. Serialized field names may not start with `@`, so
/// this cannot collide with a real key.
const MAP_KEY_TOKEN: &str = "@key";

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => write!(f, "\"{key}\""),
            Self::Index(index) => write!(f, "{index}"),
            Self::MapKey => f.pad(MAP_KEY_TOKEN),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        Self::Key(key.into())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        Self::Key(key)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

// -----------------------------------------------------------------------------
// DocPath

/// An ordered sequence of segments locating a value inside a document.
///
/// Paths key the decode memo and are the currency of `@ref` pointers: the
/// wire form is a JSON array of strings and numbers, the diagnostic form a
/// tuple, e.g. `("shapes", 0, "center")`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct DocPath {
    segments: Vec<PathSegment>,
}

impl DocPath {
    /// The empty path, addressing the document root.
    #[inline]
    pub const fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    #[inline]
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn push(&mut self, segment: impl Into<PathSegment>) {
        self.segments.push(segment.into());
    }

    /// This path extended by one segment. The engines recurse with child
    /// paths, leaving the parent untouched for sibling fields.
    pub fn child(&self, segment: impl Into<PathSegment>) -> Self {
        let mut child = self.clone();
        child.push(segment);
        child
    }

    /// The JSON array form used inside `@ref` values.
    pub fn to_document(&self) -> Document {
        Document::Array(
            self.segments
                .iter()
                .map(|segment| match segment {
                    PathSegment::Key(key) => Document::String(key.clone()),
                    PathSegment::Index(index) => Document::from(*index),
                    PathSegment::MapKey => Document::String(MAP_KEY_TOKEN.into()),
                })
                .collect(),
        )
    }

    /// Parses the JSON array form back into a path. Returns `None` for
    /// anything other than an array of strings and non-negative numbers.
    pub fn from_document(document: &Document) -> Option<Self> {
        let items = document.as_array()?;
        let mut segments = Vec::with_capacity(items.len());
        for item in items {
            let segment = match item {
                Document::String(key) if key == MAP_KEY_TOKEN => PathSegment::MapKey,
                Document::String(key) => PathSegment::Key(key.clone()),
                Document::Number(number) => PathSegment::Index(number.as_u64()? as usize),
                _ => return None,
            };
            segments.push(segment);
        }
        Some(Self { segments })
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{segment}")?;
        }
        f.write_str(")")
    }
}

impl<S: Into<PathSegment>> FromIterator<S> for DocPath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            segments: iter.into_iter().map(Into::into).collect(),
        }
    }
}

// -----------------------------------------------------------------------------
// Tests
