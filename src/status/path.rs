//! Dotted/indexed paths into a status document and their total resolution.
//!
//! A [`Path`] is a sequence of mapping keys and sequence indices. Resolution walks the
//! document one segment at a time and either yields the value found or a [`PathMiss`]
//! naming the exact sub-path where the document stopped matching. Keys may contain
//! dots (`p99.9`), so paths are built from segments rather than parsed from strings.

use compact_str::CompactString;
use core::fmt;
use serde_json::Value;

/// One step of a [`Path`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Look up a key in a mapping.
    Key(CompactString),

    /// Look up a position in a sequence.
    Index(usize),
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => f.write_str(key),
            Self::Index(index) => write!(f, "{index}"),
        }
    }
}

impl From<&str> for Segment {
    fn from(key: &str) -> Self {
        Self::Key(key.into())
    }
}

impl From<usize> for Segment {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

/// A location within a status document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Path(Vec<Segment>);

impl Path {
    /// The empty path, which resolves to the value it is applied to.
    #[must_use]
    pub const fn root() -> Self {
        Self(Vec::new())
    }

    /// Returns a new path with `segment` appended.
    #[must_use]
    pub fn child(&self, segment: impl Into<Segment>) -> Self {
        let mut segments = Vec::with_capacity(self.0.len() + 1);
        segments.extend_from_slice(&self.0);
        segments.push(segment.into());
        Self(segments)
    }

    /// Returns a new path with all of `other`'s segments appended.
    #[must_use]
    pub fn join(&self, other: &Self) -> Self {
        self.0.iter().chain(other.0.iter()).cloned().collect()
    }
}

impl<const N: usize> From<[&str; N]> for Path {
    fn from(keys: [&str; N]) -> Self {
        keys.into_iter().map(Segment::from).collect()
    }
}

impl FromIterator<Segment> for Path {
    fn from_iter<I: IntoIterator<Item = Segment>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

/// Why a path failed to resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissReason {
    /// The container exists but has no (non-null) entry for the segment.
    Absent,

    /// The value reached so far cannot be indexed by the segment, e.g. a key into a number.
    WrongShape,
}

/// A failed resolution, carrying the full logical prefix up to and including the failing segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathMiss {
    pub path: Path,
    pub reason: MissReason,
}

impl fmt::Display for PathMiss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reason {
            MissReason::Absent => write!(f, "cannot find path {}", self.path),
            MissReason::WrongShape => write!(f, "cannot find path {}: parent is not a matching container", self.path),
        }
    }
}

/// Resolve `path` starting at the document root.
pub fn resolve<'a>(value: &'a Value, path: &Path) -> Result<&'a Value, PathMiss> {
    resolve_at(value, &Path::root(), path)
}

/// Resolve `path` relative to `value`, which itself lives at `base` in the document.
///
/// `base` only feeds diagnostics: a miss reports `base` followed by the consumed part of `path`.
/// JSON `null` is treated the same as an absent entry.
pub fn resolve_at<'a>(value: &'a Value, base: &Path, path: &Path) -> Result<&'a Value, PathMiss> {
    let mut current = value;

    for (consumed, segment) in path.0.iter().enumerate() {
        let next = match (current, segment) {
            (Value::Object(map), Segment::Key(key)) => map.get(key.as_str()),
            (Value::Array(items), Segment::Index(index)) => items.get(*index),
            _ => return Err(miss(base, path, consumed, MissReason::WrongShape)),
        };

        current = match next {
            Some(Value::Null) | None => return Err(miss(base, path, consumed, MissReason::Absent)),
            Some(found) => found,
        };
    }

    Ok(current)
}

fn miss(base: &Path, path: &Path, consumed: usize, reason: MissReason) -> PathMiss {
    PathMiss {
        path: base.0.iter().chain(path.0.iter().take(consumed + 1)).cloned().collect(),
        reason,
    }
}
