use jsonptr::PointerBuf;
use std::cmp::Ordering;
use std::fmt::Display;
use std::ops::Deref;
use std::str::FromStr;
use std::sync::Arc;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid property path '{0}': paths cannot contain empty segments")]
pub struct InvalidPath(String);

/// A dotted property path, e.g. `configuration.style.fillColor`
///
/// The path is split into its segments on construction. Segments are
/// never empty, so `a..b`, `.a` or an empty string are rejected.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct PropertyPath(Vec<Arc<str>>);

impl PartialOrd for PropertyPath {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PropertyPath {
    fn cmp(&self, other: &Self) -> Ordering {
        // Compare first by the number of segments, shorter
        // paths come before longer paths no matter the
        // lexicographic order
        self.0
            .len()
            .cmp(&other.0.len())
            // Then lexicographically
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PropertyPath {
    /// Parse a dotted path
    pub fn parse(s: &str) -> Result<Self, InvalidPath> {
        let segments: Vec<Arc<str>> = s.split('.').map(Arc::from).collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(InvalidPath(s.to_string()));
        }
        Ok(PropertyPath(segments))
    }

    /// Create a path from a static string
    ///
    /// # Panics
    ///
    /// This will panic if the string is not a valid path
    pub fn from_static(s: &'static str) -> Self {
        Self::parse(s).expect("static property path should be valid")
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|s| s.as_ref())
    }

    /// Split the path into its parent segments and the last segment
    pub fn split_last(&self) -> (&[Arc<str>], &str) {
        // paths always have at least one segment
        let (last, parents) = self
            .0
            .split_last()
            .map(|(last, parents)| (last.as_ref(), parents))
            .unwrap_or(("", &[]));
        (parents, last)
    }

    /// Return the JSON pointer addressing the same location
    pub fn to_pointer(&self) -> PointerBuf {
        PointerBuf::from_tokens(self.segments())
    }
}

impl Display for PropertyPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

impl FromStr for PropertyPath {
    type Err = InvalidPath;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for PropertyPath {
    type Error = InvalidPath;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl From<PropertyPath> for String {
    fn from(path: PropertyPath) -> String {
        path.to_string()
    }
}

impl Deref for PropertyPath {
    type Target = [Arc<str>];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
