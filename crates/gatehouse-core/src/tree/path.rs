//! Field paths

use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordered sequence of field names locating a node inside a rule tree
///
/// The empty path is the root. `Mutation.createPost` is the path
/// `["Mutation", "createPost"]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    /// The root path
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Build a path from segments
    pub fn new<S: Into<String>>(segments: impl IntoIterator<Item = S>) -> Self {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// Parse a dotted path such as `Event.title`; empty segments are skipped
    pub fn parse(dotted: &str) -> Self {
        Self::new(dotted.split('.').filter(|segment| !segment.is_empty()))
    }

    /// Path of a direct child
    pub fn child(&self, name: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(name.into());
        Self(segments)
    }

    /// Append a segment in place
    pub fn push(&mut self, name: impl Into<String>) {
        self.0.push(name.into());
    }

    /// Path segments from root to node
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Number of segments
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether this is the root path
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("<root>");
        }
        f.write_str(&self.0.join("."))
    }
}

impl From<&str> for FieldPath {
    fn from(dotted: &str) -> Self {
        Self::parse(dotted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let path = FieldPath::parse("Mutation.createPost");
        assert_eq!(path.segments(), ["Mutation", "createPost"]);
        assert_eq!(path.to_string(), "Mutation.createPost");
        assert_eq!(FieldPath::parse("..Event..title."), FieldPath::new(["Event", "title"]));
    }

    #[test]
    fn test_root() {
        let root = FieldPath::root();
        assert!(root.is_empty());
        assert_eq!(root.to_string(), "<root>");
        assert_eq!(root.child("User").child("name").len(), 2);
    }
}
