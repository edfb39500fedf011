//! Source positions and their resolution from object paths.

use crate::TrackedYaml;
use std::fmt;
use thiserror::Error;
use yaml_rust2::Yaml;

/// A 1-based line and column in a source file.
///
/// The default, `(1, 0)`, stands for "somewhere in this file": it is used when
/// a key is required but missing, or when a parser cannot report a location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Create a Position from a yaml-rust2 marker.
    ///
    /// yaml-rust2 counts lines from 1 and columns from 0.
    pub fn from_marker(marker: &yaml_rust2::scanner::Marker) -> Self {
        Self {
            line: marker.line(),
            column: marker.col() + 1,
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self { line: 1, column: 0 }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A segment in an object path
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// Mapping key (not necessarily a string)
    Key(Yaml),
    /// Sequence index
    Index(usize),
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(Yaml::String(key.to_string()))
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Index(index) => write!(f, "{}", index),
            PathSegment::Key(key) => match key {
                Yaml::String(s) | Yaml::Real(s) => write!(f, "{}", s),
                Yaml::Integer(i) => write!(f, "{}", i),
                Yaml::Boolean(b) => write!(f, "{}", b),
                Yaml::Null => write!(f, "null"),
                other => write!(f, "{:?}", other),
            },
        }
    }
}

/// Where in a nested object a value is located, as a series of keys.
///
/// For instance, `A` is at path `[0, "a"]` in the object `[{"a": A}]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ObjectPath {
    segments: Vec<PathSegment>,
}

impl ObjectPath {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a path from string keys only.
    pub fn from_keys<'a>(keys: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            segments: keys.into_iter().map(PathSegment::from).collect(),
        }
    }

    /// A copy of this path extended by one segment.
    pub fn child(&self, segment: PathSegment) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment);
        Self { segments }
    }

    pub fn push(&mut self, segment: PathSegment) {
        self.segments.push(segment);
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }
}

impl From<Vec<PathSegment>> for ObjectPath {
    fn from(segments: Vec<PathSegment>) -> Self {
        Self { segments }
    }
}

/// Dot-joined segments, e.g. `overrides.ROOT.version` or `requires.0`.
impl fmt::Display for ObjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

/// A path that does not fit the tree it is resolved against.
///
/// This is a bug in whoever built the path, never a problem in the user's
/// file, so it is kept apart from diagnostics.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResolveError {
    #[error("path {path} has no element at {segment}")]
    MissingStep { path: String, segment: String },

    #[error("expected a mapping or sequence at {path}; got a {found}")]
    NotAContainer { path: String, found: &'static str },
}

/// Find the line and column of the element addressed by `path`.
///
/// The walk follows every segment but the last. At the parent reached:
///
/// - for a mapping, the last segment is looked up in its key positions; a key
///   that is not declared (typically a required key that is missing) resolves
///   to the default `(1, 0)`;
/// - for a sequence, the position of its last item is used whatever the last
///   segment says, since per-item errors are reported near the end of the list.
///
/// An empty path resolves to the default position.
///
/// # Errors
///
/// Returns [`ResolveError`] if an intermediate segment does not exist, or if
/// the parent is a scalar.
pub fn resolve(tree: &TrackedYaml, path: &ObjectPath) -> Result<Position, ResolveError> {
    let Some((last, walk)) = path.segments().split_last() else {
        return Ok(Position::default());
    };

    let mut parent = tree;
    for (depth, segment) in walk.iter().enumerate() {
        let next = match (parent, segment) {
            (TrackedYaml::Mapping(mapping), PathSegment::Key(key)) => mapping.get(key),
            (TrackedYaml::Sequence(sequence), PathSegment::Index(index)) => sequence.get(*index),
            _ => None,
        };
        parent = next.ok_or_else(|| ResolveError::MissingStep {
            path: ObjectPath::from(walk[..depth].to_vec()).to_string(),
            segment: segment.to_string(),
        })?;
    }

    match parent {
        TrackedYaml::Mapping(mapping) => Ok(match last {
            PathSegment::Key(key) => mapping.key_position(key).unwrap_or_default(),
            PathSegment::Index(index) => mapping
                .key_position(&Yaml::Integer(*index as i64))
                .unwrap_or_default(),
        }),
        TrackedYaml::Sequence(sequence) => Ok(sequence
            .item_positions()
            .last()
            .copied()
            .unwrap_or_default()),
        TrackedYaml::Scalar(yaml) => Err(ResolveError::NotAContainer {
            path: ObjectPath::from(walk.to_vec()).to_string(),
            found: crate::type_name(yaml),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    #[test]
    fn test_resolve_top_level_key() {
        let yaml = parse("package: zlib\nversion: v1.3\n").unwrap();
        assert_eq!(
            resolve(&yaml, &ObjectPath::from_keys(["package"])).unwrap(),
            Position::new(1, 1)
        );
        assert_eq!(
            resolve(&yaml, &ObjectPath::from_keys(["version"])).unwrap(),
            Position::new(2, 1)
        );
    }

    #[test]
    fn test_resolve_nested_key() {
        let yaml = parse("overrides:\n  ROOT:\n    version: v6\n").unwrap();
        let path = ObjectPath::from_keys(["overrides", "ROOT", "version"]);
        assert_eq!(resolve(&yaml, &path).unwrap(), Position::new(3, 5));
    }

    #[test]
    fn test_missing_key_resolves_to_default() {
        let yaml = parse("package: zlib\n").unwrap();
        let path = ObjectPath::from_keys(["version"]);
        assert_eq!(resolve(&yaml, &path).unwrap(), Position::new(1, 0));
    }

    #[test]
    fn test_sequence_uses_last_item_position() {
        let yaml = parse("requires:\n  - zlib\n  - bz2\n  - lz4\n").unwrap();
        let first = ObjectPath::from_keys(["requires"]).child(PathSegment::Index(0));
        let last = ObjectPath::from_keys(["requires"]).child(PathSegment::Index(2));
        assert_eq!(resolve(&yaml, &first).unwrap(), Position::new(4, 5));
        assert_eq!(resolve(&yaml, &last).unwrap(), Position::new(4, 5));
    }

    #[test]
    fn test_non_string_key() {
        let yaml = parse("env:\n  1: one\n  true: yes\n").unwrap();
        let path = ObjectPath::from_keys(["env"]).child(PathSegment::Key(Yaml::Boolean(true)));
        assert_eq!(resolve(&yaml, &path).unwrap(), Position::new(3, 3));
    }

    #[test]
    fn test_scalar_parent_is_an_internal_error() {
        let yaml = parse("package: zlib\n").unwrap();
        let path = ObjectPath::from_keys(["package", "name"]);
        assert!(matches!(
            resolve(&yaml, &path),
            Err(ResolveError::NotAContainer { found: "str", .. })
        ));
    }

    #[test]
    fn test_missing_intermediate_step_is_an_internal_error() {
        let yaml = parse("package: zlib\n").unwrap();
        let path = ObjectPath::from_keys(["overrides", "ROOT"]);
        assert!(matches!(
            resolve(&yaml, &path),
            Err(ResolveError::MissingStep { .. })
        ));
    }

    #[test]
    fn test_empty_path() {
        let yaml = parse("package: zlib\n").unwrap();
        assert_eq!(resolve(&yaml, &ObjectPath::new()).unwrap(), Position::default());
    }

    #[test]
    fn test_path_display() {
        let path = ObjectPath::from_keys(["requires"]).child(PathSegment::Index(3));
        assert_eq!(path.to_string(), "requires.3");
        assert_eq!(ObjectPath::from_keys(["a", "b"]).to_string(), "a.b");
    }
}
