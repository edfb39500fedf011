// Error types for YAML validation

use recipelint_yaml::{PathSegment, ResolveError, Yaml};
use std::fmt;
use thiserror::Error;

/// Schema combinators whose branches show up as synthetic keys in error trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    AllOf,
    AnyOf,
    NoneOf,
    OneOf,
}

impl Combinator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Combinator::AllOf => "allof",
            Combinator::AnyOf => "anyof",
            Combinator::NoneOf => "noneof",
            Combinator::OneOf => "oneof",
        }
    }
}

/// A key in an [`ErrorTree::Map`] node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKey {
    /// A mapping key of the validated document
    Field(Yaml),
    /// An index into a validated sequence
    Index(usize),
    /// One branch of a combinator; not a location in the document
    Combinator { kind: Combinator, definition: usize },
}

impl ErrorKey {
    pub fn field(name: &str) -> Self {
        ErrorKey::Field(Yaml::String(name.to_string()))
    }

    /// The document path segment this key stands for, if any.
    ///
    /// Combinator branches group alternative schemas; they do not move the
    /// error to a different place in the document.
    pub fn path_segment(&self) -> Option<PathSegment> {
        match self {
            ErrorKey::Field(key) => Some(PathSegment::Key(key.clone())),
            ErrorKey::Index(index) => Some(PathSegment::Index(*index)),
            ErrorKey::Combinator { .. } => None,
        }
    }
}

impl fmt::Display for ErrorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKey::Combinator { kind, definition } => {
                write!(f, "{} definition {}", kind.as_str(), definition)
            }
            other => match other.path_segment() {
                Some(segment) => write!(f, "{}", segment),
                None => Ok(()),
            },
        }
    }
}

/// Validation errors, nested the way the validated document is nested.
///
/// A field's errors are a [`ErrorTree::List`] of messages about the field
/// itself and [`ErrorTree::Map`]s about its children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorTree {
    Map(Vec<(ErrorKey, ErrorTree)>),
    List(Vec<ErrorTree>),
    Message(String),
}

impl ErrorTree {
    pub fn message(message: impl Into<String>) -> Self {
        ErrorTree::Message(message.into())
    }

    /// Number of leaf messages in the tree.
    pub fn count(&self) -> usize {
        match self {
            ErrorTree::Map(entries) => entries.iter().map(|(_, tree)| tree.count()).sum(),
            ErrorTree::List(items) => items.iter().map(ErrorTree::count).sum(),
            ErrorTree::Message(_) => 1,
        }
    }
}

/// Accumulates errors per key, keeping first-seen key order.
#[derive(Debug, Default)]
pub(crate) struct KeyedErrors {
    entries: Vec<(ErrorKey, Vec<ErrorTree>)>,
}

impl KeyedErrors {
    pub(crate) fn add(&mut self, key: ErrorKey, error: ErrorTree) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, errors)) => errors.push(error),
            None => self.entries.push((key, vec![error])),
        }
    }

    pub(crate) fn extend(&mut self, key: ErrorKey, errors: Vec<ErrorTree>) {
        for error in errors {
            self.add(key.clone(), error);
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn into_tree(self) -> ErrorTree {
        ErrorTree::Map(
            self.entries
                .into_iter()
                .map(|(key, errors)| (key, ErrorTree::List(errors)))
                .collect(),
        )
    }
}

/// An error tree that cannot be mapped onto the tracked document.
///
/// Raised when the validator and the tracked tree disagree about the
/// document's shape, which is a programming error rather than a lint finding.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WalkError {
    #[error("cannot position validation error: {0}")]
    Resolve(#[from] ResolveError),
}
