//! Error types for YAML parsing with source locations.

use crate::Position;
use thiserror::Error;

/// Result type alias for recipelint-yaml operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building a tracked tree.
///
/// Every variant carries a position so that callers can always turn a parse
/// failure into a located diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// YAML syntax error reported by the scanner or parser.
    #[error("{message}")]
    Syntax { message: String, position: Position },

    /// The input contained no YAML document at all.
    #[error("no YAML document found")]
    Empty,
}

impl Error {
    /// Best-known position of the error, or the `(1, 0)` default.
    pub fn position(&self) -> Position {
        match self {
            Error::Syntax { position, .. } => *position,
            Error::Empty => Position::default(),
        }
    }
}

impl From<yaml_rust2::ScanError> for Error {
    fn from(err: yaml_rust2::ScanError) -> Self {
        Error::Syntax {
            message: err.info().to_string(),
            position: Position::from_marker(err.marker()),
        }
    }
}
