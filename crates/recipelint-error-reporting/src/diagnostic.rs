//! Core diagnostic message types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a diagnostic.
///
/// The names match the levels shellcheck and yamllint report, so their output
/// deserializes into this type directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// A problem that makes the recipe wrong; fails the run
    Error,
    /// A likely problem
    Warning,
    /// Informational message
    Info,
    /// A style suggestion
    Style,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Error => "error",
            Level::Warning => "warning",
            Level::Info => "info",
            Level::Style => "style",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A linter message.
///
/// Line and column numbers are 1-based and relative to the original input
/// file, not to any part that was split out of it. Column 0 means "no
/// particular column".
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Diagnostic {
    pub level: Level,
    pub message: String,
    pub file_name: String,
    pub line: usize,
    pub column: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_column: Option<usize>,
}

impl Diagnostic {
    pub fn new(
        level: Level,
        message: impl Into<String>,
        file_name: impl Into<String>,
        line: usize,
        column: usize,
    ) -> Self {
        Self {
            level,
            message: message.into(),
            file_name: file_name.into(),
            line,
            column,
            end_line: None,
            end_column: None,
        }
    }

    pub fn error(
        message: impl Into<String>,
        file_name: impl Into<String>,
        line: usize,
        column: usize,
    ) -> Self {
        Self::new(Level::Error, message, file_name, line, column)
    }

    pub fn warning(
        message: impl Into<String>,
        file_name: impl Into<String>,
        line: usize,
        column: usize,
    ) -> Self {
        Self::new(Level::Warning, message, file_name, line, column)
    }

    pub fn info(
        message: impl Into<String>,
        file_name: impl Into<String>,
        line: usize,
        column: usize,
    ) -> Self {
        Self::new(Level::Info, message, file_name, line, column)
    }

    /// Set the end of the range this diagnostic covers.
    pub fn with_end(mut self, end_line: Option<usize>, end_column: Option<usize>) -> Self {
        self.end_line = end_line;
        self.end_column = end_column;
        self
    }

    pub fn is_error(&self) -> bool {
        self.level == Level::Error
    }
}
