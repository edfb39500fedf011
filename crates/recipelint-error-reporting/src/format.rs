//! Output dialects for diagnostics.
//!
//! Two dialects are supported: GCC-style lines that editors and terminals
//! understand, and GitHub workflow commands that annotate files in pull
//! requests when printed from a GitHub Action.

use crate::{Diagnostic, Level};
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Level names used in GCC-style output.
pub static GCC_LEVELS: Lazy<HashMap<Level, &'static str>> = Lazy::new(|| {
    HashMap::from([
        (Level::Error, "error"),
        (Level::Warning, "warning"),
        (Level::Info, "note"),
        (Level::Style, "note"),
    ])
});

/// Level names used in GitHub workflow commands.
pub static GITHUB_LEVELS: Lazy<HashMap<Level, &'static str>> = Lazy::new(|| {
    HashMap::from([
        (Level::Error, "error"),
        (Level::Warning, "warning"),
        (Level::Info, "notice"),
        (Level::Style, "notice"),
    ])
});

/// How diagnostics are printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// `file:line:column: level: message`
    #[default]
    Gcc,
    /// `::level file=...,line=...,col=...::message`
    Github,
}

impl OutputFormat {
    pub fn format(&self, diagnostic: &Diagnostic) -> String {
        match self {
            OutputFormat::Gcc => format_gcc(diagnostic),
            OutputFormat::Github => format_github(diagnostic),
        }
    }
}

fn level_name(table: &HashMap<Level, &'static str>, level: Level) -> &'static str {
    table.get(&level).copied().unwrap_or_else(|| level.as_str())
}

fn format_gcc(diagnostic: &Diagnostic) -> String {
    format!(
        "{}:{}:{}: {}: {}",
        diagnostic.file_name,
        diagnostic.line,
        diagnostic.column,
        level_name(&GCC_LEVELS, diagnostic.level),
        diagnostic.message
    )
}

fn format_github(diagnostic: &Diagnostic) -> String {
    let end_line = diagnostic
        .end_line
        .map(|line| format!(",endLine={}", line))
        .unwrap_or_default();
    let end_column = diagnostic
        .end_column
        .map(|column| format!(",endColumn={}", column))
        .unwrap_or_default();
    format!(
        "::{} file={},line={}{},col={}{}::{}",
        level_name(&GITHUB_LEVELS, diagnostic.level),
        diagnostic.file_name,
        diagnostic.line,
        end_line,
        diagnostic.column,
        end_column,
        diagnostic.message
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;

    #[test]
    fn test_every_level_has_a_name_in_both_dialects() {
        for level in [Level::Error, Level::Warning, Level::Info, Level::Style] {
            assert!(GCC_LEVELS.contains_key(&level));
            assert!(GITHUB_LEVELS.contains_key(&level));
        }
    }

    #[test]
    fn test_gcc_format() {
        let diagnostic = Diagnostic::info(
            "DYLD_LIBRARY_PATH is ignored on recent MacOS versions [ali:dyld-library-path]",
            "zlib.sh",
            12,
            8,
        );
        assert_snapshot!(
            OutputFormat::Gcc.format(&diagnostic),
            @"zlib.sh:12:8: note: DYLD_LIBRARY_PATH is ignored on recent MacOS versions [ali:dyld-library-path]"
        );
    }

    #[test]
    fn test_github_format_with_end_positions() {
        let diagnostic = Diagnostic::new(Level::Style, "Double quote [SC2086]", "root.sh", 40, 3)
            .with_end(Some(40), Some(10));
        assert_snapshot!(
            OutputFormat::Github.format(&diagnostic),
            @"::notice file=root.sh,line=40,endLine=40,col=3,endColumn=10::Double quote [SC2086]"
        );
    }

    #[test]
    fn test_github_format_without_end_positions() {
        let diagnostic = Diagnostic::error("package: required field [ali:schema]", "zlib.sh", 1, 0);
        assert_eq!(
            OutputFormat::Github.format(&diagnostic),
            "::error file=zlib.sh,line=1,col=0::package: required field [ali:schema]"
        );
    }
}
