/*
 * shellcheck.rs
 * Copyright (c) 2025 ALICE Software Group
 *
 * shellcheck integration.
 */

use super::{StagedParts, run_tool};
use crate::checks::{CheckError, Checker};
use crate::part::RecipePart;
use recipelint_error_reporting::{Diagnostic, Level};
use serde::Deserialize;
use std::path::PathBuf;

const TOOL: &str = "shellcheck";

/// Optional checks to turn on (see `shellcheck --list-optional`).
const ENABLED_OPTIONAL_CHECKS: &[&str] = &[
    // Suggest explicitly using -n in `[ $var ]`.
    "avoid-nullary-conditions",
    // Notify when set -e is suppressed during function invocation.
    "check-set-e-suppressed",
];

/// Runs shellcheck over every script part.
pub struct ShellCheck {
    program: PathBuf,
}

impl ShellCheck {
    pub fn new(program: PathBuf) -> Self {
        Self { program }
    }

    fn args() -> Vec<String> {
        vec![
            "--format=json1".to_string(),
            "--shell=bash".to_string(),
            "--enable".to_string(),
            ENABLED_OPTIONAL_CHECKS.join(","),
        ]
    }
}

/// Top level of `--format=json1` output.
#[derive(Debug, Deserialize)]
pub struct Report {
    pub comments: Vec<Comment>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub file: String,
    pub line: usize,
    pub end_line: usize,
    pub column: usize,
    pub end_column: usize,
    pub level: Level,
    pub code: u32,
    pub message: String,
}

impl Comment {
    /// Translate a comment on a staged file into the recipe's coordinates.
    pub fn into_diagnostic(self, part: &RecipePart) -> Diagnostic {
        let line_offset = part.line_offset();
        let column_offset = part.column_offset();
        Diagnostic::new(
            self.level,
            format!("{} [SC{}]", self.message, self.code),
            part.file_name(),
            self.line + line_offset,
            self.column + column_offset,
        )
        .with_end(
            Some(self.end_line + line_offset),
            Some(self.end_column + column_offset),
        )
    }
}

pub fn parse_report(stdout: &[u8]) -> Result<Report, CheckError> {
    serde_json::from_slice(stdout).map_err(|err| CheckError::ToolOutput {
        tool: TOOL,
        message: err.to_string(),
    })
}

impl Checker for ShellCheck {
    fn name(&self) -> &'static str {
        TOOL
    }

    fn check(
        &self,
        parts: &[RecipePart],
        sink: &mut dyn FnMut(Diagnostic),
    ) -> Result<(), CheckError> {
        let scripts = parts.iter().enumerate().filter_map(|(index, part)| {
            part.as_script().map(|script| {
                let suffix = match &script.key_name {
                    Some(key) => format!(".{}.sh", key),
                    None => ".script.sh".to_string(),
                };
                (index, part, script.content.as_slice(), suffix)
            })
        });
        let staged = StagedParts::write(TOOL, scripts)?;
        if staged.paths.is_empty() {
            return Ok(());
        }

        let Some(stdout) = run_tool(TOOL, &self.program, &Self::args(), &staged.paths)? else {
            return Ok(());
        };
        for comment in parse_report(&stdout)?.comments {
            let part = staged.lookup(TOOL, &comment.file)?;
            sink(comment.into_diagnostic(part));
        }
        Ok(())
    }
}
