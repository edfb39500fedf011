/*
 * yamllint.rs
 * Copyright (c) 2025 ALICE Software Group
 *
 * yamllint integration.
 */

use super::{StagedParts, run_tool};
use crate::checks::{CheckError, Checker};
use crate::part::RecipePart;
use once_cell::sync::Lazy;
use recipelint_error_reporting::{Diagnostic, Level};
use regex::Regex;
use serde_json::json;
use std::path::PathBuf;

const TOOL: &str = "yamllint";

/// One line of `-f parsable` output: `file:line:column: [level] message (code)`
static LINE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<fname>.+?):(?P<line>\d+):(?P<column>\d+):\s\[(?P<level>\w+)\]\s(?P<message>.+)\s\((?P<code>[^)]+)\)$",
    )
    .expect("valid regex")
});

/// Runs yamllint over every recipe header.
pub struct YamlLint {
    program: PathBuf,
}

impl YamlLint {
    pub fn new(program: PathBuf) -> Self {
        Self { program }
    }

    fn args() -> Vec<String> {
        vec![
            "-f".to_string(),
            "parsable".to_string(),
            "-d".to_string(),
            config().to_string(),
        ]
    }
}

/// Inline yamllint configuration for recipe headers.
pub fn config() -> serde_json::Value {
    json!({
        "extends": "default",
        "rules": {
            // Embedded scripts make long lines common.
            "line-length": {"max": 120, "level": "warning"},
            "indentation": {"spaces": 2, "level": "warning"},
            "colons": {"level": "warning"},
            // Headers have no leading "---".
            "document-start": "disable",
            "empty-values": "enable",
            "braces": {"forbid": "non-empty"},
            "truthy": {"level": "error"},
            "octal-values": {
                "forbid-implicit-octal": true,
                "forbid-explicit-octal": false
            }
        }
    })
}

/// A parsed output line, still in the staged file's coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problem {
    pub file: String,
    pub line: usize,
    pub column: usize,
    pub level: Level,
    pub message: String,
    pub code: String,
}

impl Problem {
    pub fn into_diagnostic(self, part: &RecipePart) -> Diagnostic {
        Diagnostic::new(
            self.level,
            format!("{} [yl:{}]", self.message, self.code),
            part.file_name(),
            self.line + part.line_offset(),
            self.column + part.column_offset(),
        )
    }
}

pub fn parse_line(line: &str) -> Result<Problem, CheckError> {
    let invalid = || CheckError::ToolOutput {
        tool: TOOL,
        message: format!("could not parse output line {:?}", line),
    };
    let captures = LINE_PATTERN.captures(line).ok_or_else(invalid)?;
    let level = match &captures["level"] {
        "error" => Level::Error,
        "warning" => Level::Warning,
        _ => return Err(invalid()),
    };

    Ok(Problem {
        file: captures["fname"].to_string(),
        line: captures["line"].parse().map_err(|_| invalid())?,
        column: captures["column"].parse().map_err(|_| invalid())?,
        level,
        message: captures["message"].to_string(),
        code: captures["code"].to_string(),
    })
}

impl Checker for YamlLint {
    fn name(&self) -> &'static str {
        TOOL
    }

    fn check(
        &self,
        parts: &[RecipePart],
        sink: &mut dyn FnMut(Diagnostic),
    ) -> Result<(), CheckError> {
        let headers = parts.iter().enumerate().filter_map(|(index, part)| {
            part.as_header()
                .map(|header| (index, part, header.raw.as_slice(), ".head.yaml".to_string()))
        });
        let staged = StagedParts::write(TOOL, headers)?;
        if staged.paths.is_empty() {
            return Ok(());
        }

        let Some(stdout) = run_tool(TOOL, &self.program, &Self::args(), &staged.paths)? else {
            return Ok(());
        };
        for line in String::from_utf8_lossy(&stdout).lines() {
            let problem = parse_line(line)?;
            let part = staged.lookup(TOOL, &problem.file)?;
            sink(problem.into_diagnostic(part));
        }
        Ok(())
    }
}
