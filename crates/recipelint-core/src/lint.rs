/*
 * lint.rs
 * Copyright (c) 2025 ALICE Software Group
 *
 * Linting a set of recipe files end to end.
 */

use crate::checks::default_checkers;
use crate::options::LintOptions;
use crate::orchestrator::{RunReport, run_checkers};
use crate::split::split;
use recipelint_error_reporting::Diagnostic;
use tracing::debug;

/// A recipe file's name, as it should appear in diagnostics, and its bytes.
#[derive(Debug, Clone)]
pub struct RecipeInput {
    pub file_name: String,
    pub content: Vec<u8>,
}

impl RecipeInput {
    pub fn new(file_name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            content: content.into(),
        }
    }
}

/// Split every recipe and run the enabled checkers over the result.
///
/// Splitting problems reach `consumer` first, then checker diagnostics as
/// they are produced.
pub fn lint(
    inputs: &[RecipeInput],
    options: &LintOptions,
    mut consumer: impl FnMut(Diagnostic),
) -> RunReport {
    let mut have_error = false;
    let mut parts = Vec::new();
    for input in inputs {
        let (errors, recipe_parts) = split(&input.content, &input.file_name).into_parts();
        debug!(file = %input.file_name, parts = recipe_parts.len(), errors = errors.len(), "split file");
        for error in errors {
            have_error |= error.is_error();
            consumer(error);
        }
        parts.extend(recipe_parts);
    }

    let checkers = default_checkers(options);
    let mut report = run_checkers(&checkers, &parts, consumer);
    report.have_error |= have_error;
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offline() -> LintOptions {
        LintOptions {
            yamllint: false,
            shellcheck: false,
            ..LintOptions::default()
        }
    }

    #[test]
    fn test_split_errors_come_first() {
        let inputs = [RecipeInput::new("zlib.sh", "package: zlib\n")];
        let mut seen = Vec::new();
        let report = lint(&inputs, &offline(), |d| seen.push(d));

        assert!(report.have_error);
        assert!(seen[0].message.ends_with("[ali:empty]"));
        assert!(seen[1..].iter().all(|d| !d.message.ends_with("[ali:empty]")));
    }

    #[test]
    fn test_clean_recipe() {
        let inputs = [RecipeInput::new(
            "zlib.sh",
            "package: zlib\nversion: v1.3\n---\n#!/bin/bash -e\nmake install\nalibuild-generate-module > $INSTALLROOT/etc/modulefiles/zlib\n",
        )];
        let mut seen = Vec::new();
        let report = lint(&inputs, &offline(), |d| seen.push(d));

        assert_eq!(seen, vec![]);
        assert!(!report.have_error);
        assert!(!report.has_failures());
    }
}
