/*
 * options.rs
 * Copyright (c) 2025 ALICE Software Group
 *
 * Run configuration.
 */

use std::path::PathBuf;

/// Which checkers run, and how the external ones are invoked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintOptions {
    pub headerlint: bool,
    pub scriptlint: bool,
    pub yamllint: bool,
    pub shellcheck: bool,
    pub yamllint_program: PathBuf,
    pub shellcheck_program: PathBuf,
}

impl Default for LintOptions {
    fn default() -> Self {
        Self {
            headerlint: true,
            scriptlint: true,
            yamllint: true,
            shellcheck: true,
            yamllint_program: PathBuf::from("yamllint"),
            shellcheck_program: PathBuf::from("shellcheck"),
        }
    }
}
