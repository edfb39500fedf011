/*
 * mod.rs
 * Copyright (c) 2025 ALICE Software Group
 *
 * The Checker trait and the built-in rule checkers.
 */

pub mod headerlint;
pub mod key_order;
pub mod recipe_schema;
pub mod scriptlint;

use crate::external::{shellcheck::ShellCheck, yamllint::YamlLint};
use crate::options::LintOptions;
use crate::part::RecipePart;
use recipelint_error_reporting::Diagnostic;
use recipelint_validation::WalkError;
use recipelint_yaml::ResolveError;
use thiserror::Error;

pub use headerlint::HeaderLint;
pub use scriptlint::ScriptLint;

/// Failure of a checker itself, as opposed to a problem in a recipe.
#[derive(Debug, Error)]
pub enum CheckError {
    #[error(transparent)]
    Walk(#[from] WalkError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("failed to prepare input for {tool}: {source}")]
    TempFile {
        tool: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to run {tool}: {source}")]
    Spawn {
        tool: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {tool} output: {message}")]
    ToolOutput { tool: &'static str, message: String },

    #[error("checker panicked: {0}")]
    Panicked(String),
}

/// A linter run over every part of every recipe.
///
/// Checkers only read the parts and report through `sink`; they may run on
/// any thread, concurrently with each other.
pub trait Checker: Send + Sync {
    /// Short name used in logs (e.g. "headerlint", "shellcheck")
    fn name(&self) -> &'static str;

    fn check(
        &self,
        parts: &[RecipePart],
        sink: &mut dyn FnMut(Diagnostic),
    ) -> Result<(), CheckError>;
}

/// Build the enabled checkers, in their fixed order.
pub fn default_checkers(options: &LintOptions) -> Vec<Box<dyn Checker>> {
    let mut checkers: Vec<Box<dyn Checker>> = Vec::new();
    if options.headerlint {
        checkers.push(Box::new(HeaderLint));
    }
    if options.scriptlint {
        checkers.push(Box::new(ScriptLint));
    }
    if options.yamllint {
        checkers.push(Box::new(YamlLint::new(options.yamllint_program.clone())));
    }
    if options.shellcheck {
        checkers.push(Box::new(ShellCheck::new(options.shellcheck_program.clone())));
    }
    checkers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_checkers_respect_options() {
        let names = |options: &LintOptions| -> Vec<&'static str> {
            default_checkers(options).iter().map(|c| c.name()).collect()
        };

        assert_eq!(
            names(&LintOptions::default()),
            vec!["headerlint", "scriptlint", "yamllint", "shellcheck"]
        );
        assert_eq!(
            names(&LintOptions {
                yamllint: false,
                shellcheck: false,
                ..LintOptions::default()
            }),
            vec!["headerlint", "scriptlint"]
        );
    }
}
