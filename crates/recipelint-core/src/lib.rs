/*
 * lib.rs
 * Copyright (c) 2025 ALICE Software Group
 *
 * Core of recipelint: splitting recipes into checkable parts, the rule
 * checkers, and the orchestrator that runs them concurrently.
 */

//! A recipe is a YAML header, a `---` separator line and a shell script.
//! [`split()`] turns each file into [`RecipePart`]s that remember where they
//! came from; every [`Checker`] reads the parts and reports [`Diagnostic`]s
//! positioned in the original file. [`lint`] ties both together.
//!
//! [`Diagnostic`]: recipelint_error_reporting::Diagnostic

pub mod checks;
pub mod external;
pub mod lines;
pub mod lint;
pub mod options;
pub mod orchestrator;
pub mod part;
pub mod split;

pub use checks::{CheckError, Checker, default_checkers};
pub use lint::{RecipeInput, lint};
pub use options::LintOptions;
pub use orchestrator::{CheckerOutcome, RunReport, run_checkers};
pub use part::{HeaderPart, RecipePart, ScriptPart};
pub use split::{SplitRecipe, split};
