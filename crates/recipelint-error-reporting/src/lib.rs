//! Diagnostics for recipelint.
//!
//! Every checker, internal or external, reports its findings as
//! [`Diagnostic`] values whose positions always refer to the original recipe
//! file. This crate defines that type and the output dialects
//! ([`OutputFormat`]) used to print it.

pub mod diagnostic;
pub mod format;

pub use diagnostic::{Diagnostic, Level};
pub use format::{GCC_LEVELS, GITHUB_LEVELS, OutputFormat};
