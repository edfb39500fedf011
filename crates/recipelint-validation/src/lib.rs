//! Schema validation for YAML headers.
//!
//! Validation runs on clean `yaml_rust2::Yaml` values and reports every
//! violation at once, as an [`ErrorTree`] that mirrors the structure of the
//! validated document (field names, list indexes and combinator branches).
//! [`ErrorTreeWalker`] then flattens that tree into positioned diagnostics by
//! resolving each error's path against the tracked tree the document was
//! cleaned from.

pub mod error;
pub mod schema;
pub mod validator;
pub mod walk;

pub use error::{Combinator, ErrorKey, ErrorTree, WalkError};
pub use schema::{CheckWith, ObjectSchema, Schema, ValueType};
pub use validator::validate;
pub use walk::ErrorTreeWalker;
