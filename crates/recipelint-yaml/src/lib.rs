//! # recipelint-yaml
//!
//! YAML parsing with source location tracking.
//!
//! This crate provides [`TrackedYaml`], a YAML tree in which every mapping owns a
//! side-table giving the source [`Position`] of each of its keys, and every
//! sequence owns a parallel list giving the position of each of its items.
//!
//! ## Design
//!
//! Positions live in typed fields of dedicated node types rather than inside
//! the semantic collections. Generic consumers (schema validation, for example)
//! work on the plain `yaml_rust2::Yaml` obtained with [`Clean::clean`], which
//! never carries tracking data.
//!
//! Positions are resolved back from an [`ObjectPath`] with [`resolve`].
//!
//! ## Example
//!
//! ```rust
//! use recipelint_yaml::{parse, resolve, ObjectPath, Position};
//!
//! let yaml = parse("package: zlib\nversion: v1.3\n").unwrap();
//! let position = resolve(&yaml, &ObjectPath::from_keys(["version"])).unwrap();
//! assert_eq!(position, Position::new(2, 1));
//! ```

mod error;
mod parser;
mod position;
mod tracked;

pub use error::{Error, Result};
pub use parser::parse;
pub use position::{ObjectPath, PathSegment, Position, ResolveError, resolve};
pub use tracked::{Clean, TrackedMapping, TrackedSequence, TrackedYaml, type_name};

// Re-exported so downstream crates agree on the clean tree type.
pub use yaml_rust2::Yaml;
