//! YAML parser that builds TrackedYaml trees.

use crate::{Error, Position, Result, TrackedMapping, TrackedSequence, TrackedYaml};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use yaml_rust2::Yaml;
use yaml_rust2::parser::{Event, MarkedEventReceiver, Parser, Tag};
use yaml_rust2::scanner::{Marker, TScalarStyle};

/// Parse YAML from a string, producing a TrackedYaml tree.
///
/// This parses a single YAML document. If the input contains multiple documents,
/// only the first one will be parsed.
///
/// # Example
///
/// ```rust
/// use recipelint_yaml::parse;
///
/// let yaml = parse("package: zlib").unwrap();
/// assert!(yaml.as_mapping().is_some());
/// ```
///
/// # Errors
///
/// Returns [`Error::Syntax`] if the YAML is invalid and [`Error::Empty`] if
/// the input holds no document (only whitespace or comments).
pub fn parse(content: &str) -> Result<TrackedYaml> {
    let mut parser = Parser::new_from_str(content);
    let mut builder = TrackedBuilder::default();

    parser
        .load(&mut builder, false) // false = single document only
        .map_err(Error::from)?;

    builder.root.ok_or(Error::Empty)
}

/// Builder that implements MarkedEventReceiver to construct TrackedYaml.
#[derive(Default)]
struct TrackedBuilder {
    /// Stack of collections being constructed
    stack: Vec<BuildNode>,

    /// The completed root node
    root: Option<TrackedYaml>,

    /// Anchored nodes, by yaml-rust2 anchor id
    anchors: HashMap<usize, TrackedYaml>,
}

/// A collection being constructed during parsing.
enum BuildNode {
    Sequence {
        start: Position,
        anchor_id: usize,
        sequence: TrackedSequence,
    },

    Mapping {
        start: Position,
        anchor_id: usize,
        mapping: TrackedMapping,
        /// A key that has been read and is waiting for its value
        pending_key: Option<(Yaml, Position)>,
    },
}

impl TrackedBuilder {
    /// Attach a finished node to its parent, or make it the root.
    ///
    /// `position` is where the node starts in the source.
    fn push_complete(&mut self, node: TrackedYaml, position: Position, anchor_id: usize) {
        if anchor_id > 0 {
            self.anchors.insert(anchor_id, node.clone());
        }

        match self.stack.last_mut() {
            None => self.root = Some(node),
            Some(BuildNode::Sequence { sequence, .. }) => sequence.push(node, position),
            Some(BuildNode::Mapping {
                mapping,
                pending_key,
                ..
            }) => match pending_key.take() {
                Some((key, key_position)) => mapping.insert(key, node, key_position),
                None => {
                    // Keys are reconstructed values, so complex keys work too.
                    *pending_key = Some((crate::Clean::clean(&node), position));
                }
            },
        }
    }
}

impl MarkedEventReceiver for TrackedBuilder {
    fn on_event(&mut self, ev: Event, marker: Marker) {
        match ev {
            Event::Scalar(value, style, anchor_id, tag) => {
                let yaml = resolve_scalar(value, style, tag.as_ref());
                self.push_complete(
                    TrackedYaml::Scalar(yaml),
                    Position::from_marker(&marker),
                    anchor_id,
                );
            }

            Event::SequenceStart(anchor_id, _tag) => {
                self.stack.push(BuildNode::Sequence {
                    start: Position::from_marker(&marker),
                    anchor_id,
                    sequence: TrackedSequence::new(),
                });
            }

            Event::SequenceEnd => {
                if let Some(BuildNode::Sequence {
                    start,
                    anchor_id,
                    sequence,
                }) = self.stack.pop()
                {
                    self.push_complete(TrackedYaml::Sequence(sequence), start, anchor_id);
                }
            }

            Event::MappingStart(anchor_id, _tag) => {
                self.stack.push(BuildNode::Mapping {
                    start: Position::from_marker(&marker),
                    anchor_id,
                    mapping: TrackedMapping::new(),
                    pending_key: None,
                });
            }

            Event::MappingEnd => {
                if let Some(BuildNode::Mapping {
                    start,
                    anchor_id,
                    mapping,
                    ..
                }) = self.stack.pop()
                {
                    self.push_complete(TrackedYaml::Mapping(mapping), start, anchor_id);
                }
            }

            Event::Alias(anchor_id) => {
                let node = self
                    .anchors
                    .get(&anchor_id)
                    .cloned()
                    .unwrap_or(TrackedYaml::Scalar(Yaml::Null));
                self.push_complete(node, Position::from_marker(&marker), 0);
            }

            // Stream and document boundaries carry no content.
            _ => {}
        }
    }
}

static INT_DECIMAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-+]?(0|[1-9][0-9_]*)$").expect("valid regex"));
static INT_HEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-+]?0x[0-9a-fA-F_]+$").expect("valid regex"));
static INT_OCTAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[-+]?0o?[0-7_]+$").expect("valid regex"));
static FLOAT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:[-+]?[0-9][0-9_]*\.[0-9_]*(?:[eE][-+][0-9]+)?|\.[0-9_]+(?:[eE][-+][0-9]+)?|[-+]?\.(?:inf|Inf|INF)|\.(?:nan|NaN|NAN))$",
    )
    .expect("valid regex")
});

/// Turn a scalar event into a typed value.
///
/// Plain scalars are resolved the way the Python tooling that consumes
/// recipes resolves them (YAML 1.1 booleans included, floats need a dot).
/// Quoted scalars and `!!str` scalars are always strings.
fn resolve_scalar(value: String, style: TScalarStyle, tag: Option<&Tag>) -> Yaml {
    if style != TScalarStyle::Plain || tag.is_some_and(|t| t.suffix == "str") {
        return Yaml::String(value);
    }

    match value.as_str() {
        "" | "~" | "null" | "Null" | "NULL" => return Yaml::Null,
        "true" | "True" | "TRUE" | "yes" | "Yes" | "YES" | "on" | "On" | "ON" => {
            return Yaml::Boolean(true);
        }
        "false" | "False" | "FALSE" | "no" | "No" | "NO" | "off" | "Off" | "OFF" => {
            return Yaml::Boolean(false);
        }
        _ => {}
    }

    if let Some(i) = parse_integer(&value) {
        return Yaml::Integer(i);
    }
    if FLOAT.is_match(&value) {
        return Yaml::Real(value);
    }
    Yaml::String(value)
}

fn parse_integer(value: &str) -> Option<i64> {
    let digits: String = value.chars().filter(|c| *c != '_').collect();
    let (negative, unsigned) = match digits.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, digits.strip_prefix('+').unwrap_or(&digits)),
    };

    let magnitude = if INT_DECIMAL.is_match(value) {
        unsigned.parse::<i64>().ok()?
    } else if INT_HEX.is_match(value) {
        i64::from_str_radix(unsigned.strip_prefix("0x")?, 16).ok()?
    } else if INT_OCTAL.is_match(value) {
        let octal = unsigned.strip_prefix("0o").unwrap_or(unsigned);
        i64::from_str_radix(octal, 8).ok()?
    } else {
        return None;
    };

    Some(if negative { -magnitude } else { magnitude })
}
