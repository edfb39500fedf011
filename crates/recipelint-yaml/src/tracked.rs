//! YAML values with source location side-tables.

use crate::Position;
use std::collections::HashMap;
use yaml_rust2::Yaml;
use yaml_rust2::yaml::{Array, Hash};

/// A YAML value annotated with the source positions of keys and items.
///
/// The tree mirrors the parsed structure. Mappings and sequences are
/// dedicated node types that own their position side-tables, so tracking data
/// can never leak into the semantic content returned by [`Clean::clean`].
#[derive(Debug, Clone, PartialEq)]
pub enum TrackedYaml {
    /// A mapping with per-key positions.
    Mapping(TrackedMapping),

    /// A sequence with per-item positions.
    Sequence(TrackedSequence),

    /// A scalar (string, number, boolean or null).
    Scalar(Yaml),
}

/// A mapping node.
///
/// Entries keep their declaration order. Keys are stored as reconstructed
/// values rather than source text, so non-string keys (`1: foo`,
/// `true: bar`) are looked up by value like any other key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackedMapping {
    entries: Vec<(Yaml, TrackedYaml)>,
    key_positions: HashMap<Yaml, Position>,
}

/// A sequence node.
///
/// `item_positions` always has the same length as `items`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackedSequence {
    items: Vec<TrackedYaml>,
    item_positions: Vec<Position>,
}

impl TrackedMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry declared at `position`.
    ///
    /// A repeated key keeps its first declaration slot but takes the new value
    /// and the new position, which is what YAML loaders do for duplicates.
    pub fn insert(&mut self, key: Yaml, value: TrackedYaml, position: Position) {
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.entries.push((key.clone(), value));
        }
        self.key_positions.insert(key, position);
    }

    /// Look up a value by key.
    pub fn get(&self, key: &Yaml) -> Option<&TrackedYaml> {
        self.entries
            .iter()
            .find_map(|(k, v)| if k == key { Some(v) } else { None })
    }

    /// Look up a value by string key.
    pub fn get_str(&self, key: &str) -> Option<&TrackedYaml> {
        self.entries.iter().find_map(|(k, v)| {
            if k.as_str() == Some(key) {
                Some(v)
            } else {
                None
            }
        })
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get_str(key).is_some()
    }

    /// Source position of a key, if the key was declared in this mapping.
    pub fn key_position(&self, key: &Yaml) -> Option<Position> {
        self.key_positions.get(key).copied()
    }

    /// Keys in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &Yaml> {
        self.entries.iter().map(|(k, _)| k)
    }

    /// String keys in declaration order; other keys are skipped.
    pub fn str_keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().filter_map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Yaml, &TrackedYaml)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TrackedSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: TrackedYaml, position: Position) {
        self.items.push(item);
        self.item_positions.push(position);
    }

    pub fn get(&self, index: usize) -> Option<&TrackedYaml> {
        self.items.get(index)
    }

    pub fn items(&self) -> &[TrackedYaml] {
        &self.items
    }

    /// Item positions, parallel to [`TrackedSequence::items`].
    pub fn item_positions(&self) -> &[Position] {
        &self.item_positions
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl TrackedYaml {
    pub fn as_mapping(&self) -> Option<&TrackedMapping> {
        match self {
            TrackedYaml::Mapping(mapping) => Some(mapping),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&TrackedSequence> {
        match self {
            TrackedYaml::Sequence(sequence) => Some(sequence),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&Yaml> {
        match self {
            TrackedYaml::Scalar(yaml) => Some(yaml),
            _ => None,
        }
    }

    /// The string value, if this is a string scalar.
    pub fn as_str(&self) -> Option<&str> {
        self.as_scalar().and_then(Yaml::as_str)
    }

    /// Human-readable name of this node's type, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            TrackedYaml::Mapping(_) => "dict",
            TrackedYaml::Sequence(_) => "list",
            TrackedYaml::Scalar(yaml) => type_name(yaml),
        }
    }
}

/// Human-readable name of a clean YAML value's type.
///
/// The names follow the vocabulary recipe authors see in schema messages
/// (`str`, `int`, `dict`, ...).
pub fn type_name(yaml: &Yaml) -> &'static str {
    match yaml {
        Yaml::String(_) => "str",
        Yaml::Integer(_) => "int",
        Yaml::Real(_) => "float",
        Yaml::Boolean(_) => "bool",
        Yaml::Array(_) => "list",
        Yaml::Hash(_) => "dict",
        Yaml::Null => "NoneType",
        Yaml::Alias(_) | Yaml::BadValue => "unknown",
    }
}

/// Projection of a tree onto its semantic content.
///
/// Implemented both for tracked trees and for already-clean values, so that
/// cleaning is idempotent: `x.clean().clean() == x.clean()`.
pub trait Clean {
    fn clean(&self) -> Yaml;
}

impl Clean for TrackedYaml {
    fn clean(&self) -> Yaml {
        match self {
            TrackedYaml::Mapping(mapping) => {
                let mut hash = Hash::new();
                for (key, value) in mapping.iter() {
                    hash.insert(key.clone(), value.clean());
                }
                Yaml::Hash(hash)
            }
            TrackedYaml::Sequence(sequence) => {
                Yaml::Array(sequence.items.iter().map(Clean::clean).collect::<Array>())
            }
            TrackedYaml::Scalar(yaml) => yaml.clone(),
        }
    }
}

impl Clean for Yaml {
    fn clean(&self) -> Yaml {
        self.clone()
    }
}
