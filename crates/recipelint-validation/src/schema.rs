//! Schema definitions
//!
//! A [`Schema`] describes the rules one value must follow; an
//! [`ObjectSchema`] describes the fields of a mapping. Both are plain data
//! built with chained constructors:
//!
//! ```rust
//! use recipelint_validation::{ObjectSchema, Schema};
//!
//! let schema = ObjectSchema::new()
//!     .property("package", Schema::string().required())
//!     .property("requires", Schema::list().items(Schema::string()));
//! assert!(schema.get("requires").is_some());
//! ```

use regex::Regex;
use std::fmt;
use std::sync::Arc;
use yaml_rust2::Yaml;

/// Custom check run on a value that already passed its type rule.
///
/// The callback pushes one message per problem it finds.
pub type CheckWith = Arc<dyn Fn(&Yaml, &mut Vec<String>) + Send + Sync>;

/// Expected type of a value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    String,
    Boolean,
    Integer,
    List,
    Dict,
}

impl ValueType {
    pub fn matches(&self, value: &Yaml) -> bool {
        matches!(
            (self, value),
            (ValueType::String, Yaml::String(_))
                | (ValueType::Boolean, Yaml::Boolean(_))
                | (ValueType::Integer, Yaml::Integer(_))
                | (ValueType::List, Yaml::Array(_))
                | (ValueType::Dict, Yaml::Hash(_))
        )
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ValueType::String => "string",
            ValueType::Boolean => "boolean",
            ValueType::Integer => "integer",
            ValueType::List => "list",
            ValueType::Dict => "dict",
        })
    }
}

/// Rules for a single value.
#[derive(Clone, Default)]
pub struct Schema {
    pub value_type: Option<ValueType>,
    /// The field must be present in its parent mapping
    pub required: bool,
    pub nullable: bool,
    /// Anchored pattern a string value must match
    pub regex: Option<Regex>,
    pub check_with: Option<CheckWith>,
    /// Rules for every item of a list
    pub items: Option<Box<Schema>>,
    /// Rules for the fields of a mapping
    pub fields: Option<ObjectSchema>,
    /// Rules for every key of a mapping
    pub keys_rules: Option<Box<Schema>>,
    /// Rules for every value of a mapping
    pub values_rules: Option<Box<Schema>>,
    /// The value must satisfy at least one of these
    pub any_of: Vec<Schema>,
    /// Sibling fields that must be present alongside this one
    pub dependencies: Vec<String>,
}

impl Schema {
    /// A schema accepting any non-null value.
    pub fn any() -> Self {
        Self::default()
    }

    pub fn of_type(value_type: ValueType) -> Self {
        Self {
            value_type: Some(value_type),
            ..Self::default()
        }
    }

    pub fn string() -> Self {
        Self::of_type(ValueType::String)
    }

    pub fn boolean() -> Self {
        Self::of_type(ValueType::Boolean)
    }

    pub fn list() -> Self {
        Self::of_type(ValueType::List)
    }

    pub fn dict() -> Self {
        Self::of_type(ValueType::Dict)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Require string values to match `regex`, which should be anchored.
    pub fn matching(mut self, regex: Regex) -> Self {
        self.regex = Some(regex);
        self
    }

    pub fn check_with<F>(mut self, check: F) -> Self
    where
        F: Fn(&Yaml, &mut Vec<String>) + Send + Sync + 'static,
    {
        self.check_with = Some(Arc::new(check));
        self
    }

    pub fn items(mut self, schema: Schema) -> Self {
        self.items = Some(Box::new(schema));
        self
    }

    pub fn fields(mut self, schema: ObjectSchema) -> Self {
        self.fields = Some(schema);
        self
    }

    pub fn keys_rules(mut self, schema: Schema) -> Self {
        self.keys_rules = Some(Box::new(schema));
        self
    }

    pub fn values_rules(mut self, schema: Schema) -> Self {
        self.values_rules = Some(Box::new(schema));
        self
    }

    pub fn any_of(mut self, schemas: Vec<Schema>) -> Self {
        self.any_of = schemas;
        self
    }

    pub fn depends_on<'a>(mut self, fields: impl IntoIterator<Item = &'a str>) -> Self {
        self.dependencies = fields.into_iter().map(str::to_string).collect();
        self
    }
}

/// Rules for the fields of a mapping.
///
/// Fields keep their declaration order, which is also the order in which
/// missing required fields are reported.
#[derive(Clone, Default)]
pub struct ObjectSchema {
    pub properties: Vec<(String, Schema)>,
    /// Accept fields that are not declared in `properties`
    pub allow_unknown: bool,
}

impl ObjectSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field, replacing any earlier rules for the same name in place.
    pub fn property(mut self, name: &str, schema: Schema) -> Self {
        match self.properties.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = schema,
            None => self.properties.push((name.to_string(), schema)),
        }
        self
    }

    /// Add every field of `other`, in order.
    pub fn extend(mut self, other: &ObjectSchema) -> Self {
        for (name, schema) in &other.properties {
            self = self.property(name, schema.clone());
        }
        self
    }

    pub fn allow_unknown(mut self) -> Self {
        self.allow_unknown = true;
        self
    }

    pub fn get(&self, name: &str) -> Option<&Schema> {
        self.properties
            .iter()
            .find_map(|(n, s)| if n == name { Some(s) } else { None })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_replaces_in_place() {
        let schema = ObjectSchema::new()
            .property("version", Schema::string())
            .property("tag", Schema::string())
            .property("version", Schema::string().required());

        let names: Vec<&str> = schema.properties.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["version", "tag"]);
        assert!(schema.get("version").is_some_and(|s| s.required));
    }

    #[test]
    fn test_extend_keeps_order() {
        let base = ObjectSchema::new()
            .property("a", Schema::string())
            .property("b", Schema::boolean());
        let schema = ObjectSchema::new().property("z", Schema::any()).extend(&base);

        let names: Vec<&str> = schema.properties.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["z", "a", "b"]);
    }

    #[test]
    fn test_value_type_matches() {
        assert!(ValueType::String.matches(&Yaml::String("x".into())));
        assert!(!ValueType::String.matches(&Yaml::Real("1.0".into())));
        assert!(ValueType::List.matches(&Yaml::Array(vec![])));
    }
}
