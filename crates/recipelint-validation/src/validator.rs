// YAML validation engine

use crate::error::{Combinator, ErrorKey, ErrorTree, KeyedErrors};
use crate::schema::{ObjectSchema, Schema, ValueType};
use yaml_rust2::Yaml;
use yaml_rust2::yaml::Hash;

/// Validates a mapping document against an object schema.
///
/// Every violation is collected; nothing short-circuits except that a value
/// with the wrong type is not checked any further. Returns `None` if the
/// document is valid, otherwise a [`ErrorTree::Map`] keyed by field.
pub fn validate(document: &Yaml, schema: &ObjectSchema) -> Option<ErrorTree> {
    let errors = match document {
        Yaml::Hash(hash) => validate_object(hash, schema),
        _ => {
            return Some(ErrorTree::List(vec![ErrorTree::message(format!(
                "must be of {} type",
                ValueType::Dict
            ))]));
        }
    };

    if errors.is_empty() {
        None
    } else {
        Some(errors.into_tree())
    }
}

fn validate_object(hash: &Hash, schema: &ObjectSchema) -> KeyedErrors {
    let mut errors = KeyedErrors::default();

    for (key, value) in hash {
        let field_schema = key.as_str().and_then(|name| schema.get(name));
        match field_schema {
            Some(field_schema) => {
                let field_errors = validate_value(value, field_schema, Some(hash));
                errors.extend(ErrorKey::Field(key.clone()), field_errors);
            }
            None if !schema.allow_unknown => {
                errors.add(ErrorKey::Field(key.clone()), ErrorTree::message("unknown field"));
            }
            None => {}
        }
    }

    for (name, field_schema) in &schema.properties {
        if field_schema.required && !hash.contains_key(&Yaml::String(name.clone())) {
            errors.add(ErrorKey::field(name), ErrorTree::message("required field"));
        }
    }

    errors
}

/// Validate one value, returning the errors about it.
///
/// `siblings` is the mapping the value belongs to, used for dependencies.
fn validate_value(value: &Yaml, schema: &Schema, siblings: Option<&Hash>) -> Vec<ErrorTree> {
    let mut errors = Vec::new();

    if value.is_null() {
        if !schema.nullable {
            errors.push(ErrorTree::message("null value not allowed"));
        }
        return errors;
    }

    if let Some(siblings) = siblings {
        for dependency in &schema.dependencies {
            if !siblings.contains_key(&Yaml::String(dependency.clone())) {
                errors.push(ErrorTree::message(format!(
                    "field '{}' is required",
                    dependency
                )));
            }
        }
    }

    if let Some(value_type) = schema.value_type
        && !value_type.matches(value)
    {
        errors.push(ErrorTree::message(format!("must be of {} type", value_type)));
        return errors;
    }

    if let (Some(regex), Some(text)) = (&schema.regex, value.as_str())
        && !regex.is_match(text)
    {
        errors.push(ErrorTree::message(format!(
            "value does not match regex '{}'",
            regex.as_str()
        )));
    }

    if !schema.any_of.is_empty() {
        validate_any_of(value, &schema.any_of, &mut errors);
    }

    if let (Some(items_schema), Yaml::Array(items)) = (&schema.items, value) {
        let mut item_errors = KeyedErrors::default();
        for (index, item) in items.iter().enumerate() {
            item_errors.extend(ErrorKey::Index(index), validate_value(item, items_schema, None));
        }
        if !item_errors.is_empty() {
            errors.push(item_errors.into_tree());
        }
    }

    if let Yaml::Hash(hash) = value {
        validate_mapping_rules(hash, schema, &mut errors);
    }

    if let Some(check) = &schema.check_with {
        let mut messages = Vec::new();
        check(value, &mut messages);
        errors.extend(messages.into_iter().map(ErrorTree::Message));
    }

    errors
}

fn validate_mapping_rules(hash: &Hash, schema: &Schema, errors: &mut Vec<ErrorTree>) {
    if let Some(fields) = &schema.fields {
        let field_errors = validate_object(hash, fields);
        if !field_errors.is_empty() {
            errors.push(field_errors.into_tree());
        }
    }

    if let Some(keys_schema) = &schema.keys_rules {
        let mut key_errors = KeyedErrors::default();
        for key in hash.keys() {
            key_errors.extend(ErrorKey::Field(key.clone()), validate_value(key, keys_schema, None));
        }
        if !key_errors.is_empty() {
            errors.push(key_errors.into_tree());
        }
    }

    if let Some(values_schema) = &schema.values_rules {
        let mut value_errors = KeyedErrors::default();
        for (key, value) in hash {
            value_errors.extend(
                ErrorKey::Field(key.clone()),
                validate_value(value, values_schema, None),
            );
        }
        if !value_errors.is_empty() {
            errors.push(value_errors.into_tree());
        }
    }
}

/// Validate anyOf (at least one schema must match)
///
/// When every branch fails, the errors of each branch are kept under a
/// synthetic `anyof definition N` key.
fn validate_any_of(value: &Yaml, schemas: &[Schema], errors: &mut Vec<ErrorTree>) {
    let mut branches = Vec::with_capacity(schemas.len());
    for (definition, schema) in schemas.iter().enumerate() {
        let branch_errors = validate_value(value, schema, None);
        if branch_errors.is_empty() {
            return;
        }
        branches.push((
            ErrorKey::Combinator {
                kind: Combinator::AnyOf,
                definition,
            },
            ErrorTree::List(branch_errors),
        ));
    }

    errors.push(ErrorTree::message("no definitions validate"));
    errors.push(ErrorTree::Map(branches));
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;
    use yaml_rust2::YamlLoader;

    fn load(text: &str) -> Yaml {
        YamlLoader::load_from_str(text).unwrap().remove(0)
    }

    fn field<'a>(tree: &'a ErrorTree, name: &str) -> Option<&'a ErrorTree> {
        match tree {
            ErrorTree::Map(entries) => entries
                .iter()
                .find_map(|(k, v)| (*k == ErrorKey::field(name)).then_some(v)),
            _ => None,
        }
    }

    #[test]
    fn test_valid_document() {
        let schema = ObjectSchema::new().property("package", Schema::string().required());
        assert_eq!(validate(&load("package: zlib"), &schema), None);
    }

    #[test]
    fn test_required_and_unknown_fields() {
        let schema = ObjectSchema::new()
            .property("package", Schema::string().required())
            .property("version", Schema::string().required());
        let tree = validate(&load("package: zlib\nbogus: 1\n"), &schema).unwrap();

        assert_eq!(
            field(&tree, "bogus"),
            Some(&ErrorTree::List(vec![ErrorTree::message("unknown field")]))
        );
        assert_eq!(
            field(&tree, "version"),
            Some(&ErrorTree::List(vec![ErrorTree::message("required field")]))
        );
        assert_eq!(tree.count(), 2);
    }

    #[test]
    fn test_type_mismatch_stops_further_checks() {
        let schema = ObjectSchema::new().property(
            "version",
            Schema::string().check_with(|_, messages| messages.push("unreachable".into())),
        );
        let tree = validate(&load("version: 1.0"), &schema).unwrap();
        assert_eq!(
            field(&tree, "version"),
            Some(&ErrorTree::List(vec![ErrorTree::message("must be of string type")]))
        );
    }

    #[test]
    fn test_list_item_errors_are_keyed_by_index() {
        let schema = ObjectSchema::new().property("requires", Schema::list().items(Schema::string()));
        let tree = validate(&load("requires:\n  - zlib\n  - 3\n"), &schema).unwrap();
        assert_eq!(
            field(&tree, "requires"),
            Some(&ErrorTree::List(vec![ErrorTree::Map(vec![(
                ErrorKey::Index(1),
                ErrorTree::List(vec![ErrorTree::message("must be of string type")])
            )])]))
        );
    }

    #[test]
    fn test_keys_and_values_rules() {
        let schema = ObjectSchema::new().property(
            "env",
            Schema::dict()
                .keys_rules(Schema::string().matching(Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*$").unwrap()))
                .values_rules(Schema::string()),
        );
        let tree = validate(&load("env:\n  GOOD: x\n  1BAD: y\n  OTHER: [1]\n"), &schema).unwrap();
        assert_eq!(tree.count(), 2);
    }

    #[test]
    fn test_any_of_reports_every_branch() {
        let schema = ObjectSchema::new().property(
            "path",
            Schema::any().any_of(vec![Schema::string(), Schema::list().items(Schema::string())]),
        );
        assert_eq!(validate(&load("path: [a, b]"), &schema), None);

        let tree = validate(&load("path: true"), &schema).unwrap();
        match field(&tree, "path") {
            Some(ErrorTree::List(items)) => {
                assert_eq!(items[0], ErrorTree::message("no definitions validate"));
                match &items[1] {
                    ErrorTree::Map(branches) => {
                        assert_eq!(branches.len(), 2);
                        assert_eq!(branches[1].0.to_string(), "anyof definition 1");
                    }
                    other => panic!("expected branches, got {:?}", other),
                }
            }
            other => panic!("expected a list, got {:?}", other),
        }
    }

    #[test]
    fn test_dependencies() {
        let schema = ObjectSchema::new()
            .property("system_requirement", Schema::string().depends_on(["system_requirement_check"]))
            .property("system_requirement_check", Schema::string());
        let tree = validate(&load("system_requirement: .*"), &schema).unwrap();
        assert_eq!(
            field(&tree, "system_requirement"),
            Some(&ErrorTree::List(vec![ErrorTree::message(
                "field 'system_requirement_check' is required"
            )]))
        );
    }

    #[test]
    fn test_null_values() {
        let schema = ObjectSchema::new()
            .property("tag", Schema::string())
            .property("note", Schema::string().nullable());
        let tree = validate(&load("tag:\nnote:\n"), &schema).unwrap();
        assert_eq!(tree.count(), 1);
        assert!(field(&tree, "tag").is_some());
    }

    #[test]
    fn test_nested_fields() {
        let override_schema = ObjectSchema::new().property("version", Schema::string());
        let schema = ObjectSchema::new().property(
            "overrides",
            Schema::dict().values_rules(Schema::dict().fields(override_schema)),
        );
        let tree = validate(&load("overrides:\n  ROOT:\n    version: 6\n    foo: x\n"), &schema).unwrap();
        assert_eq!(tree.count(), 2);
    }
}
