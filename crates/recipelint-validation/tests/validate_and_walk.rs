//! Validation of parsed documents, mapped back to source positions.

use recipelint_validation::{ErrorTreeWalker, ObjectSchema, Schema, validate};
use recipelint_yaml::{Clean, parse};
use regex::Regex;

fn schema() -> ObjectSchema {
    ObjectSchema::new()
        .property("package", Schema::string().required())
        .property("version", Schema::string().required())
        .property("requires", Schema::list().items(Schema::string()))
        .property(
            "env",
            Schema::dict()
                .keys_rules(Schema::string().matching(Regex::new("^[A-Z_]+$").unwrap()))
                .values_rules(Schema::any().any_of(vec![
                    Schema::string(),
                    Schema::list().items(Schema::string()),
                ])),
        )
}

fn lint(text: &str, line_offset: usize, column_offset: usize) -> Vec<(String, usize, usize)> {
    let tracked = parse(text).unwrap();
    let Some(errors) = validate(&tracked.clean(), &schema()) else {
        return Vec::new();
    };
    ErrorTreeWalker::new(&tracked, "zlib.sh")
        .with_offsets(line_offset, column_offset)
        .walk(&errors)
        .unwrap()
        .into_iter()
        .map(|d| (d.message, d.line, d.column))
        .collect()
}

fn owned(expected: &[(&str, usize, usize)]) -> Vec<(String, usize, usize)> {
    expected
        .iter()
        .map(|(message, line, column)| (message.to_string(), *line, *column))
        .collect()
}

#[test]
fn test_valid_document_has_no_errors() {
    let text = "package: zlib\nversion: v1.3\nrequires:\n  - bz2\nenv:\n  PATH: [a, b]\n  CFLAGS: -O2\n";
    assert_eq!(lint(text, 0, 0), vec![]);
}

#[test]
fn test_every_violation_is_located() {
    let text = "package: zlib\nrequires:\n  - zlib-dev\n  - 3\nenv:\n  lower: x\n  PATH: {a: b}\nextra: 1\n";
    assert_eq!(
        lint(text, 0, 0),
        owned(&[
            ("requires.1: must be of string type [ali:schema]", 4, 5),
            ("env.lower: value does not match regex '^[A-Z_]+$' [ali:schema]", 6, 3),
            ("env.PATH: no definitions validate [ali:schema]", 7, 3),
            ("env.PATH: must be of string type [ali:schema]", 7, 3),
            ("env.PATH: must be of list type [ali:schema]", 7, 3),
            ("extra: unknown field [ali:schema]", 8, 1),
            ("version: required field [ali:schema]", 1, 0),
        ])
    );
}

#[test]
fn test_offsets_shift_every_position() {
    let text = "package: zlib\nversion: 2\n";
    assert_eq!(
        lint(text, 10, 4),
        owned(&[("version: must be of string type [ali:schema]", 12, 5)])
    );
}
