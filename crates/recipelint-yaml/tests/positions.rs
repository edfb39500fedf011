//! Position tracking over recipe-shaped documents.

use recipelint_yaml::{Clean, Error, ObjectPath, PathSegment, Position, TrackedYaml, Yaml, parse, resolve};

const HEADER: &str = "package: ROOT
version: \"%(tag_basename)s\"
requires:
  - zlib
  - \"GCC-Toolchain:(?!osx)\"
env:
  ROOTSYS: \"$ROOT_ROOT\"
  flags: {CXX: g++, CC: gcc}
overrides:
  ROOT:
    tag: v6-30-01
incremental_recipe: |
  make -j$JOBS
  make install
";

fn at(path: &ObjectPath) -> Position {
    let tree = parse(HEADER).unwrap();
    resolve(&tree, path).unwrap()
}

#[test]
fn test_every_declared_key_resolves_to_its_line() {
    let tree = parse(HEADER).unwrap();
    let mapping = tree.as_mapping().unwrap();
    let lines: Vec<(&str, usize)> = mapping
        .str_keys()
        .map(|key| (key, resolve(&tree, &ObjectPath::from_keys([key])).unwrap().line))
        .collect();
    assert_eq!(
        lines,
        vec![
            ("package", 1),
            ("version", 2),
            ("requires", 3),
            ("env", 6),
            ("overrides", 9),
            ("incremental_recipe", 12),
        ]
    );
}

#[test]
fn test_nested_positions() {
    assert_eq!(at(&ObjectPath::from_keys(["env", "ROOTSYS"])), Position::new(7, 3));
    assert_eq!(at(&ObjectPath::from_keys(["overrides", "ROOT", "tag"])), Position::new(11, 5));
    assert_eq!(
        at(&ObjectPath::from_keys(["requires"]).child(PathSegment::Index(0))),
        Position::new(5, 5)
    );
}

#[test]
fn test_flow_mapping_keys_are_tracked() {
    assert_eq!(at(&ObjectPath::from_keys(["env", "flags", "CXX"])).line, 8);
    assert_eq!(at(&ObjectPath::from_keys(["env", "flags", "CC"])).line, 8);
}

#[test]
fn test_clean_tree_matches_plain_values() {
    let clean = parse(HEADER).unwrap().clean();
    assert_eq!(clean["package"].as_str(), Some("ROOT"));
    assert_eq!(clean["version"].as_str(), Some("%(tag_basename)s"));
    assert_eq!(clean["requires"][1].as_str(), Some("GCC-Toolchain:(?!osx)"));
    assert_eq!(clean["env"]["flags"]["CC"].as_str(), Some("gcc"));
    assert_eq!(
        clean["incremental_recipe"].as_str(),
        Some("make -j$JOBS\nmake install\n")
    );
    assert_eq!(clean.clean(), clean);
}

#[test]
fn test_aliases_share_the_anchored_value() {
    let clean = parse("base: &base\n  tag: v1\nother: *base\n").unwrap().clean();
    assert_eq!(clean["other"], clean["base"]);
    assert_eq!(clean["other"]["tag"], Yaml::String("v1".to_string()));
}

#[test]
fn test_non_mapping_documents() {
    assert!(matches!(parse("- a\n- b\n").unwrap(), TrackedYaml::Sequence(_)));
    assert!(matches!(parse("just text\n").unwrap(), TrackedYaml::Scalar(_)));
    assert_eq!(parse("# only a comment\n"), Err(Error::Empty));
}

#[test]
fn test_syntax_error_is_located() {
    // The stray colon of the misindented key is at 0-based column 5.
    let err = parse("package: zlib\nversion: v1\n  tag: v1-0\n").unwrap_err();
    assert!(matches!(err, Error::Syntax { .. }));
    assert_eq!(err.position(), Position::new(3, 6));
}
