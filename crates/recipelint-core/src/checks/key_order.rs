/*
 * key_order.rs
 * Copyright (c) 2025 ALICE Software Group
 *
 * Ordering rules for the most important header keys.
 */

use recipelint_error_reporting::Diagnostic;
use recipelint_yaml::{TrackedMapping, Yaml};

/// A key that must sit at a fixed place at the top of a declaration.
struct Placement {
    key: &'static str,
    message: &'static str,
}

/// A package declaration starts with `package`, `version`, `tag`.
const PACKAGE_ORDER: [Placement; 3] = [
    Placement {
        key: "package",
        message: "package: must be the first key in the file",
    },
    Placement {
        key: "version",
        message: "version: must be the second key in the file (after package)",
    },
    Placement {
        key: "tag",
        message: "tag: must be the third key in the file (after version)",
    },
];

/// An override that sets a version starts with `version`, `tag`.
const OVERRIDE_ORDER: [Placement; 2] = [
    Placement {
        key: "version",
        message: "version: must be the first key in the override declaration",
    },
    Placement {
        key: "tag",
        message: "tag: must be the second key in the override declaration (after version)",
    },
];

const TAG_ONLY_ORDER: [Placement; 1] = [Placement {
    key: "tag",
    message: "tag: must be the first key in the override declaration (as version is not present)",
}];

/// Check key order in a header or in one override declaration.
///
/// Each placement that applies is satisfied only when the declared keys begin
/// with the whole expected prefix up to and including that key, so a key is
/// never accepted at the right index behind a misplaced predecessor.
pub fn check_key_order(
    mapping: &TrackedMapping,
    file_name: &str,
    line_offset: usize,
    column_offset: usize,
) -> Vec<Diagnostic> {
    let keys: Vec<Option<&str>> = mapping.keys().map(Yaml::as_str).collect();
    let index_of = |name: &str| keys.iter().position(|k| *k == Some(name));
    let make_error = |message: &str, key: &str| {
        let position = mapping
            .key_position(&Yaml::String(key.to_string()))
            .unwrap_or_default();
        Diagnostic::warning(
            format!("{} [ali:key-order]", message),
            file_name,
            position.line + line_offset,
            position.column + column_offset,
        )
    };

    let mut diagnostics = Vec::new();

    if let (Some(requires), Some(build_requires)) = (index_of("requires"), index_of("build_requires"))
        && requires > build_requires
    {
        for key in ["requires", "build_requires"] {
            diagnostics.push(make_error("requires must come before build_requires", key));
        }
    }

    let order: &[Placement] = if mapping.contains_key("package") {
        &PACKAGE_ORDER
    } else if mapping.contains_key("version") {
        &OVERRIDE_ORDER
    } else {
        &TAG_ONLY_ORDER
    };

    for (index, placement) in order.iter().enumerate() {
        if !mapping.contains_key(placement.key) {
            continue;
        }
        let in_place = keys.len() > index
            && order[..=index]
                .iter()
                .zip(&keys)
                .all(|(expected, declared)| *declared == Some(expected.key));
        if !in_place {
            diagnostics.push(make_error(placement.message, placement.key));
        }
    }

    diagnostics
}
