/*
 * recipe_schema.rs
 * Copyright (c) 2025 ALICE Software Group
 *
 * Schema of recipe headers and the custom checks it uses.
 */

use crate::part::base_name;
use once_cell::sync::Lazy;
use recipelint_validation::{ObjectSchema, Schema};
use recipelint_yaml::Yaml;
use regex::Regex;

static GIT_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(https?|git)://.*$").expect("valid regex"));
static ENV_VAR_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*$").expect("valid regex"));
static BAD_SUBSTITUTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"%[^%(]|%$").expect("valid regex"));

/// Variables aliBuild substitutes into `version`; all expand to strings.
const VERSION_VARIABLES: &[&str] = &[
    "branch_basename",
    "branch_stream",
    "commit_hash",
    "short_hash",
    "tag",
    "tag_basename",
    "defaults_upper",
    "year",
    "month",
    "day",
    "hour",
];

/// Schema of the header of the recipe named `file_name`.
pub fn recipe_schema(file_name: &str) -> ObjectSchema {
    let basename = base_name(file_name).to_string();
    let package = Schema::string()
        .required()
        .check_with(move |value, errors| package_name_matches(&basename, value, errors));

    ObjectSchema::new()
        .property("package", package)
        .extend(&override_package_schema())
        // At the top level, the version key is required.
        .property(
            "version",
            Schema::string().required().check_with(is_valid_version_string),
        )
        .property("disable", string_list())
        .property(
            "overrides",
            Schema::dict()
                .keys_rules(Schema::string())
                .values_rules(Schema::dict().fields(override_package_schema())),
        )
}

/// Keys that may appear both in a recipe and in another recipe's `overrides`.
pub fn override_package_schema() -> ObjectSchema {
    let requires = Schema::list().items(Schema::string().check_with(is_valid_require));
    let git_url = Schema::string().matching(GIT_URL.clone());

    ObjectSchema::new()
        .property("version", Schema::string().check_with(is_valid_version_string))
        .property("tag", Schema::string())
        .property("source", git_url.clone())
        .property("write_repo", git_url)
        .property("requires", requires.clone())
        .property("build_requires", requires)
        .property("env", environment_schema(false))
        .property("valid_defaults", string_list())
        .property("prepend_path", environment_schema(true))
        .property("append_path", environment_schema(true))
        .property("force_rebuild", Schema::boolean())
        .property("incremental_recipe", Schema::string())
        .property("prefer_system", Schema::string().check_with(is_valid_regex))
        .property("prefer_system_check", Schema::string())
        .property(
            "system_requirement",
            Schema::string()
                .check_with(is_valid_regex)
                .depends_on(["system_requirement_check"]),
        )
        .property(
            "system_requirement_check",
            Schema::string().depends_on(["system_requirement"]),
        )
        .property(
            "system_requirement_missing",
            Schema::string().depends_on(["system_requirement"]),
        )
        .property(
            "relocate_paths",
            Schema::list().items(Schema::string().check_with(is_relative_toplevel_path)),
        )
}

fn string_list() -> Schema {
    Schema::list().items(Schema::string())
}

fn environment_schema(allow_list_values: bool) -> Schema {
    let values = if allow_list_values {
        Schema::any().any_of(vec![Schema::string(), string_list()])
    } else {
        Schema::string()
    };
    Schema::dict()
        .keys_rules(Schema::string().matching(ENV_VAR_NAME.clone()))
        .values_rules(values)
}

fn package_name_matches(basename: &str, value: &Yaml, errors: &mut Vec<String>) {
    let Some(name) = value.as_str() else {
        errors.push("must be a string".to_string());
        return;
    };
    if format!("{}.sh", name.to_lowercase()) != basename {
        errors.push(format!(
            "must match the file name {} case-insensitively, excluding the .sh",
            repr(basename)
        ));
    }
}

fn is_valid_require(value: &Yaml, errors: &mut Vec<String>) {
    let Some(require) = value.as_str() else {
        errors.push("must be a string".to_string());
        return;
    };
    if let Some((_, arch_re)) = require.split_once(':')
        && let Err(reason) = check_regex(arch_re)
    {
        errors.push(format!("invalid architecture regex after colon: {}", reason));
    }
}

fn is_valid_version_string(value: &Yaml, errors: &mut Vec<String>) {
    let Some(version) = value.as_str() else {
        errors.push("must be a string".to_string());
        return;
    };
    for m in BAD_SUBSTITUTION.find_iter(version) {
        errors.push(format!(
            "invalid substitution type {}; use only %(...)s (or use '%%' if you want a literal '%')",
            repr(m.as_str())
        ));
    }
    if let Err(err) = expand_version(version) {
        errors.push(err.to_string());
    }
}

fn is_valid_regex(value: &Yaml, errors: &mut Vec<String>) {
    if let Some(pattern) = value.as_str()
        && let Err(reason) = check_regex(pattern)
    {
        errors.push(format!("invalid regex: {}", reason));
    }
}

fn is_relative_toplevel_path(value: &Yaml, errors: &mut Vec<String>) {
    let Some(path) = value.as_str() else {
        errors.push("must be a string".to_string());
        return;
    };
    if path.starts_with('/') {
        errors.push("expecting a relative path".to_string());
    }
    if path.contains('/') {
        errors.push("expecting a toplevel path (i.e. without slashes)".to_string());
    }
}

/// Why a version template cannot be expanded.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ExpandError {
    UnknownVariable(String),
    NonStringConversion,
    Malformed(String),
}

impl std::fmt::Display for ExpandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExpandError::UnknownVariable(name) => {
                write!(f, "substitution variable {} is invalid", repr(name))
            }
            ExpandError::NonStringConversion => {
                write!(f, "invalid substitution type; use only %(...)s")
            }
            ExpandError::Malformed(reason) => write!(f, "%-format error: {}", reason),
        }
    }
}

/// Dry-run the `%`-template expansion aliBuild applies to `version`.
///
/// Expansion stops at the first problem, the way aliBuild's own expansion
/// fails, so at most one error comes out of here.
fn expand_version(template: &str) -> Result<(), ExpandError> {
    let chars: Vec<char> = template.chars().collect();
    let mut i = 0;
    // Unkeyed conversions consume the single mapping argument.
    let mut mapping_consumed = false;

    while i < chars.len() {
        if chars[i] != '%' {
            i += 1;
            continue;
        }
        i += 1;
        if chars.get(i) == Some(&'%') {
            i += 1;
            continue;
        }

        let keyed = chars.get(i) == Some(&'(');
        if keyed {
            let start = i + 1;
            let mut depth = 1;
            i += 1;
            while i < chars.len() && depth > 0 {
                match chars[i] {
                    '(' => depth += 1,
                    ')' => depth -= 1,
                    _ => {}
                }
                i += 1;
            }
            if depth > 0 {
                return Err(ExpandError::Malformed("incomplete format key".to_string()));
            }
            let name: String = chars[start..i - 1].iter().collect();
            if !VERSION_VARIABLES.contains(&name.as_str()) {
                return Err(ExpandError::UnknownVariable(name));
            }
        } else if mapping_consumed {
            return Err(ExpandError::NonStringConversion);
        } else {
            mapping_consumed = true;
        }

        while i < chars.len() && matches!(chars[i], '-' | '+' | ' ' | '#' | '0') {
            i += 1;
        }
        if chars.get(i) == Some(&'*') {
            return Err(ExpandError::NonStringConversion);
        }
        while i < chars.len() && chars[i].is_ascii_digit() {
            i += 1;
        }
        if chars.get(i) == Some(&'.') {
            i += 1;
            if chars.get(i) == Some(&'*') {
                return Err(ExpandError::NonStringConversion);
            }
            while i < chars.len() && chars[i].is_ascii_digit() {
                i += 1;
            }
        }
        while i < chars.len() && matches!(chars[i], 'h' | 'l' | 'L') {
            i += 1;
        }

        let Some(&conversion) = chars.get(i) else {
            return Err(ExpandError::Malformed("incomplete format".to_string()));
        };
        match conversion {
            's' | 'r' | 'a' | '%' => {}
            'd' | 'i' | 'u' | 'o' | 'x' | 'X' | 'e' | 'E' | 'f' | 'F' | 'g' | 'G' | 'c' => {
                return Err(ExpandError::NonStringConversion);
            }
            other => {
                return Err(ExpandError::Malformed(format!(
                    "unsupported format character {} (0x{:x}) at index {}",
                    repr(&other.to_string()),
                    other as u32,
                    i
                )));
            }
        }
        i += 1;
    }
    Ok(())
}

/// Quote a string for a message, single quotes unless it contains one.
fn repr(text: &str) -> String {
    let quote = if text.contains('\'') && !text.contains('"') {
        '"'
    } else {
        '\''
    };
    let mut out = String::with_capacity(text.len() + 2);
    out.push(quote);
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

/// Check that aliBuild can compile `pattern`, returning a one-line reason if not.
///
/// aliBuild's regex dialect has look-around and backreferences, which the
/// `regex` crate rejects; patterns failing only for those are accepted.
fn check_regex(pattern: &str) -> Result<(), String> {
    let Err(err) = Regex::new(pattern) else {
        return Ok(());
    };
    let text = err.to_string();
    let reason = text
        .lines()
        .find_map(|line| line.trim().strip_prefix("error: "))
        .map(str::to_string)
        .unwrap_or_else(|| text.split_whitespace().collect::<Vec<_>>().join(" "));
    if reason.contains("look-around") || reason.contains("backreferences") {
        Ok(())
    } else {
        Err(reason)
    }
}
