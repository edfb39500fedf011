/*
 * split.rs
 * Copyright (c) 2025 ALICE Software Group
 *
 * Splitting recipe files into a YAML header and shell scripts.
 */

use crate::lines::split_lines;
use crate::part::{HeaderPart, RecipePart, ScriptPart};
use recipelint_error_reporting::Diagnostic;
use recipelint_yaml::{
    Error as YamlError, ObjectPath, Position, TrackedMapping, TrackedYaml, Yaml, resolve,
};
use tracing::{debug, error};

const SEPARATOR: &[u8] = b"\n---\n";
const DASHES: &[u8] = b"---";

/// A recipe file taken apart.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitRecipe {
    /// Problems found while splitting, in file order of the checks
    pub errors: Vec<Diagnostic>,
    pub header: HeaderPart,
    /// The main script first, then scripts embedded in the header
    pub scripts: Vec<ScriptPart>,
}

impl SplitRecipe {
    pub fn into_parts(self) -> (Vec<Diagnostic>, Vec<RecipePart>) {
        let mut parts = Vec::with_capacity(1 + self.scripts.len());
        parts.push(RecipePart::Header(self.header));
        parts.extend(self.scripts.into_iter().map(RecipePart::Script));
        (self.errors, parts)
    }
}

/// Split one recipe file.
///
/// The header ends at the first `\n---\n`; the main script is everything
/// after it. Without a separator the header is empty and the whole file is
/// the main script. Splitting never fails: problems become diagnostics and
/// leave the header tree absent.
pub fn split(content: &[u8], file_name: &str) -> SplitRecipe {
    let (header_text, script, script_line_offset) = match find(content, SEPARATOR) {
        Some(newline) => {
            let header_text = &content[..newline + 1];
            let line_offset = count_newlines(header_text) + 1;
            (header_text, &content[newline + SEPARATOR.len()..], line_offset)
        }
        None => (&content[..0], content, 0),
    };
    debug!(
        file = file_name,
        header_bytes = header_text.len(),
        script_bytes = script.len(),
        "split recipe"
    );

    let mut errors = loose_separator_errors(header_text, file_name);

    let tree = match parse_header(header_text) {
        Ok(tree) => Some(tree),
        Err(problem) => {
            errors.push(problem.into_diagnostic(file_name));
            None
        }
    };
    let mapping = tree.as_ref().and_then(TrackedYaml::as_mapping);
    let is_system_requirement = mapping.is_some_and(|m| m.contains_key("system_requirement"));

    let mut scripts = vec![ScriptPart {
        file_name: file_name.to_string(),
        line_offset: script_line_offset,
        column_offset: 0,
        content: script.to_vec(),
        key_name: None,
        is_system_requirement,
    }];

    if let (Some(tree), Some(mapping)) = (tree.as_ref(), mapping) {
        embedded_scripts(tree, mapping, file_name, is_system_requirement, &mut scripts, &mut errors);
    }

    SplitRecipe {
        errors,
        header: HeaderPart {
            file_name: file_name.to_string(),
            line_offset: 0,
            column_offset: 0,
            raw: header_text.to_vec(),
            tree,
        },
        scripts,
    }
}

/// aliBuild cuts recipes at any `---`, not only at a `---` line, so every
/// occurrence inside the header breaks it.
fn loose_separator_errors(header_text: &[u8], file_name: &str) -> Vec<Diagnostic> {
    let mut errors = Vec::new();
    for (lineno, line) in split_lines(header_text).into_iter().enumerate() {
        let mut from = 0;
        while let Some(pos) = find(&line[from..], DASHES).map(|p| p + from) {
            errors.push(
                Diagnostic::error(
                    "found \"---\" in YAML header; this prevents aliBuild from parsing this recipe [ali:parse]",
                    file_name,
                    lineno + 1,
                    pos + 1,
                )
                .with_end(None, Some(pos + 4)),
            );
            from = pos + DASHES.len();
        }
    }
    errors
}

/// Why a header has no tree.
enum HeaderProblem {
    Empty,
    Syntax { message: String, position: Position },
    NotAMapping(&'static str),
}

impl HeaderProblem {
    fn into_diagnostic(self, file_name: &str) -> Diagnostic {
        let default = Position::default();
        match self {
            HeaderProblem::Empty => Diagnostic::error(
                "metadata not found or empty (is the '\\n---\\n' separator present?) [ali:empty]",
                file_name,
                default.line,
                default.column,
            ),
            HeaderProblem::Syntax { message, position } => Diagnostic::error(
                format!("YAML parse error: {} [ali:parse]", message),
                file_name,
                position.line,
                position.column,
            ),
            HeaderProblem::NotAMapping(type_name) => Diagnostic::error(
                format!(
                    "expected YAML header to be a dictionary; got a {} instead [ali:parse]",
                    type_name
                ),
                file_name,
                default.line,
                default.column,
            ),
        }
    }
}

fn parse_header(header_text: &[u8]) -> Result<TrackedYaml, HeaderProblem> {
    if header_text.is_empty() {
        return Err(HeaderProblem::Empty);
    }
    let text = std::str::from_utf8(header_text).map_err(|err| HeaderProblem::Syntax {
        message: format!("header is not valid UTF-8 ({})", err),
        position: Position::default(),
    })?;

    match recipelint_yaml::parse(text) {
        Ok(tree @ TrackedYaml::Mapping(_)) => Ok(tree),
        Ok(other) => Err(HeaderProblem::NotAMapping(other.type_name())),
        // A header made only of comments holds no document at all.
        Err(YamlError::Empty) => Err(HeaderProblem::NotAMapping("NoneType")),
        Err(YamlError::Syntax { message, position }) => {
            Err(HeaderProblem::Syntax { message, position })
        }
    }
}

/// Collect scripts stored under `*_recipe` and `*_check` keys.
///
/// An embedded script's value starts on the line after its key and is
/// indented two columns past it, which sets its offsets.
fn embedded_scripts(
    tree: &TrackedYaml,
    mapping: &TrackedMapping,
    file_name: &str,
    is_system_requirement: bool,
    scripts: &mut Vec<ScriptPart>,
    errors: &mut Vec<Diagnostic>,
) {
    for (key, value) in mapping.iter() {
        let Yaml::String(key_name) = key else {
            continue;
        };
        if !(key_name.ends_with("_recipe") || key_name.ends_with("_check")) {
            continue;
        }
        let position = match resolve(tree, &ObjectPath::from_keys([key_name.as_str()])) {
            Ok(position) => position,
            Err(err) => {
                error!(file = file_name, key = %key_name, error = %err, "cannot locate embedded script");
                continue;
            }
        };
        let line_offset = position.line;
        let column_offset = position.column + 1;

        match value.as_str() {
            Some(text) => scripts.push(ScriptPart {
                file_name: file_name.to_string(),
                line_offset,
                column_offset,
                content: text.as_bytes().to_vec(),
                key_name: Some(key_name.clone()),
                is_system_requirement,
            }),
            None => errors.push(Diagnostic::error(
                format!(
                    "script must be a string, not a {} [ali:script-type]",
                    value.type_name()
                ),
                file_name,
                line_offset,
                column_offset,
            )),
        }
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

fn count_newlines(bytes: &[u8]) -> usize {
    bytes.iter().filter(|&&b| b == b'\n').count()
}
