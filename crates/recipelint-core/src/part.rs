/*
 * part.rs
 * Copyright (c) 2025 ALICE Software Group
 *
 * Independently checkable pieces of a recipe file.
 */

use recipelint_yaml::TrackedYaml;
use std::path::Path;

/// The YAML header of a recipe.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderPart {
    pub file_name: String,
    pub line_offset: usize,
    pub column_offset: usize,
    /// Header bytes exactly as they appear in the file
    pub raw: Vec<u8>,
    /// Parsed header; `None` if it could not be parsed as a mapping
    pub tree: Option<TrackedYaml>,
}

/// A shell script: the main recipe body, or a script embedded in the header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptPart {
    pub file_name: String,
    pub line_offset: usize,
    pub column_offset: usize,
    pub content: Vec<u8>,
    /// Header key holding the script; `None` for the main recipe body
    pub key_name: Option<String>,
    pub is_system_requirement: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RecipePart {
    Header(HeaderPart),
    Script(ScriptPart),
}

impl RecipePart {
    pub fn file_name(&self) -> &str {
        match self {
            RecipePart::Header(header) => &header.file_name,
            RecipePart::Script(script) => &script.file_name,
        }
    }

    pub fn line_offset(&self) -> usize {
        match self {
            RecipePart::Header(header) => header.line_offset,
            RecipePart::Script(script) => script.line_offset,
        }
    }

    pub fn column_offset(&self) -> usize {
        match self {
            RecipePart::Header(header) => header.column_offset,
            RecipePart::Script(script) => script.column_offset,
        }
    }

    pub fn key_name(&self) -> Option<&str> {
        match self {
            RecipePart::Header(_) => None,
            RecipePart::Script(script) => script.key_name.as_deref(),
        }
    }

    pub fn as_header(&self) -> Option<&HeaderPart> {
        match self {
            RecipePart::Header(header) => Some(header),
            RecipePart::Script(_) => None,
        }
    }

    pub fn as_script(&self) -> Option<&ScriptPart> {
        match self {
            RecipePart::Script(script) => Some(script),
            RecipePart::Header(_) => None,
        }
    }
}

impl ScriptPart {
    /// `true` for the main recipe body.
    pub fn is_main(&self) -> bool {
        self.key_name.is_none()
    }
}

/// Final path component of a recipe's file name.
pub fn base_name(file_name: &str) -> &str {
    Path::new(file_name)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(file_name)
}

/// `defaults-*.sh` files configure builds rather than describe packages.
pub fn is_defaults_recipe(file_name: &str) -> bool {
    base_name(file_name).starts_with("defaults-")
}
