/*
 * mod.rs
 * Copyright (c) 2025 ALICE Software Group
 *
 * Checkers backed by external linters.
 *
 * Each part is written to a temporary directory, the tool runs over all the
 * files at once, and its findings are mapped back through the part offsets.
 */

pub mod shellcheck;
pub mod yamllint;

use crate::checks::CheckError;
use crate::part::{RecipePart, base_name};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tempfile::TempDir;
use tracing::{debug, warn};

/// Parts written out for a tool, keyed by the path the tool will report.
pub(crate) struct StagedParts<'a> {
    // Removed on drop, after the tool has finished.
    _dir: TempDir,
    pub paths: Vec<PathBuf>,
    pub parts: HashMap<String, &'a RecipePart>,
}

impl<'a> StagedParts<'a> {
    /// Write `(part, contents)` pairs to fresh files named after their recipe.
    ///
    /// File names carry the part's index so that recipes with the same base
    /// name in different directories do not collide.
    pub(crate) fn write(
        tool: &'static str,
        entries: impl IntoIterator<Item = (usize, &'a RecipePart, &'a [u8], String)>,
    ) -> Result<Self, CheckError> {
        let temp_error = |source| CheckError::TempFile { tool, source };
        let dir = tempfile::Builder::new()
            .prefix("recipelint")
            .tempdir()
            .map_err(temp_error)?;

        let mut paths = Vec::new();
        let mut parts = HashMap::new();
        for (index, part, contents, suffix) in entries {
            let path = dir
                .path()
                .join(staged_file_name(index, part.file_name(), &suffix));
            std::fs::write(&path, contents).map_err(temp_error)?;
            parts.insert(path.to_string_lossy().into_owned(), part);
            paths.push(path);
        }

        Ok(Self {
            _dir: dir,
            paths,
            parts,
        })
    }

    pub(crate) fn lookup(&self, tool: &'static str, path: &str) -> Result<&'a RecipePart, CheckError> {
        self.parts.get(path).copied().ok_or_else(|| CheckError::ToolOutput {
            tool,
            message: format!("unexpected file name {:?}", path),
        })
    }
}

/// Name of the staged copy of a part.
///
/// Keys may contain path separators; they are replaced so every part lands
/// directly in the staging directory.
fn staged_file_name(index: usize, file_name: &str, suffix: &str) -> String {
    format!("{:03}-{}{}", index, base_name(file_name), suffix).replace(['/', '\\'], "_")
}

/// Run `program` and capture its standard output.
///
/// Returns `None` if the program is not installed. The exit status is not
/// checked: linters exit non-zero whenever they find something.
pub(crate) fn run_tool(
    tool: &'static str,
    program: &Path,
    args: &[String],
    files: &[PathBuf],
) -> Result<Option<Vec<u8>>, CheckError> {
    debug!(tool, program = %program.display(), files = files.len(), "running external linter");
    let output = Command::new(program)
        .args(args)
        .args(files)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .output();

    match output {
        Ok(output) => Ok(Some(output.stdout)),
        Err(err) if err.kind() == ErrorKind::NotFound => {
            warn!("{} is not installed; skipping", tool);
            Ok(None)
        }
        Err(source) => Err(CheckError::Spawn { tool, source }),
    }
}
