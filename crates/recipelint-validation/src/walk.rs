//! Flattening of error trees into positioned diagnostics.

use crate::error::{ErrorTree, WalkError};
use recipelint_error_reporting::Diagnostic;
use recipelint_yaml::{ObjectPath, TrackedYaml, resolve};

/// Turns an [`ErrorTree`] into one error [`Diagnostic`] per leaf message.
///
/// Positions are resolved against the tracked tree the validated document was
/// cleaned from, then shifted by the offsets of that document in its file.
pub struct ErrorTreeWalker<'a> {
    tracked: &'a TrackedYaml,
    file_name: &'a str,
    line_offset: usize,
    column_offset: usize,
    code: &'a str,
}

impl<'a> ErrorTreeWalker<'a> {
    pub fn new(tracked: &'a TrackedYaml, file_name: &'a str) -> Self {
        Self {
            tracked,
            file_name,
            line_offset: 0,
            column_offset: 0,
            code: "ali:schema",
        }
    }

    pub fn with_offsets(mut self, line_offset: usize, column_offset: usize) -> Self {
        self.line_offset = line_offset;
        self.column_offset = column_offset;
        self
    }

    /// Tag appended to every message, without brackets.
    pub fn with_code(mut self, code: &'a str) -> Self {
        self.code = code;
        self
    }

    pub fn walk(&self, tree: &ErrorTree) -> Result<Vec<Diagnostic>, WalkError> {
        let mut diagnostics = Vec::new();
        self.walk_node(tree, &ObjectPath::new(), &mut diagnostics)?;
        Ok(diagnostics)
    }

    fn walk_node(
        &self,
        tree: &ErrorTree,
        path: &ObjectPath,
        out: &mut Vec<Diagnostic>,
    ) -> Result<(), WalkError> {
        match tree {
            ErrorTree::Map(entries) => {
                for (key, child) in entries {
                    match key.path_segment() {
                        Some(segment) => self.walk_node(child, &path.child(segment), out)?,
                        None => self.walk_node(child, path, out)?,
                    }
                }
            }
            ErrorTree::List(items) => {
                for item in items {
                    self.walk_node(item, path, out)?;
                }
            }
            ErrorTree::Message(message) => {
                let position = resolve(self.tracked, path)?;
                out.push(Diagnostic::error(
                    format!("{}: {} [{}]", path, message, self.code),
                    self.file_name,
                    position.line + self.line_offset,
                    position.column + self.column_offset,
                ));
            }
        }
        Ok(())
    }
}
