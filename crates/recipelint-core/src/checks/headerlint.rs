/*
 * headerlint.rs
 * Copyright (c) 2025 ALICE Software Group
 *
 * Schema and key-order checks for recipe headers.
 */

use super::key_order::check_key_order;
use super::recipe_schema::recipe_schema;
use super::{CheckError, Checker};
use crate::part::{HeaderPart, RecipePart};
use recipelint_error_reporting::Diagnostic;
use recipelint_validation::{ErrorTreeWalker, validate};
use recipelint_yaml::{Clean, TrackedYaml};
use tracing::debug;

/// Validates each parsed header and checks the order of its keys.
pub struct HeaderLint;

impl Checker for HeaderLint {
    fn name(&self) -> &'static str {
        "headerlint"
    }

    fn check(
        &self,
        parts: &[RecipePart],
        sink: &mut dyn FnMut(Diagnostic),
    ) -> Result<(), CheckError> {
        for header in parts.iter().filter_map(RecipePart::as_header) {
            for diagnostic in lint_header(header)? {
                sink(diagnostic);
            }
        }
        Ok(())
    }
}

/// All header diagnostics for one recipe.
///
/// Headers that failed to parse were already reported by the splitter and
/// produce nothing here.
pub fn lint_header(header: &HeaderPart) -> Result<Vec<Diagnostic>, CheckError> {
    let Some(tracked @ TrackedYaml::Mapping(mapping)) = &header.tree else {
        return Ok(Vec::new());
    };
    let mut diagnostics = Vec::new();

    let schema = recipe_schema(&header.file_name);
    if let Some(errors) = validate(&tracked.clean(), &schema) {
        debug!(file = %header.file_name, count = errors.count(), "schema violations");
        diagnostics.extend(
            ErrorTreeWalker::new(tracked, &header.file_name)
                .with_offsets(header.line_offset, header.column_offset)
                .walk(&errors)?,
        );
    }

    diagnostics.extend(check_key_order(
        mapping,
        &header.file_name,
        header.line_offset,
        header.column_offset,
    ));
    if let Some(overrides) = mapping.get_str("overrides").and_then(TrackedYaml::as_mapping) {
        for (_, declaration) in overrides.iter() {
            if let Some(declaration) = declaration.as_mapping() {
                diagnostics.extend(check_key_order(
                    declaration,
                    &header.file_name,
                    header.line_offset,
                    header.column_offset,
                ));
            }
        }
    }

    Ok(diagnostics)
}
