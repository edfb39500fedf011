/*
 * scriptlint.rs
 * Copyright (c) 2025 ALICE Software Group
 *
 * aliBuild-specific checks on build scripts.
 */

use super::{CheckError, Checker};
use crate::lines::split_lines;
use crate::part::{RecipePart, ScriptPart, is_defaults_recipe};
use once_cell::sync::Lazy;
use recipelint_error_reporting::{Diagnostic, Level};
use regex::bytes::Regex;
use std::collections::BTreeSet;

static MODULE_PATH_VAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$::").expect("valid regex"));
static DYLD_LIBRARY_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bDYLD_LIBRARY_PATH\b").expect("valid regex"));
static UNSET_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*unset\s+$").expect("valid regex"));
static MASKED_MKDIR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^#]*mkdir\s+.*etc/modulefiles\s*&&\s*rsync\s+.*etc/modulefiles")
        .expect("valid regex")
});

const SHEBANG: &[u8] = b"#!/bin/bash -e\n";

/// Line-oriented checks of the main recipe and embedded scripts.
pub struct ScriptLint;

impl Checker for ScriptLint {
    fn name(&self) -> &'static str {
        "scriptlint"
    }

    fn check(
        &self,
        parts: &[RecipePart],
        sink: &mut dyn FnMut(Diagnostic),
    ) -> Result<(), CheckError> {
        for script in parts.iter().filter_map(RecipePart::as_script) {
            for diagnostic in lint_script(script) {
                sink(diagnostic);
            }
        }
        Ok(())
    }
}

pub fn lint_script(script: &ScriptPart) -> Vec<Diagnostic> {
    let make_error = |message: &str, code: &str, rel_line: usize, rel_column: usize, level| {
        Diagnostic::new(
            level,
            format!("{} [ali:{}]", message, code),
            script.file_name.clone(),
            1 + rel_line + script.line_offset,
            1 + rel_column + script.column_offset,
        )
    };
    let content = script.content.as_slice();
    let is_defaults = is_defaults_recipe(&script.file_name);
    let mut diagnostics = Vec::new();

    // Some packages don't need a Modulefile, hence only a note.
    let modulefile_required = script.is_main() && !script.is_system_requirement && !is_defaults;
    if modulefile_required
        && !contains(content, b"#%Module")
        && !contains(content, b"alibuild-generate-module")
    {
        let key_name = script.key_name.as_deref().unwrap_or("main recipe");
        diagnostics.push(make_error(
            &format!(
                "{} should create a Modulefile; use alibuild-generate-module or add a \"#%Module1.0\" comment to your manually-created Modulefile",
                key_name
            ),
            "missing-modulefile",
            0,
            0,
            Level::Info,
        ));
    }

    let has_shebang = content.starts_with(b"#!");
    let wants_shebang = matches!(script.key_name.as_deref(), None | Some("incremental_recipe"));
    if !is_defaults
        && !script.is_system_requirement
        && (wants_shebang || has_shebang)
        && !content.starts_with(SHEBANG)
    {
        diagnostics.push(make_error(
            &format!(
                "{} script shebang. Use exactly \"#!/bin/bash -e\" to match aliBuild environment. You may see spurious errors until you fix the shebang.",
                if has_shebang { "Invalid" } else { "Missing" }
            ),
            "bad-shebang",
            0,
            0,
            Level::Info,
        ));
    }

    for (lineno, line) in split_lines(content).into_iter().enumerate() {
        // Modules 4 does not allow colons in prepend-path, except in "$::env(FOO)".
        if let Some(start) = find(line, b"prepend-path") {
            let tail = &line[start..];
            let allowed: BTreeSet<usize> = MODULE_PATH_VAR
                .find_iter(tail)
                .flat_map(|m| [m.start() + 1, m.start() + 2])
                .collect();
            for (pos, _) in tail.iter().enumerate().filter(|(_, b)| **b == b':') {
                if !allowed.contains(&pos) {
                    diagnostics.push(make_error(
                        "Modules 4 does not allow colons in prepend-path",
                        "colons-prepend-path",
                        lineno,
                        start + pos,
                        Level::Error,
                    ));
                }
            }
        }

        // macOS drops DYLD_LIBRARY_PATH for child processes.
        for m in DYLD_LIBRARY_PATH.find_iter(line) {
            if UNSET_PREFIX.is_match(&line[..m.start()]) {
                continue;
            }
            diagnostics.push(make_error(
                "DYLD_LIBRARY_PATH is ignored on recent MacOS versions",
                "dyld-library-path",
                lineno,
                m.start(),
                Level::Info,
            ));
        }

        if MASKED_MKDIR.is_match(line) {
            diagnostics.push(make_error(
                "\"mkdir && rsync\" ignores errors if \"mkdir\" fails; prefer writing the commands on separate lines",
                "masked-exitcode",
                lineno,
                find(line, b"&&").unwrap_or_default(),
                Level::Info,
            ));
        }
    }

    diagnostics
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    find(haystack, needle).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn main_script(content: &str) -> ScriptPart {
        ScriptPart {
            file_name: "alidist/zlib.sh".to_string(),
            line_offset: 10,
            column_offset: 0,
            content: content.as_bytes().to_vec(),
            key_name: None,
            is_system_requirement: false,
        }
    }

    fn codes(diagnostics: &[Diagnostic]) -> Vec<&str> {
        diagnostics
            .iter()
            .filter_map(|d| d.message.rsplit_once(" [ali:").map(|(_, code)| code.trim_end_matches(']')))
            .collect()
    }

    const GOOD: &str = "#!/bin/bash -e\nmake install\nalibuild-generate-module > \"$MODULEFILE\"\n";

    #[test]
    fn test_good_main_script() {
        assert!(lint_script(&main_script(GOOD)).is_empty());
    }

    #[test]
    fn test_missing_modulefile_and_shebang() {
        let diagnostics = lint_script(&main_script("make install\n"));
        assert_eq!(codes(&diagnostics), vec!["missing-modulefile", "bad-shebang"]);
        assert!(diagnostics[1].message.starts_with("Missing script shebang."));
        assert!(diagnostics.iter().all(|d| d.level == Level::Info));
        assert_eq!((diagnostics[0].line, diagnostics[0].column), (11, 1));
    }

    #[test]
    fn test_invalid_shebang_in_embedded_script() {
        let mut script = main_script("#!/bin/sh\ntrue\n");
        script.key_name = Some("system_requirement_check".to_string());
        let diagnostics = lint_script(&script);
        assert_eq!(codes(&diagnostics), vec!["bad-shebang"]);
        assert!(diagnostics[0].message.starts_with("Invalid script shebang."));

        // Short checks without a shebang are fine.
        script.content = b"true\n".to_vec();
        assert!(lint_script(&script).is_empty());
    }

    #[test]
    fn test_defaults_and_system_requirements_are_exempt() {
        let mut script = main_script("make install\n");
        script.file_name = "alidist/defaults-release.sh".to_string();
        assert!(lint_script(&script).is_empty());

        let mut script = main_script("make install\n");
        script.is_system_requirement = true;
        assert!(lint_script(&script).is_empty());
    }

    #[test]
    fn test_colons_in_prepend_path() {
        let script = main_script(&format!(
            "{}cat > mod <<EOF\nprepend-path PATH $::env(ROOT)/bin:/usr/bin\nEOF\n",
            GOOD
        ));
        let diagnostics = lint_script(&script);
        assert_eq!(codes(&diagnostics), vec!["colons-prepend-path"]);
        assert!(diagnostics[0].is_error());
        // The colon after "/bin", at byte 34 of the fifth script line.
        assert_eq!((diagnostics[0].line, diagnostics[0].column), (15, 35));
    }

    #[test]
    fn test_dyld_library_path() {
        let script = main_script(&format!(
            "{}unset DYLD_LIBRARY_PATH\nexport DYLD_LIBRARY_PATH=$X\n",
            GOOD
        ));
        let diagnostics = lint_script(&script);
        assert_eq!(codes(&diagnostics), vec!["dyld-library-path"]);
        assert_eq!((diagnostics[0].line, diagnostics[0].column), (15, 8));
    }

    #[test]
    fn test_masked_exit_code() {
        let script = main_script(&format!(
            "{}mkdir -p $INSTALLROOT/etc/modulefiles && rsync -a etc/modulefiles/ $INSTALLROOT/etc/modulefiles\n# mkdir etc/modulefiles && rsync etc/modulefiles\n",
            GOOD
        ));
        let diagnostics = lint_script(&script);
        assert_eq!(codes(&diagnostics), vec!["masked-exitcode"]);
        assert_eq!((diagnostics[0].line, diagnostics[0].column), (14, 39));
    }

    #[test]
    fn test_column_offset_applies() {
        let mut script = main_script("#!/bin/bash -e\nexport DYLD_LIBRARY_PATH=x\n");
        script.key_name = Some("incremental_recipe".to_string());
        script.line_offset = 5;
        script.column_offset = 2;
        let diagnostics = lint_script(&script);
        assert_eq!((diagnostics[0].line, diagnostics[0].column), (7, 10));
    }
}
