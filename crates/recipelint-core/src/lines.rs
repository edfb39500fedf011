/*
 * lines.rs
 * Copyright (c) 2025 ALICE Software Group
 *
 * Line splitting over raw bytes.
 */

/// Split `bytes` into lines without their terminators.
///
/// `\n`, `\r\n` and a lone `\r` all end a line. A trailing terminator does
/// not start an extra empty line.
pub fn split_lines(bytes: &[u8]) -> Vec<&[u8]> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\n' => {
                lines.push(&bytes[start..i]);
                start = i + 1;
            }
            b'\r' => {
                lines.push(&bytes[start..i]);
                if bytes.get(i + 1) == Some(&b'\n') {
                    i += 1;
                }
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    if start < bytes.len() {
        lines.push(&bytes[start..]);
    }
    lines
}
