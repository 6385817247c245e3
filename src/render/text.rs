//! Plain text rendering for outlines.

use std::fmt::Write;

use crate::model::DocumentOutline;

/// Render an outline as an indented table of contents.
///
/// ```text
/// Understanding AI
///   Introduction ........ 1
///     What is AI? ....... 2
/// ```
pub fn to_text(outline: &DocumentOutline) -> String {
    let mut output = String::new();
    output.push_str(&outline.title);
    output.push('\n');

    let width = outline
        .outline
        .iter()
        .map(|e| e.level.depth() as usize * 2 + e.text.chars().count())
        .max()
        .unwrap_or(0)
        + 4;

    for entry in &outline.outline {
        let indent = entry.level.depth() as usize * 2;
        let used = indent + entry.text.chars().count();
        let _ = writeln!(
            output,
            "{:indent$}{} {} {}",
            "",
            entry.text,
            ".".repeat(width - used),
            entry.page,
            indent = indent
        );
    }

    output.trim_end().to_string()
}
