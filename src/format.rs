//! Source formatter
//!
//! Catapillar does not need indentation, but it reads better with it. The
//! formatter re-indents a source file by its block structure: a line ending
//! in `:` opens a level, a block terminator closes one, and a continuation
//! keyword (`elif`, `else`, `except`, `finally`) closes one and opens the
//! next.

use crate::lexer::keyword;
use crate::lexer::{is_pictograph, ActionWord, LineState};

/// Re-indent `source` using `indent` as one level.
///
/// With an empty `indent` only trailing whitespace is removed. Blank lines
/// stay blank and lines inside `~~` block comments are left untouched.
pub fn format_source(source: &str, indent: &str) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut level = 0usize;
    let mut in_block_comment = false;

    for raw in source.lines() {
        if indent.is_empty() {
            out.push(raw.trim_end().to_string());
            continue;
        }

        let trimmed = raw.trim();
        if trimmed.is_empty() {
            out.push(String::new());
            continue;
        }

        if trimmed == "~~" {
            in_block_comment = !in_block_comment;
            out.push(trimmed.to_string());
            continue;
        }
        if in_block_comment {
            out.push(raw.to_string());
            continue;
        }

        if trimmed.starts_with('#') {
            out.push(indent.repeat(level) + trimmed);
            continue;
        }

        let word = action_word(trimmed);
        if keyword::is_block_end(word) {
            level = level.saturating_sub(1);
            out.push(indent.repeat(level) + trimmed);
            continue;
        }

        let bare = word.strip_suffix(':').unwrap_or(word);
        if ActionWord::parse(bare).is_some_and(ActionWord::continues_block) {
            level = level.saturating_sub(1);
            out.push(indent.repeat(level) + trimmed);
            level += 1;
            continue;
        }

        out.push(indent.repeat(level) + trimmed);
        if trimmed.ends_with(':') {
            level += 1;
        }
    }

    let mut formatted = out.join("\n");
    if source.ends_with('\n') {
        formatted.push('\n');
    }
    tracing::debug!(lines = out.len(), "formatted source");
    formatted
}

/// The action word of a line, past its state glyph and pictograph
fn action_word(trimmed: &str) -> &str {
    let mut words = trimmed.split_whitespace().peekable();
    if words.peek().is_some_and(|w| LineState::from_glyph(w).is_some()) {
        words.next();
    }
    if words.peek().is_some_and(|w| is_pictograph(w)) {
        words.next();
    }
    words.next().unwrap_or("")
}
