//! Line scanner for Catapillar
//!
//! Converts source text into a stream of line tokens. The scanner never
//! fails: unknown words are the parser's problem, and the only conditions
//! it reports are non-fatal diagnostics.

use super::token::{is_pictograph, LineState, LineToken};
use crate::errors::{Diagnostic, SourceSpan};

/// A line consisting of only this marker toggles block-comment mode
const BLOCK_COMMENT_TOGGLE: &str = "~~";

/// The line scanner for Catapillar source code
pub struct Lexer<'src> {
    /// The source code being lexed
    source: &'src str,
    /// Byte offset of the next unread line
    pos: usize,
    /// Number of physical lines consumed so far
    line: usize,
    in_block_comment: bool,
    /// Line where the open block comment started
    block_comment_start: Option<(usize, SourceSpan)>,
    diagnostics: Vec<Diagnostic>,
}

impl<'src> Lexer<'src> {
    /// Create a new lexer for the given source code
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            pos: 0,
            line: 0,
            in_block_comment: false,
            block_comment_start: None,
            diagnostics: Vec::new(),
        }
    }

    /// Diagnostics collected so far
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    fn warn(&mut self, message: String, line: usize, span: SourceSpan) {
        tracing::warn!(line, "{}", message);
        self.diagnostics.push(Diagnostic::new(message, line, span));
    }

    /// Read the next physical line, without its terminator
    fn next_physical_line(&mut self) -> Option<(&'src str, SourceSpan)> {
        if self.pos >= self.source.len() {
            return None;
        }

        let rest = &self.source[self.pos..];
        let (raw, consumed) = match rest.find('\n') {
            Some(i) => (&rest[..i], i + 1),
            None => (rest, rest.len()),
        };
        let text = raw.strip_suffix('\r').unwrap_or(raw);

        let span = SourceSpan::new(self.pos, self.pos + text.len());
        self.pos += consumed;
        self.line += 1;
        Some((text, span))
    }

    /// Scan the next significant line
    pub fn next_token(&mut self) -> Option<LineToken> {
        loop {
            let Some((text, span)) = self.next_physical_line() else {
                self.finish();
                return None;
            };
            let line = self.line;
            let mut stripped = text.trim();

            if stripped == BLOCK_COMMENT_TOGGLE {
                self.in_block_comment = !self.in_block_comment;
                self.block_comment_start = self.in_block_comment.then_some((line, span));
                continue;
            }

            if self.in_block_comment {
                continue;
            }

            if !stripped.starts_with('#')
                && let Some(hash) = stripped.find('#')
            {
                let offset = span.start + text.find('#').unwrap_or(0);
                self.warn(
                    "inline comments are not supported (ignored)".to_string(),
                    line,
                    SourceSpan::new(offset, span.end),
                );
                stripped = stripped[..hash].trim_end();
            }

            if let Some(token) = scan_line(stripped, line, span) {
                return Some(token);
            }
        }
    }

    /// Report anything left open at end of input
    fn finish(&mut self) {
        if self.in_block_comment
            && let Some((line, span)) = self.block_comment_start.take()
        {
            self.warn(
                format!("unclosed block comment ({})", BLOCK_COMMENT_TOGGLE),
                line,
                span,
            );
        }
    }

    /// Collect all line tokens into a vector, along with the diagnostics
    pub fn tokenize(mut self) -> (Vec<LineToken>, Vec<Diagnostic>) {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token() {
            tokens.push(token);
        }
        (tokens, self.diagnostics)
    }
}

impl<'src> Iterator for Lexer<'src> {
    type Item = LineToken;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

/// Split one comment-free line into a token
fn scan_line(stripped: &str, line: usize, span: SourceSpan) -> Option<LineToken> {
    if stripped.is_empty() || stripped.starts_with('#') {
        return None;
    }

    let mut words = stripped.split_whitespace().peekable();

    let state = match words.peek().and_then(|w| LineState::from_glyph(w)) {
        Some(state) => {
            words.next();
            state
        }
        None => LineState::default(),
    };

    let mut action = words.next()?;

    let mut pictograph = None;
    if is_pictograph(action) {
        pictograph = Some(action.to_string());
        action = words.next()?;
    }

    Some(LineToken {
        action: action.to_string(),
        args: words.map(str::to_string).collect(),
        state,
        pictograph,
        line,
        span,
    })
}
