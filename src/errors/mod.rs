//! Error handling for Catapillar
//!
//! Provides structured error types with source location tracking
//! for helpful diagnostic messages.

mod diagnostic;

use std::fmt;
use std::ops::Range;
use thiserror::Error;

pub use diagnostic::{
    format_diagnostic, format_error, print_diagnostics, print_error,
};

/// A span in the source code, represented as a byte range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub struct SourceSpan {
    /// Start byte offset (inclusive)
    pub start: usize,
    /// End byte offset (exclusive)
    pub end: usize,
}

impl SourceSpan {
    /// Create a new source span
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

impl From<Range<usize>> for SourceSpan {
    fn from(range: Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }
}

impl From<SourceSpan> for Range<usize> {
    fn from(span: SourceSpan) -> Self {
        span.start..span.end
    }
}

/// The main error type for Catapillar operations
#[derive(Error, Debug)]
pub enum CatError {
    #[error("Parser error: {message}")]
    Parser { message: String, span: SourceSpan },

    /// Parentheses wrapped something other than a binary combination.
    /// Kept apart from `Parser` because it is never swallowed by the
    /// fallback paths that retry a failed expression as plain text.
    #[error(
        "Parser error: parentheses are only for expression grouping (e.g. (a + b) * c); \
         write the name or value without parentheses"
    )]
    Grouping { span: SourceSpan },

    #[error("Code generation error: {message}")]
    CodeGen {
        message: String,
        span: Option<SourceSpan>,
    },

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CatError {
    /// Get the source span associated with this error, if any
    pub fn span(&self) -> Option<SourceSpan> {
        match self {
            CatError::Parser { span, .. } => Some(*span),
            CatError::Grouping { span } => Some(*span),
            CatError::CodeGen { span, .. } => *span,
            CatError::Config(_) | CatError::Io(_) => None,
        }
    }

    /// Create a parser error
    pub fn parser(message: impl Into<String>, span: SourceSpan) -> Self {
        CatError::Parser {
            message: message.into(),
            span,
        }
    }

    /// Create a code generation error
    pub fn codegen(message: impl Into<String>, span: Option<SourceSpan>) -> Self {
        CatError::CodeGen {
            message: message.into(),
            span,
        }
    }

    pub fn is_grouping(&self) -> bool {
        matches!(self, CatError::Grouping { .. })
    }
}

/// Result type alias for Catapillar operations
pub type CatResult<T> = Result<T, CatError>;

/// A non-fatal condition reported while lexing or parsing.
///
/// Diagnostics never stop compilation; the caller decides how (and whether)
/// to show them.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Diagnostic {
    pub message: String,
    /// 1-based source line
    pub line: usize,
    pub span: SourceSpan,
}

impl Diagnostic {
    pub fn new(message: impl Into<String>, line: usize, span: SourceSpan) -> Self {
        Self {
            message: message.into(),
            line,
            span,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [line {}]", self.message, self.line)
    }
}
