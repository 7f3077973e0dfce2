//! Pretty error reporting using ariadne
//!
//! Provides colorful, user-friendly error messages with source context.
//! Spans are byte ranges, so reports index the source by byte.

use ariadne::{Color, Config, IndexType, Label, Report, ReportKind, Source};
use crate::errors::{CatError, Diagnostic};

fn describe(error: &CatError) -> Option<(String, Option<std::ops::Range<usize>>, &'static str)> {
    match error {
        CatError::Parser { message, span } => {
            Some((message.clone(), Some((*span).into()), "Parser error"))
        }
        CatError::Grouping { span } => Some((
            "parentheses are only for expression grouping".to_string(),
            Some((*span).into()),
            "Parser error",
        )),
        CatError::CodeGen { message, span } => Some((
            message.clone(),
            span.map(Into::into),
            "Code generation error",
        )),
        CatError::Config(_) | CatError::Io(_) => None,
    }
}

fn build_report<'a>(
    kind: ReportKind<'a>,
    title: &str,
    message: &str,
    span: Option<std::ops::Range<usize>>,
    color: Color,
) -> Report<'a, std::ops::Range<usize>> {
    let span_range = span.clone().unwrap_or(0..0);

    let mut report = Report::build(kind, span_range)
        .with_config(Config::default().with_index_type(IndexType::Byte))
        .with_message(title);

    if let Some(s) = span {
        report = report.with_label(Label::new(s).with_message(message).with_color(color));
    }

    report.finish()
}

/// Print an error with source context
pub fn print_error(source: &str, error: &CatError) {
    let Some((message, span, kind)) = describe(error) else {
        eprintln!("{}", error);
        return;
    };

    build_report(ReportKind::Error, kind, &message, span, Color::Red)
        .eprint(Source::from(source))
        .expect("failed to print error report");
}

/// Print every lexer diagnostic as a warning report
pub fn print_diagnostics(source: &str, diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        build_report(
            ReportKind::Warning,
            "Warning",
            &diagnostic.message,
            Some(diagnostic.span.into()),
            Color::Yellow,
        )
        .eprint(Source::from(source))
        .expect("failed to print warning report");
    }
}

/// Format an error as a string (for testing)
pub fn format_error(source: &str, error: &CatError) -> String {
    let Some((message, span, kind)) = describe(error) else {
        return error.to_string();
    };

    let mut output = Vec::new();
    build_report(ReportKind::Error, kind, &message, span, Color::Red)
        .write(Source::from(source), &mut output)
        .expect("failed to write error report");

    String::from_utf8(output).expect("error report should be valid UTF-8")
}

/// Format a lexer diagnostic as a string
pub fn format_diagnostic(source: &str, diagnostic: &Diagnostic) -> String {
    let mut output = Vec::new();
    build_report(
        ReportKind::Warning,
        "Warning",
        &diagnostic.message,
        Some(diagnostic.span.into()),
        Color::Yellow,
    )
    .write(Source::from(source), &mut output)
    .expect("failed to write warning report");

    String::from_utf8(output).expect("warning report should be valid UTF-8")
}
