//! Catapillar - a keyword-per-line scripting DSL transpiled to Python
//!
//! Source is read one line at a time: an optional state glyph, an optional
//! emoji or kaomoji prefix, an action word (English, Chinese or Japanese
//! spelling) and its arguments. The crate parses that into a [`Program`]
//! and renders it as Python.
//!
//! ```
//! let python = catapillar::transpile("置 x 5\n印 x").unwrap();
//! assert_eq!(python, "x = 5\nprint(x)");
//! ```

pub mod errors;
pub mod lexer;
pub mod parser;
pub mod codegen;
pub mod format;

// Re-export commonly used types
pub use errors::{CatError, CatResult, Diagnostic, SourceSpan};
pub use lexer::{Lexer, LineState, LineToken};
pub use parser::{Parser, Program};
pub use codegen::{CodeGenerator, GeneratorOptions, PythonGenerator};
pub use format::format_source;

/// Output of a successful compilation
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Compiled {
    /// Generated Python source
    pub code: String,
    /// Non-fatal conditions found while lexing
    pub diagnostics: Vec<Diagnostic>,
}

/// Parse source text into a program, discarding diagnostics
pub fn parse_source(source: &str) -> CatResult<Program> {
    Parser::new(source).parse()
}

/// Compile Catapillar source to Python
pub fn compile(source: &str, options: &GeneratorOptions) -> CatResult<Compiled> {
    let (program, diagnostics) = Parser::new(source).parse_with_diagnostics()?;
    let mut generator = PythonGenerator::with_options(options.clone());
    let code = generator.generate(&program)?;
    Ok(Compiled { code, diagnostics })
}

/// Compile with default options and return only the Python text
pub fn transpile(source: &str) -> CatResult<String> {
    compile(source, &GeneratorOptions::default()).map(|compiled| compiled.code)
}
