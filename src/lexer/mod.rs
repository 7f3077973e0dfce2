//! Lexer module for Catapillar
//!
//! Line-oriented scanner plus the finer expression tokenizer the parser
//! calls on demand.

mod expr;
pub mod keyword;
mod scanner;
mod token;

pub use expr::{is_colon, tokenize_expression};
pub use keyword::ActionWord;
pub use scanner::Lexer;
pub use token::{is_pictograph, LineState, LineToken};
