//! Parser module for Catapillar
//!
//! A line-dispatching statement parser on top of a recursive descent
//! expression parser.

mod ast;
mod expr;
mod names;
mod parser;

pub use ast::*;
pub use expr::{is_identifier, is_numeric, strip_trailing_colon, try_parse_full, ExprParser};
pub use names::KnownNames;
pub use parser::Parser;
