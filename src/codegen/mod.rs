//! Code generation for Catapillar
//!
//! Python is the only target. The trait stays as the seam a generator is
//! driven through.

mod options;
mod python;

pub use options::GeneratorOptions;
pub use python::PythonGenerator;

use crate::errors::CatResult;
use crate::parser::Program;

/// Trait for code generators
pub trait CodeGenerator {
    /// Generate code from the parsed program
    fn generate(&mut self, program: &Program) -> CatResult<String>;
}
