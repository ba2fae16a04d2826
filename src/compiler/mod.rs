//! Render compiler: token stream → instruction tree → [`Template`]

mod codegen;
mod procedure;
mod program;

pub use codegen::generate;
pub use procedure::Template;
pub use program::{Arm, Expression, Instruction};

use crate::error::CompileError;
use crate::syntax::tokenize;

/// Tokenize and generate one template source
pub fn compile(name: Option<String>, source: &str) -> Result<Template, CompileError> {
    let tokens = tokenize(source)?;
    let instructions = generate(tokens)?;
    Ok(Template::new(name, instructions))
}
