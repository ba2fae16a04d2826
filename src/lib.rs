//! tpl - a text-templating compiler
//!
//! Templates are literal text interleaved with `${ ... }` directives. A
//! template is tokenized, turned into an instruction tree once, cached by
//! name, and then rendered against any number of JSON contexts.
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//!
//! let out = tpl::render(
//!     "${if age >= 18}adult${else}minor${endif}: ${name}",
//!     &json!({ "name": "Jam", "age": 18 }),
//! )
//! .unwrap();
//! assert_eq!(out, "adult: Jam");
//! ```

pub mod compiler;
pub mod compose;
pub mod config;
pub mod error;
pub mod eval;
pub mod expr;
pub mod syntax;
pub mod template;

pub use compiler::Template;
pub use compose::{compose, print, Composed, Printed, Render};
pub use config::{ConfigError, EngineConfig, UndefinedBehavior};
pub use error::{CompileError, Error, ExpressionError, IncludeError, IterationError, RenderError};
pub use template::{Engine, Registry};

use serde_json::Value;

/// Compile and render ad-hoc template text with a default engine
///
/// Includes cannot resolve here since the engine has an empty registry; use
/// [`Engine`] for named templates.
pub fn render(source: &str, context: &Value) -> Result<String, Error> {
    Engine::new().render_str(source, context)
}
