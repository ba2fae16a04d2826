//! Programmatic composition of renderable fragments
//!
//! Besides template text, output can be assembled in code: literal parts are
//! interleaved with fragments, and every fragment renders against the same
//! context.
//!
//! ```rust
//! use serde_json::json;
//! use tpl::compose::{compose, print};
//! use tpl::Engine;
//!
//! let engine = Engine::new();
//! let item = engine.compile_str("<${name}>").unwrap();
//! let page = compose()
//!     .text("items: ")
//!     .slot(vec![item.clone(), item])
//!     .text(" by ")
//!     .slot(print(|ctx| ctx["author"].as_str().unwrap_or("nobody").into()));
//!
//! let out = page.render(&engine, &json!({ "name": "x", "author": "Jam" })).unwrap();
//! assert_eq!(out, "items: <x><x> by Jam");
//! ```

use std::fmt;
use std::rc::Rc;

use serde_json::Value;

use crate::compiler::Template;
use crate::error::Error;
use crate::template::Engine;

/// Anything that produces text from a context
///
/// The engine is passed through so compiled templates can resolve includes.
pub trait Render {
    fn render(&self, engine: &Engine, context: &Value) -> Result<String, Error>;
}

impl Render for Template {
    fn render(&self, engine: &Engine, context: &Value) -> Result<String, Error> {
        Template::render(self, engine, context)
    }
}

impl<T: Render + ?Sized> Render for &T {
    fn render(&self, engine: &Engine, context: &Value) -> Result<String, Error> {
        (**self).render(engine, context)
    }
}

impl<T: Render + ?Sized> Render for Rc<T> {
    fn render(&self, engine: &Engine, context: &Value) -> Result<String, Error> {
        (**self).render(engine, context)
    }
}

impl<T: Render + ?Sized> Render for Box<T> {
    fn render(&self, engine: &Engine, context: &Value) -> Result<String, Error> {
        (**self).render(engine, context)
    }
}

/// A list of fragments renders each one in order and concatenates
impl<T: Render> Render for [T] {
    fn render(&self, engine: &Engine, context: &Value) -> Result<String, Error> {
        let mut out = String::new();
        for item in self {
            out.push_str(&item.render(engine, context)?);
        }
        Ok(out)
    }
}

impl<T: Render> Render for Vec<T> {
    fn render(&self, engine: &Engine, context: &Value) -> Result<String, Error> {
        self.as_slice().render(engine, context)
    }
}

enum Part {
    Text(String),
    Slot(Box<dyn Render>),
}

/// Literal parts interleaved with fragments, built with [`compose`]
#[derive(Default)]
pub struct Composed {
    parts: Vec<Part>,
}

/// Start an empty composition
pub fn compose() -> Composed {
    Composed::default()
}

impl Composed {
    /// Append literal text
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.parts.push(Part::Text(text.into()));
        self
    }

    /// Append a fragment rendered against the composition's context
    pub fn slot(mut self, fragment: impl Render + 'static) -> Self {
        self.parts.push(Part::Slot(Box::new(fragment)));
        self
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn render(&self, engine: &Engine, context: &Value) -> Result<String, Error> {
        let mut out = String::new();
        for part in &self.parts {
            match part {
                Part::Text(text) => out.push_str(text),
                Part::Slot(fragment) => out.push_str(&fragment.render(engine, context)?),
            }
        }
        Ok(out)
    }
}

impl Render for Composed {
    fn render(&self, engine: &Engine, context: &Value) -> Result<String, Error> {
        Composed::render(self, engine, context)
    }
}

impl fmt::Debug for Composed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        for part in &self.parts {
            match part {
                Part::Text(text) => list.entry(text),
                Part::Slot(_) => list.entry(&format_args!("<slot>")),
            };
        }
        list.finish()
    }
}

/// Result of a [`print`] resolver
pub enum Printed {
    Text(String),
    /// Fragment rendered against the same context
    Nested(Box<dyn Render>),
}

impl Printed {
    pub fn nested(fragment: impl Render + 'static) -> Self {
        Printed::Nested(Box::new(fragment))
    }
}

impl From<String> for Printed {
    fn from(text: String) -> Self {
        Printed::Text(text)
    }
}

impl From<&str> for Printed {
    fn from(text: &str) -> Self {
        Printed::Text(text.to_string())
    }
}

/// Fragment computed from the context when rendered
pub struct Print<F> {
    resolve: F,
}

/// Build a fragment from a resolver returning text or a nested fragment
pub fn print<F>(resolve: F) -> Print<F>
where
    F: Fn(&Value) -> Printed,
{
    Print { resolve }
}

impl<F> Render for Print<F>
where
    F: Fn(&Value) -> Printed,
{
    fn render(&self, engine: &Engine, context: &Value) -> Result<String, Error> {
        match (self.resolve)(context) {
            Printed::Text(text) => Ok(text),
            Printed::Nested(fragment) => fragment.render(engine, context),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RenderError;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn name_of(ctx: &Value) -> Printed {
        ctx["name"].as_str().unwrap_or_default().into()
    }

    #[test]
    fn test_literal_parts_and_slots() {
        let engine = Engine::new();
        let greeting = engine.compile_str("hi ${name}").expect("Should compile");
        let page = compose().text("[").slot(greeting).text("]");
        assert_eq!(page.len(), 3);
        assert_eq!(page.render(&engine, &json!({"name": "Jam"})).unwrap(), "[hi Jam]");
    }

    #[test]
    fn test_list_slot_is_concatenated() {
        let engine = Engine::new();
        let items = vec![print(name_of), print(name_of), print(name_of)];
        let page = compose().text("a ").slot(items).text(" b");
        assert_eq!(page.render(&engine, &json!({"name": "n"})).unwrap(), "a nnn b");
    }

    #[test]
    fn test_empty_list_slot() {
        let engine = Engine::new();
        let page = compose().text("x").slot(Vec::<Template>::new()).text("y");
        assert_eq!(page.render(&engine, &json!({})).unwrap(), "xy");
    }

    #[test]
    fn test_print_text_and_nested() {
        let engine = Engine::new();
        let fragment = print(|ctx| {
            if ctx["fancy"].as_bool().unwrap_or(false) {
                Printed::nested(compose().text("*").slot(print(name_of)).text("*"))
            } else {
                name_of(ctx)
            }
        });

        assert_eq!(
            fragment.render(&engine, &json!({"name": "Dog", "fancy": true})).unwrap(),
            "*Dog*"
        );
        assert_eq!(
            fragment.render(&engine, &json!({"name": "Dog"})).unwrap(),
            "Dog"
        );
    }

    #[test]
    fn test_nested_composition_shares_context() {
        let mut engine = Engine::new();
        engine.set("logo.txt", "LOGO");
        let header = engine
            .compile_str("[${title} ${include logo.txt}]")
            .expect("Should compile");
        let body = engine.compile_str("${desc}").expect("Should compile");

        let page = compose().slot(compose().slot(header).text("-")).slot(body);
        let out = page
            .render(&engine, &json!({"title": "Dog", "desc": "dog site"}))
            .unwrap();
        assert_eq!(out, "[Dog LOGO]-dog site");
    }

    #[test]
    fn test_fragment_error_aborts_composition() {
        let engine = Engine::new();
        let broken = engine.compile_str("${missing}").expect("Should compile");
        let page = compose().text("before").slot(broken);
        assert_eq!(
            page.render(&engine, &json!({})),
            Err(Error::Render(RenderError::UndefinedVariable {
                name: "missing".to_string()
            }))
        );
    }

    #[test]
    fn test_shared_template_slot() {
        let engine = Engine::new();
        let item = Rc::new(engine.compile_str("(${name})").expect("Should compile"));
        let page = compose().slot(Rc::clone(&item)).slot(item);
        assert_eq!(page.render(&engine, &json!({"name": "a"})).unwrap(), "(a)(a)");
    }
}
