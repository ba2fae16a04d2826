//! Named templates: the source registry and the engine that compiles,
//! caches and includes them
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use tpl::Engine;
//!
//! let mut engine = Engine::new();
//! engine.set("logo.txt", "LOGO");
//! engine.set("header.txt", "[${title} ${include logo.txt}]");
//! engine.set("page.txt", "${include header.txt { title }} ${desc}");
//!
//! let out = engine
//!     .render("page.txt", &json!({ "title": "Dog", "desc": "dog site" }))
//!     .unwrap();
//! assert_eq!(out, "[Dog LOGO] dog site");
//! ```

mod registry;
mod resolver;

pub use registry::Registry;
pub use resolver::Engine;
