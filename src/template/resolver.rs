//! Compile cache and include resolution

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde_json::Value;
use tracing::{debug, trace};

use crate::compiler::{self, Template};
use crate::config::EngineConfig;
use crate::error::{CompileError, Error, IncludeError, RenderError};
use crate::eval::{Evaluator, Functions};

use super::registry::Registry;

/// Owns the template registry, the compile cache and the function table
///
/// The engine is single-threaded: the cache lives in a `RefCell` and
/// compiled templates are shared through `Rc`. Hosts that need to share an
/// engine across threads must wrap it in their own synchronization.
#[derive(Debug, Default)]
pub struct Engine {
    registry: Registry,
    cache: RefCell<HashMap<String, Rc<Template>>>,
    functions: Functions,
    config: EngineConfig,
}

impl Engine {
    /// Create an engine with the default configuration and built-in functions
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Insert or overwrite a template source
    ///
    /// A template already in the compile cache keeps rendering its old text
    /// until [`clear_cache`](Self::clear_cache) is called.
    pub fn set(&mut self, name: impl Into<String>, text: impl Into<String>) {
        self.registry.set(name, text);
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.registry.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.registry.remove(name)
    }

    /// Drop every registered source; the compile cache is left alone
    pub fn clear(&mut self) {
        self.registry.clear();
    }

    /// Forget every compiled template
    pub fn clear_cache(&self) {
        debug!("clearing compile cache");
        self.cache.borrow_mut().clear();
    }

    pub fn is_cached(&self, name: &str) -> bool {
        self.cache.borrow().contains_key(name)
    }

    /// Register or replace a function callable from expressions
    pub fn add_function<F>(&mut self, name: impl Into<String>, function: F)
    where
        F: Fn(&[Value]) -> Result<Value, String> + 'static,
    {
        self.functions.insert(name, function);
    }

    /// Compile a registered template, reusing the cached procedure if present
    ///
    /// A cache hit returns the same `Rc` without looking at the registry.
    pub fn compile(&self, name: &str) -> Result<Rc<Template>, CompileError> {
        if let Some(template) = self.cache.borrow().get(name) {
            trace!(name, "compile cache hit");
            return Ok(Rc::clone(template));
        }

        let source = self
            .registry
            .get(name)
            .ok_or_else(|| CompileError::NotFound {
                name: name.to_string(),
            })?;

        debug!(name, "compiling template");
        let template = Rc::new(compiler::compile(Some(name.to_string()), source)?);
        self.cache
            .borrow_mut()
            .insert(name.to_string(), Rc::clone(&template));
        Ok(template)
    }

    /// Compile ad-hoc template text without touching the cache
    pub fn compile_str(&self, source: &str) -> Result<Template, CompileError> {
        compiler::compile(None, source)
    }

    /// Compile (or fetch) and render a registered template
    pub fn render(&self, name: &str, context: &Value) -> Result<String, Error> {
        self.compile(name)?.render(self, context)
    }

    /// Compile and render ad-hoc template text
    pub fn render_str(&self, source: &str, context: &Value) -> Result<String, Error> {
        self.compile_str(source)?.render(self, context)
    }

    /// Render the template named by an `include` directive
    ///
    /// `depth` counts nested includes; the top-level render is depth 0.
    pub(crate) fn resolve_include(
        &self,
        path: &str,
        context: &Value,
        depth: usize,
    ) -> Result<String, Error> {
        if let Some(limit) = self.config.max_include_depth {
            if depth > limit {
                return Err(IncludeError::DepthExceeded {
                    name: path.to_string(),
                    limit,
                }
                .into());
            }
        }

        trace!(path, depth, "resolving include");
        let template = self.compile(path).map_err(|err| match err {
            CompileError::NotFound { name } => IncludeError::NotFound { name },
            source => IncludeError::Compile {
                name: path.to_string(),
                source,
            },
        })?;
        template.render_at(self, context, depth)
    }

    /// Format `error` as a source diagnostic against the registered text
    ///
    /// `template` names the template the failing render started from; compile
    /// errors of that template carry no name of their own. Returns `None` for
    /// errors without a source location.
    pub fn diagnostic(&self, template: &str, error: &Error) -> Option<String> {
        match error {
            Error::Compile(err) => Some(err.format(self.get(template)?, template)),
            Error::Include(IncludeError::Compile { name, source }) => {
                Some(source.format(self.get(name)?, name))
            }
            Error::Render(RenderError::Expression {
                template: Some(name),
                errors,
                ..
            }) => {
                let text = self.get(name)?;
                Some(errors.iter().map(|err| err.format(text, name)).collect())
            }
            _ => None,
        }
    }

    pub(crate) fn evaluator(&self) -> Evaluator<'_> {
        Evaluator::new(&self.functions, self.config.undefined)
    }
}
