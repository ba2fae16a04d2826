//! Registry of named template sources

use std::collections::HashMap;

/// Name → source text store
///
/// Overwriting a name does not touch any compiled template cached for it.
#[derive(Debug, Default, Clone)]
pub struct Registry {
    templates: HashMap<String, String>,
}

impl Registry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a template, returning the previous text
    pub fn set(&mut self, name: impl Into<String>, text: impl Into<String>) -> Option<String> {
        self.templates.insert(name.into(), text.into())
    }

    /// Get a template's source text
    pub fn get(&self, name: &str) -> Option<&str> {
        self.templates.get(name).map(|s| s.as_str())
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.templates.remove(name)
    }

    /// Check if a template exists
    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    /// Get all template names
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        self.templates.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_set_and_get() {
        let mut registry = Registry::new();
        assert!(registry.is_empty());

        assert_eq!(registry.set("logo.txt", "LOGO"), None);
        assert!(registry.contains("logo.txt"));
        assert_eq!(registry.get("logo.txt"), Some("LOGO"));
        assert_eq!(registry.get("missing.txt"), None);
    }

    #[test]
    fn test_registry_overwrite() {
        let mut registry = Registry::new();
        registry.set("a", "one");
        assert_eq!(registry.set("a", "two"), Some("one".to_string()));
        assert_eq!(registry.get("a"), Some("two"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_registry_clear_and_remove() {
        let mut registry = Registry::new();
        registry.set("a", "1");
        registry.set("b", "2");
        assert_eq!(registry.remove("a"), Some("1".to_string()));

        let mut names: Vec<_> = registry.names().collect();
        names.sort();
        assert_eq!(names, vec!["b"]);

        registry.clear();
        assert!(registry.is_empty());
        assert_eq!(registry.get("b"), None);
    }
}
