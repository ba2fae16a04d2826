//! Engine configuration, loadable from TOML
//!
//! ```toml
//! # Stop runaway recursive includes after 32 levels
//! max_include_depth = 32
//! # "strict" (default) fails on unknown identifiers, "lenient" yields null
//! undefined = "lenient"
//! ```

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading or parsing configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// How an identifier missing from every scope layer is treated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UndefinedBehavior {
    /// Raise a render error
    #[default]
    Strict,
    /// Evaluate to `null`
    Lenient,
}

/// Options for an [`Engine`](crate::Engine)
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Maximum nesting of includes; `None` recurses without limit
    pub max_include_depth: Option<usize>,
    /// Treatment of undefined identifiers
    pub undefined: UndefinedBehavior,
}

impl EngineConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load configuration from a TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Limit include nesting
    pub fn with_max_include_depth(mut self, depth: usize) -> Self {
        self.max_include_depth = Some(depth);
        self
    }

    /// Set how undefined identifiers are treated
    pub fn with_undefined(mut self, undefined: UndefinedBehavior) -> Self {
        self.undefined = undefined;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.max_include_depth, None);
        assert_eq!(config.undefined, UndefinedBehavior::Strict);
    }

    #[test]
    fn test_from_str() {
        let config = EngineConfig::from_str(
            r#"
            max_include_depth = 8
            undefined = "lenient"
            "#,
        )
        .expect("Should parse");
        assert_eq!(
            config,
            EngineConfig::new()
                .with_max_include_depth(8)
                .with_undefined(UndefinedBehavior::Lenient)
        );
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config = EngineConfig::from_str("").expect("Should parse");
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_rejects_unknown_keys() {
        let result = EngineConfig::from_str("delimiter = \"{{\"");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_rejects_bad_undefined_value() {
        assert!(EngineConfig::from_str("undefined = \"loud\"").is_err());
    }
}
