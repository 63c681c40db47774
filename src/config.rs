use crate::core::{ModelError, Result};
use lazy_static::lazy_static;
use std::sync::Arc;

lazy_static! {
    static ref GLOBAL_CONFIG: Arc<ModelConfig> = Arc::new(ModelConfig::default());
}

/// Model-layer configuration
///
/// Governs the naming rules enforced when properties are constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelConfig {
    /// Reserved character that may not appear in property names
    /// (it separates the path segments of structured properties)
    pub name_separator: char,

    /// Maximum length of a property name in bytes
    pub max_name_len: usize,
}

impl ModelConfig {
    const DEFAULT_SEPARATOR: char = '.';
    const DEFAULT_MAX_NAME_LEN: usize = 1500;

    /// Create a configuration with the default naming rules
    pub fn new() -> Self {
        Self {
            name_separator: Self::DEFAULT_SEPARATOR,
            max_name_len: Self::DEFAULT_MAX_NAME_LEN,
        }
    }

    /// Get the process-wide default configuration
    pub fn global() -> &'static Arc<ModelConfig> {
        &GLOBAL_CONFIG
    }

    /// Set the reserved name separator
    pub fn name_separator(mut self, separator: char) -> Self {
        self.name_separator = separator;
        self
    }

    /// Set the maximum property name length
    pub fn max_name_len(mut self, max: usize) -> Self {
        self.max_name_len = max;
        self
    }

    /// Check a property name against the configured rules
    pub fn check_name(&self, name: &str) -> Result<()> {
        if name.contains(self.name_separator) {
            return Err(ModelError::InvalidArgument(format!(
                "Name '{}' cannot contain '{}' characters",
                name, self.name_separator
            )));
        }

        if name.len() > self.max_name_len {
            return Err(ModelError::InvalidArgument(format!(
                "Name '{}' exceeds the maximum length of {} bytes",
                name, self.max_name_len
            )));
        }

        Ok(())
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self::new()
    }
}
