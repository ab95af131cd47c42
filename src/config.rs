//! Formatter configuration

use crate::error::{WeaveError, WeaveResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Casing applied to SQL keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeywordCase {
    #[default]
    Upper,
    Lower,
    /// Whatever the active dialect prefers.
    Dialect,
}

/// Settings shared by every formatting pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatterConfig {
    /// Keyword casing
    pub keyword_case: KeywordCase,

    /// Quote every identifier, not only the ones that need it
    pub always_quote_identifiers: bool,

    /// Override the dialect's maximum identifier length
    pub max_identifier_length: Option<usize>,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            keyword_case: KeywordCase::Upper,
            always_quote_identifiers: false,
            max_identifier_length: None,
        }
    }
}

impl FormatterConfig {
    /// Create a new configuration builder
    pub fn builder() -> FormatterConfigBuilder {
        FormatterConfigBuilder::default()
    }

    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> WeaveResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that parse but cannot be applied.
    pub fn validate(&self) -> WeaveResult<()> {
        if self.max_identifier_length == Some(0) {
            return Err(WeaveError::Config(
                "max_identifier_length must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Load a configuration file.
    pub fn load(path: impl AsRef<Path>) -> WeaveResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }

    /// Load `<config dir>/sqlweave/formatter.toml`, or the defaults when it
    /// does not exist.
    pub fn load_default() -> WeaveResult<Self> {
        match Self::default_path() {
            Some(path) if path.exists() => {
                tracing::debug!(path = %path.display(), "loading formatter config");
                Self::load(path)
            }
            _ => Ok(Self::default()),
        }
    }

    /// Location of the per-user configuration file.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("sqlweave").join("formatter.toml"))
    }
}

/// Builder for FormatterConfig
#[derive(Debug, Default)]
pub struct FormatterConfigBuilder {
    config: FormatterConfig,
}

impl FormatterConfigBuilder {
    /// Set the keyword casing
    pub fn keyword_case(mut self, case: KeywordCase) -> Self {
        self.config.keyword_case = case;
        self
    }

    /// Quote every identifier
    pub fn always_quote(mut self, enabled: bool) -> Self {
        self.config.always_quote_identifiers = enabled;
        self
    }

    /// Set the maximum identifier length
    pub fn max_identifier_length(mut self, max: usize) -> Self {
        self.config.max_identifier_length = Some(max);
        self
    }

    /// Build the configuration
    pub fn build(self) -> FormatterConfig {
        self.config
    }
}
