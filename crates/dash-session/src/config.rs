//! Session configuration
//!
//! Loaded from TOML:
//!
//! ```toml
//! app_id = "ops-dashboard"
//! initial_mode = "preview"
//! untitled_name = "Untitled"
//! max_open_tabs = 8
//! ```

use crate::mode::EditMode;
use serde::{Deserialize, Serialize};

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML syntax or type error
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Well-formed but unusable value
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Session settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Application id sent with every collaborator call
    pub app_id: String,
    /// Mode a tab enters when it is opened
    pub initial_mode: EditMode,
    /// Tab name for unnamed workspaces
    pub untitled_name: String,
    /// Upper bound on open tabs, unlimited when `None`
    pub max_open_tabs: Option<usize>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            app_id: "dashboard".to_string(),
            initial_mode: EditMode::Preview,
            untitled_name: "Untitled".to_string(),
            max_open_tabs: None,
        }
    }
}

impl SessionConfig {
    /// Parse and validate TOML text
    ///
    /// # Errors
    /// `Parse` for malformed TOML, `Invalid` for an empty app id or a zero tab limit
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value constraints
    ///
    /// # Errors
    /// `Invalid` for an empty app id or a zero tab limit
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.app_id.trim().is_empty() {
            return Err(ConfigError::Invalid("app_id must not be empty".to_string()));
        }
        if self.max_open_tabs == Some(0) {
            return Err(ConfigError::Invalid("max_open_tabs must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Set app id
    #[must_use]
    pub fn with_app_id(mut self, app_id: impl Into<String>) -> Self {
        self.app_id = app_id.into();
        self
    }

    /// Set initial mode
    #[must_use]
    pub fn with_initial_mode(mut self, mode: EditMode) -> Self {
        self.initial_mode = mode;
        self
    }

    /// Set fallback tab name
    #[must_use]
    pub fn with_untitled_name(mut self, name: impl Into<String>) -> Self {
        self.untitled_name = name.into();
        self
    }

    /// Limit open tabs
    #[must_use]
    pub fn with_max_open_tabs(mut self, limit: usize) -> Self {
        self.max_open_tabs = Some(limit);
        self
    }
}
