#![forbid(unsafe_code)]

//! Top-level configuration for a sidebar session.
//!
//! Groups the sidebar, search and logging tunables into a single
//! [`UiConfig`] that can be loaded from TOML or JSON at startup. Every
//! section and field is optional; missing values take the defaults.
//!
//! # Loading
//!
//! ```toml
//! # rapid-ui.toml
//! [sidebar]
//! hover_throttle_ms = 150
//!
//! [search]
//! auto_geocode = false
//!
//! [logging]
//! filter = "rapid_sidebar=debug,info"
//! json = true
//! ```
//!
//! ```rust,ignore
//! let config = UiConfig::from_toml_file("rapid-ui.toml")?;
//! ```

use std::path::Path;

use rapid_core::ConfigError;
use rapid_search::SearchConfig;
use rapid_sidebar::SidebarConfig;
use serde::{Deserialize, Serialize};

use crate::logging::LoggingConfig;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub sidebar: SidebarConfig,
    pub search: SearchConfig,
    pub logging: LoggingConfig,
}

impl UiConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s).map_err(|e| ConfigError::Toml(e.to_string()))?;
        config.checked()
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate a JSON document.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s)?;
        config.checked()
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Every problem across all sections. Empty means valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = self.sidebar.validate();
        errors.extend(self.search.validate());
        errors.extend(self.logging.validate());
        errors
    }

    pub(crate) fn checked(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Invalid(errors))
        }
    }
}
