#![forbid(unsafe_code)]

//! Subscriber setup for hosts that do not install their own.
//!
//! Every crate in the workspace only emits `tracing` events. A host that
//! already has a subscriber can ignore this module entirely.

use rapid_core::ConfigError;
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directives, e.g. `"rapid_sidebar=debug,info"`.
    pub filter: String,
    /// One JSON object per event instead of human-readable lines.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_owned(),
            json: false,
        }
    }
}

impl LoggingConfig {
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        match EnvFilter::try_new(&self.filter) {
            Ok(_) => Vec::new(),
            Err(err) => vec![format!("logging.filter {:?} is invalid: {err}", self.filter)],
        }
    }
}

/// Install a global `fmt` subscriber.
///
/// Returns `Ok(false)` when a global subscriber was already set; calling
/// this twice is harmless.
pub fn init_logging(config: &LoggingConfig) -> Result<bool, ConfigError> {
    let filter = EnvFilter::try_new(&config.filter)
        .map_err(|err| ConfigError::Invalid(vec![format!("logging.filter: {err}")]))?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = if config.json {
        builder.json().try_init().is_ok()
    } else {
        builder.try_init().is_ok()
    };
    if installed {
        tracing::debug!(message = "logging.init", filter = %config.filter, json = config.json);
    }
    Ok(installed)
}
