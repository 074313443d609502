#![forbid(unsafe_code)]

//! Sidebar tuning.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::resizer::{CLICK_TOLERANCE_PX, DEFAULT_WIDTH_PX, MIN_WIDTH_PX};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SidebarConfig {
    /// Throttle window for map hover events.
    pub hover_throttle_ms: u64,
    /// Narrower than this on release collapses the sidebar.
    pub min_width_px: f64,
    /// Expanded width when nothing is stored.
    pub default_width_px: f64,
    /// Pointer travel below this is a click, not a drag.
    pub click_tolerance_px: f64,
    /// Keys that toggle the sidebar, besides the localized one.
    pub toggle_keys: Vec<String>,
}

impl Default for SidebarConfig {
    fn default() -> Self {
        Self {
            hover_throttle_ms: 200,
            min_width_px: MIN_WIDTH_PX,
            default_width_px: DEFAULT_WIDTH_PX,
            click_tolerance_px: CLICK_TOLERANCE_PX,
            // QWERTY and AZERTY layouts
            toggle_keys: vec!["`".to_owned(), "²".to_owned(), "@".to_owned()],
        }
    }
}

impl SidebarConfig {
    #[must_use]
    pub fn hover_throttle(&self) -> Duration {
        Duration::from_millis(self.hover_throttle_ms)
    }

    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if !(16..=2_000).contains(&self.hover_throttle_ms) {
            errors.push(format!(
                "sidebar.hover_throttle_ms must be in [16, 2000], got {}",
                self.hover_throttle_ms
            ));
        }
        if !(self.min_width_px.is_finite() && self.min_width_px > 0.0) {
            errors.push("sidebar.min_width_px must be positive".to_owned());
        }
        if !(self.default_width_px.is_finite() && self.default_width_px >= self.min_width_px) {
            errors.push(format!(
                "sidebar.default_width_px ({}) must be at least min_width_px ({})",
                self.default_width_px, self.min_width_px
            ));
        }
        if !(self.click_tolerance_px.is_finite() && self.click_tolerance_px >= 0.0) {
            errors.push("sidebar.click_tolerance_px must be non-negative".to_owned());
        }
        if self.toggle_keys.iter().any(String::is_empty) {
            errors.push("sidebar.toggle_keys must not contain empty keys".to_owned());
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_validates_clean() {
        assert!(SidebarConfig::default().validate().is_empty());
    }

    #[test]
    fn default_narrower_than_minimum_is_rejected() {
        let cfg = SidebarConfig {
            default_width_px: 100.0,
            ..SidebarConfig::default()
        };
        let errors = cfg.validate();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("default_width_px"));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cfg: SidebarConfig = serde_json::from_str(r#"{"hover_throttle_ms": 100}"#).unwrap();
        assert_eq!(cfg.hover_throttle_ms, 100);
        assert_eq!(cfg.min_width_px, MIN_WIDTH_PX);
        assert_eq!(cfg.toggle_keys.len(), 3);
    }
}
