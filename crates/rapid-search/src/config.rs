#![forbid(unsafe_code)]

//! Search tuning.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Local matches collected before the scan stops.
pub const DEFAULT_LOCAL_RESULT_CAP: usize = 100;

/// Map zoom used when a result is activated.
pub const DEFAULT_SELECT_ZOOM: f64 = 19.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Fire the geocoder on its own once typing pauses.
    pub auto_geocode: bool,
    /// Quiet window before an automatic geocode request.
    pub geocode_debounce_ms: u64,
    /// Cap on local graph matches per query.
    pub local_result_cap: usize,
    pub select_zoom: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            auto_geocode: true,
            geocode_debounce_ms: 250,
            local_result_cap: DEFAULT_LOCAL_RESULT_CAP,
            select_zoom: DEFAULT_SELECT_ZOOM,
        }
    }
}

impl SearchConfig {
    #[must_use]
    pub fn geocode_debounce(&self) -> Duration {
        Duration::from_millis(self.geocode_debounce_ms)
    }

    /// Collect every problem instead of stopping at the first.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.local_result_cap == 0 {
            errors.push("search.local_result_cap must be at least 1".to_owned());
        }
        if self.auto_geocode && !(50..=5_000).contains(&self.geocode_debounce_ms) {
            errors.push(format!(
                "search.geocode_debounce_ms must be in [50, 5000], got {}",
                self.geocode_debounce_ms
            ));
        }
        if !(0.0..=24.0).contains(&self.select_zoom) {
            errors.push(format!(
                "search.select_zoom must be in [0, 24], got {}",
                self.select_zoom
            ));
        }
        errors
    }
}
