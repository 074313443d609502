#![forbid(unsafe_code)]

//! Degree/minute/second coordinate text.
//!
//! [`dms_matcher`] recognizes the two space-separated forms people paste from
//! GPS units (`D M SS , D M SS` and `D MM , D MM`); [`dms_coordinate_pair`]
//! formats a location for display as `45°N, 90°0′1″E`.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::geo::LatLon;

/// Digits, optionally followed by a dot and more digits (`10`, `10.`, `10.1`).
const DECIMAL: &str = r"[0-9]+(?:\.[0-9]*)?";

/// Recognized forms, tried in order. Each captures the sign and parts of
/// the latitude, then of the longitude.
static PATTERNS: LazyLock<Vec<(Regex, usize)>> = LazyLock::new(|| {
    let d_m_ss = format!(r"(-)?\s*([0-9]+)\s+([0-9]+)\s+({DECIMAL})");
    let d_mm = format!(r"(-)?\s*([0-9]+)\s+({DECIMAL})");
    [(d_m_ss, 3), (d_mm, 2)]
        .into_iter()
        .filter_map(|(half, parts)| {
            let pair = format!(r"^\s*{half}\s*,\s*{half}\s*$");
            Regex::new(&pair).ok().map(|re| (re, parts))
        })
        .collect()
});

/// Parse `"35 11 10.1 , 136 49 53.8"` or `"35 11.1683 , 136 49.8966"`.
///
/// Each half may carry a leading `-`. Returns `None` for anything else.
#[must_use]
pub fn dms_matcher(text: &str) -> Option<LatLon> {
    PATTERNS.iter().find_map(|(re, parts)| {
        let caps = re.captures(text)?;
        let lat = half(&caps, 1, *parts)?;
        let lon = half(&caps, 2 + parts, *parts)?;
        Some(LatLon::new(lon, lat))
    })
}

/// Sign group at `first`, then `parts` numeric groups, largest unit first.
fn half(caps: &Captures<'_>, first: usize, parts: usize) -> Option<f64> {
    let mut value = 0.0;
    let mut unit = 1.0;
    for i in 0..parts {
        let part: f64 = caps.get(first + 1 + i)?.as_str().parse().ok()?;
        value += part / unit;
        unit *= 60.0;
    }
    Some(if caps.get(first).is_some() { -value } else { value })
}

/// Format a location as `"<lat>, <lon>"` with hemisphere letters.
///
/// Latitude is clamped to ±90 and longitude wrapped into [-180, 180).
#[must_use]
pub fn dms_coordinate_pair(loc: LatLon) -> String {
    let lat = loc.lat.clamp(-90.0, 90.0);
    let lon = wrap_longitude(loc.lon);
    format!(
        "{}, {}",
        display_coordinate(lat, 'N', 'S'),
        display_coordinate(lon, 'E', 'W')
    )
}

fn wrap_longitude(lon: f64) -> f64 {
    (lon + 180.0).rem_euclid(360.0) - 180.0
}

fn display_coordinate(deg: f64, pos: char, neg: char) -> String {
    let total = (deg.abs() * 3600.0).round() as u64;
    let (d, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
    let body = if s > 0 {
        format!("{d}°{m}′{s}″")
    } else if m > 0 {
        format!("{d}°{m}′")
    } else {
        format!("{d}°")
    };
    if total == 0 {
        body
    } else if deg > 0.0 {
        format!("{body}{pos}")
    } else {
        format!("{body}{neg}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-5, "{a} != {b}");
    }

    #[test]
    fn parses_d_m_ss() {
        let loc = dms_matcher("35 11 10.1 , 136 49 53.8").expect("match");
        assert_close(loc.lat, 35.18614);
        assert_close(loc.lon, 136.83161);
    }

    #[test]
    fn parses_d_m_ss_negative() {
        let loc = dms_matcher("-35 11 10.1 , -136 49 53.8").expect("match");
        assert_close(loc.lat, -35.18614);
        assert_close(loc.lon, -136.83161);
    }

    #[test]
    fn parses_d_mm() {
        let loc = dms_matcher("35 11.1683 , 136 49.8966").expect("match");
        assert_close(loc.lat, 35.18614);
        assert_close(loc.lon, 136.83161);
    }

    #[test]
    fn parses_d_mm_negative() {
        let loc = dms_matcher("-35 11.1683 , -136 49.8966").expect("match");
        assert_close(loc.lat, -35.18614);
        assert_close(loc.lon, -136.83161);
    }

    #[test]
    fn halves_share_one_form() {
        assert!(dms_matcher("35 11 10.1 , 136 49.8966").is_none());
        let loc = dms_matcher("  1 30. , 2 15  ").expect("match");
        assert_close(loc.lat, 1.5);
        assert_close(loc.lon, 2.25);
    }

    #[test]
    fn rejects_garbage() {
        assert!(dms_matcher("!@#$").is_none());
        assert!(dms_matcher("35 11 , abc").is_none());
        assert!(dms_matcher("35.5 11 , 136 49").is_none());
        assert!(dms_matcher("35 , 136").is_none());
    }

    #[test]
    fn formats_pair() {
        let s = dms_coordinate_pair(LatLon::new(90.0 + 0.5 / 3600.0, 45.0));
        assert_eq!(s, "45°N, 90°0′1″E");
    }

    #[test]
    fn formats_zero() {
        assert_eq!(dms_coordinate_pair(LatLon::new(0.0, 0.0)), "0°, 0°");
    }

    #[test]
    fn formats_negative() {
        assert_eq!(dms_coordinate_pair(LatLon::new(-179.0, -90.0)), "90°S, 179°W");
    }

    #[test]
    fn clamps_and_wraps() {
        assert_eq!(dms_coordinate_pair(LatLon::new(181.0, 91.0)), "90°N, 179°W");
        assert_eq!(dms_coordinate_pair(LatLon::new(180.0, 0.0)), "0°, 180°W");
    }
}
