#![forbid(unsafe_code)]

//! Coordinate pairs typed into the search box.
//!
//! Two recognizers run in order:
//!
//! 1. [`sexagesimal_pair`]: decimal or degree/minute/second pairs with
//!    optional hemisphere letters (`37.7 -122.4`, `N 37° 42' W 122°`,
//!    `122.4W 37.7N`). A hemisphere letter on the first half decides which
//!    half is the latitude.
//! 2. The localizer's DMS matcher for space separated `D M SS , D M SS`.
//!
//! # Failure Modes
//!
//! Anything that does not parse, or parses outside ±90/±180, is simply not
//! a coordinate. Nothing here returns an error.

use std::sync::LazyLock;

use rapid_core::{LatLon, Localizer};
use regex::{Captures, Regex};

/// One coordinate: a signed number, optional minutes and seconds marks and
/// an optional hemisphere letter on either side.
static COORDINATE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)[\s,]*([NSEW])?\s*([-—―]?[0-9.]+)[°º˚]?\s*(?:([0-9.]+)['’′‘]\s*)?(?:([0-9.]+)(?:''|"|”|″)\s*)?([NSEW])?"#,
    )
    .ok()
});

struct Half {
    value: f64,
    dim: Option<char>,
    start: usize,
    end: usize,
}

fn half_at(text: &str, start: usize) -> Option<Half> {
    let re = COORDINATE.as_ref()?;
    let caps = re.captures_at(text, start)?;
    let whole = caps.get(0)?;
    let dim = caps
        .get(1)
        .or_else(|| caps.get(5))
        .and_then(|m| m.as_str().chars().next())
        .map(|c| c.to_ascii_uppercase());
    let value = magnitude(&caps)?;
    let sign = if matches!(dim, Some('S' | 'W')) { -1.0 } else { 1.0 };
    Some(Half {
        value: value * sign,
        dim,
        start: whole.start(),
        end: whole.end(),
    })
}

fn magnitude(caps: &Captures<'_>) -> Option<f64> {
    let degrees = parse_float_prefix(caps.get(2)?.as_str())?;
    let minutes = match caps.get(3) {
        Some(m) => parse_float_prefix(m.as_str())? / 60.0,
        None => 0.0,
    };
    let seconds = match caps.get(4) {
        Some(m) => parse_float_prefix(m.as_str())? / 3600.0,
        None => 0.0,
    };
    Some(degrees + minutes + seconds)
}

/// Leading-number parse: `"12.5.3"` is 12.5, `"."` is nothing.
///
/// Any dash counts as a minus sign.
fn parse_float_prefix(s: &str) -> Option<f64> {
    let (negative, digits) = match s.chars().next() {
        Some(c @ ('-' | '—' | '―')) => (true, &s[c.len_utf8()..]),
        _ => (false, s),
    };
    let mut end = 0;
    let mut seen_dot = false;
    let mut seen_digit = false;
    for (i, c) in digits.char_indices() {
        match c {
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end = i + c.len_utf8();
    }
    if !seen_digit {
        return None;
    }
    let value: f64 = digits[..end].trim_end_matches('.').parse().ok()?;
    Some(if negative { -value } else { value })
}

/// Parse a pair of coordinates covering the whole of `text`.
///
/// Returns `(lat, lon)` order resolved through the hemisphere letter on the
/// first half, as a [`LatLon`].
#[must_use]
pub fn sexagesimal_pair(text: &str) -> Option<LatLon> {
    let text = text.trim();
    let one = half_at(text, 0)?;
    let two = half_at(text, one.end)?;
    if one.start != 0 || two.start != one.end || two.end != text.len() {
        return None;
    }
    let (lat, lon) = match one.dim {
        Some('E' | 'W') => (two.value, one.value),
        _ => (one.value, two.value),
    };
    Some(LatLon::new(lon, lat))
}

/// Recognize a coordinate query; `query` may be in any case.
#[must_use]
pub fn parse_location(query: &str, l10n: &dyn Localizer) -> Option<LatLon> {
    sexagesimal_pair(&query.to_uppercase())
        .or_else(|| l10n.dms_matcher(query))
        .filter(LatLon::is_valid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rapid_core::EnglishLocalizer;

    fn close(a: LatLon, lon: f64, lat: f64) -> bool {
        (a.lon - lon).abs() < 1e-6 && (a.lat - lat).abs() < 1e-6
    }

    #[test]
    fn decimal_pair_is_lat_lon() {
        let loc = sexagesimal_pair("37.7 -122.4").expect("pair");
        assert!(close(loc, -122.4, 37.7), "{loc:?}");
    }

    #[test]
    fn comma_separated_pair() {
        let loc = sexagesimal_pair("37.7, -122.4").expect("pair");
        assert!(close(loc, -122.4, 37.7), "{loc:?}");
    }

    #[test]
    fn hemisphere_letters_set_sign() {
        let loc = sexagesimal_pair("37.7N 122.4W").expect("pair");
        assert!(close(loc, -122.4, 37.7), "{loc:?}");
    }

    #[test]
    fn longitude_first_is_swapped() {
        let loc = sexagesimal_pair("W 122.4 N 37.7").expect("pair");
        assert!(close(loc, -122.4, 37.7), "{loc:?}");
    }

    #[test]
    fn degrees_minutes_seconds() {
        let loc = sexagesimal_pair("66° 30′ 0″ N 20° 15′ E").expect("pair");
        assert!(close(loc, 20.25, 66.5), "{loc:?}");
    }

    #[test]
    fn single_number_is_not_a_pair() {
        assert!(sexagesimal_pair("12345").is_none());
        assert!(sexagesimal_pair("N123").is_none());
    }

    #[test]
    fn trailing_garbage_rejects() {
        assert!(sexagesimal_pair("37.7 -122.4 cafe").is_none());
        assert!(sexagesimal_pair("cafe 37.7 -122.4").is_none());
    }

    #[test]
    fn float_prefix_semantics() {
        assert_eq!(parse_float_prefix("12.5.3"), Some(12.5));
        assert_eq!(parse_float_prefix("-.5"), Some(-0.5));
        assert_eq!(parse_float_prefix("—3"), Some(-3.0));
        assert_eq!(parse_float_prefix("."), None);
    }

    #[test]
    fn location_falls_back_to_dms_matcher() {
        let l10n = EnglishLocalizer::new();
        let loc = parse_location("35 11 10.1 , 136 49 53.8", &l10n).expect("dms");
        assert!((loc.lat - 35.18614).abs() < 1e-5);
    }

    #[test]
    fn out_of_range_is_not_a_location() {
        let l10n = EnglishLocalizer::new();
        assert!(parse_location("5000 6000", &l10n).is_none());
        assert!(parse_location("12 34", &l10n).is_some());
    }
}
