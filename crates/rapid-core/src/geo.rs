#![forbid(unsafe_code)]

//! WGS84 primitives.
//!
//! Coordinates are stored longitude first, matching the editor's `[lon, lat]`
//! convention. Distances use the equirectangular approximation: good enough
//! to rank nearby search results, cheap enough to run per keystroke.

use serde::{Deserialize, Serialize};

/// Equatorial radius in meters.
pub const EQUATORIAL_RADIUS: f64 = 6_378_137.0;
/// Polar radius in meters.
pub const POLAR_RADIUS: f64 = 6_356_752.314_245_179;

/// A WGS84 location in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LatLon {
    pub lon: f64,
    pub lat: f64,
}

impl LatLon {
    #[must_use]
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// True when both components are finite and inside the WGS84 domain.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.lon.is_finite()
            && self.lat.is_finite()
            && self.lat.abs() <= 90.0
            && self.lon.abs() <= 180.0
    }
}

/// An axis-aligned lon/lat bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub min: LatLon,
    pub max: LatLon,
}

impl Extent {
    #[must_use]
    pub fn new(a: LatLon, b: LatLon) -> Self {
        Self {
            min: LatLon::new(a.lon.min(b.lon), a.lat.min(b.lat)),
            max: LatLon::new(a.lon.max(b.lon), a.lat.max(b.lat)),
        }
    }

    /// Degenerate extent covering a single location.
    #[must_use]
    pub const fn point(loc: LatLon) -> Self {
        Self { min: loc, max: loc }
    }

    /// Parse a geocoder bounding box: `[south, north, west, east]` as strings.
    ///
    /// Returns `None` when the box has the wrong arity or any value is not a
    /// finite number.
    #[must_use]
    pub fn from_bounding_box<S: AsRef<str>>(bbox: &[S]) -> Option<Self> {
        let [south, north, west, east] = bbox else {
            return None;
        };
        let parse = |s: &S| {
            s.as_ref()
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
        };
        Some(Self::new(
            LatLon::new(parse(west)?, parse(south)?),
            LatLon::new(parse(east)?, parse(north)?),
        ))
    }

    #[must_use]
    pub fn center(&self) -> LatLon {
        LatLon::new(
            (self.min.lon + self.max.lon) / 2.0,
            (self.min.lat + self.max.lat) / 2.0,
        )
    }

    /// Grow to include `loc`.
    pub fn extend(&mut self, loc: LatLon) {
        self.min.lon = self.min.lon.min(loc.lon);
        self.min.lat = self.min.lat.min(loc.lat);
        self.max.lon = self.max.lon.max(loc.lon);
        self.max.lat = self.max.lat.max(loc.lat);
    }

    #[must_use]
    pub fn union(mut self, other: Extent) -> Self {
        self.extend(other.min);
        self.extend(other.max);
        self
    }

    #[must_use]
    pub fn contains(&self, loc: LatLon) -> bool {
        loc.lon >= self.min.lon
            && loc.lon <= self.max.lon
            && loc.lat >= self.min.lat
            && loc.lat <= self.max.lat
    }
}

/// Meters spanned by `d_lat` degrees of latitude.
#[must_use]
pub fn lat_to_meters(d_lat: f64) -> f64 {
    d_lat * (std::f64::consts::TAU * POLAR_RADIUS / 360.0)
}

/// Meters spanned by `d_lon` degrees of longitude at latitude `at_lat`.
#[must_use]
pub fn lon_to_meters(d_lon: f64, at_lat: f64) -> f64 {
    if at_lat.abs() >= 90.0 {
        return 0.0;
    }
    d_lon * (std::f64::consts::TAU * EQUATORIAL_RADIUS / 360.0) * at_lat.to_radians().cos().abs()
}

/// Approximate ground distance in meters between two locations.
#[must_use]
pub fn spherical_distance(a: LatLon, b: LatLon) -> f64 {
    let x = lon_to_meters(a.lon - b.lon, (a.lat + b.lat) / 2.0);
    let y = lat_to_meters(a.lat - b.lat);
    x.hypot(y)
}
