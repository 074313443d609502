#![forbid(unsafe_code)]

//! Search result rows.

use std::fmt;

use rapid_core::{EntityId, Extent, Geometry, LatLon, NoteId};

/// The five fixed-priority buckets, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RankGroup {
    Coordinate = 0,
    IdMatch = 1,
    Local = 2,
    Geocode = 3,
    Speculative = 4,
}

/// Icon shape of a result row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultGeometry {
    Point,
    Vertex,
    Line,
    Area,
    Relation,
    Note,
}

impl ResultGeometry {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Point => "point",
            Self::Vertex => "vertex",
            Self::Line => "line",
            Self::Area => "area",
            Self::Relation => "relation",
            Self::Note => "note",
        }
    }
}

impl From<Geometry> for ResultGeometry {
    fn from(g: Geometry) -> Self {
        match g {
            Geometry::Point => Self::Point,
            Geometry::Vertex => Self::Vertex,
            Geometry::Line => Self::Line,
            Geometry::Area => Self::Area,
            Geometry::Relation => Self::Relation,
        }
    }
}

/// What activating a row navigates to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResultTarget {
    Location(LatLon),
    Entity(EntityId),
    Note(NoteId),
}

/// One row in the feature list.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub target: ResultTarget,
    pub geometry: ResultGeometry,
    /// Display name (entity name, geocoder label, formatted coordinate).
    pub label: String,
    /// Preset or type name shown before the label.
    pub kind_label: String,
    pub group: RankGroup,
    /// Meters from the viewport center; local matches only.
    pub distance: Option<f64>,
    pub extent: Option<Extent>,
    /// Route colour for relations that carry a valid `colour` tag.
    pub color: Option<String>,
}

impl SearchResult {
    /// Stable row identity, used to diff the rendered list.
    #[must_use]
    pub fn key(&self) -> ResultKey {
        match self.target {
            ResultTarget::Location(_) => ResultKey::Location,
            ResultTarget::Entity(id) => ResultKey::Entity(id),
            ResultTarget::Note(id) => ResultKey::Note(id),
        }
    }

    /// The entity this row points at, if any.
    #[must_use]
    pub fn entity_id(&self) -> Option<EntityId> {
        match self.target {
            ResultTarget::Entity(id) => Some(id),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultKey {
    Location,
    Entity(EntityId),
    Note(NoteId),
}

impl fmt::Display for ResultKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Location => f.write_str("-1"),
            Self::Entity(id) => write!(f, "{id}"),
            Self::Note(id) => write!(f, "note{id}"),
        }
    }
}

/// Accepts `#rgb`, `#rrggbb` and plain CSS color names.
#[must_use]
pub fn is_valid_color(value: &str) -> bool {
    if let Some(hex) = value.strip_prefix('#') {
        return matches!(hex.len(), 3 | 6) && hex.bytes().all(|b| b.is_ascii_hexdigit());
    }
    !value.is_empty() && value.len() <= 20 && value.bytes().all(|b| b.is_ascii_alphabetic())
}
