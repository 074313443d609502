#![forbid(unsafe_code)]

//! OSM identifiers.
//!
//! Entity ids carry their kind as a one-letter prefix (`n123`, `w-4`,
//! `r99`). Negative numbers are entities created locally that have not been
//! uploaded yet.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The three OSM primitive kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Node,
    Way,
    Relation,
}

impl EntityKind {
    pub const ALL: [EntityKind; 3] = [Self::Node, Self::Way, Self::Relation];

    #[must_use]
    pub const fn prefix(self) -> char {
        match self {
            Self::Node => 'n',
            Self::Way => 'w',
            Self::Relation => 'r',
        }
    }

    #[must_use]
    pub const fn from_prefix(c: char) -> Option<Self> {
        match c {
            'n' | 'N' => Some(Self::Node),
            'w' | 'W' => Some(Self::Way),
            'r' | 'R' => Some(Self::Relation),
            _ => None,
        }
    }

    /// Accepts `node`/`way`/`relation` as used by the OSM API and geocoders.
    #[must_use]
    pub fn from_osm_type(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "node" => Some(Self::Node),
            "way" => Some(Self::Way),
            "relation" => Some(Self::Relation),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Node => "node",
            Self::Way => "way",
            Self::Relation => "relation",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A prefixed entity id such as `w123`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityId {
    kind: EntityKind,
    num: i64,
}

impl EntityId {
    #[must_use]
    pub const fn new(kind: EntityKind, num: i64) -> Self {
        Self { kind, num }
    }

    #[must_use]
    pub const fn node(num: i64) -> Self {
        Self::new(EntityKind::Node, num)
    }

    #[must_use]
    pub const fn way(num: i64) -> Self {
        Self::new(EntityKind::Way, num)
    }

    #[must_use]
    pub const fn relation(num: i64) -> Self {
        Self::new(EntityKind::Relation, num)
    }

    /// Build from an OSM API style pair, e.g. (`"way"`, `123`).
    #[must_use]
    pub fn from_osm(osm_type: &str, num: i64) -> Option<Self> {
        EntityKind::from_osm_type(osm_type).map(|kind| Self::new(kind, num))
    }

    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        self.kind
    }

    #[must_use]
    pub const fn num(&self) -> i64 {
        self.num
    }

    /// Locally created and never uploaded.
    #[must_use]
    pub const fn is_new(&self) -> bool {
        self.num < 0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.kind.prefix(), self.num)
    }
}

/// Returned when a string is not a prefixed entity id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("not an entity id: {0:?}")]
pub struct ParseIdError(pub String);

impl FromStr for EntityId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let kind = chars
            .next()
            .and_then(EntityKind::from_prefix)
            .ok_or_else(|| ParseIdError(s.to_owned()))?;
        let num = chars
            .as_str()
            .parse::<i64>()
            .map_err(|_| ParseIdError(s.to_owned()))?;
        Ok(Self::new(kind, num))
    }
}

impl TryFrom<String> for EntityId {
    type Error = ParseIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<EntityId> for String {
    fn from(id: EntityId) -> Self {
        id.to_string()
    }
}

/// An OSM note id. Negative ids are notes drafted locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NoteId(pub i64);

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
