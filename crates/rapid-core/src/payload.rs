#![forbid(unsafe_code)]

//! Selection payloads: the things that can occupy the sidebar.
//!
//! Every hover or select event carries one [`SelectionPayload`]. The variant
//! decides which panel shows it; [`PayloadKey`] is the identity the router
//! compares when a collaborator announces fresher data.

use serde::{Deserialize, Serialize};

use crate::geo::LatLon;
use crate::graph::Tags;
use crate::id::{EntityId, NoteId};

/// Open or closed OSM note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteStatus {
    Open,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteComment {
    pub author: Option<String>,
    pub action: String,
    pub text: String,
}

/// An OSM note with its comment thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub loc: LatLon,
    pub status: NoteStatus,
    #[serde(default)]
    pub comments: Vec<NoteComment>,
}

impl Note {
    #[must_use]
    pub fn new(id: i64, loc: LatLon) -> Self {
        Self {
            id: NoteId(id),
            loc,
            status: NoteStatus::Open,
            comments: Vec::new(),
        }
    }

    /// Builder: append a comment.
    #[must_use]
    pub fn with_comment(mut self, author: Option<&str>, text: impl Into<String>) -> Self {
        self.comments.push(NoteComment {
            author: author.map(str::to_owned),
            action: if self.comments.is_empty() { "opened" } else { "commented" }.to_owned(),
            text: text.into(),
        });
        self
    }

    /// A note drafted locally and not yet submitted.
    #[must_use]
    pub fn is_new(&self) -> bool {
        self.id.0 < 0
    }
}

/// Which QA service an issue comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QaSource {
    #[serde(rename = "keepRight")]
    KeepRight,
    Osmose,
    MapRoulette,
}

impl QaSource {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::KeepRight => "keepRight",
            Self::Osmose => "osmose",
            Self::MapRoulette => "maproulette",
        }
    }
}

/// A data-quality issue reported by an external QA service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QaItem {
    pub id: String,
    pub service: QaSource,
    pub loc: LatLon,
    /// Service specific fields (title, message, error type, ...).
    #[serde(default)]
    pub tags: Tags,
    /// `open`, `done`, `false_positive`, ...
    #[serde(default = "default_qa_status")]
    pub status: String,
}

fn default_qa_status() -> String {
    "open".to_owned()
}

impl QaItem {
    #[must_use]
    pub fn new(service: QaSource, id: impl Into<String>, loc: LatLon) -> Self {
        Self {
            id: id.into(),
            service,
            loc,
            tags: Tags::new(),
            status: default_qa_status(),
        }
    }
}

/// A feature from a user-loaded GeoJSON/GPX/vector-tile layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomFeature {
    pub feature_hash: String,
    pub geometry: serde_json::Value,
    #[serde(default)]
    pub properties: serde_json::Map<String, serde_json::Value>,
}

/// A feature suggested by an AI-assisted dataset (roads, buildings).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiFeature {
    pub id: String,
    pub dataset_id: String,
    /// Upstream provider, e.g. `mapwithai` or `esri`.
    pub service: String,
    #[serde(default)]
    pub tags: Tags,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OvertureFeature {
    pub id: String,
    pub dataset_id: String,
    #[serde(default)]
    pub properties: serde_json::Map<String, serde_json::Value>,
}

/// A street-level imagery object detection (sign, hydrant, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub key: String,
    pub object_type: String,
    pub best_image_id: Option<String>,
}

/// What a hover or select event points at.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionPayload {
    /// Insertion-ordered, duplicate-free OSM entity ids.
    OsmEntitySet(Vec<EntityId>),
    Note(Note),
    QaItem(QaItem),
    CustomGeoData(CustomFeature),
    AiFeature(AiFeature),
    OvertureFeature(OvertureFeature),
    Detection(Detection),
}

impl SelectionPayload {
    /// Build an entity set, dropping repeated ids but keeping first-seen order.
    #[must_use]
    pub fn entities(ids: impl IntoIterator<Item = EntityId>) -> Self {
        let mut out: Vec<EntityId> = Vec::new();
        for id in ids {
            if !out.contains(&id) {
                out.push(id);
            }
        }
        Self::OsmEntitySet(out)
    }

    #[must_use]
    pub fn entity(id: EntityId) -> Self {
        Self::OsmEntitySet(vec![id])
    }

    /// An entity set with no ids: selecting it clears the selection.
    #[must_use]
    pub fn is_empty_selection(&self) -> bool {
        matches!(self, Self::OsmEntitySet(ids) if ids.is_empty())
    }

    /// Short variant name used in log fields.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::OsmEntitySet(_) => "osm",
            Self::Note(_) => "note",
            Self::QaItem(_) => "qa",
            Self::CustomGeoData(_) => "data",
            Self::AiFeature(_) => "rapid",
            Self::OvertureFeature(_) => "overture",
            Self::Detection(_) => "detection",
        }
    }

    /// Every identity this payload covers.
    #[must_use]
    pub fn keys(&self) -> Vec<PayloadKey> {
        match self {
            Self::OsmEntitySet(ids) => ids.iter().copied().map(PayloadKey::Entity).collect(),
            Self::Note(n) => vec![PayloadKey::Note(n.id)],
            Self::QaItem(q) => vec![PayloadKey::Qa(q.service, q.id.clone())],
            Self::CustomGeoData(c) => vec![PayloadKey::Custom(c.feature_hash.clone())],
            Self::AiFeature(a) => vec![PayloadKey::Ai(a.dataset_id.clone(), a.id.clone())],
            Self::OvertureFeature(o) => {
                vec![PayloadKey::Overture(o.dataset_id.clone(), o.id.clone())]
            }
            Self::Detection(d) => vec![PayloadKey::Detection(d.key.clone())],
        }
    }

    /// True when any of this payload's keys is in `changed`.
    #[must_use]
    pub fn intersects<'a>(&self, changed: impl IntoIterator<Item = &'a PayloadKey>) -> bool {
        let mine = self.keys();
        changed.into_iter().any(|k| mine.contains(k))
    }

    /// Map location, when the payload has a single one.
    #[must_use]
    pub fn loc(&self) -> Option<LatLon> {
        match self {
            Self::Note(n) => Some(n.loc),
            Self::QaItem(q) => Some(q.loc),
            _ => None,
        }
    }
}

/// Identity of a shown object, used to match refresh announcements.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PayloadKey {
    Entity(EntityId),
    Note(NoteId),
    Qa(QaSource, String),
    Custom(String),
    Ai(String, String),
    Overture(String, String),
    Detection(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_set_is_ordered_and_unique() {
        let p = SelectionPayload::entities([
            EntityId::way(2),
            EntityId::node(1),
            EntityId::way(2),
        ]);
        assert_eq!(
            p,
            SelectionPayload::OsmEntitySet(vec![EntityId::way(2), EntityId::node(1)])
        );
    }

    #[test]
    fn empty_selection() {
        assert!(SelectionPayload::entities([]).is_empty_selection());
        assert!(!SelectionPayload::entity(EntityId::node(1)).is_empty_selection());
    }

    #[test]
    fn keys_cover_every_entity() {
        let p = SelectionPayload::entities([EntityId::node(1), EntityId::way(2)]);
        assert_eq!(
            p.keys(),
            vec![
                PayloadKey::Entity(EntityId::node(1)),
                PayloadKey::Entity(EntityId::way(2))
            ]
        );
    }

    #[test]
    fn intersects_matches_on_identity_only() {
        let note = SelectionPayload::Note(Note::new(7, LatLon::default()));
        assert!(note.intersects(&[PayloadKey::Note(NoteId(7))]));
        assert!(!note.intersects(&[PayloadKey::Note(NoteId(8))]));
        assert!(!note.intersects(&[PayloadKey::Entity(EntityId::node(7))]));
    }

    #[test]
    fn qa_keys_include_service() {
        let a = SelectionPayload::QaItem(QaItem::new(QaSource::Osmose, "1", LatLon::default()));
        assert!(!a.intersects(&[PayloadKey::Qa(QaSource::KeepRight, "1".into())]));
        assert!(a.intersects(&[PayloadKey::Qa(QaSource::Osmose, "1".into())]));
    }

    #[test]
    fn qa_source_serializes_as_service_name() {
        for source in [QaSource::KeepRight, QaSource::Osmose, QaSource::MapRoulette] {
            let json = serde_json::to_string(&source).unwrap();
            assert_eq!(json, format!("\"{}\"", source.as_str()));
            assert_eq!(serde_json::from_str::<QaSource>(&json).unwrap(), source);
        }
    }

    #[test]
    fn comments_record_action() {
        let n = Note::new(1, LatLon::default())
            .with_comment(Some("alice"), "broken bridge")
            .with_comment(None, "still broken");
        assert_eq!(n.comments[0].action, "opened");
        assert_eq!(n.comments[1].action, "commented");
    }

    #[test]
    fn note_deserializes_from_json() {
        let json = r#"{"id":5,"loc":{"lon":1.0,"lat":2.0},"status":"closed"}"#;
        let n: Note = serde_json::from_str(json).unwrap();
        assert_eq!(n.status, NoteStatus::Closed);
        assert!(n.comments.is_empty());
    }
}
