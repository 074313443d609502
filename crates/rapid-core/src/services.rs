#![forbid(unsafe_code)]

//! Collaborator seams.
//!
//! The sidebar and the search engine do not own a map renderer, a network
//! client or a preset index. They talk to those systems through the traits
//! below, bundled in [`Services`]. Every trait takes `&self`: the host keeps
//! its own interior mutability, everything runs on one UI thread.
//!
//! Asynchronous operations take a boxed callback. Implementations may call
//! it immediately or later; consumers route results through a channel and
//! apply them on their next pump, so re-entrancy is never an issue.

use std::collections::BTreeMap;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::dms;
use crate::error::ServiceError;
use crate::geo::LatLon;
use crate::graph::{Entity, Graph, Tags};
use crate::id::{EntityId, EntityKind, NoteId};
use crate::payload::{AiFeature, CustomFeature, Detection, Note, OvertureFeature, QaItem, QaSource};
use crate::store::PersistentStore;

/// Callback for an asynchronous collaborator operation.
pub type Callback<T> = Box<dyn FnOnce(Result<T, ServiceError>)>;

/// A matched preset: the human label for a kind of feature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preset {
    pub id: String,
    name: String,
}

impl Preset {
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Classifies an entity into a preset.
pub trait PresetMatcher {
    fn match_entity(&self, entity: &Entity, graph: &Graph) -> Option<Preset>;
}

/// Translation and display-name helpers.
pub trait Localizer {
    /// Translate `key`, substituting `{name}` placeholders from `params`.
    fn t(&self, key: &str, params: &[(&str, &str)]) -> String;

    /// The label people know the feature by, if it has one.
    fn display_name(&self, tags: &Tags) -> Option<String>;

    /// Generic type label for an entity kind ("Node", "Way", ...).
    fn display_type(&self, kind: EntityKind) -> String;

    /// Right-to-left locales flip horizontal drag direction.
    fn is_rtl(&self) -> bool {
        false
    }

    fn dms_matcher(&self, text: &str) -> Option<LatLon> {
        dms::dms_matcher(text)
    }

    fn dms_coordinate_pair(&self, loc: LatLon) -> String {
        dms::dms_coordinate_pair(loc)
    }
}

/// The OSM notes service.
pub trait NoteService {
    /// Cached copy, if the note has been loaded.
    fn get_note(&self, id: NoteId) -> Option<Note>;

    /// Fetch a note from the server into the cache.
    fn load_note(&self, id: NoteId, done: Callback<()>);
}

/// KeepRight, Osmose and MapRoulette issue caches.
pub trait QaService {
    fn get_item(&self, source: QaSource, id: &str) -> Option<QaItem>;
}

/// Lookups for the non-OSM layers (custom data, AI suggestions, Overture,
/// imagery detections). Every method defaults to "not found".
pub trait FeatureSource {
    fn custom_feature(&self, _feature_hash: &str) -> Option<CustomFeature> {
        None
    }
    fn ai_feature(&self, _dataset_id: &str, _id: &str) -> Option<AiFeature> {
        None
    }
    fn overture_feature(&self, _dataset_id: &str, _id: &str) -> Option<OvertureFeature> {
        None
    }
    fn detection(&self, _key: &str) -> Option<Detection> {
        None
    }
}

/// One raw geocoder hit, in the Nominatim response shape.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GeocodeResult {
    #[serde(default)]
    pub osm_type: Option<String>,
    #[serde(default)]
    pub osm_id: Option<i64>,
    #[serde(default)]
    pub class: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub display_name: String,
    /// `[south, north, west, east]` as decimal strings.
    #[serde(default)]
    pub boundingbox: Vec<String>,
}

/// Worldwide place search.
pub trait Geocoder {
    fn search(&self, query: &str, done: Callback<Vec<GeocodeResult>>);
}

/// Commands the sidebar and the search send to the map.
pub trait MapNavigator {
    fn center_zoom_ease(&self, loc: LatLon, zoom: f64);

    /// Select the entity, downloading it first if needed; `fit` zooms to it.
    fn select_entity_id(&self, id: EntityId, fit: bool);

    fn enable_layer(&self, layer: &str);

    fn highlight_entities(&self, ids: &[EntityId], highlighted: bool);
}

/// Every collaborator the sidebar and the search consume.
#[derive(Clone)]
pub struct Services {
    pub presets: Rc<dyn PresetMatcher>,
    pub l10n: Rc<dyn Localizer>,
    pub map: Rc<dyn MapNavigator>,
    pub storage: Rc<dyn PersistentStore>,
    pub notes: Option<Rc<dyn NoteService>>,
    pub qa: Option<Rc<dyn QaService>>,
    pub geocoder: Option<Rc<dyn Geocoder>>,
    pub features: Option<Rc<dyn FeatureSource>>,
}

impl Services {
    #[must_use]
    pub fn new(
        presets: Rc<dyn PresetMatcher>,
        l10n: Rc<dyn Localizer>,
        map: Rc<dyn MapNavigator>,
        storage: Rc<dyn PersistentStore>,
    ) -> Self {
        Self {
            presets,
            l10n,
            map,
            storage,
            notes: None,
            qa: None,
            geocoder: None,
            features: None,
        }
    }

    #[must_use]
    pub fn with_notes(mut self, notes: Rc<dyn NoteService>) -> Self {
        self.notes = Some(notes);
        self
    }

    #[must_use]
    pub fn with_qa(mut self, qa: Rc<dyn QaService>) -> Self {
        self.qa = Some(qa);
        self
    }

    #[must_use]
    pub fn with_geocoder(mut self, geocoder: Rc<dyn Geocoder>) -> Self {
        self.geocoder = Some(geocoder);
        self
    }

    #[must_use]
    pub fn with_features(mut self, features: Rc<dyn FeatureSource>) -> Self {
        self.features = Some(features);
        self
    }
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services")
            .field("notes", &self.notes.is_some())
            .field("qa", &self.qa.is_some())
            .field("geocoder", &self.geocoder.is_some())
            .field("features", &self.features.is_some())
            .finish_non_exhaustive()
    }
}

/// Built-in English strings.
#[derive(Debug, Clone)]
pub struct EnglishLocalizer {
    strings: BTreeMap<&'static str, &'static str>,
    rtl: bool,
}

const ENGLISH: &[(&str, &str)] = &[
    ("inspector.location", "Location"),
    ("inspector.node", "Node"),
    ("inspector.way", "Way"),
    ("inspector.relation", "Relation"),
    ("inspector.feature_list", "Search Features"),
    ("inspector.search", "Search"),
    ("inspector.unknown", "Unknown"),
    ("inspector.edit", "Edit feature"),
    ("inspector.view", "View feature"),
    ("inspector.choose", "Select feature type"),
    ("inspector.tooltip", "Toggle the sidebar"),
    ("inspector.key", "`"),
    ("note.note", "Note"),
    ("note.anonymous", "anonymous"),
    ("note.new", "New Note"),
    ("note.comment", "Comment"),
    ("geocoder.search", "Search worldwide"),
    ("geocoder.searching", "Searching…"),
    ("geocoder.no_results_worldwide", "No results found"),
    ("geocoder.failed", "Search failed. Try again?"),
    ("qa.keepRight.title", "KeepRight Error"),
    ("qa.osmose.title", "Osmose Issue"),
    ("qa.maproulette.title", "MapRoulette Task"),
    ("map_data.title", "Custom Data"),
    ("rapid_feature_inspector.title", "Suggested Feature"),
    ("overture_inspector.title", "Overture Place"),
    ("mapillary.detection", "Detected {type}"),
];

impl EnglishLocalizer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            strings: ENGLISH.iter().copied().collect(),
            rtl: false,
        }
    }

    /// Builder: pretend to be a right-to-left locale.
    #[must_use]
    pub fn rtl(mut self, rtl: bool) -> Self {
        self.rtl = rtl;
        self
    }
}

impl Default for EnglishLocalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Localizer for EnglishLocalizer {
    fn t(&self, key: &str, params: &[(&str, &str)]) -> String {
        let mut out = self.strings.get(key).map_or(key, |s| *s).to_owned();
        for (name, value) in params {
            out = out.replace(&format!("{{{name}}}"), value);
        }
        out
    }

    fn display_name(&self, tags: &Tags) -> Option<String> {
        tags.get("name")
            .or_else(|| tags.get("ref"))
            .or_else(|| tags.get("brand"))
            .filter(|s| !s.is_empty())
            .cloned()
    }

    fn display_type(&self, kind: EntityKind) -> String {
        self.t(&format!("inspector.{}", kind.as_str()), &[])
    }

    fn is_rtl(&self) -> bool {
        self.rtl
    }
}

/// Matches on a single tag: `key=value` rules first, then `key=*` rules.
#[derive(Debug, Clone, Default)]
pub struct TagPresetMatcher {
    exact: BTreeMap<(String, String), Preset>,
    by_key: BTreeMap<String, Preset>,
}

impl TagPresetMatcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: `"amenity/cafe"` matches `amenity=cafe`, `"building"` matches
    /// any `building=*`.
    #[must_use]
    pub fn with_preset(mut self, id: &str, name: &str) -> Self {
        let preset = Preset::new(id, name);
        match id.split_once('/') {
            Some((k, v)) => {
                self.exact.insert((k.to_owned(), v.to_owned()), preset);
            }
            None => {
                self.by_key.insert(id.to_owned(), preset);
            }
        }
        self
    }

    /// A handful of common presets, enough for a demo session.
    #[must_use]
    pub fn common() -> Self {
        Self::new()
            .with_preset("amenity/cafe", "Cafe")
            .with_preset("amenity/restaurant", "Restaurant")
            .with_preset("shop", "Shop")
            .with_preset("building", "Building")
            .with_preset("highway/residential", "Residential Road")
            .with_preset("highway", "Road")
            .with_preset("place/city", "City")
            .with_preset("place", "Place")
            .with_preset("boundary/administrative", "Administrative Boundary")
    }
}

impl PresetMatcher for TagPresetMatcher {
    fn match_entity(&self, entity: &Entity, _graph: &Graph) -> Option<Preset> {
        entity
            .tags
            .iter()
            .find_map(|(k, v)| self.exact.get(&(k.clone(), v.clone())))
            .or_else(|| entity.tags.keys().find_map(|k| self.by_key.get(k)))
            .cloned()
    }
}
