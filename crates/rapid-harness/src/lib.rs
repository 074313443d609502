#![forbid(unsafe_code)]

//! Test support for the Rapid sidebar crates.
//!
//! # Role in Rapid
//! Every collaborator the sidebar talks to is a trait in `rapid-core`. This
//! crate provides in-memory implementations that record what they were told
//! and let a test decide when asynchronous work completes, plus a tracing
//! layer that captures structured events for assertions.
//!
//! # Usage
//!
//! ```
//! use rapid_harness::{Fixture, cafe_at};
//! use rapid_core::{Graph, GraphHandle};
//!
//! let fx = Fixture::new();
//! let services = fx.services();
//! let graph = GraphHandle::new(Graph::with_base([cafe_at(1, "Corner Cafe", 0.0, 0.0)]));
//! assert!(services.geocoder.is_some());
//! assert_eq!(graph.snapshot().len(), 1);
//! ```

pub mod fakes;
pub mod trace;

use std::rc::Rc;

use rapid_core::{
    EnglishLocalizer, Entity, GeocodeResult, LatLon, MemoryStore, Services, TagPresetMatcher,
};

pub use fakes::{MemoryFeatures, MemoryNotes, MemoryQa, RecordingMap, ScriptedGeocoder};
pub use trace::{CapturedEvent, TraceCapture};

/// One of each fake, shared between the test and the [`Services`] it builds.
#[derive(Clone)]
pub struct Fixture {
    pub presets: Rc<TagPresetMatcher>,
    pub l10n: Rc<EnglishLocalizer>,
    pub map: Rc<RecordingMap>,
    pub store: Rc<MemoryStore>,
    pub notes: Rc<MemoryNotes>,
    pub qa: Rc<MemoryQa>,
    pub geocoder: Rc<ScriptedGeocoder>,
    pub features: Rc<MemoryFeatures>,
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

impl Fixture {
    #[must_use]
    pub fn new() -> Self {
        Self {
            presets: Rc::new(TagPresetMatcher::common()),
            l10n: Rc::new(EnglishLocalizer::new()),
            map: Rc::new(RecordingMap::new()),
            store: Rc::new(MemoryStore::new()),
            notes: Rc::new(MemoryNotes::new()),
            qa: Rc::new(MemoryQa::new()),
            geocoder: Rc::new(ScriptedGeocoder::new()),
            features: Rc::new(MemoryFeatures::new()),
        }
    }

    /// Builder: use a right-to-left localizer.
    #[must_use]
    pub fn rtl(mut self) -> Self {
        self.l10n = Rc::new(EnglishLocalizer::new().rtl(true));
        self
    }

    /// Builder: start from a pre-filled store.
    #[must_use]
    pub fn with_store(mut self, store: MemoryStore) -> Self {
        self.store = Rc::new(store);
        self
    }

    /// Services with every optional collaborator attached.
    #[must_use]
    pub fn services(&self) -> Services {
        self.bare_services()
            .with_notes(self.notes.clone())
            .with_qa(self.qa.clone())
            .with_geocoder(self.geocoder.clone())
            .with_features(self.features.clone())
    }

    /// Services with only the mandatory collaborators.
    #[must_use]
    pub fn bare_services(&self) -> Services {
        Services::new(
            self.presets.clone(),
            self.l10n.clone(),
            self.map.clone(),
            self.store.clone(),
        )
    }
}

/// A named `amenity=cafe` node.
#[must_use]
pub fn cafe_at(id: i64, name: &str, lon: f64, lat: f64) -> Entity {
    Entity::node(id, LatLon::new(lon, lat))
        .with_tag("amenity", "cafe")
        .with_tag("name", name)
}

/// A Nominatim-shaped hit.
#[must_use]
pub fn geocode_hit(osm_type: &str, osm_id: i64, class: &str, kind: &str, name: &str) -> GeocodeResult {
    GeocodeResult {
        osm_type: Some(osm_type.to_owned()),
        osm_id: Some(osm_id),
        class: class.to_owned(),
        kind: kind.to_owned(),
        display_name: name.to_owned(),
        boundingbox: Vec::new(),
    }
}
