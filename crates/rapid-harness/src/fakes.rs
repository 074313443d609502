#![forbid(unsafe_code)]

//! In-memory collaborators.
//!
//! Asynchronous fakes never answer on their own. Requests queue up until the
//! test resolves them, which is how out-of-order and stale responses are
//! reproduced deterministically.

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};

use rapid_core::{
    AiFeature, Callback, CustomFeature, Detection, EntityId, FeatureSource, GeocodeResult,
    Geocoder, LatLon, MapNavigator, Note, NoteId, NoteService, OvertureFeature, QaItem, QaService,
    QaSource, ServiceError,
};

/// Map that writes every command to a log.
#[derive(Debug, Default)]
pub struct RecordingMap {
    calls: RefCell<Vec<String>>,
}

impl RecordingMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    /// Return the log and start a fresh one.
    pub fn take_calls(&self) -> Vec<String> {
        std::mem::take(&mut *self.calls.borrow_mut())
    }

    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }
}

impl MapNavigator for RecordingMap {
    fn center_zoom_ease(&self, loc: LatLon, zoom: f64) {
        self.record(format!("center {:.4},{:.4} z{zoom}", loc.lon, loc.lat));
    }

    fn select_entity_id(&self, id: EntityId, fit: bool) {
        self.record(format!("select {id} fit={fit}"));
    }

    fn enable_layer(&self, layer: &str) {
        self.record(format!("layer {layer}"));
    }

    fn highlight_entities(&self, ids: &[EntityId], highlighted: bool) {
        let ids: Vec<String> = ids.iter().map(ToString::to_string).collect();
        self.record(format!("highlight {} {highlighted}", ids.join(",")));
    }
}

type PendingSearch = (String, Callback<Vec<GeocodeResult>>);

/// Geocoder whose responses the test delivers by hand.
#[derive(Default)]
pub struct ScriptedGeocoder {
    pending: RefCell<VecDeque<PendingSearch>>,
    requests: RefCell<Vec<String>>,
}

impl std::fmt::Debug for ScriptedGeocoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptedGeocoder")
            .field("pending", &self.pending.borrow().len())
            .field("requests", &self.requests.borrow())
            .finish()
    }
}

impl ScriptedGeocoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every query ever sent, in order.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }

    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Answer the oldest outstanding request for `query`.
    pub fn respond(&self, query: &str, results: Vec<GeocodeResult>) -> bool {
        match self.take(query) {
            Some(done) => {
                done(Ok(results));
                true
            }
            None => false,
        }
    }

    /// Fail the oldest outstanding request for `query`.
    pub fn fail_next(&self, query: &str, message: &str) -> bool {
        match self.take(query) {
            Some(done) => {
                done(Err(ServiceError::Request(message.to_owned())));
                true
            }
            None => false,
        }
    }

    fn take(&self, query: &str) -> Option<Callback<Vec<GeocodeResult>>> {
        let mut pending = self.pending.borrow_mut();
        let at = pending.iter().position(|(q, _)| q == query)?;
        pending.remove(at).map(|(_, done)| done)
    }
}

impl Geocoder for ScriptedGeocoder {
    fn search(&self, query: &str, done: Callback<Vec<GeocodeResult>>) {
        self.requests.borrow_mut().push(query.to_owned());
        self.pending.borrow_mut().push_back((query.to_owned(), done));
    }
}

/// Notes cache plus a pretend server behind it.
#[derive(Default)]
pub struct MemoryNotes {
    cached: RefCell<BTreeMap<NoteId, Note>>,
    server: RefCell<BTreeMap<NoteId, Note>>,
    loads: RefCell<VecDeque<(NoteId, Callback<()>)>>,
}

impl std::fmt::Debug for MemoryNotes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryNotes")
            .field("cached", &self.cached.borrow().len())
            .field("server", &self.server.borrow().len())
            .field("loads", &self.loads.borrow().len())
            .finish()
    }
}

impl MemoryNotes {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a note straight into the cache (or replace the cached copy).
    pub fn put(&self, note: Note) {
        self.cached.borrow_mut().insert(note.id, note);
    }

    /// Make a note downloadable without caching it.
    pub fn put_on_server(&self, note: Note) {
        self.server.borrow_mut().insert(note.id, note);
    }

    pub fn evict(&self, id: NoteId) {
        self.cached.borrow_mut().remove(&id);
    }

    #[must_use]
    pub fn pending_loads(&self) -> usize {
        self.loads.borrow().len()
    }

    /// Complete the oldest outstanding load of `id`.
    pub fn finish_load(&self, id: NoteId) -> bool {
        let done = {
            let mut loads = self.loads.borrow_mut();
            let Some(at) = loads.iter().position(|(n, _)| *n == id) else {
                return false;
            };
            loads.remove(at).map(|(_, done)| done)
        };
        let Some(done) = done else {
            return false;
        };
        let fetched = self.server.borrow().get(&id).cloned();
        match fetched {
            Some(note) => {
                self.put(note);
                done(Ok(()));
            }
            None => done(Err(ServiceError::NotFound(format!("note {id}")))),
        }
        true
    }
}

impl NoteService for MemoryNotes {
    fn get_note(&self, id: NoteId) -> Option<Note> {
        self.cached.borrow().get(&id).cloned()
    }

    fn load_note(&self, id: NoteId, done: Callback<()>) {
        self.loads.borrow_mut().push_back((id, done));
    }
}

/// QA issue cache.
#[derive(Debug, Default)]
pub struct MemoryQa {
    items: RefCell<BTreeMap<(QaSource, String), QaItem>>,
}

impl MemoryQa {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, item: QaItem) {
        self.items
            .borrow_mut()
            .insert((item.service, item.id.clone()), item);
    }

    pub fn remove(&self, source: QaSource, id: &str) {
        self.items.borrow_mut().remove(&(source, id.to_owned()));
    }
}

impl QaService for MemoryQa {
    fn get_item(&self, source: QaSource, id: &str) -> Option<QaItem> {
        self.items.borrow().get(&(source, id.to_owned())).cloned()
    }
}

/// Custom data, AI suggestions, Overture places and detections.
#[derive(Debug, Default)]
pub struct MemoryFeatures {
    custom: RefCell<BTreeMap<String, CustomFeature>>,
    ai: RefCell<BTreeMap<(String, String), AiFeature>>,
    overture: RefCell<BTreeMap<(String, String), OvertureFeature>>,
    detections: RefCell<BTreeMap<String, Detection>>,
}

impl MemoryFeatures {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_custom(&self, feature: CustomFeature) {
        self.custom
            .borrow_mut()
            .insert(feature.feature_hash.clone(), feature);
    }

    pub fn remove_custom(&self, feature_hash: &str) {
        self.custom.borrow_mut().remove(feature_hash);
    }

    pub fn put_ai(&self, feature: AiFeature) {
        self.ai
            .borrow_mut()
            .insert((feature.dataset_id.clone(), feature.id.clone()), feature);
    }

    pub fn remove_ai(&self, dataset_id: &str, id: &str) {
        self.ai
            .borrow_mut()
            .remove(&(dataset_id.to_owned(), id.to_owned()));
    }

    pub fn put_overture(&self, feature: OvertureFeature) {
        self.overture
            .borrow_mut()
            .insert((feature.dataset_id.clone(), feature.id.clone()), feature);
    }

    pub fn put_detection(&self, detection: Detection) {
        self.detections
            .borrow_mut()
            .insert(detection.key.clone(), detection);
    }
}

impl FeatureSource for MemoryFeatures {
    fn custom_feature(&self, feature_hash: &str) -> Option<CustomFeature> {
        self.custom.borrow().get(feature_hash).cloned()
    }

    fn ai_feature(&self, dataset_id: &str, id: &str) -> Option<AiFeature> {
        self.ai
            .borrow()
            .get(&(dataset_id.to_owned(), id.to_owned()))
            .cloned()
    }

    fn overture_feature(&self, dataset_id: &str, id: &str) -> Option<OvertureFeature> {
        self.overture
            .borrow()
            .get(&(dataset_id.to_owned(), id.to_owned()))
            .cloned()
    }

    fn detection(&self, key: &str) -> Option<Detection> {
        self.detections.borrow().get(key).cloned()
    }
}
