#![forbid(unsafe_code)]

//! The feature search engine behind the sidebar's search box.
//!
//! # Design
//!
//! A query is evaluated synchronously against five sources, each producing
//! one [`RankGroup`]:
//!
//! 0. a coordinate pair typed by the user,
//! 1. an OSM id (`n123`, `way 42`, `note 7`) unless a coordinate matched,
//! 2. entities in the current graph whose display name contains the query,
//!    capped and then ordered by distance from the viewport center,
//! 3. the last geocoder response, if it belongs to this query,
//! 4. for all-digit queries, the number read as node, way, relation and note.
//!
//! Groups are concatenated in that order; there is no global sort.
//!
//! The geocoder is asynchronous. Its callback only posts into a channel;
//! [`FeatureSearch::pump`] drains the channel on the UI tick and applies a
//! response only when it answers the latest request.
//!
//! # Failure Modes
//!
//! - A geocoder error reads as zero remote results plus a retry affordance.
//! - A note that fails to load leaves the map where it is.
//! - Malformed id or coordinate fragments simply do not match.

use std::sync::mpsc::{self, Receiver, Sender};

use rapid_core::{
    Coalescer, Entity, EntityId, EntityKind, Extent, GeocodeResult, Graph, GraphHandle, LatLon,
    Note, NoteId, SelectionPayload, ServiceError, Services, Tags, spherical_distance,
};
use web_time::Instant;

use crate::config::SearchConfig;
use crate::coords::parse_location;
use crate::osm_id::{IdMatch, is_numeric, match_id};
use crate::remote::{RemoteState, RemoteStatus};
use crate::result::{RankGroup, ResultGeometry, ResultTarget, SearchResult, is_valid_color};

/// Outcome of activating (clicking) a result row.
#[derive(Debug, Clone, PartialEq)]
pub enum Activation {
    /// The map was told to move or select; nothing else to do.
    Navigated,
    /// The sidebar should show this payload.
    Select(SelectionPayload),
    /// Waiting on a download; a later [`SearchEvent::Select`] may follow.
    Pending,
    /// No collaborator could handle the row.
    Ignored,
}

/// Produced by [`FeatureSearch::pump`].
#[derive(Debug, Clone, PartialEq)]
pub enum SearchEvent {
    /// The visible list changed (a geocode response landed).
    ResultsChanged,
    /// A lazily loaded note is ready and should be selected.
    Select(SelectionPayload),
}

/// Which helper rows the list shows besides the results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListStatus {
    /// A geocode request is in flight for this query.
    pub searching: bool,
    /// Nothing matched and nothing is pending.
    pub no_results: bool,
    /// The worldwide search has not been run for this query yet.
    pub offer_geocode: bool,
    /// The last worldwide search failed.
    pub offer_retry: bool,
}

enum Completion {
    Geocode {
        seq: u64,
        query: String,
        outcome: Result<Vec<GeocodeResult>, ServiceError>,
    },
    NoteLoaded {
        activation: u64,
        id: NoteId,
        outcome: Result<(), ServiceError>,
    },
}

/// Search state for one feature list.
pub struct FeatureSearch {
    services: Services,
    graph: GraphHandle,
    config: SearchConfig,
    value: String,
    center: LatLon,
    remote: RemoteState,
    auto_geocode: Coalescer<String>,
    activation: u64,
    tx: Sender<Completion>,
    rx: Receiver<Completion>,
}

impl std::fmt::Debug for FeatureSearch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeatureSearch")
            .field("value", &self.value)
            .field("center", &self.center)
            .field("remote", self.remote.status())
            .field("activation", &self.activation)
            .finish_non_exhaustive()
    }
}

impl FeatureSearch {
    #[must_use]
    pub fn new(services: Services, graph: GraphHandle, config: SearchConfig) -> Self {
        let (tx, rx) = mpsc::channel();
        let remote = RemoteState::new(services.geocoder.is_some());
        let auto_geocode = Coalescer::debounce(config.geocode_debounce());
        Self {
            services,
            graph,
            config,
            value: String::new(),
            center: LatLon::default(),
            remote,
            auto_geocode,
            activation: 0,
            tx,
            rx,
        }
    }

    #[must_use]
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Raw text in the search box.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// The normalized query the engine evaluates.
    #[must_use]
    pub fn query(&self) -> String {
        normalize(&self.value)
    }

    pub fn set_viewport_center(&mut self, center: LatLon) {
        self.center = center;
    }

    #[must_use]
    pub fn viewport_center(&self) -> LatLon {
        self.center
    }

    #[must_use]
    pub fn remote_status(&self) -> &RemoteStatus {
        self.remote.status()
    }

    /// Input handler: the user edited the search box.
    pub fn set_query(&mut self, value: &str, now: Instant) {
        let before = self.query();
        self.value = value.to_owned();
        let query = self.query();
        if query == before {
            return;
        }
        self.remote.invalidate();
        self.auto_geocode.cancel();
        if self.config.auto_geocode && !query.is_empty() && self.services.geocoder.is_some() {
            self.auto_geocode.push(query.clone(), now);
        }
        tracing::trace!(message = "search.input", query = %query);
    }

    /// Empty the box, e.g. when the editor changes mode.
    pub fn clear(&mut self) {
        self.value.clear();
        self.remote.invalidate();
        self.auto_geocode.cancel();
        self.activation += 1;
        tracing::debug!(message = "search.clear");
    }

    /// Run the worldwide search for the current query.
    ///
    /// Returns false when there is no query or no geocoder.
    pub fn request_geocode(&mut self) -> bool {
        let query = self.query();
        let Some(geocoder) = self.services.geocoder.clone() else {
            return false;
        };
        if query.is_empty() {
            return false;
        }
        let seq = self.remote.begin();
        tracing::debug!(message = "search.geocode.request", seq, query = %query);
        let tx = self.tx.clone();
        let request_query = query.clone();
        geocoder.search(
            &query,
            Box::new(move |outcome| {
                // The receiver lives as long as the engine; a send error
                // means the engine is gone and nobody is waiting.
                let _ = tx.send(Completion::Geocode {
                    seq,
                    query: request_query,
                    outcome,
                });
            }),
        );
        true
    }

    /// Retry affordance: re-run a failed worldwide search.
    pub fn retry(&mut self) -> bool {
        if matches!(self.remote.status(), RemoteStatus::Failed { .. }) {
            self.request_geocode()
        } else {
            false
        }
    }

    /// When the next [`pump`](Self::pump) has timed work to do.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.auto_geocode.next_deadline()
    }

    /// Fire due timers and apply completed remote work.
    pub fn pump(&mut self, now: Instant) -> Vec<SearchEvent> {
        if let Some(query) = self.auto_geocode.poll(now) {
            if query == self.query() {
                self.request_geocode();
            }
        }

        let mut events = Vec::new();
        while let Ok(completion) = self.rx.try_recv() {
            match completion {
                Completion::Geocode {
                    seq,
                    query,
                    outcome,
                } => {
                    let count = outcome.as_ref().map_or(0, Vec::len);
                    let failed = outcome.is_err();
                    let outcome = outcome.map_err(|e| e.to_string());
                    if self.remote.complete(seq, query, outcome) {
                        tracing::debug!(message = "search.geocode.apply", seq, count, failed);
                        events.push(SearchEvent::ResultsChanged);
                    } else {
                        tracing::debug!(
                            message = "search.geocode.stale",
                            seq,
                            latest = self.remote.latest_seq()
                        );
                    }
                }
                Completion::NoteLoaded {
                    activation,
                    id,
                    outcome,
                } => {
                    if activation != self.activation {
                        tracing::debug!(message = "search.note.stale", note = %id);
                        continue;
                    }
                    if let Err(err) = outcome {
                        tracing::warn!(message = "search.note.load_failed", note = %id, error = %err);
                        continue;
                    }
                    let note = self
                        .services
                        .notes
                        .as_ref()
                        .and_then(|notes| notes.get_note(id));
                    if let Some(note) = note {
                        events.push(SearchEvent::Select(self.select_note(note)));
                    }
                }
            }
        }
        events
    }

    /// Results for the current query.
    #[must_use]
    pub fn results(&self) -> Vec<SearchResult> {
        self.search(&self.query())
    }

    /// Evaluate `query` against every source.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<SearchResult> {
        let q = normalize(query);
        if q.is_empty() {
            return Vec::new();
        }
        let mut results = Vec::new();

        let location = parse_location(&q, self.services.l10n.as_ref());
        if let Some(loc) = location {
            results.push(self.coordinate_result(loc));
        } else if let Some(id) = match_id(&q) {
            results.push(self.id_result(id));
        }

        results.extend(self.local_matches(&q));
        results.extend(self.geocode_matches(&q));

        if is_numeric(&q) {
            results.extend(self.speculative_matches(&q));
        }
        results
    }

    /// Helper rows for a result list produced from the current query.
    #[must_use]
    pub fn list_status(&self, results: &[SearchResult]) -> ListStatus {
        if self.query().is_empty() {
            return ListStatus::default();
        }
        // A debounced request for this query counts as in flight.
        let scheduled = self.auto_geocode.has_pending();
        let searching =
            scheduled || matches!(self.remote.status(), RemoteStatus::Pending { .. });
        ListStatus {
            searching,
            no_results: results.is_empty() && !searching,
            offer_geocode: !scheduled && matches!(self.remote.status(), RemoteStatus::Idle),
            offer_retry: matches!(self.remote.status(), RemoteStatus::Failed { .. }),
        }
    }

    /// Click handler for a result row.
    pub fn activate(&mut self, result: &SearchResult) -> Activation {
        self.activation += 1;
        let map = &self.services.map;
        match result.target {
            ResultTarget::Location(loc) => {
                map.center_zoom_ease(loc, self.config.select_zoom);
                Activation::Navigated
            }
            ResultTarget::Entity(id) => {
                map.highlight_entities(&[id], false);
                map.select_entity_id(id, true);
                Activation::Navigated
            }
            ResultTarget::Note(id) => {
                let Some(notes) = self.services.notes.clone() else {
                    tracing::debug!(message = "search.note.no_service", note = %id);
                    return Activation::Ignored;
                };
                if let Some(note) = notes.get_note(id) {
                    return Activation::Select(self.select_note(note));
                }
                let tx = self.tx.clone();
                let activation = self.activation;
                notes.load_note(
                    id,
                    Box::new(move |outcome| {
                        let _ = tx.send(Completion::NoteLoaded {
                            activation,
                            id,
                            outcome,
                        });
                    }),
                );
                Activation::Pending
            }
        }
    }

    /// Enter key: activate the first row, if any.
    pub fn submit(&mut self) -> Activation {
        match self.results().into_iter().next() {
            Some(first) => self.activate(&first),
            None => Activation::Ignored,
        }
    }

    /// Pointer entered or left a row.
    pub fn hover_result(&self, result: &SearchResult, entering: bool) {
        if let Some(id) = result.entity_id() {
            self.services.map.highlight_entities(&[id], entering);
        }
    }

    fn select_note(&self, note: Note) -> SelectionPayload {
        let map = &self.services.map;
        map.enable_layer("notes");
        map.center_zoom_ease(note.loc, self.config.select_zoom);
        SelectionPayload::Note(note)
    }

    fn coordinate_result(&self, loc: LatLon) -> SearchResult {
        let l10n = &self.services.l10n;
        SearchResult {
            target: ResultTarget::Location(loc),
            geometry: ResultGeometry::Point,
            label: l10n.dms_coordinate_pair(loc),
            kind_label: l10n.t("inspector.location", &[]),
            group: RankGroup::Coordinate,
            distance: None,
            extent: None,
            color: None,
        }
    }

    fn id_result(&self, id: IdMatch) -> SearchResult {
        let l10n = &self.services.l10n;
        match id {
            IdMatch::Entity(id) => SearchResult {
                target: ResultTarget::Entity(id),
                geometry: kind_geometry(id.kind()),
                label: id.num().to_string(),
                kind_label: l10n.display_type(id.kind()),
                group: RankGroup::IdMatch,
                distance: None,
                extent: None,
                color: None,
            },
            IdMatch::Note(id) => SearchResult {
                target: ResultTarget::Note(id),
                geometry: ResultGeometry::Note,
                label: id.to_string(),
                kind_label: l10n.t("note.note", &[]),
                group: RankGroup::IdMatch,
                distance: None,
                extent: None,
                color: None,
            },
        }
    }

    fn local_matches(&self, q: &str) -> Vec<SearchResult> {
        let graph = self.graph.snapshot();
        let l10n = &self.services.l10n;
        let presets = &self.services.presets;
        let cap = self.config.local_result_cap;

        let mut out = Vec::new();
        for id in graph.all_ids() {
            if graph.is_deleted_locally(id) {
                continue;
            }
            let Some(entity) = graph.has_entity(id) else {
                continue;
            };
            let Some(name) = l10n.display_name(&entity.tags) else {
                continue;
            };
            if !name.to_lowercase().contains(q) {
                continue;
            }
            let kind_label = presets
                .match_entity(entity, &graph)
                .map(|p| p.name().to_owned())
                .unwrap_or_else(|| l10n.display_type(entity.kind()));
            let extent = graph.extent(entity);
            let distance = extent.map_or(0.0, |e| spherical_distance(self.center, e.center()));
            out.push(SearchResult {
                target: ResultTarget::Entity(entity.id),
                geometry: graph.geometry(entity).into(),
                label: name,
                kind_label,
                group: RankGroup::Local,
                distance: Some(distance),
                extent,
                color: relation_color(entity),
            });
            if out.len() >= cap {
                tracing::debug!(message = "search.local.capped", cap);
                break;
            }
        }
        out.sort_by(|a, b| {
            a.distance
                .unwrap_or(0.0)
                .total_cmp(&b.distance.unwrap_or(0.0))
        });
        out
    }

    fn geocode_matches(&self, q: &str) -> Vec<SearchResult> {
        let l10n = &self.services.l10n;
        let presets = &self.services.presets;
        self.remote
            .results_for(q)
            .iter()
            .filter_map(|d| {
                let (Some(osm_type), Some(osm_id)) = (d.osm_type.as_deref(), d.osm_id) else {
                    return None;
                };
                if osm_id == 0 {
                    return None;
                }
                let id = EntityId::from_osm(osm_type, osm_id)?;
                // Preset matching needs an entity; this one never enters the real graph.
                let temp = temp_entity(id, &d.class, &d.kind);
                let temp_graph = Graph::with_base([temp.clone()]);
                let kind_label = presets
                    .match_entity(&temp, &temp_graph)
                    .map(|p| p.name().to_owned())
                    .unwrap_or_else(|| l10n.display_type(id.kind()));
                Some(SearchResult {
                    target: ResultTarget::Entity(id),
                    geometry: temp_graph.geometry(&temp).into(),
                    label: d.display_name.clone(),
                    kind_label,
                    group: RankGroup::Geocode,
                    distance: None,
                    extent: Extent::from_bounding_box(&d.boundingbox),
                    color: None,
                })
            })
            .collect()
    }

    fn speculative_matches(&self, q: &str) -> Vec<SearchResult> {
        let Ok(num) = q.parse::<i64>() else {
            tracing::debug!(message = "search.speculative.overflow", query = %q);
            return Vec::new();
        };
        let l10n = &self.services.l10n;
        let row = |target, geometry, kind_label: String| SearchResult {
            target,
            geometry,
            label: q.to_owned(),
            kind_label,
            group: RankGroup::Speculative,
            distance: None,
            extent: None,
            color: None,
        };
        vec![
            row(
                ResultTarget::Entity(EntityId::node(num)),
                ResultGeometry::Point,
                l10n.t("inspector.node", &[]),
            ),
            row(
                ResultTarget::Entity(EntityId::way(num)),
                ResultGeometry::Line,
                l10n.t("inspector.way", &[]),
            ),
            row(
                ResultTarget::Entity(EntityId::relation(num)),
                ResultGeometry::Relation,
                l10n.t("inspector.relation", &[]),
            ),
            row(
                ResultTarget::Note(NoteId(num)),
                ResultGeometry::Note,
                l10n.t("note.note", &[]),
            ),
        ]
    }
}

fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

fn kind_geometry(kind: EntityKind) -> ResultGeometry {
    match kind {
        EntityKind::Node => ResultGeometry::Point,
        EntityKind::Way => ResultGeometry::Line,
        EntityKind::Relation => ResultGeometry::Relation,
    }
}

fn relation_color(entity: &Entity) -> Option<String> {
    if entity.kind() != EntityKind::Relation {
        return None;
    }
    entity
        .tags
        .get("colour")
        .filter(|c| is_valid_color(c))
        .cloned()
}

/// An entity tagged `class=type`. Ways get a fake closed node list so they
/// can classify as areas.
fn temp_entity(id: EntityId, class: &str, kind: &str) -> Entity {
    let mut tags = Tags::new();
    if !class.is_empty() {
        tags.insert(class.to_owned(), kind.to_owned());
    }
    let nodes = match id.kind() {
        EntityKind::Way => vec![EntityId::node(0), EntityId::node(0)],
        _ => Vec::new(),
    };
    Entity {
        id,
        tags,
        loc: None,
        nodes,
        members: Vec::new(),
    }
}
