#![forbid(unsafe_code)]

//! Core: geo primitives, graph snapshots, selection payloads and the
//! collaborator seams consumed by the sidebar and the feature search.
//!
//! # Role in Rapid
//! `rapid-core` is the shared vocabulary. The router (`rapid-sidebar`) and the
//! search engine (`rapid-search`) never talk to each other directly; both
//! consume the types defined here and the host application wires them
//! together through the `rapid` facade.
//!
//! # Primary responsibilities
//! - **Geo**: [`LatLon`], [`Extent`] and the ranking distance.
//! - **Graph**: a two-layer (base + local) entity graph with deletion markers.
//! - **Payloads**: the [`SelectionPayload`] sum type and its identity keys.
//! - **Services**: traits for the editor collaborators (presets, notes, QA,
//!   geocoding, map navigation, durable storage).
//! - **Scheduling**: a single [`Coalescer`] used for every throttle/debounce.

pub mod dms;
pub mod error;
pub mod geo;
pub mod graph;
pub mod id;
pub mod payload;
pub mod schedule;
pub mod services;
pub mod store;

pub use error::{ConfigError, GraphError, ServiceError, StoreError};
pub use geo::{Extent, LatLon, spherical_distance};
pub use graph::{Entity, Geometry, Graph, GraphHandle, Tags};
pub use id::{EntityId, EntityKind, NoteId};
pub use payload::{
    AiFeature, CustomFeature, Detection, Note, NoteComment, NoteStatus, OvertureFeature,
    PayloadKey, QaItem, QaSource, SelectionPayload,
};
pub use schedule::{CoalescePolicy, Coalescer};
pub use services::{
    Callback, EnglishLocalizer, FeatureSource, GeocodeResult, Geocoder, Localizer, MapNavigator,
    NoteService, Preset, PresetMatcher, QaService, Services, TagPresetMatcher,
};
pub use store::{JsonFileStore, MemoryStore, PersistentStore};
