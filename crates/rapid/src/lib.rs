#![forbid(unsafe_code)]

//! Rapid sidebar public facade.
//!
//! This crate is the surface a host editor embeds. It re-exports the types
//! of the internal crates, wires them into a [`Ui`] session, and owns the
//! startup concerns: configuration files and logging.
//!
//! # Crates
//!
//! | crate           | contents                                               |
//! |-----------------|--------------------------------------------------------|
//! | `rapid-core`    | geo, graph, payloads, collaborator traits, stores      |
//! | `rapid-search`  | coordinate and id parsing, feature search, geocoding   |
//! | `rapid-sidebar` | content router, panels, resizer                        |

pub mod config;
pub mod logging;
pub mod session;

pub use config::UiConfig;
pub use logging::{LoggingConfig, init_logging};
pub use session::{Ui, open_store};

// --- Core re-exports -------------------------------------------------------

pub use rapid_core::{
    ConfigError, Entity, EntityId, EntityKind, Extent, Graph, GraphHandle, JsonFileStore,
    LatLon, MemoryStore, Note, NoteId, PayloadKey, PersistentStore, QaItem, QaSource,
    SelectionPayload, ServiceError, Services, StoreError,
};

// --- Search re-exports -----------------------------------------------------

pub use rapid_search::{Activation, FeatureSearch, SearchConfig, SearchResult};

// --- Sidebar re-exports ----------------------------------------------------

pub use rapid_sidebar::{
    Content, InteractionMode, Mount, Pointer, ResizeOutcome, RouteMode, RouterState,
    SidebarConfig, SidebarRouter, ViewNode,
};

/// Everything a host usually needs in one import.
pub mod prelude {
    pub use crate::{
        EntityId, GraphHandle, InteractionMode, LatLon, Mount, PayloadKey, SelectionPayload,
        Services, Ui, UiConfig,
    };
}
