#![forbid(unsafe_code)]

//! A sidebar session: the router, its search box and the host's graph.
//!
//! # Design
//!
//! [`Ui`] is what a host embeds. It translates editor notifications (mode
//! changes, map hover and selection, graph edits, collaborator refreshes)
//! into router calls and exposes one [`Ui::tick`] for all timed and
//! asynchronous work. The host drives the clock; nothing here spawns threads
//! or timers.
//!
//! # Usage
//!
//! ```
//! use rapid::{Ui, UiConfig};
//! use rapid_core::{EntityId, Graph, GraphHandle, SelectionPayload};
//! use rapid_harness::{Fixture, cafe_at};
//! use rapid_sidebar::Mount;
//!
//! let fx = Fixture::new();
//! let graph = GraphHandle::new(Graph::with_base([cafe_at(1, "Corner Cafe", 0.0, 0.0)]));
//! let mut ui = Ui::new(fx.services(), graph, UiConfig::default()).unwrap();
//! ui.mount(Mount::new("sidebar"));
//! ui.select(Some(SelectionPayload::entity(EntityId::node(1))));
//! assert!(ui.render().is_some_and(|t| t.find("inspector-wrap").is_some()));
//! ```

use std::collections::HashSet;
use std::path::Path;
use std::rc::Rc;

use rapid_core::{
    ConfigError, EntityId, Graph, GraphHandle, JsonFileStore, LatLon, MemoryStore, PayloadKey,
    PersistentStore, SelectionPayload, Services,
};
use rapid_sidebar::{EnterOptions, InteractionMode, Mount, SidebarRouter, ViewNode};
use web_time::Instant;

use crate::config::UiConfig;

pub struct Ui {
    config: UiConfig,
    graph: GraphHandle,
    router: SidebarRouter,
}

impl std::fmt::Debug for Ui {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ui")
            .field("config", &self.config)
            .field("router", &self.router)
            .finish_non_exhaustive()
    }
}

impl Ui {
    /// Build a session. Fails only when `config` does not validate.
    pub fn new(services: Services, graph: GraphHandle, config: UiConfig) -> Result<Self, ConfigError> {
        let config = config.checked()?;
        let router = SidebarRouter::new(
            services,
            graph.clone(),
            config.sidebar.clone(),
            config.search.clone(),
        );
        tracing::debug!(message = "ui.new", entities = graph.snapshot().len());
        Ok(Self {
            config,
            graph,
            router,
        })
    }

    #[must_use]
    pub fn config(&self) -> &UiConfig {
        &self.config
    }

    #[must_use]
    pub fn graph(&self) -> &GraphHandle {
        &self.graph
    }

    #[must_use]
    pub fn router(&self) -> &SidebarRouter {
        &self.router
    }

    pub fn router_mut(&mut self) -> &mut SidebarRouter {
        &mut self.router
    }

    /// Attach the sidebar container and draw into it.
    pub fn mount(&mut self, mount: Mount) -> Option<&ViewNode> {
        self.router.render(Some(mount))
    }

    /// Redraw into the attached container.
    pub fn render(&mut self) -> Option<&ViewNode> {
        self.router.render(None)
    }

    // ── Editor notifications ────────────────────────────────────────────

    pub fn mode_changed(&mut self, mode: InteractionMode) {
        self.router.set_mode(mode);
    }

    pub fn hover(&mut self, payload: Option<SelectionPayload>, now: Instant) {
        self.router.hover(payload, now);
    }

    pub fn select(&mut self, payload: Option<SelectionPayload>) {
        self.router.enter(payload);
    }

    /// The user just drew `id`.
    pub fn select_new_feature(&mut self, id: EntityId) {
        self.router.enter_with(
            Some(SelectionPayload::entity(id)),
            EnterOptions { new_feature: true },
        );
    }

    /// The map moved; local matches rank by distance from here.
    pub fn viewport_moved(&mut self, center: LatLon) {
        self.router.search_mut().set_viewport_center(center);
    }

    /// The host replaced the graph (edit, undo, download).
    ///
    /// `changed` lists the entities whose state differs from the previous
    /// snapshot.
    pub fn graph_changed(&mut self, graph: Graph, changed: impl IntoIterator<Item = EntityId>) {
        self.graph.publish(graph);
        let keys: HashSet<PayloadKey> = changed.into_iter().map(PayloadKey::Entity).collect();
        self.router.on_external_data_refresh(&keys);
    }

    /// A collaborator (notes, QA, custom data) refreshed its cache.
    pub fn data_refreshed(&mut self, changed: &HashSet<PayloadKey>) {
        self.router.on_external_data_refresh(changed);
    }

    /// Run due timers and apply finished asynchronous work.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.router.tick(now)
    }

    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.router.next_deadline()
    }

    // ── User input ──────────────────────────────────────────────────────

    pub fn key(&mut self, key: &str) -> bool {
        self.router.handle_key(key)
    }

    pub fn search_input(&mut self, value: &str, now: Instant) {
        self.router.search_input(value, now);
    }

    pub fn search_submit(&mut self) {
        self.router.submit_search();
    }
}

/// Open the preference store at `path`, falling back to memory.
///
/// A missing file is a fresh store. A corrupted or incompatible file is
/// logged at `warn` and replaced by an in-memory store for this session, so
/// the sidebar still works with default layout.
pub fn open_store(path: impl AsRef<Path>) -> Rc<dyn PersistentStore> {
    let path = path.as_ref();
    match JsonFileStore::open(path) {
        Ok(store) => Rc::new(store),
        Err(err) => {
            tracing::warn!(
                message = "store.open_failed",
                path = %path.display(),
                error = %err
            );
            Rc::new(MemoryStore::new())
        }
    }
}
