#![forbid(unsafe_code)]

//! The sidebar content router.
//!
//! # Design
//!
//! The sidebar has one content slot. [`SidebarRouter`] decides what fills it
//! from three inputs: hover events (throttled), select events, and
//! refresh announcements from collaborators. The slot is a single
//! [`Content`] value, so at most one panel can be live; replacing it tears
//! the old panel down first.
//!
//! Every transition bumps a generation counter. Asynchronous work started
//! for a panel (a note body download) carries the generation it was started
//! under and is dropped on arrival if the slot has changed since.
//!
//! # Invariants
//!
//! 1. Select always preempts a pending hover.
//! 2. Hover is ignored while the interaction mode pins a selection.
//! 3. An inspector is only ever built for ids that resolve in the graph.
//! 4. A refresh only touches the slot when the active payload is among the
//!    changed keys, except that a vanished inspector falls back to the list.
//!
//! # Failure Modes
//!
//! Nothing here returns an error. Unrecognized payloads, stale downloads
//! and calls before a mount point exists are logged and ignored.

use std::collections::HashSet;
use std::sync::mpsc::{self, Receiver, Sender};

use rapid_core::{
    Coalescer, GraphHandle, NoteId, PayloadKey, SelectionPayload, ServiceError, Services,
};
use rapid_search::{Activation, FeatureSearch, SearchConfig, SearchEvent, SearchResult};
use web_time::Instant;

use crate::config::SidebarConfig;
use crate::feature_list;
use crate::mode::InteractionMode;
use crate::panel::{CustomPanel, InspectorPanel, Latest, Refresh, RenderContext, latest_copy};
use crate::resizer::{Pointer, ResizeOutcome, SidebarResizer};
use crate::view::{Mount, ViewNode};

/// What occupies the sidebar slot.
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    Hidden,
    FeatureList,
    Inspector(InspectorPanel),
    Custom(CustomPanel),
}

impl Content {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Hidden => "hidden",
            Self::FeatureList => "feature-list",
            Self::Inspector(_) => "inspector",
            Self::Custom(_) => "custom",
        }
    }
}

/// How the active payload got there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteMode {
    Hidden,
    Hover,
    Select,
}

/// Snapshot of the router for hosts and tests.
#[derive(Debug, Clone, PartialEq)]
pub struct RouterState {
    pub mode: RouteMode,
    pub active_payload: Option<SelectionPayload>,
    pub sidebar_width_px: f64,
    pub collapsed: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnterOptions {
    /// The selection is a feature the user just drew.
    pub new_feature: bool,
}

/// Where [`SidebarRouter::reset`] leaves the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetTarget {
    Hidden,
    FeatureList,
}

struct NoteFetch {
    generation: u64,
    id: NoteId,
    outcome: Result<(), ServiceError>,
}

pub struct SidebarRouter {
    services: Services,
    graph: GraphHandle,
    config: SidebarConfig,
    mode: InteractionMode,
    content: Content,
    route_mode: RouteMode,
    hover: Coalescer<Option<SelectionPayload>>,
    search: FeatureSearch,
    resizer: SidebarResizer,
    mount: Option<Mount>,
    generation: u64,
    tx: Sender<NoteFetch>,
    rx: Receiver<NoteFetch>,
}

impl std::fmt::Debug for SidebarRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SidebarRouter")
            .field("mode", &self.mode)
            .field("content", &self.content.name())
            .field("route_mode", &self.route_mode)
            .field("generation", &self.generation)
            .field("mounted", &self.mount.is_some())
            .finish_non_exhaustive()
    }
}

impl SidebarRouter {
    #[must_use]
    pub fn new(
        services: Services,
        graph: GraphHandle,
        config: SidebarConfig,
        search_config: SearchConfig,
    ) -> Self {
        let resizer =
            SidebarResizer::load(services.storage.clone(), &config, services.l10n.is_rtl());
        let search = FeatureSearch::new(services.clone(), graph.clone(), search_config);
        let hover = Coalescer::throttle(config.hover_throttle());
        let (tx, rx) = mpsc::channel();
        Self {
            services,
            graph,
            config,
            mode: InteractionMode::Browse,
            content: Content::FeatureList,
            route_mode: RouteMode::Hidden,
            hover,
            search,
            resizer,
            mount: None,
            generation: 0,
            tx,
            rx,
        }
    }

    #[must_use]
    pub fn content(&self) -> &Content {
        &self.content
    }

    pub fn content_mut(&mut self) -> &mut Content {
        &mut self.content
    }

    #[must_use]
    pub fn route_mode(&self) -> RouteMode {
        self.route_mode
    }

    #[must_use]
    pub fn interaction_mode(&self) -> InteractionMode {
        self.mode
    }

    #[must_use]
    pub fn search(&self) -> &FeatureSearch {
        &self.search
    }

    pub fn search_mut(&mut self) -> &mut FeatureSearch {
        &mut self.search
    }

    #[must_use]
    pub fn resizer(&self) -> &SidebarResizer {
        &self.resizer
    }

    #[must_use]
    pub fn mount(&self) -> Option<&Mount> {
        self.mount.as_ref()
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The payload whose panel is showing.
    #[must_use]
    pub fn active_payload(&self) -> Option<SelectionPayload> {
        match &self.content {
            Content::Inspector(p) => Some(SelectionPayload::entities(p.entity_ids().iter().copied())),
            Content::Custom(p) => Some(p.payload()),
            Content::Hidden | Content::FeatureList => None,
        }
    }

    #[must_use]
    pub fn state(&self) -> RouterState {
        RouterState {
            mode: self.route_mode,
            active_payload: self.active_payload(),
            sidebar_width_px: self.resizer.width_px(),
            collapsed: self.resizer.collapsed(),
        }
    }

    /// The editor entered a new interaction mode.
    pub fn set_mode(&mut self, mode: InteractionMode) {
        if mode == self.mode {
            return;
        }
        tracing::debug!(message = "router.mode", from = %self.mode, to = %mode);
        self.mode = mode;
        self.search.clear();
        if mode.pins_selection() {
            self.hover.cancel();
        }
    }

    // ── Content routing ─────────────────────────────────────────────────

    /// Hover-change event. Throttled; the leading call applies at once.
    pub fn hover(&mut self, payload: Option<SelectionPayload>, now: Instant) {
        if let Some(payload) = self.hover.push(payload, now) {
            self.apply_hover(payload);
        }
    }

    /// Selection-change event.
    pub fn enter(&mut self, payload: Option<SelectionPayload>) {
        self.enter_with(payload, EnterOptions::default());
    }

    pub fn enter_with(&mut self, payload: Option<SelectionPayload>, options: EnterOptions) {
        if self.hover.cancel().is_some() {
            tracing::debug!(message = "router.hover.preempted");
        }
        tracing::debug!(
            message = "router.enter",
            kind = payload.as_ref().map_or("none", SelectionPayload::kind_name),
            new_feature = options.new_feature
        );
        match payload {
            None => self.show_feature_list(),
            Some(p) if p.is_empty_selection() => self.show_feature_list(),
            Some(SelectionPayload::OsmEntitySet(ids)) => {
                if !self.resolves(&ids) {
                    tracing::debug!(message = "router.enter.unrecognized", count = ids.len());
                    self.show_feature_list();
                    return;
                }
                if options.new_feature && ids.len() == 1 && self.resizer.collapsed() {
                    self.resizer.expand();
                }
                let panel = InspectorPanel::select(ids, options.new_feature);
                self.transition(Content::Inspector(panel), RouteMode::Select);
            }
            Some(other) => self.show_custom(other, RouteMode::Select),
        }
    }

    /// A collaborator announced fresher data for `changed`.
    pub fn on_external_data_refresh(&mut self, changed: &HashSet<PayloadKey>) {
        let vanished = match &mut self.content {
            Content::Inspector(panel) => {
                let graph = self.graph.snapshot();
                if !panel.resolves_in(&graph) {
                    true
                } else {
                    if SelectionPayload::entities(panel.entity_ids().iter().copied())
                        .intersects(changed)
                    {
                        tracing::debug!(message = "router.refresh", kind = "osm");
                    }
                    false
                }
            }
            Content::Custom(panel) => {
                if !panel.payload().intersects(changed) {
                    return;
                }
                let refresh = panel.refresh(&self.services);
                tracing::debug!(message = "router.refresh", kind = panel.kind().class_name(), outcome = ?refresh);
                refresh == Refresh::Vanished
            }
            Content::Hidden | Content::FeatureList => false,
        };
        if vanished {
            tracing::debug!(message = "router.refresh.vanished");
            self.show_feature_list();
        }
    }

    /// Drop panel drafts and leave the slot at `target`.
    pub fn reset(&mut self, target: ResetTarget) {
        self.hover.cancel();
        let next = match target {
            ResetTarget::Hidden => Content::Hidden,
            ResetTarget::FeatureList => Content::FeatureList,
        };
        self.transition(next, RouteMode::Hidden);
    }

    /// Advance timers and apply finished asynchronous work.
    ///
    /// Returns true when the slot or the result list changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        let mut changed = false;
        if let Some(payload) = self.hover.poll(now) {
            self.apply_hover(payload);
            changed = true;
        }
        while let Ok(fetch) = self.rx.try_recv() {
            changed |= self.apply_fetch(fetch);
        }
        for event in self.search.pump(now) {
            changed = true;
            if let SearchEvent::Select(payload) = event {
                self.enter(Some(payload));
            }
        }
        changed
    }

    /// Earliest instant at which [`tick`](Self::tick) has timed work.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.hover.next_deadline(), self.search.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    fn apply_hover(&mut self, payload: Option<SelectionPayload>) {
        if self.mode.ignores_hover(payload.as_ref()) {
            tracing::debug!(
                message = "router.hover.ignored",
                mode = %self.mode,
                kind = payload.as_ref().map_or("none", SelectionPayload::kind_name)
            );
            return;
        }
        match payload {
            None => self.show_feature_list(),
            Some(SelectionPayload::OsmEntitySet(ids)) => {
                if ids.is_empty() || !self.resolves(&ids) {
                    tracing::debug!(message = "router.hover.unresolved", count = ids.len());
                    self.show_feature_list();
                    return;
                }
                if matches!(&self.content, Content::Inspector(p) if p.is_hovering(&ids)) {
                    return;
                }
                self.transition(Content::Inspector(InspectorPanel::hover(ids)), RouteMode::Hover);
            }
            Some(other) => self.show_custom(other, RouteMode::Hover),
        }
    }

    fn show_custom(&mut self, payload: SelectionPayload, mode: RouteMode) {
        if mode == RouteMode::Hover
            && self.route_mode == RouteMode::Hover
            && matches!(&self.content, Content::Custom(p) if p.payload().keys() == payload.keys())
        {
            return;
        }
        let latest = latest_copy(&payload, &self.services);
        let download = match (&payload, &latest) {
            (SelectionPayload::Note(n), Latest::Missing) if !n.is_new() => Some(n.id),
            _ => None,
        };
        let payload = match latest {
            Latest::Found(fresh) => fresh,
            Latest::Missing | Latest::NoService => payload,
        };
        let kind = payload.kind_name();
        let Some(panel) = CustomPanel::from_payload(payload) else {
            tracing::debug!(message = "router.unrecognized", kind);
            self.show_feature_list();
            return;
        };
        self.transition(Content::Custom(panel), mode);
        if let Some(id) = download {
            self.fetch_note(id);
        }
    }

    fn show_feature_list(&mut self) {
        if matches!(self.content, Content::FeatureList) && self.route_mode == RouteMode::Hidden {
            return;
        }
        self.transition(Content::FeatureList, RouteMode::Hidden);
    }

    fn transition(&mut self, next: Content, mode: RouteMode) {
        let mut previous = std::mem::replace(&mut self.content, next);
        match &mut previous {
            Content::Inspector(p) => p.reset(),
            Content::Custom(p) => p.reset(),
            Content::Hidden | Content::FeatureList => {}
        }
        self.route_mode = mode;
        self.generation += 1;
        tracing::debug!(
            message = "router.transition",
            from = previous.name(),
            to = self.content.name(),
            mode = ?mode,
            generation = self.generation
        );
    }

    fn resolves(&self, ids: &[rapid_core::EntityId]) -> bool {
        let graph = self.graph.snapshot();
        ids.iter().all(|id| graph.has_entity(id).is_some())
    }

    fn fetch_note(&mut self, id: NoteId) {
        let Some(notes) = self.services.notes.clone() else {
            return;
        };
        let tx = self.tx.clone();
        let generation = self.generation;
        tracing::debug!(message = "router.fetch", note = %id, generation);
        notes.load_note(
            id,
            Box::new(move |outcome| {
                let _ = tx.send(NoteFetch {
                    generation,
                    id,
                    outcome,
                });
            }),
        );
    }

    fn apply_fetch(&mut self, fetch: NoteFetch) -> bool {
        if fetch.generation != self.generation {
            tracing::debug!(
                message = "router.fetch.stale",
                note = %fetch.id,
                generation = fetch.generation,
                current = self.generation
            );
            return false;
        }
        if let Err(err) = fetch.outcome {
            tracing::warn!(message = "router.fetch.failed", note = %fetch.id, error = %err);
            return false;
        }
        let Content::Custom(panel) = &mut self.content else {
            return false;
        };
        if panel.as_note().map(|p| p.note().id) != Some(fetch.id) {
            return false;
        }
        panel.refresh(&self.services) == Refresh::Updated
    }

    // ── Search ──────────────────────────────────────────────────────────

    pub fn search_input(&mut self, value: &str, now: Instant) {
        self.search.set_query(value, now);
    }

    /// Click on a result row.
    pub fn activate_result(&mut self, result: &SearchResult) {
        let activation = self.search.activate(result);
        self.apply_activation(activation);
    }

    /// Enter in the search box.
    pub fn submit_search(&mut self) {
        let activation = self.search.submit();
        self.apply_activation(activation);
    }

    fn apply_activation(&mut self, activation: Activation) {
        if let Activation::Select(payload) = activation {
            self.enter(Some(payload));
        }
    }

    // ── Layout ──────────────────────────────────────────────────────────

    pub fn toggle(&mut self) -> bool {
        if self.mount.is_none() {
            tracing::debug!(message = "router.toggle.too_early");
            return false;
        }
        self.resizer.toggle()
    }

    pub fn expand(&mut self) -> bool {
        self.mount.is_some() && self.resizer.expand()
    }

    pub fn collapse(&mut self) -> bool {
        self.mount.is_some() && self.resizer.collapse()
    }

    /// Block toggling, e.g. during the walkthrough.
    pub fn set_layout_locked(&mut self, locked: bool) {
        self.resizer.set_locked(locked);
    }

    /// Keyboard shortcut handler; returns true when the key toggled.
    pub fn handle_key(&mut self, key: &str) -> bool {
        let localized = self.services.l10n.t("inspector.key", &[]);
        if key == localized || self.config.toggle_keys.iter().any(|k| k == key) {
            self.toggle()
        } else {
            false
        }
    }

    pub fn pointer_down(&mut self, pointer: Pointer) -> bool {
        if self.mount.is_none() {
            tracing::debug!(message = "router.pointer.too_early");
            return false;
        }
        self.resizer.pointer_down(pointer)
    }

    pub fn pointer_move(&mut self, pointer: Pointer) -> Option<f64> {
        self.resizer.pointer_move(pointer)
    }

    pub fn pointer_up(&mut self, pointer: Pointer) -> ResizeOutcome {
        self.resizer.pointer_up(pointer)
    }

    // ── Rendering ───────────────────────────────────────────────────────

    /// Render into `mount`, or into the previously attached mount when
    /// `None`. Before any mount exists this is a no-op.
    pub fn render(&mut self, mount: Option<Mount>) -> Option<&ViewNode> {
        if let Some(mount) = mount {
            self.mount = Some(mount);
        }
        if self.mount.is_none() {
            tracing::debug!(message = "router.render.too_early");
            return None;
        }
        let view = self.view();
        let mount = self.mount.as_mut()?;
        if mount.commit(view) {
            tracing::trace!(message = "router.render", revision = mount.revision());
        }
        mount.tree()
    }

    /// The sidebar tree for the current state.
    #[must_use]
    pub fn view(&self) -> ViewNode {
        let graph = self.graph.snapshot();
        let cx = RenderContext {
            graph: &graph,
            services: &self.services,
        };
        let l10n = self.services.l10n.as_ref();
        let hover = self.route_mode == RouteMode::Hover;
        let basis = if self.resizer.is_dragging() {
            self.resizer.width_px()
        } else {
            self.resizer.expand_width()
        };

        let root = ViewNode::div("sidebar")
            .class_if("collapsed", self.resizer.collapsed() && !self.resizer.is_dragging())
            .class_if("collapsing", self.resizer.is_collapsing())
            .class_if("inspector-hover", hover)
            .attr("style", format!("flex-basis: {basis}px"))
            .child(
                ViewNode::div("resizer")
                    .attr("title", l10n.t("inspector.tooltip", &[]))
                    .child(ViewNode::div("resizer-handle")),
            )
            .child(
                feature_list::render(&self.search, l10n)
                    .class_if("inspector-hidden", !matches!(self.content, Content::FeatureList)),
            );

        match &self.content {
            Content::Inspector(panel) => root.child(panel.render(&cx)),
            Content::Custom(panel) => root.child(
                ViewNode::div("sidebar-component")
                    .class_if("inspector-hover", hover)
                    .child(panel.render(&cx)),
            ),
            Content::Hidden | Content::FeatureList => root,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rapid_core::{EntityId, Graph, LatLon, Note, QaItem, QaSource};
    use rapid_harness::{Fixture, cafe_at};
    use std::time::Duration;

    fn router(fx: &Fixture) -> SidebarRouter {
        let graph = GraphHandle::new(Graph::with_base([
            cafe_at(1, "Corner Cafe", 0.0, 0.0),
            cafe_at(2, "Other Cafe", 0.001, 0.0),
        ]));
        SidebarRouter::new(
            fx.services(),
            graph,
            SidebarConfig::default(),
            SearchConfig::default(),
        )
    }

    fn osm(id: i64) -> Option<SelectionPayload> {
        Some(SelectionPayload::entity(EntityId::node(id)))
    }

    #[test]
    fn starts_on_feature_list() {
        let r = router(&Fixture::new());
        assert_eq!(r.content(), &Content::FeatureList);
        assert_eq!(r.state().mode, RouteMode::Hidden);
        assert_eq!(r.state().active_payload, None);
    }

    #[test]
    fn hover_then_select() {
        let mut r = router(&Fixture::new());
        r.hover(osm(1), Instant::now());
        assert_eq!(r.route_mode(), RouteMode::Hover);
        r.enter(osm(2));
        assert_eq!(r.route_mode(), RouteMode::Select);
        assert_eq!(r.active_payload(), osm(2));
    }

    #[test]
    fn pinned_mode_ignores_hover() {
        let mut r = router(&Fixture::new());
        r.enter(osm(1));
        r.set_mode(InteractionMode::Select);
        r.hover(osm(2), Instant::now());
        assert_eq!(r.active_payload(), osm(1));
        assert_eq!(r.route_mode(), RouteMode::Select);
    }

    #[test]
    fn rehovering_same_entity_keeps_panel() {
        let mut r = router(&Fixture::new());
        let t0 = Instant::now();
        r.hover(osm(1), t0);
        let generation = r.generation();
        r.hover(osm(1), t0 + Duration::from_millis(500));
        assert_eq!(r.generation(), generation);
    }

    #[test]
    fn select_preempts_pending_hover() {
        let mut r = router(&Fixture::new());
        let t0 = Instant::now();
        r.hover(osm(1), t0);
        r.hover(osm(2), t0 + Duration::from_millis(50));
        r.enter(None);
        r.tick(t0 + Duration::from_millis(300));
        assert_eq!(r.content(), &Content::FeatureList);
    }

    #[test]
    fn unresolved_entity_falls_back_to_list() {
        let mut r = router(&Fixture::new());
        r.enter(osm(99));
        assert_eq!(r.content(), &Content::FeatureList);
    }

    #[test]
    fn qa_items_dispatch_on_service() {
        let fx = Fixture::new();
        let mut r = router(&fx);
        r.enter(Some(SelectionPayload::QaItem(QaItem::new(
            QaSource::MapRoulette,
            "t1",
            LatLon::default(),
        ))));
        let Content::Custom(panel) = r.content() else {
            panic!("expected custom panel");
        };
        assert_eq!(panel.kind().class_name(), "maproulette-editor");
    }

    #[test]
    fn new_feature_expands_collapsed_sidebar() {
        let fx = Fixture::new();
        let mut r = router(&fx);
        r.render(Some(Mount::new("sidebar")));
        assert!(r.collapse());
        r.enter_with(osm(1), EnterOptions { new_feature: true });
        assert!(!r.state().collapsed);
        let Content::Inspector(panel) = r.content() else {
            panic!("expected inspector");
        };
        assert!(panel.preset_list_expanded());
    }

    #[test]
    fn render_before_mount_is_noop() {
        let mut r = router(&Fixture::new());
        assert!(r.render(None).is_none());
        assert!(!r.toggle());
        assert!(r.render(Some(Mount::new("sidebar"))).is_some());
        assert!(r.render(None).is_some());
        assert_eq!(r.mount().map(Mount::revision), Some(1));
    }

    #[test]
    fn hover_styling_on_root() {
        let mut r = router(&Fixture::new());
        r.render(Some(Mount::new("sidebar")));
        r.hover(osm(1), Instant::now());
        let tree = r.render(None).cloned().unwrap();
        assert!(tree.has_class("inspector-hover"));
        assert!(tree.find("feature-list-pane").unwrap().has_class("inspector-hidden"));
        r.enter(osm(1));
        let tree = r.render(None).cloned().unwrap();
        assert!(!tree.has_class("inspector-hover"));
    }

    #[test]
    fn mode_change_clears_search() {
        let mut r = router(&Fixture::new());
        r.search_input("corner", Instant::now());
        r.set_mode(InteractionMode::AddPoint);
        assert_eq!(r.search().value(), "");
    }

    #[test]
    fn toggle_keys() {
        let mut r = router(&Fixture::new());
        r.render(Some(Mount::new("sidebar")));
        assert!(r.handle_key("²"));
        assert!(r.state().collapsed);
        assert!(r.handle_key("`"));
        assert!(!r.handle_key("x"));
        assert!(!r.state().collapsed);
    }

    #[test]
    fn note_result_selects_note_panel() {
        let fx = Fixture::new();
        fx.notes.put(Note::new(4, LatLon::new(1.0, 1.0)));
        let mut r = router(&fx);
        r.search_input("note 4", Instant::now());
        r.submit_search();
        let Content::Custom(panel) = r.content() else {
            panic!("expected note panel");
        };
        assert_eq!(panel.as_note().map(|p| p.note().id), Some(NoteId(4)));
    }
}
