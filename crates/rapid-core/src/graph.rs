#![forbid(unsafe_code)]

//! A two-layer entity graph.
//!
//! # Design
//!
//! The editor keeps the entities loaded from the server in a **base** layer
//! and the user's staged edits in a **local** layer. A local entry shadows
//! the base entry with the same id; a local entry of `None` is an explicit
//! deletion marker. Lookups consult the local layer first.
//!
//! Graph snapshots are immutable values. The host publishes a new snapshot
//! through a [`GraphHandle`] after every edit or undo; readers take an
//! `Rc<Graph>` and never observe a half-applied change.
//!
//! # Invariants
//!
//! 1. `has_entity(id)` is `None` whenever `is_deleted_locally(id)` is true.
//! 2. `base_ids()` and `local_ids()` may overlap; callers that need the
//!    union must deduplicate.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use crate::error::GraphError;
use crate::geo::{Extent, LatLon};
use crate::id::{EntityId, EntityKind};

/// OSM tags, sorted by key.
pub type Tags = BTreeMap<String, String>;

/// Tag keys that make a closed way an area unless `area=no` says otherwise.
const AREA_KEYS: &[&str] = &[
    "amenity", "building", "landuse", "leisure", "natural", "place", "shop", "tourism",
    "aeroway", "historic", "man_made", "military", "office", "water", "craft",
];

/// Relation nesting deeper than this is treated as a cycle when computing extents.
const MAX_RELATION_DEPTH: usize = 8;

/// How an entity presents on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Geometry {
    Point,
    Vertex,
    Line,
    Area,
    Relation,
}

impl Geometry {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Point => "point",
            Self::Vertex => "vertex",
            Self::Line => "line",
            Self::Area => "area",
            Self::Relation => "relation",
        }
    }
}

/// A node, way or relation.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub id: EntityId,
    pub tags: Tags,
    /// Set for nodes only.
    pub loc: Option<LatLon>,
    /// Member nodes of a way, in order.
    pub nodes: Vec<EntityId>,
    /// Members of a relation.
    pub members: Vec<EntityId>,
}

impl Entity {
    #[must_use]
    pub fn node(id: i64, loc: LatLon) -> Self {
        Self {
            id: EntityId::node(id),
            tags: Tags::new(),
            loc: Some(loc),
            nodes: Vec::new(),
            members: Vec::new(),
        }
    }

    #[must_use]
    pub fn way(id: i64, nodes: impl IntoIterator<Item = i64>) -> Self {
        Self {
            id: EntityId::way(id),
            tags: Tags::new(),
            loc: None,
            nodes: nodes.into_iter().map(EntityId::node).collect(),
            members: Vec::new(),
        }
    }

    #[must_use]
    pub fn relation(id: i64, members: impl IntoIterator<Item = EntityId>) -> Self {
        Self {
            id: EntityId::relation(id),
            tags: Tags::new(),
            loc: None,
            nodes: Vec::new(),
            members: members.into_iter().collect(),
        }
    }

    /// Builder: add or replace a tag.
    #[must_use]
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn kind(&self) -> EntityKind {
        self.id.kind()
    }

    /// A way whose first and last node are the same.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.nodes.len() > 1 && self.nodes.first() == self.nodes.last()
    }

    fn is_area_tagged(&self) -> bool {
        match self.tags.get("area").map(String::as_str) {
            Some("yes") => return true,
            Some("no") => return false,
            _ => {}
        }
        AREA_KEYS.iter().any(|k| self.tags.contains_key(*k))
    }
}

/// Base layer plus staged local edits.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    base: BTreeMap<EntityId, Entity>,
    local: BTreeMap<EntityId, Option<Entity>>,
}

impl Graph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A graph whose base layer holds `entities`.
    #[must_use]
    pub fn with_base(entities: impl IntoIterator<Item = Entity>) -> Self {
        Self {
            base: entities.into_iter().map(|e| (e.id, e)).collect(),
            local: BTreeMap::new(),
        }
    }

    /// Load server data into the base layer.
    pub fn load_base(&mut self, entity: Entity) {
        self.base.insert(entity.id, entity);
    }

    /// Stage a created or modified entity in the local layer.
    pub fn replace(&mut self, entity: Entity) {
        self.local.insert(entity.id, Some(entity));
    }

    /// Stage a deletion marker.
    pub fn remove(&mut self, id: EntityId) {
        self.local.insert(id, None);
    }

    /// Drop any staged state for `id`, exposing the base entity again.
    pub fn revert(&mut self, id: EntityId) {
        self.local.remove(&id);
    }

    #[must_use]
    pub fn has_entity(&self, id: &EntityId) -> Option<&Entity> {
        match self.local.get(id) {
            Some(staged) => staged.as_ref(),
            None => self.base.get(id),
        }
    }

    pub fn entity(&self, id: &EntityId) -> Result<&Entity, GraphError> {
        self.has_entity(id)
            .ok_or(GraphError::MissingEntity(*id))
    }

    pub fn base_ids(&self) -> impl Iterator<Item = &EntityId> {
        self.base.keys()
    }

    pub fn local_ids(&self) -> impl Iterator<Item = &EntityId> {
        self.local.keys()
    }

    /// Union of base and local ids, base first, without duplicates.
    pub fn all_ids(&self) -> impl Iterator<Item = &EntityId> {
        self.base.keys().chain(
            self.local
                .keys()
                .filter(|id| !self.base.contains_key(*id)),
        )
    }

    #[must_use]
    pub fn is_deleted_locally(&self, id: &EntityId) -> bool {
        matches!(self.local.get(id), Some(None))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.all_ids().filter(|id| !self.is_deleted_locally(id)).count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Ways that currently reference node `id`.
    pub fn parent_ways<'a>(&'a self, id: &'a EntityId) -> impl Iterator<Item = &'a Entity> + 'a {
        self.all_ids()
            .filter_map(|other| self.has_entity(other))
            .filter(move |e| e.kind() == EntityKind::Way && e.nodes.contains(id))
    }

    /// Bounding box of the entity's resolvable locations.
    #[must_use]
    pub fn extent(&self, entity: &Entity) -> Option<Extent> {
        let mut seen = BTreeSet::new();
        self.extent_inner(entity, 0, &mut seen)
    }

    fn extent_inner(
        &self,
        entity: &Entity,
        depth: usize,
        seen: &mut BTreeSet<EntityId>,
    ) -> Option<Extent> {
        if depth > MAX_RELATION_DEPTH || !seen.insert(entity.id) {
            return None;
        }
        match entity.kind() {
            EntityKind::Node => entity.loc.map(Extent::point),
            EntityKind::Way => entity
                .nodes
                .iter()
                .filter_map(|id| self.has_entity(id).and_then(|n| n.loc))
                .map(Extent::point)
                .reduce(Extent::union),
            EntityKind::Relation => entity
                .members
                .iter()
                .filter_map(|id| self.has_entity(id))
                .filter_map(|member| self.extent_inner(member, depth + 1, seen))
                .reduce(Extent::union),
        }
    }

    #[must_use]
    pub fn geometry(&self, entity: &Entity) -> Geometry {
        match entity.kind() {
            EntityKind::Node => {
                if self.parent_ways(&entity.id).next().is_some() {
                    Geometry::Vertex
                } else {
                    Geometry::Point
                }
            }
            EntityKind::Way => {
                if entity.is_closed() && entity.is_area_tagged() {
                    Geometry::Area
                } else {
                    Geometry::Line
                }
            }
            EntityKind::Relation => {
                if entity.tags.get("type").map(String::as_str) == Some("multipolygon") {
                    Geometry::Area
                } else {
                    Geometry::Relation
                }
            }
        }
    }
}

/// Shared, replaceable pointer to the current graph snapshot.
///
/// Cloning the handle shares the same slot. Readers call [`snapshot`]; the
/// host calls [`publish`] or [`update`].
///
/// [`snapshot`]: GraphHandle::snapshot
/// [`publish`]: GraphHandle::publish
/// [`update`]: GraphHandle::update
#[derive(Debug, Clone, Default)]
pub struct GraphHandle {
    current: Rc<RefCell<Rc<Graph>>>,
}

impl GraphHandle {
    #[must_use]
    pub fn new(graph: Graph) -> Self {
        Self {
            current: Rc::new(RefCell::new(Rc::new(graph))),
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> Rc<Graph> {
        Rc::clone(&self.current.borrow())
    }

    pub fn publish(&self, graph: Graph) {
        *self.current.borrow_mut() = Rc::new(graph);
    }

    /// Copy-on-write edit of the current snapshot.
    pub fn update(&self, edit: impl FnOnce(&mut Graph)) {
        let mut slot = self.current.borrow_mut();
        edit(Rc::make_mut(&mut *slot));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Graph {
        Graph::with_base([
            Entity::node(1, LatLon::new(0.0, 0.0)),
            Entity::node(2, LatLon::new(1.0, 0.0)),
            Entity::node(3, LatLon::new(1.0, 1.0)),
            Entity::way(10, [1, 2, 3, 1]).with_tag("building", "yes"),
            Entity::node(4, LatLon::new(5.0, 5.0)).with_tag("amenity", "cafe"),
        ])
    }

    #[test]
    fn local_layer_shadows_base() {
        let mut g = square();
        g.replace(Entity::node(4, LatLon::new(6.0, 6.0)));
        assert_eq!(
            g.has_entity(&EntityId::node(4)).and_then(|e| e.loc),
            Some(LatLon::new(6.0, 6.0))
        );
    }

    #[test]
    fn deletion_marker_hides_entity() {
        let mut g = square();
        g.remove(EntityId::node(4));
        assert!(g.is_deleted_locally(&EntityId::node(4)));
        assert!(g.has_entity(&EntityId::node(4)).is_none());
        assert_eq!(
            g.entity(&EntityId::node(4)),
            Err(GraphError::MissingEntity(EntityId::node(4)))
        );
        g.revert(EntityId::node(4));
        assert!(g.has_entity(&EntityId::node(4)).is_some());
    }

    #[test]
    fn all_ids_deduplicates() {
        let mut g = square();
        g.replace(Entity::node(4, LatLon::new(6.0, 6.0)));
        g.replace(Entity::node(-1, LatLon::new(7.0, 7.0)));
        let ids: Vec<_> = g.all_ids().copied().collect();
        assert_eq!(ids.len(), 6);
        assert_eq!(ids.last(), Some(&EntityId::node(-1)));
    }

    #[test]
    fn geometry_classification() {
        let g = square();
        let way = g.has_entity(&EntityId::way(10)).unwrap();
        assert_eq!(g.geometry(way), Geometry::Area);
        let vertex = g.has_entity(&EntityId::node(1)).unwrap();
        assert_eq!(g.geometry(vertex), Geometry::Vertex);
        let poi = g.has_entity(&EntityId::node(4)).unwrap();
        assert_eq!(g.geometry(poi), Geometry::Point);
    }

    #[test]
    fn open_way_is_line() {
        let g = Graph::with_base([Entity::way(1, [1, 2]).with_tag("highway", "residential")]);
        assert_eq!(g.geometry(g.has_entity(&EntityId::way(1)).unwrap()), Geometry::Line);
    }

    #[test]
    fn area_no_overrides_area_keys() {
        let g = Graph::with_base([Entity::way(1, [1, 2, 1])
            .with_tag("building", "yes")
            .with_tag("area", "no")]);
        assert_eq!(g.geometry(g.has_entity(&EntityId::way(1)).unwrap()), Geometry::Line);
    }

    #[test]
    fn extent_of_way_and_relation() {
        let mut g = square();
        g.load_base(Entity::relation(20, [EntityId::way(10), EntityId::node(4)]));
        let way = g.has_entity(&EntityId::way(10)).unwrap();
        let e = g.extent(way).unwrap();
        assert_eq!(e.min, LatLon::new(0.0, 0.0));
        assert_eq!(e.max, LatLon::new(1.0, 1.0));
        let rel = g.has_entity(&EntityId::relation(20)).unwrap();
        assert_eq!(g.extent(rel).unwrap().max, LatLon::new(5.0, 5.0));
    }

    #[test]
    fn self_referencing_relation_terminates() {
        let g = Graph::with_base([
            Entity::relation(1, [EntityId::relation(1), EntityId::node(1)]),
            Entity::node(1, LatLon::new(2.0, 3.0)),
        ]);
        let rel = g.has_entity(&EntityId::relation(1)).unwrap();
        assert_eq!(g.extent(rel), Some(Extent::point(LatLon::new(2.0, 3.0))));
    }

    #[test]
    fn handle_publishes_new_snapshots() {
        let handle = GraphHandle::new(square());
        let before = handle.snapshot();
        handle.update(|g| g.remove(EntityId::node(4)));
        assert!(before.has_entity(&EntityId::node(4)).is_some());
        assert!(handle.snapshot().has_entity(&EntityId::node(4)).is_none());
        handle.publish(Graph::new());
        assert!(handle.snapshot().is_empty());
    }
}
