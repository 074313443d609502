#![forbid(unsafe_code)]

//! Sidebar panels.
//!
//! Each panel owns its explicit state (the payload it shows, drafts,
//! expanded flags) and renders through a pure function of that state plus
//! the current graph. Nothing here talks to the map or schedules work.
//!
//! # Panel kinds
//!
//! | payload            | panel                 | root class            |
//! |--------------------|-----------------------|-----------------------|
//! | OSM entity set     | [`InspectorPanel`]    | `inspector-wrap`      |
//! | note               | [`NotePanel`]         | `note-editor`         |
//! | KeepRight issue    | QA editor             | `keepRight-editor`    |
//! | Osmose issue       | QA editor             | `osmose-editor`       |
//! | MapRoulette task   | QA editor             | `maproulette-editor`  |
//! | custom data        | data editor           | `data-editor`         |
//! | AI suggestion      | Rapid inspector       | `rapid-inspector`     |
//! | Overture place     | Overture inspector    | `overture-inspector`  |
//! | imagery detection  | detection inspector   | `detection-inspector` |

use rapid_core::{
    AiFeature, CustomFeature, Detection, Entity, EntityId, Graph, GraphHandle, Note, NoteStatus,
    OvertureFeature, QaItem, QaSource, SelectionPayload, Services, Tags,
};

use crate::error::PanelError;
use crate::view::ViewNode;

/// What panels may read while rendering.
#[derive(Clone, Copy)]
pub struct RenderContext<'a> {
    pub graph: &'a Graph,
    pub services: &'a Services,
}

impl<'a> RenderContext<'a> {
    fn t(&self, key: &str) -> String {
        self.services.l10n.t(key, &[])
    }
}

// ── Inspector ───────────────────────────────────────────────────────────

/// Whether the inspector is a transient preview or a hard selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InspectorState {
    Hover,
    Select,
}

/// How the tag editor presents tags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TagView {
    #[default]
    List,
    Text,
}

/// The OSM entity inspector.
#[derive(Debug, Clone, PartialEq)]
pub struct InspectorPanel {
    state: InspectorState,
    entity_ids: Vec<EntityId>,
    new_feature: bool,
    preset_list_expanded: bool,
    tag_view: TagView,
    /// Pending tag edits; an empty value removes the tag.
    draft: Tags,
}

impl InspectorPanel {
    #[must_use]
    pub fn hover(entity_ids: Vec<EntityId>) -> Self {
        Self {
            state: InspectorState::Hover,
            entity_ids,
            new_feature: false,
            preset_list_expanded: false,
            tag_view: TagView::List,
            draft: Tags::new(),
        }
    }

    /// A new feature opens on the preset list.
    #[must_use]
    pub fn select(entity_ids: Vec<EntityId>, new_feature: bool) -> Self {
        Self {
            state: InspectorState::Select,
            entity_ids,
            new_feature,
            preset_list_expanded: new_feature,
            tag_view: TagView::List,
            draft: Tags::new(),
        }
    }

    #[must_use]
    pub fn state(&self) -> InspectorState {
        self.state
    }

    #[must_use]
    pub fn entity_ids(&self) -> &[EntityId] {
        &self.entity_ids
    }

    #[must_use]
    pub fn new_feature(&self) -> bool {
        self.new_feature
    }

    #[must_use]
    pub fn preset_list_expanded(&self) -> bool {
        self.preset_list_expanded
    }

    #[must_use]
    pub fn tag_view(&self) -> TagView {
        self.tag_view
    }

    /// Already showing exactly `ids` as a hover preview.
    #[must_use]
    pub fn is_hovering(&self, ids: &[EntityId]) -> bool {
        self.state == InspectorState::Hover && self.entity_ids == ids
    }

    pub fn show_preset_list(&mut self) {
        self.preset_list_expanded = true;
    }

    pub fn show_entity_editor(&mut self) {
        self.preset_list_expanded = false;
    }

    pub fn set_tag_view(&mut self, view: TagView) {
        self.tag_view = view;
    }

    #[must_use]
    pub fn draft(&self) -> &Tags {
        &self.draft
    }

    /// Stage a tag edit. Hover previews refuse.
    pub fn edit_tag(&mut self, key: &str, value: &str) -> Result<(), PanelError> {
        if self.state == InspectorState::Hover {
            return Err(PanelError::ReadOnlyHover);
        }
        self.draft.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    /// Write staged edits into the local graph layer.
    ///
    /// Returns the number of tags touched.
    pub fn commit_draft(&mut self, graph: &GraphHandle) -> Result<usize, PanelError> {
        if self.state == InspectorState::Hover {
            return Err(PanelError::ReadOnlyHover);
        }
        if self.draft.is_empty() {
            return Err(PanelError::NothingToCommit);
        }
        let [id] = self.entity_ids.as_slice() else {
            return Err(PanelError::MultiSelection);
        };
        let snapshot = graph.snapshot();
        let mut entity = snapshot.entity(id)?.clone();
        apply_draft(&mut entity.tags, &self.draft);
        let touched = self.draft.len();
        graph.update(|g| g.replace(entity));
        self.draft.clear();
        tracing::debug!(message = "inspector.commit", entity = %id, touched);
        Ok(touched)
    }

    /// Drop uncommitted edits.
    pub fn reset(&mut self) {
        self.draft.clear();
    }

    /// Every shown id still resolves in `graph`.
    #[must_use]
    pub fn resolves_in(&self, graph: &Graph) -> bool {
        !self.entity_ids.is_empty() && self.entity_ids.iter().all(|id| graph.has_entity(id).is_some())
    }

    #[must_use]
    pub fn render(&self, cx: &RenderContext<'_>) -> ViewNode {
        let hover = self.state == InspectorState::Hover;
        let header = cx.t(if hover { "inspector.view" } else { "inspector.edit" });
        let body = if self.preset_list_expanded && !hover {
            ViewNode::div("preset-list").text(cx.t("inspector.choose"))
        } else {
            ViewNode::div("entity-editor").children(
                self.entity_ids
                    .iter()
                    .filter_map(|id| cx.graph.has_entity(id))
                    .map(|e| self.render_entity(cx, e)),
            )
        };
        ViewNode::div("inspector-wrap")
            .class_if("inspector-hover", hover)
            .child(ViewNode::new("h2").class("inspector-header").text(header))
            .child(body)
    }

    fn render_entity(&self, cx: &RenderContext<'_>, entity: &Entity) -> ViewNode {
        let l10n = &cx.services.l10n;
        let preset = cx
            .services
            .presets
            .match_entity(entity, cx.graph)
            .map(|p| p.name().to_owned())
            .unwrap_or_else(|| l10n.display_type(entity.kind()));
        let mut tags = entity.tags.clone();
        if self.entity_ids.len() == 1 {
            apply_draft(&mut tags, &self.draft);
        }
        let tag_editor = match self.tag_view {
            TagView::List => ViewNode::div("tag-editor")
                .class("tag-view-list")
                .children(tags.iter().map(|(k, v)| {
                    ViewNode::new("li")
                        .class("tag-row")
                        .attr("data-key", k.as_str())
                        .text(format!("{k}={v}"))
                })),
            TagView::Text => {
                let text: Vec<String> = tags.iter().map(|(k, v)| format!("{k}={v}")).collect();
                ViewNode::div("tag-editor").class("tag-view-text").child(
                    ViewNode::new("textarea")
                        .class("tag-text")
                        .text(text.join("\n")),
                )
            }
        };
        ViewNode::div("entity")
            .attr("data-id", entity.id.to_string())
            .child(ViewNode::div("preset-name").text(preset))
            .child(ViewNode::div("entity-name").text(l10n.display_name(&entity.tags).unwrap_or_default()))
            .child(tag_editor)
    }
}

fn apply_draft(tags: &mut Tags, draft: &Tags) {
    for (k, v) in draft {
        if v.is_empty() {
            tags.remove(k);
        } else {
            tags.insert(k.clone(), v.clone());
        }
    }
}

// ── Custom panels ───────────────────────────────────────────────────────

/// The note editor.
#[derive(Debug, Clone, PartialEq)]
pub struct NotePanel {
    note: Note,
    comment_draft: String,
}

impl NotePanel {
    #[must_use]
    pub fn new(note: Note) -> Self {
        Self {
            note,
            comment_draft: String::new(),
        }
    }

    #[must_use]
    pub fn note(&self) -> &Note {
        &self.note
    }

    #[must_use]
    pub fn comment_draft(&self) -> &str {
        &self.comment_draft
    }

    pub fn set_comment_draft(&mut self, text: &str) {
        self.comment_draft = text.to_owned();
    }

    fn render(&self, cx: &RenderContext<'_>) -> ViewNode {
        let note = &self.note;
        let title = if note.is_new() {
            cx.t("note.new")
        } else {
            format!("{} {}", cx.t("note.note"), note.id)
        };
        let anonymous = cx.t("note.anonymous");
        let comments = note.comments.iter().map(|c| {
            ViewNode::div("comment")
                .class(c.action.as_str())
                .child(ViewNode::div("comment-author").text(c.author.clone().unwrap_or_else(|| anonymous.clone())))
                .child(ViewNode::div("comment-text").text(c.text.as_str()))
        });
        let mut node = ViewNode::div("note-editor")
            .class(match note.status {
                NoteStatus::Open => "note-open",
                NoteStatus::Closed => "note-closed",
            })
            .child(ViewNode::new("h2").class("note-header").text(title))
            .child(ViewNode::div("note-comments").children(comments));
        if note.status == NoteStatus::Open {
            node = node.child(
                ViewNode::new("textarea")
                    .class("new-comment")
                    .attr("placeholder", cx.t("note.comment"))
                    .text(self.comment_draft.as_str()),
            );
        }
        node
    }
}

/// Panel kinds other than the OSM inspector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelKind {
    Note,
    KeepRight,
    Osmose,
    MapRoulette,
    Data,
    Rapid,
    Overture,
    Detection,
}

impl PanelKind {
    #[must_use]
    pub const fn class_name(self) -> &'static str {
        match self {
            Self::Note => "note-editor",
            Self::KeepRight => "keepRight-editor",
            Self::Osmose => "osmose-editor",
            Self::MapRoulette => "maproulette-editor",
            Self::Data => "data-editor",
            Self::Rapid => "rapid-inspector",
            Self::Overture => "overture-inspector",
            Self::Detection => "detection-inspector",
        }
    }
}

/// Result of pulling a fresher copy from the owning collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refresh {
    Updated,
    /// The collaborator no longer knows the object.
    Vanished,
    /// No collaborator to ask; content kept.
    Kept,
}

/// Any panel that is not the OSM inspector.
#[derive(Debug, Clone, PartialEq)]
pub enum CustomPanel {
    Note(NotePanel),
    Qa(QaItem),
    Data(CustomFeature),
    Rapid(AiFeature),
    Overture(OvertureFeature),
    Detection(Detection),
}

impl CustomPanel {
    /// Classify a payload. OSM entity sets belong to the inspector and
    /// yield `None`.
    #[must_use]
    pub fn from_payload(payload: SelectionPayload) -> Option<Self> {
        Some(match payload {
            SelectionPayload::Note(note) => Self::Note(NotePanel::new(note)),
            SelectionPayload::QaItem(item) => Self::Qa(item),
            SelectionPayload::CustomGeoData(f) => Self::Data(f),
            SelectionPayload::AiFeature(f) => Self::Rapid(f),
            SelectionPayload::OvertureFeature(f) => Self::Overture(f),
            SelectionPayload::Detection(d) => Self::Detection(d),
            SelectionPayload::OsmEntitySet(_) => return None,
        })
    }

    #[must_use]
    pub fn kind(&self) -> PanelKind {
        match self {
            Self::Note(_) => PanelKind::Note,
            Self::Qa(item) => match item.service {
                QaSource::KeepRight => PanelKind::KeepRight,
                QaSource::Osmose => PanelKind::Osmose,
                QaSource::MapRoulette => PanelKind::MapRoulette,
            },
            Self::Data(_) => PanelKind::Data,
            Self::Rapid(_) => PanelKind::Rapid,
            Self::Overture(_) => PanelKind::Overture,
            Self::Detection(_) => PanelKind::Detection,
        }
    }

    /// The payload currently shown.
    #[must_use]
    pub fn payload(&self) -> SelectionPayload {
        match self {
            Self::Note(p) => SelectionPayload::Note(p.note.clone()),
            Self::Qa(item) => SelectionPayload::QaItem(item.clone()),
            Self::Data(f) => SelectionPayload::CustomGeoData(f.clone()),
            Self::Rapid(f) => SelectionPayload::AiFeature(f.clone()),
            Self::Overture(f) => SelectionPayload::OvertureFeature(f.clone()),
            Self::Detection(d) => SelectionPayload::Detection(d.clone()),
        }
    }

    #[must_use]
    pub fn as_note(&self) -> Option<&NotePanel> {
        match self {
            Self::Note(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_note_mut(&mut self) -> Option<&mut NotePanel> {
        match self {
            Self::Note(p) => Some(p),
            _ => None,
        }
    }

    /// Replace the shown data with the collaborator's latest copy, keeping
    /// drafts.
    pub fn refresh(&mut self, services: &Services) -> Refresh {
        match latest_copy(&self.payload(), services) {
            Latest::Found(payload) => {
                self.replace_data(payload);
                Refresh::Updated
            }
            Latest::Missing => Refresh::Vanished,
            Latest::NoService => Refresh::Kept,
        }
    }

    fn replace_data(&mut self, payload: SelectionPayload) {
        match (self, payload) {
            (Self::Note(p), SelectionPayload::Note(note)) => p.note = note,
            (Self::Qa(item), SelectionPayload::QaItem(new)) => *item = new,
            (Self::Data(f), SelectionPayload::CustomGeoData(new)) => *f = new,
            (Self::Rapid(f), SelectionPayload::AiFeature(new)) => *f = new,
            (Self::Overture(f), SelectionPayload::OvertureFeature(new)) => *f = new,
            (Self::Detection(d), SelectionPayload::Detection(new)) => *d = new,
            _ => {}
        }
    }

    /// Drop uncommitted input.
    pub fn reset(&mut self) {
        if let Self::Note(p) = self {
            p.comment_draft.clear();
        }
    }

    #[must_use]
    pub fn render(&self, cx: &RenderContext<'_>) -> ViewNode {
        let class = self.kind().class_name();
        match self {
            Self::Note(p) => p.render(cx),
            Self::Qa(item) => {
                let title = match item.service {
                    QaSource::KeepRight => "qa.keepRight.title",
                    QaSource::Osmose => "qa.osmose.title",
                    QaSource::MapRoulette => "qa.maproulette.title",
                };
                ViewNode::div(class)
                    .attr("data-status", item.status.as_str())
                    .child(ViewNode::new("h2").class("qa-header").text(cx.t(title)))
                    .child(ViewNode::div("qa-id").text(item.id.as_str()))
                    .child(kv_list(item.tags.iter().map(|(k, v)| (k.clone(), v.clone()))))
            }
            Self::Data(f) => ViewNode::div(class)
                .child(ViewNode::new("h2").text(cx.t("map_data.title")))
                .child(kv_list(json_pairs(&f.properties))),
            Self::Rapid(f) => ViewNode::div(class)
                .child(ViewNode::new("h2").text(cx.t("rapid_feature_inspector.title")))
                .child(ViewNode::div("rapid-dataset").text(f.dataset_id.as_str()))
                .child(kv_list(f.tags.iter().map(|(k, v)| (k.clone(), v.clone())))),
            Self::Overture(f) => ViewNode::div(class)
                .child(ViewNode::new("h2").text(cx.t("overture_inspector.title")))
                .child(kv_list(json_pairs(&f.properties))),
            Self::Detection(d) => {
                let title = cx
                    .services
                    .l10n
                    .t("mapillary.detection", &[("type", d.object_type.as_str())]);
                let mut node = ViewNode::div(class).child(ViewNode::new("h2").text(title));
                if let Some(image) = &d.best_image_id {
                    node = node.child(ViewNode::div("detection-image").attr("data-image", image.as_str()));
                }
                node
            }
        }
    }
}

fn kv_list(pairs: impl Iterator<Item = (String, String)>) -> ViewNode {
    ViewNode::new("ul")
        .class("kv-list")
        .children(pairs.map(|(k, v)| ViewNode::new("li").class("kv-row").text(format!("{k}={v}"))))
}

fn json_pairs<'a>(
    map: &'a serde_json::Map<String, serde_json::Value>,
) -> impl Iterator<Item = (String, String)> + 'a {
    map.iter().map(|(k, v)| {
        let v = v.as_str().map_or_else(|| v.to_string(), str::to_owned);
        (k.clone(), v)
    })
}

/// A fresher copy of a payload from the collaborator that owns it.
#[derive(Debug, Clone, PartialEq)]
pub enum Latest {
    Found(SelectionPayload),
    Missing,
    NoService,
}

/// Ask the owning collaborator for its current copy of `payload`.
///
/// Map markers may carry stale data, so panels are always built from this.
/// OSM entity sets are read from the graph at render time and report
/// [`Latest::NoService`].
#[must_use]
pub fn latest_copy(payload: &SelectionPayload, services: &Services) -> Latest {
    fn found<T>(service: Option<T>, f: impl FnOnce(T) -> Option<SelectionPayload>) -> Latest {
        match service {
            None => Latest::NoService,
            Some(s) => f(s).map_or(Latest::Missing, Latest::Found),
        }
    }
    let features = services.features.as_deref();
    match payload {
        SelectionPayload::Note(n) => found(services.notes.as_deref(), |s| {
            s.get_note(n.id).map(SelectionPayload::Note)
        }),
        SelectionPayload::QaItem(q) => found(services.qa.as_deref(), |s| {
            s.get_item(q.service, &q.id).map(SelectionPayload::QaItem)
        }),
        SelectionPayload::CustomGeoData(c) => found(features, |s| {
            s.custom_feature(&c.feature_hash)
                .map(SelectionPayload::CustomGeoData)
        }),
        SelectionPayload::AiFeature(a) => found(features, |s| {
            s.ai_feature(&a.dataset_id, &a.id)
                .map(SelectionPayload::AiFeature)
        }),
        SelectionPayload::OvertureFeature(o) => found(features, |s| {
            s.overture_feature(&o.dataset_id, &o.id)
                .map(SelectionPayload::OvertureFeature)
        }),
        SelectionPayload::Detection(d) => {
            found(features, |s| s.detection(&d.key).map(SelectionPayload::Detection))
        }
        SelectionPayload::OsmEntitySet(_) => Latest::NoService,
    }
}
