#![forbid(unsafe_code)]

//! Editor interaction modes, as far as the sidebar cares about them.

use std::fmt;
use std::str::FromStr;

use rapid_core::SelectionPayload;
use serde::{Deserialize, Serialize};

/// The editor's current top-level mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InteractionMode {
    #[default]
    Browse,
    Select,
    SelectOsm,
    SelectNote,
    SelectError,
    SelectData,
    AddPoint,
    AddLine,
    AddArea,
    AddNote,
    DrawLine,
    DrawArea,
    DragNode,
    DragNote,
    Save,
}

impl InteractionMode {
    pub const ALL: [Self; 15] = [
        Self::Browse,
        Self::Select,
        Self::SelectOsm,
        Self::SelectNote,
        Self::SelectError,
        Self::SelectData,
        Self::AddPoint,
        Self::AddLine,
        Self::AddArea,
        Self::AddNote,
        Self::DrawLine,
        Self::DrawArea,
        Self::DragNode,
        Self::DragNote,
        Self::Save,
    ];

    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Browse => "browse",
            Self::Select => "select",
            Self::SelectOsm => "select-osm",
            Self::SelectNote => "select-note",
            Self::SelectError => "select-error",
            Self::SelectData => "select-data",
            Self::AddPoint => "add-point",
            Self::AddLine => "add-line",
            Self::AddArea => "add-area",
            Self::AddNote => "add-note",
            Self::DrawLine => "draw-line",
            Self::DrawArea => "draw-area",
            Self::DragNode => "drag-node",
            Self::DragNote => "drag-note",
            Self::Save => "save",
        }
    }

    /// A hard OSM selection is showing; hover must not replace it.
    ///
    /// Only the two entity-selection modes pin. Selecting a note, QA issue
    /// or data feature still lets hover preview other things.
    #[must_use]
    pub const fn pins_selection(self) -> bool {
        matches!(self, Self::Select | Self::SelectOsm)
    }

    /// Whether a hover of `payload` is dropped in this mode.
    #[must_use]
    pub fn ignores_hover(self, payload: Option<&SelectionPayload>) -> bool {
        self.pins_selection()
            || (self == Self::DragNote && matches!(payload, Some(SelectionPayload::Note(_))))
    }
}

impl fmt::Display for InteractionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Unknown mode id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown interaction mode: {0:?}")]
pub struct ParseModeError(pub String);

impl FromStr for InteractionMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.id() == s)
            .ok_or_else(|| ParseModeError(s.to_owned()))
    }
}
