#![forbid(unsafe_code)]

//! The Rapid editor sidebar.
//!
//! # Role in Rapid
//! The sidebar sits beside the map and shows exactly one thing at a time:
//! the feature list with its search box, the OSM inspector, or one of the
//! custom panels for notes, QA issues and third-party data. This crate owns
//! the decision of what to show, the panels themselves, and the sidebar's
//! width and collapsed state.
//!
//! # Primary responsibilities
//! - **Routing**: [`SidebarRouter`] maps hover and select events to a panel,
//!   throttles hover, and discards asynchronous results that arrive after
//!   the panel they were meant for is gone.
//! - **Panels**: [`panel`] holds the inspector and the custom panels, each
//!   rendered as a pure function of its state into a [`ViewNode`] tree.
//! - **Layout**: [`SidebarResizer`] turns pointer drags into widths,
//!   collapses below the minimum width and persists the result.
//!
//! # Usage
//!
//! ```
//! use rapid_core::{EntityId, Graph, GraphHandle, SelectionPayload};
//! use rapid_harness::{Fixture, cafe_at};
//! use rapid_search::SearchConfig;
//! use rapid_sidebar::{Content, Mount, SidebarConfig, SidebarRouter};
//!
//! let fx = Fixture::new();
//! let graph = GraphHandle::new(Graph::with_base([cafe_at(1, "Corner Cafe", 0.0, 0.0)]));
//! let mut router = SidebarRouter::new(
//!     fx.services(),
//!     graph,
//!     SidebarConfig::default(),
//!     SearchConfig::default(),
//! );
//! router.enter(Some(SelectionPayload::entity(EntityId::node(1))));
//! assert!(matches!(router.content(), Content::Inspector(_)));
//!
//! let tree = router.render(Some(Mount::new("sidebar"))).cloned();
//! assert!(tree.is_some_and(|t| t.find("inspector-wrap").is_some()));
//! ```

pub mod config;
pub mod error;
pub mod feature_list;
pub mod mode;
pub mod panel;
pub mod resizer;
pub mod router;
pub mod view;

pub use config::SidebarConfig;
pub use error::PanelError;
pub use mode::{InteractionMode, ParseModeError};
pub use panel::{
    CustomPanel, InspectorPanel, InspectorState, Latest, NotePanel, PanelKind, Refresh,
    RenderContext, TagView, latest_copy,
};
pub use resizer::{Pointer, ResizeOutcome, SidebarResizer};
pub use router::{Content, EnterOptions, ResetTarget, RouteMode, RouterState, SidebarRouter};
pub use view::{Mount, ViewNode};
