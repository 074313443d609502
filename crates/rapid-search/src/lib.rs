#![forbid(unsafe_code)]

//! Feature search for the Rapid sidebar.
//!
//! # Role in Rapid
//! `rapid-search` turns the text in the feature list's search box into an
//! ordered list of rows. It understands coordinates in decimal and
//! sexagesimal notation, OSM ids, names of entities already in the graph,
//! and the answers of a worldwide geocoder.
//!
//! # Primary responsibilities
//! - **Parsing**: [`coords`] and [`osm_id`] recognize location and id queries.
//! - **Ranking**: [`FeatureSearch::search`] concatenates five fixed groups.
//! - **Remote results**: geocoder responses are sequence-checked so a slow
//!   answer for old text never replaces the current list.
//! - **Activation**: clicking a row drives the map or yields a payload to select.
//!
//! # Usage
//!
//! ```
//! use rapid_core::{Entity, Graph, GraphHandle, LatLon};
//! use rapid_harness::Fixture;
//! use rapid_search::{FeatureSearch, RankGroup, SearchConfig};
//!
//! let fx = Fixture::new();
//! let graph = GraphHandle::new(Graph::with_base([
//!     Entity::node(1, LatLon::new(2.35, 48.85)).with_tag("name", "Le Petit Cafe"),
//! ]));
//! let search = FeatureSearch::new(fx.services(), graph, SearchConfig::default());
//! let rows = search.search("petit");
//! assert_eq!(rows[0].group, RankGroup::Local);
//! ```

pub mod config;
pub mod coords;
pub mod engine;
pub mod osm_id;
mod remote;
pub mod result;

pub use config::SearchConfig;
pub use coords::{parse_location, sexagesimal_pair};
pub use engine::{Activation, FeatureSearch, ListStatus, SearchEvent};
pub use osm_id::{IdMatch, is_numeric, match_id};
pub use remote::RemoteStatus;
pub use result::{RankGroup, ResultGeometry, ResultKey, ResultTarget, SearchResult};
