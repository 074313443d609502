//! Property-based tests for sidebar content routing.
//!
//! Random interleavings of hover, select, clock advances and mode changes
//! must uphold:
//!
//! 1. **Select wins** — right after a select the slot shows exactly what
//!    was selected, and it stays that way until the next hover, however
//!    long the clock runs.
//! 2. **Pinned modes** — while the mode pins the selection, hovers and
//!    clock advances never change the slot.
//! 3. **Resolvable inspector** — an inspector never shows an id the graph
//!    cannot resolve.
//! 4. **Consistent mode** — a hover inspector is only ever reported with
//!    the hover route mode, a select inspector with the select mode.

use std::time::Duration;

use proptest::prelude::*;
use rapid_core::{EntityId, Graph, GraphHandle, LatLon, Note, SelectionPayload};
use rapid_harness::{Fixture, cafe_at};
use rapid_search::SearchConfig;
use rapid_sidebar::{
    Content, InspectorState, InteractionMode, RouteMode, SidebarConfig, SidebarRouter,
};
use web_time::Instant;

/// Nodes 1..=4 exist; 5 and 6 do not.
const KNOWN: i64 = 4;

#[derive(Debug, Clone)]
enum Op {
    HoverEntity(i64),
    HoverNote,
    HoverNothing,
    SelectEntity(i64),
    SelectNothing,
    Advance(u64),
    Pin(bool),
}

// ── Strategies ──────────────────────────────────────────────────────────

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (1i64..=6).prop_map(Op::HoverEntity),
        1 => Just(Op::HoverNote),
        1 => Just(Op::HoverNothing),
        3 => (1i64..=6).prop_map(Op::SelectEntity),
        1 => Just(Op::SelectNothing),
        3 => (0u64..400).prop_map(Op::Advance),
        1 => any::<bool>().prop_map(Op::Pin),
    ]
}

fn ops() -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(op(), 1..60)
}

// ── Harness ─────────────────────────────────────────────────────────────

fn router(fx: &Fixture) -> (SidebarRouter, GraphHandle) {
    let graph = GraphHandle::new(Graph::with_base(
        (1..=KNOWN).map(|i| cafe_at(i, &format!("Cafe {i}"), i as f64 * 0.001, 0.0)),
    ));
    let router = SidebarRouter::new(
        fx.services(),
        graph.clone(),
        SidebarConfig::default(),
        SearchConfig::default(),
    );
    (router, graph)
}

fn expected_after_select(id: Option<i64>) -> Option<Vec<EntityId>> {
    id.filter(|n| (1..=KNOWN).contains(n))
        .map(|n| vec![EntityId::node(n)])
}

fn check_consistency(router: &SidebarRouter, graph: &GraphHandle) -> Result<(), TestCaseError> {
    if let Content::Inspector(panel) = router.content() {
        prop_assert!(panel.resolves_in(&graph.snapshot()));
        let expected = match panel.state() {
            InspectorState::Hover => RouteMode::Hover,
            InspectorState::Select => RouteMode::Select,
        };
        prop_assert_eq!(router.route_mode(), expected);
    }
    Ok(())
}

proptest! {
    #[test]
    fn routing_invariants_hold(ops in ops()) {
        let fx = Fixture::new();
        fx.notes.put(Note::new(9, LatLon::default()));
        let (mut router, graph) = router(&fx);
        let mut now = Instant::now();
        // Slot content that must survive until the next hover.
        let mut held: Option<Content> = None;
        let mut pinned = false;

        for op in ops {
            match op {
                Op::HoverEntity(n) => {
                    router.hover(Some(SelectionPayload::entity(EntityId::node(n))), now);
                    if !pinned {
                        held = None;
                    }
                }
                Op::HoverNote => {
                    router.hover(Some(SelectionPayload::Note(Note::new(9, LatLon::default()))), now);
                    if !pinned {
                        held = None;
                    }
                }
                Op::HoverNothing => {
                    router.hover(None, now);
                    if !pinned {
                        held = None;
                    }
                }
                Op::SelectEntity(n) => {
                    router.enter(Some(SelectionPayload::entity(EntityId::node(n))));
                    match expected_after_select(Some(n)) {
                        Some(ids) => {
                            let Content::Inspector(panel) = router.content() else {
                                return Err(TestCaseError::fail("select did not open the inspector"));
                            };
                            prop_assert_eq!(panel.entity_ids(), ids.as_slice());
                            prop_assert_eq!(panel.state(), InspectorState::Select);
                        }
                        None => prop_assert_eq!(router.content(), &Content::FeatureList),
                    }
                    held = Some(router.content().clone());
                }
                Op::SelectNothing => {
                    router.enter(None);
                    prop_assert_eq!(router.content(), &Content::FeatureList);
                    held = Some(router.content().clone());
                }
                Op::Advance(ms) => {
                    now += Duration::from_millis(ms);
                    router.tick(now);
                }
                Op::Pin(on) => {
                    let mode = if on { InteractionMode::Select } else { InteractionMode::Browse };
                    router.set_mode(mode);
                    pinned = on;
                    // A hover queued while pinned may still land after unpinning.
                    held = on.then(|| router.content().clone());
                }
            }
            if let Some(held) = &held {
                prop_assert_eq!(router.content(), held);
            }
            check_consistency(&router, &graph)?;
        }
    }

    #[test]
    fn at_most_one_panel_is_live(ops in ops()) {
        let fx = Fixture::new();
        fx.notes.put(Note::new(9, LatLon::default()));
        let (mut router, _graph) = router(&fx);
        router.render(Some(rapid_sidebar::Mount::new("sidebar")));
        let mut now = Instant::now();
        for op in ops {
            match op {
                Op::HoverEntity(n) => router.hover(Some(SelectionPayload::entity(EntityId::node(n))), now),
                Op::HoverNote => router.hover(Some(SelectionPayload::Note(Note::new(9, LatLon::default()))), now),
                Op::HoverNothing => router.hover(None, now),
                Op::SelectEntity(n) => router.enter(Some(SelectionPayload::entity(EntityId::node(n)))),
                Op::SelectNothing => router.enter(None),
                Op::Advance(ms) => {
                    now += Duration::from_millis(ms);
                    router.tick(now);
                }
                Op::Pin(on) => router.set_mode(if on { InteractionMode::Select } else { InteractionMode::Browse }),
            }
            let tree = router.render(None).cloned();
            let Some(tree) = tree else {
                return Err(TestCaseError::fail("mounted router did not render"));
            };
            let panels = tree.find_all("inspector-wrap").len() + tree.find_all("sidebar-component").len();
            prop_assert!(panels <= 1);
            let list_visible = tree
                .find("feature-list-pane")
                .is_some_and(|n| !n.has_class("inspector-hidden"));
            prop_assert_eq!(list_visible, panels == 0);
        }
    }
}
