//! End-to-end search flows against scripted collaborators.

use std::time::Duration;

use rapid_core::{Extent, Graph, GraphHandle, LatLon, Note, NoteId, SelectionPayload};
use rapid_harness::{Fixture, TraceCapture, cafe_at, geocode_hit};
use rapid_search::{
    Activation, FeatureSearch, RankGroup, RemoteStatus, ResultGeometry, ResultTarget,
    SearchConfig, SearchEvent,
};
use web_time::Instant;

fn engine(fx: &Fixture, config: SearchConfig) -> FeatureSearch {
    FeatureSearch::new(fx.services(), GraphHandle::new(Graph::new()), config)
}

fn manual() -> SearchConfig {
    SearchConfig {
        auto_geocode: false,
        ..SearchConfig::default()
    }
}

#[test]
fn late_response_for_old_query_is_dropped() {
    let fx = Fixture::new();
    let mut search = engine(&fx, manual());
    let now = Instant::now();

    search.set_query("berlin", now);
    search.request_geocode();
    search.set_query("bern", now);
    search.request_geocode();

    fx.geocoder
        .respond("bern", vec![geocode_hit("relation", 1, "place", "city", "Bern")]);
    assert_eq!(search.pump(now), vec![SearchEvent::ResultsChanged]);

    fx.geocoder
        .respond("berlin", vec![geocode_hit("relation", 2, "place", "city", "Berlin")]);
    assert!(search.pump(now).is_empty());

    let rows = search.results();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].label, "Bern");
    assert_eq!(rows[0].kind_label, "City");
}

#[test]
fn response_arriving_after_edit_is_ignored_even_if_alone() {
    let fx = Fixture::new();
    let mut search = engine(&fx, manual());
    let now = Instant::now();
    search.set_query("oslo", now);
    search.request_geocode();
    search.set_query("osl", now);
    fx.geocoder
        .respond("oslo", vec![geocode_hit("node", 3, "place", "city", "Oslo")]);
    assert!(search.pump(now).is_empty());
    assert_eq!(search.remote_status(), &RemoteStatus::Idle);
    assert!(search.results().is_empty());
}

#[test]
fn geocode_rows_classify_through_presets() {
    let fx = Fixture::new();
    let mut search = engine(&fx, manual());
    let now = Instant::now();
    search.set_query("mission", now);
    search.request_geocode();
    let mut hit = geocode_hit("way", 9, "building", "yes", "Mission Dolores");
    hit.boundingbox = ["37.76", "37.77", "-122.43", "-122.42"]
        .map(String::from)
        .to_vec();
    let unknown = geocode_hit("changeset", 4, "x", "y", "Not an entity");
    let zero = geocode_hit("node", 0, "place", "city", "Zero");
    fx.geocoder.respond("mission", vec![hit, unknown, zero]);
    search.pump(now);

    let rows = search.results();
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row.group, RankGroup::Geocode);
    assert_eq!(row.kind_label, "Building");
    assert_eq!(row.geometry, ResultGeometry::Area);
    let extent = row.extent.expect("bounding box");
    assert_eq!(
        extent,
        Extent::new(LatLon::new(-122.43, 37.76), LatLon::new(-122.42, 37.77))
    );
}

#[test]
fn geocode_rows_sit_between_local_and_speculative() {
    let fx = Fixture::new();
    let graph = GraphHandle::new(Graph::with_base([cafe_at(1, "Cafe 123", 0.0, 0.0)]));
    let mut search = FeatureSearch::new(fx.services(), graph, manual());
    let now = Instant::now();
    search.set_query("123", now);
    assert!(search.request_geocode());
    fx.geocoder
        .respond("123", vec![geocode_hit("way", 55, "highway", "residential", "123 Street")]);
    assert_eq!(search.pump(now), vec![SearchEvent::ResultsChanged]);

    let rows = search.results();
    let groups: Vec<RankGroup> = rows.iter().map(|r| r.group).collect();
    assert_eq!(
        groups,
        vec![
            RankGroup::Local,
            RankGroup::Geocode,
            RankGroup::Speculative,
            RankGroup::Speculative,
            RankGroup::Speculative,
            RankGroup::Speculative,
        ]
    );
    assert_eq!(rows[0].label, "Cafe 123");
    assert_eq!(rows[1].label, "123 Street");
    assert_eq!(rows[5].target, ResultTarget::Note(NoteId(123)));
}

#[test]
fn auto_geocode_waits_for_typing_to_pause() {
    let fx = Fixture::new();
    let mut search = engine(&fx, SearchConfig::default());
    let t0 = Instant::now();
    search.set_query("p", t0);
    search.set_query("pa", t0 + Duration::from_millis(100));
    search.set_query("par", t0 + Duration::from_millis(200));
    search.pump(t0 + Duration::from_millis(400));
    assert!(fx.geocoder.requests().is_empty());
    search.pump(t0 + Duration::from_millis(450));
    assert_eq!(fx.geocoder.requests(), vec!["par".to_owned()]);
}

#[test]
fn failed_geocode_offers_retry() {
    let fx = Fixture::new();
    let mut search = engine(&fx, manual());
    let now = Instant::now();
    search.set_query("lima", now);
    search.request_geocode();
    fx.geocoder.fail_next("lima", "503");
    search.pump(now);
    let status = search.list_status(&search.results());
    assert!(status.offer_retry);
    assert!(status.no_results);
    assert!(search.retry());
    assert_eq!(fx.geocoder.requests(), vec!["lima".to_owned(), "lima".to_owned()]);
}

#[test]
fn cached_note_selects_immediately() {
    let fx = Fixture::new();
    fx.notes.put(Note::new(12, LatLon::new(10.0, 20.0)));
    let mut search = engine(&fx, manual());
    let rows = search.search("note 12");
    let Activation::Select(SelectionPayload::Note(note)) = search.activate(&rows[0]) else {
        panic!("expected note selection");
    };
    assert_eq!(note.id, NoteId(12));
    let calls = fx.map.calls();
    assert_eq!(calls[0], "layer notes");
    assert!(calls[1].starts_with("center 10.0000,20.0000"));
}

#[test]
fn downloaded_note_selects_on_pump() {
    let fx = Fixture::new();
    fx.notes.put_on_server(Note::new(12, LatLon::new(10.0, 20.0)));
    let mut search = engine(&fx, manual());
    let rows = search.search("note 12");
    assert_eq!(search.activate(&rows[0]), Activation::Pending);
    fx.notes.finish_load(NoteId(12));
    let events = search.pump(Instant::now());
    assert!(matches!(
        events.as_slice(),
        [SearchEvent::Select(SelectionPayload::Note(n))] if n.id == NoteId(12)
    ));
}

#[test]
fn note_download_superseded_by_later_click_is_dropped() {
    let fx = Fixture::new();
    fx.notes.put_on_server(Note::new(12, LatLon::new(10.0, 20.0)));
    let mut search = engine(&fx, manual());
    let note_row = search.search("note 12").remove(0);
    let way_row = search.search("w5").remove(0);
    assert_eq!(search.activate(&note_row), Activation::Pending);
    assert_eq!(search.activate(&way_row), Activation::Navigated);
    fx.notes.finish_load(NoteId(12));
    assert!(search.pump(Instant::now()).is_empty());
    assert!(!fx.map.calls().iter().any(|c| c == "layer notes"));
}

#[test]
fn clear_resets_query_and_drops_pending_work() {
    let fx = Fixture::new();
    let mut search = engine(&fx, manual());
    let now = Instant::now();
    search.set_query("w5", now);
    search.request_geocode();
    search.clear();
    assert_eq!(search.value(), "");
    fx.geocoder.respond("w5", Vec::new());
    assert!(search.pump(now).is_empty());
    assert!(search.results().is_empty());
}

#[test]
fn speculative_note_row_targets_note() {
    let fx = Fixture::new();
    let search = engine(&fx, manual());
    let rows = search.search("77");
    assert_eq!(rows.last().map(|r| r.target), Some(ResultTarget::Note(NoteId(77))));
}

#[test]
fn stale_response_is_logged() {
    let capture = TraceCapture::new();
    let _guard = capture.install();
    let fx = Fixture::new();
    let mut search = engine(&fx, manual());
    let now = Instant::now();
    search.set_query("a", now);
    search.request_geocode();
    search.set_query("b", now);
    fx.geocoder.respond("a", Vec::new());
    search.pump(now);
    let event = capture.find("search.geocode.stale").expect("stale event");
    assert_eq!(event.field("seq"), Some("2"));
    assert_eq!(event.field("latest"), Some("3"));
}
