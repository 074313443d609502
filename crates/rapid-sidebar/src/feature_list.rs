#![forbid(unsafe_code)]

//! The default view: search box plus result list.

use rapid_core::Localizer;
use rapid_search::{FeatureSearch, SearchResult};

use crate::view::ViewNode;

/// Render the feature list for the search's current query.
#[must_use]
pub fn render(search: &FeatureSearch, l10n: &dyn Localizer) -> ViewNode {
    let results = search.results();
    let status = search.list_status(&results);

    let mut rows: Vec<ViewNode> = results.iter().map(result_row).collect();
    if status.searching {
        rows.push(
            ViewNode::new("li")
                .class("geocode-item")
                .class("searching")
                .text(l10n.t("geocoder.searching", &[])),
        );
    }
    if status.no_results {
        rows.push(
            ViewNode::new("li")
                .class("no-results-item")
                .text(l10n.t("geocoder.no_results_worldwide", &[])),
        );
    }
    if status.offer_geocode {
        rows.push(
            ViewNode::new("li")
                .class("geocode-item")
                .text(l10n.t("geocoder.search", &[])),
        );
    }
    if status.offer_retry {
        rows.push(
            ViewNode::new("li")
                .class("geocode-item")
                .class("failed")
                .text(l10n.t("geocoder.failed", &[])),
        );
    }

    ViewNode::div("feature-list-pane")
        .child(ViewNode::new("h2").text(l10n.t("inspector.feature_list", &[])))
        .child(
            ViewNode::new("input")
                .class("feature-search")
                .attr("placeholder", l10n.t("inspector.search", &[]))
                .attr("value", search.value()),
        )
        .child(ViewNode::new("ul").class("feature-list").children(rows))
}

fn result_row(result: &SearchResult) -> ViewNode {
    let mut row = ViewNode::new("li")
        .class("feature-list-item")
        .class(result.geometry.as_str())
        .attr("data-key", result.key().to_string());
    if let Some(color) = &result.color {
        row = row.attr("style", format!("color: {color}"));
    }
    row.child(ViewNode::new("span").class("entity-type").text(result.kind_label.as_str()))
        .child(ViewNode::new("span").class("entity-name").text(result.label.as_str()))
}
