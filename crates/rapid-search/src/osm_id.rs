#![forbid(unsafe_code)]

//! OSM id queries: `n123`, `way 42`, `relation/7`, `note 99`.

use std::sync::LazyLock;

use rapid_core::{EntityId, EntityKind, NoteId};
use regex::Regex;

static ID_QUERY: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|\W)(node|way|relation|note|[nwr])\W?0*([1-9]\d*)(?:\W|$)").ok()
});

static ALL_DIGITS: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"^[0-9]+$").ok());

/// What an id-shaped query refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdMatch {
    Entity(EntityId),
    Note(NoteId),
}

/// Find the first id-shaped fragment in `query`.
///
/// Leading zeros are ignored; ids too large for an `i64` do not match.
#[must_use]
pub fn match_id(query: &str) -> Option<IdMatch> {
    let caps = ID_QUERY.as_ref()?.captures(query)?;
    let word = caps.get(1)?.as_str().to_ascii_lowercase();
    let num: i64 = caps.get(2)?.as_str().parse().ok()?;
    if word == "note" {
        return Some(IdMatch::Note(NoteId(num)));
    }
    let kind = word.chars().next().and_then(EntityKind::from_prefix)?;
    Some(IdMatch::Entity(EntityId::new(kind, num)))
}

/// True when the query is nothing but ASCII digits.
#[must_use]
pub fn is_numeric(query: &str) -> bool {
    ALL_DIGITS.as_ref().is_some_and(|re| re.is_match(query))
}
