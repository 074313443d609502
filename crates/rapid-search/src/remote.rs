#![forbid(unsafe_code)]

//! Geocode request bookkeeping.
//!
//! # Design
//!
//! Every outgoing request is tagged with a sequence number. Typing a new
//! query bumps the sequence as well, so any response still in flight for
//! the old text is stale before it even lands. A response is applied only
//! when its sequence equals the latest one issued; everything else is
//! dropped without touching the visible list.
//!
//! # Invariants
//!
//! 1. `results` is non-empty only in [`RemoteStatus::Complete`].
//! 2. `results` always belong to `results_query`.

use rapid_core::GeocodeResult;

/// Remote half of the search, as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteStatus {
    /// No geocoder configured.
    Unavailable,
    /// Nothing requested for the current query.
    Idle,
    /// Waiting for the response to request `seq`.
    Pending { seq: u64 },
    /// Response applied (possibly empty).
    Complete,
    /// The request failed; the list offers a retry.
    Failed { message: String },
}

#[derive(Debug)]
pub(crate) struct RemoteState {
    available: bool,
    latest_seq: u64,
    status: RemoteStatus,
    results_query: Option<String>,
    results: Vec<GeocodeResult>,
}

impl RemoteState {
    pub(crate) fn new(available: bool) -> Self {
        Self {
            available,
            latest_seq: 0,
            status: if available {
                RemoteStatus::Idle
            } else {
                RemoteStatus::Unavailable
            },
            results_query: None,
            results: Vec::new(),
        }
    }

    pub(crate) fn status(&self) -> &RemoteStatus {
        &self.status
    }

    pub(crate) fn latest_seq(&self) -> u64 {
        self.latest_seq
    }

    /// The query changed: whatever is in flight is now stale.
    pub(crate) fn invalidate(&mut self) {
        self.latest_seq += 1;
        self.results.clear();
        self.results_query = None;
        if self.available {
            self.status = RemoteStatus::Idle;
        }
    }

    /// Allocate a sequence number for a new request.
    pub(crate) fn begin(&mut self) -> u64 {
        self.latest_seq += 1;
        self.results.clear();
        self.results_query = None;
        self.status = RemoteStatus::Pending {
            seq: self.latest_seq,
        };
        self.latest_seq
    }

    /// Apply a response. Returns false when it was stale and dropped.
    pub(crate) fn complete(
        &mut self,
        seq: u64,
        query: String,
        outcome: Result<Vec<GeocodeResult>, String>,
    ) -> bool {
        if seq != self.latest_seq {
            return false;
        }
        match outcome {
            Ok(results) => {
                self.results = results;
                self.results_query = Some(query);
                self.status = RemoteStatus::Complete;
            }
            Err(message) => {
                self.results.clear();
                self.results_query = None;
                self.status = RemoteStatus::Failed { message };
            }
        }
        true
    }

    /// Results for `query`, if the applied response belongs to it.
    pub(crate) fn results_for(&self, query: &str) -> &[GeocodeResult] {
        match &self.results_query {
            Some(q) if q == query => self.results.as_slice(),
            _ => &[],
        }
    }
}
