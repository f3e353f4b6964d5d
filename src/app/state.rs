//! Session state and its transitions.
//!
//! [`SessionState`] is the in-memory half of a session: the current event list in
//! upstream order, the search phase, and the last error. It is plain data with
//! synchronous transitions; the [`EventSession`](crate::app::EventSession)
//! controller owns one behind a lock and publishes clones of it as snapshots.
//!
//! # Request Ordering
//!
//! Each [`begin_search`](SessionState::begin_search) issues a new request id. An
//! outcome is applied only if its id is still the latest one issued, so a slow
//! response for an older search can never overwrite a newer result.
//!
//! # Example
//!
//! ```rust
//! use gigscout::app::{Completion, SessionState};
//! use gigscout::domain::SearchQuery;
//!
//! let mut state = SessionState::new();
//! let first = state.begin_search(SearchQuery::city("Austin"));
//! let second = state.begin_search(SearchQuery::city("Denver"));
//!
//! assert_eq!(state.complete_search(first, Ok(vec![])), Completion::Stale);
//! assert_eq!(state.complete_search(second, Ok(vec![])), Completion::Applied);
//! ```

use super::modes::{Completion, SearchPhase};
use crate::domain::error::Result;
use crate::domain::{Event, SearchQuery};
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

/// Identifier of an issued search, increasing within a session.
pub type RequestId = u64;

/// Current session data as seen by the presentation layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    /// Events from the most recent successful search, in upstream order.
    ///
    /// Replaced wholesale on success, untouched on failure.
    pub events: Vec<Event>,

    /// Phase of the latest issued search.
    pub phase: SearchPhase,

    /// Display message for the latest failed search. Cleared when a search starts.
    pub last_error: Option<String>,

    /// Query of the latest issued search.
    pub query: Option<SearchQuery>,

    latest_request: RequestId,
}

impl SessionState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.phase == SearchPhase::Loading
    }

    /// Starts a search: loading on, error cleared, new request id issued.
    ///
    /// The event list is left as-is so the previous results stay visible while
    /// loading.
    pub fn begin_search(&mut self, query: SearchQuery) -> RequestId {
        self.latest_request += 1;
        self.phase = SearchPhase::Loading;
        self.last_error = None;
        self.query = Some(query);

        tracing::debug!(request = self.latest_request, "search started");
        self.latest_request
    }

    /// Returns `true` if `request` is the most recently issued search.
    #[must_use]
    pub const fn is_current(&self, request: RequestId) -> bool {
        request == self.latest_request
    }

    /// Applies the outcome of `request` if it is still current.
    ///
    /// Success replaces the event list; failure records the error and keeps the
    /// list. Stale outcomes change nothing.
    pub fn complete_search(
        &mut self,
        request: RequestId,
        outcome: Result<Vec<Event>>,
    ) -> Completion {
        if !self.is_current(request) {
            tracing::debug!(
                request = request,
                latest = self.latest_request,
                "dropping stale search outcome"
            );
            return Completion::Stale;
        }

        match outcome {
            Ok(events) => {
                tracing::debug!(request = request, event_count = events.len(), "search applied");
                self.events = events;
                self.phase = SearchPhase::Succeeded;
                Completion::Applied
            }
            Err(e) => {
                tracing::debug!(request = request, error = %e, "search failed");
                self.last_error = Some(e.to_string());
                self.phase = SearchPhase::Failed;
                Completion::Failed
            }
        }
    }

    /// First event in the list carrying `id`.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&Event> {
        self.events.iter().find(|event| event.has_id(id))
    }
}

/// Events whose name contains every whitespace-separated token of `query`.
///
/// Matching is fuzzy and case-insensitive. An empty or blank query keeps every
/// event. Order is preserved.
#[must_use]
pub fn filter_by_name(events: Vec<Event>, query: &str) -> Vec<Event> {
    let tokens: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();
    if tokens.is_empty() {
        return events;
    }

    let matcher = SkimMatcherV2::default();
    events
        .into_iter()
        .filter(|event| {
            let name = event.display_name().to_lowercase();
            tokens.iter().all(|token| matcher.fuzzy_match(&name, token).is_some())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::event::fixtures::event;
    use crate::domain::GigscoutError;

    #[test]
    fn begin_search_keeps_events_and_clears_error() {
        let mut state = SessionState::new();
        let first = state.begin_search(SearchQuery::city("Austin"));
        state.complete_search(first, Err(GigscoutError::Network("offline".into())));
        assert!(state.last_error.is_some());

        state.events = vec![event("E1", "One")];
        state.begin_search(SearchQuery::city("Austin"));

        assert!(state.is_loading());
        assert_eq!(state.last_error, None);
        assert_eq!(state.events.len(), 1);
    }

    #[test]
    fn failure_keeps_previous_events() {
        let mut state = SessionState::new();
        let ok = state.begin_search(SearchQuery::city("Austin"));
        state.complete_search(ok, Ok(vec![event("E1", "One"), event("E2", "Two")]));

        let bad = state.begin_search(SearchQuery::city("Nowhere"));
        let completion =
            state.complete_search(bad, Err(GigscoutError::Geocoding("Nowhere".into())));

        assert_eq!(completion, Completion::Failed);
        assert_eq!(state.phase, SearchPhase::Failed);
        assert_eq!(state.events.len(), 2);
        assert!(!state.last_error.as_deref().unwrap_or_default().is_empty());
        assert!(!state.is_loading());
    }

    #[test]
    fn stale_outcome_is_ignored() {
        let mut state = SessionState::new();
        let a = state.begin_search(SearchQuery::city("Austin"));
        let b = state.begin_search(SearchQuery::city("Denver"));

        let late = || Err(GigscoutError::Network("late".into()));
        assert_eq!(
            state.complete_search(b, Ok(vec![event("D1", "Denver show")])),
            Completion::Applied
        );
        assert_eq!(
            state.complete_search(a, Ok(vec![event("A1", "Austin show")])),
            Completion::Stale
        );
        assert_eq!(state.complete_search(a, late()), Completion::Stale);

        assert_eq!(state.events[0].id.as_deref(), Some("D1"));
        assert_eq!(state.phase, SearchPhase::Succeeded);
        assert_eq!(state.last_error, None);
    }

    #[test]
    fn empty_success_clears_list() {
        let mut state = SessionState::new();
        state.events = vec![event("E1", "One")];
        let request = state.begin_search(SearchQuery::coordinate(0.0, 0.0));
        state.complete_search(request, Ok(vec![]));
        assert!(state.events.is_empty());
    }

    #[test]
    fn filter_requires_all_tokens() {
        let events = vec![
            event("1", "Khruangbin Live"),
            event("2", "Austin City Limits"),
            event("3", "Live at the Moody"),
        ];

        let names = |events: Vec<Event>| -> Vec<String> {
            events
                .iter()
                .map(|e| e.display_name().to_string())
                .collect()
        };

        assert_eq!(
            names(filter_by_name(events.clone(), "live")),
            ["Khruangbin Live", "Live at the Moody"]
        );
        assert_eq!(names(filter_by_name(events.clone(), "LIVE moody")), ["Live at the Moody"]);
        assert_eq!(filter_by_name(events.clone(), "   ").len(), 3);
        assert!(filter_by_name(events, "zzz").is_empty());
    }
}
