//! Session controller: the single mutation point reachable from the presentation layer.
//!
//! [`EventSession`] owns the [`SessionState`] and the [`FavouritesStore`] behind one
//! lock, drives searches through the injected [`Geocoder`] and [`EventSource`], and
//! publishes a full snapshot on a `watch` channel after every observable change.
//!
//! # Consistency
//!
//! - The lock is never held across an `.await`. A search takes it once to begin
//!   and once to complete.
//! - Completing a search replaces the list, reconciles favourite flags, and saves
//!   the last search under a single acquisition, then publishes once.
//! - Favourite toggles write through to the store before the call returns.
//!
//! # Example
//!
//! ```no_run
//! use gigscout::app::EventSession;
//! use gigscout::client::{DiscoveryClient, NominatimGeocoder};
//! use gigscout::storage::JsonFileStore;
//! use gigscout::Config;
//! use std::sync::Arc;
//!
//! # async fn run() -> gigscout::Result<()> {
//! let config = Config::default();
//! let store = Arc::new(JsonFileStore::open(config.state_file())?);
//! let session = EventSession::new(
//!     store,
//!     Arc::new(DiscoveryClient::new(&config)?),
//!     Arc::new(NominatimGeocoder::new(&config)?),
//! );
//!
//! session.search_city("Austin").await;
//! for event in session.events() {
//!     println!("{}", event.display_name());
//! }
//! # Ok(())
//! # }
//! ```

use super::modes::Completion;
use super::state::{filter_by_name, SessionState};
use crate::client::{EventSource, Geocoder};
use crate::domain::error::{GigscoutError, Result};
use crate::domain::{Coordinate, Event, SearchQuery};
use crate::storage::{FavouritesStore, KeyValueStore, LastSearchStore};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tracing::Instrument;

struct Inner {
    state: SessionState,
    favourites: FavouritesStore,
}

/// Owns the session's events, favourites, and search lifecycle.
pub struct EventSession {
    inner: Mutex<Inner>,
    last_search: LastSearchStore,
    source: Arc<dyn EventSource>,
    geocoder: Arc<dyn Geocoder>,
    updates: watch::Sender<SessionState>,
}

impl EventSession {
    /// Creates a session, loading favourites from `store` once.
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        source: Arc<dyn EventSource>,
        geocoder: Arc<dyn Geocoder>,
    ) -> Self {
        let favourites = FavouritesStore::load(store.clone());
        let state = SessionState::new();
        let (updates, _) = watch::channel(state.clone());

        Self {
            inner: Mutex::new(Inner { state, favourites }),
            last_search: LastSearchStore::new(store),
            source,
            geocoder,
            updates,
        }
    }

    /// Subscribes to snapshots published after every observable change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.updates.subscribe()
    }

    /// Copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> SessionState {
        self.lock().state.clone()
    }

    #[must_use]
    pub fn events(&self) -> Vec<Event> {
        self.lock().state.events.clone()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.lock().state.is_loading()
    }

    #[must_use]
    pub fn last_error(&self) -> Option<String> {
        self.lock().state.last_error.clone()
    }

    /// Searches by city name.
    pub async fn search_city(&self, name: &str) -> Completion {
        self.search(SearchQuery::city(name.trim())).await
    }

    /// Searches around an explicit coordinate.
    pub async fn search_coordinate(&self, coordinate: Coordinate) -> Completion {
        self.search(SearchQuery::Coordinate(coordinate)).await
    }

    /// Runs one search to completion.
    ///
    /// Starting a search supersedes any search still in flight: whichever search
    /// was issued last is the only one whose outcome is applied. A successful,
    /// current search also becomes the stored last search.
    pub async fn search(&self, query: SearchQuery) -> Completion {
        let request = {
            let mut inner = self.lock();
            let request = inner.state.begin_search(query.clone());
            self.publish(&inner.state);
            request
        };

        let outcome = self
            .resolve_and_fetch(&query)
            .instrument(tracing::debug_span!("search", request = request, query = %query))
            .await;

        let mut inner = self.lock();
        let Inner { state, favourites } = &mut *inner;

        let outcome = outcome.map(|events| favourites.reconcile(events));
        let completion = state.complete_search(request, outcome);

        match completion {
            Completion::Applied => {
                self.last_search.save(&query);
                self.publish(state);
            }
            Completion::Failed => self.publish(state),
            Completion::Stale => {}
        }

        completion
    }

    /// Re-issues the stored last search, if there is one.
    ///
    /// Returns `None` without touching state when nothing usable is stored.
    pub async fn restore(&self) -> Option<Completion> {
        let saved = self.last_search.load()?;
        tracing::debug!(search = %saved, "restoring last search");
        Some(self.search(saved).await)
    }

    async fn resolve_and_fetch(&self, query: &SearchQuery) -> Result<Vec<Event>> {
        let coordinate = match query {
            SearchQuery::City(name) => {
                if name.trim().is_empty() {
                    return Err(GigscoutError::Validation("city name is empty".to_string()));
                }
                self.geocoder
                    .resolve(name)
                    .await?
                    .ok_or_else(|| GigscoutError::Geocoding(name.clone()))?
            }
            SearchQuery::Coordinate(coordinate) => {
                if !coordinate.is_valid() {
                    return Err(GigscoutError::Validation(format!(
                        "coordinate out of range: {coordinate}"
                    )));
                }
                *coordinate
            }
        };

        self.source.fetch_events(coordinate).await
    }

    /// Flips the favourite flag of the event with `id` in the current list.
    ///
    /// Returns the new flag, or `None` if `id` is empty or no event in the list
    /// has it. The favourites store receives the flag and the event snapshot
    /// before this returns.
    pub fn toggle_favourite(&self, id: &str) -> Option<bool> {
        if id.is_empty() {
            return None;
        }

        let mut inner = self.lock();
        let Inner { state, favourites } = &mut *inner;

        let event = state.find(id)?.clone();
        let flag = !event.is_favourite;

        favourites.set_favourite(id, Some(&event), flag);
        favourites.apply_flags(&mut state.events);

        tracing::debug!(id = %id, flag = flag, "favourite toggled");
        self.publish(state);
        Some(flag)
    }

    /// Unfavourites `id`, whether or not it is in the current list.
    ///
    /// Returns `true` if it was a favourite.
    pub fn remove_favourite(&self, id: &str) -> bool {
        let mut inner = self.lock();
        let Inner { state, favourites } = &mut *inner;

        let removed = favourites.set_favourite(id, None, false);
        favourites.apply_flags(&mut state.events);

        if removed {
            tracing::debug!(id = %id, "favourite removed");
            self.publish(state);
        }
        removed
    }

    /// All favourites, including ones absent from the current results.
    #[must_use]
    pub fn favourites(&self) -> Vec<Event> {
        self.lock().favourites.all_favourites()
    }

    /// Favourites whose name matches every token of `query`.
    #[must_use]
    pub fn filter_favourites(&self, query: &str) -> Vec<Event> {
        filter_by_name(self.favourites(), query)
    }

    /// Returns `true` iff `id` is a favourite.
    #[must_use]
    pub fn is_favourite(&self, id: &str) -> bool {
        self.lock().favourites.is_favourite(id)
    }

    fn publish(&self, state: &SessionState) {
        self.updates.send_replace(state.clone());
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for EventSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventSession").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::SearchPhase;
    use crate::client::{MockEventSource, MockGeocoder};
    use crate::domain::event::fixtures::event;
    use crate::domain::LastSearch;
    use crate::storage::MemoryStore;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use tokio::sync::Notify;

    const AUSTIN: Coordinate = Coordinate::new(30.2672, -97.7431);
    const DENVER: Coordinate = Coordinate::new(39.7392, -104.9903);

    /// Holds one coordinate's fetch until released.
    struct Gate {
        latlong: String,
        entered: Arc<Notify>,
        release: Arc<Notify>,
    }

    /// Event source with canned results per coordinate.
    #[derive(Default)]
    struct FakeSource {
        results: HashMap<String, Vec<Event>>,
        gate: Option<Gate>,
    }

    impl FakeSource {
        fn with(mut self, coordinate: Coordinate, events: Vec<Event>) -> Self {
            self.results.insert(coordinate.latlong(), events);
            self
        }

        fn gated(mut self, coordinate: Coordinate) -> (Self, Arc<Notify>, Arc<Notify>) {
            let entered = Arc::new(Notify::new());
            let release = Arc::new(Notify::new());
            self.gate = Some(Gate {
                latlong: coordinate.latlong(),
                entered: entered.clone(),
                release: release.clone(),
            });
            (self, entered, release)
        }
    }

    #[async_trait]
    impl EventSource for FakeSource {
        async fn fetch_events(&self, coordinate: Coordinate) -> Result<Vec<Event>> {
            let latlong = coordinate.latlong();
            if let Some(gate) = self.gate.as_ref().filter(|g| g.latlong == latlong) {
                gate.entered.notify_one();
                gate.release.notified().await;
            }
            self.results
                .get(&latlong)
                .cloned()
                .ok_or_else(|| GigscoutError::Network(format!("no route to {latlong}")))
        }
    }

    fn geocoder() -> MockGeocoder {
        let mut geocoder = MockGeocoder::new();
        geocoder.expect_resolve().returning(|city| {
            Ok(match city {
                "Austin" => Some(AUSTIN),
                "Denver" => Some(DENVER),
                _ => None,
            })
        });
        geocoder
    }

    fn austin_events() -> Vec<Event> {
        vec![event("E1", "One"), event("E2", "Two"), event("E3", "Three")]
    }

    fn denver_events() -> Vec<Event> {
        vec![event("D1", "Mile High"), event("D2", "Red Rocks")]
    }

    fn session_with(store: Arc<MemoryStore>, source: FakeSource) -> EventSession {
        EventSession::new(store, Arc::new(source), Arc::new(geocoder()))
    }

    fn session(source: FakeSource) -> EventSession {
        session_with(Arc::new(MemoryStore::new()), source)
    }

    fn ids(events: &[Event]) -> Vec<&str> {
        events.iter().filter_map(|e| e.id.as_deref()).collect()
    }

    #[tokio::test]
    async fn favourite_survives_new_search() {
        let session = session(
            FakeSource::default()
                .with(AUSTIN, austin_events())
                .with(DENVER, denver_events()),
        );

        assert_eq!(session.search_city("Austin").await, Completion::Applied);
        assert_eq!(session.events().len(), 3);
        assert_eq!(session.toggle_favourite("E2"), Some(true));

        assert_eq!(session.search_city("Denver").await, Completion::Applied);
        assert_eq!(ids(&session.events()), ["D1", "D2"]);

        let favourites = session.favourites();
        assert_eq!(ids(&favourites), ["E2"]);
        assert_eq!(favourites[0].display_name(), "Two");
        assert!(favourites[0].is_favourite);
    }

    #[tokio::test]
    async fn search_reconciles_flags_from_store() {
        let store = Arc::new(MemoryStore::new());
        {
            let session = session_with(
                store.clone(),
                FakeSource::default().with(AUSTIN, austin_events()),
            );
            session.search_coordinate(AUSTIN).await;
            session.toggle_favourite("E3");
        }

        let session = session_with(store, FakeSource::default().with(AUSTIN, austin_events()));
        session.search_coordinate(AUSTIN).await;

        let flags: Vec<bool> = session.events().iter().map(|e| e.is_favourite).collect();
        assert_eq!(flags, [false, false, true]);
    }

    #[tokio::test]
    async fn toggle_is_self_inverse() {
        let session = session(FakeSource::default().with(AUSTIN, austin_events()));
        session.search_city("Austin").await;

        assert_eq!(session.toggle_favourite("E1"), Some(true));
        assert!(session.is_favourite("E1"));
        assert_eq!(session.toggle_favourite("E1"), Some(false));
        assert!(!session.is_favourite("E1"));
        assert!(session.events().iter().all(|e| !e.is_favourite));
        assert!(session.favourites().is_empty());
    }

    #[tokio::test]
    async fn toggle_empty_id_is_rejected() {
        let blank = Event {
            id: Some(String::new()),
            ..event("x", "Blank")
        };
        let session = session(FakeSource::default().with(AUSTIN, vec![blank]));
        session.search_coordinate(AUSTIN).await;

        assert_eq!(session.toggle_favourite(""), None);
        assert!(!session.events()[0].is_favourite);
        assert!(session.favourites().is_empty());
    }

    #[tokio::test]
    async fn toggle_unknown_id_is_no_op() {
        let session = session(FakeSource::default().with(AUSTIN, austin_events()));
        session.search_city("Austin").await;

        assert_eq!(session.toggle_favourite("nope"), None);
        assert!(session.favourites().is_empty());
    }

    #[tokio::test]
    async fn remove_favourite_outside_current_list() {
        let session = session(
            FakeSource::default()
                .with(AUSTIN, austin_events())
                .with(DENVER, denver_events()),
        );
        session.search_city("Austin").await;
        session.toggle_favourite("E1");
        session.toggle_favourite("E2");
        session.search_city("Denver").await;

        assert!(session.remove_favourite("E2"));
        assert!(!session.remove_favourite("E2"));
        assert!(!session.remove_favourite("never-favourited"));
        assert_eq!(ids(&session.favourites()), ["E1"]);
    }

    #[tokio::test]
    async fn remove_favourite_clears_list_flag() {
        let session = session(FakeSource::default().with(AUSTIN, austin_events()));
        session.search_city("Austin").await;
        session.toggle_favourite("E2");

        assert!(session.remove_favourite("E2"));
        assert!(session.events().iter().all(|e| !e.is_favourite));
        assert!(session.favourites().iter().all(|e| !e.has_id("E2")));
    }

    #[tokio::test]
    async fn failed_search_keeps_events() {
        let session = session(FakeSource::default().with(AUSTIN, austin_events()));
        session.search_city("Austin").await;
        let before = session.events();

        assert_eq!(session.search_coordinate(DENVER).await, Completion::Failed);
        assert_eq!(session.events(), before);
        assert!(session.last_error().is_some_and(|e| !e.is_empty()));
        assert!(!session.is_loading());
        assert_eq!(session.snapshot().phase, SearchPhase::Failed);
    }

    #[tokio::test]
    async fn unknown_city_is_geocoding_error() {
        let session = session(FakeSource::default());

        assert_eq!(session.search_city("Atlantis").await, Completion::Failed);
        assert_eq!(session.last_error().as_deref(), Some("No location found for \"Atlantis\""));
    }

    #[tokio::test]
    async fn invalid_queries_fail_without_fetching() {
        let session = session(FakeSource::default());

        assert_eq!(session.search_city("   ").await, Completion::Failed);
        assert!(session.last_error().is_some_and(|e| e.contains("empty")));

        assert_eq!(
            session.search_coordinate(Coordinate::new(120.0, 0.0)).await,
            Completion::Failed
        );
        assert!(session.last_error().is_some_and(|e| e.contains("out of range")));
    }

    #[tokio::test]
    async fn late_response_for_older_search_is_dropped() {
        let (source, entered, release) = FakeSource::default()
            .with(AUSTIN, austin_events())
            .with(DENVER, denver_events())
            .gated(AUSTIN);
        let session = Arc::new(session(source));

        let first = tokio::spawn({
            let session = session.clone();
            async move { session.search_city("Austin").await }
        });
        entered.notified().await;

        assert_eq!(session.search_city("Denver").await, Completion::Applied);
        release.notify_one();

        assert_eq!(first.await.unwrap(), Completion::Stale);
        assert_eq!(ids(&session.events()), ["D1", "D2"]);
        assert_eq!(session.snapshot().query, Some(SearchQuery::city("Denver")));
    }

    #[tokio::test]
    async fn successful_search_is_saved_and_restored() {
        let store = Arc::new(MemoryStore::new());
        {
            let session = session_with(
                store.clone(),
                FakeSource::default().with(DENVER, denver_events()),
            );
            assert_eq!(session.restore().await, None);
            session.search_coordinate(DENVER).await;
        }

        let session = session_with(
            store.clone(),
            FakeSource::default().with(DENVER, denver_events()),
        );
        assert_eq!(session.restore().await, Some(Completion::Applied));
        assert_eq!(ids(&session.events()), ["D1", "D2"]);

        assert_eq!(
            LastSearchStore::new(store).load(),
            Some(LastSearch::Coordinate(DENVER))
        );
    }

    #[tokio::test]
    async fn failed_search_does_not_overwrite_last_search() {
        let store = Arc::new(MemoryStore::new());
        let session = session_with(
            store.clone(),
            FakeSource::default().with(AUSTIN, austin_events()),
        );

        session.search_city("Austin").await;
        session.search_city("Atlantis").await;

        assert_eq!(LastSearchStore::new(store).load(), Some(LastSearch::city("Austin")));
    }

    #[tokio::test]
    async fn subscribers_see_loading_then_result() {
        let session = session(FakeSource::default().with(AUSTIN, austin_events()));
        let mut updates = session.subscribe();
        assert_eq!(updates.borrow_and_update().phase, SearchPhase::Idle);

        session.search_city("Austin").await;

        assert!(updates.has_changed().unwrap());
        let latest = updates.borrow_and_update().clone();
        assert_eq!(latest.phase, SearchPhase::Succeeded);
        assert_eq!(latest.events.len(), 3);

        session.toggle_favourite("E1");
        assert!(updates.borrow_and_update().events[0].is_favourite);
    }

    #[tokio::test]
    async fn coordinate_search_skips_geocoder() {
        let mut geocoder = MockGeocoder::new();
        geocoder.expect_resolve().never();
        let mut source = MockEventSource::new();
        source
            .expect_fetch_events()
            .withf(|coordinate| *coordinate == AUSTIN)
            .times(1)
            .returning(|_| Ok(vec![event("E1", "One")]));

        let session = EventSession::new(
            Arc::new(MemoryStore::new()),
            Arc::new(source),
            Arc::new(geocoder),
        );

        assert_eq!(session.search_coordinate(AUSTIN).await, Completion::Applied);
    }

    #[tokio::test]
    async fn restore_without_saved_search_does_nothing() {
        let mut source = MockEventSource::new();
        source.expect_fetch_events().never();
        let session = EventSession::new(
            Arc::new(MemoryStore::new()),
            Arc::new(source),
            Arc::new(geocoder()),
        );

        assert_eq!(session.restore().await, None);
        assert_eq!(session.snapshot().phase, SearchPhase::Idle);
    }

    #[tokio::test]
    async fn filter_favourites_by_name() {
        let session = session(FakeSource::default().with(AUSTIN, austin_events()));
        session.search_city("Austin").await;
        session.toggle_favourite("E1");
        session.toggle_favourite("E3");

        assert_eq!(ids(&session.filter_favourites("three")), ["E3"]);
        assert_eq!(session.filter_favourites("").len(), 2);
    }
}
