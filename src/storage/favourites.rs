//! Persisted favourites: an id set plus a cache of last-known event snapshots.
//!
//! The id set is the source of truth for "is this event a favourite". The cache
//! lets the favourites screen show events that have dropped out of the current
//! search results.
//!
//! # Failure Semantics
//!
//! Favourites are a convenience feature. A read failure or a corrupt value loads as
//! an empty set/cache, and a write failure is logged while the in-memory state
//! keeps the change. Neither is ever reported to the caller.

use crate::domain::{Event, GigscoutError};
use crate::storage::backend::KeyValueStore;
use crate::storage::models::FavouriteRecord;
use crate::storage::{FAVOURITE_EVENTS_KEY, FAVOURITE_IDS_KEY};
use serde::de::DeserializeOwned;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Favourite ids and cached events, loaded once and written through on every change.
pub struct FavouritesStore {
    store: Arc<dyn KeyValueStore>,
    ids: BTreeSet<String>,
    cache: BTreeMap<String, FavouriteRecord>,
}

impl FavouritesStore {
    /// Loads favourites from `store`.
    ///
    /// Cache entries whose id is not in the id set are dropped, so the two halves
    /// are consistent from the first read.
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let _span = tracing::debug_span!("favourites_load").entered();

        let ids: BTreeSet<String> =
            read_or_default::<Vec<String>>(store.as_ref(), FAVOURITE_IDS_KEY)
                .into_iter()
                .filter(|id| !id.is_empty())
                .collect();

        let mut cache: BTreeMap<String, FavouriteRecord> =
            read_or_default(store.as_ref(), FAVOURITE_EVENTS_KEY);
        cache.retain(|id, _| ids.contains(id));

        tracing::debug!(
            favourite_count = ids.len(),
            cached_count = cache.len(),
            "favourites loaded"
        );

        Self { store, ids, cache }
    }

    /// Returns `true` iff `id` is in the favourite set.
    #[must_use]
    pub fn is_favourite(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Adds or removes a favourite and persists the result before returning.
    ///
    /// With `flag == true` the id is inserted and, when `event` is given, its
    /// snapshot stored or refreshed (keeping the original favourited time). With
    /// `flag == false` the id and its cached snapshot are removed.
    ///
    /// Returns `true` if anything changed. A call that changes nothing does not
    /// touch the backend. Empty ids are ignored.
    pub fn set_favourite(&mut self, id: &str, event: Option<&Event>, flag: bool) -> bool {
        let _span = tracing::debug_span!("favourites_set", id = %id, flag = flag).entered();

        if id.is_empty() {
            tracing::debug!("ignoring favourite change for empty id");
            return false;
        }

        let changed = if flag {
            let inserted = self.ids.insert(id.to_string());
            let refreshed = event.is_some_and(|event| self.cache_snapshot(id, event));
            inserted || refreshed
        } else {
            let removed = self.ids.remove(id);
            let evicted = self.cache.remove(id).is_some();
            removed || evicted
        };

        if changed {
            self.persist();
        } else {
            tracing::trace!("favourite unchanged, skipping write");
        }

        changed
    }

    /// Stores `event` under `id` unless an identical snapshot is already cached.
    fn cache_snapshot(&mut self, id: &str, event: &Event) -> bool {
        let mut record = FavouriteRecord::new(event);

        if let Some(existing) = self.cache.get(id) {
            if existing.event == record.event {
                return false;
            }
            record.favourited_at = existing.favourited_at;
        }

        self.cache.insert(id.to_string(), record);
        true
    }

    /// Cached events for every favourite, most recently favourited first.
    ///
    /// Every returned event has `is_favourite == true`. Ids without a cached
    /// snapshot (for example, favourited through an id-only path) are skipped.
    #[must_use]
    pub fn all_favourites(&self) -> Vec<Event> {
        let mut records: Vec<&FavouriteRecord> = self
            .ids
            .iter()
            .filter_map(|id| self.cache.get(id))
            .collect();

        records.sort_by(|a, b| {
            b.favourited_at
                .cmp(&a.favourited_at)
                .then_with(|| a.event.id.cmp(&b.event.id))
        });

        records
            .into_iter()
            .map(|record| Event {
                is_favourite: true,
                ..record.event.clone()
            })
            .collect()
    }

    /// Recomputes `is_favourite` for every event from the favourite set.
    ///
    /// Events without an id are never favourites. The set itself is not changed.
    #[must_use]
    pub fn reconcile(&self, mut events: Vec<Event>) -> Vec<Event> {
        self.apply_flags(&mut events);
        events
    }

    /// In-place form of [`reconcile`](Self::reconcile).
    pub fn apply_flags(&self, events: &mut [Event]) {
        for event in events {
            event.is_favourite = event.id.as_deref().is_some_and(|id| self.is_favourite(id));
        }
    }

    /// Writes the id set and the cache in one batch so they never disagree on disk.
    fn persist(&self) {
        let ids: Vec<&String> = self.ids.iter().collect();

        let result = serde_json::to_string(&ids)
            .and_then(|ids| Ok((ids, serde_json::to_string(&self.cache)?)))
            .map_err(|e| GigscoutError::Storage(format!("failed to encode favourites: {e}")))
            .and_then(|(ids, cache)| {
                self.store.set_many(&[
                    (FAVOURITE_IDS_KEY, ids.as_str()),
                    (FAVOURITE_EVENTS_KEY, cache.as_str()),
                ])
            });

        if let Err(e) = result {
            tracing::warn!(error = %e, "failed to persist favourites");
        }
    }
}

impl std::fmt::Debug for FavouritesStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FavouritesStore")
            .field("ids", &self.ids)
            .field("cached", &self.cache.len())
            .finish_non_exhaustive()
    }
}

/// Reads and decodes `key`, degrading to `T::default()` on any failure.
pub(crate) fn read_or_default<T>(store: &dyn KeyValueStore, key: &str) -> T
where
    T: DeserializeOwned + Default,
{
    match store.get(key) {
        Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!(key = %key, error = %e, "stored value unreadable, treating as empty");
            T::default()
        }),
        Ok(None) => T::default(),
        Err(e) => {
            tracing::warn!(key = %key, error = %e, "failed to read store, treating as empty");
            T::default()
        }
    }
}

/// Encodes and writes `value` under `key`, logging instead of failing.
pub(crate) fn write_or_warn<T>(store: &dyn KeyValueStore, key: &str, value: &T)
where
    T: serde::Serialize + ?Sized,
{
    let result = serde_json::to_string(value)
        .map_err(|e| GigscoutError::Storage(format!("failed to encode {key}: {e}")))
        .and_then(|json| store.set(key, &json));

    if let Err(e) = result {
        tracing::warn!(key = %key, error = %e, "failed to persist value");
    }
}
