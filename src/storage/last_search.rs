//! Persisted record of the most recent successful search.

use crate::domain::LastSearch;
use crate::storage::backend::KeyValueStore;
use crate::storage::favourites::write_or_warn;
use crate::storage::models::LastSearchRecord;
use crate::storage::LAST_SEARCH_KEY;
use std::sync::Arc;

/// Single-record store for the last search, read once at startup.
///
/// Same degrade-to-empty policy as the favourites store: unreadable data loads as
/// `None`, and failed writes are logged.
pub struct LastSearchStore {
    store: Arc<dyn KeyValueStore>,
}

impl LastSearchStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Overwrites the stored record with `search`.
    pub fn save(&self, search: &LastSearch) {
        tracing::debug!(search = %search, "saving last search");
        write_or_warn(self.store.as_ref(), LAST_SEARCH_KEY, &LastSearchRecord::from(search));
    }

    /// Returns the last saved search, or `None` if there is none or it is unreadable.
    #[must_use]
    pub fn load(&self) -> Option<LastSearch> {
        let raw = match self.store.get(LAST_SEARCH_KEY) {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read last search");
                return None;
            }
        };

        match serde_json::from_str::<LastSearchRecord>(&raw) {
            Ok(record) => record.into_last_search(),
            Err(e) => {
                tracing::warn!(error = %e, "last search unreadable, ignoring");
                None
            }
        }
    }

    /// Forgets the stored search.
    pub fn clear(&self) {
        if let Err(e) = self.store.remove(LAST_SEARCH_KEY) {
            tracing::warn!(error = %e, "failed to clear last search");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn store() -> (Arc<MemoryStore>, LastSearchStore) {
        let backend = Arc::new(MemoryStore::new());
        (backend.clone(), LastSearchStore::new(backend))
    }

    #[test]
    fn round_trips_both_forms() {
        let (_, last) = store();
        assert_eq!(last.load(), None);

        last.save(&LastSearch::city("Austin"));
        assert_eq!(last.load(), Some(LastSearch::city("Austin")));

        last.save(&LastSearch::coordinate(39.7392, -104.9903));
        assert_eq!(last.load(), Some(LastSearch::coordinate(39.7392, -104.9903)));
    }

    #[test]
    fn corrupt_or_cleared_loads_none() {
        let (backend, last) = store();
        last.save(&LastSearch::city("Austin"));

        backend.set(LAST_SEARCH_KEY, "\u{0}garbage").unwrap();
        assert_eq!(last.load(), None);

        backend.set(LAST_SEARCH_KEY, r#"{"cityName": 7}"#).unwrap();
        assert_eq!(last.load(), None);

        last.save(&LastSearch::city("Austin"));
        last.clear();
        assert_eq!(last.load(), None);
    }

    #[test]
    fn reads_camel_case_record_shape() {
        let (backend, last) = store();
        backend
            .set(LAST_SEARCH_KEY, r#"{"latitude": 30.2672, "longitude": -97.7431}"#)
            .unwrap();

        assert_eq!(last.load(), Some(LastSearch::coordinate(30.2672, -97.7431)));
    }
}
