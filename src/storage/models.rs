//! Storage record models for the persistence layer.
//!
//! These are the JSON shapes written under each key. They are kept separate from
//! the domain types so the on-disk format can stay stable while domain types evolve.

use crate::domain::{Coordinate, Event, LastSearch};
use serde::{Deserialize, Serialize};

/// A cached favourite: the last-known event snapshot plus when it was favourited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavouriteRecord {
    pub event: Event,

    /// Unix timestamp of the first time the event was favourited.
    pub favourited_at: i64,
}

impl FavouriteRecord {
    /// Creates a record stamped with the current time.
    ///
    /// The stored snapshot always has its favourite flag cleared; the flag is
    /// recomputed on read.
    #[must_use]
    pub fn new(event: &Event) -> Self {
        Self {
            event: Event {
                is_favourite: false,
                ..event.clone()
            },
            favourited_at: chrono::Utc::now().timestamp(),
        }
    }
}

/// Persisted last-search record.
///
/// Exactly one form is populated: `city_name`, or both `latitude` and `longitude`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastSearchRecord {
    pub city_name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl From<&LastSearch> for LastSearchRecord {
    fn from(search: &LastSearch) -> Self {
        match search {
            LastSearch::City(name) => Self {
                city_name: Some(name.clone()),
                ..Self::default()
            },
            LastSearch::Coordinate(coordinate) => Self {
                city_name: None,
                latitude: Some(coordinate.latitude),
                longitude: Some(coordinate.longitude),
            },
        }
    }
}

impl LastSearchRecord {
    /// Converts back to the domain type.
    ///
    /// A non-empty city name wins. Otherwise both coordinate components must be
    /// present and in range. Anything else is treated as no record.
    #[must_use]
    pub fn into_last_search(self) -> Option<LastSearch> {
        if let Some(city) = self.city_name.filter(|c| !c.trim().is_empty()) {
            return Some(LastSearch::City(city));
        }

        let coordinate = Coordinate::new(self.latitude?, self.longitude?);
        coordinate.is_valid().then_some(LastSearch::Coordinate(coordinate))
    }
}
