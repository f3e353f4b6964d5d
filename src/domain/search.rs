//! Search query types: coordinates and the city-or-coordinate query.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A geographic point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Initial map centre before the user picks a location (San Francisco).
    pub const DEFAULT_MAP_CENTER: Self = Self {
        latitude: 37.7749,
        longitude: -122.4194,
    };

    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Returns `true` if both components are finite and within WGS84 bounds.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Formats the point as the discovery API's `latlong` parameter.
    #[must_use]
    pub fn latlong(&self) -> String {
        format!("{},{}", self.latitude, self.longitude)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.latitude, self.longitude)
    }
}

/// What the user searched for: a free-text city name or an explicit point.
///
/// The same type is persisted as the last search, so restoring a session
/// re-issues exactly the query the user made (a city is geocoded again).
#[derive(Debug, Clone, PartialEq)]
pub enum SearchQuery {
    City(String),
    Coordinate(Coordinate),
}

/// The most recent successful search, restored on the next launch.
pub type LastSearch = SearchQuery;

impl SearchQuery {
    #[must_use]
    pub fn city(name: impl Into<String>) -> Self {
        Self::City(name.into())
    }

    #[must_use]
    pub const fn coordinate(latitude: f64, longitude: f64) -> Self {
        Self::Coordinate(Coordinate::new(latitude, longitude))
    }
}

impl fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::City(name) => f.write_str(name),
            Self::Coordinate(coordinate) => coordinate.fmt(f),
        }
    }
}
