//! Outbound HTTP collaborators: event discovery and geocoding.
//!
//! Both are traits so the session controller can run against scripted fakes.
//!
//! - `discovery`: [`EventSource`] and the Ticketmaster [`DiscoveryClient`]
//! - `geocode`: [`Geocoder`] and the Nominatim-backed [`NominatimGeocoder`]

pub mod discovery;
pub mod geocode;

pub use discovery::{parse_events, DiscoveryClient, EventSource};
pub use geocode::{Geocoder, NominatimGeocoder};

#[cfg(test)]
pub use discovery::MockEventSource;
#[cfg(test)]
pub use geocode::MockGeocoder;
