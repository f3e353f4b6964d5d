//! Domain layer for gigscout.
//!
//! Core types independent of persistence, HTTP, or presentation concerns.
//!
//! # Organization
//!
//! - [`error`]: Error types and result alias
//! - [`event`]: Event model decoded from the discovery API
//! - [`search`]: Coordinates and search queries

pub mod error;
pub mod event;
pub mod search;

pub use error::{GigscoutError, Result};
pub use event::{
    Classification, ClassificationType, EmbeddedEvents, Event, EventImage, EventLinks,
    EventsResponse, ExternalLinks, LabelledLink, Link, SocialLink, UpcomingEvents,
};
pub use search::{Coordinate, LastSearch, SearchQuery};
