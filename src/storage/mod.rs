//! Storage layer for persisted favourites and the last search.
//!
//! Everything durable goes through the [`KeyValueStore`] trait. Two typed stores
//! sit on top of it and own the degrade-to-empty failure policy.
//!
//! # Modules
//!
//! - `backend`: key/value trait implemented by every backend
//! - `json`: JSON file backend with atomic writes (production)
//! - `memory`: in-memory backend (tests)
//! - `models`: on-disk record shapes
//! - `favourites`: favourite id set plus event cache
//! - `last_search`: last successful search record

pub mod backend;
pub mod favourites;
pub mod json;
pub mod last_search;
pub mod memory;
pub mod models;

pub use backend::KeyValueStore;
pub use favourites::FavouritesStore;
pub use json::JsonFileStore;
pub use last_search::LastSearchStore;
pub use memory::MemoryStore;
pub use models::{FavouriteRecord, LastSearchRecord};

/// Key holding the JSON array of favourite event ids.
pub const FAVOURITE_IDS_KEY: &str = "favouriteEventIDs";

/// Key holding the JSON object mapping event id to [`FavouriteRecord`].
pub const FAVOURITE_EVENTS_KEY: &str = "favouriteEvents";

/// Key holding the [`LastSearchRecord`].
pub const LAST_SEARCH_KEY: &str = "lastSearch";

/// File name of the JSON store inside the data directory.
pub const STATE_FILE_NAME: &str = "state.json";
