//! Presentation-independent view models.
//!
//! ```text
//! SessionState → compute_* → view model → any front end (CLI, GUI, ...)
//! ```
//!
//! - [`viewmodel`]: list, favourites, and detail screens

pub mod viewmodel;

pub use viewmodel::{
    compute_event_detail, compute_event_list, compute_favourites, EmptyState, EventCard,
    EventDetailViewModel, EventListViewModel, FavouritesViewModel, InfoRow,
};
