//! Display-ready view models computed from session snapshots.
//!
//! View models carry no behaviour. They hold the text a front end shows
//! (titles, card lines, detail rows, empty-state messages) so that every
//! presentation, the bundled CLI included, renders the same thing.
//!
//! # Example
//!
//! ```rust
//! use gigscout::app::SessionState;
//! use gigscout::ui::compute_event_list;
//!
//! let vm = compute_event_list(&SessionState::new());
//! assert_eq!(vm.title, "Event Explorer");
//! assert_eq!(vm.empty_state.unwrap().message, "Search for events in your city");
//! ```

use crate::app::SessionState;
use crate::domain::{Event, LabelledLink};
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

const MAX_CARD_NAME: usize = 48;

/// The event list screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventListViewModel {
    /// Navigation title: the searched place, or a placeholder.
    pub title: String,

    pub cards: Vec<EventCard>,

    /// Shown instead of the cards when there are none and nothing is loading.
    pub empty_state: Option<EmptyState>,

    pub is_loading: bool,

    /// Message of the latest failed search.
    pub error: Option<String>,
}

/// One row of an event list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventCard {
    pub id: Option<String>,

    /// Display name, truncated for list layouts.
    pub name: String,

    pub genre: Option<String>,
    pub image_url: Option<String>,
    pub is_favourite: bool,

    /// Character ranges of `name` matched by the active filter, `(start, end)` exclusive.
    pub highlight_ranges: Vec<(usize, usize)>,
}

/// Primary and secondary text for an empty list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmptyState {
    pub message: String,
    pub subtitle: Option<String>,
}

/// The event detail screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDetailViewModel {
    pub name: String,
    pub image_url: Option<String>,
    pub info_rows: Vec<InfoRow>,
    pub links: Vec<LabelledLink>,
    pub is_favourite: bool,
    pub favourite_label: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoRow {
    pub label: &'static str,
    pub value: String,
}

/// The favourites screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FavouritesViewModel {
    pub cards: Vec<EventCard>,
    pub empty_state: Option<EmptyState>,
}

/// Computes the event list screen from a session snapshot.
#[must_use]
pub fn compute_event_list(state: &SessionState) -> EventListViewModel {
    let place = state.query.as_ref().map(ToString::to_string);

    let title = match (&place, state.events.is_empty()) {
        (None, _) => "Event Explorer".to_string(),
        (Some(_), true) => "No Events".to_string(),
        (Some(place), false) => place.clone(),
    };

    let empty_state = (state.events.is_empty() && !state.is_loading()).then(|| EmptyState {
        message: place.map_or_else(
            || "Search for events in your city".to_string(),
            |place| format!("No events found in {place}"),
        ),
        subtitle: None,
    });

    EventListViewModel {
        title,
        cards: state
            .events
            .iter()
            .map(|event| compute_card(event, None))
            .collect(),
        empty_state,
        is_loading: state.is_loading(),
        error: state.last_error.clone(),
    }
}

/// Computes the favourites screen; `query` highlights matched name characters.
///
/// `favourites` is expected to be filtered already.
#[must_use]
pub fn compute_favourites(favourites: &[Event], query: &str) -> FavouritesViewModel {
    let query = query.trim().to_lowercase();
    let matcher = (!query.is_empty()).then(SkimMatcherV2::default);

    let cards: Vec<EventCard> = favourites
        .iter()
        .map(|event| compute_card(event, matcher.as_ref().map(|m| (m, query.as_str()))))
        .collect();

    let empty_state = cards.is_empty().then(|| EmptyState {
        message: "No favourite events found".to_string(),
        subtitle: Some("Favourite an event to save it here.".to_string()),
    });

    FavouritesViewModel { cards, empty_state }
}

/// Computes the detail screen for one event.
#[must_use]
pub fn compute_event_detail(event: &Event) -> EventDetailViewModel {
    let mut info_rows = Vec::new();

    if let Some(kind) = &event.kind {
        info_rows.push(InfoRow {
            label: "Type",
            value: capitalize(kind),
        });
    }
    if let Some(genre) = event.primary_genre() {
        info_rows.push(InfoRow {
            label: "Genre",
            value: genre.to_string(),
        });
    }
    if let Some(total) = event.upcoming_total() {
        info_rows.push(InfoRow {
            label: "Upcoming Events",
            value: total.to_string(),
        });
    }

    EventDetailViewModel {
        name: event.display_name().to_string(),
        image_url: event.best_image_url().map(str::to_string),
        info_rows,
        links: event.external_links(),
        is_favourite: event.is_favourite,
        favourite_label: if event.is_favourite { "Favourited" } else { "Add to Favourites" },
    }
}

fn compute_card(event: &Event, matcher: Option<(&SkimMatcherV2, &str)>) -> EventCard {
    let full_name = event.display_name();
    let name = truncate(full_name, MAX_CARD_NAME);

    let highlight_ranges = matcher.map_or_else(Vec::new, |(matcher, query)| {
        compute_highlight_ranges(&name.to_lowercase(), query, matcher)
    });

    EventCard {
        id: event.id.clone(),
        name,
        genre: event.primary_genre().map(str::to_string),
        image_url: event.best_image_url().map(str::to_string),
        is_favourite: event.is_favourite,
        highlight_ranges,
    }
}

/// Coalesces fuzzy match indices of each query token into contiguous ranges.
fn compute_highlight_ranges(
    text: &str,
    query: &str,
    matcher: &SkimMatcherV2,
) -> Vec<(usize, usize)> {
    let mut indices: Vec<usize> = query
        .split_whitespace()
        .filter_map(|token| matcher.fuzzy_indices(text, token))
        .flat_map(|(_score, indices)| indices)
        .collect();
    indices.sort_unstable();
    indices.dedup();

    let mut ranges: Vec<(usize, usize)> = Vec::new();
    for idx in indices {
        match ranges.last_mut() {
            Some((_, end)) if *end == idx => *end = idx + 1,
            _ => ranges.push((idx, idx + 1)),
        }
    }
    ranges
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{kept}...")
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    chars.next().map_or_else(String::new, |first| {
        first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect()
    })
}
