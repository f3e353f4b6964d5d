//! Event domain model decoded from the discovery API.
//!
//! Field names follow the upstream JSON (camelCase, with `_links`, `_total` and
//! `_filtered` keeping their leading underscore). Every field the upstream may omit
//! is an `Option`; lists that are always present upstream stay plain `Vec`s.
//!
//! The [`Event::is_favourite`] flag is local state. It is skipped by serde in both
//! directions, so it can never be trusted from a network response or from the
//! favourites cache; the favourites store recomputes it.

use serde::{Deserialize, Serialize};

/// Image aspect ratio preferred for cards and the detail header.
const PREFERRED_IMAGE_RATIO: &str = "16_9";

/// A single discoverable occurrence (concert, show, match...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub test: Option<bool>,
    /// Canonical detail URL on the ticketing site.
    pub url: Option<String>,
    pub locale: Option<String>,
    pub external_links: Option<ExternalLinks>,
    pub aliases: Option<Vec<String>>,
    pub images: Vec<EventImage>,
    pub classifications: Vec<Classification>,
    pub upcoming_events: Option<UpcomingEvents>,
    #[serde(rename = "_links")]
    pub links: EventLinks,

    /// Whether the event id is in the favourites store. Never serialized.
    #[serde(skip)]
    pub is_favourite: bool,
}

/// Per-platform external link lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalLinks {
    pub twitter: Option<Vec<SocialLink>>,
    pub facebook: Option<Vec<SocialLink>>,
    pub wiki: Option<Vec<SocialLink>>,
    pub instagram: Option<Vec<SocialLink>>,
    pub homepage: Option<Vec<SocialLink>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialLink {
    pub url: String,
}

/// One rendition of the event artwork.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventImage {
    /// Aspect ratio tag such as `16_9` or `4_3`.
    pub ratio: String,
    pub url: String,
    pub width: u32,
    pub height: u32,
    pub fallback: bool,
}

/// Segment / genre / type hierarchy entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub primary: bool,
    pub segment: Option<ClassificationType>,
    pub genre: Option<ClassificationType>,
    pub sub_genre: Option<ClassificationType>,
    #[serde(rename = "type")]
    pub kind: Option<ClassificationType>,
    pub sub_type: Option<ClassificationType>,
    pub family: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationType {
    pub id: Option<String>,
    pub name: Option<String>,
}

/// Upcoming-event counters reported by the discovery API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpcomingEvents {
    pub tmr: Option<i64>,
    pub ticketmaster: Option<i64>,
    #[serde(rename = "_total")]
    pub total: Option<i64>,
    #[serde(rename = "_filtered")]
    pub filtered: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLinks {
    #[serde(rename = "self")]
    pub self_link: Link,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub href: String,
}

/// A labelled outbound link shown on the event detail screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelledLink {
    pub label: &'static str,
    pub url: String,
}

/// Top-level discovery response: `{ _embedded?: { events?: [...] } }`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventsResponse {
    #[serde(rename = "_embedded")]
    pub embedded: Option<EmbeddedEvents>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmbeddedEvents {
    pub events: Option<Vec<Event>>,
}

impl EventsResponse {
    /// Consumes the response, treating a missing `_embedded` or `events` as zero results.
    #[must_use]
    pub fn into_events(self) -> Vec<Event> {
        self.embedded
            .and_then(|embedded| embedded.events)
            .unwrap_or_default()
    }
}

impl Event {
    /// Name for display, falling back to a placeholder when upstream omits it.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Untitled Event")
    }

    /// Returns `true` if this event carries the given identifier.
    #[must_use]
    pub fn has_id(&self, id: &str) -> bool {
        self.id.as_deref() == Some(id)
    }

    /// URL of the widest `16_9` image, if any.
    ///
    /// # Examples
    ///
    /// ```
    /// # use gigscout::domain::Event;
    /// let event: Event = serde_json::from_str(r#"{
    ///     "id": "E1",
    ///     "images": [
    ///         {"ratio": "16_9", "url": "https://img/small", "width": 640, "height": 360,
    ///          "fallback": false},
    ///         {"ratio": "16_9", "url": "https://img/large", "width": 2048, "height": 1152,
    ///          "fallback": false},
    ///         {"ratio": "4_3", "url": "https://img/square", "width": 4096, "height": 3072,
    ///          "fallback": false}
    ///     ],
    ///     "classifications": [],
    ///     "_links": {"self": {"href": "/events/E1"}}
    /// }"#).unwrap();
    /// assert_eq!(event.best_image_url(), Some("https://img/large"));
    /// ```
    #[must_use]
    pub fn best_image_url(&self) -> Option<&str> {
        self.images
            .iter()
            .filter(|image| image.ratio == PREFERRED_IMAGE_RATIO)
            .max_by_key(|image| image.width)
            .map(|image| image.url.as_str())
    }

    /// Genre name of the first classification.
    #[must_use]
    pub fn primary_genre(&self) -> Option<&str> {
        self.classifications
            .first()
            .and_then(|c| c.genre.as_ref())
            .and_then(|genre| genre.name.as_deref())
    }

    /// Total number of upcoming events, when upstream reports it.
    #[must_use]
    pub fn upcoming_total(&self) -> Option<i64> {
        self.upcoming_events.as_ref().and_then(|u| u.total)
    }

    /// Outbound links for the detail screen, in display order.
    ///
    /// Only the first URL of each platform list is used. Platforms without a
    /// link are left out.
    #[must_use]
    pub fn external_links(&self) -> Vec<LabelledLink> {
        let mut links = Vec::new();

        if let Some(url) = &self.url {
            links.push(LabelledLink {
                label: "View on Ticketmaster",
                url: url.clone(),
            });
        }

        let Some(external) = &self.external_links else {
            return links;
        };

        let platforms = [
            ("Twitter", &external.twitter),
            ("Instagram", &external.instagram),
            ("Website", &external.homepage),
        ];

        for (label, list) in platforms {
            if let Some(first) = list.as_ref().and_then(|l| l.first()) {
                links.push(LabelledLink {
                    label,
                    url: first.url.clone(),
                });
            }
        }

        links
    }
}
