//! Event Search Client for the Ticketmaster Discovery API.
//!
//! One search is one `GET {base}/events.json?apikey=..&latlong=lat,lon`. The body is
//! decoded into [`EventsResponse`]; a payload without `_embedded.events` is zero
//! results, not an error.

use crate::domain::error::{GigscoutError, Result};
use crate::domain::{Coordinate, Event, EventsResponse};
use crate::Config;
use async_trait::async_trait;
use reqwest::{Client, Url};
use std::time::Duration;

/// Source of events for a coordinate.
///
/// The session controller depends on this trait, not on the HTTP client, so tests
/// can script responses and their timing.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Fetches events near `coordinate`, in upstream order.
    ///
    /// # Errors
    ///
    /// Returns [`GigscoutError::Network`] for transport failures and non-success
    /// statuses, and [`GigscoutError::Decode`] for malformed payloads.
    async fn fetch_events(&self, coordinate: Coordinate) -> Result<Vec<Event>>;
}

/// HTTP client for the discovery endpoint.
pub struct DiscoveryClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl DiscoveryClient {
    /// Builds a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`GigscoutError::Config`] if no API key is configured or the HTTP
    /// client cannot be constructed.
    pub fn new(config: &Config) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                GigscoutError::Config(
                    "missing discovery API key (set api_key or GIGSCOUT_API_KEY)".to_string(),
                )
            })?;

        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| GigscoutError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.discovery_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// Request URL for a coordinate search.
    ///
    /// # Errors
    ///
    /// Returns [`GigscoutError::Config`] if the configured base URL is not a URL.
    pub fn events_url(&self, coordinate: Coordinate) -> Result<Url> {
        let latlong = coordinate.latlong();
        Url::parse_with_params(
            &format!("{}/events.json", self.base_url),
            [("apikey", self.api_key.as_str()), ("latlong", latlong.as_str())],
        )
        .map_err(|e| GigscoutError::Config(format!("invalid discovery URL: {e}")))
    }
}

#[async_trait]
impl EventSource for DiscoveryClient {
    async fn fetch_events(&self, coordinate: Coordinate) -> Result<Vec<Event>> {
        let url = self.events_url(coordinate)?;
        tracing::debug!(latlong = %coordinate.latlong(), "requesting events");

        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(GigscoutError::Network(format!(
                "discovery API returned {status}"
            )));
        }

        let body = response.bytes().await?;
        let events = parse_events(&body)?;

        tracing::debug!(event_count = events.len(), "events received");
        Ok(events)
    }
}

/// Decodes a discovery response body into its events.
///
/// # Errors
///
/// Returns [`GigscoutError::Decode`] if the body is not a valid events payload.
///
/// # Examples
///
/// ```
/// use gigscout::client::parse_events;
///
/// assert!(parse_events(br#"{"page": {"totalElements": 0}}"#)?.is_empty());
/// assert!(parse_events(b"<html>").is_err());
/// # Ok::<(), gigscout::GigscoutError>(())
/// ```
pub fn parse_events(body: &[u8]) -> Result<Vec<Event>> {
    serde_json::from_slice::<EventsResponse>(body)
        .map(EventsResponse::into_events)
        .map_err(|e| {
            tracing::debug!(error = %e, "failed to decode events response");
            GigscoutError::Decode(e.to_string())
        })
}
