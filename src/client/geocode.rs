//! City name → coordinate resolution.
//!
//! The session controller only needs "first match or nothing"; there is no
//! disambiguation. [`NominatimGeocoder`] implements that against an OpenStreetMap
//! Nominatim endpoint.

use crate::domain::error::{GigscoutError, Result};
use crate::domain::Coordinate;
use crate::Config;
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use std::time::Duration;

const USER_AGENT: &str = concat!("gigscout/", env!("CARGO_PKG_VERSION"));

/// Resolves free-text place names to coordinates.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Returns the first matching coordinate, or `None` if nothing matched.
    ///
    /// # Errors
    ///
    /// Returns an error only when the lookup itself failed (transport, payload).
    async fn resolve(&self, city: &str) -> Result<Option<Coordinate>>;
}

/// Nominatim search result. Coordinates arrive as strings.
#[derive(Debug, Deserialize)]
struct Place {
    lat: String,
    lon: String,
}

impl Place {
    fn coordinate(&self) -> Result<Coordinate> {
        let parse = |value: &str| {
            value
                .parse::<f64>()
                .map_err(|e| GigscoutError::Decode(format!("bad coordinate {value:?}: {e}")))
        };
        Ok(Coordinate::new(parse(&self.lat)?, parse(&self.lon)?))
    }
}

/// Geocoder backed by the Nominatim `/search` API.
pub struct NominatimGeocoder {
    http: Client,
    base_url: String,
}

impl NominatimGeocoder {
    /// # Errors
    ///
    /// Returns [`GigscoutError::Config`] if the HTTP client cannot be constructed.
    pub fn new(config: &Config) -> Result<Self> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| GigscoutError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.geocoder_url.trim_end_matches('/').to_string(),
        })
    }

    fn search_url(&self, city: &str) -> Result<Url> {
        Url::parse_with_params(
            &format!("{}/search", self.base_url),
            [("q", city), ("format", "json"), ("limit", "1")],
        )
        .map_err(|e| GigscoutError::Config(format!("invalid geocoder URL: {e}")))
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn resolve(&self, city: &str) -> Result<Option<Coordinate>> {
        tracing::debug!(city = %city, "geocoding city");

        let response = self.http.get(self.search_url(city)?).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(GigscoutError::Network(format!("geocoder returned {status}")));
        }

        let places: Vec<Place> = response.json().await?;
        let coordinate = places.first().map(Place::coordinate).transpose()?;

        tracing::debug!(found = coordinate.is_some(), "geocode complete");
        Ok(coordinate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn place_coordinates_parse_from_strings() {
        let body = r#"[{"lat": "30.2711286", "lon": "-97.7436995", "display_name": "Austin"}]"#;
        let places: Vec<Place> = serde_json::from_str(body).unwrap();
        assert_eq!(
            places[0].coordinate().unwrap(),
            Coordinate::new(30.271_128_6, -97.743_699_5)
        );
    }

    #[test]
    fn bad_place_coordinate_is_decode_error() {
        let place = Place {
            lat: "north".into(),
            lon: "0".into(),
        };
        assert!(matches!(place.coordinate(), Err(GigscoutError::Decode(_))));
    }

    #[test]
    fn search_url_limits_to_first_match() {
        let geocoder = NominatimGeocoder::new(&Config::default()).unwrap();
        let url = geocoder.search_url("São Paulo").unwrap();

        assert_eq!(url.path(), "/search");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("q".to_string(), "São Paulo".to_string())));
        assert!(pairs.contains(&("limit".to_string(), "1".to_string())));
    }
}
