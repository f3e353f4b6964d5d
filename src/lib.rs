//! gigscout: discover live events near a city or coordinate.
//!
//! The crate searches the Ticketmaster Discovery API for events around a
//! location, lets the user mark favourites that outlive any single search, and
//! remembers the last search so the next launch can pick up where it left off.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │  CLI (main.rs)                                      │  ← Entry point
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Application Layer (app/)                           │
//! │  - EventSession controller                          │
//! │  - Session state and search lifecycle               │
//! └─────────────────────────────────────────────────────┘
//!         │                    │                    │
//! ┌───────────────┐   ┌───────────────┐   ┌───────────────┐
//! │ Client Layer  │   │ Storage Layer │   │ UI Layer      │
//! │ (client/)     │   │ (storage/)    │   │ (ui/)         │
//! │ - Discovery   │   │ - Key/value   │   │ - View models │
//! │ - Geocoding   │   │ - Favourites  │   │               │
//! │               │   │ - Last search │   │               │
//! └───────────────┘   └───────────────┘   └───────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Domain (domain/) and Infrastructure (paths)        │
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Observability (observability/)                     │  ← Optional
//! │  - OpenTelemetry spans exported to an OTLP file     │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`app`]: Session state and the [`EventSession`] controller
//! - [`client`]: Discovery API and geocoder clients
//! - [`domain`]: Event model, search queries, errors
//! - [`infrastructure`]: Data directory resolution
//! - [`storage`]: Key/value persistence, favourites, last search
//! - [`ui`]: Presentation-independent view models
//! - [`observability`]: OpenTelemetry tracing to a local file
//!
//! # Configuration
//!
//! Defaults, overridden by an optional TOML file, overridden by environment:
//!
//! ```toml
//! # ~/.config/gigscout/config.toml
//! api_key = "your-ticketmaster-key"
//! data_dir = "~/.local/share/gigscout"
//! request_timeout_secs = 10
//! trace_level = "debug"
//! ```
//!
//! `GIGSCOUT_API_KEY` (or `TICKETMASTER_API_KEY`), `GIGSCOUT_DATA_DIR`, and
//! `GIGSCOUT_TRACE_LEVEL` take precedence over the file.
//!
//! # Example
//!
//! ```rust,no_run
//! use gigscout::{initialize, Config};
//!
//! # async fn run() -> gigscout::Result<()> {
//! let config = Config::discover()?;
//! let session = initialize(&config)?;
//!
//! session.search_city("Austin").await;
//! if let Some(id) = session.events().first().and_then(|e| e.id.clone()) {
//!     session.toggle_favourite(&id);
//! }
//! # Ok(())
//! # }
//! ```

#![allow(clippy::multiple_crate_versions)]

pub mod app;
pub mod client;
pub mod domain;
pub mod infrastructure;
pub mod observability;
pub mod storage;
pub mod ui;

pub use app::{Completion, EventSession, SearchPhase, SessionState};
pub use domain::{Coordinate, Event, GigscoutError, LastSearch, Result, SearchQuery};

use client::{DiscoveryClient, NominatimGeocoder};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use storage::{JsonFileStore, STATE_FILE_NAME};

pub const DEFAULT_DISCOVERY_URL: &str = "https://app.ticketmaster.com/discovery/v2";
pub const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;

const CONFIG_FILE_NAME: &str = "config.toml";

/// Runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Discovery API key. Required to search; favourites work without it.
    pub api_key: Option<String>,

    /// Discovery API base URL, without the `/events.json` suffix.
    pub discovery_url: String,

    /// Nominatim-compatible geocoder base URL.
    pub geocoder_url: String,

    /// Directory holding `state.json` and trace output.
    pub data_dir: PathBuf,

    /// Timeout applied to each outbound HTTP request.
    pub request_timeout_secs: u64,

    /// Tracing filter directive, e.g. `"debug"` or `"gigscout=trace"`.
    ///
    /// `RUST_LOG` wins when set. Default: `"info"`
    pub trace_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            discovery_url: DEFAULT_DISCOVERY_URL.to_string(),
            geocoder_url: DEFAULT_GEOCODER_URL.to_string(),
            data_dir: infrastructure::get_data_dir(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            trace_level: None,
        }
    }
}

/// On-disk shape: every key optional so partial files layer over defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    api_key: Option<String>,
    discovery_url: Option<String>,
    geocoder_url: Option<String>,
    data_dir: Option<String>,
    request_timeout_secs: Option<u64>,
    trace_level: Option<String>,
}

impl Config {
    /// Parses a TOML document over the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`GigscoutError::Config`] on malformed TOML, unknown keys, or a
    /// zero timeout.
    ///
    /// # Example
    ///
    /// ```rust
    /// use gigscout::Config;
    ///
    /// let config = Config::from_toml_str("api_key = \"abc\"\nrequest_timeout_secs = 5").unwrap();
    /// assert_eq!(config.api_key.as_deref(), Some("abc"));
    /// assert_eq!(config.request_timeout_secs, 5);
    /// ```
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let file: ConfigFile = toml::from_str(text)
            .map_err(|e| GigscoutError::Config(format!("invalid config: {e}")))?;

        let defaults = Self::default();
        let config = Self {
            api_key: file.api_key.or(defaults.api_key),
            discovery_url: file.discovery_url.unwrap_or(defaults.discovery_url),
            geocoder_url: file.geocoder_url.unwrap_or(defaults.geocoder_url),
            data_dir: file
                .data_dir
                .map_or(defaults.data_dir, |dir| PathBuf::from(infrastructure::expand_tilde(&dir))),
            request_timeout_secs: file
                .request_timeout_secs
                .unwrap_or(defaults.request_timeout_secs),
            trace_level: file.trace_level.or(defaults.trace_level),
        };

        if config.request_timeout_secs == 0 {
            return Err(GigscoutError::Config("request_timeout_secs must be positive".to_string()));
        }
        Ok(config)
    }

    /// Loads `path`, falling back to defaults when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`GigscoutError::Io`] if the file exists but cannot be read, or
    /// [`GigscoutError::Config`] if it does not parse.
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::from_toml_str(&text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Default config file location: `<config_dir>/gigscout/config.toml`.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("gigscout").join(CONFIG_FILE_NAME))
    }

    /// Loads the default config file, then applies environment overrides.
    ///
    /// # Errors
    ///
    /// See [`Config::load`].
    pub fn discover() -> Result<Self> {
        let config = match Self::default_path() {
            Some(path) => Self::load(&path)?,
            None => Self::default(),
        };
        Ok(config.with_env_overrides())
    }

    /// Applies `GIGSCOUT_*` and `TICKETMASTER_API_KEY` environment variables.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(key) = get("GIGSCOUT_API_KEY").or_else(|| get("TICKETMASTER_API_KEY")) {
            self.api_key = Some(key);
        }
        if let Some(dir) = get(infrastructure::DATA_DIR_ENV) {
            self.data_dir = PathBuf::from(infrastructure::expand_tilde(&dir));
        }
        if let Some(level) = get("GIGSCOUT_TRACE_LEVEL") {
            self.trace_level = Some(level);
        }
        self
    }

    /// Path of the persisted key/value state.
    #[must_use]
    pub fn state_file(&self) -> PathBuf {
        self.data_dir.join(STATE_FILE_NAME)
    }
}

/// Builds a session backed by the JSON state file and the HTTP clients.
///
/// # Errors
///
/// Returns [`GigscoutError::Config`] if no API key is configured, or
/// [`GigscoutError::Io`] if the data directory cannot be created.
pub fn initialize(config: &Config) -> Result<EventSession> {
    tracing::debug!(data_dir = %config.data_dir.display(), "initializing gigscout");

    let store = Arc::new(JsonFileStore::open(config.state_file())?);
    let source = Arc::new(DiscoveryClient::new(config)?);
    let geocoder = Arc::new(NominatimGeocoder::new(config)?);

    Ok(EventSession::new(store, source, geocoder))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.api_key, None);
        assert_eq!(config.discovery_url, DEFAULT_DISCOVERY_URL);
        assert_eq!(config.geocoder_url, DEFAULT_GEOCODER_URL);
        assert_eq!(config.request_timeout_secs, 15);
        assert!(config.state_file().ends_with("state.json"));
    }

    #[test]
    fn toml_layers_over_defaults() {
        let config = Config::from_toml_str(
            r#"
            api_key = "k"
            data_dir = "/var/lib/gigscout"
            trace_level = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.api_key.as_deref(), Some("k"));
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/gigscout"));
        assert_eq!(config.trace_level.as_deref(), Some("debug"));
        assert_eq!(config.discovery_url, DEFAULT_DISCOVERY_URL);
    }

    #[test]
    fn toml_rejects_bad_input() {
        assert!(matches!(Config::from_toml_str("api_key = 3"), Err(GigscoutError::Config(_))));
        assert!(matches!(Config::from_toml_str("colour = \"red\""), Err(GigscoutError::Config(_))));
        assert!(matches!(
            Config::from_toml_str("request_timeout_secs = 0"),
            Err(GigscoutError::Config(_))
        ));
    }

    #[test]
    fn missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
    }

    #[test]
    fn env_overrides_file() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("TICKETMASTER_API_KEY", "fallback"),
            ("GIGSCOUT_DATA_DIR", "/tmp/gigs"),
            ("GIGSCOUT_TRACE_LEVEL", "  "),
        ]);
        let base =
            Config::from_toml_str("api_key = \"from-file\"\ntrace_level = \"warn\"").unwrap();

        let config = base.with_overrides(|key| env.get(key).map(|v| (*v).to_string()));

        assert_eq!(config.api_key.as_deref(), Some("fallback"));
        assert_eq!(config.data_dir, PathBuf::from("/tmp/gigs"));
        assert_eq!(config.trace_level.as_deref(), Some("warn"));
    }

    #[test]
    fn gigscout_key_beats_ticketmaster_key() {
        let config = Config::default().with_overrides(|key| match key {
            "GIGSCOUT_API_KEY" => Some("primary".to_string()),
            "TICKETMASTER_API_KEY" => Some("secondary".to_string()),
            _ => None,
        });
        assert_eq!(config.api_key.as_deref(), Some("primary"));
    }
}
