//! Application layer: session state and the controller that drives it.
//!
//! ```text
//! search ─→ EventSession ─→ Geocoder / EventSource
//!                │
//!                ├─→ FavouritesStore (reconcile, toggle)
//!                ├─→ LastSearchStore (on success)
//!                └─→ watch::Sender<SessionState> ─→ subscribers
//! ```
//!
//! # Modules
//!
//! - [`modes`]: Search lifecycle phases and completion outcomes
//! - [`state`]: Plain session data with synchronous transitions
//! - [`session`]: The async controller owning state and stores

pub mod modes;
pub mod session;
pub mod state;

pub use modes::{Completion, SearchPhase};
pub use session::EventSession;
pub use state::{filter_by_name, RequestId, SessionState};
