//! Search lifecycle state machine.
//!
//! Every search runs `Idle → Loading → (Succeeded | Failed)`. Both terminal phases
//! stay put until the next search moves the session back to `Loading`; there is no
//! automatic retry.
//!
//! # Example
//!
//! ```rust
//! use gigscout::app::SearchPhase;
//!
//! let phase = SearchPhase::default();
//! assert_eq!(phase, SearchPhase::Idle);
//! assert!(!phase.is_terminal());
//! ```

/// Phase of the most recently issued search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchPhase {
    /// No search has been issued in this session.
    #[default]
    Idle,

    /// The latest search is in flight.
    Loading,

    /// The latest search replaced the event list.
    Succeeded,

    /// The latest search failed; the previous event list is still shown.
    Failed,
}

impl SearchPhase {
    /// Returns `true` for `Succeeded` and `Failed`.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

/// What happened to a search outcome when it came back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The outcome was current and replaced the event list.
    Applied,

    /// The outcome was current and was an error; the event list was kept.
    Failed,

    /// A newer search had started; the outcome was dropped.
    Stale,
}
