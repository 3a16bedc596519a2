//! Unified error handling for the workout tracker.
//!
//! Only lifecycle misuse is surfaced to callers. Numeric noise from the
//! sensor stream (duplicate timestamps, clock skew, degraded accuracy) is
//! absorbed inside the aggregator and never shows up here.

use std::fmt;

use thiserror::Error;

/// Which lifecycle state the engine is in, without the session payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateKind {
    Idle,
    Active,
    Paused,
    Finished,
}

impl fmt::Display for StateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StateKind::Idle => "idle",
            StateKind::Active => "active",
            StateKind::Paused => "paused",
            StateKind::Finished => "finished",
        };
        f.write_str(name)
    }
}

/// Lifecycle events accepted by the session engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionEvent {
    Start,
    Pause,
    Resume,
    Ingest,
    Finish,
}

impl fmt::Display for SessionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionEvent::Start => "start",
            SessionEvent::Pause => "pause",
            SessionEvent::Resume => "resume",
            SessionEvent::Ingest => "ingest",
            SessionEvent::Finish => "finish",
        };
        f.write_str(name)
    }
}

/// Unified error type for workout tracker operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    /// A lifecycle method was called from a state that does not permit it.
    #[error("cannot {event} a session while {state}")]
    InvalidTransition { state: StateKind, event: SessionEvent },

    /// An operation that needs a specific state was invoked outside it.
    #[error("{operation} requires a {expected} session, engine is {actual}")]
    InvalidState {
        operation: &'static str,
        expected: StateKind,
        actual: StateKind,
    },

    /// Record store failure (duplicate id, missing record, backend error).
    #[error("record store error: {message}")]
    Store { message: String },

    /// Invalid tracker configuration.
    #[error("configuration error: {message}")]
    Config { message: String },

    /// The session actor is no longer running.
    #[error("session tracker has stopped")]
    TrackerStopped,
}

impl SessionError {
    pub(crate) fn invalid_transition(state: StateKind, event: SessionEvent) -> Self {
        SessionError::InvalidTransition { state, event }
    }

    pub(crate) fn store(message: impl Into<String>) -> Self {
        SessionError::Store {
            message: message.into(),
        }
    }

    pub(crate) fn config(message: impl Into<String>) -> Self {
        SessionError::Config {
            message: message.into(),
        }
    }
}

/// Result type alias for workout tracker operations.
pub type Result<T> = std::result::Result<T, SessionError>;

/// Extension trait for converting Option to SessionError.
pub trait OptionExt<T> {
    /// Convert Option to Result with an invalid state error.
    fn ok_or_invalid_state(
        self,
        operation: &'static str,
        expected: StateKind,
        actual: StateKind,
    ) -> Result<T>;

    /// Convert Option to Result with a store error.
    fn ok_or_store(self, message: &str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_invalid_state(
        self,
        operation: &'static str,
        expected: StateKind,
        actual: StateKind,
    ) -> Result<T> {
        self.ok_or(SessionError::InvalidState {
            operation,
            expected,
            actual,
        })
    }

    fn ok_or_store(self, message: &str) -> Result<T> {
        self.ok_or_else(|| SessionError::store(message))
    }
}
