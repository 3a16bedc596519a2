//! # Session Engine
//!
//! Owns one workout's lifecycle and enforces which transitions are legal.
//!
//! ## Lifecycle
//!
//! | From          | Event  | To       | Side effect                 |
//! |---------------|--------|----------|-----------------------------|
//! | Idle          | start  | Active   | create session              |
//! | Active        | pause  | Paused   | record pause start          |
//! | Paused        | resume | Active   | accumulate pause duration   |
//! | Active        | ingest | Active   | update aggregates           |
//! | Paused        | ingest | Paused   | append sample only          |
//! | Active/Paused | finish | Finished | close duration, freeze      |
//!
//! Every other pair fails with [`SessionError::InvalidTransition`] and leaves
//! the state untouched.
//!
//! The engine is single-writer: every method that mutates takes `&mut self`.
//! Callers that receive samples on another thread serialize access through
//! an owning task ([`tracker`](crate::tracker), feature `runtime`) or a mutex
//! ([`SESSION_ENGINE`]).

use std::mem;
use std::sync::Mutex;

use log::{debug, info};
use once_cell::sync::Lazy;
use serde::Serialize;

use crate::clock::{Clock, SystemClock};
use crate::error::{OptionExt, Result, SessionError, SessionEvent, StateKind};
use crate::metrics::{self, IngestOutcome};
use crate::record::{self, Record, Supplement};
use crate::session::Session;
use crate::units;
use crate::{ActivityCategory, LocationSample, SessionId, TrackerConfig};

// ============================================================================
// Core Types
// ============================================================================

/// Lifecycle state. The session payload exists only in states that need it.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SessionState {
    #[default]
    Idle,
    Active(Session),
    Paused(Session),
    Finished(Session),
}

impl SessionState {
    pub fn kind(&self) -> StateKind {
        match self {
            SessionState::Idle => StateKind::Idle,
            SessionState::Active(_) => StateKind::Active,
            SessionState::Paused(_) => StateKind::Paused,
            SessionState::Finished(_) => StateKind::Finished,
        }
    }

    pub fn session(&self) -> Option<&Session> {
        match self {
            SessionState::Idle => None,
            SessionState::Active(s) | SessionState::Paused(s) | SessionState::Finished(s) => {
                Some(s)
            }
        }
    }

    /// Active or paused.
    pub fn is_in_progress(&self) -> bool {
        matches!(self, SessionState::Active(_) | SessionState::Paused(_))
    }
}

/// Display values for the current session, refreshed on every tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub id: SessionId,
    pub category: ActivityCategory,
    pub state: String,
    pub duration_s: f64,
    pub distance_m: f64,
    pub current_speed_kmh: f64,
    pub average_speed_kmh: f64,
    pub max_speed_kmh: f64,
    /// Minutes per km, 0 when standing still
    pub current_pace_min_km: f64,
    pub average_pace_min_km: f64,
    pub active_time_s: f64,
    pub stopped_time_s: f64,
    pub active_time_percentage: f64,
    pub is_moving: bool,
    /// Length of the recorded track, including samples taken while paused
    pub route_length_m: f64,
    pub sample_count: usize,
    pub tick: u64,
}

// ============================================================================
// Session Engine
// ============================================================================

/// The workout session state machine.
pub struct SessionEngine<C: Clock = SystemClock> {
    state: SessionState,
    clock: C,
    config: TrackerConfig,
    /// Display-only counter bumped by `tick`
    ticks: u64,
}

impl Default for SessionEngine<SystemClock> {
    fn default() -> Self {
        Self::new(SystemClock)
    }
}

impl<C: Clock> SessionEngine<C> {
    /// Create an idle engine with default configuration.
    pub fn new(clock: C) -> Self {
        Self {
            state: SessionState::Idle,
            clock,
            config: TrackerConfig::default(),
            ticks: 0,
        }
    }

    /// Create an idle engine with custom configuration.
    ///
    /// Fails with [`SessionError::Config`] if the configuration is invalid.
    pub fn with_config(clock: C, config: TrackerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::new(clock)
        })
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn kind(&self) -> StateKind {
        self.state.kind()
    }

    pub fn session(&self) -> Option<&Session> {
        self.state.session()
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Replace the configuration. Takes effect from the next sample.
    pub fn set_config(&mut self, config: TrackerConfig) -> Result<()> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Start a new session. Only valid while idle.
    pub fn start(&mut self, category: ActivityCategory) -> Result<SessionId> {
        if !matches!(self.state, SessionState::Idle) {
            return Err(SessionError::invalid_transition(
                self.kind(),
                SessionEvent::Start,
            ));
        }

        let session = Session::new(category, self.clock.now());
        let id = session.id;
        info!("[SessionEngine] Started {} session {}", category, id);

        self.state = SessionState::Active(session);
        self.ticks = 0;
        Ok(id)
    }

    /// Pause the running session.
    pub fn pause(&mut self) -> Result<()> {
        let now = self.clock.now();
        match mem::take(&mut self.state) {
            SessionState::Active(mut session) => {
                session.current_pause_start = Some(now);
                info!(
                    "[SessionEngine] Paused {} at {:.1}s",
                    session.id,
                    session.duration_at(now)
                );
                self.state = SessionState::Paused(session);
                Ok(())
            }
            other => self.reject(other, SessionEvent::Pause),
        }
    }

    /// Resume a paused session, adding the pause to the accumulated total.
    pub fn resume(&mut self) -> Result<()> {
        let now = self.clock.now();
        match mem::take(&mut self.state) {
            SessionState::Paused(mut session) => {
                let paused = session.close_pause(now);
                session.metrics = metrics::restart(&session.metrics, now);
                info!(
                    "[SessionEngine] Resumed {} after {:.1}s pause ({:.1}s paused in total)",
                    session.id, paused, session.accumulated_pause_s
                );
                self.state = SessionState::Active(session);
                Ok(())
            }
            other => self.reject(other, SessionEvent::Resume),
        }
    }

    /// Feed one location sample.
    ///
    /// While active the sample updates the metrics; while paused it is stored
    /// for the route only. Samples failing the accuracy gate are dropped
    /// silently and reported as [`IngestOutcome::Rejected`].
    pub fn ingest(&mut self, sample: LocationSample) -> Result<IngestOutcome> {
        let now = self.clock.now();
        let config = &self.config;

        let session = match &mut self.state {
            SessionState::Active(session) | SessionState::Paused(session) => session,
            other => {
                return Err(SessionError::invalid_transition(
                    other.kind(),
                    SessionEvent::Ingest,
                ))
            }
        };

        if let Some(reason) = metrics::check_sample(&sample, config.max_horizontal_accuracy_m) {
            debug!("[SessionEngine] Dropped sample: {:?}", reason);
            return Ok(IngestOutcome::Rejected(reason));
        }

        let outcome = if session.is_paused() {
            debug!("[SessionEngine] Recorded sample while paused");
            IngestOutcome::Recorded
        } else {
            let duration = session.duration_at(now);
            session.metrics = metrics::update(
                &session.metrics,
                &sample,
                now,
                duration,
                config.moving_threshold_mps,
            );
            IngestOutcome::Aggregated
        };

        session.samples.push(sample);
        Ok(outcome)
    }

    /// Finish the session. A pause in progress is closed first.
    pub fn finish(&mut self) -> Result<SessionId> {
        let now = self.clock.now();
        match mem::take(&mut self.state) {
            SessionState::Active(mut session) | SessionState::Paused(mut session) => {
                session.close_pause(now);
                session.end_time = Some(now);

                let id = session.id;
                info!(
                    "[SessionEngine] Finished {}: {:.0}m in {:.1}s, {} samples",
                    id,
                    session.metrics.total_distance_m,
                    session.duration_at(now),
                    session.samples.len()
                );
                self.state = SessionState::Finished(session);
                Ok(id)
            }
            other => self.reject(other, SessionEvent::Finish),
        }
    }

    /// Convert the finished session into its record. Does not change state.
    pub fn record(&self) -> Result<Record> {
        match &self.state {
            SessionState::Finished(session) => record::to_record(session),
            other => Err(SessionError::InvalidState {
                operation: "record",
                expected: StateKind::Finished,
                actual: other.kind(),
            }),
        }
    }

    /// Convert the finished session and return the engine to idle.
    ///
    /// The returned record is the only thing left of the session; hand it to
    /// a [`RecordStore`](crate::RecordStore).
    pub fn take_record(&mut self) -> Result<Record> {
        let record = self.record()?;
        self.state = SessionState::Idle;
        info!("[SessionEngine] Released record {}", record.id);
        Ok(record)
    }

    fn reject<T>(&mut self, previous: SessionState, event: SessionEvent) -> Result<T> {
        let kind = previous.kind();
        self.state = previous;
        debug!("[SessionEngine] Rejected {} while {}", event, kind);
        Err(SessionError::invalid_transition(kind, event))
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Session duration in seconds, excluding pauses. Not available while idle.
    pub fn duration(&self) -> Result<f64> {
        let session =
            self.session()
                .ok_or_invalid_state("duration", StateKind::Active, StateKind::Idle)?;
        Ok(session.duration_at(self.clock.now()))
    }

    /// Current display values, or `None` while idle.
    pub fn snapshot(&self) -> Option<SessionSnapshot> {
        let session = self.session()?;
        let duration = session.duration_at(self.clock.now());
        let m = &session.metrics;

        Some(SessionSnapshot {
            id: session.id,
            category: session.category,
            state: self.kind().to_string(),
            duration_s: duration,
            distance_m: m.total_distance_m,
            current_speed_kmh: units::speed_kmh(m.current_speed_mps),
            average_speed_kmh: units::speed_kmh(m.average_speed_mps),
            max_speed_kmh: units::speed_kmh(m.max_speed_mps),
            current_pace_min_km: units::pace_from_mps(m.current_speed_mps),
            average_pace_min_km: units::pace_from_mps(m.average_speed_mps),
            active_time_s: m.active_time_s,
            stopped_time_s: m.stopped_time_s,
            active_time_percentage: m.active_time_percentage(duration),
            is_moving: m.is_currently_moving,
            route_length_m: session.route_length_m(),
            sample_count: session.samples.len(),
            tick: self.ticks,
        })
    }

    /// Periodic display refresh. Never changes session data.
    pub fn tick(&mut self) -> Option<SessionSnapshot> {
        if self.state.is_in_progress() {
            self.ticks += 1;
        }
        self.snapshot()
    }

    /// Snapshot as JSON. Returns `"null"` while idle.
    pub fn snapshot_json(&self) -> String {
        serde_json::to_string(&self.snapshot()).unwrap_or_else(|_| "null".to_string())
    }

    // ========================================================================
    // Manual Entries
    // ========================================================================

    fn manual_session(&mut self, operation: &'static str) -> Result<&mut Session> {
        match &mut self.state {
            SessionState::Active(session) | SessionState::Paused(session) => Ok(session),
            other => Err(SessionError::InvalidState {
                operation,
                expected: StateKind::Active,
                actual: other.kind(),
            }),
        }
    }

    /// Set or clear the comment. Empty strings clear it.
    pub fn set_comment(&mut self, comment: Option<String>) -> Result<()> {
        let session = self.manual_session("set_comment")?;
        session.manual.comment = comment.filter(|c| !c.trim().is_empty());
        Ok(())
    }

    pub fn set_step_count(&mut self, steps: Option<u32>) -> Result<()> {
        self.manual_session("set_step_count")?.manual.step_count = steps;
        Ok(())
    }

    pub fn set_calorie_count(&mut self, calories: Option<u32>) -> Result<()> {
        self.manual_session("set_calorie_count")?.manual.calorie_count = calories;
        Ok(())
    }

    pub fn add_supplement(&mut self, supplement: Supplement) -> Result<()> {
        let session = self.manual_session("add_supplement")?;
        session
            .manual
            .supplements
            .get_or_insert_with(Vec::new)
            .push(supplement);
        Ok(())
    }
}

// ============================================================================
// Global Singleton for FFI
// ============================================================================

/// Global session engine instance.
///
/// This singleton allows FFI calls to drive one shared session without
/// passing state back and forth across the FFI boundary.
pub static SESSION_ENGINE: Lazy<Mutex<SessionEngine>> =
    Lazy::new(|| Mutex::new(SessionEngine::default()));

/// Get a lock on the global engine.
pub fn with_session_engine<F, R>(f: F) -> R
where
    F: FnOnce(&mut SessionEngine) -> R,
{
    let mut engine = SESSION_ENGINE
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    f(&mut engine)
}

// ============================================================================
// Tests
// ============================================================================
