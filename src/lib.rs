//! # Workout Tracker
//!
//! Tracks a single workout session from start to finish, turning a live, noisy
//! stream of GPS samples into distance, speed, pace and active/stopped time,
//! with pause/resume and a final immutable record for storage.
//!
//! This library provides:
//! - A session state machine (idle → active ⇄ paused → finished)
//! - An incremental, O(1)-per-sample metrics aggregator
//! - Conversion of a finished session into a persistable [`Record`]
//!
//! ## Features
//!
//! - **`runtime`** - Single-writer tokio actor with periodic display ticks
//! - **`persistence`** - SQLite storage for finished records
//! - **`ffi`** - FFI bindings for mobile platforms (iOS/Android)
//! - **`full`** - Enable all features
//!
//! ## Quick Start
//!
//! ```rust
//! use workout_tracker::{ActivityCategory, LocationSample, SessionEngine};
//! use workout_tracker::clock::ManualClock;
//!
//! let clock = ManualClock::new(0.0);
//! let mut engine = SessionEngine::new(clock.clone());
//!
//! engine.start(ActivityCategory::Running).unwrap();
//! engine.ingest(LocationSample::new(51.5074, -0.1278, 0.0, Some(5.0))).unwrap();
//! clock.advance(10.0);
//! engine.ingest(LocationSample::new(51.5083, -0.1278, 10.0, Some(5.0))).unwrap();
//! engine.finish().unwrap();
//!
//! let record = engine.take_record().unwrap();
//! println!("{:.0} m in {:.0} s", record.distance_meters.unwrap_or(0.0), record.duration_seconds);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Unified error handling
pub mod error;
pub use error::{OptionExt, Result, SessionError, SessionEvent, StateKind};

// Wall-clock abstraction (replaceable in tests)
pub mod clock;
pub use clock::{Clock, ManualClock, SystemClock};

// Geographic utilities (distance calculations)
pub mod geo_utils;

// Speed/pace conversions
pub mod units;

// Activity categories and capability flags
pub mod category;
pub use category::{capability_table, ActivityCategory, CategoryCapabilities, CategoryGroup};

// Tracker configuration
pub mod config;
pub use config::TrackerConfig;

// Incremental metrics aggregation
pub mod metrics;
pub use metrics::{IngestOutcome, RejectReason, SessionMetrics};

// In-progress session data and duration math
pub mod session;
pub use session::{ManualEntries, Session};

// Session state machine (singleton available for FFI)
pub mod engine;
pub use engine::{with_session_engine, SessionEngine, SessionSnapshot, SessionState, SESSION_ENGINE};

// Finished session → persistable record
pub mod record;
pub use record::{to_record, Record, Supplement, SupplementTiming, WorkoutIntensity};

// Record store contract
pub mod store;
pub use store::{MemoryRecordStore, RecordStore};

// SQLite-backed record store
#[cfg(feature = "persistence")]
pub mod persistence;
#[cfg(feature = "persistence")]
pub use persistence::SqliteRecordStore;

// Summary statistics over stored records
pub mod stats;
pub use stats::WorkoutStatistics;

// Session actor with periodic ticks
#[cfg(feature = "runtime")]
pub mod tracker;
#[cfg(feature = "runtime")]
pub use tracker::{spawn_tracker, TrackerHandle};

// FFI bindings for mobile platforms (iOS/Android)
#[cfg(feature = "ffi")]
pub mod ffi;

#[cfg(feature = "ffi")]
uniffi::setup_scaffolding!();

/// Initialize logging for Android (only used in FFI)
#[cfg(all(feature = "ffi", target_os = "android"))]
pub(crate) fn init_logging() {
    use android_logger::Config;
    use log::LevelFilter;

    android_logger::init_once(
        Config::default()
            .with_max_level(LevelFilter::Debug)
            .with_tag("WorkoutTrackerRust"),
    );
}

#[cfg(all(feature = "ffi", not(target_os = "android")))]
pub(crate) fn init_logging() {
    // No-op on non-Android platforms
}

// ============================================================================
// Core Types
// ============================================================================

/// A GPS coordinate with latitude and longitude.
///
/// # Example
/// ```
/// use workout_tracker::GpsPoint;
/// let point = GpsPoint::new(50.4501, 30.5234); // Kyiv
/// assert!(point.is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GpsPoint {
    /// Create a new GPS point.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Check if the point has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }
}

/// One location observation from the location provider.
///
/// `horizontal_accuracy` is the radius of uncertainty in meters; `None` means
/// the provider did not report one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationSample {
    pub point: GpsPoint,
    /// Unix timestamp in seconds, as reported by the provider
    pub timestamp: f64,
    pub horizontal_accuracy: Option<f64>,
}

impl LocationSample {
    pub fn new(
        latitude: f64,
        longitude: f64,
        timestamp: f64,
        horizontal_accuracy: Option<f64>,
    ) -> Self {
        Self {
            point: GpsPoint::new(latitude, longitude),
            timestamp,
            horizontal_accuracy,
        }
    }
}

/// Opaque session identifier, carried into the persisted record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Generate a fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for SessionId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for SessionId {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| SessionError::store(format!("invalid session id '{}': {}", s, e)))
    }
}

// ============================================================================
// Tests
// ============================================================================
