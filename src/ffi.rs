//! FFI bindings for mobile platforms (iOS/Android).
//!
//! Thin UniFFI wrappers over the global [`SESSION_ENGINE`](crate::SESSION_ENGINE).
//! Failures are logged and reported as `false` / `None`, and structured data
//! crosses the boundary as JSON strings.

use log::{info, warn};

use crate::{
    capability_table, init_logging, with_session_engine, ActivityCategory, LocationSample,
    Supplement, SupplementTiming, TrackerConfig,
};

fn log_failure<T>(operation: &str, result: crate::Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("[WorkoutTrackerRust] {} failed: {}", operation, e);
            None
        }
    }
}

// ============================================================================
// Session Lifecycle
// ============================================================================

/// Initialize logging (call once at app startup).
#[uniffi::export]
pub fn session_init() {
    init_logging();
    info!("[WorkoutTrackerRust] Initialized");
}

/// Replace the tracker configuration from JSON. Missing fields take defaults.
#[uniffi::export]
pub fn session_configure(config_json: String) -> bool {
    init_logging();
    let result = TrackerConfig::from_json(&config_json)
        .and_then(|config| with_session_engine(|e| e.set_config(config)));
    log_failure("configure", result).is_some()
}

/// Start a session. Returns the session id.
#[uniffi::export]
pub fn session_start(category: String) -> Option<String> {
    init_logging();
    let result = category
        .parse::<ActivityCategory>()
        .and_then(|category| with_session_engine(|e| e.start(category)));
    log_failure("start", result).map(|id| id.to_string())
}

#[uniffi::export]
pub fn session_pause() -> bool {
    log_failure("pause", with_session_engine(|e| e.pause())).is_some()
}

#[uniffi::export]
pub fn session_resume() -> bool {
    log_failure("resume", with_session_engine(|e| e.resume())).is_some()
}

/// Feed one location sample. Returns `false` only for lifecycle misuse;
/// inaccurate samples are dropped silently and still return `true`.
#[uniffi::export]
pub fn session_ingest(
    latitude: f64,
    longitude: f64,
    timestamp: f64,
    horizontal_accuracy: Option<f64>,
) -> bool {
    let sample = LocationSample::new(latitude, longitude, timestamp, horizontal_accuracy);
    log_failure("ingest", with_session_engine(|e| e.ingest(sample))).is_some()
}

/// Finish the session. Returns the session id.
#[uniffi::export]
pub fn session_finish() -> Option<String> {
    log_failure("finish", with_session_engine(|e| e.finish())).map(|id| id.to_string())
}

/// Release the finished session as a JSON record and return to idle.
#[uniffi::export]
pub fn session_take_record_json() -> Option<String> {
    let record = log_failure("take_record", with_session_engine(|e| e.take_record()))?;
    serde_json::to_string(&record).ok()
}

// ============================================================================
// Manual Entries
// ============================================================================

#[uniffi::export]
pub fn session_set_comment(comment: Option<String>) -> bool {
    log_failure("set_comment", with_session_engine(|e| e.set_comment(comment))).is_some()
}

#[uniffi::export]
pub fn session_set_step_count(steps: Option<u32>) -> bool {
    log_failure("set_step_count", with_session_engine(|e| e.set_step_count(steps))).is_some()
}

#[uniffi::export]
pub fn session_set_calorie_count(calories: Option<u32>) -> bool {
    log_failure(
        "set_calorie_count",
        with_session_engine(|e| e.set_calorie_count(calories)),
    )
    .is_some()
}

/// Log a supplement. `timing` is `before`, `during` or `after`
/// (the `_workout` suffix is optional).
#[uniffi::export]
pub fn session_add_supplement(name: String, amount: String, timing: String) -> bool {
    let result = timing
        .parse::<SupplementTiming>()
        .and_then(|timing| {
            with_session_engine(|e| e.add_supplement(Supplement::new(name, amount, timing)))
        });
    log_failure("add_supplement", result).is_some()
}

// ============================================================================
// Display
// ============================================================================

/// Session duration in seconds, 0 while idle.
#[uniffi::export]
pub fn session_duration() -> f64 {
    with_session_engine(|e| e.duration()).unwrap_or(0.0)
}

/// Current lifecycle state as a lowercase name.
#[uniffi::export]
pub fn session_state() -> String {
    with_session_engine(|e| e.kind().to_string())
}

/// Current snapshot as JSON (`"null"` while idle).
#[uniffi::export]
pub fn session_snapshot_json() -> String {
    with_session_engine(|e| e.snapshot_json())
}

/// Advance the display tick and return the snapshot as JSON.
#[uniffi::export]
pub fn session_tick_json() -> String {
    with_session_engine(|e| {
        e.tick();
        e.snapshot_json()
    })
}

/// Activity categories with their capability flags, as JSON.
#[uniffi::export]
pub fn category_capabilities_json() -> String {
    serde_json::to_string(&capability_table()).unwrap_or_else(|_| "[]".to_string())
}
