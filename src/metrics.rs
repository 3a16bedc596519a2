//! # Metrics Aggregator
//!
//! Pure, incremental aggregation of location samples into running metrics.
//!
//! [`update`] maps `(previous aggregate, new sample, wall-clock now, session
//! duration)` to a new aggregate in constant time. It never looks at sample
//! history; the only history it needs (the previous sample and when it
//! arrived) is carried inside [`SessionMetrics`].
//!
//! ## Per-sample steps
//!
//! 1. Wall-clock time since the previous sample is attributed to active or
//!    stopped time, based on the motion state in effect *during* that interval
//!    (the classification from the previous step).
//! 2. With no previous sample, the sample only seeds the aggregate.
//! 3. Otherwise the great-circle distance to the previous sample is added.
//! 4. Speed is `distance / Δtimestamp`, or `0` when `Δtimestamp <= 0`.
//! 5. Max speed, motion classification and average speed follow.
//!
//! Samples must pass [`check_sample`] first; rejected samples never reach
//! the aggregate. After a pause the engine calls [`restart`], so the first
//! sample of the next active stretch measures nothing.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::geo_utils::haversine_distance;
use crate::units;
use crate::LocationSample;

/// Running metrics for one session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionMetrics {
    /// Distance covered in meters
    pub total_distance_m: f64,
    /// Speed over the most recent sample interval, m/s
    pub current_speed_mps: f64,
    /// Total distance over session duration, m/s
    pub average_speed_mps: f64,
    pub max_speed_mps: f64,
    /// Seconds spent moving (speed above the moving threshold)
    pub active_time_s: f64,
    /// Seconds spent below the moving threshold
    pub stopped_time_s: f64,
    /// Wall-clock time the previous sample was ingested
    pub last_sample_time: Option<f64>,
    pub is_currently_moving: bool,
    /// Previous sample, used for the next distance/speed step
    pub last_sample: Option<LocationSample>,
}

impl SessionMetrics {
    /// Share of the session spent moving, 0-100.
    pub fn active_time_percentage(&self, duration_s: f64) -> f64 {
        if duration_s > 0.0 {
            self.active_time_s / duration_s * 100.0
        } else {
            0.0
        }
    }
}

/// Why a sample was dropped at the ingestion boundary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum RejectReason {
    /// Horizontal accuracy worse than the configured limit
    PoorAccuracy { accuracy_m: f64 },
    /// Negative or NaN accuracy (providers use negative values for "invalid")
    InvalidAccuracy,
    InvalidCoordinates,
    InvalidTimestamp,
}

/// What happened to an ingested sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum IngestOutcome {
    /// Stored and folded into the metrics (session active)
    Aggregated,
    /// Stored for history only (session paused)
    Recorded,
    /// Dropped silently at the ingestion boundary
    Rejected(RejectReason),
}

/// Ingestion gate. Returns `None` when the sample may be aggregated.
///
/// Unknown accuracy passes; only numerically bad accuracy is rejected.
pub fn check_sample(sample: &LocationSample, max_accuracy_m: f64) -> Option<RejectReason> {
    if !sample.point.is_valid() {
        return Some(RejectReason::InvalidCoordinates);
    }
    if !sample.timestamp.is_finite() {
        return Some(RejectReason::InvalidTimestamp);
    }
    match sample.horizontal_accuracy {
        Some(accuracy) if accuracy.is_nan() || accuracy < 0.0 => {
            Some(RejectReason::InvalidAccuracy)
        }
        Some(accuracy) if accuracy > max_accuracy_m => Some(RejectReason::PoorAccuracy {
            accuracy_m: accuracy,
        }),
        _ => None,
    }
}

/// Fold one accepted sample into the aggregate.
///
/// * `now` - wall-clock time of ingestion (Unix seconds)
/// * `duration_s` - session duration at `now`, for the average speed
/// * `moving_threshold_mps` - speed above which the next interval counts as moving
pub fn update(
    prev: &SessionMetrics,
    sample: &LocationSample,
    now: f64,
    duration_s: f64,
    moving_threshold_mps: f64,
) -> SessionMetrics {
    let mut next = prev.clone();

    if let Some(last_time) = prev.last_sample_time {
        let interval = now - last_time;
        if interval < 0.0 {
            warn!(
                "[Aggregator] Wall clock went backwards by {:.3}s, interval ignored",
                -interval
            );
        }
        let interval = interval.max(0.0);
        if prev.is_currently_moving {
            next.active_time_s += interval;
        } else {
            next.stopped_time_s += interval;
        }
    }

    next.last_sample_time = Some(now);
    next.last_sample = Some(*sample);

    let previous = match prev.last_sample {
        Some(previous) => previous,
        None => return next,
    };

    let distance = haversine_distance(&previous.point, &sample.point);
    next.total_distance_m += distance;

    let elapsed = sample.timestamp - previous.timestamp;
    let speed = if elapsed > 0.0 {
        distance / elapsed
    } else {
        debug!(
            "[Aggregator] Non-positive sample interval ({:.3}s), speed set to 0",
            elapsed
        );
        0.0
    };

    next.current_speed_mps = speed;
    next.max_speed_mps = prev.max_speed_mps.max(speed);
    next.is_currently_moving = units::is_moving(speed, moving_threshold_mps);
    next.average_speed_mps = if duration_s > 0.0 {
        next.total_distance_m / duration_s
    } else {
        0.0
    };

    next
}

/// Restart measurement after a pause.
///
/// Drops the previous sample so the first sample after resuming only seeds
/// the next step, and moves the time anchor to `now` so the paused interval
/// counts as neither active nor stopped time. Metrics are kept as they are.
pub fn restart(prev: &SessionMetrics, now: f64) -> SessionMetrics {
    SessionMetrics {
        last_sample: None,
        last_sample_time: prev.last_sample_time.map(|_| now),
        ..prev.clone()
    }
}
