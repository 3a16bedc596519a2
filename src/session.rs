//! In-progress session data.
//!
//! A [`Session`] is owned by exactly one [`SessionEngine`](crate::SessionEngine)
//! and only handed out by shared reference, so every mutation goes through the
//! engine's transition rules.

use serde::{Deserialize, Serialize};

use crate::geo_utils::polyline_length;
use crate::metrics::SessionMetrics;
use crate::record::Supplement;
use crate::{ActivityCategory, GpsPoint, LocationSample, SessionId};

/// Values the user types in rather than the engine derives from GPS.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManualEntries {
    pub comment: Option<String>,
    pub step_count: Option<u32>,
    pub calorie_count: Option<u32>,
    pub supplements: Option<Vec<Supplement>>,
}

/// One workout, from `start` until it is converted into a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub category: ActivityCategory,
    /// Unix seconds
    pub start_time: f64,
    /// Set only once the session is finished
    pub end_time: Option<f64>,
    /// Total length of completed pauses in seconds
    pub accumulated_pause_s: f64,
    /// Start of the ongoing pause, if paused
    pub current_pause_start: Option<f64>,
    /// Accepted samples in arrival order, including those received while paused
    pub samples: Vec<LocationSample>,
    pub metrics: SessionMetrics,
    pub manual: ManualEntries,
}

impl Session {
    pub(crate) fn new(category: ActivityCategory, start_time: f64) -> Self {
        Self {
            id: SessionId::new(),
            category,
            start_time,
            end_time: None,
            accumulated_pause_s: 0.0,
            current_pause_start: None,
            samples: Vec::new(),
            metrics: SessionMetrics::default(),
            manual: ManualEntries::default(),
        }
    }

    /// Elapsed session time at `now`, excluding pauses, in seconds.
    ///
    /// Frozen while paused and after finishing. Clamped at zero so a skewed
    /// clock can never produce a negative duration.
    pub fn duration_at(&self, now: f64) -> f64 {
        let end = self.end_time.unwrap_or(now);
        let ongoing_pause = self
            .current_pause_start
            .map(|start| (now - start).max(0.0))
            .unwrap_or(0.0);
        (end - self.start_time - self.accumulated_pause_s - ongoing_pause).max(0.0)
    }

    /// Close the ongoing pause (if any) at `now`.
    pub(crate) fn close_pause(&mut self, now: f64) -> f64 {
        match self.current_pause_start.take() {
            Some(start) => {
                let paused = (now - start).max(0.0);
                self.accumulated_pause_s += paused;
                paused
            }
            None => 0.0,
        }
    }

    pub fn is_paused(&self) -> bool {
        self.current_pause_start.is_some()
    }

    pub fn is_finished(&self) -> bool {
        self.end_time.is_some()
    }

    /// The recorded track, for map display.
    pub fn route(&self) -> Vec<GpsPoint> {
        self.samples.iter().map(|s| s.point).collect()
    }

    /// Length of the recorded track in meters, paused stretches included.
    pub fn route_length_m(&self) -> f64 {
        polyline_length(&self.route())
    }
}
