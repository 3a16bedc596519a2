//! Tracker configuration.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SessionError};

/// Configuration for sample gating, motion classification and ticking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Speed above which an interval counts as moving.
    /// Default: 1.0 m/s (3.6 km/h, a slow walk)
    pub moving_threshold_mps: f64,

    /// Samples with a worse horizontal accuracy are dropped before aggregation.
    /// Default: 20.0 meters
    pub max_horizontal_accuracy_m: f64,

    /// How often the session actor publishes a display snapshot.
    /// Default: 1000 ms
    pub tick_interval_ms: u64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            moving_threshold_mps: 1.0,
            max_horizontal_accuracy_m: 20.0,
            tick_interval_ms: 1000,
        }
    }
}

impl TrackerConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.moving_threshold_mps.is_finite() || self.moving_threshold_mps < 0.0 {
            return Err(SessionError::config(format!(
                "moving threshold must be a non-negative speed, got {}",
                self.moving_threshold_mps
            )));
        }
        if self.max_horizontal_accuracy_m.is_nan() || self.max_horizontal_accuracy_m <= 0.0 {
            return Err(SessionError::config(format!(
                "accuracy limit must be positive, got {}",
                self.max_horizontal_accuracy_m
            )));
        }
        if self.tick_interval_ms == 0 {
            return Err(SessionError::config("tick interval must be non-zero"));
        }
        Ok(())
    }

    /// Parse and validate a JSON config. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: TrackerConfig = serde_json::from_str(json)
            .map_err(|e| SessionError::config(format!("invalid config JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }
}
