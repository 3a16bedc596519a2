//! Speed and pace conversions.
//!
//! Stateless helpers with one policy each. An undefined pace (standing still)
//! is reported as `0.0`, never as an error or infinity.

/// Meters per second to kilometers per hour.
pub fn speed_kmh(speed_mps: f64) -> f64 {
    speed_mps * 3.6
}

/// Pace in minutes per kilometer from a speed in km/h.
pub fn pace_min_per_km(speed_kmh: f64) -> f64 {
    if speed_kmh > 0.0 {
        60.0 / speed_kmh
    } else {
        0.0
    }
}

/// Pace in minutes per kilometer straight from m/s.
pub fn pace_from_mps(speed_mps: f64) -> f64 {
    pace_min_per_km(speed_kmh(speed_mps))
}

/// Whether a speed counts as moving. Strictly above the threshold.
pub fn is_moving(speed_mps: f64, threshold_mps: f64) -> bool {
    speed_mps > threshold_mps
}
