//! Geographic utilities.

use geo::{Distance, Haversine, Point};

use crate::GpsPoint;

/// Great-circle distance between two GPS points in meters.
///
/// # Example
/// ```
/// use workout_tracker::GpsPoint;
/// use workout_tracker::geo_utils::haversine_distance;
///
/// let london = GpsPoint::new(51.5074, -0.1278);
/// let paris = GpsPoint::new(48.8566, 2.3522);
/// let km = haversine_distance(&london, &paris) / 1000.0;
/// assert!(km > 340.0 && km < 345.0);
/// ```
pub fn haversine_distance(p1: &GpsPoint, p2: &GpsPoint) -> f64 {
    // geo expects (x, y) = (lng, lat)
    let point1 = Point::new(p1.longitude, p1.latitude);
    let point2 = Point::new(p2.longitude, p2.latitude);
    Haversine::distance(point1, point2)
}

/// Total length of a track in meters.
pub fn polyline_length(points: &[GpsPoint]) -> f64 {
    points
        .windows(2)
        .map(|w| haversine_distance(&w[0], &w[1]))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_point_is_zero() {
        let p = GpsPoint::new(50.4501, 30.5234);
        assert_eq!(haversine_distance(&p, &p), 0.0);
    }

    #[test]
    fn test_one_millidegree_north() {
        // ~111 m per millidegree of latitude
        let a = GpsPoint::new(51.5074, -0.1278);
        let b = GpsPoint::new(51.5084, -0.1278);
        let d = haversine_distance(&a, &b);
        assert!(d > 110.0 && d < 112.0, "got {d}");
    }

    #[test]
    fn test_polyline_length() {
        let track: Vec<GpsPoint> = (0..5)
            .map(|i| GpsPoint::new(51.5074 + i as f64 * 0.001, -0.1278))
            .collect();
        let total = polyline_length(&track);
        assert!(total > 440.0 && total < 450.0, "got {total}");
        assert_eq!(polyline_length(&track[..1]), 0.0);
    }
}
