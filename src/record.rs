//! # Record Conversion
//!
//! Deterministic, one-way mapping from a finished [`Session`] to the
//! [`Record`] shape handed to the record store. Conversion is pure: it never
//! touches a store and can be applied any number of times with the same result.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, SessionError, StateKind};
use crate::session::Session;
use crate::{ActivityCategory, SessionId};

/// When a supplement was taken relative to the workout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupplementTiming {
    BeforeWorkout,
    DuringWorkout,
    AfterWorkout,
}

impl FromStr for SupplementTiming {
    type Err = SessionError;

    /// Accepts `before_workout`, `during_workout`, `after_workout` or the
    /// short forms `before`, `during`, `after`, in any case.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "before" | "before_workout" => Ok(SupplementTiming::BeforeWorkout),
            "during" | "during_workout" => Ok(SupplementTiming::DuringWorkout),
            "after" | "after_workout" => Ok(SupplementTiming::AfterWorkout),
            other => Err(SessionError::config(format!(
                "unknown supplement timing '{}'",
                other
            ))),
        }
    }
}

/// A supplement logged alongside a workout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Supplement {
    pub id: Uuid,
    pub name: String,
    /// Free-form amount, e.g. "30 g"
    pub amount: String,
    pub timing: SupplementTiming,
}

impl Supplement {
    pub fn new(name: impl Into<String>, amount: impl Into<String>, timing: SupplementTiming) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            amount: amount.into(),
            timing,
        }
    }
}

/// Rough effort level of a finished workout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkoutIntensity {
    Low,
    Medium,
    High,
}

/// Persisted summary of a finished workout. Never mutated after creation;
/// edits build a new record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: SessionId,
    /// Session start, Unix seconds
    pub date: f64,
    pub category: ActivityCategory,
    pub comment: Option<String>,
    pub duration_seconds: f64,
    /// Always present for converted sessions, even when zero
    pub distance_meters: Option<f64>,
    pub step_count: Option<u32>,
    pub calorie_count: Option<u32>,
    pub supplements: Option<Vec<Supplement>>,
}

impl Record {
    /// Record date as a UTC timestamp. `None` if the stored value is out of range.
    pub fn date_time(&self) -> Option<DateTime<Utc>> {
        let secs = self.date.floor();
        let nanos = ((self.date - secs) * 1e9) as u32;
        DateTime::from_timestamp(secs as i64, nanos)
    }

    pub fn intensity(&self) -> WorkoutIntensity {
        let minutes = self.duration_seconds / 60.0;

        match self.category {
            ActivityCategory::Running | ActivityCategory::Cycling | ActivityCategory::Swimming => {
                if minutes > 60.0 {
                    WorkoutIntensity::High
                } else if minutes > 30.0 {
                    WorkoutIntensity::Medium
                } else {
                    WorkoutIntensity::Low
                }
            }
            ActivityCategory::Gym | ActivityCategory::CrossFit => {
                if minutes > 90.0 {
                    WorkoutIntensity::High
                } else if minutes > 45.0 {
                    WorkoutIntensity::Medium
                } else {
                    WorkoutIntensity::Low
                }
            }
            ActivityCategory::Walking | ActivityCategory::Yoga | ActivityCategory::Pilates => {
                WorkoutIntensity::Low
            }
            _ => WorkoutIntensity::Medium,
        }
    }

    pub fn has_supplements(&self) -> bool {
        self.supplements.as_ref().is_some_and(|s| !s.is_empty())
    }
}

/// Convert a finished session into its record.
///
/// Fails with [`SessionError::InvalidState`] unless the session is finished.
pub fn to_record(session: &Session) -> Result<Record> {
    let end_time = match session.end_time {
        Some(end) => end,
        None => {
            let actual = if session.is_paused() {
                StateKind::Paused
            } else {
                StateKind::Active
            };
            return Err(SessionError::InvalidState {
                operation: "to_record",
                expected: StateKind::Finished,
                actual,
            });
        }
    };

    Ok(Record {
        id: session.id,
        date: session.start_time,
        category: session.category,
        comment: session.manual.comment.clone(),
        duration_seconds: session.duration_at(end_time),
        distance_meters: Some(session.metrics.total_distance_m),
        step_count: session.manual.step_count,
        calorie_count: session.manual.calorie_count,
        supplements: session.manual.supplements.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finished_session() -> Session {
        let mut session = Session::new(ActivityCategory::Running, 1_700_000_000.0);
        session.accumulated_pause_s = 120.0;
        session.end_time = Some(1_700_002_000.0);
        session.metrics.total_distance_m = 5_000.0;
        session.manual.comment = Some("tempo run".to_string());
        session.manual.step_count = Some(5200);
        session.manual.supplements = Some(vec![Supplement::new(
            "electrolytes",
            "500 ml",
            SupplementTiming::DuringWorkout,
        )]);
        session
    }

    #[test]
    fn test_field_mapping() {
        let session = finished_session();
        let record = to_record(&session).unwrap();

        assert_eq!(record.id, session.id);
        assert_eq!(record.date, 1_700_000_000.0);
        assert_eq!(record.category, ActivityCategory::Running);
        assert_eq!(record.comment.as_deref(), Some("tempo run"));
        assert_eq!(record.duration_seconds, 1_880.0);
        assert_eq!(record.distance_meters, Some(5_000.0));
        assert_eq!(record.step_count, Some(5200));
        assert_eq!(record.calorie_count, None);
        assert!(record.has_supplements());
    }

    #[test]
    fn test_zero_distance_still_present() {
        let mut session = Session::new(ActivityCategory::Yoga, 0.0);
        session.end_time = Some(600.0);
        let record = to_record(&session).unwrap();
        assert_eq!(record.distance_meters, Some(0.0));
        assert!(!record.has_supplements());
    }

    #[test]
    fn test_conversion_is_deterministic() {
        let session = finished_session();
        let first = to_record(&session).unwrap();
        let second = to_record(&session).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_unfinished_session_rejected() {
        let session = Session::new(ActivityCategory::Running, 0.0);
        assert!(matches!(
            to_record(&session),
            Err(SessionError::InvalidState {
                actual: StateKind::Active,
                ..
            })
        ));

        let mut paused = Session::new(ActivityCategory::Running, 0.0);
        paused.current_pause_start = Some(10.0);
        assert!(matches!(
            to_record(&paused),
            Err(SessionError::InvalidState {
                actual: StateKind::Paused,
                ..
            })
        ));
    }

    #[test]
    fn test_intensity() {
        let mut record = to_record(&finished_session()).unwrap();
        assert_eq!(record.intensity(), WorkoutIntensity::Medium);

        record.duration_seconds = 61.0 * 60.0;
        assert_eq!(record.intensity(), WorkoutIntensity::High);

        record.duration_seconds = 20.0 * 60.0;
        assert_eq!(record.intensity(), WorkoutIntensity::Low);

        record.category = ActivityCategory::Gym;
        record.duration_seconds = 50.0 * 60.0;
        assert_eq!(record.intensity(), WorkoutIntensity::Medium);

        record.category = ActivityCategory::Walking;
        record.duration_seconds = 300.0 * 60.0;
        assert_eq!(record.intensity(), WorkoutIntensity::Low);

        record.category = ActivityCategory::Tennis;
        assert_eq!(record.intensity(), WorkoutIntensity::Medium);
    }

    #[test]
    fn test_supplement_timing_parse() {
        assert_eq!(
            "before_workout".parse::<SupplementTiming>().unwrap(),
            SupplementTiming::BeforeWorkout
        );
        assert_eq!(
            " During ".parse::<SupplementTiming>().unwrap(),
            SupplementTiming::DuringWorkout
        );
        assert_eq!(
            "after".parse::<SupplementTiming>().unwrap(),
            SupplementTiming::AfterWorkout
        );
        assert!(matches!(
            "mid_workout".parse::<SupplementTiming>(),
            Err(SessionError::Config { .. })
        ));
    }

    #[test]
    fn test_date_time() {
        let record = to_record(&finished_session()).unwrap();
        let dt = record.date_time().unwrap();
        assert_eq!(dt.timestamp(), 1_700_000_000);
    }
}
