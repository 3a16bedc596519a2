//! Summary statistics over stored records.

use std::collections::{BTreeSet, HashMap};

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::{ActivityCategory, Record};

/// Totals and highlights across a set of workout records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkoutStatistics {
    pub total_workouts: usize,
    pub total_duration_s: f64,
    /// Sum of recorded distances; records without one count as zero
    pub total_distance_m: f64,
    pub total_calories: u64,
    /// Category with the most records, ties going to the earlier category
    pub favourite_category: Option<ActivityCategory>,
    pub average_duration_s: f64,
    pub longest_duration_s: f64,
    /// Consecutive UTC days with a workout, ending at `today`
    pub current_streak_days: u32,
}

impl WorkoutStatistics {
    pub fn from_records(records: &[Record], today: NaiveDate) -> Self {
        let total_workouts = records.len();
        let total_duration_s: f64 = records.iter().map(|r| r.duration_seconds).sum();
        let total_distance_m = records.iter().filter_map(|r| r.distance_meters).sum();
        let total_calories = records
            .iter()
            .filter_map(|r| r.calorie_count)
            .map(u64::from)
            .sum();
        let longest_duration_s = records
            .iter()
            .map(|r| r.duration_seconds)
            .fold(0.0, f64::max);
        let average_duration_s = if total_workouts > 0 {
            total_duration_s / total_workouts as f64
        } else {
            0.0
        };

        Self {
            total_workouts,
            total_duration_s,
            total_distance_m,
            total_calories,
            favourite_category: favourite_category(records),
            average_duration_s,
            longest_duration_s,
            current_streak_days: current_streak(records, today),
        }
    }
}

fn favourite_category(records: &[Record]) -> Option<ActivityCategory> {
    let mut counts: HashMap<ActivityCategory, usize> = HashMap::new();
    for record in records {
        *counts.entry(record.category).or_default() += 1;
    }

    // Walk in table order so the first maximum wins
    let mut best: Option<(ActivityCategory, usize)> = None;
    for category in ActivityCategory::ALL {
        let count = counts.get(&category).copied().unwrap_or(0);
        if count > 0 && best.map_or(true, |(_, n)| count > n) {
            best = Some((category, count));
        }
    }
    best.map(|(category, _)| category)
}

fn current_streak(records: &[Record], today: NaiveDate) -> u32 {
    let days: BTreeSet<NaiveDate> = records
        .iter()
        .filter_map(|r| r.date_time())
        .map(|dt| dt.date_naive())
        .collect();

    let mut streak = 0;
    let mut day = today;
    while days.contains(&day) {
        streak += 1;
        day -= Duration::days(1);
    }
    streak
}
