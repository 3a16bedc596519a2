//! Activity categories and their capability flags.
//!
//! The engine computes distance and speed from GPS for every category. The
//! `has_distance` / `has_steps` flags only tell callers which fields are worth
//! showing for a given kind of workout.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SessionError;

/// Kind of workout being tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActivityCategory {
    Running,
    Cycling,
    Swimming,
    Gym,
    Walking,
    Yoga,
    Pilates,
    #[serde(rename = "CrossFit")]
    CrossFit,
    Boxing,
    Tennis,
    Football,
    Basketball,
    Volleyball,
    Skiing,
    Snowboarding,
    Hiking,
    Climbing,
    Dancing,
    #[serde(rename = "Martial Arts")]
    MartialArts,
    Other,
}

/// Broad grouping used for browsing categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryGroup {
    Cardio,
    Strength,
    Water,
    Flexibility,
    Combat,
    Team,
    Winter,
    Outdoor,
    Dance,
    Other,
}

impl ActivityCategory {
    /// Every category, in table order.
    pub const ALL: [ActivityCategory; 20] = [
        ActivityCategory::Running,
        ActivityCategory::Cycling,
        ActivityCategory::Swimming,
        ActivityCategory::Gym,
        ActivityCategory::Walking,
        ActivityCategory::Yoga,
        ActivityCategory::Pilates,
        ActivityCategory::CrossFit,
        ActivityCategory::Boxing,
        ActivityCategory::Tennis,
        ActivityCategory::Football,
        ActivityCategory::Basketball,
        ActivityCategory::Volleyball,
        ActivityCategory::Skiing,
        ActivityCategory::Snowboarding,
        ActivityCategory::Hiking,
        ActivityCategory::Climbing,
        ActivityCategory::Dancing,
        ActivityCategory::MartialArts,
        ActivityCategory::Other,
    ];

    /// The categories people most often start a GPS session for.
    pub const POPULAR_DISTANCE: [ActivityCategory; 5] = [
        ActivityCategory::Running,
        ActivityCategory::Walking,
        ActivityCategory::Cycling,
        ActivityCategory::Swimming,
        ActivityCategory::Hiking,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityCategory::Running => "Running",
            ActivityCategory::Cycling => "Cycling",
            ActivityCategory::Swimming => "Swimming",
            ActivityCategory::Gym => "Gym",
            ActivityCategory::Walking => "Walking",
            ActivityCategory::Yoga => "Yoga",
            ActivityCategory::Pilates => "Pilates",
            ActivityCategory::CrossFit => "CrossFit",
            ActivityCategory::Boxing => "Boxing",
            ActivityCategory::Tennis => "Tennis",
            ActivityCategory::Football => "Football",
            ActivityCategory::Basketball => "Basketball",
            ActivityCategory::Volleyball => "Volleyball",
            ActivityCategory::Skiing => "Skiing",
            ActivityCategory::Snowboarding => "Snowboarding",
            ActivityCategory::Hiking => "Hiking",
            ActivityCategory::Climbing => "Climbing",
            ActivityCategory::Dancing => "Dancing",
            ActivityCategory::MartialArts => "Martial Arts",
            ActivityCategory::Other => "Other",
        }
    }

    /// Whether distance is a meaningful field for this category.
    pub fn has_distance(&self) -> bool {
        matches!(
            self,
            ActivityCategory::Running
                | ActivityCategory::Cycling
                | ActivityCategory::Swimming
                | ActivityCategory::Walking
                | ActivityCategory::Hiking
                | ActivityCategory::Skiing
                | ActivityCategory::Snowboarding
        )
    }

    /// Whether a step count is a meaningful field for this category.
    pub fn has_steps(&self) -> bool {
        matches!(
            self,
            ActivityCategory::Running | ActivityCategory::Walking | ActivityCategory::Hiking
        )
    }

    pub fn group(&self) -> CategoryGroup {
        match self {
            ActivityCategory::Running | ActivityCategory::Walking | ActivityCategory::Cycling => {
                CategoryGroup::Cardio
            }
            ActivityCategory::Swimming => CategoryGroup::Water,
            ActivityCategory::Gym | ActivityCategory::CrossFit => CategoryGroup::Strength,
            ActivityCategory::Yoga | ActivityCategory::Pilates => CategoryGroup::Flexibility,
            ActivityCategory::Boxing | ActivityCategory::MartialArts => CategoryGroup::Combat,
            ActivityCategory::Tennis
            | ActivityCategory::Football
            | ActivityCategory::Basketball
            | ActivityCategory::Volleyball => CategoryGroup::Team,
            ActivityCategory::Skiing | ActivityCategory::Snowboarding => CategoryGroup::Winter,
            ActivityCategory::Hiking | ActivityCategory::Climbing => CategoryGroup::Outdoor,
            ActivityCategory::Dancing => CategoryGroup::Dance,
            ActivityCategory::Other => CategoryGroup::Other,
        }
    }

    /// Categories that track distance.
    pub fn distance_categories() -> Vec<ActivityCategory> {
        Self::ALL.iter().copied().filter(|c| c.has_distance()).collect()
    }
}

impl fmt::Display for ActivityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityCategory {
    type Err = SessionError;

    /// Parses the display name, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| SessionError::config(format!("unknown activity category '{}'", s)))
    }
}

/// One row of the capability table, as handed to presentation code.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryCapabilities {
    pub category: ActivityCategory,
    pub has_distance: bool,
    pub has_steps: bool,
    pub group: CategoryGroup,
}

/// The full capability table.
pub fn capability_table() -> Vec<CategoryCapabilities> {
    ActivityCategory::ALL
        .iter()
        .map(|&category| CategoryCapabilities {
            category,
            has_distance: category.has_distance(),
            has_steps: category.has_steps(),
            group: category.group(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capability_flags() {
        assert!(ActivityCategory::Running.has_distance());
        assert!(ActivityCategory::Running.has_steps());
        assert!(ActivityCategory::Cycling.has_distance());
        assert!(!ActivityCategory::Cycling.has_steps());
        assert!(!ActivityCategory::Yoga.has_distance());
        assert!(!ActivityCategory::Yoga.has_steps());
        assert_eq!(ActivityCategory::distance_categories().len(), 7);
    }

    #[test]
    fn test_steps_imply_distance() {
        for c in ActivityCategory::ALL {
            if c.has_steps() {
                assert!(c.has_distance(), "{c} has steps but no distance");
            }
        }
    }

    #[test]
    fn test_parse_display_names() {
        for c in ActivityCategory::ALL {
            assert_eq!(c.as_str().parse::<ActivityCategory>().unwrap(), c);
        }
        assert_eq!(
            "martial arts".parse::<ActivityCategory>().unwrap(),
            ActivityCategory::MartialArts
        );
        assert!("Quidditch".parse::<ActivityCategory>().is_err());
    }

    #[test]
    fn test_serde_uses_display_names() {
        let json = serde_json::to_string(&ActivityCategory::MartialArts).unwrap();
        assert_eq!(json, "\"Martial Arts\"");
        let back: ActivityCategory = serde_json::from_str("\"CrossFit\"").unwrap();
        assert_eq!(back, ActivityCategory::CrossFit);
    }

    #[test]
    fn test_groups() {
        assert_eq!(ActivityCategory::Swimming.group(), CategoryGroup::Water);
        assert_eq!(ActivityCategory::Hiking.group(), CategoryGroup::Outdoor);
        assert_eq!(capability_table().len(), 20);
    }
}
