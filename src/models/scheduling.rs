use serde::{Deserialize, Serialize};

use crate::models::activity::Coordinate;
use crate::models::open_hours::OpenHoursRow;

/// An activity not yet bound to a slot. Consumed once by the scheduler or
/// the curation engine and replaced by a [`Placement`], never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleCandidate {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub coordinates: Option<Coordinate>,
    #[serde(default)]
    pub types: Vec<String>,
    pub duration_minutes: i64,
    #[serde(default)]
    pub preferred_date: Option<String>,
    #[serde(default)]
    pub open_hours: Option<Vec<OpenHoursRow>>,
}

/// An already-scheduled item the scheduler treats as immovable occupancy
/// for its date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FixedPlacement {
    pub id: String,
    pub date: String,
    pub start_min: i64,
    pub end_min: i64,
}

/// The scheduler's output: one activity bound to a date and time window.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    pub id: String,
    pub date: String,
    pub start_min: i64,
    pub end_min: i64,
}

/// The uniform per-day scheduling window, in minutes since midnight.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DayWindow {
    pub day_start_min: i64,
    pub day_end_min: i64,
}

impl Default for DayWindow {
    fn default() -> Self {
        // 09:00 to 21:00, the product default for a sightseeing day.
        Self {
            day_start_min: 540,
            day_end_min: 1260,
        }
    }
}

impl DayWindow {
    pub fn is_valid(&self) -> bool {
        0 <= self.day_start_min && self.day_start_min < self.day_end_min && self.day_end_min <= 1440
    }
}
