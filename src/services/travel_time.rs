use serde::{Deserialize, Serialize};

use crate::models::preferences::TravelMode;
use crate::utils::clock::MINUTES_PER_DAY;

pub const DEFAULT_TIGHT_THRESHOLD_MIN: i64 = 5;
pub const DEFAULT_MAX_SHIFT_MIN: i64 = 90;

/// Straight-line speeds per travel mode, meters per minute. Used to derive
/// a `travel_minutes` estimate when no routing service is available.
const WALK_METERS_PER_MIN: f64 = 75.0; // 4.5 km/h
const TRANSIT_METERS_PER_MIN: f64 = 300.0; // 18 km/h
const DRIVE_METERS_PER_MIN: f64 = 500.0; // 30 km/h

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TravelTimeStatus {
    Ok,
    Tight,
    Conflict,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TravelTimeConflictInput {
    pub gap_minutes: i64,
    pub travel_minutes: i64,
    pub buffer_minutes: i64,
    #[serde(default)]
    pub tight_threshold_minutes: Option<i64>,
}

/// A pure function of a gap, a travel estimate, and a buffer. Carries no
/// identity and is recomputed on demand.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TravelTimeConflict {
    pub status: TravelTimeStatus,
    pub required_gap_minutes: i64,
    /// `gap - required`; negative while in conflict.
    pub slack_minutes: i64,
    /// Positive complement of the slack while in conflict, else zero.
    pub short_by_minutes: i64,
}

pub fn classify_travel_time_conflict(input: &TravelTimeConflictInput) -> TravelTimeConflict {
    let threshold = input
        .tight_threshold_minutes
        .unwrap_or(DEFAULT_TIGHT_THRESHOLD_MIN);
    let required = input.travel_minutes + input.buffer_minutes;
    let slack = input.gap_minutes - required;

    let (status, short_by) = if slack < 0 {
        (TravelTimeStatus::Conflict, -slack)
    } else if slack <= threshold {
        (TravelTimeStatus::Tight, 0)
    } else {
        (TravelTimeStatus::Ok, 0)
    };

    TravelTimeConflict {
        status,
        required_gap_minutes: required,
        slack_minutes: slack,
        short_by_minutes: short_by,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TravelTimeShiftInput {
    pub from_end_min: i64,
    pub to_start_min: i64,
    pub to_end_min: i64,
    pub required_gap_min: i64,
    /// Start of the activity after the shifted one, when there is one.
    #[serde(default)]
    pub next_start_min: Option<i64>,
    #[serde(default)]
    pub day_end_min: Option<i64>,
    #[serde(default)]
    pub max_shift_min: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TravelTimeShift {
    pub shift_min: i64,
    pub new_start_min: i64,
    pub new_end_min: i64,
}

/// The minimal forward shift of the next activity that makes the gap meet
/// `required_gap_min`. Pure arithmetic, no search: a single shift amount is
/// computed and either accepted or rejected.
///
/// Returns `None` when no shift is needed, when the needed shift exceeds
/// the cap, when the shifted activity would break the required gap to the
/// activity after it, or when it would run past the day end or midnight.
pub fn suggest_travel_time_shift(input: &TravelTimeShiftInput) -> Option<TravelTimeShift> {
    let max_shift = input.max_shift_min.unwrap_or(DEFAULT_MAX_SHIFT_MIN);
    let gap = input.to_start_min - input.from_end_min;
    let shift = input.required_gap_min - gap;

    if shift <= 0 {
        return None;
    }
    if shift > max_shift {
        return None;
    }

    let new_start = input.to_start_min + shift;
    let new_end = input.to_end_min + shift;

    if let Some(next_start) = input.next_start_min {
        if new_end + input.required_gap_min > next_start {
            return None;
        }
    }
    if let Some(day_end) = input.day_end_min {
        if new_end > day_end {
            return None;
        }
    }
    if new_end > MINUTES_PER_DAY {
        return None;
    }

    Some(TravelTimeShift {
        shift_min: shift,
        new_start_min: new_start,
        new_end_min: new_end,
    })
}

/// Whole-minute travel estimate from a straight-line distance, rounded up.
pub fn estimate_travel_minutes(distance_meters: f64, mode: TravelMode) -> i64 {
    if !distance_meters.is_finite() || distance_meters <= 0.0 {
        return 0;
    }
    let speed = match mode {
        TravelMode::Walk => WALK_METERS_PER_MIN,
        TravelMode::Transit => TRANSIT_METERS_PER_MIN,
        TravelMode::Drive => DRIVE_METERS_PER_MIN,
    };
    (distance_meters / speed).ceil() as i64
}
