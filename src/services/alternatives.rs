use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::activity::Coordinate;
use crate::models::open_hours::OpenHoursRow;
use crate::services::open_hours;
use crate::utils::clock::{parse_clock_minutes, parse_iso_date, weekday_index};
use crate::utils::geo;

pub const MAX_ALTERNATIVES: usize = 3;

/// Proximity is worth up to this many points, decaying linearly to zero at
/// [`PROXIMITY_FULL_DECAY_METERS`].
const PROXIMITY_MAX_POINTS: f64 = 10.0;
const PROXIMITY_FULL_DECAY_METERS: f64 = 10_000.0;
const SHARED_TYPE_POINTS: f64 = 1.5;
const OPEN_DURING_SLOT_POINTS: f64 = 3.0;

/// The activity being replaced. Coordinates come from the place search
/// upstream, which stores `[lng, lat]` pairs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AlternativeTarget {
    pub activity_id: String,
    pub destination_id: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default)]
    pub coordinates: Option<[f64; 2]>,
    #[serde(default)]
    pub types: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AlternativeCandidate {
    pub id: String,
    pub destination_id: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default)]
    pub coordinates: Option<[f64; 2]>,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub open_hours: Option<Vec<OpenHoursRow>>,
}

/// An explainable ranked substitute.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AlternativeSuggestion {
    pub candidate_id: String,
    pub score: f64,
    #[serde(default)]
    pub distance_meters: Option<f64>,
    /// `None` when opening hours are unknown for the target slot.
    #[serde(default)]
    pub is_open_during_slot: Option<bool>,
    pub reasons: Vec<String>,
}

/// Rank up to three substitutes for one activity.
///
/// Eligibility is a hard filter: same destination, and either fully
/// unscheduled or scheduled in exactly the target's slot. A candidate whose
/// opening hours say it is closed during the target's window is dropped
/// outright, never down-scored.
pub fn rank_alternatives(
    target: &AlternativeTarget,
    pool: &[AlternativeCandidate],
    max_results: Option<usize>,
) -> Vec<AlternativeSuggestion> {
    let limit = max_results
        .unwrap_or(MAX_ALTERNATIVES)
        .clamp(1, MAX_ALTERNATIVES);
    let slot = target_slot(target);
    let target_coordinate = target.coordinates.map(Coordinate::from_lng_lat);

    let mut suggestions: Vec<AlternativeSuggestion> = Vec::new();
    for candidate in pool {
        if candidate.id == target.activity_id {
            continue;
        }
        if candidate.destination_id != target.destination_id {
            continue;
        }
        if !slot_eligible(candidate, target) {
            continue;
        }

        let mut score = 0.0;
        let mut reasons: Vec<String> = Vec::new();

        let distance = geo::distance_between(
            candidate
                .coordinates
                .map(Coordinate::from_lng_lat)
                .as_ref(),
            target_coordinate.as_ref(),
        );
        if let Some(meters) = distance {
            let proximity = (PROXIMITY_MAX_POINTS
                * (1.0 - meters / PROXIMITY_FULL_DECAY_METERS))
                .max(0.0);
            score += proximity;
            reasons.push(format!("{:.0} m from the original spot", meters));
        }

        let shared = shared_type_count(&candidate.types, &target.types);
        if shared > 0 {
            score += shared as f64 * SHARED_TYPE_POINTS;
            reasons.push(format!("shares {shared} place type(s)"));
        }

        let is_open = match (&slot, candidate.open_hours.as_deref()) {
            (Some((weekday, start, end)), Some(rows)) => {
                let intervals = open_hours::open_intervals_for_day(rows, *weekday);
                Some(open_hours::is_open_for_window(&intervals, *start, *end))
            }
            _ => None,
        };
        match is_open {
            Some(true) => {
                score += OPEN_DURING_SLOT_POINTS;
                reasons.push("open during the target time window".to_string());
            }
            Some(false) => {
                debug!(
                    target: "engine::alternatives",
                    candidate = %candidate.id,
                    "dropping candidate closed during the target slot"
                );
                continue;
            }
            None => {}
        }

        suggestions.push(AlternativeSuggestion {
            candidate_id: candidate.id.clone(),
            score,
            distance_meters: distance,
            is_open_during_slot: is_open,
            reasons,
        });
    }

    suggestions.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| compare_distance(a.distance_meters, b.distance_meters))
            .then_with(|| a.candidate_id.cmp(&b.candidate_id))
    });
    suggestions.truncate(limit);
    suggestions
}

/// The target's concrete slot as (weekday, start, end) minutes, when fully
/// specified and parseable.
fn target_slot(target: &AlternativeTarget) -> Option<(u8, i64, i64)> {
    let date = parse_iso_date(target.date.as_deref()?)?;
    let start = parse_clock_minutes(target.start.as_deref()?)?;
    let end = parse_clock_minutes(target.end.as_deref()?)?;
    if end <= start {
        return None;
    }
    Some((weekday_index(date), start, end))
}

/// Unscheduled, or scheduled in exactly the target's slot (a same-slot
/// swap). Anything else is excluded outright.
fn slot_eligible(candidate: &AlternativeCandidate, target: &AlternativeTarget) -> bool {
    let unscheduled =
        candidate.date.is_none() && candidate.start.is_none() && candidate.end.is_none();
    if unscheduled {
        return true;
    }
    candidate.date == target.date && candidate.start == target.start && candidate.end == target.end
}

fn shared_type_count(a: &[String], b: &[String]) -> usize {
    let left: BTreeSet<&str> = a.iter().map(|t| t.as_str()).collect();
    let right: BTreeSet<&str> = b.iter().map(|t| t.as_str()).collect();
    left.intersection(&right).count()
}

fn compare_distance(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
