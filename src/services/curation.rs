use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::models::activity::Coordinate;
use crate::models::open_hours::OpenHoursRow;
use crate::models::operation::Operation;
use crate::models::scheduling::{DayWindow, FixedPlacement, Placement, ScheduleCandidate};
use crate::models::theme::{DayThemeKey, THEME_PRIORITY};
use crate::services::scheduler::{Scheduler, SchedulerConfig};
use crate::services::themes;
use crate::utils::clock::{date_range, format_clock_minutes, parse_duration_minutes};
use crate::utils::geo;

pub const MAX_CURATION_OPERATIONS: usize = 25;

/// A candidate for a themed day plan. Durations arrive as whatever the
/// assistant or persistence layer produced ("45 minutes", "01:30:00", a bare
/// number) and are normalized before placement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CurationCandidate {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub coordinates: Option<Coordinate>,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub duration: Option<JsonValue>,
    /// A candidate locked to a date is never moved off it.
    #[serde(default)]
    pub locked_date: Option<String>,
    #[serde(default)]
    pub open_hours: Option<Vec<OpenHoursRow>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CurationRequest {
    pub candidates: Vec<CurationCandidate>,
    pub start_date: String,
    pub end_date: String,
    #[serde(default)]
    pub requested_theme: Option<DayThemeKey>,
    #[serde(default)]
    pub max_operations: Option<usize>,
    #[serde(default)]
    pub day_window: Option<DayWindow>,
    #[serde(default)]
    pub fixed: Vec<FixedPlacement>,
}

/// One curated day in the derived plan view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DayPlan {
    pub date: String,
    #[serde(default)]
    pub theme: Option<DayThemeKey>,
    pub items: Vec<Placement>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CurationOutcome {
    pub operations: Vec<Operation>,
    pub days: Vec<DayPlan>,
    pub unplaced: Vec<String>,
}

/// Build a themed day plan across a date range.
///
/// Candidates matching the requested (or inferred) theme are prioritized,
/// locked candidates never move off their date, and everything else falls
/// back to the general scheduling logic. The output is identical regardless
/// of the order of the candidate array: every internal sort uses an explicit
/// multi-key comparator ending in the candidate id.
pub fn curate_day_plan(request: &CurationRequest) -> EngineResult<CurationOutcome> {
    let pool = date_range(&request.start_date, &request.end_date).ok_or_else(|| {
        EngineError::validation(format!(
            "invalid curation date range {} to {}",
            request.start_date, request.end_date
        ))
    })?;

    let max_operations = request
        .max_operations
        .unwrap_or(MAX_CURATION_OPERATIONS)
        .clamp(1, MAX_CURATION_OPERATIONS);
    let day_window = request.day_window.unwrap_or_default();
    let theme = request
        .requested_theme
        .or_else(|| infer_theme_from_candidates(&request.candidates));

    // Normalize durations up front; candidates whose duration cannot be
    // understood contribute nothing and are skipped, not failed.
    let mut normalized: Vec<(&CurationCandidate, i64)> = Vec::new();
    for candidate in &request.candidates {
        let minutes = candidate
            .duration
            .as_ref()
            .and_then(parse_duration_minutes);
        match minutes {
            Some(minutes) => normalized.push((candidate, minutes)),
            None => {
                debug!(
                    target: "engine::curation",
                    candidate = %candidate.id,
                    "skipping candidate with unparseable duration"
                );
            }
        }
    }

    let located_centroid = geo::centroid(
        normalized
            .iter()
            .filter_map(|(candidate, _)| candidate.coordinates.as_ref()),
    );

    // Theme priority, then distance to the candidate centroid, then id.
    // Never insertion order: the comparator is the permutation-invariance
    // guarantee.
    normalized.sort_by(|(a, _), (b, _)| {
        theme_rank(a, theme)
            .cmp(&theme_rank(b, theme))
            .then_with(|| {
                compare_distance(
                    centroid_distance(a, located_centroid.as_ref()),
                    centroid_distance(b, located_centroid.as_ref()),
                )
            })
            .then_with(|| a.id.cmp(&b.id))
    });

    // The operation cap bounds how many candidates are even considered;
    // locked candidates keep their budget priority and the overflow is
    // reported as unplaced rather than silently dropped.
    normalized.sort_by_key(|(candidate, _)| candidate.locked_date.is_none());
    let overflow: Vec<String> = normalized
        .iter()
        .skip(max_operations)
        .map(|(candidate, _)| candidate.id.clone())
        .collect();
    normalized.truncate(max_operations);
    normalized.sort_by(|(a, _), (b, _)| {
        theme_rank(a, theme)
            .cmp(&theme_rank(b, theme))
            .then_with(|| {
                compare_distance(
                    centroid_distance(a, located_centroid.as_ref()),
                    centroid_distance(b, located_centroid.as_ref()),
                )
            })
            .then_with(|| a.id.cmp(&b.id))
    });

    let mut unplaced: Vec<String> = overflow;
    let mut schedulable: Vec<ScheduleCandidate> = Vec::new();
    for (candidate, minutes) in &normalized {
        if let Some(locked) = candidate.locked_date.as_deref() {
            if !pool.iter().any(|date| date == locked) {
                debug!(
                    target: "engine::curation",
                    candidate = %candidate.id,
                    date = %locked,
                    "locked date outside the curated range"
                );
                unplaced.push(candidate.id.clone());
                continue;
            }
        }
        schedulable.push(ScheduleCandidate {
            id: candidate.id.clone(),
            name: candidate.name.clone(),
            coordinates: candidate.coordinates,
            types: candidate.types.clone(),
            duration_minutes: *minutes,
            preferred_date: candidate.locked_date.clone(),
            open_hours: candidate.open_hours.clone(),
        });
    }

    // Locked candidates must land on their date or not at all: schedule
    // them against a pool of exactly that date, everything else over the
    // full range.
    let scheduler = Scheduler::new(SchedulerConfig {
        day_window,
        ..SchedulerConfig::default()
    });

    let (locked, free): (Vec<ScheduleCandidate>, Vec<ScheduleCandidate>) = schedulable
        .into_iter()
        .partition(|candidate| candidate.preferred_date.is_some());

    let mut placements: Vec<Placement> = Vec::new();
    let mut fixed = request.fixed.clone();

    for candidate in locked {
        let date = candidate
            .preferred_date
            .clone()
            .expect("locked partition always carries a date");
        let outcome = scheduler.schedule(
            std::slice::from_ref(&candidate),
            &fixed,
            std::slice::from_ref(&date),
        )?;
        if outcome.placements.is_empty() {
            unplaced.push(candidate.id.clone());
            continue;
        }
        for placement in outcome.placements {
            fixed.push(FixedPlacement {
                id: placement.id.clone(),
                date: placement.date.clone(),
                start_min: placement.start_min,
                end_min: placement.end_min,
            });
            placements.push(placement);
        }
    }

    // Theme-matching candidates get first claim on day capacity; the rest
    // are scheduled into whatever room remains.
    let (themed, rest): (Vec<ScheduleCandidate>, Vec<ScheduleCandidate>) =
        free.into_iter().partition(|candidate| {
            match theme {
                None | Some(DayThemeKey::Mixed) => true,
                Some(theme) => themes::themes_from_types(&candidate.types).contains(&theme),
            }
        });

    for pass in [themed, rest] {
        let outcome = scheduler.schedule(&pass, &fixed, &pool)?;
        for placement in &outcome.placements {
            fixed.push(FixedPlacement {
                id: placement.id.clone(),
                date: placement.date.clone(),
                start_min: placement.start_min,
                end_min: placement.end_min,
            });
        }
        placements.extend(outcome.placements);
        unplaced.extend(outcome.unplaced.into_iter().map(|candidate| candidate.id));
    }

    placements.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then(a.start_min.cmp(&b.start_min))
            .then(a.id.cmp(&b.id))
    });
    unplaced.sort();
    unplaced.dedup();

    let operations = placements
        .iter()
        .map(|placement| Operation::UpdateActivity {
            activity_id: placement.id.clone(),
            date: Some(placement.date.clone()),
            start: Some(format_clock_minutes(placement.start_min)),
            end: Some(format_clock_minutes(placement.end_min)),
        })
        .collect();

    let mut by_date: BTreeMap<String, Vec<Placement>> = BTreeMap::new();
    for placement in &placements {
        by_date
            .entry(placement.date.clone())
            .or_default()
            .push(placement.clone());
    }
    let days = pool
        .iter()
        .map(|date| DayPlan {
            date: date.clone(),
            theme,
            items: by_date.remove(date).unwrap_or_default(),
        })
        .collect();

    Ok(CurationOutcome {
        operations,
        days,
        unplaced,
    })
}

/// Majority primary theme across the candidate pool, ties resolved by the
/// fixed priority order.
fn infer_theme_from_candidates(candidates: &[CurationCandidate]) -> Option<DayThemeKey> {
    let mut counts: BTreeMap<usize, usize> = BTreeMap::new();
    for candidate in candidates {
        if let Some(theme) = themes::primary_theme_from_types(&candidate.types) {
            *counts.entry(theme.priority_rank()).or_insert(0) += 1;
        }
    }
    counts
        .into_iter()
        .max_by(|(rank_a, count_a), (rank_b, count_b)| {
            count_a.cmp(count_b).then(rank_b.cmp(rank_a))
        })
        .map(|(rank, _)| THEME_PRIORITY[rank])
}

fn theme_rank(candidate: &CurationCandidate, theme: Option<DayThemeKey>) -> usize {
    match theme {
        // Mixed days and theme-less requests treat every candidate equally.
        None | Some(DayThemeKey::Mixed) => 0,
        Some(theme) => {
            if themes::themes_from_types(&candidate.types).contains(&theme) {
                0
            } else {
                1
            }
        }
    }
}

fn centroid_distance(candidate: &CurationCandidate, centroid: Option<&Coordinate>) -> Option<f64> {
    geo::distance_between(candidate.coordinates.as_ref(), centroid)
}

/// Unknown distances sort last; equal distances fall through to the next key.
fn compare_distance(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
