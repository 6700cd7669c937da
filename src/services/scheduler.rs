use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::models::open_hours::OpenInterval;
use crate::models::scheduling::{DayWindow, FixedPlacement, Placement, ScheduleCandidate};
use crate::services::open_hours;
use crate::utils::clock::{parse_iso_date, weekday_index, MINUTES_PER_DAY};
use crate::utils::geo;

/// Scheduler knobs. Plain serde data; callers construct or deserialize it,
/// the engine reads no configuration from the environment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerConfig {
    #[serde(default)]
    pub day_window: DayWindow,
    /// Candidates within this straight-line distance of a cluster are
    /// grouped and scheduled on the same date when possible.
    #[serde(default = "default_cluster_radius")]
    pub cluster_radius_meters: f64,
}

fn default_cluster_radius() -> f64 {
    3_000.0
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            day_window: DayWindow::default(),
            cluster_radius_meters: default_cluster_radius(),
        }
    }
}

/// What the scheduler produced: bound placements, plus every candidate it
/// could not fit anywhere. Infeasibility is surfaced, never silently
/// dropped.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleOutcome {
    pub placements: Vec<Placement>,
    pub unplaced: Vec<ScheduleCandidate>,
}

pub struct Scheduler {
    config: SchedulerConfig,
}

impl Scheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        Self { config }
    }

    /// Assign candidates to dates and start/end times across the date pool.
    ///
    /// Clusters candidates geographically, walks the pool in order per
    /// cluster, and places members sequentially after existing occupancy,
    /// spilling to later dates when a day fills up. Output is a pure
    /// function of the inputs: for every date, placements are sorted,
    /// non-overlapping, and inside the configured day window.
    pub fn schedule(
        &self,
        candidates: &[ScheduleCandidate],
        fixed: &[FixedPlacement],
        date_pool: &[String],
    ) -> EngineResult<ScheduleOutcome> {
        if !self.config.day_window.is_valid() {
            return Err(EngineError::validation(format!(
                "invalid day window [{}, {})",
                self.config.day_window.day_start_min, self.config.day_window.day_end_min
            )));
        }

        let day_start = self.config.day_window.day_start_min;
        let day_end = self.config.day_window.day_end_min;

        // Cursor per date: the first free minute after fixed occupancy.
        let mut cursors: BTreeMap<&str, i64> = BTreeMap::new();
        for date in date_pool {
            let mut cursor = day_start;
            for block in fixed.iter().filter(|block| &block.date == date) {
                cursor = cursor.max(block.end_min.min(day_end));
            }
            cursors.insert(date.as_str(), cursor);
        }

        let clusters = cluster_candidates(candidates, self.config.cluster_radius_meters);
        debug!(
            target: "engine::scheduler",
            candidates = candidates.len(),
            clusters = clusters.len(),
            dates = date_pool.len(),
            "scheduling pool"
        );

        let mut placements: Vec<Placement> = Vec::new();
        let mut unplaced: Vec<ScheduleCandidate> = Vec::new();

        for cluster in clusters {
            // The cluster's date index never retreats: it tracks the date of
            // the most recent successful placement so the cluster stays
            // together and spills forward as days fill up.
            let mut date_idx = 0usize;

            for member in cluster {
                let mut placed_at: Option<usize> = None;

                // A preferred date is a soft constraint: try it first, then
                // fall back to the regular pool walk.
                if let Some(preferred) = member.preferred_date.as_deref() {
                    if let Some(pos) = date_pool.iter().position(|date| date == preferred) {
                        if let Some(placement) = try_place(
                            member,
                            &date_pool[pos],
                            cursors.get_mut(date_pool[pos].as_str()),
                            day_end,
                        ) {
                            placements.push(placement);
                            placed_at = Some(date_idx);
                        }
                    }
                }

                if placed_at.is_none() {
                    for idx in date_idx..date_pool.len() {
                        let date = &date_pool[idx];
                        if let Some(placement) =
                            try_place(member, date, cursors.get_mut(date.as_str()), day_end)
                        {
                            placements.push(placement);
                            placed_at = Some(idx);
                            break;
                        }
                    }
                }

                match placed_at {
                    Some(idx) => date_idx = idx,
                    None => {
                        debug!(
                            target: "engine::scheduler",
                            candidate = %member.id,
                            "no pool date can host candidate"
                        );
                        unplaced.push(member.clone());
                    }
                }
            }
        }

        placements.sort_by(|a, b| {
            a.date
                .cmp(&b.date)
                .then(a.start_min.cmp(&b.start_min))
                .then(a.id.cmp(&b.id))
        });
        unplaced.sort_by(|a, b| a.id.cmp(&b.id));

        Ok(ScheduleOutcome {
            placements,
            unplaced,
        })
    }
}

/// Attempt to place one candidate on one date, advancing that date's cursor
/// on success.
fn try_place(
    candidate: &ScheduleCandidate,
    date: &str,
    cursor: Option<&mut i64>,
    day_end: i64,
) -> Option<Placement> {
    let cursor = cursor?;
    if candidate.duration_minutes <= 0 {
        return None;
    }

    let intervals = activity_intervals(candidate, date)?;
    let start = open_hours::earliest_fit(&intervals, *cursor, candidate.duration_minutes, day_end)?;
    let end = start + candidate.duration_minutes;
    *cursor = end;

    Some(Placement {
        id: candidate.id.clone(),
        date: date.to_string(),
        start_min: start,
        end_min: end,
    })
}

/// The candidate's open intervals for a date, or the whole day when no
/// opening hours are known. `None` when the date itself is malformed.
fn activity_intervals(candidate: &ScheduleCandidate, date: &str) -> Option<Vec<OpenInterval>> {
    let parsed = parse_iso_date(date)?;
    match candidate.open_hours.as_deref() {
        Some(rows) => Some(open_hours::open_intervals_for_day(
            rows,
            weekday_index(parsed),
        )),
        None => Some(vec![OpenInterval {
            start_min: 0,
            end_min: MINUTES_PER_DAY,
        }]),
    }
}

/// Greedy nearest-neighbor grouping: no spatial index, fine at the
/// candidate-pool scale the callers enforce (tens of items).
///
/// Candidates are visited in id order, each unassigned one seeds a cluster,
/// and the cluster grows while any remaining candidate sits within the
/// radius of one of its members. Candidates without usable coordinates form
/// a trailing cluster of their own. Returned clusters are ordered largest
/// first, ties broken by smallest member id, members in id order.
fn cluster_candidates(
    candidates: &[ScheduleCandidate],
    radius_meters: f64,
) -> Vec<Vec<&ScheduleCandidate>> {
    let mut by_id: Vec<&ScheduleCandidate> = candidates.iter().collect();
    by_id.sort_by(|a, b| a.id.cmp(&b.id));

    let (located, unlocated): (Vec<&ScheduleCandidate>, Vec<&ScheduleCandidate>) = by_id
        .into_iter()
        .partition(|candidate| matches!(&candidate.coordinates, Some(c) if c.is_valid()));

    let mut clusters: Vec<Vec<&ScheduleCandidate>> = Vec::new();
    let mut assigned = vec![false; located.len()];

    for seed_idx in 0..located.len() {
        if assigned[seed_idx] {
            continue;
        }
        assigned[seed_idx] = true;
        let mut cluster = vec![located[seed_idx]];

        let mut grew = true;
        while grew {
            grew = false;
            for idx in 0..located.len() {
                if assigned[idx] {
                    continue;
                }
                let near = cluster.iter().any(|member| {
                    geo::distance_between(
                        member.coordinates.as_ref(),
                        located[idx].coordinates.as_ref(),
                    )
                    .map(|meters| meters <= radius_meters)
                    .unwrap_or(false)
                });
                if near {
                    assigned[idx] = true;
                    cluster.push(located[idx]);
                    grew = true;
                }
            }
        }
        cluster.sort_by(|a, b| a.id.cmp(&b.id));
        clusters.push(cluster);
    }

    if !unlocated.is_empty() {
        clusters.push(unlocated);
    }

    clusters.sort_by(|a, b| {
        b.len()
            .cmp(&a.len())
            .then_with(|| a[0].id.cmp(&b[0].id))
    });
    clusters
}
