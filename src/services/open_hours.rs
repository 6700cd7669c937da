use tracing::debug;

use crate::models::open_hours::{OpenHoursRow, OpenInterval};
use crate::utils::clock::MINUTES_PER_DAY;

/// Merged open intervals for one weekday (0 = Sunday … 6 = Saturday).
///
/// Filters rows to the requested weekday, converts to minutes, splits
/// overnight windows (`close < open`) into `[open, 1440)` plus `[0, close)`,
/// and merges overlapping or touching intervals. Malformed rows are skipped
/// silently; a missing signal narrows confidence, it does not abort planning.
pub fn open_intervals_for_day(rows: &[OpenHoursRow], weekday: u8) -> Vec<OpenInterval> {
    let mut intervals: Vec<OpenInterval> = Vec::new();

    for row in rows {
        if row.day != Some(weekday as i64) {
            continue;
        }
        let open = match row_minutes(row.open_hour, row.open_minute) {
            Some(minutes) if minutes < MINUTES_PER_DAY => minutes,
            _ => {
                debug!(target: "engine::open_hours", ?row, "skipping row with unusable open time");
                continue;
            }
        };
        let close = match row_minutes(row.close_hour, row.close_minute) {
            Some(minutes) => minutes,
            _ => {
                debug!(target: "engine::open_hours", ?row, "skipping row with unusable close time");
                continue;
            }
        };

        if close == open {
            continue;
        }
        if close > open {
            intervals.push(OpenInterval {
                start_min: open,
                end_min: close,
            });
        } else {
            // Overnight window: the portion after midnight belongs to the
            // same weekday's calendar per the upstream data shape.
            intervals.push(OpenInterval {
                start_min: open,
                end_min: MINUTES_PER_DAY,
            });
            if close > 0 {
                intervals.push(OpenInterval {
                    start_min: 0,
                    end_min: close,
                });
            }
        }
    }

    merge_intervals(intervals)
}

/// Minutes since midnight from a row's hour/minute pair. `None` when either
/// field is null or out of range. Hour 24 with minute 0 is a legal close
/// time meaning end of day.
fn row_minutes(hour: Option<i64>, minute: Option<i64>) -> Option<i64> {
    let hour = hour?;
    let minute = minute?;
    if !(0..=24).contains(&hour) || !(0..60).contains(&minute) {
        return None;
    }
    let total = hour * 60 + minute;
    if total > MINUTES_PER_DAY {
        return None;
    }
    Some(total)
}

/// Sort and merge overlapping or adjacent intervals.
fn merge_intervals(mut intervals: Vec<OpenInterval>) -> Vec<OpenInterval> {
    intervals.sort_by_key(|interval| (interval.start_min, interval.end_min));

    let mut merged: Vec<OpenInterval> = Vec::new();
    for interval in intervals {
        if let Some(last) = merged.last_mut() {
            if interval.start_min <= last.end_min {
                last.end_min = last.end_min.max(interval.end_min);
                continue;
            }
        }
        merged.push(interval);
    }
    merged
}

/// True only when a single merged interval fully contains `[start, end)`.
/// Partial coverage is not "open".
pub fn is_open_for_window(intervals: &[OpenInterval], start_min: i64, end_min: i64) -> bool {
    if end_min <= start_min {
        return false;
    }
    intervals
        .iter()
        .any(|interval| interval.contains_window(start_min, end_min))
}

/// The feasible start closest to `desired_start_min` across all intervals
/// long enough for `duration_min`. `None` when nothing fits.
pub fn next_open_start(
    intervals: &[OpenInterval],
    desired_start_min: i64,
    duration_min: i64,
) -> Option<i64> {
    if duration_min <= 0 {
        return None;
    }

    let mut best: Option<i64> = None;
    for interval in intervals {
        if interval.length() < duration_min {
            continue;
        }
        let latest_start = interval.end_min - duration_min;
        let candidate = desired_start_min.clamp(interval.start_min, latest_start);
        match best {
            Some(current)
                if (current - desired_start_min).abs() <= (candidate - desired_start_min).abs() => {}
            _ => best = Some(candidate),
        }
    }
    best
}

/// Earliest start not before `not_before` whose `[start, start + duration)`
/// sits inside one interval and ends by `latest_end`. Used by the scheduler's
/// cursor walk.
pub fn earliest_fit(
    intervals: &[OpenInterval],
    not_before: i64,
    duration_min: i64,
    latest_end: i64,
) -> Option<i64> {
    if duration_min <= 0 {
        return None;
    }
    for interval in intervals {
        let start = not_before.max(interval.start_min);
        if start + duration_min <= interval.end_min && start + duration_min <= latest_end {
            return Some(start);
        }
    }
    None
}
