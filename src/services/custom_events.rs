use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::activity::{CustomEvent, ItineraryActivity};
use crate::utils::clock::{format_clock_minutes, parse_clock_minutes};

pub const DEFAULT_MAX_WARNINGS: usize = 8;
const MAX_WARNINGS_CEILING: usize = 25;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OverlapWarningConfig {
    #[serde(default = "default_max_warnings")]
    pub max_warnings: usize,
}

fn default_max_warnings() -> usize {
    DEFAULT_MAX_WARNINGS
}

impl Default for OverlapWarningConfig {
    fn default() -> Self {
        Self {
            max_warnings: DEFAULT_MAX_WARNINGS,
        }
    }
}

/// Warn about planned activities overlapping fixed trip blocks (flights,
/// hotel check-in/out).
///
/// Blocks are indexed per date and visited in (start, end, title) order so
/// the output is deterministic. Overlap is half-open: `[a, b)` against
/// `[c, d)` collides when `a < d && b > c`. Output is capped; once the cap
/// is hit, remaining items with overlaps are counted into a single trailing
/// summary line.
pub fn build_custom_event_overlap_warnings(
    items: &[ItineraryActivity],
    blocks: &[CustomEvent],
    config: &OverlapWarningConfig,
) -> Vec<String> {
    let cap = config.max_warnings.clamp(1, MAX_WARNINGS_CEILING);

    let mut by_date: BTreeMap<&str, Vec<(&CustomEvent, i64, i64)>> = BTreeMap::new();
    for block in blocks {
        let start = parse_clock_minutes(&block.start);
        let end = parse_clock_minutes(&block.end);
        match (start, end) {
            (Some(start), Some(end)) if start < end => {
                by_date
                    .entry(block.date.as_str())
                    .or_default()
                    .push((block, start, end));
            }
            _ => {
                debug!(
                    target: "engine::custom_events",
                    block = %block.id,
                    "skipping block without a usable time window"
                );
            }
        }
    }
    for day in by_date.values_mut() {
        day.sort_by(|(a, a_start, a_end), (b, b_start, b_end)| {
            a_start
                .cmp(b_start)
                .then(a_end.cmp(b_end))
                .then(a.title.cmp(&b.title))
        });
    }

    // Items visited in (date, start, id) order for determinism.
    let mut timed_items: Vec<(&ItineraryActivity, &str, i64, i64)> = Vec::new();
    for item in items {
        let date = match item.date.as_deref() {
            Some(date) if by_date.contains_key(date) => date,
            _ => continue,
        };
        let start = item.start.as_deref().and_then(parse_clock_minutes);
        let end = item.end.as_deref().and_then(parse_clock_minutes);
        if let (Some(start), Some(end)) = (start, end) {
            if start < end {
                timed_items.push((item, date, start, end));
            }
        }
    }
    timed_items.sort_by(|(a, a_date, a_start, _), (b, b_date, b_start, _)| {
        a_date
            .cmp(b_date)
            .then(a_start.cmp(b_start))
            .then(a.id.cmp(&b.id))
    });

    let mut warnings: Vec<String> = Vec::new();
    let mut suppressed_items = 0usize;

    for (item, date, item_start, item_end) in timed_items {
        let day_blocks = &by_date[date];
        let mut emitted_for_item = 0usize;
        let mut overlaps_for_item = 0usize;

        for (block, block_start, block_end) in day_blocks {
            if item_start < *block_end && item_end > *block_start {
                overlaps_for_item += 1;
                if warnings.len() < cap {
                    warnings.push(format!(
                        "{} ({}-{}) overlaps {} \"{}\" ({}-{}) on {}.",
                        item.activity.name,
                        format_clock_minutes(item_start),
                        format_clock_minutes(item_end),
                        block.kind,
                        block.title,
                        format_clock_minutes(*block_start),
                        format_clock_minutes(*block_end),
                        date,
                    ));
                    emitted_for_item += 1;
                }
            }
        }

        if overlaps_for_item > 0 && emitted_for_item == 0 {
            suppressed_items += 1;
        }
    }

    if suppressed_items > 0 {
        warnings.push(format!(
            "...omitted for {suppressed_items} other item(s)."
        ));
    }
    warnings
}
