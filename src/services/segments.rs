use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::activity::ItineraryActivity;
use crate::utils::clock::parse_clock_minutes;

/// A consecutive (from, to) pair inside one day's schedule. Derived, not
/// persisted; feeds the travel-time conflict classifier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AdjacentSegment {
    pub date: String,
    pub from_id: String,
    pub to_id: String,
    pub from_end_min: i64,
    pub to_start_min: i64,
    /// Negative when the pair overlaps; callers decide how to react.
    pub gap_minutes: i64,
}

/// Order one date's scheduled activities and emit every consecutive pair.
///
/// Rows with missing, malformed, or inverted times are dropped, not
/// reported: a row the upstream cannot time cannot form a segment.
pub fn build_adjacent_segments(date: &str, rows: &[ItineraryActivity]) -> Vec<AdjacentSegment> {
    let mut timed: Vec<(&ItineraryActivity, i64, i64)> = Vec::new();
    for row in rows {
        if row.date.as_deref() != Some(date) {
            continue;
        }
        let start = row.start.as_deref().and_then(parse_clock_minutes);
        let end = row.end.as_deref().and_then(parse_clock_minutes);
        match (start, end) {
            (Some(start), Some(end)) if start < end => timed.push((row, start, end)),
            _ => {
                debug!(
                    target: "engine::segments",
                    activity = %row.id,
                    "dropping row without a usable time window"
                );
            }
        }
    }

    timed.sort_by(|(a, a_start, a_end), (b, b_start, b_end)| {
        a_start
            .cmp(b_start)
            .then(a_end.cmp(b_end))
            .then(a.id.cmp(&b.id))
    });

    timed
        .windows(2)
        .map(|pair| {
            let (from, _, from_end) = &pair[0];
            let (to, to_start, _) = &pair[1];
            AdjacentSegment {
                date: date.to_string(),
                from_id: from.id.clone(),
                to_id: to.id.clone(),
                from_end_min: *from_end,
                to_start_min: *to_start,
                gap_minutes: to_start - from_end,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::activity::PlaceDetails;

    fn row(id: &str, date: &str, start: Option<&str>, end: Option<&str>) -> ItineraryActivity {
        ItineraryActivity {
            id: id.to_string(),
            destination_id: "dest-1".to_string(),
            date: Some(date.to_string()),
            start: start.map(|s| s.to_string()),
            end: end.map(|s| s.to_string()),
            activity: PlaceDetails {
                id: format!("place-{id}"),
                name: format!("Place {id}"),
                types: Vec::new(),
                coordinates: None,
            },
        }
    }

    #[test]
    fn emits_pairs_in_start_order() {
        let rows = vec![
            row("2", "2025-05-05", Some("14:00"), Some("15:00")),
            row("1", "2025-05-05", Some("09:00"), Some("10:30")),
            row("3", "2025-05-05", Some("11:00"), Some("12:00")),
        ];
        let segments = build_adjacent_segments("2025-05-05", &rows);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].from_id, "1");
        assert_eq!(segments[0].to_id, "3");
        assert_eq!(segments[0].gap_minutes, 30);
        assert_eq!(segments[1].from_id, "3");
        assert_eq!(segments[1].to_id, "2");
        assert_eq!(segments[1].gap_minutes, 120);
    }

    #[test]
    fn overlapping_rows_produce_a_negative_gap() {
        let rows = vec![
            row("1", "2025-05-05", Some("09:00"), Some("11:00")),
            row("2", "2025-05-05", Some("10:30"), Some("12:00")),
        ];
        let segments = build_adjacent_segments("2025-05-05", &rows);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].gap_minutes, -30);
    }

    #[test]
    fn unusable_rows_and_other_dates_are_dropped() {
        let rows = vec![
            row("1", "2025-05-05", Some("09:00"), Some("10:00")),
            row("2", "2025-05-05", None, Some("12:00")),
            row("3", "2025-05-05", Some("13:00"), Some("12:00")),
            row("4", "2025-05-05", Some("later"), Some("12:00")),
            row("5", "2025-05-06", Some("11:00"), Some("12:00")),
            row("6", "2025-05-05", Some("11:00"), Some("12:00")),
        ];
        let segments = build_adjacent_segments("2025-05-05", &rows);
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].from_id, "1");
        assert_eq!(segments[0].to_id, "6");
    }

    #[test]
    fn fewer_than_two_rows_yield_no_segments() {
        let rows = vec![row("1", "2025-05-05", Some("09:00"), Some("10:00"))];
        assert!(build_adjacent_segments("2025-05-05", &rows).is_empty());
        assert!(build_adjacent_segments("2025-05-05", &[]).is_empty());
    }
}
