use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::activity::ItineraryActivity;
use crate::models::preferences::{
    ExplicitPreferences, InferredPreferences, Pace, PreferencesProfile, TravelMode,
};
use crate::models::theme::{DayThemeKey, THEME_PRIORITY};
use crate::services::themes;
use crate::utils::clock::{parse_clock_minutes, MINUTES_PER_DAY};

/// Extra room added around the observed start-time envelope when deriving
/// the day window.
const DAY_WINDOW_BUFFER_MIN: i64 = 60;

/// Default span assumed after the latest observed start when rows carry no
/// end time.
const FALLBACK_ACTIVITY_SPAN_MIN: i64 = 120;

/// Derive a pace/day-window/interest profile from historical scheduled
/// activities. Rows without a date and parseable start contribute nothing.
pub fn infer_preferences_from_history(rows: &[ItineraryActivity]) -> InferredPreferences {
    let mut starts: Vec<i64> = Vec::new();
    let mut ends: Vec<i64> = Vec::new();
    let mut per_day: BTreeMap<&str, usize> = BTreeMap::new();
    let mut theme_counts: BTreeMap<usize, usize> = BTreeMap::new();

    for row in rows {
        let date = match row.date.as_deref() {
            Some(date) => date,
            None => continue,
        };
        let start = match row.start.as_deref().and_then(parse_clock_minutes) {
            Some(start) => start,
            None => continue,
        };
        starts.push(start);
        if let Some(end) = row.end.as_deref().and_then(parse_clock_minutes) {
            if end > start {
                ends.push(end);
            }
        }
        *per_day.entry(date).or_insert(0) += 1;

        for theme in themes::themes_from_types(&row.activity.types) {
            *theme_counts.entry(theme.priority_rank()).or_insert(0) += 1;
        }
    }

    if starts.is_empty() {
        return InferredPreferences::default();
    }

    let earliest_start = *starts.iter().min().expect("starts not empty");
    let latest_start = *starts.iter().max().expect("starts not empty");
    let latest_end = ends
        .iter()
        .max()
        .copied()
        .unwrap_or(latest_start + FALLBACK_ACTIVITY_SPAN_MIN);

    let day_start = (earliest_start - DAY_WINDOW_BUFFER_MIN).max(0);
    let day_end = (latest_end + DAY_WINDOW_BUFFER_MIN).min(MINUTES_PER_DAY);

    let total: usize = per_day.values().sum();
    let density = total as f64 / per_day.len() as f64;
    let pace = if density <= 2.0 {
        Pace::Relaxed
    } else if density <= 4.0 {
        Pace::Balanced
    } else {
        Pace::Packed
    };

    // Interests ranked by observed frequency, ties by the fixed theme
    // priority so the order never depends on map iteration.
    let mut ranked: Vec<(usize, usize)> = theme_counts.into_iter().collect();
    ranked.sort_by(|(rank_a, count_a), (rank_b, count_b)| {
        count_b.cmp(count_a).then(rank_a.cmp(rank_b))
    });
    let interests: Vec<DayThemeKey> = ranked
        .into_iter()
        .map(|(rank, _)| THEME_PRIORITY[rank])
        .collect();

    InferredPreferences {
        pace: Some(pace),
        day_start_min: Some(day_start),
        day_end_min: Some(day_end),
        interests,
        travel_mode: None,
    }
}

static RELAXED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(relaxed|relaxing|easy|slow|laid.?back|chill|leisurely)\b")
        .expect("relaxed regex")
});
static PACKED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(packed|busy|full|intense|jam.?packed|non.?stop|as much as possible)\b")
        .expect("packed regex")
});
static BALANCED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(balanced|moderate|middle ground)\b").expect("balanced regex"));

static WALK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(walk|walking|on foot|stroll)\b").expect("walk regex"));
static TRANSIT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(transit|metro|subway|tram|bus|train)\b").expect("transit regex")
});
static DRIVE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(drive|driving|car|rental car|taxi|uber)\b").expect("drive regex")
});

/// Extract preferences the user stated outright in free text. The message
/// is untrusted plain text; it is only ever matched, never evaluated.
pub fn extract_explicit_preferences(message: &str) -> ExplicitPreferences {
    let pace = if PACKED_RE.is_match(message) {
        Some(Pace::Packed)
    } else if RELAXED_RE.is_match(message) {
        Some(Pace::Relaxed)
    } else if BALANCED_RE.is_match(message) {
        Some(Pace::Balanced)
    } else {
        None
    };

    let travel_mode = if WALK_RE.is_match(message) {
        Some(TravelMode::Walk)
    } else if TRANSIT_RE.is_match(message) {
        Some(TravelMode::Transit)
    } else if DRIVE_RE.is_match(message) {
        Some(TravelMode::Drive)
    } else {
        None
    };

    // Already unique and in priority order.
    let interests: Vec<DayThemeKey> = themes::themes_from_message(message);

    ExplicitPreferences {
        pace,
        day_start_min: None,
        day_end_min: None,
        interests,
        travel_mode,
    }
}

/// Merge explicit over inferred over hard defaults, field by field.
pub fn merge_preferences(
    explicit: &ExplicitPreferences,
    inferred: &InferredPreferences,
) -> PreferencesProfile {
    let defaults = PreferencesProfile::default();
    PreferencesProfile {
        pace: explicit.pace.or(inferred.pace).unwrap_or(defaults.pace),
        day_start_min: explicit
            .day_start_min
            .or(inferred.day_start_min)
            .unwrap_or(defaults.day_start_min),
        day_end_min: explicit
            .day_end_min
            .or(inferred.day_end_min)
            .unwrap_or(defaults.day_end_min),
        interests: if !explicit.interests.is_empty() {
            explicit.interests.clone()
        } else if !inferred.interests.is_empty() {
            inferred.interests.clone()
        } else {
            defaults.interests
        },
        travel_mode: explicit
            .travel_mode
            .or(inferred.travel_mode)
            .unwrap_or(defaults.travel_mode),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::activity::PlaceDetails;

    fn row(id: &str, date: &str, start: &str, end: &str, types: &[&str]) -> ItineraryActivity {
        ItineraryActivity {
            id: id.to_string(),
            destination_id: "dest-1".to_string(),
            date: Some(date.to_string()),
            start: Some(start.to_string()),
            end: Some(end.to_string()),
            activity: PlaceDetails {
                id: format!("place-{id}"),
                name: format!("Place {id}"),
                types: types.iter().map(|t| t.to_string()).collect(),
                coordinates: None,
            },
        }
    }

    #[test]
    fn infers_window_pace_and_interests_from_history() {
        let rows = vec![
            row("1", "2025-05-05", "10:00", "12:00", &["museum"]),
            row("2", "2025-05-05", "13:00", "15:00", &["museum"]),
            row("3", "2025-05-05", "16:00", "18:00", &["restaurant"]),
            row("4", "2025-05-06", "09:30", "11:00", &["museum"]),
            row("5", "2025-05-06", "12:00", "13:00", &["park"]),
            row("6", "2025-05-06", "14:00", "16:00", &["restaurant"]),
        ];
        let inferred = infer_preferences_from_history(&rows);
        // Earliest start 09:30 minus the buffer, latest end 18:00 plus it.
        assert_eq!(inferred.day_start_min, Some(510));
        assert_eq!(inferred.day_end_min, Some(1140));
        assert_eq!(inferred.pace, Some(Pace::Balanced));
        assert_eq!(
            inferred.interests,
            vec![DayThemeKey::Museums, DayThemeKey::Food, DayThemeKey::Nature]
        );
    }

    #[test]
    fn sparse_history_reads_as_relaxed() {
        let rows = vec![
            row("1", "2025-05-05", "10:00", "12:00", &[]),
            row("2", "2025-05-06", "11:00", "12:00", &[]),
        ];
        let inferred = infer_preferences_from_history(&rows);
        assert_eq!(inferred.pace, Some(Pace::Relaxed));
    }

    #[test]
    fn empty_or_untimed_history_infers_nothing() {
        assert_eq!(
            infer_preferences_from_history(&[]),
            InferredPreferences::default()
        );
        let untimed = vec![ItineraryActivity {
            id: "1".to_string(),
            destination_id: "dest-1".to_string(),
            date: None,
            start: None,
            end: None,
            activity: PlaceDetails {
                id: "p".to_string(),
                name: "Place".to_string(),
                types: Vec::new(),
                coordinates: None,
            },
        }];
        assert_eq!(
            infer_preferences_from_history(&untimed),
            InferredPreferences::default()
        );
    }

    #[test]
    fn extracts_pace_mode_and_interests_from_text() {
        let explicit = extract_explicit_preferences(
            "keep it relaxed, we'll be walking everywhere, mostly museums please",
        );
        assert_eq!(explicit.pace, Some(Pace::Relaxed));
        assert_eq!(explicit.travel_mode, Some(TravelMode::Walk));
        assert_eq!(explicit.interests, vec![DayThemeKey::Museums]);
    }

    #[test]
    fn packed_wins_over_relaxed_when_both_appear() {
        let explicit = extract_explicit_preferences("not relaxed, make it packed");
        assert_eq!(explicit.pace, Some(Pace::Packed));
    }

    #[test]
    fn explicit_fields_override_inferred_ones() {
        let inferred = InferredPreferences {
            pace: Some(Pace::Packed),
            day_start_min: Some(480),
            day_end_min: Some(1200),
            interests: vec![DayThemeKey::Food],
            travel_mode: None,
        };
        let explicit = ExplicitPreferences {
            pace: Some(Pace::Relaxed),
            day_start_min: None,
            day_end_min: None,
            interests: Vec::new(),
            travel_mode: Some(TravelMode::Transit),
        };
        let merged = merge_preferences(&explicit, &inferred);
        assert_eq!(merged.pace, Pace::Relaxed);
        assert_eq!(merged.day_start_min, 480);
        assert_eq!(merged.day_end_min, 1200);
        assert_eq!(merged.interests, vec![DayThemeKey::Food]);
        assert_eq!(merged.travel_mode, TravelMode::Transit);
    }

    #[test]
    fn unset_fields_fall_back_to_defaults() {
        let merged = merge_preferences(
            &ExplicitPreferences::default(),
            &InferredPreferences::default(),
        );
        assert_eq!(merged, PreferencesProfile::default());
    }
}
