use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value as JsonValue;

pub const MINUTES_PER_DAY: i64 = 1440;

/// Parse `"HH:MM"` or `"HH:MM:SS"` to minutes since midnight.
///
/// Seconds are accepted and ignored. Returns `None` for anything malformed
/// or out of range; malformed times never abort planning.
pub fn parse_clock_minutes(value: &str) -> Option<i64> {
    let mut parts = value.trim().split(':');
    let hour: i64 = parts.next()?.parse().ok()?;
    let minute: i64 = parts.next()?.parse().ok()?;
    if let Some(seconds) = parts.next() {
        let seconds: i64 = seconds.parse().ok()?;
        if !(0..60).contains(&seconds) {
            return None;
        }
    }
    if parts.next().is_some() {
        return None;
    }
    if !(0..24).contains(&hour) || !(0..60).contains(&minute) {
        return None;
    }
    Some(hour * 60 + minute)
}

/// Format minutes since midnight as `"HH:MM"`, clamped to `[0, 1440]`.
pub fn format_clock_minutes(minutes: i64) -> String {
    let clamped = minutes.clamp(0, MINUTES_PER_DAY);
    format!("{:02}:{:02}", clamped / 60, clamped % 60)
}

/// Parse an ISO `YYYY-MM-DD` date. Wall-clock semantics only; the engine
/// never converts between timezones.
pub fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

/// Day of week for an ISO date: 0 = Sunday through 6 = Saturday, matching
/// the `OpenHoursRow.day` convention.
pub fn weekday_index(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

/// Inclusive ordered date pool between two ISO dates. `None` when either
/// date is malformed or the range is inverted.
pub fn date_range(start: &str, end: &str) -> Option<Vec<String>> {
    let start = parse_iso_date(start)?;
    let end = parse_iso_date(end)?;
    if end < start {
        return None;
    }
    let mut dates = Vec::new();
    let mut cursor = start;
    while cursor <= end {
        dates.push(cursor.format("%Y-%m-%d").to_string());
        cursor = cursor.succ_opt()?;
    }
    Some(dates)
}

static MINUTES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+(?:\.\d+)?)\s*(?:minutes?|mins?|m)$").expect("minutes regex"));
static HOURS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+(?:\.\d+)?)\s*(?:hours?|hrs?|h)$").expect("hours regex"));

/// Normalize a duration value to whole minutes.
///
/// Accepts a bare number of minutes, `"45 minutes"` / `"45 min"`,
/// `"2 hours"` / `"1.5 hr"`, and `"HH:MM[:SS]"` duration strings.
/// Returns `None` for unparseable input.
pub fn parse_duration_minutes(value: &JsonValue) -> Option<i64> {
    match value {
        JsonValue::Number(number) => {
            let minutes = number.as_f64()?;
            to_positive_minutes(minutes)
        }
        JsonValue::String(text) => parse_duration_str(text),
        _ => None,
    }
}

/// String-only variant of [`parse_duration_minutes`].
pub fn parse_duration_str(value: &str) -> Option<i64> {
    let text = value.trim().to_lowercase();
    if text.is_empty() {
        return None;
    }
    if let Ok(minutes) = text.parse::<f64>() {
        return to_positive_minutes(minutes);
    }
    if let Some(captures) = MINUTES_RE.captures(&text) {
        let minutes: f64 = captures[1].parse().ok()?;
        return to_positive_minutes(minutes);
    }
    if let Some(captures) = HOURS_RE.captures(&text) {
        let hours: f64 = captures[1].parse().ok()?;
        return to_positive_minutes(hours * 60.0);
    }
    if text.contains(':') {
        let parts: Vec<&str> = text.split(':').collect();
        if parts.len() == 2 || parts.len() == 3 {
            let hours: i64 = parts[0].parse().ok()?;
            let minutes: i64 = parts[1].parse().ok()?;
            if hours < 0 || !(0..60).contains(&minutes) {
                return None;
            }
            if parts.len() == 3 {
                let seconds: i64 = parts[2].parse().ok()?;
                if !(0..60).contains(&seconds) {
                    return None;
                }
            }
            let total = hours * 60 + minutes;
            return if total > 0 { Some(total) } else { None };
        }
        return None;
    }
    None
}

fn to_positive_minutes(minutes: f64) -> Option<i64> {
    if !minutes.is_finite() || minutes <= 0.0 {
        return None;
    }
    Some(minutes.round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_clock_values_with_and_without_seconds() {
        assert_eq!(parse_clock_minutes("09:30"), Some(570));
        assert_eq!(parse_clock_minutes("00:00"), Some(0));
        assert_eq!(parse_clock_minutes("23:59"), Some(1439));
        assert_eq!(parse_clock_minutes("13:00:45"), Some(780));
    }

    #[test]
    fn rejects_malformed_clock_values() {
        assert_eq!(parse_clock_minutes("24:00"), None);
        assert_eq!(parse_clock_minutes("12:60"), None);
        assert_eq!(parse_clock_minutes("12"), None);
        assert_eq!(parse_clock_minutes("12:00:00:00"), None);
        assert_eq!(parse_clock_minutes("noon"), None);
        assert_eq!(parse_clock_minutes(""), None);
    }

    #[test]
    fn formats_and_clamps_minutes() {
        assert_eq!(format_clock_minutes(570), "09:30");
        assert_eq!(format_clock_minutes(-10), "00:00");
        assert_eq!(format_clock_minutes(2000), "24:00");
    }

    #[test]
    fn weekday_index_uses_sunday_zero() {
        // 2025-05-04 is a Sunday.
        let sunday = parse_iso_date("2025-05-04").unwrap();
        assert_eq!(weekday_index(sunday), 0);
        let monday = parse_iso_date("2025-05-05").unwrap();
        assert_eq!(weekday_index(monday), 1);
        let saturday = parse_iso_date("2025-05-10").unwrap();
        assert_eq!(weekday_index(saturday), 6);
    }

    #[test]
    fn date_range_is_inclusive_and_ordered() {
        let pool = date_range("2025-05-30", "2025-06-02").unwrap();
        assert_eq!(
            pool,
            vec!["2025-05-30", "2025-05-31", "2025-06-01", "2025-06-02"]
        );
        assert_eq!(date_range("2025-06-02", "2025-06-01"), None);
        assert_eq!(date_range("not-a-date", "2025-06-01"), None);
    }

    #[test]
    fn parses_duration_shapes() {
        assert_eq!(parse_duration_minutes(&json!(45)), Some(45));
        assert_eq!(parse_duration_minutes(&json!("45")), Some(45));
        assert_eq!(parse_duration_minutes(&json!("45 minutes")), Some(45));
        assert_eq!(parse_duration_minutes(&json!("90 min")), Some(90));
        assert_eq!(parse_duration_minutes(&json!("2 hours")), Some(120));
        assert_eq!(parse_duration_minutes(&json!("1.5 hr")), Some(90));
        assert_eq!(parse_duration_minutes(&json!("01:30:00")), Some(90));
        assert_eq!(parse_duration_minutes(&json!("00:45")), Some(45));
    }

    #[test]
    fn rejects_unparseable_durations() {
        assert_eq!(parse_duration_minutes(&json!("a while")), None);
        assert_eq!(parse_duration_minutes(&json!("")), None);
        assert_eq!(parse_duration_minutes(&json!(0)), None);
        assert_eq!(parse_duration_minutes(&json!(-30)), None);
        assert_eq!(parse_duration_minutes(&json!(null)), None);
        assert_eq!(parse_duration_minutes(&json!("12:99")), None);
    }
}
