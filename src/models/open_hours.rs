use serde::{Deserialize, Serialize};

/// One raw opening-hours row for a place, as persisted upstream.
///
/// Any field may be null, meaning "unknown, contributes no interval".
/// Multiple rows per weekday are legal (split hours), and `close < open`
/// means the window spans midnight.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct OpenHoursRow {
    #[serde(default)]
    pub day: Option<i64>,
    #[serde(default)]
    pub open_hour: Option<i64>,
    #[serde(default)]
    pub open_minute: Option<i64>,
    #[serde(default)]
    pub close_hour: Option<i64>,
    #[serde(default)]
    pub close_minute: Option<i64>,
}

/// A merged, day-scoped open interval in minutes since midnight.
///
/// Half-open: `start_min <= t < end_min`, with `0 <= start_min < end_min <= 1440`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OpenInterval {
    pub start_min: i64,
    pub end_min: i64,
}

impl OpenInterval {
    pub fn length(&self) -> i64 {
        self.end_min - self.start_min
    }

    /// True when `[start, end)` lies fully inside this interval.
    pub fn contains_window(&self, start: i64, end: i64) -> bool {
        self.start_min <= start && end <= self.end_min
    }
}
