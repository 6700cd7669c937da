use serde::{Deserialize, Serialize};

use crate::models::theme::DayThemeKey;

/// Qualitative density setting controlling how tightly a day is packed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Pace {
    Relaxed,
    Balanced,
    Packed,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    Walk,
    Transit,
    Drive,
}

/// The merged pace/day-window/interest profile handed to the prompting
/// layer. Explicit user statements override inferred values field by field;
/// anything still unset falls back to these defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesProfile {
    pub pace: Pace,
    pub day_start_min: i64,
    pub day_end_min: i64,
    #[serde(default)]
    pub interests: Vec<DayThemeKey>,
    pub travel_mode: TravelMode,
}

impl Default for PreferencesProfile {
    fn default() -> Self {
        Self {
            pace: Pace::Balanced,
            day_start_min: 540,
            day_end_min: 1260,
            interests: Vec::new(),
            travel_mode: TravelMode::Walk,
        }
    }
}

/// Preferences stated outright by the user, extracted from free text.
/// Every field optional; unset fields defer to the inferred profile.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ExplicitPreferences {
    #[serde(default)]
    pub pace: Option<Pace>,
    #[serde(default)]
    pub day_start_min: Option<i64>,
    #[serde(default)]
    pub day_end_min: Option<i64>,
    #[serde(default)]
    pub interests: Vec<DayThemeKey>,
    #[serde(default)]
    pub travel_mode: Option<TravelMode>,
}

/// Preferences derived from historical activity data. Same shape as the
/// explicit set so the merge is a plain field-by-field fold.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct InferredPreferences {
    #[serde(default)]
    pub pace: Option<Pace>,
    #[serde(default)]
    pub day_start_min: Option<i64>,
    #[serde(default)]
    pub day_end_min: Option<i64>,
    #[serde(default)]
    pub interests: Vec<DayThemeKey>,
    #[serde(default)]
    pub travel_mode: Option<TravelMode>,
}
