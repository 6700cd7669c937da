use serde::{Deserialize, Serialize};

/// Coarse day themes used to bias which candidates get scheduled together.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DayThemeKey {
    Shopping,
    Sights,
    Museums,
    Food,
    Nightlife,
    Nature,
    Mixed,
}

/// Fixed priority order used whenever several themes apply to one place or
/// one day and a single winner is needed. Position in this slice is the
/// tie-break key, so the order is part of the contract.
pub const THEME_PRIORITY: [DayThemeKey; 6] = [
    DayThemeKey::Museums,
    DayThemeKey::Nature,
    DayThemeKey::Nightlife,
    DayThemeKey::Shopping,
    DayThemeKey::Food,
    DayThemeKey::Sights,
];

impl DayThemeKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            DayThemeKey::Shopping => "shopping",
            DayThemeKey::Sights => "sights",
            DayThemeKey::Museums => "museums",
            DayThemeKey::Food => "food",
            DayThemeKey::Nightlife => "nightlife",
            DayThemeKey::Nature => "nature",
            DayThemeKey::Mixed => "mixed",
        }
    }

    /// Rank inside [`THEME_PRIORITY`]; `Mixed` sorts after every real theme.
    pub fn priority_rank(&self) -> usize {
        THEME_PRIORITY
            .iter()
            .position(|theme| theme == self)
            .unwrap_or(THEME_PRIORITY.len())
    }
}
