use serde::{Deserialize, Serialize};

/// A proposed mutation to the itinerary. The engine hands operations back to
/// the caller for persistence; it never applies them itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Operation {
    #[serde(rename_all = "camelCase")]
    UpdateActivity {
        activity_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        date: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        start: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        end: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    RemoveActivity { activity_id: String },
    #[serde(rename_all = "camelCase")]
    AddPlace {
        name: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        types: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        date: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        start: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        end: Option<String>,
    },
}

impl Operation {
    /// The wire tag for this operation kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Operation::UpdateActivity { .. } => "update_activity",
            Operation::RemoveActivity { .. } => "remove_activity",
            Operation::AddPlace { .. } => "add_place",
        }
    }
}
