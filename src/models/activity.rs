use serde::{Deserialize, Serialize};

/// A latitude/longitude pair. Immutable, no identity.
///
/// One upstream source stores coordinates as `[lng, lat]` arrays; callers
/// converting from that source must go through [`Coordinate::from_lng_lat`]
/// so the axis order is explicit at the boundary.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Build from a `[lng, lat]` ordered pair.
    pub fn from_lng_lat(pair: [f64; 2]) -> Self {
        Self {
            lat: pair[1],
            lng: pair[0],
        }
    }

    /// True when both axes are inside their valid ranges.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

/// The place behind an itinerary row: what it is and where it is.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlaceDetails {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub coordinates: Option<Coordinate>,
}

/// One itinerary row as supplied by the persistence layer.
///
/// `date`/`start`/`end` are all `None` for an unscheduled row; a scheduled
/// row carries an ISO date and `"HH:MM"` wall-clock times.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ItineraryActivity {
    pub id: String,
    pub destination_id: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
    pub activity: PlaceDetails,
}

/// A fixed trip block (flight, hotel check-in/out) that planned activities
/// must not silently overlap.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CustomEvent {
    pub id: String,
    pub title: String,
    pub kind: String,
    pub date: String,
    pub start: String,
    pub end: String,
}
