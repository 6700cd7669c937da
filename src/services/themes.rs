use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::theme::{DayThemeKey, THEME_PRIORITY};

const MUSEUM_TYPES: &[&str] = &["museum", "art_gallery"];

const NIGHTLIFE_TYPES: &[&str] = &["night_club", "bar", "casino"];

const NATURE_TYPES: &[&str] = &[
    "park",
    "national_park",
    "campground",
    "natural_feature",
    "zoo",
    "botanical_garden",
    "aquarium",
    "beach",
];

// Historical "things to see" tags, minus anything the museum or nature sets
// already claim.
const SIGHTS_TYPES: &[&str] = &[
    "tourist_attraction",
    "landmark",
    "historical_landmark",
    "monument",
    "castle",
    "church",
    "place_of_worship",
    "synagogue",
    "mosque",
    "hindu_temple",
    "city_hall",
    "viewpoint",
];

const FOOD_TYPES: &[&str] = &[
    "restaurant",
    "cafe",
    "bakery",
    "food",
    "meal_takeaway",
    "meal_delivery",
];

const SHOPPING_TYPES: &[&str] = &[
    "shopping_mall",
    "department_store",
    "clothing_store",
    "shoe_store",
    "jewelry_store",
    "book_store",
    "market",
    "supermarket",
    "store",
];

fn type_set_for(theme: DayThemeKey) -> &'static [&'static str] {
    match theme {
        DayThemeKey::Museums => MUSEUM_TYPES,
        DayThemeKey::Nature => NATURE_TYPES,
        DayThemeKey::Nightlife => NIGHTLIFE_TYPES,
        DayThemeKey::Shopping => SHOPPING_TYPES,
        DayThemeKey::Food => FOOD_TYPES,
        DayThemeKey::Sights => SIGHTS_TYPES,
        DayThemeKey::Mixed => &[],
    }
}

/// Every theme whose type set intersects the place's tags, in priority
/// order. A place can legitimately carry several (a museum café is both).
pub fn themes_from_types(types: &[String]) -> Vec<DayThemeKey> {
    THEME_PRIORITY
        .iter()
        .copied()
        .filter(|theme| {
            let set = type_set_for(*theme);
            types.iter().any(|tag| set.contains(&tag.trim().to_lowercase().as_str()))
        })
        .collect()
}

/// The single best theme for a place, by the fixed priority order.
pub fn primary_theme_from_types(types: &[String]) -> Option<DayThemeKey> {
    themes_from_types(types).into_iter().next()
}

static SHOPPING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(shop|shopping|boutique|mall|market|souvenir)s?\b").expect("shopping regex")
});
static SIGHTS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(sight|sightseeing|landmark|monument|castle|cathedral|old town|viewpoint)s?\b")
        .expect("sights regex")
});
static MUSEUMS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(museum|gallery|galleries|exhibit|exhibition)s?\b").expect("museums regex")
});
static FOOD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(food|foodie|restaurant|eat|eating|dining|cuisine|street food|cafe|café)s?\b")
        .expect("food regex")
});
static NIGHTLIFE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(nightlife|club|clubbing|bar|bars|drinks|cocktail|party)s?\b")
        .expect("nightlife regex")
});
static NATURE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(nature|park|hike|hiking|outdoor|garden|beach|mountain|trail)s?\b")
        .expect("nature regex")
});

fn message_regex_for(theme: DayThemeKey) -> Option<&'static Regex> {
    match theme {
        DayThemeKey::Shopping => Some(&SHOPPING_RE),
        DayThemeKey::Sights => Some(&SIGHTS_RE),
        DayThemeKey::Museums => Some(&MUSEUMS_RE),
        DayThemeKey::Food => Some(&FOOD_RE),
        DayThemeKey::Nightlife => Some(&NIGHTLIFE_RE),
        DayThemeKey::Nature => Some(&NATURE_RE),
        DayThemeKey::Mixed => None,
    }
}

/// All themes whose keyword regex hits the message, in priority order.
pub fn themes_from_message(message: &str) -> Vec<DayThemeKey> {
    THEME_PRIORITY
        .iter()
        .copied()
        .filter(|theme| {
            message_regex_for(*theme)
                .map(|regex| regex.is_match(message))
                .unwrap_or(false)
        })
        .collect()
}

/// The day theme a free-text message asks for: `None` when nothing matches,
/// the single matching theme, or `Mixed` when several do.
pub fn infer_day_theme_from_message(message: &str) -> Option<DayThemeKey> {
    let hits = themes_from_message(message);
    match hits.len() {
        0 => None,
        1 => Some(hits[0]),
        _ => Some(DayThemeKey::Mixed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn classifies_types_into_themes() {
        assert_eq!(
            themes_from_types(&tags(&["museum", "tourist_attraction"])),
            vec![DayThemeKey::Museums, DayThemeKey::Sights]
        );
        assert_eq!(
            themes_from_types(&tags(&["park"])),
            vec![DayThemeKey::Nature]
        );
        assert_eq!(
            themes_from_types(&tags(&["restaurant", "bar"])),
            vec![DayThemeKey::Nightlife, DayThemeKey::Food]
        );
        assert!(themes_from_types(&tags(&["lodging"])).is_empty());
    }

    #[test]
    fn primary_theme_follows_priority_order() {
        assert_eq!(
            primary_theme_from_types(&tags(&["tourist_attraction", "museum"])),
            Some(DayThemeKey::Museums)
        );
        assert_eq!(
            primary_theme_from_types(&tags(&["store", "restaurant"])),
            Some(DayThemeKey::Shopping)
        );
        assert_eq!(primary_theme_from_types(&tags(&[])), None);
    }

    #[test]
    fn type_matching_ignores_case_and_whitespace() {
        assert_eq!(
            primary_theme_from_types(&tags(&[" Museum "])),
            Some(DayThemeKey::Museums)
        );
    }

    #[test]
    fn single_keyword_hit_names_the_theme() {
        assert_eq!(
            infer_day_theme_from_message("can we do a museum day on Tuesday?"),
            Some(DayThemeKey::Museums)
        );
        assert_eq!(
            infer_day_theme_from_message("I want to go shopping"),
            Some(DayThemeKey::Shopping)
        );
    }

    #[test]
    fn multiple_hits_resolve_to_mixed() {
        assert_eq!(
            infer_day_theme_from_message("museums in the morning, street food at night"),
            Some(DayThemeKey::Mixed)
        );
    }

    #[test]
    fn no_hits_resolve_to_none() {
        assert_eq!(infer_day_theme_from_message("move dinner to 19:00"), None);
    }
}
