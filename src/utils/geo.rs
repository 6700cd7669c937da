use crate::models::activity::Coordinate;

/// Earth radius in meters, shared with the alternative ranker's scoring.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance between two coordinates in meters, via the
/// haversine formula. Good enough for intra-city clustering and ranking;
/// it ignores roads by design.
pub fn haversine_meters(from: &Coordinate, to: &Coordinate) -> f64 {
    let from_lat = from.lat.to_radians();
    let to_lat = to.lat.to_radians();
    let delta_lat = (to.lat - from.lat).to_radians();
    let delta_lng = (to.lng - from.lng).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + from_lat.cos() * to_lat.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_M * c
}

/// Distance between two coordinates when both are present and valid.
pub fn distance_between(from: Option<&Coordinate>, to: Option<&Coordinate>) -> Option<f64> {
    match (from, to) {
        (Some(from), Some(to)) if from.is_valid() && to.is_valid() => {
            Some(haversine_meters(from, to))
        }
        _ => None,
    }
}

/// Centroid of the valid coordinates in a set. `None` when nothing usable.
pub fn centroid<'a, I>(coordinates: I) -> Option<Coordinate>
where
    I: IntoIterator<Item = &'a Coordinate>,
{
    let mut lat_sum = 0.0;
    let mut lng_sum = 0.0;
    let mut count = 0usize;
    for coordinate in coordinates {
        if coordinate.is_valid() {
            lat_sum += coordinate.lat;
            lng_sum += coordinate.lng;
            count += 1;
        }
    }
    if count == 0 {
        return None;
    }
    Some(Coordinate::new(
        lat_sum / count as f64,
        lng_sum / count as f64,
    ))
}
