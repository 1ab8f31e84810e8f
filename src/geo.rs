//! Great-circle distance and nearest-station search.
//!
//! The search functions are catalog-agnostic: each provider adapter owns its
//! own station catalog (remotely discovered, curated, or looked up per
//! query) and exposes coordinates through the small [`HasLocation`] trait.

/// Mean radius of Earth in kilometers (IUGG derived geometric constant).
const MEAN_EARTH_RADIUS_KM: f64 = 6371.0088;

/// Anything with a WGS84 position that can be ranked by distance.
pub trait HasLocation {
    /// Returns `(latitude, longitude)` in degrees.
    fn location(&self) -> (f64, f64);
}

/// Haversine great-circle distance between two WGS84 points, in kilometers.
pub fn distance_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    MEAN_EARTH_RADIUS_KM * c
}

/// Returns the closest candidate within `max_km` of the query point, with
/// its distance, or `None` when every candidate is farther away.
///
/// Ties are broken by catalog order; either tied candidate satisfies the
/// distance invariant.
pub fn find_nearest<'a, T: HasLocation>(
    stations: &'a [T],
    lat: f64,
    lng: f64,
    max_km: f64,
) -> Option<(&'a T, f64)> {
    let mut best: Option<(&T, f64)> = None;

    for station in stations {
        let (s_lat, s_lng) = station.location();
        let dist = distance_km(lat, lng, s_lat, s_lng);
        if dist <= max_km && best.map_or(true, |(_, d)| dist < d) {
            best = Some((station, dist));
        }
    }

    best
}

/// Returns up to `limit` candidates within `max_km`, closest first.
pub fn find_nearby<'a, T: HasLocation>(
    stations: &'a [T],
    lat: f64,
    lng: f64,
    max_km: f64,
    limit: usize,
) -> Vec<(&'a T, f64)> {
    let mut in_range: Vec<(&T, f64)> = stations
        .iter()
        .map(|s| {
            let (s_lat, s_lng) = s.location();
            (s, distance_km(lat, lng, s_lat, s_lng))
        })
        .filter(|(_, d)| *d <= max_km)
        .collect();

    in_range.sort_by(|a, b| a.1.partial_cmp(&b.1).expect("distances are finite"));
    in_range.truncate(limit);
    in_range
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
