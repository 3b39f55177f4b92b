//! Great-circle distance between two GPS coordinates.

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A `(latitude, longitude)` pair in decimal degrees.
pub type Coordinates = (f64, f64);

/// Haversine distance in kilometres between two `(latitude, longitude)` points.
///
/// Identical points give exactly `0.0`. Non-finite inputs propagate to a
/// non-finite result rather than failing.
///
/// ```
/// use taxi_trips::geo::haversine_distance;
///
/// assert_eq!(haversine_distance((0.0, 0.0), (0.0, 0.0)), 0.0);
/// let paris_london = haversine_distance((48.87, 2.33), (51.53, -0.24));
/// assert!((paris_london - 347.722_725_856_587_54).abs() < 1e-9);
/// ```
pub fn haversine_distance(coords0: Coordinates, coords1: Coordinates) -> f64 {
    let (lat0, lon0) = coords0;
    let (lat1, lon1) = coords1;

    let phi0 = lat0.to_radians();
    let phi1 = lat1.to_radians();
    let dphi = (lat1 - lat0).to_radians();
    let dlambda = (lon1 - lon0).to_radians();

    let a = (dphi / 2.0).sin().powi(2) + phi0.cos() * phi1.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Average speed in km/h over `duration_secs` seconds.
///
/// A zero duration yields `inf` (or `NaN` when the distance is also zero);
/// callers filter non-finite speeds themselves.
pub fn average_speed_kmh(distance_km: f64, duration_secs: f64) -> f64 {
    distance_km / (duration_secs / 3600.0)
}
