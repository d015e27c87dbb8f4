//! Great-circle distance.

/// Mean Earth radius used by [`haversine_distance`].
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance in kilometres between `(lon1, lat1)` and `(lon2, lat2)`,
/// all in decimal degrees.
///
/// See <https://en.wikipedia.org/wiki/Haversine_formula>.
pub fn haversine_distance(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> f64 {
    let (lon1, lat1, lon2, lat2) = (
        lon1.to_radians(),
        lat1.to_radians(),
        lon2.to_radians(),
        lat2.to_radians(),
    );
    let dlon = lon2 - lon1;
    let dlat = lat2 - lat1;
    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    // rounding can push `a` a hair above 1 for antipodal points
    2.0 * EARTH_RADIUS_KM * a.min(1.0).sqrt().asin()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_point_is_zero() {
        assert_eq!(haversine_distance(-46.63, -23.55, -46.63, -23.55), 0.0);
    }

    #[test]
    fn test_sao_paulo_to_rio() {
        // roughly 360 km
        let d = haversine_distance(-46.6333, -23.5505, -43.1729, -22.9068);
        assert!((d - 360.0).abs() < 10.0, "got {d}");
    }

    #[test]
    fn test_quarter_meridian() {
        let d = haversine_distance(0.0, 0.0, 0.0, 90.0);
        let expected = std::f64::consts::PI / 2.0 * EARTH_RADIUS_KM;
        assert!((d - expected).abs() < 1e-6);
    }
}
