//! Great-circle distance calculation.

/// Mean Earth radius in kilometers, matching the original system's constant.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine great-circle distance between two points, in kilometers.
///
/// Inputs are decimal degrees. Symmetric; returns 0 for identical points.
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (lat1_r, lat2_r) = (lat1.to_radians(), lat2.to_radians());
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1_r.cos() * lat2_r.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_points_are_zero_distance() {
        assert_eq!(distance_km(40.7128, -74.0060, 40.7128, -74.0060), 0.0);
    }

    #[test]
    fn is_symmetric() {
        let a = distance_km(0.0, 0.0, 1.0, 1.0);
        let b = distance_km(1.0, 1.0, 0.0, 0.0);
        assert!((a - b).abs() < 1e-9);
    }

    #[test]
    fn matches_known_distance_new_york_to_london() {
        // ~5570 km, allow a few km of tolerance for rounding in test inputs.
        let d = distance_km(40.7128, -74.0060, 51.5074, -0.1278);
        assert!((d - 5570.0).abs() < 20.0, "got {d}");
    }

    #[test]
    fn small_offsets_scale_roughly_linearly() {
        // One degree of latitude is ~111 km near the equator.
        let d = distance_km(0.0, 0.0, 1.0, 0.0);
        assert!((d - 111.19).abs() < 1.0, "got {d}");
    }
}
