use crate::types::dtos::GeoFix;

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two fixes, in km.
pub fn distance_km(a: &GeoFix, b: &GeoFix) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}
