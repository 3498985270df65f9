use super::LonLat;
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

/// Sphere radius used by Web-Mercator (meters).
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;
/// Latitude at which Web-Mercator becomes square.
#[cfg(test)]
pub const MAX_MERCATOR_LAT: f64 = 85.051_128_779_806_59;

/// EPSG:3857 meters to EPSG:4326 degrees.
pub fn to_lon_lat(x: f64, y: f64) -> LonLat {
    let lon = (x / EARTH_RADIUS_M).to_degrees();
    let lat = (2.0 * (y / EARTH_RADIUS_M).exp().atan() - FRAC_PI_2).to_degrees();
    LonLat::new(lon, lat)
}

/// EPSG:4326 degrees to EPSG:3857 meters. Latitude is clamped to the
/// projection's valid band.
#[cfg(test)]
pub fn to_mercator(p: LonLat) -> (f64, f64) {
    let lat = p.lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT);
    let x = EARTH_RADIUS_M * p.lon.to_radians();
    let y = EARTH_RADIUS_M * (FRAC_PI_4 + lat.to_radians() / 2.0).tan().ln();
    (x, y)
}
