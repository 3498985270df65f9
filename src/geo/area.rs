use super::projection::EARTH_RADIUS_M;
use super::LonLat;

/// Area of a ring on the sphere, in square meters.
///
/// Uses the spherical excess approximation from "Some Algorithms for
/// Polygons on a Sphere" (Chamberlain & Duquette, JPL 2007). The ring may be
/// open or closed and wound in either direction. For a lon/lat rectangle the
/// result is exact: `R² · Δλ · (sin φ₂ − sin φ₁)`.
pub fn ring_area_m2(ring: &[LonLat]) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for (i, p1) in ring.iter().enumerate() {
        let p2 = ring[(i + 1) % ring.len()];
        sum += (p2.lon - p1.lon).to_radians()
            * (2.0 + p1.lat.to_radians().sin() + p2.lat.to_radians().sin());
    }
    (sum * EARTH_RADIUS_M * EARTH_RADIUS_M / 2.0).abs()
}

pub fn m2_to_km2(m2: f64) -> f64 {
    m2 / 1_000_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    fn rect(x1: f64, y1: f64, x2: f64, y2: f64) -> Vec<LonLat> {
        vec![
            LonLat::new(x1, y1),
            LonLat::new(x2, y1),
            LonLat::new(x2, y2),
            LonLat::new(x1, y2),
        ]
    }

    fn closed_form_km2(x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
        m2_to_km2(
            EARTH_RADIUS_M
                * EARTH_RADIUS_M
                * (x2 - x1).to_radians()
                * (y2.to_radians().sin() - y1.to_radians().sin()),
        )
    }

    #[test]
    fn one_degree_cell_at_equator() {
        let a = m2_to_km2(ring_area_m2(&rect(0.0, 0.0, 1.0, 1.0)));
        assert_close(a, closed_form_km2(0.0, 0.0, 1.0, 1.0), 1e-6);
        assert_close(a, 12_391.4, 1.0);
    }

    #[test]
    fn cells_shrink_toward_the_poles() {
        let equator = ring_area_m2(&rect(0.0, 0.0, 1.0, 1.0));
        let north = ring_area_m2(&rect(0.0, 60.0, 1.0, 61.0));
        assert!(north < equator * 0.55);
        assert_close(
            m2_to_km2(north),
            closed_form_km2(0.0, 60.0, 1.0, 61.0),
            1e-6,
        );
    }

    #[test]
    fn winding_and_closure_do_not_matter() {
        let mut ring = rect(10.0, -20.0, 15.0, -10.0);
        let open = ring_area_m2(&ring);
        ring.reverse();
        assert_close(ring_area_m2(&ring), open, 1e-3);
        ring.push(ring[0]);
        assert_close(ring_area_m2(&ring), open, 1e-3);
    }

    #[test]
    fn degenerate_rings_have_no_area() {
        assert_eq!(ring_area_m2(&[]), 0.0);
        assert_eq!(ring_area_m2(&[LonLat::new(0.0, 0.0), LonLat::new(1.0, 1.0)]), 0.0);
        assert_close(ring_area_m2(&rect(3.0, 3.0, 3.0, 9.0)), 0.0, 1e-6);
    }
}
