//! Geometry for export extents: reprojection, geodesic area and region tests.
//!
//! Coordinates are geographic (EPSG:4326, degrees) unless a function says
//! otherwise. Display input in Web-Mercator (EPSG:3857) goes through
//! [`projection`] before anything else touches it.

pub mod area;
pub mod projection;
pub mod region;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LonLat {
    pub lon: f64,
    pub lat: f64,
}

impl LonLat {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

/// Axis-aligned rectangle. `min_* <= max_*` holds after [`Extent::new`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Extent {
    /// Build a normalized extent from two opposite corners in any order.
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            min_x: x1.min(x2),
            min_y: y1.min(y2),
            max_x: x1.max(x2),
            max_y: y1.max(y2),
        }
    }

    /// Reinterpret this extent as Web-Mercator meters and reproject it to lon/lat.
    pub fn mercator_to_lon_lat(&self) -> Self {
        let a = projection::to_lon_lat(self.min_x, self.min_y);
        let b = projection::to_lon_lat(self.max_x, self.max_y);
        Self::new(a.lon, a.lat, b.lon, b.lat)
    }

    /// Corners in ring order starting at the south-west corner.
    pub fn corners(&self) -> [LonLat; 4] {
        [
            LonLat::new(self.min_x, self.min_y),
            LonLat::new(self.max_x, self.min_y),
            LonLat::new(self.max_x, self.max_y),
            LonLat::new(self.min_x, self.max_y),
        ]
    }

    pub fn contains(&self, p: LonLat) -> bool {
        p.lon >= self.min_x && p.lon <= self.max_x && p.lat >= self.min_y && p.lat <= self.max_y
    }

    pub fn overlaps(&self, other: &Extent) -> bool {
        self.min_x <= other.max_x
            && other.min_x <= self.max_x
            && self.min_y <= other.max_y
            && other.min_y <= self.max_y
    }

    /// Smallest extent covering every point, `None` for an empty slice.
    pub fn covering(points: &[LonLat]) -> Option<Self> {
        let first = points.first()?;
        let mut out = Self::new(first.lon, first.lat, first.lon, first.lat);
        for p in &points[1..] {
            out.min_x = out.min_x.min(p.lon);
            out.min_y = out.min_y.min(p.lat);
            out.max_x = out.max_x.max(p.lon);
            out.max_y = out.max_y.max(p.lat);
        }
        Some(out)
    }

    /// Geodesic area in square kilometers.
    pub fn area_km2(&self) -> f64 {
        area::m2_to_km2(area::ring_area_m2(&self.corners()))
    }
}

/// Parse `xmin,ymin,xmax,ymax`.
pub fn parse_bbox(raw: &str) -> Result<Extent, String> {
    let values = raw
        .split(',')
        .map(|v| v.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| format!("invalid bbox coordinate: {e}"))?;
    match values.as_slice() {
        [x1, y1, x2, y2] if values.iter().all(|v| v.is_finite()) => {
            Ok(Extent::new(*x1, *y1, *x2, *y2))
        }
        [_, _, _, _] => Err("bbox coordinates must be finite".to_string()),
        _ => Err(format!(
            "expected 4 comma-separated values (xmin,ymin,xmax,ymax), got {}",
            values.len()
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_normalizes_corners() {
        let e = Extent::new(10.0, 5.0, -10.0, -5.0);
        assert_eq!(e, Extent::new(-10.0, -5.0, 10.0, 5.0));
        assert!(e.min_x <= e.max_x && e.min_y <= e.max_y);
    }

    #[test]
    fn parse_bbox_accepts_negative_and_spaces() {
        let e = parse_bbox("-1.5, 2, 3 ,-4").unwrap();
        assert_eq!(e, Extent::new(-1.5, -4.0, 3.0, 2.0));
    }

    #[test]
    fn parse_bbox_rejects_bad_input() {
        assert!(parse_bbox("1,2,3").is_err());
        assert!(parse_bbox("1,2,3,x").is_err());
        assert!(parse_bbox("1,2,3,inf").is_err());
    }

    #[test]
    fn covering_and_overlap() {
        let pts = [LonLat::new(1.0, 1.0), LonLat::new(-2.0, 4.0), LonLat::new(0.0, -1.0)];
        let e = Extent::covering(&pts).unwrap();
        assert_eq!(e, Extent::new(-2.0, -1.0, 1.0, 4.0));
        assert!(e.overlaps(&Extent::new(1.0, 4.0, 5.0, 5.0)));
        assert!(!e.overlaps(&Extent::new(1.1, 0.0, 5.0, 5.0)));
        assert!(Extent::covering(&[]).is_none());
    }
}
