use super::{Extent, LonLat};
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::Path;

/// Polygon with an exterior ring and optional holes.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    pub exterior: Vec<LonLat>,
    pub holes: Vec<Vec<LonLat>>,
}

/// A named permitted export area.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub name: String,
    pub polygons: Vec<Polygon>,
}

#[derive(Debug)]
pub enum RegionError {
    NotAFeatureCollection,
    InvalidFeature { index: usize, reason: String },
}

impl std::fmt::Display for RegionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegionError::NotAFeatureCollection => {
                write!(f, "expected GeoJSON FeatureCollection")
            }
            RegionError::InvalidFeature { index, reason } => {
                write!(f, "invalid region at index {index}: {reason}")
            }
        }
    }
}

impl std::error::Error for RegionError {}

impl Polygon {
    fn rings(&self) -> impl Iterator<Item = &[LonLat]> {
        std::iter::once(self.exterior.as_slice()).chain(self.holes.iter().map(Vec::as_slice))
    }

    pub fn contains(&self, p: LonLat) -> bool {
        point_in_ring(p, &self.exterior) && !self.holes.iter().any(|h| point_in_ring(p, h))
    }

    /// True when the polygon and the rectangle share at least one point.
    pub fn intersects_extent(&self, extent: &Extent) -> bool {
        match Extent::covering(&self.exterior) {
            Some(bounds) if bounds.overlaps(extent) => {}
            _ => return false,
        }
        if extent.corners().iter().any(|c| self.contains(*c)) {
            return true;
        }
        if self.rings().flatten().any(|p| extent.contains(*p)) {
            return true;
        }
        let corners = extent.corners();
        self.rings().any(|ring| {
            edges(ring).any(|(a, b)| {
                (0..4).any(|i| segments_intersect(a, b, corners[i], corners[(i + 1) % 4]))
            })
        })
    }
}

impl Region {
    pub fn intersects_extent(&self, extent: &Extent) -> bool {
        self.polygons.iter().any(|p| p.intersects_extent(extent))
    }
}

fn edges(ring: &[LonLat]) -> impl Iterator<Item = (LonLat, LonLat)> + '_ {
    (0..ring.len()).map(move |i| (ring[i], ring[(i + 1) % ring.len()]))
}

fn point_in_ring(p: LonLat, ring: &[LonLat]) -> bool {
    let mut inside = false;
    for (a, b) in edges(ring) {
        if (a.lat > p.lat) != (b.lat > p.lat) {
            let x = a.lon + (p.lat - a.lat) / (b.lat - a.lat) * (b.lon - a.lon);
            if p.lon < x {
                inside = !inside;
            }
        }
    }
    inside
}

fn orientation(a: LonLat, b: LonLat, c: LonLat) -> f64 {
    (b.lon - a.lon) * (c.lat - a.lat) - (b.lat - a.lat) * (c.lon - a.lon)
}

fn on_segment(a: LonLat, b: LonLat, p: LonLat) -> bool {
    p.lon >= a.lon.min(b.lon)
        && p.lon <= a.lon.max(b.lon)
        && p.lat >= a.lat.min(b.lat)
        && p.lat <= a.lat.max(b.lat)
}

fn segments_intersect(p1: LonLat, p2: LonLat, q1: LonLat, q2: LonLat) -> bool {
    let d1 = orientation(q1, q2, p1);
    let d2 = orientation(q1, q2, p2);
    let d3 = orientation(p1, p2, q1);
    let d4 = orientation(p1, p2, q2);
    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }
    (d1 == 0.0 && on_segment(q1, q2, p1))
        || (d2 == 0.0 && on_segment(q1, q2, p2))
        || (d3 == 0.0 && on_segment(p1, p2, q1))
        || (d4 == 0.0 && on_segment(p1, p2, q2))
}

/// Parse a FeatureCollection of Polygon / MultiPolygon features.
pub fn parse_regions(value: &Value) -> Result<Vec<Region>, RegionError> {
    let obj = value
        .as_object()
        .ok_or(RegionError::NotAFeatureCollection)?;
    if obj.get("type").and_then(|v| v.as_str()) != Some("FeatureCollection") {
        return Err(RegionError::NotAFeatureCollection);
    }
    let features = obj
        .get("features")
        .and_then(|v| v.as_array())
        .ok_or(RegionError::NotAFeatureCollection)?;

    let mut regions = Vec::with_capacity(features.len());
    for (index, feature) in features.iter().enumerate() {
        let invalid = |reason: String| RegionError::InvalidFeature { index, reason };
        let feat = feature
            .as_object()
            .ok_or_else(|| invalid("feature must be an object".to_string()))?;
        let name = feat
            .get("properties")
            .and_then(|p| p.get("name"))
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .or_else(|| match feat.get("id") {
                Some(Value::String(s)) => Some(s.clone()),
                Some(Value::Number(n)) => Some(n.to_string()),
                _ => None,
            })
            .unwrap_or_else(|| format!("region-{index}"));
        let geometry = feat
            .get("geometry")
            .ok_or_else(|| invalid("feature missing geometry".to_string()))?;
        let polygons = parse_polygons(geometry).map_err(invalid)?;
        regions.push(Region { name, polygons });
    }
    Ok(regions)
}

/// Polygons of a bare Polygon / MultiPolygon geometry.
pub fn parse_polygons(geometry: &Value) -> Result<Vec<Polygon>, String> {
    let ty = geometry
        .get("type")
        .and_then(|v| v.as_str())
        .ok_or("geometry missing type".to_string())?;
    let coords = geometry
        .get("coordinates")
        .ok_or("geometry missing coordinates".to_string())?;
    match ty {
        "Polygon" => Ok(vec![parse_polygon(coords)?]),
        "MultiPolygon" => coords
            .as_array()
            .ok_or("MultiPolygon coordinates must be an array of polygons".to_string())?
            .iter()
            .map(parse_polygon)
            .collect(),
        other => Err(format!("unsupported region geometry type: {other}")),
    }
}

fn parse_polygon(coords: &Value) -> Result<Polygon, String> {
    let rings = coords
        .as_array()
        .ok_or("Polygon coordinates must be an array of rings".to_string())?;
    let mut rings = rings.iter().map(parse_ring);
    let exterior = rings
        .next()
        .ok_or("Polygon must have an exterior ring".to_string())??;
    let holes = rings.collect::<Result<Vec<_>, _>>()?;
    Ok(Polygon { exterior, holes })
}

fn parse_ring(coords: &Value) -> Result<Vec<LonLat>, String> {
    let points = coords
        .as_array()
        .ok_or("ring must be an array of positions".to_string())?;
    let mut out = Vec::with_capacity(points.len());
    for point in points {
        let arr = point
            .as_array()
            .ok_or("position must be an array".to_string())?;
        let (Some(lon), Some(lat)) = (
            arr.first().and_then(Value::as_f64),
            arr.get(1).and_then(Value::as_f64),
        ) else {
            return Err("position must have numeric [lon, lat]".to_string());
        };
        out.push(LonLat::new(lon, lat));
    }
    if out.len() < 3 {
        return Err(format!("ring needs at least 3 positions, got {}", out.len()));
    }
    Ok(out)
}

pub fn load_regions_file(path: &Path) -> Result<Vec<Region>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("read regions file {}", path.display()))?;
    let value: Value = serde_json::from_str(&raw)
        .with_context(|| format!("parse regions file {}", path.display()))?;
    parse_regions(&value).with_context(|| format!("load regions from {}", path.display()))
}
