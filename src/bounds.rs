//! Export extent validation.
//!
//! An extent is exportable when it touches at least one permitted region and
//! its geodesic area stays within the configured limit. The region check runs
//! first, so an extent that fails both reports [`Verdict::OutsideRegion`].

use crate::format;
use crate::geo::region::Region;
use crate::geo::Extent;
use serde::Serialize;

/// Default maximum export area in square kilometers.
pub const DEFAULT_MAX_AREA_KM2: f64 = 2_500_000.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    NoExtent,
    OutsideRegion,
    TooLarge { area_km2: f64, max_km2: f64 },
    Valid { area_km2: f64 },
}

impl Verdict {
    pub fn is_valid(&self) -> bool {
        matches!(self, Verdict::Valid { .. })
    }

    pub fn to_message(&self) -> String {
        match self {
            Verdict::NoExtent => "Select area to export.".to_string(),
            Verdict::OutsideRegion => {
                "Invalid Extent. Selected area is outside a valid HOT Export Region.".to_string()
            }
            Verdict::TooLarge { area_km2, max_km2 } => format!(
                "Invalid Extent. Selected area is {} sq km. Must be less than {} sq km.",
                format::thousands(*area_km2),
                format::thousands(*max_km2)
            ),
            Verdict::Valid { area_km2 } => {
                format!("Extents are valid ({} sq km).", format::thousands(*area_km2))
            }
        }
    }
}

/// Classify `extent` (geographic coordinates) against `regions`.
pub fn validate(extent: Option<&Extent>, regions: &[Region], max_area_km2: f64) -> Verdict {
    let Some(extent) = extent else {
        return Verdict::NoExtent;
    };
    if !regions.iter().any(|r| r.intersects_extent(extent)) {
        return Verdict::OutsideRegion;
    }
    let area_km2 = extent.area_km2();
    if area_km2 > max_area_km2 {
        Verdict::TooLarge {
            area_km2,
            max_km2: max_area_km2,
        }
    } else {
        Verdict::Valid { area_km2 }
    }
}

/// The four bbox fields submitted with a job, at 10 decimal places.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormFields {
    pub xmin: String,
    pub ymin: String,
    pub xmax: String,
    pub ymax: String,
}

impl From<&Extent> for FormFields {
    fn from(e: &Extent) -> Self {
        Self {
            xmin: format!("{:.10}", e.min_x),
            ymin: format!("{:.10}", e.min_y),
            xmax: format!("{:.10}", e.max_x),
            ymax: format!("{:.10}", e.max_y),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::region::Polygon;
    use crate::geo::LonLat;
    use pretty_assertions::assert_eq;

    fn region(name: &str, x1: f64, y1: f64, x2: f64, y2: f64) -> Region {
        Region {
            name: name.to_string(),
            polygons: vec![Polygon {
                exterior: Extent::new(x1, y1, x2, y2).corners().to_vec(),
                holes: Vec::new(),
            }],
        }
    }

    fn regions() -> Vec<Region> {
        vec![
            region("west-africa", -20.0, 0.0, 10.0, 20.0),
            region("haiti", -75.0, 17.0, -71.0, 21.0),
        ]
    }

    #[test]
    fn missing_extent() {
        assert_eq!(validate(None, &regions(), 1.0), Verdict::NoExtent);
        assert_eq!(validate(None, &[], DEFAULT_MAX_AREA_KM2), Verdict::NoExtent);
    }

    #[test]
    fn outside_every_region_regardless_of_area() {
        let small = Extent::new(100.0, 40.0, 100.5, 40.5);
        let huge = Extent::new(100.0, -60.0, 170.0, 60.0);
        assert_eq!(validate(Some(&small), &regions(), DEFAULT_MAX_AREA_KM2), Verdict::OutsideRegion);
        // Also over the limit: the region check wins.
        assert_eq!(validate(Some(&huge), &regions(), 1.0), Verdict::OutsideRegion);
        assert_eq!(validate(Some(&small), &[], DEFAULT_MAX_AREA_KM2), Verdict::OutsideRegion);
    }

    #[test]
    fn valid_inside_region() {
        let e = Extent::new(-73.0, 18.0, -72.0, 19.0);
        match validate(Some(&e), &regions(), DEFAULT_MAX_AREA_KM2) {
            Verdict::Valid { area_km2 } => {
                assert!((area_km2 - e.area_km2()).abs() < 1e-9);
                assert!(area_km2 > 11_000.0 && area_km2 < 12_000.0);
            }
            other => panic!("expected valid, got {other:?}"),
        }
    }

    #[test]
    fn straddling_a_region_boundary_is_accepted() {
        let e = Extent::new(-72.0, 20.5, -70.0, 22.0);
        assert!(validate(Some(&e), &regions(), DEFAULT_MAX_AREA_KM2).is_valid());
    }

    #[test]
    fn too_large_carries_area_and_limit() {
        let e = Extent::new(-20.0, 0.0, 10.0, 20.0);
        let area = e.area_km2();
        assert!(area > 2_500_000.0);
        assert_eq!(
            validate(Some(&e), &regions(), DEFAULT_MAX_AREA_KM2),
            Verdict::TooLarge {
                area_km2: area,
                max_km2: DEFAULT_MAX_AREA_KM2
            }
        );
    }

    #[test]
    fn area_equal_to_limit_is_valid() {
        let e = Extent::new(-73.0, 18.0, -72.0, 19.0);
        let area = e.area_km2();
        assert_eq!(
            validate(Some(&e), &regions(), area),
            Verdict::Valid { area_km2: area }
        );
    }

    #[test]
    fn mercator_input_is_reprojected_before_validation() {
        let (x1, y1) = crate::geo::projection::to_mercator(LonLat::new(-73.0, 18.0));
        let (x2, y2) = crate::geo::projection::to_mercator(LonLat::new(-72.0, 19.0));
        let e = Extent::new(x1, y1, x2, y2).mercator_to_lon_lat();
        assert!(validate(Some(&e), &regions(), DEFAULT_MAX_AREA_KM2).is_valid());
        // Meters read as degrees fall outside every region.
        let raw = Extent::new(x1, y1, x2, y2);
        assert_eq!(validate(Some(&raw), &regions(), DEFAULT_MAX_AREA_KM2), Verdict::OutsideRegion);
    }

    #[test]
    fn messages() {
        let v = Verdict::TooLarge {
            area_km2: 3_123_456.7,
            max_km2: DEFAULT_MAX_AREA_KM2,
        };
        assert_eq!(
            v.to_message(),
            "Invalid Extent. Selected area is 3,123,457 sq km. Must be less than 2,500,000 sq km."
        );
        assert_eq!(Verdict::NoExtent.to_message(), "Select area to export.");
        assert!(Verdict::OutsideRegion.to_message().contains("outside a valid HOT Export Region"));
    }

    #[test]
    fn form_fields_use_ten_decimals() {
        let f = FormFields::from(&Extent::new(-1.5, 2.0, 3.25, 4.0));
        assert_eq!(
            f,
            FormFields {
                xmin: "-1.5000000000".into(),
                ymin: "2.0000000000".into(),
                xmax: "3.2500000000".into(),
                ymax: "4.0000000000".into(),
            }
        );
    }

    #[test]
    fn verdict_serializes_with_tag() {
        let v = serde_json::to_value(Verdict::Valid { area_km2: 2.0 }).unwrap();
        assert_eq!(v, serde_json::json!({"verdict": "valid", "area_km2": 2.0}));
    }
}
