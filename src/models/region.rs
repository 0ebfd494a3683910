// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Region model and boundary geometry handling.

use crate::models::LngLat;
use chrono::{DateTime, Utc};
use geo::{Point, Polygon};
use geojson::Geometry;
use serde::{Deserialize, Serialize};

/// A named circular zone around a center point, stored in the `regions`
/// collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Region {
    /// Document id (UUID v4)
    pub id: String,
    pub name: String,
    /// `[lng, lat]` center point
    pub coordinates: LngLat,
    /// Postal address derived for the center point
    pub address: Option<String>,
    /// Owning user id; cleared (not cascaded) when the owner is deleted
    pub user: Option<String>,
    /// GeoJSON `Polygon` with one closed ring approximating a fixed-radius
    /// circle around `coordinates`. Kept in sync by the consistency engine.
    pub boundary: Option<Geometry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Region {
    /// Convert the stored boundary into a `geo` polygon.
    ///
    /// Returns `None` when the boundary is missing or not a polygon.
    pub fn boundary_polygon(&self) -> Option<Polygon<f64>> {
        let geometry = self.boundary.as_ref()?;
        let polygon: Result<Polygon<f64>, _> = geometry.value.clone().try_into();
        polygon.ok()
    }

    /// Check whether the boundary polygon contains a point.
    pub fn contains(&self, point: &Point<f64>) -> bool {
        use geo::Contains;
        self.boundary_polygon()
            .is_some_and(|polygon| polygon.contains(point))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geojson::Value;

    fn region_with_ring(ring: Vec<Vec<f64>>) -> Region {
        Region {
            id: "r-1".to_string(),
            name: "Test".to_string(),
            coordinates: LngLat::new(0.0, 0.0),
            address: None,
            user: None,
            boundary: Some(Geometry::new(Value::Polygon(vec![ring]))),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_contains_point_inside_square() {
        let region = region_with_ring(vec![
            vec![-1.0, -1.0],
            vec![1.0, -1.0],
            vec![1.0, 1.0],
            vec![-1.0, 1.0],
            vec![-1.0, -1.0],
        ]);

        assert!(region.contains(&Point::new(0.0, 0.0)));
        assert!(!region.contains(&Point::new(2.0, 2.0)));
    }

    #[test]
    fn test_missing_boundary_contains_nothing() {
        let mut region = region_with_ring(vec![]);
        region.boundary = None;

        assert!(!region.contains(&Point::new(0.0, 0.0)));
    }
}
