// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Circular boundary approximation for region footprints.

use crate::models::LngLat;
use geojson::{Geometry, Value};

// Approximate meters per degree at the Earth's surface. The longitude
// figure applies at the equator and is scaled by cos(latitude) below.
const METERS_PER_DEGREE_LNG: f64 = 111_320.0;
const METERS_PER_DEGREE_LAT: f64 = 110_540.0;

/// Approximate a circle around `center` as a closed polygon ring.
///
/// Planar offsets are converted to degrees with an equirectangular
/// approximation, which is adequate at the ~1 km radii this service works
/// with. The ring has `sides + 1` points, the last repeating the first.
/// Callers pass `sides >= 3`; the value comes from a fixed configuration
/// constant, never from request input.
pub fn circular_boundary(center: LngLat, radius_m: f64, sides: u32) -> Vec<Vec<f64>> {
    let delta_angle = 2.0 * std::f64::consts::PI / f64::from(sides);
    let lat_cos = center.lat().to_radians().cos();

    let mut ring = Vec::with_capacity(sides as usize + 1);
    for i in 0..sides {
        let angle = f64::from(i) * delta_angle;
        let dx = radius_m * angle.cos();
        let dy = radius_m * angle.sin();
        let lng = center.lng() + dx / (METERS_PER_DEGREE_LNG * lat_cos);
        let lat = center.lat() + dy / METERS_PER_DEGREE_LAT;
        ring.push(vec![lng, lat]);
    }

    // Close the polygon by repeating the first point
    if let Some(first) = ring.first().cloned() {
        ring.push(first);
    }
    ring
}

/// The boundary ring wrapped as the stored GeoJSON polygon geometry.
pub fn boundary_geometry(center: LngLat, radius_m: f64, sides: u32) -> Geometry {
    Geometry::new(Value::Polygon(vec![circular_boundary(
        center, radius_m, sides,
    )]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_is_closed_with_sides_plus_one_points() {
        let ring = circular_boundary(LngLat::new(-46.6333, -23.5505), 1000.0, 12);

        assert_eq!(ring.len(), 13);
        assert_eq!(ring.first(), ring.last());
    }

    #[test]
    fn test_ring_is_deterministic() {
        let center = LngLat::new(2.3522, 48.8566);

        let first = circular_boundary(center, 1000.0, 12);
        let second = circular_boundary(center, 1000.0, 12);

        assert_eq!(first, second);
    }

    #[test]
    fn test_first_point_is_due_east_of_center() {
        // angle 0 -> pure +x offset, so only longitude moves
        let center = LngLat::new(10.0, 0.0);
        let ring = circular_boundary(center, 1000.0, 8);

        let first = &ring[0];
        assert!((first[0] - (10.0 + 1000.0 / 111_320.0)).abs() < 1e-9);
        assert!((first[1] - 0.0).abs() < 1e-9);
    }

    #[test]
    fn test_longitude_offset_grows_with_latitude() {
        // A degree of longitude covers fewer meters away from the equator,
        // so the same radius must span more degrees.
        let equator = circular_boundary(LngLat::new(0.0, 0.0), 1000.0, 4);
        let north = circular_boundary(LngLat::new(0.0, 60.0), 1000.0, 4);

        let equator_span = equator[0][0] - 0.0;
        let north_span = north[0][0] - 0.0;
        assert!(north_span > equator_span * 1.9);
    }

    #[test]
    fn test_geometry_wraps_single_ring_polygon() {
        let geometry = boundary_geometry(LngLat::new(0.0, 0.0), 1000.0, 12);

        match geometry.value {
            geojson::Value::Polygon(rings) => {
                assert_eq!(rings.len(), 1);
                assert_eq!(rings[0].len(), 13);
            }
            other => panic!("expected polygon, got {:?}", other),
        }
    }
}
