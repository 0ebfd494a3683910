//! Coordinate pair shared by user and region documents.

use geo::Point;
use serde::{Deserialize, Serialize};

/// A stored coordinate pair, always `[longitude, latitude]`.
///
/// The spatial index on the persistence layer expects raw `[lng, lat]`
/// arrays, so the ordering is part of the storage contract. Construction
/// goes through [`LngLat::new`] or the geocoder adapter; nothing else
/// reorders components.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LngLat([f64; 2]);

impl LngLat {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self([lng, lat])
    }

    pub fn lng(&self) -> f64 {
        self.0[0]
    }

    pub fn lat(&self) -> f64 {
        self.0[1]
    }

    pub fn to_point(&self) -> Point<f64> {
        Point::new(self.0[0], self.0[1])
    }
}

impl From<LngLat> for [f64; 2] {
    fn from(value: LngLat) -> Self {
        value.0
    }
}
