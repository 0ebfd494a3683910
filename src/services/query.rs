// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Geospatial queries over stored regions.
//!
//! The store hands back candidate rows (optionally filtered by owner); the
//! geometric predicates run here against the `geo` types.

use crate::config::DEFAULT_SEARCH_DISTANCE_METERS;
use crate::db::GeoStore;
use crate::error::{AppError, Result};
use crate::models::{LngLat, Region};
use crate::services::geocode::Geocoder;
use geo::{Distance, Haversine};
use std::sync::Arc;

/// A caller-supplied query location: a free-text address or an explicit
/// `(lng, lat)` pair, never both, never neither.
#[derive(Debug, Default)]
pub struct PointInput {
    pub address: Option<String>,
    pub lng: Option<f64>,
    pub lat: Option<f64>,
}

/// Read-side service answering "which regions cover / are near a point".
#[derive(Clone)]
pub struct GeoQueryService {
    store: Arc<dyn GeoStore>,
    geocoder: Arc<dyn Geocoder>,
}

impl GeoQueryService {
    pub fn new(store: Arc<dyn GeoStore>, geocoder: Arc<dyn Geocoder>) -> Self {
        Self { store, geocoder }
    }

    /// Turn the caller's input into a concrete point.
    pub async fn resolve_point(&self, input: PointInput) -> Result<LngLat> {
        if input.address.is_some() && (input.lng.is_some() || input.lat.is_some()) {
            return Err(AppError::Validation(
                "provide either address or lng/lat, not both".to_string(),
            ));
        }

        if let Some(address) = input.address {
            return Ok(self.geocoder.resolve_coordinates(&address).await?);
        }

        match (input.lng, input.lat) {
            (Some(lng), Some(lat)) => {
                if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
                    return Err(AppError::Validation("longitude out of range".to_string()));
                }
                if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
                    return Err(AppError::Validation("latitude out of range".to_string()));
                }
                Ok(LngLat::new(lng, lat))
            }
            _ => Err(AppError::Validation(
                "address or lng/lat required".to_string(),
            )),
        }
    }

    /// Regions whose boundary polygon contains the query point.
    pub async fn regions_containing(&self, input: PointInput) -> Result<Vec<Region>> {
        let point = self.resolve_point(input).await?.to_point();

        let regions = self.store.regions_for_owner(None).await?;
        let hits: Vec<Region> = regions
            .into_iter()
            .filter(|region| region.contains(&point))
            .collect();

        tracing::debug!(count = hits.len(), "Point containment query");
        Ok(hits)
    }

    /// Regions whose center lies within `distance_m` meters of the query
    /// point, nearest first. `owner` restricts to one user's regions.
    pub async fn regions_near(
        &self,
        input: PointInput,
        distance_m: Option<f64>,
        owner: Option<String>,
    ) -> Result<Vec<Region>> {
        let cutoff = distance_m.unwrap_or(DEFAULT_SEARCH_DISTANCE_METERS);
        if !cutoff.is_finite() || cutoff <= 0.0 {
            return Err(AppError::Validation(
                "distance must be a positive number of meters".to_string(),
            ));
        }

        let center = self.resolve_point(input).await?.to_point();

        let regions = self.store.regions_for_owner(owner.as_deref()).await?;
        let mut hits: Vec<(f64, Region)> = regions
            .into_iter()
            .filter_map(|region| {
                let distance = Haversine.distance(center, region.coordinates.to_point());
                (distance <= cutoff).then_some((distance, region))
            })
            .collect();

        hits.sort_by(|a, b| a.0.total_cmp(&b.0));

        tracing::debug!(count = hits.len(), cutoff_m = cutoff, "Nearby region query");
        Ok(hits.into_iter().map(|(_, region)| region).collect())
    }
}
