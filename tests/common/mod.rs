// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use region_atlas::config::Config;
use region_atlas::db::MemoryStore;
use region_atlas::models::LngLat;
use region_atlas::routes::create_router;
use region_atlas::services::{GeocodeError, Geocoder};
use region_atlas::AppState;
use std::sync::Arc;

/// Geocoder stub resolving every lookup to one fixed location.
pub struct StubGeocoder {
    pub coordinates: LngLat,
    pub address: String,
}

impl StubGeocoder {
    /// The canonical fixture: 221B Baker Street.
    #[allow(dead_code)]
    pub fn baker_street() -> Self {
        Self {
            coordinates: LngLat::new(-0.1586, 51.5237),
            address: "221B Baker St, London NW1 6XE, UK".to_string(),
        }
    }

    /// Stub anchored at an arbitrary point.
    #[allow(dead_code)]
    pub fn at(lng: f64, lat: f64) -> Self {
        Self {
            coordinates: LngLat::new(lng, lat),
            address: format!("{} Test Street", (lng.abs() + lat.abs()) as i64),
        }
    }
}

#[async_trait]
impl Geocoder for StubGeocoder {
    async fn resolve_coordinates(&self, _address: &str) -> Result<LngLat, GeocodeError> {
        Ok(self.coordinates)
    }

    async fn resolve_address(&self, _lng: f64, _lat: f64) -> Result<String, GeocodeError> {
        Ok(self.address.clone())
    }
}

/// Geocoder stub failing every lookup with a no-result condition.
#[allow(dead_code)]
pub struct FailingGeocoder;

#[async_trait]
impl Geocoder for FailingGeocoder {
    async fn resolve_coordinates(&self, address: &str) -> Result<LngLat, GeocodeError> {
        Err(GeocodeError::NoResult(format!("no match for {}", address)))
    }

    async fn resolve_address(&self, _lng: f64, _lat: f64) -> Result<String, GeocodeError> {
        Err(GeocodeError::NoResult("no match for point".to_string()))
    }
}

/// Build shared state over an in-memory store.
#[allow(dead_code)]
pub fn test_state(geocoder: Arc<dyn Geocoder>) -> (Arc<MemoryStore>, Arc<AppState>) {
    let store = Arc::new(MemoryStore::new());
    let state = Arc::new(AppState::new(
        Config::test_default(),
        store.clone(),
        geocoder,
    ));
    (store, state)
}

/// Create a test app over an in-memory store and the given geocoder.
/// Returns the router, the concrete store for inspection, and the state.
#[allow(dead_code)]
pub fn create_test_app(
    geocoder: Arc<dyn Geocoder>,
) -> (axum::Router, Arc<MemoryStore>, Arc<AppState>) {
    let (store, state) = test_state(geocoder);
    (create_router(state.clone()), store, state)
}
