// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Geocoding adapter for the Google Geocoding API.
//!
//! All coordinate-order normalization happens here: the upstream speaks
//! `{lat, lng}` objects, storage speaks `[lng, lat]` arrays. Callers only
//! ever see [`LngLat`].

use crate::models::LngLat;
use async_trait::async_trait;
use dashmap::DashMap;
use serde::Deserialize;
use std::sync::Arc;

/// Address/coordinate resolution capability.
///
/// Injected into the consistency engine and the query service so tests can
/// substitute a deterministic stub.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolve a postal address into a `[lng, lat]` pair.
    async fn resolve_coordinates(&self, address: &str) -> Result<LngLat, GeocodeError>;

    /// Resolve a coordinate pair into a postal address.
    async fn resolve_address(&self, lng: f64, lat: f64) -> Result<String, GeocodeError>;
}

/// Errors from geocoding operations.
///
/// `NoResult` and `Upstream` stay distinct so callers can tell "bad input"
/// from "service down"; only the latter is worth retrying. This layer does
/// not retry either.
#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    #[error("no geocoding result: {0}")]
    NoResult(String),

    #[error("geocoding service unreachable: {0}")]
    Upstream(String),
}

impl From<GeocodeError> for crate::error::AppError {
    fn from(err: GeocodeError) -> Self {
        match err {
            GeocodeError::NoResult(msg) => Self::GeocodeFailure(msg),
            GeocodeError::Upstream(msg) => Self::UpstreamUnavailable(msg),
        }
    }
}

/// Google Geocoding API client.
#[derive(Clone)]
pub struct GoogleGeocoder {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    /// Forward-lookup cache. Address strings repeat (users re-submitting
    /// the same payload); reverse lookups effectively never do.
    address_cache: Arc<DashMap<String, LngLat>>,
}

impl GoogleGeocoder {
    pub fn new(api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: "https://maps.googleapis.com/maps/api/geocode/json".to_string(),
            api_key,
            address_cache: Arc::new(DashMap::new()),
        }
    }

    /// Issue a geocode request and parse the envelope.
    async fn lookup(&self, query: &[(&str, &str)]) -> Result<GeocodeResult, GeocodeError> {
        let response = self
            .http
            .get(&self.base_url)
            .query(query)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| GeocodeError::Upstream(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GeocodeError::Upstream(format!("HTTP {}: {}", status, body)));
        }

        let envelope: GeocodeResponse = response
            .json()
            .await
            .map_err(|e| GeocodeError::Upstream(format!("JSON parse error: {}", e)))?;

        if envelope.status != "OK" {
            tracing::debug!(status = %envelope.status, "Geocoder returned no usable result");
            return Err(GeocodeError::NoResult(
                envelope
                    .error_message
                    .unwrap_or_else(|| format!("geocoder status {}", envelope.status)),
            ));
        }

        envelope
            .results
            .into_iter()
            .next()
            .ok_or_else(|| GeocodeError::NoResult("empty result set".to_string()))
    }
}

#[async_trait]
impl Geocoder for GoogleGeocoder {
    async fn resolve_coordinates(&self, address: &str) -> Result<LngLat, GeocodeError> {
        if let Some(cached) = self.address_cache.get(address) {
            return Ok(*cached);
        }

        let result = self.lookup(&[("address", address)]).await?;
        let location = result.geometry.location;
        let coordinates = LngLat::new(location.lng, location.lat);

        self.address_cache.insert(address.to_string(), coordinates);
        Ok(coordinates)
    }

    async fn resolve_address(&self, lng: f64, lat: f64) -> Result<String, GeocodeError> {
        // The upstream wants "lat,lng" here; the stored order is the reverse.
        let latlng = format!("{},{}", lat, lng);
        let result = self.lookup(&[("latlng", latlng.as_str())]).await?;
        Ok(result.formatted_address)
    }
}

/// Geocoding API response envelope.
#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    formatted_address: String,
    geometry: GeocodeGeometry,
}

#[derive(Debug, Deserialize)]
struct GeocodeGeometry {
    location: GeocodeLocation,
}

/// The upstream's native shape; note `lat` comes first.
#[derive(Debug, Deserialize)]
struct GeocodeLocation {
    lat: f64,
    lng: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_parses_ok_response() {
        let json = r#"{
            "status": "OK",
            "results": [{
                "formatted_address": "221B Baker St, London NW1 6XE, UK",
                "geometry": { "location": { "lat": 51.5237, "lng": -0.1586 } }
            }]
        }"#;

        let envelope: GeocodeResponse = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.status, "OK");

        let location = &envelope.results[0].geometry.location;
        assert_eq!(location.lat, 51.5237);
        assert_eq!(location.lng, -0.1586);
    }

    #[test]
    fn test_envelope_parses_zero_results() {
        let json = r#"{ "status": "ZERO_RESULTS", "results": [] }"#;

        let envelope: GeocodeResponse = serde_json::from_str(json).unwrap();
        assert_eq!(envelope.status, "ZERO_RESULTS");
        assert!(envelope.results.is_empty());
        assert!(envelope.error_message.is_none());
    }

    #[test]
    fn test_error_kinds_map_to_distinct_app_errors() {
        use crate::error::AppError;

        let no_result: AppError = GeocodeError::NoResult("nothing".to_string()).into();
        assert!(matches!(no_result, AppError::GeocodeFailure(_)));

        let upstream: AppError = GeocodeError::Upstream("timeout".to_string()).into();
        assert!(matches!(upstream, AppError::UpstreamUnavailable(_)));
    }
}
