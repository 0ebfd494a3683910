//! Application configuration loaded from environment variables.
//!
//! The geometry constants are deliberately not configurable: region
//! boundaries and search cutoffs must be identical across all instances
//! writing to the same collections.

use std::env;

/// Radius in meters of the circle a region boundary approximates.
pub const BOUNDARY_RADIUS_METERS: f64 = 1000.0;

/// Number of polygon sides used to approximate the boundary circle.
pub const BOUNDARY_SIDES: u32 = 12;

/// Cutoff for nearby-region queries when the caller supplies no distance.
pub const DEFAULT_SEARCH_DISTANCE_METERS: f64 = 10_000.0;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Google Geocoding API key
    pub geocoding_api_key: String,
    /// Frontend URL for CORS
    pub frontend_url: String,
    /// GCP project ID (Firestore)
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            geocoding_api_key: env::var("GOOGLE_GEOCODING_API_KEY")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("GOOGLE_GEOCODING_API_KEY"))?,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
        })
    }

    /// Default config for tests; no real upstream credentials.
    pub fn test_default() -> Self {
        Self {
            geocoding_api_key: "test_api_key".to_string(),
            frontend_url: "http://localhost:5173".to_string(),
            gcp_project_id: "test-project".to_string(),
            port: 8080,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}
