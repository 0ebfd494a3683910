// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Region Atlas API Server
//!
//! Keeps user and region location data mutually consistent and serves
//! geospatial region queries.

use region_atlas::{
    config::Config, db::FirestoreDb, services::GoogleGeocoder, AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Region Atlas API");

    // Initialize Firestore database
    let store = FirestoreDb::new(&config.gcp_project_id)
        .await
        .expect("Failed to connect to Firestore");

    // Initialize the geocoding adapter
    let geocoder = GoogleGeocoder::new(config.geocoding_api_key.clone());
    tracing::info!("Geocoding adapter initialized");

    // Build shared state
    let state = Arc::new(AppState::new(
        config.clone(),
        Arc::new(store),
        Arc::new(geocoder),
    ));

    // Build router
    let app = region_atlas::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("region_atlas=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
