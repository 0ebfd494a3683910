// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Region Atlas: location-consistent users and regions.
//!
//! This crate keeps two linked document collections geographically
//! consistent — users anchored to a location and named circular regions
//! around a point — and answers point-containment and nearest-within-
//! distance queries over region boundaries.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;

use config::Config;
use db::GeoStore;
use services::{ConsistencyEngine, GeoQueryService, Geocoder};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn GeoStore>,
    pub engine: ConsistencyEngine,
    pub queries: GeoQueryService,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn GeoStore>, geocoder: Arc<dyn Geocoder>) -> Self {
        Self {
            engine: ConsistencyEngine::new(store.clone(), geocoder.clone()),
            queries: GeoQueryService::new(store.clone(), geocoder),
            store,
            config,
        }
    }
}
