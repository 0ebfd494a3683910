// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Region routes: create/update/delete plus the two geospatial queries.

use crate::error::Result;
use crate::models::{LngLat, Region};
use crate::routes::users::DeleteResponse;
use crate::services::{NewRegion, PointInput, RegionPatch};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/regions", post(create_region))
        .route("/regions/{id}", axum::routing::put(update_region).delete(delete_region))
        .route("/regions/point", get(regions_at_point))
        .route("/regions/near", get(regions_near))
}

/// Region representation returned by the API. The boundary polygon is an
/// internal detail and never surfaced.
#[derive(Serialize)]
pub struct RegionResponse {
    pub id: String,
    pub name: String,
    pub coordinates: LngLat,
    pub address: Option<String>,
    pub user: Option<String>,
}

impl From<Region> for RegionResponse {
    fn from(region: Region) -> Self {
        Self {
            id: region.id,
            name: region.name,
            coordinates: region.coordinates,
            address: region.address,
            user: region.user,
        }
    }
}

#[derive(Serialize)]
pub struct RegionListResponse {
    pub rows: Vec<RegionResponse>,
    pub total: u32,
}

impl RegionListResponse {
    fn from_regions(regions: Vec<Region>) -> Self {
        let rows: Vec<RegionResponse> = regions.into_iter().map(RegionResponse::from).collect();
        Self {
            total: rows.len() as u32,
            rows,
        }
    }
}

// ─── Create / Update / Delete ────────────────────────────────

#[derive(Deserialize, Validate)]
pub struct CreateRegionRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    pub coordinates: LngLat,
    pub user: Option<String>,
}

async fn create_region(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateRegionRequest>,
) -> Result<(StatusCode, Json<RegionResponse>)> {
    payload
        .validate()
        .map_err(|e| crate::error::AppError::Validation(e.to_string()))?;

    // Direct creation rejects exact coordinate duplicates. User creation
    // reuses such a region instead; the two paths are intentionally
    // different.
    if state
        .store
        .find_region_by_coordinates(payload.coordinates)
        .await?
        .is_some()
    {
        return Err(crate::error::AppError::Conflict(
            "region coordinates already exist".to_string(),
        ));
    }

    let region = state
        .engine
        .create_region(NewRegion {
            name: payload.name,
            coordinates: payload.coordinates,
            user: payload.user,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(RegionResponse::from(region))))
}

#[derive(Deserialize, Validate)]
pub struct UpdateRegionRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: Option<String>,
    pub coordinates: Option<LngLat>,
}

async fn update_region(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateRegionRequest>,
) -> Result<Json<RegionResponse>> {
    payload
        .validate()
        .map_err(|e| crate::error::AppError::Validation(e.to_string()))?;

    let region = state
        .engine
        .update_region(
            &id,
            RegionPatch {
                name: payload.name,
                coordinates: payload.coordinates,
            },
        )
        .await?;

    Ok(Json(RegionResponse::from(region)))
}

async fn delete_region(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>> {
    state.engine.delete_region(&id).await?;

    Ok(Json(DeleteResponse {
        success: true,
        message: "Region successfully deleted".to_string(),
    }))
}

// ─── Geospatial queries ──────────────────────────────────────

#[derive(Deserialize)]
struct PointQuery {
    address: Option<String>,
    lng: Option<f64>,
    lat: Option<f64>,
}

impl From<PointQuery> for PointInput {
    fn from(query: PointQuery) -> Self {
        PointInput {
            address: query.address,
            lng: query.lng,
            lat: query.lat,
        }
    }
}

/// Regions whose boundary contains the given point.
async fn regions_at_point(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PointQuery>,
) -> Result<Json<RegionListResponse>> {
    let regions = state.queries.regions_containing(params.into()).await?;

    Ok(Json(RegionListResponse::from_regions(regions)))
}

#[derive(Deserialize)]
struct NearQuery {
    address: Option<String>,
    lng: Option<f64>,
    lat: Option<f64>,
    /// Maximum distance in meters
    distance: Option<f64>,
    /// Restrict to regions owned by this user
    user_id: Option<String>,
}

/// Regions within a distance of the given point, nearest first.
async fn regions_near(
    State(state): State<Arc<AppState>>,
    Query(params): Query<NearQuery>,
) -> Result<Json<RegionListResponse>> {
    let input = PointInput {
        address: params.address,
        lng: params.lng,
        lat: params.lat,
    };

    let regions = state
        .queries
        .regions_near(input, params.distance, params.user_id)
        .await?;

    Ok(Json(RegionListResponse::from_regions(regions)))
}
