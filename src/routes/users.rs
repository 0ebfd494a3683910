// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User CRUD routes.

use crate::error::Result;
use crate::models::{LngLat, User};
use crate::services::{NewUser, UserPatch};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

const MAX_PAGE_SIZE: u32 = 100;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
}

/// User representation returned by the API.
#[derive(Serialize)]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub address: Option<String>,
    pub coordinates: Option<LngLat>,
    pub regions: Vec<String>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            address: user.address,
            coordinates: user.coordinates,
            regions: user.regions,
        }
    }
}

// ─── List / Get ──────────────────────────────────────────────

#[derive(Deserialize)]
struct ListQuery {
    #[serde(default = "default_page")]
    page: u32,
    #[serde(default = "default_limit")]
    limit: u32,
}

fn default_page() -> u32 {
    1
}
fn default_limit() -> u32 {
    20
}

#[derive(Serialize)]
pub struct UserListResponse {
    pub rows: Vec<UserResponse>,
    pub page: u32,
    pub limit: u32,
    pub total: u32,
}

async fn list_users(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListQuery>,
) -> Result<Json<UserListResponse>> {
    if params.page < 1 {
        return Err(crate::error::AppError::Validation(
            "page must be greater than 0".to_string(),
        ));
    }

    let limit = params.limit.min(MAX_PAGE_SIZE).max(1);
    let offset = (params.page - 1).saturating_mul(limit);

    let (rows, total) = tokio::try_join!(
        state.store.list_users(limit, offset),
        state.store.count_users(),
    )?;

    Ok(Json(UserListResponse {
        rows: rows.into_iter().map(UserResponse::from).collect(),
        page: params.page,
        limit,
        total,
    }))
}

async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>> {
    let user = state
        .store
        .get_user(&id)
        .await?
        .ok_or_else(|| crate::error::AppError::NotFound(format!("User {} not found", id)))?;

    Ok(Json(UserResponse::from(user)))
}

// ─── Create ──────────────────────────────────────────────────

#[derive(Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    pub address: Option<String>,
    pub coordinates: Option<LngLat>,
}

async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>)> {
    payload
        .validate()
        .map_err(|e| crate::error::AppError::Validation(e.to_string()))?;

    let user = state
        .engine
        .create_user(NewUser {
            name: payload.name,
            email: payload.email,
            address: payload.address,
            coordinates: payload.coordinates,
        })
        .await?;

    tracing::info!(user_id = %user.id, "User created");
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

// ─── Update ──────────────────────────────────────────────────

#[derive(Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 120))]
    pub name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub address: Option<String>,
    pub coordinates: Option<LngLat>,
}

async fn update_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>> {
    payload
        .validate()
        .map_err(|e| crate::error::AppError::Validation(e.to_string()))?;

    let user = state
        .engine
        .update_user(
            &id,
            UserPatch {
                name: payload.name,
                email: payload.email,
                address: payload.address,
                coordinates: payload.coordinates,
            },
        )
        .await?;

    Ok(Json(UserResponse::from(user)))
}

// ─── Delete ──────────────────────────────────────────────────

#[derive(Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
}

async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>> {
    state.engine.delete_user(&id).await?;

    Ok(Json(DeleteResponse {
        success: true,
        message: "User successfully deleted".to_string(),
    }))
}
