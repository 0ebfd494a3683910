// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Persistence contract for users and regions.

use crate::error::AppError;
use crate::models::{LngLat, Region, User};
use async_trait::async_trait;

/// Document storage operations the engine and query service rely on.
///
/// `regions` membership changes are atomic set/pull operations on the user
/// document, not read-modify-write cycles, so concurrent saves cannot
/// clobber each other's membership updates.
#[async_trait]
pub trait GeoStore: Send + Sync {
    // ─── Users ───────────────────────────────────────────────────

    async fn get_user(&self, id: &str) -> Result<Option<User>, AppError>;

    /// List users ordered by creation time, newest first.
    async fn list_users(&self, limit: u32, offset: u32) -> Result<Vec<User>, AppError>;

    async fn count_users(&self) -> Result<u32, AppError>;

    /// Create or fully replace a user document.
    async fn put_user(&self, user: &User) -> Result<(), AppError>;

    async fn delete_user(&self, id: &str) -> Result<(), AppError>;

    /// Overwrite only a user's `coordinates` and `address`.
    async fn set_user_location(
        &self,
        id: &str,
        coordinates: LngLat,
        address: &str,
    ) -> Result<(), AppError>;

    /// Atomically add a region id to a user's `regions` (no-op if present).
    async fn add_region_to_user(&self, user_id: &str, region_id: &str) -> Result<(), AppError>;

    /// Atomically remove a region id from a user's `regions`.
    async fn remove_region_from_user(&self, user_id: &str, region_id: &str)
        -> Result<(), AppError>;

    // ─── Regions ─────────────────────────────────────────────────

    async fn get_region(&self, id: &str) -> Result<Option<Region>, AppError>;

    /// Create or fully replace a region document.
    async fn put_region(&self, region: &Region) -> Result<(), AppError>;

    async fn delete_region(&self, id: &str) -> Result<(), AppError>;

    /// Find a region whose center exactly equals `coordinates`.
    async fn find_region_by_coordinates(
        &self,
        coordinates: LngLat,
    ) -> Result<Option<Region>, AppError>;

    /// Overwrite `coordinates` and `address` on every listed region.
    /// Boundaries are not touched.
    async fn update_regions_location(
        &self,
        region_ids: &[String],
        coordinates: LngLat,
        address: &str,
    ) -> Result<(), AppError>;

    /// Clear the owner reference on every region owned by `user_id`.
    async fn clear_region_owner(&self, user_id: &str) -> Result<(), AppError>;

    /// Fetch regions, optionally restricted to one owner. Geometric
    /// filtering happens in the query service, not here.
    async fn regions_for_owner(&self, user_id: Option<&str>) -> Result<Vec<Region>, AppError>;
}
