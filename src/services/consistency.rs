// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Save-time consistency engine for users and regions.
//!
//! Every operation runs in two phases: derive and validate first (geocoding
//! included, no writes), then the primary document write, then explicit
//! compensating writes to the paired entity. A failed compensating write
//! surfaces as [`AppError::Inconsistent`] so a caller or retry layer can
//! reconcile; it is never folded into a success response.

use crate::config::{BOUNDARY_RADIUS_METERS, BOUNDARY_SIDES};
use crate::db::GeoStore;
use crate::error::{AppError, Result};
use crate::models::{LngLat, Region, User};
use crate::services::boundary::boundary_geometry;
use crate::services::geocode::Geocoder;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

/// Fixed footprint parameters for region boundaries.
#[derive(Debug, Clone, Copy)]
pub struct BoundarySpec {
    pub radius_m: f64,
    pub sides: u32,
}

impl Default for BoundarySpec {
    fn default() -> Self {
        Self {
            radius_m: BOUNDARY_RADIUS_METERS,
            sides: BOUNDARY_SIDES,
        }
    }
}

/// Caller-supplied fields for creating a user.
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub address: Option<String>,
    pub coordinates: Option<LngLat>,
}

/// Caller-supplied fields for updating a user. Absent fields are left
/// unchanged.
#[derive(Default)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub coordinates: Option<LngLat>,
}

/// Caller-supplied fields for creating a region.
pub struct NewRegion {
    pub name: String,
    pub coordinates: LngLat,
    pub user: Option<String>,
}

/// Caller-supplied fields for updating a region.
#[derive(Default)]
pub struct RegionPatch {
    pub name: Option<String>,
    pub coordinates: Option<LngLat>,
}

/// Entity-save interceptor keeping users and regions geographically
/// consistent.
#[derive(Clone)]
pub struct ConsistencyEngine {
    store: Arc<dyn GeoStore>,
    geocoder: Arc<dyn Geocoder>,
    boundary: BoundarySpec,
}

impl ConsistencyEngine {
    pub fn new(store: Arc<dyn GeoStore>, geocoder: Arc<dyn Geocoder>) -> Self {
        Self {
            store,
            geocoder,
            boundary: BoundarySpec::default(),
        }
    }

    // ─── Users ───────────────────────────────────────────────────

    /// Create a user from exactly one of address / coordinates, deriving
    /// the other, and link a first-party region for the resolved point.
    pub async fn create_user(&self, new_user: NewUser) -> Result<User> {
        let (address, coordinates) = self
            .resolve_location(new_user.address, new_user.coordinates)
            .await?;

        let now = Utc::now();
        let mut user = User {
            id: Uuid::new_v4().to_string(),
            name: new_user.name,
            email: new_user.email,
            address: Some(address),
            coordinates: Some(coordinates),
            regions: Vec::new(),
            created_at: now,
            updated_at: now,
        };

        // A region for the exact resolved point is reused; otherwise a
        // first-party region is created for the new user. Direct region
        // creation rejects exact duplicates, this path deliberately does
        // not.
        let existing = self.store.find_region_by_coordinates(coordinates).await?;
        let first_party = match &existing {
            Some(region) => {
                user.regions.push(region.id.clone());
                None
            }
            None => {
                // The region derives its own address for the center point,
                // like any other region save.
                let region_address = self
                    .geocoder
                    .resolve_address(coordinates.lng(), coordinates.lat())
                    .await?;
                let region = Region {
                    id: Uuid::new_v4().to_string(),
                    name: format!("{}'s Region", user.name),
                    coordinates,
                    address: Some(region_address),
                    user: Some(user.id.clone()),
                    boundary: Some(boundary_geometry(
                        coordinates,
                        self.boundary.radius_m,
                        self.boundary.sides,
                    )),
                    created_at: now,
                    updated_at: now,
                };
                user.regions.push(region.id.clone());
                Some(region)
            }
        };

        self.store.put_user(&user).await?;

        if let Some(region) = first_party {
            self.store
                .put_region(&region)
                .await
                .map_err(|e| AppError::inconsistent("user create", "first region create", e))?;
            tracing::info!(user_id = %user.id, region_id = %region.id, "Created first-party region");
        } else if let Some(region) = existing {
            tracing::debug!(user_id = %user.id, region_id = %region.id, "Reused region at same point");
        }

        Ok(user)
    }

    /// Update a user; a location change propagates to every linked region.
    pub async fn update_user(&self, id: &str, patch: UserPatch) -> Result<User> {
        let mut user = self
            .store
            .get_user(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))?;

        if patch.address.is_some() && patch.coordinates.is_some() {
            return Err(AppError::Validation(
                "only one of address or coordinates may be supplied".to_string(),
            ));
        }

        if let Some(name) = patch.name {
            user.name = name;
        }
        if let Some(email) = patch.email {
            user.email = email;
        }

        let moved = match (patch.coordinates, patch.address) {
            (Some(coordinates), None) => {
                let address = self
                    .geocoder
                    .resolve_address(coordinates.lng(), coordinates.lat())
                    .await?;
                Some((coordinates, address))
            }
            (None, Some(address)) => {
                let coordinates = self.geocoder.resolve_coordinates(&address).await?;
                Some((coordinates, address))
            }
            _ => None,
        };

        if let Some((coordinates, address)) = &moved {
            user.coordinates = Some(*coordinates);
            user.address = Some(address.clone());
        }

        user.updated_at = Utc::now();
        self.store.put_user(&user).await?;

        if let Some((coordinates, address)) = moved {
            if !user.regions.is_empty() {
                // The bulk propagation rewrites coordinates and address
                // only. Boundaries stay as previously computed and are
                // refreshed only when a region is edited directly.
                self.store
                    .update_regions_location(&user.regions, coordinates, &address)
                    .await
                    .map_err(|e| AppError::inconsistent("user update", "region propagation", e))?;

                tracing::info!(
                    user_id = %user.id,
                    regions = user.regions.len(),
                    "Propagated user location to linked regions"
                );
            }
        }

        Ok(user)
    }

    /// Delete a user; regions keep existing but lose their owner link.
    pub async fn delete_user(&self, id: &str) -> Result<()> {
        if self.store.get_user(id).await?.is_none() {
            return Err(AppError::NotFound(format!("User {} not found", id)));
        }

        self.store.delete_user(id).await?;

        self.store
            .clear_region_owner(id)
            .await
            .map_err(|e| AppError::inconsistent("user delete", "owner clearing", e))?;

        tracing::info!(user_id = id, "User deleted, region owner links cleared");
        Ok(())
    }

    // ─── Regions ─────────────────────────────────────────────────

    /// Create a region: derive its address, compute its boundary, and join
    /// the owner's region list.
    pub async fn create_region(&self, new_region: NewRegion) -> Result<Region> {
        let owner_id = new_region.user.ok_or_else(|| {
            AppError::Validation("user reference required".to_string())
        })?;

        // Every new region joins its owner's list immediately, so the
        // owner has to exist before anything is written.
        let owner = self
            .store
            .get_user(&owner_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", owner_id)))?;

        let coordinates = new_region.coordinates;
        let address = self
            .geocoder
            .resolve_address(coordinates.lng(), coordinates.lat())
            .await?;

        let now = Utc::now();
        let region = Region {
            id: Uuid::new_v4().to_string(),
            name: new_region.name,
            coordinates,
            address: Some(address),
            user: Some(owner_id.clone()),
            boundary: Some(boundary_geometry(
                coordinates,
                self.boundary.radius_m,
                self.boundary.sides,
            )),
            created_at: now,
            updated_at: now,
        };

        self.store.put_region(&region).await?;

        if !owner.regions.iter().any(|id| *id == region.id) {
            self.store
                .add_region_to_user(&owner_id, &region.id)
                .await
                .map_err(|e| AppError::inconsistent("region create", "owner membership", e))?;
        }

        tracing::info!(region_id = %region.id, user_id = %owner_id, "Region created");
        Ok(region)
    }

    /// Update a region; a coordinate change re-derives the address,
    /// recomputes the boundary, and pushes the new location to the owner.
    pub async fn update_region(&self, id: &str, patch: RegionPatch) -> Result<Region> {
        let mut region = self
            .store
            .get_region(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Region {} not found", id)))?;

        if let Some(name) = patch.name {
            region.name = name;
        }

        let moved = patch.coordinates;
        let owner_id = if moved.is_some() {
            // The owner push below must be possible before the region write
            // commits anything.
            let owner_id = region.user.clone().ok_or_else(|| {
                AppError::Validation("user reference required".to_string())
            })?;
            if self.store.get_user(&owner_id).await?.is_none() {
                return Err(AppError::Validation(
                    "associated user not found".to_string(),
                ));
            }
            Some(owner_id)
        } else {
            None
        };

        let pushed_address = if let Some(coordinates) = moved {
            let address = self
                .geocoder
                .resolve_address(coordinates.lng(), coordinates.lat())
                .await?;
            region.coordinates = coordinates;
            region.address = Some(address.clone());
            region.boundary = Some(boundary_geometry(
                coordinates,
                self.boundary.radius_m,
                self.boundary.sides,
            ));
            Some(address)
        } else {
            None
        };

        region.updated_at = Utc::now();
        self.store.put_region(&region).await?;

        if let (Some(owner_id), Some(address), Some(coordinates)) =
            (owner_id, pushed_address, moved)
        {
            self.store
                .set_user_location(&owner_id, coordinates, &address)
                .await
                .map_err(|e| AppError::inconsistent("region update", "owner location push", e))?;

            tracing::info!(
                region_id = %region.id,
                user_id = %owner_id,
                "Pushed region coordinates to owner"
            );
        }

        Ok(region)
    }

    /// Delete a region and pull its id out of the owner's region list.
    pub async fn delete_region(&self, id: &str) -> Result<()> {
        let region = self
            .store
            .get_region(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Region {} not found", id)))?;

        self.store.delete_region(id).await?;

        if let Some(owner_id) = region.user {
            self.store
                .remove_region_from_user(&owner_id, id)
                .await
                .map_err(|e| AppError::inconsistent("region delete", "owner membership", e))?;
        }

        tracing::info!(region_id = id, "Region deleted");
        Ok(())
    }

    // ─── Helpers ─────────────────────────────────────────────────

    /// Enforce the exactly-one rule and derive the missing half.
    async fn resolve_location(
        &self,
        address: Option<String>,
        coordinates: Option<LngLat>,
    ) -> Result<(String, LngLat)> {
        match (address, coordinates) {
            (Some(_), Some(_)) => Err(AppError::Validation(
                "only one of address or coordinates may be supplied".to_string(),
            )),
            (None, None) => Err(AppError::Validation(
                "address or coordinates required".to_string(),
            )),
            (None, Some(coordinates)) => {
                let address = self
                    .geocoder
                    .resolve_address(coordinates.lng(), coordinates.lat())
                    .await?;
                Ok((address, coordinates))
            }
            (Some(address), None) => {
                let coordinates = self.geocoder.resolve_coordinates(&address).await?;
                Ok((address, coordinates))
            }
        }
    }
}
