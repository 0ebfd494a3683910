// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory [`GeoStore`] used by the integration tests.
//!
//! Mirrors the Firestore implementation's semantics closely enough to
//! exercise the consistency engine: membership ops are idempotent, patches
//! touch only location fields, and a fault switch lets tests observe the
//! compensating-write failure path.

use crate::db::GeoStore;
use crate::error::AppError;
use crate::models::{LngLat, Region, User};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};

/// Dashmap-backed store with no persistence.
#[derive(Default)]
pub struct MemoryStore {
    users: DashMap<String, User>,
    regions: DashMap<String, Region>,
    fail_membership_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next membership writes fail, to simulate the paired-entity
    /// write dying after the primary write landed.
    pub fn set_fail_membership_writes(&self, fail: bool) {
        self.fail_membership_writes.store(fail, Ordering::SeqCst);
    }

    fn check_membership_fault(&self) -> Result<(), AppError> {
        if self.fail_membership_writes.load(Ordering::SeqCst) {
            return Err(AppError::Database(
                "injected membership write failure".to_string(),
            ));
        }
        Ok(())
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub fn region_count(&self) -> usize {
        self.regions.len()
    }
}

#[async_trait]
impl GeoStore for MemoryStore {
    // ─── Users ───────────────────────────────────────────────────

    async fn get_user(&self, id: &str) -> Result<Option<User>, AppError> {
        Ok(self.users.get(id).map(|entry| entry.value().clone()))
    }

    async fn list_users(&self, limit: u32, offset: u32) -> Result<Vec<User>, AppError> {
        let mut users: Vec<User> = self.users.iter().map(|entry| entry.value().clone()).collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn count_users(&self) -> Result<u32, AppError> {
        Ok(self.users.len() as u32)
    }

    async fn put_user(&self, user: &User) -> Result<(), AppError> {
        self.users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn delete_user(&self, id: &str) -> Result<(), AppError> {
        self.users.remove(id);
        Ok(())
    }

    async fn set_user_location(
        &self,
        id: &str,
        coordinates: LngLat,
        address: &str,
    ) -> Result<(), AppError> {
        let mut user = self
            .users
            .get_mut(id)
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))?;
        user.coordinates = Some(coordinates);
        user.address = Some(address.to_string());
        user.updated_at = chrono::Utc::now();
        Ok(())
    }

    async fn add_region_to_user(&self, user_id: &str, region_id: &str) -> Result<(), AppError> {
        self.check_membership_fault()?;

        let mut user = self
            .users
            .get_mut(user_id)
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))?;
        if !user.regions.iter().any(|id| id == region_id) {
            user.regions.push(region_id.to_string());
        }
        Ok(())
    }

    async fn remove_region_from_user(
        &self,
        user_id: &str,
        region_id: &str,
    ) -> Result<(), AppError> {
        self.check_membership_fault()?;

        // Owner already gone means the membership is already absent.
        if let Some(mut user) = self.users.get_mut(user_id) {
            user.regions.retain(|id| id != region_id);
        }
        Ok(())
    }

    // ─── Regions ─────────────────────────────────────────────────

    async fn get_region(&self, id: &str) -> Result<Option<Region>, AppError> {
        Ok(self.regions.get(id).map(|entry| entry.value().clone()))
    }

    async fn put_region(&self, region: &Region) -> Result<(), AppError> {
        self.regions.insert(region.id.clone(), region.clone());
        Ok(())
    }

    async fn delete_region(&self, id: &str) -> Result<(), AppError> {
        self.regions.remove(id);
        Ok(())
    }

    async fn find_region_by_coordinates(
        &self,
        coordinates: LngLat,
    ) -> Result<Option<Region>, AppError> {
        Ok(self
            .regions
            .iter()
            .find(|entry| entry.value().coordinates == coordinates)
            .map(|entry| entry.value().clone()))
    }

    async fn update_regions_location(
        &self,
        region_ids: &[String],
        coordinates: LngLat,
        address: &str,
    ) -> Result<(), AppError> {
        for region_id in region_ids {
            if let Some(mut region) = self.regions.get_mut(region_id) {
                region.coordinates = coordinates;
                region.address = Some(address.to_string());
                region.updated_at = chrono::Utc::now();
            }
        }
        Ok(())
    }

    async fn clear_region_owner(&self, user_id: &str) -> Result<(), AppError> {
        for mut region in self.regions.iter_mut() {
            if region.user.as_deref() == Some(user_id) {
                region.user = None;
                region.updated_at = chrono::Utc::now();
            }
        }
        Ok(())
    }

    async fn regions_for_owner(&self, user_id: Option<&str>) -> Result<Vec<Region>, AppError> {
        Ok(self
            .regions
            .iter()
            .filter(|entry| user_id.is_none() || entry.value().user.as_deref() == user_id)
            .map(|entry| entry.value().clone())
            .collect())
    }
}
