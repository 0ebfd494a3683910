// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore implementation of the [`GeoStore`] contract.
//!
//! Documents are stored as plain serde maps; the `regions` membership on
//! user documents is maintained with field transforms (array-union /
//! array-remove) so concurrent membership changes merge instead of
//! clobbering each other.

use crate::db::{collections, GeoStore};
use crate::error::AppError;
use crate::models::{LngLat, Region, User};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::{stream, StreamExt};
use serde::{Deserialize, Serialize};

const MAX_CONCURRENT_DB_OPS: usize = 50;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

/// Partial update applied to either collection when only the location
/// fields move.
#[derive(Serialize, Deserialize)]
struct LocationPatch {
    coordinates: LngLat,
    address: String,
    updated_at: DateTime<Utc>,
}

const LOCATION_PATCH_FIELDS: [&str; 3] = ["coordinates", "address", "updated_at"];

/// Partial update clearing a region's owner reference.
#[derive(Serialize, Deserialize)]
struct OwnerPatch {
    user: Option<String>,
    updated_at: DateTime<Utc>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated
        // connection to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    /// Apply a location patch to one document in `collection`.
    async fn patch_location(
        &self,
        collection: &str,
        document_id: &str,
        coordinates: LngLat,
        address: &str,
    ) -> Result<(), AppError> {
        let patch = LocationPatch {
            coordinates,
            address: address.to_string(),
            updated_at: Utc::now(),
        };

        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .fields(LOCATION_PATCH_FIELDS)
            .in_col(collection)
            .document_id(document_id)
            .object(&patch)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl GeoStore for FirestoreDb {
    // ─── Users ───────────────────────────────────────────────────

    async fn get_user(&self, id: &str) -> Result<Option<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn list_users(&self, limit: u32, offset: u32) -> Result<Vec<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .order_by([(
                "created_at",
                firestore::FirestoreQueryDirection::Descending,
            )])
            .limit(limit)
            .offset(offset)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn count_users(&self) -> Result<u32, AppError> {
        // No cheap server-side count through this client; the users
        // collection stays small enough to page through in one read.
        let users: Vec<User> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::USERS)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(users.len() as u32)
    }

    async fn put_user(&self, user: &User) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&user.id)
            .object(user)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    async fn delete_user(&self, id: &str) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::USERS)
            .document_id(id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    async fn set_user_location(
        &self,
        id: &str,
        coordinates: LngLat,
        address: &str,
    ) -> Result<(), AppError> {
        self.patch_location(collections::USERS, id, coordinates, address)
            .await
    }

    async fn add_region_to_user(&self, user_id: &str, region_id: &str) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(user_id)
            .transforms(|t| {
                t.fields([t
                    .field("regions")
                    .append_missing_elements([region_id.to_string()])])
            })
            .only_transform()
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    async fn remove_region_from_user(
        &self,
        user_id: &str,
        region_id: &str,
    ) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(user_id)
            .transforms(|t| {
                t.fields([t
                    .field("regions")
                    .remove_all_from_array([region_id.to_string()])])
            })
            .only_transform()
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Regions ─────────────────────────────────────────────────

    async fn get_region(&self, id: &str) -> Result<Option<Region>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::REGIONS)
            .obj()
            .one(id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn put_region(&self, region: &Region) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::REGIONS)
            .document_id(&region.id)
            .object(region)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    async fn delete_region(&self, id: &str) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::REGIONS)
            .document_id(id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    async fn find_region_by_coordinates(
        &self,
        coordinates: LngLat,
    ) -> Result<Option<Region>, AppError> {
        let mut matches: Vec<Region> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::REGIONS)
            .filter(move |q| q.field("coordinates").eq(coordinates))
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(matches.pop())
    }

    async fn update_regions_location(
        &self,
        region_ids: &[String],
        coordinates: LngLat,
        address: &str,
    ) -> Result<(), AppError> {
        // Concurrent writes with a limit, as elsewhere in this module.
        stream::iter(region_ids.to_vec())
            .map(|region_id| async move {
                self.patch_location(collections::REGIONS, &region_id, coordinates, address)
                    .await
            })
            .buffer_unordered(MAX_CONCURRENT_DB_OPS)
            .collect::<Vec<Result<(), AppError>>>()
            .await
            .into_iter()
            .collect::<Result<Vec<()>, AppError>>()?;

        Ok(())
    }

    async fn clear_region_owner(&self, user_id: &str) -> Result<(), AppError> {
        let owned: Vec<Region> = self.regions_for_owner(Some(user_id)).await?;

        stream::iter(owned)
            .map(|region| async move {
                let patch = OwnerPatch {
                    user: None,
                    updated_at: Utc::now(),
                };

                let _: () = self
                    .get_client()?
                    .fluent()
                    .update()
                    .fields(["user", "updated_at"])
                    .in_col(collections::REGIONS)
                    .document_id(&region.id)
                    .object(&patch)
                    .execute()
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;

                Ok::<_, AppError>(())
            })
            .buffer_unordered(MAX_CONCURRENT_DB_OPS)
            .collect::<Vec<Result<(), AppError>>>()
            .await
            .into_iter()
            .collect::<Result<Vec<()>, AppError>>()?;

        tracing::debug!(user_id, "Cleared owner reference on regions");
        Ok(())
    }

    async fn regions_for_owner(&self, user_id: Option<&str>) -> Result<Vec<Region>, AppError> {
        let query = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::REGIONS);

        let query = if let Some(user_id) = user_id {
            let user_id = user_id.to_string();
            query.filter(move |q| q.field("user").eq(user_id.clone()))
        } else {
            query
        };

        query
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
