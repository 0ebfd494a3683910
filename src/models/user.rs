//! User model for storage and API.

use crate::models::LngLat;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User profile stored in the `users` collection.
///
/// After a save completes, `address` and `coordinates` are both present:
/// the caller supplies one and the geocoder derives the other.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Document id (UUID v4, also used as the owner reference on regions)
    pub id: String,
    pub name: String,
    pub email: String,
    /// Free-text postal address
    pub address: Option<String>,
    /// `[lng, lat]` location
    pub coordinates: Option<LngLat>,
    /// Ids of the regions anchored to this user. Membership is maintained
    /// with atomic array ops, never whole-document rewrites.
    pub regions: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
