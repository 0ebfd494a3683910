// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Lifecycle tests for the consistency engine: location derivation, region
//! linkage, propagation, and cross-entity cleanup.

mod common;

use common::{FailingGeocoder, StubGeocoder};
use region_atlas::error::AppError;
use region_atlas::models::LngLat;
use region_atlas::services::{NewRegion, NewUser, RegionPatch, UserPatch};
use std::sync::Arc;

fn new_user(address: Option<&str>, coordinates: Option<LngLat>) -> NewUser {
    NewUser {
        name: "Sherlock".to_string(),
        email: "sherlock@bakerst.example".to_string(),
        address: address.map(str::to_string),
        coordinates,
    }
}

/// Number of points in a stored boundary ring.
fn ring_len(region: &region_atlas::models::Region) -> usize {
    match &region.boundary.as_ref().expect("boundary missing").value {
        geojson::Value::Polygon(rings) => rings[0].len(),
        other => panic!("expected polygon boundary, got {:?}", other),
    }
}

#[tokio::test]
async fn test_create_user_with_address_links_first_party_region() {
    let (store, state) = common::test_state(Arc::new(StubGeocoder::baker_street()));

    let user = state
        .engine
        .create_user(new_user(Some("221B Baker Street"), None))
        .await
        .expect("user create should succeed");

    assert_eq!(user.coordinates, Some(LngLat::new(-0.1586, 51.5237)));
    assert_eq!(user.address.as_deref(), Some("221B Baker Street"));
    assert_eq!(user.regions.len(), 1);

    let region = state
        .store
        .get_region(&user.regions[0])
        .await
        .unwrap()
        .expect("first-party region should exist");

    assert_eq!(region.name, "Sherlock's Region");
    assert_eq!(region.coordinates, LngLat::new(-0.1586, 51.5237));
    assert_eq!(region.user.as_deref(), Some(user.id.as_str()));
    // Closed ring over the configured 12 sides
    assert_eq!(ring_len(&region), 13);

    assert_eq!(store.user_count(), 1);
    assert_eq!(store.region_count(), 1);
}

#[tokio::test]
async fn test_create_user_with_coordinates_derives_address() {
    let stub = StubGeocoder::baker_street();
    let expected_address = stub.address.clone();
    let (_store, state) = common::test_state(Arc::new(stub));

    let user = state
        .engine
        .create_user(new_user(None, Some(LngLat::new(-0.1586, 51.5237))))
        .await
        .expect("user create should succeed");

    assert_eq!(user.address, Some(expected_address));
    assert_eq!(user.coordinates, Some(LngLat::new(-0.1586, 51.5237)));
}

#[tokio::test]
async fn test_create_user_requires_exactly_one_location() {
    let (store, state) = common::test_state(Arc::new(StubGeocoder::baker_street()));

    let both = state
        .engine
        .create_user(new_user(
            Some("221B Baker Street"),
            Some(LngLat::new(-0.1586, 51.5237)),
        ))
        .await;
    assert!(matches!(both, Err(AppError::Validation(_))));

    let neither = state.engine.create_user(new_user(None, None)).await;
    assert!(matches!(neither, Err(AppError::Validation(_))));

    assert_eq!(store.user_count(), 0);
    assert_eq!(store.region_count(), 0);
}

#[tokio::test]
async fn test_geocode_failure_aborts_save_before_any_write() {
    let (store, state) = common::test_state(Arc::new(FailingGeocoder));

    let result = state
        .engine
        .create_user(new_user(Some("nowhere at all"), None))
        .await;

    assert!(matches!(result, Err(AppError::GeocodeFailure(_))));
    assert_eq!(store.user_count(), 0);
    assert_eq!(store.region_count(), 0);
}

#[tokio::test]
async fn test_second_user_at_same_point_reuses_region() {
    let (store, state) = common::test_state(Arc::new(StubGeocoder::baker_street()));

    let first = state
        .engine
        .create_user(new_user(Some("221B Baker Street"), None))
        .await
        .unwrap();

    let second = state
        .engine
        .create_user(NewUser {
            name: "John".to_string(),
            email: "john@bakerst.example".to_string(),
            address: Some("221B Baker Street".to_string()),
            coordinates: None,
        })
        .await
        .unwrap();

    // Same region id linked, no new region created, ownership untouched.
    assert_eq!(second.regions, first.regions);
    assert_eq!(store.region_count(), 1);

    let region = state
        .store
        .get_region(&first.regions[0])
        .await
        .unwrap()
        .unwrap();
    assert_eq!(region.user.as_deref(), Some(first.id.as_str()));
}

#[tokio::test]
async fn test_user_move_propagates_to_linked_regions() {
    let stub = StubGeocoder::baker_street();
    let propagated_address = stub.address.clone();
    let (_store, state) = common::test_state(Arc::new(stub));

    let user = state
        .engine
        .create_user(new_user(Some("221B Baker Street"), None))
        .await
        .unwrap();

    let updated = state
        .engine
        .update_user(
            &user.id,
            UserPatch {
                coordinates: Some(LngLat::new(10.0, 20.0)),
                ..Default::default()
            },
        )
        .await
        .expect("update should succeed");

    assert_eq!(updated.coordinates, Some(LngLat::new(10.0, 20.0)));

    for region_id in &updated.regions {
        let region = state.store.get_region(region_id).await.unwrap().unwrap();
        assert_eq!(region.coordinates, LngLat::new(10.0, 20.0));
        assert_eq!(region.address.as_deref(), Some(propagated_address.as_str()));
    }
}

#[tokio::test]
async fn test_user_move_leaves_region_boundaries_stale() {
    // Propagation rewrites region coordinates and address only; the
    // boundary keeps describing the old footprint until the region itself
    // is edited.
    let (_store, state) = common::test_state(Arc::new(StubGeocoder::baker_street()));

    let user = state
        .engine
        .create_user(new_user(Some("221B Baker Street"), None))
        .await
        .unwrap();

    let region_id = user.regions[0].clone();
    let before = state
        .store
        .get_region(&region_id)
        .await
        .unwrap()
        .unwrap()
        .boundary;

    state
        .engine
        .update_user(
            &user.id,
            UserPatch {
                coordinates: Some(LngLat::new(10.0, 20.0)),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let after = state
        .store
        .get_region(&region_id)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(after.coordinates, LngLat::new(10.0, 20.0));
    assert_eq!(after.boundary, before, "boundary must not be recomputed");
}

#[tokio::test]
async fn test_update_user_rejects_both_location_fields() {
    let (_store, state) = common::test_state(Arc::new(StubGeocoder::baker_street()));

    let user = state
        .engine
        .create_user(new_user(Some("221B Baker Street"), None))
        .await
        .unwrap();

    let result = state
        .engine
        .update_user(
            &user.id,
            UserPatch {
                address: Some("somewhere else".to_string()),
                coordinates: Some(LngLat::new(1.0, 1.0)),
                ..Default::default()
            },
        )
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_region_move_pushes_location_to_owner_and_recomputes_boundary() {
    let (_store, state) = common::test_state(Arc::new(StubGeocoder::baker_street()));

    let user = state
        .engine
        .create_user(new_user(Some("221B Baker Street"), None))
        .await
        .unwrap();
    let region_id = user.regions[0].clone();

    let before = state
        .store
        .get_region(&region_id)
        .await
        .unwrap()
        .unwrap()
        .boundary;

    let region = state
        .engine
        .update_region(
            &region_id,
            RegionPatch {
                coordinates: Some(LngLat::new(2.3522, 48.8566)),
                ..Default::default()
            },
        )
        .await
        .expect("region update should succeed");

    assert_eq!(region.coordinates, LngLat::new(2.3522, 48.8566));
    assert_ne!(region.boundary, before, "boundary must follow the center");

    let owner = state.store.get_user(&user.id).await.unwrap().unwrap();
    assert_eq!(owner.coordinates, Some(LngLat::new(2.3522, 48.8566)));
}

#[tokio::test]
async fn test_delete_region_pulls_id_from_owner() {
    let (store, state) = common::test_state(Arc::new(StubGeocoder::baker_street()));

    let user = state
        .engine
        .create_user(new_user(Some("221B Baker Street"), None))
        .await
        .unwrap();
    let region_id = user.regions[0].clone();

    state.engine.delete_region(&region_id).await.unwrap();

    let owner = state.store.get_user(&user.id).await.unwrap().unwrap();
    assert!(owner.regions.is_empty());
    assert_eq!(store.region_count(), 0);
}

#[tokio::test]
async fn test_delete_user_clears_owner_link_without_cascade() {
    let (store, state) = common::test_state(Arc::new(StubGeocoder::baker_street()));

    let user = state
        .engine
        .create_user(new_user(Some("221B Baker Street"), None))
        .await
        .unwrap();
    let region_id = user.regions[0].clone();

    state.engine.delete_user(&user.id).await.unwrap();

    assert_eq!(store.user_count(), 0);

    // The region survives, only the back-reference is gone.
    let region = state.store.get_region(&region_id).await.unwrap().unwrap();
    assert_eq!(region.user, None);
}

#[tokio::test]
async fn test_unowned_region_rejects_coordinate_update() {
    let (_store, state) = common::test_state(Arc::new(StubGeocoder::baker_street()));

    let user = state
        .engine
        .create_user(new_user(Some("221B Baker Street"), None))
        .await
        .unwrap();
    let region_id = user.regions[0].clone();

    state.engine.delete_user(&user.id).await.unwrap();

    let result = state
        .engine
        .update_region(
            &region_id,
            RegionPatch {
                coordinates: Some(LngLat::new(1.0, 1.0)),
                ..Default::default()
            },
        )
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_create_region_requires_user_reference() {
    let (_store, state) = common::test_state(Arc::new(StubGeocoder::baker_street()));

    let result = state
        .engine
        .create_region(NewRegion {
            name: "Orphan".to_string(),
            coordinates: LngLat::new(1.0, 1.0),
            user: None,
        })
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_create_region_with_unknown_owner_fails() {
    let (store, state) = common::test_state(Arc::new(StubGeocoder::baker_street()));

    let result = state
        .engine
        .create_region(NewRegion {
            name: "Ghost-owned".to_string(),
            coordinates: LngLat::new(1.0, 1.0),
            user: Some("no-such-user".to_string()),
        })
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
    assert_eq!(store.region_count(), 0);
}

#[tokio::test]
async fn test_failed_membership_write_surfaces_as_inconsistent() {
    let (store, state) = common::test_state(Arc::new(StubGeocoder::baker_street()));

    let user = state
        .engine
        .create_user(new_user(Some("221B Baker Street"), None))
        .await
        .unwrap();

    store.set_fail_membership_writes(true);

    let result = state
        .engine
        .create_region(NewRegion {
            name: "Annex".to_string(),
            coordinates: LngLat::new(5.0, 5.0),
            user: Some(user.id.clone()),
        })
        .await;

    store.set_fail_membership_writes(false);

    // The primary write landed, the membership write did not, and the
    // result says exactly that instead of claiming success.
    assert!(matches!(result, Err(AppError::Inconsistent { .. })));
    assert_eq!(store.region_count(), 2);

    let owner = state.store.get_user(&user.id).await.unwrap().unwrap();
    assert_eq!(owner.regions.len(), 1);
}
