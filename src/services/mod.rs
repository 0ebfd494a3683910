// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod boundary;
pub mod consistency;
pub mod geocode;
pub mod query;

pub use consistency::{BoundarySpec, ConsistencyEngine, NewRegion, NewUser, RegionPatch, UserPatch};
pub use geocode::{GeocodeError, Geocoder, GoogleGeocoder};
pub use query::{GeoQueryService, PointInput};
