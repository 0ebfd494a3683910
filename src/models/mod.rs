// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod location;
pub mod region;
pub mod user;

pub use location::LngLat;
pub use region::Region;
pub use user::User;
