// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod category;
pub mod snapshot;
pub mod sync;

pub use category::{Category, MergeStrategy};
pub use snapshot::{
    HistorySession, Identified, Profile, ProfileDetails, Snapshot, WeightEntry, WorkoutPlan,
    DEFAULT_PROFILE_ID,
};
pub use sync::{CategoryData, PullResponse, PushRequest, PushResponse};
