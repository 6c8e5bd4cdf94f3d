// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Snapshot model: the complete local copy of one account's data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::models::category::Category;

/// Id of the profile seeded into a brand-new snapshot.
pub const DEFAULT_PROFILE_ID: &str = "default";

/// Entities carrying a stable identity within their collection.
pub trait Identified {
    fn id(&self) -> &str;
}

/// A person training under this account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub theme: String,
    /// Fields this client does not model, kept so pushes don't drop them.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A workout plan owned by one profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutPlan {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub exercises: Vec<Value>,
    /// Derived: latest date among history sessions for this plan
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_performed: Option<DateTime<Utc>>,
    /// Derived: number of history sessions for this plan
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_count: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One logged training session. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistorySession {
    pub id: String,
    pub profile_id: String,
    pub workout_id: String,
    pub date: DateTime<Utc>,
    /// Duration in seconds
    #[serde(default)]
    pub duration: u64,
    #[serde(default)]
    pub exercises: Vec<Value>,
    #[serde(default)]
    pub completed_sets: u32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One body-weight measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightEntry {
    pub id: String,
    pub profile_id: String,
    pub date: DateTime<Utc>,
    pub weight: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

macro_rules! impl_identified {
    ($($ty:ty),*) => {
        $(impl Identified for $ty {
            fn id(&self) -> &str {
                &self.id
            }
        })*
    };
}

impl_identified!(Profile, WorkoutPlan, HistorySession, WeightEntry);

/// Free-form per-profile settings (goals, units, equipment, ...).
pub type ProfileDetails = Map<String, Value>;

/// The full synchronizable document for one account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub profiles: Vec<Profile>,
    /// Workout plans keyed by profile id
    #[serde(default)]
    pub workouts: BTreeMap<String, Vec<WorkoutPlan>>,
    #[serde(default)]
    pub history: Vec<HistorySession>,
    #[serde(default)]
    pub weight_history: Vec<WeightEntry>,
    /// Per-profile details keyed by profile id
    #[serde(default)]
    pub profile_details: BTreeMap<String, ProfileDetails>,
    /// Categories received from the server that this client does not model.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub other_categories: BTreeMap<String, Value>,
}

impl Snapshot {
    /// A fresh snapshot for a first login: one default profile, nothing else.
    pub fn seeded() -> Self {
        Self {
            profiles: vec![Profile {
                id: DEFAULT_PROFILE_ID.to_string(),
                name: "Me".to_string(),
                theme: "default".to_string(),
                extra: Map::new(),
            }],
            ..Self::default()
        }
    }

    /// Serialize each category into its wire payload, keyed by category name.
    pub fn to_categories(&self) -> serde_json::Result<BTreeMap<String, Value>> {
        let mut data = self.other_categories.clone();
        data.insert(
            Category::Profiles.as_str().to_string(),
            serde_json::to_value(&self.profiles)?,
        );
        data.insert(
            Category::Workouts.as_str().to_string(),
            serde_json::to_value(&self.workouts)?,
        );
        data.insert(
            Category::History.as_str().to_string(),
            serde_json::to_value(&self.history)?,
        );
        data.insert(
            Category::WeightHistory.as_str().to_string(),
            serde_json::to_value(&self.weight_history)?,
        );
        data.insert(
            Category::ProfileDetails.as_str().to_string(),
            serde_json::to_value(&self.profile_details)?,
        );
        Ok(data)
    }

    /// Workout plan by profile and plan id.
    pub fn workout(&self, profile_id: &str, workout_id: &str) -> Option<&WorkoutPlan> {
        self.workouts
            .get(profile_id)?
            .iter()
            .find(|w| w.id == workout_id)
    }
}
