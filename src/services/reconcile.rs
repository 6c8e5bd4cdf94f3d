// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Reconciler: merges a local snapshot with the server's categories.
//!
//! Each category is merged on its own according to its
//! [`MergeStrategy`](crate::models::MergeStrategy).
//! Every strategy is idempotent: merging the result with the same remote
//! data again yields the same snapshot, so overlapping or repeated pulls
//! are harmless.
//!
//! Output ordering is deterministic: for identity-keyed lists, remote
//! entries come first in remote order followed by local-only entries in
//! local order (union), or local order followed by remote-only entries
//! (workouts).

use crate::models::category::strategy_for;
use crate::models::{
    Category, CategoryData, HistorySession, Identified, MergeStrategy, Profile, ProfileDetails,
    Snapshot, WeightEntry, WorkoutPlan,
};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};

/// Result of reconciling against a pull.
#[derive(Debug, Clone, PartialEq)]
pub enum ReconcileOutcome {
    /// The server has nothing for this account yet; push local instead.
    Bootstrap,
    Merged(MergeReport),
}

/// Merged snapshot plus what happened along the way.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeReport {
    pub snapshot: Snapshot,
    /// Categories whose remote payload could not be parsed (local kept).
    pub skipped: Vec<String>,
}

/// Merge `local` with the `remote` categories returned by a pull.
pub fn reconcile(local: &Snapshot, remote: &CategoryData) -> ReconcileOutcome {
    if remote.is_empty() {
        return ReconcileOutcome::Bootstrap;
    }

    let mut merged = local.clone();
    let mut skipped = Vec::new();

    for (name, payload) in remote {
        let strategy = strategy_for(name);
        if apply_strategy(strategy, &mut merged, local, name, payload).is_none() {
            tracing::warn!(
                category = %name,
                ?strategy,
                "Malformed remote category, keeping local copy"
            );
            skipped.push(name.clone());
        }
    }

    ReconcileOutcome::Merged(MergeReport {
        snapshot: merged,
        skipped,
    })
}

/// Merge one remote category into `merged` with `strategy`.
///
/// The strategy picks the policy; the category name only picks which typed
/// slot of the snapshot the policy runs on. Any other pairing is treated as
/// `RemoteWins`. `None` means the payload did not parse and nothing was
/// changed.
fn apply_strategy(
    strategy: MergeStrategy,
    merged: &mut Snapshot,
    local: &Snapshot,
    name: &str,
    payload: &Value,
) -> Option<()> {
    let category = Category::from_name(name);

    match (strategy, category) {
        (MergeStrategy::UnionById, Some(Category::Profiles)) => {
            merged.profiles = union_by_id(&local.profiles, &parse::<Vec<Profile>>(payload)?);
        }
        (MergeStrategy::UnionById, Some(Category::History)) => {
            merged.history = union_by_id(&local.history, &parse::<Vec<HistorySession>>(payload)?);
        }
        (MergeStrategy::UnionById, Some(Category::WeightHistory)) => {
            merged.weight_history =
                union_by_id(&local.weight_history, &parse::<Vec<WeightEntry>>(payload)?);
        }
        (MergeStrategy::TimestampThenCount, Some(Category::Workouts)) => {
            let remote = parse::<BTreeMap<String, Vec<WorkoutPlan>>>(payload)?;
            merged.workouts = merge_workouts(&local.workouts, &remote);
        }
        (MergeStrategy::ShallowFieldMerge, Some(Category::ProfileDetails)) => {
            let remote = parse::<BTreeMap<String, ProfileDetails>>(payload)?;
            merged.profile_details = merge_profile_details(&local.profile_details, &remote);
        }
        (_, Some(category)) => replace_slot(merged, category, payload)?,
        (_, None) => remote_wins(&mut merged.other_categories, name, payload),
    }

    Some(())
}

/// `RemoteWins` on a modelled category: the typed slot is replaced wholesale.
fn replace_slot(merged: &mut Snapshot, category: Category, payload: &Value) -> Option<()> {
    match category {
        Category::Profiles => merged.profiles = parse(payload)?,
        Category::Workouts => merged.workouts = parse(payload)?,
        Category::History => merged.history = parse(payload)?,
        Category::WeightHistory => merged.weight_history = parse(payload)?,
        Category::ProfileDetails => merged.profile_details = parse(payload)?,
    }
    Some(())
}

fn parse<T: DeserializeOwned>(payload: &Value) -> Option<T> {
    match T::deserialize(payload) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::debug!(error = %e, "Remote payload failed to parse");
            None
        }
    }
}

/// `RemoteWins`: the remote value replaces whatever local holds.
pub fn remote_wins(slots: &mut BTreeMap<String, Value>, name: &str, payload: &Value) {
    slots.insert(name.to_string(), payload.clone());
}

/// `UnionById`: every remote entry, then local entries whose id the remote lacks.
///
/// Remote wins on id collision. Duplicate ids within either side collapse to
/// their first occurrence.
pub fn union_by_id<T: Identified + Clone>(local: &[T], remote: &[T]) -> Vec<T> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(local.len() + remote.len());
    let mut merged = Vec::with_capacity(local.len() + remote.len());

    for item in remote.iter().chain(local.iter()) {
        if seen.insert(item.id()) {
            merged.push(item.clone());
        }
    }

    merged
}

/// `TimestampThenCount` applied to every profile's plan list.
pub fn merge_workouts(
    local: &BTreeMap<String, Vec<WorkoutPlan>>,
    remote: &BTreeMap<String, Vec<WorkoutPlan>>,
) -> BTreeMap<String, Vec<WorkoutPlan>> {
    let mut merged = BTreeMap::new();

    for profile_id in local.keys().chain(remote.keys()) {
        if merged.contains_key(profile_id) {
            continue;
        }
        let plans = match (local.get(profile_id), remote.get(profile_id)) {
            (Some(l), Some(r)) => merge_plan_lists(l, r),
            (Some(only), None) | (None, Some(only)) => dedup_by_id(only),
            (None, None) => continue,
        };
        merged.insert(profile_id.clone(), plans);
    }

    merged
}

fn merge_plan_lists(local: &[WorkoutPlan], remote: &[WorkoutPlan]) -> Vec<WorkoutPlan> {
    let remote_by_id: BTreeMap<&str, &WorkoutPlan> = remote
        .iter()
        .rev()
        .map(|plan| (plan.id.as_str(), plan))
        .collect();

    let mut seen: HashSet<&str> = HashSet::new();
    let mut merged = Vec::with_capacity(local.len().max(remote.len()));

    for plan in local {
        if !seen.insert(plan.id.as_str()) {
            continue;
        }
        let winner = match remote_by_id.get(plan.id.as_str()) {
            Some(remote_plan) => pick_plan(plan, remote_plan),
            None => plan,
        };
        merged.push(winner.clone());
    }

    for plan in remote {
        if seen.insert(plan.id.as_str()) {
            merged.push(plan.clone());
        }
    }

    merged
}

fn dedup_by_id(plans: &[WorkoutPlan]) -> Vec<WorkoutPlan> {
    union_by_id(&[], plans)
}

/// Choose between two versions of the same plan.
///
/// Later `lastPerformed` wins (missing counts as the epoch). On an exact
/// tie the remote wins only with a strictly greater `usageCount`
/// (missing counts as 0), so a full tie keeps the local version.
pub fn pick_plan<'a>(local: &'a WorkoutPlan, remote: &'a WorkoutPlan) -> &'a WorkoutPlan {
    let local_key = (performed_or_epoch(local), local.usage_count.unwrap_or(0));
    let remote_key = (performed_or_epoch(remote), remote.usage_count.unwrap_or(0));

    if remote_key > local_key {
        remote
    } else {
        local
    }
}

fn performed_or_epoch(plan: &WorkoutPlan) -> DateTime<Utc> {
    plan.last_performed.unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

/// `ShallowFieldMerge` per profile: remote fields override, local-only keys survive.
pub fn merge_profile_details(
    local: &BTreeMap<String, ProfileDetails>,
    remote: &BTreeMap<String, ProfileDetails>,
) -> BTreeMap<String, ProfileDetails> {
    let mut merged = local.clone();

    for (profile_id, remote_fields) in remote {
        let fields = merged.entry(profile_id.clone()).or_default();
        for (key, value) in remote_fields {
            fields.insert(key.clone(), value.clone());
        }
    }

    merged
}
