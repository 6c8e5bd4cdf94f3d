// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Self-healing pass run on the local snapshot before every push.
//!
//! History sessions are the source of truth for when a plan was performed.
//! `lastPerformed` and `usageCount` on a plan are cached copies that drift
//! after imports or deletions, so they are recomputed from history here.

use crate::models::Snapshot;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Aggregate of the history sessions recorded for one plan.
#[derive(Debug, Clone, Copy, PartialEq)]
struct PlanUsage {
    last: DateTime<Utc>,
    count: u32,
}

/// Repair derived plan fields from history.
///
/// A plan is rewritten only when history shows a strictly newer session
/// than its stored `lastPerformed`; the rewrite sets both `lastPerformed`
/// and `usageCount` from the recompute. Returns the healed snapshot and
/// how many plans were rewritten. Running it twice changes nothing more.
pub fn heal(mut snapshot: Snapshot) -> (Snapshot, usize) {
    let mut usage: HashMap<&str, PlanUsage> = HashMap::new();
    for session in &snapshot.history {
        usage
            .entry(session.workout_id.as_str())
            .and_modify(|u| {
                u.count += 1;
                u.last = u.last.max(session.date);
            })
            .or_insert(PlanUsage {
                last: session.date,
                count: 1,
            });
    }

    let mut repairs: Vec<(String, usize, PlanUsage)> = Vec::new();
    for (profile_id, plans) in &snapshot.workouts {
        for (index, plan) in plans.iter().enumerate() {
            let Some(computed) = usage.get(plan.id.as_str()) else {
                continue;
            };
            let stale = plan
                .last_performed
                .map_or(true, |stored| computed.last > stored);
            if stale {
                repairs.push((profile_id.clone(), index, *computed));
            }
        }
    }

    let repaired = repairs.len();
    for (profile_id, index, computed) in repairs {
        if let Some(plan) = snapshot
            .workouts
            .get_mut(&profile_id)
            .and_then(|plans| plans.get_mut(index))
        {
            tracing::debug!(
                profile_id = %profile_id,
                workout_id = %plan.id,
                last_performed = %computed.last,
                usage_count = computed.count,
                "Healed stale workout plan"
            );
            plan.last_performed = Some(computed.last);
            plan.usage_count = Some(computed.count);
        }
    }

    (snapshot, repaired)
}
