// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Snapshot categories and the conflict policy attached to each.

/// How local and remote values of one category are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStrategy {
    /// Remote entries, plus local entries whose id the remote lacks.
    UnionById,
    /// Per-id: later `lastPerformed` wins, then higher `usageCount`, then local.
    TimestampThenCount,
    /// Per-key object merge, remote fields overriding local ones.
    ShallowFieldMerge,
    /// Remote value replaces local value wholesale.
    RemoteWins,
}

/// A named, independently mergeable slice of a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Profiles,
    Workouts,
    History,
    WeightHistory,
    ProfileDetails,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Profiles,
        Category::Workouts,
        Category::History,
        Category::WeightHistory,
        Category::ProfileDetails,
    ];

    /// Wire name of the category.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Profiles => "profiles",
            Category::Workouts => "workouts",
            Category::History => "history",
            Category::WeightHistory => "weightHistory",
            Category::ProfileDetails => "profileDetails",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == name)
    }

    pub fn strategy(self) -> MergeStrategy {
        match self {
            Category::Profiles | Category::History | Category::WeightHistory => {
                MergeStrategy::UnionById
            }
            Category::Workouts => MergeStrategy::TimestampThenCount,
            Category::ProfileDetails => MergeStrategy::ShallowFieldMerge,
        }
    }
}

/// Strategy for a wire category name; unmodelled categories are `RemoteWins`.
pub fn strategy_for(name: &str) -> MergeStrategy {
    Category::from_name(name).map_or(MergeStrategy::RemoteWins, Category::strategy)
}
