use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use gym_sync::models::{HistorySession, Snapshot, WorkoutPlan, DEFAULT_PROFILE_ID};
use gym_sync::services::healing::heal;
use gym_sync::services::reconcile;
use serde_json::Map;

/// A year of training: a handful of plans and one session per day.
fn build_snapshot(prefix: &str, sessions: usize) -> Snapshot {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 7, 0, 0).unwrap();
    let mut snapshot = Snapshot::seeded();

    let plans: Vec<WorkoutPlan> = (0..8)
        .map(|i| WorkoutPlan {
            id: format!("w{}", i),
            name: format!("Plan {}", i),
            exercises: vec![],
            last_performed: Some(start),
            usage_count: Some(1),
            extra: Map::new(),
        })
        .collect();
    snapshot
        .workouts
        .insert(DEFAULT_PROFILE_ID.to_string(), plans);

    snapshot.history = (0..sessions)
        .map(|i| HistorySession {
            id: format!("{}-h{}", prefix, i),
            profile_id: DEFAULT_PROFILE_ID.to_string(),
            workout_id: format!("w{}", i % 8),
            date: start + Duration::days(i as i64),
            duration: 3600,
            exercises: vec![],
            completed_sets: 15,
            extra: Map::new(),
        })
        .collect();

    snapshot
}

fn benchmark_reconcile(c: &mut Criterion) {
    let local = build_snapshot("local", 365);

    // Half the remote history overlaps local, half is new
    let mut remote_snapshot = build_snapshot("remote", 365);
    remote_snapshot.history.extend(local.history[..180].iter().cloned());
    let remote = remote_snapshot
        .to_categories()
        .expect("Failed to serialize remote snapshot");
    let identical = local
        .to_categories()
        .expect("Failed to serialize local snapshot");

    let mut group = c.benchmark_group("reconcile");

    group.bench_function("overlapping_year_of_history", |b| {
        b.iter(|| reconcile(black_box(&local), black_box(&remote)))
    });

    group.bench_function("identical_snapshot", |b| {
        b.iter(|| reconcile(black_box(&local), black_box(&identical)))
    });

    group.bench_function("heal_year_of_history", |b| {
        b.iter(|| heal(black_box(local.clone())))
    });

    group.finish();
}

criterion_group!(benches, benchmark_reconcile);
criterion_main!(benches);
