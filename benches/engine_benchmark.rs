// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use chrono::Utc;
use criterion::{criterion_group, criterion_main, Criterion};
use nutriplan::models::{ActivityLevel, Gender, Goal, HealthMetricsSnapshot, PlanTargets};
use nutriplan::services::is_significant;
use nutriplan::services::nutrition::{compute_metrics, compute_targets, Demographics};
use nutriplan::time_utils::utc_day_key;
use std::hint::black_box;

fn benchmark_engine(c: &mut Criterion) {
    let person = Demographics {
        weight_kg: 80.0,
        height_cm: 175.0,
        age: 30,
        gender: Gender::Male,
        target_weight_kg: Some(72.0),
    };

    let now = Utc::now();
    let snapshot = HealthMetricsSnapshot {
        user_id: "bench".to_string(),
        bmi: 26.1,
        bmr: 1749,
        tdee: 2711,
        computed_at: now,
        computed_day: utc_day_key(now),
        version: 1,
    };

    let mut group = c.benchmark_group("nutrition_engine");

    group.bench_function("compute_metrics", |b| {
        b.iter(|| compute_metrics(black_box(&person), black_box(ActivityLevel::ModeratelyActive)))
    });

    group.bench_function("compute_targets_from_profile", |b| {
        b.iter(|| {
            compute_targets(
                black_box(&person),
                ActivityLevel::ModeratelyActive,
                Goal::LoseWeight,
                None,
            )
        })
    });

    group.bench_function("compute_targets_from_snapshot", |b| {
        b.iter(|| {
            compute_targets(
                black_box(&person),
                ActivityLevel::ModeratelyActive,
                Goal::LoseWeight,
                Some(black_box(&snapshot)),
            )
        })
    });

    group.finish();

    let old = PlanTargets {
        calorie_target: 2211,
        protein_target: 160,
        water_target: 3300,
        estimated_weeks: Some(18),
    };
    let new = PlanTargets {
        calorie_target: 2511,
        ..old
    };
    c.bench_function("is_significant", |b| {
        b.iter(|| is_significant(black_box(&old), black_box(&new)))
    });
}

criterion_group!(benches, benchmark_engine);
criterion_main!(benches);
