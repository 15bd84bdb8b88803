// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Process-local store used for development and tests.
//!
//! Mirrors the Firestore collections with one `DashMap` each, keyed by the
//! same document IDs.

use crate::models::{Acknowledgment, HealthMetricsSnapshot, HealthProfile, StoredPlan};
use dashmap::DashMap;

#[derive(Default)]
pub struct MemoryStore {
    profiles: DashMap<String, HealthProfile>,
    snapshots: DashMap<String, HealthMetricsSnapshot>,
    acknowledgments: DashMap<String, Acknowledgment>,
    plans: DashMap<String, StoredPlan>,
}

impl MemoryStore {
    pub fn get_profile(&self, user_id: &str) -> Option<HealthProfile> {
        self.profiles.get(user_id).map(|p| p.clone())
    }

    pub fn upsert_profile(&self, profile: &HealthProfile) {
        self.profiles
            .insert(profile.user_id.clone(), profile.clone());
    }

    pub fn get_snapshots_for_day(&self, user_id: &str, day: &str) -> Vec<HealthMetricsSnapshot> {
        self.snapshots
            .iter()
            .filter(|s| s.user_id == user_id && s.computed_day == day)
            .map(|s| s.clone())
            .collect()
    }

    pub fn latest_snapshot_version(&self, user_id: &str) -> Option<i64> {
        self.snapshots
            .iter()
            .filter(|s| s.user_id == user_id)
            .map(|s| s.version)
            .max()
    }

    pub fn insert_snapshot(&self, doc_id: String, snapshot: &HealthMetricsSnapshot) {
        self.snapshots.insert(doc_id, snapshot.clone());
    }

    pub fn get_acknowledgment(&self, doc_id: &str) -> Option<Acknowledgment> {
        self.acknowledgments.get(doc_id).map(|a| a.clone())
    }

    /// Insert-if-absent under the shard lock; the first record wins.
    pub fn record_acknowledgment(&self, doc_id: &str, ack: &Acknowledgment) -> Acknowledgment {
        self.acknowledgments
            .entry(doc_id.to_string())
            .or_insert_with(|| ack.clone())
            .clone()
    }

    /// Number of stored acknowledgments (all users).
    pub fn acknowledgment_count(&self) -> usize {
        self.acknowledgments.len()
    }

    pub fn get_plan(&self, user_id: &str) -> Option<StoredPlan> {
        self.plans.get(user_id).map(|p| p.clone())
    }

    pub fn set_plan(&self, plan: &StoredPlan) {
        self.plans.insert(plan.user_id.clone(), plan.clone());
    }
}
