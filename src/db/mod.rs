// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer (Firestore, with in-memory and offline variants).

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreStore;
pub use memory::MemoryStore;

use crate::error::AppError;
use crate::models::{Acknowledgment, HealthMetricsSnapshot, HealthProfile, StoredPlan};
use crate::time_utils::utc_day_key;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Collection names as constants.
pub mod collections {
    pub const HEALTH_PROFILES: &str = "health_profiles";
    /// Append-only metrics snapshots
    pub const HEALTH_METRICS: &str = "health_metrics";
    pub const METRICS_ACKNOWLEDGMENTS: &str = "metrics_acknowledgments";
    /// Last generated plan per user
    pub const NUTRITION_PLANS: &str = "nutrition_plans";
}

/// Document ID identifying one exact snapshot.
///
/// Shared by the snapshot and its acknowledgment, so the acknowledgment
/// lookup is itself an exact `(version, computedAt)` match.
pub fn snapshot_key(user_id: &str, version: i64, computed_at: DateTime<Utc>) -> String {
    let nanos = computed_at
        .timestamp_nanos_opt()
        .unwrap_or_else(|| computed_at.timestamp_micros().saturating_mul(1000));
    format!("{}_{}_{}", user_id, version, nanos)
}

#[derive(Clone)]
enum Backend {
    Firestore(FirestoreStore),
    Memory(Arc<MemoryStore>),
    /// Every operation fails (storage unavailable)
    Offline,
}

/// Database handle shared by all request handlers.
#[derive(Clone)]
pub struct Database {
    backend: Backend,
}

impl Database {
    /// Connect to Firestore.
    pub async fn firestore(project_id: &str) -> Result<Self, AppError> {
        Ok(Self {
            backend: Backend::Firestore(FirestoreStore::connect(project_id).await?),
        })
    }

    /// Create a process-local database.
    pub fn in_memory() -> Self {
        Self {
            backend: Backend::Memory(Arc::new(MemoryStore::default())),
        }
    }

    /// Create an offline database for testing.
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self {
            backend: Backend::Offline,
        }
    }

    /// The in-memory store, when that is the active backend.
    pub fn memory(&self) -> Option<&MemoryStore> {
        match &self.backend {
            Backend::Memory(store) => Some(store),
            _ => None,
        }
    }

    fn offline() -> AppError {
        AppError::Database("Database not connected (offline mode)".to_string())
    }

    // ─── Profiles ────────────────────────────────────────────────

    pub async fn get_profile(&self, user_id: &str) -> Result<Option<HealthProfile>, AppError> {
        match &self.backend {
            Backend::Firestore(db) => db.get_profile(user_id).await,
            Backend::Memory(mem) => Ok(mem.get_profile(user_id)),
            Backend::Offline => Err(Self::offline()),
        }
    }

    pub async fn upsert_profile(&self, profile: &HealthProfile) -> Result<(), AppError> {
        match &self.backend {
            Backend::Firestore(db) => db.upsert_profile(profile).await,
            Backend::Memory(mem) => {
                mem.upsert_profile(profile);
                Ok(())
            }
            Backend::Offline => Err(Self::offline()),
        }
    }

    // ─── Metrics Snapshots ───────────────────────────────────────

    /// The user's current snapshot: latest `computedAt` within the UTC day
    /// containing `now`.
    pub async fn current_snapshot(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<HealthMetricsSnapshot>, AppError> {
        let day = utc_day_key(now);
        let snapshots = match &self.backend {
            Backend::Firestore(db) => db.get_snapshots_for_day(user_id, &day).await?,
            Backend::Memory(mem) => mem.get_snapshots_for_day(user_id, &day),
            Backend::Offline => return Err(Self::offline()),
        };

        Ok(snapshots
            .into_iter()
            .max_by(|a, b| a.computed_at.cmp(&b.computed_at)))
    }

    pub async fn latest_snapshot_version(&self, user_id: &str) -> Result<Option<i64>, AppError> {
        match &self.backend {
            Backend::Firestore(db) => db.latest_snapshot_version(user_id).await,
            Backend::Memory(mem) => Ok(mem.latest_snapshot_version(user_id)),
            Backend::Offline => Err(Self::offline()),
        }
    }

    pub async fn insert_snapshot(&self, snapshot: &HealthMetricsSnapshot) -> Result<(), AppError> {
        match &self.backend {
            Backend::Firestore(db) => db.insert_snapshot(snapshot).await,
            Backend::Memory(mem) => {
                let doc_id =
                    snapshot_key(&snapshot.user_id, snapshot.version, snapshot.computed_at);
                mem.insert_snapshot(doc_id, snapshot);
                Ok(())
            }
            Backend::Offline => Err(Self::offline()),
        }
    }

    // ─── Acknowledgments ─────────────────────────────────────────

    /// Acknowledgment for exactly this snapshot, if the user recorded one.
    pub async fn get_acknowledgment(
        &self,
        snapshot: &HealthMetricsSnapshot,
    ) -> Result<Option<Acknowledgment>, AppError> {
        let doc_id = snapshot_key(&snapshot.user_id, snapshot.version, snapshot.computed_at);
        let found = match &self.backend {
            Backend::Firestore(db) => db.get_acknowledgment(&doc_id).await?,
            Backend::Memory(mem) => mem.get_acknowledgment(&doc_id),
            Backend::Offline => return Err(Self::offline()),
        };

        Ok(found.filter(|ack| ack.matches(snapshot)))
    }

    /// Record an acknowledgment; returns the stored record (the original
    /// one if this snapshot was already acknowledged).
    pub async fn record_acknowledgment(
        &self,
        ack: &Acknowledgment,
    ) -> Result<Acknowledgment, AppError> {
        let doc_id = snapshot_key(&ack.user_id, ack.version, ack.metrics_computed_at);
        match &self.backend {
            Backend::Firestore(db) => db.record_acknowledgment(&doc_id, ack).await,
            Backend::Memory(mem) => Ok(mem.record_acknowledgment(&doc_id, ack)),
            Backend::Offline => Err(Self::offline()),
        }
    }

    // ─── Plans ───────────────────────────────────────────────────

    pub async fn get_plan(&self, user_id: &str) -> Result<Option<StoredPlan>, AppError> {
        match &self.backend {
            Backend::Firestore(db) => db.get_plan(user_id).await,
            Backend::Memory(mem) => Ok(mem.get_plan(user_id)),
            Backend::Offline => Err(Self::offline()),
        }
    }

    pub async fn set_plan(&self, plan: &StoredPlan) -> Result<(), AppError> {
        match &self.backend {
            Backend::Firestore(db) => db.set_plan(plan).await,
            Backend::Memory(mem) => {
                mem.set_plan(plan);
                Ok(())
            }
            Backend::Offline => Err(Self::offline()),
        }
    }
}
