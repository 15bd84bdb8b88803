// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Health metrics computation job.
//!
//! Produces immutable, versioned BMI/BMR/TDEE snapshots. Runs from the
//! daily scheduler (`POST /tasks/metrics/compute`) and after profile
//! updates that change BMR/TDEE inputs.

use crate::db::Database;
use crate::error::AppError;
use crate::models::HealthMetricsSnapshot;
use crate::services::gate::user_tag;
use crate::services::nutrition::compute_metrics;
use crate::time_utils::utc_day_key;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Per-user locks serializing job runs within this process.
pub type JobLocks = Arc<DashMap<String, Arc<Mutex<()>>>>;

/// What a job run did.
#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    /// A new version was written.
    Created(HealthMetricsSnapshot),
    /// Today's snapshot already has these values; nothing written.
    Unchanged(HealthMetricsSnapshot),
    /// Today's version was recomputed under a new timestamp.
    Reprocessed(HealthMetricsSnapshot),
}

impl JobOutcome {
    pub fn snapshot(&self) -> &HealthMetricsSnapshot {
        match self {
            JobOutcome::Created(s) | JobOutcome::Unchanged(s) | JobOutcome::Reprocessed(s) => s,
        }
    }

    /// Whether a new snapshot (needing a new acknowledgment) was written.
    pub fn wrote_snapshot(&self) -> bool {
        !matches!(self, JobOutcome::Unchanged(_))
    }
}

#[derive(Clone)]
pub struct MetricsJob {
    db: Database,
    locks: JobLocks,
}

impl MetricsJob {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            locks: JobLocks::default(),
        }
    }

    /// Compute and store the snapshot for `user_id` as of `now`.
    ///
    /// With `reprocess`, an existing snapshot for today keeps its version
    /// but gets a new `computedAt`, which invalidates its acknowledgment.
    pub async fn run_for_user(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
        reprocess: bool,
    ) -> Result<JobOutcome, AppError> {
        // Version allocation is read-then-write: runs for one user must not
        // interleave. Only serialized per process; the scheduler issues at
        // most one run per user at a time across instances.
        let lock = self
            .locks
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = lock.lock().await;

        let profile = self
            .db
            .get_profile(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Health profile".to_string()))?;

        let computed = compute_metrics(&profile.demographics(), profile.activity_level);
        let current = self.db.current_snapshot(user_id, now).await?;

        let candidate = |version: i64| HealthMetricsSnapshot {
            user_id: user_id.to_string(),
            bmi: computed.bmi,
            bmr: computed.bmr,
            tdee: computed.tdee,
            computed_at: now,
            computed_day: utc_day_key(now),
            version,
        };

        let outcome = match current {
            Some(existing) if reprocess => {
                let snapshot = candidate(existing.version);
                self.db.insert_snapshot(&snapshot).await?;
                JobOutcome::Reprocessed(snapshot)
            }
            Some(existing) if existing.same_values(&candidate(existing.version)) => {
                JobOutcome::Unchanged(existing)
            }
            _ => {
                let version = self.db.latest_snapshot_version(user_id).await?.unwrap_or(0) + 1;
                let snapshot = candidate(version);
                self.db.insert_snapshot(&snapshot).await?;
                JobOutcome::Created(snapshot)
            }
        };

        tracing::info!(
            user = %user_tag(user_id),
            version = outcome.snapshot().version,
            wrote = outcome.wrote_snapshot(),
            "Health metrics job ran"
        );

        Ok(outcome)
    }
}
