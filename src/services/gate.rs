// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Metrics acknowledgment gate.
//!
//! Every plan generation or recomputation path calls this first, before
//! any cache bypass or reuse of a recently generated plan.
//!
//! - No snapshot today: allowed (fail-open, first plans must not wait for
//!   the metrics job).
//! - Snapshot with an exactly matching acknowledgment: allowed.
//! - Anything else: blocked, and the caller surfaces a call to action.
//! - Storage errors propagate and block (fail-closed).

use crate::db::Database;
use crate::error::AppError;
use crate::models::HealthMetricsSnapshot;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

/// Outcome of a gate check.
#[derive(Debug, Clone, PartialEq)]
pub enum GateDecision {
    /// The current snapshot is acknowledged.
    Acknowledged(HealthMetricsSnapshot),
    /// A snapshot exists but this exact version/timestamp was not acknowledged.
    NotAcknowledged(HealthMetricsSnapshot),
    /// The metrics job has not produced anything for today.
    NoMetricsYet,
}

impl GateDecision {
    pub fn allows_generation(&self) -> bool {
        !matches!(self, GateDecision::NotAcknowledged(_))
    }

    /// Value of the `outcome` field in the audit event.
    pub fn outcome(&self) -> &'static str {
        match self {
            GateDecision::Acknowledged(_) => "acknowledged",
            GateDecision::NotAcknowledged(_) => "not_acknowledged",
            GateDecision::NoMetricsYet => "no_metrics_yet",
        }
    }
}

/// Pseudonymous user tag for logs: first 16 hex chars of SHA-256(user_id).
pub fn user_tag(user_id: &str) -> String {
    let digest = Sha256::digest(user_id.as_bytes());
    hex::encode(&digest[..8])
}

/// Read-only gate over the metrics and acknowledgment collections.
#[derive(Clone)]
pub struct MetricsGate {
    db: Database,
}

impl MetricsGate {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Evaluate the gate for `user_id` using the UTC day containing `now`.
    pub async fn evaluate(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<GateDecision, AppError> {
        let result = self.lookup(user_id, now).await;

        match &result {
            Ok(decision) => {
                tracing::info!(
                    user = %user_tag(user_id),
                    outcome = decision.outcome(),
                    "Metrics acknowledgment gate evaluated"
                );
            }
            Err(e) => {
                tracing::error!(
                    user = %user_tag(user_id),
                    outcome = "storage_unavailable",
                    error = %e,
                    "Metrics acknowledgment gate failed closed"
                );
            }
        }

        result
    }

    async fn lookup(&self, user_id: &str, now: DateTime<Utc>) -> Result<GateDecision, AppError> {
        let Some(snapshot) = self.db.current_snapshot(user_id, now).await? else {
            return Ok(GateDecision::NoMetricsYet);
        };

        match self.db.get_acknowledgment(&snapshot).await? {
            Some(_) => Ok(GateDecision::Acknowledged(snapshot)),
            None => Ok(GateDecision::NotAcknowledged(snapshot)),
        }
    }

    /// Whether plan generation may proceed right now.
    pub async fn can_generate_plan(&self, user_id: &str) -> Result<bool, AppError> {
        Ok(self.evaluate(user_id, Utc::now()).await?.allows_generation())
    }

    /// Gate check for generation paths.
    ///
    /// Returns the acknowledged snapshot (if any) to feed the engine, or
    /// `MetricsAcknowledgmentRequired`.
    pub async fn require(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<HealthMetricsSnapshot>, AppError> {
        match self.evaluate(user_id, now).await? {
            GateDecision::Acknowledged(snapshot) => Ok(Some(snapshot)),
            GateDecision::NoMetricsYet => Ok(None),
            GateDecision::NotAcknowledged(_) => Err(AppError::MetricsAcknowledgmentRequired),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Acknowledgment;
    use crate::time_utils::utc_day_key;
    use chrono::{Duration, TimeZone};

    fn snapshot(version: i64, computed_at: DateTime<Utc>) -> HealthMetricsSnapshot {
        HealthMetricsSnapshot {
            user_id: "user-1".to_string(),
            bmi: 26.1,
            bmr: 1749,
            tdee: 2711,
            computed_at,
            computed_day: utc_day_key(computed_at),
            version,
        }
    }

    fn ack_for(snapshot: &HealthMetricsSnapshot) -> Acknowledgment {
        Acknowledgment {
            user_id: snapshot.user_id.clone(),
            version: snapshot.version,
            metrics_computed_at: snapshot.computed_at,
            acknowledged_at: snapshot.computed_at + Duration::minutes(2),
        }
    }

    #[tokio::test]
    async fn test_no_metrics_fails_open() {
        let db = Database::in_memory();
        // An acknowledgment without any current snapshot changes nothing
        let old = snapshot(1, Utc.with_ymd_and_hms(2026, 2, 1, 6, 0, 0).unwrap());
        db.record_acknowledgment(&ack_for(&old)).await.unwrap();

        let gate = MetricsGate::new(db);
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        assert_eq!(
            gate.evaluate("user-1", now).await.unwrap(),
            GateDecision::NoMetricsYet
        );
        assert_eq!(gate.require("user-1", now).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_reprocessed_snapshot_needs_new_acknowledgment() {
        let db = Database::in_memory();
        let gate = MetricsGate::new(db.clone());
        let t1 = Utc.with_ymd_and_hms(2026, 3, 1, 6, 0, 0).unwrap();
        let t2 = t1 + Duration::hours(4);
        let now = t2 + Duration::hours(1);

        let first = snapshot(3, t1);
        db.insert_snapshot(&first).await.unwrap();
        db.record_acknowledgment(&ack_for(&first)).await.unwrap();
        assert!(matches!(
            gate.evaluate("user-1", t1 + Duration::minutes(5)).await.unwrap(),
            GateDecision::Acknowledged(_)
        ));

        // Reprocessing run: same version, new timestamp
        let reprocessed = snapshot(3, t2);
        db.insert_snapshot(&reprocessed).await.unwrap();
        assert_eq!(
            gate.evaluate("user-1", now).await.unwrap(),
            GateDecision::NotAcknowledged(reprocessed.clone())
        );
        assert!(matches!(
            gate.require("user-1", now).await,
            Err(AppError::MetricsAcknowledgmentRequired)
        ));

        db.record_acknowledgment(&ack_for(&reprocessed)).await.unwrap();
        assert_eq!(
            gate.require("user-1", now).await.unwrap(),
            Some(reprocessed)
        );
    }

    #[tokio::test]
    async fn test_storage_failure_fails_closed() {
        let gate = MetricsGate::new(Database::new_mock());
        let err = gate.require("user-1", Utc::now()).await.unwrap_err();
        assert!(matches!(err, AppError::Database(_)));
        assert!(gate.can_generate_plan("user-1").await.is_err());
    }

    #[test]
    fn test_user_tag_is_stable_and_opaque() {
        let tag = user_tag("alice@example.com");
        assert_eq!(tag.len(), 16);
        assert_eq!(tag, user_tag("alice@example.com"));
        assert!(!tag.contains("alice"));
    }
}
