// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Today's metrics view and the acknowledgment store.

use crate::db::Database;
use crate::error::AppError;
use crate::models::{
    AcknowledgeRequest, AcknowledgeResponse, Acknowledgment, HealthMetricsSnapshot,
    MetricsExplanations, TodayMetrics,
};
use crate::services::gate::user_tag;
use chrono::{DateTime, Utc};

#[derive(Clone)]
pub struct AcknowledgmentService {
    db: Database,
}

impl AcknowledgmentService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Current snapshot, distinguishing "not computed yet" (404) from
    /// "no health profile" (400).
    async fn current_snapshot(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<HealthMetricsSnapshot, AppError> {
        if let Some(snapshot) = self.db.current_snapshot(user_id, now).await? {
            return Ok(snapshot);
        }

        match self.db.get_profile(user_id).await? {
            Some(_) => Err(AppError::MetricsNotYetComputed),
            None => Err(AppError::BadRequest(
                "Complete your health profile to compute health metrics".to_string(),
            )),
        }
    }

    /// Today's metrics with explanations and acknowledgment status.
    pub async fn today(&self, user_id: &str, now: DateTime<Utc>) -> Result<TodayMetrics, AppError> {
        let snapshot = self.current_snapshot(user_id, now).await?;
        let acknowledgement = self.db.get_acknowledgment(&snapshot).await?;
        let metrics = snapshot.view();

        Ok(TodayMetrics {
            explanations: MetricsExplanations::for_metrics(&metrics),
            metrics,
            acknowledged: acknowledgement.is_some(),
            acknowledgement: acknowledgement.as_ref().map(Acknowledgment::view),
        })
    }

    /// Record that the user reviewed exactly the current snapshot.
    ///
    /// Re-acknowledging returns the original record. A request for any
    /// other `(version, computedAt)` pair is stale.
    pub async fn acknowledge(
        &self,
        user_id: &str,
        request: AcknowledgeRequest,
        now: DateTime<Utc>,
    ) -> Result<AcknowledgeResponse, AppError> {
        let snapshot = self.current_snapshot(user_id, now).await?;

        if request.version != snapshot.version
            || request.metrics_computed_at != snapshot.computed_at
        {
            tracing::info!(
                user = %user_tag(user_id),
                requested_version = request.version,
                current_version = snapshot.version,
                "Rejected stale metrics acknowledgment"
            );
            return Err(AppError::StaleAcknowledgment);
        }

        let stored = self
            .db
            .record_acknowledgment(&Acknowledgment {
                user_id: user_id.to_string(),
                version: snapshot.version,
                metrics_computed_at: snapshot.computed_at,
                acknowledged_at: now,
            })
            .await?;

        tracing::info!(
            user = %user_tag(user_id),
            version = stored.version,
            "Health metrics acknowledged"
        );

        Ok(AcknowledgeResponse {
            acknowledged: true,
            acknowledgement: stored.view(),
        })
    }
}
