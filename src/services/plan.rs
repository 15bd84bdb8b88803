// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Plan generation service: gate, then reuse-or-compute, then store.

use crate::db::Database;
use crate::error::AppError;
use crate::models::{HealthMetricsSnapshot, PlanResponse, StoredPlan};
use crate::services::change::is_significant_since;
use crate::services::gate::{user_tag, MetricsGate};
use crate::services::nutrition::compute_targets;
use chrono::{DateTime, Duration, Utc};

#[derive(Clone)]
pub struct PlanService {
    db: Database,
    gate: MetricsGate,
    /// Serve a stored plan with unchanged inputs for this long
    reuse_window: Duration,
}

impl PlanService {
    pub fn new(db: Database, gate: MetricsGate, reuse_window: Duration) -> Self {
        Self {
            db,
            gate,
            reuse_window,
        }
    }

    /// Fetch (or recompute, when forced) the user's plan.
    ///
    /// The acknowledgment gate runs before anything else, including the
    /// force flag and the recent-plan shortcut.
    pub async fn get_plan(
        &self,
        user_id: &str,
        force_recompute: bool,
        now: DateTime<Utc>,
    ) -> Result<PlanResponse, AppError> {
        let metrics = self.gate.require(user_id, now).await?;

        let profile = self.db.get_profile(user_id).await?.ok_or_else(|| {
            AppError::BadRequest(
                "Complete your health profile before generating a plan".to_string(),
            )
        })?;
        let fingerprint = profile.plan_fingerprint();
        let stored = self.db.get_plan(user_id).await?;

        if !force_recompute {
            if let Some(plan) = stored
                .as_ref()
                .filter(|p| self.is_reusable(p, &fingerprint, metrics.as_ref(), now))
            {
                tracing::debug!(user = %user_tag(user_id), "Serving stored nutrition plan");
                return Ok(response_for(plan));
            }
        }

        let targets = compute_targets(
            &profile.demographics(),
            profile.activity_level,
            profile.goal,
            metrics.as_ref(),
        );
        let previous_targets = stored.map(|p| p.targets);

        let plan = StoredPlan {
            user_id: user_id.to_string(),
            targets,
            previous_targets,
            inputs_fingerprint: fingerprint,
            metrics_version: metrics.as_ref().map(|m| m.version),
            metrics_computed_at: metrics.as_ref().map(|m| m.computed_at),
            generated_at: now,
        };
        self.db.set_plan(&plan).await?;

        let response = response_for(&plan);
        tracing::info!(
            user = %user_tag(user_id),
            forced = force_recompute,
            gated_by_metrics = metrics.is_some(),
            significant_change = response.significant_change,
            "Nutrition plan generated"
        );

        Ok(response)
    }

    /// Recompute after a profile change.
    ///
    /// Returns `None` when the gate blocks (new metrics awaiting
    /// acknowledgment); other errors propagate.
    pub async fn recompute_if_allowed(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<PlanResponse>, AppError> {
        match self.get_plan(user_id, true, now).await {
            Ok(plan) => Ok(Some(plan)),
            Err(AppError::MetricsAcknowledgmentRequired) => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn is_reusable(
        &self,
        plan: &StoredPlan,
        fingerprint: &str,
        metrics: Option<&HealthMetricsSnapshot>,
        now: DateTime<Utc>,
    ) -> bool {
        plan.inputs_fingerprint == fingerprint
            && plan.metrics_version == metrics.map(|m| m.version)
            && plan.metrics_computed_at == metrics.map(|m| m.computed_at)
            && now - plan.generated_at < self.reuse_window
    }
}

fn response_for(plan: &StoredPlan) -> PlanResponse {
    PlanResponse {
        targets: plan.targets,
        previous_targets: plan.previous_targets,
        significant_change: is_significant_since(plan.previous_targets.as_ref(), &plan.targets),
        generated_at: plan.generated_at,
        metrics_version: plan.metrics_version,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Acknowledgment, ActivityLevel, Gender, Goal, HealthProfile};
    use crate::services::metrics_job::MetricsJob;
    use chrono::TimeZone;

    fn profile(goal: Goal) -> HealthProfile {
        HealthProfile {
            user_id: "user-1".to_string(),
            weight_kg: 80.0,
            height_cm: 175.0,
            age: 30,
            gender: Gender::Male,
            activity_level: ActivityLevel::ModeratelyActive,
            goal,
            target_weight_kg: None,
            updated_at: "2026-03-01T00:00:00Z".to_string(),
        }
    }

    fn service(db: &Database) -> PlanService {
        PlanService::new(
            db.clone(),
            MetricsGate::new(db.clone()),
            Duration::minutes(60),
        )
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_first_plan_without_metrics() {
        let db = Database::in_memory();
        db.upsert_profile(&profile(Goal::LoseWeight)).await.unwrap();

        let plan = service(&db).get_plan("user-1", false, t0()).await.unwrap();
        assert_eq!(plan.targets.calorie_target, 2211);
        assert_eq!(plan.metrics_version, None);
        assert!(plan.previous_targets.is_none());
        assert!(!plan.significant_change);
    }

    #[tokio::test]
    async fn test_gate_runs_before_force_and_reuse() {
        let db = Database::in_memory();
        db.upsert_profile(&profile(Goal::LoseWeight)).await.unwrap();
        let plans = service(&db);

        // A recent plan exists from before the metrics job ran
        plans.get_plan("user-1", false, t0()).await.unwrap();

        MetricsJob::new(db.clone())
            .run_for_user("user-1", t0() + Duration::minutes(1), false)
            .await
            .unwrap();

        let later = t0() + Duration::minutes(2);
        for force in [false, true] {
            let err = plans.get_plan("user-1", force, later).await.unwrap_err();
            assert!(matches!(err, AppError::MetricsAcknowledgmentRequired));
        }
        assert_eq!(plans.recompute_if_allowed("user-1", later).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_reuse_and_recompute_report_previous_targets() {
        let db = Database::in_memory();
        db.upsert_profile(&profile(Goal::LoseWeight)).await.unwrap();
        let plans = service(&db);

        let first = plans.get_plan("user-1", false, t0()).await.unwrap();
        let reused = plans
            .get_plan("user-1", false, t0() + Duration::minutes(10))
            .await
            .unwrap();
        assert_eq!(reused.generated_at, first.generated_at);

        db.upsert_profile(&profile(Goal::Maintain)).await.unwrap();
        let changed = plans
            .get_plan("user-1", false, t0() + Duration::minutes(11))
            .await
            .unwrap();
        assert_eq!(changed.previous_targets, Some(first.targets));
        assert_eq!(changed.targets.calorie_target, 2711);
        assert!(changed.significant_change);

        let forced = plans
            .get_plan("user-1", true, t0() + Duration::minutes(12))
            .await
            .unwrap();
        assert_eq!(forced.previous_targets, Some(changed.targets));
        assert!(!forced.significant_change);
    }

    #[tokio::test]
    async fn test_acknowledged_metrics_feed_the_engine() {
        let db = Database::in_memory();
        db.upsert_profile(&profile(Goal::LoseWeight)).await.unwrap();
        let outcome = MetricsJob::new(db.clone())
            .run_for_user("user-1", t0(), false)
            .await
            .unwrap();
        let snapshot = outcome.snapshot().clone();
        db.record_acknowledgment(&Acknowledgment {
            user_id: "user-1".to_string(),
            version: snapshot.version,
            metrics_computed_at: snapshot.computed_at,
            acknowledged_at: t0(),
        })
        .await
        .unwrap();

        let plan = service(&db)
            .get_plan("user-1", false, t0() + Duration::minutes(1))
            .await
            .unwrap();
        assert_eq!(plan.metrics_version, Some(snapshot.version));
        assert_eq!(plan.targets.calorie_target, snapshot.tdee - 500);
    }

    #[tokio::test]
    async fn test_missing_profile_is_validation_error() {
        let db = Database::in_memory();
        let err = service(&db).get_plan("user-1", false, t0()).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
