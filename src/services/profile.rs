// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Health profile updates and their knock-on effects.

use crate::db::Database;
use crate::error::AppError;
use crate::models::{HealthProfile, HealthProfileUpdate, HealthUpdateResponse};
use crate::services::gate::user_tag;
use crate::services::metrics_job::MetricsJob;
use crate::services::plan::PlanService;
use crate::time_utils::format_utc_rfc3339;
use chrono::{DateTime, Utc};
use validator::Validate;

#[derive(Clone)]
pub struct ProfileService {
    db: Database,
    metrics_job: MetricsJob,
    plans: PlanService,
}

impl ProfileService {
    pub fn new(db: Database, metrics_job: MetricsJob, plans: PlanService) -> Self {
        Self {
            db,
            metrics_job,
            plans,
        }
    }

    pub async fn get(&self, user_id: &str) -> Result<Option<HealthProfile>, AppError> {
        self.db.get_profile(user_id).await
    }

    /// Store a new health profile.
    ///
    /// If BMR/TDEE inputs changed, the metrics job runs first; a new
    /// snapshot then blocks plan regeneration until it is acknowledged.
    /// Otherwise a change to plan inputs (e.g. goal) recomputes right away.
    pub async fn update_health(
        &self,
        user_id: &str,
        update: HealthProfileUpdate,
        now: DateTime<Utc>,
    ) -> Result<HealthUpdateResponse, AppError> {
        update.validate()?;

        let previous = self.db.get_profile(user_id).await?;
        let profile = update.into_profile(user_id, format_utc_rfc3339(now));
        self.db.upsert_profile(&profile).await?;

        let metrics_inputs_changed = previous
            .as_ref()
            .is_none_or(|p| p.metrics_inputs_changed(&profile));
        let plan_inputs_changed = previous
            .as_ref()
            .is_none_or(|p| p.plan_fingerprint() != profile.plan_fingerprint());

        let metrics_recomputed = if metrics_inputs_changed {
            self.metrics_job
                .run_for_user(user_id, now, false)
                .await?
                .wrote_snapshot()
        } else {
            false
        };

        let mut response = HealthUpdateResponse {
            plan_updated: false,
            targets: None,
            metrics_recomputed,
            acknowledgment_required: false,
        };

        if plan_inputs_changed || metrics_recomputed {
            match self.plans.recompute_if_allowed(user_id, now).await? {
                Some(plan) => {
                    response.plan_updated = true;
                    response.targets = Some(plan.targets);
                }
                None => response.acknowledgment_required = true,
            }
        }

        tracing::info!(
            user = %user_tag(user_id),
            metrics_recomputed = response.metrics_recomputed,
            plan_updated = response.plan_updated,
            acknowledgment_required = response.acknowledgment_required,
            "Health profile updated"
        );

        Ok(response)
    }
}
