// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-login client session.
//!
//! Construct one per signed-in user and pass it to whatever needs it;
//! dropping it (or calling `logout`) discards the cached plan.

use crate::client::cache::{CachedPlan, PlanCache, RefreshTask};
use crate::client::error::ClientError;
use crate::client::orchestrator::{MetricsLookup, RequestOrchestrator, SessionTokens};
use crate::client::ClientConfig;
use crate::models::{
    AcknowledgeRequest, AcknowledgeResponse, HealthProfileUpdate, HealthUpdateResponse,
    MetricsView, PlanTargets,
};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// A plan handed to the UI, with the notification decision attached.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanUpdate {
    pub plan: CachedPlan,
    /// Show a before/after summary and notify the user
    pub significant_change: bool,
}

impl PlanUpdate {
    fn new(plan: CachedPlan) -> Self {
        Self {
            significant_change: plan.significant_change(),
            plan,
        }
    }

    /// `(before, after)` when the change is worth surfacing.
    pub fn before_after(&self) -> Option<(PlanTargets, PlanTargets)> {
        if !self.significant_change {
            return None;
        }
        self.plan
            .previous_targets
            .map(|before| (before, self.plan.targets))
    }
}

pub struct NutritionSession {
    orchestrator: Arc<RequestOrchestrator>,
    plans: PlanCache<RequestOrchestrator>,
    /// Last snapshot this session acknowledged
    acknowledged: Mutex<Option<AcknowledgeRequest>>,
}

impl NutritionSession {
    /// Start a session for a signed-in user.
    pub fn new(config: &ClientConfig, tokens: SessionTokens) -> Result<Self, ClientError> {
        let orchestrator = RequestOrchestrator::new(config)?.with_tokens(tokens);
        Ok(Self::with_orchestrator(Arc::new(orchestrator), config.plan_ttl))
    }

    pub fn with_orchestrator(orchestrator: Arc<RequestOrchestrator>, plan_ttl: Duration) -> Self {
        Self {
            plans: PlanCache::new(Arc::clone(&orchestrator), plan_ttl),
            orchestrator,
            acknowledged: Mutex::new(None),
        }
    }

    pub fn orchestrator(&self) -> &RequestOrchestrator {
        &self.orchestrator
    }

    pub fn plans(&self) -> &PlanCache<RequestOrchestrator> {
        &self.plans
    }

    pub async fn today_metrics(&self) -> Result<MetricsLookup, ClientError> {
        self.orchestrator.today_metrics().await
    }

    /// Acknowledge `metrics`.
    ///
    /// The first time a given snapshot is acknowledged the plan cache is
    /// invalidated, so the next fetch generates against it instead of
    /// serving a plan from before the acknowledgment.
    pub async fn acknowledge(&self, metrics: &MetricsView) -> Result<AcknowledgeResponse, ClientError> {
        let response = self.orchestrator.acknowledge(metrics).await?;

        let key = AcknowledgeRequest::from(metrics);
        let newly_satisfied = {
            let mut last = self
                .acknowledged
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            let changed = last.as_ref() != Some(&key);
            *last = Some(key);
            changed
        };
        if newly_satisfied {
            self.plans.invalidate();
        }

        Ok(response)
    }

    /// Send a health profile update, then drop the cached plan.
    pub async fn update_health(
        &self,
        update: &HealthProfileUpdate,
    ) -> Result<HealthUpdateResponse, ClientError> {
        let response = self.orchestrator.update_health_profile(update).await?;
        self.plans.invalidate();
        Ok(response)
    }

    /// Current plan; served from cache while fresh.
    pub async fn plan(&self) -> Result<PlanUpdate, ClientError> {
        self.plans.fetch(false).await.map(PlanUpdate::new)
    }

    /// Force a server-side recompute.
    pub async fn recompute_plan(&self) -> Result<PlanUpdate, ClientError> {
        self.plans.recompute().await.map(PlanUpdate::new)
    }

    /// Background staleness refresh bound to the returned handle.
    pub fn watch_staleness(&self, interval: Duration) -> RefreshTask {
        self.plans.watch_staleness(interval)
    }

    /// Discard the cached plan and the session tokens.
    pub fn logout(&self) {
        self.plans.invalidate();
        self.orchestrator.clear_tokens();
        *self
            .acknowledged
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = None;
        tracing::info!("Session ended");
    }
}
