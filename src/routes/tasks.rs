// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Task handler routes for the metrics job scheduler.
//!
//! These endpoints are called by the scheduler, not directly by users.
//! The shared-token middleware is applied in routes/mod.rs.

use crate::error::Result;
use crate::models::{ApiResponse, MetricsView};
use crate::services::JobOutcome;
use crate::AppState;
use axum::{
    extract::{Json, State},
    routing::post,
    Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/tasks/metrics/compute", post(compute_metrics))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputeMetricsPayload {
    pub user_id: String,
    /// Recompute today's snapshot under its existing version
    #[serde(default)]
    pub reprocess: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputeMetricsResult {
    /// `created`, `unchanged` or `reprocessed`
    pub outcome: String,
    pub metrics: MetricsView,
}

async fn compute_metrics(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ComputeMetricsPayload>,
) -> Result<Json<ApiResponse<ComputeMetricsResult>>> {
    let outcome = state
        .metrics_job
        .run_for_user(&payload.user_id, Utc::now(), payload.reprocess)
        .await?;

    let label = match &outcome {
        JobOutcome::Created(_) => "created",
        JobOutcome::Unchanged(_) => "unchanged",
        JobOutcome::Reprocessed(_) => "reprocessed",
    };

    Ok(Json(ApiResponse::ok(ComputeMetricsResult {
        outcome: label.to_string(),
        metrics: outcome.snapshot().view(),
    })))
}
