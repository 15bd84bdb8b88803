// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Health metrics routes (today's snapshot and acknowledgment).

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::{AcknowledgeRequest, AcknowledgeResponse, ApiResponse, TodayMetrics};
use crate::AppState;
use axum::{
    extract::State,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::Utc;
use std::sync::Arc;

/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/v1/profile/metrics/today", get(get_today))
        .route("/v1/profile/metrics/acknowledge", post(acknowledge))
}

/// Today's metrics.
///
/// 404 `metrics_not_computed` when the job has not run yet, 400 when the
/// user has no health profile.
async fn get_today(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ApiResponse<TodayMetrics>>> {
    let today = state.acknowledgments.today(&user.user_id, Utc::now()).await?;
    Ok(Json(ApiResponse::ok(today)))
}

/// Acknowledge today's snapshot. Idempotent.
async fn acknowledge(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<AcknowledgeRequest>,
) -> Result<Json<ApiResponse<AcknowledgeResponse>>> {
    let response = state
        .acknowledgments
        .acknowledge(&user.user_id, request, Utc::now())
        .await?;
    Ok(Json(ApiResponse::ok(response)))
}
