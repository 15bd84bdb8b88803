// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Nutrition plan routes.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::{ApiResponse, PlanResponse};
use crate::AppState;
use axum::{
    extract::{Query, State},
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;

/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/v1/nutrition/plan", get(get_plan))
        .route("/v1/nutrition/plan/recompute", post(recompute_plan))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlanQuery {
    #[serde(default)]
    force_recompute: bool,
}

async fn get_plan(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<PlanQuery>,
) -> Result<Json<ApiResponse<PlanResponse>>> {
    let plan = state
        .plans
        .get_plan(&user.user_id, query.force_recompute, Utc::now())
        .await?;
    Ok(Json(ApiResponse::ok(plan)))
}

async fn recompute_plan(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ApiResponse<PlanResponse>>> {
    let plan = state.plans.get_plan(&user.user_id, true, Utc::now()).await?;
    Ok(Json(ApiResponse::ok(plan)))
}
