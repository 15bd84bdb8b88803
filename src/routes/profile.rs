// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Health profile routes.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{ApiResponse, HealthProfile, HealthProfileUpdate, HealthUpdateResponse};
use crate::AppState;
use axum::{extract::State, routing::get, Extension, Json, Router};
use chrono::Utc;
use std::sync::Arc;

/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route(
        "/auth/profile/health",
        get(get_health_profile).put(update_health_profile),
    )
}

async fn get_health_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ApiResponse<HealthProfile>>> {
    let profile = state
        .profiles
        .get(&user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Health profile".to_string()))?;

    Ok(Json(ApiResponse::ok(profile)))
}

/// Update weight/height/etc. (metric units).
///
/// Recomputes metrics and, when the gate allows, the plan.
async fn update_health_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(update): Json<HealthProfileUpdate>,
) -> Result<Json<ApiResponse<HealthUpdateResponse>>> {
    let response = state
        .profiles
        .update_health(&user.user_id, update, Utc::now())
        .await?;

    Ok(Json(ApiResponse::ok(response)))
}
