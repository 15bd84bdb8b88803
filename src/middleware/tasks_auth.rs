// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Scheduler authentication middleware for `/tasks/*` routes.

use crate::AppState;
use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use subtle::ConstantTimeEq;

/// Header carrying the scheduler's shared secret.
pub const TASKS_TOKEN_HEADER: &str = "x-tasks-token";

/// Require the shared scheduler token on `/tasks/*` routes.
pub async fn require_tasks_auth(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let presented = request
        .headers()
        .get(TASKS_TOKEN_HEADER)
        .map(|h| h.as_bytes())
        .unwrap_or_default();

    if !token_matches(presented, state.config.tasks_token.as_bytes()) {
        tracing::warn!(
            present = !presented.is_empty(),
            "Blocked tasks request with invalid token"
        );
        return Err(StatusCode::FORBIDDEN);
    }

    Ok(next.run(request).await)
}

fn token_matches(presented: &[u8], expected: &[u8]) -> bool {
    !expected.is_empty() && bool::from(presented.ct_eq(expected))
}
