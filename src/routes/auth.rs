// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session token routes.

use axum::{extract::State, routing::post, Json, Router};
use std::sync::Arc;

use crate::error::Result;
use crate::middleware::auth::{create_jwt, create_refresh_jwt, decode_token, TokenUse};
use crate::models::{RefreshRequest, TokenPair};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/auth/refresh", post(refresh))
}

/// Exchange a refresh token for a new token pair.
async fn refresh(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RefreshRequest>,
) -> Result<Json<TokenPair>> {
    let key = &state.config.jwt_signing_key;
    let claims = decode_token(&body.refresh_token, key, TokenUse::Refresh)?;

    tracing::debug!("Issuing refreshed session tokens");

    Ok(Json(TokenPair {
        access_token: create_jwt(&claims.sub, key)?,
        refresh_token: create_refresh_jwt(&claims.sub, key)?,
    }))
}
