// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! JWT authentication middleware and session token helpers.

use crate::error::AppError;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Session cookie carrying the access token.
pub const SESSION_COOKIE: &str = "nutriplan_token";

const ACCESS_TOKEN_TTL_SECS: usize = 60 * 60; // 1 hour
const REFRESH_TOKEN_TTL_SECS: usize = 30 * 24 * 60 * 60; // 30 days

/// Which kind of session token a JWT is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenUse {
    Access,
    Refresh,
}

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
    pub token_use: TokenUse,
}

/// Authenticated user extracted from JWT.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
}

/// Middleware that requires a valid access token.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    // Try cookie first, then header
    let token = if let Some(cookie) = jar.get(SESSION_COOKIE) {
        cookie.value().to_string()
    } else {
        let auth_header = request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        match auth_header.and_then(|h| h.strip_prefix("Bearer ")) {
            Some(token) => token.to_string(),
            None => return Err(AppError::Unauthorized),
        }
    };

    let claims = decode_token(&token, &state.config.jwt_signing_key, TokenUse::Access)?;

    request.extensions_mut().insert(AuthUser {
        user_id: claims.sub,
    });

    Ok(next.run(request).await)
}

/// Decode and validate a token of the expected kind.
pub fn decode_token(token: &str, signing_key: &[u8], expected: TokenUse) -> Result<Claims, AppError> {
    let key = DecodingKey::from_secret(signing_key);
    let validation = Validation::new(Algorithm::HS256);

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| {
        tracing::debug!(error = %e, "Rejected session token");
        AppError::InvalidToken
    })?;

    if token_data.claims.token_use != expected || token_data.claims.sub.is_empty() {
        return Err(AppError::InvalidToken);
    }

    Ok(token_data.claims)
}

fn issue(
    user_id: &str,
    token_use: TokenUse,
    ttl_secs: usize,
    signing_key: &[u8],
) -> anyhow::Result<String> {
    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as usize;

    let claims = Claims {
        sub: user_id.to_string(),
        iat: now,
        exp: now + ttl_secs,
        token_use,
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )?)
}

/// Create a short-lived access token.
pub fn create_jwt(user_id: &str, signing_key: &[u8]) -> anyhow::Result<String> {
    issue(user_id, TokenUse::Access, ACCESS_TOKEN_TTL_SECS, signing_key)
}

/// Create a long-lived refresh token.
pub fn create_refresh_jwt(user_id: &str, signing_key: &[u8]) -> anyhow::Result<String> {
    issue(user_id, TokenUse::Refresh, REFRESH_TOKEN_TTL_SECS, signing_key)
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &[u8] = b"test_jwt_key_32_bytes_minimum!!";

    #[test]
    fn test_token_use_is_enforced() {
        let access = create_jwt("user-1", KEY).unwrap();
        let refresh = create_refresh_jwt("user-1", KEY).unwrap();

        assert_eq!(decode_token(&access, KEY, TokenUse::Access).unwrap().sub, "user-1");
        assert_eq!(decode_token(&refresh, KEY, TokenUse::Refresh).unwrap().sub, "user-1");
        assert!(matches!(
            decode_token(&refresh, KEY, TokenUse::Access),
            Err(AppError::InvalidToken)
        ));
        assert!(matches!(
            decode_token(&access, KEY, TokenUse::Refresh),
            Err(AppError::InvalidToken)
        ));
    }

    #[test]
    fn test_wrong_key_is_rejected() {
        let access = create_jwt("user-1", KEY).unwrap();
        assert!(decode_token(&access, b"some_other_key_of_similar_len!!", TokenUse::Access).is_err());
    }
}
