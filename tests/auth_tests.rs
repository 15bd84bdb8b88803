// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session token tests: bearer and cookie auth, token kinds, refresh.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use serde_json::json;
use tower::ServiceExt;

mod common;
use common::{access_token, create_test_app, refresh_token, send};

#[tokio::test]
async fn test_health_is_public() {
    let (app, _) = create_test_app();
    let (status, _) = send(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let (app, _) = create_test_app();

    for (method, uri) in [
        ("GET", "/v1/nutrition/plan"),
        ("POST", "/v1/nutrition/plan/recompute"),
        ("GET", "/v1/profile/metrics/today"),
        ("POST", "/v1/profile/metrics/acknowledge"),
        ("GET", "/auth/profile/health"),
        ("PUT", "/auth/profile/health"),
    ] {
        let (status, body) = send(&app, method, uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri}");
        assert_eq!(body["error"], "unauthorized");
    }
}

#[tokio::test]
async fn test_garbage_token_rejected() {
    let (app, _) = create_test_app();
    let (status, body) = send(&app, "GET", "/v1/nutrition/plan", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid_token");
}

#[tokio::test]
async fn test_refresh_token_is_not_an_access_token() {
    let (app, _) = create_test_app();
    let token = refresh_token("user-1");
    let (status, _) = send(&app, "GET", "/v1/profile/metrics/today", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_session_cookie_authenticates() {
    let (app, _) = create_test_app();
    let token = access_token("user-1");

    let request = Request::builder()
        .method("GET")
        .uri("/auth/profile/health")
        .header(header::COOKIE, format!("nutriplan_token={token}"))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    // Authenticated, but no profile stored yet
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_refresh_issues_new_pair() {
    let (app, _) = create_test_app();

    let body = json!({ "refreshToken": refresh_token("user-1") });
    let (status, pair) = send(&app, "POST", "/auth/refresh", None, Some(body)).await;
    assert_eq!(status, StatusCode::OK);

    let access = pair["accessToken"].as_str().unwrap();
    assert!(pair["refreshToken"].is_string());

    let (status, _) = send(&app, "GET", "/v1/profile/metrics/today", Some(access), None).await;
    // Valid session; the user simply has no profile yet
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_refresh_rejects_access_token() {
    let (app, _) = create_test_app();

    let body = json!({ "refreshToken": access_token("user-1") });
    let (status, _) = send(&app, "POST", "/auth/refresh", None, Some(body)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_responses_carry_security_headers() {
    let (app, _) = create_test_app();
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    let headers = response.headers();
    assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
    assert_eq!(headers.get(header::CACHE_CONTROL).unwrap(), "no-store");
}
