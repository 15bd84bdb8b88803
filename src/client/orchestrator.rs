// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Request orchestrator: the network round-trips behind the plan cache.
//!
//! Holds only the session tokens and an informational in-flight counter.
//! Every value it returns is an owned, immutable wire type that can be
//! handed to other tasks freely.
//!
//! Retries are left to the caller, with one exception: a 401 triggers a
//! single silent token refresh and retry before `AuthExpired` surfaces.

use crate::client::cache::PlanSource;
use crate::client::error::ClientError;
use crate::client::ClientConfig;
use crate::error::ErrorResponse;
use crate::models::{
    AcknowledgeRequest, AcknowledgeResponse, ApiResponse, HealthProfileUpdate,
    HealthUpdateResponse, MetricsView, PlanResponse, RefreshRequest, TodayMetrics, TokenPair,
};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};
use tokio::sync::Mutex;

/// Access/refresh token pair held for the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
}

impl From<TokenPair> for SessionTokens {
    fn from(pair: TokenPair) -> Self {
        Self {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
        }
    }
}

/// Lifecycle of the most recent logical operation.
///
/// Informational only: with concurrent calls it may briefly lag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestPhase {
    Idle,
    InFlight,
    Succeeded,
    Failed,
}

const OUTCOME_NONE: u8 = 0;
const OUTCOME_SUCCEEDED: u8 = 1;
const OUTCOME_FAILED: u8 = 2;

/// Result of looking up today's metrics.
///
/// "Not computed yet" is a value, not an error; a validation failure stays
/// an error and is never folded into it.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricsLookup {
    Available(Box<TodayMetrics>),
    NotYetComputed,
}

impl MetricsLookup {
    /// Whether the user must acknowledge before a plan can be generated.
    pub fn requires_acknowledgment(&self) -> bool {
        match self {
            MetricsLookup::Available(today) => !today.acknowledged,
            MetricsLookup::NotYetComputed => false,
        }
    }

    pub fn metrics(&self) -> Option<&TodayMetrics> {
        match self {
            MetricsLookup::Available(today) => Some(today),
            MetricsLookup::NotYetComputed => None,
        }
    }
}

pub struct RequestOrchestrator {
    http: reqwest::Client,
    base_url: String,
    tokens: RwLock<Option<SessionTokens>>,
    /// Serializes token refreshes
    refresh_lock: Mutex<()>,
    in_flight: AtomicUsize,
    last_outcome: AtomicU8,
}

/// Decrements the in-flight counter even if the caller stops awaiting.
struct InFlightGuard<'a>(&'a AtomicUsize);

impl<'a> InFlightGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::Relaxed);
        Self(counter)
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::Relaxed);
    }
}

impl RequestOrchestrator {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ClientError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            tokens: RwLock::new(None),
            refresh_lock: Mutex::new(()),
            in_flight: AtomicUsize::new(0),
            last_outcome: AtomicU8::new(OUTCOME_NONE),
        })
    }

    pub fn with_tokens(self, tokens: SessionTokens) -> Self {
        self.set_tokens(tokens);
        self
    }

    pub fn set_tokens(&self, tokens: SessionTokens) {
        *self.tokens.write().unwrap_or_else(PoisonError::into_inner) = Some(tokens);
    }

    pub fn clear_tokens(&self) {
        *self.tokens.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn tokens(&self) -> Option<SessionTokens> {
        self.tokens
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn phase(&self) -> RequestPhase {
        if self.in_flight.load(Ordering::Relaxed) > 0 {
            return RequestPhase::InFlight;
        }
        match self.last_outcome.load(Ordering::Relaxed) {
            OUTCOME_SUCCEEDED => RequestPhase::Succeeded,
            OUTCOME_FAILED => RequestPhase::Failed,
            _ => RequestPhase::Idle,
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.phase() == RequestPhase::InFlight
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // ─── Endpoints ───────────────────────────────────────────────

    /// `GET /v1/profile/metrics/today`.
    pub async fn today_metrics(&self) -> Result<MetricsLookup, ClientError> {
        let url = self.url("/v1/profile/metrics/today");
        match self.execute::<TodayMetrics, _>(|http| http.get(&url)).await {
            Ok(today) => Ok(MetricsLookup::Available(Box::new(today))),
            Err(ClientError::MetricsNotYetComputed) => Ok(MetricsLookup::NotYetComputed),
            // A 404 from this endpoint means no snapshot yet, coded or not
            Err(ClientError::Server { status: 404, .. }) => Ok(MetricsLookup::NotYetComputed),
            Err(e) => Err(e),
        }
    }

    /// `POST /v1/profile/metrics/acknowledge` for exactly this snapshot.
    pub async fn acknowledge(&self, metrics: &MetricsView) -> Result<AcknowledgeResponse, ClientError> {
        let url = self.url("/v1/profile/metrics/acknowledge");
        let body = AcknowledgeRequest::from(metrics);
        self.execute(|http| http.post(&url).json(&body)).await
    }

    /// `PUT /auth/profile/health`. Metric units only.
    pub async fn update_health_profile(
        &self,
        update: &HealthProfileUpdate,
    ) -> Result<HealthUpdateResponse, ClientError> {
        let url = self.url("/auth/profile/health");
        self.execute(|http| http.put(&url).json(update)).await
    }

    /// `GET /v1/nutrition/plan?forceRecompute=..`.
    pub async fn request_plan(&self, force_recompute: bool) -> Result<PlanResponse, ClientError> {
        let url = self.url(&format!(
            "/v1/nutrition/plan?forceRecompute={}",
            force_recompute
        ));
        self.execute(|http| http.get(&url)).await
    }

    // ─── Plumbing ────────────────────────────────────────────────

    async fn execute<T, F>(&self, build: F) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        F: Fn(&reqwest::Client) -> reqwest::RequestBuilder,
    {
        let _guard = InFlightGuard::enter(&self.in_flight);
        let result = self.execute_with_refresh(&build).await;

        let outcome = if result.is_ok() {
            OUTCOME_SUCCEEDED
        } else {
            OUTCOME_FAILED
        };
        self.last_outcome.store(outcome, Ordering::Relaxed);

        result
    }

    async fn execute_with_refresh<T, F>(&self, build: &F) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        F: Fn(&reqwest::Client) -> reqwest::RequestBuilder,
    {
        let access_token = self.access_token()?;
        let response = build(&self.http).bearer_auth(&access_token).send().await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return decode(response).await;
        }

        tracing::debug!("Access token rejected, refreshing session");
        self.refresh_session(&access_token).await?;

        // Exactly one retry; a second 401 surfaces as AuthExpired
        let access_token = self.access_token()?;
        let response = build(&self.http).bearer_auth(&access_token).send().await?;
        decode(response).await
    }

    fn access_token(&self) -> Result<String, ClientError> {
        self.tokens()
            .map(|t| t.access_token)
            .ok_or(ClientError::AuthExpired)
    }

    /// Refresh the session unless another request already did so after
    /// `rejected` was handed out.
    async fn refresh_session(&self, rejected: &str) -> Result<(), ClientError> {
        let _guard = self.refresh_lock.lock().await;

        // Re-check after acquiring the lock
        let current = self.tokens().ok_or(ClientError::AuthExpired)?;
        if current.access_token != rejected {
            return Ok(());
        }

        let response = self
            .http
            .post(self.url("/auth/refresh"))
            .json(&RefreshRequest {
                refresh_token: current.refresh_token,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), "Session refresh rejected");
            self.clear_tokens();
            return Err(ClientError::AuthExpired);
        }

        let pair: TokenPair = response
            .json()
            .await
            .map_err(|e| ClientError::Network(format!("Invalid refresh response: {}", e)))?;
        self.set_tokens(pair.into());

        tracing::info!("Session tokens refreshed");
        Ok(())
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
    let status = response.status();

    if status.is_success() {
        let envelope: ApiResponse<T> = response
            .json()
            .await
            .map_err(|e| ClientError::Network(format!("Invalid response body: {}", e)))?;
        return Ok(envelope.data);
    }

    let body = response.json::<ErrorResponse>().await.ok();
    Err(ClientError::from_response(status, body))
}

impl PlanSource for RequestOrchestrator {
    async fn fetch_plan(&self, force_recompute: bool) -> Result<PlanResponse, ClientError> {
        self.request_plan(force_recompute).await
    }
}
