// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client side of the plan API: request orchestrator, plan cache and the
//! per-login session that ties them together.

pub mod cache;
pub mod error;
pub mod orchestrator;
pub mod session;

pub use cache::{CacheState, CachedPlan, PlanCache, PlanSource, RefreshTask};
pub use error::ClientError;
pub use orchestrator::{MetricsLookup, RequestOrchestrator, RequestPhase, SessionTokens};
pub use session::{NutritionSession, PlanUpdate};

use std::time::Duration;

/// Default time-to-live of a cached plan.
pub const DEFAULT_PLAN_TTL: Duration = Duration::from_secs(60 * 60);

/// Default timeout for a single HTTP request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API base URL without a trailing slash, e.g. `https://api.example.com`
    pub base_url: String,
    pub plan_ttl: Duration,
    pub request_timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            plan_ttl: DEFAULT_PLAN_TTL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_plan_ttl(mut self, ttl: Duration) -> Self {
        self.plan_ttl = ttl;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}
