// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for storage and the HTTP API.
//!
//! Every wire type here is a plain value (owned fields, no interior
//! mutability), so one fetched response can be handed to the cache, the
//! UI layer and any logger on different tasks without locking.

pub mod auth;
pub mod metrics;
pub mod plan;
pub mod profile;

pub use auth::{RefreshRequest, TokenPair};
pub use metrics::{
    AcknowledgeRequest, AcknowledgeResponse, AcknowledgementView, Acknowledgment,
    HealthMetricsSnapshot, MetricsExplanations, MetricsView, TodayMetrics,
};
pub use plan::{HealthUpdateResponse, PlanResponse, PlanTargets, StoredPlan};
pub use profile::{ActivityLevel, Gender, Goal, HealthProfile, HealthProfileUpdate};

use serde::{Deserialize, Serialize};

/// `{ success, data }` envelope used by every successful JSON response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync + 'static>() {}

    #[test]
    fn test_wire_types_cross_task_boundaries() {
        assert_send_sync::<TodayMetrics>();
        assert_send_sync::<AcknowledgeResponse>();
        assert_send_sync::<PlanResponse>();
        assert_send_sync::<PlanTargets>();
        assert_send_sync::<HealthUpdateResponse>();
        assert_send_sync::<ApiResponse<PlanResponse>>();
    }
}
