// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Nutrition plan targets and the stored plan record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Daily nutrition targets. A pure value: same inputs, same targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct PlanTargets {
    /// kcal/day
    pub calorie_target: i64,
    /// grams/day
    pub protein_target: i64,
    /// ml/day
    pub water_target: i64,
    /// Weeks to reach the target weight. `None` means not applicable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_weeks: Option<i64>,
}

/// Last generated plan per user (document ID = user ID).
///
/// Kept for audit and to report `previousTargets` on the next recompute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredPlan {
    pub user_id: String,
    pub targets: PlanTargets,
    #[serde(default)]
    pub previous_targets: Option<PlanTargets>,
    /// `HealthProfile::plan_fingerprint` of the inputs used
    pub inputs_fingerprint: String,
    /// Version of the acknowledged snapshot used, if any
    #[serde(default)]
    pub metrics_version: Option<i64>,
    #[serde(default)]
    pub metrics_computed_at: Option<DateTime<Utc>>,
    pub generated_at: DateTime<Utc>,
}

/// `data` of the plan fetch/recompute endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct PlanResponse {
    #[serde(flatten)]
    pub targets: PlanTargets,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_targets: Option<PlanTargets>,
    #[serde(default)]
    pub significant_change: bool,
    pub generated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics_version: Option<i64>,
}

/// `data` of `PUT /auth/profile/health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct HealthUpdateResponse {
    pub plan_updated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub targets: Option<PlanTargets>,
    /// A new metrics snapshot was produced by this update
    #[serde(default)]
    pub metrics_recomputed: bool,
    /// The plan could not be regenerated until the new metrics are acknowledged
    #[serde(default)]
    pub acknowledgment_required: bool,
}
