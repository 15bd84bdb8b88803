// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Health metrics snapshots and their acknowledgments.
//!
//! Snapshots are written only by the metrics job and never modified
//! afterwards. An acknowledgment pins one exact `(version, computedAt)`
//! pair; it says nothing about any other snapshot, even one that reuses
//! the same version number.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Versioned BMI/BMR/TDEE snapshot for one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthMetricsSnapshot {
    pub user_id: String,
    /// Body mass index, one decimal
    pub bmi: f64,
    /// Basal metabolic rate (kcal/day)
    pub bmr: i64,
    /// Total daily energy expenditure (kcal/day)
    pub tdee: i64,
    pub computed_at: DateTime<Utc>,
    /// UTC calendar day of `computed_at` ("YYYY-MM-DD"), for day-window queries
    pub computed_day: String,
    pub version: i64,
}

impl HealthMetricsSnapshot {
    /// Wire view without storage-only fields.
    pub fn view(&self) -> MetricsView {
        MetricsView {
            bmi: self.bmi,
            bmr: self.bmr,
            tdee: self.tdee,
            computed_at: self.computed_at,
            version: self.version,
        }
    }

    /// Same numbers as `other`, ignoring version and timestamps.
    pub fn same_values(&self, other: &HealthMetricsSnapshot) -> bool {
        self.bmi == other.bmi && self.bmr == other.bmr && self.tdee == other.tdee
    }
}

/// A user's acknowledgment of one exact snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Acknowledgment {
    pub user_id: String,
    pub version: i64,
    pub metrics_computed_at: DateTime<Utc>,
    pub acknowledged_at: DateTime<Utc>,
}

impl Acknowledgment {
    /// Exact match on both version and computation timestamp.
    ///
    /// No tolerance: a timestamp that was truncated or rounded anywhere
    /// along the way does not match.
    pub fn matches(&self, snapshot: &HealthMetricsSnapshot) -> bool {
        self.user_id == snapshot.user_id
            && self.version == snapshot.version
            && self.metrics_computed_at == snapshot.computed_at
    }

    pub fn view(&self) -> AcknowledgementView {
        AcknowledgementView {
            acknowledged_at: self.acknowledged_at,
            version: self.version,
        }
    }
}

// ─── Wire Types ──────────────────────────────────────────────

/// `metrics` object of `GET /v1/profile/metrics/today`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct MetricsView {
    pub bmi: f64,
    pub bmr: i64,
    pub tdee: i64,
    pub computed_at: DateTime<Utc>,
    pub version: i64,
}

/// Human-readable explanations shown next to the numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
pub struct MetricsExplanations {
    pub bmi: String,
    pub bmr: String,
    pub tdee: String,
}

impl MetricsExplanations {
    pub fn for_metrics(metrics: &MetricsView) -> Self {
        Self {
            bmi: format!(
                "Your BMI is {:.1}, your weight relative to your height squared.",
                metrics.bmi
            ),
            bmr: format!(
                "Your body burns about {} kcal per day at complete rest.",
                metrics.bmr
            ),
            tdee: format!(
                "Including your activity level you burn about {} kcal per day.",
                metrics.tdee
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[serde(rename_all = "camelCase")]
pub struct AcknowledgementView {
    pub acknowledged_at: DateTime<Utc>,
    pub version: i64,
}

/// `data` of `GET /v1/profile/metrics/today`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct TodayMetrics {
    pub metrics: MetricsView,
    pub explanations: MetricsExplanations,
    pub acknowledged: bool,
    pub acknowledgement: Option<AcknowledgementView>,
}

/// Body of `POST /v1/profile/metrics/acknowledge`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[serde(rename_all = "camelCase")]
pub struct AcknowledgeRequest {
    pub version: i64,
    pub metrics_computed_at: DateTime<Utc>,
}

impl From<&MetricsView> for AcknowledgeRequest {
    fn from(metrics: &MetricsView) -> Self {
        Self {
            version: metrics.version,
            metrics_computed_at: metrics.computed_at,
        }
    }
}

/// `data` of `POST /v1/profile/metrics/acknowledge`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
pub struct AcknowledgeResponse {
    pub acknowledged: bool,
    pub acknowledgement: AcknowledgementView,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn snapshot(version: i64, computed_at: DateTime<Utc>) -> HealthMetricsSnapshot {
        HealthMetricsSnapshot {
            user_id: "u1".to_string(),
            bmi: 26.1,
            bmr: 1749,
            tdee: 2711,
            computed_at,
            computed_day: computed_at.format("%Y-%m-%d").to_string(),
            version,
        }
    }

    #[test]
    fn test_acknowledgment_requires_exact_timestamp() {
        let t1 = Utc.with_ymd_and_hms(2026, 3, 1, 6, 0, 0).unwrap() + Duration::milliseconds(437);
        let ack = Acknowledgment {
            user_id: "u1".to_string(),
            version: 3,
            metrics_computed_at: t1,
            acknowledged_at: t1 + Duration::minutes(5),
        };

        assert!(ack.matches(&snapshot(3, t1)));
        // Same version, truncated to whole seconds
        let truncated = Utc.with_ymd_and_hms(2026, 3, 1, 6, 0, 0).unwrap();
        assert!(!ack.matches(&snapshot(3, truncated)));
        assert!(!ack.matches(&snapshot(4, t1)));
    }

    #[test]
    fn test_computed_at_survives_json_roundtrip() {
        let t = Utc.with_ymd_and_hms(2026, 3, 1, 6, 0, 0).unwrap() + Duration::nanoseconds(123_456_789);
        let original = snapshot(1, t);
        let json = serde_json::to_string(&original).unwrap();
        let back: HealthMetricsSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back.computed_at, t);
        assert!(json.contains("\"computedAt\""));
    }
}
