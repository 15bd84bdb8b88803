// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Health profile model (demographics, activity level, goal).
//!
//! All values are metric. Imperial input must be converted before it
//! reaches this crate.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

/// Biological sex used by the BMR equation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
}

/// Self-reported activity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    /// Little or no exercise
    Sedentary,
    /// 1-3 days/week
    LightlyActive,
    /// 3-5 days/week
    ModeratelyActive,
    /// 6-7 days/week
    VeryActive,
    /// Hard training twice a day
    ExtraActive,
}

impl ActivityLevel {
    /// TDEE multiplier applied to BMR.
    pub fn factor(self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::LightlyActive => 1.375,
            ActivityLevel::ModeratelyActive => 1.55,
            ActivityLevel::VeryActive => 1.725,
            ActivityLevel::ExtraActive => 1.9,
        }
    }

    /// Extra daily water (ml) on top of the body-weight baseline.
    pub fn water_bonus_ml(self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 0.0,
            ActivityLevel::LightlyActive => 250.0,
            ActivityLevel::ModeratelyActive => 500.0,
            ActivityLevel::VeryActive => 750.0,
            ActivityLevel::ExtraActive => 1000.0,
        }
    }
}

/// Nutrition goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    LoseWeight,
    Maintain,
    GainWeight,
    BuildMuscle,
}

impl Goal {
    /// Daily calorie adjustment relative to TDEE (kcal).
    pub fn calorie_delta(self) -> f64 {
        match self {
            Goal::LoseWeight => -500.0,
            Goal::Maintain => 0.0,
            Goal::GainWeight => 300.0,
            Goal::BuildMuscle => 250.0,
        }
    }

    /// Protein grams per kilogram of body weight.
    pub fn protein_g_per_kg(self) -> f64 {
        match self {
            Goal::Maintain => 1.6,
            Goal::GainWeight => 1.8,
            Goal::LoseWeight => 2.0,
            Goal::BuildMuscle => 2.2,
        }
    }
}

/// A user's stored health profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthProfile {
    /// Owner (also used as document ID)
    pub user_id: String,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub age: u32,
    pub gender: Gender,
    pub activity_level: ActivityLevel,
    pub goal: Goal,
    /// Optional goal weight; drives `estimatedWeeks`
    #[serde(default)]
    pub target_weight_kg: Option<f64>,
    /// Last update (RFC 3339)
    pub updated_at: String,
}

impl HealthProfile {
    /// Whether BMR/TDEE inputs differ between two profiles.
    ///
    /// A change here requires a new metrics snapshot (and a new
    /// acknowledgment) before the plan can be regenerated.
    pub fn metrics_inputs_changed(&self, other: &HealthProfile) -> bool {
        self.weight_kg != other.weight_kg
            || self.height_cm != other.height_cm
            || self.age != other.age
            || self.gender != other.gender
            || self.activity_level != other.activity_level
    }

    /// Stable fingerprint of every input the plan engine reads.
    pub fn plan_fingerprint(&self) -> String {
        format!(
            "{}|{}|{}|{:?}|{:?}|{:?}|{}",
            self.weight_kg,
            self.height_cm,
            self.age,
            self.gender,
            self.activity_level,
            self.goal,
            self.target_weight_kg
                .map(|w| w.to_string())
                .unwrap_or_default()
        )
    }
}

/// Body of `PUT /auth/profile/health`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct HealthProfileUpdate {
    #[validate(range(min = 20.0, max = 500.0))]
    pub weight_kg: f64,
    #[validate(range(min = 50.0, max = 300.0))]
    pub height_cm: f64,
    #[validate(range(min = 13, max = 120))]
    pub age: u32,
    pub gender: Gender,
    pub activity_level: ActivityLevel,
    pub goal: Goal,
    #[validate(range(min = 20.0, max = 500.0))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_weight_kg: Option<f64>,
}

impl HealthProfileUpdate {
    /// Materialize a stored profile for `user_id`.
    pub fn into_profile(self, user_id: &str, updated_at: String) -> HealthProfile {
        HealthProfile {
            user_id: user_id.to_string(),
            weight_kg: self.weight_kg,
            height_cm: self.height_cm,
            age: self.age,
            gender: self.gender,
            activity_level: self.activity_level,
            goal: self.goal,
            target_weight_kg: self.target_weight_kg,
            updated_at,
        }
    }
}
