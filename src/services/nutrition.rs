// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Plan computation engine.
//!
//! Pure functions only: no I/O, no clock, no randomness. The same inputs
//! always produce bit-identical targets.
//!
//! - BMR: Mifflin-St Jeor (1990), `10w + 6.25h - 5a + s` with `s = +5` for
//!   men and `-161` for women.
//! - TDEE: BMR x activity factor (1.2 .. 1.9).
//! - Calories: TDEE + goal delta, never below [`MIN_CALORIE_TARGET`].
//! - Protein: body weight x goal coefficient (1.6 .. 2.2 g/kg).
//! - Water: 35 ml/kg plus an activity bonus.

use crate::models::{ActivityLevel, Gender, Goal, HealthMetricsSnapshot, HealthProfile, PlanTargets};

/// Lowest calorie target ever recommended (kcal/day).
pub const MIN_CALORIE_TARGET: f64 = 1200.0;

/// Energy stored in one kilogram of body mass (kcal).
pub const KCAL_PER_KG: f64 = 7700.0;

/// Baseline water intake per kilogram of body weight (ml).
pub const WATER_ML_PER_KG: f64 = 35.0;

/// Body measurements the engine reads. Metric units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Demographics {
    pub weight_kg: f64,
    pub height_cm: f64,
    pub age: u32,
    pub gender: Gender,
    pub target_weight_kg: Option<f64>,
}

impl HealthProfile {
    pub fn demographics(&self) -> Demographics {
        Demographics {
            weight_kg: self.weight_kg,
            height_cm: self.height_cm,
            age: self.age,
            gender: self.gender,
            target_weight_kg: self.target_weight_kg,
        }
    }
}

/// BMI/BMR/TDEE as produced for a metrics snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComputedMetrics {
    /// One decimal
    pub bmi: f64,
    pub bmr: i64,
    pub tdee: i64,
}

/// Mifflin-St Jeor BMR (kcal/day), unrounded.
pub fn calculate_bmr(demographics: &Demographics) -> f64 {
    let gender_constant = match demographics.gender {
        Gender::Male => 5.0,
        Gender::Female => -161.0,
    };

    10.0 * demographics.weight_kg + 6.25 * demographics.height_cm
        - 5.0 * f64::from(demographics.age)
        + gender_constant
}

/// TDEE (kcal/day), unrounded.
pub fn calculate_tdee(bmr: f64, activity_level: ActivityLevel) -> f64 {
    bmr * activity_level.factor()
}

/// BMI rounded to one decimal.
pub fn calculate_bmi(weight_kg: f64, height_cm: f64) -> f64 {
    let height_m = height_cm / 100.0;
    let bmi = weight_kg / (height_m * height_m);
    (bmi * 10.0).round() / 10.0
}

/// Metrics snapshot values for a profile.
pub fn compute_metrics(demographics: &Demographics, activity_level: ActivityLevel) -> ComputedMetrics {
    let bmr = calculate_bmr(demographics);
    ComputedMetrics {
        bmi: calculate_bmi(demographics.weight_kg, demographics.height_cm),
        bmr: bmr.round() as i64,
        tdee: calculate_tdee(bmr, activity_level).round() as i64,
    }
}

/// Compute daily targets.
///
/// When `metrics` is the acknowledged snapshot, its TDEE is the base (it is
/// the number the user reviewed). Without one, TDEE is derived from the
/// demographics.
pub fn compute_targets(
    demographics: &Demographics,
    activity_level: ActivityLevel,
    goal: Goal,
    metrics: Option<&HealthMetricsSnapshot>,
) -> PlanTargets {
    let tdee = match metrics {
        Some(snapshot) => snapshot.tdee as f64,
        None => calculate_tdee(calculate_bmr(demographics), activity_level),
    };

    let calories = (tdee + goal.calorie_delta()).max(MIN_CALORIE_TARGET);
    let protein = demographics.weight_kg * goal.protein_g_per_kg();
    let water = demographics.weight_kg * WATER_ML_PER_KG + activity_level.water_bonus_ml();

    PlanTargets {
        calorie_target: calories.round() as i64,
        protein_target: protein.round() as i64,
        water_target: water.round() as i64,
        estimated_weeks: estimate_weeks(demographics, goal, calories - tdee),
    }
}

/// Weeks to reach the target weight at the given daily energy balance.
///
/// `None` when there is no target weight, the balance is zero, or the
/// target lies in the opposite direction of the goal.
pub fn estimate_weeks(demographics: &Demographics, goal: Goal, daily_balance: f64) -> Option<i64> {
    let target = demographics.target_weight_kg?;
    let delta_kg = target - demographics.weight_kg;

    let heading_right_way = match goal {
        Goal::LoseWeight => delta_kg < 0.0 && daily_balance < 0.0,
        Goal::GainWeight | Goal::BuildMuscle => delta_kg > 0.0 && daily_balance > 0.0,
        Goal::Maintain => false,
    };
    if !heading_right_way {
        return None;
    }

    let weekly_kcal = daily_balance.abs() * 7.0;
    Some((delta_kg.abs() * KCAL_PER_KG / weekly_kcal).ceil() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn reference_person() -> Demographics {
        Demographics {
            weight_kg: 80.0,
            height_cm: 175.0,
            age: 30,
            gender: Gender::Male,
            target_weight_kg: None,
        }
    }

    #[test]
    fn test_mifflin_st_jeor() {
        let person = reference_person();
        assert_eq!(calculate_bmr(&person), 1748.75);

        let female = Demographics {
            gender: Gender::Female,
            ..person
        };
        assert_eq!(calculate_bmr(&female), 1582.75);
    }

    #[test]
    fn test_reference_scenario_targets() {
        let targets = compute_targets(
            &reference_person(),
            ActivityLevel::ModeratelyActive,
            Goal::LoseWeight,
            None,
        );

        // 1748.75 * 1.55 - 500 = 2210.56
        assert_eq!(targets.calorie_target, 2211);
        assert_eq!(targets.protein_target, 160);
        assert_eq!(targets.water_target, 3300);
        assert_eq!(targets.estimated_weeks, None);
    }

    #[test]
    fn test_compute_targets_is_deterministic() {
        let person = reference_person();
        let first = compute_targets(&person, ActivityLevel::ModeratelyActive, Goal::LoseWeight, None);
        for _ in 0..100 {
            let again =
                compute_targets(&person, ActivityLevel::ModeratelyActive, Goal::LoseWeight, None);
            assert_eq!(again, first);
        }
    }

    #[test]
    fn test_acknowledged_tdee_is_the_base() {
        let snapshot = HealthMetricsSnapshot {
            user_id: "u1".to_string(),
            bmi: 26.1,
            bmr: 1749,
            tdee: 2500,
            computed_at: Utc::now(),
            computed_day: "2026-03-01".to_string(),
            version: 1,
        };
        let targets = compute_targets(
            &reference_person(),
            ActivityLevel::ModeratelyActive,
            Goal::LoseWeight,
            Some(&snapshot),
        );
        assert_eq!(targets.calorie_target, 2000);
    }

    #[test]
    fn test_goal_deltas_and_protein() {
        let person = reference_person();
        let maintain = compute_targets(&person, ActivityLevel::Sedentary, Goal::Maintain, None);
        let gain = compute_targets(&person, ActivityLevel::Sedentary, Goal::GainWeight, None);
        let muscle = compute_targets(&person, ActivityLevel::Sedentary, Goal::BuildMuscle, None);

        // 1748.75 * 1.2 = 2098.5
        assert_eq!(maintain.calorie_target, 2099);
        assert_eq!(gain.calorie_target, 2399);
        assert_eq!(muscle.calorie_target, 2349);
        assert_eq!(maintain.protein_target, 128);
        assert_eq!(muscle.protein_target, 176);
        assert_eq!(maintain.water_target, 2800);
    }

    #[test]
    fn test_calorie_floor() {
        let small = Demographics {
            weight_kg: 40.0,
            height_cm: 150.0,
            age: 80,
            gender: Gender::Female,
            target_weight_kg: None,
        };
        let targets = compute_targets(&small, ActivityLevel::Sedentary, Goal::LoseWeight, None);
        assert_eq!(targets.calorie_target, MIN_CALORIE_TARGET as i64);
    }

    #[test]
    fn test_estimated_weeks() {
        let person = Demographics {
            target_weight_kg: Some(72.0),
            ..reference_person()
        };
        let targets = compute_targets(&person, ActivityLevel::ModeratelyActive, Goal::LoseWeight, None);
        // 8 kg * 7700 / (500 * 7) = 17.6
        assert_eq!(targets.estimated_weeks, Some(18));

        // Target above current weight while losing: not applicable
        let wrong_way = Demographics {
            target_weight_kg: Some(90.0),
            ..reference_person()
        };
        let targets =
            compute_targets(&wrong_way, ActivityLevel::ModeratelyActive, Goal::LoseWeight, None);
        assert_eq!(targets.estimated_weeks, None);

        let maintain = compute_targets(&person, ActivityLevel::ModeratelyActive, Goal::Maintain, None);
        assert_eq!(maintain.estimated_weeks, None);
    }

    #[test]
    fn test_compute_metrics() {
        let metrics = compute_metrics(&reference_person(), ActivityLevel::ModeratelyActive);
        assert_eq!(metrics.bmi, 26.1);
        assert_eq!(metrics.bmr, 1749);
        assert_eq!(metrics.tdee, 2711);
    }
}
