// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Significant-change detection between two plans.
//!
//! Only decides whether to show a before/after summary or notify the user.
//! It never blocks a recompute.

use crate::models::PlanTargets;

/// Calorie delta (kcal) that must be exceeded to count as significant.
pub const CALORIE_THRESHOLD: i64 = 50;

/// Protein delta (g) that must be exceeded to count as significant.
pub const PROTEIN_THRESHOLD: i64 = 10;

// TODO: validate the absolute thresholds against product data; users with
// very low or very high baselines may want relative thresholds instead.

/// Strictly greater than either threshold.
pub fn is_significant(old: &PlanTargets, new: &PlanTargets) -> bool {
    (new.calorie_target - old.calorie_target).abs() > CALORIE_THRESHOLD
        || (new.protein_target - old.protein_target).abs() > PROTEIN_THRESHOLD
}

/// `is_significant` against an optional previous plan; no previous plan
/// means nothing to compare.
pub fn is_significant_since(previous: Option<&PlanTargets>, new: &PlanTargets) -> bool {
    previous.is_some_and(|old| is_significant(old, new))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn targets(calories: i64, protein: i64) -> PlanTargets {
        PlanTargets {
            calorie_target: calories,
            protein_target: protein,
            water_target: 2500,
            estimated_weeks: None,
        }
    }

    #[test]
    fn test_exact_thresholds_are_not_significant() {
        assert!(!is_significant(&targets(2000, 150), &targets(2050, 160)));
        assert!(!is_significant(&targets(2000, 150), &targets(1950, 140)));
    }

    #[test]
    fn test_one_past_threshold_is_significant() {
        assert!(is_significant(&targets(2000, 150), &targets(2051, 150)));
        assert!(is_significant(&targets(2000, 150), &targets(2000, 161)));
        assert!(is_significant(&targets(2000, 150), &targets(1949, 150)));
    }

    #[test]
    fn test_calorie_breach_alone_is_enough() {
        // 1800 -> 1700 kcal, 150 -> 145 g
        assert!(is_significant(&targets(1800, 150), &targets(1700, 145)));
    }

    #[test]
    fn test_water_and_weeks_are_ignored() {
        let mut new = targets(2000, 150);
        new.water_target = 4000;
        new.estimated_weeks = Some(12);
        assert!(!is_significant(&targets(2000, 150), &new));
    }

    #[test]
    fn test_no_previous_plan() {
        assert!(!is_significant_since(None, &targets(2000, 150)));
        assert!(is_significant_since(
            Some(&targets(2200, 150)),
            &targets(2000, 150)
        ));
    }
}
