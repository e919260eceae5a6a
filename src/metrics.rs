//! Health metric calculations — pure, deterministic, no I/O.
//!
//! BMR uses the Mifflin–St Jeor equation; TDEE scales BMR by a standard
//! activity multiplier; the daily calorie goal shifts TDEE by the user's
//! goal and is floored at [`MIN_DAILY_CALORIES`].

use serde::Serialize;

use crate::config::MIN_DAILY_CALORIES;
use crate::profile::{ActivityLevel, Gender, Goal, Profile};

/// Basal metabolic rate in kcal/day (Mifflin–St Jeor).
pub fn calculate_bmr(weight_kg: f64, height_cm: i32, age: i32, gender: Gender) -> f64 {
    let base = 10.0 * weight_kg + 6.25 * f64::from(height_cm) - 5.0 * f64::from(age);
    match gender {
        Gender::Male => base + 5.0,
        Gender::Female => base - 161.0,
    }
}

/// Multiplier applied to BMR for the given weekly activity level.
pub fn activity_multiplier(level: ActivityLevel) -> f64 {
    match level {
        ActivityLevel::Sedentary => 1.2,
        ActivityLevel::LightlyActive => 1.375,
        ActivityLevel::ModeratelyActive => 1.55,
        ActivityLevel::VeryActive => 1.725,
    }
}

/// Total daily energy expenditure in kcal/day.
pub fn calculate_tdee(bmr: f64, level: ActivityLevel) -> f64 {
    bmr * activity_multiplier(level)
}

/// Daily calorie goal: TDEE shifted by the dietary goal, truncated to an
/// integer and clamped to a minimum of [`MIN_DAILY_CALORIES`].
pub fn calculate_daily_calorie_goal(tdee: f64, goal: Goal) -> i32 {
    let adjusted = match goal {
        Goal::LoseWeight => tdee - 500.0,
        Goal::Maintain => tdee,
        Goal::GainMuscle => tdee + 300.0,
    };
    (adjusted as i32).max(MIN_DAILY_CALORIES)
}

/// Body mass index: weight over height squared, metric.
pub fn calculate_bmi(weight_kg: f64, height_cm: i32) -> f64 {
    let height_m = f64::from(height_cm) / 100.0;
    weight_kg / (height_m * height_m)
}

/// BMI classification bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BmiClass {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl std::fmt::Display for BmiClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Underweight => "underweight",
            Self::Normal => "normal",
            Self::Overweight => "overweight",
            Self::Obese => "obese",
        };
        write!(f, "{s}")
    }
}

pub fn classify_bmi(bmi: f64) -> BmiClass {
    if bmi < 18.5 {
        BmiClass::Underweight
    } else if bmi < 25.0 {
        BmiClass::Normal
    } else if bmi < 30.0 {
        BmiClass::Overweight
    } else {
        BmiClass::Obese
    }
}

/// Everything derived from a profile, republished on every profile change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedMetrics {
    /// BMR truncated to whole kcal.
    pub bmr: i32,
    /// TDEE truncated to whole kcal.
    pub tdee: i32,
    pub daily_calorie_goal: i32,
    pub bmi: f64,
    pub bmi_class: BmiClass,
}

/// Compute all derived metrics for a profile.
///
/// Callers are responsible for the completeness guard
/// ([`Profile::has_complete_measurements`]); a zero height here would
/// divide by zero.
pub fn compute_all(profile: &Profile) -> DerivedMetrics {
    let bmr = calculate_bmr(profile.weight, profile.height, profile.age, profile.gender);
    let tdee = calculate_tdee(bmr, profile.activity_level);
    let bmi = calculate_bmi(profile.weight, profile.height);
    DerivedMetrics {
        bmr: bmr as i32,
        tdee: tdee as i32,
        daily_calorie_goal: calculate_daily_calorie_goal(tdee, profile.goal),
        bmi,
        bmi_class: classify_bmi(bmi),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bmr_male_reference_value() {
        let bmr = calculate_bmr(70.0, 175, 30, Gender::Male);
        assert!((bmr - 1648.75).abs() < 1e-9, "got {bmr}");
    }

    #[test]
    fn bmr_female_reference_value() {
        let bmr = calculate_bmr(70.0, 175, 30, Gender::Female);
        assert!((bmr - 1482.75).abs() < 1e-9, "got {bmr}");
    }

    #[test]
    fn activity_multipliers() {
        assert_eq!(activity_multiplier(ActivityLevel::Sedentary), 1.2);
        assert_eq!(activity_multiplier(ActivityLevel::LightlyActive), 1.375);
        assert_eq!(activity_multiplier(ActivityLevel::ModeratelyActive), 1.55);
        assert_eq!(activity_multiplier(ActivityLevel::VeryActive), 1.725);
    }

    #[test]
    fn tdee_scales_bmr() {
        let tdee = calculate_tdee(1648.75, ActivityLevel::ModeratelyActive);
        assert!((tdee - 1648.75 * 1.55).abs() < 1e-9);
    }

    #[test]
    fn calorie_goal_clamps_to_floor() {
        // 1000 - 500 = 500 < 1200, so the floor wins.
        assert_eq!(calculate_daily_calorie_goal(1000.0, Goal::LoseWeight), 1200);
    }

    #[test]
    fn calorie_goal_gain_muscle() {
        assert_eq!(calculate_daily_calorie_goal(2000.0, Goal::GainMuscle), 2300);
    }

    #[test]
    fn calorie_goal_maintain_truncates() {
        assert_eq!(calculate_daily_calorie_goal(1999.9, Goal::Maintain), 1999);
    }

    #[test]
    fn bmi_reference_value() {
        let bmi = calculate_bmi(70.0, 175);
        assert!((bmi - 22.857142857142858).abs() < 1e-9, "got {bmi}");
        assert_eq!(classify_bmi(bmi), BmiClass::Normal);
    }

    #[test]
    fn bmi_class_boundaries() {
        assert_eq!(classify_bmi(18.499), BmiClass::Underweight);
        assert_eq!(classify_bmi(18.5), BmiClass::Normal);
        assert_eq!(classify_bmi(24.999), BmiClass::Normal);
        assert_eq!(classify_bmi(25.0), BmiClass::Overweight);
        assert_eq!(classify_bmi(29.999), BmiClass::Overweight);
        assert_eq!(classify_bmi(30.0), BmiClass::Obese);
    }

    #[test]
    fn compute_all_truncates_to_integers() {
        let profile = Profile {
            id: "uid-1".to_string(),
            email: "a@example.com".to_string(),
            age: 30,
            height: 175,
            weight: 70.0,
            gender: Gender::Male,
            goal: Goal::LoseWeight,
            activity_level: ActivityLevel::Sedentary,
            onboarding_completed: true,
        };
        let metrics = compute_all(&profile);
        // BMR 1648.75 -> 1648; TDEE 1978.5 -> 1978; goal 1978.5 - 500 -> 1478.
        assert_eq!(metrics.bmr, 1648);
        assert_eq!(metrics.tdee, 1978);
        assert_eq!(metrics.daily_calorie_goal, 1478);
        assert_eq!(metrics.bmi_class, BmiClass::Normal);
    }
}
