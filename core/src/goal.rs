//! Daily calorie goal from body metrics (Mifflin-St Jeor), plus the
//! target-weight planning helpers used by the profile screen.
//!
//! Goal values are truncated toward zero when converted to whole kilocalories.
//! They are never floored at zero, except by the explicit minimums in
//! [`goal_with_target`].

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::EngineError;
use crate::models::{UserProfile, WeightGoal};
use crate::nutrients::{KCAL_PER_G_CARBS, KCAL_PER_G_FAT, KCAL_PER_G_PROTEIN};

pub const GOAL_ADJUSTMENT_KCAL: f64 = 500.0;
pub const CALORIES_PER_KG: f64 = 7700.0;
pub const MAX_DAILY_DEFICIT: i64 = 1000;
pub const MAX_DAILY_SURPLUS: i64 = 500;
pub const MIN_CALORIES_MALE: i64 = 1500;
pub const MIN_CALORIES_FEMALE: i64 = 1200;

fn check_metric(field: &'static str, value: f64) -> Result<(), EngineError> {
    if value.is_nan() || value.is_infinite() || value <= 0.0 {
        return Err(EngineError::InvalidBodyMetric { field, value });
    }
    Ok(())
}

/// Whole kilocalories, truncated toward zero.
fn truncate_kcal(kcal: f64) -> i64 {
    kcal.trunc() as i64
}

/// Basal metabolic rate in kcal/day: `10w + 6.25h - 5a + (male ? 5 : -5)`.
#[allow(clippy::cast_precision_loss)]
pub fn bmr(weight_kg: f64, height_cm: f64, age: i64, is_male: bool) -> Result<f64, EngineError> {
    check_metric("weight_kg", weight_kg)?;
    check_metric("height_cm", height_cm)?;
    if age <= 0 {
        return Err(EngineError::InvalidBodyMetric {
            field: "age",
            value: age as f64,
        });
    }
    let sex_offset = if is_male { 5.0 } else { -5.0 };
    Ok(10.0 * weight_kg + 6.25 * height_cm - 5.0 * age as f64 + sex_offset)
}

#[must_use]
pub fn tdee(bmr: f64, activity_multiplier: f64) -> f64 {
    bmr * activity_multiplier
}

#[must_use]
pub fn adjust_for_goal(tdee: f64, goal: WeightGoal) -> f64 {
    match goal {
        WeightGoal::Lose => tdee - GOAL_ADJUSTMENT_KCAL,
        WeightGoal::Maintain => tdee,
        WeightGoal::Gain => tdee + GOAL_ADJUSTMENT_KCAL,
    }
}

/// Daily calorie goal: BMR, times the activity multiplier, shifted by 500 kcal
/// for lose/gain, truncated to an integer. The result may be negative.
pub fn compute_daily_goal(
    weight_kg: f64,
    height_cm: f64,
    age: i64,
    is_male: bool,
    activity_multiplier: f64,
    weight_goal: WeightGoal,
) -> Result<i64, EngineError> {
    let bmr = bmr(weight_kg, height_cm, age, is_male)?;
    let tdee = tdee(bmr, activity_multiplier);
    Ok(truncate_kcal(adjust_for_goal(tdee, weight_goal)))
}

/// Goal for a stored profile. When the profile names a target weight and a
/// target date still in the future, the goal is derived from the required
/// daily deficit or surplus instead of the fixed 500 kcal shift.
pub fn goal_for_profile(profile: &UserProfile, today: NaiveDate) -> Result<i64, EngineError> {
    let is_male = profile.gender.is_male();
    let multiplier = profile.activity_level.multiplier();

    if let (Some(target), Some(date)) = (profile.target_weight_kg, profile.target_date) {
        let days = (date - today).num_days();
        if days > 0 && (target - profile.weight_kg).abs() > f64::EPSILON {
            let bmr = bmr(profile.weight_kg, profile.height_cm, profile.age, is_male)?;
            let tdee = tdee(bmr, multiplier);
            return Ok(goal_with_target(
                tdee,
                profile.weight_kg,
                target,
                days,
                is_male,
            ));
        }
    }

    compute_daily_goal(
        profile.weight_kg,
        profile.height_cm,
        profile.age,
        is_male,
        multiplier,
        profile.weight_goal,
    )
}

// --- Macro goals ---

/// Fractions of the calorie goal taken by each macro.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MacroRatios {
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
}

impl Default for MacroRatios {
    /// 30% protein, 40% carbs, 30% fat.
    fn default() -> Self {
        Self {
            protein: 0.30,
            carbs: 0.40,
            fat: 0.30,
        }
    }
}

/// Daily macro targets in grams.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MacroGoals {
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
}

/// Split a calorie goal into gram targets. A goal of 0 or less has no
/// targets.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn macro_goals(goal: i64, ratios: &MacroRatios) -> MacroGoals {
    if goal <= 0 {
        return MacroGoals::default();
    }
    let kcal = goal as f64;
    MacroGoals {
        protein_g: kcal * ratios.protein / KCAL_PER_G_PROTEIN,
        carbs_g: kcal * ratios.carbs / KCAL_PER_G_CARBS,
        fat_g: kcal * ratios.fat / KCAL_PER_G_FAT,
    }
}

// --- Body composition ---

pub fn bmi(weight_kg: f64, height_cm: f64) -> Result<f64, EngineError> {
    check_metric("weight_kg", weight_kg)?;
    check_metric("height_cm", height_cm)?;
    let meters = height_cm / 100.0;
    Ok(weight_kg / (meters * meters))
}

/// BMI bands for Asian adults (WHO 2004).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    PreObese,
    ObeseClassI,
    ObeseClassII,
    ObeseClassIII,
}

impl BmiCategory {
    #[must_use]
    pub fn from_bmi(bmi: f64) -> Self {
        if bmi < 18.5 {
            BmiCategory::Underweight
        } else if bmi < 23.0 {
            BmiCategory::Normal
        } else if bmi < 25.0 {
            BmiCategory::Overweight
        } else if bmi < 30.0 {
            BmiCategory::PreObese
        } else if bmi < 35.0 {
            BmiCategory::ObeseClassI
        } else if bmi < 40.0 {
            BmiCategory::ObeseClassII
        } else {
            BmiCategory::ObeseClassIII
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            BmiCategory::Underweight => "Underweight",
            BmiCategory::Normal => "Normal",
            BmiCategory::Overweight => "Overweight",
            BmiCategory::PreObese => "Pre-obese",
            BmiCategory::ObeseClassI => "Obese class I",
            BmiCategory::ObeseClassII => "Obese class II",
            BmiCategory::ObeseClassIII => "Obese class III",
        }
    }
}

/// Devine ideal body weight in kg.
pub fn ideal_weight_kg(height_cm: f64, is_male: bool) -> Result<f64, EngineError> {
    check_metric("height_cm", height_cm)?;
    let inches = height_cm / 2.54;
    let base = if is_male { 50.0 } else { 45.5 };
    Ok(base + 2.3 * (inches - 60.0))
}

// --- Target weight planning ---

/// Daily kcal change needed to move from `current_kg` to `target_kg` in
/// `days`. Positive means a deficit. Capped at a 1000 kcal deficit and a
/// 500 kcal surplus; 0 when `days <= 0`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn daily_adjustment(current_kg: f64, target_kg: f64, days: i64) -> i64 {
    if days <= 0 {
        return 0;
    }
    let total = (current_kg - target_kg) * CALORIES_PER_KG;
    let adjustment = (total / days as f64).round() as i64;
    if adjustment > 0 {
        adjustment.min(MAX_DAILY_DEFICIT)
    } else {
        adjustment.max(-MAX_DAILY_SURPLUS)
    }
}

/// Goal when aiming at a target weight by a date, never below the per-sex
/// minimum intake.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn goal_with_target(
    tdee: f64,
    current_kg: f64,
    target_kg: f64,
    days: i64,
    is_male: bool,
) -> i64 {
    let adjustment = daily_adjustment(current_kg, target_kg, days);
    let goal = truncate_kcal(tdee - adjustment as f64);
    let minimum = if is_male {
        MIN_CALORIES_MALE
    } else {
        MIN_CALORIES_FEMALE
    };
    goal.max(minimum)
}

/// Days needed to cover the gap between `current_kg` and `target_kg` at
/// `weekly_rate_kg`. 0 when the rate is not positive.
#[must_use]
pub fn days_to_goal(current_kg: f64, target_kg: f64, weekly_rate_kg: f64) -> i64 {
    if weekly_rate_kg <= 0.0 {
        return 0;
    }
    let weeks = (current_kg - target_kg).abs() / weekly_rate_kg;
    (weeks * 7.0).round() as i64
}

/// Kilograms per week needed to reach the target in `days`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn weekly_rate(current_kg: f64, target_kg: f64, days: i64) -> f64 {
    if days <= 0 {
        return 0.0;
    }
    (current_kg - target_kg).abs() / (days as f64 / 7.0)
}

#[must_use]
pub fn is_weekly_rate_safe(weekly_rate_kg: f64, losing: bool) -> bool {
    if weekly_rate_kg < 0.1 {
        return true;
    }
    if losing {
        weekly_rate_kg <= 1.0
    } else {
        weekly_rate_kg <= 0.5
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RatePace {
    VerySlow,
    SlowAndSafe,
    Moderate,
    Fast,
    TooFast,
    NotRecommended,
}

impl RatePace {
    #[must_use]
    pub fn classify(weekly_rate_kg: f64, losing: bool) -> Self {
        if weekly_rate_kg < 0.25 {
            RatePace::VerySlow
        } else if weekly_rate_kg <= 0.5 {
            RatePace::SlowAndSafe
        } else if weekly_rate_kg <= 0.75 {
            if losing {
                RatePace::Moderate
            } else {
                RatePace::Fast
            }
        } else if weekly_rate_kg <= 1.0 {
            if losing {
                RatePace::Fast
            } else {
                RatePace::TooFast
            }
        } else {
            RatePace::NotRecommended
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ActivityLevel, Gender};

    fn profile() -> UserProfile {
        UserProfile {
            name: "Minh".to_string(),
            age: 30,
            height_cm: 175.0,
            weight_kg: 70.0,
            gender: Gender::Male,
            activity_level: ActivityLevel::Moderate,
            weight_goal: WeightGoal::Maintain,
            target_weight_kg: None,
            target_date: None,
            daily_calorie_goal: 0,
        }
    }

    #[test]
    fn test_reference_goal() {
        let bmr = bmr(70.0, 175.0, 30, true).unwrap();
        assert!((bmr - 1648.75).abs() < 1e-9);
        assert!((tdee(bmr, 1.55) - 2555.5625).abs() < 1e-9);
        let goal = compute_daily_goal(70.0, 175.0, 30, true, 1.55, WeightGoal::Maintain).unwrap();
        assert_eq!(goal, 2555);
    }

    #[test]
    fn test_lose_and_gain_shift_by_500() {
        let maintain =
            compute_daily_goal(70.0, 175.0, 30, true, 1.55, WeightGoal::Maintain).unwrap();
        let lose = compute_daily_goal(70.0, 175.0, 30, true, 1.55, WeightGoal::Lose).unwrap();
        let gain = compute_daily_goal(70.0, 175.0, 30, true, 1.55, WeightGoal::Gain).unwrap();
        assert_eq!(lose, maintain - 500);
        assert_eq!(gain, maintain + 500);
    }

    #[test]
    fn test_female_offset() {
        let male = bmr(60.0, 160.0, 40, true).unwrap();
        let female = bmr(60.0, 160.0, 40, false).unwrap();
        assert!((male - female - 10.0).abs() < 1e-9);
        // 600 + 1000 - 200 - 5
        assert!((female - 1395.0).abs() < 1e-9);
    }

    #[test]
    fn test_truncates_instead_of_rounding() {
        // BMR 1648.75 * 1.2 = 1978.5, which rounding would turn into 1979.
        let goal = compute_daily_goal(70.0, 175.0, 30, true, 1.2, WeightGoal::Maintain).unwrap();
        assert_eq!(goal, 1978);
    }

    #[test]
    fn test_goal_is_not_floored_at_zero() {
        // Tiny, very old body: BMR is negative after the age term.
        let goal = compute_daily_goal(1.0, 1.0, 200, false, 1.2, WeightGoal::Lose).unwrap();
        assert!(goal < 0);
        // (10 + 6.25 - 1000 - 5) * 1.2 - 500 = -1686.5, truncated toward zero
        assert_eq!(goal, -1686);
    }

    #[test]
    fn test_invalid_body_metrics() {
        assert_eq!(
            compute_daily_goal(0.0, 175.0, 30, true, 1.55, WeightGoal::Maintain),
            Err(EngineError::InvalidBodyMetric {
                field: "weight_kg",
                value: 0.0
            })
        );
        assert!(compute_daily_goal(70.0, -1.0, 30, true, 1.55, WeightGoal::Maintain).is_err());
        assert!(compute_daily_goal(70.0, 175.0, 0, true, 1.55, WeightGoal::Maintain).is_err());
        assert!(compute_daily_goal(f64::NAN, 175.0, 30, true, 1.55, WeightGoal::Maintain).is_err());
    }

    #[test]
    fn test_out_of_range_activity_uses_moderate_multiplier() {
        let fallback = ActivityLevel::from_level(9).multiplier();
        let goal =
            compute_daily_goal(70.0, 175.0, 30, true, fallback, WeightGoal::Maintain).unwrap();
        assert_eq!(goal, 2555);
    }

    #[test]
    fn test_goal_for_profile_without_target() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        assert_eq!(goal_for_profile(&profile(), today).unwrap(), 2555);

        let mut losing = profile();
        losing.weight_goal = WeightGoal::Lose;
        assert_eq!(goal_for_profile(&losing, today).unwrap(), 2055);
    }

    #[test]
    fn test_goal_for_profile_with_target() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let mut p = profile();
        p.target_weight_kg = Some(65.0);
        p.target_date = Some(today + chrono::Duration::days(70));
        // 5 kg * 7700 / 70 days = 550 kcal/day deficit
        assert_eq!(goal_for_profile(&p, today).unwrap(), 2555 - 550);

        // Target date already passed: fixed weight-goal shift applies again
        p.target_date = Some(today - chrono::Duration::days(1));
        assert_eq!(goal_for_profile(&p, today).unwrap(), 2555);
    }

    #[test]
    fn test_macro_goals_default_split() {
        let m = macro_goals(2000, &MacroRatios::default());
        assert!((m.protein_g - 150.0).abs() < 1e-9);
        assert!((m.carbs_g - 200.0).abs() < 1e-9);
        assert!((m.fat_g - 2000.0 * 0.3 / 9.0).abs() < 1e-9);
    }

    #[test]
    fn test_macro_goals_custom_ratios() {
        let keto = MacroRatios {
            protein: 0.25,
            carbs: 0.05,
            fat: 0.70,
        };
        let m = macro_goals(1800, &keto);
        assert!((m.protein_g - 112.5).abs() < 1e-9);
        assert!((m.carbs_g - 22.5).abs() < 1e-9);
        assert!((m.fat_g - 140.0).abs() < 1e-9);
    }

    #[test]
    fn test_macro_goals_without_goal() {
        assert_eq!(macro_goals(0, &MacroRatios::default()), MacroGoals::default());
        assert_eq!(macro_goals(-300, &MacroRatios::default()), MacroGoals::default());
    }

    #[test]
    fn test_bmi_and_category() {
        let value = bmi(70.0, 175.0).unwrap();
        assert!((value - 22.857).abs() < 0.01);
        assert_eq!(BmiCategory::from_bmi(value), BmiCategory::Normal);
        assert_eq!(BmiCategory::from_bmi(18.4), BmiCategory::Underweight);
        assert_eq!(BmiCategory::from_bmi(23.0), BmiCategory::Overweight);
        assert_eq!(BmiCategory::from_bmi(27.0), BmiCategory::PreObese);
        assert_eq!(BmiCategory::from_bmi(34.9), BmiCategory::ObeseClassI);
        assert_eq!(BmiCategory::from_bmi(39.0), BmiCategory::ObeseClassII);
        assert_eq!(BmiCategory::from_bmi(45.0), BmiCategory::ObeseClassIII);
        assert!(bmi(70.0, 0.0).is_err());
    }

    #[test]
    fn test_ideal_weight() {
        let male = ideal_weight_kg(175.0, true).unwrap();
        let female = ideal_weight_kg(175.0, false).unwrap();
        assert!((male - 70.46).abs() < 0.01);
        assert!((male - female - 4.5).abs() < 1e-9);
    }

    #[test]
    fn test_daily_adjustment_caps() {
        assert_eq!(daily_adjustment(80.0, 75.0, 70), 550);
        assert_eq!(daily_adjustment(80.0, 75.0, 20), MAX_DAILY_DEFICIT);
        assert_eq!(daily_adjustment(60.0, 65.0, 70), -MAX_DAILY_SURPLUS);
        assert_eq!(daily_adjustment(60.0, 61.0, 70), -110);
        assert_eq!(daily_adjustment(80.0, 75.0, 0), 0);
        assert_eq!(daily_adjustment(80.0, 75.0, -5), 0);
    }

    #[test]
    fn test_goal_with_target_respects_minimums() {
        assert_eq!(goal_with_target(2500.0, 80.0, 75.0, 70, true), 1950);
        assert_eq!(goal_with_target(1800.0, 80.0, 70.0, 20, true), MIN_CALORIES_MALE);
        assert_eq!(goal_with_target(1800.0, 80.0, 70.0, 20, false), MIN_CALORIES_FEMALE);
        assert_eq!(goal_with_target(2000.0, 60.0, 65.0, 70, false), 2500);
    }

    #[test]
    fn test_weekly_rate_and_days_to_goal() {
        assert!((weekly_rate(80.0, 75.0, 70) - 0.5).abs() < 1e-9);
        assert_eq!(weekly_rate(80.0, 75.0, 0), 0.0);
        assert_eq!(days_to_goal(80.0, 75.0, 0.5), 70);
        assert_eq!(days_to_goal(75.0, 80.0, 0.5), 70);
        assert_eq!(days_to_goal(80.0, 75.0, 0.0), 0);
    }

    #[test]
    fn test_rate_safety_and_pace() {
        assert!(is_weekly_rate_safe(0.05, false));
        assert!(is_weekly_rate_safe(1.0, true));
        assert!(!is_weekly_rate_safe(1.1, true));
        assert!(!is_weekly_rate_safe(0.6, false));

        assert_eq!(RatePace::classify(0.2, true), RatePace::VerySlow);
        assert_eq!(RatePace::classify(0.5, true), RatePace::SlowAndSafe);
        assert_eq!(RatePace::classify(0.7, true), RatePace::Moderate);
        assert_eq!(RatePace::classify(0.7, false), RatePace::Fast);
        assert_eq!(RatePace::classify(0.9, false), RatePace::TooFast);
        assert_eq!(RatePace::classify(1.5, true), RatePace::NotRecommended);
    }
}
