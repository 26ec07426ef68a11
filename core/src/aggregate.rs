use chrono::{DateTime, Days, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};
use serde::Serialize;

use crate::goal::{self, MacroGoals, MacroRatios};
use crate::models::{FoodEntry, MealType, WorkoutEntry};
use crate::nutrients::{MacroSplit, Nutrients};

/// Optional floors applied on top of the raw daily balance.
///
/// The default leaves both off: progress can go negative when more was burned
/// than eaten, and `remaining` can go negative when the goal is exceeded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BalancePolicy {
    pub floor_progress_at_zero: bool,
    pub floor_remaining_at_zero: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailyBalance {
    pub consumed: f64,
    pub burned: f64,
    pub goal: i64,
    pub net: f64,
    pub remaining: f64,
    /// Rounded percentage of the goal reached by `net`, capped at 100.
    pub progress_percent: i64,
}

/// Net, remaining, and progress for one day under the default policy.
#[must_use]
pub fn aggregate(consumed: f64, burned: f64, goal: i64) -> DailyBalance {
    aggregate_with(consumed, burned, goal, &BalancePolicy::default())
}

#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn aggregate_with(
    consumed: f64,
    burned: f64,
    goal: i64,
    policy: &BalancePolicy,
) -> DailyBalance {
    let net = consumed - burned;

    let mut remaining = goal as f64 - net;
    if policy.floor_remaining_at_zero {
        remaining = remaining.max(0.0);
    }

    let mut progress_percent = if goal > 0 {
        ((net / goal as f64 * 100.0).round() as i64).min(100)
    } else {
        0
    };
    if policy.floor_progress_at_zero {
        progress_percent = progress_percent.max(0);
    }

    DailyBalance {
        consumed,
        burned,
        goal,
        net,
        remaining,
        progress_percent,
    }
}

#[must_use]
pub fn sum_consumed(entries: &[FoodEntry]) -> f64 {
    entries.iter().map(|e| e.calories).sum()
}

#[must_use]
pub fn sum_burned(entries: &[WorkoutEntry]) -> f64 {
    entries.iter().map(|e| e.calories_burned).sum()
}

// --- Day bounds ---

/// Half-open instant range `[start, end)` covering one local calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// First instant of `date` in `tz`. Falls forward hour by hour when midnight
/// does not exist locally (DST gap); ambiguous times take the earliest.
fn start_of_day<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> DateTime<Utc> {
    for hour in 0..24 {
        let Some(time) = NaiveTime::from_hms_opt(hour, 0, 0) else {
            continue;
        };
        if let Some(local) = tz.from_local_datetime(&date.and_time(time)).earliest() {
            return local.with_timezone(&Utc);
        }
    }
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

#[must_use]
pub fn day_bounds<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> DayRange {
    let start = start_of_day(date, tz);
    let end = date
        .checked_add_days(Days::new(1))
        .map_or(DateTime::<Utc>::MAX_UTC, |next| start_of_day(next, tz));
    DayRange { start, end }
}

// --- Daily summary ---

/// Rounded share of a gram target eaten so far, capped at 100.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MacroProgress {
    pub protein_pct: i64,
    pub carbs_pct: i64,
    pub fat_pct: i64,
}

fn percent_of(actual: f64, target: f64) -> i64 {
    if target <= 0.0 {
        return 0;
    }
    ((actual / target * 100.0).round() as i64).min(100)
}

impl MacroProgress {
    #[must_use]
    pub fn of(totals: &Nutrients, goals: &MacroGoals) -> Self {
        Self {
            protein_pct: percent_of(totals.protein, goals.protein_g),
            carbs_pct: percent_of(totals.carbs, goals.carbs_g),
            fat_pct: percent_of(totals.fat, goals.fat_g),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MealCalories {
    pub meal_type: MealType,
    pub calories: f64,
    pub entry_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub balance: DailyBalance,
    pub totals: Nutrients,
    pub macro_split: MacroSplit,
    /// Gram targets from the day's goal at the 30/40/30 split.
    pub macro_goals: MacroGoals,
    pub macro_progress: MacroProgress,
    /// One row per meal type, in breakfast..snack order, zero-filled.
    pub meals: Vec<MealCalories>,
    /// Calories eaten per local hour of the day (24 buckets).
    pub hourly_calories: Vec<f64>,
    pub workout_duration_min: i64,
    pub entries: Vec<FoodEntry>,
    pub workouts: Vec<WorkoutEntry>,
}

impl DailySummary {
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn is_over_goal(&self) -> bool {
        self.balance.net > self.balance.goal as f64
    }

    #[must_use]
    pub fn food_entry_count(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn workout_entry_count(&self) -> usize {
        self.workouts.len()
    }
}

/// Build the full summary for one day from that day's records.
///
/// Callers pass entries already restricted to [`day_bounds`] for `date`; `tz`
/// is only used to place entries into local hours.
#[must_use]
pub fn summarize<Tz: TimeZone>(
    date: NaiveDate,
    goal: i64,
    entries: Vec<FoodEntry>,
    workouts: Vec<WorkoutEntry>,
    tz: &Tz,
    policy: &BalancePolicy,
) -> DailySummary {
    let balance = aggregate_with(sum_consumed(&entries), sum_burned(&workouts), goal, policy);
    let totals: Nutrients = entries.iter().map(FoodEntry::nutrients).sum();

    let meals = MealType::ALL
        .iter()
        .map(|meal| {
            let of_meal = entries.iter().filter(|e| e.meal_type == *meal);
            MealCalories {
                meal_type: *meal,
                calories: of_meal.clone().map(|e| e.calories).sum(),
                entry_count: of_meal.count(),
            }
        })
        .collect();

    let mut hourly_calories = vec![0.0; 24];
    for entry in &entries {
        let hour = entry.logged_at.with_timezone(tz).hour() as usize;
        hourly_calories[hour] += entry.calories;
    }

    let workout_duration_min = workouts.iter().map(|w| w.duration_min).sum();
    let macro_goals = goal::macro_goals(goal, &MacroRatios::default());

    DailySummary {
        date,
        balance,
        totals,
        macro_split: totals.macro_split(),
        macro_goals,
        macro_progress: MacroProgress::of(&totals, &macro_goals),
        meals,
        hourly_calories,
        workout_duration_min,
        entries,
        workouts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn vietnam() -> FixedOffset {
        FixedOffset::east_opt(7 * 3600).unwrap()
    }

    fn entry(id: i64, meal_type: MealType, calories: f64, logged_at: DateTime<Utc>) -> FoodEntry {
        FoodEntry {
            id,
            food_id: 1,
            quantity_g: 100.0,
            meal_type,
            logged_at,
            calories,
            protein: calories / 20.0,
            carbs: calories / 10.0,
            fat: calories / 40.0,
            food_name: None,
        }
    }

    fn workout(id: i64, burned: f64, minutes: i64, logged_at: DateTime<Utc>) -> WorkoutEntry {
        WorkoutEntry {
            id,
            workout_id: 1,
            quantity: 30.0,
            duration_min: minutes,
            logged_at,
            calories_burned: burned,
            note: None,
            workout_name: None,
        }
    }

    #[test]
    fn test_aggregate_reference_day() {
        let b = aggregate(1800.0, 300.0, 2000);
        assert!((b.net - 1500.0).abs() < 1e-9);
        assert!((b.remaining - 500.0).abs() < 1e-9);
        assert_eq!(b.progress_percent, 75);
    }

    #[test]
    fn test_aggregate_empty_day() {
        let b = aggregate(sum_consumed(&[]), sum_burned(&[]), 2000);
        assert_eq!(b.net, 0.0);
        assert!((b.remaining - 2000.0).abs() < 1e-9);
        assert_eq!(b.progress_percent, 0);
    }

    #[test]
    fn test_progress_capped_at_100() {
        let b = aggregate(3000.0, 0.0, 2000);
        assert_eq!(b.progress_percent, 100);
        assert!((b.remaining + 1000.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_goal_means_zero_progress() {
        assert_eq!(aggregate(1500.0, 0.0, 0).progress_percent, 0);
        assert_eq!(aggregate(1500.0, 0.0, -50).progress_percent, 0);
    }

    #[test]
    fn test_progress_rounds_to_nearest() {
        // 50.25% -> 50, 12.5% -> 13 (halves round away from zero)
        assert_eq!(aggregate(1005.0, 0.0, 2000).progress_percent, 50);
        assert_eq!(aggregate(1.0, 0.0, 8).progress_percent, 13);
    }

    #[test]
    fn test_default_policy_has_no_lower_clamp() {
        let b = aggregate(200.0, 600.0, 2000);
        assert!((b.net + 400.0).abs() < 1e-9);
        assert_eq!(b.progress_percent, -20);
        assert!((b.remaining - 2400.0).abs() < 1e-9);
    }

    #[test]
    fn test_floor_progress_policy() {
        let policy = BalancePolicy {
            floor_progress_at_zero: true,
            floor_remaining_at_zero: false,
        };
        let b = aggregate_with(200.0, 600.0, 2000, &policy);
        assert_eq!(b.progress_percent, 0);
        assert!((b.net + 400.0).abs() < 1e-9);
    }

    #[test]
    fn test_floor_remaining_policy() {
        let policy = BalancePolicy {
            floor_progress_at_zero: false,
            floor_remaining_at_zero: true,
        };
        let b = aggregate_with(2600.0, 0.0, 2000, &policy);
        assert_eq!(b.remaining, 0.0);
        assert_eq!(b.progress_percent, 100);

        let unfloored = aggregate(2600.0, 0.0, 2000);
        assert!((unfloored.remaining + 600.0).abs() < 1e-9);
    }

    #[test]
    fn test_macro_progress_capped_and_zero_goal() {
        let totals = Nutrients {
            calories: 2000.0,
            protein: 300.0,
            carbs: 50.0,
            fat: 0.0,
        };
        let goals = goal::macro_goals(2000, &MacroRatios::default());
        let p = MacroProgress::of(&totals, &goals);
        assert_eq!(p.protein_pct, 100);
        assert_eq!(p.carbs_pct, 25);
        assert_eq!(p.fat_pct, 0);

        let none = MacroProgress::of(&totals, &goal::macro_goals(0, &MacroRatios::default()));
        assert_eq!(none, MacroProgress::default());
    }

    #[test]
    fn test_day_bounds_half_open_local_day() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let range = day_bounds(date, &vietnam());
        // 00:00 +07:00 is 17:00 UTC the previous day
        assert_eq!(range.start, Utc.with_ymd_and_hms(2024, 3, 9, 17, 0, 0).unwrap());
        assert_eq!(range.end, Utc.with_ymd_and_hms(2024, 3, 10, 17, 0, 0).unwrap());
        assert_eq!(range.end - range.start, chrono::Duration::days(1));
    }

    #[test]
    fn test_day_bounds_are_contiguous() {
        let tz = vietnam();
        let d1 = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        assert_eq!(day_bounds(d1, &tz).end, day_bounds(d2, &tz).start);
    }

    #[test]
    fn test_summarize_groups_meals_and_hours() {
        let tz = vietnam();
        let date = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        // 07:30 and 12:15 local time
        let breakfast_at = Utc.with_ymd_and_hms(2024, 3, 10, 0, 30, 0).unwrap();
        let lunch_at = Utc.with_ymd_and_hms(2024, 3, 10, 5, 15, 0).unwrap();
        let entries = vec![
            entry(1, MealType::Breakfast, 400.0, breakfast_at),
            entry(2, MealType::Lunch, 600.0, lunch_at),
            entry(3, MealType::Lunch, 200.0, lunch_at),
        ];
        let workouts = vec![workout(1, 300.0, 30, lunch_at), workout(2, 100.0, 15, lunch_at)];

        let s = summarize(date, 2000, entries, workouts, &tz, &BalancePolicy::default());

        assert!((s.balance.consumed - 1200.0).abs() < 1e-9);
        assert!((s.balance.burned - 400.0).abs() < 1e-9);
        assert_eq!(s.balance.progress_percent, 40);
        assert_eq!(s.food_entry_count(), 3);
        assert_eq!(s.workout_entry_count(), 2);
        assert_eq!(s.workout_duration_min, 45);
        assert!(!s.is_over_goal());

        assert_eq!(s.meals.len(), 4);
        assert_eq!(s.meals[0].meal_type, MealType::Breakfast);
        assert!((s.meals[0].calories - 400.0).abs() < 1e-9);
        assert_eq!(s.meals[1].entry_count, 2);
        assert!((s.meals[1].calories - 800.0).abs() < 1e-9);
        assert_eq!(s.meals[2].entry_count, 0);
        assert_eq!(s.meals[3].calories, 0.0);

        assert_eq!(s.hourly_calories.len(), 24);
        assert!((s.hourly_calories[7] - 400.0).abs() < 1e-9);
        assert!((s.hourly_calories[12] - 800.0).abs() < 1e-9);
        assert_eq!(s.hourly_calories[0], 0.0);

        assert!((s.totals.calories - 1200.0).abs() < 1e-9);
        assert!((s.totals.protein - 60.0).abs() < 1e-9);

        // 2000 kcal at 30/40/30: 150 g protein, 200 g carbs
        assert!((s.macro_goals.protein_g - 150.0).abs() < 1e-9);
        assert!((s.macro_goals.carbs_g - 200.0).abs() < 1e-9);
        assert_eq!(s.macro_progress.protein_pct, 40);
        assert_eq!(s.macro_progress.carbs_pct, 60);
    }

    #[test]
    fn test_summarize_over_goal() {
        let tz = vietnam();
        let date = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let at = Utc.with_ymd_and_hms(2024, 3, 10, 5, 0, 0).unwrap();
        let s = summarize(
            date,
            1500,
            vec![entry(1, MealType::Dinner, 1800.0, at)],
            Vec::new(),
            &tz,
            &BalancePolicy::default(),
        );
        assert!(s.is_over_goal());
        assert_eq!(s.balance.progress_percent, 100);

        let floored = summarize(
            date,
            1500,
            vec![entry(1, MealType::Dinner, 1800.0, at)],
            Vec::new(),
            &tz,
            &BalancePolicy {
                floor_progress_at_zero: true,
                floor_remaining_at_zero: true,
            },
        );
        assert_eq!(floored.balance.remaining, 0.0);
        assert!(floored.is_over_goal());
    }

    #[test]
    fn test_summarize_empty_day() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let s = summarize(
            date,
            2000,
            Vec::new(),
            Vec::new(),
            &vietnam(),
            &BalancePolicy::default(),
        );
        assert_eq!(s.totals, Nutrients::default());
        assert_eq!(s.balance.progress_percent, 0);
        assert_eq!(s.macro_progress, MacroProgress::default());
        assert!(s.meals.iter().all(|m| m.entry_count == 0));
        assert!(!s.is_over_goal());
    }
}
