use std::fmt;
use std::str::FromStr;

use anyhow::{Result, bail};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::nutrients::Nutrients;

// --- Foods ---

/// A food with its nutrient profile expressed per 100 g.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Food {
    pub id: i64,
    pub name: String,
    pub calories_per_100g: f64,
    pub protein_per_100g: f64,
    pub carbs_per_100g: f64,
    pub fat_per_100g: f64,
    pub category: String,
    pub is_custom: bool,
    /// Localized search alias, e.g. `"pho, bun"` for "Phở bò".
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub alias: Option<String>,
    pub serving_size: f64,
    pub serving_unit: String,
}

#[derive(Debug, Clone)]
pub struct NewFood {
    pub name: String,
    pub calories_per_100g: f64,
    pub protein_per_100g: f64,
    pub carbs_per_100g: f64,
    pub fat_per_100g: f64,
    pub category: String,
    pub is_custom: bool,
    pub alias: Option<String>,
    pub serving_size: f64,
    pub serving_unit: String,
}

impl NewFood {
    /// A user-authored food with the default 100 g serving.
    #[must_use]
    pub fn custom(name: &str, calories: f64, protein: f64, carbs: f64, fat: f64) -> Self {
        Self {
            name: name.to_string(),
            calories_per_100g: calories,
            protein_per_100g: protein,
            carbs_per_100g: carbs,
            fat_per_100g: fat,
            category: "other".to_string(),
            is_custom: true,
            alias: None,
            serving_size: DEFAULT_SERVING_G,
            serving_unit: "g".to_string(),
        }
    }
}

pub const DEFAULT_SERVING_G: f64 = 100.0;

pub const FOOD_CATEGORIES: &[&str] = &[
    "com", "pho", "bun", "banh", "xoi", "thit", "hai_san", "rau", "trung", "do_uong", "an_vat",
    "trai_cay", "other",
];

// --- Meal types ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealType {
    pub const ALL: [MealType; 4] = [
        MealType::Breakfast,
        MealType::Lunch,
        MealType::Dinner,
        MealType::Snack,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
            MealType::Snack => "snack",
        }
    }

    /// Numeric code used in storage (0 = breakfast .. 3 = snack).
    #[must_use]
    pub fn code(self) -> i64 {
        match self {
            MealType::Breakfast => 0,
            MealType::Lunch => 1,
            MealType::Dinner => 2,
            MealType::Snack => 3,
        }
    }

    #[must_use]
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(MealType::Breakfast),
            1 => Some(MealType::Lunch),
            2 => Some(MealType::Dinner),
            3 => Some(MealType::Snack),
            _ => None,
        }
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MealType {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "breakfast" => Ok(MealType::Breakfast),
            "lunch" => Ok(MealType::Lunch),
            "dinner" => Ok(MealType::Dinner),
            "snack" => Ok(MealType::Snack),
            _ => Err(EngineError::InvalidValue {
                kind: "meal type",
                value: s.to_string(),
                expected: "breakfast, lunch, dinner, snack",
            }),
        }
    }
}

// --- Food entries ---

/// A logged consumption of a food. Nutrient totals are fixed when the entry is
/// created and always equal the food's per-100g values scaled to `quantity_g`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FoodEntry {
    pub id: i64,
    pub food_id: i64,
    pub quantity_g: f64,
    pub meal_type: MealType,
    pub logged_at: DateTime<Utc>,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fat: f64,
    // Joined for display
    #[serde(skip_serializing_if = "Option::is_none")]
    pub food_name: Option<String>,
}

impl FoodEntry {
    #[must_use]
    pub fn nutrients(&self) -> Nutrients {
        Nutrients {
            calories: self.calories,
            protein: self.protein,
            carbs: self.carbs,
            fat: self.fat,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewFoodEntry {
    pub food_id: i64,
    pub quantity_g: f64,
    pub meal_type: MealType,
    pub logged_at: DateTime<Utc>,
    pub nutrients: Nutrients,
}

// --- Workouts ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    pub id: i64,
    pub name: String,
    pub calories_per_unit: f64,
    /// "min", "km", "reps", or free text.
    pub unit: String,
    pub category: String,
    pub is_custom: bool,
}

impl Workout {
    /// Calories burned for `quantity` units of this workout.
    pub fn calories_burned(&self, quantity: f64) -> Result<f64, EngineError> {
        if quantity.is_nan() || quantity < 0.0 || quantity.is_infinite() {
            return Err(EngineError::InvalidQuantity { quantity });
        }
        Ok(self.calories_per_unit * quantity)
    }
}

#[derive(Debug, Clone)]
pub struct NewWorkout {
    pub name: String,
    pub calories_per_unit: f64,
    pub unit: String,
    pub category: String,
    pub is_custom: bool,
}

pub const WORKOUT_CATEGORIES: &[&str] = &["cardio", "strength", "flexibility"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkoutEntry {
    pub id: i64,
    pub workout_id: i64,
    pub quantity: f64,
    pub duration_min: i64,
    pub logged_at: DateTime<Utc>,
    pub calories_burned: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workout_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewWorkoutEntry {
    pub workout_id: i64,
    pub quantity: f64,
    pub duration_min: i64,
    pub logged_at: DateTime<Utc>,
    pub calories_burned: f64,
    pub note: Option<String>,
}

// --- Favorites ---

/// A food the user marked for quick re-entry. One per food.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoriteFood {
    pub id: i64,
    pub food_id: i64,
    pub default_quantity_g: f64,
    pub last_used: DateTime<Utc>,
    pub use_count: i64,
}

impl FavoriteFood {
    /// A favorite that has not been stored yet (`id` is assigned on insert).
    #[must_use]
    pub fn new(food_id: i64, default_quantity_g: f64, now: DateTime<Utc>) -> Self {
        Self {
            id: 0,
            food_id,
            default_quantity_g,
            last_used: now,
            use_count: 1,
        }
    }

    /// Record one more use. Both fields change together; `last_used` never
    /// moves backwards even if the clock does.
    pub fn increment_usage(&mut self, now: DateTime<Utc>) {
        self.use_count += 1;
        if now > self.last_used {
            self.last_used = now;
        }
    }
}

/// A food joined with its favorite record, if any.
#[derive(Debug, Clone, Serialize)]
pub struct FoodWithDetails {
    pub food: Food,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favorite: Option<FavoriteFood>,
}

impl FoodWithDetails {
    #[must_use]
    pub fn is_favorite(&self) -> bool {
        self.favorite.is_some()
    }

    /// Quantity to prefill when logging: the favorite's default, else the
    /// food's serving size, else 100 g.
    #[must_use]
    pub fn quantity_to_use(&self) -> f64 {
        if let Some(qty) = self
            .favorite
            .as_ref()
            .map(|fav| fav.default_quantity_g)
            .filter(|qty| *qty > 0.0)
        {
            return qty;
        }
        if self.food.serving_size > 0.0 {
            self.food.serving_size
        } else {
            DEFAULT_SERVING_G
        }
    }
}

// --- Profile ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    #[must_use]
    pub fn is_male(self) -> bool {
        self == Gender::Male
    }
}

impl FromStr for Gender {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" => Ok(Gender::Male),
            "female" | "f" => Ok(Gender::Female),
            _ => Err(EngineError::InvalidValue {
                kind: "gender",
                value: s.to_string(),
                expected: "male, female",
            }),
        }
    }
}

/// Five activity tiers, numbered 1 (sedentary) to 5 (very active).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    Active,
    VeryActive,
}

impl ActivityLevel {
    /// Map a 1-5 level to its tier. Anything outside that range is treated as
    /// moderate.
    #[must_use]
    pub fn from_level(level: i64) -> Self {
        match level {
            1 => ActivityLevel::Sedentary,
            2 => ActivityLevel::Light,
            4 => ActivityLevel::Active,
            5 => ActivityLevel::VeryActive,
            _ => ActivityLevel::Moderate,
        }
    }

    #[must_use]
    pub fn level(self) -> i64 {
        match self {
            ActivityLevel::Sedentary => 1,
            ActivityLevel::Light => 2,
            ActivityLevel::Moderate => 3,
            ActivityLevel::Active => 4,
            ActivityLevel::VeryActive => 5,
        }
    }

    #[must_use]
    pub fn multiplier(self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::Active => 1.725,
            ActivityLevel::VeryActive => 1.9,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "sedentary",
            ActivityLevel::Light => "light",
            ActivityLevel::Moderate => "moderate",
            ActivityLevel::Active => "active",
            ActivityLevel::VeryActive => "very_active",
        }
    }
}

impl FromStr for ActivityLevel {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        if let Ok(level) = lower.parse::<i64>() {
            return Ok(ActivityLevel::from_level(level));
        }
        match lower.as_str() {
            "sedentary" => Ok(ActivityLevel::Sedentary),
            "light" => Ok(ActivityLevel::Light),
            "moderate" => Ok(ActivityLevel::Moderate),
            "active" => Ok(ActivityLevel::Active),
            "very_active" | "very-active" => Ok(ActivityLevel::VeryActive),
            _ => Err(EngineError::InvalidValue {
                kind: "activity level",
                value: s.to_string(),
                expected: "1-5, sedentary, light, moderate, active, very_active",
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightGoal {
    Lose,
    Maintain,
    Gain,
}

impl WeightGoal {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            WeightGoal::Lose => "lose",
            WeightGoal::Maintain => "maintain",
            WeightGoal::Gain => "gain",
        }
    }
}

impl FromStr for WeightGoal {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lose" => Ok(WeightGoal::Lose),
            "maintain" => Ok(WeightGoal::Maintain),
            "gain" => Ok(WeightGoal::Gain),
            _ => Err(EngineError::InvalidValue {
                kind: "weight goal",
                value: s.to_string(),
                expected: "lose, maintain, gain",
            }),
        }
    }
}

pub const DEFAULT_DAILY_GOAL: i64 = 2000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    pub age: i64,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub gender: Gender,
    pub activity_level: ActivityLevel,
    pub weight_goal: WeightGoal,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub target_weight_kg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub target_date: Option<NaiveDate>,
    /// 0 until a goal has been computed.
    #[serde(default)]
    pub daily_calorie_goal: i64,
}

impl UserProfile {
    /// The stored goal, or the app default when none has been computed yet.
    #[must_use]
    pub fn effective_goal(&self) -> i64 {
        if self.daily_calorie_goal > 0 {
            self.daily_calorie_goal
        } else {
            DEFAULT_DAILY_GOAL
        }
    }
}

// --- Weight log ---

/// One weigh-in. The latest one is the profile's current weight.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightLog {
    pub id: i64,
    pub weight_kg: f64,
    pub logged_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewWeightLog {
    pub weight_kg: f64,
    pub logged_at: DateTime<Utc>,
    pub note: Option<String>,
}

// --- Validation ---

pub const AGE_RANGE: (i64, i64) = (1, 120);
pub const WEIGHT_RANGE_KG: (f64, f64) = (20.0, 500.0);
pub const HEIGHT_RANGE_CM: (f64, f64) = (50.0, 250.0);
pub const TARGET_WEIGHT_RANGE_KG: (f64, f64) = (30.0, 300.0);
pub const CALORIE_GOAL_RANGE: (i64, i64) = (500, 10_000);

/// Validate a user-authored food: non-empty name, non-negative nutrients,
/// positive serving size.
pub fn validate_food_data(food: &NewFood) -> Result<()> {
    if food.name.trim().is_empty() {
        bail!("Food name must not be empty");
    }
    for (field, value) in [
        ("calories_per_100g", food.calories_per_100g),
        ("protein_per_100g", food.protein_per_100g),
        ("carbs_per_100g", food.carbs_per_100g),
        ("fat_per_100g", food.fat_per_100g),
    ] {
        if !value.is_finite() || value < 0.0 {
            bail!("{field} must not be negative");
        }
    }
    if !food.serving_size.is_finite() || food.serving_size <= 0.0 {
        bail!("serving_size must be greater than 0");
    }
    if !FOOD_CATEGORIES.contains(&food.category.as_str()) {
        bail!(
            "Invalid category '{}'. Must be one of: {}",
            food.category,
            FOOD_CATEGORIES.join(", ")
        );
    }
    Ok(())
}

pub fn validate_workout_data(workout: &NewWorkout) -> Result<()> {
    if workout.name.trim().is_empty() {
        bail!("Workout name must not be empty");
    }
    if !workout.calories_per_unit.is_finite() || workout.calories_per_unit < 0.0 {
        bail!("calories_per_unit must not be negative");
    }
    if workout.unit.trim().is_empty() {
        bail!("Workout unit must not be empty");
    }
    if !WORKOUT_CATEGORIES.contains(&workout.category.as_str()) {
        bail!(
            "Invalid category '{}'. Must be one of: {}",
            workout.category,
            WORKOUT_CATEGORIES.join(", ")
        );
    }
    Ok(())
}

/// Validate profile input: a name, body metrics inside the accepted ranges,
/// and a target weight and date that make sense on `today`.
pub fn validate_profile(profile: &UserProfile, today: NaiveDate) -> Result<()> {
    if profile.name.trim().is_empty() {
        bail!("Name must not be empty");
    }
    let (min_age, max_age) = AGE_RANGE;
    if !(min_age..=max_age).contains(&profile.age) {
        bail!("Age must be between {min_age} and {max_age}");
    }
    let (min_h, max_h) = HEIGHT_RANGE_CM;
    if !(min_h..=max_h).contains(&profile.height_cm) {
        bail!("Height must be between {min_h} and {max_h} cm");
    }
    validate_weight(profile.weight_kg)?;
    if let Some(target) = profile.target_weight_kg {
        let (min_t, max_t) = TARGET_WEIGHT_RANGE_KG;
        if !(min_t..=max_t).contains(&target) {
            bail!("Target weight must be between {min_t} and {max_t} kg");
        }
    }
    if let Some(date) = profile.target_date {
        if date <= today {
            bail!("Target date {date} must be in the future");
        }
    }
    Ok(())
}

pub fn validate_weight(weight_kg: f64) -> Result<()> {
    let (min_w, max_w) = WEIGHT_RANGE_KG;
    if !(min_w..=max_w).contains(&weight_kg) {
        bail!("Weight must be between {min_w} and {max_w} kg");
    }
    Ok(())
}

/// The goal stored on a profile must fall inside [`CALORIE_GOAL_RANGE`].
pub fn validate_calorie_goal(goal: i64) -> Result<()> {
    let (min_goal, max_goal) = CALORIE_GOAL_RANGE;
    if !(min_goal..=max_goal).contains(&goal) {
        bail!("Daily calorie goal {goal} must be between {min_goal} and {max_goal} kcal");
    }
    Ok(())
}

/// A favorite's default quantity: finite and greater than 0 g.
pub fn validate_default_quantity(grams: f64) -> Result<()> {
    if !grams.is_finite() || grams <= 0.0 {
        bail!("Default quantity must be greater than 0 (got {grams})");
    }
    Ok(())
}
