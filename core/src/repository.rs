use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::models::{
    FavoriteFood, Food, FoodEntry, NewFood, NewFoodEntry, NewWeightLog, NewWorkout,
    NewWorkoutEntry, UserProfile, WeightLog, Workout, WorkoutEntry,
};

/// Storage collaborator for the tracker.
///
/// The engine only ever sees the plain records returned here. Range queries
/// are half-open: `start <= logged_at < end`.
pub trait Repository {
    // --- Foods ---
    fn get_food(&self, id: i64) -> Result<Food>;
    fn list_foods(&self) -> Result<Vec<Food>>;
    fn insert_food(&self, food: &NewFood) -> Result<Food>;
    /// Delete a food together with its entries and favorite.
    fn delete_food(&self, id: i64) -> Result<bool>;

    // --- Food entries ---
    fn list_entries_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<FoodEntry>>;
    fn insert_food_entry(&self, entry: &NewFoodEntry) -> Result<FoodEntry>;
    fn delete_food_entry(&self, id: i64) -> Result<bool>;

    // --- Workouts ---
    fn get_workout(&self, id: i64) -> Result<Workout>;
    fn list_workouts(&self) -> Result<Vec<Workout>>;
    fn insert_workout(&self, workout: &NewWorkout) -> Result<Workout>;
    fn list_workout_entries_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<WorkoutEntry>>;
    fn insert_workout_entry(&self, entry: &NewWorkoutEntry) -> Result<WorkoutEntry>;
    fn delete_workout_entry(&self, id: i64) -> Result<bool>;

    // --- Favorites ---
    fn list_favorites(&self) -> Result<Vec<FavoriteFood>>;
    fn get_favorite_by_food(&self, food_id: i64) -> Result<Option<FavoriteFood>>;
    /// Insert the favorite, or overwrite the stored one for the same food.
    fn upsert_favorite(&self, favorite: &FavoriteFood) -> Result<FavoriteFood>;
    fn delete_favorite_by_food(&self, food_id: i64) -> Result<bool>;
    /// Log an entry for an existing favorite and record one more use of it
    /// at `used_at` via [`FavoriteFood::increment_usage`]. `used_at` is the
    /// moment of use, not the entry's `logged_at`. Both writes land or
    /// neither does, and the increment is applied against the stored count
    /// so concurrent uses are never lost.
    fn log_favorite_use(
        &self,
        entry: &NewFoodEntry,
        used_at: DateTime<Utc>,
    ) -> Result<(FoodEntry, FavoriteFood)>;

    // --- Profile ---
    fn load_profile(&self) -> Result<Option<UserProfile>>;
    fn save_profile(&self, profile: &UserProfile) -> Result<()>;

    // --- Weight log ---
    fn insert_weight_log(&self, log: &NewWeightLog) -> Result<WeightLog>;
    /// The weigh-in with the latest `logged_at`, if any.
    fn latest_weight_log(&self) -> Result<Option<WeightLog>>;
}
