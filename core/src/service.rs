use anyhow::{Context, Result, bail};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use tracing::{debug, info};

use crate::aggregate::{self, BalancePolicy, DailySummary};
use crate::favorites::{self, QuickAddItem};
use crate::goal;
use crate::matcher;
use crate::models::{
    DEFAULT_DAILY_GOAL, FavoriteFood, Food, FoodEntry, FoodWithDetails, MealType, NewFood,
    NewFoodEntry, NewWeightLog, NewWorkout, NewWorkoutEntry, UserProfile, WeightLog, Workout,
    WorkoutEntry, validate_calorie_goal, validate_default_quantity, validate_food_data,
    validate_profile, validate_weight, validate_workout_data,
};
use crate::nutrients;
use crate::repository::Repository;

/// Which kind of entry a delete targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Food,
    Workout,
}

/// Wires a [`Repository`] to the engine. Every call reads fresh snapshots;
/// nothing is cached between calls.
pub struct TrackerService<R: Repository> {
    repo: R,
}

impl<R: Repository> TrackerService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    // --- Foods ---

    pub fn add_food(&self, food: &NewFood) -> Result<Food> {
        validate_food_data(food)?;
        let food = self.repo.insert_food(food)?;
        info!(id = food.id, name = %food.name, "Added food");
        Ok(food)
    }

    pub fn get_food(&self, id: i64) -> Result<Food> {
        self.repo.get_food(id)
    }

    pub fn list_foods(&self) -> Result<Vec<Food>> {
        self.repo.list_foods()
    }

    /// Delete a food; its entries and favorite go with it.
    pub fn delete_food(&self, id: i64) -> Result<bool> {
        let deleted = self.repo.delete_food(id)?;
        if deleted {
            info!(id, "Deleted food");
        }
        Ok(deleted)
    }

    /// A food joined with its favorite record.
    pub fn food_details(&self, id: i64) -> Result<FoodWithDetails> {
        let food = self.repo.get_food(id)?;
        let favorite = self.repo.get_favorite_by_food(id)?;
        Ok(FoodWithDetails { food, favorite })
    }

    /// Foods matching `query` by name or alias, sorted by name, each joined
    /// to its favorite record.
    pub fn search_foods(&self, query: &str) -> Result<Vec<FoodWithDetails>> {
        let foods = self.repo.list_foods()?;
        let favorites = self.repo.list_favorites()?;
        let found = matcher::filter_foods(&foods, query)
            .into_iter()
            .map(|food| FoodWithDetails {
                favorite: favorites.iter().find(|f| f.food_id == food.id).cloned(),
                food: food.clone(),
            })
            .collect::<Vec<_>>();
        debug!(query, count = found.len(), "Searched foods");
        Ok(found)
    }

    // --- Logging ---

    pub fn log_food(
        &self,
        food_id: i64,
        grams: f64,
        meal_type: MealType,
        at: DateTime<Utc>,
    ) -> Result<FoodEntry> {
        let food = self.repo.get_food(food_id)?;
        let nutrients = nutrients::scale(&food, grams)?;
        let entry = self.repo.insert_food_entry(&NewFoodEntry {
            food_id,
            quantity_g: grams,
            meal_type,
            logged_at: at,
            nutrients,
        })?;
        info!(id = entry.id, food = %food.name, grams, "Logged food");
        Ok(entry)
    }

    pub fn add_workout(&self, workout: &NewWorkout) -> Result<Workout> {
        validate_workout_data(workout)?;
        self.repo.insert_workout(workout)
    }

    pub fn list_workouts(&self) -> Result<Vec<Workout>> {
        self.repo.list_workouts()
    }

    pub fn log_workout(
        &self,
        workout_id: i64,
        quantity: f64,
        duration_min: i64,
        note: Option<String>,
        at: DateTime<Utc>,
    ) -> Result<WorkoutEntry> {
        if duration_min < 0 {
            bail!("Duration must not be negative");
        }
        let workout = self.repo.get_workout(workout_id)?;
        let calories_burned = workout.calories_burned(quantity)?;
        let entry = self.repo.insert_workout_entry(&NewWorkoutEntry {
            workout_id,
            quantity,
            duration_min,
            logged_at: at,
            calories_burned,
            note,
        })?;
        info!(id = entry.id, workout = %workout.name, calories_burned, "Logged workout");
        Ok(entry)
    }

    pub fn delete_entry(&self, kind: EntryKind, id: i64) -> Result<bool> {
        match kind {
            EntryKind::Food => self.repo.delete_food_entry(id),
            EntryKind::Workout => self.repo.delete_workout_entry(id),
        }
    }

    // --- Favorites ---

    /// Mark a food as favorite. Re-adding keeps the stored count and only
    /// updates the default quantity.
    pub fn add_favorite(
        &self,
        food_id: i64,
        default_quantity_g: Option<f64>,
        now: DateTime<Utc>,
    ) -> Result<FavoriteFood> {
        let food = self.repo.get_food(food_id)?;
        let quantity = default_quantity_g.unwrap_or_else(|| {
            FoodWithDetails {
                food,
                favorite: None,
            }
            .quantity_to_use()
        });
        validate_default_quantity(quantity)?;
        let favorite = match self.repo.get_favorite_by_food(food_id)? {
            Some(mut existing) => {
                existing.default_quantity_g = quantity;
                existing
            }
            None => FavoriteFood::new(food_id, quantity, now),
        };
        self.repo.upsert_favorite(&favorite)
    }

    pub fn remove_favorite(&self, food_id: i64) -> Result<bool> {
        self.repo.delete_favorite_by_food(food_id)
    }

    /// Log a favorite at its default quantity and count the use.
    ///
    /// The entry lands at `logged_at`, which may be backdated; the favorite's
    /// recency moves to `used_at`, the moment the user picked it.
    pub fn quick_add_favorite(
        &self,
        food_id: i64,
        meal_type: MealType,
        logged_at: DateTime<Utc>,
        used_at: DateTime<Utc>,
    ) -> Result<(FoodEntry, FavoriteFood)> {
        let favorite = self
            .repo
            .get_favorite_by_food(food_id)?
            .with_context(|| format!("Food {food_id} is not a favorite"))?;
        let food = self.repo.get_food(food_id)?;
        let nutrients = nutrients::scale(&food, favorite.default_quantity_g)?;
        let entry = NewFoodEntry {
            food_id,
            quantity_g: favorite.default_quantity_g,
            meal_type,
            logged_at,
            nutrients,
        };
        let (entry, favorite) = self.repo.log_favorite_use(&entry, used_at)?;
        info!(food = %food.name, use_count = favorite.use_count, "Quick-added favorite");
        Ok((entry, favorite))
    }

    /// Ranked favorites with calorie previews, at most `limit` of them.
    pub fn quick_add_list(&self, limit: usize) -> Result<Vec<QuickAddItem>> {
        let ranked = favorites::top(self.repo.list_favorites()?, limit);
        let foods = self.repo.list_foods()?;
        Ok(favorites::quick_add_items(ranked, &foods)?)
    }

    // --- Profile ---

    /// Validate, compute the daily goal, and persist the profile. A new
    /// profile, or a changed weight, is also recorded as a weigh-in at `now`.
    pub fn save_profile(
        &self,
        mut profile: UserProfile,
        now: DateTime<Utc>,
        today: NaiveDate,
    ) -> Result<UserProfile> {
        validate_profile(&profile, today)?;
        profile.daily_calorie_goal = goal::goal_for_profile(&profile, today)?;
        validate_calorie_goal(profile.daily_calorie_goal)?;

        let weight_changed = self
            .repo
            .load_profile()?
            .is_none_or(|old| (old.weight_kg - profile.weight_kg).abs() > 0.01);
        self.repo.save_profile(&profile)?;
        if weight_changed {
            self.repo.insert_weight_log(&NewWeightLog {
                weight_kg: profile.weight_kg,
                logged_at: now,
                note: None,
            })?;
        }
        Ok(profile)
    }

    /// Record a weigh-in. When a profile exists its weight follows the log and
    /// the daily goal is recomputed.
    pub fn log_weight(
        &self,
        weight_kg: f64,
        note: Option<String>,
        now: DateTime<Utc>,
        today: NaiveDate,
    ) -> Result<(WeightLog, Option<UserProfile>)> {
        validate_weight(weight_kg)?;
        let profile = match self.repo.load_profile()? {
            Some(mut profile) => {
                profile.weight_kg = weight_kg;
                profile.daily_calorie_goal = goal::goal_for_profile(&profile, today)?;
                validate_calorie_goal(profile.daily_calorie_goal)?;
                Some(profile)
            }
            None => None,
        };

        let log = self.repo.insert_weight_log(&NewWeightLog {
            weight_kg,
            logged_at: now,
            note,
        })?;
        if let Some(profile) = &profile {
            self.repo.save_profile(profile)?;
        }
        info!(weight_kg, "Logged weight");
        Ok((log, profile))
    }

    pub fn latest_weight_log(&self) -> Result<Option<WeightLog>> {
        self.repo.latest_weight_log()
    }

    pub fn profile(&self) -> Result<Option<UserProfile>> {
        self.repo.load_profile()
    }

    pub fn daily_goal(&self) -> Result<i64> {
        Ok(self
            .repo
            .load_profile()?
            .map_or(DEFAULT_DAILY_GOAL, |p| p.effective_goal()))
    }

    // --- Summary ---

    /// Everything logged on local `date` in `tz`, aggregated against the
    /// stored goal.
    pub fn daily_summary<Tz: TimeZone>(
        &self,
        date: NaiveDate,
        tz: &Tz,
        policy: &BalancePolicy,
    ) -> Result<DailySummary> {
        let range = aggregate::day_bounds(date, tz);
        let entries = self.repo.list_entries_in_range(range.start, range.end)?;
        let workouts = self
            .repo
            .list_workout_entries_in_range(range.start, range.end)?;
        let goal = self.daily_goal()?;
        debug!(%date, entries = entries.len(), workouts = workouts.len(), goal, "Building summary");
        Ok(aggregate::summarize(
            date, goal, entries, workouts, tz, policy,
        ))
    }
}
