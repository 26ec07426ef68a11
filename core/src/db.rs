use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Local, Utc};
use rusqlite::{Connection, OptionalExtension, Transaction, TransactionBehavior, params};
use tracing::{debug, info};

use crate::models::{
    FavoriteFood, Food, FoodEntry, MealType, NewFood, NewFoodEntry, NewWeightLog, NewWorkout,
    NewWorkoutEntry, UserProfile, WeightLog, Workout, WorkoutEntry, validate_default_quantity,
};
use crate::repository::Repository;
use crate::seed;

const PROFILE_KEY: &str = "profile";

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        let db = Database { conn };
        db.configure()?;
        db.migrate()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Database { conn };
        db.configure()?;
        db.migrate()?;
        Ok(db)
    }

    fn configure(&self) -> Result<()> {
        self.conn
            .pragma_update(None, "foreign_keys", "ON")
            .context("Failed to enable foreign keys")?;
        Ok(())
    }

    fn migrate(&self) -> Result<()> {
        let version: i64 = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?;

        if version < 1 {
            self.conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS foods (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL,
                    calories_per_100g REAL NOT NULL CHECK (calories_per_100g >= 0),
                    protein_per_100g REAL NOT NULL DEFAULT 0,
                    carbs_per_100g REAL NOT NULL DEFAULT 0,
                    fat_per_100g REAL NOT NULL DEFAULT 0,
                    category TEXT NOT NULL DEFAULT 'other',
                    is_custom INTEGER NOT NULL DEFAULT 1,
                    alias TEXT,
                    serving_size REAL NOT NULL DEFAULT 100,
                    serving_unit TEXT NOT NULL DEFAULT 'g'
                );

                CREATE TABLE IF NOT EXISTS food_entries (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    food_id INTEGER NOT NULL REFERENCES foods(id) ON DELETE CASCADE,
                    quantity_g REAL NOT NULL,
                    meal_type INTEGER NOT NULL CHECK (meal_type BETWEEN 0 AND 3),
                    logged_at INTEGER NOT NULL,
                    calories REAL NOT NULL,
                    protein REAL NOT NULL,
                    carbs REAL NOT NULL,
                    fat REAL NOT NULL
                );

                CREATE TABLE IF NOT EXISTS workouts (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL,
                    calories_per_unit REAL NOT NULL CHECK (calories_per_unit >= 0),
                    unit TEXT NOT NULL,
                    category TEXT NOT NULL DEFAULT 'cardio',
                    is_custom INTEGER NOT NULL DEFAULT 1
                );

                CREATE TABLE IF NOT EXISTS workout_entries (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    workout_id INTEGER NOT NULL REFERENCES workouts(id) ON DELETE CASCADE,
                    quantity REAL NOT NULL,
                    duration_min INTEGER NOT NULL DEFAULT 0,
                    logged_at INTEGER NOT NULL,
                    calories_burned REAL NOT NULL CHECK (calories_burned >= 0),
                    note TEXT
                );

                CREATE TABLE IF NOT EXISTS favorite_foods (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    food_id INTEGER NOT NULL UNIQUE REFERENCES foods(id) ON DELETE CASCADE,
                    default_quantity_g REAL NOT NULL,
                    last_used INTEGER NOT NULL,
                    use_count INTEGER NOT NULL DEFAULT 1 CHECK (use_count >= 1)
                );

                CREATE TABLE IF NOT EXISTS user_settings (
                    key TEXT PRIMARY KEY,
                    value TEXT NOT NULL,
                    updated_at TEXT NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_food_entries_logged_at ON food_entries(logged_at);
                CREATE INDEX IF NOT EXISTS idx_workout_entries_logged_at ON workout_entries(logged_at);
                CREATE INDEX IF NOT EXISTS idx_foods_name ON foods(name);

                PRAGMA user_version = 1;",
            )?;
            debug!("Created schema v1");
        }

        if version < 2 {
            self.seed_catalog()?;
            self.conn.execute_batch("PRAGMA user_version = 2;")?;
        }

        if version < 3 {
            self.conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS weight_logs (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    weight_kg REAL NOT NULL CHECK (weight_kg > 0),
                    logged_at INTEGER NOT NULL,
                    note TEXT
                );

                CREATE INDEX IF NOT EXISTS idx_weight_logs_logged_at ON weight_logs(logged_at);

                PRAGMA user_version = 3;",
            )?;
            debug!("Migrated to schema v3");
        }

        Ok(())
    }

    fn seed_catalog(&self) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        for (name, calories, protein, carbs, fat, category, alias) in seed::FOODS {
            tx.execute(
                "INSERT INTO foods (name, calories_per_100g, protein_per_100g, carbs_per_100g, fat_per_100g, category, is_custom, alias)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7)",
                params![name, calories, protein, carbs, fat, category, alias],
            )?;
        }
        for (name, per_unit, unit, category) in seed::WORKOUTS {
            tx.execute(
                "INSERT INTO workouts (name, calories_per_unit, unit, category, is_custom)
                 VALUES (?1, ?2, ?3, ?4, 0)",
                params![name, per_unit, unit, category],
            )?;
        }
        tx.commit()?;
        info!(
            foods = seed::FOODS.len(),
            workouts = seed::WORKOUTS.len(),
            "Seeded built-in catalog"
        );
        Ok(())
    }

    // --- Row mapping helpers ---

    fn instant(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
        let millis: i64 = row.get(idx)?;
        DateTime::from_timestamp_millis(millis)
            .ok_or(rusqlite::Error::IntegralValueOutOfRange(idx, millis))
    }

    fn food_from_row(row: &rusqlite::Row) -> rusqlite::Result<Food> {
        Ok(Food {
            id: row.get(0)?,
            name: row.get(1)?,
            calories_per_100g: row.get(2)?,
            protein_per_100g: row.get(3)?,
            carbs_per_100g: row.get(4)?,
            fat_per_100g: row.get(5)?,
            category: row.get(6)?,
            is_custom: row.get(7)?,
            alias: row.get(8)?,
            serving_size: row.get(9)?,
            serving_unit: row.get(10)?,
        })
    }

    // Expects columns:
    // 0: fe.id, 1: fe.food_id, 2: fe.quantity_g, 3: fe.meal_type, 4: fe.logged_at,
    // 5: fe.calories, 6: fe.protein, 7: fe.carbs, 8: fe.fat, 9: f.name
    fn food_entry_from_row(row: &rusqlite::Row) -> rusqlite::Result<FoodEntry> {
        let code: i64 = row.get(3)?;
        let meal_type =
            MealType::from_code(code).ok_or(rusqlite::Error::IntegralValueOutOfRange(3, code))?;
        Ok(FoodEntry {
            id: row.get(0)?,
            food_id: row.get(1)?,
            quantity_g: row.get(2)?,
            meal_type,
            logged_at: Self::instant(row, 4)?,
            calories: row.get(5)?,
            protein: row.get(6)?,
            carbs: row.get(7)?,
            fat: row.get(8)?,
            food_name: row.get(9)?,
        })
    }

    fn workout_from_row(row: &rusqlite::Row) -> rusqlite::Result<Workout> {
        Ok(Workout {
            id: row.get(0)?,
            name: row.get(1)?,
            calories_per_unit: row.get(2)?,
            unit: row.get(3)?,
            category: row.get(4)?,
            is_custom: row.get(5)?,
        })
    }

    // 0: we.id, 1: we.workout_id, 2: we.quantity, 3: we.duration_min, 4: we.logged_at,
    // 5: we.calories_burned, 6: we.note, 7: w.name
    fn workout_entry_from_row(row: &rusqlite::Row) -> rusqlite::Result<WorkoutEntry> {
        Ok(WorkoutEntry {
            id: row.get(0)?,
            workout_id: row.get(1)?,
            quantity: row.get(2)?,
            duration_min: row.get(3)?,
            logged_at: Self::instant(row, 4)?,
            calories_burned: row.get(5)?,
            note: row.get(6)?,
            workout_name: row.get(7)?,
        })
    }

    fn favorite_from_row(row: &rusqlite::Row) -> rusqlite::Result<FavoriteFood> {
        Ok(FavoriteFood {
            id: row.get(0)?,
            food_id: row.get(1)?,
            default_quantity_g: row.get(2)?,
            last_used: Self::instant(row, 3)?,
            use_count: row.get(4)?,
        })
    }

    fn weight_log_from_row(row: &rusqlite::Row) -> rusqlite::Result<WeightLog> {
        Ok(WeightLog {
            id: row.get(0)?,
            weight_kg: row.get(1)?,
            logged_at: Self::instant(row, 2)?,
            note: row.get(3)?,
        })
    }

    const FOOD_COLUMNS: &'static str = "id, name, calories_per_100g, protein_per_100g, carbs_per_100g, fat_per_100g, category, is_custom, alias, serving_size, serving_unit";

    const FOOD_ENTRY_SELECT: &'static str = "SELECT fe.id, fe.food_id, fe.quantity_g, fe.meal_type, fe.logged_at,
                fe.calories, fe.protein, fe.carbs, fe.fat, f.name
         FROM food_entries fe
         LEFT JOIN foods f ON fe.food_id = f.id";

    const WORKOUT_ENTRY_SELECT: &'static str = "SELECT we.id, we.workout_id, we.quantity, we.duration_min, we.logged_at,
                we.calories_burned, we.note, w.name
         FROM workout_entries we
         LEFT JOIN workouts w ON we.workout_id = w.id";

    const FAVORITE_COLUMNS: &'static str = "id, food_id, default_quantity_g, last_used, use_count";

    fn get_food_entry(&self, id: i64) -> Result<FoodEntry> {
        self.conn
            .query_row(
                &format!("{} WHERE fe.id = ?1", Self::FOOD_ENTRY_SELECT),
                params![id],
                Self::food_entry_from_row,
            )
            .context("Food entry not found")
    }

    fn get_workout_entry(&self, id: i64) -> Result<WorkoutEntry> {
        self.conn
            .query_row(
                &format!("{} WHERE we.id = ?1", Self::WORKOUT_ENTRY_SELECT),
                params![id],
                Self::workout_entry_from_row,
            )
            .context("Workout entry not found")
    }

    fn insert_food_entry_on(conn: &Connection, entry: &NewFoodEntry) -> Result<i64> {
        conn.execute(
            "INSERT INTO food_entries (food_id, quantity_g, meal_type, logged_at, calories, protein, carbs, fat)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                entry.food_id,
                entry.quantity_g,
                entry.meal_type.code(),
                entry.logged_at.timestamp_millis(),
                entry.nutrients.calories,
                entry.nutrients.protein,
                entry.nutrients.carbs,
                entry.nutrients.fat,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    // --- User Settings ---

    pub fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        let now = Local::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO user_settings (key, value, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, now],
        )?;
        Ok(())
    }

    pub fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM user_settings WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }
}

impl Repository for Database {
    // --- Foods ---

    fn get_food(&self, id: i64) -> Result<Food> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM foods WHERE id = ?1", Self::FOOD_COLUMNS),
                params![id],
                Self::food_from_row,
            )
            .context("Food not found")
    }

    fn list_foods(&self) -> Result<Vec<Food>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM foods ORDER BY name, id",
            Self::FOOD_COLUMNS
        ))?;
        let foods = stmt
            .query_map([], Self::food_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(foods)
    }

    fn insert_food(&self, food: &NewFood) -> Result<Food> {
        self.conn.execute(
            "INSERT INTO foods (name, calories_per_100g, protein_per_100g, carbs_per_100g, fat_per_100g, category, is_custom, alias, serving_size, serving_unit)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                food.name,
                food.calories_per_100g,
                food.protein_per_100g,
                food.carbs_per_100g,
                food.fat_per_100g,
                food.category,
                food.is_custom,
                food.alias,
                food.serving_size,
                food.serving_unit,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        debug!(id, name = %food.name, "Inserted food");
        self.get_food(id)
    }

    fn delete_food(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM foods WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    // --- Food entries ---

    fn list_entries_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<FoodEntry>> {
        let mut stmt = self.conn.prepare(&format!(
            "{} WHERE fe.logged_at >= ?1 AND fe.logged_at < ?2 ORDER BY fe.logged_at, fe.id",
            Self::FOOD_ENTRY_SELECT
        ))?;
        let entries = stmt
            .query_map(
                params![start.timestamp_millis(), end.timestamp_millis()],
                Self::food_entry_from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    fn insert_food_entry(&self, entry: &NewFoodEntry) -> Result<FoodEntry> {
        let id = Self::insert_food_entry_on(&self.conn, entry)?;
        debug!(id, food_id = entry.food_id, "Inserted food entry");
        self.get_food_entry(id)
    }

    fn delete_food_entry(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM food_entries WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    // --- Workouts ---

    fn get_workout(&self, id: i64) -> Result<Workout> {
        self.conn
            .query_row(
                "SELECT id, name, calories_per_unit, unit, category, is_custom FROM workouts WHERE id = ?1",
                params![id],
                Self::workout_from_row,
            )
            .context("Workout not found")
    }

    fn list_workouts(&self) -> Result<Vec<Workout>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, calories_per_unit, unit, category, is_custom FROM workouts ORDER BY category, name",
        )?;
        let workouts = stmt
            .query_map([], Self::workout_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(workouts)
    }

    fn insert_workout(&self, workout: &NewWorkout) -> Result<Workout> {
        self.conn.execute(
            "INSERT INTO workouts (name, calories_per_unit, unit, category, is_custom)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                workout.name,
                workout.calories_per_unit,
                workout.unit,
                workout.category,
                workout.is_custom,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        debug!(id, name = %workout.name, "Inserted workout");
        self.get_workout(id)
    }

    fn list_workout_entries_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<WorkoutEntry>> {
        let mut stmt = self.conn.prepare(&format!(
            "{} WHERE we.logged_at >= ?1 AND we.logged_at < ?2 ORDER BY we.logged_at, we.id",
            Self::WORKOUT_ENTRY_SELECT
        ))?;
        let entries = stmt
            .query_map(
                params![start.timestamp_millis(), end.timestamp_millis()],
                Self::workout_entry_from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    fn insert_workout_entry(&self, entry: &NewWorkoutEntry) -> Result<WorkoutEntry> {
        self.conn.execute(
            "INSERT INTO workout_entries (workout_id, quantity, duration_min, logged_at, calories_burned, note)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                entry.workout_id,
                entry.quantity,
                entry.duration_min,
                entry.logged_at.timestamp_millis(),
                entry.calories_burned,
                entry.note,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        debug!(id, workout_id = entry.workout_id, "Inserted workout entry");
        self.get_workout_entry(id)
    }

    fn delete_workout_entry(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM workout_entries WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    // --- Favorites ---

    fn list_favorites(&self) -> Result<Vec<FavoriteFood>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM favorite_foods ORDER BY id",
            Self::FAVORITE_COLUMNS
        ))?;
        let favorites = stmt
            .query_map([], Self::favorite_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(favorites)
    }

    fn get_favorite_by_food(&self, food_id: i64) -> Result<Option<FavoriteFood>> {
        let favorite = self
            .conn
            .query_row(
                &format!(
                    "SELECT {} FROM favorite_foods WHERE food_id = ?1",
                    Self::FAVORITE_COLUMNS
                ),
                params![food_id],
                Self::favorite_from_row,
            )
            .optional()?;
        Ok(favorite)
    }

    fn upsert_favorite(&self, favorite: &FavoriteFood) -> Result<FavoriteFood> {
        validate_default_quantity(favorite.default_quantity_g)?;
        // Counts and timestamps only ever move forward, whatever the caller holds.
        self.conn.execute(
            "INSERT INTO favorite_foods (food_id, default_quantity_g, last_used, use_count)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(food_id) DO UPDATE SET
                default_quantity_g = excluded.default_quantity_g,
                last_used = MAX(favorite_foods.last_used, excluded.last_used),
                use_count = MAX(favorite_foods.use_count, excluded.use_count)",
            params![
                favorite.food_id,
                favorite.default_quantity_g,
                favorite.last_used.timestamp_millis(),
                favorite.use_count.max(1),
            ],
        )?;
        debug!(food_id = favorite.food_id, "Upserted favorite");
        self.get_favorite_by_food(favorite.food_id)?
            .context("Favorite not found after upsert")
    }

    fn delete_favorite_by_food(&self, food_id: i64) -> Result<bool> {
        let rows = self.conn.execute(
            "DELETE FROM favorite_foods WHERE food_id = ?1",
            params![food_id],
        )?;
        Ok(rows > 0)
    }

    fn log_favorite_use(
        &self,
        entry: &NewFoodEntry,
        used_at: DateTime<Utc>,
    ) -> Result<(FoodEntry, FavoriteFood)> {
        // IMMEDIATE takes the write lock before the read, so no other
        // writer can slip a use in between.
        let tx = Transaction::new_unchecked(&self.conn, TransactionBehavior::Immediate)?;
        let mut favorite = tx
            .query_row(
                &format!(
                    "SELECT {} FROM favorite_foods WHERE food_id = ?1",
                    Self::FAVORITE_COLUMNS
                ),
                params![entry.food_id],
                Self::favorite_from_row,
            )
            .optional()?
            .with_context(|| format!("Food {} is not a favorite", entry.food_id))?;
        favorite.increment_usage(used_at);
        tx.execute(
            "UPDATE favorite_foods SET use_count = ?1, last_used = ?2 WHERE id = ?3",
            params![
                favorite.use_count,
                favorite.last_used.timestamp_millis(),
                favorite.id
            ],
        )?;
        let id = Self::insert_food_entry_on(&tx, entry)?;
        tx.commit()?;
        debug!(id, food_id = entry.food_id, use_count = favorite.use_count, "Logged favorite use");

        Ok((self.get_food_entry(id)?, favorite))
    }

    // --- Profile ---

    fn load_profile(&self) -> Result<Option<UserProfile>> {
        match self.get_setting(PROFILE_KEY)? {
            Some(json) => {
                let profile =
                    serde_json::from_str(&json).context("Stored profile is not valid JSON")?;
                Ok(Some(profile))
            }
            None => Ok(None),
        }
    }

    fn save_profile(&self, profile: &UserProfile) -> Result<()> {
        let json = serde_json::to_string(profile)?;
        self.set_setting(PROFILE_KEY, &json)?;
        info!(goal = profile.daily_calorie_goal, "Saved profile");
        Ok(())
    }

    // --- Weight log ---

    fn insert_weight_log(&self, log: &NewWeightLog) -> Result<WeightLog> {
        self.conn.execute(
            "INSERT INTO weight_logs (weight_kg, logged_at, note) VALUES (?1, ?2, ?3)",
            params![log.weight_kg, log.logged_at.timestamp_millis(), log.note],
        )?;
        let id = self.conn.last_insert_rowid();
        debug!(id, weight_kg = log.weight_kg, "Inserted weight log");
        self.conn
            .query_row(
                "SELECT id, weight_kg, logged_at, note FROM weight_logs WHERE id = ?1",
                params![id],
                Self::weight_log_from_row,
            )
            .context("Weight log not found")
    }

    fn latest_weight_log(&self) -> Result<Option<WeightLog>> {
        let log = self
            .conn
            .query_row(
                "SELECT id, weight_kg, logged_at, note FROM weight_logs
                 ORDER BY logged_at DESC, id DESC LIMIT 1",
                [],
                Self::weight_log_from_row,
            )
            .optional()?;
        Ok(log)
    }
}
