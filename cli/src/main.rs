mod commands;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process;
use tracing_subscriber::EnvFilter;

use crate::commands::{
    ProfileArgs, Service, cmd_entry_delete, cmd_favorite_add, cmd_favorite_list, cmd_favorite_remove,
    cmd_favorite_use, cmd_food_add, cmd_food_delete, cmd_food_list, cmd_food_search, cmd_log, cmd_profile_set,
    cmd_profile_show, cmd_summary, cmd_weight_log, cmd_weight_show, cmd_workout_add,
    cmd_workout_list, cmd_workout_log,
};
use crate::config::Config;
use calo_core::aggregate::BalancePolicy;
use calo_core::db::Database;

#[derive(Parser)]
#[command(
    name = "calo",
    version,
    about = "Track what you eat and burn, one day at a time",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log a food entry by ID, name, or alias
    Log {
        /// Food ID, name, or alias to search for
        food: String,
        /// Quantity in grams (e.g. "200" or "200g"; default: favorite or serving size)
        grams: Option<String>,
        /// Meal type: breakfast, lunch, dinner, snack
        #[arg(short, long, default_value = "snack")]
        meal: String,
        /// Date to log for (YYYY-MM-DD, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the daily balance: eaten, burned, remaining, progress
    Summary {
        /// Date (YYYY-MM-DD or today/yesterday/tomorrow, default: today)
        date: Option<String>,
        /// Never show progress below 0%
        #[arg(long)]
        floor_progress: bool,
        /// Never show remaining calories below 0
        #[arg(long)]
        floor_remaining: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Manage logged entries
    Entry {
        #[command(subcommand)]
        command: EntryCommands,
    },
    /// Manage the food catalog
    Food {
        #[command(subcommand)]
        command: FoodCommands,
    },
    /// Log and manage workouts
    Workout {
        #[command(subcommand)]
        command: WorkoutCommands,
    },
    /// Favorite foods for quick logging
    Favorite {
        #[command(subcommand)]
        command: FavoriteCommands,
    },
    /// Body metrics and the daily calorie goal
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },
    /// Log weigh-ins
    Weight {
        #[command(subcommand)]
        command: WeightCommands,
    },
}

#[derive(Subcommand)]
enum EntryCommands {
    /// Delete an entry by ID
    Delete {
        /// Entry ID
        id: i64,
        /// The ID is a workout entry
        #[arg(long)]
        workout: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum FoodCommands {
    /// Add a custom food
    Add {
        /// Food name
        name: String,
        /// Calories per 100g
        #[arg(long)]
        calories: f64,
        /// Protein per 100g
        #[arg(long, default_value = "0")]
        protein: f64,
        /// Carbs per 100g
        #[arg(long, default_value = "0")]
        carbs: f64,
        /// Fat per 100g
        #[arg(long, default_value = "0")]
        fat: f64,
        /// Category: com, pho, bun, banh, xoi, thit, hai_san, rau, trung, do_uong, an_vat, trai_cay, other
        #[arg(long)]
        category: Option<String>,
        /// Search alias, e.g. "pho, bun"
        #[arg(long)]
        alias: Option<String>,
        /// Serving size in grams (default: 100)
        #[arg(long)]
        serving: Option<f64>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List all foods
    List {
        /// Only user-added foods
        #[arg(long)]
        custom: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Search foods by name or alias
    Search {
        /// Search query
        query: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a food with its entries and favorite
    Delete {
        /// Food ID
        id: i64,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum WorkoutCommands {
    /// List available workouts
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add a custom workout
    Add {
        /// Workout name
        name: String,
        /// Calories burned per unit
        #[arg(long)]
        calories: f64,
        /// Unit: min, km, reps, ...
        #[arg(long, default_value = "min")]
        unit: String,
        /// Category: cardio, strength, flexibility
        #[arg(long, default_value = "cardio")]
        category: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Log a workout
    Log {
        /// Workout ID or name
        workout: String,
        /// Quantity in the workout's unit
        quantity: String,
        /// Duration in minutes (default: quantity for minute-based workouts)
        #[arg(long)]
        duration: Option<i64>,
        /// Optional note
        #[arg(long)]
        note: Option<String>,
        /// Date to log for (YYYY-MM-DD, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum FavoriteCommands {
    /// Mark a food as favorite
    Add {
        /// Food ID, name, or alias
        food: String,
        /// Default quantity in grams (default: serving size)
        grams: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove a food from favorites
    Remove {
        /// Food ID, name, or alias
        food: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List favorites, most used first
    List {
        /// Maximum number of favorites to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Log a favorite at its default quantity
    Use {
        /// Food ID, name, or alias
        food: String,
        /// Meal type: breakfast, lunch, dinner, snack
        #[arg(short, long, default_value = "snack")]
        meal: String,
        /// Date to log for (YYYY-MM-DD, default: today)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum ProfileCommands {
    /// Create or update the profile and recompute the daily goal
    Set {
        #[arg(long)]
        name: Option<String>,
        /// Age in years
        #[arg(long)]
        age: Option<i64>,
        /// Height in cm
        #[arg(long)]
        height: Option<f64>,
        /// Weight in kg
        #[arg(long)]
        weight: Option<f64>,
        /// male or female
        #[arg(long)]
        gender: Option<String>,
        /// Activity level 1-5 or sedentary/light/moderate/active/very_active
        #[arg(long)]
        activity: Option<String>,
        /// Weight goal: lose, maintain, gain
        #[arg(long)]
        goal: Option<String>,
        /// Target weight in kg
        #[arg(long)]
        target_weight: Option<f64>,
        /// Date to reach the target weight (YYYY-MM-DD)
        #[arg(long)]
        target_date: Option<String>,
        /// Kilograms per week; sets the target date from the target weight
        #[arg(long, conflicts_with = "target_date")]
        weekly_rate: Option<f64>,
        /// Drop the stored target weight and date
        #[arg(long, conflicts_with_all = ["target_weight", "target_date", "weekly_rate"])]
        clear_target: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the profile, body metrics, and daily goal
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum WeightCommands {
    /// Log today's weight; updates the profile and its daily goal
    Log {
        /// Weight in kg
        kg: f64,
        /// Optional note
        #[arg(long)]
        note: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the latest weigh-in
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

#[allow(clippy::too_many_lines)]
fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;
    tracing::debug!(path = %config.db_path.display(), "Opening database");
    let svc = Service::new(Database::open(&config.db_path)?);

    match cli.command {
        Commands::Log {
            food,
            grams,
            meal,
            date,
            json,
        } => cmd_log(&svc, &food, grams.as_deref(), &meal, date, json),
        Commands::Summary {
            date,
            floor_progress,
            floor_remaining,
            json,
        } => cmd_summary(
            &svc,
            date,
            BalancePolicy {
                floor_progress_at_zero: floor_progress,
                floor_remaining_at_zero: floor_remaining,
            },
            json,
        ),
        Commands::Entry { command } => match command {
            EntryCommands::Delete { id, workout, json } => {
                cmd_entry_delete(&svc, id, workout, json)
            }
        },
        Commands::Food { command } => match command {
            FoodCommands::Add {
                name,
                calories,
                protein,
                carbs,
                fat,
                category,
                alias,
                serving,
                json,
            } => cmd_food_add(
                &svc, &name, calories, protein, carbs, fat, category, alias, serving, json,
            ),
            FoodCommands::List { custom, json } => cmd_food_list(&svc, custom, json),
            FoodCommands::Search { query, json } => cmd_food_search(&svc, &query, json),
            FoodCommands::Delete { id, json } => cmd_food_delete(&svc, id, json),
        },
        Commands::Workout { command } => match command {
            WorkoutCommands::List { json } => cmd_workout_list(&svc, json),
            WorkoutCommands::Add {
                name,
                calories,
                unit,
                category,
                json,
            } => cmd_workout_add(&svc, &name, calories, &unit, &category, json),
            WorkoutCommands::Log {
                workout,
                quantity,
                duration,
                note,
                date,
                json,
            } => cmd_workout_log(&svc, &workout, &quantity, duration, note, date, json),
        },
        Commands::Favorite { command } => match command {
            FavoriteCommands::Add { food, grams, json } => {
                cmd_favorite_add(&svc, &food, grams.as_deref(), json)
            }
            FavoriteCommands::Remove { food, json } => cmd_favorite_remove(&svc, &food, json),
            FavoriteCommands::List { limit, json } => cmd_favorite_list(&svc, limit, json),
            FavoriteCommands::Use {
                food,
                meal,
                date,
                json,
            } => cmd_favorite_use(&svc, &food, &meal, date, json),
        },
        Commands::Profile { command } => match command {
            ProfileCommands::Set {
                name,
                age,
                height,
                weight,
                gender,
                activity,
                goal,
                target_weight,
                target_date,
                weekly_rate,
                clear_target,
                json,
            } => cmd_profile_set(
                &svc,
                ProfileArgs {
                    name,
                    age,
                    height_cm: height,
                    weight_kg: weight,
                    gender,
                    activity,
                    goal,
                    target_weight_kg: target_weight,
                    target_date,
                    weekly_rate_kg: weekly_rate,
                    clear_target,
                },
                json,
            ),
            ProfileCommands::Show { json } => cmd_profile_show(&svc, json),
        },
        Commands::Weight { command } => match command {
            WeightCommands::Log { kg, note, json } => cmd_weight_log(&svc, kg, note, json),
            WeightCommands::Show { json } => cmd_weight_show(&svc, json),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_summary_flags() {
        let cli = Cli::try_parse_from(["calo", "summary", "2024-05-01", "--floor-progress"])
            .unwrap();
        match cli.command {
            Commands::Summary {
                date,
                floor_progress,
                floor_remaining,
                json,
            } => {
                assert_eq!(date.as_deref(), Some("2024-05-01"));
                assert!(floor_progress);
                assert!(!floor_remaining);
                assert!(!json);
            }
            _ => panic!("expected summary"),
        }
    }

    #[test]
    fn test_parse_weight_log() {
        let cli =
            Cli::try_parse_from(["calo", "weight", "log", "68.4", "--note", "after run"]).unwrap();
        match cli.command {
            Commands::Weight {
                command: WeightCommands::Log { kg, note, json },
            } => {
                assert!((kg - 68.4).abs() < f64::EPSILON);
                assert_eq!(note.as_deref(), Some("after run"));
                assert!(!json);
            }
            _ => panic!("expected weight log"),
        }
    }

    #[test]
    fn test_weekly_rate_conflicts_with_target_date() {
        assert!(
            Cli::try_parse_from([
                "calo",
                "profile",
                "set",
                "--weekly-rate",
                "0.5",
                "--target-date",
                "2030-01-01"
            ])
            .is_err()
        );
    }

    #[test]
    fn test_clear_target_conflicts() {
        assert!(
            Cli::try_parse_from([
                "calo",
                "profile",
                "set",
                "--clear-target",
                "--target-weight",
                "60"
            ])
            .is_err()
        );
    }
}
