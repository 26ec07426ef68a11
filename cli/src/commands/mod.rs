mod favorite;
mod food;
mod helpers;
mod log;
mod profile;
mod summary;
mod weight;
mod workout;

use anyhow::Result;
use std::process;

use calo_core::db::Database;
use calo_core::models::FoodWithDetails;
use calo_core::service::TrackerService;

use helpers::{json_error, print_food_table, prompt_choice};

pub(crate) use favorite::{
    cmd_favorite_add, cmd_favorite_list, cmd_favorite_remove, cmd_favorite_use,
};
pub(crate) use food::{cmd_food_add, cmd_food_delete, cmd_food_list, cmd_food_search};
pub(crate) use log::{cmd_entry_delete, cmd_log};
pub(crate) use profile::{ProfileArgs, cmd_profile_set, cmd_profile_show};
pub(crate) use summary::cmd_summary;
pub(crate) use weight::{cmd_weight_log, cmd_weight_show};
pub(crate) use workout::{cmd_workout_add, cmd_workout_list, cmd_workout_log};

pub(crate) type Service = TrackerService<Database>;

/// Resolve a food by ID or by name/alias search, prompting when the search is
/// ambiguous. Exits with status 2 when nothing matches.
pub(super) fn resolve_food(svc: &Service, food_query: &str, json: bool) -> Result<FoodWithDetails> {
    if let Ok(id) = food_query.parse::<i64>() {
        return svc.food_details(id);
    }

    let mut all = svc.search_foods(food_query)?;

    if all.is_empty() {
        let message = format!("No food found for '{food_query}'");
        if json {
            println!("{}", json_error(&message));
        } else {
            eprintln!("{message}");
        }
        process::exit(2);
    }

    if all.len() == 1 {
        return Ok(all.swap_remove(0));
    }

    print_food_table(&all);
    let idx = prompt_choice(all.len())?;
    Ok(all.swap_remove(idx))
}
