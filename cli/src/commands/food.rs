use anyhow::Result;
use std::process;

use calo_core::models::{FoodWithDetails, NewFood};

use super::Service;
use super::helpers::{json_error, print_food_table};

#[allow(clippy::too_many_arguments)]
pub(crate) fn cmd_food_add(
    svc: &Service,
    name: &str,
    calories: f64,
    protein: f64,
    carbs: f64,
    fat: f64,
    category: Option<String>,
    alias: Option<String>,
    serving: Option<f64>,
    json: bool,
) -> Result<()> {
    let mut food = NewFood::custom(name, calories, protein, carbs, fat);
    if let Some(category) = category {
        food.category = category;
    }
    food.alias = alias.filter(|a| !a.trim().is_empty());
    if let Some(serving) = serving {
        food.serving_size = serving;
    }
    let food = svc.add_food(&food)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&food)?);
    } else {
        let name = &food.name;
        let id = food.id;
        println!("Added food: {name} (id: {id})");
    }

    Ok(())
}

pub(crate) fn cmd_food_list(svc: &Service, custom_only: bool, json: bool) -> Result<()> {
    let found: Vec<FoodWithDetails> = svc
        .search_foods("")?
        .into_iter()
        .filter(|d| !custom_only || d.food.is_custom)
        .collect();
    print_results(&found, "No foods found", json)
}

pub(crate) fn cmd_food_search(svc: &Service, query: &str, json: bool) -> Result<()> {
    let found = svc.search_foods(query)?;
    print_results(&found, &format!("No results found for '{query}'"), json)
}

pub(crate) fn cmd_food_delete(svc: &Service, id: i64, json: bool) -> Result<()> {
    let name = svc.get_food(id).map(|f| f.name).ok();
    if !svc.delete_food(id)? {
        let message = format!("Food {id} not found");
        if json {
            println!("{}", json_error(&message));
        } else {
            eprintln!("{message}");
        }
        process::exit(2);
    }

    if json {
        println!("{}", serde_json::json!({ "deleted": id }));
    } else {
        let name = name.unwrap_or_default();
        println!("Deleted food: {name} (id: {id})");
    }

    Ok(())
}

fn print_results(found: &[FoodWithDetails], empty_message: &str, json: bool) -> Result<()> {
    if found.is_empty() {
        if json {
            println!("[]");
        } else {
            eprintln!("{empty_message}");
        }
        process::exit(2);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(found)?);
    } else {
        print_food_table(found);
    }

    Ok(())
}
