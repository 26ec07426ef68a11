use anyhow::Result;
use std::process;

use calo_core::models::MealType;
use calo_core::service::EntryKind;

use super::helpers::{json_error, log_instant, parse_date, parse_quantity};
use super::{Service, resolve_food};

pub(crate) fn cmd_log(
    svc: &Service,
    food_query: &str,
    grams: Option<&str>,
    meal: &str,
    date: Option<String>,
    json: bool,
) -> Result<()> {
    let meal_type: MealType = meal.parse()?;
    let date = parse_date(date)?;
    let details = resolve_food(svc, food_query, json)?;
    let grams = match grams {
        Some(g) => parse_quantity(g)?,
        None => details.quantity_to_use(),
    };

    let entry = svc.log_food(details.food.id, grams, meal_type, log_instant(date))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entry)?);
    } else {
        let name = &details.food.name;
        let cal = entry.calories;
        let id = entry.id;
        println!("Logged: {name} {grams:.0}g for {meal_type}: {cal:.0} kcal (entry {id})");
    }

    Ok(())
}

pub(crate) fn cmd_entry_delete(svc: &Service, id: i64, workout: bool, json: bool) -> Result<()> {
    let kind = if workout {
        EntryKind::Workout
    } else {
        EntryKind::Food
    };
    let deleted = svc.delete_entry(kind, id)?;

    if !deleted {
        let message = format!("Entry {id} not found");
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
        println!("Deleted entry {id}");
    }

    Ok(())
}
