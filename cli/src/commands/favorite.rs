use anyhow::Result;
use chrono::{Local, Utc};
use std::process;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use calo_core::models::MealType;

use super::helpers::{json_error, log_instant, parse_date, parse_quantity, truncate};
use super::{Service, resolve_food};

pub(crate) fn cmd_favorite_add(
    svc: &Service,
    food_query: &str,
    grams: Option<&str>,
    json: bool,
) -> Result<()> {
    let details = resolve_food(svc, food_query, json)?;
    let grams = grams.map(parse_quantity).transpose()?;
    let favorite = svc.add_favorite(details.food.id, grams, Utc::now())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&favorite)?);
    } else {
        let name = &details.food.name;
        let qty = favorite.default_quantity_g;
        println!("Favorite: {name} ({qty:.0}g)");
    }

    Ok(())
}

pub(crate) fn cmd_favorite_remove(svc: &Service, food_query: &str, json: bool) -> Result<()> {
    let details = resolve_food(svc, food_query, json)?;
    let removed = svc.remove_favorite(details.food.id)?;

    if !removed {
        let message = format!("{} is not a favorite", details.food.name);
        if json {
            println!("{}", json_error(&message));
        } else {
            eprintln!("{message}");
        }
        process::exit(2);
    }

    if json {
        println!("{}", serde_json::json!({ "removed": details.food.id }));
    } else {
        println!("Removed favorite: {}", details.food.name);
    }

    Ok(())
}

pub(crate) fn cmd_favorite_list(svc: &Service, limit: usize, json: bool) -> Result<()> {
    #[derive(Tabled)]
    struct FavoriteRow {
        #[tabled(rename = "#")]
        rank: usize,
        #[tabled(rename = "Food ID")]
        food_id: i64,
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "Grams")]
        grams: String,
        #[tabled(rename = "Calories")]
        calories: String,
        #[tabled(rename = "Uses")]
        uses: i64,
        #[tabled(rename = "Last used")]
        last_used: String,
    }

    let items = svc.quick_add_list(limit)?;

    if items.is_empty() {
        if json {
            println!("[]");
        } else {
            eprintln!("No favorites yet");
        }
        process::exit(2);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(());
    }

    let rows: Vec<FavoriteRow> = items
        .iter()
        .enumerate()
        .map(|(i, item)| FavoriteRow {
            rank: i + 1,
            food_id: item.food.id,
            name: truncate(&item.food.name, 30),
            grams: format!("{:.0}", item.quantity_g),
            calories: format!("{:.0}", item.calories),
            uses: item.favorite.use_count,
            last_used: item
                .favorite
                .last_used
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M")
                .to_string(),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(3..6)).with(Alignment::right()))
        .to_string();
    println!("{table}");

    Ok(())
}

pub(crate) fn cmd_favorite_use(
    svc: &Service,
    food_query: &str,
    meal: &str,
    date: Option<String>,
    json: bool,
) -> Result<()> {
    let meal_type: MealType = meal.parse()?;
    let date = parse_date(date)?;
    let details = resolve_food(svc, food_query, json)?;

    if !details.is_favorite() {
        let message = format!("{} is not a favorite", details.food.name);
        if json {
            println!("{}", json_error(&message));
        } else {
            eprintln!("{message}");
        }
        process::exit(2);
    }

    let (entry, favorite) =
        svc.quick_add_favorite(details.food.id, meal_type, log_instant(date), Utc::now())?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "entry": entry,
                "favorite": favorite,
            }))?
        );
    } else {
        let name = &details.food.name;
        let grams = entry.quantity_g;
        let cal = entry.calories;
        let uses = favorite.use_count;
        println!("Logged: {name} {grams:.0}g for {meal_type}: {cal:.0} kcal (used {uses}x)");
    }

    Ok(())
}
