use anyhow::{Result, bail};
use std::process;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use calo_core::models::{NewWorkout, Workout};

use super::Service;
use super::helpers::{json_error, log_instant, parse_date, parse_quantity, truncate};

pub(crate) fn cmd_workout_list(svc: &Service, json: bool) -> Result<()> {
    #[derive(Tabled)]
    struct WorkoutRow {
        #[tabled(rename = "ID")]
        id: i64,
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "Cal/unit")]
        per_unit: String,
        #[tabled(rename = "Unit")]
        unit: String,
        #[tabled(rename = "Category")]
        category: String,
    }

    let workouts = svc.list_workouts()?;

    if workouts.is_empty() {
        if json {
            println!("[]");
        } else {
            eprintln!("No workouts found");
        }
        process::exit(2);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&workouts)?);
        return Ok(());
    }

    let rows: Vec<WorkoutRow> = workouts
        .iter()
        .map(|w| WorkoutRow {
            id: w.id,
            name: truncate(&w.name, 30),
            per_unit: format!("{:.1}", w.calories_per_unit),
            unit: w.unit.clone(),
            category: w.category.clone(),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(2..3)).with(Alignment::right()))
        .to_string();
    println!("{table}");

    Ok(())
}

pub(crate) fn cmd_workout_add(
    svc: &Service,
    name: &str,
    calories_per_unit: f64,
    unit: &str,
    category: &str,
    json: bool,
) -> Result<()> {
    let workout = svc.add_workout(&NewWorkout {
        name: name.to_string(),
        calories_per_unit,
        unit: unit.to_string(),
        category: category.to_string(),
        is_custom: true,
    })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&workout)?);
    } else {
        let name = &workout.name;
        let id = workout.id;
        println!("Added workout: {name} (id: {id})");
    }

    Ok(())
}

/// Find a workout by ID or by case-insensitive name.
fn resolve_workout(workouts: Vec<Workout>, query: &str) -> Result<Option<Workout>> {
    if let Ok(id) = query.parse::<i64>() {
        return Ok(workouts.into_iter().find(|w| w.id == id));
    }
    let needle = query.to_lowercase();
    if let Some(exact) = workouts.iter().position(|w| w.name.to_lowercase() == needle) {
        return Ok(workouts.into_iter().nth(exact));
    }
    let mut matching: Vec<Workout> = workouts
        .into_iter()
        .filter(|w| w.name.to_lowercase().contains(&needle))
        .collect();
    match matching.len() {
        0 => Ok(None),
        1 => Ok(matching.pop()),
        _ => {
            let names: Vec<&str> = matching.iter().map(|w| w.name.as_str()).collect();
            bail!(
                "'{query}' matches several workouts: {}. Use the ID instead",
                names.join(", ")
            )
        }
    }
}

pub(crate) fn cmd_workout_log(
    svc: &Service,
    workout_query: &str,
    quantity: &str,
    duration: Option<i64>,
    note: Option<String>,
    date: Option<String>,
    json: bool,
) -> Result<()> {
    let quantity = parse_quantity(quantity)?;
    let date = parse_date(date)?;

    let Some(workout) = resolve_workout(svc.list_workouts()?, workout_query)? else {
        let message = format!("No workout found for '{workout_query}'");
        if json {
            println!("{}", json_error(&message));
        } else {
            eprintln!("{message}");
        }
        process::exit(2);
    };

    // Minute-based workouts default their duration to the quantity.
    let duration = duration.unwrap_or(if workout.unit == "min" {
        quantity.round() as i64
    } else {
        0
    });

    let entry = svc.log_workout(workout.id, quantity, duration, note, log_instant(date))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entry)?);
    } else {
        let name = &workout.name;
        let unit = &workout.unit;
        let burned = entry.calories_burned;
        let id = entry.id;
        println!("Logged: {name} {quantity} {unit}: {burned:.0} kcal burned (entry {id})");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workout(id: i64, name: &str) -> Workout {
        Workout {
            id,
            name: name.to_string(),
            calories_per_unit: 5.0,
            unit: "min".to_string(),
            category: "cardio".to_string(),
            is_custom: false,
        }
    }

    fn catalog() -> Vec<Workout> {
        vec![
            workout(1, "Chạy bộ"),
            workout(2, "Chạy bộ (km)"),
            workout(3, "Yoga"),
        ]
    }

    #[test]
    fn test_resolve_workout_by_id() {
        let found = resolve_workout(catalog(), "3").unwrap().unwrap();
        assert_eq!(found.name, "Yoga");
        assert!(resolve_workout(catalog(), "42").unwrap().is_none());
    }

    #[test]
    fn test_resolve_workout_exact_name_wins() {
        let found = resolve_workout(catalog(), "CHẠY BỘ").unwrap().unwrap();
        assert_eq!(found.id, 1);
    }

    #[test]
    fn test_resolve_workout_substring() {
        let found = resolve_workout(catalog(), "yo").unwrap().unwrap();
        assert_eq!(found.id, 3);
        assert!(resolve_workout(catalog(), "bơi").unwrap().is_none());
    }

    #[test]
    fn test_resolve_workout_ambiguous() {
        assert!(resolve_workout(catalog(), "chạy").is_err());
    }
}
