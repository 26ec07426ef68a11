use anyhow::Result;
use chrono::Local;
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use calo_core::aggregate::BalancePolicy;

use super::Service;
use super::helpers::{no_neg_zero, parse_date};

#[allow(clippy::cast_precision_loss)]
pub(crate) fn cmd_summary(
    svc: &Service,
    date: Option<String>,
    policy: BalancePolicy,
    json: bool,
) -> Result<()> {
    #[derive(Tabled)]
    struct MealRow {
        #[tabled(rename = "Meal")]
        meal: String,
        #[tabled(rename = "Entries")]
        entries: usize,
        #[tabled(rename = "Calories")]
        calories: String,
    }

    let date = parse_date(date)?;
    let summary = svc.daily_summary(date, &Local, &policy)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    let b = &summary.balance;
    println!("=== {date} ===\n");

    if summary.food_entry_count() > 0 {
        for meal in summary.meals.iter().filter(|m| m.entry_count > 0) {
            let label = meal.meal_type.as_str().to_uppercase();
            println!("  {label} ({:.0} kcal)", meal.calories);
            for e in summary
                .entries
                .iter()
                .filter(|e| e.meal_type == meal.meal_type)
            {
                let name = e.food_name.as_deref().unwrap_or("?");
                let time = e.logged_at.with_timezone(&Local).format("%H:%M");
                println!(
                    "    [{}] {time} {name}: {:.0}g, {:.0} kcal | P:{:.0}g C:{:.0}g F:{:.0}g",
                    e.id, e.quantity_g, e.calories, e.protein, e.carbs, e.fat
                );
            }
        }
        println!();
    }

    if summary.workout_entry_count() > 0 {
        println!("  WORKOUTS ({} min)", summary.workout_duration_min);
        for w in &summary.workouts {
            let name = w.workout_name.as_deref().unwrap_or("?");
            println!(
                "    [{}] {name}: {} burned {:.0} kcal",
                w.id, w.quantity, w.calories_burned
            );
        }
        println!();
    }

    let rows: Vec<MealRow> = summary
        .meals
        .iter()
        .map(|m| MealRow {
            meal: m.meal_type.to_string(),
            entries: m.entry_count,
            calories: format!("{:.0}", no_neg_zero(m.calories)),
        })
        .collect();
    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..)).with(Alignment::right()))
        .to_string();
    println!("{table}\n");

    let t = &summary.totals;
    let split = &summary.macro_split;
    println!(
        "  EATEN:     {:.0} kcal | P:{:.0}g C:{:.0}g F:{:.0}g",
        no_neg_zero(b.consumed),
        no_neg_zero(t.protein),
        no_neg_zero(t.carbs),
        no_neg_zero(t.fat)
    );
    println!(
        "  MACROS:    P {:.0}% / C {:.0}% / F {:.0}%",
        split.protein_pct, split.carbs_pct, split.fat_pct
    );
    let g = &summary.macro_goals;
    let p = &summary.macro_progress;
    println!(
        "  TARGETS:   P {:.0}/{:.0}g ({}%) C {:.0}/{:.0}g ({}%) F {:.0}/{:.0}g ({}%)",
        no_neg_zero(t.protein),
        g.protein_g,
        p.protein_pct,
        no_neg_zero(t.carbs),
        g.carbs_g,
        p.carbs_pct,
        no_neg_zero(t.fat),
        g.fat_g,
        p.fat_pct
    );
    println!("  BURNED:    {:.0} kcal", no_neg_zero(b.burned));
    println!("  NET:       {:.0} kcal", no_neg_zero(b.net));
    println!("  GOAL:      {} kcal", b.goal);
    println!("  REMAINING: {:.0} kcal", no_neg_zero(b.remaining));
    println!("  PROGRESS:  {}%", b.progress_percent);
    if summary.is_over_goal() {
        println!("  Over goal by {:.0} kcal", b.net - b.goal as f64);
    }

    Ok(())
}
