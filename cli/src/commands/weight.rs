use anyhow::Result;
use chrono::{Local, Utc};
use std::process;

use super::Service;
use super::helpers::json_error;

pub(crate) fn cmd_weight_log(
    svc: &Service,
    weight_kg: f64,
    note: Option<String>,
    json: bool,
) -> Result<()> {
    let note = note.filter(|n| !n.trim().is_empty());
    let (log, profile) = svc.log_weight(weight_kg, note, Utc::now(), Local::now().date_naive())?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "log": log,
                "profile": profile,
            }))?
        );
        return Ok(());
    }

    println!("Logged {:.1} kg", log.weight_kg);
    if let Some(ref n) = log.note {
        println!("  Note: {n}");
    }
    match profile {
        Some(p) => println!("Daily goal: {} kcal", p.daily_calorie_goal),
        None => eprintln!("No profile set; the daily goal is unchanged"),
    }

    Ok(())
}

pub(crate) fn cmd_weight_show(svc: &Service, json: bool) -> Result<()> {
    let Some(log) = svc.latest_weight_log()? else {
        let message = "No weight logged yet";
        if json {
            println!("{}", json_error(message));
        } else {
            eprintln!("{message}");
        }
        process::exit(2);
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&log)?);
    } else {
        let at = log.logged_at.with_timezone(&Local).format("%Y-%m-%d %H:%M");
        println!("{at}: {:.1} kg", log.weight_kg);
        if let Some(ref n) = log.note {
            println!("  Note: {n}");
        }
    }

    Ok(())
}
