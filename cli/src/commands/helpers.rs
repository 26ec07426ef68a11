use anyhow::{Context, Result, bail};
use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::Serialize;
use std::io::{self, BufRead, Write};
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use calo_core::models::FoodWithDetails;

/// Parse a quantity like "200", "200g" or "1.5". Zero is allowed.
pub(crate) fn parse_quantity(s: &str) -> Result<f64> {
    let trimmed = s.trim().trim_end_matches('g').trim();
    let value: f64 = trimmed
        .parse()
        .with_context(|| format!("Invalid quantity: '{s}'. Use a number like '200' or '200g'"))?;
    if !value.is_finite() || value < 0.0 {
        bail!("Quantity must not be negative");
    }
    Ok(value)
}

pub(crate) fn parse_date(date_str: Option<String>) -> Result<NaiveDate> {
    match date_str {
        None => Ok(Local::now().date_naive()),
        Some(s) => match s.as_str() {
            "today" => Ok(Local::now().date_naive()),
            "yesterday" => Ok(Local::now().date_naive() - chrono::Duration::days(1)),
            "tomorrow" => Ok(Local::now().date_naive() + chrono::Duration::days(1)),
            _ => NaiveDate::parse_from_str(&s, "%Y-%m-%d").with_context(|| {
                format!("Invalid date '{s}'. Use YYYY-MM-DD or today/yesterday/tomorrow")
            }),
        },
    }
}

/// Instant to log at: now for today, otherwise the current local time of day
/// on `date`.
pub(crate) fn log_instant(date: NaiveDate) -> DateTime<Utc> {
    let now = Local::now();
    if date == now.date_naive() {
        return now.with_timezone(&Utc);
    }
    date.and_time(now.time())
        .and_local_timezone(Local)
        .earliest()
        .map_or_else(Utc::now, |t| t.with_timezone(&Utc))
}

pub(crate) fn prompt_choice(count: usize) -> Result<usize> {
    eprint!("\nSelect a food (1-{count}): ");
    io::stderr().flush()?;
    let stdin = io::stdin();
    let line = stdin.lock().lines().next().context("No input")??;
    let n: usize = line.trim().parse().context("Invalid number")?;
    if n < 1 || n > count {
        bail!("Selection out of range");
    }
    Ok(n - 1)
}

pub(crate) fn print_food_table(foods: &[FoodWithDetails]) {
    #[derive(Tabled)]
    struct FoodRow {
        #[tabled(rename = "#")]
        idx: usize,
        #[tabled(rename = "ID")]
        id: i64,
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "Alias")]
        alias: String,
        #[tabled(rename = "Cal/100g")]
        calories: String,
        #[tabled(rename = "P/100g")]
        protein: String,
        #[tabled(rename = "C/100g")]
        carbs: String,
        #[tabled(rename = "F/100g")]
        fat: String,
        #[tabled(rename = "Fav")]
        favorite: String,
    }

    let rows: Vec<FoodRow> = foods
        .iter()
        .enumerate()
        .map(|(i, d)| {
            let f = &d.food;
            FoodRow {
                idx: i + 1,
                id: f.id,
                name: truncate(&f.name, 30),
                alias: f
                    .alias
                    .as_deref()
                    .map(|a| truncate(a, 20))
                    .unwrap_or_default(),
                calories: format!("{:.0}", f.calories_per_100g),
                protein: format!("{:.1}", f.protein_per_100g),
                carbs: format!("{:.1}", f.carbs_per_100g),
                fat: format!("{:.1}", f.fat_per_100g),
                favorite: if d.is_favorite() { "*".into() } else { String::new() },
            }
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(4..8)).with(Alignment::right()))
        .to_string();
    println!("{table}");
}

pub(crate) fn json_error(message: &str) -> String {
    #[derive(Serialize)]
    struct CliError<'a> {
        error: &'a str,
    }
    serde_json::to_string(&CliError { error: message })
        .unwrap_or_else(|_| format!("{{\"error\":\"{message}\"}}"))
}

pub(crate) fn no_neg_zero(v: f64) -> f64 {
    if v == 0.0 { 0.0 } else { v }
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let end = s.char_indices().nth(max - 3).map_or(s.len(), |(i, _)| i);
        format!("{}...", &s[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_quantity() {
        assert!((parse_quantity("200").unwrap() - 200.0).abs() < f64::EPSILON);
        assert!((parse_quantity("200g").unwrap() - 200.0).abs() < f64::EPSILON);
        assert!((parse_quantity("200.5g").unwrap() - 200.5).abs() < f64::EPSILON);
        assert!((parse_quantity(" 30 ").unwrap() - 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_quantity_zero_allowed() {
        assert!(parse_quantity("0").unwrap().abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_quantity_invalid() {
        assert!(parse_quantity("abc").is_err());
        assert!(parse_quantity("-50").is_err());
        assert!(parse_quantity("-50g").is_err());
    }

    #[test]
    fn test_parse_date_none() {
        let today = Local::now().date_naive();
        assert_eq!(parse_date(None).unwrap(), today);
    }

    #[test]
    fn test_parse_date_keywords() {
        let today = Local::now().date_naive();
        assert_eq!(parse_date(Some("today".to_string())).unwrap(), today);
        assert_eq!(
            parse_date(Some("yesterday".to_string())).unwrap(),
            today - chrono::Duration::days(1)
        );
        assert_eq!(
            parse_date(Some("tomorrow".to_string())).unwrap(),
            today + chrono::Duration::days(1)
        );
    }

    #[test]
    fn test_parse_date_iso() {
        let date = parse_date(Some("2024-01-15".to_string())).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
    }

    #[test]
    fn test_parse_date_invalid() {
        assert!(parse_date(Some("nope".to_string())).is_err());
    }

    #[test]
    fn test_log_instant_lands_on_date() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let at = log_instant(date);
        assert_eq!(at.with_timezone(&Local).date_naive(), date);
    }

    #[test]
    fn test_truncate_utf8() {
        assert_eq!(truncate("Phở bò", 10), "Phở bò");
        assert_eq!(truncate("Trà sữa trân châu", 10), "Trà sữa...");
    }

    #[test]
    fn test_no_neg_zero() {
        assert_eq!(no_neg_zero(-0.0).to_bits(), 0.0_f64.to_bits());
        assert_eq!(no_neg_zero(5.0), 5.0);
        assert_eq!(no_neg_zero(-3.0), -3.0);
    }

    #[test]
    fn test_json_error() {
        assert_eq!(json_error("nope"), r#"{"error":"nope"}"#);
    }
}
