use anyhow::{Context, Result, bail};
use chrono::{Days, Local, NaiveDate, Utc};
use serde::Serialize;
use std::process;

use calo_core::goal::{self, BmiCategory, RatePace};
use calo_core::models::{ActivityLevel, Gender, UserProfile, WeightGoal, WeightLog};

use super::Service;
use super::helpers::json_error;

/// Fields given on the command line; anything left out keeps its stored value.
#[derive(Default)]
pub(crate) struct ProfileArgs {
    pub name: Option<String>,
    pub age: Option<i64>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    pub gender: Option<String>,
    pub activity: Option<String>,
    pub goal: Option<String>,
    pub target_weight_kg: Option<f64>,
    pub target_date: Option<String>,
    /// Derive the target date from this pace instead of giving one.
    pub weekly_rate_kg: Option<f64>,
    pub clear_target: bool,
}

fn merge(
    existing: Option<UserProfile>,
    args: ProfileArgs,
    today: NaiveDate,
) -> Result<UserProfile> {
    let gender = args.gender.as_deref().map(str::parse::<Gender>).transpose()?;
    let activity = args
        .activity
        .as_deref()
        .map(str::parse::<ActivityLevel>)
        .transpose()?;
    let weight_goal = args
        .goal
        .as_deref()
        .map(str::parse::<WeightGoal>)
        .transpose()?;
    let target_date = args
        .target_date
        .as_deref()
        .map(|s| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .with_context(|| format!("Invalid target date '{s}'. Use YYYY-MM-DD"))
        })
        .transpose()?;

    let mut profile = match existing {
        Some(p) => p,
        None => UserProfile {
            name: args.name.clone().unwrap_or_default(),
            age: args.age.context("--age is required for a new profile")?,
            height_cm: args
                .height_cm
                .context("--height is required for a new profile")?,
            weight_kg: args
                .weight_kg
                .context("--weight is required for a new profile")?,
            gender: gender.context("--gender is required for a new profile")?,
            activity_level: ActivityLevel::Moderate,
            weight_goal: WeightGoal::Maintain,
            target_weight_kg: None,
            target_date: None,
            daily_calorie_goal: 0,
        },
    };

    if let Some(name) = args.name {
        profile.name = name;
    }
    if let Some(age) = args.age {
        profile.age = age;
    }
    if let Some(height) = args.height_cm {
        profile.height_cm = height;
    }
    if let Some(weight) = args.weight_kg {
        profile.weight_kg = weight;
    }
    if let Some(gender) = gender {
        profile.gender = gender;
    }
    if let Some(activity) = activity {
        profile.activity_level = activity;
    }
    if let Some(weight_goal) = weight_goal {
        profile.weight_goal = weight_goal;
    }
    if args.clear_target {
        profile.target_weight_kg = None;
        profile.target_date = None;
    }
    if args.target_weight_kg.is_some() {
        profile.target_weight_kg = args.target_weight_kg;
    }
    if target_date.is_some() {
        profile.target_date = target_date;
    }
    if let Some(rate) = args.weekly_rate_kg {
        if !rate.is_finite() || rate <= 0.0 {
            bail!("Weekly rate must be greater than 0 kg");
        }
        let target = profile
            .target_weight_kg
            .context("--weekly-rate needs a target weight")?;
        let days = goal::days_to_goal(profile.weight_kg, target, rate);
        let days = u64::try_from(days).context("Invalid number of days to goal")?;
        profile.target_date = today.checked_add_days(Days::new(days));
    }
    Ok(profile)
}

pub(crate) fn cmd_profile_set(svc: &Service, args: ProfileArgs, json: bool) -> Result<()> {
    let today = Local::now().date_naive();
    let profile = merge(svc.profile()?, args, today)?;
    let saved = svc.save_profile(profile, Utc::now(), today)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&saved)?);
    } else {
        let goal = saved.daily_calorie_goal;
        println!("Profile saved. Daily goal: {goal} kcal");
    }

    Ok(())
}

#[derive(Serialize)]
struct TargetPlan {
    target_weight_kg: f64,
    target_date: NaiveDate,
    days_left: i64,
    weekly_rate_kg: f64,
    pace: RatePace,
    safe: bool,
}

#[derive(Serialize)]
struct ProfileReport {
    profile: UserProfile,
    daily_calorie_goal: i64,
    bmr: f64,
    tdee: f64,
    bmi: f64,
    bmi_category: BmiCategory,
    ideal_weight_kg: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    target: Option<TargetPlan>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_weigh_in: Option<WeightLog>,
}

fn build_report(
    profile: UserProfile,
    last_weigh_in: Option<WeightLog>,
    today: NaiveDate,
) -> Result<ProfileReport> {
    let is_male = profile.gender.is_male();
    let bmr = goal::bmr(profile.weight_kg, profile.height_cm, profile.age, is_male)?;
    let tdee = goal::tdee(bmr, profile.activity_level.multiplier());
    let bmi = goal::bmi(profile.weight_kg, profile.height_cm)?;
    let ideal_weight_kg = goal::ideal_weight_kg(profile.height_cm, is_male)?;

    let target = match (profile.target_weight_kg, profile.target_date) {
        (Some(target_weight_kg), Some(target_date)) => {
            let days_left = (target_date - today).num_days();
            let losing = target_weight_kg < profile.weight_kg;
            let weekly_rate_kg = goal::weekly_rate(profile.weight_kg, target_weight_kg, days_left);
            Some(TargetPlan {
                target_weight_kg,
                target_date,
                days_left,
                weekly_rate_kg,
                pace: RatePace::classify(weekly_rate_kg, losing),
                safe: goal::is_weekly_rate_safe(weekly_rate_kg, losing),
            })
        }
        _ => None,
    };

    Ok(ProfileReport {
        daily_calorie_goal: profile.effective_goal(),
        profile,
        bmr,
        tdee,
        bmi,
        bmi_category: BmiCategory::from_bmi(bmi),
        ideal_weight_kg,
        target,
        last_weigh_in,
    })
}

fn pace_label(pace: RatePace) -> &'static str {
    match pace {
        RatePace::VerySlow => "very slow",
        RatePace::SlowAndSafe => "slow and safe",
        RatePace::Moderate => "moderate",
        RatePace::Fast => "fast",
        RatePace::TooFast => "too fast",
        RatePace::NotRecommended => "not recommended",
    }
}

pub(crate) fn cmd_profile_show(svc: &Service, json: bool) -> Result<()> {
    let Some(profile) = svc.profile()? else {
        let message = "No profile set. Use 'calo profile set' first";
        if json {
            println!("{}", json_error(message));
        } else {
            eprintln!("{message}");
        }
        process::exit(2);
    };

    let report = build_report(profile, svc.latest_weight_log()?, Local::now().date_naive())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let p = &report.profile;
    if !p.name.is_empty() {
        println!("  Name:       {}", p.name);
    }
    let gender = if p.gender.is_male() { "male" } else { "female" };
    println!("  Age:        {} ({gender})", p.age);
    println!("  Height:     {:.0} cm", p.height_cm);
    println!("  Weight:     {:.1} kg", p.weight_kg);
    if let Some(log) = &report.last_weigh_in {
        let at = log.logged_at.with_timezone(&Local).format("%Y-%m-%d");
        println!("  Weighed:    {at}");
    }
    println!(
        "  Activity:   {} (level {}, x{})",
        p.activity_level.as_str(),
        p.activity_level.level(),
        p.activity_level.multiplier()
    );
    println!("  Goal:       {}", p.weight_goal.as_str());
    println!();
    println!("  BMR:        {:.0} kcal", report.bmr);
    println!("  TDEE:       {:.0} kcal", report.tdee);
    println!(
        "  BMI:        {:.1} ({})",
        report.bmi,
        report.bmi_category.label()
    );
    println!("  Ideal:      {:.1} kg", report.ideal_weight_kg);
    println!("  DAILY GOAL: {} kcal", report.daily_calorie_goal);

    if let Some(t) = &report.target {
        println!();
        println!(
            "  Target:     {:.1} kg by {} ({} days)",
            t.target_weight_kg, t.target_date, t.days_left
        );
        let warning = if t.safe { "" } else { " - above the safe rate" };
        println!(
            "  Rate:       {:.2} kg/week, {}{warning}",
            t.weekly_rate_kg,
            pace_label(t.pace)
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn new_profile_args() -> ProfileArgs {
        ProfileArgs {
            name: Some("Minh".to_string()),
            age: Some(30),
            height_cm: Some(175.0),
            weight_kg: Some(70.0),
            gender: Some("male".to_string()),
            ..ProfileArgs::default()
        }
    }

    #[test]
    fn test_merge_new_profile_defaults() {
        let profile = merge(None, new_profile_args(), today()).unwrap();
        assert_eq!(profile.age, 30);
        assert_eq!(profile.activity_level, ActivityLevel::Moderate);
        assert_eq!(profile.weight_goal, WeightGoal::Maintain);
    }

    #[test]
    fn test_merge_new_profile_requires_metrics() {
        let err = merge(None, ProfileArgs::default(), today()).unwrap_err();
        assert!(err.to_string().contains("--age"));
    }

    #[test]
    fn test_merge_keeps_existing_fields() {
        let existing = merge(None, new_profile_args(), today()).unwrap();
        let updated = merge(
            Some(existing),
            ProfileArgs {
                weight_kg: Some(68.5),
                activity: Some("5".to_string()),
                goal: Some("lose".to_string()),
                ..ProfileArgs::default()
            },
            today(),
        )
        .unwrap();
        assert_eq!(updated.age, 30);
        assert!((updated.weight_kg - 68.5).abs() < f64::EPSILON);
        assert_eq!(updated.activity_level, ActivityLevel::VeryActive);
        assert_eq!(updated.weight_goal, WeightGoal::Lose);
    }

    #[test]
    fn test_merge_rejects_bad_enum() {
        let mut args = new_profile_args();
        args.gender = Some("x".to_string());
        assert!(merge(None, args, today()).is_err());
    }

    #[test]
    fn test_merge_clear_target() {
        let mut args = new_profile_args();
        args.target_weight_kg = Some(65.0);
        args.target_date = Some("2030-01-01".to_string());
        let with_target = merge(None, args, today()).unwrap();
        assert_eq!(with_target.target_weight_kg, Some(65.0));

        let cleared = merge(
            Some(with_target),
            ProfileArgs {
                clear_target: true,
                ..ProfileArgs::default()
            },
            today(),
        )
        .unwrap();
        assert!(cleared.target_weight_kg.is_none());
        assert!(cleared.target_date.is_none());
    }

    #[test]
    fn test_build_report() {
        let mut profile = merge(None, new_profile_args(), today()).unwrap();
        profile.target_weight_kg = Some(66.0);
        profile.target_date = NaiveDate::from_ymd_opt(2024, 3, 1);
        let report = build_report(profile, None, today()).unwrap();
        assert!((report.bmr - 1648.75).abs() < 1e-9);
        assert!((report.tdee - 2555.5625).abs() < 1e-9);
        assert_eq!(report.bmi_category, BmiCategory::Normal);
        assert_eq!(report.daily_calorie_goal, 2000);

        let target = report.target.unwrap();
        assert_eq!(target.days_left, 60);
        // 4 kg over 60 days
        assert!((target.weekly_rate_kg - 4.0 / (60.0 / 7.0)).abs() < 1e-9);
        assert!(target.safe);
    }

    #[test]
    fn test_merge_weekly_rate_sets_target_date() {
        let mut args = new_profile_args();
        args.target_weight_kg = Some(65.0);
        args.weekly_rate_kg = Some(0.5);
        let profile = merge(None, args, today()).unwrap();
        // 5 kg at 0.5 kg/week is 10 weeks
        assert_eq!(profile.target_date, NaiveDate::from_ymd_opt(2024, 3, 11));
    }

    #[test]
    fn test_merge_weekly_rate_needs_target() {
        let mut args = new_profile_args();
        args.weekly_rate_kg = Some(0.5);
        let err = merge(None, args, today()).unwrap_err();
        assert!(err.to_string().contains("target weight"));

        let mut args = new_profile_args();
        args.target_weight_kg = Some(65.0);
        args.weekly_rate_kg = Some(0.0);
        assert!(merge(None, args, today()).is_err());
    }
}
