use clap::Args;
use learning_journey_core::{CalendarCursor, Clock, Config, SystemClock, WeekStart};
use serde::Serialize;

use super::parse_date;

#[derive(Args)]
pub struct CalendarArgs {
    /// Reference date (YYYY-MM-DD), defaults to today
    #[arg(long, value_parser = parse_date)]
    date: Option<chrono::NaiveDate>,
    /// Months to step from the reference date
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    months: i32,
    /// Weeks to step after the month step
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    weeks: i32,
    /// Start weeks on Sunday instead of the configured day
    #[arg(long)]
    sunday: bool,
}

#[derive(Serialize)]
struct CalendarOutput {
    reference_date: chrono::NaiveDate,
    month_year_label: String,
    week: Vec<chrono::NaiveDate>,
}

pub fn run(args: CalendarArgs) -> Result<(), Box<dyn std::error::Error>> {
    let week_start = if args.sunday {
        WeekStart::Sunday
    } else {
        Config::load_or_default().calendar.week_start
    };
    let date = args.date.unwrap_or_else(|| SystemClock.today());

    let mut cursor = CalendarCursor::new(date, week_start);
    cursor.step_month(args.months);
    cursor.step_week(args.weeks);

    let output = CalendarOutput {
        reference_date: cursor.reference_date(),
        month_year_label: cursor.month_year_label(),
        week: cursor.visible_week(),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
