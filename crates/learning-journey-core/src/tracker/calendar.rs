//! Calendar cursor for the weekly strip.
//!
//! Holds a reference date that the user pages through by month or week.
//! "Today" comes from the caller's clock and never moves the cursor.

use chrono::{Datelike, Days, Months, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// First day of the visible week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    /// ISO 8601.
    #[default]
    Monday,
    Sunday,
}

impl WeekStart {
    pub fn weekday(&self) -> Weekday {
        match self {
            WeekStart::Monday => Weekday::Mon,
            WeekStart::Sunday => Weekday::Sun,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarCursor {
    reference_date: NaiveDate,
    #[serde(default)]
    week_start: WeekStart,
}

impl CalendarCursor {
    pub fn new(reference_date: NaiveDate, week_start: WeekStart) -> Self {
        Self {
            reference_date,
            week_start,
        }
    }

    pub fn reference_date(&self) -> NaiveDate {
        self.reference_date
    }

    pub fn week_start(&self) -> WeekStart {
        self.week_start
    }

    /// Moves by whole calendar months, clamping the day to the target
    /// month's length. Leaves the date unchanged on overflow.
    pub fn step_month(&mut self, months: i32) -> NaiveDate {
        let magnitude = Months::new(months.unsigned_abs());
        let stepped = if months >= 0 {
            self.reference_date.checked_add_months(magnitude)
        } else {
            self.reference_date.checked_sub_months(magnitude)
        };
        if let Some(date) = stepped {
            self.reference_date = date;
        }
        self.reference_date
    }

    /// Moves by `weeks * 7` days. Leaves the date unchanged on overflow.
    pub fn step_week(&mut self, weeks: i32) -> NaiveDate {
        let days = Days::new(u64::from(weeks.unsigned_abs()) * 7);
        let stepped = if weeks >= 0 {
            self.reference_date.checked_add_days(days)
        } else {
            self.reference_date.checked_sub_days(days)
        };
        if let Some(date) = stepped {
            self.reference_date = date;
        }
        self.reference_date
    }

    /// First day of the week containing the reference date.
    pub fn week_first_day(&self) -> NaiveDate {
        let start = self.week_start.weekday().num_days_from_monday();
        let current = self.reference_date.weekday().num_days_from_monday();
        let offset = (7 + current - start) % 7;
        self.reference_date
            .checked_sub_days(Days::new(u64::from(offset)))
            .unwrap_or(self.reference_date)
    }

    /// Seven consecutive dates, ascending, containing the reference date.
    pub fn visible_week(&self) -> Vec<NaiveDate> {
        self.week_first_day().iter_days().take(7).collect()
    }

    /// e.g. "March 2024".
    pub fn month_year_label(&self) -> String {
        self.reference_date.format("%B %Y").to_string()
    }

    pub fn is_today(date: NaiveDate, today: NaiveDate) -> bool {
        date == today
    }
}

/// e.g. "Friday 15 Mar".
pub fn day_label(date: NaiveDate) -> String {
    date.format("%A %-d %b").to_string()
}

/// e.g. "Fri".
pub fn short_weekday(date: NaiveDate) -> String {
    date.format("%a").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn month_round_trip_mid_month() {
        let mut cursor = CalendarCursor::new(ymd(2024, 3, 15), WeekStart::Monday);
        cursor.step_month(1);
        assert_eq!(cursor.reference_date(), ymd(2024, 4, 15));
        cursor.step_month(-1);
        assert_eq!(cursor.reference_date(), ymd(2024, 3, 15));
    }

    #[test]
    fn month_step_truncates_to_month_end() {
        let mut cursor = CalendarCursor::new(ymd(2024, 1, 31), WeekStart::Monday);
        cursor.step_month(1);
        assert_eq!(cursor.reference_date(), ymd(2024, 2, 29));
        cursor.step_month(-1);
        assert_eq!(cursor.reference_date(), ymd(2024, 1, 29));

        let mut cursor = CalendarCursor::new(ymd(2023, 1, 31), WeekStart::Monday);
        cursor.step_month(1);
        assert_eq!(cursor.reference_date(), ymd(2023, 2, 28));
    }

    #[test]
    fn month_step_crosses_year_boundary() {
        let mut cursor = CalendarCursor::new(ymd(2024, 12, 10), WeekStart::Monday);
        cursor.step_month(1);
        assert_eq!(cursor.reference_date(), ymd(2025, 1, 10));
        cursor.step_month(-13);
        assert_eq!(cursor.reference_date(), ymd(2023, 12, 10));
    }

    #[test]
    fn week_step_moves_seven_days() {
        let mut cursor = CalendarCursor::new(ymd(2024, 2, 26), WeekStart::Monday);
        cursor.step_week(1);
        assert_eq!(cursor.reference_date(), ymd(2024, 3, 4));
        cursor.step_week(-2);
        assert_eq!(cursor.reference_date(), ymd(2024, 2, 19));
    }

    #[test]
    fn overflow_leaves_date_unchanged() {
        let mut cursor = CalendarCursor::new(NaiveDate::MAX, WeekStart::Monday);
        cursor.step_month(1);
        assert_eq!(cursor.reference_date(), NaiveDate::MAX);
        cursor.step_week(1);
        assert_eq!(cursor.reference_date(), NaiveDate::MAX);
    }

    #[test]
    fn visible_week_starts_on_monday() {
        // 2024-03-15 is a Friday.
        let cursor = CalendarCursor::new(ymd(2024, 3, 15), WeekStart::Monday);
        let week = cursor.visible_week();
        assert_eq!(week.len(), 7);
        assert_eq!(week[0], ymd(2024, 3, 11));
        assert_eq!(week[6], ymd(2024, 3, 17));
        assert_eq!(week[0].weekday(), Weekday::Mon);
    }

    #[test]
    fn visible_week_starts_on_sunday() {
        let cursor = CalendarCursor::new(ymd(2024, 3, 15), WeekStart::Sunday);
        let week = cursor.visible_week();
        assert_eq!(week[0], ymd(2024, 3, 10));
        assert_eq!(week[6], ymd(2024, 3, 16));
    }

    #[test]
    fn visible_week_when_reference_is_week_start() {
        let cursor = CalendarCursor::new(ymd(2024, 3, 11), WeekStart::Monday);
        assert_eq!(cursor.visible_week()[0], ymd(2024, 3, 11));
    }

    #[test]
    fn labels() {
        let cursor = CalendarCursor::new(ymd(2024, 3, 15), WeekStart::Monday);
        assert_eq!(cursor.month_year_label(), "March 2024");
        assert_eq!(day_label(ymd(2024, 3, 15)), "Friday 15 Mar");
        assert_eq!(short_weekday(ymd(2024, 3, 15)), "Fri");
    }

    #[test]
    fn is_today_ignores_reference_date() {
        let today = ymd(2024, 3, 15);
        assert!(CalendarCursor::is_today(ymd(2024, 3, 15), today));
        assert!(!CalendarCursor::is_today(ymd(2024, 3, 14), today));
    }
}
