mod calendar;
mod engine;
mod goal;
mod streak;

pub use calendar::{day_label, short_weekday, CalendarCursor, WeekStart};
pub use engine::{
    RolloverPolicy, Tracker, TrackerAction, TrackerSettings, TrackerView, WeekDayCell,
};
pub use goal::{Goal, GoalDuration};
pub use streak::{FreezeOutcome, FreezePolicy, StreakState, StreakStatus, DEFAULT_FREEZE_LIMIT};
