use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::tracker::{GoalDuration, TrackerView};

/// Every state change in the tracker produces an Event.
/// Presenters subscribe to them and re-render from the latest view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    GoalChanged {
        text: String,
        at: DateTime<Utc>,
    },
    DurationSelected {
        duration: GoalDuration,
        at: DateTime<Utc>,
    },
    LearnedLogged {
        learned_count: u32,
        day: NaiveDate,
        at: DateTime<Utc>,
    },
    DayFrozen {
        freeze_count: u32,
        freeze_limit: u32,
        day: NaiveDate,
        at: DateTime<Utc>,
    },
    /// A freeze was requested with no allowance left.
    FreezeLimitReached {
        freeze_limit: u32,
        at: DateTime<Utc>,
    },
    StreakReset {
        at: DateTime<Utc>,
    },
    /// The wall-clock day changed since the last recorded action.
    DayRolledOver {
        from: NaiveDate,
        to: NaiveDate,
        at: DateTime<Utc>,
    },
    CalendarMoved {
        reference_date: NaiveDate,
        at: DateTime<Utc>,
    },
    IntroFinished {
        skipped: bool,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        view: Box<TrackerView>,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Timestamp carried by every variant.
    pub fn at(&self) -> DateTime<Utc> {
        match self {
            Event::GoalChanged { at, .. }
            | Event::DurationSelected { at, .. }
            | Event::LearnedLogged { at, .. }
            | Event::DayFrozen { at, .. }
            | Event::FreezeLimitReached { at, .. }
            | Event::StreakReset { at }
            | Event::DayRolledOver { at, .. }
            | Event::CalendarMoved { at, .. }
            | Event::IntroFinished { at, .. }
            | Event::StateSnapshot { at, .. } => *at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_type_tag() {
        let event = Event::StreakReset { at: Utc::now() };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "StreakReset");
    }

    #[test]
    fn at_returns_variant_timestamp() {
        let at = Utc::now();
        let event = Event::FreezeLimitReached { freeze_limit: 6, at };
        assert_eq!(event.at(), at);
    }
}
