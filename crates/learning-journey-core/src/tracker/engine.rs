//! Tracker facade.
//!
//! Composes the goal, the streak state machine and the calendar cursor, and
//! publishes every change. Presenters either poll [`Tracker::view`] or
//! subscribe:
//!
//! ```ignore
//! let mut tracker = Tracker::new(TrackerSettings::default(), Box::new(SystemClock));
//! let mut views = tracker.watch();
//! tracker.log_learned();
//! // views.borrow() now holds the updated TrackerView
//! ```

use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, watch};

use super::calendar::{day_label, short_weekday, CalendarCursor, WeekStart};
use super::goal::{Goal, GoalDuration};
use super::streak::{FreezeOutcome, FreezePolicy, StreakState, StreakStatus, DEFAULT_FREEZE_LIMIT};
use crate::clock::Clock;
use crate::events::Event;
use chrono::{DateTime, NaiveDate, Utc};

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// How the end of a day is noticed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RolloverPolicy {
    /// Unlock the day's actions once the clock's date changes.
    #[default]
    Midnight,
    /// Only an explicit reset unlocks.
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerSettings {
    pub freeze_limit: u32,
    pub freeze_policy: FreezePolicy,
    pub rollover: RolloverPolicy,
    pub week_start: WeekStart,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            freeze_limit: DEFAULT_FREEZE_LIMIT,
            freeze_policy: FreezePolicy::default(),
            rollover: RolloverPolicy::default(),
            week_start: WeekStart::default(),
        }
    }
}

/// User actions coming from the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum TrackerAction {
    TextChanged { text: String },
    DurationSelected { duration: GoalDuration },
    LogLearnedTapped,
    FreezeDayTapped,
    ResetRequested,
    MonthStepped { delta: i32 },
    WeekStepped { delta: i32 },
}

/// One cell of the weekly strip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekDayCell {
    pub date: NaiveDate,
    pub day_of_month: u32,
    pub weekday: String,
    pub is_today: bool,
    /// Today's streak status; `None` for every other day.
    pub status: Option<StreakStatus>,
}

/// Everything a presenter needs to render the tracking screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerView {
    pub goal_text: String,
    pub duration: Option<GoalDuration>,
    pub start_enabled: bool,
    pub status: StreakStatus,
    pub caption: String,
    pub learned_today: bool,
    pub frozen_today: bool,
    pub actions_locked: bool,
    pub learned_count: u32,
    pub freeze_count: u32,
    pub freeze_limit: u32,
    pub freeze_usage: String,
    pub today: NaiveDate,
    pub day_label: String,
    pub reference_date: NaiveDate,
    pub month_year_label: String,
    pub week: Vec<WeekDayCell>,
}

pub struct Tracker {
    goal: Goal,
    streak: StreakState,
    cursor: CalendarCursor,
    rollover: RolloverPolicy,
    clock: Box<dyn Clock>,
    events: broadcast::Sender<Event>,
    views: watch::Sender<TrackerView>,
}

impl std::fmt::Debug for Tracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tracker")
            .field("goal", &self.goal)
            .field("streak", &self.streak)
            .field("cursor", &self.cursor)
            .field("rollover", &self.rollover)
            .finish_non_exhaustive()
    }
}

impl Tracker {
    /// Create a tracker with an empty goal, an idle streak and the cursor on
    /// the clock's today.
    pub fn new(settings: TrackerSettings, clock: Box<dyn Clock>) -> Self {
        let goal = Goal::new();
        let streak = StreakState::new(settings.freeze_limit, settings.freeze_policy);
        let cursor = CalendarCursor::new(clock.today(), settings.week_start);
        let initial = build_view(&goal, &streak, &cursor, settings.rollover, clock.today());
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let (views, _) = watch::channel(initial);
        Self {
            goal,
            streak,
            cursor,
            rollover: settings.rollover,
            clock,
            events,
            views,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn goal(&self) -> &Goal {
        &self.goal
    }

    pub fn streak(&self) -> &StreakState {
        &self.streak
    }

    pub fn cursor(&self) -> &CalendarCursor {
        &self.cursor
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn is_today(&self, date: NaiveDate) -> bool {
        CalendarCursor::is_today(date, self.clock.today())
    }

    pub fn is_start_enabled(&self) -> bool {
        self.goal.is_start_enabled()
    }

    pub fn visible_week(&self) -> Vec<NaiveDate> {
        self.cursor.visible_week()
    }

    pub fn month_year_label(&self) -> String {
        self.cursor.month_year_label()
    }

    pub fn view(&self) -> TrackerView {
        build_view(
            &self.goal,
            &self.streak,
            &self.cursor,
            self.rollover,
            self.clock.today(),
        )
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            view: Box::new(self.view()),
            at: self.clock.now(),
        }
    }

    /// Receive every event published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }

    /// Receive the latest view after each change.
    pub fn watch(&self) -> watch::Receiver<TrackerView> {
        self.views.subscribe()
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn dispatch(&mut self, action: TrackerAction) -> Option<Event> {
        match action {
            TrackerAction::TextChanged { text } => self.set_text(text),
            TrackerAction::DurationSelected { duration } => self.set_duration(duration),
            TrackerAction::LogLearnedTapped => self.log_learned(),
            TrackerAction::FreezeDayTapped => self.freeze_day(),
            TrackerAction::ResetRequested => self.reset(),
            TrackerAction::MonthStepped { delta } => self.step_month(delta),
            TrackerAction::WeekStepped { delta } => self.step_week(delta),
        }
    }

    pub fn set_text(&mut self, text: impl Into<String>) -> Option<Event> {
        self.goal.set_text(text);
        let event = Event::GoalChanged {
            text: self.goal.text().to_string(),
            at: self.clock.now(),
        };
        self.publish(event)
    }

    pub fn set_duration(&mut self, duration: GoalDuration) -> Option<Event> {
        self.goal.set_duration(duration);
        let event = Event::DurationSelected {
            duration,
            at: self.clock.now(),
        };
        self.publish(event)
    }

    pub fn log_learned(&mut self) -> Option<Event> {
        self.refresh();
        let day = self.clock.today();
        if !self.streak.log_learned(day) {
            return None;
        }
        let event = Event::LearnedLogged {
            learned_count: self.streak.learned_count(),
            day,
            at: self.clock.now(),
        };
        self.publish(event)
    }

    pub fn freeze_day(&mut self) -> Option<Event> {
        self.refresh();
        let day = self.clock.today();
        match self.streak.freeze_day(day) {
            FreezeOutcome::Frozen => {
                let event = Event::DayFrozen {
                    freeze_count: self.streak.freeze_count(),
                    freeze_limit: self.streak.freeze_limit(),
                    day,
                    at: self.clock.now(),
                };
                self.publish(event)
            }
            FreezeOutcome::LimitReached => {
                // Nothing changed, so subscribers are told but the view stays.
                let event = Event::FreezeLimitReached {
                    freeze_limit: self.streak.freeze_limit(),
                    at: self.clock.now(),
                };
                let _ = self.events.send(event.clone());
                Some(event)
            }
            FreezeOutcome::Locked => None,
        }
    }

    pub fn reset(&mut self) -> Option<Event> {
        self.streak.reset();
        tracing::debug!("streak reset");
        let event = Event::StreakReset {
            at: self.clock.now(),
        };
        self.publish(event)
    }

    pub fn step_month(&mut self, delta: i32) -> Option<Event> {
        let reference_date = self.cursor.step_month(delta);
        let event = Event::CalendarMoved {
            reference_date,
            at: self.clock.now(),
        };
        self.publish(event)
    }

    pub fn step_week(&mut self, delta: i32) -> Option<Event> {
        let reference_date = self.cursor.step_week(delta);
        let event = Event::CalendarMoved {
            reference_date,
            at: self.clock.now(),
        };
        self.publish(event)
    }

    /// Close out a previous day's status if the clock has moved on.
    /// Runs implicitly before every streak action.
    pub fn refresh(&mut self) -> Option<Event> {
        if self.rollover == RolloverPolicy::Manual {
            return None;
        }
        let today = self.clock.today();
        let from = self.streak.roll_over(today)?;
        tracing::debug!(%from, to = %today, "day rolled over");
        let event = Event::DayRolledOver {
            from,
            to: today,
            at: self.clock.now(),
        };
        self.publish(event)
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn publish(&mut self, event: Event) -> Option<Event> {
        // No subscribers is fine.
        let _ = self.events.send(event.clone());
        self.views.send_replace(self.view());
        Some(event)
    }
}

fn build_view(
    goal: &Goal,
    streak: &StreakState,
    cursor: &CalendarCursor,
    rollover: RolloverPolicy,
    today: NaiveDate,
) -> TrackerView {
    use chrono::Datelike;

    let status = match rollover {
        RolloverPolicy::Midnight => streak.status_on(today),
        RolloverPolicy::Manual => streak.status(),
    };

    let week = cursor
        .visible_week()
        .into_iter()
        .map(|date| {
            let is_today = CalendarCursor::is_today(date, today);
            WeekDayCell {
                date,
                day_of_month: date.day(),
                weekday: short_weekday(date),
                is_today,
                status: is_today.then_some(status),
            }
        })
        .collect();

    TrackerView {
        goal_text: goal.text().to_string(),
        duration: goal.duration(),
        start_enabled: goal.is_start_enabled(),
        status,
        caption: status.caption().to_string(),
        learned_today: status == StreakStatus::Learned,
        frozen_today: status == StreakStatus::Frozen,
        actions_locked: status != StreakStatus::Idle,
        learned_count: streak.learned_count(),
        freeze_count: streak.freeze_count(),
        freeze_limit: streak.freeze_limit(),
        freeze_usage: streak.freeze_usage(),
        today,
        day_label: day_label(today),
        reference_date: cursor.reference_date(),
        month_year_label: cursor.month_year_label(),
        week,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use std::rc::Rc;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn tracker_at(date: NaiveDate) -> (Tracker, Rc<FixedClock>) {
        let clock = Rc::new(FixedClock::new(date));
        let tracker = Tracker::new(TrackerSettings::default(), Box::new(Rc::clone(&clock)));
        (tracker, clock)
    }

    #[test]
    fn new_tracker_is_idle_on_today() {
        let (tracker, _) = tracker_at(ymd(2024, 3, 15));
        let view = tracker.view();
        assert_eq!(view.status, StreakStatus::Idle);
        assert_eq!(view.reference_date, ymd(2024, 3, 15));
        assert_eq!(view.month_year_label, "March 2024");
        assert_eq!(view.day_label, "Friday 15 Mar");
        assert!(!view.start_enabled);
    }

    #[test]
    fn log_learned_returns_event_once() {
        let (mut tracker, _) = tracker_at(ymd(2024, 3, 15));
        match tracker.log_learned() {
            Some(Event::LearnedLogged { learned_count, day, .. }) => {
                assert_eq!(learned_count, 1);
                assert_eq!(day, ymd(2024, 3, 15));
            }
            other => panic!("Expected LearnedLogged, got {other:?}"),
        }
        assert!(tracker.log_learned().is_none());
        assert!(tracker.freeze_day().is_none());
        assert_eq!(tracker.streak().learned_count(), 1);
    }

    #[test]
    fn today_cell_carries_status() {
        let (mut tracker, _) = tracker_at(ymd(2024, 3, 15));
        tracker.freeze_day();
        let view = tracker.view();
        let today: Vec<_> = view.week.iter().filter(|c| c.is_today).collect();
        assert_eq!(today.len(), 1);
        assert_eq!(today[0].status, Some(StreakStatus::Frozen));
        assert!(view.week.iter().filter(|c| !c.is_today).all(|c| c.status.is_none()));
        assert_eq!(view.freeze_usage, "1 out of 6 freezes used");
    }

    #[test]
    fn navigating_does_not_move_today() {
        let (mut tracker, _) = tracker_at(ymd(2024, 3, 15));
        tracker.step_week(1);
        let view = tracker.view();
        assert_eq!(view.reference_date, ymd(2024, 3, 22));
        assert!(view.week.iter().all(|c| !c.is_today));
        assert!(tracker.is_today(ymd(2024, 3, 15)));
    }

    #[test]
    fn rollover_unlocks_next_day() {
        let (mut tracker, clock) = tracker_at(ymd(2024, 3, 15));
        tracker.log_learned();
        clock.advance_days(1);
        assert!(tracker.log_learned().is_some());
        assert_eq!(tracker.streak().learned_count(), 2);
    }

    #[test]
    fn view_unlocks_once_the_day_changes() {
        let (mut tracker, clock) = tracker_at(ymd(2024, 3, 15));
        tracker.log_learned();
        clock.advance_days(1);

        let view = tracker.view();
        assert_eq!(view.today, ymd(2024, 3, 16));
        assert_eq!(view.status, StreakStatus::Idle);
        assert!(!view.learned_today);
        assert!(!view.actions_locked);
        assert_eq!(view.caption, StreakStatus::Idle.caption());
        assert_eq!(view.learned_count, 1);
        let today = view.week.iter().find(|c| c.is_today).unwrap();
        assert_eq!(today.status, Some(StreakStatus::Idle));

        // The view agrees with what a tap does.
        assert!(tracker.log_learned().is_some());
    }

    #[test]
    fn manual_rollover_view_stays_locked() {
        let clock = Rc::new(FixedClock::new(ymd(2024, 3, 15)));
        let settings = TrackerSettings {
            rollover: RolloverPolicy::Manual,
            ..Default::default()
        };
        let mut tracker = Tracker::new(settings, Box::new(Rc::clone(&clock)));
        tracker.freeze_day();
        clock.advance_days(1);
        let view = tracker.view();
        assert!(view.frozen_today);
        assert!(view.actions_locked);
    }

    #[test]
    fn manual_rollover_keeps_lock() {
        let clock = Rc::new(FixedClock::new(ymd(2024, 3, 15)));
        let settings = TrackerSettings {
            rollover: RolloverPolicy::Manual,
            ..Default::default()
        };
        let mut tracker = Tracker::new(settings, Box::new(Rc::clone(&clock)));
        tracker.log_learned();
        clock.advance_days(1);
        assert!(tracker.refresh().is_none());
        assert!(tracker.log_learned().is_none());
    }

    #[test]
    fn subscribers_receive_events() {
        let (mut tracker, clock) = tracker_at(ymd(2024, 3, 15));
        let mut rx = tracker.subscribe();
        tracker.log_learned();
        clock.advance_days(1);
        tracker.freeze_day();

        assert!(matches!(rx.try_recv(), Ok(Event::LearnedLogged { .. })));
        assert!(matches!(rx.try_recv(), Ok(Event::DayRolledOver { .. })));
        assert!(matches!(rx.try_recv(), Ok(Event::DayFrozen { freeze_count: 1, .. })));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn watchers_see_latest_view() {
        let (mut tracker, _) = tracker_at(ymd(2024, 3, 15));
        let mut rx = tracker.watch();
        tracker.set_text("Spanish");
        tracker.set_duration(GoalDuration::Month);
        assert!(rx.has_changed().unwrap());
        let view = rx.borrow_and_update().clone();
        assert_eq!(view.goal_text, "Spanish");
        assert!(view.start_enabled);
    }

    #[test]
    fn freeze_limit_event_is_published() {
        let clock = Rc::new(FixedClock::new(ymd(2024, 3, 1)));
        let settings = TrackerSettings {
            freeze_limit: 1,
            ..Default::default()
        };
        let mut tracker = Tracker::new(settings, Box::new(Rc::clone(&clock)));
        assert!(tracker.freeze_day().is_some());
        clock.advance_days(1);
        assert!(matches!(
            tracker.freeze_day(),
            Some(Event::FreezeLimitReached { freeze_limit: 1, .. })
        ));
        assert_eq!(tracker.streak().freeze_count(), 1);
    }

    #[test]
    fn dispatch_routes_actions() {
        let (mut tracker, _) = tracker_at(ymd(2024, 3, 15));
        tracker.dispatch(TrackerAction::TextChanged { text: "Piano".into() });
        tracker.dispatch(TrackerAction::DurationSelected { duration: GoalDuration::Year });
        tracker.dispatch(TrackerAction::MonthStepped { delta: -1 });
        tracker.dispatch(TrackerAction::LogLearnedTapped);
        assert_eq!(tracker.goal().text(), "Piano");
        assert_eq!(tracker.cursor().reference_date(), ymd(2024, 2, 15));
        assert!(tracker.streak().learned_today());

        tracker.dispatch(TrackerAction::ResetRequested);
        assert_eq!(tracker.streak().learned_count(), 0);
        assert!(!tracker.streak().actions_locked());
    }

    #[test]
    fn snapshot_returns_valid_event() {
        let (tracker, _) = tracker_at(ymd(2024, 3, 15));
        match tracker.snapshot() {
            Event::StateSnapshot { view, .. } => {
                assert_eq!(view.week.len(), 7);
                assert_eq!(view.freeze_limit, 6);
            }
            _ => panic!("Expected StateSnapshot"),
        }
    }
}
