//! Session handle and screen flow.
//!
//! ```text
//! Intro -> Setup -> Tracking <-> EditGoal
//! ```
//!
//! Both the setup and tracking screens hold the same [`Session`]; goal edits
//! made on one are visible on the other through the tracker's channels.

use std::cell::{Ref, RefCell};
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::events::Event;
use crate::tracker::{GoalDuration, Tracker};

/// Shared, session-scoped handle to the tracker.
#[derive(Debug, Clone)]
pub struct Session {
    tracker: Rc<RefCell<Tracker>>,
}

impl Session {
    pub fn new(tracker: Tracker) -> Self {
        Self {
            tracker: Rc::new(RefCell::new(tracker)),
        }
    }

    pub fn tracker(&self) -> Ref<'_, Tracker> {
        self.tracker.borrow()
    }

    /// Run a mutation against the tracker.
    pub fn update<R>(&self, f: impl FnOnce(&mut Tracker) -> R) -> R {
        f(&mut self.tracker.borrow_mut())
    }

    pub fn ptr_eq(&self, other: &Session) -> bool {
        Rc::ptr_eq(&self.tracker, &other.tracker)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    Intro,
    Setup,
    Tracking,
    EditGoal,
}

#[derive(Debug)]
pub struct ScreenFlow {
    screen: Screen,
    session: Session,
    /// The edit screen's own duration choice; starts unselected.
    edit_duration: Option<GoalDuration>,
}

impl ScreenFlow {
    pub fn new(session: Session) -> Self {
        Self {
            screen: Screen::Intro,
            session,
            edit_duration: None,
        }
    }

    /// Start past the intro, e.g. when it is disabled.
    pub fn without_intro(session: Session) -> Self {
        Self {
            screen: Screen::Setup,
            session,
            edit_duration: None,
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn edit_duration(&self) -> Option<GoalDuration> {
        self.edit_duration
    }

    /// Leave the intro. `skipped` is true when the user navigated away
    /// before the timer fired.
    pub fn finish_intro(&mut self, skipped: bool) -> Option<Event> {
        if self.screen != Screen::Intro {
            return None;
        }
        self.screen = Screen::Setup;
        let at = self.session.tracker().now();
        Some(Event::IntroFinished { skipped, at })
    }

    /// Confirm the goal on the setup screen.
    pub fn start(&mut self) -> Result<(), ValidationError> {
        match self.screen {
            Screen::Setup => {
                self.session.tracker().goal().validate()?;
                self.screen = Screen::Tracking;
                tracing::debug!("tracking started");
                Ok(())
            }
            other => Err(ValidationError::InvalidValue {
                field: "screen".into(),
                message: format!("cannot start from {other:?}"),
            }),
        }
    }

    /// Open the goal editor. The streak resets as the editor opens.
    pub fn begin_edit(&mut self) -> Option<Event> {
        if self.screen != Screen::Tracking {
            return None;
        }
        self.screen = Screen::EditGoal;
        self.edit_duration = None;
        self.session.update(|tracker| tracker.reset())
    }

    pub fn select_edit_duration(&mut self, duration: GoalDuration) {
        if self.screen == Screen::EditGoal {
            self.edit_duration = Some(duration);
        }
    }

    /// Leave the editor and return to tracking. A duration picked in the
    /// editor replaces the goal's duration.
    pub fn confirm_edit(&mut self) -> Option<Event> {
        if self.screen != Screen::EditGoal {
            return None;
        }
        self.screen = Screen::Tracking;
        let duration = self.edit_duration.take();
        let (text, event) = self.session.update(|tracker| {
            let event = duration.and_then(|d| tracker.set_duration(d));
            (tracker.goal().text().to_string(), event)
        });
        tracing::info!(goal = %text, duration = ?duration, "goal updated");
        event
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::tracker::TrackerSettings;
    use chrono::NaiveDate;

    fn session() -> Session {
        let clock = FixedClock::new(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        Session::new(Tracker::new(TrackerSettings::default(), Box::new(clock)))
    }

    #[test]
    fn intro_leads_to_setup_once() {
        let mut flow = ScreenFlow::new(session());
        assert_eq!(flow.screen(), Screen::Intro);
        assert!(matches!(
            flow.finish_intro(true),
            Some(Event::IntroFinished { skipped: true, .. })
        ));
        assert_eq!(flow.screen(), Screen::Setup);
        assert!(flow.finish_intro(false).is_none());
    }

    #[test]
    fn start_requires_complete_goal() {
        let session = session();
        let mut flow = ScreenFlow::without_intro(session.clone());
        assert!(flow.start().is_err());

        session.update(|t| t.set_text("Spanish"));
        assert!(flow.start().is_err());

        session.update(|t| t.set_duration(GoalDuration::Month));
        assert!(flow.start().is_ok());
        assert_eq!(flow.screen(), Screen::Tracking);
    }

    #[test]
    fn edit_resets_streak_and_shares_goal() {
        let session = session();
        let mut flow = ScreenFlow::without_intro(session.clone());
        session.update(|t| {
            t.set_text("Spanish");
            t.set_duration(GoalDuration::Month);
        });
        flow.start().unwrap();
        session.update(|t| t.log_learned());
        assert_eq!(session.tracker().streak().learned_count(), 1);

        assert!(matches!(flow.begin_edit(), Some(Event::StreakReset { .. })));
        assert_eq!(flow.screen(), Screen::EditGoal);
        assert_eq!(session.tracker().streak().learned_count(), 0);

        flow.session().update(|t| t.set_text("French"));
        flow.select_edit_duration(GoalDuration::Year);
        assert!(flow.confirm_edit().is_some());
        assert_eq!(flow.screen(), Screen::Tracking);
        assert_eq!(session.tracker().goal().text(), "French");
        assert_eq!(session.tracker().goal().duration(), Some(GoalDuration::Year));
        assert!(flow.session().ptr_eq(&session));
    }

    #[test]
    fn confirm_without_edit_duration_keeps_goal_duration() {
        let session = session();
        let mut flow = ScreenFlow::without_intro(session.clone());
        session.update(|t| {
            t.set_text("Piano");
            t.set_duration(GoalDuration::Week);
        });
        flow.start().unwrap();
        flow.begin_edit();
        assert!(flow.confirm_edit().is_none());
        assert_eq!(session.tracker().goal().duration(), Some(GoalDuration::Week));
    }
}
