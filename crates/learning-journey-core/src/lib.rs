//! # Learning Journey Core Library
//!
//! Core logic for a daily learning-habit tracker: the user declares a goal
//! and a target duration, then logs each day as learned or frozen.
//! The CLI binary and any other front end are thin presenters over this
//! library.
//!
//! ## Architecture
//!
//! - **Tracker**: goal model, daily streak state machine and calendar cursor
//!   behind one facade that publishes every change
//! - **Session**: shared session handle, screen flow and the one-shot intro
//!   timer
//! - **Storage**: TOML-based configuration
//!
//! ## Key Components
//!
//! - [`Tracker`]: facade over goal, streak and calendar
//! - [`StreakState`]: daily learned/frozen state machine
//! - [`CalendarCursor`]: reference date and visible week
//! - [`Session`]: handle shared by the setup and tracking screens
//! - [`Config`]: application configuration management

pub mod clock;
pub mod error;
pub mod events;
pub mod session;
pub mod storage;
pub mod tracker;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{ConfigError, CoreError, ValidationError};
pub use events::Event;
pub use session::{IntroOutcome, IntroTimer, Screen, ScreenFlow, Session};
pub use storage::Config;
pub use tracker::{
    CalendarCursor, FreezePolicy, Goal, GoalDuration, RolloverPolicy, StreakState, StreakStatus,
    Tracker, TrackerAction, TrackerSettings, TrackerView, WeekStart,
};
