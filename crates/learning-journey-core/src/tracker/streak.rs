//! Daily streak state machine.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> (Learned | Frozen) -> Idle
//! ```
//!
//! `Learned` and `Frozen` are terminal for the day. Only `reset()` or a day
//! rollover returns the machine to `Idle`. Acting while locked is a no-op.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const DEFAULT_FREEZE_LIMIT: u32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreakStatus {
    #[default]
    Idle,
    Learned,
    Frozen,
}

impl StreakStatus {
    /// Caption shown on the main action button.
    pub fn caption(&self) -> &'static str {
        match self {
            StreakStatus::Idle => "Log today as Learned",
            StreakStatus::Learned => "Learned Today",
            StreakStatus::Frozen => "Day Freezed",
        }
    }
}

/// What happens when a freeze is requested with the allowance used up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FreezePolicy {
    /// Refuse the freeze.
    #[default]
    Enforce,
    /// Count it anyway and log a warning.
    Unchecked,
}

/// Result of a freeze request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FreezeOutcome {
    Frozen,
    /// Ignored: the allowance is used up.
    LimitReached,
    /// Ignored: today's action is already recorded.
    Locked,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakState {
    status: StreakStatus,
    learned_count: u32,
    freeze_count: u32,
    freeze_limit: u32,
    #[serde(default)]
    freeze_policy: FreezePolicy,
    /// Day the current non-idle status was recorded on.
    #[serde(default)]
    recorded_on: Option<NaiveDate>,
}

impl Default for StreakState {
    fn default() -> Self {
        Self::new(DEFAULT_FREEZE_LIMIT, FreezePolicy::default())
    }
}

impl StreakState {
    pub fn new(freeze_limit: u32, freeze_policy: FreezePolicy) -> Self {
        Self {
            status: StreakStatus::Idle,
            learned_count: 0,
            freeze_count: 0,
            freeze_limit,
            freeze_policy,
            recorded_on: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn status(&self) -> StreakStatus {
        self.status
    }

    /// Status as seen on `day`. A status recorded on an earlier day has
    /// lapsed even if [`StreakState::roll_over`] has not run yet.
    pub fn status_on(&self, day: NaiveDate) -> StreakStatus {
        match self.recorded_on {
            Some(recorded) if recorded != day => StreakStatus::Idle,
            _ => self.status,
        }
    }

    pub fn learned_today(&self) -> bool {
        self.status == StreakStatus::Learned
    }

    pub fn frozen_today(&self) -> bool {
        self.status == StreakStatus::Frozen
    }

    pub fn actions_locked(&self) -> bool {
        self.status != StreakStatus::Idle
    }

    pub fn learned_count(&self) -> u32 {
        self.learned_count
    }

    pub fn freeze_count(&self) -> u32 {
        self.freeze_count
    }

    pub fn freeze_limit(&self) -> u32 {
        self.freeze_limit
    }

    pub fn freeze_policy(&self) -> FreezePolicy {
        self.freeze_policy
    }

    pub fn freezes_remaining(&self) -> u32 {
        self.freeze_limit.saturating_sub(self.freeze_count)
    }

    pub fn recorded_on(&self) -> Option<NaiveDate> {
        self.recorded_on
    }

    /// e.g. "2 out of 6 freezes used".
    pub fn freeze_usage(&self) -> String {
        format!("{} out of {} freezes used", self.freeze_count, self.freeze_limit)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Returns `true` if the day was logged.
    pub fn log_learned(&mut self, day: NaiveDate) -> bool {
        if self.actions_locked() {
            tracing::debug!(status = ?self.status, "log_learned ignored, actions locked");
            return false;
        }
        self.status = StreakStatus::Learned;
        self.learned_count = self.learned_count.saturating_add(1);
        self.recorded_on = Some(day);
        tracing::debug!(learned_count = self.learned_count, %day, "day logged as learned");
        true
    }

    pub fn freeze_day(&mut self, day: NaiveDate) -> FreezeOutcome {
        if self.actions_locked() {
            tracing::debug!(status = ?self.status, "freeze_day ignored, actions locked");
            return FreezeOutcome::Locked;
        }
        if self.freeze_count >= self.freeze_limit {
            match self.freeze_policy {
                FreezePolicy::Enforce => {
                    tracing::warn!(
                        freeze_limit = self.freeze_limit,
                        "freeze_day ignored, no freezes left"
                    );
                    return FreezeOutcome::LimitReached;
                }
                FreezePolicy::Unchecked => {
                    tracing::warn!(
                        freeze_count = self.freeze_count + 1,
                        freeze_limit = self.freeze_limit,
                        "freeze count exceeds limit"
                    );
                }
            }
        }
        self.status = StreakStatus::Frozen;
        self.freeze_count = self.freeze_count.saturating_add(1);
        self.recorded_on = Some(day);
        tracing::debug!(freeze_count = self.freeze_count, %day, "day frozen");
        FreezeOutcome::Frozen
    }

    pub fn reset(&mut self) {
        self.status = StreakStatus::Idle;
        self.learned_count = 0;
        self.freeze_count = 0;
        self.recorded_on = None;
    }

    /// Clears today's status if it was recorded on an earlier day.
    /// Counters are kept. Returns the day that was closed.
    pub fn roll_over(&mut self, today: NaiveDate) -> Option<NaiveDate> {
        let recorded = self.recorded_on?;
        if recorded == today {
            return None;
        }
        self.status = StreakStatus::Idle;
        self.recorded_on = None;
        Some(recorded)
    }
}
