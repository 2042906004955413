//! Learning goal: free text plus a single-select duration bucket.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalDuration {
    Week,
    Month,
    Year,
}

impl GoalDuration {
    pub const ALL: [GoalDuration; 3] = [GoalDuration::Week, GoalDuration::Month, GoalDuration::Year];

    pub fn label(&self) -> &'static str {
        match self {
            GoalDuration::Week => "Week",
            GoalDuration::Month => "Month",
            GoalDuration::Year => "Year",
        }
    }
}

impl fmt::Display for GoalDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for GoalDuration {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "week" => Ok(GoalDuration::Week),
            "month" => Ok(GoalDuration::Month),
            "year" => Ok(GoalDuration::Year),
            other => Err(ValidationError::InvalidValue {
                field: "duration".into(),
                message: format!("expected week, month or year, got '{other}'"),
            }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    text: String,
    duration: Option<GoalDuration>,
}

impl Goal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn duration(&self) -> Option<GoalDuration> {
        self.duration
    }

    /// Replaces the text verbatim.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Selecting a bucket replaces any previous selection.
    pub fn set_duration(&mut self, duration: GoalDuration) {
        self.duration = Some(duration);
    }

    pub fn is_start_enabled(&self) -> bool {
        !self.text.is_empty() && self.duration.is_some()
    }

    /// Same check as [`Goal::is_start_enabled`], but says what is missing.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.text.is_empty() {
            return Err(ValidationError::GoalIncomplete("goal text is empty".into()));
        }
        if self.duration.is_none() {
            return Err(ValidationError::GoalIncomplete("no duration selected".into()));
        }
        Ok(())
    }
}
