mod config;

pub use config::{CalendarConfig, Config, IntroConfig, TrackerConfig};

use std::path::PathBuf;

use crate::error::Result;

/// Returns `~/.config/learning-journey[-dev]/` based on LEARNING_JOURNEY_ENV.
///
/// Set LEARNING_JOURNEY_ENV=dev to use the development directory, or
/// LEARNING_JOURNEY_HOME to replace `~/.config` entirely.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let base_dir = match std::env::var_os("LEARNING_JOURNEY_HOME") {
        Some(home) => PathBuf::from(home),
        None => dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config"),
    };

    let env = std::env::var("LEARNING_JOURNEY_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("learning-journey-dev")
    } else {
        base_dir.join("learning-journey")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
