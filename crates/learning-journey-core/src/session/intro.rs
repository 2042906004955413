//! One-shot timer for the introductory screen.
//!
//! The timer runs as a single tokio task. It fires once after the delay,
//! or never if cancelled first. Dropping the timer cancels it.

use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;

pub const DEFAULT_INTRO_DELAY: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntroOutcome {
    Elapsed,
    Cancelled,
}

#[derive(Debug)]
pub struct IntroTimer {
    handle: Option<JoinHandle<()>>,
    fired: Option<oneshot::Receiver<()>>,
    outcome: Option<IntroOutcome>,
}

impl IntroTimer {
    /// Schedule the timer. Must be called from within a tokio runtime.
    pub fn start(delay: Duration) -> Self {
        let (tx, rx) = oneshot::channel();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(());
        });
        tracing::debug!(delay_ms = delay.as_millis() as u64, "intro timer scheduled");
        Self {
            handle: Some(handle),
            fired: Some(rx),
            outcome: None,
        }
    }

    /// Wait for the timer to fire or be cancelled. Safe to call repeatedly.
    pub async fn wait(&mut self) -> IntroOutcome {
        if let Some(outcome) = self.outcome {
            return outcome;
        }
        let outcome = match self.fired.take() {
            Some(rx) => match rx.await {
                Ok(()) => IntroOutcome::Elapsed,
                Err(_) => IntroOutcome::Cancelled,
            },
            None => IntroOutcome::Cancelled,
        };
        self.handle = None;
        self.outcome = Some(outcome);
        outcome
    }

    /// Cancel before the timer fires. A no-op once it has fired.
    pub fn cancel(&mut self) {
        if self.outcome.is_some() {
            return;
        }
        if let Some(handle) = self.handle.take() {
            handle.abort();
            tracing::debug!("intro timer cancelled");
        }
        self.fired = None;
        self.outcome = Some(IntroOutcome::Cancelled);
    }

    pub fn outcome(&self) -> Option<IntroOutcome> {
        self.outcome
    }
}

impl Drop for IntroTimer {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
