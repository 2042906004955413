mod flow;
mod intro;

pub use flow::{Screen, ScreenFlow, Session};
pub use intro::{IntroOutcome, IntroTimer, DEFAULT_INTRO_DELAY};
