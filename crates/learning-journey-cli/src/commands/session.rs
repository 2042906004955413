//! Interactive session over stdin.
//!
//! The session is the presenter: it owns the screen flow, feeds user input
//! into the tracker and prints every event the tracker publishes as one JSON
//! line on stdout. Diagnostics go to stderr.

use std::rc::Rc;

use clap::Args;
use learning_journey_core::{
    Clock, Config, Event, FixedClock, GoalDuration, IntroOutcome, IntroTimer, Screen, ScreenFlow,
    Session, StreakStatus, SystemClock, Tracker, TrackerView,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;

use super::parse_date;

const HELP: &str = "\
commands:
  goal <text>          set the learning goal
  duration <d>         week | month | year
  start                confirm the goal and start tracking
  learned              log today as learned
  freeze               freeze today
  edit                 edit the goal (resets the streak)
  update               confirm the edited goal
  month <n>            move the calendar by n months
  week <n>             move the calendar by n weeks
  status               print the current view as JSON
  show                 print the tracking screen
  next-day             advance a pinned --today date by one day
  help                 this text
  quit                 end the session";

#[derive(Args)]
pub struct SessionArgs {
    /// Skip the intro screen
    #[arg(long)]
    no_intro: bool,
    /// Pin today's date (YYYY-MM-DD) instead of reading the system clock
    #[arg(long, value_parser = parse_date)]
    today: Option<chrono::NaiveDate>,
}

enum Control {
    Continue,
    Quit,
}

enum IntroEnd {
    Timer(IntroOutcome),
    Input(Option<String>),
}

struct Presenter {
    flow: ScreenFlow,
    events: broadcast::Receiver<Event>,
    pinned: Option<Rc<FixedClock>>,
}

pub fn run(args: SessionArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
    runtime.block_on(run_session(args, config))
}

async fn run_session(args: SessionArgs, config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let pinned = args.today.map(|d| Rc::new(FixedClock::new(d)));
    let clock: Box<dyn Clock> = match &pinned {
        Some(clock) => Box::new(Rc::clone(clock)),
        None => Box::new(SystemClock),
    };
    let session = Session::new(Tracker::new(config.tracker_settings(), clock));
    let events = session.tracker().subscribe();

    let show_intro = config.intro.enabled && !args.no_intro;
    let flow = if show_intro {
        ScreenFlow::new(session)
    } else {
        ScreenFlow::without_intro(session)
    };
    let mut presenter = Presenter {
        flow,
        events,
        pinned,
    };

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut pending = None;

    if show_intro {
        eprintln!("Learning Journey");
        let mut timer = IntroTimer::start(config.intro_delay());
        let ended = tokio::select! {
            outcome = timer.wait() => IntroEnd::Timer(outcome),
            line = lines.next_line() => IntroEnd::Input(line?),
        };
        let skipped = match ended {
            IntroEnd::Timer(outcome) => outcome == IntroOutcome::Cancelled,
            IntroEnd::Input(line) => {
                // Any input, including end of input, skips the intro.
                timer.cancel();
                pending = line;
                true
            }
        };
        if let Some(event) = presenter.flow.finish_intro(skipped) {
            print_event(&event)?;
        }
    }

    if let Some(line) = pending.take() {
        if let Control::Quit = presenter.handle_line(&line)? {
            return Ok(());
        }
    }

    while let Some(line) = lines.next_line().await? {
        if let Control::Quit = presenter.handle_line(&line)? {
            break;
        }
    }
    Ok(())
}

impl Presenter {
    fn handle_line(&mut self, line: &str) -> Result<Control, Box<dyn std::error::Error>> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(Control::Continue);
        }
        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        match self.execute(command, rest) {
            Ok(Control::Quit) => return Ok(Control::Quit),
            Ok(Control::Continue) => {}
            Err(message) => eprintln!("error: {message}"),
        }
        self.drain_events()?;
        Ok(Control::Continue)
    }

    fn execute(&mut self, command: &str, arg: &str) -> Result<Control, String> {
        let screen = self.flow.screen();
        match command {
            "goal" => {
                self.require(&[Screen::Setup, Screen::EditGoal])?;
                self.flow.session().update(|t| t.set_text(arg));
            }
            "duration" => {
                self.require(&[Screen::Setup, Screen::EditGoal])?;
                let duration: GoalDuration = arg.parse().map_err(|e| format!("{e}"))?;
                if screen == Screen::EditGoal {
                    self.flow.select_edit_duration(duration);
                    eprintln!("duration {duration} selected");
                } else {
                    self.flow.session().update(|t| t.set_duration(duration));
                }
            }
            "start" => self.flow.start().map_err(|e| e.to_string())?,
            "learned" => {
                self.require(&[Screen::Tracking])?;
                if self.flow.session().update(|t| t.log_learned()).is_none() {
                    eprintln!("already logged today");
                }
            }
            "freeze" => {
                self.require(&[Screen::Tracking])?;
                if self.flow.session().update(|t| t.freeze_day()).is_none() {
                    eprintln!("already logged today");
                }
            }
            "edit" => {
                self.require(&[Screen::Tracking])?;
                self.flow.begin_edit();
            }
            "update" => {
                self.require(&[Screen::EditGoal])?;
                self.flow.confirm_edit();
            }
            "month" | "week" => {
                self.require(&[Screen::Tracking])?;
                let delta: i32 = if arg.is_empty() {
                    1
                } else {
                    arg.parse().map_err(|_| format!("invalid step '{arg}'"))?
                };
                self.flow.session().update(|t| {
                    if command == "month" {
                        t.step_month(delta)
                    } else {
                        t.step_week(delta)
                    }
                });
            }
            "status" => {
                self.flow.session().update(|t| t.refresh());
                let view = self.flow.session().tracker().view();
                let json = serde_json::to_string(&view).map_err(|e| e.to_string())?;
                println!("{json}");
            }
            "show" => {
                self.flow.session().update(|t| t.refresh());
                let view = self.flow.session().tracker().view();
                println!("{}", render(&view, screen));
            }
            "next-day" => {
                let clock = self
                    .pinned
                    .as_ref()
                    .ok_or("next-day needs a pinned --today date")?;
                clock.advance_days(1);
                self.flow.session().update(|t| t.refresh());
            }
            "help" => println!("{HELP}"),
            "quit" | "exit" => return Ok(Control::Quit),
            other => return Err(format!("unknown command '{other}', try 'help'")),
        }
        Ok(Control::Continue)
    }

    fn require(&self, screens: &[Screen]) -> Result<(), String> {
        let screen = self.flow.screen();
        if screens.contains(&screen) {
            Ok(())
        } else {
            Err(format!("not available on the {screen:?} screen"))
        }
    }

    /// Print everything the tracker published since the last command.
    fn drain_events(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        loop {
            match self.events.try_recv() {
                Ok(event) => print_event(&event)?,
                Err(broadcast::error::TryRecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "presenter fell behind, events dropped");
                }
                Err(_) => return Ok(()),
            }
        }
    }
}

fn print_event(event: &Event) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string(event)?);
    Ok(())
}

fn render(view: &TrackerView, screen: Screen) -> String {
    let mut out = String::new();
    match screen {
        Screen::Intro => out.push_str("Learning Journey\n"),
        Screen::Setup | Screen::EditGoal => {
            out.push_str(&format!("I want to learn: {}\n", view.goal_text));
            let duration = view.duration.map(|d| d.label()).unwrap_or("-");
            out.push_str(&format!("I want to learn it in a: {duration}\n"));
            if screen == Screen::Setup {
                let start = if view.start_enabled { "enabled" } else { "disabled" };
                out.push_str(&format!("Start: {start}\n"));
            }
        }
        Screen::Tracking => {
            out.push_str(&format!("{}\n", view.day_label));
            out.push_str(&format!("Learning {}\n", view.goal_text));
            out.push_str(&format!("{}\n", view.month_year_label));
            let days: Vec<String> = view
                .week
                .iter()
                .map(|cell| {
                    let marker = match (cell.status, cell.is_today) {
                        (Some(StreakStatus::Learned), _) => "*",
                        (Some(StreakStatus::Frozen), _) => "~",
                        (_, true) => "!",
                        _ => " ",
                    };
                    format!("{} {:>2}{}", cell.weekday, cell.day_of_month, marker)
                })
                .collect();
            out.push_str(&days.join(" | "));
            out.push('\n');
            out.push_str(&format!(
                "{} day streak, {} days freezed\n",
                view.learned_count, view.freeze_count
            ));
            out.push_str(&format!("[{}]\n", view.caption));
            out.push_str(&view.freeze_usage);
        }
    }
    out
}
