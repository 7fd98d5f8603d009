mod report;

use std::sync::Arc;

use anyhow::{bail, Context};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};

use crate::logging::{self, LogTarget};
use crate::services::{
    AppState, CalendarSource, HttpCalendarSource, LaunchConfig, LaunchOptions, RenderModel,
};
use crate::types::{FetchError, HabitId, UserId};

pub use report::{format_grid, format_habits};

/// Habit calendar for the terminal
#[derive(Parser)]
#[command(name = "habitcal")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    launch: LaunchArgs,

    /// Debug-level logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args, Debug, Default)]
struct LaunchArgs {
    /// Base address of the habit bot API
    #[arg(long, global = true, value_name = "URL")]
    api_url: Option<String>,

    /// User id as provided by the chat platform
    #[arg(long, global = true, value_name = "ID")]
    user_id: Option<i64>,

    /// Full launch URL carrying `user_id` / `api_url` query parameters
    #[arg(long, global = true, value_name = "URL")]
    launch_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch interactive calendar (default)
    Tui,

    /// Print the calendar grid for one habit
    Grid {
        /// Habit id (defaults to the first habit)
        #[arg(long)]
        habit: Option<String>,

        /// Reference date, YYYY-MM-DD (defaults to the local date)
        #[arg(long)]
        today: Option<NaiveDate>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the user's habits
    Habits {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        let target = match self.command {
            None | Some(Commands::Tui) => LogTarget::File(logging::default_log_path()?),
            Some(_) => LogTarget::Stderr,
        };
        logging::init(target, self.verbose)?;

        let config = LaunchConfig::resolve(&LaunchOptions {
            api_url: self.launch.api_url,
            user_id: self.launch.user_id,
            launch_url: self.launch.launch_url,
        })?;
        tracing::debug!(api_base = %config.api_base, user = ?config.user, "launch config resolved");

        let source =
            http_source(&config.api_base).context("failed to set up the HTTP client")?;

        match self.command {
            None | Some(Commands::Tui) => crate::tui::run(source, config.user),
            Some(Commands::Grid { habit, today, json }) => {
                let today = today.unwrap_or_else(|| Local::now().date_naive());
                run_grid(source.as_ref(), config.user, habit, today, json)
            }
            Some(Commands::Habits { json }) => run_habits(source.as_ref(), config.user, json),
        }
    }
}

/// Load habits, then the calendar for the chosen habit
fn load_grid(
    source: &dyn CalendarSource,
    user: Option<UserId>,
    habit: Option<String>,
    today: NaiveDate,
) -> anyhow::Result<RenderModel> {
    let mut state = AppState::new(user);
    let habits = user.map(|u| source.fetch_habits(u)).unwrap_or_default();
    let mut request = state.on_habits_loaded(habits);

    // Without a user there is no list to check against; the grid carries that error
    if let Some(id) = habit.filter(|_| user.is_some()).map(HabitId::new) {
        if !state.selection().habits.iter().any(|h| h.id == id) {
            bail!("unknown habit id: {}", id);
        }
        if let Some(switched) = state.select_habit(&id) {
            request = Some(switched);
        }
    }

    if let Some(request) = request {
        let result = source.fetch_status_map(request.user, request.habit.as_ref());
        state.on_status_loaded(&request, result);
    }

    Ok(state.render_model(today))
}

fn run_grid(
    source: &dyn CalendarSource,
    user: Option<UserId>,
    habit: Option<String>,
    today: NaiveDate,
    json: bool,
) -> anyhow::Result<()> {
    let model = load_grid(source, user, habit, today)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&model)?);
    } else {
        print!("{}", format_grid(&model));
    }
    Ok(())
}

/// HTTP source for the resolved API base
fn http_source(api_base: &str) -> crate::types::Result<Arc<HttpCalendarSource>> {
    Ok(Arc::new(HttpCalendarSource::new(api_base)?))
}

fn run_habits(
    source: &dyn CalendarSource,
    user: Option<UserId>,
    json: bool,
) -> anyhow::Result<()> {
    let Some(user) = user else {
        bail!("{}", FetchError::UserUnresolved);
    };
    let habits = source.fetch_habits(user);
    if json {
        println!("{}", serde_json::to_string_pretty(&habits)?);
    } else {
        print!("{}", format_habits(&habits));
    }
    Ok(())
}
