//! Calendar engine and its service boundary

pub mod api;
pub mod grid;
pub mod launch;
pub mod months;
pub mod selection;
pub mod state;

pub use api::{CalendarSource, HttpCalendarSource};
pub use grid::{build_weeks, monday_of, DayCell, WeekRow};
pub use launch::{LaunchConfig, LaunchOptions};
pub use months::{annotate_months, month_abbrev};
pub use selection::SelectionState;
pub use state::{AppState, RenderModel, StatusRequest};
