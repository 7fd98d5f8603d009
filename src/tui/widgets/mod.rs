//! TUI widgets

pub mod calendar;
pub mod habit_switcher;
pub mod help;
pub mod spinner;
