//! habitcal - habit calendar for the terminal

pub mod cli;
pub mod logging;
pub mod services;
pub mod tui;
pub mod types;
