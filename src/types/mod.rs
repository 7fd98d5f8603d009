//! Type definitions for habitcal

mod error;
mod habit;

pub use error::*;
pub use habit::*;
