//! Terminal theme detection and color definitions

use ratatui::style::Color;

use crate::types::StatusCode;

/// Visual family of a day status
///
/// Status codes are open strings; only a few common ones get their own color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    NoData,
    Done,
    Partial,
    Missed,
    /// Any code the bot sends that we have no color for
    Other,
}

impl StatusKind {
    pub fn of(status: &StatusCode) -> Self {
        match status.as_str() {
            s if s == crate::types::NO_DATA => Self::NoData,
            "done" | "completed" | "success" => Self::Done,
            "partial" | "in-progress" => Self::Partial,
            "missed" | "failed" | "skipped" => Self::Missed,
            _ => Self::Other,
        }
    }
}

/// Terminal color scheme (dark or light background)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    /// Auto-detect terminal theme from background luminance.
    /// Must be called **before** entering raw mode (ratatui::init).
    /// Falls back to Dark if detection fails.
    pub fn detect() -> Self {
        match terminal_light::luma() {
            Ok(luma) if luma > 0.6 => Self::Light,
            _ => Self::Dark,
        }
    }

    /// Primary text color (headers, body text)
    pub fn text(self) -> Color {
        match self {
            Self::Dark => Color::White,
            Self::Light => Color::Black,
        }
    }

    /// Active/accent color (habit title, keybinding keys, menu cursor)
    pub fn accent(self) -> Color {
        match self {
            Self::Dark => Color::Cyan,
            Self::Light => Color::Indexed(25), // dark blue (ANSI 256)
        }
    }

    /// Secondary/muted text (separators, month labels, blocked days)
    pub fn muted(self) -> Color {
        match self {
            Self::Dark => Color::DarkGray,
            Self::Light => Color::Gray,
        }
    }

    /// Today marker color
    pub fn today(self) -> Color {
        match self {
            Self::Dark => Color::Yellow,
            Self::Light => Color::Indexed(130), // dark orange/yellow (ANSI 256)
        }
    }

    /// Error banner color
    pub fn error(self) -> Color {
        match self {
            Self::Dark => Color::Red,
            Self::Light => Color::Indexed(124), // dark red (ANSI 256)
        }
    }

    /// Cell color for a day status
    pub fn status_color(self, status: &StatusCode) -> Color {
        match self {
            Self::Dark => match StatusKind::of(status) {
                StatusKind::NoData => Color::Indexed(236),
                StatusKind::Done => Color::Indexed(34),
                StatusKind::Partial => Color::Indexed(178),
                StatusKind::Missed => Color::Indexed(124),
                StatusKind::Other => Color::Indexed(61),
            },
            Self::Light => match StatusKind::of(status) {
                StatusKind::NoData => Color::Indexed(254),
                StatusKind::Done => Color::Indexed(28),
                StatusKind::Partial => Color::Indexed(172),
                StatusKind::Missed => Color::Indexed(160),
                StatusKind::Other => Color::Indexed(67),
            },
        }
    }
}
