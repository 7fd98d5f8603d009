//! Inline loading indicator: one cycling glyph followed by what is loading

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::Line,
    widgets::Widget,
};

const FRAMES: [char; 8] = ['⣾', '⣽', '⣻', '⢿', '⡿', '⣟', '⣯', '⣷'];

/// What is being fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadingStage {
    Habits,
    Calendar,
}

impl LoadingStage {
    pub fn message(self) -> &'static str {
        match self {
            Self::Habits => "Loading habits...",
            Self::Calendar => "Loading calendar...",
        }
    }
}

/// Single-line spinner, centered in whatever row it is given
pub struct Spinner {
    frame: usize,
    stage: LoadingStage,
    style: Style,
}

impl Spinner {
    pub fn new(frame: usize, stage: LoadingStage) -> Self {
        Self {
            frame,
            stage,
            style: Style::default(),
        }
    }

    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn next_frame(frame: usize) -> usize {
        (frame + 1) % FRAMES.len()
    }

    pub fn text(&self) -> String {
        format!("{} {}", FRAMES[self.frame % FRAMES.len()], self.stage.message())
    }

    /// Columns needed to show the whole indicator
    pub fn width(&self) -> u16 {
        self.text().chars().count() as u16
    }
}

impl Widget for Spinner {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.is_empty() {
            return;
        }
        Line::styled(self.text(), self.style)
            .centered()
            .render(area, buf);
    }
}
