//! Habit calendar grid widget
//!
//! Draws annotated week rows top to bottom in model order (most-future
//! week first), with a month column and divider lines between months.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    widgets::Widget,
};

use crate::services::{month_abbrev, DayCell, WeekRow};
use crate::tui::theme::Theme;

/// Cell dimensions for grid layout
const CELL_WIDTH: u16 = 3; // 2 chars content + 1 gap
const LABEL_WIDTH: u16 = 4; // "MAR " prefix

/// Total width of a week row
pub const GRID_WIDTH: u16 = LABEL_WIDTH + 7 * CELL_WIDTH;

const WEEKDAY_HEADER: [&str; 7] = ["Mo", "Tu", "We", "Th", "Fr", "Sa", "Su"];
const FILLED_CELL: &str = "██";
const SEPARATOR_CHAR: &str = "─";

/// One drawn line of the grid body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridLine<'a> {
    Separator,
    Week(&'a WeekRow),
}

/// Flatten rows into drawn lines, inserting month separators
pub fn grid_lines(weeks: &[WeekRow]) -> Vec<GridLine<'_>> {
    let mut lines = Vec::with_capacity(weeks.len() * 2);
    for week in weeks {
        if week.preceded_by_separator {
            lines.push(GridLine::Separator);
        }
        lines.push(GridLine::Week(week));
    }
    lines
}

/// Largest useful scroll offset for a body of `height` lines
pub fn max_scroll(weeks: &[WeekRow], height: u16) -> usize {
    grid_lines(weeks)
        .len()
        .saturating_sub(height.saturating_sub(1) as usize)
}

/// Calendar grid widget for ratatui
pub struct CalendarGrid<'a> {
    weeks: &'a [WeekRow],
    scroll: usize,
    theme: Theme,
}

impl<'a> CalendarGrid<'a> {
    pub fn new(weeks: &'a [WeekRow], scroll: usize, theme: Theme) -> Self {
        Self {
            weeks,
            scroll,
            theme,
        }
    }

    /// Calculate x_offset for centering the grid
    fn calculate_x_offset(area: Rect) -> u16 {
        area.width.saturating_sub(GRID_WIDTH) / 2
    }

    /// Render the weekday header: "    Mo Tu We ..."
    fn render_header(&self, area: Rect, buf: &mut Buffer, x_offset: u16) {
        let style = Style::default().fg(self.theme.muted());
        let start_x = area.x + x_offset + LABEL_WIDTH;
        for (idx, name) in WEEKDAY_HEADER.iter().enumerate() {
            let x = start_x + idx as u16 * CELL_WIDTH;
            if x + 2 > area.x + area.width {
                break;
            }
            buf.set_string(x, area.y, name, style);
        }
    }

    /// Render a month divider line
    fn render_separator(&self, area: Rect, buf: &mut Buffer, y: u16, x_offset: u16) {
        let start_x = area.x + x_offset + LABEL_WIDTH;
        let width = (7 * CELL_WIDTH - 1).min((area.x + area.width).saturating_sub(start_x));
        buf.set_string(
            start_x,
            y,
            SEPARATOR_CHAR.repeat(width as usize),
            Style::default().fg(self.theme.muted()),
        );
    }

    /// Render a week: "MAR ██ ██ 15 16 ..."
    fn render_week(&self, area: Rect, buf: &mut Buffer, y: u16, week: &WeekRow, x_offset: u16) {
        let max_x = area.x + area.width;

        if let Some(month) = week.month_label {
            buf.set_string(
                area.x + x_offset,
                y,
                month_abbrev(month),
                Style::default()
                    .fg(self.theme.muted())
                    .add_modifier(Modifier::BOLD),
            );
        }

        let start_x = area.x + x_offset + LABEL_WIDTH;
        for (idx, cell) in week.days.iter().enumerate() {
            let x = start_x + idx as u16 * CELL_WIDTH;
            if x + 2 > max_x {
                break;
            }
            let (text, style) = self.cell_content(cell);
            buf.set_string(x, y, text, style);
        }
    }

    fn cell_content(&self, cell: &DayCell) -> (String, Style) {
        match &cell.status {
            // Future days are blocked: day number only
            None => (
                format!("{:>2}", cell.day_number),
                Style::default().fg(self.theme.muted()),
            ),
            Some(status) if cell.is_today => (
                format!("{:>2}", cell.day_number),
                Style::default()
                    .fg(self.theme.today())
                    .bg(self.theme.status_color(status))
                    .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            ),
            Some(status) => (
                FILLED_CELL.to_string(),
                Style::default().fg(self.theme.status_color(status)),
            ),
        }
    }
}

impl Widget for CalendarGrid<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }
        let x_offset = Self::calculate_x_offset(area);

        self.render_header(area, buf, x_offset);

        let lines = grid_lines(self.weeks);
        let body_height = area.height.saturating_sub(1) as usize;
        for (row, line) in lines.iter().skip(self.scroll).take(body_height).enumerate() {
            let y = area.y + 1 + row as u16;
            match line {
                GridLine::Separator => self.render_separator(area, buf, y, x_offset),
                GridLine::Week(week) => self.render_week(area, buf, y, week, x_offset),
            }
        }
    }
}
