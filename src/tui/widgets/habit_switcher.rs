//! Habit switcher: title line and dropdown menu

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    widgets::{Block, Borders, Clear, Widget},
};

use crate::services::SelectionState;
use crate::tui::theme::Theme;

const TITLE_ICON: &str = "📝";
const MENU_MAX_WIDTH: u16 = 40;

/// Title line showing the selected habit
pub struct HabitTitle<'a> {
    selection: &'a SelectionState,
    theme: Theme,
}

impl<'a> HabitTitle<'a> {
    pub fn new(selection: &'a SelectionState, theme: Theme) -> Self {
        Self { selection, theme }
    }

    /// Text drawn for the current selection
    pub fn text(&self) -> String {
        if self.selection.has_habits() {
            let arrow = if self.selection.menu_open { "▴" } else { "▾" };
            format!("{} {} {}", TITLE_ICON, self.selection.title(), arrow)
        } else {
            self.selection.title().to_string()
        }
    }
}

impl Widget for HabitTitle<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let style = if self.selection.has_habits() {
            Style::default()
                .fg(self.theme.accent())
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.theme.muted())
        };
        let text = self.text();
        let width = text.chars().count() as u16;
        let x = area.x + area.width.saturating_sub(width) / 2;
        buf.set_stringn(x, area.y, &text, area.width as usize, style);
    }
}

/// Dropdown listing all habits, with a keyboard cursor
pub struct HabitMenu<'a> {
    selection: &'a SelectionState,
    cursor: usize,
    theme: Theme,
}

impl<'a> HabitMenu<'a> {
    pub fn new(selection: &'a SelectionState, cursor: usize, theme: Theme) -> Self {
        Self {
            selection,
            cursor,
            theme,
        }
    }

    /// Menu area hanging below the title line at `anchor_y`
    pub fn area_below(area: Rect, anchor_y: u16, habit_count: usize) -> Rect {
        let width = MENU_MAX_WIDTH.min(area.width);
        let rows_below = area.bottom().saturating_sub(anchor_y + 1);
        let height = (habit_count as u16 + 2).min(rows_below);
        Rect {
            x: area.x + (area.width - width) / 2,
            y: anchor_y + 1,
            width,
            height,
        }
    }
}

impl Widget for HabitMenu<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.accent()));
        let inner = block.inner(area);
        block.render(area, buf);

        // Keep the cursor visible when the list is taller than the menu
        let visible = inner.height as usize;
        let first = self.cursor.saturating_sub(visible.saturating_sub(1));

        for (row, (idx, habit)) in self
            .selection
            .habits
            .iter()
            .enumerate()
            .skip(first)
            .take(visible)
            .enumerate()
        {
            let is_selected = self.selection.selected.as_ref() == Some(&habit.id);
            let marker = if is_selected { "• " } else { "  " };
            let mut style = Style::default().fg(self.theme.text());
            if is_selected {
                style = style.add_modifier(Modifier::BOLD);
            }
            if idx == self.cursor {
                style = style.add_modifier(Modifier::REVERSED);
            }
            buf.set_stringn(
                inner.x,
                inner.y + row as u16,
                format!("{}{}", marker, habit.label),
                inner.width as usize,
                style,
            );
        }
    }
}
