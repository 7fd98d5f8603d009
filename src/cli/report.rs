//! Plain-text rendering for the non-interactive commands

use std::fmt::Write;

use crate::services::{month_abbrev, DayCell, RenderModel};
use crate::tui::theme::StatusKind;
use crate::types::Habit;

const LABEL_WIDTH: usize = 4;
const HEADER: &str = "Mo Tu We Th Fr Sa Su";

fn cell_glyph(day: &DayCell) -> String {
    if day.is_today {
        return format!("{:>2}*", day.day_number);
    }
    let Some(status) = &day.status else {
        return format!("{:>2} ", day.day_number);
    };
    let glyph = match StatusKind::of(status) {
        StatusKind::NoData => "· ",
        StatusKind::Done => "██",
        StatusKind::Partial => "▓▓",
        StatusKind::Missed => "░░",
        StatusKind::Other => "▒▒",
    };
    format!("{} ", glyph)
}

/// Grid as text: title, optional error, weekday header, then one line per week
pub fn format_grid(model: &RenderModel) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", model.selection.title());
    if let Some(err) = &model.error {
        let _ = writeln!(out, "! {}", err);
    }
    let _ = writeln!(out, "{:width$}{}", "", HEADER, width = LABEL_WIDTH);

    let rule = "─".repeat(HEADER.len());
    for week in &model.weeks {
        if week.preceded_by_separator {
            let _ = writeln!(out, "{:width$}{}", "", rule, width = LABEL_WIDTH);
        }
        let label = week.month_label.map(month_abbrev).unwrap_or("");
        let cells: String = week.days.iter().map(cell_glyph).collect();
        let _ = writeln!(out, "{:<width$}{}", label, cells.trim_end(), width = LABEL_WIDTH);
    }
    out
}

/// One habit per line: id, then label
pub fn format_habits(habits: &[Habit]) -> String {
    if habits.is_empty() {
        return "No habits\n".to_string();
    }
    let id_width = habits.iter().map(|h| h.id.as_str().len()).max().unwrap_or(0);
    habits
        .iter()
        .map(|h| format!("{:>width$}  {}\n", h.id.as_str(), h.label, width = id_width))
        .collect()
}
