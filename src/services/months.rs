//! Month boundary annotation for week rows

use chrono::{Datelike, Month};

use super::grid::WeekRow;

const MONTHS_SHORT: [&str; 12] = [
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];

/// Fixed three-letter abbreviation for a month
pub fn month_abbrev(month: Month) -> &'static str {
    MONTHS_SHORT[month.number_from_month() as usize - 1]
}

fn month_of(date: chrono::NaiveDate) -> Option<Month> {
    Month::try_from(date.month() as u8).ok()
}

/// Month shown beside a row, if any.
///
/// A row holding the 1st is labeled with that new month. The oldest row is
/// labeled with its Monday's month, since history may start mid-month.
fn label_for(row: &WeekRow, is_oldest: bool) -> Option<Month> {
    if let Some(first) = row.days.iter().find(|cell| cell.day_number == 1) {
        return month_of(first.date);
    }
    if is_oldest {
        return month_of(row.week_start);
    }
    None
}

/// Assign month labels and separators to rows ordered most-future first
pub fn annotate_months(weeks: &mut [WeekRow]) {
    let last_idx = weeks.len().saturating_sub(1);
    let mut previous_label: Option<Month> = None;

    for (index, row) in weeks.iter_mut().enumerate() {
        let label = label_for(row, index == last_idx);
        row.month_label = label;
        // Nothing sits above the first row, so it never gets a separator
        row.preceded_by_separator = index > 0 && label.is_some() && label != previous_label;
        previous_label = label;
    }
}
