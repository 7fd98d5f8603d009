//! Week grid builder
//!
//! Turns a sparse status map plus a reference "today" into Monday-aligned
//! week rows, most-future week first. The grid always reaches two weeks past
//! today so upcoming days are visible (and blocked).

use chrono::{Datelike, Duration, Month, NaiveDate};
use serde::{Serialize, Serializer};

use crate::types::{StatusCode, StatusMap};

use super::months::month_abbrev;

/// Days past today that must always be visible
pub const FUTURE_WINDOW_DAYS: i64 = 14;

/// Rows shown when there is no history at all
pub const DEFAULT_WEEK_COUNT: usize = 3;

/// A single day in the calendar grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayCell {
    pub date: NaiveDate,
    pub day_number: u32,
    pub is_future: bool,
    pub is_today: bool,
    /// `None` for future days, otherwise the recorded status or `NO_DATA`
    pub status: Option<StatusCode>,
}

/// One Monday-aligned week of the grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeekRow {
    pub week_start: NaiveDate,
    pub days: [DayCell; 7],
    #[serde(serialize_with = "serialize_month_label")]
    pub month_label: Option<Month>,
    pub preceded_by_separator: bool,
}

fn serialize_month_label<S: Serializer>(
    label: &Option<Month>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match label {
        Some(month) => serializer.serialize_some(month_abbrev(*month)),
        None => serializer.serialize_none(),
    }
}

/// Monday of the week containing `date`
pub fn monday_of(date: NaiveDate) -> NaiveDate {
    let days_since_monday = date.weekday().num_days_from_monday();
    date - Duration::days(days_since_monday as i64)
}

/// Number of rows needed to reach from the oldest recorded week up to `last_monday`
fn week_count(status_map: &StatusMap, last_monday: NaiveDate) -> usize {
    let Some(min_date) = status_map.min_date() else {
        return DEFAULT_WEEK_COUNT;
    };

    let weeks_back = (last_monday - monday_of(min_date)).num_days().div_euclid(7);
    // History entirely beyond the visible window still gets one row
    (weeks_back + 1).max(1) as usize
}

/// Build the week rows (without month annotation), most-future week first
pub fn build_weeks(status_map: &StatusMap, today: NaiveDate) -> Vec<WeekRow> {
    let future_anchor = today + Duration::days(FUTURE_WINDOW_DAYS);
    let last_monday = monday_of(future_anchor);
    let total_weeks = week_count(status_map, last_monday);

    (0..total_weeks)
        .map(|week_idx| {
            let week_start = last_monday - Duration::weeks(week_idx as i64);
            let days = std::array::from_fn(|day_idx| {
                let date = week_start + Duration::days(day_idx as i64);
                let is_future = date > today;
                DayCell {
                    date,
                    day_number: date.day(),
                    is_future,
                    is_today: date == today,
                    status: (!is_future).then(|| status_map.status_or_no_data(date)),
                }
            });

            WeekRow {
                week_start,
                days,
                month_label: None,
                preceded_by_separator: false,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn map_of(entries: &[(NaiveDate, &str)]) -> StatusMap {
        entries
            .iter()
            .map(|(d, s)| (*d, StatusCode::new(*s)))
            .collect()
    }

    // ========== monday_of tests ==========

    #[test]
    fn test_monday_of_midweek() {
        assert_eq!(monday_of(date(2024, 3, 15)), date(2024, 3, 11)); // Friday
        assert_eq!(monday_of(date(2024, 3, 29)), date(2024, 3, 25));
    }

    #[test]
    fn test_monday_of_sunday_goes_back() {
        // Sunday belongs to the week that started six days earlier
        assert_eq!(monday_of(date(2024, 3, 17)), date(2024, 3, 11));
    }

    #[test]
    fn test_monday_of_monday_is_identity() {
        assert_eq!(monday_of(date(2024, 4, 1)), date(2024, 4, 1));
    }

    #[test]
    fn test_monday_of_crosses_year() {
        assert_eq!(monday_of(date(2025, 1, 1)), date(2024, 12, 30));
    }

    // ========== build_weeks tests ==========

    #[test]
    fn test_empty_map_default_window() {
        let today = date(2024, 3, 15); // Friday
        let weeks = build_weeks(&StatusMap::new(), today);

        assert_eq!(weeks.len(), DEFAULT_WEEK_COUNT);
        // today + 14 = 2024-03-29, whose Monday is 2024-03-25
        assert_eq!(weeks[0].week_start, date(2024, 3, 25));
        assert_eq!(weeks[1].week_start, date(2024, 3, 18));
        assert_eq!(weeks[2].week_start, date(2024, 3, 11));
    }

    #[test]
    fn test_empty_map_always_three_rows() {
        let mut day = date(2023, 12, 20);
        for _ in 0..30 {
            assert_eq!(build_weeks(&StatusMap::new(), day).len(), 3);
            day += Duration::days(1);
        }
    }

    #[test]
    fn test_rows_most_recent_first() {
        let weeks = build_weeks(&StatusMap::new(), date(2024, 3, 15));
        for pair in weeks.windows(2) {
            assert_eq!(pair[0].week_start - pair[1].week_start, Duration::days(7));
        }
    }

    #[test]
    fn test_all_rows_start_monday() {
        let map = map_of(&[(date(2023, 6, 7), "done")]);
        let weeks = build_weeks(&map, date(2024, 2, 29));
        for week in &weeks {
            assert_eq!(week.week_start.weekday(), Weekday::Mon);
            for (offset, cell) in week.days.iter().enumerate() {
                assert_eq!(cell.date, week.week_start + Duration::days(offset as i64));
            }
        }
    }

    #[test]
    fn test_future_window_covered() {
        let mut today = date(2024, 1, 1);
        for _ in 0..14 {
            let weeks = build_weeks(&StatusMap::new(), today);
            let top_end = weeks[0].week_start + Duration::days(6);
            let anchor = today + Duration::days(FUTURE_WINDOW_DAYS);
            assert!(top_end >= anchor);
            // No row past the anchor's week
            assert!(weeks[0].week_start <= anchor);
            today += Duration::days(1);
        }
    }

    #[test]
    fn test_history_coverage() {
        let today = date(2024, 1, 20);
        let map = map_of(&[(date(2024, 1, 10), "done")]);

        let weeks = build_weeks(&map, today);
        let oldest = weeks.last().unwrap();

        assert_eq!(oldest.week_start, date(2024, 1, 8));
        assert!(oldest.days.iter().any(|c| c.date == date(2024, 1, 10)));
        // 2024-02-03 -> Monday 2024-01-29; 01-08 .. 01-29 is 4 rows
        assert_eq!(weeks.len(), 4);
    }

    #[test]
    fn test_status_lookup_and_default() {
        let today = date(2024, 1, 20);
        let map = map_of(&[(date(2024, 1, 10), "done")]);
        let weeks = build_weeks(&map, today);

        for cell in weeks.iter().flat_map(|w| w.days.iter()) {
            if cell.is_future {
                continue;
            }
            let status = cell.status.as_ref().unwrap();
            if cell.date == date(2024, 1, 10) {
                assert_eq!(status.as_str(), "done");
            } else {
                assert!(status.is_no_data());
            }
        }
    }

    #[test]
    fn test_future_cells_have_no_status() {
        let today = date(2024, 6, 12); // Wednesday
        let map = map_of(&[(date(2024, 6, 1), "done"), (date(2024, 6, 20), "done")]);
        let weeks = build_weeks(&map, today);

        for cell in weeks.iter().flat_map(|w| w.days.iter()) {
            assert_eq!(cell.is_future, cell.date > today);
            assert_eq!(cell.status.is_none(), cell.is_future);
        }
    }

    #[test]
    fn test_single_today_cell() {
        let today = date(2024, 6, 12);
        let weeks = build_weeks(&map_of(&[(date(2024, 1, 3), "done")]), today);

        let todays: Vec<_> = weeks
            .iter()
            .flat_map(|w| w.days.iter())
            .filter(|c| c.is_today)
            .collect();
        assert_eq!(todays.len(), 1);
        assert_eq!(todays[0].date, today);
        assert!(todays[0].status.is_some());
    }

    #[test]
    fn test_day_numbers() {
        let weeks = build_weeks(&StatusMap::new(), date(2024, 3, 15));
        let numbers: Vec<u32> = weeks[0].days.iter().map(|c| c.day_number).collect();
        assert_eq!(numbers, vec![25, 26, 27, 28, 29, 30, 31]);
    }

    #[test]
    fn test_history_beyond_window_clamps_to_one_row() {
        let today = date(2024, 3, 15);
        let map = map_of(&[(date(2024, 6, 1), "done")]);
        let weeks = build_weeks(&map, today);
        assert_eq!(weeks.len(), 1);
        assert_eq!(weeks[0].week_start, date(2024, 3, 25));
    }

    #[test]
    fn test_unannotated_rows() {
        let weeks = build_weeks(&StatusMap::new(), date(2024, 3, 15));
        assert!(weeks.iter().all(|w| w.month_label.is_none()));
        assert!(weeks.iter().all(|w| !w.preceded_by_separator));
    }
}
