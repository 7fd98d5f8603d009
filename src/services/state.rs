//! Application state and its update functions
//!
//! Everything the calendar shows lives in one `AppState`, written only from
//! the event thread. Fetches run elsewhere and come back through
//! `on_habits_loaded` / `on_status_loaded`.

use chrono::NaiveDate;
use serde::Serialize;

use crate::types::{FetchError, Habit, HabitId, StatusMap, UserId};

use super::grid::{build_weeks, WeekRow};
use super::months::annotate_months;
use super::selection::SelectionState;

/// A status-map fetch to run for the current selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusRequest {
    pub user: UserId,
    pub habit: Option<HabitId>,
}

/// Snapshot handed to a renderer
#[derive(Debug, Clone, Serialize)]
pub struct RenderModel {
    /// Most-future week first
    pub weeks: Vec<WeekRow>,
    pub selection: SelectionState,
    #[serde(serialize_with = "serialize_error")]
    pub error: Option<FetchError>,
}

fn serialize_error<S: serde::Serializer>(
    error: &Option<FetchError>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match error {
        Some(err) => serializer.serialize_some(&err.to_string()),
        None => serializer.serialize_none(),
    }
}

/// Calendar application state
#[derive(Debug, Clone, Default)]
pub struct AppState {
    user: Option<UserId>,
    selection: SelectionState,
    status_map: StatusMap,
    error: Option<FetchError>,
}

impl AppState {
    pub fn new(user: Option<UserId>) -> Self {
        Self {
            user,
            ..Self::default()
        }
    }

    pub fn user(&self) -> Option<UserId> {
        self.user
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut SelectionState {
        &mut self.selection
    }

    pub fn status_map(&self) -> &StatusMap {
        &self.status_map
    }

    pub fn error(&self) -> Option<&FetchError> {
        self.error.as_ref()
    }

    /// Habit list arrived (possibly empty after a failed fetch).
    ///
    /// Always schedules a status fetch for the resulting selection.
    pub fn on_habits_loaded(&mut self, habits: Vec<Habit>) -> Option<StatusRequest> {
        let selected = self.selection.load_habits(habits);
        tracing::debug!(
            habits = self.selection.habits.len(),
            selected = ?selected,
            "habit list loaded"
        );
        self.request_status(selected)
    }

    /// User picked a habit from the switcher.
    ///
    /// Returns `None` when nothing changed (same habit, unknown id).
    pub fn select_habit(&mut self, id: &HabitId) -> Option<StatusRequest> {
        if !self.selection.select(id) {
            return None;
        }
        tracing::debug!(habit = %id, "habit selected");
        self.request_status(Some(id.clone()))
    }

    fn request_status(&mut self, habit: Option<HabitId>) -> Option<StatusRequest> {
        match self.user {
            Some(user) => {
                self.error = None;
                Some(StatusRequest { user, habit })
            }
            None => {
                self.apply_failure(FetchError::UserUnresolved);
                None
            }
        }
    }

    /// A status fetch settled. Returns false when the response was stale.
    ///
    /// Responses are committed only while their habit is still selected;
    /// among overlapping fetches for the same habit the last to arrive wins.
    pub fn on_status_loaded(
        &mut self,
        request: &StatusRequest,
        result: std::result::Result<StatusMap, FetchError>,
    ) -> bool {
        if request.habit != self.selection.selected {
            tracing::debug!(
                response = ?request.habit,
                current = ?self.selection.selected,
                "discarding stale calendar response"
            );
            return false;
        }

        match result {
            Ok(map) => {
                tracing::debug!(days = map.len(), "calendar loaded");
                self.status_map = map;
                self.error = None;
            }
            Err(err) => {
                tracing::warn!(error = %err, "calendar fetch failed");
                self.apply_failure(err);
            }
        }
        true
    }

    fn apply_failure(&mut self, err: FetchError) {
        self.status_map = StatusMap::new();
        self.error = Some(err);
    }

    /// Recompute the rows for `today` from the current status map
    pub fn weeks(&self, today: NaiveDate) -> Vec<WeekRow> {
        let mut weeks = build_weeks(&self.status_map, today);
        annotate_months(&mut weeks);
        weeks
    }

    /// Pure snapshot of everything a renderer needs
    pub fn render_model(&self, today: NaiveDate) -> RenderModel {
        RenderModel {
            weeks: self.weeks(today),
            selection: self.selection.clone(),
            error: self.error.clone(),
        }
    }
}
