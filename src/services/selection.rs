//! Habit selection state
//!
//! Single source of truth for which habit's calendar is requested.

use serde::Serialize;

use crate::types::{Habit, HabitId};

/// Title shown when the user has no habits
pub const NO_HABITS_TITLE: &str = "No habits";

/// Available habits plus the active one
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SelectionState {
    pub habits: Vec<Habit>,
    pub selected: Option<HabitId>,
    /// Whether the habit dropdown is open
    #[serde(skip)]
    pub menu_open: bool,
}

impl SelectionState {
    /// Replace the habit list after a (re)load.
    ///
    /// Keeps the current selection if it survived the refresh, otherwise
    /// falls back to the first habit. Returns the resulting selection.
    pub fn load_habits(&mut self, habits: Vec<Habit>) -> Option<HabitId> {
        let kept = self
            .selected
            .as_ref()
            .filter(|id| habits.iter().any(|h| &h.id == *id))
            .cloned();
        self.selected = kept.or_else(|| habits.first().map(|h| h.id.clone()));
        self.habits = habits;
        self.selected.clone()
    }

    /// Switch to `id`. Returns true when the selection actually changed.
    ///
    /// Re-selecting the active habit or an unknown id changes nothing.
    pub fn select(&mut self, id: &HabitId) -> bool {
        self.menu_open = false;
        if self.selected.as_ref() == Some(id) {
            return false;
        }
        if !self.habits.iter().any(|h| &h.id == id) {
            return false;
        }
        self.selected = Some(id.clone());
        true
    }

    pub fn selected_habit(&self) -> Option<&Habit> {
        let id = self.selected.as_ref()?;
        self.habits.iter().find(|h| &h.id == id)
    }

    /// Position of the selected habit in the list
    pub fn selected_index(&self) -> Option<usize> {
        let id = self.selected.as_ref()?;
        self.habits.iter().position(|h| &h.id == id)
    }

    pub fn has_habits(&self) -> bool {
        !self.habits.is_empty()
    }

    pub fn toggle_menu(&mut self) {
        self.menu_open = self.has_habits() && !self.menu_open;
    }

    pub fn close_menu(&mut self) {
        self.menu_open = false;
    }

    /// Switcher title: the selected habit's label, or the empty state
    pub fn title(&self) -> &str {
        self.selected_habit()
            .map(|h| h.label.as_str())
            .unwrap_or(NO_HABITS_TITLE)
    }
}
