//! Application state and event loop

use std::cell::Cell;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use chrono::{Local, NaiveDate};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::Line,
    widgets::Widget,
    DefaultTerminal, Frame,
};

use crate::services::{AppState, CalendarSource, StatusRequest};
use crate::types::{FetchError, Habit, StatusMap, UserId};

use super::theme::Theme;
use super::widgets::{
    calendar::{self, CalendarGrid},
    habit_switcher::{HabitMenu, HabitTitle},
    help::HelpPopup,
    spinner::{LoadingStage, Spinner},
};

/// Rows needed for title, error line, one grid row and footer
const MIN_HEIGHT: u16 = 4;

/// Smallest dropdown that still shows one habit between its borders
const MIN_MENU_HEIGHT: u16 = 3;

const FOOTER_KEYS: &str = "? help  h habits  r reload  q quit";

/// Background work requested by the UI
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    FetchHabits,
    FetchStatus(StatusRequest),
}

/// Result of a background fetch, delivered to the event thread
#[derive(Debug)]
pub enum FetchEvent {
    Habits(Vec<Habit>),
    Status {
        request: StatusRequest,
        result: std::result::Result<StatusMap, FetchError>,
    },
}

/// Startup phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    /// Waiting for the habit list
    Habits,
    Ready,
}

/// Main application
pub struct App {
    state: AppState,
    phase: LoadPhase,
    theme: Theme,
    today: NaiveDate,
    scroll: usize,
    /// Grid area height from the last draw, 0 before the first one
    grid_height: Cell<u16>,
    menu_cursor: usize,
    spinner_frame: usize,
    show_help: bool,
    loading_calendar: bool,
    should_quit: bool,
}

impl App {
    /// Create a new app waiting for its habit list
    pub fn new(user: Option<UserId>, theme: Theme, today: NaiveDate) -> Self {
        Self {
            state: AppState::new(user),
            phase: LoadPhase::Habits,
            theme,
            today,
            scroll: 0,
            grid_height: Cell::new(0),
            menu_cursor: 0,
            spinner_frame: 0,
            show_help: false,
            loading_calendar: false,
            should_quit: false,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Track a command about to be dispatched
    fn issue(&mut self, command: Option<Command>) -> Option<Command> {
        if let Some(Command::FetchStatus(_)) = &command {
            self.loading_calendar = true;
        }
        command
    }

    /// Apply a finished fetch. May request a follow-up fetch.
    pub fn apply_fetch_event(&mut self, event: FetchEvent) -> Option<Command> {
        match event {
            FetchEvent::Habits(habits) => {
                self.phase = LoadPhase::Ready;
                let request = self.state.on_habits_loaded(habits);
                self.menu_cursor = self.state.selection().selected_index().unwrap_or(0);
                self.issue(request.map(Command::FetchStatus))
            }
            FetchEvent::Status { request, result } => {
                if self.state.on_status_loaded(&request, result) {
                    self.loading_calendar = false;
                    self.scroll = self.scroll.min(self.max_scroll());
                }
                None
            }
        }
    }

    /// Handle keyboard events
    pub fn handle_event(&mut self, event: Event) -> Option<Command> {
        let Event::Key(key) = event else {
            return None;
        };
        if key.kind != KeyEventKind::Press {
            return None;
        }

        if self.state.selection().menu_open {
            return self.handle_menu_key(key.code);
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Char('?') => {
                self.show_help = !self.show_help;
            }
            KeyCode::Enter | KeyCode::Char('h') if self.phase == LoadPhase::Ready => {
                self.menu_cursor = self.state.selection().selected_index().unwrap_or(0);
                self.state.selection_mut().toggle_menu();
            }
            KeyCode::Char('r') if self.phase == LoadPhase::Ready => {
                return Some(Command::FetchHabits);
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.scroll = self.scroll.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.scroll = (self.scroll + 1).min(self.max_scroll());
            }
            _ => {}
        }
        None
    }

    /// Keys while the habit dropdown is open
    fn handle_menu_key(&mut self, code: KeyCode) -> Option<Command> {
        let count = self.state.selection().habits.len();
        match code {
            KeyCode::Esc | KeyCode::Char('h') => {
                self.state.selection_mut().close_menu();
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.menu_cursor = self.menu_cursor.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.menu_cursor = (self.menu_cursor + 1).min(count.saturating_sub(1));
            }
            KeyCode::Enter => {
                let id = self.state.selection().habits.get(self.menu_cursor)?.id.clone();
                let request = self.state.select_habit(&id);
                // Re-picking the current habit still closes the menu
                self.state.selection_mut().close_menu();
                return self.issue(request.map(Command::FetchStatus));
            }
            _ => {}
        }
        None
    }

    /// Last scroll offset that still fills the grid body. Before the first
    /// draw one body line is assumed.
    fn max_scroll(&self) -> usize {
        let height = self.grid_height.get().max(2);
        calendar::max_scroll(&self.state.weeks(self.today), height)
    }

    /// Advance the spinner, roll the date over at midnight and re-clamp scroll
    pub fn tick(&mut self, today: NaiveDate) {
        if self.phase == LoadPhase::Habits || self.loading_calendar {
            self.spinner_frame = Spinner::next_frame(self.spinner_frame);
        }
        self.today = today;
        // The terminal may have grown since the last scroll
        self.scroll = self.scroll.min(self.max_scroll());
    }

    /// Check if app should quit
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Draw the application
    pub fn draw(&self, frame: &mut Frame) {
        frame.render_widget(self, frame.area());
    }

    fn render_footer(&self, area: Rect, buf: &mut Buffer) {
        let style = Style::default().fg(self.theme.muted());
        let keys = Line::styled(FOOTER_KEYS, style).centered();
        if !self.loading_calendar {
            keys.render(area, buf);
            return;
        }
        let spinner = Spinner::new(self.spinner_frame, LoadingStage::Calendar).style(style);
        let [keys_area, spinner_area] =
            Layout::horizontal([Constraint::Min(0), Constraint::Length(spinner.width() + 2)])
                .areas(area);
        keys.render(keys_area, buf);
        spinner.render(spinner_area, buf);
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.is_empty() {
            return;
        }

        if self.phase == LoadPhase::Habits {
            let row = Rect {
                y: area.y + area.height / 2,
                height: 1,
                ..area
            };
            Spinner::new(self.spinner_frame, LoadingStage::Habits)
                .style(Style::default().fg(self.theme.accent()))
                .render(row, buf);
            return;
        }

        let selection = self.state.selection();
        if area.height < MIN_HEIGHT {
            // No room for the grid: keep only the title
            let title_row = Rect { height: 1, ..area };
            HabitTitle::new(selection, self.theme).render(title_row, buf);
            return;
        }

        let [title_area, error_area, grid_area, footer_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .areas(area);

        HabitTitle::new(selection, self.theme).render(title_area, buf);

        if let Some(err) = self.state.error() {
            Line::styled(err.to_string(), Style::default().fg(self.theme.error()))
                .render(error_area, buf);
        }

        let weeks = self.state.weeks(self.today);
        self.grid_height.set(grid_area.height);
        CalendarGrid::new(&weeks, self.scroll, self.theme).render(grid_area, buf);

        self.render_footer(footer_area, buf);

        if selection.menu_open {
            let menu_area = HabitMenu::area_below(area, title_area.y, selection.habits.len())
                .intersection(area);
            if menu_area.height >= MIN_MENU_HEIGHT {
                HabitMenu::new(selection, self.menu_cursor, self.theme).render(menu_area, buf);
            }
        }

        if self.show_help {
            let popup_area = HelpPopup::centered_area(area);
            HelpPopup::new(self.theme).render(popup_area, buf);
        }
    }
}

/// Run the TUI application
pub fn run(source: Arc<dyn CalendarSource>, user: Option<UserId>) -> anyhow::Result<()> {
    // Theme detection must happen before raw mode
    let theme = Theme::detect();
    let mut terminal = ratatui::init();
    let result = run_app(&mut terminal, source, user, theme);
    ratatui::restore();
    result
}

/// Run one fetch on a background thread, reporting back through `tx`
fn spawn_fetch(
    command: Command,
    source: Arc<dyn CalendarSource>,
    user: Option<UserId>,
    tx: mpsc::Sender<FetchEvent>,
) {
    thread::spawn(move || {
        let event = match command {
            Command::FetchHabits => {
                let habits = user.map(|u| source.fetch_habits(u)).unwrap_or_default();
                FetchEvent::Habits(habits)
            }
            Command::FetchStatus(request) => {
                let result = source.fetch_status_map(request.user, request.habit.as_ref());
                FetchEvent::Status { request, result }
            }
        };
        // Receiver gone means the app already quit
        let _ = tx.send(event);
    });
}

fn run_app(
    terminal: &mut DefaultTerminal,
    source: Arc<dyn CalendarSource>,
    user: Option<UserId>,
    theme: Theme,
) -> anyhow::Result<()> {
    let mut app = App::new(user, theme, Local::now().date_naive());
    let (tx, rx) = mpsc::channel();

    spawn_fetch(Command::FetchHabits, Arc::clone(&source), user, tx.clone());

    loop {
        terminal.draw(|frame| app.draw(frame))?;

        if app.should_quit() {
            break;
        }

        // Apply finished fetches (non-blocking)
        while let Ok(fetched) = rx.try_recv() {
            if let Some(command) = app.apply_fetch_event(fetched) {
                spawn_fetch(command, Arc::clone(&source), user, tx.clone());
            }
        }

        // Poll for events with 100ms timeout for spinner animation
        if event::poll(Duration::from_millis(100))? {
            if let Some(command) = app.handle_event(event::read()?) {
                spawn_fetch(command, Arc::clone(&source), user, tx.clone());
            }
        } else {
            app.tick(Local::now().date_naive());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{HabitId, StatusCode};
    use crossterm::event::{KeyEvent, KeyModifiers};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    fn user() -> UserId {
        UserId::new(42).unwrap()
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn habits() -> Vec<Habit> {
        vec![
            Habit {
                id: HabitId::new("1"),
                label: "Run".into(),
            },
            Habit {
                id: HabitId::new("2"),
                label: "Read".into(),
            },
        ]
    }

    /// App with habits loaded and the first calendar request outstanding
    fn make_ready_app() -> (App, StatusRequest) {
        let mut app = App::new(Some(user()), Theme::Dark, today());
        let Some(Command::FetchStatus(request)) =
            app.apply_fetch_event(FetchEvent::Habits(habits()))
        else {
            panic!("expected a status fetch");
        };
        (app, request)
    }

    fn buffer_text(app: &App, width: u16, height: u16) -> String {
        let area = Rect::new(0, 0, width, height);
        let mut buf = Buffer::empty(area);
        app.render(area, &mut buf);
        (0..height)
            .map(|y| {
                (0..width)
                    .map(|x| buf.cell((x, y)).unwrap().symbol().to_string())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_app_initial_state() {
        let app = App::new(Some(user()), Theme::Dark, today());
        assert_eq!(app.phase, LoadPhase::Habits);
        assert!(!app.should_quit());
    }

    #[test]
    fn test_app_quit_on_q() {
        let mut app = App::new(Some(user()), Theme::Dark, today());
        assert!(app.handle_event(key(KeyCode::Char('q'))).is_none());
        assert!(app.should_quit());
    }

    #[test]
    fn test_app_tick_updates_spinner() {
        let mut app = App::new(Some(user()), Theme::Dark, today());
        app.tick(today());
        assert_eq!(app.spinner_frame, 1);
    }

    #[test]
    fn test_habits_loaded_requests_calendar() {
        let (app, request) = make_ready_app();
        assert_eq!(app.phase, LoadPhase::Ready);
        assert_eq!(request.habit, Some(HabitId::new("1")));
        assert!(app.loading_calendar);
    }

    #[test]
    fn test_status_applied_clears_loading() {
        let (mut app, request) = make_ready_app();
        let map: StatusMap = [(today(), StatusCode::new("done"))].into_iter().collect();
        app.apply_fetch_event(FetchEvent::Status {
            request,
            result: Ok(map),
        });
        assert!(!app.loading_calendar);
        assert_eq!(app.state().status_map().len(), 1);
    }

    #[test]
    fn test_menu_select_other_habit() {
        let (mut app, _) = make_ready_app();

        app.handle_event(key(KeyCode::Enter));
        assert!(app.state().selection().menu_open);

        app.handle_event(key(KeyCode::Down));
        let command = app.handle_event(key(KeyCode::Enter));

        assert_eq!(
            command,
            Some(Command::FetchStatus(StatusRequest {
                user: user(),
                habit: Some(HabitId::new("2")),
            }))
        );
        assert!(!app.state().selection().menu_open);
    }

    #[test]
    fn test_menu_reselect_same_habit_no_fetch() {
        let (mut app, _) = make_ready_app();
        app.handle_event(key(KeyCode::Enter));
        assert!(app.handle_event(key(KeyCode::Enter)).is_none());
        assert!(!app.state().selection().menu_open);
    }

    #[test]
    fn test_menu_esc_closes_without_quitting() {
        let (mut app, _) = make_ready_app();
        app.handle_event(key(KeyCode::Char('h')));
        app.handle_event(key(KeyCode::Esc));
        assert!(!app.state().selection().menu_open);
        assert!(!app.should_quit());
    }

    #[test]
    fn test_stale_response_after_switch() {
        let (mut app, request_a) = make_ready_app();
        app.handle_event(key(KeyCode::Enter));
        app.handle_event(key(KeyCode::Down));
        app.handle_event(key(KeyCode::Enter));

        // A's late response must not land on B's calendar
        let map: StatusMap = [(today(), StatusCode::new("done"))].into_iter().collect();
        app.apply_fetch_event(FetchEvent::Status {
            request: request_a,
            result: Ok(map),
        });
        assert!(app.state().status_map().is_empty());
        assert!(app.loading_calendar);
    }

    #[test]
    fn test_reload_key() {
        let (mut app, _) = make_ready_app();
        assert_eq!(
            app.handle_event(key(KeyCode::Char('r'))),
            Some(Command::FetchHabits)
        );
    }

    #[test]
    fn test_scroll_clamped() {
        let (mut app, _) = make_ready_app();
        for _ in 0..10 {
            app.handle_event(key(KeyCode::Down));
        }
        // Three March rows plus the separator above the labelled oldest row
        assert_eq!(app.scroll, 3);
        app.handle_event(key(KeyCode::Up));
        assert_eq!(app.scroll, 2);
    }

    #[test]
    fn test_help_toggle() {
        let (mut app, _) = make_ready_app();
        app.handle_event(key(KeyCode::Char('?')));
        assert!(app.show_help);
        app.handle_event(key(KeyCode::Char('?')));
        assert!(!app.show_help);
    }

    #[test]
    fn test_render_error_banner() {
        let (mut app, request) = make_ready_app();
        app.apply_fetch_event(FetchEvent::Status {
            request,
            result: Err(FetchError::TransportUnreachable),
        });

        let text = buffer_text(&app, 80, 10);
        assert!(text.contains("No connection to the server"));
        assert!(text.contains("Mo Tu We"));
    }

    #[test]
    fn test_render_unresolved_user() {
        let mut app = App::new(None, Theme::Dark, today());
        assert!(app.apply_fetch_event(FetchEvent::Habits(Vec::new())).is_none());

        let text = buffer_text(&app, 100, 10);
        assert!(text.contains("No habits"));
        assert!(text.contains("Could not determine the user"));
    }

    // ========== Small terminal tests ==========

    /// Ready app with an error, the dropdown open and help shown
    fn make_busy_app() -> App {
        let (mut app, request) = make_ready_app();
        app.apply_fetch_event(FetchEvent::Status {
            request,
            result: Err(FetchError::TransportUnreachable),
        });
        app.handle_event(key(KeyCode::Enter));
        app.handle_event(key(KeyCode::Char('?')));
        assert!(app.state().selection().menu_open);
        app
    }

    #[test]
    fn test_render_short_terminal_heights() {
        let busy = make_busy_app();
        let (plain, _) = make_ready_app();
        let loading = App::new(Some(user()), Theme::Dark, today());

        for height in 0..8 {
            buffer_text(&busy, 80, height);
            buffer_text(&plain, 80, height);
            buffer_text(&loading, 80, height);
        }
    }

    #[test]
    fn test_render_single_row_keeps_title() {
        let (app, _) = make_ready_app();
        let text = buffer_text(&app, 80, 1);
        assert!(text.contains("Run"));
    }

    #[test]
    fn test_render_two_rows_with_error() {
        let mut app = make_busy_app();
        app.handle_event(key(KeyCode::Esc));
        let text = buffer_text(&app, 80, 2);
        assert!(text.contains("Run"));
        assert!(!text.contains("No connection"));
    }

    #[test]
    fn test_render_menu_in_short_terminal() {
        let (mut app, _) = make_ready_app();
        app.handle_event(key(KeyCode::Enter));
        // Four rows leave three below the title: one habit between borders
        let text = buffer_text(&app, 80, 4);
        assert!(text.contains("• Run"));
    }

    // ========== Scroll and footer tests ==========

    #[test]
    fn test_scroll_limited_by_viewport() {
        let (mut app, _) = make_ready_app();
        // 7 rows: grid area of 4, header plus 3 body lines for 4 grid lines
        buffer_text(&app, 80, 7);
        for _ in 0..5 {
            app.handle_event(key(KeyCode::Down));
        }
        assert_eq!(app.scroll, 1);
    }

    #[test]
    fn test_tick_reclamps_scroll_after_resize() {
        let (mut app, _) = make_ready_app();
        for _ in 0..5 {
            app.handle_event(key(KeyCode::Down));
        }
        assert_eq!(app.scroll, 3);

        buffer_text(&app, 80, 20);
        app.tick(today());
        assert_eq!(app.scroll, 0);
    }

    #[test]
    fn test_footer_shows_calendar_spinner() {
        let (mut app, request) = make_ready_app();
        let text = buffer_text(&app, 80, 10);
        assert!(text.contains("Loading calendar..."));

        app.apply_fetch_event(FetchEvent::Status {
            request,
            result: Ok(StatusMap::new()),
        });
        let text = buffer_text(&app, 80, 10);
        assert!(!text.contains("Loading calendar..."));
        assert!(text.contains("q quit"));
    }

    #[test]
    fn test_loading_screen_spinner() {
        let app = App::new(Some(user()), Theme::Dark, today());
        let text = buffer_text(&app, 40, 5);
        assert!(text.contains("Loading habits..."));
    }
}
