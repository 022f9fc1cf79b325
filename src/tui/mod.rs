//! Interactive front-end: a raw-mode alternate-screen event loop rendering
//! the dashboard's surface state with crossterm.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute, queue,
    style::{Attribute as TextAttribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor},
    terminal::{
        Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode,
        enable_raw_mode,
    },
};
use tracing::warn;

use crate::activity::ACTIVITY_BODY_ID;
use crate::app::{
    Dashboard,
    settings_form::{SETTINGS_MSG_ID, Settings},
    tabs::TABS,
    tasks::TASK_LIST_ID,
};
use crate::config::Config;
use crate::store::KeyValueStore;
use crate::surface::{Attr, AttrValue, Badge, NodeState, Row, Surface};
use crate::theme::Theme;

static TERMINAL_RESTORED: AtomicBool = AtomicBool::new(false);

/// Idempotent terminal restoration, safe to call from a panic hook.
pub fn restore_terminal() {
    if TERMINAL_RESTORED.swap(true, Ordering::SeqCst) {
        return;
    }
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen, cursor::Show, ResetColor);
}

struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        restore_terminal();
    }
}

/// Surface rendered to the real terminal. Node state is the single source of
/// truth for drawing; the confirmation prompt blocks on a modal key read.
#[derive(Debug, Default)]
pub struct TerminalSurface {
    state: NodeState,
}

impl TerminalSurface {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Surface for TerminalSurface {
    fn attr(&self, id: &str, attr: Attr) -> Option<&AttrValue> {
        self.state.attr(id, attr)
    }

    fn set_attr(&mut self, id: &str, attr: Attr, value: AttrValue) {
        self.state.set_attr(id, attr, value);
    }

    fn remove_attr(&mut self, id: &str, attr: Attr) {
        self.state.remove_attr(id, attr);
    }

    fn focus(&mut self, id: &str) {
        self.state.focus(id);
    }

    fn focused(&self) -> Option<&str> {
        self.state.focused()
    }

    fn replace_rows(&mut self, container: &str, rows: Vec<Row>) {
        self.state.replace_rows(container, rows);
    }

    fn rows(&self, container: &str) -> &[Row] {
        self.state.rows(container)
    }

    fn confirm(&mut self, message: &str) -> bool {
        match confirm_modal(message) {
            Ok(answer) => answer,
            Err(error) => {
                warn!(%error, "confirmation prompt failed, treating as decline");
                false
            }
        }
    }
}

/// Draws `message [y/N]` on the bottom line and blocks until the user
/// answers. Anything other than an explicit yes declines.
fn confirm_modal(message: &str) -> Result<bool> {
    let mut stdout = io::stdout();
    let (_, rows) = crossterm::terminal::size()?;
    queue!(
        stdout,
        cursor::MoveTo(0, rows.saturating_sub(1)),
        Clear(ClearType::CurrentLine),
        SetAttribute(TextAttribute::Bold),
        Print(format!("{message} [y/N] ")),
        SetAttribute(TextAttribute::Reset),
    )?;
    stdout.flush()?;

    loop {
        if let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => return Ok(true),
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc | KeyCode::Enter => {
                    return Ok(false);
                }
                _ => {}
            }
        }
    }
}

enum InputMode {
    Normal,
    AddTask { buffer: String },
}

/// Front-end-local interaction state: cursor positions and the settings
/// draft being edited. Everything displayed still comes from the surface.
struct TuiState {
    selected_task: usize,
    settings_field: usize,
    mode: InputMode,
    draft: Settings,
}

const SETTINGS_FIELDS: usize = 3;

enum Flow {
    Continue,
    Quit,
}

pub fn run<S: KeyValueStore>(
    store: S,
    config: &Config,
    theme_override: Option<Theme>,
) -> Result<()> {
    let mut dashboard = Dashboard::new(store, TerminalSurface::new(), config);
    if let Some(theme) = theme_override {
        dashboard.set_theme(theme);
    }

    let mut state = TuiState {
        selected_task: 0,
        settings_field: 0,
        mode: InputMode::Normal,
        draft: dashboard.settings().clone(),
    };

    enable_raw_mode().context("failed to enable raw mode")?;
    execute!(io::stdout(), EnterAlternateScreen, cursor::Hide)
        .context("failed to enter alternate screen")?;
    let _guard = TerminalGuard;

    event_loop(&mut dashboard, &mut state, config.tick_rate())
}

fn event_loop<S: KeyValueStore>(
    dashboard: &mut Dashboard<S, TerminalSurface>,
    state: &mut TuiState,
    tick_rate: Duration,
) -> Result<()> {
    loop {
        draw(dashboard, state)?;

        if event::poll(tick_rate)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
            && matches!(handle_key(dashboard, state, key), Flow::Quit)
        {
            return Ok(());
        }

        dashboard.tick(Instant::now());
    }
}

fn handle_key<S: KeyValueStore>(
    dashboard: &mut Dashboard<S, TerminalSurface>,
    state: &mut TuiState,
    key: KeyEvent,
) -> Flow {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Flow::Quit;
    }

    if let InputMode::AddTask { buffer } = &mut state.mode {
        match key.code {
            KeyCode::Enter => {
                let name = buffer.clone();
                dashboard.add_task(&name);
                state.mode = InputMode::Normal;
            }
            KeyCode::Esc => state.mode = InputMode::Normal,
            KeyCode::Backspace => {
                buffer.pop();
            }
            KeyCode::Char(ch) => buffer.push(ch),
            _ => {}
        }
        return Flow::Continue;
    }

    match key.code {
        KeyCode::Left => {
            dashboard.activate_previous_tab();
            return Flow::Continue;
        }
        KeyCode::Right => {
            dashboard.activate_next_tab();
            return Flow::Continue;
        }
        _ => {}
    }

    match dashboard.active_tab().id {
        "tab-tasks" => handle_tasks_key(dashboard, state, key),
        "tab-settings" => handle_settings_key(dashboard, state, key),
        _ => handle_global_key(dashboard, key),
    }
}

fn handle_global_key<S: KeyValueStore>(
    dashboard: &mut Dashboard<S, TerminalSurface>,
    key: KeyEvent,
) -> Flow {
    match key.code {
        KeyCode::Char('q') => Flow::Quit,
        KeyCode::Char('t') => {
            dashboard.toggle_theme();
            Flow::Continue
        }
        _ => Flow::Continue,
    }
}

fn handle_tasks_key<S: KeyValueStore>(
    dashboard: &mut Dashboard<S, TerminalSurface>,
    state: &mut TuiState,
    key: KeyEvent,
) -> Flow {
    let len = dashboard.tasks().len();
    match key.code {
        KeyCode::Up => {
            state.selected_task = state.selected_task.saturating_sub(1);
        }
        KeyCode::Down => {
            if len > 0 && state.selected_task + 1 < len {
                state.selected_task += 1;
            }
        }
        KeyCode::Char('a') => {
            state.mode = InputMode::AddTask {
                buffer: String::new(),
            };
        }
        KeyCode::Char(' ') => {
            if state.selected_task < len {
                let done = dashboard.tasks()[state.selected_task].done;
                dashboard.toggle_task(state.selected_task, !done);
            }
        }
        KeyCode::Char('d') => {
            if state.selected_task < len {
                dashboard.remove_task(state.selected_task);
                clamp_selection(state, dashboard.tasks().len());
            }
        }
        KeyCode::Char('c') => {
            dashboard.clear_done_tasks();
            clamp_selection(state, dashboard.tasks().len());
        }
        KeyCode::Char('C') => {
            if dashboard.clear_all_tasks() {
                state.selected_task = 0;
            }
        }
        _ => return handle_global_key(dashboard, key),
    }
    Flow::Continue
}

fn clamp_selection(state: &mut TuiState, len: usize) {
    if len == 0 {
        state.selected_task = 0;
    } else if state.selected_task >= len {
        state.selected_task = len - 1;
    }
}

fn handle_settings_key<S: KeyValueStore>(
    dashboard: &mut Dashboard<S, TerminalSurface>,
    state: &mut TuiState,
    key: KeyEvent,
) -> Flow {
    match key.code {
        KeyCode::Up => {
            state.settings_field = state.settings_field.saturating_sub(1);
        }
        KeyCode::Down => {
            if state.settings_field + 1 < SETTINGS_FIELDS {
                state.settings_field += 1;
            }
        }
        KeyCode::Enter => {
            dashboard.save_settings(state.draft.clone(), Instant::now());
            // Re-sync the draft so trimming is reflected while editing.
            state.draft = dashboard.settings().clone();
        }
        KeyCode::Char(' ') if state.settings_field == 2 => {
            state.draft.email_opt_in = !state.draft.email_opt_in;
        }
        KeyCode::Backspace => match state.settings_field {
            0 => {
                state.draft.display_name.pop();
            }
            1 => {
                state.draft.email.pop();
            }
            _ => {}
        },
        KeyCode::Char(ch) => match state.settings_field {
            0 => state.draft.display_name.push(ch),
            1 => state.draft.email.push(ch),
            _ => {}
        },
        _ => {}
    }
    Flow::Continue
}

fn draw<S: KeyValueStore>(
    dashboard: &Dashboard<S, TerminalSurface>,
    state: &TuiState,
) -> Result<()> {
    let mut stdout = io::stdout();
    let (_, rows) = crossterm::terminal::size()?;

    queue!(stdout, Clear(ClearType::All), cursor::MoveTo(0, 0))?;
    draw_tab_bar(&mut stdout, dashboard)?;

    match dashboard.active_tab().id {
        "tab-tasks" => draw_tasks_panel(&mut stdout, dashboard, state)?,
        "tab-settings" => draw_settings_panel(&mut stdout, dashboard, state)?,
        _ => draw_overview_panel(&mut stdout, dashboard)?,
    }

    draw_footer(&mut stdout, dashboard, state, rows)?;
    stdout.flush()?;
    Ok(())
}

fn draw_tab_bar<S: KeyValueStore>(
    stdout: &mut io::Stdout,
    dashboard: &Dashboard<S, TerminalSurface>,
) -> Result<()> {
    queue!(stdout, cursor::MoveTo(0, 0))?;
    for tab in &TABS {
        let selected = dashboard
            .surface()
            .attr(tab.id, Attr::Selected)
            .and_then(AttrValue::as_flag)
            == Some(true);
        if selected {
            queue!(
                stdout,
                SetAttribute(TextAttribute::Reverse),
                Print(format!(" {} ", tab.label)),
                SetAttribute(TextAttribute::Reset),
            )?;
        } else {
            queue!(stdout, Print(format!(" {} ", tab.label)))?;
        }
        queue!(stdout, Print(" "))?;
    }
    Ok(())
}

fn draw_overview_panel<S: KeyValueStore>(
    stdout: &mut io::Stdout,
    dashboard: &Dashboard<S, TerminalSurface>,
) -> Result<()> {
    queue!(
        stdout,
        cursor::MoveTo(0, 2),
        SetAttribute(TextAttribute::Bold),
        Print(format!(
            "{:<8}{:<12}{:<24}{:<10}",
            "Time", "User", "Action", "Status"
        )),
        SetAttribute(TextAttribute::Reset),
    )?;

    let mut y = 3;
    for row in dashboard.surface().rows(ACTIVITY_BODY_ID) {
        let Row::Activity(activity) = row else {
            continue;
        };
        queue!(
            stdout,
            cursor::MoveTo(0, y),
            Print(format!(
                "{:<8}{:<12}{:<24}",
                activity.time, activity.user, activity.action
            )),
            SetForegroundColor(badge_color(activity.badge)),
            Print(&activity.status),
            ResetColor,
        )?;
        y += 1;
    }
    Ok(())
}

fn badge_color(badge: Badge) -> Color {
    match badge {
        Badge::Ok => Color::Green,
        Badge::Warn => Color::Yellow,
        Badge::Bad => Color::Red,
    }
}

fn draw_tasks_panel<S: KeyValueStore>(
    stdout: &mut io::Stdout,
    dashboard: &Dashboard<S, TerminalSurface>,
    state: &TuiState,
) -> Result<()> {
    let mut y = 2;
    for row in dashboard.surface().rows(TASK_LIST_ID) {
        queue!(stdout, cursor::MoveTo(0, y))?;
        match row {
            Row::Task(task) => {
                let marker = if task.done { "[x]" } else { "[ ]" };
                let selected = task.index == state.selected_task;
                if selected {
                    queue!(stdout, SetAttribute(TextAttribute::Reverse))?;
                }
                if task.done {
                    queue!(stdout, SetAttribute(TextAttribute::CrossedOut))?;
                }
                queue!(
                    stdout,
                    Print(format!("{marker} {}", task.name)),
                    SetAttribute(TextAttribute::Reset),
                )?;
            }
            Row::Placeholder(message) => {
                queue!(
                    stdout,
                    SetAttribute(TextAttribute::Dim),
                    Print(message.as_str()),
                    SetAttribute(TextAttribute::Reset),
                )?;
            }
            Row::Activity(_) => {}
        }
        y += 1;
    }

    if let InputMode::AddTask { buffer } = &state.mode {
        queue!(
            stdout,
            cursor::MoveTo(0, y + 1),
            SetAttribute(TextAttribute::Bold),
            Print(format!("New task: {buffer}_")),
            SetAttribute(TextAttribute::Reset),
        )?;
    }
    Ok(())
}

fn draw_settings_panel<S: KeyValueStore>(
    stdout: &mut io::Stdout,
    dashboard: &Dashboard<S, TerminalSurface>,
    state: &TuiState,
) -> Result<()> {
    let opt_in = if state.draft.email_opt_in { "[x]" } else { "[ ]" };
    let fields = [
        format!("Display name: {}", state.draft.display_name),
        format!("Email:        {}", state.draft.email),
        format!("Email opt-in: {opt_in}"),
    ];

    for (index, field) in fields.iter().enumerate() {
        queue!(stdout, cursor::MoveTo(0, 2 + index as u16))?;
        if index == state.settings_field {
            queue!(
                stdout,
                SetAttribute(TextAttribute::Reverse),
                Print(field.as_str()),
                SetAttribute(TextAttribute::Reset),
            )?;
        } else {
            queue!(stdout, Print(field.as_str()))?;
        }
    }

    let message = dashboard
        .surface()
        .attr(SETTINGS_MSG_ID, Attr::Text)
        .and_then(AttrValue::as_text)
        .unwrap_or_default();
    if !message.is_empty() {
        queue!(
            stdout,
            cursor::MoveTo(0, 6),
            SetForegroundColor(Color::Green),
            Print(message),
            ResetColor,
        )?;
    }
    Ok(())
}

fn draw_footer<S: KeyValueStore>(
    stdout: &mut io::Stdout,
    dashboard: &Dashboard<S, TerminalSurface>,
    state: &TuiState,
    rows: u16,
) -> Result<()> {
    let hints = match (&state.mode, dashboard.active_tab().id) {
        (InputMode::AddTask { .. }, _) => "Enter: add | Esc: cancel",
        (_, "tab-tasks") => {
            "←/→: tabs | ↑/↓: select | a: add | Space: toggle | d: delete | c: clear done | C: clear all | t: theme | q: quit"
        }
        (_, "tab-settings") => "←/→: tabs | ↑/↓: field | type to edit | Space: opt-in | Enter: save",
        _ => "←/→: tabs | t: theme | q: quit",
    };

    queue!(
        stdout,
        cursor::MoveTo(0, rows.saturating_sub(1)),
        SetAttribute(TextAttribute::Dim),
        Print(format!("[{}] {hints}", dashboard.theme().as_str())),
        SetAttribute(TextAttribute::Reset),
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn dashboard() -> Dashboard<MemoryStore, TerminalSurface> {
        Dashboard::new(
            MemoryStore::new(),
            TerminalSurface::new(),
            &Config::default(),
        )
    }

    fn tui_state(dash: &Dashboard<MemoryStore, TerminalSurface>) -> TuiState {
        TuiState {
            selected_task: 0,
            settings_field: 0,
            mode: InputMode::Normal,
            draft: dash.settings().clone(),
        }
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn arrow_keys_cycle_tabs_with_wrap() {
        let mut dash = dashboard();
        let mut state = tui_state(&dash);

        handle_key(&mut dash, &mut state, press(KeyCode::Left));
        assert_eq!(dash.active_tab().id, "tab-settings");

        handle_key(&mut dash, &mut state, press(KeyCode::Right));
        assert_eq!(dash.active_tab().id, "tab-overview");
    }

    #[test]
    fn add_mode_submits_on_enter_and_cancels_on_esc() {
        let mut dash = dashboard();
        let mut state = tui_state(&dash);
        dash.activate_tab("tab-tasks", false);

        handle_key(&mut dash, &mut state, press(KeyCode::Char('a')));
        for ch in "hi".chars() {
            handle_key(&mut dash, &mut state, press(KeyCode::Char(ch)));
        }
        handle_key(&mut dash, &mut state, press(KeyCode::Enter));
        assert_eq!(dash.tasks().len(), 1);
        assert_eq!(dash.tasks()[0].name, "hi");

        handle_key(&mut dash, &mut state, press(KeyCode::Char('a')));
        handle_key(&mut dash, &mut state, press(KeyCode::Char('x')));
        handle_key(&mut dash, &mut state, press(KeyCode::Esc));
        assert_eq!(dash.tasks().len(), 1);
    }

    #[test]
    fn delete_clamps_the_selection() {
        let mut dash = dashboard();
        let mut state = tui_state(&dash);
        dash.activate_tab("tab-tasks", false);
        dash.add_task("a");
        dash.add_task("b");
        state.selected_task = 1;

        handle_key(&mut dash, &mut state, press(KeyCode::Char('d')));
        assert_eq!(dash.tasks().len(), 1);
        assert_eq!(state.selected_task, 0);
    }

    #[test]
    fn space_toggles_the_selected_task() {
        let mut dash = dashboard();
        let mut state = tui_state(&dash);
        dash.activate_tab("tab-tasks", false);
        dash.add_task("a");

        handle_key(&mut dash, &mut state, press(KeyCode::Char(' ')));
        assert!(dash.tasks()[0].done);

        handle_key(&mut dash, &mut state, press(KeyCode::Char(' ')));
        assert!(!dash.tasks()[0].done);
    }

    #[test]
    fn settings_enter_saves_the_draft() {
        let mut dash = dashboard();
        let mut state = tui_state(&dash);
        dash.activate_tab("tab-settings", false);

        for ch in "Ada ".chars() {
            handle_key(&mut dash, &mut state, press(KeyCode::Char(ch)));
        }
        handle_key(&mut dash, &mut state, press(KeyCode::Enter));

        assert_eq!(dash.settings().display_name, "Ada");
        assert_eq!(state.draft.display_name, "Ada");
    }

    #[test]
    fn settings_space_toggles_the_opt_in_field() {
        let mut dash = dashboard();
        let mut state = tui_state(&dash);
        dash.activate_tab("tab-settings", false);
        state.settings_field = 2;

        handle_key(&mut dash, &mut state, press(KeyCode::Char(' ')));
        assert!(state.draft.email_opt_in);
    }

    #[test]
    fn theme_toggle_key_works_outside_settings() {
        let mut dash = dashboard();
        let mut state = tui_state(&dash);

        handle_key(&mut dash, &mut state, press(KeyCode::Char('t')));
        assert_eq!(dash.theme(), Theme::Dark);
    }

    #[test]
    fn quit_keys() {
        let mut dash = dashboard();
        let mut state = tui_state(&dash);

        assert!(matches!(
            handle_key(&mut dash, &mut state, press(KeyCode::Char('q'))),
            Flow::Quit
        ));
        assert!(matches!(
            handle_key(
                &mut dash,
                &mut state,
                KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)
            ),
            Flow::Quit
        ));
    }
}
