//! Dashboard wiring: owns the store, the surface, and the controllers, and
//! runs the startup sequence. Front-ends (TUI, headless CLI) drive it through
//! the delegating operations below.

pub mod settings_form;
pub mod tabs;
pub mod tasks;

use std::time::Instant;

use crate::activity::{self, ActivityRecord};
use crate::config::Config;
use crate::store::KeyValueStore;
use crate::surface::Surface;
use crate::theme::{Theme, ThemeController};

use settings_form::{Settings, SettingsFormController};
use tabs::{Tab, TabController};
use tasks::{Task, TaskListController};

pub struct Dashboard<S, U> {
    store: S,
    surface: U,
    activity: Vec<ActivityRecord>,
    tabs: TabController,
    theme: ThemeController,
    tasks: TaskListController,
    settings_form: SettingsFormController,
}

impl<S: KeyValueStore, U: Surface> Dashboard<S, U> {
    /// Startup sequence: apply the persisted (or configured) theme, render
    /// the activity table, load and render tasks, load and populate the
    /// settings form, then restore the active tab without moving focus.
    pub fn new(store: S, surface: U, config: &Config) -> Self {
        let mut store = store;
        let mut surface = surface;

        let theme = ThemeController::init(&store, &mut surface, config.startup_theme());

        let activity = activity::activity_log();
        activity::render_activity(&activity, &mut surface);

        let tasks = TaskListController::load(&store);
        tasks.render(&mut surface);

        let settings_form = SettingsFormController::load(&store);
        settings_form.populate(&mut surface);

        let tabs = TabController::restore(&mut store, &mut surface, config.startup_tab());

        Self {
            store,
            surface,
            activity,
            tabs,
            theme,
            tasks,
            settings_form,
        }
    }

    // Tabs

    pub fn activate_tab(&mut self, id: &str, restore_focus: bool) -> bool {
        self.tabs
            .activate(id, restore_focus, &mut self.store, &mut self.surface)
    }

    pub fn activate_next_tab(&mut self) {
        self.tabs.activate_next(&mut self.store, &mut self.surface);
    }

    pub fn activate_previous_tab(&mut self) {
        self.tabs
            .activate_previous(&mut self.store, &mut self.surface);
    }

    pub fn active_tab(&self) -> Tab {
        self.tabs.active()
    }

    // Theme

    pub fn theme(&self) -> Theme {
        self.theme.current(&self.surface)
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme.set(theme, &mut self.store, &mut self.surface);
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.theme.toggle(&mut self.store, &mut self.surface)
    }

    // Tasks

    pub fn tasks(&self) -> &[Task] {
        self.tasks.tasks()
    }

    pub fn add_task(&mut self, name: &str) -> bool {
        self.tasks.add(name, &mut self.store, &mut self.surface)
    }

    pub fn toggle_task(&mut self, index: usize, done: bool) {
        self.tasks
            .toggle(index, done, &mut self.store, &mut self.surface);
    }

    pub fn remove_task(&mut self, index: usize) {
        self.tasks
            .remove(index, &mut self.store, &mut self.surface);
    }

    pub fn clear_done_tasks(&mut self) {
        self.tasks.clear_done(&mut self.store, &mut self.surface);
    }

    pub fn clear_all_tasks(&mut self) -> bool {
        self.tasks.clear_all(&mut self.store, &mut self.surface)
    }

    // Settings form

    pub fn settings(&self) -> &Settings {
        self.settings_form.settings()
    }

    pub fn save_settings(&mut self, values: Settings, now: Instant) {
        self.settings_form
            .save(values, now, &mut self.store, &mut self.surface);
    }

    pub fn tick(&mut self, now: Instant) {
        self.settings_form.tick(now, &mut self.surface);
    }

    // Shared collaborators

    pub fn activity(&self) -> &[ActivityRecord] {
        &self.activity
    }

    pub fn surface(&self) -> &U {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut U {
        &mut self.surface
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
