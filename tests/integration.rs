//! Full dashboard lifecycle over a real sqlite store and an in-memory
//! surface, exercising persistence across simulated restarts.

use std::path::Path;
use std::time::{Duration, Instant};

use tempfile::TempDir;

use dashlet::activity::ACTIVITY_BODY_ID;
use dashlet::app::Dashboard;
use dashlet::app::settings_form::{
    SAVED_MESSAGE, SAVED_MESSAGE_TIMEOUT, SETTINGS_MSG_ID, Settings,
};
use dashlet::app::tabs::DEFAULT_TAB;
use dashlet::app::tasks::{EMPTY_PLACEHOLDER, TASK_LIST_ID};
use dashlet::config::Config;
use dashlet::store::sqlite::SqliteStore;
use dashlet::surface::{Attr, AttrValue, Badge, MemorySurface, Row, Surface};
use dashlet::theme::Theme;

type TestDashboard = Dashboard<SqliteStore, MemorySurface>;

fn open_dashboard(path: &Path) -> TestDashboard {
    let store = SqliteStore::open(path).expect("failed to open sqlite store");
    Dashboard::new(store, MemorySurface::new(), &Config::default())
}

fn store_path(temp_dir: &TempDir) -> std::path::PathBuf {
    temp_dir.path().join("dashboard.db")
}

#[test]
fn fresh_dashboard_starts_from_defaults() {
    let temp_dir = TempDir::new().expect("temp dir");
    let dash = open_dashboard(&store_path(&temp_dir));

    assert_eq!(dash.active_tab().id, DEFAULT_TAB);
    assert_eq!(dash.theme(), Theme::Light);
    assert!(dash.tasks().is_empty());
    assert_eq!(dash.settings(), &Settings::default());

    let rows = dash.surface().rows(TASK_LIST_ID);
    assert_eq!(rows, &[Row::Placeholder(EMPTY_PLACEHOLDER.to_string())]);
}

#[test]
fn tasks_survive_a_restart() {
    let temp_dir = TempDir::new().expect("temp dir");
    let path = store_path(&temp_dir);

    {
        let mut dash = open_dashboard(&path);
        assert!(dash.add_task("  write the report  "));
        assert!(dash.add_task("file expenses"));
        dash.toggle_task(0, true);
    }

    let dash = open_dashboard(&path);
    assert_eq!(dash.tasks().len(), 2);
    assert_eq!(dash.tasks()[0].name, "write the report");
    assert!(dash.tasks()[0].done);
    assert!(!dash.tasks()[1].done);

    // The restored list renders one row per task, not the placeholder.
    assert_eq!(dash.surface().rows(TASK_LIST_ID).len(), 2);
}

#[test]
fn active_tab_survives_a_restart_without_grabbing_focus() {
    let temp_dir = TempDir::new().expect("temp dir");
    let path = store_path(&temp_dir);

    {
        let mut dash = open_dashboard(&path);
        assert!(dash.activate_tab("tab-settings", true));
        assert_eq!(dash.surface().focused(), Some("tab-settings"));
    }

    let dash = open_dashboard(&path);
    assert_eq!(dash.active_tab().id, "tab-settings");
    assert_eq!(dash.surface().focused(), None);

    let hidden = |panel: &str| {
        dash.surface()
            .attr(panel, Attr::Hidden)
            .and_then(AttrValue::as_flag)
    };
    assert_eq!(hidden("panel-settings"), Some(false));
    assert_eq!(hidden("panel-overview"), Some(true));
    assert_eq!(hidden("panel-tasks"), Some(true));
}

#[test]
fn theme_toggle_persists_and_is_an_involution() {
    let temp_dir = TempDir::new().expect("temp dir");
    let path = store_path(&temp_dir);

    {
        let mut dash = open_dashboard(&path);
        assert_eq!(dash.toggle_theme(), Theme::Dark);
    }

    {
        let dash = open_dashboard(&path);
        assert_eq!(dash.theme(), Theme::Dark);
    }

    {
        let mut dash = open_dashboard(&path);
        assert_eq!(dash.toggle_theme(), Theme::Light);
    }

    let dash = open_dashboard(&path);
    assert_eq!(dash.theme(), Theme::Light);
}

#[test]
fn settings_save_round_trips_with_trimming() {
    let temp_dir = TempDir::new().expect("temp dir");
    let path = store_path(&temp_dir);

    {
        let mut dash = open_dashboard(&path);
        dash.save_settings(
            Settings {
                display_name: "  Priya  ".to_string(),
                email: " priya@example.com ".to_string(),
                email_opt_in: true,
            },
            Instant::now(),
        );
    }

    let dash = open_dashboard(&path);
    assert_eq!(
        dash.settings(),
        &Settings {
            display_name: "Priya".to_string(),
            email: "priya@example.com".to_string(),
            email_opt_in: true,
        }
    );

    let name = dash
        .surface()
        .attr("displayName", Attr::Text)
        .and_then(AttrValue::as_text);
    assert_eq!(name, Some("Priya"));
}

#[test]
fn saved_message_shows_then_clears_after_the_timeout() {
    let temp_dir = TempDir::new().expect("temp dir");
    let mut dash = open_dashboard(&store_path(&temp_dir));

    let saved_at = Instant::now();
    dash.save_settings(Settings::default(), saved_at);

    let message = |dash: &TestDashboard| {
        dash.surface()
            .attr(SETTINGS_MSG_ID, Attr::Text)
            .and_then(AttrValue::as_text)
            .unwrap_or_default()
            .to_string()
    };

    assert_eq!(message(&dash), SAVED_MESSAGE);

    dash.tick(saved_at + Duration::from_millis(100));
    assert_eq!(message(&dash), SAVED_MESSAGE);

    dash.tick(saved_at + SAVED_MESSAGE_TIMEOUT);
    assert_eq!(message(&dash), "");
}

#[test]
fn clear_all_is_gated_by_confirmation() {
    let temp_dir = TempDir::new().expect("temp dir");
    let path = store_path(&temp_dir);

    let mut dash = open_dashboard(&path);
    dash.add_task("survivor");

    dash.surface_mut().set_confirm_answer(false);
    assert!(!dash.clear_all_tasks());
    assert_eq!(dash.tasks().len(), 1);

    dash.surface_mut().set_confirm_answer(true);
    assert!(dash.clear_all_tasks());
    assert!(dash.tasks().is_empty());

    // The decline left no trace in the store either.
    let dash = open_dashboard(&path);
    assert!(dash.tasks().is_empty());
    assert_eq!(
        dash.surface().rows(TASK_LIST_ID),
        &[Row::Placeholder(EMPTY_PLACEHOLDER.to_string())]
    );
}

#[test]
fn clear_done_keeps_only_undone_tasks_across_restart() {
    let temp_dir = TempDir::new().expect("temp dir");
    let path = store_path(&temp_dir);

    {
        let mut dash = open_dashboard(&path);
        for name in ["a", "b", "c"] {
            dash.add_task(name);
        }
        dash.toggle_task(1, true);
        dash.clear_done_tasks();
    }

    let dash = open_dashboard(&path);
    let names: Vec<&str> = dash.tasks().iter().map(|task| task.name.as_str()).collect();
    assert_eq!(names, vec!["a", "c"]);
}

#[test]
fn arrow_navigation_wraps_and_persists() {
    let temp_dir = TempDir::new().expect("temp dir");
    let path = store_path(&temp_dir);

    {
        let mut dash = open_dashboard(&path);
        dash.activate_previous_tab();
        assert_eq!(dash.active_tab().id, "tab-settings");
        assert_eq!(dash.surface().focused(), Some("tab-settings"));

        dash.activate_next_tab();
        assert_eq!(dash.active_tab().id, DEFAULT_TAB);

        dash.activate_next_tab();
        assert_eq!(dash.active_tab().id, "tab-tasks");
    }

    let dash = open_dashboard(&path);
    assert_eq!(dash.active_tab().id, "tab-tasks");
}

#[test]
fn activity_table_maps_statuses_to_badges() {
    let temp_dir = TempDir::new().expect("temp dir");
    let dash = open_dashboard(&store_path(&temp_dir));

    let rows = dash.surface().rows(ACTIVITY_BODY_ID);
    assert_eq!(rows.len(), 5);

    let badges: Vec<Badge> = rows
        .iter()
        .map(|row| {
            let Row::Activity(activity) = row else {
                panic!("expected activity row");
            };
            activity.badge
        })
        .collect();

    assert_eq!(
        badges,
        vec![Badge::Ok, Badge::Warn, Badge::Ok, Badge::Bad, Badge::Ok]
    );
}

#[test]
fn unknown_tab_activation_leaves_persisted_state_alone() {
    let temp_dir = TempDir::new().expect("temp dir");
    let path = store_path(&temp_dir);

    {
        let mut dash = open_dashboard(&path);
        dash.activate_tab("tab-tasks", false);
        assert!(!dash.activate_tab("tab-bogus", false));
        assert_eq!(dash.active_tab().id, "tab-tasks");
    }

    let dash = open_dashboard(&path);
    assert_eq!(dash.active_tab().id, "tab-tasks");
}

#[test]
fn add_rejects_blank_names_without_touching_the_store() {
    let temp_dir = TempDir::new().expect("temp dir");
    let path = store_path(&temp_dir);

    {
        let mut dash = open_dashboard(&path);
        assert!(!dash.add_task("   "));
    }

    let dash = open_dashboard(&path);
    assert!(dash.tasks().is_empty());
}
