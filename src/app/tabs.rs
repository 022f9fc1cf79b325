use tracing::warn;

use crate::store::{KeyValueStore, keys};
use crate::surface::{Attr, AttrValue, Surface};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tab {
    pub id: &'static str,
    pub label: &'static str,
    /// Panel this tab controls.
    pub panel: &'static str,
}

/// Fixed ordered tab set, defined at startup, never mutated at runtime.
pub const TABS: [Tab; 3] = [
    Tab {
        id: "tab-overview",
        label: "Overview",
        panel: "panel-overview",
    },
    Tab {
        id: "tab-tasks",
        label: "Tasks",
        panel: "panel-tasks",
    },
    Tab {
        id: "tab-settings",
        label: "Settings",
        panel: "panel-settings",
    },
];

pub const DEFAULT_TAB: &str = "tab-overview";

/// Mutually-exclusive view selection. Exactly one tab is selected at any
/// time; the selected tab is the only one in the tab order.
#[derive(Debug)]
pub struct TabController {
    active: usize,
}

impl TabController {
    /// Startup restoration: a persisted id that resolves to an existing tab
    /// is activated without moving focus; anything else falls back to
    /// `default_id` (itself falling back to the first tab), also without
    /// moving focus.
    pub fn restore(
        store: &mut dyn KeyValueStore,
        surface: &mut dyn Surface,
        default_id: &str,
    ) -> Self {
        let mut controller = Self { active: 0 };

        let saved = store.get(keys::ACTIVE_TAB);
        let target = saved
            .as_deref()
            .filter(|id| TABS.iter().any(|tab| tab.id == *id))
            .map(str::to_string)
            .unwrap_or_else(|| {
                if TABS.iter().any(|tab| tab.id == default_id) {
                    default_id.to_string()
                } else {
                    DEFAULT_TAB.to_string()
                }
            });

        controller.activate(&target, false, store, surface);
        controller
    }

    /// Marks exactly the matching tab selected and focusable, shows exactly
    /// its panel, persists the id, and optionally moves focus. Unknown ids
    /// are ignored.
    pub fn activate(
        &mut self,
        id: &str,
        restore_focus: bool,
        store: &mut dyn KeyValueStore,
        surface: &mut dyn Surface,
    ) -> bool {
        let Some(index) = TABS.iter().position(|tab| tab.id == id) else {
            warn!(id, "ignoring activation of unknown tab");
            return false;
        };

        self.active = index;
        for tab in &TABS {
            let selected = tab.id == id;
            surface.set_attr(tab.id, Attr::Selected, AttrValue::Flag(selected));
            surface.set_attr(tab.id, Attr::Focusable, AttrValue::Flag(selected));
            surface.set_attr(tab.panel, Attr::Hidden, AttrValue::Flag(!selected));
        }

        if let Err(error) = store.set(keys::ACTIVE_TAB, id) {
            warn!(%error, "failed to persist active tab");
        }

        if restore_focus {
            surface.focus(id);
        }
        true
    }

    /// Directional neighbor, wrapping past the last tab to the first.
    pub fn activate_next(&mut self, store: &mut dyn KeyValueStore, surface: &mut dyn Surface) {
        let next = (self.active + 1) % TABS.len();
        self.activate(TABS[next].id, true, store, surface);
    }

    /// Directional neighbor, wrapping past the first tab to the last.
    pub fn activate_previous(&mut self, store: &mut dyn KeyValueStore, surface: &mut dyn Surface) {
        let previous = (self.active + TABS.len() - 1) % TABS.len();
        self.activate(TABS[previous].id, true, store, surface);
    }

    pub fn active(&self) -> Tab {
        TABS[self.active]
    }

    pub fn active_id(&self) -> &'static str {
        TABS[self.active].id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::surface::MemorySurface;

    fn selected_ids(surface: &MemorySurface) -> Vec<&'static str> {
        TABS.iter()
            .filter(|tab| {
                surface
                    .attr(tab.id, Attr::Selected)
                    .and_then(AttrValue::as_flag)
                    == Some(true)
            })
            .map(|tab| tab.id)
            .collect()
    }

    fn visible_panels(surface: &MemorySurface) -> Vec<&'static str> {
        TABS.iter()
            .filter(|tab| {
                surface
                    .attr(tab.panel, Attr::Hidden)
                    .and_then(AttrValue::as_flag)
                    == Some(false)
            })
            .map(|tab| tab.panel)
            .collect()
    }

    #[test]
    fn activate_selects_exactly_one_tab_and_panel() {
        let mut store = MemoryStore::new();
        let mut surface = MemorySurface::new();
        let mut tabs = TabController::restore(&mut store, &mut surface, DEFAULT_TAB);

        assert!(tabs.activate("tab-tasks", false, &mut store, &mut surface));

        assert_eq!(selected_ids(&surface), vec!["tab-tasks"]);
        assert_eq!(visible_panels(&surface), vec!["panel-tasks"]);
        assert_eq!(store.get(keys::ACTIVE_TAB), Some("tab-tasks".to_string()));
    }

    #[test]
    fn only_the_selected_tab_is_in_the_tab_order() {
        let mut store = MemoryStore::new();
        let mut surface = MemorySurface::new();
        let mut tabs = TabController::restore(&mut store, &mut surface, DEFAULT_TAB);
        tabs.activate("tab-settings", false, &mut store, &mut surface);

        for tab in &TABS {
            let focusable = surface
                .attr(tab.id, Attr::Focusable)
                .and_then(AttrValue::as_flag);
            assert_eq!(focusable, Some(tab.id == "tab-settings"));
        }
    }

    #[test]
    fn activate_with_focus_moves_focus() {
        let mut store = MemoryStore::new();
        let mut surface = MemorySurface::new();
        let mut tabs = TabController::restore(&mut store, &mut surface, DEFAULT_TAB);

        assert_eq!(surface.focused(), None);

        tabs.activate("tab-tasks", true, &mut store, &mut surface);
        assert_eq!(surface.focused(), Some("tab-tasks"));
    }

    #[test]
    fn unknown_id_is_ignored() {
        let mut store = MemoryStore::new();
        let mut surface = MemorySurface::new();
        let mut tabs = TabController::restore(&mut store, &mut surface, DEFAULT_TAB);

        assert!(!tabs.activate("tab-nope", true, &mut store, &mut surface));
        assert_eq!(tabs.active_id(), DEFAULT_TAB);
        assert_eq!(store.get(keys::ACTIVE_TAB), Some(DEFAULT_TAB.to_string()));
    }

    #[test]
    fn arrow_navigation_wraps_both_ways() {
        let mut store = MemoryStore::new();
        let mut surface = MemorySurface::new();
        let mut tabs = TabController::restore(&mut store, &mut surface, DEFAULT_TAB);

        tabs.activate("tab-settings", false, &mut store, &mut surface);
        tabs.activate_next(&mut store, &mut surface);
        assert_eq!(tabs.active_id(), "tab-overview");

        tabs.activate_previous(&mut store, &mut surface);
        assert_eq!(tabs.active_id(), "tab-settings");
    }

    #[test]
    fn restore_uses_persisted_id_without_moving_focus() {
        let mut store = MemoryStore::new();
        store
            .set(keys::ACTIVE_TAB, "tab-tasks")
            .expect("set should succeed");
        let mut surface = MemorySurface::new();

        let tabs = TabController::restore(&mut store, &mut surface, DEFAULT_TAB);
        assert_eq!(tabs.active_id(), "tab-tasks");
        assert_eq!(surface.focused(), None);
    }

    #[test]
    fn restore_falls_back_on_stale_persisted_id() {
        let mut store = MemoryStore::new();
        store
            .set(keys::ACTIVE_TAB, "tab-removed")
            .expect("set should succeed");
        let mut surface = MemorySurface::new();

        let tabs = TabController::restore(&mut store, &mut surface, DEFAULT_TAB);
        assert_eq!(tabs.active_id(), DEFAULT_TAB);
    }
}
