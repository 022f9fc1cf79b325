use std::str::FromStr;

use tracing::warn;

use crate::store::{KeyValueStore, keys};
use crate::surface::{Attr, AttrValue, Surface};

/// Root element carrying the display-mode marker.
pub const ROOT_ID: &str = "body";
/// Theme toggle control.
pub const TOGGLE_ID: &str = "themeToggle";

#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub const fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub const fn opposite(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl FromStr for Theme {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            _ => Err(()),
        }
    }
}

/// Owns the two-valued display mode. The displayed mode lives on the surface;
/// the persisted value lives under `dash.theme`.
#[derive(Debug)]
pub struct ThemeController;

impl ThemeController {
    /// Applies the persisted theme, falling back to `fallback` when the store
    /// holds nothing, and to light when it holds garbage. Does not persist.
    pub fn init(
        store: &dyn KeyValueStore,
        surface: &mut dyn Surface,
        fallback: Theme,
    ) -> Self {
        let theme = match store.get(keys::THEME) {
            Some(raw) => raw.parse().unwrap_or_else(|()| {
                warn!(value = %raw, "invalid persisted theme, defaulting to light");
                Theme::Light
            }),
            None => fallback,
        };

        let controller = Self;
        controller.apply(theme, surface);
        controller
    }

    /// Sets the display-mode marker and the toggle control's pressed
    /// indicator (pressed == light).
    pub fn apply(&self, theme: Theme, surface: &mut dyn Surface) {
        surface.set_attr(
            ROOT_ID,
            Attr::ThemeMode,
            AttrValue::Text(theme.as_str().to_string()),
        );
        surface.set_attr(TOGGLE_ID, Attr::Pressed, AttrValue::Flag(theme == Theme::Light));
    }

    /// The mode currently displayed on the surface.
    pub fn current(&self, surface: &dyn Surface) -> Theme {
        surface
            .attr(ROOT_ID, Attr::ThemeMode)
            .and_then(AttrValue::as_text)
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_default()
    }

    /// Applies and persists an explicit mode.
    pub fn set(&self, theme: Theme, store: &mut dyn KeyValueStore, surface: &mut dyn Surface) {
        self.apply(theme, surface);
        if let Err(error) = store.set(keys::THEME, theme.as_str()) {
            warn!(%error, "failed to persist theme");
        }
    }

    /// Flips the displayed mode and persists the new value.
    pub fn toggle(&self, store: &mut dyn KeyValueStore, surface: &mut dyn Surface) -> Theme {
        let next = self.current(surface).opposite();
        self.set(next, store, surface);
        next
    }
}
