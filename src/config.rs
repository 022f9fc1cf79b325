use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::app::tabs::{DEFAULT_TAB, TABS};
use crate::theme::Theme;

const DEFAULT_THEME: &str = "light";
const MIN_TICK_RATE_MS: u64 = 50;
const MAX_TICK_RATE_MS: u64 = 1_000;
const DEFAULT_TICK_RATE_MS: u64 = 250;

/// App-level configuration. Supplies startup defaults only: a value
/// persisted in the store always wins over the config on restore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub theme: String,
    pub default_tab: String,
    pub tick_rate_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: DEFAULT_THEME.to_string(),
            default_tab: DEFAULT_TAB.to_string(),
            tick_rate_ms: DEFAULT_TICK_RATE_MS,
        }
    }
}

impl Config {
    pub fn config_path() -> Option<PathBuf> {
        let mut path = dirs::config_dir()?;
        path.push("dashlet");
        path.push("config.toml");
        Some(path)
    }

    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };

        Self::load_from_path(&path)
    }

    fn load_from_path(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<Self>(&contents) {
                Ok(mut config) => {
                    config.validate();
                    config
                }
                Err(error) => {
                    warn!("failed to parse config '{}': {}", path.display(), error);
                    Self::default()
                }
            },
            Err(error) => {
                warn!("failed to read config '{}': {}", path.display(), error);
                Self::default()
            }
        }
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let path = Self::config_path().ok_or_else(|| anyhow!("unable to determine config path"))?;
        self.save_to_path(&path)
    }

    fn save_to_path(&self, path: &Path) -> anyhow::Result<()> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow!("invalid config path"))?;
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory '{}'", parent.display()))?;

        let mut validated = self.clone();
        validated.validate();
        let contents =
            toml::to_string_pretty(&validated).context("failed to serialize config to TOML")?;

        let file_name = path
            .file_name()
            .ok_or_else(|| anyhow!("invalid config file name"))?
            .to_string_lossy()
            .to_string();
        let tmp_path = path.with_file_name(format!(".{file_name}.tmp"));

        fs::write(&tmp_path, contents).with_context(|| {
            format!("failed to write temporary config file '{}'", tmp_path.display())
        })?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "failed to atomically rename config file '{}' to '{}'",
                tmp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }

    fn validate(&mut self) {
        self.tick_rate_ms = self.tick_rate_ms.clamp(MIN_TICK_RATE_MS, MAX_TICK_RATE_MS);

        self.theme = match self.theme.parse::<Theme>() {
            Ok(theme) => theme.as_str().to_string(),
            Err(()) => {
                warn!(
                    "invalid theme '{}' in config; falling back to {}",
                    self.theme, DEFAULT_THEME
                );
                DEFAULT_THEME.to_string()
            }
        };

        if !TABS.iter().any(|tab| tab.id == self.default_tab) {
            warn!(
                "invalid default_tab '{}' in config; falling back to {}",
                self.default_tab, DEFAULT_TAB
            );
            self.default_tab = DEFAULT_TAB.to_string();
        }
    }

    pub fn startup_theme(&self) -> Theme {
        self.theme.parse().unwrap_or_default()
    }

    pub fn startup_tab(&self) -> &str {
        if TABS.iter().any(|tab| tab.id == self.default_tab) {
            &self.default_tab
        } else {
            DEFAULT_TAB
        }
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_rate_ms.clamp(MIN_TICK_RATE_MS, MAX_TICK_RATE_MS))
    }
}
