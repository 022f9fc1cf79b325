use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::store::{KeyValueStore, keys};
use crate::surface::{Attr, AttrValue, Surface};

pub const DISPLAY_NAME_ID: &str = "displayName";
pub const EMAIL_ID: &str = "email";
pub const EMAIL_OPT_IN_ID: &str = "emailOptIn";
pub const SETTINGS_MSG_ID: &str = "settingsMsg";

pub const SAVED_MESSAGE: &str = "Saved!";
/// How long the saved confirmation stays visible. Observable contract, not a
/// cosmetic detail.
pub const SAVED_MESSAGE_TIMEOUT: Duration = Duration::from_millis(1500);

/// Singleton user-preferences record. Serialized field names match the
/// stored JSON; missing fields default to empty/false.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub display_name: String,
    pub email: String,
    pub email_opt_in: bool,
}

/// Loads and saves the settings record; a save shows a transient "Saved!"
/// message that self-clears after [`SAVED_MESSAGE_TIMEOUT`].
#[derive(Debug)]
pub struct SettingsFormController {
    settings: Settings,
    message_expires_at: Option<Instant>,
}

impl SettingsFormController {
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let settings = match store.get(keys::SETTINGS) {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|error| {
                warn!(%error, "discarding malformed settings record");
                Settings::default()
            }),
            None => Settings::default(),
        };

        Self {
            settings,
            message_expires_at: None,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Populates the form field elements from the current record.
    pub fn populate(&self, surface: &mut dyn Surface) {
        surface.set_attr(
            DISPLAY_NAME_ID,
            Attr::Text,
            AttrValue::Text(self.settings.display_name.clone()),
        );
        surface.set_attr(
            EMAIL_ID,
            Attr::Text,
            AttrValue::Text(self.settings.email.clone()),
        );
        surface.set_attr(
            EMAIL_OPT_IN_ID,
            Attr::Checked,
            AttrValue::Flag(self.settings.email_opt_in),
        );
    }

    /// Trims string fields, fully overwrites the persisted record, and shows
    /// the transient saved confirmation.
    pub fn save(
        &mut self,
        values: Settings,
        now: Instant,
        store: &mut dyn KeyValueStore,
        surface: &mut dyn Surface,
    ) {
        self.settings = Settings {
            display_name: values.display_name.trim().to_string(),
            email: values.email.trim().to_string(),
            email_opt_in: values.email_opt_in,
        };

        match serde_json::to_string(&self.settings) {
            Ok(encoded) => {
                if let Err(error) = store.set(keys::SETTINGS, &encoded) {
                    warn!(%error, "failed to persist settings, continuing with in-memory state");
                }
            }
            Err(error) => warn!(%error, "failed to encode settings"),
        }

        self.populate(surface);
        surface.set_attr(
            SETTINGS_MSG_ID,
            Attr::Text,
            AttrValue::Text(SAVED_MESSAGE.to_string()),
        );
        self.message_expires_at = Some(now + SAVED_MESSAGE_TIMEOUT);
    }

    /// Clears the saved confirmation once its timeout has elapsed. Driven by
    /// the front-end event loop.
    pub fn tick(&mut self, now: Instant, surface: &mut dyn Surface) {
        if let Some(deadline) = self.message_expires_at
            && now >= deadline
        {
            surface.set_attr(SETTINGS_MSG_ID, Attr::Text, AttrValue::Text(String::new()));
            self.message_expires_at = None;
        }
    }

    pub fn message_pending(&self) -> bool {
        self.message_expires_at.is_some()
    }
}
