//! Terminal dashboard: tabbed panels, a persisted task list, a settings
//! form, and a static activity table, all backed by a string key-value store.

pub mod activity;
pub mod app;
pub mod cli;
pub mod config;
pub mod logging;
pub mod store;
pub mod surface;
pub mod theme;
pub mod tui;
