//! Startup announcements.
//!
//! # Design Decisions
//! - Fail fast: settings are validated before any hook runs
//! - Hooks run in order, before the listener accepts traffic

use crate::config::Settings;

/// Startup hook: name the application and the environment it runs in.
pub fn log_startup(settings: &Settings) {
    tracing::info!(
        app_name = %settings.app_name,
        environment = %settings.environment,
        debug = settings.debug,
        "Starting {} in {} mode",
        settings.app_name,
        settings.environment
    );
}
