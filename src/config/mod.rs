//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! .env file (optional, UTF-8)  ─┐
//! process environment          ─┴→ loader.rs (EnvSource, layered: env > file)
//!     → validation.rs (coercion, every issue collected)
//!     → Settings (validated, immutable)
//!     → cached in SettingsProvider, shared via Arc
//! ```
//!
//! # Design Decisions
//! - Settings are immutable once loaded; nothing reloads them
//! - Optional fields have declared defaults; required fields have none
//! - A load either yields complete settings or a `ConfigError` listing
//!   every problem

mod dsn;
pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{EnvSource, SettingsProvider, DEFAULT_ENV_FILE};
pub use schema::Settings;
pub use validation::{ConfigError, ConfigIssue};
