//! Web service bootstrap: environment-driven settings plus a liveness
//! endpoint wired into a startup/shutdown lifecycle.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::{Settings, SettingsProvider};
pub use error::AppError;
pub use http::{create_app, Application};
pub use lifecycle::Shutdown;
