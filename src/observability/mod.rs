//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! config, lifecycle, http
//!     → tracing events and spans (request ID on every request span)
//!     → logging.rs (reloadable EnvFilter + fmt layer)
//!     → stdout
//! ```

pub mod logging;
