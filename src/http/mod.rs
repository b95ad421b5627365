//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing, timeout)
//!     → health.rs (GET /health)
//!     → JSON response to client
//! ```

pub mod health;
pub mod server;

pub use health::HealthResponse;
pub use server::{create_app, AppState, Application};
