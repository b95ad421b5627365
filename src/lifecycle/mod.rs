//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Settings loaded → startup hooks → listener starts accepting
//!
//! Shutdown (shutdown.rs):
//!     Signal received → stop accepting → drain requests → shutdown hooks
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → trigger graceful shutdown
//! ```
//!
//! # Design Decisions
//! - Two explicit callback lists instead of one hook suspended mid-way
//! - `state.rs` enforces the order; each phase runs at most once

pub mod shutdown;
pub mod signals;
pub mod startup;
pub mod state;

pub use shutdown::Shutdown;
pub use state::{Lifecycle, LifecycleError, LifecycleState};
