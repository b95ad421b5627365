//! Application lifecycle state machine.
//!
//! ```text
//! Uninitialized → Starting → Running → Stopping → Terminated
//!                     │                               ▲
//!                     └──── startup hook failed ──────┘
//! ```
//!
//! Transitions are strictly sequential. Startup hooks run while `Starting`,
//! shutdown hooks while `Stopping`; each list runs at most once.

use std::fmt;
use tokio::sync::watch;

/// Phase of the application lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Uninitialized,
    Starting,
    Running,
    Stopping,
    Terminated,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleState::Uninitialized => "uninitialized",
            LifecycleState::Starting => "starting",
            LifecycleState::Running => "running",
            LifecycleState::Stopping => "stopping",
            LifecycleState::Terminated => "terminated",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("invalid lifecycle transition from {from} to {to}")]
    InvalidTransition {
        from: LifecycleState,
        to: LifecycleState,
    },

    #[error("startup hook failed: {0}")]
    Hook(String),
}

pub type StartupHook = Box<dyn FnOnce() -> Result<(), LifecycleError> + Send>;
pub type ShutdownHook = Box<dyn FnOnce() + Send>;

/// Startup/shutdown callbacks plus the state they move through.
pub struct Lifecycle {
    state: watch::Sender<LifecycleState>,
    startup_hooks: Vec<StartupHook>,
    shutdown_hooks: Vec<ShutdownHook>,
}

impl Lifecycle {
    pub fn new() -> Self {
        let (state, _) = watch::channel(LifecycleState::Uninitialized);
        Self {
            state,
            startup_hooks: Vec::new(),
            shutdown_hooks: Vec::new(),
        }
    }

    /// Register a callback run before the server accepts connections.
    /// An error aborts startup.
    pub fn on_startup<F>(&mut self, hook: F) -> &mut Self
    where
        F: FnOnce() -> Result<(), LifecycleError> + Send + 'static,
    {
        self.startup_hooks.push(Box::new(hook));
        self
    }

    /// Register a callback run after the server stops.
    pub fn on_shutdown<F>(&mut self, hook: F) -> &mut Self
    where
        F: FnOnce() + Send + 'static,
    {
        self.shutdown_hooks.push(Box::new(hook));
        self
    }

    pub fn state(&self) -> LifecycleState {
        *self.state.borrow()
    }

    /// Watch state changes (e.g. wait until `Running`).
    pub fn subscribe(&self) -> watch::Receiver<LifecycleState> {
        self.state.subscribe()
    }

    /// `Uninitialized → Starting → Running`, running startup hooks in
    /// registration order.
    pub fn start(&mut self) -> Result<(), LifecycleError> {
        self.transition(LifecycleState::Uninitialized, LifecycleState::Starting)?;

        for hook in std::mem::take(&mut self.startup_hooks) {
            if let Err(e) = hook() {
                tracing::error!(error = %e, "Startup aborted");
                // Nothing started, so there is nothing to shut down.
                self.shutdown_hooks.clear();
                self.state.send_replace(LifecycleState::Terminated);
                return Err(e);
            }
        }

        self.transition(LifecycleState::Starting, LifecycleState::Running)
    }

    /// `Running → Stopping → Terminated`, running shutdown hooks in
    /// registration order.
    pub fn stop(&mut self) -> Result<(), LifecycleError> {
        self.transition(LifecycleState::Running, LifecycleState::Stopping)?;

        for hook in std::mem::take(&mut self.shutdown_hooks) {
            hook();
        }

        self.transition(LifecycleState::Stopping, LifecycleState::Terminated)
    }

    fn transition(
        &self,
        expected: LifecycleState,
        to: LifecycleState,
    ) -> Result<(), LifecycleError> {
        let from = self.state();
        if from != expected {
            return Err(LifecycleError::InvalidTransition { from, to });
        }
        tracing::debug!(%from, %to, "Lifecycle transition");
        self.state.send_replace(to);
        Ok(())
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}
