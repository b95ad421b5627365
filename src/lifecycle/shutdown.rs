//! Shutdown coordination.

use std::future::Future;

use tokio::sync::broadcast;

use crate::config::Settings;

/// Coordinator for graceful shutdown.
///
/// Provides a broadcast channel that long-running tasks (and tests driving
/// the server) can subscribe to.
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Future resolving once `trigger` is called, for
    /// [`crate::http::Application::serve`].
    pub fn wait(&self) -> impl Future<Output = ()> + Send + 'static {
        let mut rx = self.subscribe();
        async move {
            // A dropped coordinator also means shutdown.
            let _ = rx.recv().await;
        }
    }

    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Shutdown hook: announce that the service is going away.
pub fn log_shutdown(settings: &Settings) {
    tracing::info!(
        app_name = %settings.app_name,
        "Shutting down {}",
        settings.app_name
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_wait_resolves_on_trigger() {
        let shutdown = Shutdown::new();
        let waiter = tokio::spawn(shutdown.wait());
        shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("wait() did not resolve")
            .unwrap();
    }

    #[tokio::test]
    async fn test_wait_resolves_when_coordinator_dropped() {
        let shutdown = Shutdown::new();
        let waiter = shutdown.wait();
        drop(shutdown);
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .expect("wait() did not resolve");
    }
}
