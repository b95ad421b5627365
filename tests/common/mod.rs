//! Shared utilities for integration testing.

use std::fmt;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

use gencli_service::config::{EnvSource, Settings};
use gencli_service::lifecycle::{LifecycleState, Shutdown};
use gencli_service::{AppError, Application};

const REQUIRED: [(&str, &str); 9] = [
    ("PG_USER", "u"),
    ("PG_PASSWORD", "p"),
    ("PG_HOST", "h"),
    ("PG_DB", "d"),
    ("MS_USER", "u"),
    ("MS_PASSWORD", "p"),
    ("MS_HOST", "h"),
    ("MS_DB", "d"),
    ("MEILISEARCH_MASTER_KEY", "master-key"),
];

/// Every required field plus `extra` (which wins on conflicts).
pub fn source_with(extra: &[(&str, &str)]) -> EnvSource {
    let mut pairs: Vec<(&str, &str)> = REQUIRED.to_vec();
    pairs.extend_from_slice(extra);
    EnvSource::from_pairs(pairs)
}

pub fn settings_with(extra: &[(&str, &str)]) -> Arc<Settings> {
    Arc::new(Settings::from_source(&source_with(extra)).expect("valid test settings"))
}

/// An application serving on an ephemeral port.
#[allow(dead_code)]
pub struct RunningApp {
    pub addr: SocketAddr,
    pub state: watch::Receiver<LifecycleState>,
    shutdown: Shutdown,
    handle: JoinHandle<Result<(), AppError>>,
}

impl RunningApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Trigger shutdown and wait for `serve` to return.
    pub async fn stop(self) -> Result<(), AppError> {
        self.shutdown.trigger();
        self.handle.await.expect("server task panicked")
    }
}

/// Start `app` and wait until its lifecycle reports `Running`.
pub async fn spawn_app(app: Application) -> RunningApp {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let mut state = app.lifecycle().subscribe();
    let shutdown = Shutdown::new();

    let handle = tokio::spawn(app.serve(listener, shutdown.wait()));

    state
        .wait_for(|s| *s == LifecycleState::Running)
        .await
        .expect("application never reached Running");

    RunningApp {
        addr,
        state,
        shutdown,
        handle,
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// Records the message of every event seen by the current subscriber.
#[allow(dead_code)]
#[derive(Clone, Default)]
pub struct CapturedMessages(Arc<Mutex<Vec<String>>>);

#[allow(dead_code)]
impl CapturedMessages {
    pub fn messages(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, message: &str) -> usize {
        self.messages().iter().filter(|m| *m == message).count()
    }

    pub fn position(&self, message: &str) -> Option<usize> {
        self.messages().iter().position(|m| m == message)
    }
}

impl<S: Subscriber> Layer<S> for CapturedMessages {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor(None);
        event.record(&mut visitor);
        if let Some(message) = visitor.0 {
            self.0.lock().unwrap().push(message);
        }
    }
}

struct MessageVisitor(Option<String>);

impl Visit for MessageVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.0 = Some(format!("{:?}", value));
        }
    }
}
