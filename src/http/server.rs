//! HTTP server setup and application bootstrap.
//!
//! # Responsibilities
//! - Create the Axum router with all handlers
//! - Wire up middleware (request ID, tracing, timeout)
//! - Register the startup/shutdown lifecycle hooks
//! - Serve on a listener until the shutdown future resolves

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::Request,
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Settings;
use crate::error::AppError;
use crate::http::health::health_check;
use crate::lifecycle::{shutdown, startup, Lifecycle};

/// Upper bound on a single request.
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
}

/// The web application: router, lifecycle hooks and the settings they share.
pub struct Application {
    title: String,
    debug: bool,
    settings: Arc<Settings>,
    router: Router,
    lifecycle: Lifecycle,
}

/// Build the application from already-validated settings.
///
/// Registers the startup/shutdown log hooks and `GET /health`.
pub fn create_app(settings: Arc<Settings>) -> Application {
    let mut lifecycle = Lifecycle::new();

    let on_start = settings.clone();
    let on_stop = settings.clone();
    lifecycle
        .on_startup(move || {
            startup::log_startup(&on_start);
            Ok(())
        })
        .on_shutdown(move || shutdown::log_shutdown(&on_stop));

    let state = AppState {
        settings: settings.clone(),
    };

    Application {
        title: settings.app_name.clone(),
        debug: settings.debug,
        router: build_router(state),
        settings,
        lifecycle,
    }
}

/// Build the Axum router with all middleware layers.
#[allow(deprecated)]
fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                    let request_id = request
                        .headers()
                        .get("x-request-id")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("unknown");
                    tracing::debug_span!(
                        "request",
                        request_id = %request_id,
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                }))
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(TimeoutLayer::new(Duration::from_secs(REQUEST_TIMEOUT_SECS))),
        )
}

impl Application {
    /// Display name (`APP_NAME`).
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Whether `DEBUG` was set.
    pub fn debug(&self) -> bool {
        self.debug
    }

    pub fn settings(&self) -> &Arc<Settings> {
        &self.settings
    }

    pub fn lifecycle(&self) -> &Lifecycle {
        &self.lifecycle
    }

    /// Register additional hooks before serving.
    pub fn lifecycle_mut(&mut self) -> &mut Lifecycle {
        &mut self.lifecycle
    }

    /// Run startup hooks, serve until `shutdown` resolves, drain in-flight
    /// requests, then run shutdown hooks.
    pub async fn serve<F>(mut self, listener: TcpListener, shutdown: F) -> Result<(), AppError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;

        self.lifecycle.start()?;

        tracing::info!(
            address = %addr,
            title = %self.title,
            debug = self.debug,
            "HTTP server listening"
        );

        let served = axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await;

        tracing::info!("HTTP server stopped");
        self.lifecycle.stop()?;

        served?;
        Ok(())
    }
}
