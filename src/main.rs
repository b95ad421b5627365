//! gencli-service
//!
//! ```text
//!   process env ─┐
//!   .env file  ──┴─▶ SettingsProvider ──▶ Arc<Settings>
//!                                              │
//!                                              ▼
//!                        create_app ──▶ Application
//!                                          │  startup hooks
//!      SIGINT/SIGTERM ──────────────▶      │  serve GET /health
//!                                          │  shutdown hooks
//!                                          ▼
//!                                        exit
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use gencli_service::config::{SettingsProvider, DEFAULT_ENV_FILE};
use gencli_service::http::create_app;
use gencli_service::lifecycle::signals::shutdown_signal;
use gencli_service::observability::logging::init_logging;

#[derive(Parser)]
#[command(name = "gencli-service")]
#[command(about = "Microservice bootstrap with environment-driven settings", long_about = None)]
struct Cli {
    /// Env file overlaid under the process environment.
    #[arg(long, default_value = DEFAULT_ENV_FILE)]
    env_file: PathBuf,

    /// Bind address, overriding LISTEN_ADDR.
    #[arg(long)]
    listen: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let logging = init_logging()?;

    let provider = SettingsProvider::from_env_file(&cli.env_file);
    let settings = match provider.get_settings() {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!(env_file = %cli.env_file.display(), error = %e, "Startup aborted");
            return Err(e.into());
        }
    };

    logging.set_debug(settings.debug)?;
    tracing::debug!(settings = ?settings, "Effective settings");

    let addr = cli.listen.unwrap_or(settings.listen_addr);
    let app = create_app(settings);

    let listener = TcpListener::bind(addr).await?;
    app.serve(listener, shutdown_signal()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
