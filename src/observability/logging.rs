//! Structured logging.
//!
//! # Design Decisions
//! - Uses the tracing crate for structured events
//! - Installed before settings load, so loader events are not lost
//! - `RUST_LOG` wins; otherwise the level follows the `DEBUG` setting,
//!   applied through a reloadable filter once settings exist

use tracing::Subscriber;
use tracing_subscriber::{
    layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter, Registry,
};

/// Filter directives used when `RUST_LOG` is not set.
pub fn default_directives(debug: bool) -> &'static str {
    if debug {
        "gencli_service=debug,tower_http=debug"
    } else {
        "gencli_service=info,tower_http=info"
    }
}

/// Adjusts the installed filter after startup.
pub struct LoggingHandle {
    filter: reload::Handle<EnvFilter, Registry>,
    from_env: bool,
}

impl LoggingHandle {
    /// Switch to the `DEBUG`-driven default directives. Leaves a
    /// `RUST_LOG` filter untouched.
    pub fn set_debug(&self, debug: bool) -> Result<(), reload::Error> {
        if self.from_env {
            return Ok(());
        }
        self.filter.reload(EnvFilter::new(default_directives(debug)))
    }
}

fn build_subscriber(
    filter: EnvFilter,
    from_env: bool,
) -> (impl Subscriber + Send + Sync + 'static, LoggingHandle) {
    let (filter, handle) = reload::Layer::new(filter);
    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer());
    (
        subscriber,
        LoggingHandle {
            filter: handle,
            from_env,
        },
    )
}

/// Install the global subscriber at info level (or `RUST_LOG`).
/// Fails if one is already installed.
pub fn init_logging() -> Result<LoggingHandle, tracing_subscriber::util::TryInitError> {
    let (filter, from_env) = match EnvFilter::try_from_default_env() {
        Ok(filter) => (filter, true),
        Err(_) => (EnvFilter::new(default_directives(false)), false),
    };
    let (subscriber, handle) = build_subscriber(filter, from_env);
    subscriber.try_init()?;
    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::Level;

    #[test]
    fn test_debug_raises_verbosity() {
        assert!(default_directives(true).contains("gencli_service=debug"));
        assert!(default_directives(false).contains("gencli_service=info"));
    }

    #[test]
    fn test_directives_parse() {
        for debug in [true, false] {
            assert!(EnvFilter::try_new(default_directives(debug)).is_ok());
        }
    }

    #[test]
    fn test_set_debug_reloads_filter() {
        let (subscriber, handle) =
            build_subscriber(EnvFilter::new(default_directives(false)), false);

        tracing::subscriber::with_default(subscriber, || {
            assert!(tracing::enabled!(Level::INFO));
            assert!(!tracing::enabled!(Level::DEBUG));

            handle.set_debug(true).unwrap();
            assert!(tracing::enabled!(Level::DEBUG));
        });
    }

    #[test]
    fn test_set_debug_keeps_env_filter() {
        let (subscriber, handle) = build_subscriber(EnvFilter::new("gencli_service=warn"), true);

        tracing::subscriber::with_default(subscriber, || {
            handle.set_debug(true).unwrap();
            assert!(!tracing::enabled!(Level::INFO));
        });
    }
}
