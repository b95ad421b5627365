//! Configuration loading from the environment.
//!
//! Sources, highest precedence first: process environment, env file,
//! declared defaults.

use std::collections::{HashMap, HashSet};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::config::schema::{self, keys, Settings};
use crate::config::validation::{
    parse_bool, parse_port, parse_socket_addr, ConfigError, ConfigIssue,
};

/// Default env file, relative to the working directory.
pub const DEFAULT_ENV_FILE: &str = ".env";

/// Raw key/value view of every configuration source, already layered.
#[derive(Debug, Clone, Default)]
pub struct EnvSource {
    values: HashMap<String, String>,
    /// Keys whose process value is not valid Unicode.
    non_unicode: HashSet<String>,
    /// Problems reading the env file.
    file_issues: Vec<ConfigIssue>,
}

impl EnvSource {
    /// Build a source from explicit pairs; later pairs win.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            ..Self::default()
        }
    }

    /// Read the env file (if present) and overlay the process environment.
    pub fn from_process(env_file: &Path) -> Self {
        Self::layered(env_file, std::env::vars_os())
    }

    /// Env file first, then `vars` on top of it.
    pub fn layered<I>(env_file: &Path, vars: I) -> Self
    where
        I: IntoIterator<Item = (OsString, OsString)>,
    {
        let mut source = Self::default();
        source.overlay_env_file(env_file);
        source.overlay_vars(vars);
        source
    }

    /// Raw value for `key`, if set by any source.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    fn overlay_env_file(&mut self, path: &Path) {
        let iter = match dotenvy::from_path_iter(path) {
            Ok(iter) => iter,
            Err(e) if e.not_found() => {
                tracing::debug!(path = %path.display(), "No env file, using process environment only");
                return;
            }
            Err(e) => {
                self.file_issues.push(ConfigIssue::EnvFile {
                    path: path.to_path_buf(),
                    reason: env_file_reason(&e),
                });
                return;
            }
        };

        let mut loaded = 0usize;
        for item in iter {
            match item {
                Ok((key, value)) => {
                    self.values.insert(key, value);
                    loaded += 1;
                }
                Err(e) => {
                    self.file_issues.push(ConfigIssue::EnvFile {
                        path: path.to_path_buf(),
                        reason: env_file_reason(&e),
                    });
                    // Line parse errors leave the reader positioned past the
                    // bad line, but I/O errors would repeat forever.
                    if matches!(e, dotenvy::Error::Io(_)) {
                        break;
                    }
                }
            }
        }

        tracing::debug!(path = %path.display(), entries = loaded, "Env file read");
    }

    fn overlay_vars<I>(&mut self, vars: I)
    where
        I: IntoIterator<Item = (OsString, OsString)>,
    {
        for (key, value) in vars {
            // Keys we cannot name are keys we never look up.
            let Ok(key) = key.into_string() else { continue };
            match value.into_string() {
                Ok(value) => {
                    self.non_unicode.remove(&key);
                    self.values.insert(key, value);
                }
                Err(_) => {
                    self.values.remove(&key);
                    self.non_unicode.insert(key);
                }
            }
        }
    }
}

/// Describe an env file error without repeating file contents.
///
/// `LineParse` carries the raw line, which may hold a secret.
fn env_file_reason(e: &dotenvy::Error) -> String {
    match e {
        dotenvy::Error::LineParse(_, index) => {
            format!("could not parse line (error at index {})", index)
        }
        other => other.to_string(),
    }
}

/// Reads fields one by one, recording issues instead of stopping at the first.
struct FieldReader<'a> {
    source: &'a EnvSource,
    issues: Vec<ConfigIssue>,
}

impl<'a> FieldReader<'a> {
    fn new(source: &'a EnvSource) -> Self {
        Self {
            source,
            issues: source.file_issues.clone(),
        }
    }

    fn raw(&mut self, field: &'static str) -> Option<&'a str> {
        if self.source.non_unicode.contains(field) {
            self.issues.push(ConfigIssue::Malformed {
                field,
                reason: "value is not valid unicode".to_string(),
            });
            return None;
        }
        self.source.get(field)
    }

    fn required(&mut self, field: &'static str) -> String {
        let unicode_ok = !self.source.non_unicode.contains(field);
        match self.raw(field) {
            Some(value) => value.to_string(),
            None => {
                if unicode_ok {
                    self.issues.push(ConfigIssue::Missing { field });
                }
                String::new()
            }
        }
    }

    fn string_or(&mut self, field: &'static str, default: &str) -> String {
        self.raw(field).unwrap_or(default).to_string()
    }

    fn parsed_or<T>(
        &mut self,
        field: &'static str,
        default: T,
        parse: fn(&str) -> Result<T, String>,
    ) -> T {
        let Some(raw) = self.raw(field) else {
            return default;
        };
        match parse(raw) {
            Ok(value) => value,
            Err(reason) => {
                self.issues.push(ConfigIssue::Malformed { field, reason });
                default
            }
        }
    }
}

impl Settings {
    /// Validate `source` into settings, reporting every problem at once.
    pub fn from_source(source: &EnvSource) -> Result<Self, ConfigError> {
        let mut r = FieldReader::new(source);

        let app_name = r.string_or(keys::APP_NAME, schema::DEFAULT_APP_NAME);
        let environment = r.string_or(keys::ENVIRONMENT, schema::DEFAULT_ENVIRONMENT);
        let debug = r.parsed_or(keys::DEBUG, false, parse_bool);

        let pg_user = r.required(keys::PG_USER);
        let pg_password = r.required(keys::PG_PASSWORD);
        let pg_host = r.required(keys::PG_HOST);
        let pg_port = r.parsed_or(keys::PG_PORT, schema::DEFAULT_PG_PORT, parse_port);
        let pg_db = r.required(keys::PG_DB);

        let ms_user = r.required(keys::MS_USER);
        let ms_password = r.required(keys::MS_PASSWORD);
        let ms_host = r.required(keys::MS_HOST);
        let ms_port = r.parsed_or(keys::MS_PORT, schema::DEFAULT_MS_PORT, parse_port);
        let ms_db = r.required(keys::MS_DB);

        let rabbitmq_url = r.string_or(keys::RABBITMQ_URL, schema::DEFAULT_RABBITMQ_URL);
        let redis_url = r.string_or(keys::REDIS_URL, schema::DEFAULT_REDIS_URL);
        let meilisearch_url = r.string_or(keys::MEILISEARCH_URL, schema::DEFAULT_MEILISEARCH_URL);
        let meilisearch_master_key = r.required(keys::MEILISEARCH_MASTER_KEY);

        let listen_addr =
            r.parsed_or(keys::LISTEN_ADDR, schema::DEFAULT_LISTEN_ADDR, parse_socket_addr);

        if !r.issues.is_empty() {
            return Err(ConfigError::new(r.issues));
        }

        Ok(Settings {
            app_name,
            environment,
            debug,
            pg_user,
            pg_password,
            pg_host,
            pg_port,
            pg_db,
            ms_user,
            ms_password,
            ms_host,
            ms_port,
            ms_db,
            rabbitmq_url,
            redis_url,
            meilisearch_url,
            meilisearch_master_key,
            listen_addr,
        })
    }
}

type SourceLoader = Box<dyn Fn() -> EnvSource + Send + Sync>;

/// Loads settings once and hands out the same instance afterwards.
///
/// One provider is created at process entry and the resulting
/// `Arc<Settings>` is passed to whatever needs it.
pub struct SettingsProvider {
    loader: SourceLoader,
    cell: OnceCell<Arc<Settings>>,
}

impl SettingsProvider {
    /// Provider reading the process environment over `env_file`.
    pub fn from_env_file(env_file: impl Into<PathBuf>) -> Self {
        let env_file = env_file.into();
        Self::with_loader(move || EnvSource::from_process(&env_file))
    }

    /// Provider reading from a custom source.
    pub fn with_loader<F>(loader: F) -> Self
    where
        F: Fn() -> EnvSource + Send + Sync + 'static,
    {
        Self {
            loader: Box::new(loader),
            cell: OnceCell::new(),
        }
    }

    /// Return the settings, loading and validating them on first call.
    ///
    /// A failed load is not cached; callers are expected to abort startup.
    pub fn get_settings(&self) -> Result<Arc<Settings>, ConfigError> {
        self.cell
            .get_or_try_init(|| {
                let source = (self.loader)();
                let settings = Settings::from_source(&source).map_err(|e| {
                    tracing::error!(issues = e.issues().len(), error = %e, "Configuration rejected");
                    e
                })?;
                tracing::info!(
                    app_name = %settings.app_name,
                    environment = %settings.environment,
                    "Configuration loaded"
                );
                Ok(Arc::new(settings))
            })
            .map(Arc::clone)
    }

    /// True once settings have been loaded successfully.
    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl Default for SettingsProvider {
    fn default() -> Self {
        Self::from_env_file(DEFAULT_ENV_FILE)
    }
}
