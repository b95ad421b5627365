//! Configuration validation.
//!
//! # Responsibilities
//! - Coerce raw environment strings into typed values
//! - Describe every missing or malformed field
//!
//! # Design Decisions
//! - Returns all validation issues, not just the first
//! - Coercion functions are pure: `&str → Result<T, reason>`
//! - Reasons never echo the offending value (it may be a secret)

use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;

/// A single problem found while loading settings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigIssue {
    #[error("{field}: field required")]
    Missing { field: &'static str },

    #[error("{field}: {reason}")]
    Malformed { field: &'static str, reason: String },

    #[error("env file {}: {reason}", .path.display())]
    EnvFile { path: PathBuf, reason: String },
}

impl ConfigIssue {
    /// Field this issue refers to, if any.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            ConfigIssue::Missing { field } | ConfigIssue::Malformed { field, .. } => Some(*field),
            ConfigIssue::EnvFile { .. } => None,
        }
    }
}

/// The configuration error: every issue found during one load attempt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid configuration ({} issue{}): {}", .issues.len(), plural(.issues.len()), IssueList(.issues))]
pub struct ConfigError {
    issues: Vec<ConfigIssue>,
}

impl ConfigError {
    pub(crate) fn new(issues: Vec<ConfigIssue>) -> Self {
        Self { issues }
    }

    /// All issues, in field declaration order.
    pub fn issues(&self) -> &[ConfigIssue] {
        &self.issues
    }

    /// True when some issue refers to `field`.
    pub fn mentions(&self, field: &str) -> bool {
        self.issues.iter().any(|issue| issue.field() == Some(field))
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 { "" } else { "s" }
}

struct IssueList<'a>(&'a [ConfigIssue]);

impl fmt::Display for IssueList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, issue) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", issue)?;
        }
        Ok(())
    }
}

/// Accepts the usual spellings: 1/0, true/false, t/f, yes/no, y/n, on/off.
pub fn parse_bool(raw: &str) -> Result<bool, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "t" | "yes" | "y" | "on" => Ok(true),
        "0" | "false" | "f" | "no" | "n" | "off" => Ok(false),
        _ => Err("input should be a valid boolean".to_string()),
    }
}

pub fn parse_port(raw: &str) -> Result<u16, String> {
    raw.trim()
        .parse::<u16>()
        .map_err(|e| format!("input should be a valid port number ({})", e))
}

pub fn parse_socket_addr(raw: &str) -> Result<SocketAddr, String> {
    raw.trim()
        .parse::<SocketAddr>()
        .map_err(|e| format!("input should be a socket address like 127.0.0.1:8000 ({})", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bool_spellings() {
        for raw in ["1", "true", "True", "YES", "y", "on", " t "] {
            assert_eq!(parse_bool(raw), Ok(true), "{raw}");
        }
        for raw in ["0", "false", "FALSE", "no", "n", "off", "f"] {
            assert_eq!(parse_bool(raw), Ok(false), "{raw}");
        }
        assert!(parse_bool("maybe").is_err());
        assert!(parse_bool("").is_err());
    }

    #[test]
    fn test_port_bounds() {
        assert_eq!(parse_port("5432"), Ok(5432));
        assert_eq!(parse_port(" 1433\n"), Ok(1433));
        assert!(parse_port("65536").is_err());
        assert!(parse_port("-1").is_err());
        assert!(parse_port("abc").is_err());
    }

    #[test]
    fn test_socket_addr() {
        assert_eq!(
            parse_socket_addr("0.0.0.0:9000").unwrap(),
            "0.0.0.0:9000".parse::<SocketAddr>().unwrap()
        );
        assert!(parse_socket_addr("localhost").is_err());
    }

    #[test]
    fn test_error_lists_every_issue() {
        let err = ConfigError::new(vec![
            ConfigIssue::Missing { field: "PG_DB" },
            ConfigIssue::Malformed { field: "PG_PORT", reason: "bad".into() },
        ]);
        let message = err.to_string();
        assert!(message.starts_with("invalid configuration (2 issues)"));
        assert!(message.contains("PG_DB: field required"));
        assert!(message.contains("PG_PORT: bad"));
        assert!(err.mentions("PG_DB"));
        assert!(!err.mentions("MS_DB"));
    }
}
