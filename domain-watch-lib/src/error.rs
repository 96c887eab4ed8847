//! Error handling for lookups, discovery and registry imports.
//!
//! This module defines one error type covering every way the library can
//! fail, from unreachable registries to unreadable checkpoints, plus a
//! coarse [`FailureKind`] classification callers use to decide between
//! falling back, counting a per-item failure, or aborting a run.

use std::fmt;

/// Main error type for domain-watch operations.
#[derive(Debug, Clone)]
pub enum DomainWatchError {
    /// Invalid domain or TLD format
    InvalidDomain { domain: String, reason: String },

    /// Network-related errors (connection, DNS, etc.)
    NetworkError {
        message: String,
        source: Option<String>,
    },

    /// RDAP protocol specific errors
    RdapError {
        domain: String,
        message: String,
        status_code: Option<u16>,
    },

    /// WHOIS protocol specific errors
    WhoisError { server: String, message: String },

    /// IANA bootstrap / registry source failures
    BootstrapError { source: String, message: String },

    /// Undecodable upstream payloads (JSON, HTML where JSON was expected)
    ParseError {
        message: String,
        content: Option<String>,
    },

    /// Configuration errors (invalid settings, etc.)
    ConfigError { message: String },

    /// File I/O errors when reading config or store documents
    FileError { path: String, message: String },

    /// Timeout errors when operations take too long
    Timeout {
        operation: String,
        duration: std::time::Duration,
    },

    /// Directory or import-log store failures
    StorageError { message: String },

    /// Import checkpoint could not be read back or does not match its log
    CheckpointError { log_id: i64, message: String },

    /// Generic internal errors that don't fit other categories
    Internal { message: String },
}

/// Coarse classification of a [`DomainWatchError`].
///
/// "Not found" answers are never errors (they surface as
/// [`crate::LookupOutcome::Available`]) so they have no kind here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Connect, DNS or timeout failure. Soft: triggers fallback.
    Transport,
    /// Non-200 status, undecodable body, HTML where JSON was expected. Soft.
    Protocol,
    /// Bad caller input.
    Input,
    /// Store, checkpoint, config or internal failure. Aborts the current step.
    Pipeline,
}

impl DomainWatchError {
    /// Create a new invalid domain error.
    pub fn invalid_domain<D: Into<String>, R: Into<String>>(domain: D, reason: R) -> Self {
        Self::InvalidDomain {
            domain: domain.into(),
            reason: reason.into(),
        }
    }

    /// Create a new network error.
    pub fn network<M: Into<String>>(message: M) -> Self {
        Self::NetworkError {
            message: message.into(),
            source: None,
        }
    }

    /// Create a new network error with source information.
    pub fn network_with_source<M: Into<String>, S: Into<String>>(message: M, source: S) -> Self {
        Self::NetworkError {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Create a new RDAP error.
    pub fn rdap<D: Into<String>, M: Into<String>>(domain: D, message: M) -> Self {
        Self::RdapError {
            domain: domain.into(),
            message: message.into(),
            status_code: None,
        }
    }

    /// Create a new RDAP error with HTTP status code.
    pub fn rdap_with_status<D: Into<String>, M: Into<String>>(
        domain: D,
        message: M,
        status_code: u16,
    ) -> Self {
        Self::RdapError {
            domain: domain.into(),
            message: message.into(),
            status_code: Some(status_code),
        }
    }

    /// Create a new WHOIS error.
    pub fn whois<S: Into<String>, M: Into<String>>(server: S, message: M) -> Self {
        Self::WhoisError {
            server: server.into(),
            message: message.into(),
        }
    }

    /// Create a new bootstrap/source error.
    pub fn bootstrap<S: Into<String>, M: Into<String>>(source: S, message: M) -> Self {
        Self::BootstrapError {
            source: source.into(),
            message: message.into(),
        }
    }

    /// Create a new parse error.
    pub fn parse<M: Into<String>>(message: M) -> Self {
        Self::ParseError {
            message: message.into(),
            content: None,
        }
    }

    /// Create a new timeout error.
    pub fn timeout<O: Into<String>>(operation: O, duration: std::time::Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    /// Create a new configuration error.
    pub fn config<M: Into<String>>(message: M) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create a new storage error.
    pub fn storage<M: Into<String>>(message: M) -> Self {
        Self::StorageError {
            message: message.into(),
        }
    }

    /// Create a new checkpoint error.
    pub fn checkpoint<M: Into<String>>(log_id: i64, message: M) -> Self {
        Self::CheckpointError {
            log_id,
            message: message.into(),
        }
    }

    /// Create a new internal error.
    pub fn internal<M: Into<String>>(message: M) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Create a new file error.
    pub fn file_error<P: Into<String>, M: Into<String>>(path: P, message: M) -> Self {
        Self::FileError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Classify this error for fallback and counting decisions.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::NetworkError { .. } | Self::Timeout { .. } => FailureKind::Transport,
            Self::WhoisError { .. } => FailureKind::Transport,
            Self::RdapError { .. } | Self::BootstrapError { .. } | Self::ParseError { .. } => {
                FailureKind::Protocol
            }
            Self::InvalidDomain { .. } => FailureKind::Input,
            Self::ConfigError { .. }
            | Self::FileError { .. }
            | Self::StorageError { .. }
            | Self::CheckpointError { .. }
            | Self::Internal { .. } => FailureKind::Pipeline,
        }
    }

    /// Whether a caller may fall back to the next source after this error.
    pub fn is_soft(&self) -> bool {
        matches!(self.kind(), FailureKind::Transport | FailureKind::Protocol)
    }

    /// Check if this error suggests the request should be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::NetworkError { .. }
                | Self::Timeout { .. }
                | Self::RdapError {
                    status_code: Some(500..=599),
                    ..
                }
                | Self::BootstrapError { .. }
        )
    }
}

impl fmt::Display for DomainWatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDomain { domain, reason } => {
                write!(f, "Invalid domain '{}': {}", domain, reason)
            }
            Self::NetworkError { message, source } => {
                if let Some(source) = source {
                    write!(f, "Network error: {} (source: {})", message, source)
                } else {
                    write!(f, "Network error: {}", message)
                }
            }
            Self::RdapError {
                domain,
                message,
                status_code,
            } => {
                if let Some(code) = status_code {
                    write!(f, "RDAP error for '{}' (HTTP {}): {}", domain, code, message)
                } else {
                    write!(f, "RDAP error for '{}': {}", domain, message)
                }
            }
            Self::WhoisError { server, message } => {
                write!(f, "WHOIS error from '{}': {}", server, message)
            }
            Self::BootstrapError { source, message } => {
                write!(f, "Registry source error ({}): {}", source, message)
            }
            Self::ParseError { message, content: _ } => {
                write!(f, "Parse error: {}", message)
            }
            Self::ConfigError { message } => {
                write!(f, "Configuration error: {}", message)
            }
            Self::FileError { path, message } => {
                write!(f, "File error at '{}': {}", path, message)
            }
            Self::Timeout {
                operation,
                duration,
            } => {
                write!(f, "Timeout after {:?} during: {}", duration, operation)
            }
            Self::StorageError { message } => {
                write!(f, "Storage error: {}", message)
            }
            Self::CheckpointError { log_id, message } => {
                write!(f, "Checkpoint error for import log {}: {}", log_id, message)
            }
            Self::Internal { message } => {
                write!(f, "Internal error: {}", message)
            }
        }
    }
}

impl std::error::Error for DomainWatchError {}

// Implement From conversions for common error types
impl From<reqwest::Error> for DomainWatchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::timeout("HTTP request", std::time::Duration::from_secs(15))
        } else if err.is_connect() {
            Self::network_with_source("Connection failed", err.to_string())
        } else if err.is_decode() {
            Self::parse(format!("Undecodable response body: {}", err))
        } else {
            Self::network_with_source("HTTP request failed", err.to_string())
        }
    }
}

impl From<serde_json::Error> for DomainWatchError {
    fn from(err: serde_json::Error) -> Self {
        Self::ParseError {
            message: format!("JSON parsing failed: {}", err),
            content: None,
        }
    }
}

impl From<std::io::Error> for DomainWatchError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::TimedOut => {
                Self::timeout("I/O operation", std::time::Duration::from_secs(10))
            }
            std::io::ErrorKind::ConnectionRefused
            | std::io::ErrorKind::ConnectionReset
            | std::io::ErrorKind::ConnectionAborted
            | std::io::ErrorKind::NotConnected => {
                Self::network_with_source("Connection failed", err.to_string())
            }
            _ => Self::Internal {
                message: format!("I/O error: {}", err),
            },
        }
    }
}

impl From<regex::Error> for DomainWatchError {
    fn from(err: regex::Error) -> Self {
        Self::Internal {
            message: format!("Regex error: {}", err),
        }
    }
}

impl From<toml::de::Error> for DomainWatchError {
    fn from(err: toml::de::Error) -> Self {
        Self::ConfigError {
            message: format!("Failed to parse TOML configuration: {}", err),
        }
    }
}
