//! Error types for Nobu.
//!
//! Uses `thiserror` for ergonomic error definitions. Per-port failures never
//! surface through these types to callers of the scan stream; they are
//! classified into a [`PortState`](crate::scanner::PortState) instead.

use crate::types::{PortError, TargetError};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors raised by a single probe or host lookup.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("port {0} is out of valid range (1-65535)")]
    InvalidPort(u16),

    #[error("cannot resolve host '{host}': {reason}")]
    HostResolution { host: String, reason: String },
}

/// Result type alias for scan operations.
pub type ScanResult<T> = Result<T, ScanError>;

/// Configuration and request validation errors.
///
/// These are raised once, before any network activity starts.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("at least one target is required")]
    NoTargets,

    #[error("at least one port is required")]
    NoPorts,

    #[error("concurrency must be between 1 and {max}, got {got}")]
    InvalidConcurrency { got: usize, max: usize },

    #[error("timeout must be positive, got {0:?}")]
    InvalidTimeout(Duration),

    #[error(transparent)]
    Port(#[from] PortError),

    #[error(transparent)]
    Target(#[from] TargetError),

    #[error("unknown profile '{0}'")]
    UnknownProfile(String),

    #[error("could not determine the configuration directory")]
    DirectoryNotFound,

    #[error("failed to read {path}: {reason}")]
    ReadFailed { path: PathBuf, reason: String },

    #[error("invalid settings file: {0}")]
    InvalidFormat(String),
}

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Top-level error for the command-line front end.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Output(#[from] anyhow::Error),
}

/// Result type alias for CLI operations.
pub type CliResult<T> = Result<T, CliError>;
