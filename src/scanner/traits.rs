//! Scanner trait abstractions and the per-port result types.
//!
//! `Prober` is the seam between the scan engine and the network, so the
//! engine can be driven by any probing strategy (and by fakes in tests).

use crate::error::ScanResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::time::Duration;

/// Status of a scanned port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortState {
    /// Connection accepted.
    Open,
    /// Connection actively refused (RST received).
    Closed,
    /// No definitive answer: timeout, unreachable, or an ambiguous error.
    Filtered,
}

impl PortState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Filtered => "filtered",
        }
    }
}

impl fmt::Display for PortState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of probing a single port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeOutcome {
    /// The port number that was probed.
    pub port: u16,
    /// State determined by the probe.
    pub state: PortState,
    /// Well-known service label for the port, empty if unknown.
    pub service: String,
    /// Banner captured from the service, empty if not grabbed or not open.
    pub banner: String,
    /// Time from attempt start to outcome, including any banner grab.
    pub elapsed: Duration,
}

impl ProbeOutcome {
    /// Create a new outcome with no banner and zero elapsed time.
    pub fn new(port: u16, state: PortState, service: impl Into<String>) -> Self {
        Self {
            port,
            state,
            service: service.into(),
            banner: String::new(),
            elapsed: Duration::ZERO,
        }
    }

    /// Outcome for a probe that could not produce an answer of its own.
    pub fn filtered(port: u16) -> Self {
        Self::new(port, PortState::Filtered, crate::services::service_label(port))
    }

    pub fn with_banner(mut self, banner: String) -> Self {
        self.banner = banner;
        self
    }

    pub fn with_elapsed(mut self, elapsed: Duration) -> Self {
        self.elapsed = elapsed;
        self
    }

    pub fn is_open(&self) -> bool {
        self.state == PortState::Open
    }

    /// Elapsed time in milliseconds, rounded to two decimals.
    pub fn response_time_ms(&self) -> f64 {
        (self.elapsed.as_secs_f64() * 100_000.0).round() / 100.0
    }
}

/// Trait for single-port probe implementations.
///
/// Implementations absorb every network failure into a [`PortState`]; the
/// only error they return is [`ScanError::InvalidPort`](crate::ScanError::InvalidPort).
#[async_trait]
pub trait Prober: Send + Sync + 'static {
    /// Probe one port on `host` (an IP literal or a hostname).
    async fn probe(&self, host: &str, port: u16) -> ScanResult<ProbeOutcome>;
}

/// Receives progress notifications from a running scan.
///
/// Callbacks run on the harvesting task and must not block.
pub trait ScanObserver: Send + Sync {
    /// A host is about to be scanned. `address` is `None` when it could not
    /// be resolved, in which case it is skipped.
    fn on_host_start(&self, _host: &str, _address: Option<IpAddr>) {}

    /// One more probe of `host` has completed.
    fn on_progress(&self, _completed: usize, _total: usize, _host: &str) {}
}

/// Observer that ignores every notification.
impl ScanObserver for () {}
