//! TCP connect probe implementation.
//!
//! Performs standard TCP connect probes using the operating system's socket
//! API and maps the outcome onto [`PortState`]. Every exit path drops the
//! stream, so the socket is always released.

use crate::banner::extract_banner;
use crate::error::{ScanError, ScanResult};
use crate::scanner::resolve::HostResolver;
use crate::scanner::traits::{PortState, ProbeOutcome, Prober};
use crate::services::service_label;
use crate::types::Port;
use async_trait::async_trait;
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::trace;

/// Why a connection attempt did not produce an open socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectFailure {
    /// The peer actively refused the connection.
    Refused,
    /// No answer within the probe timeout.
    TimedOut,
    /// The host name could not be resolved.
    Unresolved,
    /// Any other OS-level error.
    Other(io::ErrorKind),
}

impl ConnectFailure {
    /// Classify an I/O error from a connect call.
    ///
    /// Refusal is identified by `ErrorKind::ConnectionRefused`, which the
    /// standard library maps from `ECONNREFUSED` and `WSAECONNREFUSED` alike.
    pub fn from_io(err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::ConnectionRefused => Self::Refused,
            io::ErrorKind::TimedOut => Self::TimedOut,
            kind => Self::Other(kind),
        }
    }

    /// Only a definitive refusal counts as closed; everything else is filtered.
    pub fn state(self) -> PortState {
        match self {
            Self::Refused => PortState::Closed,
            Self::TimedOut | Self::Unresolved | Self::Other(_) => PortState::Filtered,
        }
    }
}

/// TCP connect prober.
///
/// Does not require elevated privileges.
pub struct TcpProber {
    timeout: Duration,
    grab_banners: bool,
    resolver: Arc<HostResolver>,
}

impl TcpProber {
    /// Create a prober with its own resolver.
    pub fn new(timeout: Duration, grab_banners: bool) -> Self {
        Self::with_resolver(timeout, grab_banners, Arc::new(HostResolver::new()))
    }

    /// Create a prober sharing an existing resolver.
    pub fn with_resolver(
        timeout: Duration,
        grab_banners: bool,
        resolver: Arc<HostResolver>,
    ) -> Self {
        Self {
            timeout,
            grab_banners,
            resolver,
        }
    }

    async fn connect(&self, host: &str, port: u16) -> Result<TcpStream, ConnectFailure> {
        let ip = self
            .resolver
            .resolve(host)
            .await
            .map_err(|_| ConnectFailure::Unresolved)?;

        connect_within(self.timeout, TcpStream::connect(SocketAddr::new(ip, port))).await
    }
}

/// Await a connect attempt for at most `limit`, classifying any failure.
async fn connect_within<F, S>(limit: Duration, attempt: F) -> Result<S, ConnectFailure>
where
    F: Future<Output = io::Result<S>>,
{
    match timeout(limit, attempt).await {
        Ok(Ok(stream)) => Ok(stream),
        Ok(Err(e)) => Err(ConnectFailure::from_io(&e)),
        Err(_) => Err(ConnectFailure::TimedOut),
    }
}

#[async_trait]
impl Prober for TcpProber {
    async fn probe(&self, host: &str, port: u16) -> ScanResult<ProbeOutcome> {
        let port = Port::new(port).ok_or(ScanError::InvalidPort(port))?.as_u16();
        let service = service_label(port);
        let start = Instant::now();

        let outcome = match self.connect(host, port).await {
            Ok(mut stream) => {
                let banner = if self.grab_banners {
                    extract_banner(&mut stream).await
                } else {
                    String::new()
                };
                ProbeOutcome::new(port, PortState::Open, service).with_banner(banner)
            }
            Err(failure) => {
                trace!(host, port, ?failure, "connect failed");
                ProbeOutcome::new(port, failure.state(), service)
            }
        };

        Ok(outcome.with_elapsed(start.elapsed()))
    }
}
