//! Host name resolution.
//!
//! IP literals never touch DNS. Names go through a lazily built
//! `trust-dns` resolver, so constructing a scanner costs nothing until the
//! first name lookup.

use crate::error::{ScanError, ScanResult};
use crate::types::is_valid_hostname;
use std::net::IpAddr;
use std::sync::OnceLock;
use tracing::debug;
use trust_dns_resolver::config::{ResolverConfig, ResolverOpts};
use trust_dns_resolver::TokioAsyncResolver;

/// Resolves scan hosts to a single address.
#[derive(Default)]
pub struct HostResolver {
    dns: OnceLock<TokioAsyncResolver>,
}

impl HostResolver {
    pub fn new() -> Self {
        Self::default()
    }

    fn dns(&self) -> &TokioAsyncResolver {
        self.dns.get_or_init(|| {
            TokioAsyncResolver::tokio_from_system_conf().unwrap_or_else(|e| {
                debug!(error = %e, "system resolver configuration unavailable, using defaults");
                TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default())
            })
        })
    }

    /// Resolve `host` to one address, preferring IPv4 when a name has both.
    pub async fn resolve(&self, host: &str) -> ScanResult<IpAddr> {
        let host = host.trim();
        if let Ok(ip) = host.parse::<IpAddr>() {
            return Ok(ip);
        }

        let failure = |reason: String| ScanError::HostResolution {
            host: host.to_string(),
            reason,
        };

        if !is_valid_hostname(host) {
            return Err(failure("not a valid hostname".to_string()));
        }

        let response = self
            .dns()
            .lookup_ip(host)
            .await
            .map_err(|e| failure(e.to_string()))?;

        let addrs: Vec<IpAddr> = response.iter().collect();
        addrs
            .iter()
            .find(|ip| ip.is_ipv4())
            .or_else(|| addrs.first())
            .copied()
            .ok_or_else(|| failure("no addresses found".to_string()))
    }
}
