//! Target specification types with CIDR and hostname support.
//!
//! Expands a user target into the flat host list a scan request carries.
//! Name resolution is deferred to scan time, one host at a time.

use ipnetwork::IpNetwork;
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

/// Error type for target parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TargetError {
    #[error("target cannot be empty")]
    Empty,
    #[error("invalid target format: {0}")]
    InvalidFormat(String),
    #[error("invalid CIDR notation: {0}")]
    InvalidCidr(String),
    #[error("network is too large ({0} hosts), maximum allowed is /16 ({1} hosts)")]
    CidrTooLarge(u128, u128),
}

/// A target specification that may expand to multiple hosts.
///
/// Supports:
/// - Single IP: "192.168.1.1", "::1"
/// - CIDR: "192.168.1.0/24"
/// - Hostname: "scanme.nmap.org"
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetSpec {
    Single(IpAddr),
    Cidr(IpNetwork),
    Hostname(String),
}

impl TargetSpec {
    /// Maximum number of addresses allowed in a CIDR range.
    pub const MAX_CIDR_HOSTS: u128 = 65536;

    /// Parse a target specification from a string.
    pub fn parse(s: &str) -> Result<Self, TargetError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(TargetError::Empty);
        }

        if let Ok(ip) = s.parse::<IpAddr>() {
            return Ok(Self::Single(ip));
        }

        if s.contains('/') {
            let network: IpNetwork = s
                .parse()
                .map_err(|_| TargetError::InvalidCidr(s.to_string()))?;

            let size = network_size(&network);
            if size > Self::MAX_CIDR_HOSTS {
                return Err(TargetError::CidrTooLarge(size, Self::MAX_CIDR_HOSTS));
            }
            return Ok(Self::Cidr(network));
        }

        if is_valid_hostname(s) {
            return Ok(Self::Hostname(s.to_string()));
        }

        Err(TargetError::InvalidFormat(s.to_string()))
    }

    /// Expand into individual host identifiers, in address order.
    ///
    /// IPv4 networks with a prefix shorter than /31 exclude their network and
    /// broadcast addresses. Hostnames are returned unresolved.
    pub fn hosts(&self) -> Vec<String> {
        match self {
            Self::Single(ip) => vec![ip.to_string()],
            Self::Hostname(name) => vec![name.clone()],
            Self::Cidr(network) => network
                .iter()
                .filter(|ip| match (network, ip) {
                    (IpNetwork::V4(net), IpAddr::V4(addr)) if net.prefix() < 31 => {
                        *addr != net.network() && *addr != net.broadcast()
                    }
                    _ => true,
                })
                .map(|ip| ip.to_string())
                .collect(),
        }
    }
}

fn network_size(network: &IpNetwork) -> u128 {
    match network {
        IpNetwork::V4(net) => u128::from(net.size()),
        IpNetwork::V6(net) => {
            let host_bits = 128 - u32::from(net.prefix());
            if host_bits >= 128 {
                u128::MAX
            } else {
                1u128 << host_bits
            }
        }
    }
}

impl FromStr for TargetSpec {
    type Err = TargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for TargetSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(ip) => write!(f, "{}", ip),
            Self::Cidr(network) => write!(f, "{}", network),
            Self::Hostname(hostname) => write!(f, "{}", hostname),
        }
    }
}

/// Labels of 1-63 alphanumerics or hyphens, not starting or ending with a hyphen.
pub fn is_valid_hostname(s: &str) -> bool {
    if s.len() > 253 {
        return false;
    }

    s.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    })
}
