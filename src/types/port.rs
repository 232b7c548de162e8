//! Port types with validation and parsing.
//!
//! The `Port` newtype ensures values are always valid port numbers (1-65535).
//! `PortSpec` handles user port specifications such as `"22,80-90,443"`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// A validated network port number (1-65535).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct Port(u16);

impl Port {
    /// Minimum valid port number.
    pub const MIN: u16 = 1;
    /// Maximum valid port number.
    pub const MAX: u16 = 65535;

    /// Create a new Port from a u16, returning None if invalid.
    #[inline]
    pub const fn new(port: u16) -> Option<Self> {
        if port >= Self::MIN {
            Some(Self(port))
        } else {
            None
        }
    }

    /// Get the raw port number.
    #[inline]
    pub const fn as_u16(self) -> u16 {
        self.0
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u16> for Port {
    type Error = PortError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(PortError::OutOfRange(value.into()))
    }
}

impl TryFrom<u32> for Port {
    type Error = PortError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        u16::try_from(value)
            .ok()
            .and_then(Self::new)
            .ok_or(PortError::OutOfRange(value))
    }
}

impl From<Port> for u16 {
    fn from(port: Port) -> Self {
        port.0
    }
}

/// Error type for port parsing and validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    #[error("port {0} out of valid range (1-65535)")]
    OutOfRange(u32),
    #[error("invalid port number: {0}")]
    InvalidFormat(String),
    #[error("invalid range: start ({0}) > end ({1})")]
    InvalidRange(u32, u32),
    #[error("port specification cannot be empty")]
    Empty,
}

/// A set of unique ports, always iterated in ascending order.
///
/// Supports formats like:
/// - Single port: "80"
/// - Comma-separated: "80,443,8080"
/// - Range: "1-1024"
/// - Mixed: "22,80-90,443,8080-8090"
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortSpec {
    ports: BTreeSet<Port>,
}

impl PortSpec {
    /// Create an empty port specification.
    pub const fn new() -> Self {
        Self {
            ports: BTreeSet::new(),
        }
    }

    /// Build a specification from raw port numbers, rejecting port 0.
    pub fn from_ports<I>(ports: I) -> Result<Self, PortError>
    where
        I: IntoIterator<Item = u16>,
    {
        let ports = ports
            .into_iter()
            .map(Port::try_from)
            .collect::<Result<BTreeSet<_>, _>>()?;
        Ok(Self { ports })
    }

    /// Add a single port.
    pub fn insert(&mut self, port: Port) {
        self.ports.insert(port);
    }

    /// All ports as a sorted, deduplicated vector.
    pub fn to_ports(&self) -> Vec<Port> {
        self.ports.iter().copied().collect()
    }

    /// Number of unique ports.
    pub fn len(&self) -> usize {
        self.ports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Port> + '_ {
        self.ports.iter().copied()
    }
}

fn parse_number(s: &str, context: &str) -> Result<u32, PortError> {
    s.parse()
        .map_err(|_| PortError::InvalidFormat(context.to_string()))
}

impl FromStr for PortSpec {
    type Err = PortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        if compact.is_empty() {
            return Err(PortError::Empty);
        }

        let mut spec = Self::new();

        for part in compact.split(',').filter(|p| !p.is_empty()) {
            match part.split_once('-') {
                Some((start, end)) => {
                    let start = parse_number(start, part)?;
                    let end = parse_number(end, part)?;
                    if start > end {
                        return Err(PortError::InvalidRange(start, end));
                    }
                    let first = Port::try_from(start)?;
                    let last = Port::try_from(end)?;
                    for port in first.as_u16()..=last.as_u16() {
                        spec.insert(Port(port));
                    }
                }
                None => spec.insert(Port::try_from(parse_number(part, part)?)?),
            }
        }

        if spec.is_empty() {
            return Err(PortError::Empty);
        }

        Ok(spec)
    }
}

impl fmt::Display for PortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.ports.iter().map(Port::to_string).collect();
        write!(f, "{}", parts.join(","))
    }
}
