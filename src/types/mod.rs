//! Core type definitions using newtype patterns for type safety.
//!
//! These types keep invalid ports and malformed targets out of a scan
//! request before any network activity starts.

mod port;
mod target;

pub use port::{Port, PortError, PortSpec};
pub use target::{is_valid_hostname, TargetError, TargetSpec};
