//! Scanner module - probes, the concurrent engine, and result aggregation.
//!
//! - [`tcp`] performs single TCP connect probes and classifies failures.
//! - [`engine`] fans probes out over a bounded task pool per host and walks
//!   the request's hosts one at a time.
//! - [`stats`] keeps the running totals.

pub mod engine;
pub mod request;
pub mod resolve;
pub mod stats;
pub mod tcp;
pub mod traits;

pub use engine::{quick_scan, HostBatch, PortScanner};
pub use request::{ScanRequest, ScanRequestBuilder};
pub use resolve::HostResolver;
pub use stats::ScanStats;
pub use tcp::{ConnectFailure, TcpProber};
pub use traits::{PortState, ProbeOutcome, Prober, ScanObserver};

#[cfg(test)]
mod tests;
