//! # nobu - a concurrent TCP port scanner
//!
//! nobu probes (host, port) pairs with full TCP connects, classifies each
//! port as open, closed or filtered, and can pull a short banner from open
//! services.
//!
//! ## Features
//!
//! - **Bounded concurrency**: a per-host worker pool sized by the request
//! - **Streaming results**: outcomes arrive as probes finish, hosts arrive as
//!   sorted batches
//! - **Cooperative stop**: a cancellation token halts a scan promptly and
//!   keeps what was already collected
//! - **Flexible targeting**: single IPs, hostnames, and CIDR ranges
//! - **Built-in profiles** and JSON/CSV export
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use futures::StreamExt;
//! use nobu::scanner::{PortScanner, ScanRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), nobu::ConfigError> {
//!     let request = ScanRequest::builder()
//!         .target("192.168.1.1")
//!         .ports(1..=1024)
//!         .banner_grab(true)
//!         .build()?;
//!
//!     let mut scanner = PortScanner::new(request);
//!     let batches: Vec<_> = scanner.scan_all(&()).collect().await;
//!
//!     for batch in &batches {
//!         for outcome in batch.open_ports() {
//!             println!("{}:{} {}", batch.host, outcome.port, outcome.banner);
//!         }
//!     }
//!     println!("{} open", scanner.stats().open_ports);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`types`] - Port and target specifications
//! - [`scanner`] - Probes, the scan engine, and statistics
//! - [`banner`] - Banner extraction and normalization
//! - [`services`] - Well-known port labels
//! - [`config`] - Settings file and built-in profiles
//! - [`output`] - Plain text, JSON and CSV rendering
//! - [`cli`] - Command-line front end
//! - [`error`] - Error types

pub mod banner;
pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod scanner;
pub mod services;
pub mod types;

// Re-export commonly used types
pub use error::{CliError, ConfigError, ScanError};
pub use scanner::{
    quick_scan, HostBatch, PortScanner, PortState, ProbeOutcome, Prober, ScanObserver,
    ScanRequest, ScanStats, TcpProber,
};
pub use types::{Port, PortSpec, TargetSpec};
