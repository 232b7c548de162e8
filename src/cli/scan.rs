//! Scan subcommand implementation.

use super::{clamp_concurrency, clamp_timeout, ScanPlan};
use crate::config::AppSettings;
use crate::error::ConfigResult;
use crate::scanner::ScanRequest;
use crate::types::{PortSpec, TargetSpec};
use clap::Parser;

/// Scan a target for open ports.
#[derive(Parser, Debug)]
pub struct ScanCommand {
    /// Target to scan (IP, hostname, or CIDR notation)
    ///
    /// Examples:
    ///   192.168.1.1        Single IP address
    ///   example.com        Hostname
    ///   192.168.1.0/24     CIDR range
    #[arg(short, long, value_name = "TARGET")]
    pub target: String,

    /// Ports to scan (e.g., "80", "80,443", "1-1000", "22,80,443,8000-9000")
    #[arg(short, long, default_value = "1-1024")]
    pub ports: String,

    /// Maximum number of concurrent probes per host
    #[arg(short = 'c', long, value_name = "N")]
    pub threads: Option<usize>,

    /// Connection timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<f64>,

    /// Grab banners from open ports
    #[arg(short = 'b', long)]
    pub banner: bool,

    /// Show closed and filtered ports in output
    #[arg(long)]
    pub show_closed: bool,
}

impl ScanCommand {
    /// Validate the arguments into a runnable plan.
    pub fn plan(&self, settings: &AppSettings) -> ConfigResult<ScanPlan> {
        let ports: PortSpec = self.ports.parse()?;
        let hosts = TargetSpec::parse(&self.target)?.hosts();

        let concurrency = clamp_concurrency(self.threads.unwrap_or(settings.default_concurrency));
        let timeout = match self.timeout {
            Some(secs) => clamp_timeout(secs),
            None => clamp_timeout(settings.default_timeout().as_secs_f64()),
        };

        let request = ScanRequest::builder()
            .targets(hosts)
            .port_spec(&ports)
            .concurrency(concurrency)
            .timeout(timeout)
            .banner_grab(self.banner || settings.banner_grab)
            .show_closed(self.show_closed)
            .build()?;

        Ok(ScanPlan {
            target: self.target.clone(),
            request,
        })
    }
}
