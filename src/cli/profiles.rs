//! Built-in profile subcommands.

use super::ScanPlan;
use crate::config::{AppSettings, Profile};
use crate::error::ConfigResult;
use crate::scanner::ScanRequest;
use crate::types::TargetSpec;
use clap::Parser;
use console::style;

/// Scan a target with a built-in profile.
#[derive(Parser, Debug)]
pub struct ProfileCommand {
    /// Profile name (see `nobu profiles`)
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Target to scan (IP, hostname, or CIDR notation)
    #[arg(short, long, value_name = "TARGET")]
    pub target: String,

    /// Grab banners from open ports
    #[arg(short = 'b', long)]
    pub banner: bool,

    /// Show closed and filtered ports in output
    #[arg(long)]
    pub show_closed: bool,
}

impl ProfileCommand {
    /// Resolve the profile and validate the target into a runnable plan.
    pub fn plan(&self, settings: &AppSettings) -> ConfigResult<ScanPlan> {
        let profile = Profile::find(&self.name)?;
        let hosts = TargetSpec::parse(&self.target)?.hosts();

        let request = ScanRequest::builder()
            .targets(hosts)
            .ports(profile.port_list())
            .concurrency(profile.concurrency)
            .timeout(profile.timeout)
            .banner_grab(self.banner || settings.banner_grab)
            .show_closed(self.show_closed)
            .build()?;

        Ok(ScanPlan {
            target: self.target.clone(),
            request,
        })
    }
}

/// Print the built-in profile table.
pub fn list_profiles() {
    println!();
    println!("{}", style("Built-in profiles").cyan().bold());
    println!();
    println!(
        "  {:<10} {:>6} {:>8} {:>8}  {}",
        style("NAME").bold(),
        style("PORTS").bold(),
        style("WORKERS").bold(),
        style("TIMEOUT").bold(),
        style("DESCRIPTION").bold()
    );

    for profile in Profile::ALL {
        println!(
            "  {:<10} {:>6} {:>8} {:>7.1}s  {}",
            style(profile.name).green(),
            profile.port_count(),
            profile.concurrency,
            profile.timeout.as_secs_f64(),
            profile.description
        );
    }

    println!();
    println!(
        "{} Example: nobu profile fast --target 192.168.1.1",
        style("•").dim()
    );
    println!();
}
