//! CLI subcommand definitions and handlers.
//!
//! - `nobu scan --target <T>` - Scan a target
//! - `nobu profile <NAME> --target <T>` - Scan with a built-in profile
//! - `nobu profiles` - List the built-in profiles

mod profiles;
mod run;
mod scan;

pub use profiles::{list_profiles, ProfileCommand};
pub use run::{execute, ScanPlan, ScanStatus};
pub use scan::ScanCommand;

use crate::config::AppSettings;
use crate::error::CliResult;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

/// Smallest accepted per-connection timeout.
pub const MIN_TIMEOUT: Duration = Duration::from_millis(100);
/// Largest accepted per-connection timeout.
pub const MAX_TIMEOUT: Duration = Duration::from_secs(3600);

/// nobu - a concurrent TCP port scanner.
///
/// Probes ports with full TCP connects, classifies each as open, closed or
/// filtered, and can grab a short banner from open services.
#[derive(Parser, Debug)]
#[command(name = "nobu")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "A fast concurrent TCP port scanner", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOptions,
}

/// Flags shared by every subcommand.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Save results to FILE (.csv for CSV, JSON otherwise)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Path to a settings file
    #[arg(long, global = true, value_name = "PATH", env = "NOBU_CONFIG")]
    pub config: Option<PathBuf>,
}

impl GlobalOptions {
    /// Settings from `--config`, or from the default location.
    pub fn load_settings(&self) -> CliResult<AppSettings> {
        let settings = match &self.config {
            Some(path) => AppSettings::load_from(path)?,
            None => AppSettings::load()?,
        };
        Ok(settings)
    }
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan a target for open ports
    #[command(alias = "s")]
    Scan(ScanCommand),

    /// Scan a target using a built-in profile
    #[command(alias = "p")]
    Profile(ProfileCommand),

    /// List built-in scan profiles
    Profiles,
}

impl Cli {
    /// Run the selected subcommand.
    pub async fn run(self) -> CliResult<ScanStatus> {
        let settings = self.global.load_settings()?;
        if self.global.no_color || !settings.color {
            console::set_colors_enabled(false);
            console::set_colors_enabled_stderr(false);
        }

        let plan = match &self.command {
            Commands::Scan(cmd) => cmd.plan(&settings)?,
            Commands::Profile(cmd) => cmd.plan(&settings)?,
            Commands::Profiles => {
                list_profiles();
                return Ok(ScanStatus::Completed);
            }
        };

        execute(plan, &self.global).await
    }
}

/// Clamp a worker count into the accepted range.
pub fn clamp_concurrency(threads: usize) -> usize {
    threads.clamp(1, crate::scanner::ScanRequest::MAX_CONCURRENCY)
}

/// Convert a timeout in seconds, clamping it into the accepted range.
pub fn clamp_timeout(secs: f64) -> Duration {
    if secs.is_nan() {
        return MIN_TIMEOUT;
    }
    let secs = secs.clamp(MIN_TIMEOUT.as_secs_f64(), MAX_TIMEOUT.as_secs_f64());
    Duration::try_from_secs_f64(secs).unwrap_or(MIN_TIMEOUT)
}
