//! Plain text output formatting.
//!
//! Produces human-readable output with colors and formatting. Colors follow
//! the global `console` setting, so `--no-color` only has to flip that.

use super::is_visible;
use crate::scanner::{HostBatch, PortState, ScanStats};
use console::{style, Style};
use std::io::{self, Write};
use std::time::Duration;

const RULE: &str = "───────────────────────────────────────────────────────────────";
const BANNER_COLUMN: usize = 40;

/// Print a scan header before scanning begins.
pub fn print_scan_header(target: &str, ports: usize, concurrency: usize, timeout: Duration) {
    println!();
    println!(
        "{} {} v{}",
        style("Starting").cyan(),
        style("nobu").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!("{} Target: {}", style("•").dim(), style(target).white().bold());
    println!(
        "{} Scanning {} ports with {} workers, {:.1}s timeout",
        style("•").dim(),
        style(ports).white().bold(),
        concurrency,
        timeout.as_secs_f64()
    );
    println!();
}

/// Render one host's results.
pub fn write_batch<W: Write>(out: &mut W, batch: &HostBatch, show_closed: bool) -> io::Result<()> {
    if batch.host == batch.address.to_string() {
        writeln!(out, "{} {}", style("Host:").bold(), batch.host)?;
    } else {
        writeln!(
            out,
            "{} {} ({})",
            style("Host:").bold(),
            batch.host,
            batch.address
        )?;
    }

    let rows: Vec<_> = batch
        .outcomes
        .iter()
        .filter(|o| is_visible(o, show_closed))
        .collect();

    if rows.is_empty() {
        writeln!(out, "  {}", style("No open ports found.").dim())?;
        writeln!(out)?;
        return Ok(());
    }

    writeln!(out, "  {}", style(RULE).dim())?;
    writeln!(
        out,
        "  {:>6}  {:<9}  {:<15}  {}",
        style("PORT").bold(),
        style("STATE").bold(),
        style("SERVICE").bold(),
        style("BANNER").bold()
    )?;
    writeln!(out, "  {}", style(RULE).dim())?;

    for outcome in rows {
        let state_style = match outcome.state {
            PortState::Open => Style::new().green().bold(),
            PortState::Closed => Style::new().red(),
            PortState::Filtered => Style::new().yellow(),
        };
        let service = if outcome.service.is_empty() {
            "unknown"
        } else {
            outcome.service.as_str()
        };

        writeln!(
            out,
            "  {:>6}  {:<9}  {:<15}  {}",
            outcome.port,
            state_style.apply_to(outcome.state.as_str()),
            service,
            style(truncate(&outcome.banner, BANNER_COLUMN)).dim()
        )?;
    }

    writeln!(out, "  {}", style(RULE).dim())?;
    writeln!(out)?;
    Ok(())
}

/// Render the totals of a scan.
pub fn write_summary<W: Write>(out: &mut W, stats: &ScanStats) -> io::Result<()> {
    writeln!(
        out,
        "{} {} ports on {} host(s) in {:.2}s",
        style("Scanned").bold(),
        stats.total_ports,
        stats.hosts_scanned,
        stats.duration().as_secs_f64()
    )?;
    writeln!(
        out,
        "        {} open, {} closed, {} filtered",
        style(stats.open_ports).green().bold(),
        style(stats.closed_ports).red(),
        style(stats.filtered_ports).yellow()
    )
}

/// Print an error message.
pub fn print_error(msg: &str) {
    eprintln!("{} {}", style("Error:").red().bold(), msg);
}

/// Print a warning message.
pub fn print_warning(msg: &str) {
    eprintln!("{} {}", style("Warning:").yellow().bold(), msg);
}

/// Print an info message.
pub fn print_info(msg: &str) {
    println!("{} {}", style("ℹ").blue().bold(), msg);
}

/// Truncate to `max` characters, marking the cut with an ellipsis.
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}
