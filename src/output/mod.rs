//! Output formatting module.
//!
//! Plain text for the terminal, plus JSON and CSV exports of a finished scan.

mod csv_format;
mod json_format;
mod plain;
mod progress;

pub use csv_format::write_csv;
pub use json_format::{write_json, JsonReport};
pub use plain::{
    print_error, print_info, print_scan_header, print_warning, write_batch, write_summary,
};
pub use progress::ConsoleReporter;

use crate::scanner::{HostBatch, PortState, ProbeOutcome, ScanStats};
use anyhow::Context;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Everything needed to render or export a scan.
#[derive(Debug, Clone, Copy)]
pub struct ScanReport<'a> {
    /// Target as the user wrote it.
    pub target: &'a str,
    pub batches: &'a [HostBatch],
    pub stats: &'a ScanStats,
    /// Include closed and filtered ports.
    pub show_closed: bool,
}

impl<'a> ScanReport<'a> {
    /// Visible rows across all hosts, paired with their host.
    pub fn rows(&self) -> impl Iterator<Item = (&'a str, &'a ProbeOutcome)> + 'a {
        let show_closed = self.show_closed;
        let batches = self.batches;
        batches.iter().flat_map(move |batch| {
            batch
                .outcomes
                .iter()
                .filter(move |o| is_visible(o, show_closed))
                .map(move |o| (batch.host.as_str(), o))
        })
    }
}

/// Whether an outcome is listed in output.
pub fn is_visible(outcome: &ProbeOutcome, show_closed: bool) -> bool {
    show_closed || outcome.state == PortState::Open
}

/// File export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    /// `.csv` files get CSV, everything else JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => Self::Csv,
            _ => Self::Json,
        }
    }
}

/// Write `report` to `path` in the format implied by its extension.
pub fn save_report(report: &ScanReport<'_>, path: &Path) -> anyhow::Result<ExportFormat> {
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let writer = BufWriter::new(file);

    let format = ExportFormat::from_path(path);
    match format {
        ExportFormat::Json => write_json(report, writer),
        ExportFormat::Csv => write_csv(report, writer),
    }
    .with_context(|| format!("failed to write {}", path.display()))?;

    Ok(format)
}
