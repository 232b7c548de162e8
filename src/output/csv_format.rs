//! CSV export.

use super::ScanReport;
use std::io::Write;

/// Write the visible rows of `report` as CSV with a header line.
pub fn write_csv<W: Write>(report: &ScanReport<'_>, writer: W) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    wtr.write_record([
        "host",
        "port",
        "state",
        "service",
        "banner",
        "response_time_ms",
    ])?;

    for (host, outcome) in report.rows() {
        wtr.write_record([
            host,
            &outcome.port.to_string(),
            outcome.state.as_str(),
            &outcome.service,
            &outcome.banner,
            &outcome.response_time_ms().to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
