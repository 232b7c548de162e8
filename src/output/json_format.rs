//! JSON export.

use super::ScanReport;
use crate::scanner::PortState;
use serde::Serialize;
use std::io::Write;

/// Serialized shape of a JSON export.
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub target: &'a str,
    pub duration_seconds: f64,
    pub summary: JsonSummary,
    pub results: Vec<JsonRow<'a>>,
}

#[derive(Debug, Serialize)]
pub struct JsonSummary {
    pub total_ports: usize,
    pub open: usize,
    pub closed: usize,
    pub filtered: usize,
}

#[derive(Debug, Serialize)]
pub struct JsonRow<'a> {
    pub host: &'a str,
    pub port: u16,
    pub state: PortState,
    pub service: &'a str,
    pub banner: &'a str,
    pub response_time_ms: f64,
}

impl<'a> From<&ScanReport<'a>> for JsonReport<'a> {
    fn from(report: &ScanReport<'a>) -> Self {
        let stats = report.stats;
        let seconds = stats.duration().as_secs_f64();

        Self {
            target: report.target,
            duration_seconds: (seconds * 100.0).round() / 100.0,
            summary: JsonSummary {
                total_ports: stats.total_ports,
                open: stats.open_ports,
                closed: stats.closed_ports,
                filtered: stats.filtered_ports,
            },
            results: report
                .rows()
                .map(|(host, o)| JsonRow {
                    host,
                    port: o.port,
                    state: o.state,
                    service: &o.service,
                    banner: &o.banner,
                    response_time_ms: o.response_time_ms(),
                })
                .collect(),
        }
    }
}

/// Write `report` as pretty-printed JSON.
pub fn write_json<W: Write>(report: &ScanReport<'_>, mut writer: W) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut writer, &JsonReport::from(report))?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
