//! Running scan totals.

use crate::scanner::traits::{PortState, ProbeOutcome};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

/// Counters accumulated while a scan runs.
///
/// Every outcome lands in exactly one of the open/closed/filtered buckets,
/// so `open_ports + closed_ports + filtered_ports == total_ports` always holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    pub total_ports: usize,
    pub open_ports: usize,
    pub closed_ports: usize,
    pub filtered_ports: usize,
    pub hosts_scanned: usize,
    pub start_time: DateTime<Utc>,
    /// `None` until the host loop exits.
    pub end_time: Option<DateTime<Utc>>,
}

impl Default for ScanStats {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanStats {
    /// Fresh counters with the start time set to now.
    pub fn new() -> Self {
        Self {
            total_ports: 0,
            open_ports: 0,
            closed_ports: 0,
            filtered_ports: 0,
            hosts_scanned: 0,
            start_time: Utc::now(),
            end_time: None,
        }
    }

    pub fn update(&mut self, outcome: &ProbeOutcome) {
        self.total_ports += 1;
        match outcome.state {
            PortState::Open => self.open_ports += 1,
            PortState::Closed => self.closed_ports += 1,
            PortState::Filtered => self.filtered_ports += 1,
        }
    }

    /// Stamp the end time.
    pub fn finish(&mut self) {
        self.end_time = Some(Utc::now());
    }

    pub fn is_finished(&self) -> bool {
        self.end_time.is_some()
    }

    /// Wall-clock duration, zero while the scan is incomplete.
    pub fn duration(&self) -> Duration {
        self.end_time
            .and_then(|end| (end - self.start_time).to_std().ok())
            .unwrap_or_default()
    }
}
