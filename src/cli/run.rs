//! Running a validated scan from the command line.

use super::GlobalOptions;
use crate::error::CliResult;
use crate::output::{
    self, print_info, print_scan_header, print_warning, write_batch, write_summary,
    ConsoleReporter, ScanReport,
};
use crate::scanner::{PortScanner, ScanRequest};
use anyhow::Context;
use futures::StreamExt;
use std::io::{self, Write};
use tokio_util::sync::CancellationToken;

/// A validated request plus the target text it came from.
#[derive(Debug, Clone)]
pub struct ScanPlan {
    pub target: String,
    pub request: ScanRequest,
}

/// How a command ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStatus {
    Completed,
    /// Stopped early by ctrl-c.
    Interrupted,
}

/// Run `plan`, printing each host as it finishes.
///
/// Ctrl-c stops the scan; the hosts finished so far and the totals are
/// still printed and exported.
pub async fn execute(plan: ScanPlan, global: &GlobalOptions) -> CliResult<ScanStatus> {
    let ScanPlan { target, request } = plan;
    let show_closed = request.show_closed();

    if !global.quiet {
        print_scan_header(
            &target,
            request.ports().len(),
            request.concurrency(),
            request.timeout(),
        );
    }

    let stop = CancellationToken::new();
    let signal = tokio::spawn({
        let stop = stop.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                stop.cancel();
            }
        }
    });

    let mut scanner = PortScanner::new(request).with_stop_token(stop.clone());
    let reporter = ConsoleReporter::new(global.quiet);
    let mut batches = Vec::new();

    {
        let stream = scanner.scan_all(&reporter);
        futures::pin_mut!(stream);

        while let Some(batch) = stream.next().await {
            reporter.finish_host();
            let stdout = io::stdout();
            let mut out = stdout.lock();
            write_batch(&mut out, &batch, show_closed).context("failed to print results")?;
            out.flush().context("failed to print results")?;
            batches.push(batch);
        }
    }
    reporter.finish_host();
    signal.abort();

    let interrupted = stop.is_cancelled();
    if interrupted {
        print_warning("scan interrupted, results are partial");
    }

    let stats = scanner.stats();
    write_summary(&mut io::stdout().lock(), stats).context("failed to print summary")?;

    if let Some(path) = &global.output {
        let report = ScanReport {
            target: &target,
            batches: &batches,
            stats,
            show_closed,
        };
        let format = output::save_report(&report, path)?;
        if !global.quiet {
            print_info(&format!(
                "Results saved to {} ({:?})",
                path.display(),
                format
            ));
        }
    }

    Ok(if interrupted {
        ScanStatus::Interrupted
    } else {
        ScanStatus::Completed
    })
}
