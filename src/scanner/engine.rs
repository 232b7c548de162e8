//! Concurrent scan engine and host iterator.
//!
//! Ports of one host are probed by a bounded pool of tokio tasks and
//! harvested as they complete. Hosts are scanned strictly one after another,
//! so the number of in-flight connections never exceeds the request's
//! concurrency regardless of how many targets there are.

use crate::error::ConfigResult;
use crate::scanner::request::ScanRequest;
use crate::scanner::resolve::HostResolver;
use crate::scanner::stats::ScanStats;
use crate::scanner::tcp::TcpProber;
use crate::scanner::traits::{ProbeOutcome, Prober, ScanObserver};
use futures::stream::{self, Stream, StreamExt};
use futures::FutureExt;
use serde::Serialize;
use std::net::IpAddr;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// The complete, port-sorted results for one host.
#[derive(Debug, Clone, Serialize)]
pub struct HostBatch {
    /// Host as given in the request.
    pub host: String,
    /// Address the host resolved to.
    pub address: IpAddr,
    /// One outcome per requested port, ascending by port. Shorter only when
    /// the scan was stopped while this host was in progress.
    pub outcomes: Vec<ProbeOutcome>,
}

impl HostBatch {
    pub fn open_ports(&self) -> impl Iterator<Item = &ProbeOutcome> {
        self.outcomes.iter().filter(|o| o.is_open())
    }
}

/// Drives probes for every host and port of a [`ScanRequest`].
///
/// # Example
///
/// ```rust,ignore
/// use futures::StreamExt;
/// use nobu::scanner::{PortScanner, ScanRequest};
///
/// let request = ScanRequest::builder().target("127.0.0.1").ports([22, 80]).build()?;
/// let mut scanner = PortScanner::new(request);
/// let batches: Vec<_> = scanner.scan_all(&()).collect().await;
/// println!("{} open", scanner.stats().open_ports);
/// ```
pub struct PortScanner<P: Prober = TcpProber> {
    request: ScanRequest,
    prober: Arc<P>,
    resolver: Arc<HostResolver>,
    stats: ScanStats,
    stop: CancellationToken,
}

impl PortScanner<TcpProber> {
    /// Create a scanner using TCP connect probes.
    pub fn new(request: ScanRequest) -> Self {
        let resolver = Arc::new(HostResolver::new());
        let prober = TcpProber::with_resolver(
            request.timeout(),
            request.banner_grab(),
            Arc::clone(&resolver),
        );
        Self::from_parts(request, prober, resolver)
    }
}

impl<P: Prober> PortScanner<P> {
    /// Create a scanner with a custom probe implementation.
    pub fn with_prober(request: ScanRequest, prober: P) -> Self {
        Self::from_parts(request, prober, Arc::new(HostResolver::new()))
    }

    fn from_parts(request: ScanRequest, prober: P, resolver: Arc<HostResolver>) -> Self {
        Self {
            request,
            prober: Arc::new(prober),
            resolver,
            stats: ScanStats::new(),
            stop: CancellationToken::new(),
        }
    }

    /// Use an externally owned stop token, e.g. one cancelled by a signal
    /// handler.
    pub fn with_stop_token(mut self, token: CancellationToken) -> Self {
        self.stop = token;
        self
    }

    pub fn request(&self) -> &ScanRequest {
        &self.request
    }

    /// Totals accumulated so far. Final once the `scan_all` stream ends.
    pub fn stats(&self) -> &ScanStats {
        &self.stats
    }

    /// Ask the scan to stop. Idempotent.
    ///
    /// The current harvest returns promptly; in-flight probes are aborted
    /// and their results discarded.
    pub fn stop(&self) {
        self.stop.cancel();
    }

    /// A handle that stops this scanner when cancelled.
    pub fn stop_handle(&self) -> CancellationToken {
        self.stop.clone()
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.is_cancelled()
    }

    /// Probe every requested port of `host`.
    ///
    /// Outcomes are yielded in completion order, not port order. Each one
    /// is counted in [`stats`](Self::stats) as it is pulled from the stream.
    pub fn scan_host<'a>(
        &'a mut self,
        host: &str,
        observer: &'a dyn ScanObserver,
    ) -> impl Stream<Item = ProbeOutcome> + 'a {
        self.scan_target(host, host, observer)
    }

    fn scan_target<'a>(
        &'a mut self,
        address: &str,
        label: &str,
        observer: &'a dyn ScanObserver,
    ) -> impl Stream<Item = ProbeOutcome> + 'a {
        let ports: Vec<u16> = self.request.ports().iter().map(|p| p.as_u16()).collect();
        let workers = self.request.concurrency().min(ports.len()).max(1);

        let scan = HostScan {
            address: Arc::from(address),
            label: label.to_string(),
            total: ports.len(),
            unspawned: ports,
            workers,
            completed: 0,
            tasks: JoinSet::new(),
            prober: Arc::clone(&self.prober),
            stop: self.stop.clone(),
            stats: &mut self.stats,
            observer,
        };

        stream::unfold(scan, |mut scan| async move {
            let outcome = scan.next_outcome().await?;
            Some((outcome, scan))
        })
    }

    /// Scan all hosts of the request in order, yielding one batch per host.
    ///
    /// Stats are reset when this is called and finalized when the stream
    /// ends, whether every host was scanned or the scan was stopped. Hosts
    /// that fail to resolve are reported to the observer with no address and
    /// produce no batch.
    pub fn scan_all<'a>(
        &'a mut self,
        observer: &'a dyn ScanObserver,
    ) -> impl Stream<Item = HostBatch> + 'a {
        self.stats = ScanStats::new();

        stream::unfold((self, 0usize), move |(scanner, mut next)| async move {
            while let Some(host) = scanner.request.targets().get(next).cloned() {
                next += 1;
                if scanner.is_stopped() {
                    break;
                }

                let address = match scanner.resolver.resolve(&host).await {
                    Ok(address) => address,
                    Err(e) => {
                        debug!(host = %host, error = %e, "skipping host");
                        observer.on_host_start(&host, None);
                        continue;
                    }
                };

                observer.on_host_start(&host, Some(address));
                scanner.stats.hosts_scanned += 1;

                let mut outcomes: Vec<ProbeOutcome> = scanner
                    .scan_target(&address.to_string(), &host, observer)
                    .collect()
                    .await;
                outcomes.sort_unstable_by_key(|o| o.port);

                let batch = HostBatch {
                    host,
                    address,
                    outcomes,
                };
                return Some((batch, (scanner, next)));
            }

            scanner.stats.finish();
            debug!(
                hosts = scanner.stats.hosts_scanned,
                ports = scanner.stats.total_ports,
                stopped = scanner.is_stopped(),
                "scan finished"
            );
            None
        })
    }
}

/// State of one host's probe fan-out.
struct HostScan<'a, P: Prober> {
    address: Arc<str>,
    label: String,
    total: usize,
    /// Ports not yet submitted; drained on the first poll.
    unspawned: Vec<u16>,
    workers: usize,
    completed: usize,
    tasks: JoinSet<ProbeOutcome>,
    prober: Arc<P>,
    stop: CancellationToken,
    stats: &'a mut ScanStats,
    observer: &'a dyn ScanObserver,
}

enum Harvest {
    Stopped,
    Drained,
    Joined(Result<ProbeOutcome, tokio::task::JoinError>),
}

impl<P: Prober> HostScan<'_, P> {
    fn submit_all(&mut self) {
        debug!(host = %self.label, ports = self.total, workers = self.workers, "scanning host");
        let permits = Arc::new(Semaphore::new(self.workers));
        for port in std::mem::take(&mut self.unspawned) {
            self.tasks.spawn(run_probe(
                Arc::clone(&self.prober),
                Arc::clone(&permits),
                Arc::clone(&self.address),
                port,
            ));
        }
    }

    async fn next_outcome(&mut self) -> Option<ProbeOutcome> {
        if !self.unspawned.is_empty() && !self.stop.is_cancelled() {
            self.submit_all();
        }

        loop {
            let harvest = tokio::select! {
                biased;
                _ = self.stop.cancelled() => Harvest::Stopped,
                joined = self.tasks.join_next() => match joined {
                    Some(joined) => Harvest::Joined(joined),
                    None => Harvest::Drained,
                },
            };

            match harvest {
                Harvest::Stopped => {
                    debug!(
                        host = %self.label,
                        completed = self.completed,
                        total = self.total,
                        "stop requested, abandoning in-flight probes"
                    );
                    self.tasks.abort_all();
                    return None;
                }
                Harvest::Drained => return None,
                Harvest::Joined(Ok(outcome)) => {
                    self.completed += 1;
                    self.stats.update(&outcome);
                    self.observer
                        .on_progress(self.completed, self.total, &self.label);
                    return Some(outcome);
                }
                Harvest::Joined(Err(e)) => {
                    warn!(host = %self.label, error = %e, "probe task lost");
                }
            }
        }
    }
}

/// Run one probe under a worker permit. Errors and panics become a
/// `filtered` outcome for the same port.
async fn run_probe<P: Prober>(
    prober: Arc<P>,
    permits: Arc<Semaphore>,
    host: Arc<str>,
    port: u16,
) -> ProbeOutcome {
    let attempt = async {
        let _permit = permits.acquire_owned().await;
        prober.probe(&host, port).await
    };

    match AssertUnwindSafe(attempt).catch_unwind().await {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(e)) => {
            warn!(%host, port, error = %e, "probe failed");
            ProbeOutcome::filtered(port)
        }
        Err(_) => {
            warn!(%host, port, "probe panicked");
            ProbeOutcome::filtered(port)
        }
    }
}

/// Scan one host and return its outcomes sorted by port.
pub async fn quick_scan(
    host: &str,
    ports: impl IntoIterator<Item = u16>,
    timeout: Duration,
    concurrency: usize,
) -> ConfigResult<Vec<ProbeOutcome>> {
    let request = ScanRequest::builder()
        .target(host)
        .ports(ports)
        .timeout(timeout)
        .concurrency(concurrency)
        .build()?;

    let mut scanner = PortScanner::new(request);
    let mut outcomes: Vec<ProbeOutcome> = scanner.scan_host(host, &()).collect().await;
    outcomes.sort_unstable_by_key(|o| o.port);
    Ok(outcomes)
}
