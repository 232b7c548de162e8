//! Engine and host-iterator tests.
//!
//! Most tests drive the engine with scripted probers so ordering,
//! concurrency and cancellation can be checked deterministically; the rest
//! run real TCP probes against loopback listeners.

use super::*;
use crate::error::{ScanError, ScanResult};
use async_trait::async_trait;
use futures::StreamExt;
use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

/// Prober that answers from a table after a per-port delay.
#[derive(Default)]
struct ScriptedProber {
    states: HashMap<u16, PortState>,
    delays: HashMap<u16, Duration>,
    panic_on: Option<u16>,
    fail_on: Option<u16>,
    in_flight: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedProber {
    fn with_state(mut self, port: u16, state: PortState) -> Self {
        self.states.insert(port, state);
        self
    }

    fn with_delay(mut self, port: u16, delay: Duration) -> Self {
        self.delays.insert(port, delay);
        self
    }
}

#[async_trait]
impl Prober for ScriptedProber {
    async fn probe(&self, host: &str, port: u16) -> ScanResult<ProbeOutcome> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        let delay = self
            .delays
            .get(&port)
            .copied()
            .unwrap_or(Duration::from_millis(5));
        tokio::time::sleep(delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.panic_on == Some(port) {
            panic!("scripted probe failure on port {port}");
        }
        if self.fail_on == Some(port) {
            return Err(ScanError::HostResolution {
                host: host.to_string(),
                reason: "scripted failure".to_string(),
            });
        }

        let state = self.states.get(&port).copied().unwrap_or(PortState::Closed);
        Ok(ProbeOutcome::new(port, state, "").with_elapsed(delay))
    }
}

/// Observer recording every callback, optionally stopping the scan after
/// a number of completed probes.
#[derive(Default)]
struct Recorder {
    hosts: Mutex<Vec<(String, Option<IpAddr>)>>,
    progress: Mutex<Vec<(usize, usize, String)>>,
    stop_after: Option<(usize, CancellationToken)>,
}

impl ScanObserver for Recorder {
    fn on_host_start(&self, host: &str, address: Option<IpAddr>) {
        self.hosts.lock().unwrap().push((host.to_string(), address));
    }

    fn on_progress(&self, completed: usize, total: usize, host: &str) {
        self.progress
            .lock()
            .unwrap()
            .push((completed, total, host.to_string()));
        if let Some((limit, token)) = &self.stop_after {
            if completed >= *limit {
                token.cancel();
            }
        }
    }
}

fn request(targets: &[&str], ports: &[u16], concurrency: usize) -> ScanRequest {
    ScanRequest::builder()
        .targets(targets.iter().copied())
        .ports(ports.iter().copied())
        .concurrency(concurrency)
        .timeout(Duration::from_millis(300))
        .build()
        .unwrap()
}

fn ports_of(outcomes: &[ProbeOutcome]) -> Vec<u16> {
    outcomes.iter().map(|o| o.port).collect()
}

#[tokio::test]
async fn test_batch_has_one_sorted_outcome_per_port() {
    // Later ports finish first, so completion order is the reverse of port order.
    let prober = ScriptedProber::default()
        .with_state(22, PortState::Open)
        .with_state(80, PortState::Filtered)
        .with_delay(22, Duration::from_millis(60))
        .with_delay(80, Duration::from_millis(40))
        .with_delay(443, Duration::from_millis(20));

    let mut scanner =
        PortScanner::with_prober(request(&["127.0.0.1"], &[443, 80, 22, 80], 3), prober);
    let batches: Vec<HostBatch> = scanner.scan_all(&()).collect().await;

    assert_eq!(batches.len(), 1);
    let batch = &batches[0];
    assert_eq!(batch.host, "127.0.0.1");
    assert_eq!(batch.address, IpAddr::V4(Ipv4Addr::LOCALHOST));
    assert_eq!(ports_of(&batch.outcomes), vec![22, 80, 443]);
    assert_eq!(batch.open_ports().count(), 1);

    let stats = scanner.stats();
    assert_eq!(stats.total_ports, 3);
    assert_eq!(stats.open_ports, 1);
    assert_eq!(stats.closed_ports, 1);
    assert_eq!(stats.filtered_ports, 1);
    assert_eq!(stats.hosts_scanned, 1);
    assert!(stats.is_finished());
}

#[tokio::test]
async fn test_scan_host_yields_in_completion_order() {
    let prober = ScriptedProber::default()
        .with_delay(1, Duration::from_millis(80))
        .with_delay(2, Duration::from_millis(5));

    let mut scanner = PortScanner::with_prober(request(&["127.0.0.1"], &[1, 2], 2), prober);
    let outcomes: Vec<ProbeOutcome> = scanner.scan_host("127.0.0.1", &()).collect().await;

    assert_eq!(ports_of(&outcomes), vec![2, 1]);
    assert_eq!(scanner.stats().total_ports, 2);
}

#[tokio::test]
async fn test_concurrency_is_bounded() {
    let prober = ScriptedProber::default();
    let peak = Arc::clone(&prober.peak);
    let calls = Arc::clone(&prober.calls);
    let ports: Vec<u16> = (1..=40).collect();

    let mut scanner = PortScanner::with_prober(request(&["127.0.0.1"], &ports, 4), prober);
    let batches: Vec<HostBatch> = scanner.scan_all(&()).collect().await;

    assert_eq!(batches[0].outcomes.len(), 40);
    assert_eq!(calls.load(Ordering::SeqCst), 40);
    let peak = peak.load(Ordering::SeqCst);
    assert!(peak <= 4, "peak in-flight probes was {peak}");
    assert!(peak >= 1);
}

#[tokio::test]
async fn test_panicking_probe_becomes_filtered() {
    let prober = ScriptedProber {
        panic_on: Some(8080),
        ..Default::default()
    }
    .with_state(22, PortState::Open);

    let mut scanner =
        PortScanner::with_prober(request(&["127.0.0.1"], &[22, 8080, 9000], 3), prober);
    let batches: Vec<HostBatch> = scanner.scan_all(&()).collect().await;

    let outcomes = &batches[0].outcomes;
    assert_eq!(ports_of(outcomes), vec![22, 8080, 9000]);
    assert_eq!(outcomes[1].state, PortState::Filtered);
    assert_eq!(outcomes[1].service, "http-proxy");

    let stats = scanner.stats();
    assert_eq!(stats.total_ports, 3);
    assert_eq!(
        stats.open_ports + stats.closed_ports + stats.filtered_ports,
        stats.total_ports
    );
}

#[tokio::test]
async fn test_failing_probe_becomes_filtered() {
    let prober = ScriptedProber {
        fail_on: Some(443),
        ..Default::default()
    }
    .with_state(443, PortState::Open)
    .with_state(80, PortState::Open);

    let mut scanner =
        PortScanner::with_prober(request(&["127.0.0.1"], &[80, 443, 8443], 3), prober);
    let batches: Vec<HostBatch> = scanner.scan_all(&()).collect().await;

    let outcomes = &batches[0].outcomes;
    assert_eq!(ports_of(outcomes), vec![80, 443, 8443]);
    assert_eq!(outcomes[0].state, PortState::Open);
    assert_eq!(outcomes[1].state, PortState::Filtered);
    assert_eq!(outcomes[1].service, "https");

    let stats = scanner.stats();
    assert_eq!(stats.total_ports, 3);
    assert_eq!(stats.open_ports, 1);
    assert_eq!(stats.filtered_ports, 1);
}

#[tokio::test]
async fn test_progress_reported_per_probe() {
    let recorder = Recorder::default();
    let mut scanner = PortScanner::with_prober(
        request(&["127.0.0.1"], &[1, 2, 3, 4, 5], 2),
        ScriptedProber::default(),
    );
    let _: Vec<HostBatch> = scanner.scan_all(&recorder).collect().await;

    let progress = recorder.progress.lock().unwrap();
    let counts: Vec<usize> = progress.iter().map(|(done, _, _)| *done).collect();
    assert_eq!(counts, vec![1, 2, 3, 4, 5]);
    assert!(progress
        .iter()
        .all(|(_, total, host)| *total == 5 && host == "127.0.0.1"));

    let hosts = recorder.hosts.lock().unwrap();
    assert_eq!(
        *hosts,
        vec![("127.0.0.1".to_string(), Some(IpAddr::V4(Ipv4Addr::LOCALHOST)))]
    );
}

#[tokio::test]
async fn test_hosts_are_scanned_in_request_order() {
    let recorder = Recorder::default();
    let mut scanner = PortScanner::with_prober(
        request(&["127.0.0.2", "127.0.0.1", "::1"], &[80], 1),
        ScriptedProber::default(),
    );
    let batches: Vec<HostBatch> = scanner.scan_all(&recorder).collect().await;

    let hosts: Vec<&str> = batches.iter().map(|b| b.host.as_str()).collect();
    assert_eq!(hosts, vec!["127.0.0.2", "127.0.0.1", "::1"]);
    assert_eq!(scanner.stats().hosts_scanned, 3);
    assert_eq!(scanner.stats().total_ports, 3);
}

#[tokio::test]
async fn test_unresolvable_host_is_skipped() {
    let recorder = Recorder::default();
    let mut scanner = PortScanner::with_prober(
        request(&["not a host", "127.0.0.1"], &[22, 80], 2),
        ScriptedProber::default(),
    );
    let batches: Vec<HostBatch> = scanner.scan_all(&recorder).collect().await;

    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].host, "127.0.0.1");

    let hosts = recorder.hosts.lock().unwrap();
    assert_eq!(hosts[0], ("not a host".to_string(), None));
    assert_eq!(hosts.len(), 2);

    let stats = scanner.stats();
    assert_eq!(stats.hosts_scanned, 1);
    assert_eq!(stats.total_ports, 2);
}

#[tokio::test]
async fn test_stop_mid_host_ends_stream() {
    let token = CancellationToken::new();
    let recorder = Recorder {
        stop_after: Some((1, token.clone())),
        ..Default::default()
    };
    let prober = ScriptedProber::default()
        .with_delay(1, Duration::from_millis(1))
        .with_delay(2, Duration::from_secs(30))
        .with_delay(3, Duration::from_secs(30));

    let started = Instant::now();
    let mut scanner = PortScanner::with_prober(
        request(&["127.0.0.1", "127.0.0.2"], &[1, 2, 3], 3),
        prober,
    )
    .with_stop_token(token);
    let batches: Vec<HostBatch> = scanner.scan_all(&recorder).collect().await;

    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(batches.len(), 1);
    assert_eq!(ports_of(&batches[0].outcomes), vec![1]);

    assert!(scanner.is_stopped());
    let stats = scanner.stats();
    assert_eq!(stats.total_ports, 1);
    assert_eq!(stats.hosts_scanned, 1);
    assert!(stats.is_finished());
    assert_eq!(recorder.hosts.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_stop_before_scan_yields_nothing() {
    let prober = ScriptedProber::default();
    let calls = Arc::clone(&prober.calls);
    let mut scanner = PortScanner::with_prober(request(&["127.0.0.1"], &[80], 1), prober);
    scanner.stop();
    scanner.stop();

    let batches: Vec<HostBatch> = scanner.scan_all(&()).collect().await;

    assert!(batches.is_empty());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(scanner.stats().is_finished());
    assert_eq!(scanner.stats().total_ports, 0);
}

#[tokio::test]
async fn test_stop_handle_interrupts_scan_host() {
    let prober = ScriptedProber::default().with_delay(7, Duration::from_secs(30));
    let mut scanner = PortScanner::with_prober(request(&["127.0.0.1"], &[7, 8], 2), prober);
    let handle = scanner.stop_handle();

    let stream = scanner.scan_host("127.0.0.1", &());
    futures::pin_mut!(stream);

    let first = stream.next().await.unwrap();
    assert_eq!(first.port, 8);

    handle.cancel();
    assert!(stream.next().await.is_none());
}

#[tokio::test]
async fn test_stats_reset_between_scans() {
    let mut scanner = PortScanner::with_prober(
        request(&["127.0.0.1"], &[1, 2], 2),
        ScriptedProber::default(),
    );
    let _: Vec<HostBatch> = scanner.scan_all(&()).collect().await;
    let _: Vec<HostBatch> = scanner.scan_all(&()).collect().await;

    assert_eq!(scanner.stats().total_ports, 2);
    assert_eq!(scanner.stats().hosts_scanned, 1);
}

#[tokio::test]
async fn test_closed_ports_on_loopback() {
    let mut scanner = PortScanner::new(request(&["127.0.0.1"], &[65530, 65531, 65532], 3));
    let batches: Vec<HostBatch> = scanner.scan_all(&()).collect().await;

    let outcomes = &batches[0].outcomes;
    assert_eq!(ports_of(outcomes), vec![65530, 65531, 65532]);
    assert!(outcomes
        .iter()
        .all(|o| matches!(o.state, PortState::Closed | PortState::Filtered)));

    let stats = scanner.stats();
    assert_eq!(stats.total_ports, 3);
    assert!(stats.duration() < Duration::from_secs(2));
}

#[tokio::test]
async fn test_open_port_on_loopback() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let request = ScanRequest::builder()
        .target("127.0.0.1")
        .ports([port])
        .timeout(Duration::from_secs(1))
        .build()
        .unwrap();
    let mut scanner = PortScanner::new(request);
    let batches: Vec<HostBatch> = scanner.scan_all(&()).collect().await;

    let outcome = &batches[0].outcomes[0];
    assert_eq!(outcome.state, PortState::Open);
    assert!(outcome.elapsed < Duration::from_secs(1));
    assert_eq!(scanner.stats().open_ports, 1);
}

#[tokio::test]
async fn test_banner_grab_elicits_http_response() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = [0u8; 128];
        let n = socket.read(&mut request).await.unwrap();
        if request[..n].starts_with(b"HEAD") {
            socket
                .write_all(b"HTTP/1.0 200 OK\r\nServer: loopback\r\n\r\n")
                .await
                .unwrap();
        }
    });

    let request = ScanRequest::builder()
        .target("127.0.0.1")
        .ports([port])
        .timeout(Duration::from_secs(1))
        .banner_grab(true)
        .build()
        .unwrap();
    let mut scanner = PortScanner::new(request);
    let batches: Vec<HostBatch> = scanner.scan_all(&()).collect().await;

    let outcome = &batches[0].outcomes[0];
    assert_eq!(outcome.state, PortState::Open);
    assert!(outcome.banner.contains("HTTP"), "banner was {:?}", outcome.banner);
}

#[tokio::test]
async fn test_quick_scan_sorts_results() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let open = listener.local_addr().unwrap().port();
    let closed = TcpListener::bind("127.0.0.1:0")
        .await
        .unwrap()
        .local_addr()
        .unwrap()
        .port();

    let outcomes = quick_scan("127.0.0.1", [open, closed, open], Duration::from_millis(500), 10)
        .await
        .unwrap();

    let mut expected = vec![open, closed];
    expected.sort_unstable();
    assert_eq!(ports_of(&outcomes), expected);
    let open_outcome = outcomes.iter().find(|o| o.port == open).unwrap();
    assert_eq!(open_outcome.state, PortState::Open);
}

#[tokio::test]
async fn test_quick_scan_rejects_bad_config() {
    assert!(quick_scan("127.0.0.1", Vec::<u16>::new(), Duration::from_secs(1), 10)
        .await
        .is_err());
    assert!(quick_scan("127.0.0.1", [80], Duration::from_secs(1), 0)
        .await
        .is_err());
}
