//! Validated, immutable scan requests.

use crate::error::{ConfigError, ConfigResult};
use crate::types::{Port, PortSpec};
use std::time::Duration;

/// Everything one scan invocation needs to know, validated once at
/// construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRequest {
    targets: Vec<String>,
    ports: Vec<Port>,
    concurrency: usize,
    timeout: Duration,
    banner_grab: bool,
    show_closed: bool,
}

impl ScanRequest {
    /// Upper bound on concurrent probes per host.
    pub const MAX_CONCURRENCY: usize = 1000;
    pub const DEFAULT_CONCURRENCY: usize = 100;
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

    /// Start building a request.
    pub fn builder() -> ScanRequestBuilder {
        ScanRequestBuilder::default()
    }

    /// Target hosts in scan order.
    pub fn targets(&self) -> &[String] {
        &self.targets
    }

    /// Unique ports in ascending order.
    pub fn ports(&self) -> &[Port] {
        &self.ports
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn banner_grab(&self) -> bool {
        self.banner_grab
    }

    /// Whether renderers should list closed ports. The engine reports them
    /// either way.
    pub fn show_closed(&self) -> bool {
        self.show_closed
    }
}

/// Builder for [`ScanRequest`].
#[derive(Debug, Clone)]
pub struct ScanRequestBuilder {
    targets: Vec<String>,
    ports: Vec<u16>,
    concurrency: usize,
    timeout: Duration,
    banner_grab: bool,
    show_closed: bool,
}

impl Default for ScanRequestBuilder {
    fn default() -> Self {
        Self {
            targets: Vec::new(),
            ports: Vec::new(),
            concurrency: ScanRequest::DEFAULT_CONCURRENCY,
            timeout: ScanRequest::DEFAULT_TIMEOUT,
            banner_grab: false,
            show_closed: false,
        }
    }
}

impl ScanRequestBuilder {
    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.targets.push(target.into());
        self
    }

    pub fn targets<I, S>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.targets.extend(targets.into_iter().map(Into::into));
        self
    }

    /// Add raw port numbers. Duplicates collapse at build time.
    pub fn ports<I>(mut self, ports: I) -> Self
    where
        I: IntoIterator<Item = u16>,
    {
        self.ports.extend(ports);
        self
    }

    pub fn port_spec(self, spec: &PortSpec) -> Self {
        self.ports(spec.iter().map(Port::as_u16))
    }

    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn banner_grab(mut self, enabled: bool) -> Self {
        self.banner_grab = enabled;
        self
    }

    pub fn show_closed(mut self, enabled: bool) -> Self {
        self.show_closed = enabled;
        self
    }

    /// Validate and freeze the request.
    pub fn build(self) -> ConfigResult<ScanRequest> {
        let targets: Vec<String> = self
            .targets
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        if targets.is_empty() {
            return Err(ConfigError::NoTargets);
        }

        if self.ports.is_empty() {
            return Err(ConfigError::NoPorts);
        }
        let ports = PortSpec::from_ports(self.ports)?.to_ports();

        if !(1..=ScanRequest::MAX_CONCURRENCY).contains(&self.concurrency) {
            return Err(ConfigError::InvalidConcurrency {
                got: self.concurrency,
                max: ScanRequest::MAX_CONCURRENCY,
            });
        }

        if self.timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout(self.timeout));
        }

        Ok(ScanRequest {
            targets,
            ports,
            concurrency: self.concurrency,
            timeout: self.timeout,
            banner_grab: self.banner_grab,
            show_closed: self.show_closed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PortError;

    fn base() -> ScanRequestBuilder {
        ScanRequest::builder().target("127.0.0.1").ports([80])
    }

    #[test]
    fn test_defaults() {
        let request = base().build().unwrap();
        assert_eq!(request.concurrency(), 100);
        assert_eq!(request.timeout(), Duration::from_secs(1));
        assert!(!request.banner_grab());
        assert!(!request.show_closed());
    }

    #[test]
    fn test_duplicate_ports_collapse() {
        let request = ScanRequest::builder()
            .target("127.0.0.1")
            .ports([80, 80, 443])
            .build()
            .unwrap();
        let ports: Vec<u16> = request.ports().iter().map(|p| p.as_u16()).collect();
        assert_eq!(ports, vec![80, 443]);
    }

    #[test]
    fn test_targets_keep_order() {
        let request = ScanRequest::builder()
            .targets(["10.0.0.2", " ", "10.0.0.1"])
            .ports([22])
            .build()
            .unwrap();
        assert_eq!(request.targets(), ["10.0.0.2", "10.0.0.1"]);
    }

    #[test]
    fn test_empty_targets_rejected() {
        let err = ScanRequest::builder().ports([80]).build().unwrap_err();
        assert!(matches!(err, ConfigError::NoTargets));
    }

    #[test]
    fn test_empty_ports_rejected() {
        let err = ScanRequest::builder().target("127.0.0.1").build().unwrap_err();
        assert!(matches!(err, ConfigError::NoPorts));
    }

    #[test]
    fn test_port_zero_rejected() {
        let err = base().ports([0]).build().unwrap_err();
        assert!(matches!(err, ConfigError::Port(PortError::OutOfRange(0))));
    }

    #[test]
    fn test_concurrency_bounds() {
        assert!(base().concurrency(1).build().is_ok());
        assert!(base().concurrency(1000).build().is_ok());
        assert!(matches!(
            base().concurrency(0).build(),
            Err(ConfigError::InvalidConcurrency { got: 0, .. })
        ));
        assert!(matches!(
            base().concurrency(1001).build(),
            Err(ConfigError::InvalidConcurrency { got: 1001, .. })
        ));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = base().timeout(Duration::ZERO).build().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTimeout(_)));
    }
}
