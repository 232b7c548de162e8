//! Built-in scan profiles.
//!
//! A profile bundles a port list with worker and timeout settings suited to
//! one kind of scan.

use crate::error::{ConfigError, ConfigResult};
use std::time::Duration;

const TOP_20: &[u16] = &[
    21, 22, 23, 25, 53, 80, 110, 111, 135, 139, 143, 443, 445, 993, 995, 1723, 3306, 3389, 5900,
    8080,
];

const TOP_100: &[u16] = &[
    7, 9, 13, 21, 22, 23, 25, 26, 37, 53, 79, 80, 81, 88, 106, 110, 111, 113, 119, 135, 139, 143,
    144, 179, 199, 389, 427, 443, 444, 445, 465, 513, 514, 515, 543, 544, 548, 554, 587, 631, 646,
    873, 990, 993, 995, 1025, 1026, 1027, 1028, 1029, 1110, 1433, 1720, 1723, 1755, 1900, 2000,
    2001, 2049, 2121, 2717, 3000, 3128, 3306, 3389, 3986, 4899, 5000, 5009, 5051, 5060, 5101, 5190,
    5357, 5432, 5631, 5666, 5800, 5900, 6000, 6001, 6646, 7070, 8000, 8008, 8009, 8080, 8081,
    8443, 8888, 9100, 9999, 10000, 32768, 49152, 49153, 49154,
];

const WEB: &[u16] = &[
    80, 443, 8000, 8008, 8080, 8443, 8888, 3000, 3001, 4000, 5000, 5001, 9000, 9090, 9443,
];

const DATABASE: &[u16] = &[
    1433, 1521, 3306, 5432, 6379, 9042, 27017, 28017, 5984, 7474, 8529, 9200, 9300, 11211, 26257,
];

const MAIL: &[u16] = &[25, 110, 143, 465, 587, 993, 995, 2525];

const LAB: &[u16] = &[21, 1025, 2222, 3306, 5432, 6379, 8025, 8080, 8081, 8443, 27017];

/// Which ports a profile covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfilePorts {
    List(&'static [u16]),
    Range(u16, u16),
}

/// A named, predefined scan configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Profile {
    pub name: &'static str,
    pub description: &'static str,
    pub ports: ProfilePorts,
    pub concurrency: usize,
    pub timeout: Duration,
}

impl Profile {
    /// Every built-in profile, in display order.
    pub const ALL: &'static [Profile] = &[
        Profile {
            name: "fast",
            description: "Quick scan of top 100 common ports",
            ports: ProfilePorts::List(TOP_100),
            concurrency: 200,
            timeout: Duration::from_millis(500),
        },
        Profile {
            name: "full",
            description: "Comprehensive scan of well-known ports (1-1024)",
            ports: ProfilePorts::Range(1, 1024),
            concurrency: 150,
            timeout: Duration::from_secs(1),
        },
        Profile {
            name: "web",
            description: "Web server ports (HTTP, HTTPS, common frameworks)",
            ports: ProfilePorts::List(WEB),
            concurrency: 50,
            timeout: Duration::from_secs(1),
        },
        Profile {
            name: "database",
            description: "Common database ports (MySQL, PostgreSQL, MongoDB, etc.)",
            ports: ProfilePorts::List(DATABASE),
            concurrency: 30,
            timeout: Duration::from_secs(2),
        },
        Profile {
            name: "mail",
            description: "Email server ports (SMTP, POP3, IMAP)",
            ports: ProfilePorts::List(MAIL),
            concurrency: 20,
            timeout: Duration::from_secs(2),
        },
        Profile {
            name: "stealth",
            description: "Slow, low-profile scan (fewer workers, longer timeout)",
            ports: ProfilePorts::List(TOP_20),
            concurrency: 5,
            timeout: Duration::from_secs(3),
        },
        Profile {
            name: "lab",
            description: "Docker test lab ports (web, db, ssh, mail)",
            ports: ProfilePorts::List(LAB),
            concurrency: 20,
            timeout: Duration::from_secs(2),
        },
    ];

    /// Look up a built-in profile by name (case-insensitive).
    pub fn find(name: &str) -> ConfigResult<&'static Profile> {
        Self::ALL
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| ConfigError::UnknownProfile(name.to_string()))
    }

    /// Names of all built-in profiles.
    pub fn names() -> impl Iterator<Item = &'static str> {
        Self::ALL.iter().map(|p| p.name)
    }

    /// The profile's ports, possibly unsorted.
    pub fn port_list(&self) -> Vec<u16> {
        match self.ports {
            ProfilePorts::List(ports) => ports.to_vec(),
            ProfilePorts::Range(start, end) => (start..=end).collect(),
        }
    }

    pub fn port_count(&self) -> usize {
        match self.ports {
            ProfilePorts::List(ports) => ports.len(),
            ProfilePorts::Range(start, end) => usize::from(end - start) + 1,
        }
    }
}
