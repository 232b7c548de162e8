//! Well-known TCP port to service name table.
//!
//! Labels are advisory only; nothing here is derived from a probe.

/// Sorted by port so lookups can binary search.
static PORT_SERVICES: &[(u16, &str)] = &[
    (7, "echo"),
    (9, "discard"),
    (13, "daytime"),
    (20, "ftp-data"),
    (21, "ftp"),
    (22, "ssh"),
    (23, "telnet"),
    (25, "smtp"),
    (37, "time"),
    (53, "domain"),
    (79, "finger"),
    (80, "http"),
    (88, "kerberos"),
    (110, "pop3"),
    (111, "sunrpc"),
    (113, "auth"),
    (119, "nntp"),
    (135, "msrpc"),
    (139, "netbios-ssn"),
    (143, "imap"),
    (179, "bgp"),
    (389, "ldap"),
    (443, "https"),
    (445, "microsoft-ds"),
    (465, "submissions"),
    (513, "login"),
    (514, "shell"),
    (515, "printer"),
    (543, "klogin"),
    (544, "kshell"),
    (548, "afp"),
    (554, "rtsp"),
    (587, "submission"),
    (631, "ipp"),
    (636, "ldaps"),
    (873, "rsync"),
    (990, "ftps"),
    (993, "imaps"),
    (995, "pop3s"),
    (1080, "socks"),
    (1433, "ms-sql-s"),
    (1521, "oracle"),
    (1720, "h323"),
    (1723, "pptp"),
    (1883, "mqtt"),
    (1900, "ssdp"),
    (2049, "nfs"),
    (2121, "ftp-proxy"),
    (2375, "docker"),
    (2376, "docker-tls"),
    (3000, "ppp"),
    (3128, "squid-http"),
    (3306, "mysql"),
    (3389, "ms-wbt-server"),
    (5060, "sip"),
    (5432, "postgresql"),
    (5672, "amqp"),
    (5900, "vnc"),
    (5984, "couchdb"),
    (6000, "x11"),
    (6379, "redis"),
    (7474, "neo4j"),
    (8000, "http-alt"),
    (8008, "http-alt"),
    (8080, "http-proxy"),
    (8443, "https-alt"),
    (8529, "arangodb"),
    (8888, "http-alt"),
    (9042, "cassandra"),
    (9090, "websm"),
    (9100, "jetdirect"),
    (9200, "elasticsearch"),
    (9300, "elasticsearch"),
    (10000, "webmin"),
    (11211, "memcache"),
    (26257, "cockroachdb"),
    (27017, "mongodb"),
    (28017, "mongodb-web"),
];

/// Look up the probable service name for a port.
pub fn service_name(port: u16) -> Option<&'static str> {
    PORT_SERVICES
        .binary_search_by_key(&port, |&(p, _)| p)
        .ok()
        .map(|idx| PORT_SERVICES[idx].1)
}

/// Service label for a port, empty when the port is not in the table.
pub fn service_label(port: u16) -> &'static str {
    service_name(port).unwrap_or("")
}
