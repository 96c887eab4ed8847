//! WHOIS protocol implementation.
//!
//! Plain TCP to port 43: send the query terminated by CRLF and read until
//! the server closes the connection. The module also knows how to pick the
//! authoritative server out of IANA replies and how to spot referrals in
//! registry replies.

use crate::error::DomainWatchError;
use async_trait::async_trait;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

/// Well-known WHOIS port.
pub const WHOIS_PORT: u16 = 43;

/// Replies larger than this are truncated; no registry sends anything close.
const MAX_REPLY_BYTES: usize = 1024 * 1024;

/// WHOIS query seam.
#[async_trait]
pub trait WhoisQuery: Send + Sync {
    /// Send `query` to `server` and return the full reply text.
    async fn query(&self, server: &str, query: &str) -> Result<String, DomainWatchError>;
}

/// WHOIS client speaking the port 43 protocol directly.
#[derive(Clone)]
pub struct WhoisClient {
    /// Budget for connect + write + read
    timeout: Duration,
    port: u16,
}

impl WhoisClient {
    /// Create a new WHOIS client with default settings.
    pub fn new() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            port: WHOIS_PORT,
        }
    }

    /// Create a new WHOIS client with custom timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            port: WHOIS_PORT,
        }
    }

    /// Query a non-standard port (test servers, private mirrors).
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn exchange(&self, server: &str, query: &str) -> Result<String, DomainWatchError> {
        let mut stream = TcpStream::connect((server, self.port)).await.map_err(|e| {
            DomainWatchError::whois(server, format!("Connection failed: {}", e))
        })?;

        stream
            .write_all(format!("{}\r\n", query).as_bytes())
            .await
            .map_err(|e| DomainWatchError::whois(server, format!("Write failed: {}", e)))?;

        let mut buf = Vec::new();
        (&mut stream)
            .take(MAX_REPLY_BYTES as u64)
            .read_to_end(&mut buf)
            .await
            .map_err(|e| DomainWatchError::whois(server, format!("Read failed: {}", e)))?;

        // Registries answer in Latin-1 and UTF-8 alike
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

impl Default for WhoisClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WhoisQuery for WhoisClient {
    async fn query(&self, server: &str, query: &str) -> Result<String, DomainWatchError> {
        match tokio::time::timeout(self.timeout, self.exchange(server, query)).await {
            Ok(result) => result,
            Err(_) => Err(DomainWatchError::timeout(
                format!("WHOIS query to {}", server),
                self.timeout,
            )),
        }
    }
}

/// Extract the authoritative WHOIS host from an IANA WHOIS reply.
///
/// IANA advertises it on a `whois:` line:
///
/// ```text
/// domain:       COM
/// whois:        whois.verisign-grs.com
/// ```
pub fn parse_iana_whois_field(response: &str) -> Option<String> {
    response.lines().find_map(|line| {
        let line = line.trim();
        let (key, value) = line.split_once(':')?;
        if !key.trim().eq_ignore_ascii_case("whois") {
            return None;
        }
        let value = value.trim();
        (!value.is_empty()).then(|| value.to_lowercase())
    })
}

/// Find a referral to another WHOIS server in a registry reply.
///
/// Recognized forms, first occurrence wins:
///
/// ```text
/// Registrar WHOIS Server: whois.markmonitor.com
/// ReferralServer: whois://whois.ripe.net
/// refer:        whois.verisign-grs.com
/// whois server: whois.nic.example
/// ```
///
/// `whois.iana.org` and the host that produced the reply are never returned.
pub fn find_referral(response: &str, queried_host: &str) -> Option<String> {
    const IANA_WHOIS: &str = "whois.iana.org";

    for line in response.lines() {
        let line = line.trim();
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim().to_ascii_lowercase();
        let value = value.trim();

        let candidate = match key.as_str() {
            "registrar whois server" | "refer" | "whois server" => clean_host(value),
            "referralserver" => value
                .to_ascii_lowercase()
                .strip_prefix("whois://")
                .and_then(clean_host),
            _ => None,
        };

        if let Some(host) = candidate {
            if host == IANA_WHOIS || host.eq_ignore_ascii_case(queried_host) {
                continue;
            }
            return Some(host);
        }
    }

    None
}

/// Reduce a referral value to a bare host: no scheme, path or port.
fn clean_host(value: &str) -> Option<String> {
    let value = value.trim().to_ascii_lowercase();
    let value = ["whois://", "rwhois://", "https://", "http://"]
        .iter()
        .find_map(|scheme| value.strip_prefix(scheme))
        .unwrap_or(&value);
    let host = value
        .split(|c: char| c == '/' || c == ':' || c.is_whitespace())
        .next()
        .unwrap_or("")
        .trim_end_matches('.');

    if host.is_empty() || !host.contains('.') {
        None
    } else {
        Some(host.to_string())
    }
}
