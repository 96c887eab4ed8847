//! IANA registry sources.
//!
//! This module fetches and parses the public IANA data the directory is
//! built from: the RDAP bootstrap registry for DNS, the flat TLD list, the
//! IANA RDAP self-lookup for a TLD and the root-zone database HTML page.

use crate::error::DomainWatchError;
use crate::protocols::http::{HttpFetch, HttpReply, RequestProfile};
use crate::types::TldUpdate;
use crate::utils::{normalize_tld, parse_plain_date, with_trailing_slash, CANONICAL_DATETIME};
use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use serde::Deserialize;

lazy_static::lazy_static! {
    static ref RDAP_SERVER_RE: Regex =
        Regex::new(r"(?is)RDAP Server:\s*(?:</b>)?\s*<a[^>]*>\s*([^<\s]+)\s*</a>").unwrap();
    static ref WHOIS_SERVER_RE: Regex =
        Regex::new(r"(?is)WHOIS Server:\s*(?:</b>)?\s*([A-Za-z0-9][A-Za-z0-9.\-]*\.[A-Za-z0-9\-]+)").unwrap();
    static ref REGISTRY_URL_RE: Regex =
        Regex::new(r#"(?is)URL for registration services:\s*(?:</b>)?\s*<a[^>]*href\s*=\s*"([^"]+)""#).unwrap();
    static ref REGISTRATION_DATE_RE: Regex =
        Regex::new(r"(?i)Registration date\s+(\d{4}-\d{2}-\d{2})").unwrap();
    static ref LAST_UPDATED_RE: Regex =
        Regex::new(r"(?i)Record last updated\s+(\d{4}-\d{2}-\d{2})").unwrap();
    static ref VERSION_HEADER_RE: Regex =
        Regex::new(r"(?i)^#\s*Version\s+(\S+?),?\s+Last Updated\s+(.+)$").unwrap();
}

/// The IANA RDAP bootstrap registry for DNS (RFC 9224).
///
/// ```json
/// {
///   "version": "1.0",
///   "publication": "2024-01-30T22:00:01Z",
///   "services": [[["com", "net"], ["https://rdap.verisign.com/com/v1/"]]]
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct RdapBootstrap {
    #[serde(default)]
    pub version: String,
    pub publication: Option<String>,
    pub services: Vec<(Vec<String>, Vec<String>)>,
}

impl RdapBootstrap {
    /// Decode a bootstrap document.
    pub fn parse(body: &str) -> Result<Self, DomainWatchError> {
        serde_json::from_str(body).map_err(|e| {
            DomainWatchError::bootstrap("rdap", format!("Invalid bootstrap JSON: {}", e))
        })
    }

    /// First base URL serving `tld`, normalized to end with `/`.
    ///
    /// Patterns match with or without a leading dot, case-insensitively.
    pub fn find_rdap_url(&self, tld: &str) -> Option<String> {
        let wanted = tld.trim().trim_start_matches('.').to_lowercase();
        self.services
            .iter()
            .find(|(patterns, _)| {
                patterns
                    .iter()
                    .any(|p| p.trim().trim_start_matches('.').eq_ignore_ascii_case(&wanted))
            })
            .and_then(|(_, urls)| urls.first())
            .map(|url| with_trailing_slash(url.trim()))
    }

    /// Every `(tld, base urls)` pair, TLDs normalized with a leading dot.
    pub fn entries(&self) -> impl Iterator<Item = (String, Vec<String>)> + '_ {
        self.services.iter().flat_map(|(patterns, urls)| {
            let urls: Vec<String> = urls.iter().map(|u| with_trailing_slash(u.trim())).collect();
            patterns
                .iter()
                .filter(|p| !p.trim().is_empty())
                .map(move |p| (normalize_tld(p), urls.clone()))
        })
    }
}

/// The IANA flat TLD list.
#[derive(Debug, Clone, PartialEq)]
pub struct TldList {
    /// `Version` from the header line
    pub version: Option<String>,
    /// `Last Updated` from the header line, canonical UTC when parseable
    pub last_updated: Option<String>,
    /// Dot-prefixed, lowercase labels in file order
    pub tlds: Vec<String>,
}

impl TldList {
    /// Parse the list.
    ///
    /// ```text
    /// # Version 2024013100, Last Updated Wed Jan 31 07:07:01 2024 UTC
    /// AAA
    /// COM
    /// ```
    pub fn parse(body: &str) -> Self {
        let mut version = None;
        let mut last_updated = None;
        let mut tlds = Vec::new();

        for line in body.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if line.starts_with('#') {
                if let Some(caps) = VERSION_HEADER_RE.captures(line) {
                    version = Some(caps[1].to_string());
                    last_updated = Some(header_timestamp(&caps[2]));
                }
                continue;
            }
            tlds.push(normalize_tld(line));
        }

        Self {
            version,
            last_updated,
            tlds,
        }
    }
}

/// `Wed Jan 31 07:07:01 2024 UTC` becomes `2024-01-31 07:07:01`.
fn header_timestamp(raw: &str) -> String {
    let raw = raw.trim();
    let bare = raw.trim_end_matches("UTC").trim();
    NaiveDateTime::parse_from_str(bare, "%a %b %e %H:%M:%S %Y")
        .map(|dt| dt.format(CANONICAL_DATETIME).to_string())
        .unwrap_or_else(|_| raw.to_string())
}

/// Registry facts about one TLD gathered from IANA.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TldFacts {
    pub whois_server: Option<String>,
    pub registry_url: Option<String>,
    pub rdap_server: Option<String>,
    pub registration_date: Option<NaiveDate>,
    pub record_last_updated: Option<NaiveDate>,
}

impl TldFacts {
    pub fn is_empty(&self) -> bool {
        self.whois_server.is_none()
            && self.registry_url.is_none()
            && self.registration_date.is_none()
            && self.record_last_updated.is_none()
    }

    /// Directory update carrying the facts that were found.
    ///
    /// The RDAP server is left out; the bootstrap import owns that column.
    pub fn to_update(&self) -> TldUpdate {
        TldUpdate {
            whois_server: self.whois_server.clone(),
            registry_url: self.registry_url.clone(),
            registration_date: self.registration_date,
            record_last_updated: self.record_last_updated,
            ..TldUpdate::default()
        }
    }

    /// Read the IANA RDAP object for a TLD.
    pub fn from_iana_rdap(json: &serde_json::Value) -> Self {
        let mut facts = Self {
            whois_server: json
                .get("port43")
                .and_then(|v| v.as_str())
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty()),
            ..Self::default()
        };

        if let Some(links) = json.get("links").and_then(|l| l.as_array()) {
            facts.registry_url = links
                .iter()
                .filter(|link| {
                    link.get("title")
                        .and_then(|t| t.as_str())
                        .map(|t| t.eq_ignore_ascii_case("Registration URL"))
                        .unwrap_or(false)
                })
                .find_map(|link| link.get("href").and_then(|h| h.as_str()))
                .map(String::from);
        }

        if let Some(events) = json.get("events").and_then(|e| e.as_array()) {
            for event in events {
                let action = event.get("eventAction").and_then(|a| a.as_str());
                let date = event
                    .get("eventDate")
                    .and_then(|d| d.as_str())
                    .and_then(parse_plain_date);
                match action {
                    Some("registration") => facts.registration_date = date,
                    Some("last changed") => facts.record_last_updated = date,
                    _ => {}
                }
            }
        }

        facts
    }

    /// Scrape an IANA root-zone database page.
    pub fn from_root_db_html(html: &str) -> Self {
        let capture = |re: &Regex| {
            re.captures(html)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().trim().to_string())
                .filter(|s| !s.is_empty())
        };

        Self {
            whois_server: capture(&WHOIS_SERVER_RE).map(|s| s.to_lowercase()),
            registry_url: capture(&REGISTRY_URL_RE),
            rdap_server: capture(&RDAP_SERVER_RE).map(|s| with_trailing_slash(&s)),
            registration_date: capture(&REGISTRATION_DATE_RE)
                .and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok()),
            record_last_updated: capture(&LAST_UPDATED_RE)
                .and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok()),
        }
    }
}

/// Fail unless the reply is a 2xx.
fn require_success(reply: &HttpReply, source: &str) -> Result<(), DomainWatchError> {
    if reply.is_success() {
        Ok(())
    } else {
        Err(DomainWatchError::bootstrap(
            source,
            format!("HTTP {}", reply.status),
        ))
    }
}

/// Download and decode the RDAP bootstrap registry.
pub async fn fetch_bootstrap(
    http: &dyn HttpFetch,
    url: &str,
) -> Result<RdapBootstrap, DomainWatchError> {
    let reply = http.get(url, RequestProfile::Data).await?;
    require_success(&reply, url)?;
    if reply.looks_like_html() {
        return Err(DomainWatchError::bootstrap(
            url,
            "Expected JSON but received an HTML page",
        ));
    }
    RdapBootstrap::parse(&reply.body)
}

/// Download and parse the flat TLD list.
pub async fn fetch_tld_list(http: &dyn HttpFetch, url: &str) -> Result<TldList, DomainWatchError> {
    let reply = http.get(url, RequestProfile::Data).await?;
    require_success(&reply, url)?;
    Ok(TldList::parse(&reply.body))
}

/// IANA RDAP self-lookup for a TLD. HTML bodies are rejected.
pub async fn fetch_iana_rdap(
    http: &dyn HttpFetch,
    url: &str,
) -> Result<TldFacts, DomainWatchError> {
    let reply = http.get(url, RequestProfile::Data).await?;
    require_success(&reply, url)?;
    let json = reply.json()?;
    Ok(TldFacts::from_iana_rdap(&json))
}

/// Scrape the IANA root-zone database page for a TLD.
pub async fn fetch_root_db(http: &dyn HttpFetch, url: &str) -> Result<TldFacts, DomainWatchError> {
    let reply = http.get(url, RequestProfile::Html).await?;
    require_success(&reply, url)?;
    Ok(TldFacts::from_root_db_html(&reply.body))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOOTSTRAP: &str = r#"{
        "description": "RDAP bootstrap file for Domain Name System registrations",
        "publication": "2024-01-30T22:00:01Z",
        "services": [
            [["com", "net"], ["https://rdap.verisign.com/com/v1/"]],
            [["uk"], ["https://rdap.nominet.uk/uk", "https://backup.example/"]]
        ],
        "version": "1.0"
    }"#;

    const ROOT_DB: &str = r#"
        <h2>Registry Information</h2>
        <p>
            <b>URL for registration services:</b> <a href="http://www.verisigninc.com">http://www.verisigninc.com</a><br/>
            <b>WHOIS Server:</b> whois.verisign-grs.com
        </p>
        <p><b>RDAP Server: </b> <a href="https://rdap.verisign.com/com/v1/">https://rdap.verisign.com/com/v1/</a></p>
        <p><i>Record last updated 2023-12-07.  Registration date 1985-01-01.</i></p>
    "#;

    #[test]
    fn test_bootstrap_lookup() {
        let bootstrap = RdapBootstrap::parse(BOOTSTRAP).unwrap();
        assert_eq!(bootstrap.publication.as_deref(), Some("2024-01-30T22:00:01Z"));
        assert_eq!(
            bootstrap.find_rdap_url("net"),
            Some("https://rdap.verisign.com/com/v1/".to_string())
        );
        assert_eq!(
            bootstrap.find_rdap_url(".UK"),
            Some("https://rdap.nominet.uk/uk/".to_string())
        );
        assert_eq!(bootstrap.find_rdap_url("test"), None);
    }

    #[test]
    fn test_bootstrap_entries() {
        let bootstrap = RdapBootstrap::parse(BOOTSTRAP).unwrap();
        let entries: Vec<_> = bootstrap.entries().collect();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].0, ".com");
        assert_eq!(entries[2].1.len(), 2);
    }

    #[test]
    fn test_invalid_bootstrap_is_bootstrap_error() {
        assert!(matches!(
            RdapBootstrap::parse(r#"{"services": "nope"}"#),
            Err(DomainWatchError::BootstrapError { .. })
        ));
    }

    #[test]
    fn test_tld_list_parse() {
        let list = TldList::parse(
            "# Version 2024013100, Last Updated Wed Jan 31 07:07:01 2024 UTC\nAAA\nCOM\n\nXN--P1AI\n",
        );
        assert_eq!(list.version.as_deref(), Some("2024013100"));
        assert_eq!(list.last_updated.as_deref(), Some("2024-01-31 07:07:01"));
        assert_eq!(list.tlds, vec![".aaa", ".com", ".xn--p1ai"]);
    }

    #[test]
    fn test_root_db_scrape() {
        let facts = TldFacts::from_root_db_html(ROOT_DB);
        assert_eq!(facts.whois_server.as_deref(), Some("whois.verisign-grs.com"));
        assert_eq!(facts.registry_url.as_deref(), Some("http://www.verisigninc.com"));
        assert_eq!(
            facts.rdap_server.as_deref(),
            Some("https://rdap.verisign.com/com/v1/")
        );
        assert_eq!(facts.registration_date, NaiveDate::from_ymd_opt(1985, 1, 1));
        assert_eq!(facts.record_last_updated, NaiveDate::from_ymd_opt(2023, 12, 7));
    }

    #[test]
    fn test_iana_rdap_facts() {
        let json = serde_json::json!({
            "objectClassName": "domain",
            "ldhName": "com",
            "port43": "whois.verisign-grs.com",
            "links": [
                {"title": "Registration URL", "href": "http://www.verisigninc.com"}
            ],
            "events": [
                {"eventAction": "registration", "eventDate": "1985-01-01T00:00:00Z"},
                {"eventAction": "last changed", "eventDate": "2023-12-07T00:00:00Z"}
            ]
        });
        let facts = TldFacts::from_iana_rdap(&json);
        assert_eq!(facts.whois_server.as_deref(), Some("whois.verisign-grs.com"));
        assert_eq!(facts.registry_url.as_deref(), Some("http://www.verisigninc.com"));
        assert_eq!(facts.record_last_updated, NaiveDate::from_ymd_opt(2023, 12, 7));
        assert!(!facts.is_empty());
        assert!(TldFacts::from_iana_rdap(&serde_json::json!({})).is_empty());
    }
}
