//! `key: value` WHOIS dialect used by most gTLD and many ccTLD registries.

use super::WhoisParser;
use crate::types::{DomainRecord, UNKNOWN_REGISTRAR};
use crate::utils::plain_date;
use regex::Regex;

lazy_static::lazy_static! {
    static ref EXPIRATION_KEY: Regex = Regex::new(r"expir|expiry|expire|paid-till|renewal").unwrap();
    static ref UPDATED_KEY: Regex = Regex::new(r"updated date|last updated").unwrap();
    static ref CREATION_KEY: Regex = Regex::new(r"creat|registered").unwrap();
    static ref REGISTRAR_EXCLUDED: Regex =
        Regex::new(r"\b(url|whois|iana|phone|email|fax|id|contact)\b").unwrap();
    static ref PHONE_LIKE: Regex = Regex::new(r"^\+?[\d\s().\-]+$").unwrap();
    static ref ABUSE_EMAIL_KEY: Regex = Regex::new(r"abuse.*email").unwrap();
    static ref NAMESERVER_KEY: Regex = Regex::new(r"name server|nserver|nameserver").unwrap();
    static ref OWNER_KEY: Regex = Regex::new(r"registrant|owner").unwrap();
    static ref OWNER_EXCLUDED: Regex = Regex::new(r"email|phone|fax").unwrap();
}

/// Accumulates [`DomainRecord`] fields from `key: value` lines.
///
/// Scalar fields keep the first value seen; status tokens and nameservers
/// are collected as ordered sets.
pub(crate) struct FieldCollector {
    record: DomainRecord,
}

impl FieldCollector {
    pub(crate) fn new(domain: &str, server: &str, raw: &str) -> Self {
        let mut record = DomainRecord::new(domain, server);
        record.raw_data = raw.to_string();
        Self { record }
    }

    /// Feed one reply line. Lines without a `key: value` shape are ignored.
    pub(crate) fn line(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() || line.starts_with('%') || line.starts_with('#') || line.starts_with(">>>") {
            return;
        }
        if let Some((key, value)) = line.split_once(':') {
            self.field(key, value);
        }
    }

    pub(crate) fn field(&mut self, key: &str, value: &str) {
        let key = key.trim().to_lowercase();
        let value = value.trim();
        if key.is_empty() || value.is_empty() {
            return;
        }

        let record = &mut self.record;

        if EXPIRATION_KEY.is_match(&key) {
            set_once(&mut record.expiration_date, plain_date(value));
        } else if UPDATED_KEY.is_match(&key) {
            set_once(&mut record.updated_date, plain_date(value));
        } else if CREATION_KEY.is_match(&key) {
            set_once(&mut record.creation_date, plain_date(value));
        } else if is_status_key(&key) {
            let token = value
                .split_whitespace()
                .next()
                .map(|t| t.trim_end_matches(|c: char| matches!(c, ',' | ';' | '.')))
                .filter(|t| !t.is_empty());
            if let Some(token) = token {
                push_unique(&mut record.status, token.to_string());
            }
        } else if key == "registrar whois server" {
            set_once(&mut record.registrar_whois_server, value.to_lowercase());
        } else if key.starts_with("registrar url") {
            set_once(&mut record.registrar_url, value.to_string());
        } else if key.starts_with("registrar") && !REGISTRAR_EXCLUDED.is_match(&key) {
            if plausible_registrar(value) {
                self.set_registrar(value);
            }
        } else if ABUSE_EMAIL_KEY.is_match(&key) {
            set_once(&mut record.abuse_email, value.to_string());
        } else if NAMESERVER_KEY.is_match(&key) {
            self.nameserver(value);
        } else if OWNER_KEY.is_match(&key) && !OWNER_EXCLUDED.is_match(&key) {
            set_once(&mut record.owner, value.to_string());
        }
    }

    /// Set the registrar unless one was already found.
    pub(crate) fn set_registrar(&mut self, value: &str) {
        if self.record.registrar == UNKNOWN_REGISTRAR {
            self.record.registrar = value.trim().to_string();
        }
    }

    pub(crate) fn set_owner(&mut self, value: &str) {
        set_once(&mut self.record.owner, value.trim().to_string());
    }

    /// Add a nameserver from a value such as `ns1.example.com. 192.0.2.1`.
    pub(crate) fn nameserver(&mut self, value: &str) {
        let Some(host) = value.split_whitespace().next() else {
            return;
        };
        let host = host.trim_end_matches('.').to_lowercase();
        if !host.is_empty() {
            push_unique(&mut self.record.nameservers, host);
        }
    }

    pub(crate) fn finish(self) -> DomainRecord {
        self.record
    }
}

/// `status` or `state` as the last word of the key ("Domain Status", "state").
fn is_status_key(key: &str) -> bool {
    matches!(key.split_whitespace().last(), Some("status") | Some("state"))
}

/// Rejects phone numbers, e-mail addresses, bare numbers and short tokens.
fn plausible_registrar(value: &str) -> bool {
    value.len() > 3 && !value.contains('@') && !PHONE_LIKE.is_match(value)
}

fn set_once(slot: &mut Option<String>, value: String) {
    if slot.is_none() && !value.is_empty() {
        *slot = Some(value);
    }
}

fn push_unique(list: &mut Vec<String>, value: String) {
    if !list.contains(&value) {
        list.push(value);
    }
}

/// Parser for flat `key: value` replies.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardParser;

impl WhoisParser for StandardParser {
    fn name(&self) -> &'static str {
        "standard"
    }

    fn parse(&self, domain: &str, server: &str, raw: &str) -> DomainRecord {
        let mut collector = FieldCollector::new(domain, server, raw);
        for line in raw.lines() {
            collector.line(line);
        }
        collector.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VERISIGN: &str = "   Domain Name: GOOGLE.COM
   Registry Domain ID: 2138514_DOMAIN_COM-VRSN
   Registrar WHOIS Server: whois.markmonitor.com
   Registrar URL: http://www.markmonitor.com
   Updated Date: 2019-09-09T15:39:04Z
   Creation Date: 1997-09-15T04:00:00Z
   Registry Expiry Date: 2028-09-14T04:00:00Z
   Registrar: MarkMonitor Inc.
   Registrar IANA ID: 292
   Registrar Abuse Contact Email: abusecomplaints@markmonitor.com
   Registrar Abuse Contact Phone: +1.2086851750
   Domain Status: clientDeleteProhibited https://icann.org/epp#clientDeleteProhibited
   Domain Status: clientTransferProhibited https://icann.org/epp#clientTransferProhibited
   Domain Status: clientDeleteProhibited https://icann.org/epp#clientDeleteProhibited
   Name Server: NS1.GOOGLE.COM
   Name Server: NS2.GOOGLE.COM
   Name Server: ns1.google.com.
>>> Last update of whois database: 2024-02-09T14:20:55Z <<<
";

    #[test]
    fn test_verisign_reply() {
        let record = StandardParser.parse("google.com", "whois.verisign-grs.com", VERISIGN);
        assert_eq!(record.registrar, "MarkMonitor Inc.");
        assert_eq!(record.registrar_url.as_deref(), Some("http://www.markmonitor.com"));
        assert_eq!(
            record.registrar_whois_server.as_deref(),
            Some("whois.markmonitor.com")
        );
        assert_eq!(record.expiration_date.as_deref(), Some("2028-09-14"));
        assert_eq!(record.creation_date.as_deref(), Some("1997-09-15"));
        assert_eq!(record.updated_date.as_deref(), Some("2019-09-09"));
        assert_eq!(
            record.abuse_email.as_deref(),
            Some("abusecomplaints@markmonitor.com")
        );
        assert_eq!(
            record.status,
            vec!["clientDeleteProhibited", "clientTransferProhibited"]
        );
        assert_eq!(record.nameservers, vec!["ns1.google.com", "ns2.google.com"]);
        assert_eq!(record.whois_server, "whois.verisign-grs.com");
        assert_eq!(record.raw_data, VERISIGN);
    }

    #[test]
    fn test_first_match_wins() {
        let raw = "Registry Expiry Date: 2028-09-14T04:00:00Z\nRegistrar Registration Expiration Date: 2028-09-13T00:00:00Z\n";
        let record = StandardParser.parse("a.com", "whois.test", raw);
        assert_eq!(record.expiration_date.as_deref(), Some("2028-09-14"));
        assert_eq!(record.registrar, UNKNOWN_REGISTRAR);
    }

    #[test]
    fn test_registrar_value_filters() {
        let raw = "Registrar: 123\nRegistrar: +1.555.0100\nRegistrar: ops@registrar.test\nRegistrar: Real Registrar LLC\n";
        let record = StandardParser.parse("a.test", "whois.test", raw);
        assert_eq!(record.registrar, "Real Registrar LLC");
    }

    #[test]
    fn test_cctld_style_keys() {
        let raw = "domain:     EXAMPLE.RU\nnserver:    a.dns.ripn.net.\nnserver:    b.dns.ripn.net. 194.85.252.62\nstate:      REGISTERED, DELEGATED, VERIFIED\norg:        Example LLC\nregistrar:  RU-CENTER-RU\ncreated:    1997-11-28T21:00:00Z\npaid-till:  2025-12-01T21:00:00Z\n";
        let record = StandardParser.parse("example.ru", "whois.tcinet.ru", raw);
        assert_eq!(record.nameservers, vec!["a.dns.ripn.net", "b.dns.ripn.net"]);
        assert_eq!(record.status, vec!["REGISTERED"]);
        assert_eq!(record.registrar, "RU-CENTER-RU");
        assert_eq!(record.creation_date.as_deref(), Some("1997-11-28"));
        assert_eq!(record.expiration_date.as_deref(), Some("2025-12-01"));
    }

    #[test]
    fn test_status_token_drops_trailing_punctuation() {
        let raw = "Status: ACTIVE;\nDomain Status: ok. https://icann.org/epp#ok\nstatus: ,\n";
        let record = StandardParser.parse("example.test", "whois.test", raw);
        assert_eq!(record.status, vec!["ACTIVE", "ok"]);
    }

    #[test]
    fn test_owner_excludes_contact_fields() {
        let raw = "Registrant Email: owner@example.test\nRegistrant Phone: +1.5550100\nRegistrant Organization: Example Org\n";
        let record = StandardParser.parse("example.test", "whois.test", raw);
        assert_eq!(record.owner.as_deref(), Some("Example Org"));
    }
}
