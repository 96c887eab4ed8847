//! Sectioned WHOIS dialect (Nominet and registries modelled on it).
//!
//! ```text
//!     Registrar:
//!         Nominet UK [Tag = NOMINET]
//!         URL: https://www.nominet.uk
//!
//!     Name servers:
//!         dns1.nic.uk               213.248.216.1
//!         dns2.nic.uk
//! ```

use super::standard::FieldCollector;
use super::{section_header, WhoisParser};
use crate::types::DomainRecord;
use regex::Regex;

lazy_static::lazy_static! {
    static ref REGISTRAR_TAG: Regex = Regex::new(r"\s*\[Tag\s*=[^\]]*\]\s*$").unwrap();
    static ref NUMBERED_LINE: Regex = Regex::new(r"^\d+\.").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    /// Next non-blank line is the registrar
    Registrar,
    /// Next non-blank line is the registrant
    Registrant,
    /// Following lines are nameservers until a blank line
    NameServers { seen: bool },
    Other,
}

impl Section {
    fn from_header(header: &str) -> Self {
        match header {
            "registrar" => Self::Registrar,
            "registrant" => Self::Registrant,
            "name servers" | "nameservers" => Self::NameServers { seen: false },
            _ => Self::Other,
        }
    }
}

/// Parser for section-structured replies.
#[derive(Debug, Clone, Copy, Default)]
pub struct UkParser;

impl WhoisParser for UkParser {
    fn name(&self) -> &'static str {
        "uk"
    }

    fn parse(&self, domain: &str, server: &str, raw: &str) -> DomainRecord {
        let mut collector = FieldCollector::new(domain, server, raw);
        let mut section = Section::Other;

        for line in raw.lines() {
            let trimmed = line.trim();

            if trimmed.is_empty() {
                if section == (Section::NameServers { seen: true }) {
                    section = Section::Other;
                }
                continue;
            }

            if let Some(header) = section_header(trimmed) {
                section = Section::from_header(&header);
                continue;
            }

            match section {
                Section::Registrar => {
                    collector.set_registrar(&REGISTRAR_TAG.replace(trimmed, ""));
                    section = Section::Other;
                }
                Section::Registrant => {
                    collector.set_owner(trimmed);
                    section = Section::Other;
                }
                Section::NameServers { .. } => {
                    if trimmed.starts_with("This")
                        || trimmed.starts_with("--")
                        || NUMBERED_LINE.is_match(trimmed)
                    {
                        continue;
                    }
                    if let Some(token) = trimmed.split_whitespace().next() {
                        if token.contains('.') {
                            collector.nameserver(token);
                            section = Section::NameServers { seen: true };
                        }
                    }
                }
                Section::Other => collector.line(trimmed),
            }
        }

        collector.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOMINET: &str = "
    Domain name:
        nominet.uk

    Data validation:
        Nominet was able to match the registrant's name and address against a 3rd party data source on 10-Dec-2012

    Registrar:
        Nominet UK [Tag = NOMINET]
        URL: https://www.nominet.uk

    Relevant dates:
        Registered on: 26-Aug-1996
        Expiry date:  26-Aug-2030
        Last updated:  23-Jan-2024

    Registration status:
        Registered until expiry date.

    Name servers:
        dns1.nic.uk               213.248.216.1
        dns2.nic.uk

    WHOIS lookup made at 14:20:55 09-Feb-2024

    --
    This WHOIS information is provided for free by Nominet UK.
";

    #[test]
    fn test_nominet_reply() {
        let record = UkParser.parse("nominet.uk", "whois.nic.uk", NOMINET);
        assert_eq!(record.registrar, "Nominet UK");
        assert_eq!(record.creation_date.as_deref(), Some("1996-08-26"));
        assert_eq!(record.expiration_date.as_deref(), Some("2030-08-26"));
        assert_eq!(record.updated_date.as_deref(), Some("2024-01-23"));
        assert_eq!(record.nameservers, vec!["dns1.nic.uk", "dns2.nic.uk"]);
    }

    #[test]
    fn test_registrar_tag_is_stripped() {
        let record = UkParser.parse(
            "example.co.uk",
            "whois.nic.uk",
            "Registrar:\n    Nominet UK [Tag = NOMINET]\n",
        );
        assert_eq!(record.registrar, "Nominet UK");
    }

    #[test]
    fn test_registrant_section_sets_owner() {
        let raw = "    Registrant:\n        Example Holdings Ltd\n\n    Registrant type:\n        UK Limited Company\n";
        let record = UkParser.parse("example.co.uk", "whois.nic.uk", raw);
        assert_eq!(record.owner.as_deref(), Some("Example Holdings Ltd"));
    }

    #[test]
    fn test_blank_line_closes_name_servers() {
        let raw = "Name servers:\n    ns1.example.co.uk\n\n    stray.example.co.uk\n";
        let record = UkParser.parse("example.co.uk", "whois.nic.uk", raw);
        assert_eq!(record.nameservers, vec!["ns1.example.co.uk"]);
    }
}
