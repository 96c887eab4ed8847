//! Response parsers.
//!
//! RDAP answers are structured JSON and go through [`parse_rdap`]. Free-text
//! WHOIS answers come in registry dialects; a structural probe picks one of
//! the [`WhoisParser`] strategies for each reply.

mod rdap;
mod standard;
mod uk;

use crate::types::{DomainRecord, LookupOutcome};
use regex::Regex;

pub use rdap::parse_rdap;
pub use standard::StandardParser;
pub use uk::UkParser;

lazy_static::lazy_static! {
    static ref AVAILABLE_RE: Regex = Regex::new(
        r"(?i)(not found|no match|no entries found|no data found|domain not found|no such domain|not registered|available for registration|does not exist|queried object does not exist)"
    ).unwrap();
    static ref SECTION_HEADER_RE: Regex = Regex::new(r"^([^:]+):\s*$").unwrap();
}

/// A free-text WHOIS dialect.
pub trait WhoisParser: Send + Sync {
    /// Short dialect name, for logs.
    fn name(&self) -> &'static str;

    /// Parse a reply from `server` for `domain`.
    fn parse(&self, domain: &str, server: &str, raw: &str) -> DomainRecord;
}

static STANDARD: StandardParser = StandardParser;
static UK: UkParser = UkParser;

/// Whether a WHOIS reply says the domain is not registered.
pub fn is_available(raw: &str) -> bool {
    AVAILABLE_RE.is_match(raw)
}

/// Header of a sectioned reply: a bare `key:` line with nothing after the colon.
pub(crate) fn section_header(line: &str) -> Option<String> {
    let line = line.trim();
    if line.starts_with('%') || line.starts_with('#') {
        return None;
    }
    SECTION_HEADER_RE
        .captures(line)
        .map(|c| c[1].trim().to_lowercase())
}

/// Pick the dialect for a reply.
///
/// Replies laid out in sections (a header line followed by indented values)
/// go to [`UkParser`], everything else to [`StandardParser`].
pub fn select_parser(raw: &str) -> &'static dyn WhoisParser {
    if raw.lines().any(|line| section_header(line).is_some()) {
        &UK
    } else {
        &STANDARD
    }
}

/// Parse a WHOIS reply into a lookup outcome.
///
/// The availability check runs before any dialect.
pub fn parse_whois(domain: &str, server: &str, raw: &str) -> LookupOutcome {
    if is_available(raw) {
        return LookupOutcome::Available(DomainRecord::available(
            domain,
            server,
            raw.to_string(),
        ));
    }

    let parser = select_parser(raw);
    tracing::debug!(domain = %domain, server = %server, dialect = parser.name(), "Parsing WHOIS reply");
    LookupOutcome::Resolved(parser.parse(domain, server, raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NOT_REGISTERED;

    #[test]
    fn test_availability_any_case() {
        assert!(is_available("No match for \"FREE-NAME.COM\"."));
        assert!(is_available("NO MATCH"));
        assert!(is_available("%% The queried object does not exist: DOMAIN NOT FOUND"));
        assert!(!is_available("Domain Name: EXAMPLE.COM\nRegistrar: Example Inc."));
    }

    #[test]
    fn test_parse_whois_available() {
        let outcome = parse_whois("free.test", "whois.nic.test", "no match for free.test");
        assert!(outcome.is_available());
        let record = outcome.record().unwrap();
        assert_eq!(record.registrar, NOT_REGISTERED);
        assert_eq!(record.status, vec!["AVAILABLE"]);
    }

    #[test]
    fn test_select_parser_probe() {
        let standard = "Domain Name: EXAMPLE.COM\nRegistrar: Example Inc.\n";
        assert_eq!(select_parser(standard).name(), "standard");

        let sectioned = "    Domain name:\n        example.co.uk\n\n    Registrar:\n        Example Ltd\n";
        assert_eq!(select_parser(sectioned).name(), "uk");
    }

    #[test]
    fn test_comment_lines_are_not_headers() {
        assert_eq!(section_header("% Terms of use:"), None);
        assert_eq!(section_header("Registrar:"), Some("registrar".to_string()));
        assert_eq!(section_header("Registrar: Example"), None);
    }
}
