//! Utility functions for domain processing, TLD labels and dates.
//!
//! This module contains helpers for domain name validation, TLD candidate
//! derivation, URL tidying and the date normalization shared by the parsers,
//! the import pipeline and the update checker.

use crate::error::DomainWatchError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Canonical timestamp format used for upstream provenance comparisons.
pub const CANONICAL_DATETIME: &str = "%Y-%m-%d %H:%M:%S";

/// Validate a domain name and return it trimmed and lowercased.
///
/// A trailing root dot is accepted and removed.
pub fn validate_domain(domain: &str) -> Result<String, DomainWatchError> {
    let domain = domain.trim().trim_end_matches('.').to_lowercase();

    if domain.is_empty() {
        return Err(DomainWatchError::invalid_domain(
            domain,
            "Domain name cannot be empty",
        ));
    }

    if domain.len() > 253 {
        return Err(DomainWatchError::invalid_domain(
            domain,
            "Domain name longer than 253 characters",
        ));
    }

    if !domain.contains('.') {
        return Err(DomainWatchError::invalid_domain(
            domain,
            "Domain must contain at least one dot",
        ));
    }

    for part in domain.split('.') {
        if part.is_empty() || part.len() > 63 {
            return Err(DomainWatchError::invalid_domain(
                &domain,
                "Each label must be 1-63 characters",
            ));
        }

        // Cannot start or end with hyphen
        if part.starts_with('-') || part.ends_with('-') {
            return Err(DomainWatchError::invalid_domain(
                &domain,
                "Labels cannot start or end with a hyphen",
            ));
        }

        // Alphanumeric (including IDN) and hyphens only
        if !part.chars().all(|c| c.is_alphanumeric() || c == '-') {
            return Err(DomainWatchError::invalid_domain(
                &domain,
                "Labels may only contain letters, digits and hyphens",
            ));
        }
    }

    Ok(domain)
}

/// Normalize a TLD label: trimmed, lowercase, single leading dot.
///
/// `"COM"`, `".com"` and `"com."` all become `".com"`.
pub fn normalize_tld(tld: &str) -> String {
    let bare = tld.trim().trim_matches('.').to_lowercase();
    format!(".{}", bare)
}

/// TLD candidates for a domain: `(compound, single)`.
///
/// The compound candidate (last two labels) is only produced for names with
/// at least three labels, e.g. `example.co.uk` gives `(Some("co.uk"), "uk")`.
pub fn tld_candidates(domain: &str) -> Result<(Option<String>, String), DomainWatchError> {
    let labels: Vec<&str> = domain.split('.').filter(|l| !l.is_empty()).collect();

    if labels.len() < 2 {
        return Err(DomainWatchError::invalid_domain(
            domain,
            "Domain must contain at least one dot",
        ));
    }

    let single = labels[labels.len() - 1].to_lowercase();
    let compound = if labels.len() >= 3 {
        Some(format!(
            "{}.{}",
            labels[labels.len() - 2].to_lowercase(),
            single
        ))
    } else {
        None
    };

    Ok((compound, single))
}

/// Append a `/` unless the URL already ends with one.
pub fn with_trailing_slash(url: &str) -> String {
    if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{}/", url)
    }
}

/// Host part of a URL, if it parses.
pub fn url_host(url: &str) -> Option<String> {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_lowercase()))
}

/// Canonicalize an upstream timestamp to UTC `Y-m-d H:i:s`.
///
/// ISO-8601 values carrying an offset are converted to UTC; bare
/// `Y-m-d H:i:s` (or `Y-m-dTH:i:s`) values are assumed to already be UTC and
/// bare dates become midnight. Anything else is returned trimmed and
/// unchanged so comparisons still behave as plain string equality.
pub fn normalize_date(value: &str) -> String {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return dt.with_timezone(&Utc).format(CANONICAL_DATETIME).to_string();
    }

    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return dt.format(CANONICAL_DATETIME).to_string();
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        if let Some(dt) = date.and_hms_opt(0, 0, 0) {
            return dt.format(CANONICAL_DATETIME).to_string();
        }
    }

    value.to_string()
}

/// Parse the date part of a registry timestamp.
///
/// Covers the RDAP (RFC 3339) form and the common free-text WHOIS layouts.
pub fn parse_plain_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }

    for format in [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt.date());
        }
    }

    // WHOIS servers append zones and notes ("2025-08-13 (UTC)", "2025-08-13T04:00:00Z UTC")
    let head = value.split_whitespace().next().unwrap_or(value);
    if head != value {
        if let Some(date) = parse_plain_date(head) {
            return Some(date);
        }
    }

    for format in [
        "%Y-%m-%d", "%d-%b-%Y", "%d.%m.%Y", "%Y.%m.%d", "%Y/%m/%d", "%d/%m/%Y", "%Y%m%d",
    ] {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Some(date);
        }
    }

    None
}

/// Format a registry timestamp as a plain `YYYY-MM-DD` date.
///
/// Values that do not parse are returned trimmed and unchanged.
pub fn plain_date(value: &str) -> String {
    parse_plain_date(value)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| value.trim().to_string())
}
