//! Protocol implementations for registration lookups.
//!
//! This module contains the transports used to reach registries (HTTP for
//! RDAP and IANA data, TCP for WHOIS) and the parsers for IANA's own
//! registry sources.

/// HTTP transport with per-purpose request profiles
pub mod http;

/// RDAP (Registration Data Access Protocol) implementation
pub mod rdap;

/// WHOIS protocol implementation
pub mod whois;

/// IANA bootstrap, TLD list and root-zone database sources
pub mod registry;

// Re-export commonly used functions and types
pub use http::{HttpFetch, HttpReply, ReqwestFetcher, RequestProfile, RDAP_MEDIA_TYPE};
pub use rdap::{build_query_url, RdapClient, RdapReply};
pub use registry::{RdapBootstrap, TldFacts, TldList};
pub use whois::{find_referral, parse_iana_whois_field, WhoisClient, WhoisQuery};
