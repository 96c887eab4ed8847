//! RDAP (Registration Data Access Protocol) transport.
//!
//! This module builds RDAP domain query URLs and classifies replies into
//! "found", "not found" and "unusable". Turning a found reply into a
//! [`crate::DomainRecord`] is the job of [`crate::parser::parse_rdap`].

use crate::error::DomainWatchError;
use crate::protocols::http::{HttpFetch, RequestProfile};
use crate::utils::with_trailing_slash;
use std::sync::Arc;

/// Build the RDAP domain query URL for `name` under `base`.
///
/// Bases already ending in `domain/` are used as-is, everything else gets
/// `domain/` appended after a normalized trailing slash.
pub fn build_query_url(base: &str, name: &str) -> String {
    let base = with_trailing_slash(base.trim());
    let name = name.trim().to_lowercase();
    if base.ends_with("domain/") {
        format!("{}{}", base, name)
    } else {
        format!("{}domain/{}", base, name)
    }
}

/// Classified RDAP reply.
#[derive(Debug, Clone)]
pub enum RdapReply {
    /// HTTP 200 with a decodable JSON object
    Found(serde_json::Value),
    /// The server answered with an RDAP error object carrying `errorCode: 404`
    NotFound,
    /// Anything else; callers fall back to WHOIS
    Unusable(DomainWatchError),
}

/// RDAP client for domain lookups.
///
/// Requests run under the [`RequestProfile::Rdap`] budget: one attempt, RDAP
/// `Accept` header, TLS verified, redirects followed.
#[derive(Clone)]
pub struct RdapClient {
    fetch: Arc<dyn HttpFetch>,
}

impl RdapClient {
    pub fn new(fetch: Arc<dyn HttpFetch>) -> Self {
        Self { fetch }
    }

    /// Query `name` against the RDAP service at `base`.
    ///
    /// Never fails: transport and protocol problems come back as
    /// [`RdapReply::Unusable`].
    pub async fn lookup(&self, base: &str, name: &str) -> RdapReply {
        let url = build_query_url(base, name);
        tracing::debug!(url = %url, "RDAP query");

        let reply = match self.fetch.get(&url, RequestProfile::Rdap).await {
            Ok(reply) => reply,
            Err(e) => return RdapReply::Unusable(e),
        };

        let body = match reply.json() {
            Ok(body) => body,
            Err(e) => {
                return RdapReply::Unusable(DomainWatchError::rdap_with_status(
                    name,
                    e.to_string(),
                    reply.status,
                ))
            }
        };

        if is_not_found(&body) {
            return RdapReply::NotFound;
        }

        if reply.status == 200 && body.is_object() {
            RdapReply::Found(body)
        } else {
            RdapReply::Unusable(DomainWatchError::rdap_with_status(
                name,
                format!("RDAP server returned status {}", reply.status),
                reply.status,
            ))
        }
    }
}

/// Whether an RDAP body is an error object for a missing domain.
fn is_not_found(body: &serde_json::Value) -> bool {
    match body.get("errorCode") {
        Some(serde_json::Value::Number(n)) => n.as_u64() == Some(404),
        Some(serde_json::Value::String(s)) => s.trim() == "404",
        _ => false,
    }
}
