//! Domain record resolution.
//!
//! RDAP is tried first when the TLD has an RDAP service; WHOIS answers
//! everything else, following at most one referral.

use crate::discovery::EndpointDiscoverer;
use crate::error::DomainWatchError;
use crate::parser::{is_available, parse_rdap, parse_whois};
use crate::protocols::rdap::{RdapClient, RdapReply};
use crate::protocols::whois::{find_referral, WhoisQuery};
use crate::types::{DomainRecord, LookupOutcome};
use crate::utils::{tld_candidates, url_host, validate_domain};
use std::sync::Arc;

/// Resolves a domain name into a [`DomainRecord`].
pub struct DomainResolver {
    discoverer: Arc<EndpointDiscoverer>,
    rdap: RdapClient,
    whois: Arc<dyn WhoisQuery>,
    /// Host queried when discovery found no WHOIS server
    default_whois: String,
}

impl DomainResolver {
    pub fn new(
        discoverer: Arc<EndpointDiscoverer>,
        rdap: RdapClient,
        whois: Arc<dyn WhoisQuery>,
        default_whois: impl Into<String>,
    ) -> Self {
        Self {
            discoverer,
            rdap,
            whois,
            default_whois: default_whois.into(),
        }
    }

    /// Look up one domain.
    pub async fn resolve(&self, domain: &str) -> LookupOutcome {
        let domain = match validate_domain(domain) {
            Ok(domain) => domain,
            Err(e) => return LookupOutcome::Failed(e),
        };
        let (compound, single) = match tld_candidates(&domain) {
            Ok(candidates) => candidates,
            Err(e) => return LookupOutcome::Failed(e),
        };

        let endpoints = self
            .discoverer
            .discover_compound(compound.as_deref(), &single)
            .await;

        if let Some(base) = &endpoints.rdap_url {
            let host = url_host(base).unwrap_or_else(|| base.clone());
            match self.rdap.lookup(base, &domain).await {
                RdapReply::Found(json) => {
                    return LookupOutcome::Resolved(parse_rdap(&domain, &json, &host));
                }
                RdapReply::NotFound => {
                    return LookupOutcome::Available(DomainRecord::available(
                        &domain,
                        DomainRecord::rdap_provenance(&host),
                        r#"{"errorCode":404}"#.to_string(),
                    ));
                }
                RdapReply::Unusable(e) => {
                    tracing::debug!(domain = %domain, error = %e, "RDAP unusable, falling back to WHOIS");
                }
            }
        }

        let server = endpoints
            .whois_server
            .clone()
            .unwrap_or_else(|| self.default_whois.clone());
        self.resolve_whois(&domain, &server).await
    }

    async fn resolve_whois(&self, domain: &str, server: &str) -> LookupOutcome {
        let response = match self.query(server, domain).await {
            Ok(response) => response,
            Err(e) => return LookupOutcome::Failed(e),
        };

        if is_available(&response) {
            return LookupOutcome::Available(DomainRecord::available(domain, server, response));
        }

        if let Some(referral) = find_referral(&response, server) {
            tracing::debug!(domain = %domain, from = %server, to = %referral, "Following WHOIS referral");
            match self.query(&referral, domain).await {
                Ok(referred) => return parse_whois(domain, &referral, &referred),
                Err(e) => {
                    tracing::debug!(domain = %domain, server = %referral, error = %e, "Referral failed, using first reply");
                }
            }
        }

        parse_whois(domain, server, &response)
    }

    /// WHOIS query that treats an empty reply as a failure.
    async fn query(&self, server: &str, domain: &str) -> Result<String, DomainWatchError> {
        let response = self.whois.query(server, domain).await?;
        if response.trim().is_empty() {
            Err(DomainWatchError::whois(server, "Empty reply"))
        } else {
            Ok(response)
        }
    }
}
