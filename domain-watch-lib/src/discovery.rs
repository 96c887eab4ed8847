//! TLD endpoint discovery.
//!
//! Resolves the RDAP base URL and WHOIS host serving a TLD. Sources are
//! consulted in priority order and each field stops at its first hit:
//!
//! 1. the local TLD directory
//! 2. IANA WHOIS (`whois:` line) for the WHOIS host
//! 3. the IANA RDAP bootstrap registry for the RDAP URL
//! 4. the IANA root-zone database page
//!
//! URLs are only ever taken from these sources, never derived from a pattern.

use crate::protocols::http::HttpFetch;
use crate::protocols::registry::{fetch_bootstrap, fetch_root_db, RdapBootstrap};
use crate::protocols::whois::{parse_iana_whois_field, WhoisQuery};
use crate::store::TldDirectory;
use crate::types::{Endpoints, IanaSources};
use crate::utils::normalize_tld;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::OnceCell;

/// Registries whose WHOIS host IANA does not advertise.
const WHOIS_OVERRIDES: &[(&str, &str)] = &[(".pro", "whois.afilias.net")];

/// Storage for discovered endpoints, keyed by `(scope, tld)`.
///
/// Discovery results are correct without any cache hit.
pub trait EndpointCache: Send + Sync {
    fn get(&self, scope: &str, tld: &str) -> Option<Endpoints>;
    fn set(&self, scope: &str, tld: &str, endpoints: &Endpoints);
}

/// Cache that stores nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCache;

impl EndpointCache for NoopCache {
    fn get(&self, _scope: &str, _tld: &str) -> Option<Endpoints> {
        None
    }

    fn set(&self, _scope: &str, _tld: &str, _endpoints: &Endpoints) {}
}

/// Process-local cache for the duration of one run.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<(String, String), Endpoints>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EndpointCache for MemoryCache {
    fn get(&self, scope: &str, tld: &str) -> Option<Endpoints> {
        self.entries
            .lock()
            .ok()?
            .get(&(scope.to_string(), tld.to_string()))
            .cloned()
    }

    fn set(&self, scope: &str, tld: &str, endpoints: &Endpoints) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert((scope.to_string(), tld.to_string()), endpoints.clone());
        }
    }
}

/// Finds the endpoints serving a TLD.
pub struct EndpointDiscoverer {
    directory: Arc<dyn TldDirectory>,
    http: Arc<dyn HttpFetch>,
    whois: Arc<dyn WhoisQuery>,
    cache: Arc<dyn EndpointCache>,
    scope: String,
    sources: IanaSources,
    bootstrap: OnceCell<RdapBootstrap>,
}

impl EndpointDiscoverer {
    pub fn new(
        directory: Arc<dyn TldDirectory>,
        http: Arc<dyn HttpFetch>,
        whois: Arc<dyn WhoisQuery>,
        sources: IanaSources,
    ) -> Self {
        Self {
            directory,
            http,
            whois,
            cache: Arc::new(NoopCache),
            scope: "default".to_string(),
            sources,
            bootstrap: OnceCell::new(),
        }
    }

    /// Use `cache` for results, namespaced under `scope`.
    pub fn with_cache<S: Into<String>>(mut self, cache: Arc<dyn EndpointCache>, scope: S) -> Self {
        self.cache = cache;
        self.scope = scope.into();
        self
    }

    /// Discover the endpoints for `tld` (with or without leading dot).
    ///
    /// Never fails: every source error is logged and treated as a miss, so
    /// the worst case is an empty [`Endpoints`].
    pub async fn discover(&self, tld: &str) -> Endpoints {
        let tld = normalize_tld(tld);

        if let Some(hit) = self.cache.get(&self.scope, &tld) {
            tracing::debug!(tld = %tld, "Endpoint cache hit");
            return hit;
        }

        let mut endpoints = Endpoints::default();

        match self.directory.get_by_tld(&tld).await {
            Ok(Some(row)) => {
                endpoints.whois_server = row.whois_server.clone().filter(|s| !s.is_empty());
                endpoints.rdap_url = row.preferred_rdap_url();
            }
            Ok(None) => tracing::debug!(tld = %tld, "TLD not in directory"),
            Err(e) => tracing::warn!(tld = %tld, error = %e, "Directory lookup failed"),
        }

        if endpoints.whois_server.is_none() {
            endpoints.whois_server = self.iana_whois_server(&tld).await;
        }

        if endpoints.rdap_url.is_none() {
            endpoints.rdap_url = self.bootstrap_rdap_url(&tld).await;
        }

        if endpoints.rdap_url.is_none() {
            let url = self.sources.root_db_page(&tld);
            match fetch_root_db(self.http.as_ref(), &url).await {
                Ok(facts) => {
                    endpoints.rdap_url = facts.rdap_server;
                    if endpoints.whois_server.is_none() {
                        endpoints.whois_server = facts.whois_server;
                    }
                }
                Err(e) => tracing::debug!(tld = %tld, error = %e, "Root-zone page unavailable"),
            }
        }

        tracing::debug!(
            tld = %tld,
            rdap = ?endpoints.rdap_url,
            whois = ?endpoints.whois_server,
            "Discovered endpoints"
        );

        self.cache.set(&self.scope, &tld, &endpoints);
        endpoints
    }

    /// Discover for a domain's TLD candidates.
    ///
    /// The two-label form (`co.uk`) is tried first; only if it yields
    /// neither field is the single label (`uk`) tried.
    pub async fn discover_compound(&self, compound: Option<&str>, single: &str) -> Endpoints {
        if let Some(compound) = compound {
            let endpoints = self.discover(compound).await;
            if !endpoints.is_empty() {
                return endpoints;
            }
            tracing::debug!(compound = %compound, single = %single, "Falling back to single-label TLD");
        }
        self.discover(single).await
    }

    async fn iana_whois_server(&self, tld: &str) -> Option<String> {
        let label = tld.trim_start_matches('.');
        let found = match self.whois.query(&self.sources.whois_server, label).await {
            Ok(response) => parse_iana_whois_field(&response),
            Err(e) => {
                tracing::debug!(tld = %tld, error = %e, "IANA WHOIS query failed");
                None
            }
        };

        found.or_else(|| {
            WHOIS_OVERRIDES
                .iter()
                .find(|(t, _)| *t == tld)
                .map(|(_, host)| host.to_string())
        })
    }

    async fn bootstrap_rdap_url(&self, tld: &str) -> Option<String> {
        let bootstrap = self
            .bootstrap
            .get_or_try_init(|| fetch_bootstrap(self.http.as_ref(), &self.sources.rdap_bootstrap_url))
            .await;

        match bootstrap {
            Ok(bootstrap) => bootstrap.find_rdap_url(tld),
            Err(e) => {
                tracing::debug!(tld = %tld, error = %e, "RDAP bootstrap unavailable");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_cache_never_hits() {
        let cache = NoopCache;
        cache.set("s", ".com", &Endpoints::default());
        assert!(cache.get("s", ".com").is_none());
    }

    #[test]
    fn test_memory_cache_is_scoped() {
        let cache = MemoryCache::new();
        let endpoints = Endpoints {
            rdap_url: Some("https://rdap.verisign.com/com/v1/".into()),
            whois_server: Some("whois.verisign-grs.com".into()),
        };
        cache.set("run-1", ".com", &endpoints);
        assert_eq!(cache.get("run-1", ".com"), Some(endpoints));
        assert!(cache.get("run-2", ".com").is_none());
        assert_eq!(cache.len(), 1);
    }
}
