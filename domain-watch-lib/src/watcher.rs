//! High-level entry point.
//!
//! [`DomainWatcher`] wires the store, transports, endpoint discovery, the
//! resolver, the import pipeline and the update checker together from one
//! [`WatchConfig`].

use crate::discovery::{EndpointCache, EndpointDiscoverer, MemoryCache};
use crate::error::DomainWatchError;
use crate::import::{ImportPipeline, StepOutcome};
use crate::protocols::http::{HttpFetch, ReqwestFetcher};
use crate::protocols::rdap::RdapClient;
use crate::protocols::whois::{WhoisClient, WhoisQuery};
use crate::resolver::DomainResolver;
use crate::store::{open_store, Store};
use crate::types::{Endpoints, ImportLog, ImportType, LookupOutcome, WatchConfig};
use crate::updates::{UpdateChecker, UpdateReport};
use std::path::Path;
use std::sync::Arc;

/// Lookups, discovery and imports over a shared store.
///
/// # Example
///
/// ```rust,no_run
/// use domain_watch_lib::{DomainWatcher, WatchConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let watcher = DomainWatcher::open(WatchConfig::default()).await?;
///     let outcome = watcher.lookup("example.com").await;
///     println!("{:?}", outcome.record().map(|r| &r.registrar));
///     Ok(())
/// }
/// ```
pub struct DomainWatcher {
    config: WatchConfig,
    store: Arc<dyn Store>,
    discoverer: Arc<EndpointDiscoverer>,
    resolver: DomainResolver,
    pipeline: ImportPipeline,
    updates: UpdateChecker,
}

impl DomainWatcher {
    /// Open the configured store and build the network clients.
    pub async fn open(config: WatchConfig) -> Result<Self, DomainWatchError> {
        let store = open_store(&config).await?;
        let http: Arc<dyn HttpFetch> = Arc::new(ReqwestFetcher::from_config(&config)?);
        let whois: Arc<dyn WhoisQuery> = Arc::new(WhoisClient::with_timeout(config.whois_timeout));
        Ok(Self::with_parts(config, store, http, whois))
    }

    /// Assemble a watcher from explicit parts.
    ///
    /// Discovery results are cached in memory for the watcher's lifetime.
    pub fn with_parts(
        config: WatchConfig,
        store: Arc<dyn Store>,
        http: Arc<dyn HttpFetch>,
        whois: Arc<dyn WhoisQuery>,
    ) -> Self {
        let cache: Arc<dyn EndpointCache> = Arc::new(MemoryCache::new());
        let discoverer = Arc::new(
            EndpointDiscoverer::new(
                store.clone().into_directory(),
                http.clone(),
                whois.clone(),
                config.sources.clone(),
            )
            .with_cache(cache, "watcher"),
        );
        let resolver = DomainResolver::new(
            discoverer.clone(),
            RdapClient::new(http.clone()),
            whois,
            config.sources.whois_server.clone(),
        );
        let pipeline = ImportPipeline::new(store.clone(), http.clone(), config.clone());
        let updates = UpdateChecker::new(store.clone(), http, config.sources.clone());

        Self {
            config,
            store,
            discoverer,
            resolver,
            pipeline,
            updates,
        }
    }

    /// Resolve one domain.
    pub async fn lookup(&self, domain: &str) -> LookupOutcome {
        self.resolver.resolve(domain).await
    }

    /// Resolve several domains, one at a time, in input order.
    pub async fn lookup_many(&self, domains: &[String]) -> Vec<(String, LookupOutcome)> {
        let mut outcomes = Vec::with_capacity(domains.len());
        for domain in domains {
            outcomes.push((domain.clone(), self.resolver.resolve(domain).await));
        }
        outcomes
    }

    /// Resolve every domain listed in a file (one per line, `#` comments).
    pub async fn lookup_from_file<P: AsRef<Path>>(
        &self,
        path: P,
    ) -> Result<Vec<(String, LookupOutcome)>, DomainWatchError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            DomainWatchError::file_error(path.to_string_lossy(), format!("Failed to read domains: {}", e))
        })?;
        let domains: Vec<String> = content
            .lines()
            .map(|line| line.split('#').next().unwrap_or("").trim())
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect();
        if domains.is_empty() {
            return Err(DomainWatchError::file_error(
                path.to_string_lossy(),
                "No domains found in file",
            ));
        }
        Ok(self.lookup_many(&domains).await)
    }

    /// Discover the endpoints serving a TLD.
    pub async fn discover(&self, tld: &str) -> Endpoints {
        self.discoverer.discover(tld).await
    }

    /// Run one import invocation.
    pub async fn import(
        &self,
        import_type: ImportType,
        session: Option<i64>,
    ) -> Result<StepOutcome, DomainWatchError> {
        self.pipeline.run(import_type, session).await
    }

    /// Compare upstream sources with the last completed imports.
    pub async fn check_updates(&self) -> Result<UpdateReport, DomainWatchError> {
        self.updates.check().await
    }

    /// Read an import log.
    pub async fn import_log(&self, id: i64) -> Result<Option<ImportLog>, DomainWatchError> {
        self.store.get(id).await
    }

    pub fn pipeline(&self) -> &ImportPipeline {
        &self.pipeline
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    pub fn config(&self) -> &WatchConfig {
        &self.config
    }
}
