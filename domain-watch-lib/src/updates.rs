//! Upstream change detection.
//!
//! Compares the version of the IANA TLD list and the publication stamp of
//! the RDAP bootstrap registry with what the last completed imports saw.

use crate::error::DomainWatchError;
use crate::import::Checkpoint;
use crate::protocols::http::HttpFetch;
use crate::protocols::registry::{fetch_bootstrap, fetch_tld_list};
use crate::store::Store;
use crate::types::{IanaSources, ImportType};
use crate::utils::normalize_date;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One upstream source compared with the last completed import.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceCheck {
    /// Value published upstream right now
    pub current: Option<String>,
    /// Value recorded by the last completed import
    pub last_imported: Option<String>,
    /// Upstream moved on since the last import
    pub changed: bool,
}

impl SourceCheck {
    fn compare(current: Option<String>, last_imported: Option<String>) -> Self {
        let changed = match (&current, &last_imported) {
            (Some(current), Some(last)) => normalize_date(current) != normalize_date(last),
            (Some(_), None) => true,
            (None, _) => false,
        };
        Self {
            current,
            last_imported,
            changed,
        }
    }
}

/// Result of an update check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateReport {
    pub needs_update: bool,
    pub tld_list: SourceCheck,
    pub rdap: SourceCheck,
    /// The `check_updates` import log recording this check
    pub log_id: i64,
}

/// Checks IANA sources for changes since the last imports.
pub struct UpdateChecker {
    store: Arc<dyn Store>,
    http: Arc<dyn HttpFetch>,
    sources: IanaSources,
}

impl UpdateChecker {
    pub fn new(store: Arc<dyn Store>, http: Arc<dyn HttpFetch>, sources: IanaSources) -> Self {
        Self {
            store,
            http,
            sources,
        }
    }

    /// Run the check and record it.
    ///
    /// A source that cannot be fetched reports no current value and never
    /// counts as changed.
    pub async fn check(&self) -> Result<UpdateReport, DomainWatchError> {
        let current_version = match fetch_tld_list(self.http.as_ref(), &self.sources.tld_list_url).await {
            Ok(list) => list.version,
            Err(e) => {
                tracing::warn!(error = %e, "Could not fetch the TLD list version");
                None
            }
        };
        let current_publication =
            match fetch_bootstrap(self.http.as_ref(), &self.sources.rdap_bootstrap_url).await {
                Ok(bootstrap) => bootstrap.publication,
                Err(e) => {
                    tracing::warn!(error = %e, "Could not fetch the RDAP bootstrap publication");
                    None
                }
            };

        let last_version = self
            .store
            .latest_completed(ImportType::TldList)
            .await?
            .and_then(|log| log.version);
        let last_publication = self
            .store
            .latest_completed(ImportType::Rdap)
            .await?
            .and_then(|log| log.iana_publication_date);

        let tld_list = SourceCheck::compare(current_version, last_version);
        let rdap = SourceCheck::compare(current_publication, last_publication);
        let needs_update = tld_list.changed || rdap.changed;

        let mut log = self
            .store
            .create(
                ImportType::CheckUpdates,
                Checkpoint::new(ImportType::CheckUpdates).encode()?,
            )
            .await?;
        log.version = tld_list.current.clone();
        log.iana_publication_date = rdap.current.clone();
        log.mark_completed();
        self.store.save(&log).await?;

        tracing::info!(
            needs_update,
            tld_list_changed = tld_list.changed,
            rdap_changed = rdap.changed,
            log_id = log.id,
            "Update check finished"
        );

        Ok(UpdateReport {
            needs_update,
            tld_list,
            rdap,
            log_id: log.id,
        })
    }
}
