//! `rdap` import: RDAP base URLs from the IANA bootstrap registry.

use super::tld_list::tally;
use super::{ImportPipeline, StepOutcome};
use crate::error::DomainWatchError;
use crate::protocols::registry::fetch_bootstrap;
use crate::types::{ImportLog, TldUpdate};

impl ImportPipeline {
    pub(super) async fn rdap_step(&self, mut log: ImportLog) -> Result<StepOutcome, DomainWatchError> {
        let url = self.config.sources.rdap_bootstrap_url.clone();
        let bootstrap = match fetch_bootstrap(self.http.as_ref(), &url).await {
            Ok(bootstrap) => bootstrap,
            Err(e) => return Err(self.fail(log, e).await),
        };

        tracing::info!(
            log_id = log.id,
            publication = ?bootstrap.publication,
            services = bootstrap.services.len(),
            "Importing RDAP bootstrap"
        );

        log.version = Some(bootstrap.version.clone()).filter(|v| !v.is_empty());
        log.iana_publication_date = bootstrap.publication.clone();

        let updates: Vec<(String, TldUpdate)> = bootstrap
            .entries()
            .map(|(tld, urls)| {
                let update = TldUpdate {
                    rdap_servers: Some(urls),
                    iana_publication_date: bootstrap.publication.clone(),
                    ..TldUpdate::default()
                };
                (tld, update)
            })
            .collect();
        log.counts.total = updates.len() as u64;
        match self.store.upsert_many(updates).await {
            Ok(outcomes) => tally(&mut log, &outcomes),
            Err(e) => return Err(self.fail(log, e).await),
        }

        self.complete(log).await
    }
}
