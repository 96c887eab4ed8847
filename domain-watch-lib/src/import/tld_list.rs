//! `tld_list` import: the flat IANA list of delegated TLDs.
//!
//! Listed TLDs are created or re-activated; rows missing from a non-empty
//! list are retired.

use super::{ImportPipeline, StepOutcome};
use crate::error::DomainWatchError;
use crate::protocols::registry::fetch_tld_list;
use crate::types::{ImportLog, TldUpdate, UpsertOutcome};

impl ImportPipeline {
    pub(super) async fn tld_list_step(
        &self,
        mut log: ImportLog,
    ) -> Result<StepOutcome, DomainWatchError> {
        let url = self.config.sources.tld_list_url.clone();
        let list = match fetch_tld_list(self.http.as_ref(), &url).await {
            Ok(list) => list,
            Err(e) => return Err(self.fail(log, e).await),
        };

        tracing::info!(
            log_id = log.id,
            version = ?list.version,
            tlds = list.tlds.len(),
            "Importing TLD list"
        );

        log.version = list.version.clone();
        log.counts.total = list.tlds.len() as u64;

        let updates: Vec<(String, TldUpdate)> = list
            .tlds
            .iter()
            .map(|tld| {
                let update = TldUpdate {
                    is_active: Some(true),
                    iana_last_updated: list.last_updated.clone(),
                    ..TldUpdate::default()
                };
                (tld.clone(), update)
            })
            .collect();
        match self.store.upsert_many(updates).await {
            Ok(outcomes) => tally(&mut log, &outcomes),
            Err(e) => return Err(self.fail(log, e).await),
        }

        if !list.tlds.is_empty() {
            match self.store.deactivate_missing(&list.tlds).await {
                Ok(0) => {}
                Ok(retired) => tracing::info!(log_id = log.id, retired, "Deactivated TLDs no longer delegated"),
                Err(e) => return Err(self.fail(log, e).await),
            }
        }

        self.complete(log).await
    }
}

/// Count created and updated rows into the log.
pub(super) fn tally(log: &mut ImportLog, outcomes: &[UpsertOutcome]) {
    for outcome in outcomes {
        match outcome {
            UpsertOutcome::Created(_) => log.counts.new += 1,
            UpsertOutcome::Updated(_) => log.counts.updated += 1,
        }
    }
}
