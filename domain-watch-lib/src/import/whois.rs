//! `whois` import: registry facts per TLD, one resumable batch per call.
//!
//! The cursor is the highest row id processed; it moves forward even when
//! rows fail.

use super::checkpoint::{Checkpoint, CheckpointState};
use super::{ImportPipeline, StepOutcome};
use crate::error::DomainWatchError;
use crate::protocols::registry::{fetch_iana_rdap, fetch_root_db, TldFacts};
use crate::types::{ImportCounts, ImportLog, TldRecord, TldUpdate};
use std::time::Duration;

/// What one WHOIS batch did.
#[derive(Debug, Clone, Default, PartialEq)]
pub(super) struct BatchReport {
    pub counts: ImportCounts,
    /// Cursor after the batch
    pub last_processed_id: i64,
    /// No candidates were left
    pub exhausted: bool,
}

impl ImportPipeline {
    pub(super) async fn whois_step(&self, mut log: ImportLog) -> Result<StepOutcome, DomainWatchError> {
        let checkpoint = match Checkpoint::decode(&log) {
            Ok(checkpoint) => checkpoint,
            Err(e) => return Err(self.fail(log, e).await),
        };

        let report = match self.whois_batch(checkpoint.last_processed_id()).await {
            Ok(report) => report,
            Err(e) => return Err(self.fail(log, e).await),
        };

        if report.exhausted {
            return self.complete(log).await;
        }

        log.counts.absorb(&report.counts);
        let next = Checkpoint {
            state: CheckpointState::Whois {
                last_processed_id: report.last_processed_id,
            },
            ..checkpoint
        };
        log.details = next.encode()?;
        self.store.save(&log).await?;

        tracing::info!(
            log_id = log.id,
            last_processed_id = report.last_processed_id,
            processed = report.counts.total,
            failed = report.counts.failed,
            "WHOIS batch processed"
        );
        Ok(StepOutcome::InProgress(log))
    }

    /// Process the next batch after `after_id`.
    ///
    /// Per-item failures are counted; only store failures abort the batch.
    pub(super) async fn whois_batch(&self, after_id: i64) -> Result<BatchReport, DomainWatchError> {
        let batch = self
            .store
            .select_needing_data(self.config.batch_size, after_id)
            .await?;

        if batch.is_empty() {
            return Ok(BatchReport {
                last_processed_id: after_id,
                exhausted: true,
                ..BatchReport::default()
            });
        }

        let mut report = BatchReport {
            last_processed_id: after_id,
            ..BatchReport::default()
        };
        let mut updates = Vec::with_capacity(batch.len());

        for (index, row) in batch.iter().enumerate() {
            if index > 0 {
                pause(self.config.item_delay).await;
            }

            report.counts.total += 1;
            let update = match self.registry_facts(row).await {
                Ok(facts) => {
                    report.counts.updated += 1;
                    facts.to_update()
                }
                Err(e) => {
                    tracing::warn!(tld = %row.tld, error = %e, "Registry lookup failed");
                    report.counts.failed += 1;
                    TldUpdate::default()
                }
            };
            updates.push((row.tld.clone(), update));
            report.last_processed_id = report.last_processed_id.max(row.id);
        }

        self.store.upsert_many(updates).await?;
        Ok(report)
    }

    /// Registry facts for a row: the IANA RDAP object first, then the
    /// root-zone database page.
    ///
    /// Facts with empty fields are still a successful visit. Only a row for
    /// which no source answered is an error.
    async fn registry_facts(&self, row: &TldRecord) -> Result<TldFacts, DomainWatchError> {
        let sources = &self.config.sources;

        let rdap_url = sources.rdap_lookup(&row.tld);
        let rdap_answered = match fetch_iana_rdap(self.http.as_ref(), &rdap_url).await {
            Ok(facts) if !facts.is_empty() => return Ok(facts),
            Ok(_) => {
                tracing::debug!(tld = %row.tld, "IANA RDAP object carried no registry facts");
                true
            }
            Err(e) => {
                tracing::debug!(tld = %row.tld, error = %e, "IANA RDAP lookup failed");
                false
            }
        };

        let page_url = sources.root_db_page(&row.tld);
        match fetch_root_db(self.http.as_ref(), &page_url).await {
            Ok(facts) => {
                if facts.is_empty() {
                    tracing::debug!(tld = %row.tld, "No registry facts published for TLD");
                }
                Ok(facts)
            }
            Err(_) if rdap_answered => Ok(TldFacts::default()),
            Err(e) => Err(e),
        }
    }
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}
