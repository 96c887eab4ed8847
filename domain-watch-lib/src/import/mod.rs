//! Registry import pipeline.
//!
//! Four workflows fill the TLD directory from IANA sources:
//!
//! - `tld_list`: the flat TLD list (creates rows, retires removed TLDs)
//! - `rdap`: the RDAP bootstrap registry (RDAP base URLs)
//! - `whois`: per-TLD registry facts, one batch per call, resumable
//! - `complete_workflow`: the three above in order, one step per call
//!
//! Every call is bounded and progress lives in the run's [`ImportLog`], so a
//! scheduler can invoke the pipeline repeatedly until it reports completion.

mod checkpoint;
mod rdap;
mod tld_list;
mod whois;
mod workflow;

pub use checkpoint::{Checkpoint, CheckpointState, StepProgress, WorkflowStep, CHECKPOINT_VERSION};

use crate::error::DomainWatchError;
use crate::protocols::http::HttpFetch;
use crate::store::Store;
use crate::types::{ImportLog, ImportStatus, ImportType, WatchConfig};
use std::sync::Arc;

/// Result of one pipeline invocation.
#[derive(Debug, Clone)]
pub enum StepOutcome {
    /// The session finished
    Completed(ImportLog),
    /// More work remains; call again with the same session
    InProgress(ImportLog),
}

impl StepOutcome {
    pub fn log(&self) -> &ImportLog {
        match self {
            Self::Completed(log) | Self::InProgress(log) => log,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }
}

/// Drives import sessions against a store.
pub struct ImportPipeline {
    store: Arc<dyn Store>,
    http: Arc<dyn HttpFetch>,
    config: WatchConfig,
}

impl ImportPipeline {
    pub fn new(store: Arc<dyn Store>, http: Arc<dyn HttpFetch>, config: WatchConfig) -> Self {
        Self {
            store,
            http,
            config,
        }
    }

    /// Import the flat TLD list.
    pub async fn import_tld_list(&self, session: Option<i64>) -> Result<StepOutcome, DomainWatchError> {
        let log = self.session(ImportType::TldList, session).await?;
        if !log.is_running() {
            return finished(log);
        }
        self.tld_list_step(log).await
    }

    /// Import RDAP base URLs from the bootstrap registry.
    pub async fn import_rdap(&self, session: Option<i64>) -> Result<StepOutcome, DomainWatchError> {
        let log = self.session(ImportType::Rdap, session).await?;
        if !log.is_running() {
            return finished(log);
        }
        self.rdap_step(log).await
    }

    /// Process the next WHOIS/registry-URL batch.
    pub async fn import_whois(&self, session: Option<i64>) -> Result<StepOutcome, DomainWatchError> {
        let log = self.session(ImportType::Whois, session).await?;
        if !log.is_running() {
            return finished(log);
        }
        self.whois_step(log).await
    }

    /// Advance the complete workflow by one step (or one WHOIS batch).
    pub async fn run_workflow(&self, session: Option<i64>) -> Result<StepOutcome, DomainWatchError> {
        let log = self.session(ImportType::CompleteWorkflow, session).await?;
        if !log.is_running() {
            return finished(log);
        }
        self.workflow_step(log).await
    }

    /// Dispatch one invocation by import type.
    pub async fn run(
        &self,
        import_type: ImportType,
        session: Option<i64>,
    ) -> Result<StepOutcome, DomainWatchError> {
        match import_type {
            ImportType::TldList => self.import_tld_list(session).await,
            ImportType::Rdap => self.import_rdap(session).await,
            ImportType::Whois => self.import_whois(session).await,
            ImportType::CompleteWorkflow => self.run_workflow(session).await,
            ImportType::CheckUpdates => Err(DomainWatchError::config(
                "check_updates is run by the update checker, not the import pipeline",
            )),
        }
    }

    /// Keep invoking until the session completes.
    pub async fn run_to_completion(
        &self,
        import_type: ImportType,
        session: Option<i64>,
    ) -> Result<ImportLog, DomainWatchError> {
        let mut session = session;
        loop {
            match self.run(import_type, session).await? {
                StepOutcome::Completed(log) => return Ok(log),
                StepOutcome::InProgress(log) => session = Some(log.id),
            }
        }
    }

    /// Load the requested session, else resume the latest running one, else
    /// start a new one.
    async fn session(
        &self,
        import_type: ImportType,
        session: Option<i64>,
    ) -> Result<ImportLog, DomainWatchError> {
        if let Some(id) = session {
            let log = self
                .store
                .get(id)
                .await?
                .ok_or_else(|| DomainWatchError::storage(format!("Import log {} not found", id)))?;
            if log.import_type != import_type {
                return Err(DomainWatchError::checkpoint(
                    id,
                    format!("Session is a {} import, not {}", log.import_type, import_type),
                ));
            }
            return Ok(log);
        }

        if let Some(log) = self.store.latest_running(import_type).await? {
            tracing::info!(import_type = %import_type, log_id = log.id, "Resuming import session");
            return Ok(log);
        }

        self.start(import_type).await
    }

    /// Start a fresh session.
    async fn start(&self, import_type: ImportType) -> Result<ImportLog, DomainWatchError> {
        let details = Checkpoint::new(import_type).encode()?;
        let log = self.store.create(import_type, details).await?;
        tracing::info!(import_type = %import_type, log_id = log.id, "Started import session");
        Ok(log)
    }

    /// Mark `log` failed with `err`, persist it and hand the error back.
    async fn fail(&self, mut log: ImportLog, err: DomainWatchError) -> DomainWatchError {
        tracing::error!(
            import_type = %log.import_type,
            log_id = log.id,
            error = %err,
            "Import failed"
        );
        log.mark_failed(err.to_string());
        if let Err(save_err) = self.store.save(&log).await {
            tracing::error!(log_id = log.id, error = %save_err, "Failed to record import failure");
        }
        err
    }

    async fn complete(&self, mut log: ImportLog) -> Result<StepOutcome, DomainWatchError> {
        log.mark_completed();
        self.store.save(&log).await?;
        tracing::info!(
            import_type = %log.import_type,
            log_id = log.id,
            total = log.counts.total,
            new = log.counts.new,
            updated = log.counts.updated,
            failed = log.counts.failed,
            "Import completed"
        );
        Ok(StepOutcome::Completed(log))
    }
}

/// Outcome for a session that is no longer running.
fn finished(log: ImportLog) -> Result<StepOutcome, DomainWatchError> {
    match log.status {
        ImportStatus::Completed => Ok(StepOutcome::Completed(log)),
        _ => Err(DomainWatchError::checkpoint(
            log.id,
            format!(
                "Session failed: {}",
                log.error_message.as_deref().unwrap_or("unknown error")
            ),
        )),
    }
}
