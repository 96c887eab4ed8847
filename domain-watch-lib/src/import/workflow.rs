//! `complete_workflow` import: `tld_list`, `rdap`, then the `whois` loop.

use super::checkpoint::{Checkpoint, CheckpointState, StepProgress, WorkflowStep};
use super::{ImportPipeline, StepOutcome};
use crate::error::DomainWatchError;
use crate::types::{ImportCounts, ImportLog};

impl ImportPipeline {
    /// Advance a complete workflow by one step.
    ///
    /// Each step runs under its own child import log; the parent checkpoint
    /// records the children, their counts, and the current step.
    pub(super) async fn workflow_step(
        &self,
        mut log: ImportLog,
    ) -> Result<StepOutcome, DomainWatchError> {
        let checkpoint = match Checkpoint::decode(&log) {
            Ok(checkpoint) => checkpoint,
            Err(e) => return Err(self.fail(log, e).await),
        };
        let CheckpointState::CompleteWorkflow {
            current_step,
            mut step_progress,
            mut last_processed_id,
            mut total,
        } = checkpoint.state
        else {
            let err = DomainWatchError::checkpoint(log.id, "Not a workflow checkpoint");
            return Err(self.fail(log, err).await);
        };

        let child = match self.child_log(current_step, &step_progress).await {
            Ok(child) => child,
            Err(e) => return Err(self.fail(log, e).await),
        };
        let child_id = child.id;

        tracing::info!(
            log_id = log.id,
            step = ?current_step,
            child_log_id = child_id,
            "Running workflow step"
        );

        let outcome = match current_step {
            WorkflowStep::TldList => self.tld_list_step(child).await,
            WorkflowStep::Rdap => self.rdap_step(child).await,
            WorkflowStep::Whois => self.whois_step(child).await,
        };
        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(e) => {
                let err = DomainWatchError::internal(format!(
                    "Workflow step {:?} failed (log {}): {}",
                    current_step, child_id, e
                ));
                return Err(self.fail(log, err).await);
            }
        };

        let child_log = outcome.log();
        let progress = StepProgress {
            step: current_step,
            log_id: child_id,
            counts: child_log.counts,
            completed: outcome.is_completed(),
        };
        match step_progress.iter_mut().find(|p| p.log_id == child_id) {
            Some(existing) => *existing = progress,
            None => step_progress.push(progress),
        }

        match current_step {
            WorkflowStep::TldList => total = child_log.counts.total,
            WorkflowStep::Whois => {
                last_processed_id = Checkpoint::decode(child_log)
                    .map(|c| c.last_processed_id())
                    .unwrap_or(last_processed_id);
            }
            WorkflowStep::Rdap => {}
        }

        log.counts = step_progress.iter().fold(ImportCounts::default(), |mut acc, p| {
            acc.absorb(&p.counts);
            acc
        });
        if current_step == WorkflowStep::Rdap {
            log.iana_publication_date = child_log.iana_publication_date.clone();
        }
        if current_step == WorkflowStep::TldList {
            log.version = child_log.version.clone();
        }

        let finished = outcome.is_completed() && current_step.next().is_none();
        let next_step = if outcome.is_completed() {
            current_step.next().unwrap_or(current_step)
        } else {
            current_step
        };

        log.details = Checkpoint {
            state: CheckpointState::CompleteWorkflow {
                current_step: next_step,
                step_progress,
                last_processed_id,
                total,
            },
            ..checkpoint
        }
        .encode()?;

        if finished {
            return self.complete(log).await;
        }

        self.store.save(&log).await?;
        Ok(StepOutcome::InProgress(log))
    }

    /// Log for the current step: the unfinished child recorded in the
    /// checkpoint, or a fresh one.
    async fn child_log(
        &self,
        step: WorkflowStep,
        progress: &[StepProgress],
    ) -> Result<ImportLog, DomainWatchError> {
        let pending = progress.iter().find(|p| p.step == step && !p.completed);
        if let Some(pending) = pending {
            if let Some(child) = self.store.get(pending.log_id).await? {
                if child.is_running() {
                    return Ok(child);
                }
            }
        }
        self.start(step.import_type()).await
    }
}
