//! Resumption state stored in `ImportLog.details`.

use crate::error::DomainWatchError;
use crate::types::{ImportCounts, ImportLog, ImportType};
use serde::{Deserialize, Serialize};

/// Current checkpoint document version.
pub const CHECKPOINT_VERSION: u32 = 1;

/// Step of the complete workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStep {
    TldList,
    Rdap,
    Whois,
}

impl WorkflowStep {
    pub fn import_type(&self) -> ImportType {
        match self {
            Self::TldList => ImportType::TldList,
            Self::Rdap => ImportType::Rdap,
            Self::Whois => ImportType::Whois,
        }
    }

    pub fn next(&self) -> Option<Self> {
        match self {
            Self::TldList => Some(Self::Rdap),
            Self::Rdap => Some(Self::Whois),
            Self::Whois => None,
        }
    }
}

/// Progress of one workflow step and the import log that ran it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepProgress {
    pub step: WorkflowStep,
    pub log_id: i64,
    pub counts: ImportCounts,
    pub completed: bool,
}

/// Per-type resumption state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "import_type", rename_all = "snake_case")]
pub enum CheckpointState {
    TldList,
    Rdap,
    CheckUpdates,
    Whois {
        last_processed_id: i64,
    },
    CompleteWorkflow {
        current_step: WorkflowStep,
        step_progress: Vec<StepProgress>,
        last_processed_id: i64,
        total: u64,
    },
}

impl CheckpointState {
    pub fn import_type(&self) -> ImportType {
        match self {
            Self::TldList => ImportType::TldList,
            Self::Rdap => ImportType::Rdap,
            Self::CheckUpdates => ImportType::CheckUpdates,
            Self::Whois { .. } => ImportType::Whois,
            Self::CompleteWorkflow { .. } => ImportType::CompleteWorkflow,
        }
    }
}

/// Versioned, typed form of `ImportLog.details`.
///
/// ```json
/// {"version": 1, "import_type": "whois", "last_processed_id": 170}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub version: u32,
    #[serde(flatten)]
    pub state: CheckpointState,
}

impl Checkpoint {
    /// Initial checkpoint for a new run.
    pub fn new(import_type: ImportType) -> Self {
        let state = match import_type {
            ImportType::TldList => CheckpointState::TldList,
            ImportType::Rdap => CheckpointState::Rdap,
            ImportType::CheckUpdates => CheckpointState::CheckUpdates,
            ImportType::Whois => CheckpointState::Whois {
                last_processed_id: 0,
            },
            ImportType::CompleteWorkflow => CheckpointState::CompleteWorkflow {
                current_step: WorkflowStep::TldList,
                step_progress: Vec::new(),
                last_processed_id: 0,
                total: 0,
            },
        };
        Self {
            version: CHECKPOINT_VERSION,
            state,
        }
    }

    /// Read the checkpoint of `log`.
    ///
    /// Fails on unknown versions and on a tag that does not match the log's
    /// import type. A log without details starts from the initial state.
    pub fn decode(log: &ImportLog) -> Result<Self, DomainWatchError> {
        if log.details.is_null() {
            return Ok(Self::new(log.import_type));
        }

        let version = log
            .details
            .get("version")
            .and_then(|v| v.as_u64())
            .ok_or_else(|| DomainWatchError::checkpoint(log.id, "Missing checkpoint version"))?;
        if version != u64::from(CHECKPOINT_VERSION) {
            return Err(DomainWatchError::checkpoint(
                log.id,
                format!("Unsupported checkpoint version {}", version),
            ));
        }

        let checkpoint: Checkpoint = serde_json::from_value(log.details.clone())
            .map_err(|e| DomainWatchError::checkpoint(log.id, format!("Invalid checkpoint: {}", e)))?;

        if checkpoint.state.import_type() != log.import_type {
            return Err(DomainWatchError::checkpoint(
                log.id,
                format!(
                    "Checkpoint is tagged {} but the log is {}",
                    checkpoint.state.import_type(),
                    log.import_type
                ),
            ));
        }

        Ok(checkpoint)
    }

    pub fn encode(&self) -> Result<serde_json::Value, DomainWatchError> {
        serde_json::to_value(self)
            .map_err(|e| DomainWatchError::internal(format!("Failed to encode checkpoint: {}", e)))
    }

    /// Resumption cursor of cursor-driven runs.
    pub fn last_processed_id(&self) -> i64 {
        match &self.state {
            CheckpointState::Whois { last_processed_id }
            | CheckpointState::CompleteWorkflow {
                last_processed_id, ..
            } => *last_processed_id,
            _ => 0,
        }
    }
}
