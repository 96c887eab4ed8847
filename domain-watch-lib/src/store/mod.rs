//! TLD directory and import-log persistence.
//!
//! Two traits describe the persisted tables (`tld_registry` and
//! `tld_import_logs`). [`MemoryStore`] keeps them in process memory,
//! [`FileStore`] in a JSON document on disk that survives restarts.

mod file;
mod memory;

use crate::error::DomainWatchError;
use crate::types::{ImportLog, ImportType, TldRecord, TldUpdate, UpsertOutcome, WatchConfig};
use async_trait::async_trait;
use std::sync::Arc;

pub use file::FileStore;
pub use memory::{MemoryStore, StoreData};

/// Per-TLD endpoint and registry metadata.
#[async_trait]
pub trait TldDirectory: Send + Sync {
    /// Look up a row. `tld` is normalized (lowercase, leading dot) first.
    async fn get_by_tld(&self, tld: &str) -> Result<Option<TldRecord>, DomainWatchError>;

    /// Create or partially update a row; `updated_at` is always refreshed.
    async fn upsert(&self, tld: &str, update: TldUpdate)
        -> Result<UpsertOutcome, DomainWatchError>;

    /// Apply several upserts as one write. Outcomes are in input order.
    ///
    /// Import steps use this so a durable store is rewritten once per step
    /// or batch instead of once per row.
    async fn upsert_many(
        &self,
        updates: Vec<(String, TldUpdate)>,
    ) -> Result<Vec<UpsertOutcome>, DomainWatchError> {
        let mut outcomes = Vec::with_capacity(updates.len());
        for (tld, update) in updates {
            outcomes.push(self.upsert(&tld, update).await?);
        }
        Ok(outcomes)
    }

    /// Active rows with `id > after_id`, least complete first, then by id.
    async fn select_needing_data(
        &self,
        limit: usize,
        after_id: i64,
    ) -> Result<Vec<TldRecord>, DomainWatchError>;

    /// Mark active rows whose TLD is not in `keep` inactive. Returns how many.
    async fn deactivate_missing(&self, keep: &[String]) -> Result<usize, DomainWatchError>;

    async fn count(&self) -> Result<usize, DomainWatchError>;
}

/// Import run bookkeeping.
#[async_trait]
pub trait ImportLogStore: Send + Sync {
    /// Start a new `running` log.
    async fn create(
        &self,
        import_type: ImportType,
        details: serde_json::Value,
    ) -> Result<ImportLog, DomainWatchError>;

    async fn get(&self, id: i64) -> Result<Option<ImportLog>, DomainWatchError>;

    /// Persist every field of an existing log.
    async fn save(&self, log: &ImportLog) -> Result<(), DomainWatchError>;

    /// Most recent log of a type, any status.
    async fn latest(&self, import_type: ImportType) -> Result<Option<ImportLog>, DomainWatchError>;

    /// Most recent `running` log of a type.
    async fn latest_running(
        &self,
        import_type: ImportType,
    ) -> Result<Option<ImportLog>, DomainWatchError>;

    /// Most recent `completed` log of a type.
    async fn latest_completed(
        &self,
        import_type: ImportType,
    ) -> Result<Option<ImportLog>, DomainWatchError>;
}

/// Both tables behind one handle.
pub trait Store: TldDirectory + ImportLogStore {
    /// The same store, seen as just the TLD directory.
    fn into_directory(self: Arc<Self>) -> Arc<dyn TldDirectory>;
}

impl<T: TldDirectory + ImportLogStore + 'static> Store for T {
    fn into_directory(self: Arc<Self>) -> Arc<dyn TldDirectory> {
        self
    }
}

/// Open the store named by the configuration.
///
/// A configured `store_path` gives a [`FileStore`], otherwise everything is
/// kept in memory for the lifetime of the process.
pub async fn open_store(config: &WatchConfig) -> Result<Arc<dyn Store>, DomainWatchError> {
    match &config.store_path {
        Some(path) => Ok(Arc::new(FileStore::open(path).await?)),
        None => Ok(Arc::new(MemoryStore::new())),
    }
}
