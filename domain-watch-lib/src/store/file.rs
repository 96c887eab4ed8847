//! Durable JSON document store.
//!
//! Every commit applies the mutation to a copy of the tables, writes the
//! whole document to a sibling temp file, syncs it and renames it over the
//! original. The in-memory tables only move forward once that succeeded.
//! Import steps write through [`TldDirectory::upsert_many`], so a step costs
//! one rewrite rather than one per row.

use super::memory::StoreData;
use super::{ImportLogStore, TldDirectory};
use crate::error::DomainWatchError;
use crate::types::{ImportLog, ImportStatus, ImportType, TldRecord, TldUpdate, UpsertOutcome};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Store persisted as one JSON document holding `tld_registry` and
/// `tld_import_logs`.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    data: Mutex<StoreData>,
}

impl FileStore {
    /// Open the document at `path`, starting empty if it does not exist yet.
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self, DomainWatchError> {
        let path = path.as_ref().to_path_buf();

        let data = match tokio::fs::read_to_string(&path).await {
            Ok(content) if content.trim().is_empty() => StoreData::default(),
            Ok(content) => serde_json::from_str(&content).map_err(|e| {
                DomainWatchError::file_error(
                    path.display().to_string(),
                    format!("Invalid store document: {}", e),
                )
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => StoreData::default(),
            Err(e) => {
                return Err(DomainWatchError::file_error(
                    path.display().to_string(),
                    e.to_string(),
                ))
            }
        };

        tracing::debug!(
            path = %path.display(),
            tlds = data.tld_registry.len(),
            logs = data.tld_import_logs.len(),
            revision = data.revision(),
            "Opened store"
        );

        Ok(Self {
            path,
            data: Mutex::new(data),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of document writes committed so far, across reopens.
    pub async fn revision(&self) -> u64 {
        self.data.lock().await.revision()
    }

    /// Apply `apply` to a copy of the tables and persist it when it reports
    /// a change. A failed write leaves the current tables untouched.
    async fn commit<R, F>(&self, apply: F) -> Result<R, DomainWatchError>
    where
        F: FnOnce(&mut StoreData) -> Result<(R, bool), DomainWatchError> + Send,
        R: Send,
    {
        let mut data = self.data.lock().await;
        let mut next = data.clone();
        let (result, changed) = apply(&mut next)?;
        if changed {
            next.bump_revision();
            self.flush(&next).await?;
            *data = next;
        }
        Ok(result)
    }

    async fn flush(&self, data: &StoreData) -> Result<(), DomainWatchError> {
        let file_error = |e: std::io::Error| {
            DomainWatchError::file_error(self.path.display().to_string(), e.to_string())
        };

        let json = serde_json::to_vec_pretty(data)
            .map_err(|e| DomainWatchError::storage(format!("Failed to encode store: {}", e)))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(file_error)?;
        }

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        let written = match write_synced(&tmp, &json).await {
            Ok(()) => tokio::fs::rename(&tmp, &self.path).await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            let _ = tokio::fs::remove_file(&tmp).await;
            tracing::error!(path = %self.path.display(), error = %e, "Store write failed");
            return Err(file_error(e));
        }
        Ok(())
    }
}

async fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::File::create(path).await?;
    file.write_all(bytes).await?;
    file.sync_all().await
}

#[async_trait]
impl TldDirectory for FileStore {
    async fn get_by_tld(&self, tld: &str) -> Result<Option<TldRecord>, DomainWatchError> {
        Ok(self.data.lock().await.get_by_tld(tld))
    }

    async fn upsert(
        &self,
        tld: &str,
        update: TldUpdate,
    ) -> Result<UpsertOutcome, DomainWatchError> {
        self.commit(|data| Ok((data.upsert(tld, update), true)))
            .await
    }

    async fn upsert_many(
        &self,
        updates: Vec<(String, TldUpdate)>,
    ) -> Result<Vec<UpsertOutcome>, DomainWatchError> {
        if updates.is_empty() {
            return Ok(Vec::new());
        }
        self.commit(|data| Ok((data.upsert_many(updates), true)))
            .await
    }

    async fn select_needing_data(
        &self,
        limit: usize,
        after_id: i64,
    ) -> Result<Vec<TldRecord>, DomainWatchError> {
        Ok(self.data.lock().await.select_needing_data(limit, after_id))
    }

    async fn deactivate_missing(&self, keep: &[String]) -> Result<usize, DomainWatchError> {
        self.commit(|data| {
            let changed = data.deactivate_missing(keep);
            Ok((changed, changed > 0))
        })
        .await
    }

    async fn count(&self) -> Result<usize, DomainWatchError> {
        Ok(self.data.lock().await.count())
    }
}

#[async_trait]
impl ImportLogStore for FileStore {
    async fn create(
        &self,
        import_type: ImportType,
        details: serde_json::Value,
    ) -> Result<ImportLog, DomainWatchError> {
        self.commit(|data| Ok((data.create_log(import_type, details), true)))
            .await
    }

    async fn get(&self, id: i64) -> Result<Option<ImportLog>, DomainWatchError> {
        Ok(self.data.lock().await.get_log(id))
    }

    async fn save(&self, log: &ImportLog) -> Result<(), DomainWatchError> {
        self.commit(|data| data.save_log(log).map(|()| ((), true)))
            .await
    }

    async fn latest(&self, import_type: ImportType) -> Result<Option<ImportLog>, DomainWatchError> {
        Ok(self.data.lock().await.latest_log(import_type, None))
    }

    async fn latest_running(
        &self,
        import_type: ImportType,
    ) -> Result<Option<ImportLog>, DomainWatchError> {
        Ok(self
            .data
            .lock()
            .await
            .latest_log(import_type, Some(ImportStatus::Running)))
    }

    async fn latest_completed(
        &self,
        import_type: ImportType,
    ) -> Result<Option<ImportLog>, DomainWatchError> {
        Ok(self
            .data
            .lock()
            .await
            .latest_log(import_type, Some(ImportStatus::Completed)))
    }
}
