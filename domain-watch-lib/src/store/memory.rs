//! In-memory tables.

use super::{ImportLogStore, TldDirectory};
use crate::error::DomainWatchError;
use crate::types::{
    ImportCounts, ImportLog, ImportStatus, ImportType, TldRecord, TldUpdate, UpsertOutcome,
};
use crate::utils::normalize_tld;
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tokio::sync::RwLock;

/// Both tables plus their id sequences.
///
/// This is also the on-disk document layout of [`super::FileStore`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreData {
    #[serde(default)]
    pub tld_registry: Vec<TldRecord>,
    #[serde(default)]
    pub tld_import_logs: Vec<ImportLog>,
    #[serde(default)]
    next_tld_id: i64,
    #[serde(default)]
    next_log_id: i64,
    /// Number of committed writes of the durable document
    #[serde(default)]
    revision: u64,
}

impl StoreData {
    pub fn get_by_tld(&self, tld: &str) -> Option<TldRecord> {
        let tld = normalize_tld(tld);
        self.tld_registry.iter().find(|r| r.tld == tld).cloned()
    }

    pub fn upsert(&mut self, tld: &str, update: TldUpdate) -> UpsertOutcome {
        let tld = normalize_tld(tld);
        let now = Utc::now();

        if let Some(row) = self.tld_registry.iter_mut().find(|r| r.tld == tld) {
            if let Some(whois_server) = update.whois_server {
                row.whois_server = Some(whois_server);
            }
            if let Some(rdap_servers) = update.rdap_servers {
                row.rdap_servers = rdap_servers;
            }
            if let Some(registry_url) = update.registry_url {
                row.registry_url = Some(registry_url);
            }
            if let Some(date) = update.registration_date {
                row.registration_date = Some(date);
            }
            if let Some(date) = update.record_last_updated {
                row.record_last_updated = Some(date);
            }
            if let Some(stamp) = update.iana_publication_date {
                row.iana_publication_date = Some(stamp);
            }
            if let Some(stamp) = update.iana_last_updated {
                row.iana_last_updated = Some(stamp);
            }
            if let Some(active) = update.is_active {
                row.is_active = active;
            }
            row.updated_at = now;
            return UpsertOutcome::Updated(row.id);
        }

        self.next_tld_id = next_id(self.next_tld_id, self.max_tld_id());
        let id = self.next_tld_id;
        self.tld_registry.push(TldRecord {
            id,
            tld,
            whois_server: update.whois_server,
            rdap_servers: update.rdap_servers.unwrap_or_default(),
            registry_url: update.registry_url,
            registration_date: update.registration_date,
            record_last_updated: update.record_last_updated,
            iana_publication_date: update.iana_publication_date,
            iana_last_updated: update.iana_last_updated,
            is_active: update.is_active.unwrap_or(true),
            created_at: now,
            updated_at: now,
        });
        UpsertOutcome::Created(id)
    }

    /// Apply updates in order; outcomes line up with the input.
    pub fn upsert_many(&mut self, updates: Vec<(String, TldUpdate)>) -> Vec<UpsertOutcome> {
        updates
            .into_iter()
            .map(|(tld, update)| self.upsert(&tld, update))
            .collect()
    }

    pub fn select_needing_data(&self, limit: usize, after_id: i64) -> Vec<TldRecord> {
        let mut rows: Vec<&TldRecord> = self
            .tld_registry
            .iter()
            .filter(|r| r.is_active && r.id > after_id)
            .collect();
        rows.sort_by_key(|r| (r.completeness_tier(), r.id));
        rows.into_iter().take(limit).cloned().collect()
    }

    pub fn deactivate_missing(&mut self, keep: &[String]) -> usize {
        let keep: HashSet<String> = keep.iter().map(|t| normalize_tld(t)).collect();
        let now = Utc::now();
        let mut changed = 0;
        for row in self.tld_registry.iter_mut() {
            if row.is_active && !keep.contains(&row.tld) {
                row.is_active = false;
                row.updated_at = now;
                changed += 1;
            }
        }
        changed
    }

    pub fn count(&self) -> usize {
        self.tld_registry.len()
    }

    pub fn create_log(&mut self, import_type: ImportType, details: serde_json::Value) -> ImportLog {
        let max = self.tld_import_logs.iter().map(|l| l.id).max().unwrap_or(0);
        self.next_log_id = next_id(self.next_log_id, max);
        let now = Utc::now();
        let log = ImportLog {
            id: self.next_log_id,
            import_type,
            status: ImportStatus::Running,
            counts: ImportCounts::default(),
            version: None,
            iana_publication_date: None,
            details,
            error_message: None,
            started_at: now,
            completed_at: None,
            updated_at: now,
        };
        self.tld_import_logs.push(log.clone());
        log
    }

    pub fn get_log(&self, id: i64) -> Option<ImportLog> {
        self.tld_import_logs.iter().find(|l| l.id == id).cloned()
    }

    pub fn save_log(&mut self, log: &ImportLog) -> Result<(), DomainWatchError> {
        let slot = self
            .tld_import_logs
            .iter_mut()
            .find(|l| l.id == log.id)
            .ok_or_else(|| DomainWatchError::storage(format!("Import log {} not found", log.id)))?;
        *slot = log.clone();
        slot.updated_at = Utc::now();
        Ok(())
    }

    pub fn latest_log(
        &self,
        import_type: ImportType,
        status: Option<ImportStatus>,
    ) -> Option<ImportLog> {
        self.tld_import_logs
            .iter()
            .filter(|l| l.import_type == import_type)
            .filter(|l| status.map(|s| l.status == s).unwrap_or(true))
            .max_by_key(|l| l.id)
            .cloned()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub(super) fn bump_revision(&mut self) {
        self.revision += 1;
    }

    fn max_tld_id(&self) -> i64 {
        self.tld_registry.iter().map(|r| r.id).max().unwrap_or(0)
    }
}

/// Next id of a monotonic sequence, never reusing an existing id.
fn next_id(last: i64, max_existing: i64) -> i64 {
    last.max(max_existing) + 1
}

/// Process-local store, for tests and one-shot runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RwLock<StoreData>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store from existing tables.
    pub fn from_data(data: StoreData) -> Self {
        Self {
            data: RwLock::new(data),
        }
    }

    /// Copy of the current tables.
    pub async fn snapshot(&self) -> StoreData {
        self.data.read().await.clone()
    }
}

#[async_trait]
impl TldDirectory for MemoryStore {
    async fn get_by_tld(&self, tld: &str) -> Result<Option<TldRecord>, DomainWatchError> {
        Ok(self.data.read().await.get_by_tld(tld))
    }

    async fn upsert(
        &self,
        tld: &str,
        update: TldUpdate,
    ) -> Result<UpsertOutcome, DomainWatchError> {
        Ok(self.data.write().await.upsert(tld, update))
    }

    async fn upsert_many(
        &self,
        updates: Vec<(String, TldUpdate)>,
    ) -> Result<Vec<UpsertOutcome>, DomainWatchError> {
        Ok(self.data.write().await.upsert_many(updates))
    }

    async fn select_needing_data(
        &self,
        limit: usize,
        after_id: i64,
    ) -> Result<Vec<TldRecord>, DomainWatchError> {
        Ok(self.data.read().await.select_needing_data(limit, after_id))
    }

    async fn deactivate_missing(&self, keep: &[String]) -> Result<usize, DomainWatchError> {
        Ok(self.data.write().await.deactivate_missing(keep))
    }

    async fn count(&self) -> Result<usize, DomainWatchError> {
        Ok(self.data.read().await.count())
    }
}

#[async_trait]
impl ImportLogStore for MemoryStore {
    async fn create(
        &self,
        import_type: ImportType,
        details: serde_json::Value,
    ) -> Result<ImportLog, DomainWatchError> {
        Ok(self.data.write().await.create_log(import_type, details))
    }

    async fn get(&self, id: i64) -> Result<Option<ImportLog>, DomainWatchError> {
        Ok(self.data.read().await.get_log(id))
    }

    async fn save(&self, log: &ImportLog) -> Result<(), DomainWatchError> {
        self.data.write().await.save_log(log)
    }

    async fn latest(&self, import_type: ImportType) -> Result<Option<ImportLog>, DomainWatchError> {
        Ok(self.data.read().await.latest_log(import_type, None))
    }

    async fn latest_running(
        &self,
        import_type: ImportType,
    ) -> Result<Option<ImportLog>, DomainWatchError> {
        Ok(self
            .data
            .read()
            .await
            .latest_log(import_type, Some(ImportStatus::Running)))
    }

    async fn latest_completed(
        &self,
        import_type: ImportType,
    ) -> Result<Option<ImportLog>, DomainWatchError> {
        Ok(self
            .data
            .read()
            .await
            .latest_log(import_type, Some(ImportStatus::Completed)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn seeded(n: usize) -> StoreData {
        let mut data = StoreData::default();
        for i in 0..n {
            data.upsert(&format!("t{}", i), TldUpdate::default());
        }
        data
    }

    #[test]
    fn test_upsert_creates_then_updates() {
        let mut data = StoreData::default();
        assert_eq!(data.upsert("COM", TldUpdate::default()), UpsertOutcome::Created(1));
        let update = TldUpdate {
            whois_server: Some("whois.verisign-grs.com".into()),
            ..TldUpdate::default()
        };
        assert_eq!(data.upsert(".com", update), UpsertOutcome::Updated(1));

        let row = data.get_by_tld("com").unwrap();
        assert_eq!(row.tld, ".com");
        assert_eq!(row.whois_server.as_deref(), Some("whois.verisign-grs.com"));
        assert!(row.is_active);
    }

    #[test]
    fn test_absent_fields_are_untouched() {
        let mut data = StoreData::default();
        data.upsert(
            ".net",
            TldUpdate {
                registry_url: Some("https://nic.net".into()),
                ..TldUpdate::default()
            },
        );
        data.upsert(
            ".net",
            TldUpdate {
                rdap_servers: Some(vec!["https://rdap.verisign.com/net/v1/".into()]),
                ..TldUpdate::default()
            },
        );
        let row = data.get_by_tld(".net").unwrap();
        assert_eq!(row.registry_url.as_deref(), Some("https://nic.net"));
        assert_eq!(row.rdap_servers.len(), 1);
    }

    #[test]
    fn test_select_respects_cursor() {
        let data = seeded(200);
        let batch = data.select_needing_data(50, 120);
        assert_eq!(batch.len(), 50);
        assert!(batch.iter().all(|r| r.id > 120));
        assert_eq!(batch.last().unwrap().id, 170);
    }

    #[test]
    fn test_select_orders_by_tier_then_id() {
        let mut data = seeded(3);
        // id 1 becomes complete, id 2 only misses dates
        data.upsert(
            "t0",
            TldUpdate {
                whois_server: Some("whois.nic.t0".into()),
                registry_url: Some("https://nic.t0".into()),
                registration_date: NaiveDate::from_ymd_opt(2014, 1, 1),
                record_last_updated: NaiveDate::from_ymd_opt(2024, 1, 1),
                ..TldUpdate::default()
            },
        );
        data.upsert(
            "t1",
            TldUpdate {
                whois_server: Some("whois.nic.t1".into()),
                registry_url: Some("https://nic.t1".into()),
                ..TldUpdate::default()
            },
        );
        let ids: Vec<i64> = data.select_needing_data(10, 0).iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[test]
    fn test_deactivate_missing_skips_inactive_rows() {
        let mut data = seeded(3);
        assert_eq!(data.deactivate_missing(&[".t0".to_string()]), 2);
        assert_eq!(data.select_needing_data(10, 0).len(), 1);
        assert_eq!(data.deactivate_missing(&[".t0".to_string()]), 0);
    }

    #[tokio::test]
    async fn test_log_lifecycle() {
        let store = MemoryStore::new();
        let mut log = store
            .create(ImportType::Whois, serde_json::json!({}))
            .await
            .unwrap();
        assert!(log.is_running());
        assert_eq!(
            store.latest_running(ImportType::Whois).await.unwrap().unwrap().id,
            log.id
        );

        log.counts.total = 5;
        log.mark_completed();
        store.save(&log).await.unwrap();

        assert!(store.latest_running(ImportType::Whois).await.unwrap().is_none());
        let done = store.latest_completed(ImportType::Whois).await.unwrap().unwrap();
        assert_eq!(done.counts.total, 5);
        assert!(store.latest(ImportType::Rdap).await.unwrap().is_none());
    }

    #[test]
    fn test_relisted_tld_is_reactivated() {
        let store = MemoryStore::from_data(seeded(2));
        tokio_test::block_on(async {
            tokio_test::assert_ok!(store.deactivate_missing(&[".t1".to_string()]).await);
            assert!(!store.get_by_tld("t0").await.unwrap().unwrap().is_active);

            let outcome = store
                .upsert(
                    "t0",
                    TldUpdate {
                        is_active: Some(true),
                        ..TldUpdate::default()
                    },
                )
                .await
                .unwrap();
            assert_eq!(outcome, UpsertOutcome::Updated(1));
            assert!(store.get_by_tld(".t0").await.unwrap().unwrap().is_active);
            assert_eq!(store.count().await.unwrap(), 2);
        });
    }

    #[tokio::test]
    async fn test_saving_unknown_log_fails() {
        let store = MemoryStore::new();
        let log = store
            .create(ImportType::Rdap, serde_json::Value::Null)
            .await
            .unwrap();
        let mut ghost = log.clone();
        ghost.id = 99;
        assert!(matches!(
            store.save(&ghost).await,
            Err(DomainWatchError::StorageError { .. })
        ));
    }
}
