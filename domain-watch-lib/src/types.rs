//! Core data types for lookups, the TLD directory and registry imports.
//!
//! This module defines the main data structures used throughout the library:
//! the canonical [`DomainRecord`], the persisted [`TldRecord`] and
//! [`ImportLog`] rows, and the resolved runtime configuration.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::DomainWatchError;

/// Registrar value used when a reply names no registrar.
pub const UNKNOWN_REGISTRAR: &str = "Unknown";

/// Registrar value used for domains that are free to register.
pub const NOT_REGISTERED: &str = "Not Registered";

/// Canonical registration record for one domain.
///
/// Produced by both the RDAP and free-text WHOIS parsers so callers never
/// have to care which protocol answered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainRecord {
    /// The domain name that was looked up (lowercase)
    pub domain: String,

    /// Sponsoring registrar, never empty ("Unknown" when not advertised)
    pub registrar: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub registrar_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub abuse_email: Option<String>,

    /// Nameservers, lowercase without trailing dot, de-duplicated
    pub nameservers: Vec<String>,

    /// Raw status tokens as the registry sent them
    pub status: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,

    /// Host that answered: a WHOIS host, or `"<rdap-host> (RDAP)"`
    pub whois_server: String,

    /// `Registrar WHOIS Server:` advertised in a free-text reply
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registrar_whois_server: Option<String>,

    /// Unparsed reply body
    #[serde(skip_serializing, default)]
    pub raw_data: String,
}

impl DomainRecord {
    /// Create an empty record attributed to `whois_server`.
    pub fn new<D: Into<String>, S: Into<String>>(domain: D, whois_server: S) -> Self {
        Self {
            domain: domain.into(),
            registrar: UNKNOWN_REGISTRAR.to_string(),
            registrar_url: None,
            expiration_date: None,
            updated_date: None,
            creation_date: None,
            abuse_email: None,
            nameservers: Vec::new(),
            status: Vec::new(),
            owner: None,
            whois_server: whois_server.into(),
            registrar_whois_server: None,
            raw_data: String::new(),
        }
    }

    /// Record for a domain the registry reports as unregistered.
    pub fn available<D: Into<String>, S: Into<String>>(
        domain: D,
        whois_server: S,
        raw_data: String,
    ) -> Self {
        let mut record = Self::new(domain, whois_server);
        record.registrar = NOT_REGISTERED.to_string();
        record.status = vec!["AVAILABLE".to_string()];
        record.raw_data = raw_data;
        record
    }

    /// Provenance label for a record answered over RDAP.
    pub fn rdap_provenance(rdap_host: &str) -> String {
        format!("{} (RDAP)", rdap_host)
    }

    /// Project this record onto the fields a domain-persistence layer stores.
    pub fn to_update(&self) -> DomainUpdate {
        DomainUpdate {
            registrar: self.registrar.clone(),
            registrar_url: self.registrar_url.clone(),
            expiration_date: self.expiration_date.clone(),
            updated_date: self.updated_date.clone(),
            abuse_email: self.abuse_email.clone(),
            status: self.status.clone(),
            whois_data: self.raw_data.clone(),
        }
    }
}

/// Fields a domain-persistence collaborator accepts back after a refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainUpdate {
    pub registrar: String,
    pub registrar_url: Option<String>,
    pub expiration_date: Option<String>,
    pub updated_date: Option<String>,
    pub abuse_email: Option<String>,
    pub status: Vec<String>,
    pub whois_data: String,
}

/// Result of resolving one domain.
#[derive(Debug, Clone)]
pub enum LookupOutcome {
    /// The registry returned registration data
    Resolved(DomainRecord),
    /// The registry reports the name as not registered
    Available(DomainRecord),
    /// No usable answer from any source
    Failed(DomainWatchError),
}

impl LookupOutcome {
    /// The record carried by a successful outcome.
    pub fn record(&self) -> Option<&DomainRecord> {
        match self {
            Self::Resolved(record) | Self::Available(record) => Some(record),
            Self::Failed(_) => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }
}

/// Endpoints serving one TLD.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoints {
    /// RDAP base URL, always ending in `/`
    pub rdap_url: Option<String>,
    /// WHOIS host for port 43 queries
    pub whois_server: Option<String>,
}

impl Endpoints {
    pub fn is_empty(&self) -> bool {
        self.rdap_url.is_none() && self.whois_server.is_none()
    }

    pub fn is_complete(&self) -> bool {
        self.rdap_url.is_some() && self.whois_server.is_some()
    }
}

/// One row of the `tld_registry` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TldRecord {
    pub id: i64,
    /// Lowercase, dot-prefixed label (".com", ".co.uk")
    pub tld: String,
    pub whois_server: Option<String>,
    /// RDAP base URLs, first preferred
    #[serde(default)]
    pub rdap_servers: Vec<String>,
    pub registry_url: Option<String>,
    pub registration_date: Option<NaiveDate>,
    pub record_last_updated: Option<NaiveDate>,
    /// Publication stamp of the RDAP bootstrap that populated `rdap_servers`
    pub iana_publication_date: Option<String>,
    /// "Last Updated" stamp of the TLD list that listed this row
    pub iana_last_updated: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TldRecord {
    /// Completeness tier used to order import candidates.
    ///
    /// 0: no WHOIS server and no registry URL, 1: no WHOIS server,
    /// 2: no registry URL, 3: missing dates, 4: complete.
    pub fn completeness_tier(&self) -> u8 {
        match (self.whois_server.is_some(), self.registry_url.is_some()) {
            (false, false) => 0,
            (false, true) => 1,
            (true, false) => 2,
            (true, true) => {
                if self.registration_date.is_none() || self.record_last_updated.is_none() {
                    3
                } else {
                    4
                }
            }
        }
    }

    /// First RDAP base URL, normalized to end with `/`.
    pub fn preferred_rdap_url(&self) -> Option<String> {
        self.rdap_servers
            .iter()
            .map(|url| url.trim())
            .find(|url| !url.is_empty())
            .map(crate::utils::with_trailing_slash)
    }
}

/// Partial update applied by [`crate::TldDirectory::upsert`].
///
/// Absent fields keep their stored value; `updated_at` is always refreshed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TldUpdate {
    pub whois_server: Option<String>,
    pub rdap_servers: Option<Vec<String>>,
    pub registry_url: Option<String>,
    pub registration_date: Option<NaiveDate>,
    pub record_last_updated: Option<NaiveDate>,
    pub iana_publication_date: Option<String>,
    pub iana_last_updated: Option<String>,
    pub is_active: Option<bool>,
}

impl TldUpdate {
    /// Whether this update carries any field besides the timestamp touch.
    pub fn has_data(&self) -> bool {
        self.whois_server.is_some()
            || self.rdap_servers.is_some()
            || self.registry_url.is_some()
            || self.registration_date.is_some()
            || self.record_last_updated.is_some()
            || self.iana_publication_date.is_some()
            || self.iana_last_updated.is_some()
            || self.is_active.is_some()
    }
}

/// What an upsert did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created(i64),
    Updated(i64),
}

impl UpsertOutcome {
    pub fn id(&self) -> i64 {
        match self {
            Self::Created(id) | Self::Updated(id) => *id,
        }
    }
}

/// Kind of import run recorded in an [`ImportLog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportType {
    TldList,
    Rdap,
    Whois,
    CheckUpdates,
    CompleteWorkflow,
}

impl ImportType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TldList => "tld_list",
            Self::Rdap => "rdap",
            Self::Whois => "whois",
            Self::CheckUpdates => "check_updates",
            Self::CompleteWorkflow => "complete_workflow",
        }
    }
}

impl fmt::Display for ImportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state of an [`ImportLog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportStatus {
    Running,
    Completed,
    Failed,
}

impl fmt::Display for ImportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Running => write!(f, "running"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Item counters of an import run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportCounts {
    pub total: u64,
    pub new: u64,
    pub updated: u64,
    pub failed: u64,
}

impl ImportCounts {
    pub fn absorb(&mut self, other: &ImportCounts) {
        self.total += other.total;
        self.new += other.new;
        self.updated += other.updated;
        self.failed += other.failed;
    }
}

/// One row of the `tld_import_logs` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportLog {
    pub id: i64,
    pub import_type: ImportType,
    pub status: ImportStatus,
    #[serde(default)]
    pub counts: ImportCounts,
    /// Upstream version (TLD list header) this run saw
    pub version: Option<String>,
    /// Upstream publication stamp (RDAP bootstrap) this run saw
    pub iana_publication_date: Option<String>,
    /// Checkpoint document, see [`crate::Checkpoint`]
    #[serde(default)]
    pub details: serde_json::Value,
    pub error_message: Option<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl ImportLog {
    pub fn is_running(&self) -> bool {
        self.status == ImportStatus::Running
    }

    pub fn mark_completed(&mut self) {
        let now = Utc::now();
        self.status = ImportStatus::Completed;
        self.completed_at = Some(now);
        self.updated_at = now;
    }

    pub fn mark_failed<M: Into<String>>(&mut self, message: M) {
        let now = Utc::now();
        self.status = ImportStatus::Failed;
        self.error_message = Some(message.into());
        self.completed_at = Some(now);
        self.updated_at = now;
    }
}

/// Upstream IANA sources. Overridable for mirrors and tests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IanaSources {
    /// RDAP service bootstrap for DNS
    pub rdap_bootstrap_url: String,
    /// Flat TLD list with `# Version` header
    pub tld_list_url: String,
    /// Root-zone database page, `{tld}` is replaced by the bare label
    pub root_db_url: String,
    /// IANA RDAP lookup, `{name}` is replaced by the queried name
    pub rdap_lookup_url: String,
    /// IANA WHOIS host
    pub whois_server: String,
}

impl Default for IanaSources {
    fn default() -> Self {
        Self {
            rdap_bootstrap_url: "https://data.iana.org/rdap/dns.json".to_string(),
            tld_list_url: "https://data.iana.org/TLD/tlds-alpha-by-domain.txt".to_string(),
            root_db_url: "https://www.iana.org/domains/root/db/{tld}.html".to_string(),
            rdap_lookup_url: "https://rdap.iana.org/domain/{name}".to_string(),
            whois_server: "whois.iana.org".to_string(),
        }
    }
}

impl IanaSources {
    /// Root-zone database page for a TLD (with or without leading dot).
    pub fn root_db_page(&self, tld: &str) -> String {
        self.root_db_url
            .replace("{tld}", tld.trim_start_matches('.'))
    }

    /// IANA RDAP lookup URL for a TLD or domain name.
    pub fn rdap_lookup(&self, name: &str) -> String {
        self.rdap_lookup_url
            .replace("{name}", &name.trim_start_matches('.').to_lowercase())
    }
}

/// Resolved runtime configuration.
///
/// Built from defaults, config files, `DW_*` environment variables and CLI
/// flags, in that order of precedence.
#[derive(Debug, Clone)]
pub struct WatchConfig {
    /// Total timeout for a domain RDAP query
    pub rdap_timeout: Duration,

    /// Total timeout for one WHOIS exchange (connect + read)
    pub whois_timeout: Duration,

    /// Connect timeout for IANA data downloads (bootstrap JSON, TLD list)
    pub data_connect_timeout: Duration,

    /// Total timeout for IANA data downloads
    pub data_timeout: Duration,

    /// Extra attempts for IANA data downloads
    pub data_retries: u32,

    /// Fixed pause between data download attempts
    pub retry_backoff: Duration,

    /// Connect timeout for IANA HTML pages
    pub html_connect_timeout: Duration,

    /// Total timeout for IANA HTML pages (never retried)
    pub html_timeout: Duration,

    /// TLD rows per WHOIS import batch
    pub batch_size: usize,

    /// Fixed pause between per-TLD network calls during imports
    pub item_delay: Duration,

    /// User-Agent sent on HTTP requests
    pub user_agent: String,

    /// Upstream IANA sources
    pub sources: IanaSources,

    /// Directory store document; `None` keeps everything in memory
    pub store_path: Option<PathBuf>,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            rdap_timeout: Duration::from_secs(10),
            whois_timeout: Duration::from_secs(10),
            data_connect_timeout: Duration::from_secs(5),
            data_timeout: Duration::from_secs(15),
            data_retries: 2,
            retry_backoff: Duration::from_secs(1),
            html_connect_timeout: Duration::from_secs(3),
            html_timeout: Duration::from_secs(8),
            batch_size: 50,
            item_delay: Duration::from_millis(500),
            user_agent: format!("domain-watch/{}", env!("CARGO_PKG_VERSION")),
            sources: IanaSources::default(),
            store_path: None,
        }
    }
}

impl WatchConfig {
    /// Set the WHOIS import batch size (clamped to 1..=500).
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.clamp(1, 500);
        self
    }

    /// Set the pause between per-TLD network calls.
    pub fn with_item_delay(mut self, delay: Duration) -> Self {
        self.item_delay = delay;
        self
    }

    /// Set the RDAP query timeout.
    pub fn with_rdap_timeout(mut self, timeout: Duration) -> Self {
        self.rdap_timeout = timeout;
        self
    }

    /// Set the WHOIS exchange timeout.
    pub fn with_whois_timeout(mut self, timeout: Duration) -> Self {
        self.whois_timeout = timeout;
        self
    }

    /// Use a durable store document at `path`.
    pub fn with_store_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.store_path = Some(path.into());
        self
    }

    /// Replace the upstream sources.
    pub fn with_sources(mut self, sources: IanaSources) -> Self {
        self.sources = sources;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(whois: Option<&str>, registry: Option<&str>, dated: bool) -> TldRecord {
        let now = Utc::now();
        TldRecord {
            id: 1,
            tld: ".test".to_string(),
            whois_server: whois.map(String::from),
            rdap_servers: vec![],
            registry_url: registry.map(String::from),
            registration_date: dated.then(|| NaiveDate::from_ymd_opt(1985, 1, 1).unwrap()),
            record_last_updated: dated.then(|| NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()),
            iana_publication_date: None,
            iana_last_updated: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_completeness_tiers() {
        assert_eq!(record(None, None, true).completeness_tier(), 0);
        assert_eq!(record(None, Some("https://nic.test"), true).completeness_tier(), 1);
        assert_eq!(record(Some("whois.nic.test"), None, true).completeness_tier(), 2);
        assert_eq!(
            record(Some("whois.nic.test"), Some("https://nic.test"), false).completeness_tier(),
            3
        );
        assert_eq!(
            record(Some("whois.nic.test"), Some("https://nic.test"), true).completeness_tier(),
            4
        );
    }

    #[test]
    fn test_preferred_rdap_url_gets_trailing_slash() {
        let mut rec = record(None, None, false);
        rec.rdap_servers = vec![
            "https://rdap.nic.test/v1".to_string(),
            "https://backup.nic.test/".to_string(),
        ];
        assert_eq!(
            rec.preferred_rdap_url(),
            Some("https://rdap.nic.test/v1/".to_string())
        );
    }

    #[test]
    fn test_available_record_shape() {
        let rec = DomainRecord::available("free.test", "whois.nic.test", "No match".into());
        assert_eq!(rec.registrar, NOT_REGISTERED);
        assert_eq!(rec.status, vec!["AVAILABLE"]);
        assert!(rec.nameservers.is_empty());
        assert!(rec.expiration_date.is_none());
    }

    #[test]
    fn test_to_update_carries_raw_data() {
        let mut rec = DomainRecord::new("example.com", "whois.verisign-grs.com");
        rec.raw_data = "Domain Name: EXAMPLE.COM".to_string();
        rec.status = vec!["clientTransferProhibited".to_string()];
        let update = rec.to_update();
        assert_eq!(update.registrar, UNKNOWN_REGISTRAR);
        assert_eq!(update.whois_data, "Domain Name: EXAMPLE.COM");
        assert_eq!(update.status, vec!["clientTransferProhibited"]);
    }

    #[test]
    fn test_sources_templates() {
        let sources = IanaSources::default();
        assert_eq!(
            sources.root_db_page(".com"),
            "https://www.iana.org/domains/root/db/com.html"
        );
        assert_eq!(
            sources.rdap_lookup(".COM"),
            "https://rdap.iana.org/domain/com"
        );
    }

    #[test]
    fn test_import_type_serializes_snake_case() {
        let json = serde_json::to_string(&ImportType::CompleteWorkflow).unwrap();
        assert_eq!(json, "\"complete_workflow\"");
        assert_eq!(ImportType::CheckUpdates.to_string(), "check_updates");
    }
}
