//! # Domain Watch Library
//!
//! Registration-data lookups over RDAP and WHOIS, backed by a local directory
//! of per-TLD endpoints that is kept in sync with IANA by a resumable import
//! pipeline.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use domain_watch_lib::{classify_record, DomainWatcher, LookupOutcome, WatchConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let watcher = DomainWatcher::open(WatchConfig::default()).await?;
//!     match watcher.lookup("example.com").await {
//!         LookupOutcome::Failed(e) => eprintln!("lookup failed: {}", e),
//!         outcome => {
//!             if let Some(record) = outcome.record() {
//!                 println!("{} ({})", record.registrar, classify_record(record));
//!             }
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Endpoint discovery**: local directory, IANA WHOIS, the RDAP bootstrap
//!   registry and the root-zone database, in that order
//! - **RDAP first, WHOIS fallback**: with one registrar referral hop
//! - **Registry dialects**: pluggable free-text WHOIS parsers
//! - **Resumable imports**: bounded steps with checkpoints in the import log
//! - **Update checks**: detect new IANA publications before re-importing

// Re-export main public API types and functions
// This makes them available as domain_watch_lib::TypeName
pub use config::{
    default_store_path, default_store_path_from, env_config_from, load_env_config, parse_duration,
    ConfigManager, EnvConfig, FileConfig,
};
pub use discovery::{EndpointCache, EndpointDiscoverer, MemoryCache, NoopCache};
pub use error::{DomainWatchError, FailureKind};
pub use import::{
    Checkpoint, CheckpointState, ImportPipeline, StepOutcome, StepProgress, WorkflowStep,
    CHECKPOINT_VERSION,
};
pub use parser::{parse_rdap, parse_whois, StandardParser, UkParser, WhoisParser};
pub use resolver::DomainResolver;
pub use status::{classify_record, classify_status, DomainStatus, EXPIRING_SOON_DAYS};
pub use store::{
    open_store, FileStore, ImportLogStore, MemoryStore, Store, StoreData, TldDirectory,
};
pub use types::{
    DomainRecord, DomainUpdate, Endpoints, IanaSources, ImportCounts, ImportLog, ImportStatus,
    ImportType, LookupOutcome, TldRecord, TldUpdate, UpsertOutcome, WatchConfig,
};
pub use updates::{SourceCheck, UpdateChecker, UpdateReport};
pub use utils::{normalize_date, normalize_tld, validate_domain};
pub use watcher::DomainWatcher;

// Public modules
pub mod protocols;

// Internal modules - re-exported above where they are part of the API
mod config;
mod discovery;
mod error;
mod import;
mod parser;
mod resolver;
mod status;
mod store;
mod types;
mod updates;
mod utils;
mod watcher;

// Type alias for convenience
pub type Result<T> = std::result::Result<T, DomainWatchError>;

// Library version and metadata
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const AUTHOR: &str = env!("CARGO_PKG_AUTHORS");
