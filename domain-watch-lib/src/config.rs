//! Configuration file parsing and management.
//!
//! Configuration comes from TOML files, `DW_*` environment variables and
//! finally command-line flags. Files are discovered in standard locations
//! and merged field by field; the result is resolved into a [`WatchConfig`].

use crate::error::DomainWatchError;
use crate::types::WatchConfig;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration loaded from TOML files.
///
/// ```toml
/// [network]
/// rdap_timeout = "10s"
/// whois_timeout = "10s"
///
/// [import]
/// batch_size = 50
/// item_delay = "500ms"
///
/// [store]
/// path = "/var/lib/domain-watch/directory.json"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    /// Timeouts, retries and the User-Agent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<NetworkConfig>,

    /// Import batching and pacing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub import: Option<ImportConfig>,

    /// Upstream IANA source URLs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sources: Option<SourcesConfig>,

    /// Directory store location
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store: Option<StoreConfig>,
}

/// Network settings. Durations are strings like `"500ms"`, `"5s"`, `"2m"`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct NetworkConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rdap_timeout: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub whois_timeout: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_connect_timeout: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_timeout: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_retries: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_backoff: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub html_connect_timeout: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub html_timeout: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

/// Import settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ImportConfig {
    /// TLD rows per WHOIS batch
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<usize>,

    /// Pause between per-TLD network calls
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_delay: Option<String>,
}

/// Overrides for the IANA source URLs (mirrors, test fixtures).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SourcesConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rdap_bootstrap_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tld_list_url: Option<String>,

    /// Must contain `{tld}`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_db_url: Option<String>,

    /// Must contain `{name}`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rdap_lookup_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub whois_server: Option<String>,
}

/// Store settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StoreConfig {
    /// JSON document holding the TLD directory and import logs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// Configuration discovery and loading functionality.
pub struct ConfigManager {
    /// Whether to report which files were loaded
    pub verbose: bool,
}

impl ConfigManager {
    /// Create a new configuration manager.
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Load and validate configuration from a specific file.
    pub fn load_file<P: AsRef<Path>>(&self, path: P) -> Result<FileConfig, DomainWatchError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(DomainWatchError::file_error(
                path.to_string_lossy(),
                "Configuration file not found",
            ));
        }

        let content = fs::read_to_string(path).map_err(|e| {
            DomainWatchError::file_error(
                path.to_string_lossy(),
                format!("Failed to read configuration file: {}", e),
            )
        })?;

        let config: FileConfig = toml::from_str(&content).map_err(|e| {
            DomainWatchError::config(format!("Failed to parse TOML configuration: {}", e))
        })?;

        self.validate_config(&config)?;

        Ok(config)
    }

    /// Discover and load configuration files in precedence order.
    ///
    /// XDG config is loaded first, then `~/.domain-watch.toml`, then the
    /// local file; later files win field by field. Files that fail to load
    /// are skipped with a warning.
    pub fn discover_and_load(&self) -> Result<FileConfig, DomainWatchError> {
        let mut merged_config = FileConfig::default();
        let mut loaded_files = Vec::new();

        let candidates = [
            self.get_xdg_config_path(),
            self.get_global_config_path(),
            self.get_local_config_path(),
        ];

        for path in candidates.into_iter().flatten() {
            match self.load_file(&path) {
                Ok(config) => {
                    merged_config = self.merge_configs(merged_config, config);
                    loaded_files.push(path);
                }
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "Ignoring config file"),
            }
        }

        if self.verbose {
            for path in &loaded_files {
                tracing::info!(path = %path.display(), "Loaded config file");
            }
        }

        Ok(merged_config)
    }

    /// Get the local configuration file path.
    fn get_local_config_path(&self) -> Option<PathBuf> {
        let candidates = ["./domain-watch.toml", "./.domain-watch.toml"];

        candidates
            .iter()
            .map(Path::new)
            .find(|path| path.exists())
            .map(Path::to_path_buf)
    }

    /// Get the global configuration file path.
    fn get_global_config_path(&self) -> Option<PathBuf> {
        let home = env::var_os("HOME")?;
        let path = Path::new(&home).join(".domain-watch.toml");
        path.exists().then_some(path)
    }

    /// Get the XDG configuration file path.
    fn get_xdg_config_path(&self) -> Option<PathBuf> {
        let config_dir = env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| env::var_os("HOME").map(|home| Path::new(&home).join(".config")))?;

        let path = config_dir.join("domain-watch").join("config.toml");
        path.exists().then_some(path)
    }

    /// Merge two configurations; values from `higher` win.
    pub fn merge_configs(&self, lower: FileConfig, higher: FileConfig) -> FileConfig {
        FileConfig {
            network: merge_section(lower.network, higher.network, |lower, higher| NetworkConfig {
                rdap_timeout: higher.rdap_timeout.or(lower.rdap_timeout),
                whois_timeout: higher.whois_timeout.or(lower.whois_timeout),
                data_connect_timeout: higher.data_connect_timeout.or(lower.data_connect_timeout),
                data_timeout: higher.data_timeout.or(lower.data_timeout),
                data_retries: higher.data_retries.or(lower.data_retries),
                retry_backoff: higher.retry_backoff.or(lower.retry_backoff),
                html_connect_timeout: higher.html_connect_timeout.or(lower.html_connect_timeout),
                html_timeout: higher.html_timeout.or(lower.html_timeout),
                user_agent: higher.user_agent.or(lower.user_agent),
            }),
            import: merge_section(lower.import, higher.import, |lower, higher| ImportConfig {
                batch_size: higher.batch_size.or(lower.batch_size),
                item_delay: higher.item_delay.or(lower.item_delay),
            }),
            sources: merge_section(lower.sources, higher.sources, |lower, higher| SourcesConfig {
                rdap_bootstrap_url: higher.rdap_bootstrap_url.or(lower.rdap_bootstrap_url),
                tld_list_url: higher.tld_list_url.or(lower.tld_list_url),
                root_db_url: higher.root_db_url.or(lower.root_db_url),
                rdap_lookup_url: higher.rdap_lookup_url.or(lower.rdap_lookup_url),
                whois_server: higher.whois_server.or(lower.whois_server),
            }),
            store: merge_section(lower.store, higher.store, |lower, higher| StoreConfig {
                path: higher.path.or(lower.path),
            }),
        }
    }

    /// Validate a configuration for common issues.
    fn validate_config(&self, config: &FileConfig) -> Result<(), DomainWatchError> {
        if let Some(network) = &config.network {
            let durations = [
                ("network.rdap_timeout", &network.rdap_timeout),
                ("network.whois_timeout", &network.whois_timeout),
                ("network.data_connect_timeout", &network.data_connect_timeout),
                ("network.data_timeout", &network.data_timeout),
                ("network.retry_backoff", &network.retry_backoff),
                ("network.html_connect_timeout", &network.html_connect_timeout),
                ("network.html_timeout", &network.html_timeout),
            ];
            for (key, value) in durations {
                if let Some(value) = value {
                    require_duration(key, value)?;
                }
            }

            if let Some(retries) = network.data_retries {
                if retries > 10 {
                    return Err(DomainWatchError::config(
                        "network.data_retries must be between 0 and 10",
                    ));
                }
            }
        }

        if let Some(import) = &config.import {
            if let Some(batch_size) = import.batch_size {
                if batch_size == 0 || batch_size > 500 {
                    return Err(DomainWatchError::config(
                        "import.batch_size must be between 1 and 500",
                    ));
                }
            }
            if let Some(delay) = &import.item_delay {
                require_duration("import.item_delay", delay)?;
            }
        }

        if let Some(sources) = &config.sources {
            if let Some(url) = &sources.root_db_url {
                if !url.contains("{tld}") {
                    return Err(DomainWatchError::config(
                        "sources.root_db_url must contain the {tld} placeholder",
                    ));
                }
            }
            if let Some(url) = &sources.rdap_lookup_url {
                if !url.contains("{name}") {
                    return Err(DomainWatchError::config(
                        "sources.rdap_lookup_url must contain the {name} placeholder",
                    ));
                }
            }
            let required = [
                ("sources.rdap_bootstrap_url", &sources.rdap_bootstrap_url),
                ("sources.tld_list_url", &sources.tld_list_url),
                ("sources.whois_server", &sources.whois_server),
            ];
            for (key, value) in required {
                if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
                    return Err(DomainWatchError::config(format!("{} cannot be empty", key)));
                }
            }
        }

        Ok(())
    }

    /// Resolve defaults, file values and environment values into a
    /// [`WatchConfig`]. Command-line flags are applied by the caller with the
    /// `with_*` builders.
    pub fn resolve(&self, file: &FileConfig, env: &EnvConfig) -> Result<WatchConfig, DomainWatchError> {
        let mut config = WatchConfig::default();

        if let Some(network) = &file.network {
            apply_duration(&mut config.rdap_timeout, &network.rdap_timeout);
            apply_duration(&mut config.whois_timeout, &network.whois_timeout);
            apply_duration(&mut config.data_connect_timeout, &network.data_connect_timeout);
            apply_duration(&mut config.data_timeout, &network.data_timeout);
            apply_duration(&mut config.retry_backoff, &network.retry_backoff);
            apply_duration(&mut config.html_connect_timeout, &network.html_connect_timeout);
            apply_duration(&mut config.html_timeout, &network.html_timeout);
            if let Some(retries) = network.data_retries {
                config.data_retries = retries;
            }
            if let Some(agent) = &network.user_agent {
                config.user_agent = agent.clone();
            }
        }

        if let Some(import) = &file.import {
            if let Some(batch_size) = import.batch_size {
                config = config.with_batch_size(batch_size);
            }
            apply_duration(&mut config.item_delay, &import.item_delay);
        }

        if let Some(sources) = &file.sources {
            let target = &mut config.sources;
            for (slot, value) in [
                (&mut target.rdap_bootstrap_url, &sources.rdap_bootstrap_url),
                (&mut target.tld_list_url, &sources.tld_list_url),
                (&mut target.root_db_url, &sources.root_db_url),
                (&mut target.rdap_lookup_url, &sources.rdap_lookup_url),
                (&mut target.whois_server, &sources.whois_server),
            ] {
                if let Some(value) = value {
                    *slot = value.clone();
                }
            }
        }

        if let Some(path) = file.store.as_ref().and_then(|s| s.path.clone()) {
            config.store_path = Some(path);
        }

        // Environment overrides files.
        if let Some(path) = &env.store {
            config.store_path = Some(PathBuf::from(path));
        }
        if let Some(batch_size) = env.batch_size {
            config = config.with_batch_size(batch_size);
        }
        if let Some(delay) = env.item_delay {
            config.item_delay = delay;
        }
        if let Some(timeout) = env.rdap_timeout {
            config.rdap_timeout = timeout;
        }
        if let Some(timeout) = env.whois_timeout {
            config.whois_timeout = timeout;
        }

        if config.data_timeout < config.data_connect_timeout {
            return Err(DomainWatchError::config(
                "network.data_timeout cannot be shorter than network.data_connect_timeout",
            ));
        }

        Ok(config)
    }
}

fn merge_section<T>(lower: Option<T>, higher: Option<T>, merge: impl FnOnce(T, T) -> T) -> Option<T> {
    match (lower, higher) {
        (Some(lower), Some(higher)) => Some(merge(lower, higher)),
        (lower, higher) => higher.or(lower),
    }
}

fn require_duration(key: &str, value: &str) -> Result<Duration, DomainWatchError> {
    parse_duration(value).ok_or_else(|| {
        DomainWatchError::config(format!(
            "Invalid duration '{}' for {}. Use format like '500ms', '5s', '2m'",
            value, key
        ))
    })
}

/// Values were validated on load; anything unparsable keeps the default.
fn apply_duration(slot: &mut Duration, value: &Option<String>) {
    if let Some(duration) = value.as_deref().and_then(parse_duration) {
        *slot = duration;
    }
}

/// Configuration taken from `DW_*` environment variables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvConfig {
    pub store: Option<String>,
    pub batch_size: Option<usize>,
    pub item_delay: Option<Duration>,
    pub rdap_timeout: Option<Duration>,
    pub whois_timeout: Option<Duration>,
    pub config: Option<String>,
}

/// Load configuration from the process environment.
///
/// Invalid values are logged as warnings and ignored.
pub fn load_env_config(verbose: bool) -> EnvConfig {
    env_config_from(|key| env::var(key).ok(), verbose)
}

/// Load `DW_*` configuration through `lookup`.
pub fn env_config_from<F>(lookup: F, verbose: bool) -> EnvConfig
where
    F: Fn(&str) -> Option<String>,
{
    let mut env_config = EnvConfig::default();

    let text = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
    let duration = |key: &str| {
        let raw = text(key)?;
        match parse_duration(&raw) {
            Some(duration) => {
                if verbose {
                    tracing::info!("Using {}={}", key, raw);
                }
                Some(duration)
            }
            None => {
                tracing::warn!("Invalid {}='{}', use format like '500ms', '5s', '2m'", key, raw);
                None
            }
        }
    };

    if let Some(store) = text("DW_STORE") {
        if verbose {
            tracing::info!("Using DW_STORE={}", store);
        }
        env_config.store = Some(store);
    }

    if let Some(raw) = text("DW_BATCH_SIZE") {
        match raw.trim().parse::<usize>() {
            Ok(size) if size > 0 && size <= 500 => {
                if verbose {
                    tracing::info!("Using DW_BATCH_SIZE={}", size);
                }
                env_config.batch_size = Some(size);
            }
            _ => tracing::warn!("Invalid DW_BATCH_SIZE='{}', must be 1-500", raw),
        }
    }

    env_config.item_delay = duration("DW_ITEM_DELAY");
    env_config.rdap_timeout = duration("DW_RDAP_TIMEOUT");
    env_config.whois_timeout = duration("DW_WHOIS_TIMEOUT");

    if let Some(config) = text("DW_CONFIG") {
        if verbose {
            tracing::info!("Using DW_CONFIG={}", config);
        }
        env_config.config = Some(config);
    }

    env_config
}

/// Default location of the durable store:
/// `$XDG_DATA_HOME/domain-watch/store.json`, else
/// `~/.local/share/domain-watch/store.json`.
pub fn default_store_path() -> Option<PathBuf> {
    default_store_path_from(|key| env::var(key).ok())
}

/// Resolve the default store path through `lookup`.
pub fn default_store_path_from<F>(lookup: F) -> Option<PathBuf>
where
    F: Fn(&str) -> Option<String>,
{
    let set = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
    let data_dir = set("XDG_DATA_HOME")
        .map(PathBuf::from)
        .or_else(|| set("HOME").map(|home| Path::new(&home).join(".local").join("share")))?;

    Some(data_dir.join("domain-watch").join("store.json"))
}

/// Parse a duration like `"500ms"`, `"5s"` or `"2m"`; a bare number is
/// seconds.
pub fn parse_duration(value: &str) -> Option<Duration> {
    let value = value.trim().to_lowercase();

    if let Some(ms) = value.strip_suffix("ms") {
        ms.trim().parse::<u64>().ok().map(Duration::from_millis)
    } else if let Some(secs) = value.strip_suffix('s') {
        secs.trim().parse::<u64>().ok().map(Duration::from_secs)
    } else if let Some(mins) = value.strip_suffix('m') {
        mins.trim()
            .parse::<u64>()
            .ok()
            .map(|m| Duration::from_secs(m * 60))
    } else {
        value.parse::<u64>().ok().map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(content.as_bytes()).unwrap();
        temp_file.flush().unwrap();
        temp_file
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("500ms"), Some(Duration::from_millis(500)));
        assert_eq!(parse_duration("5s"), Some(Duration::from_secs(5)));
        assert_eq!(parse_duration("2m"), Some(Duration::from_secs(120)));
        assert_eq!(parse_duration("7"), Some(Duration::from_secs(7)));
        assert_eq!(parse_duration("soon"), None);
        assert_eq!(parse_duration("ms"), None);
    }

    #[test]
    fn test_load_valid_config() {
        let temp_file = write_config(
            r#"
[network]
rdap_timeout = "4s"
data_retries = 1

[import]
batch_size = 25
item_delay = "250ms"

[sources]
tld_list_url = "http://mirror.test/tlds.txt"

[store]
path = "/tmp/directory.json"
"#,
        );

        let manager = ConfigManager::new(false);
        let config = manager.load_file(temp_file.path()).unwrap();

        let network = config.network.clone().unwrap();
        assert_eq!(network.rdap_timeout.as_deref(), Some("4s"));
        assert_eq!(network.data_retries, Some(1));
        assert_eq!(config.import.clone().unwrap().batch_size, Some(25));

        let resolved = manager.resolve(&config, &EnvConfig::default()).unwrap();
        assert_eq!(resolved.rdap_timeout, Duration::from_secs(4));
        assert_eq!(resolved.whois_timeout, Duration::from_secs(10));
        assert_eq!(resolved.data_retries, 1);
        assert_eq!(resolved.batch_size, 25);
        assert_eq!(resolved.item_delay, Duration::from_millis(250));
        assert_eq!(resolved.sources.tld_list_url, "http://mirror.test/tlds.txt");
        assert_eq!(
            resolved.sources.rdap_bootstrap_url,
            "https://data.iana.org/rdap/dns.json"
        );
        assert_eq!(
            resolved.store_path,
            Some(PathBuf::from("/tmp/directory.json"))
        );
    }

    #[test]
    fn test_invalid_batch_size() {
        let temp_file = write_config("[import]\nbatch_size = 0\n");
        let manager = ConfigManager::new(false);
        assert!(manager.load_file(temp_file.path()).is_err());
    }

    #[test]
    fn test_invalid_duration() {
        let temp_file = write_config("[network]\nwhois_timeout = \"forever\"\n");
        let manager = ConfigManager::new(false);
        let err = manager.load_file(temp_file.path()).unwrap_err();
        assert!(err.to_string().contains("network.whois_timeout"));
    }

    #[test]
    fn test_source_placeholders_are_required() {
        let temp_file = write_config("[sources]\nroot_db_url = \"https://mirror.test/root.html\"\n");
        let manager = ConfigManager::new(false);
        assert!(manager.load_file(temp_file.path()).is_err());
    }

    #[test]
    fn test_missing_file() {
        let manager = ConfigManager::new(false);
        assert!(matches!(
            manager.load_file("/definitely/not/here.toml"),
            Err(DomainWatchError::FileError { .. })
        ));
    }

    #[test]
    fn test_merge_configs() {
        let manager = ConfigManager::new(false);

        let lower = FileConfig {
            network: Some(NetworkConfig {
                rdap_timeout: Some("3s".to_string()),
                whois_timeout: Some("8s".to_string()),
                ..Default::default()
            }),
            import: Some(ImportConfig {
                batch_size: Some(10),
                item_delay: None,
            }),
            ..Default::default()
        };

        let higher = FileConfig {
            network: Some(NetworkConfig {
                rdap_timeout: Some("6s".to_string()),
                ..Default::default()
            }),
            store: Some(StoreConfig {
                path: Some(PathBuf::from("local.json")),
            }),
            ..Default::default()
        };

        let merged = manager.merge_configs(lower, higher);
        let network = merged.network.unwrap();

        assert_eq!(network.rdap_timeout.as_deref(), Some("6s")); // Higher wins
        assert_eq!(network.whois_timeout.as_deref(), Some("8s")); // Lower preserved
        assert_eq!(merged.import.unwrap().batch_size, Some(10));
        assert_eq!(merged.store.unwrap().path, Some(PathBuf::from("local.json")));
    }

    #[test]
    fn test_env_config() {
        let vars: HashMap<&str, &str> = [
            ("DW_STORE", "/srv/watch.json"),
            ("DW_BATCH_SIZE", "20"),
            ("DW_ITEM_DELAY", "100ms"),
            ("DW_RDAP_TIMEOUT", "bogus"),
            ("DW_CONFIG", "custom.toml"),
        ]
        .into_iter()
        .collect();

        let env_config = env_config_from(|key| vars.get(key).map(|v| v.to_string()), false);

        assert_eq!(env_config.store.as_deref(), Some("/srv/watch.json"));
        assert_eq!(env_config.batch_size, Some(20));
        assert_eq!(env_config.item_delay, Some(Duration::from_millis(100)));
        assert_eq!(env_config.rdap_timeout, None);
        assert_eq!(env_config.whois_timeout, None);
        assert_eq!(env_config.config.as_deref(), Some("custom.toml"));
    }

    #[test]
    fn test_default_store_path() {
        let xdg: HashMap<&str, &str> = [("XDG_DATA_HOME", "/data"), ("HOME", "/home/me")]
            .into_iter()
            .collect();
        assert_eq!(
            default_store_path_from(|key| xdg.get(key).map(|v| v.to_string())),
            Some(PathBuf::from("/data/domain-watch/store.json"))
        );

        let home: HashMap<&str, &str> = [("XDG_DATA_HOME", ""), ("HOME", "/home/me")]
            .into_iter()
            .collect();
        assert_eq!(
            default_store_path_from(|key| home.get(key).map(|v| v.to_string())),
            Some(PathBuf::from("/home/me/.local/share/domain-watch/store.json"))
        );

        assert_eq!(default_store_path_from(|_| None), None);
    }

    #[test]
    fn test_env_overrides_file() {
        let manager = ConfigManager::new(false);
        let file = FileConfig {
            import: Some(ImportConfig {
                batch_size: Some(10),
                item_delay: Some("2s".to_string()),
            }),
            ..Default::default()
        };
        let env_config = EnvConfig {
            batch_size: Some(30),
            store: Some("env.json".to_string()),
            ..Default::default()
        };

        let resolved = manager.resolve(&file, &env_config).unwrap();
        assert_eq!(resolved.batch_size, 30);
        assert_eq!(resolved.item_delay, Duration::from_secs(2));
        assert_eq!(resolved.store_path, Some(PathBuf::from("env.json")));
    }
}
