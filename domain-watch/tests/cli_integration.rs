// domain-watch/tests/cli_integration.rs

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::{NamedTempFile, TempDir};

/// Command isolated from the user's config files and `DW_*` variables.
fn domain_watch(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("domain-watch").unwrap();
    cmd.current_dir(home.path())
        .env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join(".config"))
        .env("XDG_DATA_HOME", home.path().join(".local").join("share"))
        .env_remove("RUST_LOG");
    for var in [
        "DW_STORE",
        "DW_BATCH_SIZE",
        "DW_ITEM_DELAY",
        "DW_RDAP_TIMEOUT",
        "DW_WHOIS_TIMEOUT",
        "DW_CONFIG",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

/// Helper to create a config file
fn create_config_file(content: &str) -> NamedTempFile {
    let file = NamedTempFile::new().expect("Failed to create temp file");
    fs::write(file.path(), content).expect("Failed to write to temp file");
    file
}

#[test]
fn test_help_lists_subcommands() {
    let home = TempDir::new().unwrap();
    let mut cmd = domain_watch(&home);
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("lookup"))
        .stdout(predicate::str::contains("discover"))
        .stdout(predicate::str::contains("import"))
        .stdout(predicate::str::contains("check-updates"))
        .stdout(predicate::str::contains("status"))
        .stdout(predicate::str::contains("--store"));
}

#[test]
fn test_import_help_lists_kinds() {
    let home = TempDir::new().unwrap();
    let mut cmd = domain_watch(&home);
    cmd.args(["import", "--help"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("tld-list"))
        .stdout(predicate::str::contains("whois"))
        .stdout(predicate::str::contains("--session"));
}

#[test]
fn test_unknown_import_kind_fails() {
    let home = TempDir::new().unwrap();
    let mut cmd = domain_watch(&home);
    cmd.args(["import", "everything"]);

    cmd.assert().failure();
}

#[test]
fn test_status_of_missing_log() {
    let home = TempDir::new().unwrap();
    let store = home.path().join("directory.json");
    let mut cmd = domain_watch(&home);
    cmd.args(["status", "42", "--store"]).arg(&store);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Import log 42 not found"));
}

#[test]
fn test_whois_import_on_empty_directory_completes() {
    let home = TempDir::new().unwrap();
    let store = home.path().join("directory.json");

    let mut cmd = domain_watch(&home);
    cmd.args(["import", "whois", "--store"]).arg(&store);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("whois import 1 completed"));

    assert!(store.exists());

    let mut cmd = domain_watch(&home);
    cmd.args(["status", "1", "--json", "--store"]).arg(&store);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"import_type\": \"whois\""))
        .stdout(predicate::str::contains("\"status\": \"completed\""));
}

#[test]
fn test_store_from_environment() {
    let home = TempDir::new().unwrap();
    let store = home.path().join("from-env.json");

    let mut cmd = domain_watch(&home);
    cmd.args(["import", "whois"]).env("DW_STORE", &store);
    cmd.assert().success();

    assert!(store.exists());
}

#[test]
fn test_default_store_persists_between_runs() {
    let home = TempDir::new().unwrap();

    let mut cmd = domain_watch(&home);
    cmd.args(["import", "whois"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("whois import 1 completed"));

    let mut cmd = domain_watch(&home);
    cmd.args(["import", "whois"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("whois import 2 completed"));

    let store = home
        .path()
        .join(".local")
        .join("share")
        .join("domain-watch")
        .join("store.json");
    assert!(store.exists());
}

#[test]
fn test_stateful_command_without_store_location_fails() {
    let home = TempDir::new().unwrap();
    let mut cmd = domain_watch(&home);
    cmd.args(["status", "1"])
        .env_remove("HOME")
        .env_remove("XDG_DATA_HOME");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("No store configured"));
}

#[test]
fn test_invalid_domain_is_reported_not_fatal() {
    let home = TempDir::new().unwrap();
    let mut cmd = domain_watch(&home);
    cmd.args(["lookup", "not_a_domain!", "--json"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"outcome\": \"failed\""))
        .stdout(predicate::str::contains("\"status\": \"error\""));
}

#[test]
fn test_invalid_domain_text_output() {
    let home = TempDir::new().unwrap();
    let mut cmd = domain_watch(&home);
    cmd.args(["lookup", "localhost"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("localhost"))
        .stdout(predicate::str::contains("ERROR"));
}

#[test]
fn test_lookup_requires_domains() {
    let home = TempDir::new().unwrap();
    let mut cmd = domain_watch(&home);
    cmd.arg("lookup");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("No domains specified"));
}

#[test]
fn test_missing_config_file() {
    let home = TempDir::new().unwrap();
    let mut cmd = domain_watch(&home);
    cmd.args(["status", "1", "--config", "/nonexistent/domain-watch.toml"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load config file"));
}

#[test]
fn test_invalid_config_is_rejected() {
    let home = TempDir::new().unwrap();
    let config = create_config_file("[import]\nbatch_size = 0\n");
    let mut cmd = domain_watch(&home);
    cmd.args(["status", "1", "--config"]).arg(config.path());

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("batch_size"));
}

#[test]
fn test_local_config_sets_store() {
    let home = TempDir::new().unwrap();
    fs::write(
        home.path().join("domain-watch.toml"),
        "[store]\npath = \"local-store.json\"\n",
    )
    .unwrap();

    let mut cmd = domain_watch(&home);
    cmd.args(["import", "whois"]);
    cmd.assert().success();

    assert!(home.path().join("local-store.json").exists());
}

#[test]
#[ignore] // Requires network access
fn test_live_lookup() {
    let home = TempDir::new().unwrap();
    let mut cmd = domain_watch(&home);
    cmd.args(["lookup", "iana.org", "--json"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"outcome\": \"resolved\""));
}

#[test]
#[ignore] // Requires network access
fn test_live_discover() {
    let home = TempDir::new().unwrap();
    let mut cmd = domain_watch(&home);
    cmd.args(["discover", "com"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("RDAP"));
}
