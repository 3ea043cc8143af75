//! Tests for configuration loading and root folder resolution
//!
//! Tests that manipulate AGRO_ROOT_FOLDER are marked #[serial] so they never
//! race each other on the process environment.

use agro_common::config::{
    load_or_default, load_toml_config, CompiledDefaults, RootFolderInitializer,
    RootFolderResolver, ENV_ROOT_FOLDER,
};
use serial_test::serial;
use std::env;
use std::path::PathBuf;

#[test]
fn test_compiled_defaults() {
    let defaults = CompiledDefaults::for_current_platform();

    assert!(!defaults.root_folder.as_os_str().is_empty());
    assert_eq!(defaults.port, 5780);
    assert_eq!(defaults.bind_address, "127.0.0.1");
    assert_eq!(defaults.log_level, "info");
    assert_eq!(defaults.max_upload_bytes, 10 * 1024 * 1024);
}

#[test]
#[serial]
fn test_resolver_with_no_overrides_uses_default() {
    env::remove_var(ENV_ROOT_FOLDER);

    let root_folder = RootFolderResolver::new("test-module").resolve();

    let defaults = CompiledDefaults::for_current_platform();
    assert_eq!(root_folder, defaults.root_folder);
}

#[test]
#[serial]
fn test_resolver_env_beats_toml() {
    env::set_var(ENV_ROOT_FOLDER, "/tmp/agro-test-env-folder");

    let root_folder = RootFolderResolver::new("test-module")
        .with_toml_root(Some(PathBuf::from("/tmp/agro-test-toml-folder")))
        .resolve();

    env::remove_var(ENV_ROOT_FOLDER);
    assert_eq!(root_folder, PathBuf::from("/tmp/agro-test-env-folder"));
}

#[test]
#[serial]
fn test_resolver_cli_beats_env() {
    env::set_var(ENV_ROOT_FOLDER, "/tmp/agro-test-env-folder");

    let root_folder = RootFolderResolver::new("test-module")
        .with_cli_override(Some(PathBuf::from("/tmp/agro-test-cli-folder")))
        .resolve();

    env::remove_var(ENV_ROOT_FOLDER);
    assert_eq!(root_folder, PathBuf::from("/tmp/agro-test-cli-folder"));
}

#[test]
#[serial]
fn test_resolver_toml_used_without_env() {
    env::remove_var(ENV_ROOT_FOLDER);

    let root_folder = RootFolderResolver::new("test-module")
        .with_toml_root(Some(PathBuf::from("/tmp/agro-test-toml-folder")))
        .resolve();

    assert_eq!(root_folder, PathBuf::from("/tmp/agro-test-toml-folder"));
}

#[test]
fn test_initializer_creates_missing_folder() {
    let temp = tempfile::tempdir().unwrap();
    let root = temp.path().join("nested").join("agro");

    let initializer = RootFolderInitializer::new(root.clone());
    initializer.ensure_directory_exists().unwrap();

    assert!(root.is_dir());
    // Second call is a no-op
    initializer.ensure_directory_exists().unwrap();
}

#[test]
fn test_load_toml_config_full_file() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("agro-ui.toml");
    std::fs::write(
        &path,
        r#"
root_folder = "/srv/agrodetect"
bind_address = "0.0.0.0"
port = 8080
max_upload_bytes = 2048
session_idle_timeout_secs = 60

[logging]
level = "debug"

[voice]
enabled = false
timeout_secs = 3
"#,
    )
    .unwrap();

    let config = load_toml_config(&path).unwrap();
    assert_eq!(config.root_folder, Some(PathBuf::from("/srv/agrodetect")));
    assert_eq!(config.bind_address.as_deref(), Some("0.0.0.0"));
    assert_eq!(config.port, Some(8080));
    assert_eq!(config.max_upload_bytes, Some(2048));
    assert_eq!(config.session_idle_timeout_secs, Some(60));
    assert_eq!(config.logging.level, "debug");
    assert!(!config.voice.enabled);
    assert_eq!(config.voice.timeout_secs, 3);
    assert_eq!(config.voice.base_url, "https://translate.google.com");
}

#[test]
fn test_malformed_toml_degrades_to_defaults() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("broken.toml");
    std::fs::write(&path, "port = \"not a number").unwrap();

    assert!(load_toml_config(&path).is_err());

    let config = load_or_default(Some(&path), "agro-ui");
    assert!(config.port.is_none());
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_missing_explicit_toml_degrades_to_defaults() {
    let temp = tempfile::tempdir().unwrap();
    let config = load_or_default(Some(&temp.path().join("absent.toml")), "agro-ui");
    assert!(config.root_folder.is_none());
    assert!(config.voice.enabled);
}
