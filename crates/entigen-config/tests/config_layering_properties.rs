//! Tests for configuration layering
//!
//! Property: later layers win. Defaults are overridden by `entigen.toml`, which is
//! overridden by `ENTIGEN_*` environment variables.

use std::fs;

use entigen_config::{ConfigError, ConfigManager, ConfigManagerTrait, GeneratorConfig};
use entigen_generation::{ListEncoding, MigrationStamp, StorageBackend};
use proptest::prelude::*;
use serial_test::serial;
use tempfile::TempDir;

fn manager(dir: &TempDir, prefix: &str) -> ConfigManager {
    ConfigManager::for_project(dir.path())
        .without_user_config()
        .with_env_prefix(prefix)
}

#[test]
fn test_missing_file_yields_defaults() {
    let dir = TempDir::new().unwrap();
    let config = manager(&dir, "ENTIGEN_T_DEFAULTS").load_config().unwrap();
    assert_eq!(config, GeneratorConfig::default());
}

#[test]
fn test_project_file_overrides_defaults() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("entigen.toml"),
        r#"
module_root = "github.com/acme/shop"
backend = "mongodb"
list_encoding = "comma_joined"
parallel = false
"#,
    )
    .unwrap();

    let config = manager(&dir, "ENTIGEN_T_FILE").load_config().unwrap();
    assert_eq!(config.module_root.as_deref(), Some("github.com/acme/shop"));
    assert_eq!(config.storage_backend().unwrap(), StorageBackend::MongoDb);
    assert_eq!(config.list_encoding, ListEncoding::CommaJoined);
    assert!(!config.parallel);
    assert_eq!(config.log_level, "info");
}

#[test]
#[serial]
fn test_environment_overrides_file() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("entigen.toml"),
        "module_root = \"github.com/acme/shop\"\nbackend = \"postgres\"\n",
    )
    .unwrap();

    std::env::set_var("ENTIGEN_T_ENV_BACKEND", "mysql");
    std::env::set_var("ENTIGEN_T_ENV_OVERWRITE", "true");
    let loaded = manager(&dir, "ENTIGEN_T_ENV").load_config();
    std::env::remove_var("ENTIGEN_T_ENV_BACKEND");
    std::env::remove_var("ENTIGEN_T_ENV_OVERWRITE");

    let config = loaded.unwrap();
    assert_eq!(config.backend, "mysql");
    assert!(config.overwrite);
    assert_eq!(config.module_root.as_deref(), Some("github.com/acme/shop"));
}

#[test]
fn test_invalid_backend_in_file_is_rejected() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("entigen.toml"), "backend = \"cassandra\"\n").unwrap();
    let err = manager(&dir, "ENTIGEN_T_BAD").load_config().unwrap_err();
    assert!(matches!(err, ConfigError::Project(_)));
}

#[test]
fn test_malformed_file_is_parse_error() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("entigen.toml"), "backend = [unclosed").unwrap();
    let err = manager(&dir, "ENTIGEN_T_MALFORMED").load_config().unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn test_project_context_from_loaded_config() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("entigen.toml"),
        "module_root = \"github.com/acme/shop\"\n",
    )
    .unwrap();
    let config = manager(&dir, "ENTIGEN_T_CONTEXT").load_config().unwrap();
    let context = config
        .project_context(MigrationStamp::parse("20240601000000").unwrap())
        .unwrap();
    assert_eq!(context.module_root, "github.com/acme/shop");
    assert_eq!(context.storage_backend(), StorageBackend::Postgres);
}

proptest! {
    /// Property: a saved configuration loads back unchanged
    #[test]
    fn prop_save_then_load(
        module_root in "[a-z]{3,8}\\.com/[a-z]{3,8}",
        backend in prop::sample::select(vec!["postgres", "mysql", "mongodb"]),
        comma_joined in any::<bool>(),
        parallel in any::<bool>(),
        overwrite in any::<bool>(),
        log_level in prop::sample::select(vec!["error", "warn", "info", "debug"]),
    ) {
        let dir = TempDir::new().unwrap();
        let config = GeneratorConfig {
            module_root: Some(module_root),
            backend: backend.to_string(),
            list_encoding: if comma_joined { ListEncoding::CommaJoined } else { ListEncoding::Native },
            parallel,
            overwrite,
            log_level: log_level.to_string(),
            ..Default::default()
        };

        let mut manager = manager(&dir, "ENTIGEN_T_PROP");
        manager.save_config(&config).unwrap();
        prop_assert_eq!(manager.load_config().unwrap(), config);
    }
}
