use envelope_config::{ConcurrencyMode, Config, ConfigError, ConfigManager};
use tempfile::tempdir;

#[test]
fn default_config_serializes_budget_mutations() {
    let cfg = Config::default();

    assert_eq!(cfg.concurrency, ConcurrencyMode::Reject);
    assert!(cfg.serialize_budget_mutations);
    assert!(!cfg.log_filter.is_empty());
}

#[test]
fn config_manager_persists_and_loads_config() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::with_base_dir(dir.path().join("nested")).expect("manager");

    let mut cfg = Config::default();
    cfg.concurrency = ConcurrencyMode::Queue;
    cfg.serialize_budget_mutations = false;

    manager.save(&cfg).expect("save config");
    let loaded = manager.load().expect("load config");

    assert_eq!(loaded, cfg);
    assert!(!manager.config_path().with_extension("json.tmp").exists());
}

#[test]
fn missing_file_loads_defaults() {
    let dir = tempdir().expect("tempdir");
    let manager = ConfigManager::new(dir.path().join("config.json"));

    let loaded = manager.load().expect("load config");
    assert_eq!(loaded, Config::default());
}

#[test]
fn partial_file_fills_defaults() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{ "concurrency": "queue" }"#).expect("write");

    let loaded = ConfigManager::new(path).load().expect("load config");
    assert_eq!(loaded.concurrency, ConcurrencyMode::Queue);
    assert!(loaded.serialize_budget_mutations);
    assert_eq!(loaded.log_filter, Config::default().log_filter);
}

#[test]
fn malformed_file_reports_parse_error_with_path() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("config.json");
    std::fs::write(&path, "{ not json").expect("write");

    let err = ConfigManager::new(path.clone()).load().expect_err("malformed");
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert_eq!(err.path(), Some(&path));
    assert!(err.to_string().contains("config.json"));
}

#[test]
fn unreadable_path_reports_io_error_with_path() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("config.json");
    std::fs::create_dir(&path).expect("directory in place of the file");

    let err = ConfigManager::new(path.clone()).load().expect_err("is a directory");
    assert!(matches!(err, ConfigError::Io { .. }));
    assert_eq!(err.path(), Some(&path));
}
