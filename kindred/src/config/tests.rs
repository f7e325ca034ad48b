//! Configuration system tests

use super::*;

#[test]
fn default_config_is_valid() {
    let config = ConfigBuilder::defaults().build().unwrap();
    assert_eq!(config.scheduler.reset_hour, 0);
    assert_eq!(config.scheduler.reset_minute, 0);
    assert_eq!(config.scheduler.utc_offset_minutes, 0);
    assert_eq!(config.logging.level, LogLevel::Info);
    assert!(config.logging.stdout);
}

#[test]
fn builder_sets_reset_time() {
    let config = ConfigBuilder::new()
        .with_reset_time(2, 30)
        .with_utc_offset_minutes(540)
        .build()
        .unwrap();
    assert_eq!(config.scheduler.reset_hour, 2);
    assert_eq!(config.scheduler.reset_minute, 30);
    assert_eq!(config.scheduler.utc_offset_minutes, 540);
}

#[test]
fn builder_rejects_invalid_reset_time() {
    assert!(ConfigBuilder::new().with_reset_time(24, 0).build().is_err());
    assert!(ConfigBuilder::new().with_reset_time(0, 60).build().is_err());
    assert!(ConfigBuilder::new()
        .with_utc_offset_minutes(20 * 60)
        .build()
        .is_err());
}

#[test]
fn builder_rejects_logging_without_target() {
    let mut config = KindredConfig::default();
    config.logging.stdout = false;
    config.logging.file = None;
    assert!(super::validation::validate_config(&config).is_err());
}

#[test]
fn log_file_disables_stdout() {
    let config = ConfigBuilder::new()
        .with_log_file("/tmp/kindred.log")
        .build()
        .unwrap();
    assert!(!config.logging.stdout);
    assert!(config.logging.file.is_some());
}

#[test]
fn loader_reads_toml_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("kindred.toml");
    std::fs::write(
        &path,
        r#"
[scheduler]
reset_hour = 5
reset_minute = 15

[logging]
level = "debug"
format = "json"
"#,
    )
    .unwrap();

    let mut loader = ConfigLoader::new();
    loader.load_file(&path).unwrap();
    let config = loader.extract().unwrap();

    assert_eq!(config.scheduler.reset_hour, 5);
    assert_eq!(config.scheduler.reset_minute, 15);
    assert_eq!(config.logging.level, LogLevel::Debug);
    assert_eq!(config.logging.format, LogFormat::Json);
}

#[test]
fn loader_rejects_missing_file() {
    let mut loader = ConfigLoader::new();
    assert!(loader.load_file("/definitely/not/here.toml").is_err());
}

#[test]
fn loader_rejects_invalid_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("kindred.toml");
    std::fs::write(&path, "[scheduler]\nreset_hour = 99\n").unwrap();

    let mut loader = ConfigLoader::new();
    loader.load_file(&path).unwrap();
    assert!(loader.extract().is_err());
}

#[test]
fn config_round_trips_through_serde() {
    let config = ConfigBuilder::new()
        .with_reset_time(2, 30)
        .with_log_level(LogLevel::Warn)
        .build()
        .unwrap();
    let json = serde_json::to_string(&config).unwrap();
    let parsed: KindredConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, config);
}
