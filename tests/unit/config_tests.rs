use clap::Parser;
use tempfile::TempDir;
use validate_streams::config::{ConfigError, ConfigManager};
use validate_streams::{Cli, OutputFormat, VerbosityLevel};

use crate::common::test_helpers::write_file;

const TOML_CONFIG: &str = r#"
[validation]
threads = 3
check_files = false

[output]
format = "json"

[files]
extensions = ["xml", "streams"]
exclude_patterns = ["**/archive/**"]
"#;

#[tokio::test]
async fn test_partial_toml_config_keeps_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_file(temp_dir.path(), "validate-streams.toml", "[validation]\nfail_fast = true\n")
        .await
        .unwrap();

    let config = ConfigManager::load_from_file(&path).await.unwrap();
    assert!(config.validation.fail_fast);
    assert!(config.validation.check_files);
    assert_eq!(config.files.extensions, vec!["xml".to_string()]);
    assert_eq!(config.output.format, OutputFormat::Human);
}

#[tokio::test]
async fn test_cli_flags_override_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_file(temp_dir.path(), "validate-streams.toml", TOML_CONFIG)
        .await
        .unwrap();

    let cli = Cli::try_parse_from([
        "validate-streams",
        "--config",
        path.to_str().unwrap(),
        "--threads",
        "8",
        "--quiet",
        temp_dir.path().to_str().unwrap(),
    ])
    .unwrap();

    let config = ConfigManager::merge_with_cli(ConfigManager::load_from_file(&path).await.unwrap(), &cli);

    assert_eq!(ConfigManager::get_thread_count(&config), 8);
    assert!(!config.validation.check_files);
    assert_eq!(config.output.format, OutputFormat::Json);
    assert_eq!(config.verbosity(), VerbosityLevel::Quiet);
    assert_eq!(config.files.exclude_patterns, vec!["**/archive/**".to_string()]);
}

#[tokio::test]
async fn test_json_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_file(
        temp_dir.path(),
        "validate-streams.json",
        r#"{"files": {"max_depth": 2}, "output": {"verbose": true}}"#,
    )
    .await
    .unwrap();

    let config = ConfigManager::load_from_file(&path).await.unwrap();
    assert_eq!(config.files.max_depth, Some(2));
    assert_eq!(config.verbosity(), VerbosityLevel::Verbose);
}

#[tokio::test]
async fn test_config_discovery_in_directory() {
    let temp_dir = TempDir::new().unwrap();
    write_file(temp_dir.path(), ".validate-streams.toml", TOML_CONFIG)
        .await
        .unwrap();

    let found = ConfigManager::find_config_file_in(&[temp_dir.path().to_path_buf()])
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.validation.threads, Some(3));

    let empty = TempDir::new().unwrap();
    let missing = ConfigManager::find_config_file_in(&[empty.path().to_path_buf()])
        .await
        .unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn test_unsupported_config_extension() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_file(temp_dir.path(), "validate-streams.yaml", "threads: 2\n")
        .await
        .unwrap();

    let result = ConfigManager::load_from_file(&path).await;
    assert!(matches!(result, Err(ConfigError::UnsupportedFormat(ext)) if ext == "yaml"));
}
