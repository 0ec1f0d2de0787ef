use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

use storyloop::config::{BackoffConfig, Config};

/// Write `contents` to a config file inside a fresh temp dir
#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("storyloop.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

/// Valid configuration pointing at `api_base` with millisecond backoff
#[allow(dead_code)]
pub fn stub_config(api_base: &str) -> Config {
    let mut config = Config::default();
    config.session.api_base = api_base.to_string();
    config.session.auth_session = "test-session".to_string();
    config.session.gcp_token = "test-gcp".to_string();
    config.backoff = BackoffConfig {
        success_min_ms: 1,
        success_max_ms: 3,
        error_min_ms: 3,
        error_max_ms: 5,
    };
    config
}
