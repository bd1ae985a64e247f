//! Loading configuration and building a client from it.

use std::sync::Mutex;

use mople_infra::config::{load, load_from_file};
use mople_infra::ClientContext;
use once_cell::sync::Lazy;
use tempfile::TempDir;

static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

#[test]
fn test_environment_takes_precedence() {
    let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
    std::env::set_var("MOPLE_API_BASE_URL", "http://127.0.0.1:4010");
    std::env::set_var("MOPLE_REFRESH_HEADER", "X-Refresh-Token");

    let result = load();
    std::env::remove_var("MOPLE_API_BASE_URL");
    std::env::remove_var("MOPLE_REFRESH_HEADER");

    let config = result.unwrap();
    assert_eq!(config.api.base_url, "http://127.0.0.1:4010");
    assert_eq!(config.api.refresh_header, "X-Refresh-Token");
    assert_eq!(config.api.refresh_url(), "http://127.0.0.1:4010/auth/recreate");
}

#[test]
fn test_file_config_builds_a_client() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let prefs = dir.path().join("prefs.json");
    let config_path = dir.path().join("mople.toml");
    std::fs::write(
        &config_path,
        format!(
            "[api]\nbase_url = \"http://127.0.0.1:4010/v1/\"\nuser_agent = \"mople-test\"\n\n\
             [storage]\npath = \"{}\"\nread_timeout_ms = 500\n\n[logging]\nfilter = \"debug\"\n",
            prefs.display()
        ),
    )?;

    let config = load_from_file(Some(config_path))?;
    assert_eq!(config.storage.read_timeout_ms, 500);

    let runtime = tokio::runtime::Runtime::new()?;
    let context = ClientContext::build(config, runtime.handle().clone())?;

    assert_eq!(context.client().config().endpoint("/plans"), "http://127.0.0.1:4010/v1/plans");
    assert!(context.credentials().snapshot().is_none());
    assert!(!prefs.exists());
    Ok(())
}

#[test]
fn test_invalid_refresh_header_fails_build() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let mut config = mople_domain::Config::default();
    config.api.refresh_header = "Refresh Token".into();

    let result = ClientContext::build(config, runtime.handle().clone());

    assert!(matches!(result, Err(mople_domain::MopleError::Config(_))));
}
