use std::time::Duration;

use super::TestRunConfig;
use crate::error::ConfigError;

const TIMEOUT: Duration = Duration::from_secs(30);

#[test]
fn accepts_valid_config() -> Result<(), String> {
    let config = TestRunConfig::new("http://localhost:8080/health", 7, 3, TIMEOUT)
        .map_err(|err| err.to_string())?;
    if config.total_requests().get() != 7 || config.concurrency().get() != 3 {
        return Err("Unexpected counts".to_owned());
    }
    if config.url().as_str() != "http://localhost:8080/health" {
        return Err(format!("Unexpected url: {}", config.url()));
    }
    if config.timeout() != TIMEOUT {
        return Err("Unexpected timeout".to_owned());
    }
    Ok(())
}

#[test]
fn concurrency_above_total_is_accepted() -> Result<(), String> {
    TestRunConfig::new("https://example.com", 2, 50, TIMEOUT).map_err(|err| err.to_string())?;
    Ok(())
}

#[test]
fn zero_requests_is_config_error() -> Result<(), String> {
    match TestRunConfig::new("http://localhost", 0, 1, TIMEOUT) {
        Err(ConfigError::FieldMustBePositive { field, .. }) if field == "requests" => Ok(()),
        other => Err(format!("Unexpected result: {:?}", other)),
    }
}

#[test]
fn zero_concurrency_is_config_error() -> Result<(), String> {
    match TestRunConfig::new("http://localhost", 10, 0, TIMEOUT) {
        Err(ConfigError::FieldMustBePositive { field, .. }) if field == "concurrency" => Ok(()),
        other => Err(format!("Unexpected result: {:?}", other)),
    }
}

#[test]
fn zero_timeout_is_config_error() -> Result<(), String> {
    match TestRunConfig::new("http://localhost", 10, 1, Duration::ZERO) {
        Err(ConfigError::InvalidTimeout { .. }) => Ok(()),
        other => Err(format!("Unexpected result: {:?}", other)),
    }
}

#[test]
fn malformed_urls_are_config_errors() -> Result<(), String> {
    if !matches!(
        TestRunConfig::new("not a url", 1, 1, TIMEOUT),
        Err(ConfigError::InvalidUrl { .. })
    ) {
        return Err("Expected InvalidUrl".to_owned());
    }
    if !matches!(
        TestRunConfig::new("ftp://example.com/file", 1, 1, TIMEOUT),
        Err(ConfigError::UnsupportedScheme { .. })
    ) {
        return Err("Expected UnsupportedScheme".to_owned());
    }
    Ok(())
}
