use super::{apply_config, load_config_file, types::DurationValue};
use clap::{CommandFactory, FromArgMatches};
use std::time::Duration;
use tempfile::tempdir;

use crate::args::{OutputFormat, TesterArgs};
use crate::error::{AppError, ConfigError};

fn parse_with_matches(argv: &[&str]) -> Result<(TesterArgs, clap::ArgMatches), String> {
    let matches = TesterArgs::command()
        .try_get_matches_from(argv.iter().copied())
        .map_err(|err| format!("parse failed: {}", err))?;
    let args = TesterArgs::from_arg_matches(&matches)
        .map_err(|err| format!("from_arg_matches failed: {}", err))?;
    Ok((args, matches))
}

#[test]
fn parse_toml_config() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let path = dir.path().join("webload.toml");
    let content = r#"
url = "http://localhost:3000/health"
requests = 500
concurrency = 20
timeout = "5s"
output_format = "json"
"#;
    std::fs::write(&path, content).map_err(|err| format!("write failed: {}", err))?;

    let config = load_config_file(&path).map_err(|err| err.to_string())?;
    if config.url.as_deref() != Some("http://localhost:3000/health") {
        return Err("Unexpected url".to_owned());
    }
    if config.requests != Some(500) {
        return Err("Unexpected requests".to_owned());
    }
    if config.concurrency != Some(20) {
        return Err("Unexpected concurrency".to_owned());
    }
    let timeout = match config.timeout.as_ref() {
        Some(timeout) => timeout.to_duration().map_err(|err| err.to_string())?,
        None => return Err("Expected timeout".to_owned()),
    };
    if timeout != Duration::from_secs(5) {
        return Err(format!("Unexpected timeout: {:?}", timeout));
    }
    if config.output_format != Some(OutputFormat::Json) {
        return Err("Unexpected output_format".to_owned());
    }
    Ok(())
}

#[test]
fn parse_json_config_with_numeric_timeout() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let path = dir.path().join("webload.json");
    let content = r#"{
  "url": "http://localhost:3000",
  "concurrent": 4,
  "timeout": 12
}"#;
    std::fs::write(&path, content).map_err(|err| format!("write failed: {}", err))?;

    let config = load_config_file(&path).map_err(|err| err.to_string())?;
    if config.concurrency != Some(4) {
        return Err("Expected concurrent alias to populate concurrency".to_owned());
    }
    if !matches!(config.timeout, Some(DurationValue::Seconds(12))) {
        return Err("Expected numeric timeout".to_owned());
    }
    Ok(())
}

#[test]
fn unsupported_extension_is_rejected() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let path = dir.path().join("webload.yaml");
    std::fs::write(&path, "url: x").map_err(|err| format!("write failed: {}", err))?;

    match load_config_file(&path) {
        Err(AppError::Config(ConfigError::UnsupportedExtension { ext })) if ext == "yaml" => Ok(()),
        Err(err) => Err(format!("Unexpected error: {}", err)),
        Ok(_) => Err("Expected unsupported extension error".to_owned()),
    }
}

#[test]
fn unknown_fields_are_rejected() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let path = dir.path().join("webload.toml");
    std::fs::write(&path, "rate = 10\n").map_err(|err| format!("write failed: {}", err))?;

    if !matches!(
        load_config_file(&path),
        Err(AppError::Config(ConfigError::ParseToml { .. }))
    ) {
        return Err("Expected ParseToml error".to_owned());
    }
    Ok(())
}

#[test]
fn config_fills_values_not_set_on_cli() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let path = dir.path().join("webload.toml");
    let content = r#"
url = "http://from-config"
requests = 40
concurrency = 8
timeout = "250ms"
no_progress = true
"#;
    std::fs::write(&path, content).map_err(|err| format!("write failed: {}", err))?;
    let config = load_config_file(&path).map_err(|err| err.to_string())?;

    let (mut args, matches) = parse_with_matches(&["webload", "http://from-cli", "-n", "7"])?;
    apply_config(&mut args, &matches, &config).map_err(|err| err.to_string())?;

    if args.url.as_deref() != Some("http://from-cli") {
        return Err("CLI url must win over config".to_owned());
    }
    if args.requests.get() != 7 {
        return Err("CLI requests must win over config".to_owned());
    }
    if args.concurrency.get() != 8 {
        return Err("Expected concurrency from config".to_owned());
    }
    if args.request_timeout != Duration::from_millis(250) {
        return Err("Expected timeout from config".to_owned());
    }
    if !args.no_progress {
        return Err("Expected no_progress from config".to_owned());
    }
    Ok(())
}

#[test]
fn config_zero_requests_is_rejected() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let path = dir.path().join("webload.toml");
    std::fs::write(&path, "requests = 0\n").map_err(|err| format!("write failed: {}", err))?;
    let config = load_config_file(&path).map_err(|err| err.to_string())?;

    let (mut args, matches) = parse_with_matches(&["webload", "http://localhost"])?;
    match apply_config(&mut args, &matches, &config) {
        Err(AppError::Config(ConfigError::FieldMustBePositive { field, .. }))
            if field == "requests" =>
        {
            Ok(())
        }
        Err(err) => Err(format!("Unexpected error: {}", err)),
        Ok(()) => Err("Expected zero requests to be rejected".to_owned()),
    }
}

#[test]
fn config_zero_concurrency_is_rejected() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let path = dir.path().join("webload.json");
    std::fs::write(&path, r#"{"concurrency": 0}"#).map_err(|err| format!("write failed: {}", err))?;
    let config = load_config_file(&path).map_err(|err| err.to_string())?;

    let (mut args, matches) = parse_with_matches(&["webload", "http://localhost"])?;
    match apply_config(&mut args, &matches, &config) {
        Err(AppError::Config(ConfigError::FieldMustBePositive { field, .. }))
            if field == "concurrency" =>
        {
            Ok(())
        }
        Err(err) => Err(format!("Unexpected error: {}", err)),
        Ok(()) => Err("Expected zero concurrency to be rejected".to_owned()),
    }
}
