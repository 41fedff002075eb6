use super::{
    apply_config, load_config_file,
    types::{ConfigFile, ControlList},
};
use crate::args::{ClusterRole, LoadArgs};
use crate::error::{AppError, AppResult};
use clap::{CommandFactory, FromArgMatches};
use std::net::SocketAddr;
use tempfile::tempdir;

fn args_with_config(cli: &[&str], config: &ConfigFile) -> AppResult<LoadArgs> {
    let matches = LoadArgs::command().try_get_matches_from(cli.iter().copied())?;
    let mut args = LoadArgs::from_arg_matches(&matches)?;
    apply_config(&mut args, &matches, config)?;
    Ok(args)
}

#[test]
fn parse_toml_config() -> AppResult<()> {
    let dir = tempdir()?;
    let path = dir.path().join("loadpool.toml");
    let content = r#"
url = "http://localhost:3000/"
workers = 4
random_fails = 3
lookback = 10
control = "10.0.0.1:9090,10.0.0.2:9090"
no_ui = true
"#;
    std::fs::write(&path, content)?;

    let config = load_config_file(&path)?;
    if config.url.as_deref() != Some("http://localhost:3000/") {
        return Err(AppError::validation("Unexpected url"));
    }
    if config.workers != Some(4) || config.random_fails != Some(3) || config.lookback != Some(10) {
        return Err(AppError::validation("Unexpected numeric fields"));
    }
    if config.control
        != Some(ControlList::Joined(
            "10.0.0.1:9090,10.0.0.2:9090".to_owned(),
        ))
    {
        return Err(AppError::validation("Unexpected control list"));
    }
    if config.no_ui != Some(true) {
        return Err(AppError::validation("Expected no_ui"));
    }
    Ok(())
}

#[test]
fn parse_json_config_with_control_entries() -> AppResult<()> {
    let dir = tempdir()?;
    let path = dir.path().join("loadpool.json");
    let content = r#"{
  "url": "http://localhost:3000/",
  "control": ["127.0.0.1:9000", "127.0.0.1:9001"],
  "delay_ms": 50
}"#;
    std::fs::write(&path, content)?;

    let config = load_config_file(&path)?;
    match config.control {
        Some(ControlList::Entries(entries)) if entries.len() == 2 => {}
        other => {
            return Err(AppError::validation(format!(
                "Unexpected control: {:?}",
                other
            )));
        }
    }
    if config.delay_ms != Some(50) {
        return Err(AppError::validation("Unexpected delay"));
    }
    Ok(())
}

#[test]
fn unknown_fields_are_rejected() -> AppResult<()> {
    let dir = tempdir()?;
    let path = dir.path().join("loadpool.toml");
    std::fs::write(&path, "url = \"http://x/\"\nthreads = 3\n")?;
    if load_config_file(&path).is_ok() {
        return Err(AppError::validation("Expected unknown field error"));
    }
    Ok(())
}

#[test]
fn unsupported_extension_is_rejected() -> AppResult<()> {
    let dir = tempdir()?;
    let path = dir.path().join("loadpool.yaml");
    std::fs::write(&path, "url: http://x/\n")?;
    if load_config_file(&path).is_ok() {
        return Err(AppError::validation("Expected extension error"));
    }
    Ok(())
}

#[test]
fn config_fills_values_missing_from_cli() -> AppResult<()> {
    let config = ConfigFile {
        url: Some("http://from-config/".to_owned()),
        workers: Some(6),
        control: Some(ControlList::Entries(vec!["127.0.0.1:7000".to_owned()])),
        ..ConfigFile::default()
    };
    let args = args_with_config(&["loadpool"], &config)?;
    if args.url.as_deref() != Some("http://from-config/") || args.workers != 6 {
        return Err(AppError::validation("Config values were not applied"));
    }
    if args.role()
        != (ClusterRole::Master {
            slaves: vec![SocketAddr::from(([127, 0, 0, 1], 7000))],
        })
    {
        return Err(AppError::validation("Expected master role from config"));
    }
    args.validate()
}

#[test]
fn cli_values_win_over_config() -> AppResult<()> {
    let config = ConfigFile {
        url: Some("http://from-config/".to_owned()),
        workers: Some(6),
        lookback: Some(30),
        ..ConfigFile::default()
    };
    let args = args_with_config(
        &["loadpool", "-u", "http://from-cli/", "--workers", "2"],
        &config,
    )?;
    if args.url.as_deref() != Some("http://from-cli/") || args.workers != 2 {
        return Err(AppError::validation("CLI values were overridden"));
    }
    if args.lookback.secs() != 30 {
        return Err(AppError::validation("Config lookback should still apply"));
    }
    Ok(())
}

#[test]
fn out_of_range_config_value_names_the_field() -> AppResult<()> {
    let config = ConfigFile {
        random_fails: Some(42),
        ..ConfigFile::default()
    };
    match args_with_config(&["loadpool", "-u", "http://x/"], &config) {
        Err(err) if err.to_string().contains("random_fails") => Ok(()),
        other => Err(AppError::validation(format!(
            "Expected a random_fails error, got {:?}",
            other.map(|args| args.random_fails)
        ))),
    }
}

#[test]
fn config_conflict_is_caught_by_validation() -> AppResult<()> {
    let config = ConfigFile {
        control: Some(ControlList::Joined("127.0.0.1:7000".to_owned())),
        ..ConfigFile::default()
    };
    let args = args_with_config(&["loadpool", "-u", "http://x/", "--listen", "9000"], &config)?;
    if args.validate().is_ok() {
        return Err(AppError::validation("Expected listen/control conflict"));
    }
    Ok(())
}
