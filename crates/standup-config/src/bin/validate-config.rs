//! Config validation CLI tool
//!
//! Validates a standupd configuration file and reports any errors.

use standup_config::{CURRENT_CONFIG_VERSION, ConfigError};
use standup_util::default_config_path;
use std::path::PathBuf;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    let config_path = match args.get(1) {
        Some(path) => PathBuf::from(path),
        None => {
            let default_path = default_config_path();
            eprintln!("Usage: validate-config [config-file]");
            eprintln!();
            eprintln!("Validates a standupd configuration file.");
            eprintln!();
            eprintln!("Default location: {}", default_path.display());
            return ExitCode::from(2);
        }
    };

    if !config_path.exists() {
        eprintln!("Error: Configuration file not found: {}", config_path.display());
        return ExitCode::from(1);
    }

    match standup_config::load_config(&config_path) {
        Ok(settings) => {
            let reminder = &settings.reminder;
            println!("✓ Configuration is valid");
            println!();
            println!("Summary:");
            println!("  Config version:   {}", CURRENT_CONFIG_VERSION);
            println!("  Interval:         {} min", reminder.interval_minutes);
            println!("  Starts active:    {}", reminder.active);
            println!("  Snooze:           {} min", reminder.snooze.as_secs() / 60);
            println!("  Week starts on:   {}", reminder.week_start);
            println!("  Socket:           {}", settings.service.socket_path.display());
            println!("  Data directory:   {}", settings.service.data_dir.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("✗ Configuration validation failed");
            eprintln!();
            match &e {
                ConfigError::ReadError(io_err) => {
                    eprintln!("Failed to read file: {}", io_err);
                }
                ConfigError::ParseError(parse_err) => {
                    eprintln!("TOML parse error:");
                    eprintln!("  {}", parse_err);
                }
                ConfigError::ValidationFailed { errors } => {
                    eprintln!("Validation errors ({}):", errors.len());
                    for err in errors {
                        eprintln!("  - {}", err);
                    }
                }
                ConfigError::UnsupportedVersion(ver) => {
                    eprintln!(
                        "Unsupported config version: {} (expected {})",
                        ver, CURRENT_CONFIG_VERSION
                    );
                }
            }
            ExitCode::from(1)
        }
    }
}
