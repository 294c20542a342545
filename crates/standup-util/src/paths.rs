//! Default paths for standupd components
//!
//! Paths are user-writable by default (no root required):
//! - Socket: `$XDG_RUNTIME_DIR/standupd/standupd.sock` or `/tmp/standupd-$USER/standupd.sock`
//! - Data: `$XDG_DATA_HOME/standupd` or `~/.local/share/standupd`
//! - Config: `$XDG_CONFIG_HOME/standup/config.toml` or `~/.config/standup/config.toml`

use std::path::PathBuf;

/// Environment variable for overriding the socket path
pub const STANDUP_SOCKET_ENV: &str = "STANDUP_SOCKET";

/// Socket filename within the socket directory
const SOCKET_FILENAME: &str = "standupd.sock";

/// Application subdirectory name for runtime and data files
const APP_DIR: &str = "standupd";

/// Application subdirectory name for user configuration
const CONFIG_APP_DIR: &str = "standup";

/// Get the default socket path.
///
/// Order of precedence:
/// 1. `$STANDUP_SOCKET` environment variable (if set)
/// 2. `$XDG_RUNTIME_DIR/standupd/standupd.sock` (if XDG_RUNTIME_DIR is set)
/// 3. `/tmp/standupd-$USER/standupd.sock` (fallback)
pub fn default_socket_path() -> PathBuf {
    if let Ok(path) = std::env::var(STANDUP_SOCKET_ENV) {
        return PathBuf::from(path);
    }

    socket_path_without_env()
}

/// Get the socket path without checking STANDUP_SOCKET env var.
/// Used for default values in configs where the env var is checked separately.
pub fn socket_path_without_env() -> PathBuf {
    if let Ok(runtime_dir) = std::env::var("XDG_RUNTIME_DIR") {
        return PathBuf::from(runtime_dir).join(APP_DIR).join(SOCKET_FILENAME);
    }

    let username = std::env::var("USER").unwrap_or_else(|_| "unknown".to_string());
    PathBuf::from(format!("/tmp/{}-{}", APP_DIR, username)).join(SOCKET_FILENAME)
}

/// Get the data directory without checking STANDUP_DATA_DIR env var.
///
/// Order of precedence:
/// 1. `$XDG_DATA_HOME/standupd` (if XDG_DATA_HOME is set)
/// 2. `~/.local/share/standupd` (fallback)
///
/// The daemon's `--data-dir` flag reads STANDUP_DATA_DIR itself.
pub fn data_dir_without_env() -> PathBuf {
    if let Ok(data_home) = std::env::var("XDG_DATA_HOME") {
        return PathBuf::from(data_home).join(APP_DIR);
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home)
            .join(".local")
            .join("share")
            .join(APP_DIR);
    }

    PathBuf::from("/tmp").join(APP_DIR).join("data")
}

/// Get the default configuration file path.
///
/// Order of precedence:
/// 1. `$XDG_CONFIG_HOME/standup/config.toml` (if XDG_CONFIG_HOME is set)
/// 2. `~/.config/standup/config.toml` (fallback)
pub fn default_config_path() -> PathBuf {
    if let Ok(config_home) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(config_home)
            .join(CONFIG_APP_DIR)
            .join("config.toml");
    }

    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home)
            .join(".config")
            .join(CONFIG_APP_DIR)
            .join("config.toml");
    }

    PathBuf::from("/etc").join(CONFIG_APP_DIR).join("config.toml")
}
