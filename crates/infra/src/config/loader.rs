//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If `CARCARE_BACKEND_URL` is absent, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `CARCARE_BACKEND_URL`: Backend API base URL (required)
//! - `CARCARE_API_TOKEN`: Bearer token sent to the backend
//! - `CARCARE_CALLBACK_ADDR`: Bind address of the callback server
//! - `CARCARE_PUBLIC_ORIGIN`: Origin the consent screen redirects to
//! - `CARCARE_TIME_ZONE`: IANA time zone for calendar events
//! - `CARCARE_HANDSHAKE_TIMEOUT`: Authorization timeout in seconds
//! - `CARCARE_POPUP_COMMAND`: Whitespace separated popup command
//! - `CARCARE_LOG_JSON`: Emit JSON logs (true/false)
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.json` or `./config.toml` (current working directory)
//! 2. `./carcare.json` or `./carcare.toml` (current working directory)
//! 3. `../config.json` or `../config.toml` (parent directory)
//! 4. `../../config.json` or `../../config.toml` (grandparent directory)
//! 5. Relative to executable location

use std::path::{Path, PathBuf};
use std::str::FromStr;

use carcare_domain::{CarCareError, Config, Result};

/// Load configuration with automatic fallback strategy
///
/// # Errors
/// Returns `CarCareError::Config` if configuration cannot be loaded from
/// either source or a file is malformed.
pub fn load() -> Result<Config> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// Only `CARCARE_BACKEND_URL` is required; everything else keeps its
/// default when unset.
pub fn load_from_env() -> Result<Config> {
    let mut config = Config::default();
    config.backend.base_url = env_var("CARCARE_BACKEND_URL")?;
    config.backend.api_token = env_opt("CARCARE_API_TOKEN");

    if let Some(addr) = env_opt("CARCARE_CALLBACK_ADDR") {
        config.callback.bind_addr = addr;
    }
    config.callback.public_origin = env_opt("CARCARE_PUBLIC_ORIGIN");

    if let Some(tz) = env_opt("CARCARE_TIME_ZONE") {
        config.calendar.time_zone = tz;
    }
    if let Some(timeout) = env_parse::<u64>("CARCARE_HANDSHAKE_TIMEOUT", "handshake timeout")? {
        config.handshake.timeout_seconds = timeout;
    }
    if let Some(command) = env_opt("CARCARE_POPUP_COMMAND") {
        config.popup.command = command.split_whitespace().map(str::to_string).collect();
    }
    config.logging.json = env_bool("CARCARE_LOG_JSON", config.logging.json);

    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(CarCareError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            CarCareError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| CarCareError::Config(format!("Failed to read config file: {}", e)))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content, format chosen by extension.
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| CarCareError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| CarCareError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(CarCareError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Probe multiple paths for configuration files
///
/// Returns the first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        candidates.extend(candidates_in(&cwd));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.extend(candidates_in(exe_dir));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

fn candidates_in(dir: &Path) -> Vec<PathBuf> {
    vec![
        dir.join("config.json"),
        dir.join("config.toml"),
        dir.join("carcare.json"),
        dir.join("carcare.toml"),
        dir.join("../config.json"),
        dir.join("../config.toml"),
        dir.join("../../config.json"),
        dir.join("../../config.toml"),
    ]
}

/// Get required environment variable
fn env_var(key: &str) -> Result<String> {
    env_opt(key).ok_or_else(|| {
        CarCareError::Config(format!("Missing required environment variable: {}", key))
    })
}

/// Optional variable; blank counts as unset.
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn env_parse<T>(key: &str, what: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_opt(key)
        .map(|raw| {
            raw.parse::<T>().map_err(|e| CarCareError::Config(format!("Invalid {what}: {e}")))
        })
        .transpose()
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Mutex;

    use once_cell::sync::Lazy;
    use tempfile::NamedTempFile;

    use super::*;

    static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

    const ALL_VARS: [&str; 8] = [
        "CARCARE_BACKEND_URL",
        "CARCARE_API_TOKEN",
        "CARCARE_CALLBACK_ADDR",
        "CARCARE_PUBLIC_ORIGIN",
        "CARCARE_TIME_ZONE",
        "CARCARE_HANDSHAKE_TIMEOUT",
        "CARCARE_POPUP_COMMAND",
        "CARCARE_LOG_JSON",
    ];

    fn clear_env() {
        for key in ALL_VARS {
            std::env::remove_var(key);
        }
    }

    #[test]
    fn test_env_bool_parsing() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");

        let cases = [("1", true), ("YES", true), ("on", true), ("0", false), ("off", false)];
        for (value, expected) in cases {
            std::env::set_var("CARCARE_TEST_BOOL", value);
            assert_eq!(env_bool("CARCARE_TEST_BOOL", !expected), expected, "value {value}");
        }

        std::env::remove_var("CARCARE_TEST_BOOL");
        assert!(env_bool("CARCARE_TEST_BOOL", true));
        assert!(!env_bool("CARCARE_TEST_BOOL", false));
    }

    #[test]
    fn test_load_from_env_all_vars_set() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        std::env::set_var("CARCARE_BACKEND_URL", "https://api.example.com/api/v1");
        std::env::set_var("CARCARE_API_TOKEN", "secret-token");
        std::env::set_var("CARCARE_CALLBACK_ADDR", "127.0.0.1:4000");
        std::env::set_var("CARCARE_PUBLIC_ORIGIN", "http://localhost:3000");
        std::env::set_var("CARCARE_TIME_ZONE", "Europe/Berlin");
        std::env::set_var("CARCARE_HANDSHAKE_TIMEOUT", "120");
        std::env::set_var("CARCARE_POPUP_COMMAND", "firefox --new-window {url}");
        std::env::set_var("CARCARE_LOG_JSON", "true");

        let config = load_from_env().unwrap();
        clear_env();

        assert_eq!(config.backend.base_url, "https://api.example.com/api/v1");
        assert_eq!(config.backend.api_token.as_deref(), Some("secret-token"));
        assert_eq!(config.callback.bind_addr, "127.0.0.1:4000");
        assert_eq!(config.callback.public_origin.as_deref(), Some("http://localhost:3000"));
        assert_eq!(config.calendar.time_zone, "Europe/Berlin");
        assert_eq!(config.handshake.timeout_seconds, 120);
        assert_eq!(config.popup.command, vec!["firefox", "--new-window", "{url}"]);
        assert!(config.logging.json);
    }

    #[test]
    fn test_load_from_env_only_backend_url() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();
        std::env::set_var("CARCARE_BACKEND_URL", "http://localhost:5000/api/v1");

        let config = load_from_env().unwrap();
        clear_env();

        assert_eq!(config.backend.api_token, None);
        assert_eq!(config.handshake.timeout_seconds, 300);
        assert_eq!(config.calendar.time_zone, "UTC");
    }

    #[test]
    fn test_load_from_env_missing_var() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();

        let err = load_from_env().unwrap_err();
        assert!(matches!(err, CarCareError::Config(msg) if msg.contains("CARCARE_BACKEND_URL")));
    }

    #[test]
    fn test_load_from_env_invalid_number() {
        let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
        clear_env();
        std::env::set_var("CARCARE_BACKEND_URL", "http://localhost:5000/api/v1");
        std::env::set_var("CARCARE_HANDSHAKE_TIMEOUT", "five minutes");

        let result = load_from_env();
        clear_env();

        assert!(matches!(result, Err(CarCareError::Config(_))));
    }

    #[test]
    fn test_load_from_file_toml() {
        let toml_content = r#"
[backend]
base_url = "https://api.example.com/api/v1"
api_token = "from-file"

[calendar]
time_zone = "America/New_York"

[popup]
command = ["chromium", "--app={url}"]
track_process = true
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();
        let path = temp_file.path().with_extension("toml");
        std::fs::copy(temp_file.path(), &path).unwrap();

        let config = load_from_file(Some(path.clone())).unwrap();
        std::fs::remove_file(path).ok();

        assert_eq!(config.backend.api_token.as_deref(), Some("from-file"));
        assert_eq!(config.calendar.time_zone, "America/New_York");
        assert!(config.popup.track_process);
        assert_eq!(config.handshake.popup_poll_interval_ms, 500);
    }

    #[test]
    fn test_load_from_file_not_found() {
        let result = load_from_file(Some(PathBuf::from("/nonexistent/config.json")));
        assert!(matches!(result, Err(CarCareError::Config(_))));
    }

    #[test]
    fn test_parse_config_unsupported_extension() {
        let result = parse_config("backend: {}", Path::new("config.yaml"));
        assert!(matches!(result, Err(CarCareError::Config(msg)) if msg.contains("yaml")));
    }
}
