//! Configuration management

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_CALLBACK_PATH, DEFAULT_HANDSHAKE_TIMEOUT_SECS, DEFAULT_NOTIFIER_CLOSE_DELAY_MS,
    DEFAULT_POPUP_POLL_INTERVAL_MS,
};

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub callback: CallbackConfig,
    #[serde(default)]
    pub calendar: CalendarConfig,
    #[serde(default)]
    pub handshake: HandshakeConfig,
    #[serde(default)]
    pub popup: PopupConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// REST backend configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    pub base_url: String,
    #[serde(default, skip_serializing)]
    pub api_token: Option<String>,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

/// Loopback callback server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallbackConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    #[serde(default = "default_callback_path")]
    pub path: String,
    /// Origin the third party redirects to, when it differs from the bind
    /// address (e.g. `http://localhost:3000` behind a proxy).
    #[serde(default)]
    pub public_origin: Option<String>,
}

/// Calendar event configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarConfig {
    #[serde(default = "default_time_zone")]
    pub time_zone: String,
}

/// Authorization handshake timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandshakeConfig {
    #[serde(default = "default_handshake_timeout")]
    pub timeout_seconds: u64,
    #[serde(default = "default_poll_interval")]
    pub popup_poll_interval_ms: u64,
    #[serde(default = "default_close_delay")]
    pub notifier_close_delay_ms: u64,
}

/// How the consent popup is opened
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopupConfig {
    /// Program and arguments; `{url}` is replaced by the consent URL.
    #[serde(default = "default_popup_command")]
    pub command: Vec<String>,
    /// Treat the spawned process as the popup window itself.
    #[serde(default)]
    pub track_process: bool,
}

/// Logging output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_filter")]
    pub filter: String,
    #[serde(default)]
    pub json: bool,
}

fn default_request_timeout() -> u64 {
    30
}

fn default_bind_addr() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_callback_path() -> String {
    DEFAULT_CALLBACK_PATH.to_string()
}

fn default_time_zone() -> String {
    "UTC".to_string()
}

fn default_handshake_timeout() -> u64 {
    DEFAULT_HANDSHAKE_TIMEOUT_SECS
}

fn default_poll_interval() -> u64 {
    DEFAULT_POPUP_POLL_INTERVAL_MS
}

fn default_close_delay() -> u64 {
    DEFAULT_NOTIFIER_CLOSE_DELAY_MS
}

fn default_popup_command() -> Vec<String> {
    if cfg!(target_os = "macos") {
        vec!["open".to_string(), "{url}".to_string()]
    } else if cfg!(target_os = "windows") {
        vec!["explorer".to_string(), "{url}".to_string()]
    } else {
        vec!["xdg-open".to_string(), "{url}".to_string()]
    }
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000/api/v1".to_string(),
            api_token: None,
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

impl Default for CallbackConfig {
    fn default() -> Self {
        Self { bind_addr: default_bind_addr(), path: default_callback_path(), public_origin: None }
    }
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self { time_zone: default_time_zone() }
    }
}

impl Default for HandshakeConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_handshake_timeout(),
            popup_poll_interval_ms: default_poll_interval(),
            notifier_close_delay_ms: default_close_delay(),
        }
    }
}

impl Default for PopupConfig {
    fn default() -> Self {
        Self { command: default_popup_command(), track_process: false }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { filter: default_log_filter(), json: false }
    }
}
