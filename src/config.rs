//! Client configuration.
//!
//! Configuration is stored in `.bidwaves/config.yaml` and includes:
//! - The API base URL
//! - The bearer token
//! - List defaults (page size, search debounce, error notices)
//! - Session reload delay and request timeout

use std::env;
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{BidwavesError, Result};
use crate::list::query::{DEFAULT_PAGE_SIZE, PAGE_SIZE_OPTIONS};
use crate::paths::bidwaves_root;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";

/// Keys accepted by `config get` / `config set`.
pub const KEYS: &[&str] = &[
    "api.base_url",
    "auth.token",
    "list.page_size",
    "list.debounce_ms",
    "list.notify_errors",
    "session.reload_delay_ms",
    "request_timeout",
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default, skip_serializing_if = "ListConfig::is_default")]
    pub list: ListConfig,

    #[serde(default, skip_serializing_if = "SessionConfig::is_default")]
    pub session: SessionConfig,

    /// Request timeout in seconds. Unset means no client-side timeout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListConfig {
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    #[serde(default = "default_notify_errors")]
    pub notify_errors: bool,
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_debounce_ms() -> u64 {
    500
}

fn default_notify_errors() -> bool {
    true
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            debounce_ms: default_debounce_ms(),
            notify_errors: default_notify_errors(),
        }
    }
}

impl ListConfig {
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_reload_delay_ms")]
    pub reload_delay_ms: u64,
}

fn default_reload_delay_ms() -> u64 {
    1500
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            reload_delay_ms: default_reload_delay_ms(),
        }
    }
}

impl SessionConfig {
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

impl Config {
    /// Get the path to the config file
    pub fn config_path() -> PathBuf {
        bidwaves_root().join("config.yaml")
    }

    /// Load configuration from file, or return default if not found
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&path).map_err(|e| {
            BidwavesError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read config at {}: {}", path.display(), e),
            ))
        })?;
        let config: Config = serde_yaml_ng::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        self.validate()?;
        let path = Self::config_path();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| {
                BidwavesError::Io(std::io::Error::new(
                    e.kind(),
                    format!(
                        "Failed to create directory for config at {}: {}",
                        parent.display(),
                        e
                    ),
                ))
            })?;
        }

        let content = serde_yaml_ng::to_string(self)?;
        fs::write(&path, content).map_err(|e| {
            BidwavesError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to write config at {}: {}", path.display(), e),
            ))
        })?;

        // Owner read/write only: the file may hold a token.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = fs::Permissions::from_mode(0o600);
            fs::set_permissions(&path, permissions).map_err(|e| {
                BidwavesError::Io(std::io::Error::new(
                    e.kind(),
                    format!(
                        "Failed to set permissions on config at {}: {}",
                        path.display(),
                        e
                    ),
                ))
            })?;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.api.base_url).map_err(|e| {
            BidwavesError::Config(format!("invalid api.base_url '{}': {e}", self.api.base_url))
        })?;
        if !PAGE_SIZE_OPTIONS.contains(&self.list.page_size) {
            return Err(BidwavesError::InvalidPageSize(self.list.page_size));
        }
        Ok(())
    }

    /// API base URL from environment variable or config file
    pub fn base_url(&self) -> String {
        if let Ok(url) = env::var("BIDWAVES_API_URL")
            && !url.is_empty()
        {
            return url;
        }
        self.api.base_url.clone()
    }

    /// Bearer token from environment variable or config file
    pub fn token(&self) -> Option<String> {
        if let Ok(token) = env::var("BIDWAVES_TOKEN")
            && !token.is_empty()
        {
            return Some(token);
        }
        self.auth.token.clone().filter(|t| !t.is_empty())
    }

    pub fn page_size(&self) -> u32 {
        self.list.page_size
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.list.debounce_ms)
    }

    pub fn notify_errors(&self) -> bool {
        self.list.notify_errors
    }

    pub fn reload_delay(&self) -> Duration {
        Duration::from_millis(self.session.reload_delay_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    /// Read one key as it is stored. The token is masked.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let value = match key {
            "api.base_url" => Some(self.api.base_url.clone()),
            "auth.token" => self.auth.token.as_deref().map(mask_secret),
            "list.page_size" => Some(self.list.page_size.to_string()),
            "list.debounce_ms" => Some(self.list.debounce_ms.to_string()),
            "list.notify_errors" => Some(self.list.notify_errors.to_string()),
            "session.reload_delay_ms" => Some(self.session.reload_delay_ms.to_string()),
            "request_timeout" => self.request_timeout.map(|secs| secs.to_string()),
            _ => return Err(unknown_key(key)),
        };
        Ok(value)
    }

    /// Set one key from its string form. Nothing changes if the value is invalid.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut next = self.clone();
        match key {
            "api.base_url" => next.api.base_url = value.trim_end_matches('/').to_string(),
            "auth.token" => next.auth.token = Some(value.to_string()).filter(|t| !t.is_empty()),
            "list.page_size" => next.list.page_size = parse_value(key, value)?,
            "list.debounce_ms" => next.list.debounce_ms = parse_value(key, value)?,
            "list.notify_errors" => next.list.notify_errors = parse_value(key, value)?,
            "session.reload_delay_ms" => next.session.reload_delay_ms = parse_value(key, value)?,
            "request_timeout" => {
                next.request_timeout = match value {
                    "" | "none" => None,
                    _ => Some(parse_value(key, value)?),
                }
            }
            _ => return Err(unknown_key(key)),
        }
        next.validate()?;
        *self = next;
        Ok(())
    }
}

fn parse_value<V: std::str::FromStr>(key: &str, value: &str) -> Result<V> {
    value
        .trim()
        .parse()
        .map_err(|_| BidwavesError::Config(format!("invalid value '{value}' for {key}")))
}

fn unknown_key(key: &str) -> BidwavesError {
    BidwavesError::Config(format!(
        "unknown config key '{key}'. Valid keys: {}",
        KEYS.join(", ")
    ))
}

/// Show only the first 2 and last 2 characters.
pub fn mask_secret(value: &str) -> String {
    let char_count = value.chars().count();
    if char_count > 4 {
        let first: String = value.chars().take(2).collect();
        let last: String = value.chars().skip(char_count - 2).collect();
        format!("{first}...{last}")
    } else {
        "****".to_string()
    }
}
