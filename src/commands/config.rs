//! Configuration commands.
//!
//! - `config show`: Display the effective configuration
//! - `config get`: Print one value
//! - `config set`: Validate and store one value

use owo_colors::OwoColorize;
use serde_json::json;

use super::CommandOutput;
use crate::cli::OutputOptions;
use crate::config::{Config, mask_secret};
use crate::error::{BidwavesError, Result};

/// Show current configuration
pub fn cmd_config_show(output: OutputOptions) -> Result<()> {
    let config = Config::load()?;
    let token_configured = config.token().is_some();
    let timeout = config.request_timeout().map(|t| t.as_secs());

    let json_output = json!({
        "api": {
            "base_url": config.base_url(),
        },
        "auth": {
            "token_configured": token_configured,
        },
        "list": {
            "page_size": config.page_size(),
            "debounce_ms": config.list.debounce_ms,
            "notify_errors": config.notify_errors(),
        },
        "session": {
            "reload_delay_ms": config.session.reload_delay_ms,
        },
        "request_timeout": timeout,
        "config_file": Config::config_path().to_string_lossy(),
    });

    let token_status = if token_configured {
        "configured".green().to_string()
    } else {
        "not configured".dimmed().to_string()
    };
    let timeout_text = match timeout {
        Some(secs) => format!("{secs}s"),
        None => "none".dimmed().to_string(),
    };

    let mut text = String::new();
    text.push_str(&format!("{}\n\n", "Configuration:".cyan().bold()));
    text.push_str(&format!("{}:\n", "api".cyan()));
    text.push_str(&format!("  base_url: {}\n\n", config.base_url()));
    text.push_str(&format!("{}:\n", "auth".cyan()));
    text.push_str(&format!("  token: {token_status}\n\n"));
    text.push_str(&format!("{}:\n", "list".cyan()));
    text.push_str(&format!("  page_size: {}\n", config.page_size()));
    text.push_str(&format!("  debounce_ms: {}\n", config.list.debounce_ms));
    text.push_str(&format!("  notify_errors: {}\n\n", config.notify_errors()));
    text.push_str(&format!("{}:\n", "session".cyan()));
    text.push_str(&format!(
        "  reload_delay_ms: {}\n\n",
        config.session.reload_delay_ms
    ));
    text.push_str(&format!("{}: {timeout_text}\n\n", "request_timeout".cyan()));
    text.push_str(&format!(
        "{}",
        format!("Config file: {}", Config::config_path().display()).dimmed()
    ));

    CommandOutput::new(json_output).with_text(text).print(output)
}

/// Get a specific configuration value
pub fn cmd_config_get(key: &str, output: OutputOptions) -> Result<()> {
    let config = Config::load()?;

    // Environment overrides win over the file for these two.
    let value = match key {
        "api.base_url" => Some(config.base_url()),
        "auth.token" => config.token().as_deref().map(mask_secret),
        _ => config.get(key)?,
    };
    let Some(value) = value else {
        return Err(BidwavesError::Config(format!("{key} not set")));
    };

    let masked = key == "auth.token";
    CommandOutput::new(json!({
        "key": key,
        "value": value,
        "masked": masked,
    }))
    .with_text(value)
    .print(output)
}

/// Set a configuration value
pub fn cmd_config_set(key: &str, value: &str, output: OutputOptions) -> Result<()> {
    let mut config = Config::load()?;
    config.set(key, value)?;
    config.save()?;
    tracing::info!(key, "config updated");

    let shown = if key == "auth.token" {
        mask_secret(value)
    } else {
        value.to_string()
    };

    CommandOutput::new(json!({
        "action": "config_set",
        "key": key,
        "value": shown,
        "success": true,
    }))
    .with_text(format!("Set {} to {}", key.cyan(), shown))
    .print(output)
}
