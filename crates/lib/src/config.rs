//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (e.g. `~/.messenger-bridge/config.json`) and environment.
//! Secrets (verify token, page access token) may come from either; the environment wins.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Gateway server settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Messenger Platform settings (tokens, send API, pacing).
    #[serde(default)]
    pub messenger: MessengerConfig,
}

/// Gateway bind and port.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfig {
    /// Port for the webhook HTTP server (default 15152).
    #[serde(default = "default_gateway_port")]
    pub port: u16,

    /// Bind address (default "127.0.0.1").
    #[serde(default = "default_gateway_bind")]
    pub bind: String,
}

fn default_gateway_port() -> u16 {
    15152
}

fn default_gateway_bind() -> String {
    "127.0.0.1".to_string()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_gateway_port(),
            bind: default_gateway_bind(),
        }
    }
}

/// What the events endpoint does with a body that is not a valid callback.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedPayloadPolicy {
    /// Log, dispatch nothing, answer 200 (the platform stops retrying).
    #[default]
    Ignore,

    /// Answer 400.
    Reject,
}

/// Messenger Platform config.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessengerConfig {
    /// Shared secret for the webhook handshake. Overridden by MESSENGER_VERIFY_TOKEN env.
    pub verify_token: Option<String>,

    /// Page access token for the send API. Overridden by MESSENGER_ACCESS_TOKEN env.
    pub access_token: Option<String>,

    /// Graph API base (default "https://graph.facebook.com/v2.6").
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Send API path appended to apiBase (default "/me/messages").
    #[serde(default = "default_send_path")]
    pub send_path: String,

    /// Pause between the typing indicator and each content message, in milliseconds.
    #[serde(default = "default_typing_delay_ms")]
    pub typing_delay_ms: u64,

    #[serde(default)]
    pub malformed_payload: MalformedPayloadPolicy,
}

fn default_api_base() -> String {
    "https://graph.facebook.com/v2.6".to_string()
}

fn default_send_path() -> String {
    "/me/messages".to_string()
}

fn default_typing_delay_ms() -> u64 {
    1000
}

impl Default for MessengerConfig {
    fn default() -> Self {
        Self {
            verify_token: None,
            access_token: None,
            api_base: default_api_base(),
            send_path: default_send_path(),
            typing_delay_ms: default_typing_delay_ms(),
            malformed_payload: MalformedPayloadPolicy::default(),
        }
    }
}

/// Settings resolved once at startup and shared by verification, dispatch, and delivery.
#[derive(Debug, Clone)]
pub struct MessengerSettings {
    pub verify_token: Option<String>,
    pub access_token: Option<String>,
    /// Full send endpoint (apiBase + sendPath).
    pub send_url: String,
    pub typing_delay: Duration,
    pub malformed_payload: MalformedPayloadPolicy,
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().and_then(|s| {
        let t = s.trim();
        if t.is_empty() {
            None
        } else {
            Some(t.to_string())
        }
    })
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Resolve the webhook verify token: env MESSENGER_VERIFY_TOKEN overrides config.
pub fn resolve_verify_token(config: &Config) -> Option<String> {
    non_empty_env("MESSENGER_VERIFY_TOKEN").or_else(|| non_empty(config.messenger.verify_token.as_ref()))
}

/// Resolve the page access token: env MESSENGER_ACCESS_TOKEN overrides config.
pub fn resolve_access_token(config: &Config) -> Option<String> {
    non_empty_env("MESSENGER_ACCESS_TOKEN").or_else(|| non_empty(config.messenger.access_token.as_ref()))
}

/// Join apiBase and sendPath without doubling or dropping the slash.
pub fn send_url(messenger: &MessengerConfig) -> String {
    let base = messenger.api_base.trim().trim_end_matches('/');
    let path = messenger.send_path.trim().trim_start_matches('/');
    format!("{}/{}", base, path)
}

/// Build the immutable settings struct from config and environment.
pub fn resolve_messenger_settings(config: &Config) -> MessengerSettings {
    MessengerSettings {
        verify_token: resolve_verify_token(config),
        access_token: resolve_access_token(config),
        send_url: send_url(&config.messenger),
        typing_delay: Duration::from_millis(config.messenger.typing_delay_ms),
        malformed_payload: config.messenger.malformed_payload,
    }
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("MESSENGER_CONFIG_PATH").map(PathBuf::from).unwrap_or_else(|_| {
        dirs::home_dir()
            .map(|h| h.join(".messenger-bridge").join("config.json"))
            .unwrap_or_else(|| PathBuf::from("config.json"))
    })
}

/// Load config from the given path, the default path, or MESSENGER_CONFIG_PATH. Missing file => default config.
/// Returns the config and the path that was used.
pub fn load_config(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    let path = path.unwrap_or_else(default_config_path);
    let config = if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        Config::default()
    } else {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        serde_json::from_str(&s)
            .with_context(|| format!("parsing config from {}", path.display()))?
    };
    Ok((config, path))
}
