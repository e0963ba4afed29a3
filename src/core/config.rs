//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.feedwire/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct FeedwireConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub messages: MessagesConfig,
    #[serde(default)]
    pub labels: LabelsConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ServerConfig {
    pub base_url: Option<String>,
    /// 0 disables the timeout.
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct MessagesConfig {
    pub like_failed: Option<String>,
    pub like_network: Option<String>,
    pub comment_failed: Option<String>,
    pub comment_network: Option<String>,
    pub share_prompt: Option<String>,
    pub share_failed: Option<String>,
    pub share_network: Option<String>,
    pub delete_failed: Option<String>,
    pub delete_network: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LabelsConfig {
    /// The word before `(N)` in the comment toggle label.
    pub comment_word: Option<String>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_COMMENT_WORD: &str = "留言";

/// Every user-visible string the reconciler can show.
#[derive(Debug, Clone, PartialEq)]
pub struct Messages {
    pub like_failed: String,
    pub like_network: String,
    pub comment_failed: String,
    pub comment_network: String,
    pub share_prompt: String,
    pub share_failed: String,
    pub share_network: String,
    pub delete_failed: String,
    pub delete_network: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            like_failed: "按讚失敗".to_string(),
            like_network: "網路錯誤，按讚失敗".to_string(),
            comment_failed: "留言失敗".to_string(),
            comment_network: "網路或伺服器錯誤，留言失敗".to_string(),
            share_prompt: "分享時想說些什麼？（可留空）".to_string(),
            share_failed: "分享失敗".to_string(),
            share_network: "網路錯誤，分享失敗".to_string(),
            delete_failed: "刪除失敗".to_string(),
            delete_network: "網路錯誤，刪除失敗".to_string(),
        }
    }
}

impl Messages {
    fn overlay(config: &MessagesConfig) -> Self {
        let d = Messages::default();
        let pick = |v: &Option<String>, fallback: String| v.clone().unwrap_or(fallback);
        Self {
            like_failed: pick(&config.like_failed, d.like_failed),
            like_network: pick(&config.like_network, d.like_network),
            comment_failed: pick(&config.comment_failed, d.comment_failed),
            comment_network: pick(&config.comment_network, d.comment_network),
            share_prompt: pick(&config.share_prompt, d.share_prompt),
            share_failed: pick(&config.share_failed, d.share_failed),
            share_network: pick(&config.share_network, d.share_network),
            delete_failed: pick(&config.delete_failed, d.delete_failed),
            delete_network: pick(&config.delete_network, d.delete_network),
        }
    }
}

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub base_url: String,
    pub request_timeout: Option<Duration>,
    pub messages: Messages,
    pub comment_word: String,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.feedwire/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".feedwire").join("config.toml"))
}

/// Load config from `~/.feedwire/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `FeedwireConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<FeedwireConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(FeedwireConfig::default());
        }
    };
    load_config_from(&path)
}

pub fn load_config_from(path: &Path) -> Result<FeedwireConfig, ConfigError> {
    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(path);
        return Ok(FeedwireConfig::default());
    }

    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: FeedwireConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    let default_content = r#"# Feedwire Configuration
# All settings are optional — defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [server]
# base_url = "http://localhost:5000"     # Or set FEEDWIRE_BASE_URL env var
# request_timeout_secs = 30              # 0 = wait forever; or FEEDWIRE_TIMEOUT_SECS

# [messages]
# like_failed = "按讚失敗"
# like_network = "網路錯誤，按讚失敗"
# comment_failed = "留言失敗"
# comment_network = "網路或伺服器錯誤，留言失敗"
# share_prompt = "分享時想說些什麼？（可留空）"
# share_failed = "分享失敗"
# share_network = "網路錯誤，分享失敗"
# delete_failed = "刪除失敗"
# delete_network = "網路錯誤，刪除失敗"

# [labels]
# comment_word = "留言"                  # Toggle label reads "💬 留言 (3)"
"#;

    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            warn!("Failed to create config directory: {}", e);
            return;
        }
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
pub fn resolve(config: &FeedwireConfig, cli_base_url: Option<&str>) -> ResolvedConfig {
    // Base URL: CLI → env → config → default
    let base_url = cli_base_url
        .map(|s| s.to_string())
        .or_else(|| std::env::var("FEEDWIRE_BASE_URL").ok())
        .or_else(|| config.server.base_url.clone())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    // Timeout: env → config → default
    let timeout_secs = std::env::var("FEEDWIRE_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .or(config.server.request_timeout_secs)
        .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
    let request_timeout = (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs));

    ResolvedConfig {
        base_url,
        request_timeout,
        messages: Messages::overlay(&config.messages),
        comment_word: config
            .labels
            .comment_word
            .clone()
            .unwrap_or_else(|| DEFAULT_COMMENT_WORD.to_string()),
    }
}
