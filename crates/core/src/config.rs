//! Application configuration and localization templates.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Directory under the user's config directory holding `config.toml`.
pub const DEFAULT_CONFIG_DIR: &str = "servertp";

/// Contents written by [`ensure_default_config`] on first start.
pub const DEFAULT_CONFIG: &str = r#"# servertp configuration

[lang]
prefix = "[ServerTeleport] "
usage = "Usage: /servertp <from> <to> or /servertp <to>"
noserver = "The destination server does not exist."
nopermission = "You do not have permission to use this command."
player-num = "%d players"
player-name = "%s"
success = "Sending %s to %s."
notification = "You are being sent to %s."
"#;

/// Top-level configuration loaded once at startup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Localization templates.
    #[serde(default)]
    pub lang: LangConfig,
}

/// Localization templates, keyed the same way as the `[lang]` table.
///
/// Templates take printf-style placeholders; see [`crate::lang`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LangConfig {
    /// Prepended to every message.
    pub prefix: String,
    /// Wrong argument count.
    pub usage: String,
    /// Destination did not resolve to a backend.
    #[serde(rename = "noserver")]
    pub no_server: String,
    /// Source lacks the permission.
    #[serde(rename = "nopermission")]
    pub no_permission: String,
    /// Plural phrasing, takes the player count.
    #[serde(rename = "player-num")]
    pub player_num: String,
    /// Singular phrasing, takes the player name.
    #[serde(rename = "player-name")]
    pub player_name: String,
    /// Summary sent to the source, takes the phrasing and the raw destination token.
    pub success: String,
    /// Sent to each moved player, takes the destination backend name.
    pub notification: String,
}

impl Default for LangConfig {
    fn default() -> Self {
        Self {
            prefix: "[ServerTeleport] ".to_string(),
            usage: "Usage: /servertp <from> <to> or /servertp <to>".to_string(),
            no_server: "The destination server does not exist.".to_string(),
            no_permission: "You do not have permission to use this command.".to_string(),
            player_num: "%d players".to_string(),
            player_name: "%s".to_string(),
            success: "Sending %s to %s.".to_string(),
            notification: "You are being sent to %s.".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load configuration from `path`, layering `SERVERTP_*` environment overrides on top.
    ///
    /// A missing file yields the built-in defaults.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let settings = Config::builder()
            .add_source(
                File::from(path)
                    .format(FileFormat::Toml)
                    .required(false),
            )
            .add_source(
                Environment::with_prefix("SERVERTP")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .with_context(|| format!("failed to read config {}", path.display()))?;

        settings
            .try_deserialize()
            .with_context(|| format!("failed to parse config {}", path.display()))
    }
}

/// Default configuration path inside the user's config directory.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_CONFIG_DIR)
        .join("config.toml")
}

/// Write [`DEFAULT_CONFIG`] to the default path unless a file already exists.
pub fn ensure_default_config() -> Result<PathBuf> {
    let path = default_config_path();
    ensure_config_at(&path)?;
    Ok(path)
}

/// Write [`DEFAULT_CONFIG`] to `path` unless a file already exists there.
pub fn ensure_config_at(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if path.exists() {
        return Ok(());
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {}", parent.display()))?;
    }
    fs::write(path, DEFAULT_CONFIG)
        .with_context(|| format!("failed to write config {}", path.display()))?;
    info!("wrote default config to {}", path.display());
    Ok(())
}
