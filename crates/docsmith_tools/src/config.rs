//! Tool configuration, passed to [`crate::DocumentTools`] at construction.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use docsmith_upload::HostRequest;

/// Used for both public links and uploads when nothing else is known.
pub const FALLBACK_BASE_URL: &str = "http://localhost:8080";

/// Environment variable overriding [`ToolsConfig::public_base_url`].
pub const ENV_PUBLIC_URL: &str = "WEBUI_BASE_URL";
/// Environment variable overriding [`ToolsConfig::internal_base_url`].
pub const ENV_INTERNAL_URL: &str = "DOCSMITH_INTERNAL_URL";

/// Configuration stored at `~/.docsmith/config.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Public-facing URL users open in their browser
    /// (e.g. `http://192.168.1.100:8089`). `None` means derive it from the
    /// request.
    pub public_base_url: Option<String>,

    /// Server-side address of the storage API.
    pub internal_base_url: String,

    pub upload_timeout_secs: u64,

    pub log_level: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            public_base_url: None,
            internal_base_url: FALLBACK_BASE_URL.into(),
            upload_timeout_secs: 60,
            log_level: "info".into(),
        }
    }
}

impl ToolsConfig {
    /// Returns the base config directory: `~/.docsmith/`
    pub fn base_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".docsmith"))
    }

    /// Returns the config file path: `~/.docsmith/config.json`
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::base_dir()?.join("config.json"))
    }

    /// Returns the logs directory: `~/.docsmith/logs/`
    pub fn logs_dir() -> Result<PathBuf> {
        Ok(Self::base_dir()?.join("logs"))
    }

    /// Load config from a JSON file. A missing file yields defaults; an
    /// unreadable or corrupt one is an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read config file: {}", path.display()))?;
        serde_json::from_str(&data)
            .with_context(|| format!("Corrupt config file: {}", path.display()))
    }

    /// Like [`ToolsConfig::load`], but falls back to defaults with a warning.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!("{e:#}; using defaults");
                Self::default()
            }
        }
    }

    /// Save the config to a JSON file.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Apply `WEBUI_BASE_URL` / `DOCSMITH_INTERNAL_URL` when set and non-empty.
    pub fn apply_env(self) -> Self {
        self.apply_overrides(
            std::env::var(ENV_PUBLIC_URL).ok(),
            std::env::var(ENV_INTERNAL_URL).ok(),
        )
    }

    fn apply_overrides(mut self, public: Option<String>, internal: Option<String>) -> Self {
        if let Some(url) = public.filter(|u| !u.trim().is_empty()) {
            self.public_base_url = Some(url);
        }
        if let Some(url) = internal.filter(|u| !u.trim().is_empty()) {
            self.internal_base_url = url;
        }
        self
    }

    pub fn upload_timeout(&self) -> Duration {
        Duration::from_secs(self.upload_timeout_secs)
    }

    /// URL for user-facing download links: configured override, then the
    /// request's base URL, then [`FALLBACK_BASE_URL`]. No trailing slash.
    pub fn public_base_url(&self, request: Option<&dyn HostRequest>) -> String {
        if let Some(url) = self.public_base_url.as_deref().filter(|u| !u.trim().is_empty()) {
            return url.trim_end_matches('/').to_string();
        }
        if let Some(url) = request.map(|r| r.base_url()).filter(|u| !u.trim().is_empty()) {
            return url.trim_end_matches('/').to_string();
        }
        FALLBACK_BASE_URL.to_string()
    }
}
