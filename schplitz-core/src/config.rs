//! Configuration management
//!
//! `settings.json` in the data directory:
//! ```json
//! {
//!   "share": { "baseUrl": "https://schplitz.app/", "maxUrlLength": 8000 },
//!   "rates": { "url": "https://api.frankfurter.app/latest?from=EUR", "timeoutSecs": 5 }
//! }
//! ```
//! Fields this crate does not know about are kept on save.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::adapters::frankfurter::{DEFAULT_TIMEOUT_SECS, FRANKFURTER_URL};
use crate::services::exchange::{DEFAULT_MAX_URL_LENGTH, DEFAULT_SHARE_BASE_URL};

/// Settings file name inside the data directory
pub const SETTINGS_FILENAME: &str = "settings.json";

/// Env var that disables the live rate fetch
pub const OFFLINE_ENV: &str = "SCHPLITZ_OFFLINE";

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    share: ShareSettings,
    #[serde(default)]
    rates: RateSettings,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ShareSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    max_url_length: Option<usize>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RateSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timeout_secs: Option<u64>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

/// Schplitz configuration (resolved view of settings)
#[derive(Debug, Clone)]
pub struct Config {
    pub share_base_url: String,
    pub max_url_length: usize,
    pub rates_url: String,
    pub rates_timeout_secs: u64,
    /// Skip the live rate fetch; set from `SCHPLITZ_OFFLINE`, never saved
    pub offline: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            share_base_url: DEFAULT_SHARE_BASE_URL.to_string(),
            max_url_length: DEFAULT_MAX_URL_LENGTH,
            rates_url: FRANKFURTER_URL.to_string(),
            rates_timeout_secs: DEFAULT_TIMEOUT_SECS,
            offline: false,
        }
    }
}

fn read_settings(path: &Path) -> Result<SettingsFile> {
    if !path.exists() {
        return Ok(SettingsFile::default());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    // A broken file falls back to defaults rather than blocking the app
    Ok(serde_json::from_str(&content).unwrap_or_default())
}

fn env_flag(name: &str) -> Option<bool> {
    match std::env::var(name).ok().as_deref() {
        Some("true" | "1" | "yes" | "TRUE" | "YES") => Some(true),
        Some("false" | "0" | "no" | "FALSE" | "NO") => Some(false),
        _ => None,
    }
}

impl Config {
    /// Load config from the data directory.
    ///
    /// Offline mode comes from the `SCHPLITZ_OFFLINE` environment variable.
    pub fn load(dir: &Path) -> Result<Self> {
        let raw = read_settings(&dir.join(SETTINGS_FILENAME))?;
        let defaults = Self::default();

        Ok(Self {
            share_base_url: raw.share.base_url.unwrap_or(defaults.share_base_url),
            max_url_length: raw
                .share
                .max_url_length
                .filter(|n| *n > 0)
                .unwrap_or(defaults.max_url_length),
            rates_url: raw.rates.url.unwrap_or(defaults.rates_url),
            rates_timeout_secs: raw
                .rates
                .timeout_secs
                .filter(|n| *n > 0)
                .unwrap_or(defaults.rates_timeout_secs),
            offline: env_flag(OFFLINE_ENV).unwrap_or(false),
        })
    }

    /// Save config to the data directory, keeping fields we don't manage
    pub fn save(&self, dir: &Path) -> Result<()> {
        let path = dir.join(SETTINGS_FILENAME);
        let mut settings = read_settings(&path)?;

        settings.share.base_url = Some(self.share_base_url.clone());
        settings.share.max_url_length = Some(self.max_url_length);
        settings.rates.url = Some(self.rates_url.clone());
        settings.rates.timeout_secs = Some(self.rates_timeout_secs);

        std::fs::create_dir_all(dir)?;
        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_without_file() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.share_base_url, "https://schplitz.app/");
        assert_eq!(config.max_url_length, 8000);
        assert_eq!(config.rates_url, FRANKFURTER_URL);
        assert_eq!(config.rates_timeout_secs, 5);
    }

    #[test]
    fn test_reads_camel_case_fields() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(SETTINGS_FILENAME),
            r#"{"share":{"baseUrl":"https://example.org/s","maxUrlLength":2000},"rates":{"timeoutSecs":2}}"#,
        )
        .unwrap();

        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.share_base_url, "https://example.org/s");
        assert_eq!(config.max_url_length, 2000);
        assert_eq!(config.rates_timeout_secs, 2);
        assert_eq!(config.rates_url, FRANKFURTER_URL);
    }

    #[test]
    fn test_save_preserves_unknown_fields() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(SETTINGS_FILENAME);
        std::fs::write(&path, r#"{"theme":"dark","share":{"copyOnExport":true}}"#).unwrap();

        let mut config = Config::load(dir.path()).unwrap();
        config.max_url_length = 4000;
        config.save(dir.path()).unwrap();

        let saved: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved["theme"], "dark");
        assert_eq!(saved["share"]["copyOnExport"], true);
        assert_eq!(saved["share"]["maxUrlLength"], 4000);
    }

    #[test]
    fn test_saved_share_url_is_used_for_exports() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::load(dir.path()).unwrap();
        config.share_base_url = "https://split.example.org/app".to_string();
        config.save(dir.path()).unwrap();

        let reloaded = Config::load(dir.path()).unwrap();
        assert_eq!(reloaded.share_base_url, "https://split.example.org/app");
        assert_eq!(reloaded.max_url_length, DEFAULT_MAX_URL_LENGTH);
    }

    #[test]
    fn test_corrupt_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(SETTINGS_FILENAME), "{not json").unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.max_url_length, DEFAULT_MAX_URL_LENGTH);
    }
}
