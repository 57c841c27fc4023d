//! Configuration management
//!
//! Settings live in `settings.json` inside the data directory:
//! ```json
//! {
//!   "apiDomain": "https://api.example.com",
//!   "requestTimeoutSecs": 30,
//!   "scanner": { "maxScansPerSecond": 60, "captureWidth": 1920, "captureHeight": 1080 },
//!   "notifications": { "maxVisible": 3, "autoHideMs": 6000 }
//! }
//! ```
//! Keys this crate does not manage are preserved on save.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::domain::result::{Error, Result};

/// Environment variable overriding the backend domain
pub const API_DOMAIN_ENV: &str = "RETENTION_API_DOMAIN";

const SETTINGS_FILE: &str = "settings.json";

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    api_domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    request_timeout_secs: Option<u64>,
    #[serde(default)]
    scanner: ScannerSettings,
    #[serde(default)]
    notifications: NotificationSettings,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

/// Camera/decoder tuning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScannerSettings {
    #[serde(default = "default_max_scans_per_second")]
    pub max_scans_per_second: u32,
    #[serde(default = "default_capture_width")]
    pub capture_width: u32,
    #[serde(default = "default_capture_height")]
    pub capture_height: u32,
}

fn default_max_scans_per_second() -> u32 {
    60
}

fn default_capture_width() -> u32 {
    1920
}

fn default_capture_height() -> u32 {
    1080
}

impl Default for ScannerSettings {
    fn default() -> Self {
        Self {
            max_scans_per_second: default_max_scans_per_second(),
            capture_width: default_capture_width(),
            capture_height: default_capture_height(),
        }
    }
}

/// Toast display settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSettings {
    #[serde(default = "default_max_visible")]
    pub max_visible: usize,
    #[serde(default = "default_auto_hide_ms")]
    pub auto_hide_ms: u64,
}

fn default_max_visible() -> usize {
    3
}

fn default_auto_hide_ms() -> u64 {
    6000
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            max_visible: default_max_visible(),
            auto_hide_ms: default_auto_hide_ms(),
        }
    }
}

/// Client configuration (simplified view of settings)
#[derive(Debug, Clone)]
pub struct Config {
    pub api_domain: Option<String>,
    pub request_timeout: Duration,
    pub scanner: ScannerSettings,
    pub notifications: NotificationSettings,
    _raw_settings: SettingsFile,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_domain: None,
            request_timeout: Duration::from_secs(30),
            scanner: ScannerSettings::default(),
            notifications: NotificationSettings::default(),
            _raw_settings: SettingsFile::default(),
        }
    }
}

impl Config {
    /// Load config from the data directory
    ///
    /// The API domain can come from:
    /// 1. Environment variable RETENTION_API_DOMAIN
    /// 2. Settings file
    pub fn load(data_dir: &Path) -> Result<Self> {
        let settings_path = data_dir.join(SETTINGS_FILE);

        let raw: SettingsFile = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str(&content).unwrap_or_default()
        } else {
            SettingsFile::default()
        };

        let api_domain = std::env::var(API_DOMAIN_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .or_else(|| raw.api_domain.clone());

        Ok(Self {
            api_domain,
            request_timeout: Duration::from_secs(raw.request_timeout_secs.unwrap_or(30)),
            scanner: raw.scanner.clone(),
            notifications: raw.notifications.clone(),
            _raw_settings: raw,
        })
    }

    /// Save config to the data directory
    /// Preserves other settings this crate doesn't manage
    pub fn save(&self, data_dir: &Path) -> Result<()> {
        let settings_path = data_dir.join(SETTINGS_FILE);

        let mut settings = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str::<SettingsFile>(&content).unwrap_or_default()
        } else {
            SettingsFile::default()
        };

        settings.api_domain = self.api_domain.clone();
        settings.request_timeout_secs = Some(self.request_timeout.as_secs());
        settings.scanner = self.scanner.clone();
        settings.notifications = self.notifications.clone();

        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(&settings_path, content)?;
        Ok(())
    }

    /// Set the backend domain
    pub fn set_api_domain(&mut self, domain: impl Into<String>) {
        self.api_domain = Some(domain.into());
    }

    /// Backend base URL, validated
    pub fn api_base_url(&self) -> Result<Url> {
        let domain = self.api_domain.as_deref().ok_or_else(|| {
            Error::config(format!(
                "API domain not configured. Set {} or 'apiDomain' in {}",
                API_DOMAIN_ENV, SETTINGS_FILE
            ))
        })?;

        let url = Url::parse(domain)
            .map_err(|e| Error::config(format!("Invalid API domain '{}': {}", domain, e)))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::config(format!(
                "API domain must use http or https, got '{}'",
                url.scheme()
            )));
        }

        Ok(url)
    }

    /// OAuth entry point the user is redirected to
    pub fn login_url(&self) -> Result<Url> {
        self.api_base_url()?
            .join("/auth/google")
            .map_err(|e| Error::config(format!("Invalid login URL: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_without_settings_file() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.scanner.max_scans_per_second, 60);
        assert_eq!(config.notifications.max_visible, 3);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_save_preserves_unknown_keys() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(SETTINGS_FILE),
            r#"{ "theme": "dark", "scanner": { "captureWidth": 640 } }"#,
        )
        .unwrap();

        let mut config = Config::load(dir.path()).unwrap();
        assert_eq!(config.scanner.capture_width, 640);
        assert_eq!(config.scanner.capture_height, 1080);

        config.set_api_domain("https://api.example.com");
        config.save(dir.path()).unwrap();

        let content = std::fs::read_to_string(dir.path().join(SETTINGS_FILE)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["theme"], "dark");
        assert_eq!(value["apiDomain"], "https://api.example.com");
    }

    #[test]
    fn test_set_domain_is_saved_for_next_load() {
        let dir = TempDir::new().unwrap();

        let mut config = Config::load(dir.path()).unwrap();
        config.set_api_domain("https://cashback.example.com");
        config.api_base_url().unwrap();
        config.save(dir.path()).unwrap();

        let reloaded = Config::load(dir.path()).unwrap();
        assert_eq!(
            reloaded.api_domain.as_deref(),
            Some("https://cashback.example.com")
        );
        assert_eq!(reloaded.scanner, ScannerSettings::default());
        assert_eq!(
            reloaded.login_url().unwrap().as_str(),
            "https://cashback.example.com/auth/google"
        );
    }

    #[test]
    fn test_login_url() {
        let mut config = Config::default();
        config.set_api_domain("https://api.example.com/");
        assert_eq!(
            config.login_url().unwrap().as_str(),
            "https://api.example.com/auth/google"
        );
    }

    #[test]
    fn test_missing_or_invalid_domain() {
        let mut config = Config::default();
        assert!(matches!(config.api_base_url(), Err(Error::Config(_))));

        config.set_api_domain("ftp://example.com");
        assert!(config.api_base_url().is_err());

        config.set_api_domain("not a url");
        assert!(config.api_base_url().is_err());
    }
}
