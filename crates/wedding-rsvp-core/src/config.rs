//! Application configuration management.
//!
//! The configuration holds the backend project URL and anon key, the last
//! host email used to sign in, and a few client tunables. It is stored at
//! `~/.config/wedding-rsvp/config.json`; `SUPABASE_URL` and
//! `SUPABASE_ANON_KEY` in the environment take precedence over the file.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "wedding-rsvp";

/// Config file name
const CONFIG_FILE: &str = "config.json";

pub const ENV_BACKEND_URL: &str = "SUPABASE_URL";
pub const ENV_ANON_KEY: &str = "SUPABASE_ANON_KEY";

/// Trailing-edge wait before a guest search is sent.
pub const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 300;

fn default_debounce() -> u64 {
    DEFAULT_SEARCH_DEBOUNCE_MS
}

fn default_title() -> String {
    "Nuestra boda".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend_url: Option<String>,
    #[serde(default)]
    pub anon_key: Option<String>,
    #[serde(default)]
    pub last_host_email: Option<String>,
    #[serde(default = "default_debounce")]
    pub search_debounce_ms: u64,
    #[serde(default = "default_title")]
    pub event_title: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: None,
            anon_key: None,
            last_host_email: None,
            search_debounce_ms: DEFAULT_SEARCH_DEBOUNCE_MS,
            event_title: default_title(),
        }
    }
}

impl Config {
    /// Load the config file and apply environment overrides.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            serde_json::from_str(&contents)?
        } else {
            Self::default()
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(ENV_BACKEND_URL).filter(|v| !v.trim().is_empty()) {
            self.backend_url = Some(url);
        }
        if let Some(key) = lookup(ENV_ANON_KEY).filter(|v| !v.trim().is_empty()) {
            self.anon_key = Some(key);
        }
    }

    /// Backend URL and anon key, when both are set.
    pub fn backend(&self) -> Option<(&str, &str)> {
        match (self.backend_url.as_deref(), self.anon_key.as_deref()) {
            (Some(url), Some(key)) => Some((url, key)),
            _ => None,
        }
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory for the session file and logs
    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_take_defaults() {
        let config: Config = serde_json::from_str(r#"{"last_host_email":"novios@example.com"}"#)
            .expect("parse partial config");
        assert_eq!(config.search_debounce_ms, DEFAULT_SEARCH_DEBOUNCE_MS);
        assert_eq!(config.event_title, "Nuestra boda");
        assert!(config.backend().is_none());
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut config = Config {
            backend_url: Some("https://old.supabase.co".to_string()),
            ..Default::default()
        };
        config.apply_env(|key| match key {
            ENV_BACKEND_URL => Some("https://new.supabase.co".to_string()),
            ENV_ANON_KEY => Some("anon".to_string()),
            _ => None,
        });
        assert_eq!(config.backend(), Some(("https://new.supabase.co", "anon")));
    }

    #[test]
    fn test_blank_env_is_ignored() {
        let mut config = Config {
            anon_key: Some("file-key".to_string()),
            ..Default::default()
        };
        config.apply_env(|_| Some("  ".to_string()));
        assert_eq!(config.anon_key.as_deref(), Some("file-key"));
    }
}
