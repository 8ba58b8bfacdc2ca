use anyhow::{anyhow, Context, Result};
use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::PathBuf,
    sync::RwLock,
    time::Duration,
};

pub const APP_ID: &str = "dev.wknd.LatentConsole";

const SETTINGS_FILE: &str = "settings.json";
const SERVER_URL_ENV: &str = "LATENT_CONSOLE_URL";
const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:9090/api/v1";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug)]
pub struct ConfigStore {
    config_dir: PathBuf,
    settings: RwLock<ConsoleSettings>,
}

impl ConfigStore {
    pub fn new() -> Result<Self> {
        let base = BaseDirs::new()
            .ok_or_else(|| anyhow!("unable to resolve base directories for {APP_ID}"))?;
        let config_dir = base.data_local_dir().join(APP_ID).join("config");

        fs::create_dir_all(&config_dir)
            .with_context(|| format!("failed to create config directory {config_dir:?}"))?;

        let settings_path = config_dir.join(SETTINGS_FILE);
        let settings = if settings_path.exists() {
            let data = fs::read(&settings_path)
                .with_context(|| format!("failed to read settings file {settings_path:?}"))?;
            serde_json::from_slice(&data)
                .with_context(|| format!("failed to parse settings from {settings_path:?}"))?
        } else {
            ConsoleSettings::default()
        };

        Ok(Self {
            config_dir,
            settings: RwLock::new(settings),
        })
    }

    pub fn settings(&self) -> ConsoleSettings {
        self.settings
            .read()
            .expect("settings lock poisoned")
            .clone()
    }

    pub fn update_settings<F>(&self, mutate: F) -> Result<ConsoleSettings>
    where
        F: FnOnce(&mut ConsoleSettings),
    {
        let mut guard = self
            .settings
            .write()
            .expect("settings lock poisoned for write");
        mutate(&mut guard);
        let snapshot = guard.clone();
        self.persist_locked(&snapshot)?;
        Ok(snapshot)
    }

    /// Server URL used for this run: the environment override wins over
    /// the persisted setting, which wins over the built-in default.
    pub fn server_url(&self) -> String {
        let settings = self.settings();
        resolve_server_url(
            std::env::var(SERVER_URL_ENV).ok(),
            settings.server_url.as_deref(),
        )
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.settings().request_timeout_secs)
    }

    pub fn config_path(&self) -> PathBuf {
        self.config_dir.clone()
    }

    fn persist_locked(&self, settings: &ConsoleSettings) -> Result<()> {
        let path = self.config_dir.join(SETTINGS_FILE);
        let data = serde_json::to_vec_pretty(settings)?;
        fs::write(&path, data).with_context(|| format!("failed to write settings to {path:?}"))?;
        Ok(())
    }
}

fn resolve_server_url(env_override: Option<String>, setting: Option<&str>) -> String {
    env_override
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .or_else(|| setting.map(str::to_string))
        .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string())
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ConsoleSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_url: Option<String>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            server_url: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_prefers_env_then_setting_then_default() {
        assert_eq!(
            resolve_server_url(Some("http://env:9090".to_string()), Some("http://cfg:9090")),
            "http://env:9090"
        );
        assert_eq!(
            resolve_server_url(None, Some("http://cfg:9090")),
            "http://cfg:9090"
        );
        assert_eq!(resolve_server_url(None, None), DEFAULT_SERVER_URL);
    }

    #[test]
    fn blank_env_override_is_ignored() {
        assert_eq!(
            resolve_server_url(Some("   ".to_string()), Some("http://cfg:9090")),
            "http://cfg:9090"
        );
    }

    #[test]
    fn settings_parse_with_missing_fields() {
        let settings: ConsoleSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings.server_url, None);
        assert_eq!(settings.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
    }
}
