use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Endpoint used when nothing else is configured
pub const DEFAULT_ENDPOINT: &str =
    "https://qctest---api-shooting-710933064092.asia-southeast2.run.app/whatsapp/chat";

/// Placeholder sender identifier put in every webhook envelope
pub const DEFAULT_SENDER_ID: &str = "628974324943";

/// Environment variable overriding the configured endpoint
pub const ENDPOINT_ENV: &str = "SYUTING_ENDPOINT";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Assistant webhook URL
    pub endpoint: String,

    /// Sender identifier reported to the backend
    pub sender_id: String,

    /// HTTP request timeout in seconds, 0 disables it
    pub request_timeout_secs: u64,

    /// UI preferences
    pub ui: UiConfig,

    /// Application home directory (~/.syuting)
    #[serde(skip)]
    pub syuting_home: PathBuf,
}

/// UI configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Show the time next to each message header
    pub show_timestamps: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            show_timestamps: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("~"));

        Config {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            sender_id: DEFAULT_SENDER_ID.to_string(),
            request_timeout_secs: 60,
            ui: UiConfig::default(),
            syuting_home: home.join(".syuting"),
        }
    }
}

impl Config {
    /// Load ~/.syuting/config.toml, writing the defaults on first run,
    /// then apply the endpoint environment override
    pub fn load() -> Result<Self> {
        let home = dirs::home_dir().context("Could not find home directory")?;
        let syuting_home = home.join(".syuting");

        fs::create_dir_all(&syuting_home)
            .context("Failed to create .syuting directory")?;

        let mut config = Self::load_from(&syuting_home.join("config.toml"))?;
        config.syuting_home = syuting_home;
        config.apply_env_override(std::env::var(ENDPOINT_ENV).ok());

        Ok(config)
    }

    /// Load a config file, creating it with defaults when missing
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            let config: Config = toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file {}", path.display()))?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save_to(path)?;
            tracing::info!(path = %path.display(), "wrote default configuration");
            Ok(config)
        }
    }

    /// Save configuration to the given file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;
        Ok(())
    }

    /// Replace the endpoint when an override is set and non-empty
    pub fn apply_env_override(&mut self, endpoint: Option<String>) {
        if let Some(endpoint) = endpoint.filter(|e| !e.trim().is_empty()) {
            self.endpoint = endpoint.trim().to_string();
        }
    }

    pub fn config_path(&self) -> PathBuf {
        self.syuting_home.join("config.toml")
    }

    /// Where the interactive UI writes its log
    pub fn log_path(&self) -> PathBuf {
        self.syuting_home.join("syuting-chat.log")
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        match self.request_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.sender_id, "628974324943");
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(60)));
        assert!(config.ui.show_timestamps);
    }

    #[test]
    fn test_missing_file_is_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert!(path.exists());

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("endpoint"));
        assert!(!written.contains("syuting_home"));
    }

    #[test]
    fn test_partial_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "endpoint = \"http://localhost:9000/chat\"\nrequest_timeout_secs = 0\n")
            .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.endpoint, "http://localhost:9000/chat");
        assert_eq!(config.sender_id, DEFAULT_SENDER_ID);
        assert_eq!(config.request_timeout(), None);
    }

    #[test]
    fn test_invalid_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "endpoint = [").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse config file"));
    }

    #[test]
    fn test_env_override() {
        let mut config = Config::default();
        config.apply_env_override(Some("   ".to_string()));
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);

        config.apply_env_override(Some(" http://127.0.0.1:8080/hook ".to_string()));
        assert_eq!(config.endpoint, "http://127.0.0.1:8080/hook");

        config.apply_env_override(None);
        assert_eq!(config.endpoint, "http://127.0.0.1:8080/hook");
    }
}
