use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub contribution: ContributionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Backend origin; endpoint paths (`/api/...`) are appended to it
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds (default: 30)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// File holding the saved token and user profile
    #[serde(default = "default_session_path")]
    pub path: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            path: default_session_path(),
        }
    }
}

fn default_session_path() -> PathBuf {
    PathBuf::from("./data/session.json")
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContributionConfig {
    /// Static PIX key shown after a PIX contribution intent
    #[serde(default = "default_pix_key")]
    pub pix_key: String,
}

impl Default for ContributionConfig {
    fn default() -> Self {
        Self {
            pix_key: default_pix_key(),
        }
    }
}

fn default_pix_key() -> String {
    "dizimo@paroquiasantoantonio.org.br".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            info!("Loading configuration from {}", path.display());
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            Self::parse(&content)
        } else {
            info!("No config file found, using defaults");
            Ok(Config::default())
        }
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).with_context(|| "Failed to parse configuration file")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.api.base_url, "http://localhost:8080");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.session.path, PathBuf::from("./data/session.json"));
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_sections() {
        let config = Config::parse(
            r#"
            [api]
            base_url = "https://paroquia.example.org"

            [contribution]
            pix_key = "12.345.678/0001-90"
            "#,
        )
        .unwrap();

        assert_eq!(config.api.base_url, "https://paroquia.example.org");
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.contribution.pix_key, "12.345.678/0001-90");
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("paroquia.toml")).unwrap();
        assert_eq!(config.api.base_url, "http://localhost:8080");
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("paroquia.toml");
        std::fs::write(&path, "[api\nbase_url = 1").unwrap();
        assert!(Config::load(&path).is_err());
    }
}
