use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Environment variable that overrides `api.base_url`
pub const API_URL_ENV: &str = "USER_BROWSER_API_URL";

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_min_term_length")]
    pub min_term_length: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default = "default_console")]
    pub console: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min_term_length: default_min_term_length(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            console: default_console(),
        }
    }
}

// Default value functions
fn default_base_url() -> String {
    "http://localhost:8084/api".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_min_term_length() -> usize {
    3
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "console".to_string()
}

fn default_console() -> bool {
    false
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .context("Failed to parse config file")?;

        config.validate()?;

        Ok(config)
    }

    /// Load from `path` when it exists, otherwise start from defaults.
    /// The environment override is applied last in both cases.
    pub fn load_or_default(path: &Path, explicit: bool) -> Result<Self> {
        let mut config = if path.exists() || explicit {
            Self::from_file(path)?
        } else {
            Self::default()
        };

        config.apply_env_overrides(std::env::var(API_URL_ENV).ok());
        config.validate()?;

        Ok(config)
    }

    pub fn apply_env_overrides(&mut self, api_url: Option<String>) {
        if let Some(url) = api_url.filter(|url| !url.trim().is_empty()) {
            self.api.base_url = url;
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.is_empty() {
            bail!("api.base_url must not be empty");
        }

        let url = reqwest::Url::parse(&self.api.base_url)
            .context(format!("api.base_url is not a valid URL: {}", self.api.base_url))?;

        if url.cannot_be_a_base() {
            bail!("api.base_url must be a hierarchical URL: {}", self.api.base_url);
        }

        if self.api.timeout_secs == 0 {
            bail!("api.timeout_secs must be greater than 0");
        }

        if self.search.min_term_length == 0 {
            bail!("search.min_term_length must be greater than 0");
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            bail!(
                "Invalid log level '{}'. Must be one of: trace, debug, info, warn, error",
                self.logging.level
            );
        }

        let valid_formats = ["json", "console"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            bail!(
                "Invalid log format '{}'. Must be one of: json, console",
                self.logging.format
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();

        assert_eq!(config.api.base_url, "http://localhost:8084/api");
        assert_eq!(config.api.timeout(), Duration::from_secs(10));
        assert_eq!(config.search.min_term_length, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_partial_file() {
        let file = write_config(
            r#"
            [api]
            base_url = "http://backend.internal:9000/api"

            [logging]
            level = "debug"
            format = "json"
            "#,
        );

        let config = Config::from_file(file.path()).unwrap();

        assert_eq!(config.api.base_url, "http://backend.internal:9000/api");
        assert_eq!(config.api.timeout_secs, 10);
        assert_eq!(config.search.min_term_length, 3);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_missing_default_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = Config::load_or_default(&path, false).unwrap();
        assert_eq!(config.search.min_term_length, 3);
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.toml");

        assert!(Config::load_or_default(&path, true).is_err());
    }

    #[test]
    fn test_env_override_replaces_base_url() {
        let mut config = Config::default();

        config.apply_env_overrides(Some("http://example.test/api".to_string()));
        assert_eq!(config.api.base_url, "http://example.test/api");

        config.apply_env_overrides(Some("   ".to_string()));
        assert_eq!(config.api.base_url, "http://example.test/api");

        config.apply_env_overrides(None);
        assert_eq!(config.api.base_url, "http://example.test/api");
    }

    #[test]
    fn test_rejects_invalid_values() {
        let mut config = Config::default();
        config.api.timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.search.min_term_length = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.api.base_url = "not a url".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.api.base_url = "mailto:ops@example.com".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.logging.level = "verbose".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.logging.format = "xml".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unparseable_file_is_error() {
        let file = write_config("[api\nbase_url = ");
        assert!(Config::from_file(file.path()).is_err());
    }
}
