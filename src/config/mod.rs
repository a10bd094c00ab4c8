#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::CliConfig;

use crate::core::ConfigProvider;
use crate::utils::error::{CareMatchError, Result};
use crate::utils::validation::{self, Validate};
use std::collections::BTreeMap;
use std::time::Duration;
use toml_config::{TomlConfig, DEFAULT_API_BASE_URL, DEFAULT_API_PREFIX, DEFAULT_TIMEOUT_SECONDS};

pub const ENV_API_BASE_URL: &str = "CARE_MATCH_API_BASE_URL";
pub const ENV_API_TIMEOUT: &str = "CARE_MATCH_API_TIMEOUT";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

/// 命令列帶入、優先權最高的設定
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    pub config_path: Option<String>,
    pub api_base_url: Option<String>,
    pub timeout_seconds: Option<u64>,
    pub verbose: bool,
    pub json_logs: bool,
}

/// 合併後的用戶端設定：CLI > 環境變數 > TOML > 預設值
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub api_base_url: String,
    pub api_prefix: String,
    pub timeout_seconds: u64,
    pub headers: BTreeMap<String, String>,
    pub verbose: bool,
    pub log_format: LogFormat,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            headers: BTreeMap::new(),
            verbose: false,
            log_format: LogFormat::Compact,
        }
    }
}

impl ClientSettings {
    /// 載入 .env、TOML 檔與環境變數後套用命令列覆蓋
    pub fn load(overrides: &SettingsOverrides) -> Result<Self> {
        dotenvy::dotenv().ok();

        let toml = match &overrides.config_path {
            Some(path) => Some(TomlConfig::from_file(path)?),
            None => None,
        };

        let env = |key: &str| std::env::var(key).ok().filter(|v| !v.trim().is_empty());
        Self::resolve(overrides, toml, env)
    }

    pub fn resolve<F>(overrides: &SettingsOverrides, toml: Option<TomlConfig>, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let toml = toml.unwrap_or_default();
        toml.validate()?;

        let env_timeout = match env(ENV_API_TIMEOUT) {
            Some(raw) => Some(raw.trim().parse::<u64>().map_err(|_| {
                CareMatchError::InvalidConfigValueError {
                    field: ENV_API_TIMEOUT.to_string(),
                    value: raw.clone(),
                    reason: "Value must be a whole number of seconds".to_string(),
                }
            })?),
            None => None,
        };

        let defaults = Self::default();
        let log_format = if overrides.json_logs || toml.log_format() == "json" {
            LogFormat::Json
        } else {
            LogFormat::Compact
        };

        let settings = Self {
            api_base_url: overrides
                .api_base_url
                .clone()
                .or_else(|| env(ENV_API_BASE_URL))
                .or(toml.api.base_url)
                .unwrap_or(defaults.api_base_url),
            api_prefix: toml.api.prefix.unwrap_or(defaults.api_prefix),
            timeout_seconds: overrides
                .timeout_seconds
                .or(env_timeout)
                .or(toml.api.timeout_seconds)
                .unwrap_or(defaults.timeout_seconds),
            headers: toml.api.headers,
            verbose: overrides.verbose || toml.logging.verbose.unwrap_or(false),
            log_format,
        };

        settings.validate()?;
        Ok(settings)
    }
}

impl Validate for ClientSettings {
    fn validate(&self) -> Result<()> {
        validation::validate_url("api_base_url", &self.api_base_url)?;
        validation::validate_path_prefix("api_prefix", &self.api_prefix)?;
        validation::validate_range("timeout_seconds", self.timeout_seconds, 1, 300)?;
        Ok(())
    }
}

impl ConfigProvider for ClientSettings {
    fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    fn api_prefix(&self) -> &str {
        &self.api_prefix
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    fn extra_headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_defaults_without_any_source() {
        let settings = ClientSettings::resolve(&SettingsOverrides::default(), None, no_env).unwrap();
        assert_eq!(settings.api_base_url, "http://localhost:8000");
        assert_eq!(settings.api_prefix, "/api/v1");
        assert_eq!(settings.request_timeout(), Duration::from_secs(30));
        assert_eq!(settings.log_format, LogFormat::Compact);
    }

    #[test]
    fn test_precedence_cli_over_env_over_toml() {
        let toml = TomlConfig::from_toml_str(
            "[api]\nbase_url = \"http://toml:8000\"\ntimeout_seconds = 20\n",
        )
        .unwrap();
        let env = |key: &str| match key {
            ENV_API_BASE_URL => Some("http://env:8000".to_string()),
            _ => None,
        };

        let settings =
            ClientSettings::resolve(&SettingsOverrides::default(), Some(toml.clone()), env).unwrap();
        assert_eq!(settings.api_base_url, "http://env:8000");
        assert_eq!(settings.timeout_seconds, 20);

        let overrides = SettingsOverrides {
            api_base_url: Some("http://cli:8000".to_string()),
            timeout_seconds: Some(5),
            ..SettingsOverrides::default()
        };
        let settings = ClientSettings::resolve(&overrides, Some(toml), env).unwrap();
        assert_eq!(settings.api_base_url, "http://cli:8000");
        assert_eq!(settings.timeout_seconds, 5);
    }

    #[test]
    fn test_invalid_env_timeout_is_rejected() {
        let env = |key: &str| match key {
            ENV_API_TIMEOUT => Some("soon".to_string()),
            _ => None,
        };
        let err = ClientSettings::resolve(&SettingsOverrides::default(), None, env).unwrap_err();
        assert!(matches!(err, CareMatchError::InvalidConfigValueError { .. }));
    }

    #[test]
    fn test_invalid_cli_url_is_rejected() {
        let overrides = SettingsOverrides {
            api_base_url: Some("localhost".to_string()),
            ..SettingsOverrides::default()
        };
        assert!(ClientSettings::resolve(&overrides, None, no_env).is_err());
    }

    #[test]
    fn test_json_logs_from_toml_or_flag() {
        let toml = TomlConfig::from_toml_str("[logging]\nformat = \"json\"\n").unwrap();
        let settings = ClientSettings::resolve(&SettingsOverrides::default(), Some(toml), no_env).unwrap();
        assert_eq!(settings.log_format, LogFormat::Json);

        let overrides = SettingsOverrides {
            json_logs: true,
            verbose: true,
            ..SettingsOverrides::default()
        };
        let settings = ClientSettings::resolve(&overrides, None, no_env).unwrap();
        assert_eq!(settings.log_format, LogFormat::Json);
        assert!(settings.verbose);
    }
}
