use crate::utils::error::{CareMatchError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_API_PREFIX: &str = "/api/v1";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
pub const LOG_FORMATS: [&str; 2] = ["compact", "json"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: Option<String>,
    pub prefix: Option<String>,
    pub timeout_seconds: Option<u64>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub verbose: Option<bool>,
    pub format: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(CareMatchError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| CareMatchError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${CARE_MATCH_TOKEN})，未設定的保留原樣
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        use std::sync::LazyLock;

        static ENV_VAR: LazyLock<Regex> =
            LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"));

        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .to_string()
    }

    pub fn log_format(&self) -> &str {
        self.logging.format.as_deref().unwrap_or("compact")
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        if let Some(base_url) = &self.api.base_url {
            validation::validate_url("api.base_url", base_url)?;
        }
        if let Some(prefix) = &self.api.prefix {
            validation::validate_path_prefix("api.prefix", prefix)?;
        }
        if let Some(timeout) = self.api.timeout_seconds {
            validation::validate_range("api.timeout_seconds", timeout, 1, 300)?;
        }
        for key in self.api.headers.keys() {
            validation::validate_non_empty_string("api.headers", key)?;
        }
        validation::validate_one_of("logging.format", self.log_format(), &LOG_FORMATS)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_toml_config() {
        let toml_content = r#"
[api]
base_url = "https://match.example.com"
prefix = "/api/v2"
timeout_seconds = 10

[api.headers]
X-Client = "terminal"

[logging]
verbose = true
format = "json"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.api.base_url.as_deref(), Some("https://match.example.com"));
        assert_eq!(config.api.prefix.as_deref(), Some("/api/v2"));
        assert_eq!(config.api.timeout_seconds, Some(10));
        assert_eq!(config.api.headers.get("X-Client").map(String::as_str), Some("terminal"));
        assert_eq!(config.logging.verbose, Some(true));
        assert_eq!(config.log_format(), "json");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = TomlConfig::from_toml_str("").unwrap();
        assert!(config.api.base_url.is_none());
        assert_eq!(config.log_format(), "compact");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("CARE_MATCH_TEST_TOKEN", "secret-token");

        let toml_content = r#"
[api.headers]
Authorization = "Bearer ${CARE_MATCH_TEST_TOKEN}"
X-Missing = "${CARE_MATCH_TEST_UNSET_VAR}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(
            config.api.headers.get("Authorization").map(String::as_str),
            Some("Bearer secret-token")
        );
        assert_eq!(
            config.api.headers.get("X-Missing").map(String::as_str),
            Some("${CARE_MATCH_TEST_UNSET_VAR}")
        );

        std::env::remove_var("CARE_MATCH_TEST_TOKEN");
    }

    #[test]
    fn test_config_validation() {
        let bad_url = TomlConfig::from_toml_str("[api]\nbase_url = \"invalid-url\"\n").unwrap();
        assert!(bad_url.validate().is_err());

        let bad_timeout = TomlConfig::from_toml_str("[api]\ntimeout_seconds = 0\n").unwrap();
        assert!(bad_timeout.validate().is_err());

        let bad_format = TomlConfig::from_toml_str("[logging]\nformat = \"xml\"\n").unwrap();
        assert!(bad_format.validate().is_err());
    }

    #[test]
    fn test_invalid_toml_is_reported() {
        let err = TomlConfig::from_toml_str("[api\nbase_url = ").unwrap_err();
        assert!(matches!(err, CareMatchError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[api]\nbase_url = \"http://127.0.0.1:9000\"\n")
            .unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.api.base_url.as_deref(), Some("http://127.0.0.1:9000"));
    }
}
