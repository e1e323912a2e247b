use crate::error::ConfigError;
use regex::Regex;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub service: ServiceConfig,

    #[serde(default)]
    pub audio: AudioConfig,

    #[serde(default)]
    pub limits: LimitsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_voice")]
    pub voice: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
            voice: default_voice(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AudioConfig {
    #[serde(default = "default_target_sample_rate")]
    pub target_sample_rate: u32,

    #[serde(default = "default_synthesis_sample_rate")]
    pub synthesis_sample_rate: u32,

    #[serde(default = "default_max_chunk_secs")]
    pub max_chunk_secs: f64,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            target_sample_rate: default_target_sample_rate(),
            synthesis_sample_rate: default_synthesis_sample_rate(),
            max_chunk_secs: default_max_chunk_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LimitsConfig {
    #[serde(default = "default_free_seconds")]
    pub free_seconds: f64,

    #[serde(default = "default_usage_path")]
    pub usage_path: String,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            free_seconds: default_free_seconds(),
            usage_path: default_usage_path(),
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:8080".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_voice() -> String {
    "alloy".to_string()
}

fn default_target_sample_rate() -> u32 {
    16_000
}

fn default_synthesis_sample_rate() -> u32 {
    24_000
}

fn default_max_chunk_secs() -> f64 {
    300.0
}

fn default_free_seconds() -> f64 {
    1_800.0
}

fn default_usage_path() -> String {
    "voicepad-usage.json".to_string()
}

/// Interpolate `${VAR}` patterns with environment variable values.
fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let re = Regex::new(r"\$\{([^}]+)\}").unwrap();
    let mut result = input.to_string();

    for cap in re.captures_iter(input) {
        let var_name = &cap[1];
        match std::env::var(var_name) {
            Ok(val) => {
                result = result.replace(&cap[0], &val);
            }
            Err(_) => {
                return Err(ConfigError::EnvVarNotFound(var_name.to_string()));
            }
        }
    }

    Ok(result)
}

impl AppConfig {
    /// Load configuration from a TOML file, with environment variable interpolation.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let interpolated = interpolate_env_vars(&content)?;
        let config: AppConfig = toml::from_str(&interpolated)?;
        Ok(config)
    }

    /// Parse configuration from a TOML string (for testing).
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let interpolated = interpolate_env_vars(s)?;
        let config: AppConfig = toml::from_str(&interpolated)?;
        Ok(config)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            service: ServiceConfig::default(),
            audio: AudioConfig::default(),
            limits: LimitsConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_toml() {
        let toml_str = r#"
[service]
base_url = "https://speech.example.com"
timeout_secs = 60
voice = "verse"

[audio]
target_sample_rate = 16000
max_chunk_secs = 120.0

[limits]
free_seconds = 600.0
"#;
        let config = AppConfig::from_toml_str(toml_str).unwrap();
        assert_eq!(config.service.base_url, "https://speech.example.com");
        assert_eq!(config.service.timeout_secs, 60);
        assert_eq!(config.service.voice, "verse");
        assert_eq!(config.audio.target_sample_rate, 16000);
        assert_eq!(config.audio.max_chunk_secs, 120.0);
        assert_eq!(config.limits.free_seconds, 600.0);
    }

    #[test]
    fn defaults_apply_on_empty_input() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config.service.base_url, "http://127.0.0.1:8080");
        assert!(config.service.api_key.is_none());
        assert_eq!(config.audio.target_sample_rate, 16_000);
        assert_eq!(config.audio.synthesis_sample_rate, 24_000);
        assert_eq!(config.audio.max_chunk_secs, 300.0);
        assert_eq!(config.limits.free_seconds, 1_800.0);
    }

    #[test]
    fn env_var_interpolation() {
        std::env::set_var("VOICEPAD_TEST_KEY", "sk-test-123");
        let toml_str = r#"
[service]
api_key = "${VOICEPAD_TEST_KEY}"
"#;
        let config = AppConfig::from_toml_str(toml_str).unwrap();
        assert_eq!(config.service.api_key.as_deref(), Some("sk-test-123"));
        std::env::remove_var("VOICEPAD_TEST_KEY");
    }

    #[test]
    fn missing_env_var_is_an_error() {
        let toml_str = r#"
[service]
api_key = "${VOICEPAD_DOES_NOT_EXIST_98765}"
"#;
        let err = AppConfig::from_toml_str(toml_str).unwrap_err();
        assert!(err.to_string().contains("VOICEPAD_DOES_NOT_EXIST_98765"));
    }

    #[test]
    fn invalid_toml_is_an_error() {
        assert!(AppConfig::from_toml_str("not toml [[[").is_err());
    }

    #[test]
    fn load_from_missing_file_is_an_error() {
        let result = AppConfig::load_from_file(Path::new("/nonexistent/voicepad.toml"));
        assert!(result.is_err());
    }
}
