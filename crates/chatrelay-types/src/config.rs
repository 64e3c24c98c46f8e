//! Application configuration types for chatrelay.
//!
//! `AppConfig` represents `config.toml` in the data directory. Optional knobs
//! have defaults; the backend `endpoint` and `model` are required and are
//! checked by [`AppConfig::validate`] after environment overrides are applied.
//! Secrets are not part of this struct; they are resolved separately by the
//! infrastructure layer.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::turn::DEFAULT_MAX_HISTORY;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub paths: PathsConfig,
}

/// HTTP listener for the webhook server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Inference backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Full URL of the chat-completions endpoint. Required.
    #[serde(default)]
    pub endpoint: String,
    /// Model identifier sent with every request. Required.
    #[serde(default)]
    pub model: String,
    /// Upper bound on a single inference call, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Sampling temperature sent with image requests.
    #[serde(default = "default_image_temperature")]
    pub image_temperature: f64,
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_image_temperature() -> f64 {
    0.7
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            model: String::new(),
            timeout_secs: default_timeout_secs(),
            image_temperature: default_image_temperature(),
        }
    }
}

/// Session store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Maximum number of turns kept per user (user + assistant entries).
    #[serde(default = "default_max_history")]
    pub max_history: usize,
}

fn default_max_history() -> usize {
    DEFAULT_MAX_HISTORY
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_history: default_max_history(),
        }
    }
}

/// File locations; relative paths resolve against the data directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_prompts")]
    pub prompts: String,
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,
    #[serde(default = "default_database")]
    pub database: String,
}

fn default_prompts() -> String {
    "prompts.json".to_string()
}

fn default_upload_dir() -> String {
    "upload".to_string()
}

fn default_database() -> String {
    "chat_log.db".to_string()
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            prompts: default_prompts(),
            upload_dir: default_upload_dir(),
            database: default_database(),
        }
    }
}

impl AppConfig {
    /// Check required fields and value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backend.endpoint.trim().is_empty() {
            return Err(ConfigError::MissingSetting(
                "backend.endpoint (LM_API_URL)".to_string(),
            ));
        }
        if self.backend.model.trim().is_empty() {
            return Err(ConfigError::MissingSetting(
                "backend.model (LM_MODEL_NAME)".to_string(),
            ));
        }
        if self.backend.timeout_secs == 0 {
            return Err(ConfigError::InvalidSetting {
                key: "backend.timeout_secs".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if !(0.0..=2.0).contains(&self.backend.image_temperature) {
            return Err(ConfigError::InvalidSetting {
                key: "backend.image_temperature".to_string(),
                reason: format!("{} is outside 0.0..=2.0", self.backend.image_temperature),
            });
        }
        let max = self.session.max_history;
        if max < 2 || max % 2 != 0 {
            return Err(ConfigError::InvalidSetting {
                key: "session.max_history".to_string(),
                reason: format!("{max} must be an even number of at least 2"),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> AppConfig {
        let mut config = AppConfig::default();
        config.backend.endpoint = "http://localhost:1234/v1/chat/completions".to_string();
        config.backend.model = "gemma-3".to_string();
        config
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.backend.timeout_secs, 60);
        assert!((config.backend.image_temperature - 0.7).abs() < f64::EPSILON);
        assert_eq!(config.session.max_history, 10);
        assert_eq!(config.paths.prompts, "prompts.json");
        assert_eq!(config.paths.database, "chat_log.db");
    }

    #[test]
    fn test_deserialize_partial_toml() {
        let toml_str = r#"
[backend]
endpoint = "http://127.0.0.1:1234/v1/chat/completions"
model = "qwen2.5-vl"
timeout_secs = 15

[session]
max_history = 6
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.backend.model, "qwen2.5-vl");
        assert_eq!(config.backend.timeout_secs, 15);
        assert_eq!(config.session.max_history, 6);
        assert_eq!(config.server.host, "0.0.0.0");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_requires_endpoint_and_model() {
        let mut config = valid();
        config.backend.endpoint.clear();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingSetting(key)) if key.starts_with("backend.endpoint")
        ));

        let mut config = valid();
        config.backend.model = "  ".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::MissingSetting(_))));
    }

    #[test]
    fn test_validate_rejects_odd_history_cap() {
        let mut config = valid();
        config.session.max_history = 7;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidSetting { key, .. }) if key == "session.max_history"
        ));
        config.session.max_history = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = valid();
        config.backend.timeout_secs = 0;
        assert!(config.validate().is_err());
    }
}
