//! Configuration loading for chatrelay.
//!
//! Reads `config.toml` from the data directory, applies environment
//! overrides, validates the result, and loads the prompt catalog. Secrets
//! never pass through [`AppConfig`]; they are resolved into
//! [`Credentials`] straight from the environment.

use std::path::{Path, PathBuf};

use secrecy::SecretString;

use chatrelay_core::prompt::catalog::PromptCatalog;
use chatrelay_types::config::AppConfig;
use chatrelay_types::error::ConfigError;

use crate::filesystem::resolve_path;

pub const ENV_ENDPOINT: &str = "LM_API_URL";
pub const ENV_MODEL: &str = "LM_MODEL_NAME";
pub const ENV_API_KEY: &str = "LM_API_KEY";
pub const ENV_CHANNEL_SECRET: &str = "LINE_CHANNEL_SECRET";
pub const ENV_ACCESS_TOKEN: &str = "LINE_CHANNEL_ACCESS_TOKEN";
pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";

/// Load `{data_dir}/config.toml`, apply environment overrides and validate.
///
/// - If the file does not exist, starts from [`AppConfig::default()`].
/// - If the file exists but cannot be read or parsed, fails: a half-applied
///   config is worse than not starting.
pub async fn load_app_config(data_dir: &Path) -> Result<AppConfig, ConfigError> {
    load_app_config_with(data_dir, env_var).await
}

/// Same as [`load_app_config`] with an injectable variable lookup.
pub async fn load_app_config_with(
    data_dir: &Path,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<AppConfig, ConfigError> {
    let config_path = data_dir.join("config.toml");

    let mut config = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => toml::from_str::<AppConfig>(&content).map_err(|e| ConfigError::Parse {
            path: config_path.display().to_string(),
            reason: e.to_string(),
        })?,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            AppConfig::default()
        }
        Err(err) => {
            return Err(ConfigError::Read {
                path: config_path.display().to_string(),
                reason: err.to_string(),
            });
        }
    };

    apply_env_overrides(&mut config, lookup);
    config.validate()?;
    Ok(config)
}

/// Environment wins over the file for the backend endpoint and model.
pub fn apply_env_overrides(config: &mut AppConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(endpoint) = lookup(ENV_ENDPOINT) {
        config.backend.endpoint = endpoint;
    }
    if let Some(model) = lookup(ENV_MODEL) {
        config.backend.model = model;
    }
}

/// Load and validate the prompt catalog JSON file.
pub async fn load_prompt_catalog(path: &Path) -> Result<PromptCatalog, ConfigError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

    PromptCatalog::from_json_str(&content).map_err(|e| match e {
        ConfigError::Parse { reason, .. } => ConfigError::Parse {
            path: path.display().to_string(),
            reason,
        },
        other => other,
    })
}

/// Absolute locations of the files named in `[paths]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPaths {
    pub prompts: PathBuf,
    pub upload_dir: PathBuf,
    pub database: PathBuf,
}

impl ResolvedPaths {
    pub fn new(data_dir: &Path, config: &AppConfig) -> Self {
        Self {
            prompts: resolve_path(data_dir, &config.paths.prompts),
            upload_dir: resolve_path(data_dir, &config.paths.upload_dir),
            database: resolve_path(data_dir, &config.paths.database),
        }
    }
}

/// Secrets resolved from the environment.
///
/// Intentionally does NOT derive Debug.
pub struct Credentials {
    pub channel_secret: Option<SecretString>,
    pub access_token: Option<SecretString>,
    pub backend_api_key: Option<SecretString>,
}

impl Credentials {
    pub fn from_env() -> Self {
        Self::from_lookup(env_var)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let secret = |key: &str| lookup(key).map(SecretString::from);
        Self {
            channel_secret: secret(ENV_CHANNEL_SECRET),
            access_token: secret(ENV_ACCESS_TOKEN),
            backend_api_key: secret(ENV_API_KEY),
        }
    }

    /// Split out the credentials the webhook server cannot run without.
    pub fn into_server(self) -> Result<ServerCredentials, ConfigError> {
        let channel_secret = self
            .channel_secret
            .ok_or_else(|| ConfigError::MissingSetting(ENV_CHANNEL_SECRET.to_string()))?;
        let access_token = self
            .access_token
            .ok_or_else(|| ConfigError::MissingSetting(ENV_ACCESS_TOKEN.to_string()))?;
        Ok(ServerCredentials {
            channel_secret,
            access_token,
            backend_api_key: self.backend_api_key,
        })
    }
}

/// Credentials required by `serve`.
pub struct ServerCredentials {
    pub channel_secret: SecretString,
    pub access_token: SecretString,
    pub backend_api_key: Option<SecretString>,
}

/// Non-empty environment variable, treating blank values as unset.
fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
