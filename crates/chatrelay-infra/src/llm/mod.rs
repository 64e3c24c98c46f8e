//! Inference backend implementations.
//!
//! Contains the concrete [`InferenceBackend`](chatrelay_core::llm::provider::InferenceBackend)
//! used in production and a factory ([`create_backend`]) that builds it from
//! the `[backend]` config section.

pub mod openai_compat;

use std::time::Duration;

use secrecy::SecretString;

use chatrelay_types::config::BackendConfig;
use chatrelay_types::error::BackendError;

use self::openai_compat::OpenAiCompatBackend;

/// Build the inference backend described by `config`.
///
/// `api_key` is optional: local servers usually accept anonymous requests.
pub fn create_backend(
    config: &BackendConfig,
    api_key: Option<SecretString>,
) -> Result<OpenAiCompatBackend, BackendError> {
    OpenAiCompatBackend::new(
        config.endpoint.clone(),
        api_key,
        Duration::from_secs(config.timeout_secs),
    )
}
