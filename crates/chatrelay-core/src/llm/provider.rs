//! InferenceBackend trait definition.
//!
//! The single seam between the dispatch engine and a remote chat-completion
//! service. Uses native async fn in traits (RPITIT, Rust 2024 edition).

use chatrelay_types::error::BackendError;
use chatrelay_types::llm::ChatCompletionRequest;

/// A remote chat-completion endpoint.
///
/// Implementations perform exactly one call per `complete` (no retries) and
/// report every failure as a [`BackendError`] value; they must not panic.
/// Implementations live in chatrelay-infra (e.g., `HttpInferenceBackend`).
pub trait InferenceBackend: Send + Sync {
    /// Human-readable backend name, used in logs and spans.
    fn name(&self) -> &str;

    /// Post the request and return the first choice's message content.
    fn complete(
        &self,
        request: &ChatCompletionRequest,
    ) -> impl std::future::Future<Output = Result<String, BackendError>> + Send;
}
