//! Timeout-bounded inference client.
//!
//! `InferenceClient` owns the model identifier and the call timeout, builds
//! the text or image request shape, and delegates the HTTP call to an
//! [`InferenceBackend`]. Every failure, including a timeout, comes back as a
//! [`BackendError`] value so the caller can pick a fallback reply.

use std::time::{Duration, Instant};

use tracing::{Instrument, debug, info_span, warn};

use chatrelay_types::error::BackendError;
use chatrelay_types::llm::ChatCompletionRequest;
use chatrelay_types::prompt::PromptSet;
use chatrelay_types::turn::Turn;

use super::provider::InferenceBackend;
use super::request::{image_request, text_request};

pub struct InferenceClient<B: InferenceBackend> {
    backend: B,
    model: String,
    timeout: Duration,
}

impl<B: InferenceBackend> InferenceClient<B> {
    pub fn new(backend: B, model: impl Into<String>, timeout: Duration) -> Self {
        Self {
            backend,
            model: model.into(),
            timeout,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Continue a text conversation.
    pub async fn complete_text(
        &self,
        history: &[Turn],
        user_text: &str,
        prompts: &PromptSet,
    ) -> Result<String, BackendError> {
        let request = text_request(&self.model, history, user_text, prompts);
        let span = info_span!(
            "gen_ai.complete",
            gen_ai.system = self.backend.name(),
            gen_ai.request.model = %self.model,
            gen_ai.request.stream = false,
            history_turns = history.len(),
        );
        self.call(&request).instrument(span).await
    }

    /// Describe one image given as a self-contained `data:` URL.
    pub async fn complete_image(
        &self,
        image_url: &str,
        prompts: &PromptSet,
        temperature: f64,
    ) -> Result<String, BackendError> {
        let request = image_request(&self.model, image_url, prompts, temperature);
        let span = info_span!(
            "gen_ai.complete_image",
            gen_ai.system = self.backend.name(),
            gen_ai.request.model = %self.model,
            gen_ai.request.temperature = temperature,
            gen_ai.request.stream = false,
        );
        self.call(&request).instrument(span).await
    }

    /// Send a prebuilt request, bounded by the client timeout.
    pub async fn send(&self, request: &ChatCompletionRequest) -> Result<String, BackendError> {
        self.call(request).await
    }

    async fn call(&self, request: &ChatCompletionRequest) -> Result<String, BackendError> {
        let start = Instant::now();
        let result = match tokio::time::timeout(self.timeout, self.backend.complete(request)).await
        {
            Ok(result) => result,
            Err(_) => Err(BackendError::Timeout(self.timeout)),
        };
        let elapsed_ms = start.elapsed().as_millis() as u64;

        match &result {
            Ok(reply) => debug!(elapsed_ms, reply_chars = reply.chars().count(), "inference succeeded"),
            Err(e) => warn!(elapsed_ms, error = %e, "inference failed"),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MockBackend, prompts};
    use chatrelay_types::llm::{Content, MessageRole};

    #[tokio::test]
    async fn test_complete_text_sends_assembled_messages() {
        let backend = MockBackend::replying("hi there");
        let client = InferenceClient::new(backend.clone(), "m", Duration::from_secs(5));

        let history = vec![Turn::user("a"), Turn::assistant("b")];
        let reply = client.complete_text(&history, "hello", &prompts()).await.unwrap();
        assert_eq!(reply, "hi there");

        let sent = backend.requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].model, "m");
        assert_eq!(sent[0].messages.len(), 4);
        assert_eq!(sent[0].messages[3].content.as_text(), Some("hello~"));
    }

    #[tokio::test]
    async fn test_complete_image_carries_temperature() {
        let backend = MockBackend::replying("a cat");
        let client = InferenceClient::new(backend.clone(), "vl", Duration::from_secs(5));

        let reply = client
            .complete_image("data:image/jpeg;base64,AA==", &prompts(), 0.3)
            .await
            .unwrap();
        assert_eq!(reply, "a cat");

        let sent = backend.requests();
        assert_eq!(sent[0].temperature, Some(0.3));
        assert_eq!(sent[0].messages[1].role, MessageRole::User);
        assert!(matches!(sent[0].messages[1].content, Content::Multipart(ref parts) if parts.len() == 2));
    }

    #[tokio::test]
    async fn test_backend_error_is_returned_as_value() {
        let backend = MockBackend::failing(BackendError::Status {
            status: 500,
            body: "boom".to_string(),
        });
        let client = InferenceClient::new(backend, "m", Duration::from_secs(5));
        let result = client.complete_text(&[], "hello", &prompts()).await;
        assert!(matches!(result, Err(BackendError::Status { status: 500, .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_maps_to_backend_error() {
        let backend = MockBackend::replying("late").with_delay(Duration::from_secs(120));
        let client = InferenceClient::new(backend, "m", Duration::from_secs(10));
        let result = client.complete_text(&[], "hello", &prompts()).await;
        assert!(matches!(result, Err(BackendError::Timeout(d)) if d == Duration::from_secs(10)));
    }
}
