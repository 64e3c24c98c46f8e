//! OpenAI-compatible chat-completions backend.
//!
//! Posts a [`ChatCompletionRequest`] to a single configured endpoint (LM
//! Studio, vLLM, llama.cpp server, or any other server speaking the
//! `/v1/chat/completions` shape) and extracts `choices[0].message.content`.
//!
//! The optional API key is wrapped in [`secrecy::SecretString`] and is only
//! exposed when building the `Authorization` header.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use chatrelay_core::llm::provider::InferenceBackend;
use chatrelay_types::error::BackendError;
use chatrelay_types::llm::{ChatCompletionRequest, ChatCompletionResponse};

/// Longest error body kept in a [`BackendError::Status`].
const MAX_ERROR_BODY: usize = 512;

/// Inference backend for an OpenAI-compatible endpoint.
///
/// Does NOT derive Debug so the API key can never end up in logs.
pub struct OpenAiCompatBackend {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<SecretString>,
}

impl OpenAiCompatBackend {
    /// Create a backend posting to `endpoint`.
    ///
    /// `timeout` bounds the whole HTTP exchange; the inference client applies
    /// its own bound on top of it.
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<SecretString>,
        timeout: Duration,
    ) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| BackendError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl InferenceBackend for OpenAiCompatBackend {
    fn name(&self) -> &str {
        "openai_compat"
    }

    async fn complete(&self, request: &ChatCompletionRequest) -> Result<String, BackendError> {
        let mut builder = self.client.post(&self.endpoint).json(request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key.expose_secret());
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                BackendError::Transport(format!("request timed out: {e}"))
            } else {
                BackendError::Transport(format!("HTTP request failed: {e}"))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            if body.len() > MAX_ERROR_BODY {
                let cut = (0..=MAX_ERROR_BODY)
                    .rev()
                    .find(|i| body.is_char_boundary(*i))
                    .unwrap_or(0);
                body.truncate(cut);
            }
            return Err(BackendError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| BackendError::Malformed(format!("failed to parse response: {e}")))?;

        parsed.into_reply()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use axum::Json;
    use axum::Router;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use serde_json::{Value, json};

    use chatrelay_types::llm::ChatMessage;

    /// Serve `router` on an ephemeral port and return its base URL.
    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn request() -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: "gemma-3".to_string(),
            messages: vec![ChatMessage::system("SYS"), ChatMessage::user("hello")],
            stream: false,
            temperature: None,
        }
    }

    fn backend(base: &str, key: Option<&str>) -> OpenAiCompatBackend {
        OpenAiCompatBackend::new(
            format!("{base}/v1/chat/completions"),
            key.map(SecretString::from),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_complete_returns_first_choice() {
        let seen: Arc<Mutex<Option<(Value, Option<String>)>>> = Arc::default();
        let seen_in_handler = Arc::clone(&seen);
        let router = Router::new().route(
            "/v1/chat/completions",
            post(move |headers: HeaderMap, Json(body): Json<Value>| {
                let seen = Arc::clone(&seen_in_handler);
                async move {
                    let auth = headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string);
                    *seen.lock().unwrap() = Some((body, auth));
                    Json(json!({
                        "choices": [
                            {"message": {"role": "assistant", "content": "hi there"}},
                            {"message": {"role": "assistant", "content": "ignored"}}
                        ]
                    }))
                }
            }),
        );
        let base = serve(router).await;

        let reply = backend(&base, Some("sk-local")).complete(&request()).await.unwrap();
        assert_eq!(reply, "hi there");

        let (body, auth) = seen.lock().unwrap().clone().unwrap();
        assert_eq!(body["model"], "gemma-3");
        assert_eq!(body["stream"], false);
        assert!(body.get("temperature").is_none());
        assert_eq!(body["messages"][1]["content"], "hello");
        assert_eq!(auth.as_deref(), Some("Bearer sk-local"));
    }

    #[tokio::test]
    async fn test_no_key_sends_no_authorization() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|headers: HeaderMap| async move {
                let content = if headers.contains_key("authorization") {
                    "unexpected"
                } else {
                    "anonymous"
                };
                Json(json!({"choices": [{"message": {"content": content}}]}))
            }),
        );
        let base = serve(router).await;
        let reply = backend(&base, None).complete(&request()).await.unwrap();
        assert_eq!(reply, "anonymous");
    }

    #[tokio::test]
    async fn test_non_success_status_is_error() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "model not loaded") }),
        );
        let base = serve(router).await;
        let err = backend(&base, None).complete(&request()).await.unwrap_err();
        match err {
            BackendError::Status { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, "model not loaded");
            }
            other => panic!("expected Status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_content_is_malformed() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async { Json(json!({"choices": [{"message": {"role": "assistant"}}]})) }),
        );
        let base = serve(router).await;
        let err = backend(&base, None).complete(&request()).await.unwrap_err();
        assert!(matches!(err, BackendError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_non_json_body_is_malformed() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async { "<html>proxy error</html>" }),
        );
        let base = serve(router).await;
        let err = backend(&base, None).complete(&request()).await.unwrap_err();
        assert!(matches!(err, BackendError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = backend(&format!("http://{addr}"), None)
            .complete(&request())
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::Transport(_)));
    }
}
