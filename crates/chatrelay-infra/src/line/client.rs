//! LINE Messaging API client.
//!
//! Sends the single reply for an event and downloads image content. The
//! channel access token is wrapped in [`secrecy::SecretString`] and only
//! exposed when building the `Authorization` header.

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::debug;

use chatrelay_core::storage::media::MediaSource;
use chatrelay_types::error::{MediaError, TransportError};

const API_BASE: &str = "https://api.line.me";
const DATA_API_BASE: &str = "https://api-data.line.me";

/// LINE caps a single text message at 5000 characters.
const MAX_TEXT_CHARS: usize = 5000;

/// Images larger than this are refused rather than buffered.
const MAX_CONTENT_BYTES: usize = 20 * 1024 * 1024;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReplyRequest<'a> {
    reply_token: &'a str,
    messages: [TextMessage<'a>; 1],
}

#[derive(Serialize)]
struct TextMessage<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    text: &'a str,
}

/// Client for the reply and content endpoints.
///
/// Does NOT derive Debug: it holds the channel access token. Clones share
/// the connection pool and the token.
#[derive(Clone)]
pub struct LineClient {
    http: reqwest::Client,
    access_token: Arc<SecretString>,
    api_base: String,
    data_api_base: String,
}

impl LineClient {
    pub fn new(access_token: SecretString) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| TransportError::Delivery(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            access_token: Arc::new(access_token),
            api_base: API_BASE.to_string(),
            data_api_base: DATA_API_BASE.to_string(),
        })
    }

    /// Point both endpoints at another host (useful for testing or proxies).
    pub fn with_base_urls(
        mut self,
        api_base: impl Into<String>,
        data_api_base: impl Into<String>,
    ) -> Self {
        self.api_base = api_base.into();
        self.data_api_base = data_api_base.into();
        self
    }

    /// Deliver one text reply for a reply token.
    pub async fn reply_text(&self, reply_token: &str, text: &str) -> Result<(), TransportError> {
        let text = truncate_chars(text, MAX_TEXT_CHARS);
        let body = ReplyRequest {
            reply_token,
            messages: [TextMessage { kind: "text", text }],
        };

        let response = self
            .http
            .post(format!("{}/v2/bot/message/reply", self.api_base))
            .bearer_auth(self.access_token.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| TransportError::Delivery(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(TransportError::Delivery(format!("HTTP {status}: {error_body}")));
        }
        Ok(())
    }
}

impl MediaSource for LineClient {
    async fn fetch(&self, message_id: &str) -> Result<Vec<u8>, MediaError> {
        let url = format!("{}/v2/bot/message/{message_id}/content", self.data_api_base);
        let response = self
            .http
            .get(&url)
            .bearer_auth(self.access_token.expose_secret())
            .send()
            .await
            .map_err(|e| MediaError::Download(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MediaError::Download(format!(
                "HTTP {status} for message {message_id}"
            )));
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| MediaError::Download(e.to_string()))?;
            if bytes.len() + chunk.len() > MAX_CONTENT_BYTES {
                return Err(MediaError::Download(format!(
                    "content for message {message_id} exceeds {MAX_CONTENT_BYTES} bytes"
                )));
            }
            bytes.extend_from_slice(&chunk);
        }

        debug!(message_id, size = bytes.len(), "message content downloaded");
        Ok(bytes)
    }
}

fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
