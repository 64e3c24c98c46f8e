//! In-process port implementations shared by the core unit tests.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chatrelay_types::audit::AuditRecord;
use chatrelay_types::error::{BackendError, MediaError, RepositoryError};
use chatrelay_types::llm::ChatCompletionRequest;
use chatrelay_types::prompt::PromptSet;

use crate::llm::provider::InferenceBackend;
use crate::repository::audit::AuditSink;
use crate::storage::media::{MediaSource, MediaStore};

pub fn prompts() -> PromptSet {
    PromptSet {
        text_system_prompt: "SYS".to_string(),
        image_system_prompt: "IMG".to_string(),
        locale_force_suffix: "+zh".to_string(),
        user_suffix: "~".to_string(),
        reset_commands: vec!["reset".to_string()],
        reset_reply: "cleared".to_string(),
        api_error_reply: "api down".to_string(),
        image_error_reply: "image failed".to_string(),
        image_user_prompt: "what is this?".to_string(),
    }
}

/// Scripted backend that records every request it receives.
#[derive(Clone)]
pub struct MockBackend {
    reply: Result<String, BackendError>,
    delay: Option<Duration>,
    requests: Arc<Mutex<Vec<ChatCompletionRequest>>>,
}

impl MockBackend {
    pub fn replying(reply: impl Into<String>) -> Self {
        Self {
            reply: Ok(reply.into()),
            delay: None,
            requests: Arc::default(),
        }
    }

    pub fn failing(error: BackendError) -> Self {
        Self {
            reply: Err(error),
            delay: None,
            requests: Arc::default(),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn requests(&self) -> Vec<ChatCompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl InferenceBackend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: &ChatCompletionRequest) -> Result<String, BackendError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.reply.clone()
    }
}

/// Audit sink that keeps records in memory, optionally failing every append.
#[derive(Clone, Default)]
pub struct MemoryAudit {
    records: Arc<Mutex<Vec<AuditRecord>>>,
    fail: bool,
}

impl MemoryAudit {
    pub fn failing() -> Self {
        Self {
            records: Arc::default(),
            fail: true,
        }
    }

    pub fn records(&self) -> Vec<AuditRecord> {
        self.records.lock().unwrap().clone()
    }
}

impl AuditSink for MemoryAudit {
    async fn append(&self, record: &AuditRecord) -> Result<(), RepositoryError> {
        if self.fail {
            return Err(RepositoryError::Query("disk full".to_string()));
        }
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }
}

/// Media source serving fixed bytes, or failing when built with `missing()`.
#[derive(Clone)]
pub struct FixedMedia {
    bytes: Option<Vec<u8>>,
}

impl FixedMedia {
    pub fn serving(bytes: &[u8]) -> Self {
        Self {
            bytes: Some(bytes.to_vec()),
        }
    }

    pub fn missing() -> Self {
        Self { bytes: None }
    }
}

impl MediaSource for FixedMedia {
    async fn fetch(&self, message_id: &str) -> Result<Vec<u8>, MediaError> {
        self.bytes
            .clone()
            .ok_or_else(|| MediaError::Download(format!("no content for {message_id}")))
    }
}

/// Media store that remembers what it was asked to save.
#[derive(Clone, Default)]
pub struct MemoryMediaStore {
    saved: Arc<Mutex<Vec<(String, Vec<u8>)>>>,
}

impl MemoryMediaStore {
    pub fn saved(&self) -> Vec<(String, Vec<u8>)> {
        self.saved.lock().unwrap().clone()
    }
}

impl MediaStore for MemoryMediaStore {
    async fn save_image(&self, user_id: &str, bytes: &[u8]) -> Result<PathBuf, MediaError> {
        let mut saved = self.saved.lock().unwrap();
        saved.push((user_id.to_string(), bytes.to_vec()));
        Ok(PathBuf::from(format!("upload/image/{user_id}/{}.jpg", saved.len())))
    }
}
