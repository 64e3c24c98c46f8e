//! Dispatch engine: one inbound event in, exactly one reply text out.
//!
//! For every event the engine takes the sender's session lock and holds it
//! until the audit record is written, so per-user history updates and audit
//! rows follow processing order. Backend, media and audit failures never
//! escape `dispatch`; they are mapped to the configured fallback replies or
//! logged.

use std::time::Instant;

use tracing::{Instrument, error, info, info_span, warn};

use chatrelay_types::audit::AuditRecord;
use chatrelay_types::error::MediaError;
use chatrelay_types::event::{InboundEvent, InboundMessage};
use chatrelay_types::turn::Turn;

use crate::chat::session::{SessionGuard, SessionStore};
use crate::llm::client::InferenceClient;
use crate::llm::provider::InferenceBackend;
use crate::prompt::catalog::PromptCatalog;
use crate::repository::audit::AuditSink;
use crate::storage::media::{MediaSource, MediaStore, jpeg_data_url};

/// Input summary recorded when an image could not be fetched or stored.
pub fn unstored_image_ref(message_id: &str) -> String {
    format!("line-message:{message_id}")
}

pub struct DispatchEngine<B, A, S, M>
where
    B: InferenceBackend,
    A: AuditSink,
    S: MediaSource,
    M: MediaStore,
{
    client: InferenceClient<B>,
    sessions: SessionStore,
    catalog: PromptCatalog,
    audit: A,
    media_source: S,
    media_store: M,
    image_temperature: f64,
}

impl<B, A, S, M> DispatchEngine<B, A, S, M>
where
    B: InferenceBackend,
    A: AuditSink,
    S: MediaSource,
    M: MediaStore,
{
    pub fn new(
        client: InferenceClient<B>,
        sessions: SessionStore,
        catalog: PromptCatalog,
        audit: A,
        media_source: S,
        media_store: M,
        image_temperature: f64,
    ) -> Self {
        Self {
            client,
            sessions,
            catalog,
            audit,
            media_source,
            media_store,
            image_temperature,
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn catalog(&self) -> &PromptCatalog {
        &self.catalog
    }

    pub fn client(&self) -> &InferenceClient<B> {
        &self.client
    }

    pub fn audit(&self) -> &A {
        &self.audit
    }

    /// Process one event and return the text to send back to the user.
    pub async fn dispatch(&self, event: &InboundEvent) -> String {
        let kind = event.message.kind();
        let span = info_span!("dispatch", user_id = %event.user_id, %kind);

        async {
            let start = Instant::now();
            let mut session = self.sessions.lock(&event.user_id).await;

            let (input_summary, output) = match &event.message {
                InboundMessage::Text { body } => {
                    let output = self.handle_text(&mut session, body).await;
                    (body.clone(), output)
                }
                InboundMessage::Image { message_id } => {
                    self.handle_image(&event.user_id, message_id).await
                }
            };

            let record = AuditRecord::new(&event.user_id, kind, input_summary, output.as_str());
            if let Err(e) = self.audit.append(&record).await {
                error!(error = %e, record_id = %record.id, "failed to write audit record");
            }
            drop(session);
            self.sessions.release_if_idle(&event.user_id);

            info!(
                elapsed_ms = start.elapsed().as_millis() as u64,
                reply_chars = output.chars().count(),
                "exchange processed"
            );
            output
        }
        .instrument(span)
        .await
    }

    async fn handle_text(&self, session: &mut SessionGuard, body: &str) -> String {
        let prompts = self.catalog.prompts();

        if prompts.is_reset_command(body) {
            session.reset();
            info!("session history reset");
            return prompts.reset_reply.clone();
        }

        let history = session.history();
        match self.client.complete_text(&history, body, prompts).await {
            Ok(reply) => {
                session.append_turns(vec![Turn::user(body), Turn::assistant(reply.as_str())]);
                reply
            }
            Err(e) => {
                warn!(error = %e, "text inference failed, replying with fallback");
                prompts.api_error_reply.clone()
            }
        }
    }

    /// Returns `(input_summary, output)`. Image exchanges never touch history.
    async fn handle_image(&self, user_id: &str, message_id: &str) -> (String, String) {
        let prompts = self.catalog.prompts();

        let (stored, data_url) = match self.store_image(user_id, message_id).await {
            Ok(stored) => stored,
            Err(e) => {
                warn!(error = %e, message_id, "image retrieval failed, replying with fallback");
                return (
                    unstored_image_ref(message_id),
                    prompts.image_error_reply.clone(),
                );
            }
        };

        let output = match self
            .client
            .complete_image(&data_url, prompts, self.image_temperature)
            .await
        {
            Ok(reply) => reply,
            Err(e) => {
                warn!(error = %e, "image inference failed, replying with fallback");
                prompts.image_error_reply.clone()
            }
        };
        (stored, output)
    }

    async fn store_image(
        &self,
        user_id: &str,
        message_id: &str,
    ) -> Result<(String, String), MediaError> {
        let bytes = self.media_source.fetch(message_id).await?;
        let path = self.media_store.save_image(user_id, &bytes).await?;
        Ok((path.display().to_string(), jpeg_data_url(&bytes)))
    }
}
