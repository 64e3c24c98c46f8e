//! Inbound message events delivered by the messaging-platform transport.

use serde::{Deserialize, Serialize};

use crate::audit::MessageKind;

/// A message event the dispatch engine knows how to handle.
///
/// Event kinds other than text and image never reach the engine: the
/// transport adapter drops them while parsing the webhook payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundEvent {
    /// Opaque token the transport needs to deliver exactly one reply.
    pub reply_token: String,
    pub user_id: String,
    pub message: InboundMessage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InboundMessage {
    Text { body: String },
    /// The image bytes are fetched lazily from the media source by id.
    Image { message_id: String },
}

impl InboundMessage {
    pub fn kind(&self) -> MessageKind {
        match self {
            InboundMessage::Text { .. } => MessageKind::Text,
            InboundMessage::Image { .. } => MessageKind::Image,
        }
    }
}
