//! Webhook payload parsing.
//!
//! Only `message` events carrying a text or image message, a reply token and
//! a sender user id become [`InboundEvent`]s. Everything else (follows,
//! stickers, postbacks, group events without a user id) is skipped.

use serde::Deserialize;
use tracing::debug;

use chatrelay_types::error::TransportError;
use chatrelay_types::event::{InboundEvent, InboundMessage};

#[derive(Debug, Deserialize)]
struct WebhookBody {
    #[serde(default)]
    events: Vec<WebhookEvent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WebhookEvent {
    #[serde(rename = "type")]
    event_type: String,
    #[serde(default)]
    reply_token: Option<String>,
    #[serde(default)]
    source: Option<EventSource>,
    #[serde(default)]
    message: Option<EventMessage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventSource {
    #[serde(default)]
    user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EventMessage {
    #[serde(rename = "type")]
    message_type: String,
    id: String,
    #[serde(default)]
    text: Option<String>,
}

/// Parse a verified webhook body into the events the dispatch engine handles.
pub fn parse_events(body: &[u8]) -> Result<Vec<InboundEvent>, TransportError> {
    let payload: WebhookBody = serde_json::from_slice(body)
        .map_err(|e| TransportError::MalformedPayload(e.to_string()))?;

    Ok(payload.events.into_iter().filter_map(into_inbound).collect())
}

fn into_inbound(event: WebhookEvent) -> Option<InboundEvent> {
    if event.event_type != "message" {
        debug!(event_type = %event.event_type, "ignoring non-message event");
        return None;
    }

    let message = event.message?;
    let reply_token = event.reply_token?;
    let Some(user_id) = event.source.and_then(|s| s.user_id) else {
        debug!("ignoring message event without a user id");
        return None;
    };

    let message = match message.message_type.as_str() {
        "text" => InboundMessage::Text {
            body: message.text.unwrap_or_default(),
        },
        "image" => InboundMessage::Image {
            message_id: message.id,
        },
        other => {
            debug!(message_type = other, "ignoring unsupported message type");
            return None;
        }
    };

    Some(InboundEvent {
        reply_token,
        user_id,
        message,
    })
}
