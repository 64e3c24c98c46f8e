//! LINE webhook receiver.
//!
//! Verifies `X-Line-Signature` against the raw body, parses the events, and
//! hands them to background tasks: one task per sender, which processes that
//! sender's events in payload order. The response goes out as soon as the
//! tasks are queued; each event is dispatched and gets exactly one reply
//! through the LINE reply endpoint.

use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use secrecy::ExposeSecret;
use tracing::{Instrument, error, info_span};

use chatrelay_infra::line::signature::{SIGNATURE_HEADER, verify_signature};
use chatrelay_infra::line::webhook::parse_events;
use chatrelay_types::error::TransportError;
use chatrelay_types::event::InboundEvent;

use crate::http::error::AppError;
use crate::state::AppState;

/// POST /callback - Receive a LINE webhook delivery.
pub async fn callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<&'static str, AppError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(TransportError::MissingSignature)?;

    verify_signature(state.channel_secret.expose_secret().as_bytes(), &body, signature)?;

    let events = parse_events(&body)?;
    tracing::debug!(events = events.len(), "webhook accepted");

    for (user_id, events) in group_by_sender(events) {
        let span = info_span!("line_events", %user_id, events = events.len());
        state
            .tasks
            .spawn(handle_sender(state.clone(), events).instrument(span));
    }

    Ok("OK")
}

/// Split a delivery into per-sender queues, keeping payload order within
/// each queue.
fn group_by_sender(events: Vec<InboundEvent>) -> HashMap<String, Vec<InboundEvent>> {
    let mut queues: HashMap<String, Vec<InboundEvent>> = HashMap::new();
    for event in events {
        queues.entry(event.user_id.clone()).or_default().push(event);
    }
    queues
}

async fn handle_sender(state: AppState, events: Vec<InboundEvent>) {
    for event in events {
        let reply = state.engine.dispatch(&event).await;
        if let Err(e) = state.line.reply_text(&event.reply_token, &reply).await {
            error!(error = %e, reply_token = %event.reply_token, "failed to deliver reply");
        }
    }
}
