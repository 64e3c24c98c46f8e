//! Audit records for processed exchanges.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

/// Kind of inbound message an exchange was about.
///
/// Maps to the CHECK constraint in the SQLite schema:
/// `CHECK (msg_type IN ('text', 'image'))`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Text,
    Image,
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageKind::Text => write!(f, "text"),
            MessageKind::Image => write!(f, "image"),
        }
    }
}

impl FromStr for MessageKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(MessageKind::Text),
            "image" => Ok(MessageKind::Image),
            other => Err(format!("invalid message kind: '{other}'")),
        }
    }
}

/// One append-only log row per processed message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// UUIDv7, so ids sort in creation order.
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub user_id: String,
    pub kind: MessageKind,
    /// Raw text for text messages, stored image path for image messages.
    pub input_summary: String,
    pub output_text: String,
}

impl AuditRecord {
    /// Create a record stamped with the current time.
    pub fn new(
        user_id: impl Into<String>,
        kind: MessageKind,
        input_summary: impl Into<String>,
        output_text: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::now_v7(),
            timestamp: Utc::now(),
            user_id: user_id.into(),
            kind,
            input_summary: input_summary.into(),
            output_text: output_text.into(),
        }
    }
}
