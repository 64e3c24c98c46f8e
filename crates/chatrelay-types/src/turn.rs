//! Conversation turns kept in a user's rolling history.

use serde::{Deserialize, Serialize};

use crate::llm::{ChatMessage, Content, MessageRole};

/// Default history cap: 10 turns, i.e. 5 user/assistant pairs.
pub const DEFAULT_MAX_HISTORY: usize = 10;

/// One message exchange entry. Immutable once created.
///
/// Only `user` and `assistant` turns are ever stored; the system prompt is
/// rebuilt from the prompt catalog on every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    role: MessageRole,
    content: Content,
}

impl Turn {
    pub fn user(content: impl Into<Content>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<Content>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }

    pub fn role(&self) -> MessageRole {
        self.role
    }

    pub fn content(&self) -> &Content {
        &self.content
    }
}

impl From<Turn> for ChatMessage {
    fn from(turn: Turn) -> Self {
        ChatMessage {
            role: turn.role,
            content: turn.content,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_constructors() {
        let user = Turn::user("hello");
        assert_eq!(user.role(), MessageRole::User);
        assert_eq!(user.content().as_text(), Some("hello"));

        let assistant = Turn::assistant("hi there".to_string());
        assert_eq!(assistant.role(), MessageRole::Assistant);
    }

    #[test]
    fn test_turn_into_chat_message() {
        let msg: ChatMessage = Turn::assistant("ok").into();
        assert_eq!(msg.role, MessageRole::Assistant);
        assert_eq!(msg.content, Content::Text("ok".to_string()));
    }
}
