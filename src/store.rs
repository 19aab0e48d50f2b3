//! In-memory conversation log.

use chrono::{DateTime, Utc};

use crate::events::MessageKind;

/// A single conversation turn. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub kind: MessageKind,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(kind: MessageKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(MessageKind::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(MessageKind::Assistant, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(MessageKind::Error, text)
    }
}

/// Append-only list of messages, in display order.
///
/// Lives for the whole process; there is no way to remove or edit an entry.
#[derive(Debug, Clone, Default)]
pub struct ConversationStore {
    messages: Vec<Message>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a message to the end
    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// All messages, oldest first
    pub fn all(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Most recent assistant reply
    pub fn last_assistant(&self) -> Option<&Message> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.kind == MessageKind::Assistant)
    }
}
