//! Chat line classification

use realmlink_protocol::messages::incoming::Text;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChatKind {
    /// Addressed to a named recipient
    Private,
    /// Sender prefixed with `#`
    Announcement,
    /// Sender prefixed with `*`
    Guild,
    /// Sender prefixed with `@`
    Party,
    /// No sender name
    Server,
    Normal,
}

/// A classified chat line with the channel prefix stripped from the sender
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub kind: ChatKind,
    pub sender: String,
    pub recipient: String,
    pub text: String,
}

impl ChatKind {
    pub fn classify(text: &Text) -> Self {
        if !text.recipient.is_empty() {
            return ChatKind::Private;
        }
        match text.name.chars().next() {
            None => ChatKind::Server,
            Some('#') => ChatKind::Announcement,
            Some('*') => ChatKind::Guild,
            Some('@') => ChatKind::Party,
            Some(_) => ChatKind::Normal,
        }
    }

    fn prefix(&self) -> Option<char> {
        match self {
            ChatKind::Announcement => Some('#'),
            ChatKind::Guild => Some('*'),
            ChatKind::Party => Some('@'),
            _ => None,
        }
    }
}

impl ChatMessage {
    pub fn from_text(text: &Text) -> Self {
        let kind = ChatKind::classify(text);
        let sender = match kind.prefix() {
            Some(prefix) => text.name.trim_start_matches(prefix).to_string(),
            None => text.name.clone(),
        };
        Self {
            kind,
            sender,
            recipient: text.recipient.clone(),
            text: text.raw_text.clone(),
        }
    }

    /// Logs the line the way the session reports chat
    pub fn log(&self, session: &uuid::Uuid) {
        match self.kind {
            ChatKind::Private => {
                tracing::info!(session = %session, from = %self.sender, to = %self.recipient, "{}", self.text)
            }
            ChatKind::Server => tracing::info!(session = %session, channel = "server", "{}", self.text),
            _ => tracing::info!(
                session = %session,
                channel = ?self.kind,
                from = %self.sender,
                "{}",
                self.text
            ),
        }
    }
}
