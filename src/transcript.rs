//! Conversation transcript shown in the chat panel.
//!
//! Append-only: entries are never edited, removed, or reordered. Insertion
//! order is the only ordering. `clear` empties it wholesale on close.

use serde::Serialize;

/// A single rendered chat bubble.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    text: String,
    is_user: bool,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self { text: text.into(), is_user: true }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self { text: text.into(), is_user: false }
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn is_user(&self) -> bool {
        self.is_user
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// Empty transcripts show the greeting and suggested prompts instead.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    #[must_use]
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }
}

#[cfg(test)]
#[path = "transcript_test.rs"]
mod tests;
