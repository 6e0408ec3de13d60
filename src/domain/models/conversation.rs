#[cfg(test)]
#[path = "conversation_test.rs"]
mod tests;

use serde_derive::Serialize;

use super::Message;

/// Ordered log of chat turns for the running session. Turns can only be
/// appended, never edited, removed or reordered.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(transparent)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        return &self.messages;
    }

    /// Copy of the conversation as it stands right now, used as the
    /// `chat_history` of an outgoing request.
    pub fn snapshot(&self) -> Vec<Message> {
        return self.messages.clone();
    }
}
