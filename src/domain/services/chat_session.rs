#[cfg(test)]
#[path = "chat_session_test.rs"]
mod tests;

use tokio::sync::mpsc;

use super::DeliveryController;
use crate::domain::models::Conversation;
use crate::domain::models::Event;
use crate::domain::models::Message;
use crate::domain::models::OutgoingRequest;
use crate::domain::models::Role;

/// State of the running chat: the conversation, whether a reply is being
/// waited on, and any partial reply text streamed in so far.
#[derive(Default)]
pub struct ChatSession {
    conversation: Conversation,
    loading: bool,
    pending: String,
}

impl ChatSession {
    /// Starts a new turn. Returns `None` when the input is blank or a reply
    /// is still outstanding, in which case nothing changes.
    pub fn begin(&mut self, input: &str) -> Option<OutgoingRequest> {
        let text = input.trim();
        if text.is_empty() || self.loading {
            return None;
        }

        let request = OutgoingRequest::new(text, self.conversation.snapshot());
        self.conversation.append(Message::new(Role::User, text));
        self.loading = true;
        self.pending.clear();

        return Some(request);
    }

    pub fn push_chunk(&mut self, chunk: &str) {
        if self.loading {
            self.pending.push_str(chunk);
        }
    }

    /// Ends the outstanding turn with the reply (or the local error
    /// message). Replies arriving when nothing is outstanding are dropped.
    pub fn complete(&mut self, message: Message) -> bool {
        if !self.loading {
            return false;
        }

        self.conversation.append(message);
        self.loading = false;
        self.pending.clear();

        return true;
    }

    /// Gives up on the outstanding turn without appending a reply.
    pub fn cancel(&mut self) {
        self.loading = false;
        self.pending.clear();
    }

    pub fn is_loading(&self) -> bool {
        return self.loading;
    }

    pub fn conversation(&self) -> &Conversation {
        return &self.conversation;
    }

    pub fn pending(&self) -> &str {
        return &self.pending;
    }

    /// Runs a whole turn in place, for callers without a UI loop.
    #[allow(clippy::implicit_return)]
    pub async fn submit(
        &mut self,
        controller: &DeliveryController,
        input: &str,
        tx: &mpsc::UnboundedSender<Event>,
    ) -> Option<Message> {
        let request = self.begin(input)?;
        let reply = controller.deliver(&request, tx).await;
        self.complete(reply.clone());

        return Some(reply);
    }
}
