#[cfg(test)]
#[path = "request_test.rs"]
mod tests;

use serde_derive::Deserialize;
use serde_derive::Serialize;

use super::DeliveryError;
use super::Message;

/// A user turn on its way to the backend, with the conversation as it was
/// before that turn was appended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutgoingRequest {
    pub text: String,
    pub chat_history: Vec<Message>,
}

impl OutgoingRequest {
    pub fn new(text: &str, chat_history: Vec<Message>) -> OutgoingRequest {
        return OutgoingRequest {
            text: text.to_string(),
            chat_history,
        };
    }

    /// Body for the `/query` route and the WebSocket envelope.
    pub fn as_query(&self) -> QueryRequest<'_> {
        return QueryRequest {
            query: &self.text,
            chat_history: &self.chat_history,
        };
    }

    /// Body for `/v1/chat`, `/v1/chat/stream` and the relay routes.
    pub fn as_chat(&self) -> ChatRequest<'_> {
        return ChatRequest {
            message: &self.text,
            chat_history: &self.chat_history,
        };
    }
}

#[derive(Debug, Serialize)]
pub struct QueryRequest<'a> {
    pub query: &'a str,
    pub chat_history: &'a [Message],
}

#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub message: &'a str,
    pub chat_history: &'a [Message],
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
}

/// What the backend answered, decided by which field is present.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum BackendReply {
    Success { response: String },
    Failure { error: String },
}

impl BackendReply {
    pub fn parse(body: &[u8]) -> Result<BackendReply, DeliveryError> {
        return serde_json::from_slice::<BackendReply>(body)
            .map_err(|err| return DeliveryError::ParseFailure(err.to_string()));
    }

    pub fn into_result(self) -> Result<String, DeliveryError> {
        match self {
            BackendReply::Success { response } => return Ok(response),
            BackendReply::Failure { error } => return Err(DeliveryError::Rejected(error)),
        }
    }
}
