#[cfg(test)]
#[path = "delivery_test.rs"]
mod tests;

use tokio::sync::mpsc;

use crate::domain::models::DeliveryError;
use crate::domain::models::Event;
use crate::domain::models::Message;
use crate::domain::models::MessageType;
use crate::domain::models::OutgoingRequest;
use crate::domain::models::Role;
use crate::domain::models::TransportKind;
use crate::infrastructure::transports::TransportManager;
use crate::infrastructure::transports::TransportSettings;

pub const DELIVERY_FAILED_TEXT: &str =
    "Sorry, there was an error processing your request. Please try again.";

pub fn delivery_failed_message() -> Message {
    return Message::new_with_type(Role::Assistant, MessageType::Error, DELIVERY_FAILED_TEXT);
}

/// Turns one outgoing request into exactly one assistant message. The
/// primary transport gets one attempt, its fallback (if any) gets one more,
/// and anything past that becomes a local error message.
#[derive(Clone, Debug)]
pub struct DeliveryController {
    primary: TransportKind,
    settings: TransportSettings,
}

impl DeliveryController {
    pub fn new(primary: TransportKind, settings: TransportSettings) -> DeliveryController {
        return DeliveryController { primary, settings };
    }

    #[allow(clippy::implicit_return)]
    async fn attempt(
        &self,
        kind: TransportKind,
        request: &OutgoingRequest,
        tx: &mpsc::UnboundedSender<Event>,
    ) -> Result<String, DeliveryError> {
        let mut transport = TransportManager::get(kind, &self.settings);
        tracing::debug!(transport = %transport.kind(), text = %request.text, "Delivering message");
        let res = transport.send(request, tx).await;
        transport.close().await;

        return res;
    }

    #[allow(clippy::implicit_return)]
    pub async fn deliver(
        &self,
        request: &OutgoingRequest,
        tx: &mpsc::UnboundedSender<Event>,
    ) -> Message {
        let err = match self.attempt(self.primary, request, tx).await {
            Ok(text) => return Message::new(Role::Assistant, &text),
            Err(err) => err,
        };

        tracing::warn!(transport = %self.primary, error = %err, "Delivery attempt failed");

        if let Some(fallback) = self.primary.fallback() {
            tracing::warn!(from = %self.primary, to = %fallback, "Falling back");
            match self.attempt(fallback, request, tx).await {
                Ok(text) => return Message::new(Role::Assistant, &text),
                Err(err) => {
                    tracing::warn!(transport = %fallback, error = %err, "Fallback attempt failed");
                }
            }
        }

        return delivery_failed_message();
    }
}
