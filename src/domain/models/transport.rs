#[cfg(test)]
#[path = "transport_test.rs"]
mod tests;

use async_trait::async_trait;
use strum::EnumIter;
use strum::EnumVariantNames;
use strum::IntoEnumIterator;
use tokio::sync::mpsc;

use super::DeliveryError;
use super::Event;
use super::OutgoingRequest;

#[derive(Copy, Clone, Debug, PartialEq, Eq, EnumIter, EnumVariantNames, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum TransportKind {
    WebSocket,
    Http,
    Stream,
}

impl TransportKind {
    pub fn parse(text: &str) -> Option<TransportKind> {
        return TransportKind::iter().find(|e| return e.to_string() == text);
    }

    /// Transport to try once more with when this one fails as the primary.
    pub fn fallback(&self) -> Option<TransportKind> {
        if *self == TransportKind::WebSocket {
            return Some(TransportKind::Http);
        }

        return None;
    }
}

/// Backend route used by the HTTP transport.
#[derive(Copy, Clone, Debug, PartialEq, Eq, EnumIter, EnumVariantNames, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum HttpRoute {
    Query,
    Chat,
    Relay,
}

impl HttpRoute {
    pub fn parse(text: &str) -> Option<HttpRoute> {
        return HttpRoute::iter().find(|e| return e.to_string() == text);
    }

    pub fn path(&self) -> &'static str {
        match self {
            HttpRoute::Query => return "/query",
            HttpRoute::Chat => return "/v1/chat",
            HttpRoute::Relay => return "/api/chat",
        }
    }
}

#[async_trait]
pub trait Transport {
    fn kind(&self) -> TransportKind;

    /// Delivers one request and waits for its one reply. Transports that
    /// receive the reply in pieces forward each piece through `tx` as
    /// `Event::DeliveryChunk` before returning the full text.
    ///
    /// Exactly one outcome is reported per call, and no transport retries
    /// on its own.
    async fn send<'a>(
        &mut self,
        request: &OutgoingRequest,
        tx: &'a mpsc::UnboundedSender<Event>,
    ) -> Result<String, DeliveryError>;

    /// Releases whatever the transport still holds. Safe to call more than
    /// once.
    async fn close(&mut self);
}

pub type TransportBox = Box<dyn Transport + Send>;
