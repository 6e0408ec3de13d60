#[cfg(test)]
#[path = "websocket_test.rs"]
mod tests;

use std::time::Duration;

use async_trait::async_trait;
use futures::SinkExt;
use futures::StreamExt;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::MaybeTlsStream;
use tokio_tungstenite::WebSocketStream;

use crate::domain::models::BackendReply;
use crate::domain::models::DeliveryError;
use crate::domain::models::Event;
use crate::domain::models::OutgoingRequest;
use crate::domain::models::Transport;
use crate::domain::models::TransportKind;

fn convert_err(err: tokio_tungstenite::tungstenite::Error) -> DeliveryError {
    return DeliveryError::ConnectionFailure(err.to_string());
}

/// Persistent-connection delivery. A connection is opened for one envelope
/// and one reply, then closed. It is never reused for another turn.
pub struct WebSocket {
    url: String,
    timeout: Duration,
    stream: Option<WebSocketStream<MaybeTlsStream<TcpStream>>>,
}

impl WebSocket {
    pub fn new(url: &str, timeout: Duration) -> WebSocket {
        return WebSocket {
            url: url.to_string(),
            timeout,
            stream: None,
        };
    }

    pub fn is_open(&self) -> bool {
        return self.stream.is_some();
    }

    async fn exchange(&mut self, request: &OutgoingRequest) -> Result<String, DeliveryError> {
        let (stream, _) = connect_async(self.url.as_str()).await.map_err(convert_err)?;
        let stream = self.stream.insert(stream);
        tracing::debug!(url = %self.url, "WebSocket opened, sending message");

        let envelope = serde_json::to_string(&request.as_query())
            .map_err(|err| return DeliveryError::ParseFailure(err.to_string()))?;
        stream
            .send(WsMessage::Text(envelope))
            .await
            .map_err(convert_err)?;

        while let Some(frame) = stream.next().await {
            match frame.map_err(convert_err)? {
                WsMessage::Text(text) => {
                    return BackendReply::parse(text.as_bytes())?.into_result();
                }
                WsMessage::Binary(bytes) => {
                    return BackendReply::parse(&bytes)?.into_result();
                }
                WsMessage::Close(_) => break,
                _ => continue,
            }
        }

        return Err(DeliveryError::ConnectionFailure(
            "WebSocket closed before a reply arrived".to_string(),
        ));
    }
}

#[async_trait]
impl Transport for WebSocket {
    fn kind(&self) -> TransportKind {
        return TransportKind::WebSocket;
    }

    #[allow(clippy::implicit_return)]
    async fn send<'a>(
        &mut self,
        request: &OutgoingRequest,
        _tx: &'a mpsc::UnboundedSender<Event>,
    ) -> Result<String, DeliveryError> {
        let timeout = self.timeout;
        let res = time::timeout(timeout, self.exchange(request)).await;

        // Whatever happened, this connection has served its one reply. A
        // reply arriving after the timeout lands on a closed socket.
        self.close().await;

        match res {
            Ok(reply) => return reply,
            Err(_) => {
                tracing::warn!(url = %self.url, timeout_ms = timeout.as_millis() as u64, "WebSocket request timed out");
                return Err(DeliveryError::Timeout(timeout));
            }
        }
    }

    async fn close(&mut self) {
        if !self.is_open() {
            return;
        }

        if let Some(mut stream) = self.stream.take() {
            if let Err(err) = stream.close(None).await {
                tracing::debug!(error = ?err, "WebSocket did not close cleanly");
            }
        }
    }
}
