#[cfg(test)]
#[path = "stream_test.rs"]
mod tests;

use async_trait::async_trait;
use futures::stream::TryStreamExt;
use reqwest::header;
use tokio::io::AsyncReadExt;
use tokio::sync::mpsc;
use tokio_util::io::StreamReader;

use crate::domain::models::DeliveryError;
use crate::domain::models::Event;
use crate::domain::models::OutgoingRequest;
use crate::domain::models::Transport;
use crate::domain::models::TransportKind;

fn convert_err(err: reqwest::Error) -> std::io::Error {
    let err_msg = err.to_string();
    return std::io::Error::new(std::io::ErrorKind::Interrupted, err_msg);
}

/// Decodes UTF-8 from a byte stream whose chunk boundaries may split a
/// character in two.
#[derive(Default)]
pub struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    pub fn push(&mut self, bytes: &[u8]) -> String {
        self.pending.extend_from_slice(bytes);

        let valid_up_to = match std::str::from_utf8(&self.pending) {
            Ok(_) => self.pending.len(),
            // An incomplete sequence at the very end waits for the next chunk.
            Err(err) if err.error_len().is_none() => err.valid_up_to(),
            Err(_) => self.pending.len(),
        };

        let text = String::from_utf8_lossy(&self.pending[..valid_up_to]).to_string();
        self.pending.drain(..valid_up_to);
        return text;
    }

    pub fn finish(&mut self) -> String {
        let text = String::from_utf8_lossy(&self.pending).to_string();
        self.pending.clear();
        return text;
    }
}

/// Streams a reply through the relay, forwarding every decoded piece to the
/// UI as it arrives.
pub struct RelayStream {
    url: String,
    client: reqwest::Client,
}

impl RelayStream {
    pub fn new(relay_url: &str) -> RelayStream {
        return RelayStream {
            url: format!("{}/api/chat/stream", relay_url.trim_end_matches('/')),
            client: reqwest::Client::new(),
        };
    }
}

#[async_trait]
impl Transport for RelayStream {
    fn kind(&self) -> TransportKind {
        return TransportKind::Stream;
    }

    #[allow(clippy::implicit_return)]
    async fn send<'a>(
        &mut self,
        request: &OutgoingRequest,
        tx: &'a mpsc::UnboundedSender<Event>,
    ) -> Result<String, DeliveryError> {
        let res = self
            .client
            .post(&self.url)
            .header(header::ACCEPT, "text/plain")
            .json(&request.as_chat())
            .send()
            .await;

        let res = match res {
            Ok(res) if res.status().is_success() => res,
            Ok(res) => {
                tracing::error!(status = res.status().as_u16(), url = %self.url, "Streaming request failed");
                return Err(DeliveryError::StreamUnavailable);
            }
            Err(err) => {
                tracing::error!(error = ?err, url = %self.url, "Streaming request failed");
                return Err(DeliveryError::StreamUnavailable);
            }
        };

        let stream = res.bytes_stream().map_err(convert_err);
        let mut reader = StreamReader::new(stream);
        let mut decoder = Utf8Decoder::default();
        let mut reply = String::new();
        let mut buf = vec![0u8; 8 * 1024];

        loop {
            let read = reader
                .read(&mut buf)
                .await
                .map_err(|err| return DeliveryError::ConnectionFailure(err.to_string()))?;
            let text = if read == 0 {
                decoder.finish()
            } else {
                decoder.push(&buf[..read])
            };

            if !text.is_empty() {
                reply.push_str(&text);
                // The UI may already be gone, the reply is still returned.
                let _ = tx.send(Event::DeliveryChunk(text));
            }

            if read == 0 {
                break;
            }
        }

        return Ok(reply);
    }

    async fn close(&mut self) {}
}
