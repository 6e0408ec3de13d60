#[cfg(test)]
#[path = "http_test.rs"]
mod tests;

use async_trait::async_trait;
use reqwest::header;
use tokio::sync::mpsc;

use crate::domain::models::BackendReply;
use crate::domain::models::DeliveryError;
use crate::domain::models::Event;
use crate::domain::models::HttpRoute;
use crate::domain::models::OutgoingRequest;
use crate::domain::models::Transport;
use crate::domain::models::TransportKind;

/// Plain request/response delivery: one POST, one JSON reply.
pub struct Http {
    url: String,
    route: HttpRoute,
    client: reqwest::Client,
}

impl Http {
    pub fn new(base_url: &str, route: HttpRoute) -> Http {
        return Http {
            url: format!("{}{}", base_url.trim_end_matches('/'), route.path()),
            route,
            client: reqwest::Client::new(),
        };
    }
}

#[async_trait]
impl Transport for Http {
    fn kind(&self) -> TransportKind {
        return TransportKind::Http;
    }

    #[allow(clippy::implicit_return)]
    async fn send<'a>(
        &mut self,
        request: &OutgoingRequest,
        _tx: &'a mpsc::UnboundedSender<Event>,
    ) -> Result<String, DeliveryError> {
        let req = self
            .client
            .post(&self.url)
            .header(header::ACCEPT, "application/json");

        let req = match self.route {
            HttpRoute::Query => req.json(&request.as_query()),
            HttpRoute::Chat | HttpRoute::Relay => req.json(&request.as_chat()),
        };

        tracing::debug!(url = %self.url, route = %self.route, "Sending request");
        let res = req
            .send()
            .await
            .map_err(|err| return DeliveryError::ConnectionFailure(err.to_string()))?;

        let status = res.status();
        if !status.is_success() {
            tracing::error!(status = status.as_u16(), url = %self.url, "Request failed");
            return Err(DeliveryError::HttpError {
                status: status.as_u16(),
            });
        }

        let body = res.bytes().await?;
        return BackendReply::parse(&body)?.into_result();
    }

    async fn close(&mut self) {}
}
