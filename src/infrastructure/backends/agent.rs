#[cfg(test)]
#[path = "agent_test.rs"]
mod tests;

use std::time::Duration;

use anyhow::bail;
use anyhow::Result;
use serde::Serialize;

use crate::configuration::Config;
use crate::configuration::ConfigKey;

/// HTTP client for the hosted agent service.
#[derive(Clone)]
pub struct AgentBackend {
    url: String,
    timeout: String,
    client: reqwest::Client,
}

impl Default for AgentBackend {
    fn default() -> AgentBackend {
        return AgentBackend::new(
            &Config::get(ConfigKey::ApiURL),
            &Config::get(ConfigKey::HealthCheckTimeout),
        );
    }
}

impl AgentBackend {
    pub fn new(url: &str, timeout: &str) -> AgentBackend {
        return AgentBackend {
            url: url.trim_end_matches('/').to_string(),
            timeout: timeout.to_string(),
            client: reqwest::Client::new(),
        };
    }

    pub fn url(&self) -> &str {
        return &self.url;
    }

    #[allow(clippy::implicit_return)]
    pub async fn health_check(&self) -> Result<()> {
        if self.url.is_empty() {
            bail!("Agent API URL is not defined");
        }

        let res = self
            .client
            .get(format!("{url}/", url = self.url))
            .timeout(Duration::from_millis(self.timeout.parse::<u64>()?))
            .send()
            .await;

        let res = match res {
            Ok(res) => res,
            Err(err) => {
                tracing::error!(error = ?err, "Agent API is not reachable");
                bail!("Agent API is not reachable");
            }
        };

        if !res.status().is_success() {
            let status = res.status().as_u16();
            tracing::error!(status = status, "Agent API health check failed");
            bail!(format!("Agent API health check failed with status {status}"));
        }

        return Ok(());
    }

    /// Single blocking completion from `/v1/chat`. The response is handed
    /// back untouched so callers decide how to treat its status and body.
    #[allow(clippy::implicit_return)]
    pub async fn chat<T: Serialize + ?Sized>(&self, body: &T) -> reqwest::Result<reqwest::Response> {
        return self
            .client
            .post(format!("{url}/v1/chat", url = self.url))
            .json(body)
            .send()
            .await;
    }

    /// Streaming completion from `/v1/chat/stream`.
    #[allow(clippy::implicit_return)]
    pub async fn chat_stream<T: Serialize + ?Sized>(
        &self,
        body: &T,
    ) -> reqwest::Result<reqwest::Response> {
        return self
            .client
            .post(format!("{url}/v1/chat/stream", url = self.url))
            .json(body)
            .send()
            .await;
    }
}
