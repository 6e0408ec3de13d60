#[cfg(test)]
#[path = "probe_test.rs"]
mod tests;

use anyhow::Result;
use tokio::sync::mpsc;

use crate::domain::models::ApiStatus;
use crate::domain::models::Event;
use crate::infrastructure::backends::AgentBackend;

pub struct ConnectionProbe {
    backend: AgentBackend,
}

impl ConnectionProbe {
    pub fn new(backend: AgentBackend) -> ConnectionProbe {
        return ConnectionProbe { backend };
    }

    pub fn url(&self) -> &str {
        return self.backend.url();
    }

    #[allow(clippy::implicit_return)]
    pub async fn check(&self) -> ApiStatus {
        if self.backend.health_check().await.is_err() {
            return ApiStatus::Disconnected;
        }

        return ApiStatus::Connected;
    }

    /// Reports `Checking` straight away, then the outcome.
    #[allow(clippy::implicit_return)]
    pub async fn run(&self, tx: &mpsc::UnboundedSender<Event>) -> Result<ApiStatus> {
        tx.send(Event::ApiStatus(ApiStatus::Checking))?;
        let status = self.check().await;
        tx.send(Event::ApiStatus(status))?;

        return Ok(status);
    }
}
