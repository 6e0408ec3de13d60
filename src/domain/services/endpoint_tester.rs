#[cfg(test)]
#[path = "endpoint_tester_test.rs"]
mod tests;

use std::time::Duration;
use std::time::Instant;

use anyhow::bail;
use anyhow::Result;
use futures::future::join_all;
use reqwest::header;
use serde_derive::Serialize;
use serde_json::json;
use serde_json::Value;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EndpointCandidate {
    pub name: String,
    pub url: String,
}

impl EndpointCandidate {
    pub fn new(name: &str, url: &str) -> EndpointCandidate {
        return EndpointCandidate {
            name: name.to_string(),
            url: url.to_string(),
        };
    }

    /// The relay route, then the agent's legacy and versioned chat routes.
    pub fn defaults(relay_url: &str, api_url: &str) -> Vec<EndpointCandidate> {
        let relay_url = relay_url.trim_end_matches('/');
        let api_url = api_url.trim_end_matches('/');

        return vec![
            EndpointCandidate::new("Relay", &format!("{relay_url}/api/chat")),
            EndpointCandidate::new("Agent", &format!("{api_url}/chat")),
            EndpointCandidate::new("Agent v1", &format!("{api_url}/v1/chat")),
        ];
    }

    /// Candidates given as bare URLs are named after themselves.
    pub fn from_urls(urls: &[String]) -> Vec<EndpointCandidate> {
        return urls
            .iter()
            .map(|url| return EndpointCandidate::new(url, url))
            .collect();
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, strum::Display)]
pub enum EndpointStatus {
    Success,
    Failed,
    Error,
}

#[derive(Clone, Debug, Serialize)]
pub struct EndpointReport {
    pub endpoint: String,
    pub url: String,
    pub status: EndpointStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip)]
    pub elapsed: Duration,
}

/// Sends the same test message to a list of chat endpoints to find out
/// which ones answer.
pub struct EndpointTester {
    candidates: Vec<EndpointCandidate>,
    client: reqwest::Client,
}

impl EndpointTester {
    pub fn new(candidates: Vec<EndpointCandidate>) -> EndpointTester {
        return EndpointTester {
            candidates,
            client: reqwest::Client::new(),
        };
    }

    #[allow(clippy::implicit_return)]
    async fn probe(&self, candidate: &EndpointCandidate, message: &str) -> EndpointReport {
        let started = Instant::now();
        let mut report = EndpointReport {
            endpoint: candidate.name.to_string(),
            url: candidate.url.to_string(),
            status: EndpointStatus::Error,
            response: None,
            error: None,
            elapsed: Duration::default(),
        };

        let res = self
            .client
            .post(&candidate.url)
            .json(&json!({ "message": message }))
            .send()
            .await;

        let res = match res {
            Ok(res) => res,
            Err(err) => {
                tracing::debug!(url = %candidate.url, error = ?err, "Endpoint unreachable");
                report.error = Some(err.to_string());
                report.elapsed = started.elapsed();
                return report;
            }
        };

        let status = res.status();
        if !status.is_success() {
            report.status = EndpointStatus::Failed;
            report.error = Some(format!(
                "HTTP {} - {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or_default()
            ));
            report.elapsed = started.elapsed();
            return report;
        }

        let is_json = res
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| return value.to_str().ok())
            .map(|value| return value.contains("application/json"))
            .unwrap_or(false);

        let text = match res.text().await {
            Ok(text) => text,
            Err(err) => {
                report.error = Some(err.to_string());
                report.elapsed = started.elapsed();
                return report;
            }
        };

        if !is_json {
            report.status = EndpointStatus::Success;
            report.response = Some(json!({ "rawText": text }));
            report.elapsed = started.elapsed();
            return report;
        }

        // A body declared as JSON that does not parse counts as an error.
        match serde_json::from_str::<Value>(&text) {
            Ok(value) => {
                report.status = EndpointStatus::Success;
                report.response = Some(value);
            }
            Err(err) => {
                report.error = Some(err.to_string());
            }
        }

        report.elapsed = started.elapsed();
        return report;
    }

    /// Probes every candidate at once. Reports keep the candidate order.
    #[allow(clippy::implicit_return)]
    pub async fn test_all(&self, message: &str) -> Vec<EndpointReport> {
        let probes = self
            .candidates
            .iter()
            .map(|candidate| return self.probe(candidate, message));

        return join_all(probes).await;
    }

    /// Tries candidates one after another and returns the first answer,
    /// parsed as JSON when possible and as a plain string otherwise.
    #[allow(clippy::implicit_return)]
    pub async fn first_success(&self, message: &str) -> Result<(EndpointCandidate, Value)> {
        for candidate in &self.candidates {
            tracing::debug!(url = %candidate.url, "Testing endpoint");
            let res = self
                .client
                .post(&candidate.url)
                .header(header::ACCEPT, "application/json")
                .json(&json!({ "message": message }))
                .send()
                .await;

            let res = match res {
                Ok(res) if res.status().is_success() => res,
                Ok(res) => {
                    tracing::debug!(url = %candidate.url, status = res.status().as_u16(), "Endpoint failed");
                    continue;
                }
                Err(err) => {
                    tracing::debug!(url = %candidate.url, error = ?err, "Endpoint unreachable");
                    continue;
                }
            };

            let text = match res.text().await {
                Ok(text) => text,
                Err(_) => continue,
            };

            let value = serde_json::from_str::<Value>(&text).unwrap_or(Value::String(text));
            return Ok((candidate.clone(), value));
        }

        bail!("All endpoints failed");
    }
}
