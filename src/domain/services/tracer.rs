#[cfg(test)]
#[path = "tracer_test.rs"]
mod tests;

use std::collections::BTreeMap;
use std::time::Instant;

use reqwest::header;
use reqwest::Method;
use serde_json::json;
use serde_json::Value;

use crate::domain::models::TraceEntry;
use crate::domain::models::TraceKind;

/// One hand-built request to replay against an endpoint.
#[derive(Clone, Debug)]
pub struct TraceRequest {
    pub endpoint: String,
    pub method: String,
    pub content_type: String,
    pub accept: String,
    pub body: String,
}

impl Default for TraceRequest {
    fn default() -> TraceRequest {
        return TraceRequest {
            endpoint: "http://localhost:3000/api/chat".to_string(),
            method: "POST".to_string(),
            content_type: "application/json".to_string(),
            accept: "application/json".to_string(),
            body: r#"{"message":"Hello, this is a test message"}"#.to_string(),
        };
    }
}

/// Sends a single request and records every step of it as a timeline.
pub struct Tracer {
    client: reqwest::Client,
}

impl Default for Tracer {
    fn default() -> Tracer {
        return Tracer {
            client: reqwest::Client::new(),
        };
    }
}

impl Tracer {
    #[allow(clippy::implicit_return)]
    pub async fn trace(&self, request: &TraceRequest) -> Vec<TraceEntry> {
        let mut entries = vec![TraceEntry::new(
            TraceKind::Request,
            json!({
                "endpoint": request.endpoint,
                "method": request.method,
                "headers": {
                    "Content-Type": request.content_type,
                    "Accept": request.accept,
                },
                "body": request.body,
            }),
        )];

        let body = match serde_json::from_str::<Value>(&request.body) {
            Ok(body) => body,
            Err(err) => {
                entries.push(TraceEntry::new(
                    TraceKind::Error,
                    json!({
                        "message": "Failed to parse request body as JSON",
                        "error": err.to_string(),
                    }),
                ));
                json!({ "error": "Invalid JSON in request body", "raw": request.body })
            }
        };

        let method = match Method::from_bytes(request.method.to_uppercase().as_bytes()) {
            Ok(method) => method,
            Err(err) => {
                entries.push(TraceEntry::new(
                    TraceKind::Error,
                    json!({ "message": "Invalid request method", "error": err.to_string() }),
                ));
                return entries;
            }
        };

        entries.push(TraceEntry::new(
            TraceKind::Info,
            json!({ "message": format!("Sending request to {}...", request.endpoint) }),
        ));

        let started = Instant::now();
        let res = self
            .client
            .request(method, &request.endpoint)
            .header(header::CONTENT_TYPE, &request.content_type)
            .header(header::ACCEPT, &request.accept)
            .body(body.to_string())
            .send()
            .await;
        let elapsed = started.elapsed();

        let res = match res {
            Ok(res) => res,
            Err(err) => {
                tracing::debug!(endpoint = %request.endpoint, error = ?err, "Trace request failed");
                entries.push(TraceEntry::new(
                    TraceKind::Error,
                    json!({ "message": "Request error", "error": err.to_string() }),
                ));
                return entries;
            }
        };

        let headers = res
            .headers()
            .iter()
            .map(|(name, value)| {
                return (
                    name.to_string(),
                    String::from_utf8_lossy(value.as_bytes()).to_string(),
                );
            })
            .collect::<BTreeMap<String, String>>();

        entries.push(TraceEntry::new(
            TraceKind::Response,
            json!({
                "status": res.status().as_u16(),
                "statusText": res.status().canonical_reason().unwrap_or_default(),
                "headers": headers,
                "duration": format!("{:.2}ms", elapsed.as_secs_f64() * 1000.0),
            }),
        ));

        let is_json = headers
            .get(header::CONTENT_TYPE.as_str())
            .map(|value| return value.contains("application/json"))
            .unwrap_or(false);

        let entry = match res.text().await {
            Ok(text) if is_json => match serde_json::from_str::<Value>(&text) {
                Ok(value) => TraceEntry::new(TraceKind::Data, json!({ "responseBody": value })),
                Err(err) => TraceEntry::new(
                    TraceKind::Error,
                    json!({
                        "message": "Failed to parse response as JSON",
                        "error": err.to_string(),
                    }),
                ),
            },
            Ok(text) => TraceEntry::new(TraceKind::Data, json!({ "responseBody": text })),
            Err(err) => TraceEntry::new(
                TraceKind::Error,
                json!({
                    "message": "Failed to read response body",
                    "error": err.to_string(),
                }),
            ),
        };
        entries.push(entry);

        return entries;
    }
}
