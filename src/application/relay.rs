#[cfg(test)]
#[path = "relay_test.rs"]
mod tests;

use anyhow::Result;
use axum::body::Body;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::header;
use axum::http::HeaderMap;
use axum::http::HeaderValue;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use axum::routing::post;
use axum::Json;
use axum::Router;
use serde_derive::Deserialize;
use serde_derive::Serialize;
use serde_json::json;
use serde_json::Value;
use tokio::net::TcpListener;

use crate::domain::models::ChatResponse;
use crate::infrastructure::backends::AgentBackend;

const STREAM_UNAVAILABLE: &str = "Streaming unavailable";
const INVALID_BODY: &str = "Invalid request body";

#[derive(Clone)]
pub struct RelayState {
    backend: AgentBackend,
}

/// Body accepted from the browser side. Both fields are forwarded as-is
/// and dropped from the backend request when absent.
#[derive(Debug, Serialize, Deserialize)]
pub struct RelayChatRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    message: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    chat_history: Option<Value>,
}

pub fn router(backend: AgentBackend) -> Router {
    return Router::new()
        .route("/api/chat", post(chat))
        .route("/api/chat/stream", post(chat_stream))
        .route("/api/context", get(context_get).post(context_post))
        .with_state(RelayState { backend });
}

pub async fn serve(listen: &str, backend: AgentBackend) -> Result<()> {
    let listener = TcpListener::bind(listen).await?;
    tracing::info!(
        addr = %listener.local_addr()?,
        backend = backend.url(),
        "Relay listening"
    );

    axum::serve(listener, router(backend))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    return Ok(());
}

/// Reads the body as JSON whatever `Content-Type` the caller sent.
fn parse_chat_body(body: &Bytes) -> Result<RelayChatRequest, Response> {
    return serde_json::from_slice::<RelayChatRequest>(body).map_err(|err| {
        tracing::warn!(error = %err, "Relay received an invalid body");
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": INVALID_BODY })),
        )
            .into_response();
    });
}

fn wants_stream(headers: &HeaderMap) -> bool {
    return headers
        .get(header::ACCEPT)
        .and_then(|value| return value.to_str().ok())
        .map(|value| return value.contains("text/plain"))
        .unwrap_or(false);
}

async fn chat(
    State(state): State<RelayState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let body = match parse_chat_body(&body) {
        Ok(body) => body,
        Err(res) => return res,
    };
    tracing::debug!(text = ?body.message, "Relay received message");

    if wants_stream(&headers) {
        return stream_reply(&state.backend, &body).await;
    }

    return json_reply(&state.backend, &body).await;
}

async fn chat_stream(State(state): State<RelayState>, body: Bytes) -> Response {
    let body = match parse_chat_body(&body) {
        Ok(body) => body,
        Err(res) => return res,
    };
    return stream_reply(&state.backend, &body).await;
}

async fn json_reply(backend: &AgentBackend, body: &RelayChatRequest) -> Response {
    let res = match backend.chat(body).await {
        Ok(res) => res,
        Err(err) => {
            tracing::error!(error = ?err, "Backend chat request failed");
            return (StatusCode::BAD_GATEWAY, "Backend unavailable").into_response();
        }
    };

    if !res.status().is_success() {
        let status =
            StatusCode::from_u16(res.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
        tracing::error!(status = status.as_u16(), "Backend chat request failed");
        let text = res.text().await.unwrap_or_default();
        return (status, text).into_response();
    }

    match res.json::<ChatResponse>().await {
        Ok(reply) => {
            return Json(ChatResponse {
                response: reply.response,
            })
            .into_response();
        }
        Err(err) => {
            tracing::error!(error = ?err, "Backend chat response was not valid");
            return (StatusCode::BAD_GATEWAY, "Invalid backend response").into_response();
        }
    }
}

/// Pipes the backend body through chunk by chunk, without looking at it.
async fn stream_reply(backend: &AgentBackend, body: &RelayChatRequest) -> Response {
    let res = match backend.chat_stream(body).await {
        Ok(res) if res.status().is_success() => res,
        Ok(res) => {
            tracing::error!(status = res.status().as_u16(), "Backend stream request failed");
            return (StatusCode::INTERNAL_SERVER_ERROR, STREAM_UNAVAILABLE).into_response();
        }
        Err(err) => {
            tracing::error!(error = ?err, "Backend stream request failed");
            return (StatusCode::INTERNAL_SERVER_ERROR, STREAM_UNAVAILABLE).into_response();
        }
    };

    let mut response = Response::new(Body::from_stream(res.bytes_stream()));
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );

    return response;
}

async fn context_get() -> Json<Value> {
    return Json(json!({
        "context": {
            "recentTopics": [],
            "preferences": {},
        }
    }));
}

// Placeholder: acknowledges the context without sending it anywhere.
async fn context_post(body: Bytes) -> Response {
    if let Err(err) = serde_json::from_slice::<Value>(&body) {
        tracing::error!(error = %err, "Error processing context");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to process context" })),
        )
            .into_response();
    }

    return Json(json!({
        "success": true,
        "message": "Context received",
    }))
    .into_response();
}
