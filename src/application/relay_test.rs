use std::time::Duration;

use axum::body::Body;
use axum::http::Request;
use axum::http::StatusCode;
use axum::Router;
use mockito::Matcher;
use serde_json::json;
use tokio::io::AsyncReadExt;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::time;
use tower::ServiceExt;

use super::router;
use crate::infrastructure::backends::AgentBackend;

fn relay(url: &str) -> Router {
    return router(AgentBackend::new(url, "200"));
}

fn post(uri: &str, accept: Option<&str>, body: &str) -> Request<Body> {
    let mut req = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(accept) = accept {
        req = req.header("accept", accept);
    }

    return req.body(Body::from(body.to_string())).unwrap();
}

async fn body_text(res: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    return String::from_utf8(bytes.to_vec()).unwrap();
}

fn content_type(res: &axum::response::Response) -> String {
    return res
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
}

#[tokio::test]
async fn it_rewraps_json_replies() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/chat")
        .match_body(Matcher::Json(json!({ "message": "Hi" })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"response": "Hello", "sources": ["a.md"]}"#)
        .create_async()
        .await;

    let res = relay(&server.url())
        .oneshot(post("/api/chat", None, r#"{"message": "Hi"}"#))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(content_type(&res).starts_with("application/json"));
    assert_eq!(body_text(res).await, r#"{"response":"Hello"}"#);
}

#[tokio::test]
async fn it_forwards_chat_history() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/chat")
        .match_body(Matcher::Json(json!({
            "message": "And 3+3?",
            "chat_history": [{"role": "user", "content": "What is 2+2?"}],
        })))
        .with_status(200)
        .with_body(r#"{"response": "6"}"#)
        .create_async()
        .await;

    let body = r#"{"message": "And 3+3?", "chat_history": [{"role": "user", "content": "What is 2+2?"}]}"#;
    let res = relay(&server.url())
        .oneshot(post("/api/chat", Some("application/json"), body))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(body_text(res).await, r#"{"response":"6"}"#);
}

#[tokio::test]
async fn it_propagates_backend_failures_in_json_mode() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/chat")
        .with_status(404)
        .with_body("no such agent")
        .create_async()
        .await;

    let res = relay(&server.url())
        .oneshot(post("/api/chat", None, r#"{"message": "Hi"}"#))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_text(res).await, "no such agent");
}

#[tokio::test]
async fn it_rejects_unparseable_backend_replies() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/chat")
        .with_status(200)
        .with_body("<html></html>")
        .create_async()
        .await;

    let res = relay(&server.url())
        .oneshot(post("/api/chat", None, r#"{"message": "Hi"}"#))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn it_reports_unreachable_backends_in_json_mode() {
    let res = relay("http://127.0.0.1:1")
        .oneshot(post("/api/chat", None, r#"{"message": "Hi"}"#))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(body_text(res).await, "Backend unavailable");
}

#[tokio::test]
async fn it_streams_when_plain_text_is_accepted() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/chat/stream")
        .match_body(Matcher::Json(json!({ "message": "Hi" })))
        .with_status(200)
        .with_body("Hello World")
        .create_async()
        .await;

    let res = relay(&server.url())
        .oneshot(post("/api/chat", Some("text/plain"), r#"{"message": "Hi"}"#))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(content_type(&res), "text/plain; charset=utf-8");
    assert_eq!(body_text(res).await, "Hello World");
}

#[tokio::test]
async fn it_always_streams_on_the_stream_route() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/chat/stream")
        .with_status(200)
        .with_body("chunk one, chunk two")
        .create_async()
        .await;

    let res = relay(&server.url())
        .oneshot(post(
            "/api/chat/stream",
            Some("application/json"),
            r#"{"message": "Hi", "chat_history": []}"#,
        ))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(content_type(&res), "text/plain; charset=utf-8");
    assert_eq!(body_text(res).await, "chunk one, chunk two");
}

#[tokio::test]
async fn it_fails_streams_on_backend_errors() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/chat/stream")
        .with_status(502)
        .create_async()
        .await;

    let res = relay(&server.url())
        .oneshot(post("/api/chat/stream", None, r#"{"message": "Hi"}"#))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_text(res).await, "Streaming unavailable");
}

#[tokio::test]
async fn it_fails_streams_on_unreachable_backends() {
    let res = relay("http://127.0.0.1:1")
        .oneshot(post("/api/chat", Some("text/plain"), r#"{"message": "Hi"}"#))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_text(res).await, "Streaming unavailable");
}

#[tokio::test]
async fn it_relays_bodies_sent_without_a_json_content_type() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/chat")
        .match_body(Matcher::Json(json!({ "message": "Hi" })))
        .with_status(200)
        .with_body(r#"{"response": "Hello"}"#)
        .create_async()
        .await;

    let req = Request::builder()
        .method("POST")
        .uri("/api/chat")
        .header("content-type", "text/plain")
        .body(Body::from(r#"{"message": "Hi"}"#))
        .unwrap();
    let res = relay(&server.url()).oneshot(req).await.unwrap();

    mock.assert_async().await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_text(res).await, r#"{"response":"Hello"}"#);
}

#[tokio::test]
async fn it_streams_bodies_without_a_message() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/chat/stream")
        .match_body(Matcher::Json(json!({ "chat_history": [] })))
        .with_status(200)
        .with_body("streamed")
        .create_async()
        .await;

    let res = relay(&server.url())
        .oneshot(post("/api/chat/stream", None, r#"{"chat_history": []}"#))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_text(res).await, "streamed");
}

#[tokio::test]
async fn it_rejects_chat_bodies_that_are_not_json() {
    let res = relay("http://127.0.0.1:1")
        .oneshot(post("/api/chat", None, "not json"))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = serde_json::from_str(&body_text(res).await).unwrap();
    assert_eq!(body, json!({ "error": "Invalid request body" }));
}

#[tokio::test]
async fn it_returns_placeholder_context() {
    let req = Request::builder()
        .uri("/api/context")
        .body(Body::empty())
        .unwrap();
    let res = relay("http://127.0.0.1:1").oneshot(req).await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(
        body_text(res).await,
        r#"{"context":{"preferences":{},"recentTopics":[]}}"#
    );
}

#[tokio::test]
async fn it_acknowledges_context() {
    let res = relay("http://127.0.0.1:1")
        .oneshot(post("/api/context", None, r#"{"messages": []}"#))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&body_text(res).await).unwrap();
    assert_eq!(body, json!({ "success": true, "message": "Context received" }));
}

#[tokio::test]
async fn it_fails_on_invalid_context() {
    let res = relay("http://127.0.0.1:1")
        .oneshot(post("/api/context", None, "not json"))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = serde_json::from_str(&body_text(res).await).unwrap();
    assert_eq!(body, json!({ "error": "Failed to process context" }));
}

/// Backend that sends its first chunk, then holds the response open until
/// told to finish.
async fn slow_stream_backend() -> (String, oneshot::Sender<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    let (finish_tx, finish_rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();

        let mut request = vec![];
        let mut buf = [0u8; 1024];
        loop {
            let read = socket.read(&mut buf).await.unwrap();
            request.extend_from_slice(&buf[..read]);
            let text = String::from_utf8_lossy(&request).to_string();
            if let Some(headers_end) = text.find("\r\n\r\n") {
                let content_length = text[..headers_end]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        if name.eq_ignore_ascii_case("content-length") {
                            return value.trim().parse::<usize>().ok();
                        }
                        return None;
                    })
                    .unwrap_or(0);
                if request.len() >= headers_end + 4 + content_length {
                    break;
                }
            }
            if read == 0 {
                break;
            }
        }

        socket
            .write_all(b"HTTP/1.1 200 OK\r\ncontent-type: text/plain\r\ntransfer-encoding: chunked\r\n\r\n6\r\nHello \r\n")
            .await
            .unwrap();
        socket.flush().await.unwrap();

        let _ = finish_rx.await;
        socket
            .write_all(b"5\r\nWorld\r\n0\r\n\r\n")
            .await
            .unwrap();
        socket.flush().await.unwrap();
    });

    return (url, finish_tx);
}

#[tokio::test]
async fn it_forwards_bytes_before_the_backend_finishes() {
    let (backend_url, finish_tx) = slow_stream_backend().await;

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let relay_url = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(async move {
        axum::serve(listener, relay(&backend_url)).await.unwrap();
    });

    let mut res = reqwest::Client::new()
        .post(format!("{relay_url}/api/chat"))
        .header("accept", "text/plain")
        .json(&json!({ "message": "Hi" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 200);

    // The backend is still holding the rest of the reply.
    let first = time::timeout(Duration::from_secs(5), res.chunk())
        .await
        .expect("first chunk was buffered")
        .unwrap()
        .unwrap();
    assert_eq!(&first[..], b"Hello ");

    finish_tx.send(()).unwrap();
    let mut rest = vec![];
    while let Some(chunk) = res.chunk().await.unwrap() {
        rest.extend_from_slice(&chunk);
    }
    assert_eq!(rest, b"World");
}
