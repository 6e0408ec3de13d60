use serde_json::json;

use super::EndpointCandidate;
use super::EndpointStatus;
use super::EndpointTester;

#[test]
fn it_builds_default_candidates() {
    let candidates = EndpointCandidate::defaults("http://localhost:3000/", "http://localhost:8080");
    let urls = candidates
        .iter()
        .map(|candidate| return candidate.url.as_str())
        .collect::<Vec<&str>>();

    assert_eq!(
        urls,
        vec![
            "http://localhost:3000/api/chat",
            "http://localhost:8080/chat",
            "http://localhost:8080/v1/chat",
        ]
    );
}

#[tokio::test]
async fn it_reports_every_candidate() {
    let mut server = mockito::Server::new_async().await;
    let json_mock = server
        .mock("POST", "/json")
        .match_body(mockito::Matcher::Json(json!({ "message": "ping" })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"response": "pong"}"#)
        .create_async()
        .await;
    let text_mock = server
        .mock("POST", "/text")
        .with_status(200)
        .with_header("content-type", "text/plain")
        .with_body("pong")
        .create_async()
        .await;
    let missing_mock = server
        .mock("POST", "/missing")
        .with_status(404)
        .create_async()
        .await;

    let tester = EndpointTester::new(vec![
        EndpointCandidate::new("json", &format!("{}/json", server.url())),
        EndpointCandidate::new("text", &format!("{}/text", server.url())),
        EndpointCandidate::new("missing", &format!("{}/missing", server.url())),
        EndpointCandidate::new("refused", "http://127.0.0.1:1/chat"),
    ]);
    let reports = tester.test_all("ping").await;

    json_mock.assert_async().await;
    text_mock.assert_async().await;
    missing_mock.assert_async().await;

    let statuses = reports
        .iter()
        .map(|report| return report.status)
        .collect::<Vec<EndpointStatus>>();
    assert_eq!(
        statuses,
        vec![
            EndpointStatus::Success,
            EndpointStatus::Success,
            EndpointStatus::Failed,
            EndpointStatus::Error,
        ]
    );
    assert_eq!(reports[0].response, Some(json!({ "response": "pong" })));
    assert_eq!(reports[1].response, Some(json!({ "rawText": "pong" })));
    assert_eq!(reports[2].error, Some("HTTP 404 - Not Found".to_string()));
    assert!(reports[3].error.is_some());
}

#[tokio::test]
async fn it_reports_errors_for_malformed_json_bodies() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/broken")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("pong")
        .create_async()
        .await;

    let tester = EndpointTester::new(vec![EndpointCandidate::new(
        "broken",
        &format!("{}/broken", server.url()),
    )]);
    let reports = tester.test_all("ping").await;

    mock.assert_async().await;
    assert_eq!(reports[0].status, EndpointStatus::Error);
    assert_eq!(reports[0].response, None);
    assert!(reports[0].error.is_some());
}

#[tokio::test]
async fn it_returns_the_first_success() {
    let mut server = mockito::Server::new_async().await;
    let failing = server
        .mock("POST", "/first")
        .with_status(500)
        .expect(1)
        .create_async()
        .await;
    let working = server
        .mock("POST", "/second")
        .match_header("accept", "application/json")
        .with_status(200)
        .with_body(r#"{"response": "hello"}"#)
        .expect(1)
        .create_async()
        .await;
    let unused = server
        .mock("POST", "/third")
        .expect(0)
        .create_async()
        .await;

    let tester = EndpointTester::new(vec![
        EndpointCandidate::new("refused", "http://127.0.0.1:1/chat"),
        EndpointCandidate::new("first", &format!("{}/first", server.url())),
        EndpointCandidate::new("second", &format!("{}/second", server.url())),
        EndpointCandidate::new("third", &format!("{}/third", server.url())),
    ]);
    let (candidate, value) = tester.first_success("hi").await.unwrap();

    failing.assert_async().await;
    working.assert_async().await;
    unused.assert_async().await;
    assert_eq!(candidate.name, "second");
    assert_eq!(value, json!({ "response": "hello" }));
}

#[tokio::test]
async fn it_returns_raw_text_when_not_json() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat")
        .with_status(200)
        .with_body("just text")
        .create_async()
        .await;

    let tester = EndpointTester::new(EndpointCandidate::from_urls(&[format!(
        "{}/chat",
        server.url()
    )]));
    let (_, value) = tester.first_success("hi").await.unwrap();

    mock.assert_async().await;
    assert_eq!(value, json!("just text"));
}

#[tokio::test]
async fn it_fails_when_nothing_answers() {
    let tester = EndpointTester::new(vec![EndpointCandidate::new(
        "refused",
        "http://127.0.0.1:1/chat",
    )]);
    let err = tester.first_success("hi").await.unwrap_err();

    assert_eq!(err.to_string(), "All endpoints failed");
}
