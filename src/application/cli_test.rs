use anyhow::bail;
use anyhow::Result;

use super::build;
use super::parse_from;
use super::Diagnose;
use super::Invocation;

#[test]
fn it_builds_a_valid_command() {
    build().debug_assert();
}

#[tokio::test]
async fn it_defaults_to_chat() -> Result<()> {
    let matches = build().try_get_matches_from(vec!["agentchat"])?;

    match parse_from(matches).await? {
        Some(Invocation::Chat) => return Ok(()),
        other => bail!(format!("Unexpected invocation {other:?}")),
    }
}

#[tokio::test]
async fn it_parses_ask() -> Result<()> {
    let matches = build().try_get_matches_from(vec!["agentchat", "ask", "What is 2+2?"])?;

    match parse_from(matches).await? {
        Some(Invocation::Ask(text)) => assert_eq!(text, "What is 2+2?"),
        other => bail!(format!("Unexpected invocation {other:?}")),
    }

    return Ok(());
}

#[tokio::test]
async fn it_parses_endpoint_diagnostics() -> Result<()> {
    let matches = build().try_get_matches_from(vec![
        "agentchat",
        "diagnose",
        "endpoints",
        "--sequential",
        "-e",
        "http://one/chat",
        "-e",
        "http://two/chat",
        "-m",
        "ping",
    ])?;

    match parse_from(matches).await? {
        Some(Invocation::Diagnose(Diagnose::Endpoints {
            sequential,
            endpoints,
            message,
        })) => {
            assert!(sequential);
            assert_eq!(endpoints, vec!["http://one/chat", "http://two/chat"]);
            assert_eq!(message, "ping");
        }
        other => bail!(format!("Unexpected invocation {other:?}")),
    }

    return Ok(());
}

#[tokio::test]
async fn it_parses_trace_diagnostics() -> Result<()> {
    let matches = build().try_get_matches_from(vec![
        "agentchat",
        "diagnose",
        "trace",
        "--endpoint",
        "http://localhost:3000/api/chat",
        "--accept",
        "text/plain",
    ])?;

    match parse_from(matches).await? {
        Some(Invocation::Diagnose(Diagnose::Trace(request))) => {
            assert_eq!(request.endpoint, "http://localhost:3000/api/chat");
            assert_eq!(request.method, "POST");
            assert_eq!(request.accept, "text/plain");
            assert_eq!(request.content_type, "application/json");
        }
        other => bail!(format!("Unexpected invocation {other:?}")),
    }

    return Ok(());
}

#[test]
fn it_rejects_unknown_transports() {
    let res = build().try_get_matches_from(vec!["agentchat", "--transport", "fax"]);
    assert!(res.is_err());
}
