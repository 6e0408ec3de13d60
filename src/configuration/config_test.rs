use anyhow::Result;

use super::Config;
use super::ConfigKey;
use crate::application::cli;

#[test]
fn it_serializes_to_valid_toml() {
    let res = Config::serialize_default(cli::build());
    let toml_res = res.parse::<toml_edit::Document>();
    assert!(toml_res.is_ok());

    let doc = toml_res.unwrap();
    assert_eq!(doc["api-url"].as_str(), Some("http://localhost:8080"));
    assert_eq!(doc["delivery-timeout"].as_integer(), Some(30000));
    assert_eq!(doc["transport"].as_str(), Some("http"));
    assert!(doc.get("config-file").is_none());
    assert!(doc.get("theme-file").is_none());
}

#[test]
fn it_lists_possible_values_in_the_default_file() {
    let res = Config::serialize_default(cli::build());

    insta::assert_snapshot!(
        res.lines().filter(|line| return line.contains("possible values")).collect::<Vec<&str>>().join("\n"),
        @r###"
    # Route used by the HTTP transport. [possible values: query, chat, relay]
    # Transport tried first when delivering a message. [possible values: websocket, http, stream]
    "###
    );
}

#[test]
fn it_has_defaults_for_every_key() {
    assert_eq!(Config::default(ConfigKey::WsURL), "ws://localhost:8080/ws");
    assert_eq!(Config::default(ConfigKey::RelayListen), "127.0.0.1:3000");
    assert_eq!(Config::default(ConfigKey::HttpRoute), "query");
    assert!(Config::default(ConfigKey::ConfigFile).ends_with("agentchat/config.toml"));
}

#[tokio::test]
async fn it_loads_config_from_file() -> Result<()> {
    let matches = cli::build().try_get_matches_from(vec![
        "agentchat",
        "chat",
        "-c",
        "./config.example.toml",
    ])?;
    Config::load(cli::build(), vec![&matches]).await?;
    return Ok(());
}

#[tokio::test]
async fn it_fails_to_loads_config_from_file() -> Result<()> {
    let matches = cli::build().try_get_matches_from(vec![
        "agentchat",
        "chat",
        "-c",
        "./test/bad-config.toml",
    ])?;
    let res = Config::load(cli::build(), vec![&matches]).await;
    assert!(res.is_err());
    assert!(res
        .unwrap_err()
        .to_string()
        .contains("invalid value for key 'transport'"));
    return Ok(());
}
