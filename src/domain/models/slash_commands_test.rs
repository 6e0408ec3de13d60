use super::SlashCommand;

#[test]
fn it_parse_empty_string() {
    assert!(SlashCommand::parse("").is_none());
}

#[test]
fn it_parse_single_slash() {
    assert!(SlashCommand::parse("/").is_none());
}

#[test]
fn it_parse_invalid_prefix() {
    assert!(SlashCommand::parse("!q").is_none());
}

#[test]
fn it_parse_regular_questions() {
    assert!(SlashCommand::parse("What is 2+2?").is_none());
    assert!(SlashCommand::parse("/etc/hosts is where?").is_none());
}

#[test]
fn it_parse_quit_aliases() {
    for text in ["/q", "/quit", "/exit", "  /quit  "] {
        let cmd = SlashCommand::parse(text);
        assert!(cmd.is_some());
        assert!(cmd.unwrap().is_quit());
    }
}

#[test]
fn it_keeps_args() {
    let cmd = SlashCommand::parse("/quit now please").unwrap();
    assert_eq!(cmd.args, vec!["now".to_string(), "please".to_string()]);
}
