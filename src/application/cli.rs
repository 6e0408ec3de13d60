#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;

use std::env;
use std::io;
use std::path;

use anyhow::bail;
use anyhow::Result;
use clap::builder::PossibleValuesParser;
use clap::value_parser;
use clap::Arg;
use clap::ArgAction;
use clap::ArgMatches;
use clap::Command;
use clap_complete::generate;
use clap_complete::Generator;
use clap_complete::Shell;
use owo_colors::OwoColorize;
use strum::VariantNames;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::HttpRoute;
use crate::domain::models::TransportKind;
use crate::domain::services::Themes;
use crate::domain::services::TraceRequest;

/// What the process should do once arguments and config are loaded.
#[derive(Clone, Debug)]
pub enum Invocation {
    Chat,
    Ask(String),
    Relay,
    Diagnose(Diagnose),
}

#[derive(Clone, Debug)]
pub enum Diagnose {
    Probe,
    Endpoints {
        sequential: bool,
        endpoints: Vec<String>,
        message: String,
    },
    Trace(TraceRequest),
}

pub fn help_text() -> String {
    let text = r#"
COMMANDS:
- /quit /exit (/q) - Exit the chat.

HOTKEYS:
- Up arrow - Scroll up
- Down arrow - Scroll down
- CTRL+U - Page up
- CTRL+D - Page down
- CTRL+C - Exit, dropping any reply still on its way.
        "#;

    return text.trim().to_string();
}

pub fn log_path() -> path::PathBuf {
    return dirs::cache_dir()
        .unwrap_or_else(env::temp_dir)
        .join("agentchat/debug.log");
}

fn print_completions<G: Generator>(gen: G, cmd: &mut Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
}

async fn create_config_file() -> Result<()> {
    let config_file_path_str = Config::default(ConfigKey::ConfigFile);
    let config_file_path = path::PathBuf::from(&config_file_path_str);
    if config_file_path.exists() {
        bail!(format!(
            "Config file already exists at {config_file_path_str}"
        ));
    }

    if let Some(parent) = config_file_path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent).await?;
        }
    }

    let mut file = fs::File::create(&config_file_path).await?;
    file.write_all(Config::serialize_default(build()).as_bytes())
        .await?;

    println!("Created default config file at {config_file_path_str}");
    return Ok(());
}

fn subcommand_completions() -> Command {
    return Command::new("completions")
        .about("Generates shell completions.")
        .arg(
            clap::Arg::new("shell")
                .short('s')
                .long("shell")
                .help("Which shell to generate completions for.")
                .action(ArgAction::Set)
                .value_parser(value_parser!(Shell))
                .required(true),
        );
}

fn subcommand_config() -> Command {
    return Command::new("config")
        .about("Configuration file options.")
        .subcommand(
            Command::new("create").about("Saves the default config file to the configuration file path. This command will fail if the file exists already.")
        )
        .subcommand(
            Command::new("default").about("Outputs the default configuration file to stdout.")
        )
        .subcommand(
            Command::new("path").about("Returns the default path for the configuration file.")
        );
}

fn subcommand_debug() -> Command {
    return Command::new("debug")
        .about("Debug helpers for agentchat")
        .hide(true)
        .subcommand(
            Command::new("themes").about("List all supported code highlighting themes.")
        )
        .subcommand(
            Command::new("log-path").about("Output path to debug log file generated when running the chat with environment variable RUST_LOG=agentchat")
        )
        .subcommand(
            Command::new("enum-config").about("List all config keys as strings.")
        );
}

fn subcommand_diagnose() -> Command {
    return Command::new("diagnose")
        .about("Connection diagnostics for the agent API and relay.")
        .arg_required_else_help(true)
        .subcommand(Command::new("probe").about("Checks whether the agent API is reachable."))
        .subcommand(
            Command::new("endpoints")
                .about("Sends a test message to every candidate chat endpoint and reports which ones answer.")
                .arg(
                    Arg::new("message")
                        .short('m')
                        .long("message")
                        .help("Message to send.")
                        .num_args(1)
                        .default_value("Hello, I am testing the API connection"),
                )
                .arg(
                    Arg::new("endpoint")
                        .short('e')
                        .long("endpoint")
                        .help("Endpoint URL to test. Repeat to test several. Defaults to the relay and agent chat routes.")
                        .action(ArgAction::Append)
                        .num_args(1),
                )
                .arg(
                    Arg::new("sequential")
                        .long("sequential")
                        .help("Stop at the first endpoint that answers.")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("trace")
                .about("Sends one hand-built request and prints a timeline of what happened.")
                .arg(
                    Arg::new("endpoint")
                        .long("endpoint")
                        .help("URL to send the request to. Defaults to the relay chat route.")
                        .num_args(1),
                )
                .arg(
                    Arg::new("method")
                        .long("method")
                        .help("HTTP method.")
                        .num_args(1)
                        .default_value("POST"),
                )
                .arg(
                    Arg::new("content-type")
                        .long("content-type")
                        .help("Content-Type header.")
                        .num_args(1)
                        .default_value("application/json"),
                )
                .arg(
                    Arg::new("accept")
                        .long("accept")
                        .help("Accept header.")
                        .num_args(1)
                        .default_value("application/json"),
                )
                .arg(
                    Arg::new("body")
                        .long("body")
                        .help("Raw request body. Sent wrapped in an error object when it is not valid JSON.")
                        .num_args(1)
                        .default_value(r#"{"message":"Hello, this is a test message"}"#),
                ),
        );
}

fn config_arg(key: ConfigKey, help: String) -> Arg {
    let env_name = format!(
        "AGENTCHAT_{}",
        key.to_string().to_uppercase().replace('-', "_")
    );

    return Arg::new(key.to_string())
        .long(key.to_string())
        .env(env_name)
        .num_args(1)
        .help(help)
        .global(true);
}

pub fn build() -> Command {
    let commands_text = help_text()
        .split('\n')
        .map(|line| {
            if line.starts_with('-') {
                return format!("  {line}");
            }
            if line.starts_with("COMMANDS:") || line.starts_with("HOTKEYS:") {
                return format!("CHAT {line}").bold().underline().to_string();
            }
            return line.to_string();
        })
        .collect::<Vec<String>>()
        .join("\n");

    let about = format!(
        "{}\n\nVersion: {}",
        env!("CARGO_PKG_DESCRIPTION"),
        env!("CARGO_PKG_VERSION"),
    );

    return Command::new("agentchat")
        .about(about)
        .author(env!("CARGO_PKG_AUTHORS"))
        .version(env!("CARGO_PKG_VERSION"))
        .after_help(commands_text)
        .arg_required_else_help(false)
        .subcommand(Command::new("chat").about("Start a new chat session."))
        .subcommand(
            Command::new("ask")
                .about("Sends a single message without the chat interface and prints the reply.")
                .arg(Arg::new("text").help("Message to send.").required(true)),
        )
        .subcommand(Command::new("relay").about("Runs the relay server in front of the agent API."))
        .subcommand(subcommand_diagnose())
        .subcommand(subcommand_completions())
        .subcommand(subcommand_config())
        .subcommand(subcommand_debug())
        .arg(
            config_arg(
                ConfigKey::ConfigFile,
                format!("Path to configuration file [default: {}]", Config::default(ConfigKey::ConfigFile)),
            )
            .short('c'),
        )
        .arg(config_arg(
            ConfigKey::ApiURL,
            format!("URL of the agent API. [default: {}]", Config::default(ConfigKey::ApiURL)),
        ))
        .arg(config_arg(
            ConfigKey::BuildID,
            format!("Identifier of this build, shown in error reports. [default: {}]", Config::default(ConfigKey::BuildID)),
        ))
        .arg(config_arg(
            ConfigKey::DeliveryTimeout,
            format!("Milliseconds to wait for a WebSocket reply before giving up on it. [default: {}]", Config::default(ConfigKey::DeliveryTimeout)),
        ))
        .arg(config_arg(
            ConfigKey::HealthCheckTimeout,
            format!("Milliseconds to wait for the agent API health check. [default: {}]", Config::default(ConfigKey::HealthCheckTimeout)),
        ))
        .arg(
            config_arg(
                ConfigKey::HttpRoute,
                format!("Route used by the HTTP transport. [default: {}]", Config::default(ConfigKey::HttpRoute)),
            )
            .value_parser(PossibleValuesParser::new(HttpRoute::VARIANTS)),
        )
        .arg(config_arg(
            ConfigKey::RelayListen,
            format!("Address the relay server listens on. [default: {}]", Config::default(ConfigKey::RelayListen)),
        ))
        .arg(config_arg(
            ConfigKey::RelayURL,
            format!("URL of the relay server, used by the relay route and the stream transport. [default: {}]", Config::default(ConfigKey::RelayURL)),
        ))
        .arg(
            config_arg(
                ConfigKey::Theme,
                format!("Code syntax highlighting theme. [default: {}]", Config::default(ConfigKey::Theme)),
            )
            .short('t'),
        )
        .arg(config_arg(
            ConfigKey::ThemeFile,
            "Absolute path to a TextMate tmTheme to use for code syntax highlighting.".to_string(),
        ))
        .arg(
            config_arg(
                ConfigKey::Transport,
                format!("Transport tried first when delivering a message. [default: {}]", Config::default(ConfigKey::Transport)),
            )
            .value_parser(PossibleValuesParser::new(TransportKind::VARIANTS)),
        )
        .arg(config_arg(
            ConfigKey::WsURL,
            format!("WebSocket URL of the agent API. [default: {}]", Config::default(ConfigKey::WsURL)),
        ));
}

fn diagnose_invocation(matches: &ArgMatches) -> Option<Diagnose> {
    match matches.subcommand() {
        Some(("probe", _)) => return Some(Diagnose::Probe),
        Some(("endpoints", endpoint_matches)) => {
            let endpoints = endpoint_matches
                .get_many::<String>("endpoint")
                .map(|values| return values.cloned().collect::<Vec<String>>())
                .unwrap_or_default();
            let message = endpoint_matches
                .get_one::<String>("message")
                .cloned()
                .unwrap_or_default();

            return Some(Diagnose::Endpoints {
                sequential: endpoint_matches.get_flag("sequential"),
                endpoints,
                message,
            });
        }
        Some(("trace", trace_matches)) => {
            let defaults = TraceRequest::default();
            let value = |name: &str, fallback: String| {
                return trace_matches
                    .get_one::<String>(name)
                    .cloned()
                    .unwrap_or(fallback);
            };

            let endpoint = trace_matches
                .get_one::<String>("endpoint")
                .cloned()
                .unwrap_or_else(|| {
                    return format!(
                        "{}/api/chat",
                        Config::get(ConfigKey::RelayURL).trim_end_matches('/')
                    );
                });

            return Some(Diagnose::Trace(TraceRequest {
                endpoint,
                method: value("method", defaults.method),
                content_type: value("content-type", defaults.content_type),
                accept: value("accept", defaults.accept),
                body: value("body", defaults.body),
            }));
        }
        _ => return None,
    }
}

/// Parses the command line and loads config. Returns `None` when the
/// command was fully handled here.
pub async fn parse_from(matches: ArgMatches) -> Result<Option<Invocation>> {
    match matches.subcommand() {
        Some(("debug", debug_matches)) => {
            match debug_matches.subcommand() {
                Some(("themes", _)) => {
                    println!("{}", Themes::list().join("\n"));
                }
                Some(("log-path", _)) => {
                    println!("{}", log_path().to_string_lossy());
                }
                Some(("enum-config", _)) => {
                    let res = ConfigKey::VARIANTS.join("\n");
                    println!("{}", res);
                }
                _ => {
                    subcommand_debug().print_long_help()?;
                }
            }

            return Ok(None);
        }
        Some(("completions", subcmd_matches)) => {
            if let Some(completions) = subcmd_matches.get_one::<Shell>("shell").copied() {
                let mut app = build();
                print_completions(completions, &mut app);
            }
            return Ok(None);
        }
        Some(("config", subcmd_matches)) => match subcmd_matches.subcommand() {
            Some(("create", _)) => {
                create_config_file().await?;
                return Ok(None);
            }
            Some(("default", _)) => {
                println!("{}", Config::serialize_default(build()));
                return Ok(None);
            }
            Some(("path", _)) => {
                println!("{}", Config::default(ConfigKey::ConfigFile));
                return Ok(None);
            }
            _ => {
                subcommand_config().print_long_help()?;
                return Ok(None);
            }
        },
        Some(("chat", subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;
            return Ok(Some(Invocation::Chat));
        }
        Some(("ask", subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;
            let text = subcmd_matches
                .get_one::<String>("text")
                .cloned()
                .unwrap_or_default();
            return Ok(Some(Invocation::Ask(text)));
        }
        Some(("relay", subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;
            return Ok(Some(Invocation::Relay));
        }
        Some(("diagnose", subcmd_matches)) => {
            let mut all_matches = vec![&matches, subcmd_matches];
            if let Some((_, leaf_matches)) = subcmd_matches.subcommand() {
                all_matches.push(leaf_matches);
            }
            Config::load(build(), all_matches).await?;

            match diagnose_invocation(subcmd_matches) {
                Some(diagnose) => return Ok(Some(Invocation::Diagnose(diagnose))),
                None => {
                    subcommand_diagnose().print_long_help()?;
                    return Ok(None);
                }
            }
        }
        _ => {
            Config::load(build(), vec![&matches]).await?;
            return Ok(Some(Invocation::Chat));
        }
    }
}

pub async fn parse() -> Result<Option<Invocation>> {
    return parse_from(build().get_matches()).await;
}
