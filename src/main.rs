#![deny(clippy::implicit_return)]
#![allow(clippy::needless_return)]

mod application;
mod configuration;
mod domain;
mod infrastructure;

use std::env;
use std::process;

use anyhow::Error;
use anyhow::Result;
use owo_colors::OwoColorize;
use tokio::sync::mpsc;
use tokio::task;

use crate::application::cli;
use crate::application::cli::Invocation;
use crate::application::commands;
use crate::application::ui;
use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Action;
use crate::domain::models::Event;
use crate::domain::services::actions::ActionsService;
use crate::domain::services::ConnectionProbe;
use crate::infrastructure::backends::AgentBackend;

fn handle_error(err: Error) {
    let build_id = Config::get(ConfigKey::BuildID);
    eprintln!(
        "{}",
        format!(
            "Oh no! agentchat has failed with the following app version and error.\n\nVersion: {}\nBuild: {}\nError: {}",
            env!("CARGO_PKG_VERSION"),
            if build_id.is_empty() { Config::default(ConfigKey::BuildID) } else { build_id },
            err
        )
        .red()
    );

    let backtrace = err.backtrace();
    if backtrace.to_string() == "disabled backtrace" {
        let args = env::args().collect::<Vec<String>>().join(" ");
        eprintln!("\nRunning the following can help explain further what the issue is:");
        eprintln!("\nRUST_BACKTRACE=1 {args}");
    } else {
        eprintln!("\n{}", backtrace);
    }

    process::exit(1);
}

/// The chat UI owns the terminal, so it logs to a JSON file and only when
/// asked to. Everything else logs to stderr.
fn init_tracing(invocation: &Invocation) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| return "".to_string());

    if let Invocation::Chat = invocation {
        if !rust_log.contains("agentchat") {
            return None;
        }

        let log_path = cli::log_path();
        let log_dir = log_path.parent().map(|dir| return dir.to_path_buf())?;
        let file_appender = tracing_appender::rolling::never(log_dir, "debug.log");
        let (writer, guard) = tracing_appender::non_blocking(file_appender);
        tracing_subscriber::fmt()
            .json()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(writer)
            .init();

        return Some(guard);
    }

    let level = if rust_log.contains("agentchat") {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    return None;
}

async fn chat() -> Result<()> {
    let controller = commands::delivery_controller()?;
    let probe = ConnectionProbe::new(AgentBackend::default());

    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();
    let (event_tx, event_rx) = mpsc::unbounded_channel::<Event>();

    let mut background_futures = task::JoinSet::new();
    background_futures.spawn(async move {
        return ActionsService::start(controller, probe, event_tx, &mut action_rx).await;
    });

    let ui_future = ui::start(action_tx, event_rx);

    let res = tokio::select!(
        res = background_futures.join_next() => match res {
            Some(Ok(res)) => res,
            Some(Err(err)) => Err(err.into()),
            None => Ok(()),
        },
        res = ui_future => res,
    );

    if res.is_err() {
        ui::destruct_terminal_for_panic();
    }

    return res;
}

#[tokio::main]
async fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        ui::destruct_terminal_for_panic();
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));

    let invocation = match cli::parse().await {
        Ok(Some(invocation)) => invocation,
        Ok(None) => process::exit(0),
        Err(err) => {
            handle_error(err);
            return;
        }
    };

    let _guard = init_tracing(&invocation);

    let res = match &invocation {
        Invocation::Chat => chat().await,
        Invocation::Ask(text) => commands::ask(text).await,
        Invocation::Relay => commands::relay().await,
        Invocation::Diagnose(command) => commands::diagnose(command).await,
    };

    if let Err(err) = res {
        handle_error(err);
    }

    process::exit(0);
}
