use std::io::Write;

use anyhow::bail;
use anyhow::Result;
use owo_colors::OwoColorize;
use serde_json::Value;
use tokio::sync::mpsc;

use super::cli::Diagnose;
use super::relay;
use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::ApiStatus;
use crate::domain::models::Event;
use crate::domain::models::MessageType;
use crate::domain::models::TraceEntry;
use crate::domain::models::TraceKind;
use crate::domain::models::TransportKind;
use crate::domain::services::ChatSession;
use crate::domain::services::ConnectionProbe;
use crate::domain::services::DeliveryController;
use crate::domain::services::EndpointCandidate;
use crate::domain::services::EndpointReport;
use crate::domain::services::EndpointStatus;
use crate::domain::services::EndpointTester;
use crate::domain::services::TraceRequest;
use crate::domain::services::Tracer;
use crate::infrastructure::backends::AgentBackend;
use crate::infrastructure::transports::TransportSettings;

pub fn delivery_controller() -> Result<DeliveryController> {
    let transport_name = Config::get(ConfigKey::Transport);
    let primary = match TransportKind::parse(&transport_name) {
        Some(kind) => kind,
        None => bail!(format!("No transport named {transport_name}")),
    };

    return Ok(DeliveryController::new(
        primary,
        TransportSettings::from_config()?,
    ));
}

/// Headless single turn. Streamed pieces are printed as they arrive.
pub async fn ask(text: &str) -> Result<()> {
    let controller = delivery_controller()?;
    let (tx, mut rx) = mpsc::unbounded_channel::<Event>();

    let printer = tokio::spawn(async move {
        let mut streamed = false;
        let mut stdout = std::io::stdout();
        while let Some(event) = rx.recv().await {
            if let Event::DeliveryChunk(chunk) = event {
                streamed = true;
                print!("{chunk}");
                let _ = stdout.flush();
            }
        }

        return streamed;
    });

    let mut session = ChatSession::default();
    let reply = session.submit(&controller, text, &tx).await;
    drop(tx);
    let streamed = printer.await?;

    let reply = match reply {
        Some(reply) => reply,
        None => bail!("Nothing to send"),
    };

    if reply.message_type() == MessageType::Error {
        bail!(reply.content().to_string());
    }

    if streamed {
        println!();
    } else {
        println!("{}", reply.content());
    }

    return Ok(());
}

pub async fn relay() -> Result<()> {
    let backend = AgentBackend::new(
        &Config::get(ConfigKey::ApiURL),
        &Config::get(ConfigKey::HealthCheckTimeout),
    );

    return relay::serve(&Config::get(ConfigKey::RelayListen), backend).await;
}

fn pretty(value: &Value) -> String {
    return serde_json::to_string_pretty(value).unwrap_or_else(|_| return value.to_string());
}

fn print_report(report: &EndpointReport) {
    let elapsed = format!("{}ms", report.elapsed.as_millis());
    let status = match report.status {
        EndpointStatus::Success => report.status.to_string().green().to_string(),
        EndpointStatus::Failed => report.status.to_string().yellow().to_string(),
        EndpointStatus::Error => report.status.to_string().red().to_string(),
    };

    println!(
        "{} {} ({}) {}",
        report.endpoint.bold(),
        status,
        report.url,
        elapsed.dimmed()
    );
    if let Some(response) = &report.response {
        println!("{}", pretty(response));
    }
    if let Some(error) = &report.error {
        println!("{}", error.red());
    }
}

fn print_trace(entry: &TraceEntry) {
    let kind = match entry.kind {
        TraceKind::Request => entry.kind.to_string().blue().to_string(),
        TraceKind::Response => entry.kind.to_string().green().to_string(),
        TraceKind::Info => entry.kind.to_string().cyan().to_string(),
        TraceKind::Error => entry.kind.to_string().red().to_string(),
        TraceKind::Data => entry.kind.to_string().magenta().to_string(),
    };

    println!(
        "{} {}\n{}",
        entry.timestamp.format("%H:%M:%S%.3f").dimmed(),
        kind.bold(),
        pretty(&entry.data)
    );
}

async fn probe() -> Result<()> {
    let probe = ConnectionProbe::new(AgentBackend::new(
        &Config::get(ConfigKey::ApiURL),
        &Config::get(ConfigKey::HealthCheckTimeout),
    ));

    println!("{}", ApiStatus::Checking.yellow());
    match probe.check().await {
        ApiStatus::Connected => println!("{} ({})", ApiStatus::Connected.green(), probe.url()),
        status => {
            println!("{} ({})", status.red(), probe.url());
            bail!(format!("Agent API at {} is not reachable", probe.url()));
        }
    }

    return Ok(());
}

async fn endpoints(sequential: bool, endpoints: &[String], message: &str) -> Result<()> {
    let candidates = if endpoints.is_empty() {
        EndpointCandidate::defaults(
            &Config::get(ConfigKey::RelayURL),
            &Config::get(ConfigKey::ApiURL),
        )
    } else {
        EndpointCandidate::from_urls(endpoints)
    };
    let tester = EndpointTester::new(candidates);

    if sequential {
        let (candidate, value) = tester.first_success(message).await?;
        println!("{} {}", "Success".green().bold(), candidate.url);
        println!("{}", pretty(&value));
        return Ok(());
    }

    for report in tester.test_all(message).await {
        print_report(&report);
    }

    return Ok(());
}

async fn trace(request: &TraceRequest) -> Result<()> {
    for entry in Tracer::default().trace(request).await {
        print_trace(&entry);
    }

    return Ok(());
}

pub async fn diagnose(command: &Diagnose) -> Result<()> {
    match command {
        Diagnose::Probe => return probe().await,
        Diagnose::Endpoints {
            sequential,
            endpoints: urls,
            message,
        } => return endpoints(*sequential, urls, message).await,
        Diagnose::Trace(request) => return trace(request).await,
    }
}
