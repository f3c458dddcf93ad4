//! CarCare - add maintenance to the calendar from the command line

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use carcare_domain::{Config, MaintenanceDraft, SubmittedEvent};
use carcare_infra::{config, init_tracing};
use carcare_lib::{add_draft_to_calendar, add_record_to_calendar, AppContext};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "carcare", about = "Add car maintenance to Google Calendar")]
struct Args {
    /// Config file (JSON or TOML). Defaults to the environment, then probing.
    #[arg(long, global = true, env = "CARCARE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Add an ad-hoc maintenance entry.
    Add {
        /// Maintenance type, e.g. "Oil Change".
        #[arg(long = "type")]
        maintenance_type: String,

        /// Scheduled start (RFC 3339).
        #[arg(long, value_parser = parse_at)]
        at: DateTime<Utc>,

        #[arg(long)]
        notes: Option<String>,

        /// Event length; one hour when omitted.
        #[arg(long)]
        duration_minutes: Option<i64>,
    },
    /// Add a maintenance record stored on the backend.
    Record {
        #[arg(long)]
        car: String,

        #[arg(long)]
        record: String,
    },
}

fn parse_at(raw: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|err| format!("expected an RFC 3339 timestamp: {err}"))
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<Config> {
    let config = match path {
        Some(path) => config::load_from_file(Some(path))?,
        None => config::load()?,
    };
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let config = load_config(args.config).context("failed to load configuration")?;
    init_tracing(&config.logging)?;

    let ctx = AppContext::new_with_config(config).await.context("failed to start")?;
    info!(redirect_uri = %ctx.redirect_uri(), "waiting for calendar authorization");

    let cancel = CancellationToken::new();
    let ctrl_c = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupted; cancelling authorization");
                cancel.cancel();
            }
        })
    };

    let result = match args.command {
        Command::Add { maintenance_type, at, notes, duration_minutes } => {
            let mut draft = MaintenanceDraft::new(maintenance_type, at);
            if let Some(notes) = notes {
                draft = draft.with_notes(notes);
            }
            if let Some(minutes) = duration_minutes {
                draft = draft.with_duration_minutes(minutes);
            }
            add_draft_to_calendar(&ctx, draft, cancel).await
        }
        Command::Record { car, record } => add_record_to_calendar(&ctx, &car, &record, cancel).await,
    };

    ctrl_c.abort();
    ctx.shutdown().await?;

    match result {
        Ok(submitted) => {
            print_submitted(&submitted);
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            eprintln!("{}", err.user_message());
            Ok(ExitCode::FAILURE)
        }
    }
}

fn print_submitted(submitted: &SubmittedEvent) {
    println!("Added \"{}\" on {}", submitted.event.summary, submitted.event.start_time());
    if let Some(link) = &submitted.confirmation.html_link {
        println!("{link}");
    } else if let Some(id) = &submitted.confirmation.event_id {
        println!("event id: {id}");
    }
}
