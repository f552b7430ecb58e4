//! staffdesk CLI Entry Point
//!
//! Loads connection settings, opens the database connection, and runs the
//! interactive menu until the user exits.
//!
//! Menu output goes to stdout. Logs go to stderr (`STAFFDESK_LOG`, default `warn`).

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use staffdesk::config::{load_env_file, ConnectionSettings};
use staffdesk::{Dispatcher, OutputFormat, PostgresStore, TerminalPrompter};

/// staffdesk - manage departments, roles and employees
#[derive(Parser)]
#[command(name = "staffdesk")]
#[command(about = "Interactive manager for departments, roles and employees stored in PostgreSQL")]
#[command(version)]
struct Cli {
    /// Load DB_USER, DB_PASSWORD and DB_NAME from this file instead of ./.env
    #[arg(long, value_name = "PATH")]
    env_file: Option<PathBuf>,

    /// How listings are printed
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("STAFFDESK_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let loaded = load_env_file(cli.env_file.as_deref())?;
    if let Some(path) = &loaded {
        info!(path = %path.display(), "loaded environment file");
    }

    let settings = ConnectionSettings::from_env()?;
    let store = PostgresStore::connect(&settings)
        .await
        .context("could not open the database connection")?;

    match store.session_info().await {
        Ok(session) => info!(database = %session.database, user = %session.user, "session ready"),
        Err(e) => warn!(error = %e, "could not read session info"),
    }

    let prompter = TerminalPrompter::new();
    let result = {
        let mut dispatcher = Dispatcher::new(&store, &prompter, std::io::stdout(), cli.output);
        dispatcher.run().await
    };

    store.close().await;
    result.context("interactive session ended unexpectedly")
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
