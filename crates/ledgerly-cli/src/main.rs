//! Ledgerly - a command-line client for a personal finance tracker.
//!
//! Manage accounts, categories, expenses, incomes and transfers, and view
//! dashboard totals, category breakdowns and monthly cashflow from the
//! terminal.

mod cli;
mod commands;
mod output;

use std::io;

use anyhow::Result;
use clap::Parser;
use tokio::sync::broadcast;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use ledgerly_core::{ApiClient, Config, SessionEvent};

use cli::{Cli, Command};

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();
    let cli = Cli::parse();
    let mut config = Config::load()?;

    // Theme is a local preference and needs no backend
    if let Command::Theme { mode } = cli.command {
        return commands::theme(&mut config, mode);
    }

    let base_url = match cli.api_url.clone() {
        Some(url) => url,
        None => config.api_base_url()?,
    };
    info!(base_url = %base_url, "Ledgerly starting");

    let store = config.open_store()?;
    let api = ApiClient::new(&base_url, store)?;
    let mut events = api.session().subscribe();

    let result = commands::run(&api, &mut config, cli.command, cli.json).await;
    report_session_events(&mut events);
    result
}

/// Tell the user when a command ended their session.
fn report_session_events(events: &mut broadcast::Receiver<SessionEvent>) {
    while let Ok(event) = events.try_recv() {
        if event == SessionEvent::Expired {
            eprintln!("Session expired. Run `ledgerly login` to sign in again.");
        }
    }
}
