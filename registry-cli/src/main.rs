//! Barangay registry command line
//!
//! Each invocation opens the snapshot and the operator session, runs one
//! command, prints its result as JSON and saves the session.

mod commands;
mod state;

use std::str::FromStr;

use clap::{Parser, Subcommand};
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

use registry::RegistryConfig;
use state::AppState;

#[derive(Parser)]
#[command(name = "registry", version, about = "Barangay resident registry")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Staff accounts and the current session
    #[command(subcommand)]
    Users(commands::users::UsersCommand),
    /// Resident records
    #[command(subcommand)]
    Residents(commands::residents::ResidentsCommand),
    /// Medical records
    #[command(subcommand)]
    Medical(commands::medical::MedicalCommand),
    /// Certificates issued to residents
    #[command(subcommand)]
    Documents(commands::documents::DocumentsCommand),
    /// Community events and volunteers
    #[command(subcommand)]
    Events(commands::events::EventsCommand),
    /// Registered QR code payloads
    #[command(subcommand)]
    Qr(commands::qr::QrCommand),
    /// Households grouped by house number
    #[command(subcommand)]
    Households(commands::households::HouseholdsCommand),
    /// Summaries
    #[command(subcommand)]
    Reports(commands::reports::ReportsCommand),
    /// Add generated sample residents
    Seed {
        #[arg(long, default_value_t = 50)]
        count: usize,
        /// Fixed RNG seed for repeatable output
        #[arg(long)]
        rng_seed: Option<u64>,
    },
    /// Show recent session activity
    Log {
        #[arg(long, default_value_t = 20)]
        count: usize,
    },
}

fn main() -> anyhow::Result<()> {
    let config = RegistryConfig::load();

    // Logs go to stderr so stdout stays machine readable
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::from_str(&config.log_level).unwrap_or(Level::INFO))
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();
    let mut state = AppState::open(config)?;

    let output = match cli.command {
        Command::Users(command) => commands::users::run(&mut state, command)?,
        Command::Residents(command) => commands::residents::run(&mut state, command)?,
        Command::Medical(command) => commands::medical::run(&mut state, command)?,
        Command::Documents(command) => commands::documents::run(&mut state, command)?,
        Command::Events(command) => commands::events::run(&mut state, command)?,
        Command::Qr(command) => commands::qr::run(&mut state, command)?,
        Command::Households(command) => commands::households::run(&mut state, command)?,
        Command::Reports(command) => commands::reports::run(&mut state, command)?,
        Command::Seed { count, rng_seed } => commands::seed::run(&mut state, count, rng_seed)?,
        Command::Log { count } => commands::log::run(&state, count)?,
    };

    state.save_session()?;
    debug!("Session saved to {}", state.config.session_path().display());
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
