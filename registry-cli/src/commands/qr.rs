use chrono::Utc;
use clap::Subcommand;

use registry::auth::Permission;
use registry::persistence::QrStore;

use super::Output;
use crate::state::AppState;

#[derive(Subcommand)]
pub enum QrCommand {
    /// Record the payload a QR code carries
    Register { data: String },
    /// Check a scanned payload against the registered ones
    Validate { data: String },
}

pub fn run(state: &mut AppState, command: QrCommand) -> anyhow::Result<Output> {
    let output = match command {
        QrCommand::Register { data } => {
            state.session.require(Permission::AddResident)?;
            let entry = state.store.register_qr(&data, Utc::now())?;
            state.session.record("Registered a QR code");
            serde_json::to_value(entry)?
        }
        QrCommand::Validate { data } => {
            state.session.require(Permission::ViewResidents)?;
            serde_json::to_value(state.store.find_qr(&data)?)?
        }
    };
    Ok(output)
}
