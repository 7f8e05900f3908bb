use clap::Subcommand;
use serde::Serialize;

use registry::auth::Permission;
use registry::demographics::Demographics;
use registry::persistence::ResidentStore;

use super::Output;
use crate::state::AppState;

#[derive(Subcommand)]
pub enum ReportsCommand {
    /// Population breakdowns for the dashboard
    Demographics,
}

#[derive(Serialize)]
struct DemographicsReport {
    gender_ratio: String,
    #[serde(flatten)]
    demographics: Demographics,
}

pub fn run(state: &mut AppState, command: ReportsCommand) -> anyhow::Result<Output> {
    match command {
        ReportsCommand::Demographics => {
            state.session.require(Permission::ViewVisualization)?;
            let residents = state.store.list_residents()?;
            state.session.board.sync(&residents);
            let demographics =
                Demographics::from_residents(&residents, state.session.board.households());
            Ok(serde_json::to_value(DemographicsReport {
                gender_ratio: demographics.gender_ratio(),
                demographics,
            })?)
        }
    }
}
