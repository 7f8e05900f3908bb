use std::fs::File;
use std::path::PathBuf;

use anyhow::Context;
use clap::Subcommand;
use tracing::info;

use registry::auth::Permission;
use registry::import::import_residents;
use registry::persistence::ResidentStore;
use registry::records::{ResidentForm, ResidentId, ResidentPatch};

use super::Output;
use crate::state::{json_argument, AppState, CountResult, MessageResult};

#[derive(Subcommand)]
pub enum ResidentsCommand {
    List,
    Show {
        id: String,
    },
    /// Add a resident from a JSON form (inline or @file)
    Add {
        form: String,
    },
    /// Change the fields given in a JSON object (inline or @file)
    Update {
        id: String,
        patch: String,
    },
    Delete {
        id: String,
    },
    /// Add every resident in a CSV file, or none if any row is incomplete
    Import {
        path: PathBuf,
    },
}

pub fn run(state: &mut AppState, command: ResidentsCommand) -> anyhow::Result<Output> {
    let output = match command {
        ResidentsCommand::List => {
            state.session.require(Permission::ViewResidents)?;
            serde_json::to_value(state.store.list_residents()?)?
        }
        ResidentsCommand::Show { id } => {
            state.session.require(Permission::ViewResidents)?;
            serde_json::to_value(state.store.get_resident(&ResidentId(id))?)?
        }
        ResidentsCommand::Add { form } => {
            state.session.require(Permission::AddResident)?;
            let form: ResidentForm = serde_json::from_str(&json_argument(&form)?)
                .context("parsing resident form")?;
            let record = state.store.create_resident(&form)?;
            state
                .session
                .record(format!("Added new resident: {}", record.full_name()));
            serde_json::to_value(record)?
        }
        ResidentsCommand::Update { id, patch } => {
            state.session.require(Permission::EditResident)?;
            let patch: ResidentPatch = serde_json::from_str(&json_argument(&patch)?)
                .context("parsing resident update")?;
            let record = state.store.update_resident(&ResidentId(id), &patch)?;
            state
                .session
                .record(format!("Updated resident: {}", record.full_name()));
            serde_json::to_value(record)?
        }
        ResidentsCommand::Delete { id } => {
            state.session.require(Permission::DeleteResident)?;
            let id = ResidentId(id);
            state.store.delete_resident(&id)?;
            state.session.record(format!("Deleted resident ID: {}", id));
            serde_json::to_value(MessageResult::new("Resident deleted"))?
        }
        ResidentsCommand::Import { path } => {
            state.session.require(Permission::AddResident)?;
            let file =
                File::open(&path).with_context(|| format!("opening {}", path.display()))?;
            let forms = import_residents(file)?;
            let created = state.store.create_residents(&forms)?;
            info!("Imported {} residents from {}", created.len(), path.display());
            state
                .session
                .record(format!("Imported {} residents from CSV", created.len()));
            serde_json::to_value(CountResult {
                message: "Residents imported".into(),
                count: created.len(),
            })?
        }
    };
    Ok(output)
}
