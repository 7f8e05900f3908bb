use anyhow::Context;
use clap::Subcommand;

use registry::auth::Permission;
use registry::persistence::ResidentStore;
use registry::records::{MedicalRecord, MedicalRecordPatch, ResidentId};

use super::Output;
use crate::state::{json_argument, AppState, MessageResult};

#[derive(Subcommand)]
pub enum MedicalCommand {
    Show {
        id: String,
    },
    /// Create or replace a resident's record from JSON (inline or @file)
    Save {
        id: String,
        record: String,
    },
    /// Change the non-empty fields given in JSON (inline or @file)
    Update {
        id: String,
        patch: String,
    },
    Delete {
        id: String,
    },
}

pub fn run(state: &mut AppState, command: MedicalCommand) -> anyhow::Result<Output> {
    let output = match command {
        MedicalCommand::Show { id } => {
            state.session.require(Permission::ViewResidents)?;
            serde_json::to_value(state.store.get_medical_record(&ResidentId(id))?)?
        }
        MedicalCommand::Save { id, record } => {
            state.session.require(Permission::EditResident)?;
            let record: MedicalRecord = serde_json::from_str(&json_argument(&record)?)
                .context("parsing medical record")?;
            let id = ResidentId(id);
            state.store.save_medical_record(&id, record)?;
            state
                .session
                .record(format!("Saved medical record for resident ID: {}", id));
            serde_json::to_value(MessageResult::new("Medical record saved"))?
        }
        MedicalCommand::Update { id, patch } => {
            state.session.require(Permission::EditResident)?;
            let patch: MedicalRecordPatch = serde_json::from_str(&json_argument(&patch)?)
                .context("parsing medical record update")?;
            let id = ResidentId(id);
            let record = state.store.update_medical_record(&id, &patch)?;
            state
                .session
                .record(format!("Updated medical record for resident ID: {}", id));
            serde_json::to_value(record)?
        }
        MedicalCommand::Delete { id } => {
            state.session.require(Permission::EditResident)?;
            let id = ResidentId(id);
            state.store.delete_medical_record(&id)?;
            state
                .session
                .record(format!("Deleted medical record for resident ID: {}", id));
            serde_json::to_value(MessageResult::new("Medical record deleted"))?
        }
    };
    Ok(output)
}
