use chrono::{Local, NaiveDate};
use clap::Subcommand;

use registry::auth::Permission;
use registry::documents::DocumentRequest;
use registry::persistence::DocumentStore;

use super::Output;
use crate::state::AppState;

#[derive(Subcommand)]
pub enum DocumentsCommand {
    List,
    Show {
        id: u64,
    },
    /// Issue a certificate to the resident with the given first and last name
    Issue {
        /// "Barangay Clearance", "Residency Certification" or "Indigency Certificate"
        #[arg(long = "type")]
        document_type: String,
        #[arg(long)]
        firstname: String,
        #[arg(long)]
        lastname: String,
        #[arg(long)]
        purpose: String,
        /// Issue date (YYYY-MM-DD); defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

pub fn run(state: &mut AppState, command: DocumentsCommand) -> anyhow::Result<Output> {
    state.session.require(Permission::Documents)?;

    let output = match command {
        DocumentsCommand::List => serde_json::to_value(state.store.list_documents()?)?,
        DocumentsCommand::Show { id } => serde_json::to_value(state.store.get_document(id)?)?,
        DocumentsCommand::Issue {
            document_type,
            firstname,
            lastname,
            purpose,
            date,
        } => {
            let request = DocumentRequest {
                document_type,
                first_name: firstname,
                last_name: lastname,
                purpose,
            };
            let today = date.unwrap_or_else(|| Local::now().date_naive());
            let document = state.store.issue_document(&request, today)?;
            state.session.record(format!(
                "Issued {} to {}",
                document.document_type, document.resident_name
            ));
            serde_json::to_value(document)?
        }
    };
    Ok(output)
}
