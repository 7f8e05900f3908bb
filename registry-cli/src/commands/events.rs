use anyhow::Context;
use clap::Subcommand;

use registry::auth::Permission;
use registry::events::EventForm;
use registry::persistence::EventStore;
use registry::records::ResidentId;

use super::Output;
use crate::state::{json_argument, AppState, MessageResult};

#[derive(Subcommand)]
pub enum EventsCommand {
    List,
    Show {
        id: u64,
    },
    /// Create an event from JSON (inline or @file): name, category, date, description
    Add {
        event: String,
    },
    /// Replace an event's details from JSON (inline or @file); volunteers are kept
    Update {
        id: u64,
        event: String,
    },
    Delete {
        id: u64,
    },
    /// Sign a resident up as a volunteer
    Volunteer {
        id: u64,
        resident: String,
    },
    /// Take a resident off the volunteer list
    Withdraw {
        id: u64,
        resident: String,
    },
}

fn parse_form(raw: &str) -> anyhow::Result<EventForm> {
    serde_json::from_str(&json_argument(raw)?).context("parsing event")
}

pub fn run(state: &mut AppState, command: EventsCommand) -> anyhow::Result<Output> {
    state.session.require(Permission::Events)?;

    let output = match command {
        EventsCommand::List => serde_json::to_value(state.store.list_events()?)?,
        EventsCommand::Show { id } => serde_json::to_value(state.store.get_event(id)?)?,
        EventsCommand::Add { event } => {
            let event = state.store.create_event(&parse_form(&event)?)?;
            state
                .session
                .record(format!("Created event {}: {}", event.id, event.name));
            serde_json::to_value(event)?
        }
        EventsCommand::Update { id, event } => {
            let event = state.store.update_event(id, &parse_form(&event)?)?;
            state
                .session
                .record(format!("Updated event {}: {}", event.id, event.name));
            serde_json::to_value(event)?
        }
        EventsCommand::Delete { id } => {
            state.store.delete_event(id)?;
            state.session.record(format!("Deleted event {}", id));
            serde_json::to_value(MessageResult::new("Event deleted"))?
        }
        EventsCommand::Volunteer { id, resident } => {
            let resident = ResidentId(resident);
            let event = state.store.add_volunteer(id, &resident)?;
            state.session.record(format!(
                "Added volunteer {} to event {}",
                resident, event.name
            ));
            serde_json::to_value(event)?
        }
        EventsCommand::Withdraw { id, resident } => {
            let resident = ResidentId(resident);
            let event = state.store.remove_volunteer(id, &resident)?;
            state.session.record(format!(
                "Removed volunteer {} from event {}",
                resident, event.name
            ));
            serde_json::to_value(event)?
        }
    };
    Ok(output)
}
