use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use registry::auth::Permission;
use registry::persistence::ResidentStore;
use registry::seed::random_residents;

use super::Output;
use crate::state::{AppState, CountResult};

pub fn run(state: &mut AppState, count: usize, rng_seed: Option<u64>) -> anyhow::Result<Output> {
    state.session.require(Permission::AddResident)?;

    let mut rng = match rng_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    // Continue numbering after the highest numeric id and house number on file
    let residents = state.store.list_residents()?;
    let first_id = residents
        .iter()
        .filter_map(|r| r.id.0.parse::<u64>().ok())
        .max()
        .map_or(1, |max| max + 1);
    let first_house = residents
        .iter()
        .filter_map(|r| r.house_number.parse::<u32>().ok())
        .max()
        .map_or(1, |max| max.saturating_add(1));

    let forms = random_residents(count, first_id, first_house, &mut rng)?;
    let created = state.store.create_residents(&forms)?;
    info!("Seeded {} residents starting at id {}", created.len(), first_id);
    state
        .session
        .record(format!("Seeded {} sample residents", created.len()));

    Ok(serde_json::to_value(CountResult {
        message: "Sample residents added".into(),
        count: created.len(),
    })?)
}
