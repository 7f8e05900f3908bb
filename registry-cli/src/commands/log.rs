use registry::auth::Permission;

use super::Output;
use crate::state::AppState;

pub fn run(state: &AppState, count: usize) -> anyhow::Result<Output> {
    state.session.require(Permission::UserInfo)?;
    Ok(serde_json::to_value(state.session.activity.recent(count))?)
}
