use std::fs;

use anyhow::Context;
use serde::Serialize;
use tracing::debug;

use registry::auth::Authenticator;
use registry::households::{Household, HouseholdEditor, ScoreBreakdown};
use registry::persistence::FileStore;
use registry::session::SessionContext;
use registry::RegistryConfig;

/// Everything a command needs: configuration, the record store, and the
/// operator's session.
pub struct AppState {
    pub config: RegistryConfig,
    pub store: FileStore,
    pub session: SessionContext,
    pub auth: Authenticator,
    pub editor: HouseholdEditor,
}

impl AppState {
    pub fn open(config: RegistryConfig) -> anyhow::Result<Self> {
        let store = FileStore::open(config.snapshot_path(), config.storage_format)
            .with_context(|| format!("opening {}", config.snapshot_path().display()))?;
        let session = SessionContext::load(&config.session_path(), config.log_limit)
            .with_context(|| format!("loading {}", config.session_path().display()))?;
        debug!("Session user: {:?}", session.user.as_ref().map(|u| &u.email));

        Ok(Self {
            auth: Authenticator::new(config.hash_cost),
            editor: HouseholdEditor::new(config.membership_policy),
            config,
            store,
            session,
        })
    }

    pub fn save_session(&self) -> anyhow::Result<()> {
        self.session
            .save(&self.config.session_path())
            .context("saving session")
    }
}

/// Read a JSON argument given inline or as `@path`.
pub fn json_argument(raw: &str) -> anyhow::Result<String> {
    match raw.strip_prefix('@') {
        Some(path) => fs::read_to_string(path).with_context(|| format!("reading {}", path)),
        None => Ok(raw.to_string()),
    }
}

// -- Serializable types returned by commands --

#[derive(Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MemberView {
    pub member_id: String,
    pub resident_id: String,
    pub name: String,
    pub age: u32,
    pub role: String,
}

#[derive(Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct HouseholdView {
    pub id: String,
    pub purok: String,
    pub primary_address: String,
    pub addresses: Vec<String>,
    pub head_of_family: Option<String>,
    pub total_income: u64,
    pub living_condition_score: f64,
    pub score: ScoreBreakdown,
    pub members: Vec<MemberView>,
}

impl From<&Household> for HouseholdView {
    fn from(household: &Household) -> Self {
        let members = household
            .members
            .iter()
            .map(|member| MemberView {
                member_id: member.member_id.to_string(),
                resident_id: member.resident.id.to_string(),
                name: member.resident.full_name(),
                age: member.resident.age,
                role: household.role_of(&member.member_id).to_string(),
            })
            .collect();

        Self {
            id: household.id.clone(),
            purok: household.purok.clone(),
            primary_address: household.primary_address.clone(),
            addresses: household.addresses.clone(),
            head_of_family: household.head().map(|m| m.resident.full_name()),
            total_income: household.total_income,
            living_condition_score: household.living_condition_score,
            score: household.score_breakdown(),
            members,
        }
    }
}

#[derive(Serialize, Clone)]
pub struct CountResult {
    pub message: String,
    pub count: usize,
}

#[derive(Serialize, Clone)]
pub struct MessageResult {
    pub message: String,
}

impl MessageResult {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
