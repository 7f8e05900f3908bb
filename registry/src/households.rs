//! Household aggregation
//!
//! Groups a flat resident snapshot into households keyed by house number,
//! derives the head of family, total income and living-condition score,
//! and applies in-session edits with structural sharing.

pub mod editing;
pub mod grouping;
pub mod scoring;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::records::{Relationship, ResidentRecord};

pub use editing::{
    remove_relationship, set_head_of_family, set_primary_address, set_relationship,
    HouseholdEditor, MembershipPolicy,
};
pub use grouping::group_into_households;
pub use scoring::ScoreBreakdown;

/// Household collection. Edits replace only the touched household, so
/// untouched entries keep their allocation across versions.
pub type Households = Vec<Arc<Household>>;

/// Member identifier derived from `firstname-lastname-birthday`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(pub String);

impl MemberId {
    pub fn for_resident(resident: &ResidentRecord) -> Self {
        MemberId(format!(
            "{}-{}-{}",
            resident.first_name,
            resident.last_name,
            resident.birthday_text()
        ))
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MemberId {
    fn from(id: &str) -> Self {
        MemberId(id.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HouseholdMember {
    pub member_id: MemberId,
    pub resident: ResidentRecord,
}

/// How a member relates to the household, as shown to staff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MemberRole {
    HeadOfFamily,
    Related(Relationship),
    Member,
}

impl fmt::Display for MemberRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberRole::HeadOfFamily => f.write_str("Head of Family"),
            MemberRole::Related(relationship) => write!(f, "{}", relationship),
            MemberRole::Member => f.write_str("Member"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Household {
    /// The shared house number; empty for residents without one.
    pub id: String,
    pub purok: String,
    /// Distinct addresses recorded by members, first-seen order.
    pub addresses: Vec<String>,
    pub primary_address: String,
    pub members: Vec<HouseholdMember>,
    pub head_of_family: Option<MemberId>,
    pub relationships: BTreeMap<MemberId, Relationship>,
    pub total_income: u64,
    pub living_condition_score: f64,
}

impl Household {
    pub fn house_number(&self) -> &str {
        &self.id
    }

    pub fn member(&self, member_id: &MemberId) -> Option<&HouseholdMember> {
        self.members.iter().find(|m| &m.member_id == member_id)
    }

    pub fn has_member(&self, member_id: &MemberId) -> bool {
        self.member(member_id).is_some()
    }

    pub fn head(&self) -> Option<&HouseholdMember> {
        self.head_of_family.as_ref().and_then(|id| self.member(id))
    }

    pub fn role_of(&self, member_id: &MemberId) -> MemberRole {
        if self.head_of_family.as_ref() == Some(member_id) {
            return MemberRole::HeadOfFamily;
        }
        match self.relationships.get(member_id) {
            Some(relationship) => MemberRole::Related(*relationship),
            None => MemberRole::Member,
        }
    }

    /// Score components recomputed from the current members.
    pub fn score_breakdown(&self) -> ScoreBreakdown {
        scoring::assess(&self.members, self.total_income)
    }
}
