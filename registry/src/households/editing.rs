//! In-session household edits
//!
//! Every edit returns a new collection in which only the targeted household
//! is a fresh allocation; the others are shared with the input.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, Result};
use crate::households::{Household, Households, MemberId};
use crate::records::Relationship;

fn replace_household<F>(households: &[Arc<Household>], household_id: &str, edit: F) -> Households
where
    F: FnOnce(&mut Household),
{
    let mut edit = Some(edit);
    households
        .iter()
        .map(|household| {
            if household.id == household_id {
                if let Some(apply) = edit.take() {
                    let mut next = Household::clone(household);
                    apply(&mut next);
                    return Arc::new(next);
                }
            }
            Arc::clone(household)
        })
        .collect()
}

/// Point the household at a new head of family. No membership check.
pub fn set_head_of_family(
    households: &[Arc<Household>],
    household_id: &str,
    member_id: &MemberId,
) -> Households {
    replace_household(households, household_id, |h| {
        h.head_of_family = Some(member_id.clone());
    })
}

/// Set or overwrite a member's relationship to the head of family.
pub fn set_relationship(
    households: &[Arc<Household>],
    household_id: &str,
    member_id: &MemberId,
    relationship: Relationship,
) -> Households {
    replace_household(households, household_id, |h| {
        h.relationships.insert(member_id.clone(), relationship);
    })
}

pub fn remove_relationship(
    households: &[Arc<Household>],
    household_id: &str,
    member_id: &MemberId,
) -> Households {
    replace_household(households, household_id, |h| {
        h.relationships.remove(member_id);
    })
}

/// Overwrite the primary address, even with one no member recorded.
pub fn set_primary_address(
    households: &[Arc<Household>],
    household_id: &str,
    address: &str,
) -> Households {
    replace_household(households, household_id, |h| {
        h.primary_address = address.to_string();
    })
}

/// Whether edits must refer to existing households, members and addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MembershipPolicy {
    #[default]
    Lenient,
    Strict,
}

/// Household edits under a membership policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct HouseholdEditor {
    pub policy: MembershipPolicy,
}

impl HouseholdEditor {
    pub fn new(policy: MembershipPolicy) -> Self {
        Self { policy }
    }

    pub fn set_head_of_family(
        &self,
        households: &[Arc<Household>],
        household_id: &str,
        member_id: &MemberId,
    ) -> Result<Households> {
        self.check_member(households, household_id, member_id)?;
        Ok(set_head_of_family(households, household_id, member_id))
    }

    pub fn set_relationship(
        &self,
        households: &[Arc<Household>],
        household_id: &str,
        member_id: &MemberId,
        relationship: Relationship,
    ) -> Result<Households> {
        self.check_member(households, household_id, member_id)?;
        Ok(set_relationship(households, household_id, member_id, relationship))
    }

    /// Make `member_id` the head and drop any relationship it had.
    pub fn promote_to_head(
        &self,
        households: &[Arc<Household>],
        household_id: &str,
        member_id: &MemberId,
    ) -> Result<Households> {
        let promoted = self.set_head_of_family(households, household_id, member_id)?;
        Ok(remove_relationship(&promoted, household_id, member_id))
    }

    pub fn set_primary_address(
        &self,
        households: &[Arc<Household>],
        household_id: &str,
        address: &str,
    ) -> Result<Households> {
        if self.policy == MembershipPolicy::Strict {
            let household = find(households, household_id)?;
            if !household.addresses.iter().any(|a| a == address) {
                return Err(RegistryError::Membership {
                    household: household_id.to_string(),
                    what: "recorded address",
                    value: address.to_string(),
                });
            }
        }
        Ok(set_primary_address(households, household_id, address))
    }

    fn check_member(
        &self,
        households: &[Arc<Household>],
        household_id: &str,
        member_id: &MemberId,
    ) -> Result<()> {
        if self.policy == MembershipPolicy::Lenient {
            return Ok(());
        }
        let household = find(households, household_id)?;
        if household.has_member(member_id) {
            Ok(())
        } else {
            Err(RegistryError::Membership {
                household: household_id.to_string(),
                what: "member",
                value: member_id.to_string(),
            })
        }
    }
}

fn find<'a>(households: &'a [Arc<Household>], household_id: &str) -> Result<&'a Household> {
    households
        .iter()
        .find(|h| h.id == household_id)
        .map(|h| &**h)
        .ok_or_else(|| RegistryError::NotFound {
            kind: "Household",
            id: household_id.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::households::{group_into_households, MemberRole};
    use crate::records::{ResidentId, ResidentRecord};

    fn resident(id: &str, house: &str, age: u32) -> ResidentRecord {
        ResidentRecord {
            id: ResidentId::from(id),
            first_name: format!("Name{}", id),
            last_name: "Bautista".into(),
            birthday: None,
            age,
            gender: "Male".into(),
            address: format!("{} Luna St", house),
            house_number: house.into(),
            purok: "2".into(),
            years_of_residency: Some(3),
            employment_status: None,
            occupation: None,
            monthly_income_range: None,
            education_level: None,
            email: String::new(),
            phone_number: String::new(),
            civil_status: None,
            religion: String::new(),
        }
    }

    fn sample() -> Households {
        group_into_households(&[
            resident("1", "10", 50),
            resident("2", "10", 20),
            resident("3", "11", 33),
        ])
    }

    #[test]
    fn test_set_head_replaces_only_target() {
        let before = sample();
        let new_head = MemberId::from("Name2-Bautista-");
        let after = set_head_of_family(&before, "10", &new_head);

        assert_eq!(after[0].head_of_family, Some(new_head.clone()));
        assert_eq!(after[0].role_of(&new_head), MemberRole::HeadOfFamily);
        assert!(!Arc::ptr_eq(&before[0], &after[0]));
        assert!(Arc::ptr_eq(&before[1], &after[1]));
        // The input collection is untouched
        assert_ne!(before[0].head_of_family, Some(new_head));
    }

    #[test]
    fn test_unknown_household_leaves_everything_shared() {
        let before = sample();
        let after = set_primary_address(&before, "99", "Nowhere");
        assert!(before.iter().zip(after.iter()).all(|(a, b)| Arc::ptr_eq(a, b)));
    }

    #[test]
    fn test_relationship_set_overwrite_and_remove() {
        let before = sample();
        let member = MemberId::from("Name2-Bautista-");
        assert_eq!(before[0].role_of(&member), MemberRole::Member);

        let son = set_relationship(&before, "10", &member, Relationship::Son);
        assert_eq!(son[0].role_of(&member), MemberRole::Related(Relationship::Son));

        let in_law = set_relationship(&son, "10", &member, Relationship::InLaw);
        assert_eq!(in_law[0].relationships.len(), 1);
        assert_eq!(in_law[0].relationships[&member], Relationship::InLaw);

        let cleared = remove_relationship(&in_law, "10", &member);
        assert!(cleared[0].relationships.is_empty());
    }

    #[test]
    fn test_lenient_primary_address_accepts_anything() {
        let after = set_primary_address(&sample(), "11", "Not a recorded address");
        assert_eq!(after[1].primary_address, "Not a recorded address");
    }

    #[test]
    fn test_strict_editor_rejects_outsiders() {
        let editor = HouseholdEditor::new(MembershipPolicy::Strict);
        let households = sample();
        let outsider = MemberId::from("Name3-Bautista-");

        assert!(matches!(
            editor.set_head_of_family(&households, "10", &outsider),
            Err(RegistryError::Membership { .. })
        ));
        assert!(matches!(
            editor.set_relationship(&households, "42", &outsider, Relationship::Sibling),
            Err(RegistryError::NotFound { .. })
        ));
        assert!(editor
            .set_primary_address(&households, "10", "Somewhere else")
            .is_err());
        assert!(editor
            .set_primary_address(&households, "10", "10 Luna St")
            .is_ok());
    }

    #[test]
    fn test_lenient_editor_accepts_outsiders() {
        let editor = HouseholdEditor::default();
        let outsider = MemberId::from("Name3-Bautista-");
        let after = editor
            .set_head_of_family(&sample(), "10", &outsider)
            .unwrap();
        assert_eq!(after[0].head_of_family, Some(outsider));
    }

    #[test]
    fn test_promote_to_head_drops_relationship() {
        let editor = HouseholdEditor::new(MembershipPolicy::Strict);
        let member = MemberId::from("Name2-Bautista-");
        let related = editor
            .set_relationship(&sample(), "10", &member, Relationship::Son)
            .unwrap();
        let promoted = editor.promote_to_head(&related, "10", &member).unwrap();
        assert_eq!(promoted[0].head_of_family, Some(member.clone()));
        assert!(!promoted[0].relationships.contains_key(&member));
    }
}
