use anyhow::anyhow;
use clap::Subcommand;

use registry::auth::Permission;
use registry::households::{HouseholdEditor, MemberId, MemberRole};
use registry::persistence::ResidentStore;
use registry::records::Relationship;
use registry::session::HouseholdBoard;

use super::Output;
use crate::state::{AppState, HouseholdView};

#[derive(Subcommand)]
pub enum HouseholdsCommand {
    List,
    Show {
        household: String,
    },
    /// Designate the head of family
    SetHead {
        household: String,
        member: String,
    },
    /// Record a member's relationship to the head ("Head of Family" promotes the member)
    SetRelationship {
        household: String,
        member: String,
        relationship: String,
    },
    /// Choose the address shown for the household
    SetAddress {
        household: String,
        address: String,
    },
}

pub fn run(state: &mut AppState, command: HouseholdsCommand) -> anyhow::Result<Output> {
    state.session.require(Permission::Household)?;

    let residents = state.store.list_residents()?;
    state.session.board.sync(&residents);

    let editor = state.editor;
    let household_id = match command {
        HouseholdsCommand::List => {
            let views: Vec<HouseholdView> = state
                .session
                .board
                .households()
                .iter()
                .map(|h| HouseholdView::from(&**h))
                .collect();
            return Ok(serde_json::to_value(views)?);
        }
        HouseholdsCommand::Show { household } => household,
        HouseholdsCommand::SetHead { household, member } => {
            let member = MemberId(member);
            state
                .session
                .board
                .edit(|h| editor.set_head_of_family(h, &household, &member))?;
            state
                .session
                .record(format!("Set head of family for household {}: {}", household, member));
            household
        }
        HouseholdsCommand::SetRelationship {
            household,
            member,
            relationship,
        } => {
            let member = MemberId(member);
            apply_relationship(
                &mut state.session.board,
                editor,
                &household,
                &member,
                &relationship,
            )?;
            state.session.record(format!(
                "Set relationship for {} in household {}",
                member, household
            ));
            household
        }
        HouseholdsCommand::SetAddress { household, address } => {
            state
                .session
                .board
                .edit(|h| editor.set_primary_address(h, &household, &address))?;
            state.session.record(format!(
                "Set primary address for household {}: {}",
                household, address
            ));
            household
        }
    };

    let household = state
        .session
        .board
        .households()
        .iter()
        .find(|h| h.id == household_id)
        .ok_or_else(|| anyhow!("Household not found: {}", household_id))?;
    Ok(serde_json::to_value(HouseholdView::from(&**household))?)
}

/// Record a relationship choice. Choosing the head role promotes the member
/// instead, dropping any relationship they had.
fn apply_relationship(
    board: &mut HouseholdBoard,
    editor: HouseholdEditor,
    household: &str,
    member: &MemberId,
    relationship: &str,
) -> anyhow::Result<()> {
    if relationship.trim() == MemberRole::HeadOfFamily.to_string() {
        board.edit(|h| editor.promote_to_head(h, household, member))?;
    } else {
        let relationship: Relationship = relationship.parse()?;
        board.edit(|h| editor.set_relationship(h, household, member, relationship))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use registry::records::{ResidentId, ResidentRecord};

    fn resident(id: &str, age: u32) -> ResidentRecord {
        ResidentRecord {
            id: ResidentId::from(id),
            first_name: format!("Name{}", id),
            last_name: "Garcia".into(),
            birthday: None,
            age,
            gender: "Male".into(),
            address: "8 Rizal St".into(),
            house_number: "8".into(),
            purok: "1".into(),
            years_of_residency: Some(10),
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

    fn board() -> (HouseholdBoard, MemberId) {
        let mut board = HouseholdBoard::default();
        board.sync(&[resident("1", 70), resident("2", 40)]);
        let younger = board.households()[0].members[1].member_id.clone();
        (board, younger)
    }

    #[test]
    fn test_head_of_family_choice_promotes_member() {
        let (mut board, member) = board();
        let editor = HouseholdEditor::default();
        apply_relationship(&mut board, editor, "8", &member, "Son").unwrap();
        assert_eq!(
            board.households()[0].relationships.get(&member),
            Some(&Relationship::Son)
        );

        apply_relationship(&mut board, editor, "8", &member, " Head of Family ").unwrap();
        let household = &board.households()[0];
        assert_eq!(household.head_of_family.as_ref(), Some(&member));
        assert!(!household.relationships.contains_key(&member));
        assert_eq!(household.role_of(&member), MemberRole::HeadOfFamily);
    }

    #[test]
    fn test_unknown_relationship_leaves_board_untouched() {
        let (mut board, member) = board();
        let before = board.households()[0].clone();
        assert!(apply_relationship(&mut board, HouseholdEditor::default(), "8", &member, "Cousin")
            .is_err());
        assert_eq!(*board.households()[0], *before);
    }
}
