//! Grouping residents into households
//!
//! One pass collects members per house number, a second pass finalizes
//! each household. Never fails: missing fields fall back to empty or zero.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::households::{scoring, Household, HouseholdMember, Households, MemberId};
use crate::records::ResidentRecord;

/// Members collected for one house number before finalization.
struct HouseholdAccumulator {
    house_number: String,
    purok: String,
    addresses: Vec<String>,
    members: Vec<HouseholdMember>,
}

impl HouseholdAccumulator {
    fn new(resident: &ResidentRecord) -> Self {
        Self {
            house_number: resident.house_number.clone(),
            purok: resident.purok.clone(),
            addresses: vec![resident.address.clone()],
            members: Vec::new(),
        }
    }

    fn add(&mut self, resident: &ResidentRecord) {
        if !self.addresses.contains(&resident.address) {
            self.addresses.push(resident.address.clone());
        }
        self.members.push(HouseholdMember {
            member_id: MemberId::for_resident(resident),
            resident: resident.clone(),
        });
    }

    fn finalize(self) -> Household {
        let primary_address = primary_address(&self.addresses, &self.members);
        let head_of_family = default_head_of_family(&self.members);
        let total_income = scoring::total_income(&self.members);
        let living_condition_score = scoring::assess(&self.members, total_income).total;

        Household {
            id: self.house_number,
            purok: self.purok,
            addresses: self.addresses,
            primary_address,
            members: self.members,
            head_of_family,
            relationships: BTreeMap::new(),
            total_income,
            living_condition_score,
        }
    }
}

/// Group residents by house number, in first-seen order of house numbers.
///
/// Every input record becomes a member, duplicates included.
pub fn group_into_households(residents: &[ResidentRecord]) -> Households {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut accumulators: Vec<HouseholdAccumulator> = Vec::new();

    for resident in residents {
        let slot = *index
            .entry(resident.house_number.as_str())
            .or_insert_with(|| {
                accumulators.push(HouseholdAccumulator::new(resident));
                accumulators.len() - 1
            });
        accumulators[slot].add(resident);
    }

    accumulators
        .into_iter()
        .map(|acc| Arc::new(acc.finalize()))
        .collect()
}

/// Most frequent member address; the earliest-seen address wins ties.
fn primary_address(addresses: &[String], members: &[HouseholdMember]) -> String {
    let mut best: Option<(&String, usize)> = None;
    for address in addresses {
        let count = members
            .iter()
            .filter(|m| &m.resident.address == address)
            .count();
        if best.map_or(true, |(_, top)| count > top) {
            best = Some((address, count));
        }
    }
    best.map(|(address, _)| address.clone()).unwrap_or_default()
}

/// Oldest adult, or the oldest member when nobody is 18 or over.
fn default_head_of_family(members: &[HouseholdMember]) -> Option<MemberId> {
    oldest(members.iter().filter(|m| m.resident.is_adult())).or_else(|| oldest(members.iter()))
}

/// Equal ages resolve to the member listed first.
fn oldest<'a>(candidates: impl Iterator<Item = &'a HouseholdMember>) -> Option<MemberId> {
    let mut best: Option<&HouseholdMember> = None;
    for member in candidates {
        if best.map_or(true, |b| member.resident.age > b.resident.age) {
            best = Some(member);
        }
    }
    best.map(|m| m.member_id.clone())
}
