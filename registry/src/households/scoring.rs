//! Household income and living-condition scoring
//!
//! All lookups are total: an absent or unrecognized value scores zero.

use serde::Serialize;

use crate::households::HouseholdMember;
use crate::records::{EducationLevel, IncomeBand};

pub const INCOME_WEIGHT: f64 = 0.4;
pub const EDUCATION_WEIGHT: f64 = 0.3;
pub const EMPLOYMENT_WEIGHT: f64 = 0.2;
pub const RESIDENCY_WEIGHT: f64 = 0.1;

/// Years of residency at which the residency component saturates.
const RESIDENCY_SATURATION_YEARS: f64 = 10.0;

/// Monthly midpoint (pesos) used for each income band.
const INCOME_MIDPOINTS: &[(IncomeBand, u32)] = &[
    (IncomeBand::Below5k, 2_500),
    (IncomeBand::From5kTo10k, 7_500),
    (IncomeBand::From10kTo20k, 15_000),
    (IncomeBand::From20kTo30k, 25_000),
    (IncomeBand::Above30k, 35_000),
];

/// Per-member income tiers: first threshold the income is below wins.
const INCOME_TIERS: &[(f64, f64)] = &[
    (1_000.0, 0.1),
    (3_000.0, 0.3),
    (5_000.0, 0.5),
    (10_000.0, 0.7),
    (15_000.0, 0.9),
];

const TOP_INCOME_SCORE: f64 = 1.0;

const EDUCATION_SCORES: &[(EducationLevel, f64)] = &[
    (EducationLevel::NoFormal, 0.0),
    (EducationLevel::Elementary, 0.25),
    (EducationLevel::HighSchool, 0.5),
    (EducationLevel::Vocational, 0.7),
    (EducationLevel::College, 0.85),
    (EducationLevel::PostGraduate, 1.0),
];

/// Weighted components of a living-condition score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub income_per_member: f64,
    pub income: f64,
    pub education: f64,
    pub employment: f64,
    pub residency: f64,
    pub total: f64,
}

pub fn income_midpoint(band: Option<IncomeBand>) -> u32 {
    band.and_then(|band| {
        INCOME_MIDPOINTS
            .iter()
            .find(|(b, _)| *b == band)
            .map(|(_, midpoint)| *midpoint)
    })
    .unwrap_or(0)
}

/// Sum of band midpoints over employed members.
pub fn total_income(members: &[HouseholdMember]) -> u64 {
    members
        .iter()
        .filter(|m| m.resident.is_employed())
        .map(|m| u64::from(income_midpoint(m.resident.monthly_income_range)))
        .sum()
}

pub fn income_score(income_per_member: f64) -> f64 {
    INCOME_TIERS
        .iter()
        .find(|(threshold, _)| income_per_member < *threshold)
        .map(|(_, score)| *score)
        .unwrap_or(TOP_INCOME_SCORE)
}

pub fn education_score(level: Option<EducationLevel>) -> f64 {
    level
        .and_then(|level| {
            EDUCATION_SCORES
                .iter()
                .find(|(l, _)| *l == level)
                .map(|(_, score)| *score)
        })
        .unwrap_or(0.0)
}

pub fn average_education_score(members: &[HouseholdMember]) -> f64 {
    if members.is_empty() {
        return 0.0;
    }
    let total: f64 = members
        .iter()
        .map(|m| education_score(m.resident.education_level))
        .sum();
    total / members.len() as f64
}

pub fn employment_rate(members: &[HouseholdMember]) -> f64 {
    if members.is_empty() {
        return 0.0;
    }
    let employed = members.iter().filter(|m| m.resident.is_employed()).count();
    employed as f64 / members.len() as f64
}

/// Mean years of residency over ten, capped at one. Missing years count as zero.
pub fn residency_score(members: &[HouseholdMember]) -> f64 {
    if members.is_empty() {
        return 0.0;
    }
    let years: u64 = members
        .iter()
        .map(|m| u64::from(m.resident.years_of_residency.unwrap_or(0)))
        .sum();
    let average = years as f64 / members.len() as f64;
    (average / RESIDENCY_SATURATION_YEARS).min(1.0)
}

/// Score a household's members given their combined income.
pub fn assess(members: &[HouseholdMember], total_income: u64) -> ScoreBreakdown {
    if members.is_empty() {
        return ScoreBreakdown::default();
    }

    let income_per_member = total_income as f64 / members.len() as f64;
    let income = INCOME_WEIGHT * income_score(income_per_member);
    let education = EDUCATION_WEIGHT * average_education_score(members);
    let employment = EMPLOYMENT_WEIGHT * employment_rate(members);
    let residency = RESIDENCY_WEIGHT * residency_score(members);

    ScoreBreakdown {
        income_per_member,
        income,
        education,
        employment,
        residency,
        total: (income + education + employment + residency).clamp(0.0, 1.0),
    }
}
