//! Demographic summaries over a resident snapshot

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::households::Household;
use crate::records::ResidentRecord;

/// Years-of-residency buckets, declared in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ResidencyBucket {
    UnderFive,
    FiveToNine,
    TenToFourteen,
    FifteenToNineteen,
    TwentyPlus,
}

impl ResidencyBucket {
    pub fn for_years(years: u32) -> Self {
        match years {
            0..=4 => ResidencyBucket::UnderFive,
            5..=9 => ResidencyBucket::FiveToNine,
            10..=14 => ResidencyBucket::TenToFourteen,
            15..=19 => ResidencyBucket::FifteenToNineteen,
            _ => ResidencyBucket::TwentyPlus,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ResidencyBucket::UnderFive => "Less than 5 years",
            ResidencyBucket::FiveToNine => "5-9 years",
            ResidencyBucket::TenToFourteen => "10-14 years",
            ResidencyBucket::FifteenToNineteen => "15-19 years",
            ResidencyBucket::TwentyPlus => "20+ years",
        }
    }
}

impl fmt::Display for ResidencyBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    pub name: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenderAverage {
    pub gender: String,
    pub average_age: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Demographics {
    pub total_residents: usize,
    pub average_age: u32,
    pub male_count: usize,
    pub female_count: usize,
    /// Share of residents with status Employed, as a rounded percentage.
    pub employment_rate_percent: u32,
    pub average_years_of_residency: u32,
    pub gender: Vec<CategoryCount>,
    pub employment: Vec<CategoryCount>,
    pub education: Vec<CategoryCount>,
    pub civil_status: Vec<CategoryCount>,
    pub religion: Vec<CategoryCount>,
    pub purok: Vec<CategoryCount>,
    pub income: Vec<CategoryCount>,
    pub residency: Vec<CategoryCount>,
    pub age_groups: Vec<CategoryCount>,
    pub average_age_by_gender: Vec<GenderAverage>,
    pub household_count: usize,
    pub average_living_condition_score: f64,
}

/// Counts keyed by label, reported in first-seen order.
#[derive(Default)]
struct Tally {
    counts: Vec<CategoryCount>,
}

impl Tally {
    fn add(&mut self, name: &str) {
        match self.counts.iter_mut().find(|c| c.name == name) {
            Some(entry) => entry.count += 1,
            None => self.counts.push(CategoryCount {
                name: name.to_string(),
                count: 1,
            }),
        }
    }

    fn add_present(&mut self, name: &str) {
        if !name.trim().is_empty() {
            self.add(name);
        }
    }

    fn count_of(&self, name: &str) -> usize {
        self.counts
            .iter()
            .find(|c| c.name == name)
            .map_or(0, |c| c.count)
    }

    fn into_vec(self) -> Vec<CategoryCount> {
        self.counts
    }
}

/// Counts keyed by an ordered key, reported in key order.
fn ordered_counts<K, L>(keys: impl Iterator<Item = K>, label: L) -> Vec<CategoryCount>
where
    K: Ord,
    L: Fn(&K) -> String,
{
    let mut counts: BTreeMap<K, usize> = BTreeMap::new();
    for key in keys {
        *counts.entry(key).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(key, count)| CategoryCount {
            name: label(&key),
            count,
        })
        .collect()
}

fn rounded_mean(total: u64, count: usize) -> u32 {
    if count == 0 {
        0
    } else {
        (total as f64 / count as f64).round() as u32
    }
}

impl Demographics {
    pub fn from_residents(residents: &[ResidentRecord], households: &[Arc<Household>]) -> Self {
        let total = residents.len();

        let mut gender = Tally::default();
        let mut employment = Tally::default();
        let mut education = Tally::default();
        let mut civil_status = Tally::default();
        let mut religion = Tally::default();
        let mut purok = Tally::default();
        let mut age_by_gender: Vec<(String, u64, usize)> = Vec::new();

        for resident in residents {
            gender.add_present(&resident.gender);
            if let Some(status) = resident.employment_status {
                employment.add(status.label());
            }
            if let Some(level) = resident.education_level {
                education.add(level.label());
            }
            if let Some(status) = resident.civil_status {
                civil_status.add(status.label());
            }
            religion.add_present(&resident.religion);
            purok.add_present(&resident.purok);

            if !resident.gender.trim().is_empty() {
                match age_by_gender.iter_mut().find(|(g, _, _)| *g == resident.gender) {
                    Some((_, sum, count)) => {
                        *sum += u64::from(resident.age);
                        *count += 1;
                    }
                    None => age_by_gender.push((resident.gender.clone(), u64::from(resident.age), 1)),
                }
            }
        }

        let income = ordered_counts(
            residents.iter().filter_map(|r| r.monthly_income_range),
            |band| band.label().to_string(),
        );
        let residency = ordered_counts(
            residents
                .iter()
                .filter_map(|r| r.years_of_residency)
                .map(ResidencyBucket::for_years),
            |bucket| bucket.label().to_string(),
        );
        let age_groups = ordered_counts(residents.iter().map(|r| r.age / 5 * 5), |lower| {
            format!("{}-{}", lower, lower.saturating_add(4))
        });

        let age_total: u64 = residents.iter().map(|r| u64::from(r.age)).sum();
        let residency_total: u64 = residents
            .iter()
            .map(|r| u64::from(r.years_of_residency.unwrap_or(0)))
            .sum();
        let employed = residents.iter().filter(|r| r.is_employed()).count();
        let employment_rate_percent = if total == 0 {
            0
        } else {
            (employed as f64 / total as f64 * 100.0).round() as u32
        };

        let household_count = households.len();
        let average_living_condition_score = if household_count == 0 {
            0.0
        } else {
            households
                .iter()
                .map(|h| h.living_condition_score)
                .sum::<f64>()
                / household_count as f64
        };

        Self {
            total_residents: total,
            average_age: rounded_mean(age_total, total),
            male_count: gender.count_of("Male"),
            female_count: gender.count_of("Female"),
            employment_rate_percent,
            average_years_of_residency: rounded_mean(residency_total, total),
            gender: gender.into_vec(),
            employment: employment.into_vec(),
            education: education.into_vec(),
            civil_status: civil_status.into_vec(),
            religion: religion.into_vec(),
            purok: purok.into_vec(),
            income,
            residency,
            age_groups,
            average_age_by_gender: age_by_gender
                .into_iter()
                .map(|(gender, sum, count)| GenderAverage {
                    gender,
                    average_age: rounded_mean(sum, count),
                })
                .collect(),
            household_count,
            average_living_condition_score,
        }
    }

    /// Male to female ratio as displayed on the dashboard, e.g. `"12 : 15"`.
    pub fn gender_ratio(&self) -> String {
        format!("{} : {}", self.male_count, self.female_count)
    }
}
