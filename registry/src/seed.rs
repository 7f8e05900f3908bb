//! Sample resident generation
//!
//! Produces complete resident forms grouped into households that share a
//! house number, for demos and for exercising the aggregator at scale.

use chrono::{Datelike, NaiveDate, Utc};
use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::error::{RegistryError, Result};
use crate::names::{pick, random_first_name, random_last_name, OCCUPATIONS, RELIGIONS, STREETS};
use crate::records::{
    CivilStatus, EducationLevel, EmploymentStatus, IncomeBand, ResidentForm, BIRTHDAY_FORMAT,
};

const MAX_AGE: f64 = 95.0;
const MAX_HOUSEHOLD_SIZE: usize = 6;
const PUROK_COUNT: u32 = 7;

/// Generate `count` residents with ids numbered from `first_id`.
///
/// Each family gets its own house number, counting up from `first_house`,
/// so generated households never merge with each other or with houses
/// below that number.
pub fn random_residents<R: Rng + ?Sized>(
    count: usize,
    first_id: u64,
    first_house: u32,
    rng: &mut R,
) -> Result<Vec<ResidentForm>> {
    let ages =
        Normal::<f64>::new(32.0, 20.0).map_err(|e| RegistryError::Validation(e.to_string()))?;
    let this_year = Utc::now().year();

    let mut residents = Vec::with_capacity(count);
    let mut next_id = first_id;
    let mut next_house = first_house;
    while residents.len() < count {
        let size = rng
            .gen_range(1..=MAX_HOUSEHOLD_SIZE)
            .min(count - residents.len());
        let house_number = next_house.to_string();
        next_house = next_house.saturating_add(1);
        let street = pick(rng, STREETS);
        let purok = rng.gen_range(1..=PUROK_COUNT).to_string();
        let family_name = random_last_name(rng);

        for _ in 0..size {
            let age = ages.sample(rng).round().clamp(0.0, MAX_AGE) as u32;
            let is_male = rng.gen_bool(0.5);
            let first_name = random_first_name(rng, is_male);
            let birthday = random_birthday(rng, this_year - age as i32);

            let adult = age >= 18;
            let employment = if adult {
                *pick_from(rng, EmploymentStatus::ALL)
            } else {
                EmploymentStatus::Student
            };
            let education = if adult {
                *pick_from(rng, EducationLevel::ALL)
            } else {
                *pick_from(rng, &[EducationLevel::Elementary, EducationLevel::HighSchool])
            };
            let civil = if adult {
                *pick_from(rng, CivilStatus::ALL)
            } else {
                CivilStatus::Single
            };
            let occupation = match employment {
                EmploymentStatus::Employed | EmploymentStatus::SelfEmployed => {
                    pick(rng, OCCUPATIONS)
                }
                other => other.label(),
            };

            residents.push(ResidentForm {
                id: Some(format!("{:04}", next_id)),
                first_name: Some(first_name.to_string()),
                last_name: Some(family_name.to_string()),
                birthday: Some(birthday),
                age: Some(age),
                gender: Some(if is_male { "Male" } else { "Female" }.to_string()),
                address: Some(format!("{} {}", house_number, street)),
                house_number: Some(house_number.clone()),
                purok: Some(purok.clone()),
                years_of_residency: Some(rng.gen_range(0..=age)),
                employment_status: Some(employment.label().to_string()),
                occupation: Some(occupation.to_string()),
                monthly_income_range: Some(pick_from(rng, IncomeBand::ALL).label().to_string()),
                education_level: Some(education.label().to_string()),
                email: Some(format!(
                    "{}.{}{}@example.ph",
                    first_name.to_lowercase().replace(' ', ""),
                    family_name.to_lowercase().replace(' ', ""),
                    next_id
                )),
                phone_number: Some(format!("09{:09}", rng.gen_range(0..1_000_000_000u32))),
                civil_status: Some(civil.label().to_string()),
                religion: Some(pick(rng, RELIGIONS).to_string()),
            });
            next_id += 1;
        }
    }
    Ok(residents)
}

fn pick_from<'a, R: Rng + ?Sized, T>(rng: &mut R, items: &'a [T]) -> &'a T {
    &items[rng.gen_range(0..items.len())]
}

fn random_birthday<R: Rng + ?Sized>(rng: &mut R, year: i32) -> String {
    let month = rng.gen_range(1..=12);
    let day = rng.gen_range(1..=28);
    NaiveDate::from_ymd_opt(year, month, day)
        .map(|d| d.format(BIRTHDAY_FORMAT).to_string())
        .unwrap_or_else(|| format!("{:04}-01-01", year))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::households::group_into_households;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_generated_forms_are_complete() {
        let mut rng = StdRng::seed_from_u64(42);
        let forms = random_residents(40, 1, 1, &mut rng).unwrap();
        assert_eq!(forms.len(), 40);
        assert_eq!(forms[0].id.as_deref(), Some("0001"));
        assert_eq!(forms[39].id.as_deref(), Some("0040"));

        for form in &forms {
            let record = form.validate().unwrap();
            assert!(record.age <= 95);
            assert!(record.years_of_residency.unwrap_or(0) <= record.age);
        }
    }

    #[test]
    fn test_household_sizes_are_bounded() {
        let mut rng = StdRng::seed_from_u64(3);
        let records: Vec<_> = random_residents(2000, 100, 500, &mut rng)
            .unwrap()
            .iter()
            .map(|form| form.validate().unwrap())
            .collect();
        let households = group_into_households(&records);
        assert!(!households.is_empty());
        for household in &households {
            assert!(!household.members.is_empty());
            assert!(household.members.len() <= MAX_HOUSEHOLD_SIZE);
            let same_family = &household.members[0].resident.last_name;
            assert!(household
                .members
                .iter()
                .all(|m| &m.resident.last_name == same_family));
        }
        let members: usize = households.iter().map(|h| h.members.len()).sum();
        assert_eq!(members, 2000);
    }

    #[test]
    fn test_house_numbers_start_after_existing_ones() {
        let mut rng = StdRng::seed_from_u64(11);
        let forms = random_residents(30, 1, 42, &mut rng).unwrap();
        assert_eq!(forms[0].house_number.as_deref(), Some("42"));
        assert!(forms
            .iter()
            .filter_map(|f| f.house_number.as_deref())
            .all(|house| house.parse::<u32>().unwrap() >= 42));
    }

    #[test]
    fn test_zero_count() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(random_residents(0, 1, 1, &mut rng).unwrap().is_empty());
    }
}
