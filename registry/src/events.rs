//! Community events and their resident volunteers

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, Result};
use crate::records::{labelled_enum, ResidentId, ResidentRecord, BIRTHDAY_FORMAT};

labelled_enum! {
    EventCategory("event category") {
        HealthAndWellness => "Health & Wellness",
        Education => "Education",
        Environmental => "Environmental",
        CulturalAndArts => "Cultural & Arts",
        SportsAndRecreation => "Sports & Recreation",
        CommunityService => "Community Service",
        SafetyAndSecurity => "Safety & Security",
        Fundraising => "Fundraising",
        SeniorCitizens => "Senior Citizens",
        YouthDevelopment => "Youth Development",
    }
}

/// A resident signed up to help, with contact details copied at sign-up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Volunteer {
    pub resident_id: ResidentId,
    pub name: String,
    pub contact: String,
    pub email: String,
}

impl From<&ResidentRecord> for Volunteer {
    fn from(resident: &ResidentRecord) -> Self {
        let or_missing = |value: &str, missing: &str| {
            if value.trim().is_empty() {
                missing.to_string()
            } else {
                value.to_string()
            }
        };
        Self {
            resident_id: resident.id.clone(),
            name: resident.full_name(),
            contact: or_missing(&resident.phone_number, "No contact provided"),
            email: or_missing(&resident.email, "No email provided"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityEvent {
    pub id: u64,
    pub name: String,
    pub category: EventCategory,
    pub date: NaiveDate,
    pub description: String,
    pub volunteers: Vec<Volunteer>,
}

/// Event details as entered; name, category and date are required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventForm {
    pub name: String,
    pub category: String,
    pub date: String,
    pub description: String,
}

impl EventForm {
    fn validate(&self) -> Result<(String, EventCategory, NaiveDate)> {
        let name = self.name.trim();
        if name.is_empty() || self.category.trim().is_empty() || self.date.trim().is_empty() {
            return Err(RegistryError::Validation(
                "event name, category and date are required".into(),
            ));
        }
        let category: EventCategory = self.category.parse()?;
        let date = NaiveDate::parse_from_str(self.date.trim(), BIRTHDAY_FORMAT)
            .map_err(|e| RegistryError::Validation(format!("invalid event date: {}", e)))?;
        Ok((name.to_string(), category, date))
    }

    /// Build a new event with no volunteers.
    pub fn into_event(&self, id: u64) -> Result<CommunityEvent> {
        let (name, category, date) = self.validate()?;
        Ok(CommunityEvent {
            id,
            name,
            category,
            date,
            description: self.description.trim().to_string(),
            volunteers: Vec::new(),
        })
    }
}

impl CommunityEvent {
    /// Replace the details, keeping the id and the volunteer list.
    pub fn update(&mut self, form: &EventForm) -> Result<()> {
        let (name, category, date) = form.validate()?;
        self.name = name;
        self.category = category;
        self.date = date;
        self.description = form.description.trim().to_string();
        Ok(())
    }

    pub fn has_volunteer(&self, resident_id: &ResidentId) -> bool {
        self.volunteers.iter().any(|v| &v.resident_id == resident_id)
    }

    /// Add the resident unless already signed up. Returns whether it was added.
    pub fn add_volunteer(&mut self, resident: &ResidentRecord) -> bool {
        if self.has_volunteer(&resident.id) {
            return false;
        }
        self.volunteers.push(Volunteer::from(resident));
        true
    }

    /// Returns whether the resident was signed up.
    pub fn remove_volunteer(&mut self, resident_id: &ResidentId) -> bool {
        let before = self.volunteers.len();
        self.volunteers.retain(|v| &v.resident_id != resident_id);
        self.volunteers.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resident(id: &str, phone: &str) -> ResidentRecord {
        ResidentRecord {
            id: ResidentId::from(id),
            first_name: format!("Vol{}", id),
            last_name: "Reyes".into(),
            birthday: None,
            age: 25,
            gender: "Male".into(),
            address: "3 Mabini St".into(),
            house_number: "3".into(),
            purok: "5".into(),
            years_of_residency: Some(3),
            employment_status: None,
            occupation: None,
            monthly_income_range: None,
            education_level: None,
            email: String::new(),
            phone_number: phone.into(),
            civil_status: None,
            religion: String::new(),
        }
    }

    fn form() -> EventForm {
        EventForm {
            name: " Coastal Cleanup ".into(),
            category: "Environmental".into(),
            date: "2024-06-08".into(),
            description: "Bring gloves".into(),
        }
    }

    #[test]
    fn test_form_requires_name_category_and_date() {
        let event = form().into_event(1).unwrap();
        assert_eq!(event.name, "Coastal Cleanup");
        assert_eq!(event.category, EventCategory::Environmental);
        assert!(event.volunteers.is_empty());

        let mut missing = form();
        missing.date.clear();
        assert!(missing.into_event(2).is_err());
        let mut bad_category = form();
        bad_category.category = "Party".into();
        assert!(bad_category.into_event(2).is_err());
        let mut bad_date = form();
        bad_date.date = "June 8".into();
        assert!(bad_date.into_event(2).is_err());
    }

    #[test]
    fn test_volunteers_are_unique_by_resident() {
        let mut event = form().into_event(1).unwrap();
        let first = resident("1", "09171234567");
        assert!(event.add_volunteer(&first));
        assert!(!event.add_volunteer(&first));
        assert!(event.add_volunteer(&resident("2", "")));
        assert_eq!(event.volunteers.len(), 2);
        assert_eq!(event.volunteers[0].contact, "09171234567");
        assert_eq!(event.volunteers[1].contact, "No contact provided");
        assert_eq!(event.volunteers[1].email, "No email provided");

        assert!(event.remove_volunteer(&ResidentId::from("1")));
        assert!(!event.remove_volunteer(&ResidentId::from("1")));
        assert_eq!(event.volunteers.len(), 1);
    }

    #[test]
    fn test_update_keeps_volunteers() {
        let mut event = form().into_event(4).unwrap();
        event.add_volunteer(&resident("1", ""));
        let mut changed = form();
        changed.category = "Community Service".into();
        event.update(&changed).unwrap();
        assert_eq!(event.id, 4);
        assert_eq!(event.category, EventCategory::CommunityService);
        assert_eq!(event.volunteers.len(), 1);
    }
}
