//! Resident and medical record types
//!
//! `ResidentRecord` is the typed record the rest of the crate works with.
//! `ResidentForm` is what arrives from outside (JSON, CSV, command line):
//! every field optional and loosely typed, validated into a record at the
//! data-entry boundary or converted leniently for read-only aggregation.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, Result};

/// Date format used for birthdays everywhere a date is rendered as text.
pub const BIRTHDAY_FORMAT: &str = "%Y-%m-%d";

/// Oldest age accepted on data entry.
pub const MAX_AGE: u32 = 150;

fn check_age(age: u32) -> Result<()> {
    if age > MAX_AGE {
        return Err(RegistryError::Validation(format!(
            "age {} is above the maximum of {}",
            age, MAX_AGE
        )));
    }
    Ok(())
}

/// Declares a closed enumeration backed by fixed display labels.
///
/// Labels are matched exactly (after trimming); aliases are accepted on
/// input but never produced on output.
macro_rules! labelled_enum {
    (
        $(#[$meta:meta])*
        $name:ident ($kind:literal) {
            $($variant:ident => $label:literal $(| $alias:literal)*),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn label(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::error::RegistryError;

            fn from_str(s: &str) -> $crate::error::Result<Self> {
                let trimmed = s.trim();
                $(
                    if trimmed == $label $(|| trimmed == $alias)* {
                        return Ok($name::$variant);
                    }
                )+
                Err($crate::error::RegistryError::Validation(format!(
                    "unknown {} '{}'",
                    $kind, trimmed
                )))
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.label())
            }
        }

        impl ::serde::Serialize for $name {
            fn serialize<S: ::serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
                serializer.serialize_str(self.label())
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D: ::serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
                let label = <String as ::serde::Deserialize>::deserialize(deserializer)?;
                label.parse().map_err(::serde::de::Error::custom)
            }
        }
    };
}

pub(crate) use labelled_enum;

// ============================================================================
// Closed enumerations
// ============================================================================

labelled_enum! {
    EmploymentStatus("employment status") {
        Employed => "Employed",
        Unemployed => "Unemployed",
        SelfEmployed => "Self-Employed",
        Retired => "Retired",
        Student => "Student",
    }
}

labelled_enum! {
    /// Monthly income bands, declared lowest first.
    IncomeBand("income range") {
        Below5k => "below 5,000",
        From5kTo10k => "5,000 - 10,000",
        From10kTo20k => "10,001 - 20,000",
        From20kTo30k => "20,001 - 30,000",
        Above30k => "above 30,000",
    }
}

labelled_enum! {
    /// Highest completed education, declared lowest first.
    EducationLevel("education level") {
        NoFormal => "None" | "No Formal Education",
        Elementary => "Elementary",
        HighSchool => "High School",
        Vocational => "Vocational",
        College => "College",
        PostGraduate => "Post-Graduate",
    }
}

labelled_enum! {
    CivilStatus("civil status") {
        Single => "Single",
        Married => "Married",
        Widowed => "Widowed",
        Divorced => "Divorced",
    }
}

labelled_enum! {
    /// Relationship of a household member to the head of family.
    Relationship("relationship") {
        Spouse => "Spouse",
        Son => "Son",
        Daughter => "Daughter",
        Father => "Father",
        Mother => "Mother",
        Grandparent => "Grandparent",
        Grandchild => "Grandchild",
        Sibling => "Sibling",
        InLaw => "In-Law",
        OtherRelative => "Other Relative",
        NonRelative => "Non-Relative",
    }
}

// ============================================================================
// Resident
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResidentId(pub String);

impl fmt::Display for ResidentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResidentId {
    fn from(id: &str) -> Self {
        ResidentId(id.to_string())
    }
}

/// A registered resident.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResidentRecord {
    pub id: ResidentId,
    #[serde(rename = "firstname")]
    pub first_name: String,
    #[serde(rename = "lastname")]
    pub last_name: String,
    pub birthday: Option<NaiveDate>,
    pub age: u32,
    pub gender: String,
    pub address: String,
    pub house_number: String,
    pub purok: String,
    pub years_of_residency: Option<u32>,
    pub employment_status: Option<EmploymentStatus>,
    pub occupation: Option<String>,
    pub monthly_income_range: Option<IncomeBand>,
    pub education_level: Option<EducationLevel>,
    pub email: String,
    #[serde(rename = "pnumber")]
    pub phone_number: String,
    pub civil_status: Option<CivilStatus>,
    pub religion: String,
}

impl ResidentRecord {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn is_adult(&self) -> bool {
        self.age >= 18
    }

    pub fn is_employed(&self) -> bool {
        self.employment_status == Some(EmploymentStatus::Employed)
    }

    pub fn birthday_text(&self) -> String {
        self.birthday
            .map(|d| d.format(BIRTHDAY_FORMAT).to_string())
            .unwrap_or_default()
    }
}

// ============================================================================
// Data-entry form
// ============================================================================

/// Loosely typed resident input.
///
/// Numbers may be JSON numbers or numeric strings; the phone number is
/// accepted as either `pnumber` or `phoneNumber`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResidentForm {
    #[serde(deserialize_with = "lenient::text")]
    pub id: Option<String>,
    #[serde(rename = "firstname")]
    pub first_name: Option<String>,
    #[serde(rename = "lastname")]
    pub last_name: Option<String>,
    pub birthday: Option<String>,
    #[serde(deserialize_with = "lenient::number")]
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub address: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub house_number: Option<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub purok: Option<String>,
    #[serde(deserialize_with = "lenient::number")]
    pub years_of_residency: Option<u32>,
    pub employment_status: Option<String>,
    pub occupation: Option<String>,
    pub monthly_income_range: Option<String>,
    pub education_level: Option<String>,
    pub email: Option<String>,
    #[serde(rename = "pnumber", alias = "phoneNumber", deserialize_with = "lenient::text")]
    pub phone_number: Option<String>,
    pub civil_status: Option<String>,
    pub religion: Option<String>,
}

fn filled(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_filled<T: FromStr>(value: &Option<String>) -> Option<T> {
    filled(value).and_then(|v| v.parse().ok())
}

impl ResidentForm {
    /// Names of required fields that are absent or blank.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let text_fields: [(&'static str, &Option<String>); 16] = [
            ("id", &self.id),
            ("firstname", &self.first_name),
            ("lastname", &self.last_name),
            ("birthday", &self.birthday),
            ("gender", &self.gender),
            ("address", &self.address),
            ("email", &self.email),
            ("pnumber", &self.phone_number),
            ("civilStatus", &self.civil_status),
            ("religion", &self.religion),
            ("houseNumber", &self.house_number),
            ("purok", &self.purok),
            ("employmentStatus", &self.employment_status),
            ("occupation", &self.occupation),
            ("monthlyIncomeRange", &self.monthly_income_range),
            ("educationLevel", &self.education_level),
        ];

        let mut missing: Vec<&'static str> = text_fields
            .iter()
            .filter(|(_, value)| filled(value).is_none())
            .map(|(name, _)| *name)
            .collect();
        if self.age.is_none() {
            missing.push("age");
        }
        if self.years_of_residency.is_none() {
            missing.push("yearsOfResidency");
        }
        missing
    }

    /// Strict conversion used when a resident is created.
    pub fn validate(&self) -> Result<ResidentRecord> {
        let missing = self.missing_fields();
        if !missing.is_empty() {
            return Err(RegistryError::Validation(format!(
                "missing required fields: {}",
                missing.join(", ")
            )));
        }
        check_age(self.age.unwrap_or_default())?;

        let text = |value: &Option<String>| filled(value).unwrap_or_default().to_string();
        let birthday_text = text(&self.birthday);
        let birthday = NaiveDate::parse_from_str(&birthday_text, BIRTHDAY_FORMAT).map_err(|_| {
            RegistryError::Validation(format!("birthday '{}' is not a YYYY-MM-DD date", birthday_text))
        })?;

        Ok(ResidentRecord {
            id: ResidentId(text(&self.id)),
            first_name: text(&self.first_name),
            last_name: text(&self.last_name),
            birthday: Some(birthday),
            age: self.age.unwrap_or_default(),
            gender: text(&self.gender),
            address: text(&self.address),
            house_number: text(&self.house_number),
            purok: text(&self.purok),
            years_of_residency: self.years_of_residency,
            employment_status: Some(text(&self.employment_status).parse()?),
            occupation: Some(text(&self.occupation)),
            monthly_income_range: Some(text(&self.monthly_income_range).parse()?),
            education_level: Some(text(&self.education_level).parse()?),
            email: text(&self.email),
            phone_number: text(&self.phone_number),
            civil_status: Some(text(&self.civil_status).parse()?),
            religion: text(&self.religion),
        })
    }

    /// Total conversion for read-only use: anything unparseable becomes
    /// absent or empty instead of an error.
    pub fn into_record_lenient(self) -> ResidentRecord {
        let text = |value: &Option<String>| filled(value).unwrap_or_default().to_string();

        ResidentRecord {
            id: ResidentId(text(&self.id)),
            first_name: text(&self.first_name),
            last_name: text(&self.last_name),
            birthday: filled(&self.birthday)
                .and_then(|v| NaiveDate::parse_from_str(v, BIRTHDAY_FORMAT).ok()),
            age: self.age.unwrap_or_default(),
            gender: text(&self.gender),
            address: text(&self.address),
            house_number: text(&self.house_number),
            purok: text(&self.purok),
            years_of_residency: self.years_of_residency,
            employment_status: parse_filled(&self.employment_status),
            occupation: filled(&self.occupation).map(str::to_string),
            monthly_income_range: parse_filled(&self.monthly_income_range),
            education_level: parse_filled(&self.education_level),
            email: text(&self.email),
            phone_number: text(&self.phone_number),
            civil_status: parse_filled(&self.civil_status),
            religion: text(&self.religion),
        }
    }
}

/// Partial resident update. Unset or blank fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResidentPatch {
    #[serde(rename = "firstname")]
    pub first_name: Option<String>,
    #[serde(rename = "lastname")]
    pub last_name: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub address: Option<String>,
    pub house_number: Option<String>,
    pub purok: Option<String>,
    pub years_of_residency: Option<u32>,
    pub employment_status: Option<EmploymentStatus>,
    pub occupation: Option<String>,
    pub monthly_income_range: Option<IncomeBand>,
    pub education_level: Option<EducationLevel>,
    pub email: Option<String>,
    #[serde(rename = "pnumber")]
    pub phone_number: Option<String>,
    pub civil_status: Option<CivilStatus>,
    pub religion: Option<String>,
}

impl ResidentPatch {
    pub fn is_empty(&self) -> bool {
        [
            &self.first_name,
            &self.last_name,
            &self.gender,
            &self.address,
            &self.house_number,
            &self.purok,
            &self.occupation,
            &self.email,
            &self.phone_number,
            &self.religion,
        ]
        .iter()
        .all(|value| filled(value).is_none())
            && self.birthday.is_none()
            && self.age.is_none()
            && self.years_of_residency.is_none()
            && self.employment_status.is_none()
            && self.monthly_income_range.is_none()
            && self.education_level.is_none()
            && self.civil_status.is_none()
    }

    /// Reject values no record may hold.
    pub fn validate(&self) -> Result<()> {
        if let Some(age) = self.age {
            check_age(age)?;
        }
        Ok(())
    }

    pub fn apply_to(&self, record: &mut ResidentRecord) {
        let assign = |target: &mut String, value: &Option<String>| {
            if let Some(v) = filled(value) {
                *target = v.to_string();
            }
        };
        assign(&mut record.first_name, &self.first_name);
        assign(&mut record.last_name, &self.last_name);
        assign(&mut record.gender, &self.gender);
        assign(&mut record.address, &self.address);
        assign(&mut record.house_number, &self.house_number);
        assign(&mut record.purok, &self.purok);
        assign(&mut record.email, &self.email);
        assign(&mut record.phone_number, &self.phone_number);
        assign(&mut record.religion, &self.religion);

        if let Some(occupation) = filled(&self.occupation) {
            record.occupation = Some(occupation.to_string());
        }
        if self.birthday.is_some() {
            record.birthday = self.birthday;
        }
        if let Some(age) = self.age {
            record.age = age;
        }
        if self.years_of_residency.is_some() {
            record.years_of_residency = self.years_of_residency;
        }
        if self.employment_status.is_some() {
            record.employment_status = self.employment_status;
        }
        if self.monthly_income_range.is_some() {
            record.monthly_income_range = self.monthly_income_range;
        }
        if self.education_level.is_some() {
            record.education_level = self.education_level;
        }
        if self.civil_status.is_some() {
            record.civil_status = self.civil_status;
        }
    }
}

// ============================================================================
// Medical record
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MedicalRecord {
    pub health_conditions: String,
    pub blood_type: String,
    pub vaccination_status: String,
    pub insurance_status: String,
    pub notes: String,
}

impl MedicalRecord {
    pub fn is_empty(&self) -> bool {
        *self == MedicalRecord::default()
    }
}

/// Partial medical record update. Blank values are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MedicalRecordPatch {
    pub health_conditions: Option<String>,
    pub blood_type: Option<String>,
    pub vaccination_status: Option<String>,
    pub insurance_status: Option<String>,
    pub notes: Option<String>,
}

impl MedicalRecordPatch {
    pub fn apply_to(&self, record: &mut MedicalRecord) {
        let fields = [
            (&mut record.health_conditions, &self.health_conditions),
            (&mut record.blood_type, &self.blood_type),
            (&mut record.vaccination_status, &self.vaccination_status),
            (&mut record.insurance_status, &self.insurance_status),
            (&mut record.notes, &self.notes),
        ];
        for (target, value) in fields {
            if let Some(v) = filled(value) {
                *target = v.to_string();
            }
        }
    }
}

// ============================================================================
// Lenient field parsing
// ============================================================================

mod lenient {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrText {
        Integer(u64),
        Float(f64),
        Text(String),
    }

    /// Accepts `12`, `12.0` or `"12"`; anything else becomes `None`.
    pub fn number<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<NumberOrText>::deserialize(deserializer)?;
        Ok(value.and_then(|v| match v {
            NumberOrText::Integer(n) => u32::try_from(n).ok(),
            NumberOrText::Float(f) if f.is_finite() && f >= 0.0 => Some(f as u32),
            NumberOrText::Float(_) => None,
            NumberOrText::Text(s) => s.trim().parse().ok(),
        }))
    }

    /// Accepts strings and numbers, rendering numbers as text.
    pub fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<NumberOrText>::deserialize(deserializer)?;
        Ok(value.map(|v| match v {
            NumberOrText::Integer(n) => n.to_string(),
            NumberOrText::Float(f) => f.to_string(),
            NumberOrText::Text(s) => s,
        }))
    }
}
