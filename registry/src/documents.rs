//! Barangay certificate requests
//!
//! A request names the document, the resident (by first and last name, as
//! staff type them at the counter) and the purpose. Issuing resolves the
//! name against the registry and stamps the date. Rendering the printed
//! certificate is left to the front end.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, Result};
use crate::records::{labelled_enum, ResidentId, ResidentRecord};

labelled_enum! {
    DocumentType("document type") {
        BarangayClearance => "Barangay Clearance",
        ResidencyCertification => "Residency Certification",
        IndigencyCertificate => "Indigency Certificate",
    }
}

/// What staff enter to request a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentRequest {
    #[serde(rename = "type")]
    pub document_type: String,
    #[serde(rename = "firstname")]
    pub first_name: String,
    #[serde(rename = "lastname")]
    pub last_name: String,
    pub purpose: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedDocument {
    pub id: u64,
    #[serde(rename = "type")]
    pub document_type: DocumentType,
    pub resident_id: ResidentId,
    /// `Lastname, Firstname` as it appears in the document list.
    pub resident_name: String,
    pub date_issued: NaiveDate,
    pub purpose: String,
}

impl DocumentRequest {
    fn require_filled(&self) -> Result<()> {
        let missing: Vec<&str> = [
            ("type", &self.document_type),
            ("firstname", &self.first_name),
            ("lastname", &self.last_name),
            ("purpose", &self.purpose),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(RegistryError::Validation(format!(
                "missing required fields: {}",
                missing.join(", ")
            )))
        }
    }

    /// Find the requesting resident. Names match trimmed and case-insensitively;
    /// the first match in `residents` wins.
    pub fn find_resident<'a, I>(&self, residents: I) -> Option<&'a ResidentRecord>
    where
        I: IntoIterator<Item = &'a ResidentRecord>,
    {
        let first = self.first_name.trim().to_lowercase();
        let last = self.last_name.trim().to_lowercase();
        residents.into_iter().find(|r| {
            r.first_name.trim().to_lowercase() == first && r.last_name.trim().to_lowercase() == last
        })
    }

    /// Validate the request and build the document record.
    pub fn issue<'a, I>(&self, residents: I, id: u64, today: NaiveDate) -> Result<IssuedDocument>
    where
        I: IntoIterator<Item = &'a ResidentRecord>,
    {
        self.require_filled()?;
        let document_type: DocumentType = self.document_type.parse()?;
        let resident = self.find_resident(residents).ok_or_else(|| RegistryError::NotFound {
            kind: "Resident",
            id: format!("{}, {}", self.last_name.trim(), self.first_name.trim()),
        })?;
        Ok(IssuedDocument {
            id,
            document_type,
            resident_id: resident.id.clone(),
            resident_name: format!("{}, {}", resident.last_name, resident.first_name),
            date_issued: today,
            purpose: self.purpose.trim().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resident(id: &str, first: &str, last: &str) -> ResidentRecord {
        ResidentRecord {
            id: ResidentId::from(id),
            first_name: first.into(),
            last_name: last.into(),
            birthday: None,
            age: 41,
            gender: "Female".into(),
            address: "5 Bonifacio St".into(),
            house_number: "5".into(),
            purok: "4".into(),
            years_of_residency: Some(12),
            employment_status: None,
            occupation: Some("Vendor".into()),
            monthly_income_range: None,
            education_level: None,
            email: String::new(),
            phone_number: String::new(),
            civil_status: None,
            religion: String::new(),
        }
    }

    fn request(document_type: &str, first: &str, last: &str) -> DocumentRequest {
        DocumentRequest {
            document_type: document_type.into(),
            first_name: first.into(),
            last_name: last.into(),
            purpose: "Scholarship".into(),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
    }

    #[test]
    fn test_issue_matches_names_case_insensitively() {
        let residents = [resident("1", "Ana", "Cruz"), resident("2", "Maria", "Santos")];
        let document = request("Indigency Certificate", " maria ", "SANTOS")
            .issue(&residents, 7, today())
            .unwrap();
        assert_eq!(document.id, 7);
        assert_eq!(document.resident_id, ResidentId::from("2"));
        assert_eq!(document.resident_name, "Santos, Maria");
        assert_eq!(document.document_type, DocumentType::IndigencyCertificate);
        assert_eq!(document.date_issued, today());
    }

    #[test]
    fn test_issue_rejects_incomplete_or_unknown_requests() {
        let residents = [resident("1", "Ana", "Cruz")];
        let mut blank = request("Barangay Clearance", "Ana", "Cruz");
        blank.purpose = "  ".into();
        assert!(matches!(
            blank.issue(&residents, 1, today()),
            Err(RegistryError::Validation(message)) if message.contains("purpose")
        ));
        assert!(matches!(
            request("Business Permit", "Ana", "Cruz").issue(&residents, 1, today()),
            Err(RegistryError::Validation(_))
        ));
        assert!(matches!(
            request("Barangay Clearance", "Ana", "Reyes").issue(&residents, 1, today()),
            Err(RegistryError::NotFound { .. })
        ));
    }

    #[test]
    fn test_request_reads_form_field_names() {
        let request: DocumentRequest = serde_json::from_str(
            r#"{"type":"Residency Certification","firstname":"Ana","lastname":"Cruz","purpose":"Bank"}"#,
        )
        .unwrap();
        assert_eq!(request.first_name, "Ana");
        assert_eq!(request.document_type, "Residency Certification");
    }
}
