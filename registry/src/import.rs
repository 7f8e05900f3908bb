//! Bulk resident import from CSV
//!
//! The header row uses the same field names as the JSON form
//! (`firstname`, `houseNumber`, `pnumber`, ...). A batch is all or nothing.

use std::collections::HashMap;
use std::io::Read;

use csv::{ReaderBuilder, Trim};
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::error::{RegistryError, Result};
use crate::records::ResidentForm;

/// Parse every data row into a resident form.
///
/// Cells are trimmed and fully blank rows skipped. If any remaining row is
/// missing a required field, nothing is returned.
pub fn import_residents<R: Read>(reader: R) -> Result<Vec<ResidentForm>> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut forms = Vec::new();
    let mut invalid = 0usize;
    for (index, row) in reader.deserialize::<HashMap<String, String>>().enumerate() {
        let row = row?;
        if row.values().all(String::is_empty) {
            continue;
        }
        let form = form_from_cells(row)?;
        let missing = form.missing_fields();
        if !missing.is_empty() {
            // Row numbers are 1-based and count the header
            warn!("Row {} is missing {}", index + 2, missing.join(", "));
            invalid += 1;
            continue;
        }
        forms.push(form);
    }

    if invalid > 0 {
        return Err(RegistryError::Import(format!(
            "{} row(s) are missing required fields",
            invalid
        )));
    }
    if forms.is_empty() {
        return Err(RegistryError::Import("no residents to import".into()));
    }
    info!("Parsed {} residents from CSV", forms.len());
    Ok(forms)
}

/// Cells are kept as text so values like phone numbers keep leading zeros;
/// the form's own field names and lenient number parsing do the rest.
fn form_from_cells(row: HashMap<String, String>) -> Result<ResidentForm> {
    let object: Map<String, Value> = row
        .into_iter()
        .filter(|(_, cell)| !cell.is_empty())
        .map(|(header, cell)| (header, Value::String(cell)))
        .collect();
    serde_json::from_value(Value::Object(object)).map_err(|e| RegistryError::Import(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "id,firstname,lastname,birthday,age,gender,address,houseNumber,purok,\
yearsOfResidency,employmentStatus,occupation,monthlyIncomeRange,educationLevel,email,pnumber,\
civilStatus,religion";

    fn row(id: &str) -> String {
        format!(
            "{id}, Jose ,Rizal,1961-06-19,63,Male,12 Mabini St,12,3,20,Employed,Teacher,\
\"10,001 - 20,000\",College,jose@mail.ph,09170000000,Married,Catholic"
        )
    }

    #[test]
    fn test_import_trims_and_skips_blank_rows() {
        let csv = format!("{}\n{}\n,,,,,,,,,,,,,,,,,\n{}\n", HEADER, row("1"), row("2"));
        let forms = import_residents(csv.as_bytes()).unwrap();
        assert_eq!(forms.len(), 2);
        assert_eq!(forms[0].first_name.as_deref(), Some("Jose"));
        assert_eq!(forms[1].id.as_deref(), Some("2"));

        let record = forms[0].validate().unwrap();
        assert_eq!(record.age, 63);
        assert_eq!(record.monthly_income_range.map(|b| b.label()), Some("10,001 - 20,000"));
    }

    #[test]
    fn test_one_incomplete_row_rejects_batch() {
        let incomplete = row("3").replace("Teacher", "");
        let csv = format!("{}\n{}\n{}\n", HEADER, row("1"), incomplete);
        match import_residents(csv.as_bytes()) {
            Err(RegistryError::Import(message)) => assert!(message.starts_with("1 row")),
            other => panic!("expected import error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_batch_is_an_error() {
        let csv = format!("{}\n", HEADER);
        assert!(matches!(
            import_residents(csv.as_bytes()),
            Err(RegistryError::Import(_))
        ));
    }

    #[test]
    fn test_text_cells_keep_leading_zeros() {
        let csv = format!("{}\n{}\n", HEADER, row("0007"));
        let forms = import_residents(csv.as_bytes()).unwrap();
        assert_eq!(forms[0].id.as_deref(), Some("0007"));
        assert_eq!(forms[0].phone_number.as_deref(), Some("09170000000"));
        assert_eq!(forms[0].years_of_residency, Some(20));
    }

    #[test]
    fn test_unknown_columns_are_ignored() {
        let csv = format!("{},notes\n{},likes basketball\n", HEADER, row("5"));
        let forms = import_residents(csv.as_bytes()).unwrap();
        assert_eq!(forms.len(), 1);
    }

    #[test]
    fn test_phone_number_header_alias() {
        let csv = format!("{}\n{}\n", HEADER.replace("pnumber", "phoneNumber"), row("9"));
        let forms = import_residents(csv.as_bytes()).unwrap();
        assert_eq!(forms[0].phone_number.as_deref(), Some("09170000000"));
    }
}
