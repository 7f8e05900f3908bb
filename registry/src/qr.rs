//! Registry of QR code payloads
//!
//! Staff register the text a QR code carries (usually a resident's details)
//! and later check a scanned payload against what was registered. Drawing
//! the code itself is the front end's job.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrEntry {
    pub data: String,
    pub created_at: DateTime<Utc>,
}

impl QrEntry {
    pub fn new(data: &str, created_at: DateTime<Utc>) -> Result<Self> {
        if data.trim().is_empty() {
            return Err(RegistryError::Validation(
                "data is required to register a QR code".into(),
            ));
        }
        Ok(Self {
            data: data.to_string(),
            created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_payload_is_rejected() {
        assert!(QrEntry::new(" ", Utc::now()).is_err());
        let entry = QrEntry::new("0001|Jose Rizal", Utc::now()).unwrap();
        assert_eq!(entry.data, "0001|Jose Rizal");
    }
}
