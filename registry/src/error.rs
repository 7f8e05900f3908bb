//! Registry error type
//!
//! The household aggregator never fails; everything around it (storage,
//! accounts, import, strict household edits) reports through `RegistryError`.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("{kind} already exists: {id}")]
    AlreadyExists { kind: &'static str, id: String },

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Invalid email or password")]
    Unauthorized,

    #[error("Permission denied: {0}")]
    Forbidden(String),

    #[error("Household {household} has no {what} {value}")]
    Membership {
        household: String,
        what: &'static str,
        value: String,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Import failed: {0}")]
    Import(String),

    #[error("Password hashing error: {0}")]
    Hashing(String),
}

impl RegistryError {
    pub fn resident_not_found(id: &str) -> Self {
        RegistryError::NotFound {
            kind: "Resident",
            id: id.to_string(),
        }
    }
}

impl From<serde_json::Error> for RegistryError {
    fn from(err: serde_json::Error) -> Self {
        RegistryError::Serialization(err.to_string())
    }
}

impl From<bincode::Error> for RegistryError {
    fn from(err: bincode::Error) -> Self {
        RegistryError::Serialization(err.to_string())
    }
}

impl From<bcrypt::BcryptError> for RegistryError {
    fn from(err: bcrypt::BcryptError) -> Self {
        RegistryError::Hashing(err.to_string())
    }
}

impl From<csv::Error> for RegistryError {
    fn from(err: csv::Error) -> Self {
        RegistryError::Import(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RegistryError>;
