//! Barangay Resident Registry
//!
//! Resident and medical records, certificate requests, community events,
//! a QR payload registry, staff accounts, and the household aggregation
//! engine that groups residents by house number and scores each
//! household's living condition.

pub mod auth;
pub mod config;
pub mod demographics;
pub mod documents;
pub mod error;
pub mod events;
pub mod households;
pub mod import;
pub mod names;
pub mod persistence;
pub mod qr;
pub mod records;
pub mod seed;
pub mod session;

pub use auth::{AuthenticatedUser, Authenticator, Permission, Registration, Role};
pub use config::RegistryConfig;
pub use demographics::Demographics;
pub use documents::{DocumentRequest, DocumentType, IssuedDocument};
pub use error::{RegistryError, Result};
pub use events::{CommunityEvent, EventCategory, EventForm, Volunteer};
pub use households::{
    group_into_households, Household, HouseholdEditor, HouseholdMember, Households, MemberId,
    MemberRole, MembershipPolicy, ScoreBreakdown,
};
pub use persistence::{
    DocumentStore, EventStore, ExportData, FileStore, MemoryStore, QrStore, ResidentStore,
    SnapshotFormat, UserStore,
};
pub use qr::QrEntry;
pub use records::{MedicalRecord, MedicalRecordPatch, ResidentForm, ResidentId, ResidentPatch, ResidentRecord};
pub use session::{ActivityLog, HouseholdBoard, RefreshTicket, SessionContext};
