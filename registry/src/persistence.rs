//! Resident, medical record, document, event and account storage
//!
//! One set of repository interfaces with two adapters: `MemoryStore` keeps
//! everything in process, `FileStore` writes a versioned snapshot of the
//! same data to disk after every change (JSON or bincode).

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::auth::UserAccount;
use crate::documents::{DocumentRequest, IssuedDocument};
use crate::error::{RegistryError, Result};
use crate::events::{CommunityEvent, EventForm};
use crate::qr::QrEntry;
use crate::records::{
    MedicalRecord, MedicalRecordPatch, ResidentForm, ResidentId, ResidentPatch, ResidentRecord,
};

/// Snapshot schema version written by this build.
pub const SNAPSHOT_VERSION: u8 = 2;
/// Oldest version still readable. Version 1 had no documents, events or QR codes.
pub const MIN_SNAPSHOT_VERSION: u8 = 1;

// ============================================================================
// Repository interfaces
// ============================================================================

pub trait ResidentStore {
    /// Validates the form and stores a new resident.
    fn create_resident(&mut self, form: &ResidentForm) -> Result<ResidentRecord>;
    /// Stores every form or none of them.
    fn create_residents(&mut self, forms: &[ResidentForm]) -> Result<Vec<ResidentRecord>>;
    fn get_resident(&self, id: &ResidentId) -> Result<ResidentRecord>;
    /// All residents ordered by id.
    fn list_residents(&self) -> Result<Vec<ResidentRecord>>;
    fn update_resident(&mut self, id: &ResidentId, patch: &ResidentPatch) -> Result<ResidentRecord>;
    /// Removes the resident, its medical record and its volunteer sign-ups.
    /// Issued documents are kept. Deleting an unknown id is not an error.
    fn delete_resident(&mut self, id: &ResidentId) -> Result<()>;

    /// Creates or replaces the resident's medical record.
    fn save_medical_record(&mut self, id: &ResidentId, record: MedicalRecord) -> Result<()>;
    /// Empty record when the resident exists but has none on file.
    fn get_medical_record(&self, id: &ResidentId) -> Result<MedicalRecord>;
    fn update_medical_record(
        &mut self,
        id: &ResidentId,
        patch: &MedicalRecordPatch,
    ) -> Result<MedicalRecord>;
    fn delete_medical_record(&mut self, id: &ResidentId) -> Result<()>;
}

pub trait DocumentStore {
    /// Resolves the requester by name and records the document under the next id.
    fn issue_document(&mut self, request: &DocumentRequest, today: NaiveDate)
        -> Result<IssuedDocument>;
    fn get_document(&self, id: u64) -> Result<IssuedDocument>;
    /// All documents ordered by id.
    fn list_documents(&self) -> Result<Vec<IssuedDocument>>;
}

pub trait EventStore {
    fn create_event(&mut self, form: &EventForm) -> Result<CommunityEvent>;
    fn get_event(&self, id: u64) -> Result<CommunityEvent>;
    /// All events ordered by date, then id.
    fn list_events(&self) -> Result<Vec<CommunityEvent>>;
    /// Replaces the details and keeps the volunteers.
    fn update_event(&mut self, id: u64, form: &EventForm) -> Result<CommunityEvent>;
    fn delete_event(&mut self, id: u64) -> Result<()>;
    /// Signing up a resident who already volunteers leaves the event unchanged.
    fn add_volunteer(&mut self, event_id: u64, resident_id: &ResidentId)
        -> Result<CommunityEvent>;
    fn remove_volunteer(
        &mut self,
        event_id: u64,
        resident_id: &ResidentId,
    ) -> Result<CommunityEvent>;
}

pub trait QrStore {
    /// Registering a payload that is already on file returns the first entry.
    fn register_qr(&mut self, data: &str, now: DateTime<Utc>) -> Result<QrEntry>;
    /// `NotFound` for payloads that were never registered.
    fn find_qr(&self, data: &str) -> Result<QrEntry>;
}

pub trait UserStore {
    fn insert_user(&mut self, account: UserAccount) -> Result<()>;
    fn find_user(&self, email: &str) -> Result<Option<UserAccount>>;
    fn list_users(&self) -> Result<Vec<UserAccount>>;
}

// ============================================================================
// Snapshot format
// ============================================================================

/// Everything a store holds, as written to disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportData {
    pub version: u8,
    pub residents: Vec<ResidentRecord>,
    pub medical_records: Vec<ExportedMedicalRecord>,
    pub users: Vec<UserAccount>,
    #[serde(default)]
    pub documents: Vec<IssuedDocument>,
    #[serde(default)]
    pub events: Vec<CommunityEvent>,
    #[serde(default)]
    pub qr_codes: Vec<QrEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedMedicalRecord {
    pub resident_id: ResidentId,
    pub record: MedicalRecord,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotFormat {
    #[default]
    Json,
    Bincode,
}

impl SnapshotFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            SnapshotFormat::Json => "json",
            SnapshotFormat::Bincode => "bin",
        }
    }

    fn encode(&self, data: &ExportData) -> Result<Vec<u8>> {
        Ok(match self {
            SnapshotFormat::Json => serde_json::to_vec_pretty(data)?,
            SnapshotFormat::Bincode => bincode::serialize(data)?,
        })
    }

    fn decode(&self, bytes: &[u8]) -> Result<ExportData> {
        Ok(match self {
            SnapshotFormat::Json => serde_json::from_slice(bytes)?,
            SnapshotFormat::Bincode => bincode::deserialize(bytes)?,
        })
    }
}

impl FromStr for SnapshotFormat {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(SnapshotFormat::Json),
            "bincode" | "bin" => Ok(SnapshotFormat::Bincode),
            other => Err(RegistryError::Validation(format!(
                "unknown storage format '{}'",
                other
            ))),
        }
    }
}

// ============================================================================
// In-memory adapter
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    residents: BTreeMap<ResidentId, ResidentRecord>,
    medical_records: BTreeMap<ResidentId, MedicalRecord>,
    users: BTreeMap<String, UserAccount>,
    documents: BTreeMap<u64, IssuedDocument>,
    events: BTreeMap<u64, CommunityEvent>,
    qr_codes: BTreeMap<String, QrEntry>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn export(&self) -> ExportData {
        ExportData {
            version: SNAPSHOT_VERSION,
            residents: self.residents.values().cloned().collect(),
            medical_records: self
                .medical_records
                .iter()
                .map(|(id, record)| ExportedMedicalRecord {
                    resident_id: id.clone(),
                    record: record.clone(),
                })
                .collect(),
            users: self.users.values().cloned().collect(),
            documents: self.documents.values().cloned().collect(),
            events: self.events.values().cloned().collect(),
            qr_codes: self.qr_codes.values().cloned().collect(),
        }
    }

    /// Rebuild a store from a snapshot, rejecting unknown schema versions.
    pub fn import(data: ExportData) -> Result<Self> {
        if !(MIN_SNAPSHOT_VERSION..=SNAPSHOT_VERSION).contains(&data.version) {
            return Err(RegistryError::Serialization(format!(
                "unsupported snapshot version: {}",
                data.version
            )));
        }
        Ok(Self {
            residents: data
                .residents
                .into_iter()
                .map(|r| (r.id.clone(), r))
                .collect(),
            medical_records: data
                .medical_records
                .into_iter()
                .map(|m| (m.resident_id, m.record))
                .collect(),
            users: data
                .users
                .into_iter()
                .map(|u| (u.email.clone(), u))
                .collect(),
            documents: data.documents.into_iter().map(|d| (d.id, d)).collect(),
            events: data.events.into_iter().map(|e| (e.id, e)).collect(),
            qr_codes: data
                .qr_codes
                .into_iter()
                .map(|q| (q.data.clone(), q))
                .collect(),
        })
    }

    fn require_event(&mut self, id: u64) -> Result<&mut CommunityEvent> {
        self.events.get_mut(&id).ok_or_else(|| RegistryError::NotFound {
            kind: "Event",
            id: id.to_string(),
        })
    }

    fn require_resident(&self, id: &ResidentId) -> Result<&ResidentRecord> {
        self.residents
            .get(id)
            .ok_or_else(|| RegistryError::resident_not_found(&id.0))
    }
}

impl ResidentStore for MemoryStore {
    fn create_resident(&mut self, form: &ResidentForm) -> Result<ResidentRecord> {
        let record = form.validate()?;
        if self.residents.contains_key(&record.id) {
            return Err(RegistryError::AlreadyExists {
                kind: "Resident",
                id: record.id.0,
            });
        }
        self.residents.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn create_residents(&mut self, forms: &[ResidentForm]) -> Result<Vec<ResidentRecord>> {
        let mut seen = BTreeSet::new();
        let mut records = Vec::with_capacity(forms.len());
        for form in forms {
            let record = form.validate()?;
            if self.residents.contains_key(&record.id) || !seen.insert(record.id.clone()) {
                return Err(RegistryError::AlreadyExists {
                    kind: "Resident",
                    id: record.id.0,
                });
            }
            records.push(record);
        }
        for record in &records {
            self.residents.insert(record.id.clone(), record.clone());
        }
        Ok(records)
    }

    fn get_resident(&self, id: &ResidentId) -> Result<ResidentRecord> {
        self.require_resident(id).cloned()
    }

    fn list_residents(&self) -> Result<Vec<ResidentRecord>> {
        Ok(self.residents.values().cloned().collect())
    }

    fn update_resident(&mut self, id: &ResidentId, patch: &ResidentPatch) -> Result<ResidentRecord> {
        if patch.is_empty() {
            return Err(RegistryError::Validation(
                "at least one field is required to update".into(),
            ));
        }
        patch.validate()?;
        let record = self
            .residents
            .get_mut(id)
            .ok_or_else(|| RegistryError::resident_not_found(&id.0))?;
        patch.apply_to(record);
        Ok(record.clone())
    }

    fn delete_resident(&mut self, id: &ResidentId) -> Result<()> {
        self.residents.remove(id);
        self.medical_records.remove(id);
        for event in self.events.values_mut() {
            event.remove_volunteer(id);
        }
        Ok(())
    }

    fn save_medical_record(&mut self, id: &ResidentId, record: MedicalRecord) -> Result<()> {
        self.require_resident(id)?;
        self.medical_records.insert(id.clone(), record);
        Ok(())
    }

    fn get_medical_record(&self, id: &ResidentId) -> Result<MedicalRecord> {
        self.require_resident(id)?;
        Ok(self.medical_records.get(id).cloned().unwrap_or_default())
    }

    fn update_medical_record(
        &mut self,
        id: &ResidentId,
        patch: &MedicalRecordPatch,
    ) -> Result<MedicalRecord> {
        let record = self
            .medical_records
            .get_mut(id)
            .ok_or_else(|| RegistryError::NotFound {
                kind: "Medical record",
                id: id.0.clone(),
            })?;
        patch.apply_to(record);
        Ok(record.clone())
    }

    fn delete_medical_record(&mut self, id: &ResidentId) -> Result<()> {
        self.medical_records.remove(id);
        Ok(())
    }
}

fn next_id<V>(map: &BTreeMap<u64, V>) -> u64 {
    map.keys().next_back().map_or(1, |last| last + 1)
}

impl DocumentStore for MemoryStore {
    fn issue_document(
        &mut self,
        request: &DocumentRequest,
        today: NaiveDate,
    ) -> Result<IssuedDocument> {
        let document = request.issue(self.residents.values(), next_id(&self.documents), today)?;
        self.documents.insert(document.id, document.clone());
        Ok(document)
    }

    fn get_document(&self, id: u64) -> Result<IssuedDocument> {
        self.documents
            .get(&id)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound {
                kind: "Document",
                id: id.to_string(),
            })
    }

    fn list_documents(&self) -> Result<Vec<IssuedDocument>> {
        Ok(self.documents.values().cloned().collect())
    }
}

impl EventStore for MemoryStore {
    fn create_event(&mut self, form: &EventForm) -> Result<CommunityEvent> {
        let event = form.into_event(next_id(&self.events))?;
        self.events.insert(event.id, event.clone());
        Ok(event)
    }

    fn get_event(&self, id: u64) -> Result<CommunityEvent> {
        self.events
            .get(&id)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound {
                kind: "Event",
                id: id.to_string(),
            })
    }

    fn list_events(&self) -> Result<Vec<CommunityEvent>> {
        let mut events: Vec<CommunityEvent> = self.events.values().cloned().collect();
        events.sort_by_key(|e| (e.date, e.id));
        Ok(events)
    }

    fn update_event(&mut self, id: u64, form: &EventForm) -> Result<CommunityEvent> {
        let event = self.require_event(id)?;
        event.update(form)?;
        Ok(event.clone())
    }

    fn delete_event(&mut self, id: u64) -> Result<()> {
        self.events.remove(&id);
        Ok(())
    }

    fn add_volunteer(
        &mut self,
        event_id: u64,
        resident_id: &ResidentId,
    ) -> Result<CommunityEvent> {
        let resident = self.require_resident(resident_id)?.clone();
        let event = self.require_event(event_id)?;
        if !event.add_volunteer(&resident) {
            debug!("{} already volunteers for event {}", resident_id, event_id);
        }
        Ok(event.clone())
    }

    fn remove_volunteer(
        &mut self,
        event_id: u64,
        resident_id: &ResidentId,
    ) -> Result<CommunityEvent> {
        let event = self.require_event(event_id)?;
        event.remove_volunteer(resident_id);
        Ok(event.clone())
    }
}

impl QrStore for MemoryStore {
    fn register_qr(&mut self, data: &str, now: DateTime<Utc>) -> Result<QrEntry> {
        let entry = QrEntry::new(data, now)?;
        Ok(self
            .qr_codes
            .entry(entry.data.clone())
            .or_insert(entry)
            .clone())
    }

    fn find_qr(&self, data: &str) -> Result<QrEntry> {
        self.qr_codes
            .get(data)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound {
                kind: "QR code",
                id: data.to_string(),
            })
    }
}

impl UserStore for MemoryStore {
    fn insert_user(&mut self, account: UserAccount) -> Result<()> {
        if self.users.contains_key(&account.email) {
            return Err(RegistryError::AlreadyExists {
                kind: "User",
                id: account.email,
            });
        }
        self.users.insert(account.email.clone(), account);
        Ok(())
    }

    fn find_user(&self, email: &str) -> Result<Option<UserAccount>> {
        Ok(self.users.get(email).cloned())
    }

    fn list_users(&self) -> Result<Vec<UserAccount>> {
        Ok(self.users.values().cloned().collect())
    }
}

// ============================================================================
// File-backed adapter
// ============================================================================

/// A `MemoryStore` mirrored to a snapshot file after every write.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    format: SnapshotFormat,
    inner: MemoryStore,
}

impl FileStore {
    /// Open the snapshot at `path`, starting empty when it does not exist yet.
    pub fn open(path: impl Into<PathBuf>, format: SnapshotFormat) -> Result<Self> {
        let path = path.into();
        let inner = if path.exists() {
            let bytes = fs::read(&path)?;
            let store = MemoryStore::import(format.decode(&bytes)?)?;
            info!(
                "Loaded snapshot {} ({} residents)",
                path.display(),
                store.residents.len()
            );
            store
        } else {
            info!("No snapshot at {}, starting empty", path.display());
            MemoryStore::new()
        };
        Ok(Self { path, format, inner })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Apply `change` to a copy of the store and keep the copy only once it
    /// is on disk. On any error the store is left as it was.
    fn commit<T, F>(&mut self, change: F) -> Result<T>
    where
        F: FnOnce(&mut MemoryStore) -> Result<T>,
    {
        let mut next = self.inner.clone();
        let value = change(&mut next)?;
        self.write_snapshot(&next)?;
        self.inner = next;
        Ok(value)
    }

    /// Write the snapshot next to its destination, then move it into place.
    fn write_snapshot(&self, store: &MemoryStore) -> Result<()> {
        let bytes = self.format.encode(&store.export())?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let staging = self.path.with_extension("tmp");
        let written = fs::File::create(&staging).and_then(|mut file| {
            file.write_all(&bytes)?;
            file.sync_all()
        });
        if let Err(e) = written.and_then(|()| fs::rename(&staging, &self.path)) {
            warn!("Could not write {}: {}", self.path.display(), e);
            let _ = fs::remove_file(&staging);
            return Err(e.into());
        }
        debug!("Wrote {} bytes to {}", bytes.len(), self.path.display());
        Ok(())
    }
}

impl ResidentStore for FileStore {
    fn create_resident(&mut self, form: &ResidentForm) -> Result<ResidentRecord> {
        self.commit(|store| store.create_resident(form))
    }

    fn create_residents(&mut self, forms: &[ResidentForm]) -> Result<Vec<ResidentRecord>> {
        self.commit(|store| store.create_residents(forms))
    }

    fn get_resident(&self, id: &ResidentId) -> Result<ResidentRecord> {
        self.inner.get_resident(id)
    }

    fn list_residents(&self) -> Result<Vec<ResidentRecord>> {
        self.inner.list_residents()
    }

    fn update_resident(&mut self, id: &ResidentId, patch: &ResidentPatch) -> Result<ResidentRecord> {
        self.commit(|store| store.update_resident(id, patch))
    }

    fn delete_resident(&mut self, id: &ResidentId) -> Result<()> {
        self.commit(|store| store.delete_resident(id))
    }

    fn save_medical_record(&mut self, id: &ResidentId, record: MedicalRecord) -> Result<()> {
        self.commit(|store| store.save_medical_record(id, record))
    }

    fn get_medical_record(&self, id: &ResidentId) -> Result<MedicalRecord> {
        self.inner.get_medical_record(id)
    }

    fn update_medical_record(
        &mut self,
        id: &ResidentId,
        patch: &MedicalRecordPatch,
    ) -> Result<MedicalRecord> {
        self.commit(|store| store.update_medical_record(id, patch))
    }

    fn delete_medical_record(&mut self, id: &ResidentId) -> Result<()> {
        self.commit(|store| store.delete_medical_record(id))
    }
}

impl DocumentStore for FileStore {
    fn issue_document(
        &mut self,
        request: &DocumentRequest,
        today: NaiveDate,
    ) -> Result<IssuedDocument> {
        self.commit(|store| store.issue_document(request, today))
    }

    fn get_document(&self, id: u64) -> Result<IssuedDocument> {
        self.inner.get_document(id)
    }

    fn list_documents(&self) -> Result<Vec<IssuedDocument>> {
        self.inner.list_documents()
    }
}

impl EventStore for FileStore {
    fn create_event(&mut self, form: &EventForm) -> Result<CommunityEvent> {
        self.commit(|store| store.create_event(form))
    }

    fn get_event(&self, id: u64) -> Result<CommunityEvent> {
        self.inner.get_event(id)
    }

    fn list_events(&self) -> Result<Vec<CommunityEvent>> {
        self.inner.list_events()
    }

    fn update_event(&mut self, id: u64, form: &EventForm) -> Result<CommunityEvent> {
        self.commit(|store| store.update_event(id, form))
    }

    fn delete_event(&mut self, id: u64) -> Result<()> {
        self.commit(|store| store.delete_event(id))
    }

    fn add_volunteer(
        &mut self,
        event_id: u64,
        resident_id: &ResidentId,
    ) -> Result<CommunityEvent> {
        self.commit(|store| store.add_volunteer(event_id, resident_id))
    }

    fn remove_volunteer(
        &mut self,
        event_id: u64,
        resident_id: &ResidentId,
    ) -> Result<CommunityEvent> {
        self.commit(|store| store.remove_volunteer(event_id, resident_id))
    }
}

impl QrStore for FileStore {
    fn register_qr(&mut self, data: &str, now: DateTime<Utc>) -> Result<QrEntry> {
        self.commit(|store| store.register_qr(data, now))
    }

    fn find_qr(&self, data: &str) -> Result<QrEntry> {
        self.inner.find_qr(data)
    }
}

impl UserStore for FileStore {
    fn insert_user(&mut self, account: UserAccount) -> Result<()> {
        self.commit(|store| store.insert_user(account))
    }

    fn find_user(&self, email: &str) -> Result<Option<UserAccount>> {
        self.inner.find_user(email)
    }

    fn list_users(&self) -> Result<Vec<UserAccount>> {
        self.inner.list_users()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use crate::records::EmploymentStatus;

    fn form(id: &str, house: &str) -> ResidentForm {
        ResidentForm {
            id: Some(id.into()),
            first_name: Some("Liza".into()),
            last_name: Some("Mendoza".into()),
            birthday: Some("1990-01-15".into()),
            age: Some(34),
            gender: Some("Female".into()),
            address: Some(format!("{} Bonifacio St", house)),
            house_number: Some(house.into()),
            purok: Some("4".into()),
            years_of_residency: Some(6),
            employment_status: Some("Employed".into()),
            occupation: Some("Nurse".into()),
            monthly_income_range: Some("20,001 - 30,000".into()),
            education_level: Some("College".into()),
            email: Some(format!("{}@example.com", id)),
            phone_number: Some("09180000000".into()),
            civil_status: Some("Single".into()),
            religion: Some("Catholic".into()),
        }
    }

    #[test]
    fn test_resident_crud() {
        let mut store = MemoryStore::new();
        let id = ResidentId::from("r1");
        store.create_resident(&form("r1", "8")).unwrap();

        assert!(matches!(
            store.create_resident(&form("r1", "8")),
            Err(RegistryError::AlreadyExists { .. })
        ));

        let patch = ResidentPatch {
            employment_status: Some(EmploymentStatus::Unemployed),
            ..Default::default()
        };
        let updated = store.update_resident(&id, &patch).unwrap();
        assert!(!updated.is_employed());
        assert_eq!(store.get_resident(&id).unwrap(), updated);

        store.delete_resident(&id).unwrap();
        store.delete_resident(&id).unwrap();
        assert!(matches!(
            store.get_resident(&id),
            Err(RegistryError::NotFound { .. })
        ));
    }

    #[test]
    fn test_update_requires_fields_and_resident() {
        let mut store = MemoryStore::new();
        store.create_resident(&form("r1", "8")).unwrap();
        assert!(matches!(
            store.update_resident(&ResidentId::from("r1"), &ResidentPatch::default()),
            Err(RegistryError::Validation(_))
        ));
        let patch = ResidentPatch {
            age: Some(35),
            ..Default::default()
        };
        assert!(matches!(
            store.update_resident(&ResidentId::from("nobody"), &patch),
            Err(RegistryError::NotFound { .. })
        ));
    }

    #[test]
    fn test_implausible_age_is_never_stored() {
        let mut store = MemoryStore::new();
        let mut too_old = form("r1", "8");
        too_old.age = Some(u32::MAX);
        assert!(matches!(
            store.create_resident(&too_old),
            Err(RegistryError::Validation(_))
        ));
        assert!(store.list_residents().unwrap().is_empty());

        store.create_resident(&form("r1", "8")).unwrap();
        let patch = ResidentPatch {
            age: Some(u32::MAX),
            ..Default::default()
        };
        assert!(store.update_resident(&ResidentId::from("r1"), &patch).is_err());
        assert_eq!(store.get_resident(&ResidentId::from("r1")).unwrap().age, 34);
    }

    #[test]
    fn test_list_is_ordered_by_id() {
        let mut store = MemoryStore::new();
        for id in ["c", "a", "b"] {
            store.create_resident(&form(id, "1")).unwrap();
        }
        let ids: Vec<String> = store
            .list_residents()
            .unwrap()
            .into_iter()
            .map(|r| r.id.0)
            .collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_batch_create_is_all_or_nothing() {
        let mut store = MemoryStore::new();
        store.create_resident(&form("r2", "1")).unwrap();

        let batch = [form("r1", "1"), form("r2", "1")];
        assert!(matches!(
            store.create_residents(&batch),
            Err(RegistryError::AlreadyExists { .. })
        ));
        assert!(store.get_resident(&ResidentId::from("r1")).is_err());

        let repeated = [form("r3", "1"), form("r3", "2")];
        assert!(store.create_residents(&repeated).is_err());

        let created = store.create_residents(&[form("r3", "1"), form("r4", "1")]).unwrap();
        assert_eq!(created.len(), 2);
        assert_eq!(store.list_residents().unwrap().len(), 3);
    }

    #[test]
    fn test_medical_records() {
        let mut store = MemoryStore::new();
        let id = ResidentId::from("r1");
        assert!(store.get_medical_record(&id).is_err());

        store.create_resident(&form("r1", "8")).unwrap();
        assert!(store.get_medical_record(&id).unwrap().is_empty());
        assert!(matches!(
            store.update_medical_record(&id, &MedicalRecordPatch::default()),
            Err(RegistryError::NotFound { .. })
        ));

        store
            .save_medical_record(
                &id,
                MedicalRecord {
                    blood_type: "AB+".into(),
                    ..Default::default()
                },
            )
            .unwrap();
        let patch = MedicalRecordPatch {
            insurance_status: Some("Yes - PhilHealth".into()),
            ..Default::default()
        };
        let record = store.update_medical_record(&id, &patch).unwrap();
        assert_eq!(record.blood_type, "AB+");
        assert_eq!(record.insurance_status, "Yes - PhilHealth");

        store.delete_resident(&id).unwrap();
        store.create_resident(&form("r1", "8")).unwrap();
        assert!(store.get_medical_record(&id).unwrap().is_empty());
    }

    #[test]
    fn test_users_are_unique_by_email() {
        let mut store = MemoryStore::new();
        let account = UserAccount {
            email: "staff@barangay.ph".into(),
            first_name: "Staff".into(),
            last_name: "One".into(),
            role: Role::User,
            password_hash: "1$00$00".into(),
        };
        store.insert_user(account.clone()).unwrap();
        assert!(store.insert_user(account).is_err());
        assert!(store.find_user("staff@barangay.ph").unwrap().is_some());
        assert!(store.find_user("other@barangay.ph").unwrap().is_none());
    }

    #[test]
    fn test_import_rejects_unknown_version() {
        let mut data = MemoryStore::new().export();
        data.version = 9;
        assert!(MemoryStore::import(data).is_err());
    }

    #[test]
    fn test_file_store_reloads_in_both_formats() {
        let dir = tempfile::tempdir().unwrap();
        for format in [SnapshotFormat::Json, SnapshotFormat::Bincode] {
            let path = dir.path().join(format!("registry.{}", format.extension()));
            {
                let mut store = FileStore::open(&path, format).unwrap();
                store.create_resident(&form("r1", "3")).unwrap();
                store
                    .save_medical_record(
                        &ResidentId::from("r1"),
                        MedicalRecord {
                            notes: "Asthma".into(),
                            ..Default::default()
                        },
                    )
                    .unwrap();
            }
            let reopened = FileStore::open(&path, format).unwrap();
            let residents = reopened.list_residents().unwrap();
            assert_eq!(residents.len(), 1);
            assert_eq!(residents[0].house_number, "3");
            assert_eq!(
                reopened
                    .get_medical_record(&ResidentId::from("r1"))
                    .unwrap()
                    .notes,
                "Asthma"
            );
        }
    }

    #[test]
    fn test_failed_write_leaves_store_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(dir.path().join("registry.json"), SnapshotFormat::Json).unwrap();
        store.create_resident(&form("r1", "3")).unwrap();

        // A regular file where the snapshot directory should be
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, b"not a directory").unwrap();
        store.path = blocker.join("registry.json");

        assert!(matches!(
            store.create_resident(&form("r2", "3")),
            Err(RegistryError::Storage(_))
        ));
        let patch = ResidentPatch {
            occupation: Some("Farmer".into()),
            ..Default::default()
        };
        assert!(store.update_resident(&ResidentId::from("r1"), &patch).is_err());
        assert!(store.delete_resident(&ResidentId::from("r1")).is_err());

        let residents = store.list_residents().unwrap();
        assert_eq!(residents.len(), 1);
        assert_eq!(residents[0].occupation.as_deref(), Some("Nurse"));
    }

    #[test]
    fn test_documents_are_numbered_and_kept_after_resident_delete() {
        let mut store = MemoryStore::new();
        store.create_resident(&form("r1", "3")).unwrap();
        let request = DocumentRequest {
            document_type: "Barangay Clearance".into(),
            first_name: "liza".into(),
            last_name: "MENDOZA".into(),
            purpose: "Employment".into(),
        };
        let today = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        assert_eq!(store.issue_document(&request, today).unwrap().id, 1);
        let second = store.issue_document(&request, today).unwrap();
        assert_eq!(second.id, 2);
        assert_eq!(second.resident_id, ResidentId::from("r1"));

        store.delete_resident(&ResidentId::from("r1")).unwrap();
        assert_eq!(store.list_documents().unwrap().len(), 2);
        assert!(matches!(
            store.issue_document(&request, today),
            Err(RegistryError::NotFound { .. })
        ));
        assert!(store.get_document(9).is_err());
    }

    #[test]
    fn test_event_volunteers() {
        let mut store = MemoryStore::new();
        store.create_resident(&form("r1", "3")).unwrap();
        store.create_resident(&form("r2", "3")).unwrap();
        let event_form = EventForm {
            name: "Feeding Program".into(),
            category: "Health & Wellness".into(),
            date: "2024-07-01".into(),
            description: String::new(),
        };
        let event = store.create_event(&event_form).unwrap();

        store.add_volunteer(event.id, &ResidentId::from("r1")).unwrap();
        let event = store.add_volunteer(event.id, &ResidentId::from("r1")).unwrap();
        assert_eq!(event.volunteers.len(), 1);
        assert!(matches!(
            store.add_volunteer(event.id, &ResidentId::from("ghost")),
            Err(RegistryError::NotFound { .. })
        ));
        assert!(store.add_volunteer(99, &ResidentId::from("r1")).is_err());

        store.add_volunteer(event.id, &ResidentId::from("r2")).unwrap();
        store.delete_resident(&ResidentId::from("r1")).unwrap();
        let event = store.get_event(event.id).unwrap();
        assert_eq!(event.volunteers.len(), 1);
        assert_eq!(event.volunteers[0].resident_id, ResidentId::from("r2"));

        let earlier = EventForm {
            date: "2024-05-01".into(),
            ..event_form
        };
        let second = store.create_event(&earlier).unwrap();
        let ids: Vec<u64> = store.list_events().unwrap().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![second.id, event.id]);

        store.delete_event(event.id).unwrap();
        store.delete_event(event.id).unwrap();
        assert_eq!(store.list_events().unwrap().len(), 1);
    }

    #[test]
    fn test_qr_payloads_register_once() {
        let mut store = MemoryStore::new();
        let first = Utc::now();
        let entry = store.register_qr("0001|Jose Rizal", first).unwrap();
        let again = store
            .register_qr("0001|Jose Rizal", first + chrono::Duration::hours(1))
            .unwrap();
        assert_eq!(again.created_at, entry.created_at);
        assert_eq!(store.find_qr("0001|Jose Rizal").unwrap(), entry);
        assert!(matches!(
            store.find_qr("0002|Andres"),
            Err(RegistryError::NotFound { .. })
        ));
        assert!(store.register_qr("", first).is_err());
    }

    #[test]
    fn test_version_one_snapshot_still_loads() {
        let json = r#"{"version":1,"residents":[],"medical_records":[],"users":[]}"#;
        let data = SnapshotFormat::Json.decode(json.as_bytes()).unwrap();
        let store = MemoryStore::import(data).unwrap();
        assert!(store.list_events().unwrap().is_empty());
        assert!(store.list_documents().unwrap().is_empty());
    }

    #[test]
    fn test_snapshot_format_parsing() {
        assert_eq!("JSON".parse::<SnapshotFormat>().unwrap(), SnapshotFormat::Json);
        assert_eq!("bin".parse::<SnapshotFormat>().unwrap(), SnapshotFormat::Bincode);
        assert!("yaml".parse::<SnapshotFormat>().is_err());
    }
}
