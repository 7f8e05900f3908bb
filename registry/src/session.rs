//! Session context
//!
//! Per-operator state that used to live in browser storage: who is logged
//! in, the recent activity log, and the working copy of households with any
//! unsaved edits. Loaded and saved explicitly as one JSON file.

use std::collections::VecDeque;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::auth::{AuthenticatedUser, Permission};
use crate::error::{RegistryError, Result};
use crate::households::{group_into_households, Households};
use crate::records::ResidentRecord;

// ============================================================================
// Activity log
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub timestamp: DateTime<Utc>,
    pub message: String,
}

/// Bounded log of operator actions, oldest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityLog {
    limit: usize,
    entries: VecDeque<ActivityEntry>,
}

impl ActivityLog {
    pub fn new(limit: usize) -> Self {
        Self {
            limit: limit.max(1),
            entries: VecDeque::new(),
        }
    }

    pub fn record(&mut self, message: impl Into<String>) {
        self.entries.push_back(ActivityEntry {
            timestamp: Utc::now(),
            message: message.into(),
        });
        while self.entries.len() > self.limit {
            self.entries.pop_front();
        }
    }

    pub fn set_limit(&mut self, limit: usize) {
        self.limit = limit.max(1);
        while self.entries.len() > self.limit {
            self.entries.pop_front();
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = &ActivityEntry> {
        self.entries.iter()
    }

    /// The newest `count` entries, oldest first.
    pub fn recent(&self, count: usize) -> Vec<ActivityEntry> {
        let skip = self.entries.len().saturating_sub(count);
        self.entries.iter().skip(skip).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// Household board
// ============================================================================

/// Sequence number handed out before a household recomputation starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RefreshTicket(u64);

/// Working copy of the household list.
///
/// Results are applied last-write-wins by ticket: a recomputation that was
/// started before the currently applied one is discarded.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct HouseholdBoard {
    #[serde(skip)]
    issued: AtomicU64,
    applied: u64,
    /// Digest of the resident snapshot the households were built from.
    fingerprint: Option<String>,
    households: Households,
}

impl HouseholdBoard {
    pub fn begin_refresh(&self) -> RefreshTicket {
        // Never hand out a ticket at or below one already applied
        let floor = self.applied;
        let previous = self
            .issued
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| Some(n.max(floor) + 1))
            .unwrap_or(floor);
        RefreshTicket(previous.max(floor) + 1)
    }

    /// Install a recomputed household list. Returns false if it was stale.
    pub fn apply(&mut self, ticket: RefreshTicket, households: Households) -> bool {
        if ticket.0 <= self.applied {
            debug!(
                "Discarding stale households (ticket {}, applied {})",
                ticket.0, self.applied
            );
            return false;
        }
        self.applied = ticket.0;
        self.households = households;
        true
    }

    /// Regroup when the resident snapshot differs from the last one seen.
    /// Returns true when the households were rebuilt, dropping any edits.
    pub fn sync(&mut self, residents: &[ResidentRecord]) -> bool {
        let fingerprint = snapshot_fingerprint(residents);
        if fingerprint.is_some() && fingerprint == self.fingerprint {
            return false;
        }
        let ticket = self.begin_refresh();
        let applied = self.apply(ticket, group_into_households(residents));
        if applied {
            self.fingerprint = fingerprint;
        }
        applied
    }

    pub fn households(&self) -> &Households {
        &self.households
    }

    /// Replace the working copy with the result of an edit.
    pub fn edit<F>(&mut self, edit: F) -> Result<()>
    where
        F: FnOnce(&Households) -> Result<Households>,
    {
        self.households = edit(&self.households)?;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.households.clear();
        self.fingerprint = None;
    }
}

fn snapshot_fingerprint(residents: &[ResidentRecord]) -> Option<String> {
    let bytes = serde_json::to_vec(residents).ok()?;
    Some(hex::encode(Sha256::digest(&bytes)))
}

// ============================================================================
// Session
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionContext {
    pub user: Option<AuthenticatedUser>,
    pub activity: ActivityLog,
    pub board: HouseholdBoard,
}

impl SessionContext {
    pub fn new(log_limit: usize) -> Self {
        Self {
            user: None,
            activity: ActivityLog::new(log_limit),
            board: HouseholdBoard::default(),
        }
    }

    /// Load a saved session, or start a fresh one when none exists.
    pub fn load(path: &Path, log_limit: usize) -> Result<Self> {
        if !path.exists() {
            debug!("No session at {}, starting fresh", path.display());
            return Ok(Self::new(log_limit));
        }
        let mut session: SessionContext = serde_json::from_slice(&fs::read(path)?)?;
        session.activity.set_limit(log_limit);
        Ok(session)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_vec_pretty(self)?)?;
        Ok(())
    }

    pub fn login(&mut self, user: AuthenticatedUser) {
        self.activity.record(format!("User logged in: {}", user.email));
        self.user = Some(user);
    }

    /// End the session. Unsaved household edits go with it.
    pub fn logout(&mut self) {
        if let Some(user) = self.user.take() {
            info!("User logged out: {}", user.email);
            self.activity.record("User logged out");
        }
        self.board.clear();
    }

    /// The logged-in user, provided they hold `permission`.
    pub fn require(&self, permission: Permission) -> Result<&AuthenticatedUser> {
        let user = self
            .user
            .as_ref()
            .ok_or_else(|| RegistryError::Forbidden("not logged in".into()))?;
        user.require(permission)?;
        Ok(user)
    }

    pub fn record(&mut self, message: impl Into<String>) {
        self.activity.record(message);
    }
}
