//! Role-scoped draft persistence with debounced writes.
//!
//! A draft is stored under `draft_<role>` as JSON. Saves are debounced so only the
//! last snapshot of a burst of edits reaches storage; loads and clears are immediate.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::debounce::Debouncer;
use crate::storage::KeyValueStore;
use crate::types::UserRole;
use crate::wizard::{StepOneFields, StepTwoFields};

/// In-progress wizard state for one role
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftSnapshot {
    #[serde(rename = "step1Data", default)]
    pub step_one: Option<StepOneFields>,
    #[serde(rename = "step2Data", default)]
    pub step_two: Option<StepTwoFields>,
}

/// Storage key for a role's draft
pub fn draft_key(role: UserRole) -> String {
    format!("draft_{}", role)
}

/// Read a role's draft. Missing, unreadable and unparsable entries all read as no draft.
pub fn load_draft(store: &dyn KeyValueStore, role: UserRole) -> Option<DraftSnapshot> {
    let key = draft_key(role);
    let raw = match store.get(&key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(err) => {
            warn!(key = %key, error = %err, "Failed to read draft");
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(snapshot) => Some(snapshot),
        Err(err) => {
            warn!(key = %key, error = %err, "Failed to parse draft data");
            None
        }
    }
}

/// Write a role's draft immediately
pub fn write_draft(
    store: &dyn KeyValueStore,
    role: UserRole,
    snapshot: &DraftSnapshot,
) -> Result<()> {
    let key = draft_key(role);
    let json = serde_json::to_string(snapshot).context("Failed to serialize draft")?;
    store.set(&key, &json)?;
    info!(key = %key, "Draft saved");
    Ok(())
}

/// Remove a role's draft immediately. Clearing an absent draft is fine.
pub fn clear_draft(store: &dyn KeyValueStore, role: UserRole) -> Result<()> {
    let key = draft_key(role);
    store.delete(&key)?;
    info!(key = %key, "Draft cleared");
    Ok(())
}

/// Draft persistence owned by one wizard session
pub struct DraftStore {
    store: Arc<dyn KeyValueStore>,
    debouncer: Debouncer,
}

impl DraftStore {
    pub fn new(store: Arc<dyn KeyValueStore>, autosave_delay: Duration) -> Self {
        Self {
            store,
            debouncer: Debouncer::new(autosave_delay),
        }
    }

    /// Schedule a write of `snapshot`, replacing any write still waiting
    pub fn save(&mut self, role: UserRole, snapshot: DraftSnapshot) {
        let store = self.store.clone();
        debug!(role = %role, delay_ms = self.debouncer.delay().as_millis() as u64, "Draft save scheduled");
        self.debouncer.schedule(async move {
            if let Err(err) = write_draft(store.as_ref(), role, &snapshot) {
                error!(role = %role, error = %err, "Failed to save draft");
            }
        });
    }

    pub fn load(&self, role: UserRole) -> Option<DraftSnapshot> {
        load_draft(self.store.as_ref(), role)
    }

    /// Remove the draft now. A save still waiting would resurrect it, so it is dropped too.
    pub fn clear(&mut self, role: UserRole) -> Result<()> {
        self.debouncer.cancel();
        clear_draft(self.store.as_ref(), role)
    }

    pub fn has_pending_save(&self) -> bool {
        self.debouncer.is_pending()
    }

    /// Drop a pending save without writing it
    pub fn cancel_pending(&mut self) {
        self.debouncer.cancel();
    }
}
