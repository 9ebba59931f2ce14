//! Durable token records for one deployment environment.
//!
//! Each environment owns a separate JSON file (`tokens_<env>.json`) holding
//! every credential ever issued. Records are never deleted — a superseded
//! credential is deactivated, and at most one record is active at a time.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{AuthError, Result};

// ============================================================================
// TokenRecord
// ============================================================================

/// One historical credential issuance.
///
/// `active_from` marks when the current access-token value was last issued or
/// refreshed and drives the age policy; `last_used` only advances on
/// successful authenticated calls; `usage` counts every call attempt made
/// while the record was active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenRecord {
    pub id: u64,
    pub active: bool,
    pub value: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub active_from: Option<NaiveDateTime>,
    #[serde(default)]
    pub last_used: Option<NaiveDateTime>,
    pub usage: u64,
}

/// Current local time without offset, matching the persisted format.
fn now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

// ============================================================================
// TokenStore
// ============================================================================

/// File-backed token store for a single environment.
///
/// Every mutating operation persists the full record set with an atomic
/// write-then-rename, so concurrent readers in other processes never observe
/// a torn file. There is no cross-process locking; the last writer wins.
#[derive(Debug)]
pub struct TokenStore {
    path: PathBuf,
    records: Vec<TokenRecord>,
}

impl TokenStore {
    /// Open the store for an environment, creating an empty one if the file
    /// does not exist. An unreadable or corrupt file is logged and treated as
    /// empty — recovery is re-authentication, not a crash.
    pub fn open(dir: &Path, environment: &str) -> Self {
        Self::with_path(dir.join(format!("tokens_{environment}.json")))
    }

    /// Open a store at an explicit file path.
    pub fn with_path(path: PathBuf) -> Self {
        let records = load_records(&path);
        Self { path, records }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All records, oldest first.
    pub fn list(&self) -> &[TokenRecord] {
        &self.records
    }

    /// Look up a record by id.
    pub fn get(&self, id: u64) -> Option<&TokenRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// The record currently designated for use.
    ///
    /// If the at-most-one-active invariant was ever violated, the highest id
    /// wins — the most recently issued credential is the usable one.
    pub fn active_record(&self) -> Option<&TokenRecord> {
        self.records.iter().filter(|r| r.active).max_by_key(|r| r.id)
    }

    /// Access-token value of the active record.
    pub fn active_value(&self) -> Option<&str> {
        self.active_record().map(|r| r.value.as_str())
    }

    /// Refresh-token value of the active record.
    pub fn active_refresh(&self) -> Option<&str> {
        self.active_record()
            .and_then(|r| r.refresh_token.as_deref())
    }

    /// Store a freshly issued credential pair as the new active record.
    ///
    /// Deactivates every existing record in the same persisted transition,
    /// assigns the next id, and starts the usage counter at 1.
    pub fn add_token(&mut self, value: &str, refresh: Option<&str>) -> Result<u64> {
        for record in &mut self.records {
            record.active = false;
        }

        let id = self.next_id();
        let issued = now();
        self.records.push(TokenRecord {
            id,
            active: true,
            value: value.to_string(),
            refresh_token: refresh.map(str::to_string),
            active_from: Some(issued),
            last_used: Some(issued),
            usage: 1,
        });

        self.save()?;
        tracing::info!(id, "stored new active token");
        Ok(id)
    }

    /// Update the active record in place after a successful refresh.
    ///
    /// The id is preserved; `active_from` and `last_used` reset to now so the
    /// age counter restarts. Returns `false` without touching the file when
    /// no active record exists.
    pub fn update_active(&mut self, value: &str, refresh: Option<&str>) -> Result<bool> {
        let Some(record) = self
            .records
            .iter_mut()
            .filter(|r| r.active)
            .max_by_key(|r| r.id)
        else {
            return Ok(false);
        };

        record.value = value.to_string();
        if let Some(refresh) = refresh {
            record.refresh_token = Some(refresh.to_string());
        }
        let refreshed = now();
        record.active_from = Some(refreshed);
        record.last_used = Some(refreshed);
        let id = record.id;

        self.save()?;
        tracing::info!(id, "refreshed active token in place");
        Ok(true)
    }

    /// Record one call attempt against the active record.
    ///
    /// `usage` increments unconditionally; `last_used` advances only when the
    /// attempt succeeded. A store without an active record is a no-op.
    pub fn record_usage(&mut self, success: bool) -> Result<()> {
        let Some(record) = self
            .records
            .iter_mut()
            .filter(|r| r.active)
            .max_by_key(|r| r.id)
        else {
            return Ok(());
        };

        record.usage += 1;
        if success {
            record.last_used = Some(now());
        }

        self.save()
    }

    /// Deactivate a specific record. Returns `false` if the id is unknown.
    pub fn deactivate(&mut self, id: u64) -> Result<bool> {
        let Some(record) = self.records.iter_mut().find(|r| r.id == id) else {
            return Ok(false);
        };
        record.active = false;

        self.save()?;
        tracing::info!(id, "deactivated token");
        Ok(true)
    }

    /// Persist all records with a full-file atomic replace.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AuthError::Storage(format!("failed to create token directory: {}", e))
            })?;
        }

        let json = serde_json::to_string_pretty(&self.records)
            .map_err(|e| AuthError::Storage(format!("failed to serialize tokens: {}", e)))?;

        // Write-then-rename so a concurrent reader never sees a partial file.
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, json)
            .map_err(|e| AuthError::Storage(format!("failed to write token file: {}", e)))?;
        std::fs::rename(&tmp, &self.path)
            .map_err(|e| AuthError::Storage(format!("failed to replace token file: {}", e)))?;

        Ok(())
    }

    fn next_id(&self) -> u64 {
        self.records.iter().map(|r| r.id).max().map_or(1, |id| id + 1)
    }
}

fn load_records(path: &Path) -> Vec<TokenRecord> {
    if !path.exists() {
        return Vec::new();
    }

    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "token file unreadable, starting empty");
            return Vec::new();
        }
    };

    match serde_json::from_str(&content) {
        Ok(records) => records,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "token file corrupt, starting empty");
            Vec::new()
        }
    }
}
