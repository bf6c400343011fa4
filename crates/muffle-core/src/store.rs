//! Persistent suppression store backed by redb.
//!
//! A thin adapter over one redb table mapping fingerprint bytes to encoded
//! [`SuppressionState`] values. The store is opened once at startup (its
//! backing directory is created if absent), shared for the process lifetime,
//! and closed on drop.

use std::fs;
use std::path::Path;

use redb::{Database, TableDefinition};
use tracing::debug;

use crate::error::{Result, SuppressError};
use crate::fingerprint::Fingerprint;
use crate::record::SuppressionState;

/// redb table: key = fingerprint bytes, value = encoded suppression record.
const SUPPRESSION_TABLE: TableDefinition<&[u8], &[u8]> = TableDefinition::new("suppression");

/// Database file name inside the data directory.
const DB_FILE: &str = "suppression.redb";

/// Durable mapping from [`Fingerprint`] to [`SuppressionState`].
pub struct SuppressionStore {
    db: Database,
}

impl SuppressionStore {
    /// Opens (or creates) the store under the given data directory.
    ///
    /// The directory is created if it does not exist; the database file and
    /// its table are created on first open.
    ///
    /// # Errors
    ///
    /// Returns `SuppressError::Storage` if the directory or database cannot
    /// be created or opened.
    pub fn open(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir).map_err(|e| {
            SuppressError::Storage(format!("create data dir {}: {e}", dir.display()))
        })?;
        let path = dir.join(DB_FILE);
        let db = Database::create(&path)
            .map_err(|e| SuppressError::Storage(format!("open {}: {e}", path.display())))?;

        // Ensure the table exists so reads never race table creation.
        let txn = db
            .begin_write()
            .map_err(|e| SuppressError::Storage(format!("begin write: {e}")))?;
        {
            let _table = txn
                .open_table(SUPPRESSION_TABLE)
                .map_err(|e| SuppressError::Storage(format!("create table: {e}")))?;
        }
        txn.commit()
            .map_err(|e| SuppressError::Storage(format!("commit: {e}")))?;

        debug!(path = %path.display(), "suppression store opened");
        Ok(Self { db })
    }

    /// Reads the suppression state of a fingerprint. `None` means the
    /// fingerprint has never been suppressed.
    ///
    /// # Errors
    ///
    /// Returns `SuppressError::Storage` on read failure and
    /// `SuppressError::CorruptState` if the stored value does not decode.
    pub fn get(&self, fp: &Fingerprint) -> Result<Option<SuppressionState>> {
        let txn = self
            .db
            .begin_read()
            .map_err(|e| SuppressError::Storage(format!("begin read: {e}")))?;
        let table = txn
            .open_table(SUPPRESSION_TABLE)
            .map_err(|e| SuppressError::Storage(format!("open table: {e}")))?;
        let Some(guard) = table
            .get(fp.as_bytes().as_slice())
            .map_err(|e| SuppressError::Storage(format!("get: {e}")))?
        else {
            return Ok(None);
        };
        SuppressionState::decode(guard.value()).map(Some)
    }

    /// Writes the suppression state of a fingerprint, replacing any existing
    /// record.
    ///
    /// # Errors
    ///
    /// Returns `SuppressError::Storage` on write failure.
    pub fn set(&self, fp: &Fingerprint, state: &SuppressionState) -> Result<()> {
        let txn = self
            .db
            .begin_write()
            .map_err(|e| SuppressError::Storage(format!("begin write: {e}")))?;
        {
            let mut table = txn
                .open_table(SUPPRESSION_TABLE)
                .map_err(|e| SuppressError::Storage(format!("open table: {e}")))?;
            let encoded = state.encode();
            table
                .insert(fp.as_bytes().as_slice(), encoded.as_slice())
                .map_err(|e| SuppressError::Storage(format!("insert: {e}")))?;
        }
        txn.commit()
            .map_err(|e| SuppressError::Storage(format!("commit: {e}")))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn test_fp(key: &str) -> Fingerprint {
        Fingerprint::of(key).unwrap()
    }

    #[test]
    fn absent_record_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = SuppressionStore::open(dir.path()).unwrap();
        assert_eq!(store.get(&test_fp("never-seen")).unwrap(), None);
    }

    #[test]
    fn set_then_get_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = SuppressionStore::open(dir.path()).unwrap();
        let fp = test_fp("alert");
        let state = SuppressionState::Snoozed {
            until: Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap(),
        };

        store.set(&fp, &state).unwrap();
        assert_eq!(store.get(&fp).unwrap(), Some(state));
    }

    #[test]
    fn second_write_replaces_first() {
        let dir = tempfile::tempdir().unwrap();
        let store = SuppressionStore::open(dir.path()).unwrap();
        let fp = test_fp("alert");

        store
            .set(
                &fp,
                &SuppressionState::Snoozed {
                    until: Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap(),
                },
            )
            .unwrap();
        store.set(&fp, &SuppressionState::Muted).unwrap();

        assert_eq!(store.get(&fp).unwrap(), Some(SuppressionState::Muted));
    }

    #[test]
    fn state_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let fp = test_fp("alert");
        {
            let store = SuppressionStore::open(dir.path()).unwrap();
            store.set(&fp, &SuppressionState::Muted).unwrap();
        }
        let store = SuppressionStore::open(dir.path()).unwrap();
        assert_eq!(store.get(&fp).unwrap(), Some(SuppressionState::Muted));
    }

    #[test]
    fn open_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let store = SuppressionStore::open(&nested).unwrap();
        assert_eq!(store.get(&test_fp("x")).unwrap(), None);
        assert!(nested.join(DB_FILE).exists());
    }
}
