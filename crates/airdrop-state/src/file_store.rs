//! # File-Backed Claim Store
//!
//! Layout under the store root:
//!
//! ```text
//! <root>/<asset>-<root hex>/state.json
//! <root>/<asset>-<root hex>/claims/<index>.json
//! ```
//!
//! Each record is written in full to a temporary file in the target
//! directory, synced, and then moved into place with a no-clobber persist.
//! The persist either creates the final name or fails with `AlreadyExists`;
//! there is no window in which a partial record is visible or two writers
//! both succeed. After the persist the containing directory is synced, as
//! is the parent of every directory the store creates, so a record that was
//! reported as created is still there after a crash. Records therefore
//! survive process restarts and are shared by every process pointing at the
//! same directory.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tempfile::NamedTempFile;

use airdrop_core::StoreError;

use crate::airdrop::{AirdropKey, AirdropState, ClaimRecord};
use crate::store::{ClaimStore, CreateOutcome};

const STATE_FILE: &str = "state.json";
const CLAIMS_DIR: &str = "claims";

/// Claim store persisting one JSON file per record.
#[derive(Debug, Clone)]
pub struct FileClaimStore {
    root: PathBuf,
}

impl FileClaimStore {
    /// Open (creating if needed) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        ensure_dir(&root)?;
        Ok(Self { root })
    }

    /// The store root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn airdrop_dir(&self, key: &AirdropKey) -> PathBuf {
        self.root.join(key.storage_name())
    }

    fn state_path(&self, key: &AirdropKey) -> PathBuf {
        self.airdrop_dir(key).join(STATE_FILE)
    }

    fn claims_dir(&self, key: &AirdropKey) -> PathBuf {
        self.airdrop_dir(key).join(CLAIMS_DIR)
    }

    fn claim_path(&self, key: &AirdropKey, index: u64) -> PathBuf {
        self.claims_dir(key).join(format!("{index}.json"))
    }
}

/// Write `value` to `path` unless it exists.
fn create_unique<T: Serialize>(path: &Path, value: &T) -> Result<CreateOutcome, StoreError> {
    if path.exists() {
        return Ok(CreateOutcome::AlreadyExists);
    }
    let dir = path.parent().ok_or_else(|| StoreError::Corrupt {
        location: path.display().to_string(),
        reason: "record path has no parent directory".to_string(),
    })?;
    ensure_dir(dir)?;

    let bytes =
        serde_json::to_vec_pretty(value).map_err(|e| StoreError::Serialization(e.to_string()))?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(&bytes)?;
    tmp.as_file().sync_all()?;

    match tmp.persist_noclobber(path) {
        // A failed sync leaves the record in place and surfaces as an I/O
        // error, so the claim is refused now and reported as claimed later.
        Ok(_) => {
            sync_dir(dir)?;
            Ok(CreateOutcome::Created)
        }
        Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => {
            Ok(CreateOutcome::AlreadyExists)
        }
        Err(e) => Err(StoreError::Io(e.error)),
    }
}

/// Create `dir` and any missing ancestors, syncing the parent of each one
/// created. Returns how many directories were created.
fn ensure_dir(dir: &Path) -> io::Result<usize> {
    if dir.is_dir() {
        return Ok(0);
    }
    let parent = dir.parent().filter(|p| !p.as_os_str().is_empty());
    let mut created = match parent {
        Some(p) => ensure_dir(p)?,
        None => 0,
    };
    match fs::create_dir(dir) {
        Ok(()) => created += 1,
        // Lost a race with another writer creating the same directory.
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && dir.is_dir() => {}
        Err(e) => return Err(e),
    }
    if let Some(p) = parent {
        sync_dir(p)?;
    }
    Ok(created)
}

/// Flush directory entries to disk.
#[cfg(unix)]
fn sync_dir(dir: &Path) -> io::Result<()> {
    fs::File::open(dir)?.sync_all()
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}

/// Read and decode `path`, or `None` if it does not exist.
fn load<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
    let bytes = match fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|e| StoreError::Corrupt {
            location: path.display().to_string(),
            reason: e.to_string(),
        })
}

impl ClaimStore for FileClaimStore {
    fn create_state(&self, state: &AirdropState) -> Result<CreateOutcome, StoreError> {
        create_unique(&self.state_path(&state.key()), state)
    }

    fn load_state(&self, key: &AirdropKey) -> Result<Option<AirdropState>, StoreError> {
        load(&self.state_path(key))
    }

    fn create_claim(&self, record: &ClaimRecord) -> Result<CreateOutcome, StoreError> {
        create_unique(&self.claim_path(&record.airdrop, record.index), record)
    }

    fn load_claim(&self, key: &AirdropKey, index: u64) -> Result<Option<ClaimRecord>, StoreError> {
        let record: Option<ClaimRecord> = load(&self.claim_path(key, index))?;
        match record {
            Some(r) if r.airdrop != *key || r.index != index => Err(StoreError::Corrupt {
                location: self.claim_path(key, index).display().to_string(),
                reason: format!("record is for {} index {}", r.airdrop, r.index),
            }),
            other => Ok(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use airdrop_core::{AccountId, AssetId, MerkleDigest};
    use chrono::Utc;

    fn state() -> AirdropState {
        AirdropState::new(
            AccountId::new([1; 32]),
            AssetId::new([2; 32]),
            MerkleDigest::new([3; 32]),
            4,
        )
    }

    fn record(index: u64) -> ClaimRecord {
        ClaimRecord {
            airdrop: state().key(),
            index,
            recipient: AccountId::new([7; 32]),
            amount: 100,
            claimed_at: Utc::now(),
        }
    }

    #[test]
    fn test_layout_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileClaimStore::open(dir.path()).unwrap();
        store.create_state(&state()).unwrap();
        store.create_claim(&record(2)).unwrap();
        let base = dir.path().join(state().key().storage_name());
        assert!(base.join("state.json").is_file());
        assert!(base.join("claims").join("2.json").is_file());
    }

    #[test]
    fn test_unique_create() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileClaimStore::open(dir.path()).unwrap();
        assert_eq!(store.create_claim(&record(0)).unwrap(), CreateOutcome::Created);
        assert_eq!(
            store.create_claim(&record(0)).unwrap(),
            CreateOutcome::AlreadyExists
        );
        assert_eq!(store.create_state(&state()).unwrap(), CreateOutcome::Created);
        assert_eq!(
            store.create_state(&state()).unwrap(),
            CreateOutcome::AlreadyExists
        );
    }

    #[test]
    fn test_no_temp_files_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileClaimStore::open(dir.path()).unwrap();
        store.create_claim(&record(0)).unwrap();
        store.create_claim(&record(0)).unwrap();
        let claims = dir
            .path()
            .join(state().key().storage_name())
            .join("claims");
        let names: Vec<_> = fs::read_dir(claims)
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("0.json")]);
    }

    #[test]
    fn test_ensure_dir_counts_created_ancestors() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b").join("c");
        assert_eq!(ensure_dir(&nested).unwrap(), 3);
        assert!(nested.is_dir());
        assert_eq!(ensure_dir(&nested).unwrap(), 0);
        assert_eq!(ensure_dir(&nested.join("d")).unwrap(), 1);
    }

    #[test]
    fn test_ensure_dir_rejects_file_in_the_way() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, b"x").unwrap();
        assert!(ensure_dir(&blocker).is_err());
    }

    #[test]
    fn test_sync_dir_on_existing_directory() {
        let dir = tempfile::tempdir().unwrap();
        sync_dir(dir.path()).unwrap();
        assert!(sync_dir(&dir.path().join("missing")).is_err());
    }

    #[test]
    fn test_claim_in_fresh_store_visible_after_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("ledger").join("nested");
        let store = FileClaimStore::open(&root).unwrap();
        assert_eq!(store.create_claim(&record(3)).unwrap(), CreateOutcome::Created);
        drop(store);

        let reopened = FileClaimStore::open(&root).unwrap();
        let loaded = reopened.load_claim(&state().key(), 3).unwrap().unwrap();
        assert_eq!(loaded.index, 3);
        assert_eq!(
            reopened.create_claim(&record(3)).unwrap(),
            CreateOutcome::AlreadyExists
        );
    }

    #[test]
    fn test_missing_records_load_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileClaimStore::open(dir.path()).unwrap();
        assert!(store.load_state(&state().key()).unwrap().is_none());
        assert!(store.load_claim(&state().key(), 0).unwrap().is_none());
    }

    #[test]
    fn test_garbled_record_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileClaimStore::open(dir.path()).unwrap();
        let path = store.claim_path(&state().key(), 1);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, b"{not json").unwrap();
        assert!(matches!(
            store.load_claim(&state().key(), 1),
            Err(StoreError::Corrupt { .. })
        ));
    }

    #[test]
    fn test_misfiled_record_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileClaimStore::open(dir.path()).unwrap();
        store.create_claim(&record(0)).unwrap();
        fs::copy(
            store.claim_path(&state().key(), 0),
            store.claim_path(&state().key(), 1),
        )
        .unwrap();
        assert!(matches!(
            store.load_claim(&state().key(), 1),
            Err(StoreError::Corrupt { .. })
        ));
    }
}
