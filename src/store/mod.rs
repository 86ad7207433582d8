//! Device collection store.
//!
//! [`DeviceStore`] is the single owner of the in-memory collection and its
//! mirror on disk. Callers mutate it through commands (`upsert`, `remove`,
//! `reorder`) and read it through snapshots, never a live reference.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.local/share/device-inventory/
//! ├── devices.json         # Pretty-printed array of device records
//! └── devices.json.tmp     # Only present while a save is in progress
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use inv::store::DeviceStore;
//!
//! let store = DeviceStore::open_default()?;
//! store.load().await;
//! store.upsert(record);
//! store.save().await?;
//! ```

mod collection;
pub mod persist;

pub use collection::{DeviceCollection, Upserted, MIN_ID_PREFIX};
pub use persist::{default_data_path, LoadOutcome};

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::Mutex;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::error::Result;
use crate::record::DeviceRecord;

/// Owner of the device collection and its data file.
///
/// Share it behind an `Arc` when several tasks need it. Saves are
/// serialised in arrival order and always write the collection as it is
/// when the save gets its turn.
#[derive(Debug)]
pub struct DeviceStore {
    path: PathBuf,
    devices: RwLock<DeviceCollection>,
    writer: Mutex<()>,
}

impl DeviceStore {
    /// Create an empty store backed by `path`. Nothing is read yet.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            devices: RwLock::new(DeviceCollection::new()),
            writer: Mutex::new(()),
        }
    }

    /// Create a store at the default per-user location.
    pub fn open_default() -> Result<Self> {
        Ok(Self::new(default_data_path()?))
    }

    /// Path of the data file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> RwLockReadGuard<'_, DeviceCollection> {
        self.devices.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, DeviceCollection> {
        self.devices.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy of the current collection.
    #[must_use]
    pub fn snapshot(&self) -> DeviceCollection {
        self.read().clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Copy of the record with the given id.
    #[must_use]
    pub fn get(&self, id: Uuid) -> Option<DeviceRecord> {
        self.read().get(id).cloned()
    }

    /// Current position of the record with the given id.
    #[must_use]
    pub fn position_of(&self, id: Uuid) -> Option<usize> {
        self.read().position_of(id)
    }

    /// Resolve a selector (position, id, or id prefix) to its position and record.
    pub fn resolve(&self, selector: &str) -> Result<(usize, DeviceRecord)> {
        let devices = self.read();
        let pos = devices.resolve(selector)?;
        Ok((pos, devices.as_slice()[pos].clone()))
    }

    /// Insert or replace by id.
    pub fn upsert(&self, record: DeviceRecord) -> Upserted {
        self.write().upsert(record)
    }

    /// Remove records at the given positions.
    pub fn remove(&self, positions: &BTreeSet<usize>) -> Vec<DeviceRecord> {
        self.write().remove(positions)
    }

    /// Move one record to a new position.
    pub fn reorder(&self, from: usize, to: usize) -> bool {
        self.write().reorder(from, to)
    }

    /// Replace the in-memory collection with the file's contents.
    ///
    /// A missing, unreadable or corrupt file yields an empty collection and
    /// leaves the file untouched.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub async fn load(&self) -> DeviceCollection {
        self.load_outcome().await.into_collection()
    }

    /// Like [`load`](Self::load), reporting how the file was found.
    pub async fn load_outcome(&self) -> LoadOutcome {
        let _turn = self.writer.lock().await;
        let outcome = persist::read_collection(&self.path).await;
        let collection = match &outcome {
            LoadOutcome::Loaded(collection) => collection.clone(),
            _ => DeviceCollection::new(),
        };
        debug!(count = collection.len(), "Store loaded");
        *self.write() = collection;
        outcome
    }

    /// Write the current collection to disk, replacing the previous file.
    ///
    /// Returns the number of records written.
    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub async fn save(&self) -> Result<usize> {
        let _turn = self.writer.lock().await;
        let snapshot = self.snapshot();
        persist::write_collection(&self.path, &snapshot).await?;
        info!(count = snapshot.len(), "Store saved");
        Ok(snapshot.len())
    }
}
