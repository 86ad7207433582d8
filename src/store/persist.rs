//! JSON file persistence for the device collection.
//!
//! The whole collection is one pretty-printed JSON array. Writes go to a
//! sibling temp file that is flushed and then renamed over the target, so a
//! reader never sees a half-written file.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument, warn};

use super::DeviceCollection;
use crate::error::{InvError, Result};

/// Application directory name under the platform data/config dirs.
pub const APP_DIR: &str = "device-inventory";

/// File name of the persisted collection.
pub const DATA_FILE: &str = "devices.json";

/// What a read of the data file produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// File parsed.
    Loaded(DeviceCollection),
    /// No file yet (first run).
    Missing,
    /// File exists but could not be read.
    Unreadable { reason: String },
    /// File read but is not a valid collection.
    Corrupt { reason: String },
}

impl LoadOutcome {
    /// The loaded collection, or an empty one for every failure.
    #[must_use]
    pub fn into_collection(self) -> DeviceCollection {
        match self {
            Self::Loaded(collection) => collection,
            Self::Missing | Self::Unreadable { .. } | Self::Corrupt { .. } => {
                DeviceCollection::new()
            }
        }
    }
}

/// Default data file: `<data_local_dir>/device-inventory/devices.json`.
pub fn default_data_path() -> Result<PathBuf> {
    let data_dir = dirs::data_local_dir().ok_or_else(|| {
        InvError::StorageLocation("could not determine local data directory".to_string())
    })?;
    Ok(data_dir.join(APP_DIR).join(DATA_FILE))
}

/// Temp file used while saving `path`.
#[must_use]
pub fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(std::ffi::OsStr::to_os_string)
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Read the collection at `path`. Never fails; see [`LoadOutcome`].
#[instrument(fields(path = %path.display()))]
pub async fn read_collection(path: &Path) -> LoadOutcome {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("No data file yet, starting empty");
            return LoadOutcome::Missing;
        }
        Err(e) => {
            warn!(error = %e, "Failed to read data file, starting empty");
            return LoadOutcome::Unreadable {
                reason: e.to_string(),
            };
        }
    };

    match serde_json::from_slice::<DeviceCollection>(&bytes) {
        Ok(collection) => {
            info!(count = collection.len(), "Loaded devices");
            LoadOutcome::Loaded(collection)
        }
        Err(e) => {
            warn!(error = %e, bytes = bytes.len(), "Data file is not a valid device list, starting empty");
            LoadOutcome::Corrupt {
                reason: e.to_string(),
            }
        }
    }
}

/// Write the whole collection to `path` atomically.
#[instrument(skip(collection), fields(path = %path.display(), count = collection.len()))]
pub async fn write_collection(path: &Path, collection: &DeviceCollection) -> Result<()> {
    let json = serde_json::to_vec_pretty(collection)?;

    let write_err = |e: std::io::Error| InvError::StorageWrite {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let tmp = temp_path(path);
    if let Err(e) = write_and_sync(&tmp, &json).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(write_err(e));
    }
    if let Err(e) = fs::rename(&tmp, path).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(write_err(e));
    }

    info!(bytes = json.len(), "Saved devices");
    Ok(())
}

async fn write_and_sync(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path).await?;
    file.write_all(bytes).await?;
    file.sync_all().await?;
    Ok(())
}
