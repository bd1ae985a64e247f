//! Preferences persisted as one JSON object file
//!
//! The file is read once on open; afterwards the in-process map is
//! authoritative and every mutation rewrites the whole file. Writes go to a
//! sibling temp file which is then renamed over the target, so readers of the
//! file only ever see a complete object.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use mople_core::PreferenceStore;
use mople_domain::{MopleError, Result};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use crate::errors::InfraError;

/// Owner read/write only (Unix only).
#[cfg(unix)]
const FILE_MODE: u32 = 0o600;

#[derive(Debug)]
pub struct FilePreferenceStore {
    path: PathBuf,
    /// `<file name>.tmp` next to `path`.
    temp_path: PathBuf,
    values: RwLock<BTreeMap<String, String>>,
}

impl FilePreferenceStore {
    /// Open the store at `path`. A missing or empty file opens as empty.
    ///
    /// # Errors
    /// Returns `MopleError::Storage` if the file cannot be read,
    /// `MopleError::Serialization` if it is not a JSON object of strings and
    /// `MopleError::InvalidInput` if `path` does not name a file.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let Some(file_name) = path.file_name() else {
            return Err(MopleError::InvalidInput(format!(
                "preferences path '{}' does not name a file",
                path.display()
            )));
        };
        let mut temp_name = OsString::from(file_name);
        temp_name.push(".tmp");
        let temp_path = path.with_file_name(temp_name);

        let values = match fs::read_to_string(&path).await {
            Ok(content) if content.trim().is_empty() => BTreeMap::new(),
            Ok(content) => serde_json::from_str(&content).map_err(|e| {
                MopleError::Serialization(format!(
                    "preferences file '{}' is not a JSON object: {e}",
                    path.display()
                ))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(InfraError::from(e).into()),
        };

        debug!(entries = values.len(), "Preferences file opened");
        Ok(Self { path, temp_path, values: RwLock::new(values) })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, values: &BTreeMap<String, String>) -> Result<()> {
        let data = serde_json::to_vec_pretty(values).map_err(InfraError::from)?;
        let temp_path = &self.temp_path;

        if let Some(parent) = temp_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await.map_err(InfraError::from)?;
            }
        }

        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(FILE_MODE);

        let mut file = options.open(temp_path).await.map_err(InfraError::from)?;
        file.write_all(&data).await.map_err(InfraError::from)?;
        file.sync_all().await.map_err(InfraError::from)?;
        drop(file);

        fs::rename(temp_path, &self.path).await.map_err(InfraError::from)?;
        debug!(path = %self.path.display(), entries = values.len(), "Preferences persisted");
        Ok(())
    }

    /// Apply `change` to a copy of the map, persist it, then publish it.
    /// The cache is left untouched when persisting fails.
    async fn mutate(&self, change: impl FnOnce(&mut BTreeMap<String, String>)) -> Result<()> {
        let mut values = self.values.write().await;
        let mut next = values.clone();
        change(&mut next);
        self.persist(&next).await?;
        *values = next;
        Ok(())
    }
}

#[async_trait]
impl PreferenceStore for FilePreferenceStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        self.mutate(|values| {
            values.insert(key.to_string(), value);
        })
        .await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.mutate(|values| {
            values.remove(key);
        })
        .await
    }

    async fn clear(&self) -> Result<()> {
        self.mutate(BTreeMap::clear).await
    }
}
