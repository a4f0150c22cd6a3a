use std::{
    fs,
    io::ErrorKind,
    marker::PhantomData,
    path::{Path, PathBuf},
};

use log::{info, warn};
use serde::de::DeserializeOwned;

use crate::StorageError;

/// A JSON file holding one array of records.
pub struct Collection<T> {
    path: PathBuf,
    _record: PhantomData<T>,
}

impl<T: DeserializeOwned> Collection<T> {
    pub(crate) fn new(path: impl Into<PathBuf>) -> Self {
        Collection {
            path: path.into(),
            _record: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing file is an empty collection.
    pub fn get_all(&self) -> Result<Vec<T>, StorageError> {
        let records: Vec<T> = match read_json(&self.path) {
            Ok(records) => records,
            Err(StorageError::Io { source, .. }) if source.kind() == ErrorKind::NotFound => {
                warn!("{} not found, using no records", self.path.display());
                return Ok(vec![]);
            }
            Err(err) => return Err(err),
        };
        info!("Loaded {} records from {}", records.len(), self.path.display());
        Ok(records)
    }
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, StorageError> {
    let content = fs::read_to_string(path).map_err(|source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| StorageError::Json {
        path: path.to_path_buf(),
        source,
    })
}
