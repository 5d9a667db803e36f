//! Per-title catalog file (`dlc.json`).
//!
//! The document is an ordered JSON array of container records. It is always
//! read and written whole; saves go through a temp file in the same
//! directory and a rename, so a failed write never truncates the old catalog.

use std::fs::{self, File};
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::{ContainerRecord, EntryRecord, TitleId};

/// File name of the per-title catalog
pub const CATALOG_FILE_NAME: &str = "dlc.json";

/// Errors reading or writing a catalog file
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("IO error on catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Malformed catalog {path}: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl CatalogError {
    /// The catalog file simply does not exist yet
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }
}

/// What to do when the catalog cannot be loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadFailurePolicy {
    /// Treat any failure as an empty catalog
    #[default]
    Empty,

    /// Only a missing file means empty; everything else is an error
    Fail,
}

/// Container record as it may appear on disk, list possibly absent
#[derive(Debug, Deserialize)]
struct StoredContainer {
    path: PathBuf,
    #[serde(rename = "dlcNcaList", default)]
    entries: Option<Vec<EntryRecord>>,
}

/// Reads and writes one title's catalog file
#[derive(Debug, Clone)]
pub struct CatalogStore {
    path: PathBuf,
}

impl CatalogStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Catalog location for a title under the games directory
    pub fn for_title(games_dir: &Path, title: TitleId) -> Self {
        Self::new(catalog_path(games_dir, title))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the catalog, dropping records that have no entry list
    pub fn load(&self) -> Result<Vec<ContainerRecord>, CatalogError> {
        let file = File::open(&self.path).map_err(|source| CatalogError::Io {
            path: self.path.clone(),
            source,
        })?;

        let stored: Vec<StoredContainer> = serde_json::from_reader(BufReader::new(file))
            .map_err(|source| {
                if source.is_io() {
                    CatalogError::Io {
                        path: self.path.clone(),
                        source: source.into(),
                    }
                } else {
                    CatalogError::Format {
                        path: self.path.clone(),
                        source,
                    }
                }
            })?;

        let total = stored.len();
        let records: Vec<ContainerRecord> = stored
            .into_iter()
            .filter_map(|c| c.entries.map(|entries| ContainerRecord::new(c.path, entries)))
            .collect();

        if records.len() != total {
            debug!(
                catalog = %self.path.display(),
                dropped = total - records.len(),
                "Dropped container records without an entry list"
            );
        }

        Ok(records)
    }

    /// Load the catalog, applying `policy` to failures
    pub fn load_with_policy(
        &self,
        policy: LoadFailurePolicy,
    ) -> Result<Vec<ContainerRecord>, CatalogError> {
        match self.load() {
            Ok(records) => Ok(records),
            Err(e) if e.is_not_found() => {
                debug!(catalog = %self.path.display(), "No catalog yet");
                Ok(Vec::new())
            }
            Err(e) => match policy {
                LoadFailurePolicy::Empty => {
                    warn!("Ignoring unreadable catalog, starting empty: {}", e);
                    Ok(Vec::new())
                }
                LoadFailurePolicy::Fail => Err(e),
            },
        }
    }

    /// Overwrite the catalog with `records`
    pub fn save(&self, records: &[ContainerRecord]) -> Result<(), CatalogError> {
        let io_err = |source: io::Error| CatalogError::Io {
            path: self.path.clone(),
            source,
        };

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(io_err)?;

        let content = serde_json::to_vec_pretty(records).map_err(|source| CatalogError::Format {
            path: self.path.clone(),
            source,
        })?;

        let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
        tmp.write_all(&content).map_err(io_err)?;
        tmp.as_file().sync_all().map_err(io_err)?;
        tmp.persist(&self.path).map_err(|e| io_err(e.error))?;

        debug!(catalog = %self.path.display(), containers = records.len(), "Saved catalog");
        Ok(())
    }
}

/// `<games_dir>/<title>/dlc.json`
pub fn catalog_path(games_dir: &Path, title: TitleId) -> PathBuf {
    games_dir.join(title.catalog_key()).join(CATALOG_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> Vec<ContainerRecord> {
        vec![ContainerRecord::new(
            "/games/a.nsp",
            vec![
                EntryRecord::new("/1.nca", TitleId::new(0x0100_0000_0000_e001), true),
                EntryRecord::new("/2.nca", TitleId::new(0x0100_0000_0000_e002), false),
            ],
        )]
    }

    #[test]
    fn test_save_and_load() {
        let temp = TempDir::new().unwrap();
        let store = CatalogStore::new(temp.path().join("nested").join("dlc.json"));

        store.save(&sample()).unwrap();
        let loaded = store.load().unwrap();

        assert_eq!(loaded, sample());
    }

    #[test]
    fn test_load_drops_records_without_entries() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("dlc.json");
        fs::write(
            &path,
            r#"[
                {"path": "/games/null.nsp", "dlcNcaList": null},
                {"path": "/games/absent.nsp"},
                {"path": "/games/ok.nsp", "dlcNcaList": [
                    {"path": "/1.nca", "titleId": 1, "enabled": false}
                ]},
                {"path": "/games/empty.nsp", "dlcNcaList": []}
            ]"#,
        )
        .unwrap();

        let loaded = CatalogStore::new(&path).load().unwrap();

        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].path, PathBuf::from("/games/ok.nsp"));
        assert!(!loaded[0].entries[0].enabled);
        assert!(loaded[1].entries.is_empty());
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let temp = TempDir::new().unwrap();
        let store = CatalogStore::new(temp.path().join("dlc.json"));

        let err = store.load().unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_load_garbage_is_format_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("dlc.json");
        fs::write(&path, "{ not json").unwrap();

        let result = CatalogStore::new(&path).load();
        assert!(matches!(result, Err(CatalogError::Format { .. })));
    }

    #[test]
    fn test_policy_empty_swallows_format_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("dlc.json");
        fs::write(&path, "[{\"path\": 3}]").unwrap();
        let store = CatalogStore::new(&path);

        assert!(store
            .load_with_policy(LoadFailurePolicy::Empty)
            .unwrap()
            .is_empty());
        assert!(matches!(
            store.load_with_policy(LoadFailurePolicy::Fail),
            Err(CatalogError::Format { .. })
        ));
    }

    #[test]
    fn test_policy_fail_still_allows_missing_catalog() {
        let temp = TempDir::new().unwrap();
        let store = CatalogStore::new(temp.path().join("dlc.json"));

        let loaded = store.load_with_policy(LoadFailurePolicy::Fail).unwrap();
        assert!(loaded.is_empty());
    }

    #[test]
    fn test_save_overwrites_previous_catalog() {
        let temp = TempDir::new().unwrap();
        let store = CatalogStore::new(temp.path().join("dlc.json"));

        store.save(&sample()).unwrap();
        store.save(&[]).unwrap();

        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_catalog_path_uses_lowercase_title() {
        let path = catalog_path(Path::new("/data/games"), TitleId::new(0x0100_ABCD_0000_E000));
        assert_eq!(path, PathBuf::from("/data/games/0100abcd0000e000/dlc.json"));
    }
}
