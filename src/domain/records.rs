//! Persisted catalog records.
//!
//! Field names match the on-disk `dlc.json` documents exactly; existing
//! catalogs must keep loading after a round trip through this crate.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::title_id::TitleId;

/// One content entry inside a container archive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryRecord {
    /// Path of the entry relative to its owning archive
    pub path: String,

    /// Full title id of the content unit
    #[serde(rename = "titleId")]
    pub title_id: TitleId,

    /// User preference
    pub enabled: bool,
}

impl EntryRecord {
    pub fn new(path: impl Into<String>, title_id: TitleId, enabled: bool) -> Self {
        Self {
            path: path.into(),
            title_id,
            enabled,
        }
    }

    /// An entry as produced by a scan, before preferences are applied
    pub fn scanned(path: impl Into<String>, title_id: TitleId) -> Self {
        Self::new(path, title_id, true)
    }
}

/// A content archive and the entries it provides for a title
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerRecord {
    /// Filesystem location of the archive
    pub path: PathBuf,

    #[serde(rename = "dlcNcaList")]
    pub entries: Vec<EntryRecord>,
}

impl ContainerRecord {
    pub fn new(path: impl Into<PathBuf>, entries: Vec<EntryRecord>) -> Self {
        Self {
            path: path.into(),
            entries,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
