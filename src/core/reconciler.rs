//! Merging freshly scanned entries with saved preferences.

use std::path::Path;

use crate::domain::{ContainerRecord, EntryRecord};

/// Apply persisted enable flags to freshly scanned entries
///
/// Entries are matched on their full title id; the first persisted match
/// wins. New content keeps the scan default (enabled). Persisted entries
/// with no fresh counterpart are dropped, so the result reflects only what
/// the archive currently holds.
pub fn merge(fresh: Vec<EntryRecord>, persisted: &[EntryRecord]) -> Vec<EntryRecord> {
    fresh
        .into_iter()
        .map(|mut entry| {
            if let Some(saved) = persisted.iter().find(|p| p.title_id == entry.title_id) {
                entry.enabled = saved.enabled;
            }
            entry
        })
        .collect()
}

/// Saved preferences for every container of a title
#[derive(Debug, Clone, Default)]
pub struct PreferenceReconciler {
    containers: Vec<ContainerRecord>,
}

impl PreferenceReconciler {
    /// Seed from a loaded catalog
    pub fn seed(containers: Vec<ContainerRecord>) -> Self {
        Self { containers }
    }

    /// Persisted containers, in catalog order
    pub fn containers(&self) -> &[ContainerRecord] {
        &self.containers
    }

    /// Rescan every persisted container and merge its saved preferences
    ///
    /// `scan` returns the fresh entries for an archive path; an archive that
    /// cannot be read should yield no entries.
    pub fn reconcile_with<F>(&self, mut scan: F) -> Vec<ContainerRecord>
    where
        F: FnMut(&Path) -> Vec<EntryRecord>,
    {
        self.containers
            .iter()
            .map(|c| ContainerRecord::new(c.path.clone(), merge(scan(&c.path), &c.entries)))
            .collect()
    }
}
