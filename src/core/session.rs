//! One title's DLC edit session.
//!
//! Opening a session loads the catalog, rescans every saved archive and
//! merges the saved preferences into a fresh [`ToggleTree`]. Edits go to the
//! tree; [`EditSession::save`] flattens it over the previous catalog.
//! Dropping the session without saving discards the edits.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::archive::ContentArchiveReader;
use crate::catalog::{CatalogError, CatalogStore};
use crate::config::ResolvedConfig;
use crate::domain::{ContainerRecord, TitleId};

use super::reconciler::PreferenceReconciler;
use super::scanner::{EntryScanner, ScanError, ScanReport};
use super::serializer::flatten;
use super::tree::{NodeId, ToggleTree};

/// Why an archive could not be added
#[derive(Debug, Error)]
pub enum AddError {
    #[error("Archive not found: {0}")]
    NotFound(PathBuf),

    #[error("Not a supported content container: {0}")]
    UnsupportedExtension(PathBuf),

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error("The file {path} does not contain a DLC for the selected title")]
    NoMatch { path: PathBuf },
}

/// Result of adding one archive in a batch
#[derive(Debug)]
pub struct AddOutcome {
    pub path: PathBuf,
    pub result: Result<NodeId, AddError>,
}

/// Editable DLC state for one title
pub struct EditSession<R> {
    title: TitleId,
    store: CatalogStore,
    scanner: EntryScanner<R>,
    config: ResolvedConfig,
    tree: ToggleTree,
}

impl<R: ContentArchiveReader> EditSession<R> {
    /// Load, rescan and merge the catalog for `title`
    #[instrument(skip_all, fields(title = %title))]
    pub fn open(title: TitleId, config: &ResolvedConfig, reader: R) -> Result<Self, CatalogError> {
        let store = CatalogStore::for_title(&config.games_dir, title);
        let scanner = EntryScanner::new(reader)
            .with_pattern(config.scan.entry_pattern.clone())
            .with_mode(config.scan.mode);

        let reconciler = PreferenceReconciler::seed(store.load_with_policy(config.on_load_error)?);
        let merged = reconciler.reconcile_with(|path| match scanner.scan_entries(path, title) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(archive = %path.display(), "Archive unavailable, dropping its entries: {}", e);
                Vec::new()
            }
        });
        let tree = ToggleTree::build(merged);

        info!(
            catalog = %store.path().display(),
            containers = tree.len(),
            "Opened DLC catalog"
        );

        Ok(Self {
            title,
            store,
            scanner,
            config: config.clone(),
            tree,
        })
    }

    pub fn title(&self) -> TitleId {
        self.title
    }

    pub fn catalog_path(&self) -> &Path {
        self.store.path()
    }

    pub fn tree(&self) -> &ToggleTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut ToggleTree {
        &mut self.tree
    }

    /// Scan an archive for this title without touching the tree
    pub fn scan(&self, archive: &Path) -> Result<ScanReport, ScanError> {
        self.scanner.scan(archive, self.title)
    }

    /// Import one archive, fully enabled
    pub fn add_archive(&mut self, path: &Path) -> Result<NodeId, AddError> {
        if !path.exists() {
            return Err(AddError::NotFound(path.to_path_buf()));
        }
        if !self.config.accepts_archive(path) {
            return Err(AddError::UnsupportedExtension(path.to_path_buf()));
        }

        let entries = self.scanner.scan_entries(path, self.title)?;
        if entries.is_empty() {
            return Err(AddError::NoMatch {
                path: path.to_path_buf(),
            });
        }

        let count = entries.len();
        let id = self.tree.import_container(path, entries);
        info!(archive = %path.display(), entries = count, "Added DLC archive");
        Ok(id)
    }

    /// Import several archives; a failure only affects its own archive
    pub fn add_archives<P: AsRef<Path>>(
        &mut self,
        paths: impl IntoIterator<Item = P>,
    ) -> Vec<AddOutcome> {
        paths
            .into_iter()
            .map(|p| {
                let path = p.as_ref().to_path_buf();
                let result = self.add_archive(&path);
                if let Err(ref e) = result {
                    warn!(archive = %path.display(), "Could not add archive: {}", e);
                }
                AddOutcome { path, result }
            })
            .collect()
    }

    /// Records that [`save`](Self::save) would write
    pub fn records(&self) -> Vec<ContainerRecord> {
        flatten(&self.tree)
    }

    /// Overwrite the catalog with the current tree
    ///
    /// On failure the tree is left as it was, so the save can be retried.
    pub fn save(&self) -> Result<(), CatalogError> {
        let records = self.records();
        self.store.save(&records)?;

        info!(
            catalog = %self.store.path().display(),
            containers = records.len(),
            "Saved DLC catalog"
        );
        Ok(())
    }
}
