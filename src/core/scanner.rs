//! Extraction of a title's DLC entries from a content archive.
//!
//! Each entry is classified into an [`EntryVerdict`] first; the scan loop
//! then decides what to keep, what to skip and when to stop. Entries in an
//! archive are assumed to be grouped by owning title, so in
//! [`ScanMode::EarlyStop`] the first public-data entry of a foreign title
//! ends the scan.

use std::io;
use std::path::{Path, PathBuf};

use glob::Pattern;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::archive::{
    ArchiveError, ContentArchive, ContentArchiveReader, ContentHeader, ContentType, DecodeError,
};
use crate::domain::{EntryRecord, TitleId};

/// Entry name pattern used when none is configured
pub const DEFAULT_ENTRY_PATTERN: &str = "*.nca";

/// How to treat entries that belong to another title
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanMode {
    /// Stop at the first foreign-title entry
    #[default]
    EarlyStop,

    /// Skip foreign-title entries and keep going
    Full,
}

/// Errors that abort a scan
#[derive(Debug, Error)]
pub enum ScanError {
    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error("IO error reading {entry} in {archive}: {source}")]
    EntryIo {
        archive: PathBuf,
        entry: String,
        #[source]
        source: io::Error,
    },
}

/// Outcome of examining a single archive entry
#[derive(Debug)]
pub enum EntryVerdict {
    /// Public data for the owner title
    Include(EntryRecord),

    /// Header could not be decoded
    Skip(DecodeError),

    /// Metadata, control or program content
    NotPublicData(ContentType),

    /// Public data for some other title
    ForeignTitle(TitleId),
}

/// Classify one entry against the owner title
pub fn classify(
    entry_path: &str,
    header: Result<ContentHeader, DecodeError>,
    owner: TitleId,
) -> EntryVerdict {
    let header = match header {
        Ok(header) => header,
        Err(e) => return EntryVerdict::Skip(e),
    };

    if header.content_type != ContentType::PublicData {
        return EntryVerdict::NotPublicData(header.content_type);
    }

    if !header.title_id.belongs_to(owner) {
        return EntryVerdict::ForeignTitle(header.title_id);
    }

    EntryVerdict::Include(EntryRecord::scanned(entry_path, header.title_id))
}

/// An entry left out because its header could not be decoded
#[derive(Debug)]
pub struct SkippedEntry {
    pub path: String,
    pub reason: DecodeError,
}

/// Everything a scan found
#[derive(Debug, Default)]
pub struct ScanReport {
    /// Matching entries, in archive order, all enabled
    pub entries: Vec<EntryRecord>,

    /// Entries skipped because of decode failures
    pub skipped: Vec<SkippedEntry>,

    /// Entry whose foreign title ended an early-stop scan
    pub stopped_at: Option<String>,
}

/// Scans archives for the DLC entries of one owner title
#[derive(Debug, Clone)]
pub struct EntryScanner<R> {
    reader: R,
    pattern: Pattern,
    mode: ScanMode,
}

impl<R: ContentArchiveReader> EntryScanner<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            pattern: default_pattern(),
            mode: ScanMode::default(),
        }
    }

    pub fn with_pattern(mut self, pattern: Pattern) -> Self {
        self.pattern = pattern;
        self
    }

    pub fn with_mode(mut self, mode: ScanMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> ScanMode {
        self.mode
    }

    /// Scan `archive_path` for entries belonging to `owner`
    pub fn scan(&self, archive_path: &Path, owner: TitleId) -> Result<ScanReport, ScanError> {
        let mut archive = self.reader.open_for_read(archive_path)?;
        let mut report = ScanReport::default();

        for path in archive.entry_paths(&self.pattern) {
            let verdict = match archive.decode_header(&path) {
                Err(DecodeError::Io(source)) => {
                    return Err(ScanError::EntryIo {
                        archive: archive_path.to_path_buf(),
                        entry: path,
                        source,
                    })
                }
                header => classify(&path, header, owner),
            };

            match verdict {
                EntryVerdict::Include(entry) => report.entries.push(entry),
                EntryVerdict::Skip(reason) => {
                    warn!(
                        archive = %archive_path.display(),
                        entry = %path,
                        "Skipping content entry: {}", reason
                    );
                    report.skipped.push(SkippedEntry { path, reason });
                }
                EntryVerdict::NotPublicData(content_type) => {
                    debug!(entry = %path, ?content_type, "Ignoring non-DLC content");
                }
                EntryVerdict::ForeignTitle(title_id) => match self.mode {
                    ScanMode::EarlyStop => {
                        debug!(entry = %path, %title_id, "Foreign title, ending scan");
                        report.stopped_at = Some(path);
                        break;
                    }
                    ScanMode::Full => {
                        debug!(entry = %path, %title_id, "Foreign title, skipping");
                    }
                },
            }
        }

        debug!(
            archive = %archive_path.display(),
            owner = %owner,
            found = report.entries.len(),
            skipped = report.skipped.len(),
            "Scan finished"
        );

        Ok(report)
    }

    /// Matching entries only
    pub fn scan_entries(
        &self,
        archive_path: &Path,
        owner: TitleId,
    ) -> Result<Vec<EntryRecord>, ScanError> {
        Ok(self.scan(archive_path, owner)?.entries)
    }
}

fn default_pattern() -> Pattern {
    Pattern::new(DEFAULT_ENTRY_PATTERN).unwrap_or_default()
}
