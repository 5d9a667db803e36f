//! Content archive access.
//!
//! The scanner only needs two things from an archive: the names of its
//! content entries in archive order, and the decoded header of each one.
//! [`ContentArchiveReader`] is that boundary; [`Pfs0Reader`] is the built-in
//! implementation for PFS0 partition containers with plaintext headers.
//!
//! Archive handles are ordinary owned values. Dropping one closes the
//! underlying file, so every exit path of a scan releases it.

use std::io;
use std::path::{Path, PathBuf};

use glob::Pattern;
use thiserror::Error;

pub mod nca;
pub mod pfs0;

pub use nca::{ContentHeader, ContentType};
pub use pfs0::{Pfs0Archive, Pfs0Reader};

/// Errors opening or reading an archive as a whole
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Failed to open archive {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Malformed archive {path}: {reason}")]
    Format { path: PathBuf, reason: String },

    #[error("IO error reading archive {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Why a single content entry could not be decoded
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Corrupt content entry: {0}")]
    Corrupt(String),

    #[error("Key set is missing a key with the name: {name}")]
    MissingKey { name: String },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl DecodeError {
    /// Whether the scan may skip this entry and carry on
    pub fn is_skippable(&self) -> bool {
        matches!(self, Self::Corrupt(_) | Self::MissingKey { .. })
    }
}

/// An opened content archive
pub trait ContentArchive {
    /// Entry paths matching `pattern`, in archive order
    fn entry_paths(&self, pattern: &Pattern) -> Vec<String>;

    /// Decode the content header of one entry
    fn decode_header(&mut self, entry_path: &str) -> Result<ContentHeader, DecodeError>;
}

/// Opens content archives by path
pub trait ContentArchiveReader {
    type Archive: ContentArchive;

    fn open_for_read(&self, path: &Path) -> Result<Self::Archive, ArchiveError>;
}

impl<R: ContentArchiveReader + ?Sized> ContentArchiveReader for &R {
    type Archive = R::Archive;

    fn open_for_read(&self, path: &Path) -> Result<Self::Archive, ArchiveError> {
        (**self).open_for_read(path)
    }
}

