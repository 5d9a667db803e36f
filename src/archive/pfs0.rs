//! PFS0 partition container reader.
//!
//! ```text
//! 0x00  4     magic "PFS0"
//! 0x04  4     file count (LE)
//! 0x08  4     string table size (LE)
//! 0x0C  4     reserved
//! 0x10  0x18 * count   file entries: data offset u64, size u64, name offset u32, reserved u32
//! ....  string table   NUL-terminated names
//! ....  data region    file data, offsets relative to its start
//! ```

use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};
use tracing::debug;

use super::nca::ContentHeader;
use super::{ArchiveError, ContentArchive, ContentArchiveReader, DecodeError};

pub const MAGIC: &[u8; 4] = b"PFS0";
pub const PREAMBLE_LEN: u64 = 0x10;
pub const FILE_ENTRY_LEN: u64 = 0x18;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// A file inside a PFS0 container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pfs0Entry {
    pub name: String,
    /// Absolute offset of the file data within the container
    pub offset: u64,
    pub size: u64,
}

impl Pfs0Entry {
    /// Entry path as exposed to the scanner (rooted, e.g. `/abc.nca`)
    pub fn full_path(&self) -> String {
        format!("/{}", self.name)
    }
}

/// An opened PFS0 container
pub struct Pfs0Archive<R = BufReader<File>> {
    path: PathBuf,
    inner: R,
    entries: Vec<Pfs0Entry>,
}

impl<R: Read + Seek> Pfs0Archive<R> {
    /// Parse the partition table from `inner`
    pub fn parse(path: impl Into<PathBuf>, mut inner: R) -> Result<Self, ArchiveError> {
        let path = path.into();
        let io_err = |source: io::Error| ArchiveError::Io {
            path: path.clone(),
            source,
        };
        let format_err = |reason: String| ArchiveError::Format {
            path: path.clone(),
            reason,
        };

        let file_len = inner.seek(SeekFrom::End(0)).map_err(io_err)?;
        if file_len < PREAMBLE_LEN {
            return Err(format_err(format!("{} bytes is too short for a header", file_len)));
        }
        inner.seek(SeekFrom::Start(0)).map_err(io_err)?;

        let mut preamble = [0u8; PREAMBLE_LEN as usize];
        inner.read_exact(&mut preamble).map_err(io_err)?;
        if &preamble[0..4] != MAGIC {
            return Err(format_err("bad magic, not a PFS0 container".to_string()));
        }

        let file_count = u32_at(&preamble, 4) as u64;
        let string_table_len = u32_at(&preamble, 8) as u64;
        let table_len = FILE_ENTRY_LEN * file_count;
        let data_start = PREAMBLE_LEN + table_len + string_table_len;
        if data_start > file_len {
            return Err(format_err(format!(
                "file table of {} entries runs past end of file",
                file_count
            )));
        }

        let mut table = vec![0u8; table_len as usize];
        inner.read_exact(&mut table).map_err(io_err)?;
        let mut strings = vec![0u8; string_table_len as usize];
        inner.read_exact(&mut strings).map_err(io_err)?;

        let mut entries = Vec::with_capacity(file_count as usize);
        for raw in table.chunks_exact(FILE_ENTRY_LEN as usize) {
            let data_offset = u64_at(raw, 0);
            let size = u64_at(raw, 8);
            let name_offset = u32_at(raw, 16) as usize;

            let name = read_name(&strings, name_offset).map_err(format_err)?;
            entries.push(Pfs0Entry {
                name,
                offset: data_start.saturating_add(data_offset),
                size,
            });
        }

        debug!(archive = %path.display(), entries = entries.len(), "Opened PFS0 container");

        Ok(Self {
            path,
            inner,
            entries,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries(&self) -> &[Pfs0Entry] {
        &self.entries
    }
}

impl<R: Read + Seek> ContentArchive for Pfs0Archive<R> {
    fn entry_paths(&self, pattern: &Pattern) -> Vec<String> {
        self.entries
            .iter()
            .filter(|e| pattern.matches_with(&e.name, MATCH_OPTIONS))
            .map(Pfs0Entry::full_path)
            .collect()
    }

    fn decode_header(&mut self, entry_path: &str) -> Result<ContentHeader, DecodeError> {
        let name = entry_path.strip_prefix('/').unwrap_or(entry_path);
        let entry = self
            .entries
            .iter()
            .find(|e| e.name == name)
            .cloned()
            .ok_or_else(|| DecodeError::Corrupt(format!("no entry named {}", entry_path)))?;

        self.inner.seek(SeekFrom::Start(entry.offset))?;
        ContentHeader::read_from((&mut self.inner).take(entry.size), entry.size)
    }
}

/// Opens PFS0 containers from the filesystem
#[derive(Debug, Default, Clone, Copy)]
pub struct Pfs0Reader;

impl ContentArchiveReader for Pfs0Reader {
    type Archive = Pfs0Archive;

    fn open_for_read(&self, path: &Path) -> Result<Self::Archive, ArchiveError> {
        let file = File::open(path).map_err(|source| ArchiveError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Pfs0Archive::parse(path, BufReader::new(file))
    }
}

fn read_name(strings: &[u8], offset: usize) -> Result<String, String> {
    let tail = strings
        .get(offset..)
        .ok_or_else(|| format!("name offset {} outside string table", offset))?;
    let end = tail.iter().position(|&b| b == 0).unwrap_or(tail.len());

    String::from_utf8(tail[..end].to_vec()).map_err(|_| "entry name is not UTF-8".to_string())
}

fn u32_at(bytes: &[u8], offset: usize) -> u32 {
    let mut raw = [0u8; 4];
    raw.copy_from_slice(&bytes[offset..offset + 4]);
    u32::from_le_bytes(raw)
}

fn u64_at(bytes: &[u8], offset: usize) -> u64 {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&bytes[offset..offset + 8]);
    u64::from_le_bytes(raw)
}
