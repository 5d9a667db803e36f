//! Content entry header decoding.
//!
//! Layout of the fields read here (offsets into the entry):
//!
//! ```text
//! 0x000  0x200  signatures (ignored)
//! 0x200  4      magic "NCA2" / "NCA3"
//! 0x204  1      distribution type
//! 0x205  1      content type
//! 0x208  8      content size (LE)
//! 0x210  8      title id (LE)
//! ```
//!
//! Only plaintext headers are understood. Retail headers are encrypted with a
//! header key this crate never handles, so they surface as a missing key.

use std::io::{self, Read};

use super::DecodeError;
use crate::domain::TitleId;

/// Bytes of header read from each entry
pub const HEADER_SIZE: usize = 0xC00;

/// Smallest entry that can hold the fields we read
pub const MIN_HEADER_LEN: usize = 0x400;

pub const MAGIC_OFFSET: usize = 0x200;
pub const DISTRIBUTION_OFFSET: usize = 0x204;
pub const CONTENT_TYPE_OFFSET: usize = 0x205;
pub const CONTENT_SIZE_OFFSET: usize = 0x208;
pub const TITLE_ID_OFFSET: usize = 0x210;

const HEADER_KEY_NAME: &str = "header_key";

/// Kind of content held by an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    Program,
    Meta,
    Control,
    Manual,
    Data,
    /// Ordinary installable add-on content
    PublicData,
}

impl ContentType {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Program),
            1 => Some(Self::Meta),
            2 => Some(Self::Control),
            3 => Some(Self::Manual),
            4 => Some(Self::Data),
            5 => Some(Self::PublicData),
            _ => None,
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            Self::Program => 0,
            Self::Meta => 1,
            Self::Control => 2,
            Self::Manual => 3,
            Self::Data => 4,
            Self::PublicData => 5,
        }
    }
}

/// Decoded header of a content entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentHeader {
    /// Format revision from the magic (2 or 3)
    pub version: u8,
    pub distribution: u8,
    pub content_type: ContentType,
    pub content_size: u64,
    pub title_id: TitleId,
}

impl ContentHeader {
    /// Parse a header from the leading bytes of an entry
    pub fn parse(bytes: &[u8]) -> Result<Self, DecodeError> {
        if bytes.len() < MIN_HEADER_LEN {
            return Err(DecodeError::Corrupt(format!(
                "header is {} bytes, expected at least {}",
                bytes.len(),
                MIN_HEADER_LEN
            )));
        }

        let version = match &bytes[MAGIC_OFFSET..MAGIC_OFFSET + 4] {
            b"NCA3" => 3,
            b"NCA2" => 2,
            _ => {
                return Err(DecodeError::MissingKey {
                    name: HEADER_KEY_NAME.to_string(),
                })
            }
        };

        let raw_type = bytes[CONTENT_TYPE_OFFSET];
        let content_type = ContentType::from_u8(raw_type)
            .ok_or_else(|| DecodeError::Corrupt(format!("unknown content type {}", raw_type)))?;

        Ok(Self {
            version,
            distribution: bytes[DISTRIBUTION_OFFSET],
            content_type,
            content_size: read_u64(bytes, CONTENT_SIZE_OFFSET),
            title_id: TitleId::new(read_u64(bytes, TITLE_ID_OFFSET)),
        })
    }

    /// Read and parse a header from an entry of `entry_len` bytes
    pub fn read_from(mut r: impl Read, entry_len: u64) -> Result<Self, DecodeError> {
        let len = entry_len.min(HEADER_SIZE as u64) as usize;
        let mut buf = vec![0u8; len];

        match r.read_exact(&mut buf) {
            Ok(()) => Self::parse(&buf),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Err(DecodeError::Corrupt(
                "entry data ends before its recorded size".to_string(),
            )),
            Err(e) => Err(DecodeError::Io(e)),
        }
    }
}

fn read_u64(bytes: &[u8], offset: usize) -> u64 {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&bytes[offset..offset + 8]);
    u64::from_le_bytes(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain_header(content_type: u8, title_id: u64) -> Vec<u8> {
        let mut buf = vec![0u8; HEADER_SIZE];
        buf[MAGIC_OFFSET..MAGIC_OFFSET + 4].copy_from_slice(b"NCA3");
        buf[CONTENT_TYPE_OFFSET] = content_type;
        buf[CONTENT_SIZE_OFFSET..CONTENT_SIZE_OFFSET + 8]
            .copy_from_slice(&(HEADER_SIZE as u64).to_le_bytes());
        buf[TITLE_ID_OFFSET..TITLE_ID_OFFSET + 8].copy_from_slice(&title_id.to_le_bytes());
        buf
    }

    #[test]
    fn test_parse_plaintext_header() {
        let header = ContentHeader::parse(&plain_header(5, 0x0100_0000_0000_e001)).unwrap();

        assert_eq!(header.version, 3);
        assert_eq!(header.content_type, ContentType::PublicData);
        assert_eq!(header.title_id, TitleId::new(0x0100_0000_0000_e001));
        assert_eq!(header.content_size, HEADER_SIZE as u64);
    }

    #[test]
    fn test_encrypted_header_reports_missing_key() {
        let mut bytes = plain_header(5, 1);
        bytes[MAGIC_OFFSET..MAGIC_OFFSET + 4].copy_from_slice(&[0x9a, 0x31, 0x07, 0xee]);

        match ContentHeader::parse(&bytes) {
            Err(DecodeError::MissingKey { name }) => assert_eq!(name, "header_key"),
            other => panic!("Expected MissingKey, got {:?}", other),
        }
    }

    #[test]
    fn test_short_header_is_corrupt() {
        let result = ContentHeader::parse(&[0u8; 0x100]);
        assert!(matches!(result, Err(DecodeError::Corrupt(_))));
    }

    #[test]
    fn test_unknown_content_type_is_corrupt() {
        let result = ContentHeader::parse(&plain_header(9, 1));
        assert!(matches!(result, Err(DecodeError::Corrupt(_))));
    }

    #[test]
    fn test_truncated_read_is_corrupt() {
        let bytes = plain_header(5, 1);
        let result = ContentHeader::read_from(&bytes[..0x300], HEADER_SIZE as u64);

        let err = result.unwrap_err();
        assert!(err.is_skippable());
    }

    #[test]
    fn test_content_type_bytes_round_trip() {
        for raw in 0..=5u8 {
            assert_eq!(ContentType::from_u8(raw).unwrap().as_u8(), raw);
        }
        assert_eq!(ContentType::from_u8(6), None);
    }
}
