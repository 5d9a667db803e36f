//! 64-bit title identifiers.
//!
//! A DLC title id shares its upper bits with the base application it belongs
//! to; the low 13 bits encode the content-unit index within that title.

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Bits of a title id that encode the content-unit index
pub const CONTENT_INDEX_MASK: u64 = 0x1FFF;

/// A 64-bit title identifier
///
/// Persisted as a plain integer. `Display` renders the 16-digit uppercase hex
/// form used in listings; that transform never touches the stored value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TitleId(u64);

impl TitleId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Raw 64-bit value
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Title id with the content-unit index cleared
    pub const fn masked(self) -> Self {
        Self(self.0 & !CONTENT_INDEX_MASK)
    }

    /// Whether this content unit belongs to the given owner title
    pub fn belongs_to(self, owner: TitleId) -> bool {
        self.masked() == owner
    }

    /// Lowercase 16-digit hex, used as the per-title catalog directory name
    pub fn catalog_key(self) -> String {
        format!("{:016x}", self.0)
    }
}

impl From<u64> for TitleId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<TitleId> for u64 {
    fn from(id: TitleId) -> Self {
        id.0
    }
}

impl fmt::Display for TitleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016X}", self.0)
    }
}

/// Errors parsing a title id from text
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TitleIdParseError {
    #[error("Title id is empty")]
    Empty,

    #[error("Title id has {0} hex digits, at most 16 allowed")]
    TooLong(usize),

    #[error("Title id is not hexadecimal: {0}")]
    NotHex(#[from] ParseIntError),
}

impl FromStr for TitleId {
    type Err = TitleIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.trim();
        let digits = digits
            .strip_prefix("0x")
            .or_else(|| digits.strip_prefix("0X"))
            .unwrap_or(digits);

        if digits.is_empty() {
            return Err(TitleIdParseError::Empty);
        }
        if digits.len() > 16 {
            return Err(TitleIdParseError::TooLong(digits.len()));
        }

        Ok(Self(u64::from_str_radix(digits, 16)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_sixteen_uppercase_digits() {
        assert_eq!(TitleId::new(0x0100_0000_0000_e013).to_string(), "010000000000E013");
        assert_eq!(TitleId::new(1).to_string(), "0000000000000001");
    }

    #[test]
    fn test_catalog_key_is_lowercase() {
        assert_eq!(TitleId::new(0x0100_ABCD_0000_0000).catalog_key(), "0100abcd00000000");
    }

    #[test]
    fn test_masked_clears_content_index() {
        let owner = TitleId::new(0x0100_0000_0000_e000);

        assert_eq!(TitleId::new(0x0100_0000_0000_e013).masked(), owner);
        assert_eq!(TitleId::new(0x0100_0000_0000_ffff).masked(), owner);
        assert!(TitleId::new(0x0100_0000_0000_e001).belongs_to(owner));
        assert!(!TitleId::new(0x0200_0000_0000_0000).belongs_to(owner));
    }

    #[test]
    fn test_parse_accepts_prefix_and_case() {
        let expected = TitleId::new(0x0100_0000_0000_e013);

        assert_eq!("010000000000E013".parse::<TitleId>().unwrap(), expected);
        assert_eq!("0x010000000000e013".parse::<TitleId>().unwrap(), expected);
        assert_eq!("  10000000000E013 ".parse::<TitleId>().unwrap(), expected);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert_eq!("".parse::<TitleId>(), Err(TitleIdParseError::Empty));
        assert_eq!("0x".parse::<TitleId>(), Err(TitleIdParseError::Empty));
        assert!(matches!(
            "010000000000E0130".parse::<TitleId>(),
            Err(TitleIdParseError::TooLong(17))
        ));
        assert!(matches!(
            "01000000000G".parse::<TitleId>(),
            Err(TitleIdParseError::NotHex(_))
        ));
    }

    #[test]
    fn test_serializes_as_integer() {
        let id = TitleId::new(0x0100_0000_0000_e013);
        let json = serde_json::to_string(&id).unwrap();

        assert_eq!(json, "72057594037985299");
        assert_eq!(serde_json::from_str::<TitleId>(&json).unwrap(), id);
    }
}
