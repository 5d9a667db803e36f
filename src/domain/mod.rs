//! Domain types for the DLC catalog.
//!
//! This module contains the core data structures:
//! - TitleId: 64-bit content identifiers with masked owner matching
//! - Records: Persisted containers and their entries

pub mod records;
pub mod title_id;

// Re-export commonly used types
pub use records::{ContainerRecord, EntryRecord};
pub use title_id::{TitleId, TitleIdParseError, CONTENT_INDEX_MASK};
