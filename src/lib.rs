//! dlcman - DLC catalog manager
//!
//! Keeps track of which downloadable-content archives belong to a title and
//! which of their entries are enabled.
//!
//! # Architecture
//!
//! The flow for one title:
//! - The saved catalog (`dlc.json`) is loaded
//! - Every saved archive is rescanned for the title's DLC entries
//! - Saved enable flags are merged onto the fresh scan
//! - The result is edited as a two-level toggle tree
//! - The tree is flattened and written back over the old catalog
//!
//! # Modules
//!
//! - `archive`: Content archive access (PFS0 containers, entry headers)
//! - `catalog`: Catalog file persistence
//! - `core`: Scanner, reconciler, toggle tree, serializer, edit session
//! - `domain`: Data structures (TitleId, ContainerRecord, EntryRecord)
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Show DLC for a title
//! dlcman list 0100000000010000
//!
//! # Add archives
//! dlcman add 0100000000010000 ~/Downloads/dlc1.nsp ~/Downloads/dlc2.nsp
//!
//! # Disable one entry
//! dlcman toggle 0100000000010000 ~/Downloads/dlc1.nsp --entry 0100000000011001
//! ```

pub mod archive;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;

// Re-export main types at crate root for convenience
pub use archive::{ContentArchiveReader, Pfs0Reader};
pub use catalog::{CatalogError, CatalogStore, LoadFailurePolicy};
pub use core::{EditSession, EntryScanner, ScanMode, ToggleTree};
pub use domain::{ContainerRecord, EntryRecord, TitleId};
