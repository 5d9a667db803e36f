//! Core catalog logic.
//!
//! This module contains:
//! - Scanner: Extracting a title's DLC entries from an archive
//! - Reconciler: Merging scanned entries with saved preferences
//! - Tree: Containers and entries with tri-state toggling
//! - Serializer: Flattening the tree back into catalog records
//! - Session: Load, edit and save for one title

pub mod reconciler;
pub mod scanner;
pub mod serializer;
pub mod session;
pub mod tree;

// Re-export commonly used types
pub use reconciler::{merge, PreferenceReconciler};
pub use scanner::{
    classify, EntryScanner, EntryVerdict, ScanError, ScanMode, ScanReport, SkippedEntry,
};
pub use serializer::flatten;
pub use session::{AddError, AddOutcome, EditSession};
pub use tree::{Node, NodeId, NodeKind, Removal, ToggleTree, TreeError};
