//! Persisted DLC catalogs.
//!
//! # Storage Layout
//!
//! ```text
//! <games_dir>/
//! └── <title id, lowercase hex>/
//!     └── dlc.json     # Ordered container records with entry preferences
//! ```

pub mod store;

pub use store::{catalog_path, CatalogError, CatalogStore, LoadFailurePolicy, CATALOG_FILE_NAME};
