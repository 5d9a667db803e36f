//! Canonical paths for dlcman.
//!
//! Single source of truth - import this instead of hardcoding paths.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use dlcman::config::paths;
//!
//! let games = paths::games_dir()?;
//! ```

use std::path::PathBuf;

use anyhow::Result;

/// Get the dlcman home directory (~/.dlcman)
pub fn dlcman_home() -> Result<PathBuf> {
    crate::config::dlcman_home()
}

/// Get the directory holding per-title catalogs (~/.dlcman/games)
pub fn games_dir() -> Result<PathBuf> {
    crate::config::games_dir()
}

