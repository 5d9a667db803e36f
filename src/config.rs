//! Configuration for dlcman.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (DLCMAN_HOME, DLCMAN_GAMES_DIR, DLCMAN_SCAN_MODE)
//! 2. Config file (.dlcman/config.yaml)
//! 3. Defaults (~/.dlcman, games under ~/.dlcman/games)
//!
//! Config file discovery:
//! - Searches current directory and parents for .dlcman/config.yaml
//! - `paths.games` is relative to the project root (parent of .dlcman/),
//!   `paths.home` is relative to the .dlcman/ directory itself

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use glob::Pattern;
use serde::Deserialize;

use crate::catalog::LoadFailurePolicy;
use crate::core::scanner::{ScanMode, DEFAULT_ENTRY_PATTERN};

pub mod paths;

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

const ENV_HOME: &str = "DLCMAN_HOME";
const ENV_GAMES_DIR: &str = "DLCMAN_GAMES_DIR";
const ENV_SCAN_MODE: &str = "DLCMAN_SCAN_MODE";

/// Container extension accepted by `add` when none are configured
pub const DEFAULT_ARCHIVE_EXTENSION: &str = "nsp";

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub scan: Option<ScanConfig>,
    #[serde(default)]
    pub catalog: Option<CatalogConfig>,
    #[serde(default)]
    pub archives: Option<ArchivesConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsConfig {
    /// State directory (relative to .dlcman/)
    pub home: Option<String>,
    /// Directory holding per-title catalogs (relative to project root)
    pub games: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScanConfig {
    pub mode: Option<ScanMode>,
    pub entry_pattern: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    pub on_load_error: Option<LoadFailurePolicy>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArchivesConfig {
    pub extensions: Option<Vec<String>>,
}

/// Resolved configuration with absolute paths
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Absolute path to dlcman home
    pub home: PathBuf,
    /// Directory holding `<title>/dlc.json` catalogs
    pub games_dir: PathBuf,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
    /// Scanner settings
    pub scan: ScanSettings,
    /// What a broken catalog turns into on load
    pub on_load_error: LoadFailurePolicy,
    /// Container file extensions accepted for import (lowercase, no dot)
    pub archive_extensions: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ScanSettings {
    pub mode: ScanMode,
    pub entry_pattern: Pattern,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            mode: ScanMode::default(),
            entry_pattern: Pattern::new(DEFAULT_ENTRY_PATTERN).unwrap_or_default(),
        }
    }
}

impl ResolvedConfig {
    /// Defaults rooted at `home`
    pub fn with_home(home: impl Into<PathBuf>) -> Self {
        let home = home.into();
        Self {
            games_dir: home.join("games"),
            home,
            config_file: None,
            scan: ScanSettings::default(),
            on_load_error: LoadFailurePolicy::default(),
            archive_extensions: vec![DEFAULT_ARCHIVE_EXTENSION.to_string()],
        }
    }

    /// Whether `path` has one of the accepted container extensions
    pub fn accepts_archive(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| {
                let e = e.to_ascii_lowercase();
                self.archive_extensions.iter().any(|allowed| *allowed == e)
            })
            .unwrap_or(false)
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".dlcman").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to the config file's parent
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
            .canonicalize()
            .unwrap_or_else(|_| base.join(path_str))
    }
}

fn parse_scan_mode(value: &str) -> Result<ScanMode> {
    match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
        "early_stop" => Ok(ScanMode::EarlyStop),
        "full" => Ok(ScanMode::Full),
        other => anyhow::bail!("Unknown scan mode '{}' (expected early_stop or full)", other),
    }
}

/// Combine defaults, an optional config file and environment overrides
fn resolve(
    default_home: PathBuf,
    config: Option<(PathBuf, ConfigFile)>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<ResolvedConfig> {
    let mut resolved = ResolvedConfig::with_home(&default_home);

    if let Some((config_path, file)) = config {
        let dlcman_dir = config_path.parent().unwrap_or(Path::new("."));
        let base_dir = dlcman_dir.parent().unwrap_or(Path::new("."));

        if let Some(ref home) = file.paths.home {
            resolved.home = resolve_path(dlcman_dir, home);
        }
        resolved.games_dir = match file.paths.games {
            Some(ref games) => resolve_path(base_dir, games),
            None => resolved.home.join("games"),
        };

        if let Some(scan) = file.scan {
            if let Some(mode) = scan.mode {
                resolved.scan.mode = mode;
            }
            if let Some(pattern) = scan.entry_pattern {
                resolved.scan.entry_pattern = Pattern::new(&pattern)
                    .with_context(|| format!("Invalid entry pattern: {}", pattern))?;
            }
        }

        if let Some(policy) = file.catalog.and_then(|c| c.on_load_error) {
            resolved.on_load_error = policy;
        }

        if let Some(extensions) = file.archives.and_then(|a| a.extensions) {
            resolved.archive_extensions = extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
                .collect();
        }

        resolved.config_file = Some(config_path);
    }

    if let Some(home) = env(ENV_HOME) {
        let home = PathBuf::from(home);
        if env(ENV_GAMES_DIR).is_none() && resolved.config_file.is_none() {
            resolved.games_dir = home.join("games");
        }
        resolved.home = home;
    }
    if let Some(games) = env(ENV_GAMES_DIR) {
        resolved.games_dir = PathBuf::from(games);
    }
    if let Some(mode) = env(ENV_SCAN_MODE) {
        resolved.scan.mode = parse_scan_mode(&mode)?;
    }

    Ok(resolved)
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let default_home = dirs::home_dir()
        .context("Failed to determine home directory")?
        .join(".dlcman");

    let config = match find_config_file() {
        Some(path) => {
            let file = load_config_file(&path)?;
            Some((path, file))
        }
        None => None,
    };

    resolve(default_home, config, |key| std::env::var(key).ok())
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| format!("{:#}", e)));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Force reload configuration (useful for testing)
pub fn reload_config() -> Result<ResolvedConfig> {
    load_config()
}

// ============================================================================
// Convenience functions
// ============================================================================

/// Get the dlcman home directory
pub fn dlcman_home() -> Result<PathBuf> {
    Ok(config()?.home.clone())
}

/// Get the directory holding per-title catalogs
pub fn games_dir() -> Result<PathBuf> {
    Ok(config()?.games_dir.clone())
}
