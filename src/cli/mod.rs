//! Command-line interface for dlcman.
//!
//! Every editing command opens the title's session, applies one edit and
//! saves. Read-only commands never write the catalog.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::archive::Pfs0Reader;
use crate::catalog::CATALOG_FILE_NAME;
use crate::config::{self, paths};
use crate::core::{EditSession, NodeId, Removal, ToggleTree};
use crate::domain::TitleId;

/// dlcman - DLC catalog manager
#[derive(Parser, Debug)]
#[command(name = "dlcman")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the DLC catalog of a title
    List {
        /// Title id of the base application (hex)
        title: TitleId,
    },

    /// Show which entries of an archive belong to a title
    Scan {
        /// Title id of the base application (hex)
        title: TitleId,

        /// Content archive to scan
        archive: PathBuf,
    },

    /// Add content archives to a title's catalog
    Add {
        /// Title id of the base application (hex)
        title: TitleId,

        /// Content archives to add
        #[arg(required = true)]
        archives: Vec<PathBuf>,
    },

    /// Toggle a whole archive, or one entry with --entry
    Toggle {
        /// Title id of the base application (hex)
        title: TitleId,

        /// Archive as listed in the catalog
        archive: PathBuf,

        /// Title id of the entry to toggle (hex)
        #[arg(short, long)]
        entry: Option<TitleId>,
    },

    /// Remove an archive, or one entry with --entry
    Remove {
        /// Title id of the base application (hex)
        title: TitleId,

        /// Archive as listed in the catalog
        archive: PathBuf,

        /// Title id of the entry to remove (hex)
        #[arg(short, long)]
        entry: Option<TitleId>,
    },

    /// Remove every archive from a title's catalog
    RemoveAll {
        /// Title id of the base application (hex)
        title: TitleId,
    },

    /// Show resolved configuration (debug)
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        match self.command {
            Commands::List { title } => list(title),
            Commands::Scan { title, archive } => scan(title, &archive),
            Commands::Add { title, archives } => add(title, archives),
            Commands::Toggle {
                title,
                archive,
                entry,
            } => toggle(title, &archive, entry),
            Commands::Remove {
                title,
                archive,
                entry,
            } => remove(title, &archive, entry),
            Commands::RemoveAll { title } => remove_all(title),
            Commands::Config => show_config(),
        }
    }
}

fn open_session(title: TitleId) -> Result<EditSession<Pfs0Reader>> {
    let config = config::config()?;
    EditSession::open(title, config, Pfs0Reader)
        .with_context(|| format!("Failed to open DLC catalog for {}", title))
}

fn save(session: &EditSession<Pfs0Reader>) -> Result<()> {
    session
        .save()
        .with_context(|| format!("Failed to save {}", session.catalog_path().display()))
}

/// Archive paths are stored as imported, which is canonical for the CLI
fn canonical(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

fn find_container(tree: &ToggleTree, archive: &Path) -> Result<NodeId> {
    tree.find_container(archive)
        .or_else(|| tree.find_container(&canonical(archive)))
        .with_context(|| format!("{} is not in the catalog", archive.display()))
}

fn find_target(tree: &ToggleTree, archive: &Path, entry: Option<TitleId>) -> Result<NodeId> {
    let container = find_container(tree, archive)?;
    match entry {
        Some(title_id) => tree.find_entry(container, title_id).with_context(|| {
            format!("{} has no entry {}", archive.display(), title_id)
        }),
        None => Ok(container),
    }
}

/// Print the catalog tree
fn print_tree(tree: &ToggleTree) -> Result<()> {
    for &container in tree.containers() {
        let node = tree.node(container).context("Container vanished")?;
        println!("{} {}", checkbox(node.enabled()), node.path().display());

        for &child in tree.children(container)? {
            let entry = tree.node(child).context("Entry vanished")?;
            let title_id = entry.title_id().map(|t| t.to_string()).unwrap_or_default();
            println!(
                "    {} {:<16}  {}",
                checkbox(entry.enabled()),
                title_id,
                entry.path().display()
            );
        }
    }
    Ok(())
}

fn checkbox(enabled: bool) -> &'static str {
    if enabled {
        "[x]"
    } else {
        "[ ]"
    }
}

/// Show the DLC catalog of a title
fn list(title: TitleId) -> Result<()> {
    let session = open_session(title)?;
    let tree = session.tree();

    println!("DLC available for [{}]", title);
    if tree.is_empty() {
        println!("No DLC archives in {}", session.catalog_path().display());
        return Ok(());
    }

    print_tree(tree)
}

/// Scan an archive without changing the catalog
fn scan(title: TitleId, archive: &Path) -> Result<()> {
    let session = open_session(title)?;
    let report = session
        .scan(archive)
        .with_context(|| format!("Failed to scan {}", archive.display()))?;

    if report.entries.is_empty() {
        println!("{} contains no DLC for [{}]", archive.display(), title);
    }
    for entry in &report.entries {
        println!("{}  {}", entry.title_id, entry.path);
    }
    for skipped in &report.skipped {
        eprintln!("skipped {}: {}", skipped.path, skipped.reason);
    }
    if let Some(stopped_at) = &report.stopped_at {
        eprintln!("scan stopped at {} (belongs to another title)", stopped_at);
    }

    Ok(())
}

/// Add archives; failures are reported per archive
fn add(title: TitleId, archives: Vec<PathBuf>) -> Result<()> {
    let mut session = open_session(title)?;
    let total = archives.len();

    let outcomes = session.add_archives(archives.iter().map(|p| canonical(p)));

    let mut failed = 0;
    for outcome in &outcomes {
        match &outcome.result {
            Ok(_) => println!("Added {}", outcome.path.display()),
            Err(e) => {
                failed += 1;
                eprintln!("Error: {}", e);
            }
        }
    }

    if failed < total {
        save(&session)?;
    }
    if failed > 0 {
        anyhow::bail!("{} of {} archives could not be added", failed, total);
    }

    Ok(())
}

/// Toggle an archive or one of its entries
fn toggle(title: TitleId, archive: &Path, entry: Option<TitleId>) -> Result<()> {
    let mut session = open_session(title)?;
    let target = find_target(session.tree(), archive, entry)?;

    let enabled = match entry {
        Some(_) => session.tree_mut().toggle_entry(target)?,
        None => session.tree_mut().toggle_container(target)?,
    };
    save(&session)?;

    let what = entry.map_or_else(|| archive.display().to_string(), |t| t.to_string());
    println!("{} {}", if enabled { "Enabled" } else { "Disabled" }, what);
    Ok(())
}

/// Remove an archive or one of its entries
fn remove(title: TitleId, archive: &Path, entry: Option<TitleId>) -> Result<()> {
    let mut session = open_session(title)?;
    let target = find_target(session.tree(), archive, entry)?;

    let removal = session.tree_mut().remove_entry(target)?;
    save(&session)?;

    match removal {
        Removal::Entry => println!(
            "Removed {} from {}",
            entry.map(|t| t.to_string()).unwrap_or_default(),
            archive.display()
        ),
        Removal::Container(_) => println!("Removed {}", archive.display()),
    }
    Ok(())
}

/// Clear a title's catalog
fn remove_all(title: TitleId) -> Result<()> {
    let mut session = open_session(title)?;
    let count = session.tree().len();

    session.tree_mut().remove_all();
    save(&session)?;

    println!("Removed {} archives", count);
    Ok(())
}

/// Show resolved configuration
fn show_config() -> Result<()> {
    let config = config::config()?;

    println!("Home:        {}", paths::dlcman_home()?.display());
    match &config.config_file {
        Some(path) => println!("Config file: {}", path.display()),
        None => println!("Config file: (none)"),
    }
    println!("Scan mode:   {:?}", config.scan.mode);
    println!("Pattern:     {}", config.scan.entry_pattern);
    println!("On bad load: {:?}", config.on_load_error);
    println!("Extensions:  {}", config.archive_extensions.join(", "));
    println!(
        "Catalogs:    {}",
        paths::games_dir()?
            .join("<title>")
            .join(CATALOG_FILE_NAME)
            .display()
    );

    Ok(())
}
