use album_tagger_core::{logging, Album, CatalogEntry, Config, OpenReport};
use anyhow::Context;
use chrono::{DateTime, Local};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Parser)]
#[command(name = "album-tagger")]
#[command(about = "Tag the images in a folder tree, keeping tags in metadata.json")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Write logs to rotating files instead of stderr
    #[arg(long, global = true)]
    log_file: bool,

    /// Directory for log files (implies --log-file)
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List images with their tags
    Scan {
        /// Root directory of the album
        root: PathBuf,

        /// Only show images carrying all of these tags
        #[arg(short, long = "tag")]
        tags: Vec<String>,

        /// Only show images without tags
        #[arg(long, conflicts_with = "tags")]
        untagged: bool,
    },

    /// List every tag in use
    Tags {
        /// Root directory of the album
        root: PathBuf,
    },

    /// Add a tag to an image
    Tag {
        /// Root directory of the album
        root: PathBuf,

        /// Image path relative to the root, with `/` separators
        path: String,

        tag: String,
    },

    /// Remove a tag from an image
    Untag {
        /// Root directory of the album
        root: PathBuf,

        /// Image path relative to the root, with `/` separators
        path: String,

        tag: String,
    },

    /// List metadata entries that no longer match an image
    Orphans {
        /// Root directory of the album
        root: PathBuf,
    },

    /// Generate default configuration file
    GenerateConfig {
        /// Path to save configuration file
        #[arg(default_value = "album-tagger.json")]
        path: PathBuf,
    },
}

fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => Config::default(),
    };

    // Set log level based on verbosity
    config.log_level = match cli.verbose {
        0 => config.log_level,
        1 => album_tagger_core::LogLevel::Debug,
        _ => album_tagger_core::LogLevel::Trace,
    };
    config.validate()?;

    let level = config.log_level.to_level_filter();
    if cli.log_file || cli.log_dir.is_some() {
        let log_dir = cli
            .log_dir
            .clone()
            .or_else(logging::default_log_dir)
            .context("no log directory available; pass --log-dir")?;
        logging::init_logger(&log_dir, level).map_err(|e| anyhow::anyhow!("{}", e))?;
    } else {
        env_logger::Builder::new()
            .filter_level(level)
            .parse_env(logging::LOG_ENV_VAR)
            .init();
    }

    match cli.command {
        Commands::Scan {
            root,
            tags,
            untagged,
        } => {
            let album = open_album(config, &root)?;
            let catalog = album.catalog()?;
            let entries: Vec<&CatalogEntry> = if untagged {
                catalog.filter_by_no_tags()
            } else {
                catalog.filter_by_tags(&tags)
            };
            for entry in &entries {
                print_entry(entry);
            }
            println!("{} of {} images", entries.len(), catalog.len());
            Ok(())
        }

        Commands::Tags { root } => {
            let album = open_album(config, &root)?;
            for tag in album.catalog()?.tags() {
                println!("{}", tag);
            }
            Ok(())
        }

        Commands::Tag { root, path, tag } => {
            let album = open_album(config, &root)?;
            if album.add_tag(&path, &tag)? {
                info!("Tagged {} with {}", path, tag);
            } else {
                println!("{} already has tag {}", path, tag);
            }
            Ok(())
        }

        Commands::Untag { root, path, tag } => {
            let album = open_album(config, &root)?;
            if album.remove_tag(&path, &tag)? {
                info!("Removed {} from {}", tag, path);
            } else {
                println!("{} does not have tag {}", path, tag);
            }
            Ok(())
        }

        Commands::Orphans { root } => {
            let album = open_album(config, &root)?;
            for key in album.orphans()? {
                println!("{}", key);
            }
            Ok(())
        }

        Commands::GenerateConfig { path } => {
            Config::default().save_to_file(&path)?;
            println!("Configuration file generated at: {}", path.display());
            Ok(())
        }
    }
}

/// Open `root` with a spinner while the tree is scanned
fn open_album(config: Config, root: &Path) -> anyhow::Result<Album> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner} {msg}")
            .context("invalid spinner template")?,
    );
    spinner.set_message(format!("Scanning {}", root.display()));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let album = Album::new(config);
    let report = album.open(root);
    spinner.finish_and_clear();

    let report = report.with_context(|| format!("failed to open {}", root.display()))?;
    summarize(&report);
    Ok(album)
}

fn summarize(report: &OpenReport) {
    info!(
        "Opened {} with {} images ({:?} sidecar)",
        report.root.display(),
        report.images,
        report.sidecar
    );
    for issue in &report.issues {
        match &issue.path {
            Some(path) => eprintln!("skipped {}: {}", path.display(), issue.message),
            None => eprintln!("skipped: {}", issue.message),
        }
    }
    for migration in &report.reconcile.migrated {
        eprintln!("moved tags: {} -> {}", migration.from, migration.to);
    }
    if !report.reconcile.unresolved.is_empty() {
        eprintln!(
            "{} metadata entries match no image (see `album-tagger orphans`)",
            report.reconcile.unresolved.len()
        );
    }
    if report.unsaved_migrations {
        warn!("Moved tags could not be written back to metadata.json");
    }
}

fn print_entry(entry: &CatalogEntry) {
    let modified: DateTime<Local> = entry.image.last_modified.into();
    let tags: Vec<&str> = entry.tags.iter().collect();
    println!(
        "{}\t{}\t{}",
        entry.image.relative_path,
        modified.format("%Y-%m-%d %H:%M"),
        tags.join(", ")
    );
}
