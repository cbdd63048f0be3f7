//! songbook - inspect tag records and manage playlists from the shell
//!
//! The library is a directory of record dumps (`*.dump`, one record per
//! file); playlists live in the configured playlist directory. Logs go to
//! stderr so `--json` output on stdout stays machine-readable.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use songbook_common::config::{install, settings, Settings};
use tracing::{debug, info};

mod commands;

use commands::{Report, Workspace};

/// Command-line arguments for songbook
#[derive(Parser, Debug)]
#[command(name = "songbook")]
#[command(about = "Inspect tag records and manage playlists")]
#[command(version)]
struct Args {
    /// Config file (overrides SONGBOOK_CONFIG and the platform default)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory of record dumps making up the library
    #[arg(long, global = true, value_name = "DIR")]
    library: Option<PathBuf>,

    /// Playlist directory (default: playlist_dir from the config)
    #[arg(long, global = true, value_name = "DIR")]
    playlists: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print resolved values of one record dump
    Resolve {
        dump: PathBuf,
        #[arg(required = true)]
        keys: Vec<String>,
    },
    /// List playlists with their entry counts
    List,
    /// Print aggregate values of a playlist
    Show {
        name: String,
        /// Key to aggregate (repeatable)
        #[arg(long = "key", value_name = "KEY")]
        keys: Vec<String>,
    },
    /// Create a playlist, optionally filled with library tracks
    Create { name: String, paths: Vec<String> },
    /// Append library tracks to a playlist
    Append {
        name: String,
        #[arg(required = true)]
        paths: Vec<String>,
    },
    Rename { old: String, new: String },
    Shuffle { name: String },
    Delete { name: String },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let loaded =
        Settings::resolve(args.config.as_deref()).context("Failed to load configuration")?;
    init_tracing(&loaded.logging.level);
    install(loaded);

    info!("songbook v{}", env!("CARGO_PKG_VERSION"));
    debug!(settings = ?settings(), "Configuration loaded");

    let report = run(&args)?;
    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to encode report")?
        );
    } else {
        print!("{}", report);
    }
    Ok(())
}

/// RUST_LOG wins over the configured level
fn init_tracing(level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: &Args) -> Result<Report> {
    let open = || -> Result<Workspace> {
        let playlist_dir = args
            .playlists
            .clone()
            .unwrap_or_else(|| settings().playlist_dir);
        Workspace::new(playlist_dir, args.library.as_deref())
    };

    match &args.command {
        Command::Resolve { dump, keys } => commands::resolve(dump, keys),
        Command::List => commands::list(&open()?),
        Command::Show { name, keys } => commands::show(&open()?, name, keys),
        Command::Create { name, paths } => commands::create(&open()?, name, paths),
        Command::Append { name, paths } => commands::append(&open()?, name, paths),
        Command::Rename { old, new } => commands::rename(&open()?, old, new),
        Command::Shuffle { name } => commands::shuffle(&open()?, name),
        Command::Delete { name } => commands::delete(&open()?, name),
    }
}
