use std::path::PathBuf;

use clap::{Parser, Subcommand};

use audiosort_core::catalog::{self, CatalogKind, HttpPageSource};
use audiosort_core::{AlbumLedger, Directory};

#[derive(Parser)]
#[command(name = "audiosort", version, about = "Organize a local audio collection by its embedded metadata")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan a directory and report collection statistics
    Scan {
        root: PathBuf,

        /// Dump the records as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Copy a directory tree to a "<root>_bak" sibling
    Backup { root: PathBuf },

    /// Look up catalog genre tags for an album or track title
    Tags {
        title: String,

        /// Treat the title as a track instead of an album
        #[arg(long)]
        track: bool,

        /// Catalog page base, e.g. the band's site
        #[arg(long, default_value = "https://bandcamp.com")]
        base_url: String,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Scan { root, json } => scan(root, json),
        Command::Backup { root } => backup(root),
        Command::Tags {
            title,
            track,
            base_url,
        } => tags(&title, track, &base_url),
    }
}

fn scan(root: PathBuf, json: bool) -> anyhow::Result<()> {
    let mut dir = Directory::open(root)?;
    let mut ledger = AlbumLedger::new();
    let records = dir.records(&mut ledger)?.to_vec();

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    for record in &records {
        let audio = record.as_audio();
        println!(
            "{} - {} ({}, {}) [{}]",
            audio.title,
            audio.artist,
            audio.album,
            audio.album_artist,
            audio.origin
        );
    }
    println!(
        "{} audio file(s) across {} album(s)",
        records.len(),
        ledger.albums()
    );

    let empties = dir.empty_dirs();
    if !empties.is_empty() {
        println!("{} empty directorie(s):", empties.len());
        for path in empties {
            println!("  {}", path.display());
        }
    }
    Ok(())
}

fn backup(root: PathBuf) -> anyhow::Result<()> {
    let dir = Directory::open(root)?;
    let dest = dir.backup()?;
    println!("backup created at {}", dest.display());
    Ok(())
}

fn tags(title: &str, track: bool, base_url: &str) -> anyhow::Result<()> {
    let kind = if track {
        CatalogKind::Track
    } else {
        CatalogKind::Album
    };

    let Some(path) = catalog::build_path(title, kind) else {
        println!("no catalog path for {title:?}");
        return Ok(());
    };

    let url = format!("{}/{}", base_url.trim_end_matches('/'), path);
    let source = HttpPageSource::new();
    let tags = catalog::fetch_tags(&source, &url)?;

    if tags.is_empty() {
        println!("no tags listed at {url}");
    } else {
        println!("{}", tags.join(", "));
    }
    Ok(())
}
