mod app;
mod config;
mod gallery;
mod image_loader;
mod models;
mod thumbnails;
mod ui;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use app::FolioApp;
use config::GalleryConfig;
use thumbnails::ThumbnailGenerator;

#[derive(Parser)]
#[command(name = "folio", version)]
#[command(about = "Paginated photo and video gallery", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Gallery directory holding gallery.json, media/ and thumbnails/
    root: Option<PathBuf>,

    /// Tiles per page
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    items_per_page: Option<u32>,

    /// Grid columns
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    columns: Option<u32>,

    /// Full-resolution media directory, relative to the gallery root
    #[arg(long)]
    media_dir: Option<PathBuf>,

    /// Thumbnail directory, relative to the gallery root
    #[arg(long)]
    thumb_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Generate thumbnails for the media directory
    Thumbnails {
        /// Gallery directory
        root: Option<PathBuf>,

        /// Longest side of a thumbnail in pixels
        #[arg(long, default_value_t = thumbnails::DEFAULT_MAX_SIZE,
              value_parser = clap::value_parser!(u32).range(1..))]
        max_size: u32,

        /// Regenerate thumbnails that are already up to date
        #[arg(long)]
        force: bool,
    },
}

impl Cli {
    fn config(&self, root: Option<&PathBuf>) -> GalleryConfig {
        let mut config = GalleryConfig::from_env();
        if let Some(n) = self.items_per_page {
            config.items_per_page = n as usize;
        }
        if let Some(n) = self.columns {
            config.columns = n;
        }
        if let Some(ref dir) = self.media_dir {
            config.media_dir = dir.clone();
        }
        if let Some(ref dir) = self.thumb_dir {
            config.thumb_dir = dir.clone();
        }
        match root {
            Some(root) => config.with_root(root.clone()),
            None => config,
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("folio=info")),
        )
        .init();

    match run() {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

fn run() -> Result<i32> {
    let cli = Cli::parse();

    match cli.command {
        Some(Command::Thumbnails {
            ref root,
            max_size,
            force,
        }) => {
            let config = cli.config(root.as_ref());
            let summary = ThumbnailGenerator::new(max_size)
                .force(force)
                .run(&config.media_root(), &config.thumb_root())?;
            println!(
                "{} generated, {} up to date, {} skipped, {} failed",
                summary.generated, summary.up_to_date, summary.skipped, summary.failed
            );
            Ok(if summary.failed > 0 { 1 } else { 0 })
        }
        None => {
            let config = cli.config(cli.root.as_ref());
            tracing::info!(root = %config.root.display(), "Opening gallery");
            Ok(FolioApp::new(config).run())
        }
    }
}
