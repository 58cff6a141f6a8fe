mod extract;
mod fetch;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use extract::BpmKeyMode;
use fetch::{FetchBackend, FetchConfig, Fetcher};

#[derive(Parser)]
#[command(
    name = "beatport_scraper",
    about = "Extract track listings from a Beatport playlist page"
)]
struct Cli {
    /// Beatport playlist URL
    url: String,

    /// Output file path (defaults to <playlist-name>_<timestamp>.json)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Fetch with plain HTTP instead of the spider.cloud rendering backend
    #[arg(long)]
    plain: bool,

    /// Save fetched page sources under debug/<timestamp>/
    #[arg(long)]
    debug: bool,

    /// Leave the bpm_key field empty (legacy output shape)
    #[arg(long)]
    no_bpm_key: bool,

    /// Tracks requested per page during pagination
    #[arg(long, default_value = "100")]
    per_page: u64,

    /// Fetch the URL exactly as given, without pagination
    #[arg(long)]
    single_page: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    let debug_dir = if cli.debug {
        let dir = output::create_debug_dir()?;
        println!("Debug folder: {}", dir.display());
        Some(dir)
    } else {
        None
    };

    let backend = if cli.plain {
        FetchBackend::Http
    } else {
        FetchBackend::Rendered
    };
    let fetcher = Fetcher::new(FetchConfig {
        backend,
        cookies: std::env::var("BEATPORT_COOKIES").ok().filter(|c| !c.is_empty()),
        per_page: cli.per_page,
        paginate: !cli.single_page,
        debug_dir,
    })?;

    let pages = fetcher.fetch_playlist_pages(&cli.url).await?;
    info!("Fetched {} page(s)", pages.len());

    let mode = if cli.no_bpm_key {
        BpmKeyMode::Omitted
    } else {
        BpmKeyMode::Formatted
    };
    let playlist = extract::extract_playlist_pages(&pages, mode);

    let output_path = match cli.output {
        Some(path) => path,
        None => {
            let name = pages
                .first()
                .map(|html| extract::extract_playlist_name(html))
                .unwrap_or_else(|| "playlist".to_string());
            output::default_output_path(&name)
        }
    };

    output::write_playlist(&output_path, &playlist)?;

    println!("Playlist saved to {}", output_path.display());
    println!("Total tracks extracted: {}", playlist.len());
    Ok(())
}
