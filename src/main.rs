mod cli;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use reeldeck::catalog::TmdbCatalog;
use reeldeck::types::{ContentItem, ContentKind, FilterState};
use reeldeck::Reeldeck;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let app = Reeldeck::connect(cli.database_url.as_deref(), true).await?;

    // Only the catalog-facing commands need an API key.
    let needs_catalog = matches!(
        cli.command,
        Commands::Genres { .. } | Commands::Discover { .. } | Commands::Trailer { .. }
    );
    let app = if needs_catalog {
        app.with_catalog(Arc::new(TmdbCatalog::from_env()?))
    } else {
        app
    };

    match cli.command {
        Commands::Genres { kind } => {
            let kind = parse_kind(&kind)?;
            for genre in app.genres(kind).await? {
                println!("{:>6}  {}", genre.id, genre.name);
            }
        }
        Commands::Discover { kind, genres, page } => {
            let kind = parse_kind(&kind)?;
            let filter = FilterState::with_genres(kind, parse_genres(genres.as_deref()));
            let items = app.discover(page, &filter).await?;
            if items.is_empty() {
                println!("No results for this filter on page {page}.");
            }
            for item in items {
                print_item(&item);
            }
        }
        Commands::Trailer { kind, id } => {
            let kind = parse_kind(&kind)?;
            match app.trailer(id, kind).await? {
                Some(handle) => println!("{}", handle.watch_url()),
                None => println!("No trailer found for {kind} {id}."),
            }
        }
        Commands::Liked => {
            for item in app.library().await.liked() {
                print_item(&item);
            }
        }
        Commands::Watched => {
            for item in app.library().await.watched() {
                print_item(&item);
            }
        }
        Commands::Stats => {
            let stats = app.stats().await?;
            println!("Liked:    {}", stats.liked);
            println!("Watched:  {}", stats.watched);
            println!("Snapshot: {}", if stats.has_snapshot { "present" } else { "none" });
            println!("Slots:    {}", stats.slots);
        }
        Commands::Clear { prefix } => {
            let removed = app.clear_state(prefix.as_deref()).await?;
            app.vacuum_db().await?;
            println!("Removed {removed} slot(s).");
        }
    }

    Ok(())
}

fn parse_kind(raw: &str) -> Result<ContentKind> {
    raw.parse::<ContentKind>().map_err(anyhow::Error::msg)
}

/// Lenient genre list parsing; malformed entries are dropped, unknown ids
/// pass through to the catalog unchanged.
fn parse_genres(raw: Option<&str>) -> Vec<u32> {
    raw.map(|s| {
        s.split(',')
            .filter_map(|part| part.trim().parse().ok())
            .collect()
    })
    .unwrap_or_default()
}

fn print_item(item: &ContentItem) {
    println!(
        "{:>8}  {:<42}  {:>4.1}  {}",
        item.id,
        item.title,
        item.vote_average,
        item.release_year().unwrap_or("----"),
    );
}
