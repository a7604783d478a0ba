use clap::{Parser, Subcommand};

/// Deck state and catalog inspection CLI
#[derive(Parser)]
#[command(name = "reeldeck")]
#[command(about = "Swipeable trailer-discovery deck over a media catalog", long_about = None)]
pub struct Cli {
    /// Database URL (defaults to a SQLite file in the user data directory)
    #[arg(long, global = true)]
    pub database_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List genres for a content kind
    Genres {
        /// Content kind: movie or series
        #[arg(short, long, default_value = "movie")]
        kind: String,
    },
    /// Preview one discover page for a filter
    Discover {
        /// Content kind: movie or series
        #[arg(short, long, default_value = "movie")]
        kind: String,
        /// Comma-separated genre ids
        #[arg(short, long)]
        genres: Option<String>,
        /// Page number (1-based)
        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },
    /// Resolve the best trailer for an item
    Trailer {
        /// Content kind: movie or series
        #[arg(short, long, default_value = "movie")]
        kind: String,
        /// Catalog item id
        id: u32,
    },
    /// List liked items, newest first
    Liked,
    /// List watched items, newest first
    Watched,
    /// Show stored-state statistics
    Stats,
    /// Clear stored deck state
    Clear {
        /// Slot key prefix to clear (everything when omitted)
        #[arg(long)]
        prefix: Option<String>,
    },
}
