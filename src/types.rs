use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Catalog content kind. Ids are only unique within a kind, so the pair
/// (kind, id) is the real identity of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Movie,
    Series,
}

impl ContentKind {
    /// Path segment used by the catalog API ("movie" / "tv").
    pub fn api_path(&self) -> &'static str {
        match self {
            ContentKind::Movie => "movie",
            ContentKind::Series => "tv",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentKind::Movie => write!(f, "movie"),
            ContentKind::Series => write!(f, "series"),
        }
    }
}

impl FromStr for ContentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "movie" | "movies" | "film" => Ok(ContentKind::Movie),
            "series" | "tv" | "show" | "shows" => Ok(ContentKind::Series),
            other => Err(format!("unknown content kind: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: u32,
    pub name: String,
}

/// Resolved trailer reference: a YouTube video key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrailerHandle {
    pub key: String,
}

impl TrailerHandle {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.key)
    }
}

/// A recommendable catalog item. Immutable once fetched; trailer resolution
/// state is tracked separately by the trailer cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: u32,
    pub kind: ContentKind,
    pub title: String,
    pub overview: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub vote_average: f32,
    pub release_date: Option<String>,
}

impl ContentItem {
    /// Release year, if a date is known ("1999-03-31" -> "1999").
    pub fn release_year(&self) -> Option<&str> {
        self.release_date.as_deref().and_then(|d| d.get(..4))
    }
}

/// Active discovery filter. Genres are a set: the same logical filter
/// re-applied with genres in a different order compares equal, which is
/// what keeps the pager from resetting spuriously.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    pub kind: ContentKind,
    pub genres: BTreeSet<u32>,
}

impl FilterState {
    pub fn new(kind: ContentKind) -> Self {
        Self { kind, genres: BTreeSet::new() }
    }

    pub fn with_genres(kind: ContentKind, genres: impl IntoIterator<Item = u32>) -> Self {
        Self { kind, genres: genres.into_iter().collect() }
    }

    /// Comma-joined genre ids for the catalog query, empty when unfiltered.
    pub fn genre_param(&self) -> String {
        self.genres.iter().map(|g| g.to_string()).collect::<Vec<_>>().join(",")
    }
}

/// Durable pager snapshot: everything needed to resume a discovery session
/// without refetching. Persisted after every successful page fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct PagerSnapshot {
    pub filter: FilterState,
    pub items: Vec<ContentItem>,
    pub next_page: u32,
}
