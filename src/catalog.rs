use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::types::{ContentItem, ContentKind, FilterState, Genre, TrailerHandle};

const TMDB_API_BASE: &str = "https://api.themoviedb.org/3";
const DEFAULT_LANGUAGE: &str = "en-US";
// Popularity ranking over a tiny vote sample is noise; require a floor.
const MIN_VOTE_COUNT: &str = "100";

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("API error: {0}")]
    ApiError(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Read-only catalog operations the deck engine consumes. All calls are
/// idempotent and may fail transiently.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// List one page (1-based) of content for the filter. An empty page
    /// signals exhaustion for that filter.
    async fn discover(&self, page: u32, filter: &FilterState)
        -> Result<Vec<ContentItem>, CatalogError>;

    /// Resolve the best trailer for an item, or `None` when the catalog
    /// has nothing playable.
    async fn lookup_trailer(&self, id: u32, kind: ContentKind)
        -> Result<Option<TrailerHandle>, CatalogError>;

    /// Genre taxonomy for a content kind.
    async fn genres(&self, kind: ContentKind) -> Result<Vec<Genre>, CatalogError>;
}

/// TMDB v3 implementation of [`CatalogSource`].
pub struct TmdbCatalog {
    api_key: String,
    base_url: Url,
    language: String,
    client: Client,
}

impl TmdbCatalog {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: Url::parse(TMDB_API_BASE).expect("static base URL parses"),
            language: DEFAULT_LANGUAGE.to_string(),
            client: Client::new(),
        }
    }

    /// Build a catalog from the environment: `REELDECK_TMDB_API_KEY`
    /// (required), `REELDECK_TMDB_BASE_URL` and `REELDECK_LANGUAGE`
    /// (optional overrides).
    pub fn from_env() -> anyhow::Result<Self> {
        let api_key = std::env::var("REELDECK_TMDB_API_KEY")
            .context("REELDECK_TMDB_API_KEY is not set")?;
        let mut catalog = Self::new(api_key);
        if let Some(base) = std::env::var("REELDECK_TMDB_BASE_URL").ok().filter(|s| !s.is_empty()) {
            catalog.base_url = Url::parse(&base)
                .with_context(|| format!("invalid catalog base URL: {base}"))?;
        }
        if let Some(lang) = std::env::var("REELDECK_LANGUAGE").ok().filter(|s| !s.is_empty()) {
            catalog.language = lang;
        }
        Ok(catalog)
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T, CatalogError> {
        let url = format!("{}/{}", self.base_url.as_str().trim_end_matches('/'), path);
        tracing::debug!(%url, "catalog request");

        let response = self
            .client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(params)
            .send()
            .await?;

        if response.status() == 401 {
            return Err(CatalogError::InvalidApiKey);
        }
        if response.status() == 429 {
            return Err(CatalogError::RateLimited);
        }
        if !response.status().is_success() {
            return Err(CatalogError::ApiError(format!(
                "catalog returned status: {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| CatalogError::ParseError(e.to_string()))
    }
}

#[async_trait]
impl CatalogSource for TmdbCatalog {
    async fn discover(
        &self,
        page: u32,
        filter: &FilterState,
    ) -> Result<Vec<ContentItem>, CatalogError> {
        let path = format!("discover/{}", filter.kind.api_path());
        let page_str = page.to_string();
        let mut params = vec![
            ("language", self.language.as_str()),
            ("sort_by", "popularity.desc"),
            ("page", page_str.as_str()),
            ("vote_count.gte", MIN_VOTE_COUNT),
        ];
        // Unknown genre ids pass through unchanged; the catalog answers with
        // whatever matches, and an empty page is ordinary exhaustion.
        let genre_param = filter.genre_param();
        if !genre_param.is_empty() {
            params.push(("with_genres", genre_param.as_str()));
        }

        let response: DiscoverResponse = self.get_json(&path, &params).await?;
        tracing::info!(page, kind = %filter.kind, results = response.results.len(), "discover page fetched");

        Ok(response
            .results
            .into_iter()
            .map(|entry| entry.into_item(filter.kind))
            .collect())
    }

    async fn lookup_trailer(
        &self,
        id: u32,
        kind: ContentKind,
    ) -> Result<Option<TrailerHandle>, CatalogError> {
        let path = format!("{}/{}/videos", kind.api_path(), id);

        // Preferred-language pass first; a failure here is not terminal
        // because the any-language fallback may still succeed.
        match self
            .get_json::<VideosResponse>(&path, &[("language", self.language.as_str())])
            .await
        {
            Ok(response) => {
                if let Some(clip) = select_trailer(&response.results, &self.language) {
                    return Ok(Some(TrailerHandle::new(clip.key.clone())));
                }
            }
            Err(e) => {
                tracing::warn!(id, kind = %kind, error = %e, "localized video lookup failed");
            }
        }

        let response: VideosResponse = self.get_json(&path, &[]).await?;
        Ok(select_trailer(&response.results, &self.language)
            .map(|clip| TrailerHandle::new(clip.key.clone())))
    }

    async fn genres(&self, kind: ContentKind) -> Result<Vec<Genre>, CatalogError> {
        let path = format!("genre/{}/list", kind.api_path());
        let response: GenresResponse = self
            .get_json(&path, &[("language", self.language.as_str())])
            .await?;
        Ok(response.genres)
    }
}

#[derive(Debug, Deserialize)]
struct DiscoverResponse {
    results: Vec<DiscoverEntry>,
}

#[derive(Debug, Deserialize)]
struct DiscoverEntry {
    id: u32,
    title: Option<String>,
    name: Option<String>, // TV shows use "name" instead of "title"
    overview: Option<String>,
    poster_path: Option<String>,
    backdrop_path: Option<String>,
    vote_average: Option<f32>,
    release_date: Option<String>,
    first_air_date: Option<String>, // TV shows
}

impl DiscoverEntry {
    fn into_item(self, kind: ContentKind) -> ContentItem {
        ContentItem {
            id: self.id,
            kind,
            title: self
                .title
                .or(self.name)
                .unwrap_or_else(|| "Unknown".to_string()),
            overview: self.overview.unwrap_or_default(),
            poster_path: self.poster_path,
            backdrop_path: self.backdrop_path,
            vote_average: self.vote_average.unwrap_or(0.0),
            release_date: self.release_date.or(self.first_air_date),
        }
    }
}

#[derive(Debug, Deserialize)]
struct VideosResponse {
    results: Vec<VideoClip>,
}

#[derive(Debug, Clone, Deserialize)]
struct VideoClip {
    #[serde(rename = "iso_639_1")]
    language: Option<String>,
    key: String,
    site: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    official: bool,
}

#[derive(Debug, Deserialize)]
struct GenresResponse {
    genres: Vec<Genre>,
}

/// Deterministic trailer pick: official YouTube trailer, then any YouTube
/// trailer, then any preferred-language YouTube clip, then any YouTube clip.
fn select_trailer<'a>(clips: &'a [VideoClip], language: &str) -> Option<&'a VideoClip> {
    let lang = language.split('-').next().unwrap_or(language);
    clips
        .iter()
        .find(|c| c.site == "YouTube" && c.kind == "Trailer" && c.official)
        .or_else(|| clips.iter().find(|c| c.site == "YouTube" && c.kind == "Trailer"))
        .or_else(|| {
            clips
                .iter()
                .find(|c| c.site == "YouTube" && c.language.as_deref() == Some(lang))
        })
        .or_else(|| clips.iter().find(|c| c.site == "YouTube"))
}
