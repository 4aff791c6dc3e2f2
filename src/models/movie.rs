use serde::{Deserialize, Serialize};
use std::{
    collections::{HashMap, HashSet},
    fmt::Display,
};

/// TMDB media kind
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Tv,
}

impl MediaKind {
    /// Parses a client-supplied content type; anything but "tv" is a movie.
    pub fn from_form(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("tv") => MediaKind::Tv,
            _ => MediaKind::Movie,
        }
    }

    /// Path segment used by TMDB (`/movie/...`, `/tv/...`)
    pub fn as_path(&self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Tv => "tv",
        }
    }
}

impl Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_path())
    }
}

/// Displayable movie or TV card
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieRef {
    pub id: u64,
    pub title: String,
    pub poster_path: String,
    pub poster_url: String,
    pub overview: String,
    pub media_type: MediaKind,
}

impl MovieRef {
    /// Builds a card from a TMDB result.
    ///
    /// `fallback_kind` applies to typed endpoints whose results carry no
    /// `media_type`. Returns `None` for people and for items without a poster.
    pub fn from_tmdb(item: TmdbItem, fallback_kind: MediaKind, image_url: &str) -> Option<Self> {
        let media_type = match item.media_type.as_deref() {
            None => fallback_kind,
            Some("movie") => MediaKind::Movie,
            Some("tv") => MediaKind::Tv,
            Some(_) => return None,
        };

        let poster_path = item.poster_path.filter(|p| !p.is_empty())?;
        let title = item.title.or(item.name).unwrap_or_default();

        Some(Self {
            id: item.id,
            poster_url: format!("{}{}", image_url, poster_path),
            title,
            poster_path,
            overview: item.overview.unwrap_or_default(),
            media_type,
        })
    }

    /// Cards for a TMDB listing, in order, one per id, skipping posterless
    /// items and people.
    pub fn cards(items: Vec<TmdbItem>, fallback_kind: MediaKind, image_url: &str) -> Vec<Self> {
        let mut seen = HashSet::new();
        items
            .into_iter()
            .filter_map(|item| Self::from_tmdb(item, fallback_kind, image_url))
            .filter(|movie| seen.insert(movie.id))
            .collect()
    }
}

// ============================================================================
// TMDB API Types
// ============================================================================

/// Search, browse or discover result. Movies carry `title`, TV shows `name`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct TmdbItem {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub media_type: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct TmdbPage {
    #[serde(default)]
    pub results: Vec<TmdbItem>,
}

#[derive(Debug, Deserialize)]
pub struct TmdbVideo {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub site: Option<String>,
    #[serde(default, rename = "type")]
    pub video_type: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct TmdbVideos {
    #[serde(default)]
    pub results: Vec<TmdbVideo>,
}

/// Streaming service offering a title in a region
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WatchProvider {
    pub provider_id: u64,
    pub provider_name: String,
    #[serde(default)]
    pub logo_path: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct RegionProviders {
    #[serde(default)]
    pub flatrate: Vec<WatchProvider>,
    #[serde(default)]
    pub rent: Vec<WatchProvider>,
    #[serde(default)]
    pub buy: Vec<WatchProvider>,
}

#[derive(Debug, Deserialize, Default)]
pub struct TmdbWatchProviders {
    #[serde(default)]
    pub results: HashMap<String, RegionProviders>,
}
